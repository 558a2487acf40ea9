use axum::{
    extract::{ConnectInfo, Request},
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{any::Any, net::SocketAddr, time::Duration, time::Instant};
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tracing::{error, info};

use crate::error::{ApiError, RequestError};

/// 1 リクエストにつき 1 行、処理完了時にアクセスログを出す
pub async fn log_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();

    let path = req.uri().path().to_string();
    let query = req.uri().query().unwrap_or_default().to_string();
    let method = req.method().clone();
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());
    let client_ip = client_ip(req.headers(), peer);

    let response = next.run(req).await;

    info!(
        path = %path,
        query = %query,
        status = response.status().as_u16(),
        latency = ?start.elapsed(),
        client_ip = %client_ip,
        method = %method,
        user_agent = %user_agent,
        error = %request_error(&response),
        "Request completed"
    );

    response
}

/// エラー応答に添付された内容。正常応答では空文字。
pub fn request_error(response: &Response) -> &str {
    response
        .extensions()
        .get::<RequestError>()
        .map(|RequestError(message)| message.as_str())
        .unwrap_or_default()
}

/// `X-Forwarded-For` の先頭を優先し、なければ接続元アドレスを使う
pub fn client_ip(headers: &HeaderMap, peer: Option<String>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .or(peer)
        .unwrap_or_default()
}

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_LENGTH])
        .max_age(Duration::from_secs(12 * 60 * 60))
}

/// ハンドラ内の panic を 500 に変換する
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(panic = %detail, "Recovered from panic in request handler");

    let mut response = ApiError::Internal("Internal server error").into_response();
    response
        .extensions_mut()
        .insert(RequestError(format!("panic: {detail}")));
    response
}
