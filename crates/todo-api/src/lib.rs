//! Todo REST API（axum）
//!
//! ルーティング・ミドルウェア・エラー変換のみを担い、
//! ドメインルールは `application::TodoUseCase` に委ねる。

pub mod error;
pub mod handlers;
pub mod middleware;

use application::TodoUseCase;
use axum::{middleware::from_fn, routing::get, Router};
use infrastructure::HealthChecker;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

/// アプリケーションの共有状態。すべて起動時に注入する。
#[derive(Clone)]
pub struct AppState {
    pub usecase: TodoUseCase,
    pub health: Arc<dyn HealthChecker>,
}

impl AppState {
    pub fn new(usecase: TodoUseCase, health: Arc<dyn HealthChecker>) -> Self {
        Self { usecase, health }
    }
}

/// ルータを構築して返します。
///
/// レイヤーは外側からアクセスログ → panic 回復 → CORS の順。
/// panic した要求も回復後の 500 としてログに残る。
pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/todos/:id",
            get(handlers::get_todo)
                .patch(handlers::update_todo)
                .delete(handlers::delete_todo),
        )
        .layer(middleware::cors_layer())
        .layer(CatchPanicLayer::custom(middleware::handle_panic))
        .layer(from_fn(middleware::log_requests))
        .with_state(state)
}
