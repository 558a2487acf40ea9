use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// HTTP 境界のエラー
///
/// クライアントには汎用メッセージのみを返す。内部エラーの詳細はハンドラ側でログに残す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(&'static str),
    NotFound,
    Internal(&'static str),
}

impl ApiError {
    pub const INVALID_BODY: ApiError = ApiError::BadRequest("Invalid request body");
    pub const INVALID_ID: ApiError = ApiError::BadRequest("Invalid todo ID");

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ApiError::BadRequest(message) | ApiError::Internal(message) => message,
            ApiError::NotFound => "Todo not found",
        }
    }
}

/// アクセスログに載せるエラー内容。レスポンスの extensions 経由で渡す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError(pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message() });
        let mut response = (self.status(), Json(body)).into_response();
        response
            .extensions_mut()
            .insert(RequestError(self.message().to_string()));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::INVALID_ID.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal("Failed to get todos").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages_are_generic() {
        assert_eq!(ApiError::INVALID_BODY.message(), "Invalid request body");
        assert_eq!(ApiError::NotFound.message(), "Todo not found");
    }

    #[test]
    fn test_response_carries_error_for_access_log() {
        let response = ApiError::Internal("Failed to get todos").into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.extensions().get::<RequestError>(),
            Some(&RequestError("Failed to get todos".to_string()))
        );
    }
}
