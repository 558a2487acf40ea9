use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use domain::{Todo, TodoCreate, TodoId, TodoUpdate};
use tracing::{error, warn};

use crate::error::ApiError;
use crate::AppState;

fn parse_id(raw: &str, method: &Method, uri: &Uri) -> Result<TodoId, ApiError> {
    TodoId::parse(raw).map_err(|e| {
        warn!(error = %e, path = %uri.path(), method = %method, "Invalid todo ID");
        ApiError::INVALID_ID
    })
}

fn parse_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    method: &Method,
    uri: &Uri,
) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|e| {
        warn!(error = %e, path = %uri.path(), method = %method, "Invalid request body");
        ApiError::INVALID_BODY
    })
}

/// POST /todos: 201 と Location ヘッダのみを返す
pub async fn create_todo(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    payload: Result<Json<TodoCreate>, JsonRejection>,
) -> Result<Response, ApiError> {
    let input = parse_body(payload, &method, &uri)?;

    let created = state.usecase.create_todo(input).await.map_err(|e| {
        error!(error = %e, path = %uri.path(), method = %method, "Failed to create todo");
        ApiError::Internal("Failed to create todo")
    })?;

    let location = format!("/todos/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)]).into_response())
}

pub async fn list_todos(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state.usecase.get_todos().await.map_err(|e| {
        error!(error = %e, path = %uri.path(), method = %method, "Failed to get todos");
        ApiError::Internal("Failed to get todos")
    })?;
    Ok(Json(todos))
}

pub async fn get_todo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    method: Method,
    uri: Uri,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&raw_id, &method, &uri)?;

    let todo = state.usecase.get_todo(&id).await.map_err(|e| {
        error!(error = %e, path = %uri.path(), method = %method, id = %id, "Failed to get todo");
        ApiError::Internal("Failed to get todo")
    })?;

    match todo {
        Some(todo) => Ok(Json(todo)),
        None => {
            warn!(path = %uri.path(), method = %method, id = %id, "Todo not found");
            Err(ApiError::NotFound)
        }
    }
}

/// PATCH /todos/:id: ID の検証を本文より先に行う
pub async fn update_todo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    method: Method,
    uri: Uri,
    payload: Result<Json<TodoUpdate>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&raw_id, &method, &uri)?;
    let input = parse_body(payload, &method, &uri)?;

    let updated = state.usecase.update_todo(&id, input).await.map_err(|e| {
        error!(error = %e, path = %uri.path(), method = %method, id = %id, "Failed to update todo");
        ApiError::Internal("Failed to update todo")
    })?;

    match updated {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => {
            warn!(path = %uri.path(), method = %method, id = %id, "Todo not found");
            Err(ApiError::NotFound)
        }
    }
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    method: Method,
    uri: Uri,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&raw_id, &method, &uri)?;

    state.usecase.delete_todo(&id).await.map_err(|e| {
        error!(error = %e, path = %uri.path(), method = %method, id = %id, "Failed to delete todo");
        ApiError::Internal("Failed to delete todo")
    })?;

    Ok(StatusCode::NO_CONTENT)
}

/// ヘルスチェック用ハンドラ。失敗時も同じ形の本文を 500 で返す。
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let response = state.health.check().await;
    let status = if response.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(response))
}
