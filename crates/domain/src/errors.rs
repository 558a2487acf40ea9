use std::time::Duration;
use thiserror::Error;

/// クライアント入力に起因するエラー（HTTP 400 相当）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid TodoId: {0}")]
    InvalidTodoId(String),
}

/// ストレージアイテムと `Todo` の相互変換エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("attribute `{attribute}` is missing or has an unexpected type")]
    SchemaViolation { attribute: &'static str },

    #[error("attribute `{attribute}` could not be parsed: {message}")]
    Parse {
        attribute: &'static str,
        message: String,
    },
}

/// リポジトリ操作のエラー。いずれも HTTP 500 に対応する。
#[derive(Debug, Clone, Error)]
pub enum TodoError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Storage call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Decode error: {0}")]
    Decode(#[from] MappingError),
}

impl TodoError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TodoError::Timeout(_))
    }
}
