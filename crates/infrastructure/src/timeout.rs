use domain::TodoError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// ストレージ呼び出しの既定タイムアウト
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(1);

/// 1 回のストレージ呼び出しを `limit` で打ち切る。リトライはしない。
pub async fn with_timeout<F, T>(limit: Duration, operation: &'static str, call: F) -> Result<T, TodoError>
where
    F: Future<Output = Result<T, TodoError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                operation,
                timeout_ms = limit.as_millis() as u64,
                "Storage call timed out"
            );
            Err(TodoError::Timeout(limit))
        }
    }
}
