use crate::{with_timeout, DEFAULT_CALL_TIMEOUT};
use async_trait::async_trait;
use domain::{Todo, TodoError, TodoId, TodoRepository};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// 簡易な InMemory 実装（開発/テスト用）
///
/// DynamoDB 実装と同じ契約（上書き書き込み、冪等な削除、順不同の全件取得）と
/// 同じ呼び出しタイムアウトを持つ。`with_latency` で応答遅延を注入できる。
pub struct InMemoryTodoRepository {
    items: Mutex<HashMap<TodoId, Todo>>,
    latency: Option<Duration>,
    timeout: Duration,
}

impl Default for InMemoryTodoRepository {
    fn default() -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            latency: None,
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<TodoId, Todo>>, TodoError> {
        self.items
            .lock()
            .map_err(|_| TodoError::Storage("in-memory store lock poisoned".to_string()))
    }

    fn put(&self, todo: Todo) -> Result<Todo, TodoError> {
        self.lock()?.insert(todo.id, todo.clone());
        Ok(todo)
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn create(&self, todo: Todo) -> Result<Todo, TodoError> {
        with_timeout(self.timeout, "create", async move {
            self.simulate_latency().await;
            self.put(todo)
        })
        .await
    }

    async fn find_all(&self) -> Result<Vec<Todo>, TodoError> {
        with_timeout(self.timeout, "find_all", async {
            self.simulate_latency().await;
            Ok(self.lock()?.values().cloned().collect())
        })
        .await
    }

    async fn find_by_id(&self, id: &TodoId) -> Result<Option<Todo>, TodoError> {
        with_timeout(self.timeout, "find_by_id", async {
            self.simulate_latency().await;
            Ok(self.lock()?.get(id).cloned())
        })
        .await
    }

    async fn update(&self, todo: Todo) -> Result<Todo, TodoError> {
        with_timeout(self.timeout, "update", async move {
            self.simulate_latency().await;
            self.put(todo)
        })
        .await
    }

    async fn delete(&self, id: &TodoId) -> Result<(), TodoError> {
        with_timeout(self.timeout, "delete", async {
            self.simulate_latency().await;
            self.lock()?.remove(id);
            Ok(())
        })
        .await
    }
}
