use crate::models::{from_attribute_map, key_for, to_attribute_map};
use crate::{with_timeout, DynamoDbClient, DEFAULT_CALL_TIMEOUT};
use async_trait::async_trait;
use domain::{Todo, TodoError, TodoId, TodoRepository};
use std::time::Duration;
use tracing::{debug, error};

/// DynamoDB をバックエンドとする `TodoRepository`
///
/// 各呼び出しは 1 回のネットワーク往復で、`timeout` で打ち切られる。
/// 書き込みは条件式なしの PutItem なので、同一 ID の同時更新は後勝ちになる。
#[derive(Clone)]
pub struct DynamoDbTodoRepository {
    db: DynamoDbClient,
    timeout: Duration,
}

impl DynamoDbTodoRepository {
    pub fn new(db: DynamoDbClient, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    pub fn with_default_timeout(db: DynamoDbClient) -> Self {
        Self::new(db, DEFAULT_CALL_TIMEOUT)
    }

    pub fn db(&self) -> &DynamoDbClient {
        &self.db
    }

    async fn put(&self, operation: &'static str, todo: Todo) -> Result<Todo, TodoError> {
        let item = to_attribute_map(&todo);

        with_timeout(self.timeout, operation, async move {
            self.db
                .client()
                .put_item()
                .table_name(self.db.table_name())
                .set_item(Some(item))
                .send()
                .await
                .map_err(|e| self.db.convert_error(e))
        })
        .await?;

        debug!(id = %todo.id, operation, "Todo item written");
        Ok(todo)
    }
}

#[async_trait]
impl TodoRepository for DynamoDbTodoRepository {
    async fn create(&self, todo: Todo) -> Result<Todo, TodoError> {
        self.put("create", todo).await
    }

    async fn find_all(&self) -> Result<Vec<Todo>, TodoError> {
        // ページングはしない。1 回の Scan で返る分がすべて。
        let output = with_timeout(self.timeout, "find_all", async {
            self.db
                .client()
                .scan()
                .table_name(self.db.table_name())
                .send()
                .await
                .map_err(|e| self.db.convert_error(e))
        })
        .await?;

        let todos = output
            .items()
            .iter()
            .map(from_attribute_map)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                error!(error = %e, "Failed to decode scanned item");
                TodoError::from(e)
            })?;

        debug!(count = todos.len(), "Todo items scanned");
        Ok(todos)
    }

    async fn find_by_id(&self, id: &TodoId) -> Result<Option<Todo>, TodoError> {
        let output = with_timeout(self.timeout, "find_by_id", async {
            self.db
                .client()
                .get_item()
                .table_name(self.db.table_name())
                .set_key(Some(key_for(id)))
                .send()
                .await
                .map_err(|e| self.db.convert_error(e))
        })
        .await?;

        match output.item() {
            Some(item) => Ok(Some(from_attribute_map(item).map_err(|e| {
                error!(id = %id, error = %e, "Failed to decode todo item");
                TodoError::from(e)
            })?)),
            None => Ok(None),
        }
    }

    async fn update(&self, todo: Todo) -> Result<Todo, TodoError> {
        self.put("update", todo).await
    }

    async fn delete(&self, id: &TodoId) -> Result<(), TodoError> {
        with_timeout(self.timeout, "delete", async {
            self.db
                .client()
                .delete_item()
                .table_name(self.db.table_name())
                .set_key(Some(key_for(id)))
                .send()
                .await
                .map_err(|e| self.db.convert_error(e))
        })
        .await?;

        debug!(id = %id, "Todo item deleted");
        Ok(())
    }
}
