use crate::clock::{Clock, SystemClock};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use domain::{Todo, TodoCreate, TodoError, TodoId, TodoRepository, TodoUpdate};
use std::sync::Arc;
use tracing::{debug, info};

/// Todo のユースケース層
///
/// ID 採番・部分更新・タイムスタンプ管理のルールをここに集約する。
/// HTTP やストレージのワイヤ形式は知らない。
#[derive(Clone)]
pub struct TodoUseCase {
    repo: Arc<dyn TodoRepository>,
    clock: Arc<dyn Clock>,
}

impl TodoUseCase {
    pub fn new(repo: Arc<dyn TodoRepository>) -> Self {
        Self::with_clock(repo, Arc::new(SystemClock))
    }

    pub fn with_clock(repo: Arc<dyn TodoRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    // ストレージの時刻表現は秒精度なので、ここで揃えておく
    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(0)
    }

    pub async fn create_todo(&self, input: TodoCreate) -> Result<Todo, TodoError> {
        let todo = Todo::new(TodoId::new(), input, self.now());
        let created = self.repo.create(todo).await?;
        info!(id = %created.id, "Todo created");
        Ok(created)
    }

    pub async fn get_todos(&self) -> Result<Vec<Todo>, TodoError> {
        let todos = self.repo.find_all().await?;
        debug!(count = todos.len(), "Todos listed");
        Ok(todos)
    }

    pub async fn get_todo(&self, id: &TodoId) -> Result<Option<Todo>, TodoError> {
        self.repo.find_by_id(id).await
    }

    /// 既存レコードを取得してマージし、全体を書き戻す。
    /// 存在しなければ書き込みを行わず `Ok(None)` を返す。
    pub async fn update_todo(
        &self,
        id: &TodoId,
        input: TodoUpdate,
    ) -> Result<Option<Todo>, TodoError> {
        let Some(mut todo) = self.repo.find_by_id(id).await? else {
            debug!(id = %id, "Todo not found, skipping update");
            return Ok(None);
        };

        // 秒精度のため同一秒内の更新でも updated_at が必ず進むようにする
        let now = self.now().max(todo.updated_at + Duration::seconds(1));
        todo.apply(input, now);
        let updated = self.repo.update(todo).await?;
        info!(id = %updated.id, completed = updated.completed, "Todo updated");
        Ok(Some(updated))
    }

    pub async fn delete_todo(&self, id: &TodoId) -> Result<(), TodoError> {
        self.repo.delete(id).await?;
        info!(id = %id, "Todo deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use infrastructure::InMemoryTodoRepository;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// 呼び出しごとに 1 秒進む時計
    struct SteppingClock {
        secs: AtomicI64,
    }

    impl SteppingClock {
        fn starting_at(secs: i64) -> Self {
            Self {
                secs: AtomicI64::new(secs),
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let secs = self.secs.fetch_add(1, Ordering::SeqCst);
            // 秒未満は切り捨てられることを確認するため端数を付ける
            Utc.timestamp_opt(secs, 250_000_000).unwrap()
        }
    }

    /// 進まない時計
    struct FrozenClock(DateTime<Utc>);

    impl Clock for FrozenClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn setup() -> (TodoUseCase, Arc<InMemoryTodoRepository>) {
        let repo = Arc::new(InMemoryTodoRepository::new());
        let usecase = TodoUseCase::with_clock(
            repo.clone(),
            Arc::new(SteppingClock::starting_at(1_700_000_000)),
        );
        (usecase, repo)
    }

    fn create_input(title: &str, description: &str) -> TodoCreate {
        TodoCreate {
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_todo_sets_defaults() {
        let (usecase, _) = setup();

        let todo = usecase.create_todo(create_input("A", "B")).await.unwrap();

        assert_eq!(todo.title, "A");
        assert_eq!(todo.description, "B");
        assert!(!todo.completed);
        assert_eq!(todo.created_at, todo.updated_at);
        assert_eq!(todo.created_at, Utc.timestamp_opt(1_700_000_000, 0).unwrap());
    }

    #[tokio::test]
    async fn test_create_todo_twice_generates_distinct_ids() {
        let (usecase, repo) = setup();

        let first = usecase.create_todo(create_input("A", "B")).await.unwrap();
        let second = usecase.create_todo(create_input("A", "B")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn test_create_todo_tolerates_empty_input() {
        let (usecase, _) = setup();

        let todo = usecase.create_todo(TodoCreate::default()).await.unwrap();

        assert_eq!(todo.title, "");
        assert_eq!(todo.description, "");
    }

    #[tokio::test]
    async fn test_partial_update_keeps_title_for_empty_string() {
        let (usecase, _) = setup();
        let created = usecase.create_todo(create_input("A", "B")).await.unwrap();

        let updated = usecase
            .update_todo(
                &created.id,
                TodoUpdate {
                    title: String::new(),
                    description: "C".to_string(),
                    completed: true,
                },
            )
            .await
            .unwrap()
            .expect("todo should exist");

        assert_eq!(updated.title, "A");
        assert_eq!(updated.description, "C");
        assert!(updated.completed);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);

        let stored = usecase.get_todo(&created.id).await.unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_update_within_same_second_still_advances_updated_at() {
        let frozen = Utc.timestamp_opt(1_700_000_000, 400_000_000).unwrap();
        let usecase = TodoUseCase::with_clock(
            Arc::new(InMemoryTodoRepository::new()),
            Arc::new(FrozenClock(frozen)),
        );
        let created = usecase.create_todo(create_input("A", "B")).await.unwrap();

        let first = usecase
            .update_todo(&created.id, TodoUpdate::default())
            .await
            .unwrap()
            .unwrap();
        let second = usecase
            .update_todo(&created.id, TodoUpdate::default())
            .await
            .unwrap()
            .unwrap();

        assert!(first.updated_at > created.updated_at);
        assert!(second.updated_at > first.updated_at);
        assert_eq!(first.created_at, created.created_at);
        assert_eq!(first.updated_at.timestamp_subsec_nanos(), 0);
    }

    #[tokio::test]
    async fn test_immediate_update_with_system_clock_advances_updated_at() {
        let usecase = TodoUseCase::new(Arc::new(InMemoryTodoRepository::new()));
        let created = usecase.create_todo(create_input("A", "B")).await.unwrap();

        let updated = usecase
            .update_todo(&created.id, TodoUpdate::default())
            .await
            .unwrap()
            .unwrap();

        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_update_cannot_clear_fields() {
        let (usecase, _) = setup();
        let created = usecase.create_todo(create_input("A", "B")).await.unwrap();

        let updated = usecase
            .update_todo(&created.id, TodoUpdate::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "A");
        assert_eq!(updated.description, "B");
        assert!(!updated.completed);
    }

    #[tokio::test]
    async fn test_update_missing_todo_returns_none_without_write() {
        let (usecase, repo) = setup();
        let missing = TodoId::new();

        let result = usecase
            .update_todo(
                &missing,
                TodoUpdate {
                    title: "x".to_string(),
                    description: "y".to_string(),
                    completed: true,
                },
            )
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(repo.len(), 0);
    }

    #[tokio::test]
    async fn test_get_missing_todo_returns_none() {
        let (usecase, _) = setup();
        assert!(usecase.get_todo(&TodoId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_todos_on_empty_store() {
        let (usecase, _) = setup();
        assert!(usecase.get_todos().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_todos_returns_every_record() {
        let (usecase, _) = setup();
        let a = usecase.create_todo(create_input("A", "")).await.unwrap();
        let b = usecase.create_todo(create_input("B", "")).await.unwrap();

        let mut ids: Vec<TodoId> = usecase
            .get_todos()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        let mut expected = vec![a.id, b.id];
        ids.sort_by_key(|id| id.to_string());
        expected.sort_by_key(|id| id.to_string());

        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (usecase, repo) = setup();
        let created = usecase.create_todo(create_input("A", "B")).await.unwrap();

        usecase.delete_todo(&created.id).await.unwrap();
        usecase.delete_todo(&created.id).await.unwrap();
        usecase.delete_todo(&TodoId::new()).await.unwrap();

        assert_eq!(repo.len(), 0);
        assert!(usecase.get_todo(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_storage_timeout_propagates_unchanged() {
        let repo = Arc::new(
            InMemoryTodoRepository::new()
                .with_latency(std::time::Duration::from_millis(200))
                .with_timeout(std::time::Duration::from_millis(20)),
        );
        let usecase = TodoUseCase::new(repo);

        let err = usecase.get_todos().await.unwrap_err();
        assert!(err.is_timeout());
    }
}
