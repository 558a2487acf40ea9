use crate::{Todo, TodoError, TodoId};
use async_trait::async_trait;

/// `Todo` の永続化を抽象化するリポジトリ
///
/// 本番用の DynamoDB 実装とテスト用のインメモリ実装がこの契約を満たす。
/// 書き込みは常に全フィールドの上書きで、条件付き書き込みは行わない（後勝ち）。
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// レコードを無条件に書き込み、保存した値を返す
    async fn create(&self, todo: Todo) -> Result<Todo, TodoError>;

    /// 全件を順不同で返す。空なら空の Vec。
    async fn find_all(&self) -> Result<Vec<Todo>, TodoError>;

    /// 見つからない場合は `Ok(None)`
    async fn find_by_id(&self, id: &TodoId) -> Result<Option<Todo>, TodoError>;

    /// `create` と同じ上書きセマンティクス。事前の取得とマージは呼び出し側の責務。
    async fn update(&self, todo: Todo) -> Result<Todo, TodoError>;

    /// 冪等。存在しない ID の削除もエラーにならない。
    async fn delete(&self, id: &TodoId) -> Result<(), TodoError>;
}
