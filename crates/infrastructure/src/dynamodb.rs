use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::{
    config::{Credentials, Region, SharedCredentialsProvider},
    error::{DisplayErrorContext, SdkError},
    Client,
};
use domain::TodoError;
use shared::Config;
use tracing::{debug, error};

/// テーブル名と対になった DynamoDB クライアント
///
/// `Client` は内部で `Arc` を保持しているため、クローンしてリクエスト間で共有してよい。
#[derive(Clone, Debug)]
pub struct DynamoDbClient {
    client: Client,
    table_name: String,
}

impl DynamoDbClient {
    pub async fn new(config: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()));

        // エンドポイント指定時は DynamoDB Local を想定し、ダミーの認証情報を使う
        if let Some(endpoint) = &config.dynamodb_endpoint {
            debug!(endpoint = %endpoint, "Using DynamoDB endpoint override");
            loader = loader
                .endpoint_url(endpoint)
                .credentials_provider(SharedCredentialsProvider::new(Credentials::new(
                    "dummy", "dummy", None, None, "static",
                )));
        }

        let aws_config = loader.load().await;
        Self::from_client(Client::new(&aws_config), config.dynamodb_table.clone())
    }

    pub fn from_client(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// SDK エラーをストレージエラーに変換する（詳細はログにのみ残す）
    pub fn convert_error<E, R>(&self, err: SdkError<E, R>) -> TodoError
    where
        E: std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        let detail = DisplayErrorContext(&err).to_string();
        error!(table = %self.table_name, error = %detail, "DynamoDB request failed");
        TodoError::Storage(detail)
    }
}
