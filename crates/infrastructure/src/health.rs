use crate::{with_timeout, DynamoDbClient};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::error;

pub const DYNAMODB_COMPONENT: &str = "dynamodb";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ServiceHealth {
    pub fn ok() -> Self {
        Self {
            status: HealthStatus::Ok,
            message: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Fail,
            message: Some(message.into()),
        }
    }
}

/// `/health` のレスポンス本体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub components: BTreeMap<String, ServiceHealth>,
}

impl HealthResponse {
    /// 各コンポーネントの結果から全体の状態を決める。1 つでも失敗なら fail。
    pub fn from_components(components: BTreeMap<String, ServiceHealth>) -> Self {
        let status = if components
            .values()
            .all(|c| c.status == HealthStatus::Ok)
        {
            HealthStatus::Ok
        } else {
            HealthStatus::Fail
        };
        Self { status, components }
    }

    pub fn is_ok(&self) -> bool {
        self.status == HealthStatus::Ok
    }
}

#[async_trait]
pub trait HealthChecker: Send + Sync {
    async fn check(&self) -> HealthResponse;
}

/// DescribeTable が成功するかで DynamoDB の疎通を確認する
#[derive(Clone)]
pub struct DynamoDbHealthChecker {
    db: DynamoDbClient,
    timeout: Duration,
}

impl DynamoDbHealthChecker {
    pub fn new(db: DynamoDbClient, timeout: Duration) -> Self {
        Self { db, timeout }
    }
}

#[async_trait]
impl HealthChecker for DynamoDbHealthChecker {
    async fn check(&self) -> HealthResponse {
        let result = with_timeout(self.timeout, "describe_table", async {
            self.db
                .client()
                .describe_table()
                .table_name(self.db.table_name())
                .send()
                .await
                .map_err(|e| self.db.convert_error(e))
        })
        .await;

        let component = match result {
            Ok(_) => ServiceHealth::ok(),
            Err(e) => {
                error!(
                    error = %e,
                    component = DYNAMODB_COMPONENT,
                    "DynamoDB health check failed"
                );
                ServiceHealth::fail("Failed to connect to todos table")
            }
        };

        HealthResponse::from_components(BTreeMap::from([(
            DYNAMODB_COMPONENT.to_string(),
            component,
        )]))
    }
}
