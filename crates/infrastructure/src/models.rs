//! `Todo` と DynamoDB アイテム（属性マップ）の相互変換
//!
//! テーブルは `id` (S) をパーティションキーとする単純な構成で、
//! 属性値は S と BOOL のみを使う。タイムスタンプは UTC・秒精度の固定書式。

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use domain::{MappingError, Todo, TodoId};
use std::collections::HashMap;

pub const ATTR_ID: &str = "id";
pub const ATTR_TITLE: &str = "title";
pub const ATTR_DESCRIPTION: &str = "description";
pub const ATTR_COMPLETED: &str = "completed";
pub const ATTR_CREATED_AT: &str = "created_at";
pub const ATTR_UPDATED_AT: &str = "updated_at";

/// 辞書順で時系列に並ぶ書式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub type Item = HashMap<String, AttributeValue>;

/// プライマリキーのみの属性マップ（GetItem / DeleteItem 用）
pub fn key_for(id: &TodoId) -> Item {
    HashMap::from([(ATTR_ID.to_string(), AttributeValue::S(id.to_string()))])
}

pub fn to_attribute_map(todo: &Todo) -> Item {
    let mut map = key_for(&todo.id);

    map.insert(ATTR_TITLE.to_string(), AttributeValue::S(todo.title.clone()));
    map.insert(
        ATTR_DESCRIPTION.to_string(),
        AttributeValue::S(todo.description.clone()),
    );
    map.insert(
        ATTR_COMPLETED.to_string(),
        AttributeValue::Bool(todo.completed),
    );
    map.insert(
        ATTR_CREATED_AT.to_string(),
        AttributeValue::S(format_timestamp(&todo.created_at)),
    );
    map.insert(
        ATTR_UPDATED_AT.to_string(),
        AttributeValue::S(format_timestamp(&todo.updated_at)),
    );

    map
}

/// 属性の欠落・型違いは `SchemaViolation`、値の解釈失敗は `Parse`。
/// 未知の属性は無視する。
pub fn from_attribute_map(map: &Item) -> Result<Todo, MappingError> {
    let id = string_attr(map, ATTR_ID)?;
    let id = TodoId::parse(id).map_err(|e| MappingError::Parse {
        attribute: ATTR_ID,
        message: e.to_string(),
    })?;

    let completed = map
        .get(ATTR_COMPLETED)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .ok_or(MappingError::SchemaViolation {
            attribute: ATTR_COMPLETED,
        })?;

    Ok(Todo {
        id,
        title: string_attr(map, ATTR_TITLE)?.clone(),
        description: string_attr(map, ATTR_DESCRIPTION)?.clone(),
        completed,
        created_at: timestamp_attr(map, ATTR_CREATED_AT)?,
        updated_at: timestamp_attr(map, ATTR_UPDATED_AT)?,
    })
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).map(|naive| Utc.from_utc_datetime(&naive))
}

fn string_attr<'a>(map: &'a Item, attribute: &'static str) -> Result<&'a String, MappingError> {
    map.get(attribute)
        .and_then(|v| v.as_s().ok())
        .ok_or(MappingError::SchemaViolation { attribute })
}

fn timestamp_attr(map: &Item, attribute: &'static str) -> Result<DateTime<Utc>, MappingError> {
    let raw = string_attr(map, attribute)?;
    parse_timestamp(raw).map_err(|e| MappingError::Parse {
        attribute,
        message: format!("{raw:?}: {e}"),
    })
}
