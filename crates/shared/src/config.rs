use std::env;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_AWS_REGION: &str = "ap-northeast-1";
pub const DEFAULT_DYNAMODB_TABLE: &str = "goto-dev-todo";
pub const DEFAULT_DYNAMODB_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_PORT: u16 = 8080;

/// 起動時の設定エラー。発生した場合はプロセスを起動しない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid format for {var}: {value:?} ({reason})")]
    InvalidDuration {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid format for {var}: {value:?} is not a valid port")]
    InvalidPort { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// DynamoDB Local などへの接続先上書き
    pub dynamodb_endpoint: Option<String>,
    pub aws_region: String,
    pub dynamodb_table: String,
    /// ストレージ呼び出し 1 回あたりのタイムアウト
    pub dynamodb_timeout: Duration,
    pub shutdown_timeout: Duration,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dynamodb_endpoint: None,
            aws_region: DEFAULT_AWS_REGION.to_string(),
            dynamodb_table: DEFAULT_DYNAMODB_TABLE.to_string(),
            dynamodb_timeout: DEFAULT_DYNAMODB_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意のキー検索関数から設定を組み立てる。空文字は未設定として扱う。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let dynamodb_timeout = match get("DYNAMODB_CONNECTION_TIMEOUT") {
            Some(value) => duration_var("DYNAMODB_CONNECTION_TIMEOUT", value)?,
            None => defaults.dynamodb_timeout,
        };
        let shutdown_timeout = match get("SHUTDOWN_TIMEOUT") {
            Some(value) => duration_var("SHUTDOWN_TIMEOUT", value)?,
            None => defaults.shutdown_timeout,
        };
        let port = match get("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidPort { var: "PORT", value })?,
            None => defaults.port,
        };

        Ok(Config {
            dynamodb_endpoint: get("DYNAMODB_ENDPOINT"),
            aws_region: get("AWS_REGION").unwrap_or(defaults.aws_region),
            dynamodb_table: get("DYNAMODB_TABLE").unwrap_or(defaults.dynamodb_table),
            dynamodb_timeout,
            shutdown_timeout,
            port,
        })
    }
}

fn duration_var(var: &'static str, value: String) -> Result<Duration, ConfigError> {
    parse_duration(&value).map_err(|reason| ConfigError::InvalidDuration { var, value, reason })
}

/// `300ms`, `1.5s`, `1m30s` のような Go 形式の期間文字列を解釈する。
///
/// 単位は ns / us (µs) / ms / s / m / h。単位なしで許されるのは `0` のみ。
/// 負の値は扱わない。
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    if s.is_empty() {
        return Err("empty duration".to_string());
    }
    if s.starts_with('-') {
        return Err("negative durations are not supported".to_string());
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total_nanos = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_end);
        if number.is_empty() || number == "." {
            return Err(format!("expected a number in {input:?}"));
        }
        let value: f64 = number
            .parse()
            .map_err(|_| format!("invalid number {number:?}"))?;

        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);
        let nanos_per_unit = match unit {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            "" => return Err(format!("missing unit in {input:?}")),
            other => return Err(format!("unknown unit {other:?} in {input:?}")),
        };

        total_nanos += value * nanos_per_unit;
        rest = tail;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(format!("duration {input:?} is out of range"));
    }
    Ok(Duration::from_nanos(total_nanos.round() as u64))
}
