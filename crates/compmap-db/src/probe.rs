//! Connectivity probe for the diagnostics endpoint and `db check` command.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::PgPool;

/// Outcome of one round trip to the database.
///
/// Always well-formed: failures carry a sanitized `error` instead of the
/// driver's message, which may include hostnames or credentials.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectivityReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ConnectivityReport {
    fn ok(result: Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
            timestamp: Utc::now(),
        }
    }

    fn failed(message: &str) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(message.to_string()),
            timestamp: Utc::now(),
        }
    }
}

/// Issue `SELECT 1` bounded by `timeout` and report what happened. Never fails.
pub async fn check_connectivity(pool: &PgPool, timeout: Duration) -> ConnectivityReport {
    match tokio::time::timeout(timeout, crate::ping(pool)).await {
        Ok(Ok(value)) => ConnectivityReport::ok(json!({ "ok": value })),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "connectivity probe failed");
            ConnectivityReport::failed(describe(&e))
        }
        Err(_) => {
            tracing::warn!(timeout_secs = timeout.as_secs_f64(), "connectivity probe timed out");
            ConnectivityReport::failed("connectivity check timed out")
        }
    }
}

fn describe(error: &sqlx::Error) -> &'static str {
    match error {
        sqlx::Error::PoolTimedOut => "database connection timed out",
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolClosed => {
            "database unreachable"
        }
        sqlx::Error::Database(_) => "database rejected the query",
        _ => "database query failed",
    }
}
