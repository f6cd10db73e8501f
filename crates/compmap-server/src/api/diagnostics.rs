use axum::{extract::State, http::StatusCode, Json};
use compmap_db::ConnectivityReport;

use super::AppState;

/// `GET /api/v1/diagnostics/db`: one round trip to the database.
///
/// The body is always a well-formed report; failure only changes the status.
pub(super) async fn check_database(
    State(state): State<AppState>,
) -> (StatusCode, Json<ConnectivityReport>) {
    let report = compmap_db::check_connectivity(&state.pool, state.probe_timeout).await;
    let status = if report.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(report))
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};

    use super::super::test_support::{app, send};
    use super::*;

    #[tokio::test]
    async fn unreachable_database_reports_failure_with_server_error() {
        let (status, json) = send(
            app(None),
            Request::builder()
                .uri("/api/v1/diagnostics/db")
                .body(Body::empty())
                .expect("request"),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));
        assert!(json["timestamp"].is_string());
        assert!(json.get("result").is_none());
        assert!(!json.to_string().contains("secret"));
    }
}
