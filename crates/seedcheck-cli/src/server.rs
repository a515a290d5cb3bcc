use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use serde_json::value::RawValue;
use sqlx::postgres::PgConnectOptions;
use uuid::Uuid;

use seedcheck_core::RunOutcome;
use seedcheck_seed::{EphemeralDatabase, SeedOptions, run_with_options};

/// Body of `POST /test`.
#[derive(Debug, Deserialize)]
pub struct TestRequest {
    pub schema: String,
    pub mock_data: Box<RawValue>,
}

#[derive(Debug)]
struct ServerConfig {
    admin: PgConnectOptions,
    seed: SeedOptions,
    request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(admin: PgConnectOptions, seed: SeedOptions, request_timeout: Duration) -> Self {
        Self {
            config: Arc::new(ServerConfig {
                admin,
                seed,
                request_timeout,
            }),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/test", post(test_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "OK"
}

async fn test_handler(
    State(state): State<AppState>,
    payload: Result<Json<TestRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!(event = "invalid_request", error = %rejection);
            return error_response(StatusCode::BAD_REQUEST, "invalid JSON provided", None);
        }
    };

    let request_id = Uuid::new_v4();
    let config = &state.config;
    tracing::info!(event = "request_received", request_id = %request_id);

    let database = match EphemeralDatabase::create(&config.admin, &config.seed).await {
        Ok(database) => database,
        Err(err) => {
            tracing::error!(event = "provision_failed", request_id = %request_id, error = %err);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to provision database",
                Some(err.to_string()),
            );
        }
    };

    let outcome = tokio::time::timeout(
        config.request_timeout,
        run_with_options(
            database.connect_options(),
            &config.seed,
            &request.schema,
            request.mock_data.get(),
        ),
    )
    .await;

    if let Err(err) = database.drop_database().await {
        tracing::warn!(event = "teardown_failed", request_id = %request_id, error = %err);
    }

    match outcome {
        Ok(outcome) => outcome_response(outcome),
        Err(_) => {
            tracing::error!(event = "request_timed_out", request_id = %request_id);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to run tests",
                Some(format!(
                    "timed out after {}s",
                    config.request_timeout.as_secs()
                )),
            )
        }
    }
}

/// Completed runs are 200 even when they carry errors; aborted runs are 500.
fn outcome_response(outcome: RunOutcome) -> Response {
    match outcome {
        RunOutcome::Completed(result) => (StatusCode::OK, Json(result)).into_response(),
        RunOutcome::Aborted { error, .. } => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to run tests",
            Some(error.to_string()),
        ),
    }
}

fn error_response(status: StatusCode, error: &str, details: Option<String>) -> Response {
    let body = match details {
        Some(details) => json!({ "error": error, "details": details }),
        None => json!({ "error": error }),
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use seedcheck_core::{SeedError, TestResult};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    fn test_state() -> AppState {
        let admin = PgConnectOptions::from_str("postgres://seed:pw@127.0.0.1:1/postgres").unwrap();
        let seed = SeedOptions {
            max_connections: 1,
            acquire_timeout: Duration::from_secs(1),
            ready_timeout: Duration::from_secs(1),
        };
        AppState::new(admin, seed, Duration::from_secs(5))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_test(body: &'static str) -> Request<Body> {
        Request::post("/test")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = router(test_state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let response = router(test_state())
            .oneshot(post_test("{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "invalid JSON provided"})
        );
    }

    #[tokio::test]
    async fn missing_fields_are_bad_request() {
        let response = router(test_state())
            .oneshot(post_test(r#"{"schema": "CREATE TABLE t (id INT)"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unreachable_admin_database_is_server_error() {
        let response = router(test_state())
            .oneshot(post_test(r#"{"schema": "", "mock_data": {}}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await["error"],
            "failed to provision database"
        );
    }

    #[tokio::test]
    async fn completed_run_with_findings_is_ok() {
        let result = TestResult {
            schema_valid: true,
            data_valid: false,
            errors: vec!["data test for table users failed: duplicate key".to_string()],
            ..TestResult::default()
        };
        let response = outcome_response(RunOutcome::Completed(result));
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data_valid"], false);
        assert_eq!(body["errors"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn aborted_run_is_server_error() {
        let error = SeedError::MockDataParse("expected value at line 1".to_string());
        let response = outcome_response(RunOutcome::Aborted {
            result: TestResult::default(),
            error,
        });
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({
                "error": "failed to run tests",
                "details": "failed to parse mock data: expected value at line 1"
            })
        );
    }
}
