
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use sweeper_storage::ReminderStore;
use tokio::net::TcpListener;

use crate::sweep::ReminderSweepJob;

struct TriggerState<S> {
    job: Arc<ReminderSweepJob<S>>,
    secret: Arc<str>,
}

impl<S> Clone for TriggerState<S> {
    fn clone(&self) -> Self {
        Self {
            job: self.job.clone(),
            secret: self.secret.clone(),
        }
    }
}

pub fn router<S: ReminderStore + 'static>(
    job: Arc<ReminderSweepJob<S>>,
    secret: impl Into<String>,
) -> Router {
    let secret: String = secret.into();
    let state = TriggerState {
        job,
        secret: Arc::from(secret),
    };

    Router::new()
        .route("/health", get(health))
        .route("/run-check", post(run_check::<S>))
        .with_state(state)
}

pub async fn serve(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    log::info!("Reminder service listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Reminder service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn run_check<S: ReminderStore + 'static>(
    State(state): State<TriggerState<S>>,
    headers: HeaderMap,
) -> Response {
    if !bearer_is_valid(&headers, &state.secret) {
        log::warn!("Rejected sweep trigger with missing or invalid credentials");
        return error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    match state.job.run().await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            log::error!("Reminder sweep failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

fn bearer_is_valid(headers: &HeaderMap, expected: &str) -> bool {
    let Some(candidate) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    else {
        return false;
    };

    !expected.is_empty() && candidate == expected
}

fn error_response(status: StatusCode, error: &str) -> Response {
    (status, Json(json!({ "error": error }))).into_response()
}
