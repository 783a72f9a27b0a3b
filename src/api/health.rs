//! Liveness and readiness endpoints

use std::time::{Duration, Instant};

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::api::types::Json;

use super::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<HealthCheck>,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    fn status_code(self) -> StatusCode {
        match self {
            Self::Healthy => StatusCode::OK,
            Self::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Result of checking one dependency
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: &'static str,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub latency_ms: u64,
}

impl HealthCheck {
    fn new<E>(name: &'static str, result: Result<(), E>, elapsed: Duration) -> Self
    where
        E: std::fmt::Display,
    {
        let latency_ms = elapsed.as_millis() as u64;

        match result {
            Ok(()) => Self {
                name,
                status: HealthStatus::Healthy,
                message: None,
                latency_ms,
            },
            Err(e) => {
                // Detail stays in the log; callers only see that it failed
                tracing::warn!(check = name, error = %e, "Readiness check failed");
                Self {
                    name,
                    status: HealthStatus::Unhealthy,
                    message: Some("unreachable"),
                    latency_ms,
                }
            }
        }
    }
}

impl HealthResponse {
    fn from_checks(checks: Vec<HealthCheck>) -> Self {
        let status = if checks.iter().all(|c| c.status == HealthStatus::Healthy) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };

        Self {
            status,
            version: VERSION,
            checks,
        }
    }
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse::from_checks(Vec::new())))
}

/// GET /ready
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let result = state.credential_service.ping().await;
    let storage = HealthCheck::new("storage", result, start.elapsed());

    let response = HealthResponse::from_checks(vec![storage]);
    (response.status.status_code(), Json(response))
}

/// GET /live
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}
