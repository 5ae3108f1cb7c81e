//! Health check endpoint handlers.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::AppState;
use crate::config::SheetsConfig;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sheets: SheetsHealth,
}

/// Sheet store status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SheetsHealth {
    /// Whether RSVPs go to Google Sheets rather than only the log.
    pub configured: bool,
    /// Sheet RSVP rows are meant for; absent in log-only mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
}

impl From<&SheetsConfig> for SheetsHealth {
    fn from(config: &SheetsConfig) -> Self {
        let configured = config.is_configured();
        Self {
            configured,
            sheet_name: configured.then(|| config.sheet_name.clone()),
        }
    }
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Full health check endpoint.
///
/// Log-only mode is a supported state, so the service reports healthy
/// either way and says which mode it is in.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sheets: SheetsHealth::from(&state.config.sheets),
    })
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// The sink is chosen at startup and the store is only contacted per
/// submission, so a running process is ready.
pub async fn ready() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ready".to_string(),
    })
}
