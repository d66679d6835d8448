//! HTTP route definitions

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, warn};

use crate::app::AppState;
use crate::game::telemetry::TelemetryPayload;
use crate::game::timers::{self, DerivedTimers};
use crate::game::OperatingMode;
use crate::util::time::uptime_secs;
use crate::ws::handler::{control_ws_handler, telemetry_ws_handler};
use crate::ws::hub::Channel;

/// Telemetry body size cap
const MAX_TELEMETRY_BYTES: usize = 5 * 1024 * 1024;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = build_cors(&state.config.client_origin);

    Router::new()
        .route("/health", get(health_handler))
        .route("/timers", get(timers_handler))
        .route("/game_state", post(game_state_handler))
        .route("/ws/telemetry", get(telemetry_ws_handler))
        .route("/ws/control", get(control_ws_handler))
        .layer(DefaultBodyLimit::max(MAX_TELEMETRY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS configuration - "*" is permissive, otherwise comma-separated origins
fn build_cors(client_origin: &str) -> CorsLayer {
    if client_origin.trim() == "*" {
        return CorsLayer::permissive();
    }

    let allowed_origins: Vec<header::HeaderValue> = client_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<header::HeaderValue>().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// ============================================================================
// Telemetry ingestion
// ============================================================================

/// GSI push endpoint. Content type varies between game installs, so the body
/// is taken raw and parsed as JSON either way.
async fn game_state_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, AppError> {
    if body.is_empty() {
        return Err(AppError::InvalidPayload("empty telemetry body".to_string()));
    }

    let payload: TelemetryPayload = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Failed to parse telemetry body");
        AppError::InvalidPayload(e.to_string())
    })?;

    // Accepted but not merged: an incomplete push must not look like an
    // error to the sender.
    let (Some(map), Some(roshan)) = (payload.map, payload.roshan) else {
        debug!("Telemetry push missing map/roshan sections, skipping merge");
        return Ok("received, missing map/roshan sections");
    };

    let projections = state.store.merge_telemetry(map, roshan.alive);
    state.hub.broadcast(&projections);

    Ok("OK")
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    mode: OperatingMode,
    game_time: i64,
    overlay_viewers: usize,
    control_viewers: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let (game_time, _) = state.store.clock_and_roshan();

    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        mode: state.store.mode(),
        game_time,
        overlay_viewers: state.hub.count(Channel::Telemetry),
        control_viewers: state.hub.count(Channel::Control),
    })
}

// ============================================================================
// Derived timers (read-only view)
// ============================================================================

async fn timers_handler(State(state): State<AppState>) -> Json<DerivedTimers> {
    let (game_time, roshan) = state.store.clock_and_roshan();
    Json(timers::derive(game_time, &roshan))
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::InvalidPayload(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
