//! HTTP request handlers
//!
//! Implements handlers for the titling control endpoints.

use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

use crate::error::TitlerError;
use crate::scheduler::{AutonomousClock, TimeMode, TimeSource};
use crate::segment::Segmenter;
use crate::state::AppState;
use crate::vtt;

/// HTTP error type
#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    InternalError(String),
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            HttpError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(json!({ "ok": false, "error": message }))).into_response()
    }
}

impl From<TitlerError> for HttpError {
    fn from(err: TitlerError) -> Self {
        match err {
            TitlerError::InvalidRequest(msg) => HttpError::BadRequest(msg),
            TitlerError::VttRead { .. } => HttpError::BadRequest(err.to_string()),
            _ => HttpError::InternalError(err.to_string()),
        }
    }
}

/// Request body for POST /titling
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitlingRequest {
    pub vtt_path: Option<String>,
    pub time_mode: Option<String>,
    pub start_at: Option<f64>,
}

/// Response body for POST /titling
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitlingResponse {
    pub ok: bool,
    pub cues: usize,
    pub segments: usize,
    pub time_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<f64>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Version endpoint
pub async fn version_check() -> &'static str {
    concat!("op47-titler v", env!("CARGO_PKG_VERSION"))
}

/// Load a VTT file and start playback
/// POST /titling
pub async fn start_titling(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TitlingRequest>, JsonRejection>,
) -> Result<Json<TitlingResponse>, HttpError> {
    let Json(request) = body.map_err(|e| HttpError::BadRequest(e.body_text()))?;

    let vtt_path = request
        .vtt_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| TitlerError::InvalidRequest("vttPath is required".to_string()))?;

    let time_mode: TimeMode = match request.time_mode.as_deref() {
        None => TimeMode::External,
        Some(value) => value.parse().map_err(|_| {
            TitlerError::InvalidRequest("timeMode must be \"external\" or \"autonomous\"".to_string())
        })?,
    };

    let cues = vtt::load_cues(Path::new(vtt_path)).map_err(HttpError::from)?;
    let segments = Segmenter::new(&state.config.segmenter).segment_cues(&cues);

    let start_at = match time_mode {
        TimeMode::Autonomous => Some(request.start_at.unwrap_or(0.0)),
        TimeMode::External => None,
    };
    let time_source: Box<dyn TimeSource> = match time_mode {
        TimeMode::External => Box::new(state.timecode.clone()),
        TimeMode::Autonomous => Box::new(AutonomousClock::new(start_at.unwrap_or(0.0))),
    };

    let segment_count = {
        let mut scheduler = state.scheduler.lock();
        scheduler.load(segments, time_source);
        scheduler.segment_count()
    };
    state.start_ticker();

    tracing::info!(
        "Titling loaded: {} ({} cues, {} segments, {} mode)",
        vtt_path,
        cues.len(),
        segment_count,
        time_mode.as_str()
    );

    Ok(Json(TitlingResponse {
        ok: true,
        cues: cues.len(),
        segments: segment_count,
        time_mode: time_mode.as_str(),
        start_at,
    }))
}

/// Stop playback and clear the title
/// POST /titling/stop, DELETE /titling/stop
pub async fn stop_titling(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    state.stop_ticker();
    state.scheduler.lock().stop();
    tracing::info!("Titling stopped");
    Json(json!({ "ok": true, "message": "titling stopped" }))
}
