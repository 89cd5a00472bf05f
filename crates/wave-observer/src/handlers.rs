//! REST endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/event` | Acknowledge a file-change event |
//! | `POST` | `/api/error` | Acknowledge an error report |
//! | `GET` | `/api/config` | Tuned config merged with live hardware figures |
//! | `GET` | `/api/malla` | Current mesh payload |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use chrono::Utc;
use serde_json::Value;
use tracing::{error, info};
use wave_types::{ConfigDocument, ErrorReport, EventNotice};

use crate::error::ObserverError;
use crate::state::AppState;

/// Accept only a non-empty JSON object.
fn require_object(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<ConfigDocument, ObserverError> {
    let Json(value) = payload.map_err(|e| ObserverError::InvalidBody(e.body_text()))?;
    match value {
        Value::Object(doc) if !doc.is_empty() => Ok(doc),
        Value::Object(_) => Err(ObserverError::InvalidBody("empty JSON object".to_owned())),
        _ => Err(ObserverError::InvalidBody("expected a JSON object".to_owned())),
    }
}

fn success(message: String) -> Json<Value> {
    Json(serde_json::json!({
        "status": "success",
        "message": message,
    }))
}

// ---------------------------------------------------------------------------
// POST /api/event
// ---------------------------------------------------------------------------

/// Log a file-change event and acknowledge it.
pub async fn receive_event(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ObserverError> {
    let notice = EventNotice::from_document(&require_object(payload)?);
    let timestamp = notice
        .timestamp
        .clone()
        .unwrap_or_else(|| Utc::now().to_rfc3339());

    info!(
        event_id = %notice.event_id,
        file_path = %notice.file_path,
        timestamp = %timestamp,
        suggestions = notice.suggestions.as_deref(),
        has_additional_data = notice.additional_data.is_some(),
        "Event received"
    );

    Ok(success(format!("Event {} processed", notice.event_id)))
}

// ---------------------------------------------------------------------------
// POST /api/error
// ---------------------------------------------------------------------------

/// Log an error report and acknowledge it.
pub async fn receive_error(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ObserverError> {
    let report = ErrorReport::from_document(&require_object(payload)?);
    let timestamp = report
        .timestamp
        .clone()
        .unwrap_or_else(|| Utc::now().to_rfc3339());

    info!(
        error_id = %report.error_id,
        description = %report.description,
        error_code = report.error_code.as_deref(),
        timestamp = %timestamp,
        has_additional_data = report.additional_data.is_some(),
        "Error report received"
    );

    Ok(success(format!("Error report {} processed", report.error_id)))
}

// ---------------------------------------------------------------------------
// GET /api/config
// ---------------------------------------------------------------------------

/// Return the tuned config with a fresh `hardware` section.
///
/// Never fails: an unreadable store is served as an empty document and a
/// failed probe as an empty `hardware` object. `hardware` is added to the
/// response only and is never written back.
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut config = state.store.read().unwrap_or_else(|e| {
        error!(error = %e, "Failed to read tuned config, serving empty document");
        ConfigDocument::new()
    });

    let hardware = match state.hardware.snapshot() {
        Some(snapshot) => serde_json::to_value(snapshot).unwrap_or_else(|e| {
            error!(error = %e, "Failed to serialize hardware snapshot");
            Value::Object(serde_json::Map::new())
        }),
        None => {
            error!("Hardware probe unavailable");
            Value::Object(serde_json::Map::new())
        }
    };
    config.insert("hardware".to_owned(), hardware);

    Json(serde_json::json!({
        "status": "success",
        "config": config,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/malla
// ---------------------------------------------------------------------------

/// Return the current mesh payload.
pub async fn get_malla(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ObserverError> {
    let mesh = state.mesh.snapshot().await;
    let mut body = serde_json::to_value(&mesh)?;
    if let Value::Object(map) = &mut body {
        map.insert("status".to_owned(), Value::from("success"));
    }
    Ok(Json(body))
}
