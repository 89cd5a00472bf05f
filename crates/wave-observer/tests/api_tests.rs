//! Integration tests for the API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use wave_core::analyzer::ErrorAnalyzer;
use wave_core::config::{AnalyzerConfig, MeshConfig, MeshMode};
use wave_core::mesh::MeshSource;
use wave_core::store::{ConfigStore, JsonFileStore, MemoryStore, StoreError};
use wave_observer::hardware::HardwareProbe;
use wave_observer::router::build_router;
use wave_observer::state::AppState;
use wave_types::{ConfigDocument, CpuInfo, HardwareSnapshot, MemoryInfo};

struct FixedProbe;

impl HardwareProbe for FixedProbe {
    fn snapshot(&self) -> Option<HardwareSnapshot> {
        Some(HardwareSnapshot {
            cpu: CpuInfo {
                cpu_count_physical: Some(4),
                cpu_count_logical: 8,
                ..CpuInfo::default()
            },
            memory: MemoryInfo {
                total: 1024,
                ..MemoryInfo::default()
            },
        })
    }
}

struct AbsentProbe;

impl HardwareProbe for AbsentProbe {
    fn snapshot(&self) -> Option<HardwareSnapshot> {
        None
    }
}

struct BrokenStore;

impl ConfigStore for BrokenStore {
    fn read(&self) -> Result<ConfigDocument, StoreError> {
        Err(StoreError::Io {
            source: std::io::Error::other("disk gone"),
        })
    }

    fn write(&self, _doc: &ConfigDocument) -> Result<(), StoreError> {
        Err(StoreError::Io {
            source: std::io::Error::other("disk gone"),
        })
    }
}

fn state_with(store: Arc<dyn ConfigStore>, mesh: MeshSource) -> Arc<AppState> {
    Arc::new(AppState::with_probe(store, Arc::new(FixedProbe), mesh))
}

fn memory_state() -> Arc<AppState> {
    state_with(Arc::new(MemoryStore::new()), MeshSource::Fixed)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// ---------------------------------------------------------------------------
// POST /api/event
// ---------------------------------------------------------------------------

#[tokio::test]
async fn event_is_acknowledged() {
    let app = build_router(memory_state());

    let response = app
        .oneshot(post_json(
            "/api/event",
            &json!({"event_id": "E1", "file_path": "/a"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    assert!(json["message"].as_str().unwrap().contains("E1"));
}

#[tokio::test]
async fn event_without_body_is_rejected() {
    let app = build_router(memory_state());

    let request = Request::builder()
        .method("POST")
        .uri("/api/event")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["status"], "error");
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn event_with_invalid_json_is_rejected() {
    let app = build_router(memory_state());

    let request = Request::builder()
        .method("POST")
        .uri("/api/event")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["status"], "error");
}

#[tokio::test]
async fn event_with_empty_object_is_rejected() {
    let app = build_router(memory_state());

    let response = app
        .oneshot(post_json("/api/event", &json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn event_fields_default_to_not_available() {
    let app = build_router(memory_state());

    let response = app
        .oneshot(post_json("/api/event", &json!({"timestamp": "2025-01-01T00:00:00Z"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Event N/A processed");
}

// ---------------------------------------------------------------------------
// POST /api/error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn error_report_is_acknowledged() {
    let app = build_router(memory_state());

    let response = app
        .oneshot(post_json(
            "/api/error",
            &json!({"error_id": "ERR-7", "description": "disk full", "error_code": 28}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["message"], "Error report ERR-7 processed");
}

#[tokio::test]
async fn error_without_body_is_rejected() {
    let app = build_router(memory_state());

    let request = Request::builder()
        .method("POST")
        .uri("/api/error")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["status"], "error");
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn error_report_with_array_body_is_rejected() {
    let app = build_router(memory_state());

    let response = app
        .oneshot(post_json("/api/error", &json!([1, 2, 3])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["status"], "error");
}

// ---------------------------------------------------------------------------
// GET /api/config
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fresh_config_has_only_hardware() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("monitor_text/auto_config.json");
    let store = Arc::new(JsonFileStore::new(&path));
    let app = build_router(state_with(store, MeshSource::Fixed));

    let response = app.oneshot(get("/api/config")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    let config = json["config"].as_object().unwrap();
    assert_eq!(config.len(), 1);
    assert_eq!(config["hardware"]["cpu"]["cpu_count_logical"], 8);

    // Bootstrapped on disk without the hardware section.
    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk, json!({}));
}

#[tokio::test]
async fn config_reflects_analyzer_output() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("error.log");
    std::fs::write(&log, "error\n".repeat(6)).unwrap();
    let path = dir.path().join("auto_config.json");
    let store: Arc<dyn ConfigStore> = Arc::new(JsonFileStore::new(path));

    ErrorAnalyzer::new(&log, AnalyzerConfig::default(), Arc::clone(&store)).tick();

    let app = build_router(state_with(store, MeshSource::Fixed));
    let json = body_json(app.oneshot(get("/api/config")).await.unwrap()).await;

    let config = &json["config"];
    assert_eq!(config["ngl"], 44);
    assert_eq!(config["context_size"], 1748);
    assert_eq!(config["retries"], 6);
    assert!(config["hardware"].is_object());
}

#[tokio::test]
async fn unreadable_store_serves_empty_config() {
    let app = build_router(state_with(Arc::new(BrokenStore), MeshSource::Fixed));

    let response = app.oneshot(get("/api/config")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let config = json["config"].as_object().unwrap();
    assert_eq!(config.keys().collect::<Vec<_>>(), vec!["hardware"]);
}

#[tokio::test]
async fn missing_hardware_serves_empty_section() {
    let state = AppState::with_probe(
        Arc::new(BrokenStore),
        Arc::new(AbsentProbe),
        MeshSource::Fixed,
    );
    let app = build_router(Arc::new(state));

    let response = app.oneshot(get("/api/config")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["config"], json!({"hardware": {}}));
}

// ---------------------------------------------------------------------------
// GET /api/malla
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fixed_mesh_payload() {
    let app = build_router(memory_state());

    let response = app.oneshot(get("/api/malla")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["malla_A"][0][0]["amplitude"], 1.0);
    assert_eq!(json["malla_B"][0][0]["amplitude"], 0.5);
    assert_eq!(json["resonador"]["tipo_onda"], "FOTON_A");
}

#[tokio::test]
async fn live_mesh_payload_carries_q() {
    let mesh = MeshSource::from_config(&MeshConfig {
        mode: MeshMode::Live,
        ..MeshConfig::default()
    });
    let app = build_router(state_with(Arc::new(MemoryStore::new()), mesh));

    let json = body_json(app.oneshot(get("/api/malla")).await.unwrap()).await;

    assert_eq!(json["malla_A"].as_array().unwrap().len(), 5);
    assert!(json["malla_A"][1][1]["q"].is_number());
    assert_eq!(json["resonador"]["tipo_onda"], "senoidal");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = build_router(memory_state());

    let response = app.oneshot(get("/api/nothing")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Server lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn spawned_server_stops_on_shutdown() {
    use wave_core::schedule::Shutdown;
    use wave_observer::server::ServerConfig;
    use wave_observer::startup::spawn_observer;

    let shutdown = Arc::new(Shutdown::new());
    let config = ServerConfig {
        host: "127.0.0.1".to_owned(),
        port: 0,
    };

    let (handle, addr) = spawn_observer(&config, memory_state(), Arc::clone(&shutdown))
        .await
        .unwrap();
    assert_ne!(addr.port(), 0);

    // A second bind on the same port is a startup error.
    let taken = ServerConfig {
        host: "127.0.0.1".to_owned(),
        port: addr.port(),
    };
    assert!(spawn_observer(&taken, memory_state(), Arc::clone(&shutdown)).await.is_err());

    shutdown.trigger();
    tokio::time::timeout(std::time::Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}
