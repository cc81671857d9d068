use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use crate::engine::State as EngineState;

/// Response for the /v1/ping endpoint
#[derive(Serialize)]
struct PingResponse {
    status: String,
}

/// Response for the /v1/info endpoint
#[derive(Serialize)]
struct InfoResponse {
    version: String,
    hostname: String,
}

/// Error body for unknown rooms
#[derive(Serialize)]
struct NotFoundResponse {
    error: String,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    version: &'static str,
    engine_state: watch::Receiver<Arc<EngineState>>,
}

/// Handler for GET /v1/ping
#[tracing::instrument]
async fn ping() -> impl IntoResponse {
    tracing::debug!("Handling /v1/ping request");
    (
        StatusCode::OK,
        Json(PingResponse {
            status: "ok".to_string(),
        }),
    )
}

/// Handler for GET /v1/info
#[tracing::instrument(skip(state))]
async fn info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    tracing::debug!("Handling /v1/info request");

    let hostname = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());

    (
        StatusCode::OK,
        Json(InfoResponse {
            version: state.version.to_string(),
            hostname,
        }),
    )
}

/// Handler for GET /v1/rooms
#[tracing::instrument(skip(state))]
async fn rooms(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    tracing::debug!("Handling /v1/rooms request");
    let snapshot = state.engine_state.borrow().clone();
    (StatusCode::OK, Json(EngineState::clone(&snapshot)))
}

/// Handler for GET /v1/rooms/:name
#[tracing::instrument(skip(state))]
async fn room(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> impl IntoResponse {
    tracing::debug!("Handling /v1/rooms/{} request", name);
    let snapshot = state.engine_state.borrow().clone();
    match snapshot.rooms.get(&name) {
        Some(report) => (StatusCode::OK, Json(report.clone())).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(NotFoundResponse {
                error: format!("no report for room '{}'", name),
            }),
        )
            .into_response(),
    }
}

/// Create the API router with all endpoints
fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/ping", get(ping))
        .route("/v1/info", get(info))
        .route("/v1/rooms", get(rooms))
        .route("/v1/rooms/:name", get(room))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP status API
///
/// The API is read-only: it serves the latest engine snapshot and never
/// changes room state. It runs until the provided shutdown signal fires.
///
/// # Arguments
/// * `listen` - The IP address to listen on (e.g., "127.0.0.1")
/// * `port` - The port to listen on (e.g., 8565)
/// * `engine_state` - Receiver for the engine's state snapshots
/// * `shutdown_rx` - A oneshot receiver that will trigger graceful shutdown
pub async fn serve(
    listen: String,
    port: u16,
    engine_state: watch::Receiver<Arc<EngineState>>,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let version = env!("CARGO_PKG_VERSION");

    let state = Arc::new(AppState {
        version,
        engine_state,
    });
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", listen, port).parse()?;
    tracing::info!("Starting HTTP API server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
            tracing::info!("HTTP API server shutting down gracefully");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::control::AcState;
    use crate::control::LightState;
    use crate::control::Report;

    fn router_with(state: EngineState) -> Router {
        let (_tx, rx) = watch::channel(Arc::new(state));
        create_router(Arc::new(AppState {
            version: "test",
            engine_state: rx,
        }))
    }

    fn sample_state() -> EngineState {
        let report = Report {
            room: "Living Room".to_string(),
            temperature: 29.0,
            occupied: true,
            light_level: 50,
            ac: AcState::Cooling,
            lights: LightState::On,
        };
        EngineState {
            hour: Some(17),
            rooms: [(report.room.clone(), report)].into_iter().collect(),
        }
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_ping() {
        let (status, body) = get_json(router_with(EngineState::default()), "/v1/ping").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_info_reports_version() {
        let (status, body) = get_json(router_with(EngineState::default()), "/v1/info").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], "test");
        assert!(body["hostname"].is_string());
    }

    #[tokio::test]
    async fn test_rooms_snapshot() {
        let (status, body) = get_json(router_with(sample_state()), "/v1/rooms").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({
                "hour": 17,
                "rooms": {
                    "Living Room": {
                        "room": "Living Room",
                        "temperature": 29.0,
                        "occupied": true,
                        "light_level": 50,
                        "ac": "COOLING",
                        "lights": "ON"
                    }
                }
            })
        );
    }

    #[tokio::test]
    async fn test_single_room() {
        let (status, body) = get_json(router_with(sample_state()), "/v1/rooms/Living%20Room").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ac"], "COOLING");

        let (status, body) = get_json(router_with(sample_state()), "/v1/rooms/Attic").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "no report for room 'Attic'");
    }
}
