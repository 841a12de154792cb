// HTTP + WebSocket routes

mod http;
mod ws;

pub use ws::{CLOSE_TOO_MANY_CONNECTIONS, REJECTION_TEXT, SessionGuard, try_admit};

use axum::{Router, routing::get};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize};
use tower_http::cors::{Any, CorsLayer};

use crate::collector::SnapshotCollector;
use crate::config::AppConfig;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) collector: Arc<SnapshotCollector>,
    pub(crate) open_sessions: Arc<AtomicUsize>,
    pub(crate) next_session_id: Arc<AtomicU64>,
    pub(crate) config: AppConfig,
}

pub fn app(
    collector: Arc<SnapshotCollector>,
    open_sessions: Arc<AtomicUsize>,
    config: AppConfig,
) -> Router {
    let state = AppState {
        collector,
        open_sessions,
        next_session_id: Arc::new(AtomicU64::new(1)),
        config,
    };
    Router::new()
        .route("/", get(ws::ws_status)) // WS /
        .route("/version", get(http::version_handler)) // GET /version
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
