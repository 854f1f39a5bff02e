//! HTTP server setup and routing
//!
//! Sets up the axum router for feed management, playback control, player
//! signals and the SSE event stream.

use crate::error::{Error, Result};
use crate::feeds::FeedRegistry;
use crate::service::NegotiatorHandle;
use axum::{
    routing::{delete, get, post},
    Router,
};
use camview_common::events::EventBus;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    /// Negotiator task
    pub negotiator: NegotiatorHandle,
    /// Registered feeds; also serializes feed + negotiator updates
    pub feeds: Arc<Mutex<FeedRegistry>>,
    /// Event broadcaster for SSE
    pub event_bus: EventBus,
}

impl AppContext {
    pub fn new(negotiator: NegotiatorHandle, event_bus: EventBus) -> Self {
        Self {
            negotiator,
            feeds: Arc::new(Mutex::new(FeedRegistry::new())),
            event_bus,
        }
    }
}

/// Build application router
pub fn build_router(ctx: AppContext) -> Router {
    use super::handlers;

    Router::new()
        // Health endpoint
        .route("/health", get(handlers::health))

        // Feed registry
        .route("/feeds", get(handlers::list_feeds))
        .route("/feeds", post(handlers::add_feed))
        .route("/feeds/:feed_id", delete(handlers::remove_feed))
        .route("/feeds/:feed_id/select", post(handlers::select_feed))

        // Playback control
        .route("/playback/connect", post(handlers::connect))
        .route("/playback/disconnect", post(handlers::disconnect))
        .route("/playback/locator", post(handlers::set_locator))
        .route("/playback/retry", post(handlers::retry))
        .route("/playback/state", get(handlers::get_playback_state))

        // Player primitive callbacks
        .route("/player/signal", post(handlers::player_signal))

        // SSE event stream
        .route("/events", get(super::sse::event_stream))

        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        // Enable CORS for the viewer page
        .layer(CorsLayer::permissive())
}

/// Run HTTP API server until `shutdown` resolves
pub async fn run(
    port: u16,
    ctx: AppContext,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = build_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    Ok(())
}
