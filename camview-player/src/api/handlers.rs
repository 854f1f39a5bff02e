//! HTTP request handlers
//!
//! Feed registry, playback control and player-signal endpoints. Every
//! playback endpoint answers with the negotiator snapshot after the request
//! was applied.

use crate::api::server::AppContext;
use crate::error::Error;
use crate::feeds::FeedRegistry;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use camview_common::events::{
    BindingId, CamviewEvent, FeedInfo, PlaybackSnapshot, PlayerSignal,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedListResponse {
    pub feeds: Vec<FeedInfo>,
    pub selected: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct AddFeedRequest {
    #[serde(default)]
    name: String,
    locator: String,
}

#[derive(Debug, Deserialize)]
pub struct LocatorRequest {
    locator: String,
}

#[derive(Debug, Deserialize)]
pub struct PlayerSignalRequest {
    binding: BindingId,
    signal: PlayerSignal,
}

type ApiError = (StatusCode, Json<StatusResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn api_error(e: Error) -> ApiError {
    let status = match &e {
        Error::FeedNotFound(_) => StatusCode::NOT_FOUND,
        Error::BadRequest(_) => StatusCode::BAD_REQUEST,
        Error::InvalidState(_) => StatusCode::CONFLICT,
        Error::NegotiatorUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        Error::Config(_) | Error::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!("Request failed: {}", e);
    } else {
        debug!("Request rejected: {}", e);
    }

    (
        status,
        Json(StatusResponse {
            status: format!("error: {}", e),
        }),
    )
}

fn publish_feeds(ctx: &AppContext, registry: &FeedRegistry, playing: bool) {
    ctx.event_bus.emit_lossy(CamviewEvent::FeedsChanged {
        feeds: registry.list(playing),
        selected: registry.selected_id(),
        timestamp: chrono::Utc::now(),
    });
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "camview-player".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Feed Endpoints
// ============================================================================

/// GET /feeds
pub async fn list_feeds(State(ctx): State<AppContext>) -> ApiResult<FeedListResponse> {
    let registry = ctx.feeds.lock().await;
    let snapshot = ctx.negotiator.snapshot().await.map_err(api_error)?;

    Ok(Json(FeedListResponse {
        feeds: registry.list(snapshot.playing_intent),
        selected: registry.selected_id(),
    }))
}

/// POST /feeds
pub async fn add_feed(
    State(ctx): State<AppContext>,
    Json(request): Json<AddFeedRequest>,
) -> Result<(StatusCode, Json<FeedInfo>), ApiError> {
    let mut registry = ctx.feeds.lock().await;
    let feed = registry
        .add(&request.name, &request.locator)
        .map_err(api_error)?;
    info!("Added feed '{}' ({})", feed.name, feed.locator);

    let snapshot = ctx.negotiator.snapshot().await.map_err(api_error)?;
    publish_feeds(&ctx, &registry, snapshot.playing_intent);

    Ok((
        StatusCode::CREATED,
        Json(FeedInfo {
            id: feed.id,
            name: feed.name,
            locator: feed.locator,
            connected: false,
        }),
    ))
}

/// DELETE /feeds/:feed_id
///
/// Removing the selected feed stops playback and clears the locator.
pub async fn remove_feed(
    State(ctx): State<AppContext>,
    Path(feed_id): Path<Uuid>,
) -> ApiResult<StatusResponse> {
    let mut registry = ctx.feeds.lock().await;
    let (feed, was_selected) = registry.remove(feed_id).map_err(api_error)?;
    info!("Removed feed '{}'", feed.name);

    let snapshot = if was_selected {
        ctx.negotiator
            .set_playing_intent(false)
            .await
            .map_err(api_error)?;
        ctx.negotiator.set_locator("").await.map_err(api_error)?
    } else {
        ctx.negotiator.snapshot().await.map_err(api_error)?
    };
    publish_feeds(&ctx, &registry, snapshot.playing_intent);

    Ok(Json(StatusResponse {
        status: "removed".to_string(),
    }))
}

/// POST /feeds/:feed_id/select
pub async fn select_feed(
    State(ctx): State<AppContext>,
    Path(feed_id): Path<Uuid>,
) -> ApiResult<PlaybackSnapshot> {
    let mut registry = ctx.feeds.lock().await;
    let feed = registry.select(feed_id).map_err(api_error)?;
    info!("Selected feed '{}'", feed.name);

    let snapshot = ctx
        .negotiator
        .set_locator(feed.locator)
        .await
        .map_err(api_error)?;
    publish_feeds(&ctx, &registry, snapshot.playing_intent);

    Ok(Json(snapshot))
}

// ============================================================================
// Playback Endpoints
// ============================================================================

/// POST /playback/connect
///
/// Rejected with 409 while no locator is set.
pub async fn connect(State(ctx): State<AppContext>) -> ApiResult<PlaybackSnapshot> {
    let registry = ctx.feeds.lock().await;
    let current = ctx.negotiator.snapshot().await.map_err(api_error)?;
    if current.locator.trim().is_empty() {
        return Err(api_error(Error::InvalidState(
            "no stream locator set".to_string(),
        )));
    }

    let snapshot = ctx
        .negotiator
        .set_playing_intent(true)
        .await
        .map_err(api_error)?;
    publish_feeds(&ctx, &registry, snapshot.playing_intent);

    Ok(Json(snapshot))
}

/// POST /playback/disconnect
pub async fn disconnect(State(ctx): State<AppContext>) -> ApiResult<PlaybackSnapshot> {
    let registry = ctx.feeds.lock().await;
    let snapshot = ctx
        .negotiator
        .set_playing_intent(false)
        .await
        .map_err(api_error)?;
    publish_feeds(&ctx, &registry, snapshot.playing_intent);

    Ok(Json(snapshot))
}

/// POST /playback/locator
///
/// A locator typed directly deselects any feed it does not belong to.
pub async fn set_locator(
    State(ctx): State<AppContext>,
    Json(request): Json<LocatorRequest>,
) -> ApiResult<PlaybackSnapshot> {
    let mut registry = ctx.feeds.lock().await;
    if registry
        .selected()
        .is_some_and(|feed| feed.locator != request.locator)
    {
        registry.clear_selection();
    }

    let snapshot = ctx
        .negotiator
        .set_locator(request.locator)
        .await
        .map_err(api_error)?;
    publish_feeds(&ctx, &registry, snapshot.playing_intent);

    Ok(Json(snapshot))
}

/// POST /playback/retry
pub async fn retry(State(ctx): State<AppContext>) -> ApiResult<PlaybackSnapshot> {
    let snapshot = ctx
        .negotiator
        .request_manual_retry()
        .await
        .map_err(api_error)?;
    Ok(Json(snapshot))
}

/// GET /playback/state
pub async fn get_playback_state(State(ctx): State<AppContext>) -> ApiResult<PlaybackSnapshot> {
    let snapshot = ctx.negotiator.snapshot().await.map_err(api_error)?;
    Ok(Json(snapshot))
}

// ============================================================================
// Player Primitive Endpoint
// ============================================================================

/// POST /player/signal
///
/// Ready / buffer-end / error from the browser media element. Signals for a
/// binding that is no longer active are accepted and ignored.
pub async fn player_signal(
    State(ctx): State<AppContext>,
    Json(request): Json<PlayerSignalRequest>,
) -> ApiResult<PlaybackSnapshot> {
    if request.signal == PlayerSignal::Error {
        warn!("Player {} reported an error", request.binding);
    }

    let snapshot = ctx
        .negotiator
        .player_signal(request.binding, request.signal)
        .await
        .map_err(api_error)?;
    Ok(Json(snapshot))
}
