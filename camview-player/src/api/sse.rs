//! Server-Sent Events (SSE) endpoint
//!
//! Streams negotiator, notification, player and feed events to the viewer page.

use crate::api::server::AppContext;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

/// GET /events - SSE event stream
pub async fn event_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    camview_common::sse::create_event_sse_stream(&ctx.event_bus, "camview-player")
}
