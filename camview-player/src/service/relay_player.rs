//! Player primitive hosted in the browser
//!
//! The media element lives in the viewer page. Bind/detach instructions reach
//! it as `PlayerBound` / `PlayerDetached` events over SSE, and it reports
//! ready/buffer-end/error back through `POST /player/signal`.

use crate::negotiator::PlayerPrimitive;
use camview_common::events::{BindOptions, BindingId, CamviewEvent, EventBus};
use tracing::debug;

pub struct RelayPlayer {
    event_bus: EventBus,
}

impl RelayPlayer {
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }
}

impl PlayerPrimitive for RelayPlayer {
    fn bind(&mut self, binding: BindingId, url: &str, options: BindOptions) {
        debug!("Player bind {} -> {}", binding, url);
        self.event_bus.emit_lossy(CamviewEvent::PlayerBound {
            binding,
            url: url.to_string(),
            options,
            timestamp: chrono::Utc::now(),
        });
    }

    fn detach(&mut self, binding: BindingId) {
        debug!("Player detach {}", binding);
        self.event_bus.emit_lossy(CamviewEvent::PlayerDetached {
            binding,
            timestamp: chrono::Utc::now(),
        });
    }
}
