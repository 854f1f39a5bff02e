//! Player primitive seam
//!
//! The media element that actually fetches and renders the stream is a black
//! box. The negotiator only tells it which URL to attach to and when to let
//! go; signals come back tagged with the binding they belong to.

use camview_common::events::{BindOptions, BindingId};

/// Opaque playback capability bound to one URL at a time
pub trait PlayerPrimitive {
    /// Attach to `url`. Called only after any previous binding was detached.
    fn bind(&mut self, binding: BindingId, url: &str, options: BindOptions);

    /// Release `binding`. Signals it emits afterwards are stale.
    fn detach(&mut self, binding: BindingId);
}
