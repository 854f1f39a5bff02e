//! # Camview Player Library (camview-player)
//!
//! Negotiates browser playback of camera feeds through a relay that
//! republishes each feed twice: a low-latency primary output and an HLS
//! fallback output.
//!
//! **Architecture:** a synchronous negotiator state machine owned by a single
//! tokio task, fronted by an axum HTTP/SSE API.

pub mod api;
pub mod error;
pub mod feeds;
pub mod negotiator;
pub mod service;

pub use error::{Error, Result};
pub use negotiator::Negotiator;
pub use service::NegotiatorHandle;
