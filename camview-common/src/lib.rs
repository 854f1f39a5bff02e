//! # Camview Common Library
//!
//! Shared code for the camview services including:
//! - Playback, notification and feed types exchanged with host UIs
//! - Event types (CamviewEvent enum) and the EventBus
//! - Bootstrap configuration loading
//! - SSE helpers

pub mod config;
pub mod error;
pub mod events;
pub mod sse;

pub use error::{Error, Result};
