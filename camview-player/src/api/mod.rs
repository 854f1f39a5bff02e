//! HTTP/SSE API for the camera viewer
//!
//! Inbound: feed management, connect/disconnect, locator, manual retry and
//! player signals. Outbound: snapshots in responses and events over SSE.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{build_router, run, AppContext};
