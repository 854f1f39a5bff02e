//! Error types for camview-player
//!
//! The negotiator itself never fails: malformed locators and delivery
//! failures are states, not errors. These variants cover the service around it.

use thiserror::Error;

/// Main error type for camview-player
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(#[from] camview_common::Error),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Feed id not in the registry
    #[error("Feed not found: {0}")]
    FeedNotFound(uuid::Uuid),

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request not valid in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Negotiator task is no longer running
    #[error("Negotiator unavailable")]
    NegotiatorUnavailable,
}

/// Convenience Result type using camview-player Error
pub type Result<T> = std::result::Result<T, Error>;
