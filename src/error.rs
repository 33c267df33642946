//! # Error Types
//!
//! Error taxonomy for the framework core. Nothing in this crate throws
//! across a component boundary: handler failures are logged and reduced to
//! no-ops, configuration mistakes become sentinel returns, and transition
//! failures surface as notifications. These types carry the detail that
//! ends up in the log lines and notification payloads.

use thiserror::Error;

/// Failure produced by a resolved action handler.
///
/// Handlers return `Result<ActionOutcome, HandlerError>`; the invoker logs
/// the error and converts it to a no-op outcome, so sibling actions and
/// later drain passes keep running.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A named action failed with a message.
    #[error("action `{action}` failed: {message}")]
    Failed { action: String, message: String },

    /// Free-form handler failure.
    #[error("{0}")]
    Message(String),
}

impl HandlerError {
    /// Build a free-form handler error.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Build a handler error attributed to a named action.
    pub fn failed(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            action: action.into(),
            message: message.into(),
        }
    }
}

/// Failure while fetching page content through the [`Loader`] collaborator.
///
/// [`Loader`]: crate::collab::Loader
#[derive(Debug, Error)]
pub enum LoadError {
    /// Transport-level failure from the HTTP client.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(u16),

    /// No content is known for the requested URL (static/test loaders).
    #[error("no content registered for `{0}`")]
    Missing(String),
}

/// Failure while parsing fetched content in the DOM collaborator.
#[derive(Debug, Error)]
pub enum DomError {
    /// The fetched payload could not be parsed as a document fragment.
    #[error("failed to parse fetched content: {0}")]
    Parse(String),
}
