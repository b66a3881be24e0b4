//! Error types for the event registry.

use std::io;
use thiserror::Error;

use crate::listener::ListenerId;

/// Errors surfaced by registry operations.
#[derive(Debug, Error)]
pub enum EventsError {
    /// A listener returned an error while an event was being dispatched.
    ///
    /// The dispatch pass stopped at this listener; listeners after it were
    /// not invoked.
    #[error("Listener {listener} failed while handling '{event}': {source}")]
    ListenerFailed {
        /// Event being dispatched.
        event: String,
        /// Listener that failed.
        listener: ListenerId,
        /// Error returned by the listener.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Failed to read a registry configuration file.
    #[error("Failed to read config file at {path}: {source}")]
    ConfigRead {
        /// Path to the config file that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to parse registry configuration.
    #[error("Failed to parse registry config: {source}")]
    ConfigParse {
        /// Underlying TOML parse error.
        #[from]
        source: toml::de::Error,
    },
}

impl EventsError {
    /// Get the listener that failed, if this is a dispatch failure.
    #[must_use]
    pub fn listener(&self) -> Option<ListenerId> {
        match self {
            Self::ListenerFailed { listener, .. } => Some(*listener),
            _ => None,
        }
    }
}

/// Result type for registry operations.
pub type EventsResult<T> = Result<T, EventsError>;
