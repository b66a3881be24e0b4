//! Registry configuration.
//!
//! Every field has a default, so an empty TOML document yields the
//! standard propagate-on-failure registry.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EventsError, EventsResult};

/// How a dispatch pass reacts to a failing listener.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Stop at the first failing listener and return its error from `emit`.
    /// Panics unwind through `emit`.
    #[default]
    Propagate,
    /// Log failing or panicking listeners and keep dispatching.
    Isolate,
}

/// Configuration for an [`EventRegistry`](crate::EventRegistry).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Failure handling during dispatch.
    pub dispatch: DispatchMode,
}

impl RegistryConfig {
    /// Create a config with the given dispatch mode.
    #[must_use]
    pub fn new(dispatch: DispatchMode) -> Self {
        Self { dispatch }
    }

    /// Config that isolates listener failures.
    #[must_use]
    pub fn isolated() -> Self {
        Self::new(DispatchMode::Isolate)
    }

    /// Parse a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::ConfigParse`] if the text is not valid TOML or
    /// names an unknown dispatch mode.
    pub fn from_toml_str(text: &str) -> EventsResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::ConfigRead`] if the file cannot be read, or
    /// [`EventsError::ConfigParse`] if its contents are invalid.
    pub fn load(path: impl AsRef<Path>) -> EventsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EventsError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), dispatch = ?config.dispatch, "Loaded registry config");
        Ok(config)
    }
}
