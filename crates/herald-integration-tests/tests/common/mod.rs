//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use herald_events::{DynamicArgs, EventRegistry, Listener, RegistryConfig};
use herald_test::CallLog;

/// A registry shared behind an `Arc`, with a call log for its listeners.
pub struct Fixture {
    /// The registry under test.
    pub registry: Arc<EventRegistry>,
    /// Log shared by every listener the fixture hands out.
    pub log: CallLog,
}

impl Fixture {
    /// Fixture with a default (propagating) registry.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Fixture with a custom registry config.
    pub fn with_config(config: RegistryConfig) -> Self {
        herald_test::setup_test_logging("herald_events=trace");
        Self {
            registry: Arc::new(EventRegistry::with_config(config)),
            log: CallLog::new(),
        }
    }

    /// Recording listener labelled `label`.
    pub fn recorder(&self, label: &str) -> Listener<DynamicArgs> {
        self.log.recorder(label)
    }
}
