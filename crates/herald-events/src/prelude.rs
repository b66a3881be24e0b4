//! Prelude module - commonly used types for convenient import.
//!
//! Use `use herald_events::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use herald_events::prelude::*;
//!
//! let registry = EventRegistry::<u32>::with_config(RegistryConfig::isolated());
//! let listener = Listener::new(|n: &u32| {
//!     anyhow::ensure!(*n > 0, "zero is not allowed");
//!     Ok(())
//! });
//!
//! registry.on("count", &listener);
//! registry.emit("count", &0).unwrap();
//! ```

// Registry
pub use crate::{DispatchMode, EventRegistry, RegistryConfig};

// Listeners
pub use crate::{DynamicArgs, Listener, ListenerId, ListenerOptions, ListenerResult, args};

// Errors
pub use crate::{EventsError, EventsResult};
