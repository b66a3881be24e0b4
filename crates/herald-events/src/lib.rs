//! Herald Events - Synchronous in-process event registry.
//!
//! This crate provides:
//! - `EventRegistry`, mapping event names to listeners
//! - Persistent and one-shot subscriptions keyed by listener identity
//! - Immediate, in-order dispatch on the caller's thread
//! - Opt-in isolation of failing listeners
//!
//! # Architecture
//!
//! A [`Listener`] is a cloneable handle around a callback. Its identity,
//! not the callback, is what the registry stores: subscribing the same
//! handle twice to one event updates the existing subscription, and the
//! handle is what you pass back to unsubscribe.
//!
//! The registry is generic over its payload. The default payload,
//! [`DynamicArgs`], is an untyped positional argument list built with
//! [`args!`]; any other type works as long as emitters and listeners agree
//! on it.
//!
//! # Example
//!
//! ```rust
//! use herald_events::{EventRegistry, Listener, ListenerOptions, args};
//!
//! let registry = EventRegistry::new();
//!
//! let greet = Listener::from_fn(|args: &herald_events::DynamicArgs| {
//!     println!("hello, {}", args[0]);
//! });
//! let welcome = Listener::from_fn(|_: &herald_events::DynamicArgs| {
//!     println!("first visit");
//! });
//!
//! registry.on("join", &greet);
//! registry.add_listener("join", &welcome, ListenerOptions::one_shot());
//!
//! registry.emit("join", &args!["ada"]).unwrap();
//! registry.emit("join", &args!["grace"]).unwrap();
//! assert_eq!(registry.listener_count("join"), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod config;
mod error;
mod listener;
mod registry;

pub use config::{DispatchMode, RegistryConfig};
pub use error::{EventsError, EventsResult};
pub use listener::{
    DynamicArgs, Listener, ListenerFn, ListenerId, ListenerOptions, ListenerResult,
};
pub use registry::EventRegistry;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
