//! Herald Test - Shared test utilities for the Herald event registry.
//!
//! This crate provides call-recording listeners and test helpers that can be
//! used across Herald crates as a dev-dependency.
//!
//! # Usage
//!
//! ```rust
//! use herald_events::{EventRegistry, args};
//! use herald_test::{Call, CallLog};
//!
//! let log = CallLog::new();
//! let registry = EventRegistry::new();
//!
//! registry.on("tick", &log.recorder("L1"));
//! registry.emit("tick", &args![1]).unwrap();
//!
//! assert_eq!(log.calls(), vec![Call::new("L1", args![1])]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod harness;
pub mod mocks;

pub use harness::*;
pub use mocks::*;
