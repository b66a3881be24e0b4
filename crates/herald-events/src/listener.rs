//! Listener handles, identities, and registration options.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Untyped positional argument list, the default registry payload.
///
/// Emitters and listeners agree on the shape of the list per event name.
/// Build one with [`args!`](crate::args).
pub type DynamicArgs = Vec<Value>;

/// Result returned by a listener body.
pub type ListenerResult = anyhow::Result<()>;

/// Callable stored behind a [`Listener`] handle.
pub type ListenerFn<A> = dyn Fn(&A) -> ListenerResult + Send + Sync;

/// Identity of a listener handle.
///
/// Every handle constructed with [`Listener::new`] or [`Listener::from_fn`]
/// gets a fresh identity; clones of a handle share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(Uuid);

impl ListenerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener:{}", self.0)
    }
}

/// A cloneable handle to a listener callback.
///
/// The registry keys subscriptions by the handle's [`ListenerId`], so keep
/// the handle (or a clone) around to unsubscribe later. Two handles built
/// from identical closures are still two different listeners.
///
/// # Example
///
/// ```rust
/// use herald_events::{Listener, args, EventRegistry};
///
/// let registry = EventRegistry::new();
/// let listener = Listener::from_fn(|args: &herald_events::DynamicArgs| {
///     println!("tick {:?}", args);
/// })
/// .with_name("ticker");
///
/// registry.on("tick", &listener);
/// registry.emit("tick", &args![1]).unwrap();
/// registry.off("tick", Some(&listener));
/// ```
pub struct Listener<A = DynamicArgs> {
    id: ListenerId,
    name: Arc<str>,
    handler: Arc<ListenerFn<A>>,
}

impl<A> Listener<A> {
    /// Create a listener from a fallible callback.
    ///
    /// An `Err` returned by the callback surfaces from
    /// [`EventRegistry::emit`](crate::EventRegistry::emit) unless the
    /// registry isolates listener failures.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&A) -> ListenerResult + Send + Sync + 'static,
    {
        Self {
            id: ListenerId::new(),
            name: Arc::from("anonymous"),
            handler: Arc::new(handler),
        }
    }

    /// Create a listener from a callback that cannot fail.
    pub fn from_fn<F>(handler: F) -> Self
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        Self::new(move |args| {
            handler(args);
            Ok(())
        })
    }

    /// Attach a debug name, used in log output.
    ///
    /// The name plays no part in identity.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Arc::from(name.into());
        self
    }

    /// Get the listener identity.
    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Get the debug name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the callback directly.
    ///
    /// # Errors
    ///
    /// Returns whatever error the callback returns.
    pub fn call(&self, args: &A) -> ListenerResult {
        (self.handler)(args)
    }
}

impl<A> Clone for Listener<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: Arc::clone(&self.name),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<A> PartialEq for Listener<A> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<A> Eq for Listener<A> {}

impl<A> fmt::Debug for Listener<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Options accepted by the `add_listener` family of registration calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerOptions {
    /// Remove the subscription right before its first invocation.
    pub once: bool,
}

impl ListenerOptions {
    /// Options for a persistent subscription.
    #[must_use]
    pub fn persistent() -> Self {
        Self { once: false }
    }

    /// Options for a one-shot subscription.
    #[must_use]
    pub fn one_shot() -> Self {
        Self { once: true }
    }
}

impl From<bool> for ListenerOptions {
    fn from(once: bool) -> Self {
        Self { once }
    }
}

/// Build a [`DynamicArgs`] list from values that serialize to JSON.
///
/// ```rust
/// use herald_events::args;
///
/// let list = args![1, "two", true];
/// assert_eq!(list.len(), 3);
/// assert_eq!(list[1], "two");
/// assert!(args![].is_empty());
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::DynamicArgs::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::__private::serde_json::json!($arg)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_distinct_handles_have_distinct_ids() {
        let a = Listener::<DynamicArgs>::from_fn(|_| {});
        let b = Listener::<DynamicArgs>::from_fn(|_| {});

        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }

    #[test]
    fn test_clone_shares_identity() {
        let a = Listener::<DynamicArgs>::from_fn(|_| {}).with_name("a");
        let b = a.clone();

        assert_eq!(a.id(), b.id());
        assert_eq!(a, b);
        assert_eq!(b.name(), "a");
    }

    #[test]
    fn test_default_name() {
        let listener = Listener::<u32>::from_fn(|_| {});
        assert_eq!(listener.name(), "anonymous");
    }

    #[test]
    fn test_call_forwards_args() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);

        let listener = Listener::<usize>::from_fn(move |n| {
            seen_clone.fetch_add(*n, Ordering::SeqCst);
        });

        listener.call(&3).unwrap();
        listener.call(&4).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_call_returns_listener_error() {
        let listener = Listener::<()>::new(|_| anyhow::bail!("boom"));

        let err = listener.call(&()).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_listener_id_display() {
        let listener = Listener::<()>::from_fn(|_| {});
        let shown = listener.id().to_string();

        assert!(shown.starts_with("listener:"));
        assert!(shown.ends_with(&listener.id().as_uuid().to_string()));
    }

    #[test]
    fn test_listener_options() {
        assert!(!ListenerOptions::default().once);
        assert_eq!(ListenerOptions::default(), ListenerOptions::persistent());
        assert!(ListenerOptions::one_shot().once);
        assert_eq!(ListenerOptions::from(true), ListenerOptions::one_shot());
    }

    #[test]
    fn test_listener_options_deserialize() {
        let opts: ListenerOptions = serde_json::from_str(r#"{"once": true}"#).unwrap();
        assert!(opts.once);

        // Missing field falls back to a persistent subscription
        let opts: ListenerOptions = serde_json::from_str("{}").unwrap();
        assert!(!opts.once);
    }

    #[test]
    fn test_args_macro() {
        let list = crate::args![1, "two", [3, 4]];

        assert_eq!(list.len(), 3);
        assert_eq!(list[0], 1);
        assert_eq!(list[1], "two");
        assert_eq!(list[2], serde_json::json!([3, 4]));
        assert!(crate::args![].is_empty());
    }
}
