//! Recording listeners for testing dispatch behaviour.

use std::sync::{Arc, Mutex, OnceLock};

use herald_events::{DynamicArgs, Listener};

/// A single recorded listener invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Call<A = DynamicArgs> {
    /// Label of the listener that ran.
    pub label: String,
    /// Arguments it received.
    pub args: A,
}

impl<A> Call<A> {
    /// Create a call record.
    pub fn new(label: impl Into<String>, args: A) -> Self {
        Self {
            label: label.into(),
            args,
        }
    }
}

/// Shared, ordered log of listener invocations.
///
/// Every listener handed out by a `CallLog` appends to the same log before
/// doing anything else, so the log reflects dispatch order across listeners.
/// Clones share the log.
#[derive(Debug)]
pub struct CallLog<A = DynamicArgs> {
    calls: Arc<Mutex<Vec<Call<A>>>>,
}

impl<A> Clone for CallLog<A> {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<A> Default for CallLog<A> {
    fn default() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<A> CallLog<A>
where
    A: Clone + Send + 'static,
{
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Listener that records its invocations under `label`.
    #[must_use]
    pub fn recorder(&self, label: &str) -> Listener<A> {
        let log = self.clone();
        let name = label.to_string();
        Listener::from_fn(move |args: &A| log.record(&name, args)).with_name(label)
    }

    /// Listener that records its invocation, then returns an error carrying
    /// `message`.
    #[must_use]
    pub fn failing(&self, label: &str, message: &str) -> Listener<A> {
        let log = self.clone();
        let name = label.to_string();
        let message = message.to_string();
        Listener::new(move |args: &A| {
            log.record(&name, args);
            Err(anyhow::anyhow!("{message}"))
        })
        .with_name(label)
    }

    /// Listener that records its invocation, then panics with `message`.
    #[must_use]
    pub fn panicking(&self, label: &str, message: &str) -> Listener<A> {
        let log = self.clone();
        let name = label.to_string();
        let message = message.to_string();
        Listener::from_fn(move |args: &A| {
            log.record(&name, args);
            panic!("{message}");
        })
        .with_name(label)
    }

    /// All recorded calls, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<Call<A>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Labels of all recorded calls, oldest first.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|c| c.iter().map(|call| call.label.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of recorded calls for `label`.
    #[must_use]
    pub fn count(&self, label: &str) -> usize {
        self.calls
            .lock()
            .map(|c| c.iter().filter(|call| call.label == label).count())
            .unwrap_or_default()
    }

    /// Total number of recorded calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    /// Check if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget all recorded calls.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.calls.lock() {
            guard.clear();
        }
    }

    fn record(&self, label: &str, args: &A) {
        if let Ok(mut guard) = self.calls.lock() {
            guard.push(Call::new(label, args.clone()));
        }
    }
}

/// Late-bound slot for a listener that needs its own handle.
///
/// A listener closure cannot capture the handle it is about to become part
/// of. Capture a clone of the slot instead, then [`fill`](Self::fill) it once
/// the handle exists.
#[derive(Debug)]
pub struct ListenerSlot<A = DynamicArgs> {
    inner: Arc<OnceLock<Listener<A>>>,
}

impl<A> Clone for ListenerSlot<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> Default for ListenerSlot<A> {
    fn default() -> Self {
        Self {
            inner: Arc::new(OnceLock::new()),
        }
    }
}

impl<A> ListenerSlot<A> {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the handle. Later calls are ignored.
    pub fn fill(&self, listener: &Listener<A>) {
        let _ = self.inner.set(listener.clone());
    }

    /// Get the stored handle, if filled.
    #[must_use]
    pub fn get(&self) -> Option<&Listener<A>> {
        self.inner.get()
    }
}
