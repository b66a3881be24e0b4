//! Event registry mapping event names to listeners.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace, warn};

use crate::config::{DispatchMode, RegistryConfig};
use crate::error::{EventsError, EventsResult};
use crate::listener::{DynamicArgs, Listener, ListenerId, ListenerOptions};

/// A listener paired with its one-shot flag.
struct Subscription<A> {
    listener: Listener<A>,
    once: bool,
    /// Registry-wide insertion order. A listener removed and subscribed again
    /// gets a new value.
    seq: u64,
}

/// Registry of listeners keyed by event name, with synchronous dispatch.
///
/// Listeners for an event run in the order they were first subscribed.
/// Registering a listener that is already subscribed to an event only
/// updates its one-shot flag; it keeps its place in the order.
///
/// All methods take `&self`. The internal lock is released before any
/// listener runs, so a listener may subscribe, unsubscribe, or emit on the
/// same registry while it is being dispatched. Share the registry through an
/// `Arc` (and a `Weak` inside listeners) when that is needed.
///
/// Methods panic if the internal lock has been poisoned.
///
/// # Example
///
/// ```rust
/// use herald_events::{EventRegistry, Listener};
///
/// let registry = EventRegistry::<u32>::new();
/// let listener = Listener::from_fn(|n: &u32| println!("tick {n}"));
///
/// registry.on("tick", &listener);
/// registry.emit("tick", &1).unwrap();
///
/// registry.once("tick", &listener);
/// registry.emit("tick", &2).unwrap();
/// assert_eq!(registry.listener_count("tick"), 0);
/// ```
pub struct EventRegistry<A = DynamicArgs> {
    subscriptions: RwLock<HashMap<String, Vec<Subscription<A>>>>,
    next_seq: AtomicU64,
    config: RegistryConfig,
}

impl<A> std::fmt::Debug for EventRegistry<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (events, subscriptions) = self
            .subscriptions
            .read()
            .map(|s| (s.len(), s.values().map(Vec::len).sum::<usize>()))
            .unwrap_or_default();
        f.debug_struct("EventRegistry")
            .field("event_count", &events)
            .field("subscription_count", &subscriptions)
            .field("dispatch", &self.config.dispatch)
            .finish()
    }
}

impl<A> Default for EventRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> EventRegistry<A> {
    /// Create an empty registry that propagates listener failures.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with the given configuration.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
            config,
        }
    }

    /// Get the registry configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Subscribe `listener` to `event` until it is explicitly removed.
    ///
    /// If the listener is already subscribed to `event` its one-shot flag is
    /// cleared instead of adding a second entry.
    pub fn subscribe(&self, event: &str, listener: &Listener<A>) {
        self.insert(event, listener, false);
    }

    /// Subscribe `listener` to `event` for a single invocation.
    ///
    /// The subscription is removed right before the listener is invoked, so
    /// a listener that subscribes itself again from inside its own call keeps
    /// the new subscription.
    pub fn subscribe_once(&self, event: &str, listener: &Listener<A>) {
        self.insert(event, listener, true);
    }

    /// Remove subscriptions from `event`.
    ///
    /// With `Some(listener)` only that listener is removed; with `None` every
    /// listener for `event` is removed. Unknown events and listeners are
    /// ignored.
    ///
    /// Returns `true` if anything was removed.
    pub fn unsubscribe(&self, event: &str, listener: Option<&Listener<A>>) -> bool {
        let mut subs = self.write();

        // Removed entries are dropped after the lock is released so that a
        // listener's destructor can use the registry.
        let removed: Vec<Subscription<A>> = match listener {
            Some(listener) => {
                let Some(entries) = subs.get_mut(event) else {
                    return false;
                };
                let Some(pos) = entries
                    .iter()
                    .position(|s| s.listener.id() == listener.id())
                else {
                    return false;
                };
                let removed = entries.remove(pos);
                if entries.is_empty() {
                    subs.remove(event);
                }
                vec![removed]
            },
            None => subs.remove(event).unwrap_or_default(),
        };
        drop(subs);

        match listener {
            Some(listener) if !removed.is_empty() => {
                debug!(
                    event,
                    listener = %listener.id(),
                    listener_name = %listener.name(),
                    "Listener unsubscribed"
                );
            },
            None if !removed.is_empty() => {
                debug!(event, count = removed.len(), "All listeners unsubscribed");
            },
            _ => {},
        }

        !removed.is_empty()
    }

    /// Dispatch `args` to every listener subscribed to `event`.
    ///
    /// Listeners run synchronously, in subscription order. The set of
    /// listeners is fixed when the pass starts: a listener removed by an
    /// earlier listener in the same pass is skipped, and a listener added
    /// during the pass is first invoked by the next `emit`. One-shot
    /// subscriptions are removed right before their listener runs.
    ///
    /// Emitting an event with no listeners does nothing.
    ///
    /// # Errors
    ///
    /// With [`DispatchMode::Propagate`] (the default) the first listener to
    /// return an error stops the pass, and the error is returned as
    /// [`EventsError::ListenerFailed`]. Listeners after it are not invoked.
    /// With [`DispatchMode::Isolate`] failures are logged and this never
    /// returns an error.
    ///
    /// # Panics
    ///
    /// A panicking listener unwinds through `emit` unless the registry
    /// isolates failures.
    pub fn emit(&self, event: &str, args: &A) -> EventsResult<()> {
        let pending: Vec<(ListenerId, u64)> = {
            let subs = self.read();
            let Some(entries) = subs.get(event) else {
                trace!(event, "No listeners for event");
                return Ok(());
            };
            entries.iter().map(|s| (s.listener.id(), s.seq)).collect()
        };

        trace!(event, listener_count = pending.len(), "Emitting event");

        for (id, seq) in pending {
            let Some(listener) = self.claim(event, id, seq) else {
                continue;
            };
            self.dispatch(event, &listener, args)?;
        }

        Ok(())
    }

    /// Alias for [`subscribe`](Self::subscribe).
    pub fn on(&self, event: &str, listener: &Listener<A>) {
        self.subscribe(event, listener);
    }

    /// Alias for [`subscribe_once`](Self::subscribe_once).
    pub fn once(&self, event: &str, listener: &Listener<A>) {
        self.subscribe_once(event, listener);
    }

    /// Alias for [`unsubscribe`](Self::unsubscribe).
    pub fn off(&self, event: &str, listener: Option<&Listener<A>>) -> bool {
        self.unsubscribe(event, listener)
    }

    /// Subscribe persistently or once, according to `options`.
    pub fn add_listener(&self, event: &str, listener: &Listener<A>, options: ListenerOptions) {
        if options.once {
            self.subscribe_once(event, listener);
        } else {
            self.subscribe(event, listener);
        }
    }

    /// Alias for [`add_listener`](Self::add_listener).
    pub fn add_event_listener(
        &self,
        event: &str,
        listener: &Listener<A>,
        options: ListenerOptions,
    ) {
        self.add_listener(event, listener, options);
    }

    /// Alias for [`unsubscribe`](Self::unsubscribe).
    pub fn remove_listener(&self, event: &str, listener: Option<&Listener<A>>) -> bool {
        self.unsubscribe(event, listener)
    }

    /// Alias for [`unsubscribe`](Self::unsubscribe).
    pub fn remove_event_listener(&self, event: &str, listener: Option<&Listener<A>>) -> bool {
        self.unsubscribe(event, listener)
    }

    /// Number of listeners subscribed to `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.read().get(event).map_or(0, Vec::len)
    }

    /// Check whether `listener` is subscribed to `event`.
    #[must_use]
    pub fn contains(&self, event: &str, listener: &Listener<A>) -> bool {
        self.is_once(event, listener).is_some()
    }

    /// Get the one-shot flag of `listener` on `event`.
    ///
    /// Returns `None` if the listener is not subscribed to `event`.
    #[must_use]
    pub fn is_once(&self, event: &str, listener: &Listener<A>) -> Option<bool> {
        self.read()
            .get(event)?
            .iter()
            .find(|s| s.listener.id() == listener.id())
            .map(|s| s.once)
    }

    /// Names of all events with at least one listener, in no particular order.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Total number of subscriptions across all events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().values().map(Vec::len).sum()
    }

    /// Check if the registry has no subscriptions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Remove every subscription for every event.
    pub fn clear(&self) {
        let removed = std::mem::take(&mut *self.write());
        drop(removed);
        debug!("All subscriptions cleared");
    }

    fn insert(&self, event: &str, listener: &Listener<A>, once: bool) {
        let mut subs = self.write();
        let entries = subs.entry(event.to_string()).or_default();

        if let Some(existing) = entries
            .iter_mut()
            .find(|s| s.listener.id() == listener.id())
        {
            existing.once = once;
            drop(subs);
            trace!(event, listener = %listener.id(), once, "Subscription flag updated");
            return;
        }

        entries.push(Subscription {
            listener: listener.clone(),
            once,
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
        });
        drop(subs);

        debug!(
            event,
            listener = %listener.id(),
            listener_name = %listener.name(),
            once,
            "Listener subscribed"
        );
    }

    /// Fetch a listener whose subscription from the start of the pass is
    /// still in place at dispatch time.
    ///
    /// One-shot subscriptions are removed here, before the listener runs.
    fn claim(&self, event: &str, id: ListenerId, seq: u64) -> Option<Listener<A>> {
        let matches = |s: &Subscription<A>| s.seq == seq && s.listener.id() == id;

        {
            let subs = self.read();
            let sub = subs.get(event)?.iter().find(|s| matches(*s))?;
            if !sub.once {
                return Some(sub.listener.clone());
            }
        }

        // Another thread may have touched the entry since the read lock was
        // released, so look it up again.
        let mut subs = self.write();
        let entries = subs.get_mut(event)?;
        let pos = entries.iter().position(matches)?;
        if !entries.get(pos)?.once {
            return entries.get(pos).map(|s| s.listener.clone());
        }

        let claimed = entries.remove(pos);
        if entries.is_empty() {
            subs.remove(event);
        }
        Some(claimed.listener)
    }

    fn dispatch(&self, event: &str, listener: &Listener<A>, args: &A) -> EventsResult<()> {
        trace!(
            event,
            listener = %listener.id(),
            listener_name = %listener.name(),
            "Notifying listener"
        );

        match self.config.dispatch {
            DispatchMode::Propagate => listener.call(args).map_err(|error| {
                debug!(
                    event,
                    listener = %listener.id(),
                    listener_name = %listener.name(),
                    error = %error,
                    "Listener failed, stopping dispatch"
                );
                EventsError::ListenerFailed {
                    event: event.to_string(),
                    listener: listener.id(),
                    source: error.into(),
                }
            }),
            DispatchMode::Isolate => {
                match catch_unwind(AssertUnwindSafe(|| listener.call(args))) {
                    Ok(Ok(())) => {},
                    Ok(Err(error)) => {
                        warn!(
                            event,
                            listener = %listener.id(),
                            listener_name = %listener.name(),
                            error = %error,
                            "Listener failed"
                        );
                    },
                    Err(payload) => {
                        warn!(
                            event,
                            listener = %listener.id(),
                            listener_name = %listener.name(),
                            panic = panic_message(payload.as_ref()),
                            "Listener panicked"
                        );
                    },
                }
                Ok(())
            },
        }
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Vec<Subscription<A>>>> {
        self.subscriptions.read().expect("lock poisoned")
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Vec<Subscription<A>>>> {
        self.subscriptions.write().expect("lock poisoned")
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        return message;
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.as_str();
    }
    "non-string panic payload"
}
