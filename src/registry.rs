use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

/// An opaque subscriber callback. Identity (the `Arc` allocation) is what
/// `off` matches on, so callers keep a clone of the handler they registered.
pub type EventHandler = Arc<dyn Fn(&serde_json::Value) + Send + Sync>;

/// Maps event names to ordered subscriber lists and fans inbound payloads
/// out to them.
///
/// The registry is deliberately not owned by the connection lifecycle:
/// subscriptions set up once at mount time keep receiving events after
/// automatic reconnection.
#[derive(Default)]
pub struct EventRegistry {
    handlers: Mutex<HashMap<String, Vec<EventHandler>>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for an event name.
    ///
    /// No de-duplication: registering the same handler twice means it runs
    /// twice per dispatch. Avoiding that is the caller's responsibility.
    pub fn on(&self, event: impl Into<String>, handler: EventHandler) {
        let mut handlers = self.handlers.lock().expect("registry lock poisoned");
        handlers.entry(event.into()).or_default().push(handler);
    }

    /// Removes the first registration of `handler` for `event`, matched by
    /// `Arc` identity. No-op if the event or handler is not found.
    pub fn off(&self, event: &str, handler: &EventHandler) {
        let mut handlers = self.handlers.lock().expect("registry lock poisoned");
        if let Some(list) = handlers.get_mut(event) {
            if let Some(pos) = list.iter().position(|h| Arc::ptr_eq(h, handler)) {
                list.remove(pos);
            }
            if list.is_empty() {
                handlers.remove(event);
            }
        }
    }

    /// Removes every handler registered for `event`.
    pub fn off_all(&self, event: &str) {
        let mut handlers = self.handlers.lock().expect("registry lock poisoned");
        handlers.remove(event);
    }

    /// Invokes every handler for `event` in registration order, synchronously
    /// on the calling context.
    ///
    /// Each invocation is isolated: a panicking handler is logged and the
    /// remaining handlers still run. Dispatch iterates a snapshot taken
    /// under the lock, so a handler may reenter `on`/`off` without
    /// corrupting the in-flight iteration.
    pub fn dispatch(&self, event: &str, payload: &serde_json::Value) {
        let snapshot: Vec<EventHandler> = {
            let handlers = self.handlers.lock().expect("registry lock poisoned");
            match handlers.get(event) {
                Some(list) => list.clone(),
                None => return,
            }
        };

        for handler in snapshot {
            if catch_unwind(AssertUnwindSafe(|| handler(payload))).is_err() {
                tracing::error!("Subscriber for '{}' panicked during dispatch", event);
            }
        }
    }

    /// Number of handlers currently registered for `event`.
    pub fn handler_count(&self, event: &str) -> usize {
        let handlers = self.handlers.lock().expect("registry lock poisoned");
        handlers.get(event).map(Vec::len).unwrap_or(0)
    }
}
