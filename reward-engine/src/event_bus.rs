//! # In-process Event Bus
//!
//! A registry of named events, each with an ordered list of handlers. Publishing delivers the
//! payload synchronously to every handler registered under that name, in registration order,
//! before `publish` returns.
//!
//! Handlers are isolated from each other and from the emitter: a handler that returns an error
//! or panics is logged and reported to the observability sink, and the remaining handlers still
//! run. Publishing a name nobody listens to is a no-op.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use log::{debug, error};

use crate::error::BoxError;
use crate::observability::{AuditEvent, ObservabilitySink};

/// A registered callback.
pub type Handler<P> = Arc<dyn Fn(&P) -> Result<(), BoxError> + Send + Sync>;

/// Delivery summary of one `publish` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Handlers that completed successfully.
    pub delivered: usize,
    /// Handlers that returned an error or panicked.
    pub failed: usize,
}

/// Synchronous, name-keyed event dispatcher.
pub struct EventBus<P> {
    handlers: RwLock<HashMap<String, Vec<Handler<P>>>>,
    sink: Arc<dyn ObservabilitySink>,
}

impl<P> EventBus<P> {
    /// Creates a bus with no handlers.
    pub fn new(sink: Arc<dyn ObservabilitySink>) -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            sink,
        }
    }

    /// Appends `handler` to the handlers of `event_name`.
    pub fn register<F>(&self, event_name: impl Into<String>, handler: F)
    where
        F: Fn(&P) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let event_name = event_name.into();
        debug!("Registering handler for '{}'", event_name);
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event_name)
            .or_default()
            .push(Arc::new(handler));
    }

    /// Number of handlers currently registered for `event_name`.
    pub fn handler_count(&self, event_name: &str) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event_name)
            .map_or(0, Vec::len)
    }

    /// Delivers `payload` to every handler of `event_name`, in registration order.
    ///
    /// The handler list is snapshotted first, so handlers may register further handlers without
    /// deadlocking; those only see later publishes.
    pub fn publish(&self, event_name: &str, payload: &P) -> PublishReport {
        let handlers: Vec<Handler<P>> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event_name)
            .cloned()
            .unwrap_or_default();

        let mut report = PublishReport::default();

        for (handler_index, handler) in handlers.iter().enumerate() {
            let failure = match catch_unwind(AssertUnwindSafe(|| handler(payload))) {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(panic) => Some(format!("handler panicked: {}", panic_message(panic.as_ref()))),
            };

            match failure {
                None => report.delivered += 1,
                Some(message) => {
                    error!(
                        "Error in {} event handler #{}: {}",
                        event_name, handler_index, message
                    );
                    self.sink.emit(AuditEvent::HandlerFailed {
                        event_name: event_name.to_string(),
                        handler_index,
                        error: message,
                    });
                    report.failed += 1;
                }
            }
        }

        report
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
