//! Empty-state observation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::dispatch::CallbackDispatcher;

/// Notified when the signature switches between empty and non-empty
pub trait EmptyStateObserver: Send + Sync {
    fn on_empty_state_changed(&self, is_empty: bool);
}

impl<F> EmptyStateObserver for F
where
    F: Fn(bool) + Send + Sync,
{
    fn on_empty_state_changed(&self, is_empty: bool) {
        self(is_empty)
    }
}

/// Last reported emptiness; notifies only on real transitions
pub(crate) struct EmptyStateTracker {
    /// Held while dispatching so notifications keep transition order
    observer: Mutex<Option<Arc<dyn EmptyStateObserver>>>,
    is_empty: AtomicBool,
    dispatcher: Arc<dyn CallbackDispatcher>,
}

impl EmptyStateTracker {
    pub(crate) fn new(dispatcher: Arc<dyn CallbackDispatcher>) -> Self {
        Self {
            observer: Mutex::new(None),
            is_empty: AtomicBool::new(true),
            dispatcher,
        }
    }

    pub(crate) fn set_observer(&self, observer: Option<Arc<dyn EmptyStateObserver>>) {
        *self.observer.lock().unwrap_or_else(PoisonError::into_inner) = observer;
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.is_empty.load(Ordering::SeqCst)
    }

    pub(crate) fn report(&self, is_empty: bool) {
        let observer = self.observer.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_empty.swap(is_empty, Ordering::SeqCst) == is_empty {
            return;
        }

        tracing::debug!(is_empty, "Signature empty state changed");
        if let Some(observer) = observer.as_ref().map(Arc::clone) {
            self.dispatcher
                .dispatch(Box::new(move || observer.on_empty_state_changed(is_empty)));
        }
    }
}
