//! Change signal for persisted overrides
//!
//! A [`ChangeSignal`] carries no payload: it only says "the store changed,
//! recompute what you derived from it". Every handle cloned from the same
//! signal shares one listener list.

use crate::sync::RwLockExt;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

/// Type alias for a change listener
pub type ChangeListener = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct SignalInner {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(u64, ChangeListener)>>,
}

/// Process-wide broadcast signal
///
/// # Example
///
/// ```
/// use rtcfg::ChangeSignal;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let signal = ChangeSignal::new();
/// let hits = Arc::new(AtomicUsize::new(0));
/// let hits_clone = hits.clone();
///
/// let subscription = signal.subscribe(move || {
///     hits_clone.fetch_add(1, Ordering::SeqCst);
/// });
/// signal.notify();
/// drop(subscription);
/// signal.notify();
///
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
#[derive(Clone, Default)]
pub struct ChangeSignal {
    inner: Arc<SignalInner>,
}

impl ChangeSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener, active until the returned `Subscription` is dropped
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .write_recovered()
            .push((id, Arc::new(listener)));

        Subscription {
            signal: Arc::downgrade(&self.inner),
            id,
            active: true,
        }
    }

    /// Call every listener once, synchronously
    ///
    /// Listeners are collected before any of them runs: a listener subscribed
    /// during delivery is first called on the next `notify`, and one dropped
    /// during delivery may still receive this one.
    pub fn notify(&self) {
        let listeners: Vec<ChangeListener> = self
            .inner
            .listeners
            .read_recovered()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        log::debug!("Change signal delivered to {} listener(s)", listeners.len());
        for listener in listeners {
            listener();
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.read_recovered().len()
    }

    /// Whether both handles refer to the same signal
    #[must_use]
    pub fn same_signal(&self, other: &ChangeSignal) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ChangeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeSignal")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Scoped registration on a [`ChangeSignal`]
///
/// Dropping it removes the listener.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    signal: Weak<SignalInner>,
    id: u64,
    active: bool,
}

impl Subscription {
    /// Keep the listener registered for the lifetime of the signal
    pub fn detach(mut self) {
        self.active = false;
    }

    /// Remove the listener now
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        if let Some(inner) = self.signal.upgrade() {
            inner
                .listeners
                .write_recovered()
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
