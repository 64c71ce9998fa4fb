//! Subscriber registry with non-blocking fan-out.
//!
//! Each subscriber owns a small bounded buffer. `notify` snapshots the
//! registry, releases the lock, then offers the message to every snapshot
//! entry with `try_send`: a full buffer skips that subscriber for this
//! message, a dropped receiver is pruned afterwards.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::ReloadNotifier;
use super::message::ReloadMessage;

/// Default per-subscriber buffer.
pub const SUBSCRIBER_CAPACITY: usize = 4;

/// Registered subscriber; receive notifications through `rx`.
#[derive(Debug)]
pub struct Subscription<M> {
    id: u64,
    pub rx: Receiver<M>,
}

impl<M> Subscription<M> {
    pub const fn id(&self) -> u64 {
        self.id
    }
}

/// Outcome of one `notify` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: usize,
    pub skipped: usize,
}

pub struct Broadcaster<M> {
    subscribers: Mutex<FxHashMap<u64, Sender<M>>>,
    next_id: AtomicU64,
    capacity: usize,
}

impl<M: Clone> Broadcaster<M> {
    pub fn new() -> Self {
        Self::with_capacity(SUBSCRIBER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            subscribers: Mutex::new(FxHashMap::default()),
            next_id: AtomicU64::new(0),
            capacity,
        }
    }

    /// Register a subscriber. Visible to every `notify` that starts after
    /// this returns.
    pub fn subscribe(&self) -> Subscription<M> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = channel::bounded(self.capacity);
        self.subscribers.lock().insert(id, tx);
        Subscription { id, rx }
    }

    /// Remove a subscriber. Safe while a `notify` is in flight.
    pub fn unsubscribe(&self, subscription: Subscription<M>) {
        self.subscribers.lock().remove(&subscription.id);
    }

    pub fn len(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offer `message` to every current subscriber without blocking.
    pub fn notify(&self, message: &M) -> Delivery {
        let snapshot: Vec<(u64, Sender<M>)> = self
            .subscribers
            .lock()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut delivery = Delivery::default();
        let mut gone = Vec::new();
        for (id, tx) in snapshot {
            match tx.try_send(message.clone()) {
                Ok(()) => delivery.delivered += 1,
                Err(TrySendError::Full(_)) => delivery.skipped += 1,
                Err(TrySendError::Disconnected(_)) => gone.push(id),
            }
        }

        if !gone.is_empty() {
            let mut subscribers = self.subscribers.lock();
            for id in gone {
                subscribers.remove(&id);
            }
        }

        delivery
    }
}

impl<M: Clone> Default for Broadcaster<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl ReloadNotifier for Broadcaster<ReloadMessage> {
    fn notify_reload(&self, reason: &str) {
        let delivery = self.notify(&ReloadMessage::reload(reason));
        crate::debug!(
            "reload";
            "notified {} client{} ({} skipped)",
            delivery.delivered,
            crate::utils::plural_s(delivery.delivered),
            delivery.skipped
        );
    }
}
