//! Subscriber registry - thread-safe callback map with ordered dispatch.

use std::collections::BTreeMap;
use std::sync::Mutex;

use contracts::{FrameCallback, FrameView, SubscriptionId};
use tracing::trace;

#[derive(Default)]
struct RegistryInner {
    /// Next identifier to hand out; post-incremented under the same lock as
    /// the map, so ids are unique and strictly increasing for the registry's
    /// lifetime.
    next_id: SubscriptionId,
    callbacks: BTreeMap<SubscriptionId, FrameCallback>,
}

/// Thread-safe mapping from subscription id to frame callback.
///
/// `register`/`unregister` may be called from any thread at any time,
/// including from inside a callback during a dispatch pass. Dispatch
/// snapshots the current callbacks under the lock and invokes them after
/// releasing it, in ascending-id (registration) order; a registry mutation
/// made while a pass is running therefore takes effect from the next frame,
/// never corrupting the pass in progress.
pub struct SubscriberRegistry {
    inner: Mutex<RegistryInner>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
        }
    }

    /// Add a callback; returns its id. Ids are never reused, even after
    /// removal.
    pub fn register(&self, callback: FrameCallback) -> SubscriptionId {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.callbacks.insert(id, callback);
        trace!(id, subscribers = inner.callbacks.len(), "subscriber registered");
        id
    }

    /// Remove a callback; reports whether the id was present. Removing an
    /// unknown id is not an error.
    pub fn unregister(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let found = inner.callbacks.remove(&id).is_some();
        trace!(id, found, subscribers = inner.callbacks.len(), "subscriber unregistered");
        found
    }

    /// Invoke every currently registered callback for one frame, in
    /// registration order. Returns the number of callbacks invoked.
    ///
    /// Runs on the single grabber thread, so callback execution within a
    /// frame is serialized and subscribers never observe frames out of
    /// order.
    pub fn dispatch(&self, frame: &FrameView) -> usize {
        let snapshot: Vec<FrameCallback> = {
            let inner = self.inner.lock().unwrap();
            inner.callbacks.values().cloned().collect()
        };

        for callback in &snapshot {
            callback(frame);
        }
        snapshot.len()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}
