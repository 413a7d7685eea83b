//! Generic hook dispatcher: an ordered list of subscribers handed a
//! mutable event record.
//!
//! The same shape backs every hook the engine exposes, process-global and
//! per-pipeline alike (see spec §4.5) — only the event type and which
//! component owns the registry differ.

use std::sync::RwLock;

/// A subscriber callback, invoked with a mutable event record.
pub type HookFn<E> = Box<dyn Fn(&mut E) + Send + Sync>;

/// An ordered list of subscribers for one event kind.
///
/// Subscription and dispatch both take a read or write lock briefly;
/// subscriber bodies run under a read lock, so a subscriber must not try to
/// register another subscriber on the same registry from within its own
/// callback.
pub struct HookRegistry<E> {
    subscribers: RwLock<Vec<HookFn<E>>>,
}

impl<E> Default for HookRegistry<E> {
    fn default() -> Self {
        Self { subscribers: RwLock::new(Vec::new()) }
    }
}

impl<E> HookRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. Subscribers fire in registration order.
    pub fn subscribe<F>(&self, f: F)
    where
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        self.subscribers.write().expect("hook registry lock poisoned").push(Box::new(f));
    }

    pub fn len(&self) -> usize {
        self.subscribers.read().expect("hook registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dispatch `event` through every subscriber, in subscription order.
    pub fn fire(&self, event: &mut E) {
        let subs = self.subscribers.read().expect("hook registry lock poisoned");
        for sub in subs.iter() {
            sub(event);
        }
    }
}

impl<E> std::fmt::Debug for HookRegistry<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry").field("subscribers", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn subscribers_fire_in_registration_order() {
        let registry: HookRegistry<Vec<u32>> = HookRegistry::new();
        registry.subscribe(|v| v.push(1));
        registry.subscribe(|v| v.push(2));
        registry.subscribe(|v| v.push(3));

        let mut event = Vec::new();
        registry.fire(&mut event);
        assert_eq!(event, vec![1, 2, 3]);
    }

    #[test]
    fn empty_registry_is_a_no_op() {
        let registry: HookRegistry<String> = HookRegistry::new();
        let mut event = String::from("unchanged");
        registry.fire(&mut event);
        assert_eq!(event, "unchanged");
    }

    #[test]
    fn subscriber_can_mutate_event() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry: HookRegistry<bool> = HookRegistry::new();
        let calls_clone = calls.clone();
        registry.subscribe(move |cancel| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            *cancel = true;
        });
        let mut event = false;
        registry.fire(&mut event);
        assert!(event);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
