//! Listener registries
//!
//! Single-threaded publish/subscribe for signals such as the OS dark-mode
//! preference. Each subscriber holds a [`Subscription`]; dropping it removes
//! the listener, so mount/unmount cycles never accumulate handlers.

use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

new_key_type! {
    /// Unique identifier for a registered listener
    pub struct ListenerId;
}

/// Listener callback type
pub type Listener<T> = Rc<dyn Fn(&T)>;

type Registry<T> = RefCell<SlotMap<ListenerId, Listener<T>>>;

/// A set of listeners for values of type `T`
pub struct Listeners<T> {
    registry: Rc<Registry<T>>,
}

impl<T: 'static> Listeners<T> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(SlotMap::with_key())),
        }
    }

    /// Register a listener; it stays registered until the returned guard is dropped
    #[must_use = "dropping the subscription immediately unsubscribes the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let id = self.registry.borrow_mut().insert(Rc::new(listener));
        let registry: Weak<Registry<T>> = Rc::downgrade(&self.registry);

        Subscription {
            id,
            remove: Some(Box::new(move |id| {
                if let Some(registry) = registry.upgrade() {
                    registry.borrow_mut().remove(id);
                }
            })),
        }
    }

    /// Invoke every listener with `value`
    ///
    /// Listeners are snapshotted before dispatch, so a listener may subscribe
    /// or unsubscribe others without conflicting with the registry borrow.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Listener<T>> = self.registry.borrow().values().cloned().collect();
        tracing::trace!(listeners = snapshot.len(), "emit");
        for listener in snapshot {
            listener(value);
        }
    }

    /// Number of live listeners
    pub fn len(&self) -> usize {
        self.registry.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.borrow().is_empty()
    }
}

impl<T: 'static> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.registry.borrow().len())
            .finish()
    }
}

/// Guard that unsubscribes its listener when dropped
pub struct Subscription {
    id: ListenerId,
    remove: Option<Box<dyn FnOnce(ListenerId)>>,
}

impl Subscription {
    /// Unsubscribe now (equivalent to dropping the guard)
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.remove.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_emit_reaches_all_listeners() {
        let listeners = Listeners::<i32>::new();
        let total = Rc::new(Cell::new(0));

        let t1 = total.clone();
        let _a = listeners.subscribe(move |v| t1.set(t1.get() + *v));
        let t2 = total.clone();
        let _b = listeners.subscribe(move |v| t2.set(t2.get() + *v * 10));

        listeners.emit(&2);
        assert_eq!(total.get(), 22);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let listeners = Listeners::<()>::new();
        let hits = Rc::new(Cell::new(0));

        let hits_clone = hits.clone();
        let sub = listeners.subscribe(move |_| hits_clone.set(hits_clone.get() + 1));
        assert_eq!(listeners.len(), 1);

        listeners.emit(&());
        drop(sub);
        listeners.emit(&());

        assert_eq!(hits.get(), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_repeated_cycles_do_not_accumulate() {
        let listeners = Listeners::<()>::new();
        for _ in 0..50 {
            let sub = listeners.subscribe(|_| {});
            assert_eq!(listeners.len(), 1);
            sub.unsubscribe();
        }
        assert_eq!(listeners.len(), 0);
    }

    #[test]
    fn test_subscription_outliving_registry_is_harmless() {
        let listeners = Listeners::<()>::new();
        let sub = listeners.subscribe(|_| {});
        drop(listeners);
        drop(sub);
    }

    #[test]
    fn test_listener_may_subscribe_during_emit() {
        let listeners = Rc::new(Listeners::<()>::new());
        let held = Rc::new(RefCell::new(Vec::new()));

        let inner = listeners.clone();
        let held_clone = held.clone();
        let _sub = listeners.subscribe(move |_| {
            held_clone.borrow_mut().push(inner.subscribe(|_| {}));
        });

        listeners.emit(&());
        assert_eq!(listeners.len(), 2);
    }
}
