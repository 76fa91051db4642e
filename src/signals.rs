//! Typed signal subscriptions.
//!
//! Native event sources (script message channels, the content-ready event,
//! file chooser responses) are exposed as [`Signal`]s. Handlers run on the
//! host loop thread in subscription order.

use std::cell::{Cell, RefCell};
use std::fmt;

/// Identifier returned by [`Signal::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

enum Handler<T> {
    Persistent(Box<dyn FnMut(&T)>),
    Once(Option<Box<dyn FnOnce(&T)>>),
}

struct Slot<T> {
    id: SubscriptionId,
    handler: Handler<T>,
}

/// A single-threaded signal carrying values of type `T`.
pub struct Signal<T> {
    slots: RefCell<Vec<Slot<T>>>,
    removed_during_emit: RefCell<Vec<SubscriptionId>>,
    emitting: Cell<bool>,
    next_id: Cell<u64>,
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self {
            slots: RefCell::new(Vec::new()),
            removed_during_emit: RefCell::new(Vec::new()),
            emitting: Cell::new(false),
            next_id: Cell::new(0),
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.slots.borrow().len())
            .finish()
    }
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler invoked on every emission until unsubscribed.
    pub fn subscribe(&self, handler: impl FnMut(&T) + 'static) -> SubscriptionId {
        self.push(Handler::Persistent(Box::new(handler)))
    }

    /// Registers a handler invoked on the next emission only.
    pub fn subscribe_once(&self, handler: impl FnOnce(&T) + 'static) -> SubscriptionId {
        self.push(Handler::Once(Some(Box::new(handler))))
    }

    /// Removes a handler. Returns `false` if it was not (or no longer) subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut slots = self.slots.borrow_mut();
        let before = slots.len();
        slots.retain(|slot| slot.id != id);
        let removed = slots.len() != before;
        drop(slots);

        if !removed && self.emitting.get() {
            // The handler may be detached while its emission is running.
            self.removed_during_emit.borrow_mut().push(id);
            return true;
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Delivers `value` to every current subscriber.
    ///
    /// Handlers may subscribe, unsubscribe or emit on this signal again while
    /// running; subscriptions added during an emission first see the next one.
    pub fn emit(&self, value: &T) {
        let mut running = std::mem::take(&mut *self.slots.borrow_mut());
        let was_emitting = self.emitting.replace(true);

        for slot in running.iter_mut() {
            if self.removed_during_emit.borrow().contains(&slot.id) {
                continue;
            }
            match &mut slot.handler {
                Handler::Persistent(handler) => handler(value),
                Handler::Once(handler) => {
                    if let Some(handler) = handler.take() {
                        handler(value);
                    }
                }
            }
        }

        self.emitting.set(was_emitting);
        let removed = std::mem::take(&mut *self.removed_during_emit.borrow_mut());
        if was_emitting {
            // Removals aimed at the enclosing emission's handlers stay pending for it.
            let outer = removed
                .iter()
                .copied()
                .filter(|id| !running.iter().any(|slot| slot.id == *id));
            self.removed_during_emit.borrow_mut().extend(outer);
        }
        running.retain(|slot| {
            !removed.contains(&slot.id)
                && !matches!(slot.handler, Handler::Once(None))
        });

        let mut slots = self.slots.borrow_mut();
        let added = std::mem::take(&mut *slots);
        *slots = running;
        slots.extend(added);
    }

    fn push(&self, handler: Handler<T>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.slots.borrow_mut().push(Slot { id, handler });
        id
    }
}
