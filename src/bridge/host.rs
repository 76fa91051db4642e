use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// The host UI event loop the bridge integrates with.
pub trait HostLoop {
    /// Dispatches one pending host event, blocking if the host blocks.
    ///
    /// Returns `false` once no further event can ever arrive.
    fn iterate(&self) -> bool;
}

type IdleCallback = Box<dyn FnOnce()>;

/// FIFO of deferred callbacks run one per loop iteration.
///
/// Native operations post their completions here instead of invoking them
/// from inside the call that started them.
#[derive(Clone, Default)]
pub struct IdleQueue {
    callbacks: Rc<RefCell<VecDeque<IdleCallback>>>,
}

impl IdleQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, callback: impl FnOnce() + 'static) {
        self.callbacks.borrow_mut().push_back(Box::new(callback));
    }

    /// Runs the oldest callback. Returns `false` when the queue was empty.
    pub fn dispatch_one(&self) -> bool {
        let next = self.callbacks.borrow_mut().pop_front();
        match next {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.borrow().is_empty()
    }
}

impl HostLoop for IdleQueue {
    fn iterate(&self) -> bool {
        self.dispatch_one()
    }
}
