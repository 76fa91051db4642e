use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use log::debug;

use crate::native::WebContent;

enum GateState {
    Waiting(VecDeque<String>),
    Ready,
}

/// Holds back script invocations until the editor reports it is initialized.
///
/// Scripts issued before [`ScriptGate::open`] are replayed once, in issue
/// order; afterwards every script runs immediately.
pub struct ScriptGate {
    content: Rc<dyn WebContent>,
    state: RefCell<GateState>,
}

impl ScriptGate {
    pub fn new(content: Rc<dyn WebContent>) -> Self {
        Self {
            content,
            state: RefCell::new(GateState::Waiting(VecDeque::new())),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(*self.state.borrow(), GateState::Ready)
    }

    pub fn queued(&self) -> usize {
        match &*self.state.borrow() {
            GateState::Waiting(queue) => queue.len(),
            GateState::Ready => 0,
        }
    }

    pub fn run(&self, script: impl Into<String>) {
        let script = script.into();
        if let GateState::Waiting(queue) = &mut *self.state.borrow_mut() {
            debug!("Editor is not initialized yet, queueing: {}", script);
            queue.push_back(script);
            return;
        }
        self.content.run_script(&script);
    }

    /// Flushes the queue and lets later scripts through. Returns how many
    /// queued scripts were run; a repeated call does nothing.
    pub fn open(&self) -> usize {
        let mut flushed = 0;
        loop {
            // Scripts issued while flushing join the back of the queue.
            let next = match &mut *self.state.borrow_mut() {
                GateState::Waiting(queue) => queue.pop_front(),
                GateState::Ready => {
                    debug!("Editor initialized again, nothing to flush");
                    return 0;
                }
            };
            match next {
                Some(script) => {
                    self.content.run_script(&script);
                    flushed += 1;
                }
                None => break,
            }
        }
        *self.state.borrow_mut() = GateState::Ready;
        flushed
    }
}
