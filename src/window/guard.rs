use std::cell::Cell;
use std::rc::Rc;

/// Advisory "save in progress" flag for one save target. The window also
/// uses one to keep a single file chooser open at a time.
///
/// Not a mutex: a second save simply sees the flag and backs off. Replacing
/// the guard (when the target file changes) leaves any outstanding
/// [`SaveGuardHold`] attached to the old flag.
#[derive(Debug, Clone, Default)]
pub struct SaveGuard {
    running: Rc<Cell<bool>>,
}

impl SaveGuard {
    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Marks a save as running. Returns `None` if one already is.
    pub fn try_acquire(&self) -> Option<SaveGuardHold> {
        if self.running.replace(true) {
            return None;
        }
        Some(SaveGuardHold {
            running: self.running.clone(),
        })
    }
}

/// Releases its [`SaveGuard`] when dropped, on every exit path.
#[derive(Debug)]
pub struct SaveGuardHold {
    running: Rc<Cell<bool>>,
}

impl Drop for SaveGuardHold {
    fn drop(&mut self) {
        self.running.set(false);
    }
}
