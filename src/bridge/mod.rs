//! Async bridge between callback-driven native APIs and sequential code.
//!
//! Native I/O, dialog results and round trips into the embedded content all
//! report back through callbacks. This module lets the window logic express
//! them as plain `async` functions:
//! - [`promise`] turns any "call me back with X" operation into an awaitable
//! - [`Scheduler`] owns the resulting tasks and advances them one step at a
//!   time on the host loop thread
//! - [`Bridge`] ties the scheduler to a [`HostLoop`] and offers the
//!   fire-and-forget and synchronous-drain entry points

mod host;
mod promise;
mod scheduler;
mod task;
mod types;

#[cfg(test)]
mod tests;

use std::fmt::Display;
use std::future::Future;
use std::rc::Rc;

use log::{debug, error};

pub use host::{HostLoop, IdleQueue};
pub use promise::{Resolver, promise};
pub use scheduler::Scheduler;
pub use task::TaskHandle;
pub use types::{BridgeError, TaskId, TaskStatus};

/// Scheduler bound to the host event loop that delivers its wakeups.
#[derive(Clone)]
pub struct Bridge {
    scheduler: Scheduler,
    host: Rc<dyn HostLoop>,
}

impl Bridge {
    pub fn new(host: Rc<dyn HostLoop>) -> Self {
        Self {
            scheduler: Scheduler::new(),
            host,
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Starts `future` as a task. It first runs on the next scheduler pass.
    pub fn spawn<T, E, F>(&self, future: F) -> TaskHandle<T, E>
    where
        T: 'static,
        E: 'static,
        F: Future<Output = Result<T, E>> + 'static,
    {
        self.scheduler.spawn(future)
    }

    /// Starts `future` and routes its outcome to `on_done` or `on_error`.
    pub fn run_with<T, E, F>(
        &self,
        future: F,
        on_done: impl FnOnce(T) + 'static,
        on_error: impl FnOnce(E) + 'static,
    ) -> TaskId
    where
        T: 'static,
        E: 'static,
        F: Future<Output = Result<T, E>> + 'static,
    {
        let handle = self.scheduler.spawn(async move {
            match future.await {
                Ok(value) => on_done(value),
                Err(err) => on_error(err),
            }
            Ok::<(), E>(())
        });
        handle.id()
    }

    /// Fire-and-forget: an unhandled failure is logged and otherwise dropped so
    /// it can never unwind into the host loop.
    pub fn spawn_detached<E, F>(&self, label: &'static str, future: F) -> TaskId
    where
        E: Display + 'static,
        F: Future<Output = Result<(), E>> + 'static,
    {
        self.run_with(
            future,
            move |()| debug!("{} finished", label),
            move |err: E| error!("{} failed: {}", label, err),
        )
    }

    /// Runs `future` to completion by iterating the host loop, then returns
    /// its outcome. Only for call sites that cannot be asynchronous themselves.
    pub fn run_sync<T, E, F>(&self, future: F) -> Result<T, E>
    where
        T: 'static,
        E: From<BridgeError> + 'static,
        F: Future<Output = Result<T, E>> + 'static,
    {
        let handle = self.scheduler.spawn(future);
        loop {
            self.scheduler.run_until_stalled();
            if let Some(result) = handle.take_result() {
                return result;
            }
            if !self.host.iterate() {
                return Err(BridgeError::LoopExhausted.into());
            }
        }
    }

    /// Runs every task that is ready. Call after each host event.
    pub fn pump(&self) -> usize {
        self.scheduler.run_until_stalled()
    }

    /// One host loop iteration followed by a scheduler pass.
    pub fn iterate(&self) -> bool {
        let alive = self.host.iterate();
        self.pump();
        alive
    }
}
