use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use futures::task::{self, ArcWake};
use log::trace;

use super::task::{TaskHandle, Tracked};
use super::types::TaskId;

/// Ids of tasks whose awaited operation has delivered a result.
///
/// Wakers must be `Send + Sync`, so this is the only piece of scheduler state
/// behind a lock; everything else lives on the host loop thread.
#[derive(Default)]
struct ReadyQueue {
    ids: Mutex<VecDeque<TaskId>>,
}

impl ReadyQueue {
    fn push(&self, id: TaskId) {
        let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        if !ids.contains(&id) {
            ids.push_back(id);
        }
    }

    fn pop(&self) -> Option<TaskId> {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    fn len(&self) -> usize {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

struct TaskWaker {
    id: TaskId,
    ready: Arc<ReadyQueue>,
}

impl ArcWake for TaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.ready.push(arc_self.id);
    }
}

#[derive(Default)]
struct Inner {
    tasks: RefCell<HashMap<TaskId, LocalBoxFuture<'static, ()>>>,
    ready: Arc<ReadyQueue>,
    /// Tasks currently inside `poll`; a nested pass must not lose their wakeups.
    polling: RefCell<HashSet<TaskId>>,
    rewake: RefCell<HashSet<TaskId>>,
    next_id: Cell<u64>,
}

/// Single-threaded cooperative scheduler.
///
/// Tasks only advance inside [`Scheduler::run_until_stalled`], which the host
/// loop calls after dispatching each event. A task is never polled while a
/// previous step of the same task is still running, and a suspended task never
/// blocks the others.
#[derive(Clone, Default)]
pub struct Scheduler {
    inner: Rc<Inner>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `future` and queues its first step for the next pass.
    pub fn spawn<T, E, F>(&self, future: F) -> TaskHandle<T, E>
    where
        T: 'static,
        E: 'static,
        F: Future<Output = Result<T, E>> + 'static,
    {
        let id = TaskId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);

        let (tracked, handle) = Tracked::new(id, future.boxed_local());
        self.inner
            .tasks
            .borrow_mut()
            .insert(id, tracked.boxed_local());
        self.inner.ready.push(id);
        trace!("Spawned task {}", id);
        handle
    }

    /// Polls every ready task until none is left. Returns the number of steps run.
    pub fn run_until_stalled(&self) -> usize {
        let mut steps = 0;
        while let Some(id) = self.inner.ready.pop() {
            let task = self.inner.tasks.borrow_mut().remove(&id);
            let Some(mut task) = task else {
                if self.inner.polling.borrow().contains(&id) {
                    self.inner.rewake.borrow_mut().insert(id);
                }
                continue;
            };

            self.inner.polling.borrow_mut().insert(id);
            let waker = task::waker(Arc::new(TaskWaker {
                id,
                ready: self.inner.ready.clone(),
            }));
            let mut cx = Context::from_waker(&waker);
            let poll = task.as_mut().poll(&mut cx);
            self.inner.polling.borrow_mut().remove(&id);
            steps += 1;

            match poll {
                Poll::Ready(()) => trace!("Task {} finished", id),
                Poll::Pending => {
                    self.inner.tasks.borrow_mut().insert(id, task);
                    if self.inner.rewake.borrow_mut().remove(&id) {
                        self.inner.ready.push(id);
                    }
                }
            }
        }
        steps
    }

    /// Number of tasks that have not finished yet.
    pub fn live_tasks(&self) -> usize {
        self.inner.tasks.borrow().len() + self.inner.polling.borrow().len()
    }

    pub fn has_ready(&self) -> bool {
        self.inner.ready.len() > 0
    }
}
