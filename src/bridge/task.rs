use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::future::LocalBoxFuture;

use super::types::{TaskId, TaskStatus};

/// Lifecycle of a task together with its outcome once finished.
pub(crate) enum TaskState<T, E> {
    Pending,
    Suspended,
    Done(T),
    Failed(E),
    /// Outcome already handed to the owner of the [`TaskHandle`].
    Taken(TaskStatus),
}

impl<T, E> TaskState<T, E> {
    fn status(&self) -> TaskStatus {
        match self {
            TaskState::Pending => TaskStatus::Pending,
            TaskState::Suspended => TaskStatus::Suspended,
            TaskState::Done(_) => TaskStatus::Done,
            TaskState::Failed(_) => TaskStatus::Failed,
            TaskState::Taken(status) => *status,
        }
    }
}

/// Handle to a spawned task. Dropping it does not cancel the task.
pub struct TaskHandle<T, E> {
    id: TaskId,
    state: Rc<RefCell<TaskState<T, E>>>,
}

impl<T, E> TaskHandle<T, E> {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn status(&self) -> TaskStatus {
        self.state.borrow().status()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status(), TaskStatus::Done | TaskStatus::Failed)
    }

    /// Takes the outcome of a finished task. Returns `None` while it is still
    /// running or if the outcome was already taken.
    pub fn take_result(&self) -> Option<Result<T, E>> {
        let mut state = self.state.borrow_mut();
        let status = state.status();
        match std::mem::replace(&mut *state, TaskState::Taken(status)) {
            TaskState::Done(value) => Some(Ok(value)),
            TaskState::Failed(err) => Some(Err(err)),
            other => {
                *state = other;
                None
            }
        }
    }
}

impl<T, E> fmt::Debug for TaskHandle<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("status", &self.status())
            .finish()
    }
}

/// Wraps a fallible future and records its lifecycle after every poll.
pub(crate) struct Tracked<T, E> {
    future: LocalBoxFuture<'static, Result<T, E>>,
    state: Rc<RefCell<TaskState<T, E>>>,
}

impl<T, E> Tracked<T, E> {
    pub(crate) fn new(
        id: TaskId,
        future: LocalBoxFuture<'static, Result<T, E>>,
    ) -> (Self, TaskHandle<T, E>) {
        let state = Rc::new(RefCell::new(TaskState::Pending));
        let handle = TaskHandle {
            id,
            state: state.clone(),
        };
        (Self { future, state }, handle)
    }
}

impl<T, E> Future for Tracked<T, E> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = &mut *self;
        match this.future.as_mut().poll(cx) {
            Poll::Pending => {
                *this.state.borrow_mut() = TaskState::Suspended;
                Poll::Pending
            }
            Poll::Ready(Ok(value)) => {
                *this.state.borrow_mut() = TaskState::Done(value);
                Poll::Ready(())
            }
            Poll::Ready(Err(err)) => {
                *this.state.borrow_mut() = TaskState::Failed(err);
                Poll::Ready(())
            }
        }
    }
}
