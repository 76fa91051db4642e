use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::*;

fn bridge_with_queue() -> (Bridge, IdleQueue) {
    let queue = IdleQueue::new();
    (Bridge::new(Rc::new(queue.clone())), queue)
}

/// Completes with `value` on a later loop iteration, like a native async call.
async fn deferred<T: 'static>(queue: &IdleQueue, value: T) -> Result<T, BridgeError> {
    let queue = queue.clone();
    promise(move |resolver| queue.post(move || resolver.resolve(value))).await
}

#[derive(Debug, PartialEq)]
enum TestError {
    Bridge(BridgeError),
    Io(&'static str),
}

impl From<BridgeError> for TestError {
    fn from(err: BridgeError) -> Self {
        TestError::Bridge(err)
    }
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[test]
fn synchronously_resolved_promise_completes_in_one_pass() {
    let (bridge, _queue) = bridge_with_queue();
    let handle = bridge.spawn(async { promise(|resolver| resolver.resolve(7)).await });

    assert_eq!(handle.status(), TaskStatus::Pending);
    bridge.pump();
    assert_eq!(handle.status(), TaskStatus::Done);
    assert_eq!(handle.take_result(), Some(Ok(7)));
    assert_eq!(handle.take_result(), None);
}

#[test]
fn task_suspends_until_the_loop_delivers_the_result() {
    let (bridge, queue) = bridge_with_queue();
    let q = queue.clone();
    let handle = bridge.spawn(async move { deferred(&q, "ready").await });

    bridge.pump();
    assert_eq!(handle.status(), TaskStatus::Suspended);
    assert_eq!(queue.len(), 1);

    assert!(bridge.iterate());
    assert_eq!(handle.take_result(), Some(Ok("ready")));
    assert_eq!(bridge.scheduler().live_tasks(), 0);
}

#[test]
fn steps_of_one_task_run_in_sequence() {
    let (bridge, queue) = bridge_with_queue();
    let log = Rc::new(RefCell::new(Vec::new()));
    let q = queue.clone();
    let task_log = log.clone();
    let handle = bridge.spawn(async move {
        for step in 0..3 {
            let value = deferred(&q, step).await?;
            task_log.borrow_mut().push(value);
        }
        Ok::<_, BridgeError>(())
    });

    bridge.pump();
    while bridge.iterate() {}
    assert_eq!(*log.borrow(), vec![0, 1, 2]);
    assert_eq!(handle.status(), TaskStatus::Done);
}

#[test]
fn one_suspended_task_does_not_block_another() {
    let (bridge, queue) = bridge_with_queue();
    let q = queue.clone();
    let parked = bridge.spawn(async move {
        // Never resolved: the task itself keeps the resolver alive.
        let keep = Rc::new(RefCell::new(None));
        let slot = keep.clone();
        let value = promise::<u8, _>(move |resolver| *slot.borrow_mut() = Some(resolver)).await;
        drop(keep);
        value
    });
    let free = bridge.spawn(async move { deferred(&q, 1u8).await });

    bridge.pump();
    bridge.iterate();
    assert_eq!(free.take_result(), Some(Ok(1)));
    assert_eq!(parked.status(), TaskStatus::Suspended);
}

#[test]
fn failure_propagates_to_the_immediate_awaiter() {
    let (bridge, queue) = bridge_with_queue();
    let q = queue.clone();
    let handle = bridge.spawn(async move {
        let failing: Result<u8, TestError> = match deferred(&q, Err("disk full")).await? {
            Ok(v) => Ok(v),
            Err(msg) => Err(TestError::Io(msg)),
        };
        let value = failing?;
        Ok::<u8, TestError>(value + 1)
    });

    bridge.pump();
    bridge.iterate();
    assert_eq!(handle.status(), TaskStatus::Failed);
    assert_eq!(handle.take_result(), Some(Err(TestError::Io("disk full"))));
}

#[test]
fn dropped_resolver_abandons_the_awaiter() {
    let (bridge, _queue) = bridge_with_queue();
    let handle = bridge.spawn(async { promise::<u8, _>(drop).await });

    bridge.pump();
    assert_eq!(handle.take_result(), Some(Err(BridgeError::Abandoned)));
}

#[test]
fn run_sync_drains_the_host_loop() {
    let (bridge, queue) = bridge_with_queue();
    let q = queue.clone();
    let result: Result<u32, TestError> = bridge.run_sync(async move {
        let a = deferred(&q, 20).await?;
        let b = deferred(&q, 22).await?;
        Ok(a + b)
    });
    assert_eq!(result, Ok(42));
    assert!(queue.is_empty());
}

#[test]
fn run_sync_reraises_failures() {
    let (bridge, queue) = bridge_with_queue();
    let q = queue.clone();
    let result: Result<u32, TestError> = bridge.run_sync(async move {
        deferred(&q, ()).await?;
        Err(TestError::Io("unreadable"))
    });
    assert_eq!(result, Err(TestError::Io("unreadable")));
}

#[test]
fn run_sync_reports_an_exhausted_loop() {
    let (bridge, _queue) = bridge_with_queue();
    let keep = Rc::new(RefCell::new(None));
    let slot = keep.clone();
    let result: Result<u8, TestError> = bridge.run_sync(async move {
        Ok(promise(move |resolver| *slot.borrow_mut() = Some(resolver)).await?)
    });
    assert_eq!(result, Err(TestError::Bridge(BridgeError::LoopExhausted)));
}

#[test]
fn detached_failures_are_swallowed() {
    let (bridge, queue) = bridge_with_queue();
    let q = queue.clone();
    bridge.spawn_detached("failing action", async move {
        deferred(&q, ()).await?;
        Err::<(), _>(TestError::Io("boom"))
    });

    bridge.pump();
    while bridge.iterate() {}
    assert_eq!(bridge.scheduler().live_tasks(), 0);
}

#[test]
fn run_with_routes_outcomes_to_callbacks() {
    let (bridge, _queue) = bridge_with_queue();
    let done = Rc::new(Cell::new(0));
    let failed = Rc::new(Cell::new(0));

    let d = done.clone();
    bridge.run_with(
        async { Ok::<u8, TestError>(5) },
        move |v| d.set(v),
        |_err| unreachable!(),
    );
    let f = failed.clone();
    bridge.run_with(
        async { Err::<u8, _>(TestError::Io("x")) },
        |_v| unreachable!(),
        move |_err| f.set(1),
    );

    bridge.pump();
    assert_eq!(done.get(), 5);
    assert_eq!(failed.get(), 1);
}

#[test]
fn nested_drain_inside_a_task_keeps_its_wakeups() {
    let (bridge, queue) = bridge_with_queue();
    let inner_bridge = bridge.clone();
    let q = queue.clone();
    let handle = bridge.spawn(async move {
        let inner_q = q.clone();
        let nested: Result<u8, TestError> =
            inner_bridge.run_sync(async move { Ok(deferred(&inner_q, 3).await?) });
        let outer = deferred(&q, 4).await?;
        Ok::<u8, TestError>(nested? + outer)
    });

    bridge.pump();
    while bridge.iterate() {}
    assert_eq!(handle.take_result(), Some(Ok(7)));
}
