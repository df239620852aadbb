use crypto_chart_wasm::application::RefreshTimer;
use futures::channel::mpsc;
use futures::executor::{LocalPool, block_on};
use futures::stream;
use futures::task::LocalSpawnExt;
use std::cell::Cell;
use std::rc::Rc;

#[test]
fn every_tick_runs_once() {
    let ticks = Rc::new(Cell::new(0));
    let counter = ticks.clone();

    let (timer, task) = RefreshTimer::new(stream::iter(0..5), move || {
        let counter = counter.clone();
        async move { counter.set(counter.get() + 1) }
    });
    block_on(task);

    assert_eq!(ticks.get(), 5);
    assert!(!timer.is_cancelled());
}

#[test]
fn cancel_stops_the_loop() {
    let mut pool = LocalPool::new();
    let (sender, receiver) = mpsc::unbounded::<()>();
    let ticks = Rc::new(Cell::new(0));
    let counter = ticks.clone();

    let (timer, task) = RefreshTimer::new(receiver, move || {
        let counter = counter.clone();
        async move { counter.set(counter.get() + 1) }
    });
    let handle = pool.spawner().spawn_local_with_handle(task).unwrap();

    sender.unbounded_send(()).unwrap();
    pool.run_until_stalled();
    assert_eq!(ticks.get(), 1);

    timer.cancel();
    sender.unbounded_send(()).unwrap();
    pool.run_until(handle);

    assert_eq!(ticks.get(), 1);
    assert!(timer.is_cancelled());
}

#[test]
fn dropping_the_handle_stops_the_loop() {
    let mut pool = LocalPool::new();
    let (sender, receiver) = mpsc::unbounded::<()>();
    let ticks = Rc::new(Cell::new(0));
    let counter = ticks.clone();

    let (timer, task) = RefreshTimer::new(receiver, move || {
        let counter = counter.clone();
        async move { counter.set(counter.get() + 1) }
    });
    let handle = pool.spawner().spawn_local_with_handle(task).unwrap();

    drop(timer);
    sender.unbounded_send(()).unwrap();
    pool.run_until(handle);

    assert_eq!(ticks.get(), 0);
}
