use crate::domain::logging::LogComponent;
use crate::log_debug;
use futures::future::{AbortHandle, Abortable};
use futures::{Future, FutureExt, Stream, StreamExt};
use gloo_timers::future::IntervalStream;
use std::time::Duration;

/// Handle to a running refresh loop.
///
/// Cancelling or dropping the handle stops the loop at its next await point.
/// An in-flight refresh is not interrupted; its result still goes through the
/// usual sequence check.
#[derive(Debug)]
pub struct RefreshTimer {
    handle: AbortHandle,
}

impl RefreshTimer {
    /// Build the loop driving `on_tick` once per item of `ticks`.
    ///
    /// The returned future must be spawned by the caller; each tick's future
    /// is awaited before the next tick is taken.
    pub fn new<S, F, Fut>(ticks: S, mut on_tick: F) -> (Self, impl Future<Output = ()>)
    where
        S: Stream,
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let (handle, registration) = AbortHandle::new_pair();
        let task = Abortable::new(ticks.for_each(move |_| on_tick()), registration).map(|result| {
            if result.is_err() {
                log_debug!(LogComponent::Application("RefreshTimer"), "⏹️ Refresh loop aborted");
            }
        });
        (Self { handle }, task)
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_aborted()
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Browser interval ticks.
pub fn interval_ticks(period: Duration) -> IntervalStream {
    let millis = u32::try_from(period.as_millis()).unwrap_or(u32::MAX);
    IntervalStream::new(millis)
}
