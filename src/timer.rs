//! Deadline timers used by the executor.

use std::{fmt, time::Duration};

/// Callback run when a timer fires.
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Schedules one-shot callbacks.
///
/// Implementations must run callbacks asynchronously; `schedule` returns
/// before the delay elapses.
pub trait Timer: Send + Sync + 'static {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;
}

/// Cancels a scheduled callback.
///
/// Cancelling is idempotent and does nothing once the callback has run.
/// Dropping the handle cancels the timer.
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl TimerHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle with nothing to cancel.
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_none()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Timer backed by `tokio::time::sleep` on the current runtime.
///
/// Must be used from within a Tokio runtime.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
        TimerHandle::new(move || task.abort())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::Duration,
    };

    use super::{Timer, TimerHandle, TokioTimer};

    fn counting(fired: &Arc<AtomicUsize>) -> Box<dyn FnOnce() + Send> {
        let fired = Arc::clone(fired);
        Box::new(move || {
            fired.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let _handle = TokioTimer.schedule(Duration::from_millis(50), counting(&fired));

        tokio::time::sleep(Duration::from_millis(49)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_before_fire_suppresses_callback() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut handle = TokioTimer.schedule(Duration::from_millis(50), counting(&fired));

        handle.cancel();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(handle.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_fire_is_noop_and_idempotent() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut handle = TokioTimer.schedule(Duration::from_millis(10), counting(&fired));

        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
        handle.cancel();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_cancels() {
        let fired = Arc::new(AtomicUsize::new(0));
        drop(TokioTimer.schedule(Duration::from_millis(10), counting(&fired)));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn noop_handle_is_already_cancelled() {
        let mut handle = TimerHandle::noop();
        assert!(handle.is_cancelled());
        handle.cancel();
    }
}
