use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Cooperative stop signal shared between a generator and whoever drives it.
///
/// Clones observe the same signal. Cancelling is sticky and wakes any
/// generator currently suspended in its inter-step delay.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    inner: Arc<CancelState>,
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: Mutex<bool>,
    signal: Condvar,
}

impl CancellationToken {
    pub fn new() -> CancellationToken {
        CancellationToken::default()
    }

    pub fn cancel(&self) {
        let mut cancelled = self.inner.cancelled.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *cancelled = true;
        self.inner.signal.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Sleep for up to `delay`, returning early if the token is cancelled.
    /// Returns whether the token is cancelled on wake up.
    pub fn wait_timeout(&self, delay: Duration) -> bool {
        let cancelled = self.inner.cancelled.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let (cancelled, _) = self.inner
            .signal
            .wait_timeout_while(cancelled, delay, |cancelled| !*cancelled)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *cancelled
    }
}
