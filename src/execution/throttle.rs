use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// A blocking gate bounding how many chunks execute at once.
///
/// Work runs inside [`Throttle::run`] so a permit cannot leak on the happy path; the closure
/// receives the time spent waiting for its permit so callers can record throttling metrics.
pub struct Throttle {
    permits: Mutex<usize>,
    cv: Condvar,
}

impl Throttle {
    pub fn new(permits: usize) -> Self {
        assert!(permits > 0, "permits must be > 0");
        Self {
            permits: Mutex::new(permits),
            cv: Condvar::new(),
        }
    }

    /// Run `work` while holding one permit, blocking until a permit is available.
    ///
    /// `work` is passed the wait time (zero if no wait was required).
    pub fn run<T>(&self, work: impl FnOnce(Duration) -> T) -> T {
        let start = Instant::now();
        let mut waited = false;
        {
            let mut available = self.permits.lock().expect("throttle mutex poisoned");
            while *available == 0 {
                waited = true;
                available = self.cv.wait(available).expect("throttle mutex poisoned");
            }
            *available -= 1;
        }
        let wait = if waited { start.elapsed() } else { Duration::ZERO };

        let out = work(wait);

        let mut available = self.permits.lock().expect("throttle mutex poisoned");
        *available += 1;
        self.cv.notify_one();
        drop(available);

        out
    }
}
