use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use portable_atomic::{AtomicU64, Ordering};

use crate::TimeSource;

/// Shared ticker state that a background thread advances every millisecond.
#[derive(Debug)]
struct SharedTickerInner {
    elapsed: AtomicU64,
}

/// A monotonic time source anchored to the wall clock once, at construction.
///
/// Readings are the Unix time captured at construction plus the elapsed
/// monotonic time (`Instant`) since then. Adjusting the host clock afterwards
/// has no effect, so a generator driven by this clock never sees a clock
/// regression.
///
/// Internally, a background thread stores the elapsed milliseconds into a
/// shared atomic once per tick, which keeps syscalls off the hot path. Clones
/// share the same ticker; the thread exits once the last clone is dropped.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    inner: Arc<SharedTickerInner>,
    anchor_millis: u64,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Starts a ticker anchored to the current wall-clock time.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use snowgen::{MonotonicClock, TimeSource};
    ///
    /// let clock = MonotonicClock::new();
    /// let before = clock.current_millis();
    ///
    /// std::thread::sleep(Duration::from_millis(5));
    ///
    /// // Sleep accuracy varies, but the reading never goes backward.
    /// assert!(clock.current_millis() >= before);
    /// ```
    pub fn new() -> Self {
        let start = Instant::now();
        let anchor_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64);

        let inner = Arc::new(SharedTickerInner {
            elapsed: AtomicU64::new(0),
        });

        let weak_inner = Arc::downgrade(&inner);
        thread::spawn(move || {
            let mut tick = 0;

            loop {
                let Some(inner_ref) = weak_inner.upgrade() else {
                    break;
                };

                // Absolute target time of the next tick
                let target = start + Duration::from_millis(tick);

                let now = Instant::now();
                if now < target {
                    thread::sleep(target - now);
                }

                let now_ms = start.elapsed().as_millis() as u64;
                inner_ref.elapsed.store(now_ms, Ordering::Release);

                // Align to the next tick after the actual time
                tick = now_ms + 1;
            }
        });

        Self {
            inner,
            anchor_millis,
        }
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> u64 {
        self.anchor_millis + self.inner.elapsed.load(Ordering::Acquire)
    }
}
