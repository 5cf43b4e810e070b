use std::cell::Cell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

/// Monotonic time source used by the convergence poller.
///
/// All timeout arithmetic in the workspace goes through this trait so the
/// poller can run against virtual time in tests.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Whole milliseconds elapsed since `epoch`, saturating at 0.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let elapsed = self.now().saturating_duration_since(epoch);
        u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, d: Duration) {
        (**self).sleep(d);
    }
}

/// Wall-clock implementation backed by `std::time::Instant`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if !d.is_zero() {
            thread::sleep(d);
        }
    }
}

/// Virtual clock for deterministic tests and benches.
///
/// `sleep` returns immediately and moves virtual time forward. Clones share
/// the same timeline, so a test can keep a handle while the poller owns
/// another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Rc<Cell<Duration>>,
    sleeps: Rc<Cell<u32>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
            sleeps: Rc::new(Cell::new(0)),
        }
    }

    /// Move virtual time forward without counting a sleep.
    pub fn advance(&self, d: Duration) {
        self.offset.set(self.offset.get().saturating_add(d));
    }

    /// Virtual time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }

    /// Number of `sleep` calls observed so far.
    pub fn sleeps(&self) -> u32 {
        self.sleeps.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }

    fn sleep(&self, d: Duration) {
        self.sleeps.set(self.sleeps.get().saturating_add(1));
        self.advance(d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_sleep_advances_shared_timeline() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        let epoch = clock.now();

        clock.sleep(Duration::from_millis(100));
        clock.advance(Duration::from_millis(5));

        assert_eq!(handle.ms_since(epoch), 105);
        assert_eq!(handle.sleeps(), 1);
    }

    #[test]
    fn ms_since_saturates_for_future_epoch() {
        let clock = ManualClock::new();
        let future = clock.now() + Duration::from_secs(1);
        assert_eq!(clock.ms_since(future), 0);
    }
}
