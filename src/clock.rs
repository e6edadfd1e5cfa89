use std::cell::Cell;
use std::time::{Duration, Instant};

/// Source of "now" for the scheduler's budget checks, as time elapsed since some fixed origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock time since the clock was created.
#[derive(Debug, Copy, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> MonotonicClock {
        MonotonicClock { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        MonotonicClock::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A deterministic clock that moves forward a fixed amount every time it is read.
/// Lets a driver loop or a test decide exactly how much "work time" each step costs.
#[derive(Debug, Clone)]
pub struct SteppingClock {
    current: Cell<Duration>,
    tick: Duration,
}

impl SteppingClock {
    pub fn new(tick: Duration) -> SteppingClock {
        SteppingClock {
            current: Cell::new(Duration::from_secs(0)),
            tick,
        }
    }

    /// Jump forward, e.g. to model the gap between two frames.
    pub fn advance(&self, by: Duration) {
        self.current.set(self.current.get() + by);
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> Duration {
        let now = self.current.get();
        self.current.set(now + self.tick);
        now
    }
}

impl<'a, C: Clock + ?Sized> Clock for &'a C {
    #[inline]
    fn now(&self) -> Duration {
        (**self).now()
    }
}
