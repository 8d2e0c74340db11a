use std::time::{Duration, Instant};

/// Source of elapsed time for the periodic triggers.
pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now(&mut self) -> Duration;

    /// Blocks (or advances, for simulated clocks) until `deadline`.
    fn sleep_until(&mut self, deadline: Duration);
}

#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&mut self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep_until(&mut self, deadline: Duration) {
        if let Some(remaining) = deadline.checked_sub(self.now()) {
            std::thread::sleep(remaining);
        }
    }
}

/// Simulated clock that only moves when told to. Sleeping jumps straight to the deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualClock {
    now: Duration,
}

impl ManualClock {
    pub fn new(start: Duration) -> Self {
        Self { now: start }
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    pub fn set(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }
}

impl Clock for ManualClock {
    fn now(&mut self) -> Duration {
        self.now
    }

    fn sleep_until(&mut self, deadline: Duration) {
        self.set(deadline);
    }
}

/// Fires once per `period`, starting one period after `start`.
///
/// A trigger polled late fires once and re-phases to `now + period`; missed
/// periods are counted, not replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTrigger {
    period: Duration,
    next_due: Duration,
    overruns: u64,
}

impl PeriodicTrigger {
    pub fn new(period: Duration, start: Duration) -> Self {
        Self {
            period,
            next_due: start + period,
            overruns: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn next_due(&self) -> Duration {
        self.next_due
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    pub fn is_due(&self, now: Duration) -> bool {
        now >= self.next_due
    }

    /// Returns `true` and schedules the next firing if the trigger is due at `now`.
    pub fn poll(&mut self, now: Duration) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.next_due += self.period;
        if self.next_due <= now {
            let missed = (now - self.next_due).as_nanos() / self.period.as_nanos().max(1) + 1;
            self.overruns += missed as u64;
            self.next_due = now + self.period;
        }
        true
    }
}
