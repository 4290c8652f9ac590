//! Elapsed-time source for step budgeting

use std::time::{Duration, Instant};

/// Supplies the time spent in the current step
///
/// The tracer restarts the clock when a step begins and polls it after every
/// expanded polygon.
pub trait StepClock {
    fn restart(&mut self);
    fn elapsed(&self) -> Duration;
}

/// Wall-clock implementation backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct InstantClock {
    start: Instant,
}

impl InstantClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl StepClock for InstantClock {
    fn restart(&mut self) {
        self.start = Instant::now();
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
