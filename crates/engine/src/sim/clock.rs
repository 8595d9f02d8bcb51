use std::time::Duration;

/// Logical simulation clock. Every timer in the simulation reads this clock,
/// so identical tick sequences replay identically regardless of wall time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimClock {
    elapsed: Duration,
    ticks: u64,
}

impl SimClock {
    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
        self.ticks = self.ticks.saturating_add(1);
    }

    pub fn now_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
