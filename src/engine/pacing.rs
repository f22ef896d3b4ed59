use std::time::Duration;

/// Turns elapsed real time into whole simulated ticks.
///
/// Each frame's delta is clamped so a stalled host (suspended tab, debugger
/// pause) cannot fire a burst of catch-up ticks.
#[derive(Debug, Clone)]
pub struct TickAccumulator {
    period: Duration,
    max_frame: Duration,
    accumulated: Duration,
}

impl TickAccumulator {
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(60);
    pub const DEFAULT_MAX_FRAME: Duration = Duration::from_millis(50);

    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            max_frame: Self::DEFAULT_MAX_FRAME,
            accumulated: Duration::ZERO,
        }
    }

    pub fn with_max_frame(mut self, max_frame: Duration) -> Self {
        self.max_frame = max_frame;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Adds one frame of elapsed time and returns how many tick boundaries
    /// were crossed.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulated += elapsed.min(self.max_frame);
        let mut due = 0;
        while self.accumulated >= self.period {
            self.accumulated -= self.period;
            due += 1;
        }
        due
    }

    /// Restarts the current period, dropping any partial progress.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }

    /// Time left until the next tick fires.
    pub fn remaining(&self) -> Duration {
        self.period.saturating_sub(self.accumulated)
    }
}

impl Default for TickAccumulator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PERIOD)
    }
}
