use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fires at a fixed interval, driven by caller-supplied frame deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalTicker {
    interval_ms: u64,
    elapsed_ms: u64,
}

impl IntervalTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_ms: (interval.as_millis().min(u64::MAX as u128) as u64).max(1),
            elapsed_ms: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0;
    }

    /// Advances by `dt` and returns how many whole intervals completed.
    /// The remainder carries over to the next call.
    pub fn tick(&mut self, dt: Duration) -> u32 {
        let dt_ms = dt.as_millis().min(u64::MAX as u128) as u64;
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        let interval = self.interval_ms.max(1);
        let fired = self.elapsed_ms / interval;
        self.elapsed_ms %= interval;
        fired.min(u32::MAX as u64) as u32
    }
}
