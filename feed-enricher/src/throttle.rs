use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_COST_CEILING: u64 = 3_500_000;
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(65);

/// Run-wide enrichment cost accounting.
///
/// Once the cumulative cost exceeds the ceiling every further insert attempt
/// is followed by a cooldown on the worker that made it. The counter only
/// grows and lives as long as the run.
#[derive(Debug)]
pub struct CostThrottle {
    total: AtomicU64,
    ceiling: u64,
    cooldown: Duration,
}

impl CostThrottle {
    pub fn new(ceiling: u64, cooldown: Duration) -> Self {
        Self {
            total: AtomicU64::new(0),
            ceiling,
            cooldown,
        }
    }

    /// Add `cost` and return the new cumulative total.
    pub fn record_cost(&self, cost: u64) -> u64 {
        self.total.fetch_add(cost, Ordering::SeqCst) + cost
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    pub fn should_pause(&self) -> bool {
        self.total() > self.ceiling
    }

    pub fn ceiling(&self) -> u64 {
        self.ceiling
    }

    /// Sleep for the cooldown if the ceiling has been crossed. Only the
    /// calling task waits. Returns whether it paused.
    pub async fn cool_down_if_needed(&self) -> bool {
        if !self.should_pause() {
            return false;
        }
        warn!(
            total = self.total(),
            ceiling = self.ceiling,
            "Token ceiling exceeded, pausing worker for {:?}",
            self.cooldown
        );
        tokio::time::sleep(self.cooldown).await;
        true
    }
}

impl Default for CostThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_COST_CEILING, DEFAULT_COOLDOWN)
    }
}
