use std::sync::atomic::{AtomicU64, Ordering};

use gidata_core::Clock;

/// Manually driven clock for deterministic window resolution.
#[derive(Debug)]
pub struct FixedClock(AtomicU64);

impl FixedClock {
    /// Clock frozen at `now_ms`.
    #[must_use]
    pub const fn new(now_ms: f64) -> Self {
        Self(AtomicU64::new(now_ms.to_bits()))
    }

    /// Move the clock to `now_ms`.
    pub fn set(&self, now_ms: f64) {
        self.0.store(now_ms.to_bits(), Ordering::SeqCst);
    }

    /// Move the clock forward by `ms`.
    pub fn advance(&self, ms: f64) {
        self.set(self.now_ms() + ms);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::SeqCst))
    }
}
