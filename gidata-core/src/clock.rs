use chrono::Utc;

/// Source of "now" used to resolve relative windows.
pub trait Clock: Send + Sync {
    /// Current time in epoch milliseconds.
    fn now_ms(&self) -> f64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[allow(clippy::cast_precision_loss)]
    fn now_ms(&self) -> f64 {
        Utc::now().timestamp_micros() as f64 / 1_000.0
    }
}
