//! The monotonic clock collaborator (`spec.md` §1: "the core assumes it is
//! handed a SessionId, a clock, a PRNG, ..."). The simulator itself never
//! reads a wall clock (`spec.md` §9) — only the tick driver does, to
//! compute `dt` and to stamp `now` on entities it hands to `Session::tick`.

use std::sync::Arc;
use std::time::Instant;

pub trait Clock: Send + Sync {
    /// Seconds since some arbitrary but fixed epoch for this clock
    /// instance. Only deltas between calls are meaningful.
    fn now_secs(&self) -> f64;
}

/// Wall-clock backed implementation, the one used outside of tests.
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

pub fn shared_system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock::new())
}
