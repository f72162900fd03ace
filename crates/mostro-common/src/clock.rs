use std::sync::atomic::{AtomicI64, Ordering};

/// Source of the current Unix timestamp, seconds precision.
///
/// Production code uses [`SystemClock`]; tests that assert on tweaked
/// timestamps (§4.D) or cooldown windows (§4.I) use [`FixedClock`].
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// A clock pinned to a fixed instant, with an `advance` escape hatch for
/// tests that need to move time forward deterministically.
#[derive(Debug)]
pub struct FixedClock(AtomicI64);

impl FixedClock {
    pub fn new(unix_time: i64) -> Self {
        Self(AtomicI64::new(unix_time))
    }

    pub fn advance(&self, seconds: i64) {
        self.0.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_unix(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::new(1_000);
        assert_eq!(clock.now_unix(), 1_000);
        clock.advance(60);
        assert_eq!(clock.now_unix(), 1_060);
    }

    #[test]
    fn system_clock_is_plausible() {
        let now = SystemClock.now_unix();
        assert!(now > 1_700_000_000);
    }
}
