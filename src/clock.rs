//! Version tokens.
//!
//! A record version is a wall-clock timestamp in microseconds since the Unix epoch. Plain wall-clock values can
//! repeat (coarse timers, two writes within one tick) or even go backwards, which would let two writers observe the
//! same "new" version. [`VersionClock`] hands out values that are never lower than the wall clock but strictly
//! greater than anything it issued before and than the version being replaced.
use std::fmt::Debug;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub trait Clock: Debug + Send + Sync + 'static {
    /// Current time, microseconds since the Unix epoch.
    fn now_micros(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_micros(&self) -> i64 {
        chrono::Utc::now().timestamp_micros()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, by: i64) -> i64 {
        self.now.fetch_add(by, Ordering::SeqCst) + by
    }
}

impl Clock for ManualClock {
    fn now_micros(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct VersionClock {
    clock: Arc<dyn Clock>,
    last:  AtomicI64,
}

impl VersionClock {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: AtomicI64::new(i64::MIN),
        }
    }

    /// Version for a freshly inserted record.
    pub fn next(&self) -> i64 {
        self.next_after(i64::MIN)
    }

    /// Version to replace `current` with.
    pub fn next_after(&self, current: i64) -> i64 {
        let now = self.clock.now_micros();
        let floor = current.saturating_add(1);
        let mut issued = 0;
        // The closure always returns Some, so the update cannot fail.
        let _ = self.last.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            issued = now.max(floor).max(last.saturating_add(1));
            Some(issued)
        });
        issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_wall_clock_when_it_moves() {
        let clock = Arc::new(ManualClock::new(10));
        let versions = VersionClock::new(clock.clone());
        assert_eq!(versions.next(), 10);
        clock.set(20);
        assert_eq!(versions.next_after(10), 20);
    }

    #[test]
    fn never_repeats_within_a_tick() {
        let clock = Arc::new(ManualClock::new(100));
        let versions = VersionClock::new(clock);
        let a = versions.next();
        let b = versions.next();
        let c = versions.next_after(b);
        assert!(a < b && b < c);
    }

    #[test]
    fn stays_above_replaced_version_when_clock_lags() {
        let clock = Arc::new(ManualClock::new(5));
        let versions = VersionClock::new(clock);
        assert_eq!(versions.next_after(1_000), 1_001);
        // Anything issued later is above the previous maximum too.
        assert_eq!(versions.next(), 1_002);
    }
}
