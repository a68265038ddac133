use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use super::StoreError;
use super::clock::{Clock, bucket_for};
use super::json::JsonStore;

/// Persisted hourly counts, one bucket shared by every key.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitState {
    #[serde(default)]
    pub hour: i64,
    #[serde(default)]
    pub counts: BTreeMap<String, u64>,
}

impl RateLimitState {
    fn roll_over(&mut self, current_hour: i64) {
        if self.hour != current_hour {
            self.hour = current_hour;
            self.counts.clear();
        }
    }

    fn count(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }
}

/// Outcome of a single rate-limited event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    /// Count for the key after this call. On rejection this is the
    /// unchanged count.
    pub count: u64,
}

/// Per-key hourly ceiling backed by a [`JsonStore`].
///
/// The whole load, check, increment, persist sequence runs under one lock so
/// two handlers can never both observe the same pre-increment count.
pub struct HourlyRateLimiter {
    store: JsonStore<RateLimitState>,
    clock: Arc<dyn Clock>,
    lock: Mutex<()>,
}

impl HourlyRateLimiter {
    pub fn new(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: JsonStore::new(path),
            clock,
            lock: Mutex::new(()),
        }
    }

    /// Counts one event for `key` unless that would exceed `limit`.
    /// A `limit` of zero or less means no limit.
    pub fn increment_and_check(&self, key: &str, limit: i64) -> Result<Decision, StoreError> {
        let _guard = self.guard();

        let mut state = self.store.load();
        state.roll_over(bucket_for(self.clock.now()));

        let current = state.count(key);
        // an overflowing count is over any limit, unlimited included
        let count = match current.checked_add(1) {
            Some(next) if limit <= 0 || next <= limit as u64 => next,
            _ => {
                tracing::info!("Hourly limit reached for {}: {}/{}", key, current, limit);
                return Ok(Decision {
                    allowed: false,
                    count: current,
                });
            }
        };

        state.counts.insert(key.to_string(), count);
        self.store.save(&state).inspect_err(|e| {
            tracing::error!("Failed to persist rate limit for {}: {}", key, e);
        })?;

        Ok(Decision {
            allowed: true,
            count,
        })
    }

    /// Current-hour count for `key`. Nothing is written.
    pub fn get_count(&self, key: &str) -> u64 {
        let _guard = self.guard();

        let state = self.store.load();
        if state.hour != bucket_for(self.clock.now()) {
            return 0;
        }
        state.count(key)
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // the guarded value is (), nothing to repair after a panic
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::clock::{ManualClock, SECONDS_PER_HOUR};
    use std::fs;
    use std::thread;
    use tempfile::tempdir;

    const T0: i64 = 1_700_000_000;

    fn limiter(dir: &tempfile::TempDir, clock: Arc<ManualClock>) -> HourlyRateLimiter {
        HourlyRateLimiter::new(dir.path().join("rate_limits.json"), clock)
    }

    #[test]
    fn cat_scenario() {
        let dir = tempdir().unwrap();
        let limiter = limiter(&dir, Arc::new(ManualClock::new(T0)));

        let results: Vec<_> = (0..4)
            .map(|_| limiter.increment_and_check("cat", 3).unwrap())
            .map(|d| (d.allowed, d.count))
            .collect();

        assert_eq!(results, vec![(true, 1), (true, 2), (true, 3), (false, 3)]);
        assert_eq!(limiter.get_count("cat"), 3);
    }

    #[test]
    fn rejection_does_not_touch_the_file() {
        let dir = tempdir().unwrap();
        let limiter = limiter(&dir, Arc::new(ManualClock::new(T0)));
        limiter.increment_and_check("poke", 1).unwrap();

        let path = dir.path().join("rate_limits.json");
        let before = fs::read(&path).unwrap();
        let decision = limiter.increment_and_check("poke", 1).unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.count, 1);
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn non_positive_limit_is_unlimited() {
        let dir = tempdir().unwrap();
        let limiter = limiter(&dir, Arc::new(ManualClock::new(T0)));

        for limit in [0, -1, i64::MIN] {
            for _ in 0..50 {
                assert!(limiter.increment_and_check("cat", limit).unwrap().allowed);
            }
        }
        assert_eq!(limiter.get_count("cat"), 150);
    }

    #[test]
    fn rollover_resets_every_key() {
        let dir = tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(T0));
        let limiter = limiter(&dir, clock.clone());

        for _ in 0..5 {
            limiter.increment_and_check("cat", 10).unwrap();
        }
        limiter.increment_and_check("poke", 10).unwrap();

        clock.advance(SECONDS_PER_HOUR);
        assert_eq!(limiter.get_count("cat"), 0);
        assert_eq!(limiter.get_count("poke"), 0);

        let decision = limiter.increment_and_check("cat", 10).unwrap();
        assert_eq!(decision, Decision { allowed: true, count: 1 });

        let state = JsonStore::<RateLimitState>::new(dir.path().join("rate_limits.json")).load();
        assert_eq!(state.hour, bucket_for(T0 + SECONDS_PER_HOUR));
        assert_eq!(state.counts.len(), 1);
    }

    #[test]
    fn rollover_applies_to_a_rejected_key() {
        let dir = tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(T0));
        let limiter = limiter(&dir, clock.clone());

        limiter.increment_and_check("cat", 1).unwrap();
        assert!(!limiter.increment_and_check("cat", 1).unwrap().allowed);

        clock.advance(SECONDS_PER_HOUR);
        assert!(limiter.increment_and_check("cat", 1).unwrap().allowed);
    }

    #[test]
    fn get_count_ignores_stale_hour_without_writing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rate_limits.json");
        let stale = r#"{"hour": 1, "counts": {"cat": 7}}"#;
        fs::write(&path, stale).unwrap();

        let limiter = limiter(&dir, Arc::new(ManualClock::new(T0)));
        assert_eq!(limiter.get_count("cat"), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), stale);
    }

    #[test]
    fn saturated_count_is_rejected_without_writing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rate_limits.json");
        let saturated = format!(
            r#"{{"hour":{},"counts":{{"cat":{}}}}}"#,
            bucket_for(T0),
            u64::MAX
        );
        fs::write(&path, &saturated).unwrap();

        let limiter = limiter(&dir, Arc::new(ManualClock::new(T0)));
        for limit in [5, 0] {
            let decision = limiter.increment_and_check("cat", limit).unwrap();
            assert_eq!(decision, Decision { allowed: false, count: u64::MAX });
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), saturated);
    }

    #[test]
    fn corrupt_file_starts_a_fresh_bucket() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("rate_limits.json"), "{{{{").unwrap();

        let limiter = limiter(&dir, Arc::new(ManualClock::new(T0)));
        let decision = limiter.increment_and_check("cat", 3).unwrap();
        assert_eq!(decision, Decision { allowed: true, count: 1 });
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        const THREADS: usize = 16;

        let dir = tempdir().unwrap();
        let limiter = Arc::new(limiter(&dir, Arc::new(ManualClock::new(T0))));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let limiter = limiter.clone();
                thread::spawn(move || limiter.increment_and_check("cat", THREADS as i64).unwrap())
            })
            .collect();

        let mut counts: Vec<u64> = handles
            .into_iter()
            .map(|h| {
                let decision = h.join().unwrap();
                assert!(decision.allowed);
                decision.count
            })
            .collect();
        counts.sort_unstable();

        assert_eq!(counts, (1..=THREADS as u64).collect::<Vec<_>>());
        assert_eq!(limiter.get_count("cat"), THREADS as u64);
    }
}
