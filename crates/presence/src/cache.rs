//! Shared presence cache.
//!
//! One `RwLock` guards the whole `(employees, last_success, ready)` triple,
//! so readers always see the fields as of a single write. Critical sections
//! only copy data; the network fetch happens entirely outside the lock.

use chrono::{DateTime, Duration, Utc};
use common::{Employee, PresenceSnapshot};
use tokio::sync::RwLock;

use crate::controls::PollerControls;
use crate::schedule::BusinessHours;

#[derive(Debug, Default)]
struct CacheState {
    employees: Vec<Employee>,
    last_success: Option<DateTime<Utc>>,
    ready: bool,
}

/// Last-known-good staff list with staleness accounting.
///
/// Written only by the poll loop, read by any number of snapshot consumers.
#[derive(Debug)]
pub struct PresenceCache {
    stale_threshold: Duration,
    inner: RwLock<CacheState>,
}

impl PresenceCache {
    /// Create an empty, not-ready cache.
    pub fn new(stale_threshold_secs: u64) -> Self {
        Self {
            stale_threshold: Duration::seconds(stale_threshold_secs as i64),
            inner: RwLock::new(CacheState::default()),
        }
    }

    /// Record a successful poll: store a name-sorted copy of the list, mark
    /// the success time, and flip `ready`.
    pub async fn write_success(&self, mut employees: Vec<Employee>, at: DateTime<Utc>) {
        sort_by_name(&mut employees);

        let mut state = self.inner.write().await;
        state.employees = employees;
        state.last_success = Some(at);
        state.ready = true;
    }

    /// Clear the list for closed hours.
    ///
    /// Deliberately leaves `last_success` untouched: a closed board is not a
    /// successful poll, so the staleness clock keeps running from the last
    /// real success. `ready` still flips so the first cycle of a closed day
    /// counts as a completed poll attempt.
    pub async fn write_forced_empty(&self) {
        let mut state = self.inner.write().await;
        state.employees.clear();
        state.ready = true;
    }

    /// Consistent point-in-time view for readers. Never fails.
    ///
    /// The triple is copied under the read guard; staleness and openness are
    /// derived after the guard is released.
    pub async fn snapshot(
        &self,
        now: DateTime<Utc>,
        hours: &BusinessHours,
        controls: &PollerControls,
    ) -> PresenceSnapshot {
        let (employees, last_success, ready) = {
            let state = self.inner.read().await;
            (state.employees.clone(), state.last_success, state.ready)
        };

        // Strictly greater-than: exactly at the threshold is still fresh,
        // and a cache with no success ever is not stale.
        let is_stale = last_success
            .map(|at| now - at > self.stale_threshold)
            .unwrap_or(false);

        PresenceSnapshot {
            employees,
            ready,
            is_stale,
            is_open: hours.is_open(now, controls),
        }
    }
}

/// Stable sort by case-insensitive name; records with no usable name sort
/// first on the empty-string key.
pub fn sort_by_name(employees: &mut [Employee]) {
    employees.sort_by_key(Employee::sort_key);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use common::config::ScheduleConfig;
    use serde_json::json;

    const STALE_SECS: u64 = 120;

    fn emp(name: &str) -> Employee {
        serde_json::from_value(json!({"name": name, "onsite_status": "onsite"})).unwrap()
    }

    fn nameless() -> Employee {
        serde_json::from_value(json!({"onsite_status": "offsite"})).unwrap()
    }

    fn hours() -> BusinessHours {
        BusinessHours::from_config(&ScheduleConfig::default()).unwrap()
    }

    // A Monday morning, inside default business hours.
    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_snapshot_sorted_case_insensitive_nameless_first() {
        let cache = PresenceCache::new(STALE_SECS);
        cache
            .write_success(
                vec![emp("claire"), emp("Bob"), nameless(), emp("alice")],
                t0(),
            )
            .await;

        let snap = cache.snapshot(t0(), &hours(), &PollerControls::new()).await;
        let names: Vec<&str> = snap.employees.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["", "alice", "Bob", "claire"]);
    }

    #[tokio::test]
    async fn test_staleness_boundary_is_strict() {
        let cache = PresenceCache::new(STALE_SECS);
        let controls = PollerControls::new();
        cache.write_success(vec![emp("Ada")], t0()).await;

        let at_threshold = t0() + Duration::seconds(STALE_SECS as i64);
        let snap = cache.snapshot(at_threshold, &hours(), &controls).await;
        assert!(!snap.is_stale, "exactly at the threshold is still fresh");

        let past_threshold = at_threshold + Duration::seconds(1);
        let snap = cache.snapshot(past_threshold, &hours(), &controls).await;
        assert!(snap.is_stale);
    }

    #[tokio::test]
    async fn test_never_successful_is_not_stale() {
        let cache = PresenceCache::new(STALE_SECS);
        let snap = cache.snapshot(t0(), &hours(), &PollerControls::new()).await;
        assert!(!snap.is_stale);
        assert!(!snap.ready);
        assert!(snap.employees.is_empty());
    }

    #[tokio::test]
    async fn test_forced_empty_keeps_staleness_clock() {
        let cache = PresenceCache::new(STALE_SECS);
        let controls = PollerControls::new();
        cache.write_success(vec![emp("Ada")], t0()).await;
        cache.write_forced_empty().await;

        // Closed and stale are independent axes: the list is empty but the
        // staleness clock still runs from the last real success.
        let later = t0() + Duration::seconds(STALE_SECS as i64 + 1);
        let snap = cache.snapshot(later, &hours(), &controls).await;
        assert!(snap.employees.is_empty());
        assert!(snap.is_stale);

        let soon = t0() + Duration::seconds(5);
        let snap = cache.snapshot(soon, &hours(), &controls).await;
        assert!(snap.employees.is_empty());
        assert!(!snap.is_stale);
    }

    #[tokio::test]
    async fn test_ready_never_reverts() {
        let cache = PresenceCache::new(STALE_SECS);
        let controls = PollerControls::new();

        cache.write_forced_empty().await;
        assert!(cache.snapshot(t0(), &hours(), &controls).await.ready);

        cache.write_success(vec![emp("Ada")], t0()).await;
        assert!(cache.snapshot(t0(), &hours(), &controls).await.ready);

        cache.write_forced_empty().await;
        assert!(cache.snapshot(t0(), &hours(), &controls).await.ready);
    }

    #[tokio::test]
    async fn test_snapshot_is_open_reflects_read_time() {
        let cache = PresenceCache::new(STALE_SECS);
        let controls = PollerControls::new();
        cache.write_success(vec![emp("Ada")], t0()).await;

        assert!(cache.snapshot(t0(), &hours(), &controls).await.is_open);

        // Sunday is absent from the default table.
        let sunday = Utc.with_ymd_and_hms(2024, 1, 7, 10, 0, 0).unwrap();
        assert!(!cache.snapshot(sunday, &hours(), &controls).await.is_open);

        controls.force_open();
        assert!(cache.snapshot(sunday, &hours(), &controls).await.is_open);
    }

    #[tokio::test]
    async fn test_concurrent_readers_see_consistent_triples() {
        use std::sync::Arc;

        let cache = Arc::new(PresenceCache::new(STALE_SECS));
        let hours = Arc::new(hours());

        // Writer alternates between two batches tagged by a matching
        // timestamp; readers must never see a list from one write paired
        // with the other write's timestamp.
        let t_a = t0();
        let t_b = t0() + Duration::seconds(30);

        let writer = {
            let cache = cache.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    cache.write_success(vec![emp("A")], t_a).await;
                    cache.write_success(vec![emp("B1"), emp("B2")], t_b).await;
                }
            })
        };

        let reader = {
            let cache = cache.clone();
            let hours = hours.clone();
            tokio::spawn(async move {
                let controls = PollerControls::new();
                for _ in 0..200 {
                    // Probe just past t_a's staleness horizon: batch A must
                    // read stale, batch B must read fresh.
                    let probe = t_a + Duration::seconds(STALE_SECS as i64 + 1);
                    let snap = cache.snapshot(probe, &hours, &controls).await;
                    match snap.employees.len() {
                        0 => {} // before the first write
                        1 => assert!(snap.is_stale, "batch A must carry t_a"),
                        2 => assert!(!snap.is_stale, "batch B must carry t_b"),
                        n => panic!("impossible batch size {}", n),
                    }
                }
            })
        };

        writer.await.unwrap();
        reader.await.unwrap();
    }
}
