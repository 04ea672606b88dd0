//! Signature database freshness
//!
//! A `FreshnessCache` is created once and shared (behind an `Arc`) by every
//! engine in the process. A refresh is due when no interval is configured, when
//! no refresh has been recorded yet, or when `now > last_refreshed + interval`.

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Result of a refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed,
    NotDue,
    /// The updater failed; the previous timestamp is kept.
    Failed(String),
}

#[derive(Debug, Default)]
struct FreshnessState {
    refresh_interval: Option<Duration>,
    last_refreshed: Option<DateTime<Utc>>,
}

impl FreshnessState {
    fn is_due(&self, now: DateTime<Utc>) -> bool {
        let (Some(interval), Some(last_refreshed)) = (self.refresh_interval, self.last_refreshed)
        else {
            return true;
        };

        // An interval too large to represent is never exceeded.
        match chrono::Duration::from_std(interval)
            .ok()
            .and_then(|interval| last_refreshed.checked_add_signed(interval))
        {
            Some(next_refresh) => now > next_refresh,
            None => false,
        }
    }
}

pub struct FreshnessCache {
    state: Mutex<FreshnessState>,
    /// Bumped after every successful refresh.
    generation: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl FreshnessCache {
    pub fn new(refresh_interval: Option<Duration>) -> Self {
        Self::with_clock(refresh_interval, Arc::new(SystemClock))
    }

    pub fn with_clock(refresh_interval: Option<Duration>, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(FreshnessState {
                refresh_interval,
                last_refreshed: None,
            }),
            generation: AtomicU64::new(0),
            clock,
        }
    }

    pub async fn is_due(&self) -> bool {
        let now = self.clock.now();
        self.state.lock().await.is_due(now)
    }

    pub async fn record_refresh(&self, at: DateTime<Utc>) {
        self.state.lock().await.last_refreshed = Some(at);
    }

    pub async fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.last_refreshed
    }

    pub async fn refresh_interval(&self) -> Option<Duration> {
        self.state.lock().await.refresh_interval
    }

    pub async fn set_refresh_interval(&self, refresh_interval: Option<Duration>) {
        self.state.lock().await.refresh_interval = refresh_interval;
    }

    /// Run `refresh` if one is due and record the time it finished.
    ///
    /// At most one updater runs at a time. Callers that arrive while it runs
    /// wait for it and share its result: if it succeeded they return `NotDue`
    /// without running another, even when no interval is configured. A failed
    /// refresh leaves the timestamp alone and the next caller tries again.
    pub async fn refresh_if_due<F, Fut, E>(&self, refresh: F) -> RefreshOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let seen = self.generation.load(Ordering::Acquire);
        let mut state = self.state.lock().await;
        if self.generation.load(Ordering::Acquire) != seen {
            tracing::debug!("Signature database refreshed while waiting");
            return RefreshOutcome::NotDue;
        }
        if !state.is_due(self.clock.now()) {
            tracing::debug!(last_refreshed = ?state.last_refreshed, "Signature database is fresh");
            return RefreshOutcome::NotDue;
        }

        match refresh().await {
            Ok(()) => {
                let now = self.clock.now();
                state.last_refreshed = Some(now);
                self.generation.fetch_add(1, Ordering::AcqRel);
                tracing::info!(refreshed_at = %now, "Signature database refreshed");
                RefreshOutcome::Refreshed
            }
            Err(e) => {
                tracing::warn!(error = %e, "Signature database refresh failed");
                RefreshOutcome::Failed(e.to_string())
            }
        }
    }
}

impl Default for FreshnessCache {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for FreshnessCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreshnessCache").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn cache_at(now: DateTime<Utc>, interval: Option<Duration>) -> FreshnessCache {
        FreshnessCache::with_clock(interval, Arc::new(FixedClock(now)))
    }

    #[tokio::test]
    async fn test_no_interval_is_always_due() {
        let cache = cache_at(noon(), None);
        assert!(cache.is_due().await);
        cache.record_refresh(noon()).await;
        assert!(cache.is_due().await);
        cache.record_refresh(noon() + chrono::Duration::days(1)).await;
        assert!(cache.is_due().await);
    }

    #[tokio::test]
    async fn test_never_refreshed_is_due() {
        let cache = cache_at(noon(), Some(Duration::from_secs(3600)));
        assert!(cache.is_due().await);
    }

    #[tokio::test]
    async fn test_future_timestamp_is_not_due() {
        let cache = cache_at(noon(), Some(Duration::from_secs(60)));
        cache.record_refresh(noon() + chrono::Duration::hours(1)).await;
        assert!(!cache.is_due().await);
    }

    #[tokio::test]
    async fn test_due_only_after_interval_has_passed() {
        let interval = Some(Duration::from_secs(3600));

        let cache = cache_at(noon(), interval);
        cache.record_refresh(noon() - chrono::Duration::minutes(30)).await;
        assert!(!cache.is_due().await);

        // Exactly at the boundary is not yet due.
        cache.record_refresh(noon() - chrono::Duration::hours(1)).await;
        assert!(!cache.is_due().await);

        cache.record_refresh(noon() - chrono::Duration::minutes(61)).await;
        assert!(cache.is_due().await);
    }

    #[tokio::test]
    async fn test_huge_interval_never_expires() {
        let cache = cache_at(noon(), Some(Duration::from_secs(u64::MAX)));
        cache.record_refresh(noon() - chrono::Duration::days(365)).await;
        assert!(!cache.is_due().await);
    }

    #[tokio::test]
    async fn test_refresh_if_due_records_on_success() {
        let cache = cache_at(noon(), Some(Duration::from_secs(3600)));

        let outcome = cache.refresh_if_due(|| async { Ok::<(), String>(()) }).await;
        assert_eq!(outcome, RefreshOutcome::Refreshed);
        assert_eq!(cache.last_refreshed().await, Some(noon()));

        let outcome = cache.refresh_if_due(|| async { Ok::<(), String>(()) }).await;
        assert_eq!(outcome, RefreshOutcome::NotDue);
    }

    #[tokio::test]
    async fn test_refresh_if_due_keeps_timestamp_on_failure() {
        let cache = cache_at(noon(), Some(Duration::from_secs(3600)));

        let outcome = cache
            .refresh_if_due(|| async { Err::<(), _>("freshclam exited with 1") })
            .await;
        assert_eq!(outcome, RefreshOutcome::Failed("freshclam exited with 1".to_string()));
        assert!(cache.last_refreshed().await.is_none());
        assert!(cache.is_due().await);
    }

    #[tokio::test]
    async fn test_waiting_callers_share_one_refresh() {
        let cache = cache_at(noon(), None);
        let counter = AtomicU64::new(0);
        let runs = &counter;
        let refresh = move || async move {
            runs.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<(), String>(())
        };

        let (first, second, third) = tokio::join!(
            cache.refresh_if_due(refresh),
            cache.refresh_if_due(refresh),
            cache.refresh_if_due(refresh),
        );
        let mut outcomes = [first, second, third]
            .iter()
            .map(|outcome| format!("{:?}", outcome))
            .collect::<Vec<_>>();
        outcomes.sort();
        assert_eq!(outcomes, ["NotDue", "NotDue", "Refreshed"]);
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        // Without an interval, a later caller refreshes again.
        assert_eq!(cache.refresh_if_due(refresh).await, RefreshOutcome::Refreshed);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_waiters_retry_after_failed_refresh() {
        let cache = cache_at(noon(), None);
        let counter = AtomicU64::new(0);
        let runs = &counter;
        let failing = move || async move {
            runs.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Err::<(), _>("mirror unreachable")
        };

        let (first, second) = tokio::join!(
            cache.refresh_if_due(failing),
            cache.refresh_if_due(failing),
        );
        assert!(matches!(first, RefreshOutcome::Failed(_)));
        assert!(matches!(second, RefreshOutcome::Failed(_)));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_set_refresh_interval() {
        let cache = cache_at(noon(), None);
        assert!(cache.refresh_interval().await.is_none());
        cache.set_refresh_interval(Some(Duration::from_secs(10))).await;
        assert_eq!(cache.refresh_interval().await, Some(Duration::from_secs(10)));
    }
}
