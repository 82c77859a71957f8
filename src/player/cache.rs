use chrono::{DateTime, Duration, Utc};

/// Last fetched value with a staleness threshold.
///
/// This is the one caching policy the player uses: the album library is
/// kept for a day, the access token for one heartbeat. Callers fetch outside
/// whatever lock guards the cache and `store` only on success, so a failed
/// fetch leaves the previous value in place.
#[derive(Debug, Clone)]
pub struct Cached<T> {
    value: Option<T>,
    fetched_at: Option<DateTime<Utc>>,
    stale_after: Duration,
}

impl<T: Clone> Cached<T> {
    pub fn new(stale_after: Duration) -> Self {
        Cached {
            value: None,
            fetched_at: None,
            stale_after,
        }
    }

    /// Restores a value fetched at `fetched_at`, e.g. from disk.
    pub fn restore(value: T, fetched_at: Option<DateTime<Utc>>, stale_after: Duration) -> Self {
        Cached {
            value: Some(value),
            fetched_at,
            stale_after,
        }
    }

    pub fn peek(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        match (&self.value, self.fetched_at) {
            (Some(_), Some(at)) => now - at >= self.stale_after,
            _ => true,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.is_stale_at(Utc::now())
    }

    pub fn store(&mut self, value: T) {
        self.store_at(value, Utc::now());
    }

    pub fn store_at(&mut self, value: T, now: DateTime<Utc>) {
        self.value = Some(value);
        self.fetched_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cache_is_stale() {
        let cache: Cached<u32> = Cached::new(Duration::hours(1));
        assert!(cache.is_stale());
        assert!(cache.peek().is_none());
    }

    #[test]
    fn staleness_follows_the_threshold() {
        let now = Utc::now();
        let mut cache = Cached::new(Duration::hours(24));
        cache.store_at(vec![1, 2, 3], now);

        assert!(!cache.is_stale_at(now + Duration::hours(23)));
        assert!(cache.is_stale_at(now + Duration::hours(24)));
    }

    #[test]
    fn restored_values_without_timestamp_are_stale() {
        let cache = Cached::restore("albums", None, Duration::hours(24));
        assert_eq!(cache.peek(), Some(&"albums"));
        assert!(cache.is_stale());
    }

    #[test]
    fn storing_replaces_the_value_and_timestamp() {
        let then = Utc::now() - Duration::hours(30);
        let mut cache = Cached::restore(1, Some(then), Duration::hours(24));
        assert!(cache.is_stale());

        cache.store(2);
        assert_eq!(cache.peek(), Some(&2));
        assert!(!cache.is_stale());
        assert!(cache.fetched_at().unwrap() > then);
    }
}
