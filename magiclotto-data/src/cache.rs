use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::models::HistoryLog;

struct CachedHistory {
    history: HistoryLog,
    fetched_at: Instant,
}

/// Caller-owned memo of the full draw history.
///
/// Entries expire after `ttl` when one is set; otherwise they live until
/// `invalidate` is called.
pub struct HistoryCache {
    ttl: Option<Duration>,
    entry: Option<CachedHistory>,
}

impl HistoryCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self { ttl, entry: None }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Instant::now())
    }

    fn is_fresh_at(&self, now: Instant) -> bool {
        match (&self.entry, self.ttl) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(entry), Some(ttl)) => now.saturating_duration_since(entry.fetched_at) < ttl,
        }
    }

    /// The cached history, if present and not expired.
    pub fn get(&self) -> Option<&HistoryLog> {
        if self.is_fresh() {
            self.entry.as_ref().map(|e| &e.history)
        } else {
            None
        }
    }

    /// Returns the cached history, running `fetch` first on a miss or expiry.
    pub fn get_or_fetch(&mut self, fetch: impl FnOnce() -> HistoryLog) -> &HistoryLog {
        if self.entry.is_some() && !self.is_fresh() {
            debug!("cached history expired");
            self.entry = None;
        }
        let entry = self.entry.get_or_insert_with(|| {
            let history = fetch();
            info!(records = history.len(), "history cached");
            CachedHistory {
                history,
                fetched_at: Instant::now(),
            }
        });
        &entry.history
    }

    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            debug!("history cache invalidated");
        }
    }
}
