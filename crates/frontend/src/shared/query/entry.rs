use leptos::prelude::*;
use serde_json::Value;

/// Lifecycle of one cached query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Refetching,
    Success,
    Error,
}

/// One cache slot, keyed by a [`QueryKey`](super::QueryKey).
///
/// All fields are signals so views can subscribe to exactly what they need.
/// Entries are created lazily on first access and live for the application
/// session unless invalidated. `generation` guards every write-back: a run
/// whose snapshot no longer matches the entry's generation has been
/// superseded and must not clobber fresher data.
#[derive(Clone, Copy)]
pub struct QueryEntry {
    pub data: RwSignal<Option<Value>>,
    pub error: RwSignal<Option<String>>,
    pub status: RwSignal<QueryStatus>,
    /// Wall-clock ms of the last successful update; 0 = never succeeded.
    pub updated_at: RwSignal<f64>,
    pub in_flight: RwSignal<bool>,
    pub generation: RwSignal<u64>,
}

impl QueryEntry {
    pub fn new() -> Self {
        Self {
            data: RwSignal::new(None),
            error: RwSignal::new(None),
            status: RwSignal::new(QueryStatus::Idle),
            updated_at: RwSignal::new(0.0),
            in_flight: RwSignal::new(false),
            generation: RwSignal::new(0),
        }
    }

    /// Stale = has succeeded before and the configured time has elapsed.
    /// An entry that never succeeded is neither fresh nor stale.
    pub fn is_stale(&self, stale_time_ms: f64, now: f64) -> bool {
        let updated = self.updated_at.get_untracked();
        updated > 0.0 && now - updated > stale_time_ms
    }

    /// Fresh = has succeeded before and the data is still within its stale time.
    pub fn is_fresh(&self, stale_time_ms: f64, now: f64) -> bool {
        let updated = self.updated_at.get_untracked();
        updated > 0.0 && now - updated <= stale_time_ms
    }
}

impl Default for QueryEntry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leptos::prelude::Owner;

    #[test]
    fn staleness_is_elapsed_time_since_update() {
        let owner = Owner::new();
        owner.set();

        let entry = QueryEntry::new();
        // never succeeded: neither stale nor fresh
        assert!(!entry.is_stale(1000.0, 5000.0));
        assert!(!entry.is_fresh(1000.0, 5000.0));

        entry.updated_at.set(4000.0);
        assert!(entry.is_fresh(1000.0, 5000.0));
        assert!(!entry.is_stale(1000.0, 5000.0));
        assert!(entry.is_stale(1000.0, 5001.1));
        assert!(!entry.is_fresh(1000.0, 5001.1));
    }
}
