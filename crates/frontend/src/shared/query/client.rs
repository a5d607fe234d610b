use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use leptos::prelude::*;
use serde_json::Value;

use crate::shared::api_error::ApiError;

use super::entry::{QueryEntry, QueryStatus};
use super::key::{KeyMatcher, QueryKey};
use super::{now_ms, sleep_ms};

type ProducerFuture = Pin<Box<dyn Future<Output = Result<Value, ApiError>>>>;
type Producer = Rc<dyn Fn() -> ProducerFuture>;

/// Per-query behavior knobs.
#[derive(Clone, Copy)]
pub struct QueryOptions {
    /// How long a successful result stays fresh (wall-clock ms).
    pub stale_time_ms: f64,
    /// Additional attempts after the first failure.
    pub retry: u32,
    /// Backoff before retry attempt `n` (0-based).
    pub retry_delay: fn(u32) -> u32,
    /// Refetch stale entries when the document becomes visible again.
    pub refetch_on_focus: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time_ms: 5.0 * 60_000.0,
            retry: 2,
            retry_delay: |attempt| 500 * (attempt + 1),
            refetch_on_focus: true,
        }
    }
}

impl QueryOptions {
    pub fn stale_time_ms(mut self, ms: f64) -> Self {
        self.stale_time_ms = ms;
        self
    }
}

/// Explicit cache object, one per application session.
///
/// Created in `App` and passed down via context; tests construct their own
/// isolated instances. The entry map is the only shared mutable resource and
/// all mutation happens on the single browser turn, so no locking is needed —
/// but every write-back still checks the entry generation (see
/// [`QueryEntry`]).
#[derive(Clone, Copy)]
pub struct QueryClient {
    entries: RwSignal<HashMap<QueryKey, QueryEntry>>,
    /// Keys with a registered visibilitychange listener. Lives on the client
    /// rather than the entry: the listener outlives entry eviction, and a
    /// re-query after invalidation must not register a second one.
    focus_hooked: RwSignal<HashSet<QueryKey>>,
}

impl QueryClient {
    pub fn new() -> Self {
        Self {
            entries: RwSignal::new(HashMap::new()),
            focus_hooked: RwSignal::new(HashSet::new()),
        }
    }

    /// Get-or-create the entry for a key and return a handle bound to it.
    ///
    /// This never issues a request by itself; fetching is driven through the
    /// handle ([`QueryHandle::trigger`] / [`QueryHandle::ensure`]), which is
    /// where de-duplication and staleness are enforced.
    pub fn query<F, Fut>(&self, key: QueryKey, producer: F, options: QueryOptions) -> QueryHandle
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<Value, ApiError>> + 'static,
    {
        let producer: Producer = Rc::new(move || Box::pin(producer()) as ProducerFuture);
        let handle = self.handle_raw(key, producer, options);
        if options.refetch_on_focus {
            handle.hook_focus_refetch();
        }
        handle
    }

    fn handle_raw(&self, key: QueryKey, producer: Producer, options: QueryOptions) -> QueryHandle {
        let entry = self.entry_for(&key);
        QueryHandle {
            client: *self,
            key,
            entry,
            producer,
            options,
        }
    }

    fn entry_for(&self, key: &QueryKey) -> QueryEntry {
        if let Some(entry) = self.entries.with_untracked(|map| map.get(key).copied()) {
            return entry;
        }
        let entry = QueryEntry::new();
        self.entries.update(|map| {
            map.insert(key.clone(), entry);
        });
        entry
    }

    /// Evict every entry whose key matches.
    ///
    /// The next `query` for an evicted key starts from an empty entry: fresh
    /// `Loading` state, no retained data. A fetch that is still in flight for
    /// an evicted entry finishes against the detached entry and is dropped on
    /// the floor.
    pub fn invalidate(&self, matcher: KeyMatcher) {
        self.entries.update(|map| {
            map.retain(|key, _| !matcher.matches(key));
        });
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.with_untracked(|map| map.len())
    }

    #[cfg(test)]
    fn hooked_key_count(&self) -> usize {
        self.focus_hooked.with_untracked(|keys| keys.len())
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to one cached query: reactive state plus fetch control.
#[derive(Clone)]
pub struct QueryHandle {
    client: QueryClient,
    key: QueryKey,
    entry: QueryEntry,
    producer: Producer,
    options: QueryOptions,
}

impl QueryHandle {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn client(&self) -> QueryClient {
        self.client
    }

    pub fn entry(&self) -> QueryEntry {
        self.entry
    }

    pub fn status(&self) -> QueryStatus {
        self.entry.status.get()
    }

    pub fn error_message(&self) -> Option<String> {
        self.entry.error.get()
    }

    /// Decode the cached value into a concrete view model.
    /// Reactive: reads the data signal.
    pub fn data_as<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        self.entry
            .data
            .get()
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// First load still pending, nothing to show yet.
    pub fn is_loading(&self) -> bool {
        matches!(self.status(), QueryStatus::Idle | QueryStatus::Loading)
    }

    /// Any fetch in progress, including a background refresh.
    pub fn is_fetching(&self) -> bool {
        matches!(self.status(), QueryStatus::Loading | QueryStatus::Refetching)
    }

    /// Fire-and-forget [`ensure`](Self::ensure) for UI call sites.
    pub fn trigger(&self) {
        let handle = self.clone();
        leptos::task::spawn_local(async move {
            handle.ensure().await;
        });
    }

    /// Fetch if the entry needs it.
    ///
    /// - entry fresh -> no-op
    /// - fetch in flight and entry not stale -> join it (no duplicate request)
    /// - otherwise (never loaded, or stale — even with a stale fetch already
    ///   in flight) -> start a run; a superseded run loses the generation
    ///   race and its result is discarded
    pub async fn ensure(&self) {
        let now = now_ms();
        if self.entry.in_flight.get_untracked() {
            if !self.entry.is_stale(self.options.stale_time_ms, now) {
                return;
            }
        } else if self.entry.is_fresh(self.options.stale_time_ms, now) {
            return;
        }
        self.execute().await;
    }

    /// Force a refetch. Joins an in-flight fetch unless the entry is already
    /// stale, in which case a superseding run is started.
    pub async fn refetch(&self) {
        if self.entry.in_flight.get_untracked()
            && !self.entry.is_stale(self.options.stale_time_ms, now_ms())
        {
            return;
        }
        self.execute().await;
    }

    /// The fetch state machine: status transition, retry loop, guarded
    /// write-back. Last-known data stays in place for the whole run.
    async fn execute(&self) {
        let entry = self.entry;
        let generation = entry.generation.get_untracked() + 1;
        entry.generation.set(generation);
        entry.in_flight.set(true);
        let was_success = entry.status.get_untracked() == QueryStatus::Success;
        entry.status.set(if was_success {
            QueryStatus::Refetching
        } else {
            QueryStatus::Loading
        });
        entry.error.set(None);

        let mut attempt: u32 = 0;
        loop {
            match (self.producer)().await {
                Ok(value) => {
                    if entry.generation.get_untracked() == generation {
                        entry.data.set(Some(value));
                        entry.error.set(None);
                        entry.status.set(QueryStatus::Success);
                        entry.updated_at.set(now_ms());
                        entry.in_flight.set(false);
                    }
                    return;
                }
                Err(err) => {
                    if attempt >= self.options.retry {
                        if entry.generation.get_untracked() == generation {
                            entry.error.set(Some(err.to_string()));
                            entry.status.set(QueryStatus::Error);
                            entry.in_flight.set(false);
                        }
                        log::error!(
                            "query {} failed after {} attempts: {}",
                            self.key.canonical(),
                            attempt + 1,
                            err
                        );
                        return;
                    }
                    log::debug!(
                        "query {} attempt {} failed, retrying: {}",
                        self.key.canonical(),
                        attempt,
                        err
                    );
                    sleep_ms((self.options.retry_delay)(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Refetch stale entries when the tab becomes visible again.
    /// Registered at most once per key for the whole session; fires only on
    /// the transition to `visible`, not on every focus event.
    fn hook_focus_refetch(&self) {
        let hooked = self
            .client
            .focus_hooked
            .with_untracked(|keys| keys.contains(&self.key));
        if hooked {
            return;
        }
        self.client.focus_hooked.update(|keys| {
            keys.insert(self.key.clone());
        });

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::closure::Closure;
            use wasm_bindgen::JsCast;

            let client = self.client;
            let key = self.key.clone();
            let producer = self.producer.clone();
            let options = self.options;
            let callback = Closure::wrap(Box::new(move || {
                let visible = web_sys::window()
                    .and_then(|w| w.document())
                    .map(|d| d.visibility_state() == web_sys::VisibilityState::Visible)
                    .unwrap_or(false);
                if !visible {
                    return;
                }
                // Re-resolve through the client: the entry may have been
                // invalidated since the listener was registered.
                let handle = client.handle_raw(key.clone(), producer.clone(), options);
                leptos::task::spawn_local(async move {
                    handle.ensure().await;
                });
            }) as Box<dyn FnMut()>);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                let _ = document.add_event_listener_with_callback(
                    "visibilitychange",
                    callback.as_ref().unchecked_ref(),
                );
            }
            callback.forget();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use leptos::prelude::Owner;
    use serde_json::json;
    use std::cell::Cell;
    use std::task::{Context, Poll};

    fn with_owner(f: impl FnOnce()) {
        let owner = Owner::new();
        owner.set();
        f();
    }

    fn no_delay() -> QueryOptions {
        QueryOptions {
            retry_delay: |_| 0,
            ..QueryOptions::default()
        }
    }

    /// Future that is pending exactly once, to interleave two runs.
    struct YieldOnce(bool);

    impl Future for YieldOnce {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    #[test]
    fn overlapping_queries_invoke_producer_once() {
        with_owner(|| {
            let client = QueryClient::new();
            let calls = Rc::new(Cell::new(0u32));
            let counter = calls.clone();
            let handle = client.query(
                QueryKey::new(["smeta-cards", "2025-11"]),
                move || {
                    counter.set(counter.get() + 1);
                    async { Ok(json!({"ok": true})) }
                },
                no_delay(),
            );

            block_on(async {
                futures::join!(handle.ensure(), handle.ensure());
            });
            assert_eq!(calls.get(), 1);
            assert_eq!(handle.status(), QueryStatus::Success);
        });
    }

    #[test]
    fn fresh_entry_is_not_refetched() {
        with_owner(|| {
            let client = QueryClient::new();
            let calls = Rc::new(Cell::new(0u32));
            let counter = calls.clone();
            let handle = client.query(
                QueryKey::new(["monthly-summary", "2025-11"]),
                move || {
                    counter.set(counter.get() + 1);
                    async { Ok(json!(1)) }
                },
                no_delay(),
            );

            block_on(handle.ensure());
            block_on(handle.ensure());
            assert_eq!(calls.get(), 1);
        });
    }

    #[test]
    fn stale_entry_refetches_and_keeps_old_data_visible() {
        with_owner(|| {
            let client = QueryClient::new();
            let calls = Rc::new(Cell::new(0u32));
            let counter = calls.clone();
            let options = no_delay().stale_time_ms(0.0);
            let handle = client.query(
                QueryKey::new(["monthly-summary", "2025-11"]),
                move || {
                    counter.set(counter.get() + 1);
                    async {
                        YieldOnce(false).await;
                        Ok(json!("payload"))
                    }
                },
                options,
            );

            block_on(handle.ensure());
            assert_eq!(calls.get(), 1);

            std::thread::sleep(std::time::Duration::from_millis(5));

            let entry = handle.entry();
            block_on(async {
                futures::join!(handle.ensure(), async {
                    // while the refetch is pending, the previous data and the
                    // refetching status are both observable
                    assert_eq!(entry.status.get_untracked(), QueryStatus::Refetching);
                    assert_eq!(entry.data.get_untracked(), Some(json!("payload")));
                });
            });
            assert_eq!(calls.get(), 2);
            assert_eq!(handle.status(), QueryStatus::Success);
        });
    }

    #[test]
    fn failing_producer_is_retried_then_errors() {
        with_owner(|| {
            let client = QueryClient::new();
            let calls = Rc::new(Cell::new(0u32));
            let counter = calls.clone();
            let options = QueryOptions {
                retry: 3,
                retry_delay: |_| 0,
                ..QueryOptions::default()
            };
            let handle = client.query(
                QueryKey::new(["daily", "2025-11-05"]),
                move || {
                    counter.set(counter.get() + 1);
                    async {
                        Err(ApiError::Http {
                            status: 500,
                            message: "boom".into(),
                        })
                    }
                },
                options,
            );

            block_on(handle.ensure());
            assert_eq!(calls.get(), 4); // 1 initial + 3 retries
            assert_eq!(handle.status(), QueryStatus::Error);
            assert!(handle.error_message().unwrap().contains("boom"));
        });
    }

    #[test]
    fn failed_refresh_keeps_previous_data() {
        with_owner(|| {
            let client = QueryClient::new();
            let should_fail = Rc::new(Cell::new(false));
            let flag = should_fail.clone();
            let options = QueryOptions {
                retry: 0,
                retry_delay: |_| 0,
                stale_time_ms: 0.0,
                ..QueryOptions::default()
            };
            let handle = client.query(
                QueryKey::new(["smeta-cards", "2025-11"]),
                move || {
                    let fail = flag.get();
                    async move {
                        if fail {
                            Err(ApiError::Network("offline".into()))
                        } else {
                            Ok(json!([1, 2, 3]))
                        }
                    }
                },
                options,
            );

            block_on(handle.ensure());
            should_fail.set(true);
            std::thread::sleep(std::time::Duration::from_millis(5));
            block_on(handle.ensure());

            assert_eq!(handle.status(), QueryStatus::Error);
            // stale data remains alongside the error indicator
            assert_eq!(handle.entry().data.get_untracked(), Some(json!([1, 2, 3])));
            assert!(handle.error_message().is_some());
        });
    }

    #[test]
    fn failed_refresh_exposes_data_and_error_together() {
        with_owner(|| {
            let client = QueryClient::new();
            let should_fail = Rc::new(Cell::new(false));
            let flag = should_fail.clone();
            let options = QueryOptions {
                retry: 0,
                retry_delay: |_| 0,
                stale_time_ms: 0.0,
                ..QueryOptions::default()
            };
            let handle = client.query(
                QueryKey::new(["monthly-summary", "2025-11"]),
                move || {
                    let fail = flag.get();
                    async move {
                        if fail {
                            Err(ApiError::Network("offline".into()))
                        } else {
                            Ok(json!({"plan": 100}))
                        }
                    }
                },
                options,
            );

            block_on(handle.ensure());
            should_fail.set(true);
            std::thread::sleep(std::time::Duration::from_millis(5));
            block_on(handle.ensure());

            // the view-facing accessors must yield both at once, so the UI
            // can render the retained figures under the error banner
            assert!(!handle.is_loading());
            assert!(handle.error_message().is_some());
            assert_eq!(
                handle.data_as::<serde_json::Value>(),
                Some(json!({"plan": 100}))
            );
        });
    }

    #[test]
    fn focus_hook_registers_once_per_key() {
        with_owner(|| {
            let client = QueryClient::new();
            let key = QueryKey::new(["smeta-cards", "2025-11"]);

            let handle = client.query(key.clone(), || async { Ok(json!(1)) }, no_delay());
            block_on(handle.ensure());
            assert_eq!(client.hooked_key_count(), 1);

            // eviction and re-query must not register a second listener
            client.invalidate(KeyMatcher::prefix(["smeta-cards"]));
            let _ = client.query(key, || async { Ok(json!(1)) }, no_delay());
            assert_eq!(client.hooked_key_count(), 1);

            let _ = client.query(
                QueryKey::new(["daily", "2025-11-05"]),
                || async { Ok(json!(2)) },
                no_delay(),
            );
            assert_eq!(client.hooked_key_count(), 2);
        });
    }

    #[test]
    fn superseding_fetch_wins_regardless_of_resolution_order() {
        with_owner(|| {
            let client = QueryClient::new();
            let key = QueryKey::new(["monthly-summary", "2025-11"]);
            let options = no_delay().stale_time_ms(0.0);

            let seed = client.query(key.clone(), || async { Ok(json!("v1")) }, options);
            block_on(seed.ensure());
            std::thread::sleep(std::time::Duration::from_millis(5));

            // slow run starts first, fast run supersedes it while it is parked
            let slow = client.query(
                key.clone(),
                || async {
                    YieldOnce(false).await;
                    YieldOnce(false).await;
                    Ok(json!("old"))
                },
                options,
            );
            let fast = client.query(key.clone(), || async { Ok(json!("fresh")) }, options);

            block_on(async {
                futures::join!(slow.refetch(), fast.refetch());
            });

            assert_eq!(slow.entry().data.get_untracked(), Some(json!("fresh")));
            assert_eq!(slow.status(), QueryStatus::Success);
            assert!(!slow.entry().in_flight.get_untracked());
        });
    }

    #[test]
    fn invalidate_by_prefix_forces_refetch() {
        with_owner(|| {
            let client = QueryClient::new();
            let calls = Rc::new(Cell::new(0u32));
            let key = QueryKey::new(["smeta-details", "2025-11", "leto"]);

            let counter = calls.clone();
            let handle = client.query(
                key.clone(),
                move || {
                    counter.set(counter.get() + 1);
                    async { Ok(json!("rows")) }
                },
                no_delay(),
            );
            block_on(handle.ensure());
            block_on(handle.ensure());
            assert_eq!(calls.get(), 1);

            client.invalidate(KeyMatcher::prefix(["smeta-details"]));
            assert_eq!(client.len(), 0);

            // a fresh handle gets a fresh entry and must hit the producer again
            let counter = calls.clone();
            let handle = client.query(
                key,
                move || {
                    counter.set(counter.get() + 1);
                    async { Ok(json!("rows")) }
                },
                no_delay(),
            );
            assert_eq!(handle.status(), QueryStatus::Idle);
            block_on(handle.ensure());
            assert_eq!(calls.get(), 2);
        });
    }

    #[test]
    fn invalidate_is_selective() {
        with_owner(|| {
            let client = QueryClient::new();
            let a = client.query(
                QueryKey::new(["smeta-details", "2025-11"]),
                || async { Ok(json!(1)) },
                no_delay(),
            );
            let b = client.query(
                QueryKey::new(["smeta-cards", "2025-11"]),
                || async { Ok(json!(2)) },
                no_delay(),
            );
            block_on(a.ensure());
            block_on(b.ensure());
            assert_eq!(client.len(), 2);

            client.invalidate(KeyMatcher::prefix(["smeta-details"]));
            assert_eq!(client.len(), 1);

            client.invalidate(KeyMatcher::predicate(|k| {
                k.parts().first().map(String::as_str) == Some("smeta-cards")
            }));
            assert_eq!(client.len(), 0);
        });
    }
}
