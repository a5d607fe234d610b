//! Hand-rolled query cache for backend data.
//!
//! Keyed asynchronous results with staleness tracking, retry with backoff,
//! de-duplication of in-flight requests, prefix invalidation and
//! stale-while-revalidate semantics: old data stays visible while a refresh
//! is in flight, so the UI never flickers back to an empty state.

mod client;
mod entry;
mod key;

pub use client::{QueryClient, QueryHandle, QueryOptions};
pub use entry::{QueryEntry, QueryStatus};
pub use key::{KeyMatcher, QueryKey};

/// Wall-clock milliseconds. Staleness is computed from this, never from a
/// background timer.
pub(crate) fn now_ms() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0)
    }
}

/// Backoff delay between retry attempts.
pub(crate) async fn sleep_ms(ms: u32) {
    #[cfg(target_arch = "wasm32")]
    {
        gloo_timers::future::TimeoutFuture::new(ms).await;
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        // Unit tests drive the cache on a single thread with tiny delays.
        std::thread::sleep(std::time::Duration::from_millis(ms as u64));
    }
}
