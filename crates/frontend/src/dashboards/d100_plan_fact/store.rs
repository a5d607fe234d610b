//! Data store for the plan/fact dashboard.
//!
//! Thin layer between the query cache and the views: every piece of server
//! data the dashboard shows has a handle method here, keyed by the current
//! selection from [`DashboardUiContext`]. `init` wires the reactive plumbing —
//! triggering fetches when the selection changes and keeping the selected
//! smeta valid against the loaded cards.

use leptos::prelude::*;
use serde::Serialize;
use serde_json::Value;

use crate::layout::global_context::{DashboardMode, DashboardUiContext};
use crate::shared::api_error::ApiError;
use crate::shared::date_utils::recent_months;
use crate::shared::query::{KeyMatcher, QueryClient, QueryHandle, QueryKey, QueryOptions};

use super::api;
use super::model::{DailyReport, DetailRow, MonthlySummary, SmetaCard};

const MINUTE_MS: f64 = 60_000.0;

fn to_value<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

#[derive(Clone, Copy)]
pub struct DashboardDataStore {
    client: QueryClient,
    ui: DashboardUiContext,
}

impl DashboardDataStore {
    pub fn new(client: QueryClient, ui: DashboardUiContext) -> Self {
        Self { client, ui }
    }

    // --- handles ------------------------------------------------------------

    /// Month list changes only on data loads; cache it for an hour.
    pub fn months_handle(&self) -> QueryHandle {
        self.client.query(
            QueryKey::new(["available-months"]),
            || async {
                let months = api::get_available_months().await?;
                let months = if months.is_empty() {
                    recent_months(6)
                } else {
                    months
                };
                to_value(months)
            },
            QueryOptions::default().stale_time_ms(60.0 * MINUTE_MS),
        )
    }

    pub fn summary_handle(&self) -> QueryHandle {
        let month = self.ui.selected_month.get();
        self.client.query(
            QueryKey::new(["monthly-summary", month.as_str()]),
            move || {
                let month = month.clone();
                async move { to_value(api::get_monthly_summary(&month).await?) }
            },
            QueryOptions::default(),
        )
    }

    pub fn cards_handle(&self) -> QueryHandle {
        let month = self.ui.selected_month.get();
        self.client.query(
            QueryKey::new(["smeta-cards", month.as_str()]),
            move || {
                let month = month.clone();
                async move { to_value(api::get_smeta_cards(&month).await?) }
            },
            QueryOptions::default().stale_time_ms(3.0 * MINUTE_MS),
        )
    }

    /// `None` until a smeta is selected.
    pub fn details_handle(&self) -> Option<QueryHandle> {
        let month = self.ui.selected_month.get();
        let smeta = self.ui.selected_smeta.get()?;
        Some(self.client.query(
            QueryKey::new(["smeta-details", month.as_str(), smeta.as_str()]),
            move || {
                let month = month.clone();
                let smeta = smeta.clone();
                async move { to_value(api::get_smeta_details(&month, &smeta).await?) }
            },
            QueryOptions::default().stale_time_ms(2.0 * MINUTE_MS),
        ))
    }

    pub fn dates_handle(&self) -> QueryHandle {
        let month = self.ui.selected_month.get();
        self.client.query(
            QueryKey::new(["available-dates", month.as_str()]),
            move || {
                let month = month.clone();
                async move { to_value(api::get_available_dates(&month).await?) }
            },
            QueryOptions::default().stale_time_ms(MINUTE_MS),
        )
    }

    pub fn daily_handle(&self) -> QueryHandle {
        let date = self.ui.selected_date.get();
        self.client.query(
            QueryKey::new(["daily", date.as_str()]),
            move || {
                let date = date.clone();
                async move { to_value(api::get_daily(&date).await?) }
            },
            QueryOptions::default().stale_time_ms(2.0 * MINUTE_MS),
        )
    }

    pub fn daily_revenue_handle(&self) -> QueryHandle {
        let month = self.ui.selected_month.get();
        self.client.query(
            QueryKey::new(["daily-revenue", month.as_str()]),
            move || {
                let month = month.clone();
                async move { to_value(api::get_daily_revenue(&month).await?) }
            },
            QueryOptions::default().stale_time_ms(3.0 * MINUTE_MS),
        )
    }

    pub fn last_loaded_handle(&self) -> QueryHandle {
        self.client.query(
            QueryKey::new(["last-loaded"]),
            || async { to_value(api::get_last_loaded().await?) },
            QueryOptions::default().stale_time_ms(MINUTE_MS),
        )
    }

    // --- reactive accessors -------------------------------------------------

    pub fn available_months(&self) -> Vec<String> {
        self.months_handle().data_as().unwrap_or_default()
    }

    pub fn monthly_summary(&self) -> Option<MonthlySummary> {
        self.summary_handle().data_as()
    }

    pub fn smeta_cards(&self) -> Vec<SmetaCard> {
        self.cards_handle().data_as().unwrap_or_default()
    }

    pub fn smeta_details(&self) -> Vec<DetailRow> {
        self.details_handle()
            .and_then(|h| h.data_as())
            .unwrap_or_default()
    }

    pub fn available_dates(&self) -> Vec<String> {
        self.dates_handle().data_as().unwrap_or_default()
    }

    pub fn daily_report(&self) -> Option<DailyReport> {
        self.daily_handle().data_as()
    }

    pub fn loaded_at(&self) -> Option<String> {
        self.last_loaded_handle().data_as().flatten()
    }

    /// Forced refresh of everything currently on screen. Runs through
    /// `refetch`, so views keep their entries and show stale data until the
    /// fresh payload lands.
    pub fn refetch_all(&self) {
        fn force(handle: QueryHandle) {
            leptos::task::spawn_local(async move {
                handle.refetch().await;
            });
        }
        force(self.months_handle());
        force(self.summary_handle());
        force(self.cards_handle());
        force(self.daily_revenue_handle());
        force(self.last_loaded_handle());
        if let Some(handle) = self.details_handle() {
            force(handle);
        }
        if self.ui.mode.get_untracked() == DashboardMode::Daily
            || self.ui.daily_modal_open.get_untracked()
        {
            force(self.dates_handle());
            force(self.daily_handle());
        }
    }

    /// Install the effects that drive loading off the current selection.
    /// Call once, after contexts are provided.
    pub fn init(&self) {
        let store = *self;

        // monthly data follows the selected month
        Effect::new(move |_| {
            store.months_handle().trigger();
            store.summary_handle().trigger();
            store.cards_handle().trigger();
            store.daily_revenue_handle().trigger();
            store.last_loaded_handle().trigger();
        });

        Effect::new(move |_| {
            if let Some(handle) = store.details_handle() {
                handle.trigger();
            }
        });

        // daily data only once the daily view or its modal is open
        Effect::new(move |_| {
            let daily_visible = store.ui.mode.get() == DashboardMode::Daily
                || store.ui.daily_modal_open.get();
            if !daily_visible {
                return;
            }
            store.dates_handle().trigger();
            store.daily_handle().trigger();
        });

        // changing the month resets the drill-down and drops cached details,
        // so stale rows from the previous month can never flash into view
        Effect::new(move |prev: Option<String>| {
            let month = store.ui.selected_month.get();
            if let Some(prev) = prev {
                if prev != month {
                    store.ui.selected_description.set(None);
                    store.client.invalidate(KeyMatcher::prefix(["smeta-details"]));
                }
            }
            month
        });

        // keep the selected smeta pointing at an existing card
        Effect::new(move |_| {
            let cards = store.smeta_cards();
            if cards.is_empty() {
                return;
            }
            let selected = store.ui.selected_smeta.get_untracked();
            let still_there = selected
                .as_ref()
                .map(|key| cards.iter().any(|c| &c.key == key))
                .unwrap_or(false);
            if !still_there {
                store.ui.selected_smeta.set(Some(cards[0].key.clone()));
            }
        });
    }
}
