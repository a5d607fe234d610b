use leptos::prelude::*;
use serde::{Deserialize, Serialize};
use web_sys::window;

use crate::shared::date_utils::{current_date, current_month, normalize_date, normalize_month};

/// Which report the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardMode {
    #[default]
    Monthly,
    Daily,
}

impl DashboardMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardMode::Monthly => "monthly",
            DashboardMode::Daily => "daily",
        }
    }

    fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("daily") => DashboardMode::Daily,
            _ => DashboardMode::Monthly,
        }
    }
}

/// Navigational parameters mirrored into the URL query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct UrlState {
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    smeta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

/// UI state store for the dashboard: the user's current selection, kept in
/// sync with the URL in both directions. This store is the sole writer of
/// the selection signals; data loading reacts to them (see the d100 store).
#[derive(Clone, Copy)]
pub struct DashboardUiContext {
    pub mode: RwSignal<DashboardMode>,
    /// `YYYY-MM`
    pub selected_month: RwSignal<String>,
    /// `YYYY-MM-DD`
    pub selected_date: RwSignal<String>,
    pub selected_smeta: RwSignal<Option<String>>,
    pub selected_description: RwSignal<Option<String>>,
    pub daily_modal_open: RwSignal<bool>,
    pub description_modal_open: RwSignal<bool>,
}

impl DashboardUiContext {
    pub fn new() -> Self {
        Self {
            mode: RwSignal::new(DashboardMode::Monthly),
            selected_month: RwSignal::new(current_month()),
            selected_date: RwSignal::new(current_date()),
            selected_smeta: RwSignal::new(None),
            selected_description: RwSignal::new(None),
            daily_modal_open: RwSignal::new(false),
            description_modal_open: RwSignal::new(false),
        }
    }

    /// Read the initial selection from `location.search`, then keep the URL
    /// updated on every change. Writes use `replace_state` so selection
    /// changes do not pile up history entries, and are skipped entirely when
    /// the URL already carries the current values.
    pub fn init_router_integration(&self) {
        let search = window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        self.apply_url_state(&parse_search(&search));

        let this = *self;
        Effect::new(move |_| {
            let query_string = this.query_string();
            let new_search = format!("?{}", query_string);

            let current_search = window()
                .and_then(|w| w.location().search().ok())
                .unwrap_or_default();
            if current_search == new_search {
                return;
            }
            if let Some(w) = window() {
                if let Ok(history) = w.history() {
                    let _ = history.replace_state_with_url(
                        &wasm_bindgen::JsValue::NULL,
                        "",
                        Some(&new_search),
                    );
                }
            }
        });
    }

    fn apply_url_state(&self, state: &UrlState) {
        self.mode
            .set(DashboardMode::from_param(state.mode.as_deref()));
        if let Some(month) = state.month.as_deref().and_then(normalize_month) {
            self.selected_month.set(month);
        }
        if let Some(date) = state.date.as_deref().and_then(normalize_date) {
            self.selected_date.set(date);
        }
        if let Some(smeta) = state.smeta.clone().filter(|s| !s.is_empty()) {
            self.selected_smeta.set(Some(smeta));
        }
        if let Some(description) = state.description.clone().filter(|s| !s.is_empty()) {
            self.selected_description.set(Some(description));
        }
    }

    /// Current selection as a query string. Reactive: reads every signal.
    fn query_string(&self) -> String {
        let state = UrlState {
            mode: Some(self.mode.get().as_str().to_string()),
            month: Some(self.selected_month.get()),
            date: Some(self.selected_date.get()),
            smeta: self.selected_smeta.get(),
            description: self.selected_description.get(),
        };
        serde_qs::to_string(&state).unwrap_or_default()
    }

    pub fn set_mode(&self, mode: DashboardMode) {
        self.mode.set(mode);
    }

    pub fn set_selected_month(&self, month: &str) {
        if let Some(month) = normalize_month(month) {
            self.selected_month.set(month);
        }
    }

    pub fn set_selected_date(&self, date: &str) {
        if let Some(date) = normalize_date(date) {
            self.selected_date.set(date);
        }
    }

    pub fn set_selected_smeta(&self, smeta: Option<String>) {
        self.selected_smeta.set(smeta);
    }

    pub fn set_selected_description(&self, description: Option<String>) {
        self.selected_description.set(description);
    }

    pub fn open_daily_modal(&self) {
        self.daily_modal_open.set(true);
    }

    pub fn close_daily_modal(&self) {
        self.daily_modal_open.set(false);
    }

    pub fn open_description_modal(&self) {
        self.description_modal_open.set(true);
    }

    pub fn close_description_modal(&self) {
        self.description_modal_open.set(false);
    }
}

impl Default for DashboardUiContext {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_search(search: &str) -> UrlState {
    serde_qs::from_str(search.trim_start_matches('?')).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use leptos::prelude::Owner;

    #[test]
    fn url_state_round_trip() {
        let owner = Owner::new();
        owner.set();

        let ctx = DashboardUiContext::new();
        ctx.apply_url_state(&parse_search(
            "?mode=daily&month=2025-11&date=2025-11-05&smeta=leto",
        ));
        assert_eq!(ctx.mode.get_untracked(), DashboardMode::Daily);
        assert_eq!(ctx.selected_month.get_untracked(), "2025-11");
        assert_eq!(ctx.selected_date.get_untracked(), "2025-11-05");
        assert_eq!(ctx.selected_smeta.get_untracked(), Some("leto".to_string()));

        let qs = ctx.query_string();
        let parsed = parse_search(&qs);
        assert_eq!(parsed.mode.as_deref(), Some("daily"));
        assert_eq!(parsed.month.as_deref(), Some("2025-11"));
        assert_eq!(parsed.date.as_deref(), Some("2025-11-05"));
        assert_eq!(parsed.smeta.as_deref(), Some("leto"));
        assert_eq!(parsed.description, None);
    }

    #[test]
    fn malformed_url_values_are_ignored() {
        let owner = Owner::new();
        owner.set();

        let ctx = DashboardUiContext::new();
        let default_month = ctx.selected_month.get_untracked();
        ctx.apply_url_state(&parse_search("?month=notamonth&date=2025-44-44&mode=bogus"));
        assert_eq!(ctx.selected_month.get_untracked(), default_month);
        assert_eq!(ctx.mode.get_untracked(), DashboardMode::Monthly);
    }

    #[test]
    fn setters_normalize_input() {
        let owner = Owner::new();
        owner.set();

        let ctx = DashboardUiContext::new();
        ctx.set_selected_month("2025-11-05T00:00:00Z");
        assert_eq!(ctx.selected_month.get_untracked(), "2025-11");
        ctx.set_selected_date("2025-11-05T00:00:00Z");
        assert_eq!(ctx.selected_date.get_untracked(), "2025-11-05");
    }
}
