use leptos::prelude::*;

use crate::dashboards::d100_plan_fact::store::DashboardDataStore;
use crate::layout::global_context::{DashboardMode, DashboardUiContext};
use crate::shared::date_utils::{format_datetime, format_month};

use super::daily::DailyView;
use super::monthly::MonthlyView;

/// Root component of the plan/fact dashboard: header with the mode toggle,
/// period selector and refresh control, then the active view.
#[component]
pub fn PlanFactDashboard() -> impl IntoView {
    let ui = expect_context::<DashboardUiContext>();
    let store = expect_context::<DashboardDataStore>();

    let loaded_at = move || {
        store
            .loaded_at()
            .map(|ts| format!("Данные загружены: {}", format_datetime(&ts)))
    };

    view! {
        <div id="d100_plan_fact--dashboard" class="d100-dashboard">
            <header class="d100-header">
                <h1 class="d100-title">"План-факт по сметам"</h1>
                <div class="d100-controls">
                    <div class="d100-mode-toggle">
                        <button
                            class=move || mode_button_class(ui, DashboardMode::Monthly)
                            on:click=move |_| ui.set_mode(DashboardMode::Monthly)
                        >
                            "Месяц"
                        </button>
                        <button
                            class=move || mode_button_class(ui, DashboardMode::Daily)
                            on:click=move |_| ui.set_mode(DashboardMode::Daily)
                        >
                            "День"
                        </button>
                    </div>
                    <MonthSelector />
                    <button
                        class="d100-refresh-btn"
                        title="Обновить данные"
                        on:click=move |_| store.refetch_all()
                    >
                        "⟳"
                    </button>
                </div>
                {move || loaded_at().map(|text| view! {
                    <span class="d100-loaded-at">{text}</span>
                })}
            </header>

            {move || match ui.mode.get() {
                DashboardMode::Monthly => view! { <MonthlyView /> }.into_any(),
                DashboardMode::Daily => view! { <DailyView /> }.into_any(),
            }}
        </div>
    }
}

fn mode_button_class(ui: DashboardUiContext, mode: DashboardMode) -> String {
    if ui.mode.get() == mode {
        "d100-mode-btn d100-mode-btn--active".to_string()
    } else {
        "d100-mode-btn".to_string()
    }
}

#[component]
fn MonthSelector() -> impl IntoView {
    let ui = expect_context::<DashboardUiContext>();
    let store = expect_context::<DashboardDataStore>();

    // the selected month is kept in the list even when the backend does not
    // report it, so the selector never shows an empty value
    let options = move || {
        let mut months = store.available_months();
        let selected = ui.selected_month.get();
        if !months.contains(&selected) {
            months.insert(0, selected);
        }
        months
    };

    view! {
        <select
            class="d100-month-select"
            on:change=move |ev| ui.set_selected_month(&event_target_value(&ev))
        >
            <For
                each=options
                key=|month| month.clone()
                children=move |month| {
                    let value = month.clone();
                    let is_selected = move || ui.selected_month.get() == value;
                    view! {
                        <option value=month.clone() selected=is_selected>
                            {format_month(&month)}
                        </option>
                    }
                }
            />
        </select>
    }
}
