use leptos::prelude::*;

use crate::dashboards::d100_plan_fact::store::DashboardDataStore;
use crate::dashboards::d100_plan_fact::ui::PlanFactDashboard;
use crate::layout::global_context::DashboardUiContext;
use crate::shared::query::QueryClient;

#[component]
pub fn App() -> impl IntoView {
    let client = QueryClient::new();
    let ui = DashboardUiContext::new();
    let store = DashboardDataStore::new(client, ui);

    // One instance of each store for the whole app, shared via context.
    provide_context(client);
    provide_context(ui);
    provide_context(store);

    ui.init_router_integration();
    store.init();

    view! {
        <PlanFactDashboard />
    }
}
