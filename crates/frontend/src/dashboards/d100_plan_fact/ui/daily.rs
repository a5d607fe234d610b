use leptos::prelude::*;

use crate::dashboards::d100_plan_fact::store::DashboardDataStore;
use crate::layout::global_context::DashboardUiContext;
use crate::shared::date_utils::format_date;
use crate::shared::number_format::{format_money, format_number_with_decimals};

/// Daily report: date selector plus the table of works done that day.
#[component]
pub fn DailyView() -> impl IntoView {
    view! {
        <div class="d100-daily">
            <DateSelector />
            <DailyTable />
        </div>
    }
}

#[component]
fn DateSelector() -> impl IntoView {
    let ui = expect_context::<DashboardUiContext>();
    let store = expect_context::<DashboardDataStore>();

    // same rule as the month selector: the current selection always appears
    let options = move || {
        let mut dates = store.available_dates();
        let selected = ui.selected_date.get();
        if !dates.contains(&selected) {
            dates.insert(0, selected);
        }
        dates
    };

    view! {
        <div class="d100-date-controls">
            <label class="d100-date-label" for="d100-date-select">"Дата:"</label>
            <select
                id="d100-date-select"
                class="d100-date-select"
                on:change=move |ev| ui.set_selected_date(&event_target_value(&ev))
            >
                <For
                    each=options
                    key=|date| date.clone()
                    children=move |date| {
                        let value = date.clone();
                        let is_selected = move || ui.selected_date.get() == value;
                        view! {
                            <option value=date.clone() selected=is_selected>
                                {format_date(&date)}
                            </option>
                        }
                    }
                />
            </select>
        </div>
    }
}

#[component]
pub fn DailyTable() -> impl IntoView {
    let store = expect_context::<DashboardDataStore>();

    view! {
        <section class="d100-daily-table">
            {move || {
                let handle = store.daily_handle();
                if handle.is_loading() {
                    return view! {
                        <div class="d100-loading"><span>"Загрузка данных..."</span></div>
                    }.into_any();
                }
                // previous figures stay on screen during a failed refresh
                let banner = handle.error_message().map(|err| view! {
                    <div class="d100-error">
                        <strong>"⚠ Ошибка: "</strong>
                        {err}
                    </div>
                });
                let Some(report) = store.daily_report() else {
                    return view! { <>{banner}</> }.into_any();
                };
                if report.rows.is_empty() {
                    if let Some(banner) = banner {
                        return banner.into_any();
                    }
                    return view! {
                        <div class="d100-empty">"Нет работ за выбранную дату"</div>
                    }.into_any();
                }
                view! {
                    <>
                    {banner}
                    <table class="d100-table">
                        <thead>
                            <tr>
                                <th>"Наименование работ"</th>
                                <th>"Ед. изм."</th>
                                <th class="d100-num">"Объём"</th>
                                <th class="d100-num">"Сумма"</th>
                            </tr>
                        </thead>
                        <tbody>
                            {report.rows.into_iter().map(|row| view! {
                                <tr>
                                    <td>{row.name}</td>
                                    <td>{row.unit}</td>
                                    <td class="d100-num">{format_number_with_decimals(row.volume, 2)}</td>
                                    <td class="d100-num">{format_money(row.amount)}</td>
                                </tr>
                            }).collect_view()}
                        </tbody>
                        <tfoot>
                            <tr>
                                <td colspan="3">"Итого"</td>
                                <td class="d100-num">{format_money(report.total)}</td>
                            </tr>
                        </tfoot>
                    </table>
                    </>
                }.into_any()
            }}
        </section>
    }
}
