use contracts::dashboards::d100_plan_fact::DailyRevenuePointDto;
use leptos::prelude::*;

use crate::dashboards::d100_plan_fact::model::SmetaCard;
use crate::dashboards::d100_plan_fact::store::DashboardDataStore;
use crate::layout::global_context::DashboardUiContext;
use crate::shared::date_utils::format_date;
use crate::shared::number_format::format_money;

use super::daily::DailyTable;

/// Monthly report: summary cards, per-smeta cards with progress bars,
/// the drill-down table of the selected smeta, daily revenue.
#[component]
pub fn MonthlyView() -> impl IntoView {
    view! {
        <div class="d100-monthly">
            <SummaryCards />
            <SmetaCardsGrid />
            <DetailsTable />
            <DailyRevenueTable />
            <DescriptionModal />
            <DailyModal />
        </div>
    }
}

/// Overlay with the full text and figures of the selected detail row.
#[component]
fn DescriptionModal() -> impl IntoView {
    let ui = expect_context::<DashboardUiContext>();
    let store = expect_context::<DashboardDataStore>();

    view! {
        {move || {
            if !ui.description_modal_open.get() {
                return view! { <></> }.into_any();
            }
            let Some(title) = ui.selected_description.get() else {
                return view! { <></> }.into_any();
            };
            let row = store
                .smeta_details()
                .into_iter()
                .find(|row| row.title == title);
            view! {
                <div class="d100-modal-overlay" on:click=move |_| ui.close_description_modal()>
                    <div class="d100-modal" on:click=move |ev| ev.stop_propagation()>
                        <button
                            class="d100-modal-close"
                            on:click=move |_| ui.close_description_modal()
                        >
                            "×"
                        </button>
                        <h3 class="d100-modal-title">{title.clone()}</h3>
                        {row.map(|row| view! {
                            <div class="d100-modal-body">
                                <div class="d100-kpi">
                                    <span class="d100-kpi-label">"План"</span>
                                    <span class="d100-kpi-value">{format_money(row.plan)}</span>
                                </div>
                                <div class="d100-kpi">
                                    <span class="d100-kpi-label">"Факт"</span>
                                    <span class="d100-kpi-value">{format_money(row.fact)}</span>
                                </div>
                                <div class="d100-kpi">
                                    <span class="d100-kpi-label">"Отклонение"</span>
                                    <span class="d100-kpi-value">{format_money(row.delta)}</span>
                                </div>
                                <div class="d100-kpi">
                                    <span class="d100-kpi-label">"Выполнение"</span>
                                    <span class="d100-kpi-value">{format!("{}%", row.progress_percent)}</span>
                                </div>
                            </div>
                        })}
                    </div>
                </div>
            }.into_any()
        }}
    }
}

/// Overlay with the daily report for a date picked in the revenue table.
#[component]
fn DailyModal() -> impl IntoView {
    let ui = expect_context::<DashboardUiContext>();

    view! {
        {move || {
            if !ui.daily_modal_open.get() {
                return view! { <></> }.into_any();
            }
            let date = ui.selected_date.get();
            view! {
                <div class="d100-modal-overlay" on:click=move |_| ui.close_daily_modal()>
                    <div class="d100-modal d100-modal--wide" on:click=move |ev| ev.stop_propagation()>
                        <button
                            class="d100-modal-close"
                            on:click=move |_| ui.close_daily_modal()
                        >
                            "×"
                        </button>
                        <h3 class="d100-modal-title">{format!("Отчёт за {}", format_date(&date))}</h3>
                        <DailyTable />
                    </div>
                </div>
            }.into_any()
        }}
    }
}

#[component]
fn SummaryCards() -> impl IntoView {
    let store = expect_context::<DashboardDataStore>();

    view! {
        <section class="d100-summary">
            {move || {
                let handle = store.summary_handle();
                if handle.is_loading() {
                    return view! {
                        <div class="d100-loading"><span>"Загрузка данных..."</span></div>
                    }.into_any();
                }
                // a failed refresh keeps the previous figures on screen,
                // with the error shown above them
                let banner = handle.error_message().map(|err| view! {
                    <div class="d100-error">
                        <strong>"⚠ Ошибка: "</strong>
                        {err}
                    </div>
                });
                let Some(summary) = store.monthly_summary() else {
                    return view! { <>{banner}</> }.into_any();
                };
                let delta_class = if summary.kpi.delta >= 0.0 {
                    "d100-kpi-value d100-kpi-value--positive"
                } else {
                    "d100-kpi-value d100-kpi-value--negative"
                };
                view! {
                    <>
                    {banner}
                    <div class="d100-summary-grid">
                        <div class="d100-summary-card">
                            <h3>"Контракт"</h3>
                            <div class="d100-kpi">
                                <span class="d100-kpi-label">"Сумма контракта"</span>
                                <span class="d100-kpi-value">{format_money(summary.contract.total_contract_value)}</span>
                            </div>
                            <div class="d100-kpi">
                                <span class="d100-kpi-label">"Выполнено"</span>
                                <span class="d100-kpi-value">{format_money(summary.contract.fact_total)}</span>
                            </div>
                            {summary.contract.completion_pct.map(|pct| view! {
                                <div class="d100-kpi">
                                    <span class="d100-kpi-label">"Готовность"</span>
                                    <span class="d100-kpi-value">{format!("{:.1}%", pct)}</span>
                                </div>
                            })}
                        </div>
                        <div class="d100-summary-card">
                            <h3>"Месяц"</h3>
                            <div class="d100-kpi">
                                <span class="d100-kpi-label">"План"</span>
                                <span class="d100-kpi-value">{format_money(summary.kpi.plan_total)}</span>
                            </div>
                            <div class="d100-kpi">
                                <span class="d100-kpi-label">"Факт"</span>
                                <span class="d100-kpi-value">{format_money(summary.kpi.fact_total)}</span>
                            </div>
                            <div class="d100-kpi">
                                <span class="d100-kpi-label">"Отклонение"</span>
                                <span class=delta_class>{format_money(summary.kpi.delta)}</span>
                            </div>
                            <div class="d100-kpi">
                                <span class="d100-kpi-label">"Средняя выручка в день"</span>
                                <span class="d100-kpi-value">{format_money(summary.kpi.avg_daily_revenue)}</span>
                            </div>
                        </div>
                    </div>
                    </>
                }.into_any()
            }}
        </section>
    }
}

#[component]
fn SmetaCardsGrid() -> impl IntoView {
    let store = expect_context::<DashboardDataStore>();

    view! {
        <section class="d100-cards">
            {move || {
                let handle = store.cards_handle();
                if handle.is_loading() {
                    return view! {
                        <div class="d100-loading"><span>"Загрузка данных..."</span></div>
                    }.into_any();
                }
                let banner = handle.error_message().map(|err| view! {
                    <div class="d100-error">
                        <strong>"⚠ Ошибка: "</strong>
                        {err}
                    </div>
                });
                view! {
                    <>
                    {banner}
                    <div class="d100-cards-grid">
                        <For
                            each=move || store.smeta_cards()
                            key=|card| card.key.clone()
                            children=move |card| view! { <SmetaCardView card=card /> }
                        />
                    </div>
                    </>
                }.into_any()
            }}
        </section>
    }
}

#[component]
fn SmetaCardView(card: SmetaCard) -> impl IntoView {
    let ui = expect_context::<DashboardUiContext>();

    let key = card.key.clone();
    let selected = {
        let key = key.clone();
        move || ui.selected_smeta.get().as_deref() == Some(key.as_str())
    };
    let class = move || {
        if selected() {
            "d100-card d100-card--selected"
        } else {
            "d100-card"
        }
    };
    // the bar caps at 100% even when fact overshoots the plan
    let bar_width = card.progress_percent.clamp(0, 100);

    view! {
        <div class=class on:click=move |_| ui.set_selected_smeta(Some(key.clone()))>
            <div class="d100-card-title">{card.label.clone()}</div>
            <div class="d100-card-amounts">
                <span class="d100-card-fact">{format_money(card.fact)}</span>
                <span class="d100-card-plan">{format!("из {}", format_money(card.plan))}</span>
            </div>
            <div class="d100-progress">
                <div
                    class="d100-progress-bar"
                    style=format!("width: {}%", bar_width)
                ></div>
            </div>
            <div class="d100-card-percent">{format!("{}%", card.progress_percent)}</div>
        </div>
    }
}

#[component]
fn DetailsTable() -> impl IntoView {
    let ui = expect_context::<DashboardUiContext>();
    let store = expect_context::<DashboardDataStore>();

    view! {
        <section class="d100-details">
            {move || {
                let Some(handle) = store.details_handle() else {
                    return view! { <></> }.into_any();
                };
                if handle.is_loading() {
                    return view! {
                        <div class="d100-loading"><span>"Загрузка данных..."</span></div>
                    }.into_any();
                }
                let banner = handle.error_message().map(|err| view! {
                    <div class="d100-error">
                        <strong>"⚠ Ошибка: "</strong>
                        {err}
                    </div>
                });
                let rows = store.smeta_details();
                if rows.is_empty() {
                    if let Some(banner) = banner {
                        return banner.into_any();
                    }
                    return view! {
                        <div class="d100-empty">"Нет данных по выбранной смете"</div>
                    }.into_any();
                }
                view! {
                    <>
                    {banner}
                    <table class="d100-table">
                        <thead>
                            <tr>
                                <th>"Наименование"</th>
                                <th class="d100-num">"План"</th>
                                <th class="d100-num">"Факт"</th>
                                <th class="d100-num">"Отклонение"</th>
                                <th class="d100-num">"%"</th>
                            </tr>
                        </thead>
                        <tbody>
                            {rows.into_iter().map(|row| {
                                let title = row.title.clone();
                                let row_selected = {
                                    let title = title.clone();
                                    move || ui.selected_description.get().as_deref() == Some(title.as_str())
                                };
                                let row_class = move || {
                                    if row_selected() {
                                        "d100-row d100-row--selected"
                                    } else {
                                        "d100-row"
                                    }
                                };
                                view! {
                                    <tr
                                        class=row_class
                                        on:click=move |_| {
                                            ui.set_selected_description(Some(title.clone()));
                                            ui.open_description_modal();
                                        }
                                    >
                                        <td>{row.title.clone()}</td>
                                        <td class="d100-num">{format_money(row.plan)}</td>
                                        <td class="d100-num">{format_money(row.fact)}</td>
                                        <td class="d100-num">{format_money(row.delta)}</td>
                                        <td class="d100-num">{format!("{}%", row.progress_percent)}</td>
                                    </tr>
                                }
                            }).collect_view()}
                        </tbody>
                    </table>
                    </>
                }.into_any()
            }}
        </section>
    }
}

#[component]
fn DailyRevenueTable() -> impl IntoView {
    let ui = expect_context::<DashboardUiContext>();
    let store = expect_context::<DashboardDataStore>();

    view! {
        <section class="d100-daily-revenue">
            <h3>"Выручка по дням"</h3>
            {move || {
                let handle = store.daily_revenue_handle();
                if handle.is_loading() {
                    return view! {
                        <div class="d100-loading"><span>"Загрузка данных..."</span></div>
                    }.into_any();
                }
                let banner = handle.error_message().map(|err| view! {
                    <div class="d100-error">
                        <strong>"⚠ Ошибка: "</strong>
                        {err}
                    </div>
                });
                let rows: Vec<DailyRevenuePointDto> = handle.data_as().unwrap_or_default();
                if rows.is_empty() {
                    if let Some(banner) = banner {
                        return banner.into_any();
                    }
                    return view! {
                        <div class="d100-empty">"Нет выручки за выбранный месяц"</div>
                    }.into_any();
                }
                view! {
                    <>
                    {banner}
                    <table class="d100-table">
                        <thead>
                            <tr>
                                <th>"Дата"</th>
                                <th class="d100-num">"Выручка"</th>
                            </tr>
                        </thead>
                        <tbody>
                            {rows.into_iter().map(|row| {
                                let date = row.date.clone();
                                view! {
                                    <tr
                                        class="d100-row"
                                        title="Открыть отчёт за день"
                                        on:click=move |_| {
                                            ui.set_selected_date(&date);
                                            ui.open_daily_modal();
                                        }
                                    >
                                        <td>{format_date(&row.date)}</td>
                                        <td class="d100-num">{format_money(row.amount)}</td>
                                    </tr>
                                }
                            }).collect_view()}
                        </tbody>
                    </table>
                    </>
                }.into_any()
            }}
        </section>
    }
}
