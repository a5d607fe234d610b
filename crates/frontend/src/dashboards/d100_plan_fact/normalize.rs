//! Maps wire DTOs into the canonical view models.
//!
//! Two payload families exist: the specialized per-view endpoints and the
//! combined fallback endpoint, which only gives a flat list of line items for
//! the month. For the fallback, cards are rebuilt client-side: items are
//! grouped by smeta label, labels are mapped to canonical keys through a
//! fixed lookup table (unknown labels get an ASCII slug), and plan/fact are
//! summed per group.

use std::collections::{HashMap, HashSet};

use contracts::dashboards::d100_plan_fact::{
    BySmetaResponse, CombinedDashboardResponse, CombinedItemDto, DailyResponse, DetailRowDto,
    MonthlySummaryResponse, PeriodValue, SmetaCardDto,
};

use crate::shared::date_utils;

use super::model::{
    ContractSummary, DailyReport, DailyRow, DetailRow, KpiSummary, MonthlySummary, SmetaCard,
};

/// Canonical smeta keys and their display labels.
const SMETA_LABELS: &[(&str, &str)] = &[
    ("leto", "Лето"),
    ("zima", "Зима"),
    ("vnereglement", "Внерегламент"),
];

/// Доля внерегламента от суммы летней и зимней смет.
/// Бизнес-правило из регламента отчётности, не статистика — менять нельзя.
const VNEREGLEMENT_PLAN_RATIO: f64 = 0.43;

const VNEREGLEMENT_KEY: &str = "vnereglement";

/// Map a raw smeta label (or backend code) to its canonical key.
/// Unrecognized labels fall back to an ASCII slug.
pub fn smeta_key_for_label(label: &str) -> String {
    let lower = label.trim().to_lowercase();
    match lower.as_str() {
        "лето" | "leto" => "leto".to_string(),
        "зима" | "zima" => "zima".to_string(),
        "внерегламент" | "внерегл" | "внерегл_ч_1" | "внерегл_ч_2" | "vnereglement" => {
            VNEREGLEMENT_KEY.to_string()
        }
        _ => ascii_slug(&lower),
    }
}

pub fn label_for_smeta_key(key: &str) -> String {
    SMETA_LABELS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| key.to_string())
}

fn ascii_slug(value: &str) -> String {
    let mut slug = String::new();
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
        } else if (ch == ' ' || ch == '-' || ch == '_') && !slug.is_empty() && !slug.ends_with('-')
        {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        "smeta".to_string()
    } else {
        slug
    }
}

/// `round(fact / plan * 100)`, 0 when plan is 0.
pub fn progress_percent(plan: f64, fact: f64) -> i64 {
    if plan == 0.0 {
        0
    } else {
        (fact / plan * 100.0).round() as i64
    }
}

fn build_card(
    key: String,
    label: String,
    plan: f64,
    fact: f64,
    delta: Option<f64>,
    pct: Option<i64>,
) -> SmetaCard {
    SmetaCard {
        delta: delta.unwrap_or(fact - plan),
        progress_percent: pct.unwrap_or_else(|| progress_percent(plan, fact)),
        key,
        label,
        plan,
        fact,
    }
}

fn sort_cards(cards: &mut Vec<SmetaCard>) {
    cards.sort_by(|a, b| b.fact.partial_cmp(&a.fact).unwrap_or(std::cmp::Ordering::Equal));
}

/// Cards from a list of card DTOs (specialized endpoint or the combined
/// endpoint's pre-built `cards` block). Duplicate keys keep the first card.
pub fn cards_from_dtos(dtos: Vec<SmetaCardDto>) -> Vec<SmetaCard> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut cards: Vec<SmetaCard> = Vec::with_capacity(dtos.len());
    for dto in dtos {
        let key = if dto.smeta_key.is_empty() {
            smeta_key_for_label(&dto.label)
        } else {
            dto.smeta_key.clone()
        };
        if !seen.insert(key.clone()) {
            continue;
        }
        let label = if dto.label.is_empty() {
            label_for_smeta_key(&key)
        } else {
            dto.label.clone()
        };
        cards.push(build_card(
            key,
            label,
            dto.plan,
            dto.fact,
            dto.delta,
            dto.progress_percent,
        ));
    }
    sort_cards(&mut cards);
    cards
}

pub fn cards_from_specialized(response: BySmetaResponse) -> Vec<SmetaCard> {
    cards_from_dtos(response.cards)
}

/// Cards rebuilt from the combined endpoint's raw line items.
///
/// When nothing maps to the off-schedule category its card is synthesized:
/// plan from the fixed ratio over the summer and winter plans, fact 0. When
/// the group exists but carries no plan of its own, the plan is derived the
/// same way (the backend never stores an off-schedule plan).
pub fn cards_from_combined(items: &[CombinedItemDto]) -> Vec<SmetaCard> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, (String, f64, f64)> = HashMap::new();

    for item in items {
        let key = smeta_key_for_label(&item.smeta);
        let group = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            let known = SMETA_LABELS.iter().any(|(k, _)| *k == key);
            let label = if known {
                label_for_smeta_key(&key)
            } else {
                item.smeta.trim().to_string()
            };
            (label, 0.0, 0.0)
        });
        group.1 += item.planned_amount;
        group.2 += item.fact_amount;
    }

    let derived_plan = {
        let plan_of = |key: &str| groups.get(key).map(|g| g.1).unwrap_or(0.0);
        ((plan_of("leto") + plan_of("zima")) * VNEREGLEMENT_PLAN_RATIO).round()
    };
    match groups.get_mut(VNEREGLEMENT_KEY) {
        Some(group) => {
            if group.1 == 0.0 {
                group.1 = derived_plan;
            }
        }
        None => {
            order.push(VNEREGLEMENT_KEY.to_string());
            groups.insert(
                VNEREGLEMENT_KEY.to_string(),
                (label_for_smeta_key(VNEREGLEMENT_KEY), derived_plan, 0.0),
            );
        }
    }

    let mut cards: Vec<SmetaCard> = order
        .into_iter()
        .filter_map(|key| {
            groups
                .remove(&key)
                .map(|(label, plan, fact)| build_card(key, label, plan, fact, None, None))
        })
        .collect();
    sort_cards(&mut cards);
    cards
}

pub fn summary_from_specialized(month: &str, response: MonthlySummaryResponse) -> MonthlySummary {
    let kpi = response.kpi;
    MonthlySummary {
        month: response.month.unwrap_or_else(|| month.to_string()),
        contract: ContractSummary {
            total_contract_value: response.contract.total_contract_value,
            fact_total: response.contract.fact_total,
            completion_pct: response.contract.completion_pct,
        },
        kpi: KpiSummary {
            delta: kpi.delta.unwrap_or(kpi.fact_total - kpi.plan_total),
            plan_total: kpi.plan_total,
            fact_total: kpi.fact_total,
            avg_daily_revenue: kpi.avg_daily_revenue,
        },
    }
}

pub fn summary_from_combined(month: &str, response: &CombinedDashboardResponse) -> MonthlySummary {
    let s = response.summary.clone().unwrap_or_default();
    let plan_total = s.planned_amount.unwrap_or(0.0);
    let fact_total = s.fact_amount.unwrap_or(0.0);
    MonthlySummary {
        month: response.month.clone().unwrap_or_else(|| month.to_string()),
        contract: ContractSummary {
            total_contract_value: s.contract_amount.unwrap_or(0.0),
            fact_total,
            completion_pct: s.contract_completion_pct,
        },
        kpi: KpiSummary {
            plan_total,
            fact_total,
            delta: s.delta_amount.unwrap_or(fact_total - plan_total),
            avg_daily_revenue: s.average_daily_revenue.unwrap_or(0.0),
        },
    }
}

pub fn details_from_rows(rows: Vec<DetailRowDto>) -> Vec<DetailRow> {
    rows.into_iter()
        .map(|row| DetailRow {
            delta: row.delta.unwrap_or(row.fact - row.plan),
            progress_percent: row
                .progress_percent
                .unwrap_or_else(|| progress_percent(row.plan, row.fact)),
            title: row.title,
            plan: row.plan,
            fact: row.fact,
        })
        .collect()
}

/// Detail rows rebuilt from combined line items: everything that maps to the
/// requested smeta key, one row per item.
pub fn details_from_combined(items: &[CombinedItemDto], smeta_key: &str) -> Vec<DetailRow> {
    items
        .iter()
        .filter(|item| smeta_key_for_label(&item.smeta) == smeta_key)
        .map(|item| DetailRow {
            title: item.title.clone(),
            plan: item.planned_amount,
            fact: item.fact_amount,
            delta: item.fact_amount - item.planned_amount,
            progress_percent: progress_percent(item.planned_amount, item.fact_amount),
        })
        .collect()
}

/// Months list from whatever shape the endpoint returned, newest first.
pub fn months_from_values(values: Vec<PeriodValue>) -> Vec<String> {
    let mut months: Vec<String> = values
        .iter()
        .filter_map(|v| date_utils::normalize_month(v.as_str()))
        .collect();
    months.sort();
    months.dedup();
    months.reverse();
    months
}

pub fn dates_from_values(values: Vec<PeriodValue>) -> Vec<String> {
    let mut dates: Vec<String> = values
        .iter()
        .filter_map(|v| date_utils::normalize_date(v.as_str()))
        .collect();
    dates.sort();
    dates.dedup();
    dates
}

pub fn daily_from_response(date: &str, response: DailyResponse) -> DailyReport {
    let report_date = response
        .date
        .as_deref()
        .and_then(date_utils::normalize_date)
        .unwrap_or_else(|| date.to_string());
    let rows: Vec<DailyRow> = response
        .rows
        .into_iter()
        .map(|row| DailyRow {
            name: row.description,
            unit: row.unit,
            volume: row.volume,
            amount: row.amount,
        })
        .collect();
    let total = response
        .total
        .map(|t| t.amount)
        .unwrap_or_else(|| rows.iter().map(|r| r.amount).sum());
    DailyReport {
        date: report_date,
        rows,
        total,
    }
}
