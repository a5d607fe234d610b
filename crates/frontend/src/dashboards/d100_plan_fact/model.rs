//! Canonical view models of the plan/fact dashboard.
//!
//! Everything the views render is one of these records; the normalizer maps
//! the heterogeneous wire shapes (see the `contracts` crate) into them. They
//! serialize cleanly because the query cache stores records as JSON values.

use serde::{Deserialize, Serialize};

/// Monthly summary: contract card plus KPI card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month: String,
    pub contract: ContractSummary,
    pub kpi: KpiSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractSummary {
    pub total_contract_value: f64,
    /// Cumulative executed amount across all months
    pub fact_total: f64,
    pub completion_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub plan_total: f64,
    pub fact_total: f64,
    /// Invariant: `delta == fact_total - plan_total`
    pub delta: f64,
    pub avg_daily_revenue: f64,
}

/// One budget-category card. Unique by `key` within a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmetaCard {
    pub key: String,
    pub label: String,
    pub plan: f64,
    pub fact: f64,
    pub delta: f64,
    /// `round(fact / plan * 100)`, 0 when plan is 0
    pub progress_percent: i64,
}

/// One line item inside a category, same derived-field rules as the card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    pub title: String,
    pub plan: f64,
    pub fact: f64,
    pub delta: f64,
    pub progress_percent: i64,
}

/// One day of work for the daily view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    pub date: String,
    pub rows: Vec<DailyRow>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRow {
    pub name: String,
    pub unit: String,
    pub volume: f64,
    pub amount: f64,
}
