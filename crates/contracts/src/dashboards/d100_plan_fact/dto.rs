//! Wire contracts for the plan/fact dashboard API.
//!
//! The backend has gone through several generations of field naming, so most
//! numeric fields carry `#[serde(alias = ...)]` for the legacy spellings.
//! Missing numeric fields decode as 0, missing collections as empty; a
//! malformed body is only an error when it cannot be parsed at all.

use serde::{Deserialize, Serialize};

/// Response of `GET /api/dashboard/monthly/summary`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySummaryResponse {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub contract: ContractBlock,
    #[serde(default)]
    pub kpi: KpiBlock,
}

/// Contract-level figures of the monthly summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractBlock {
    /// Total contract value ("сумма контракта")
    #[serde(default, alias = "summa_contract", alias = "contract_amount")]
    pub total_contract_value: f64,
    /// Cumulative executed amount across all months
    #[serde(default, alias = "contract_executed")]
    pub fact_total: f64,
    #[serde(
        default,
        alias = "contract_planfact_pct",
        alias = "contract_completion_pct"
    )]
    pub completion_pct: Option<f64>,
}

/// KPI block of the monthly summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KpiBlock {
    #[serde(default, alias = "planned_amount")]
    pub plan_total: f64,
    #[serde(default, alias = "fact_amount")]
    pub fact_total: f64,
    #[serde(default, alias = "delta_amount")]
    pub delta: Option<f64>,
    #[serde(default, alias = "average_daily_revenue")]
    pub avg_daily_revenue: f64,
}

/// Response of `GET /api/dashboard/monthly/by-smeta`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BySmetaResponse {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub cards: Vec<SmetaCardDto>,
}

/// One budget-category card as sent by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmetaCardDto {
    #[serde(default, alias = "key")]
    pub smeta_key: String,
    #[serde(default, alias = "smeta", alias = "title")]
    pub label: String,
    #[serde(
        default,
        alias = "planned_amount",
        alias = "planned",
        alias = "planned_amount_month"
    )]
    pub plan: f64,
    #[serde(
        default,
        alias = "fact_amount",
        alias = "fact_amount_done",
        alias = "fact_amount_month"
    )]
    pub fact: f64,
    #[serde(default)]
    pub delta: Option<f64>,
    #[serde(default, alias = "progressPercent")]
    pub progress_percent: Option<i64>,
}

/// Response of `GET /api/dashboard/monthly/smeta-details`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmetaDetailsResponse {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub smeta_key: Option<String>,
    #[serde(default)]
    pub rows: Vec<DetailRowDto>,
}

/// One line item inside a budget category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetailRowDto {
    #[serde(default, alias = "description", alias = "work_name", alias = "name")]
    pub title: String,
    #[serde(
        default,
        alias = "planned_amount",
        alias = "planned",
        alias = "planned_amount_month"
    )]
    pub plan: f64,
    #[serde(
        default,
        alias = "fact_amount",
        alias = "fact_amount_done",
        alias = "fact_amount_month"
    )]
    pub fact: f64,
    #[serde(default)]
    pub delta: Option<f64>,
    #[serde(default, alias = "progressPercent")]
    pub progress_percent: Option<i64>,
}

/// Response of the combined fallback endpoint `GET /api/dashboard?month=...`
///
/// Older deployments expose only this endpoint; it bundles everything the
/// specialized endpoints would return, plus a flat list of raw line items
/// the client has to aggregate itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedDashboardResponse {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub summary: Option<CombinedSummaryDto>,
    #[serde(default)]
    pub items: Vec<CombinedItemDto>,
    #[serde(default)]
    pub cards: Vec<SmetaCardDto>,
    #[serde(default, alias = "months")]
    pub available_months: Vec<String>,
}

/// Summary block of the combined endpoint (all fields optional)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombinedSummaryDto {
    #[serde(default)]
    pub planned_amount: Option<f64>,
    #[serde(default)]
    pub fact_amount: Option<f64>,
    #[serde(default)]
    pub delta_amount: Option<f64>,
    #[serde(default)]
    pub contract_amount: Option<f64>,
    #[serde(default)]
    pub contract_completion_pct: Option<f64>,
    #[serde(default)]
    pub average_daily_revenue: Option<f64>,
}

/// Raw line item of the combined endpoint, tagged with its smeta label
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombinedItemDto {
    #[serde(default, alias = "smeta_code", alias = "category")]
    pub smeta: String,
    #[serde(default, alias = "description", alias = "work_name", alias = "name")]
    pub title: String,
    #[serde(
        default,
        alias = "plan",
        alias = "planned",
        alias = "planned_amount_month"
    )]
    pub planned_amount: f64,
    #[serde(
        default,
        alias = "fact",
        alias = "fact_amount_done",
        alias = "fact_amount_month"
    )]
    pub fact_amount: f64,
}

/// Response of `GET /api/dashboard/daily`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyResponse {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub rows: Vec<DailyRowDto>,
    #[serde(default)]
    pub total: Option<DailyTotalDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyRowDto {
    #[serde(default, alias = "name", alias = "work_name", alias = "title")]
    pub description: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub amount: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyTotalDto {
    #[serde(default)]
    pub amount: f64,
}

/// Response of `GET /api/dashboard/monthly/daily-revenue`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRevenueResponse {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub rows: Vec<DailyRevenuePointDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DailyRevenuePointDto {
    #[serde(default)]
    pub date: String,
    #[serde(default, alias = "revenue", alias = "fact_amount")]
    pub amount: f64,
}

/// Response of `GET /api/dashboard/last-loaded`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadedAtResponse {
    #[serde(default, alias = "last_updated", alias = "updated_at")]
    pub loaded_at: Option<String>,
}

/// The months/dates list endpoints are inconsistent across deployments:
/// some return bare strings, some wrap each value into an object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PeriodValue {
    Text(String),
    Keyed {
        #[serde(alias = "value", alias = "month_key", alias = "month_start", alias = "date")]
        month: String,
    },
}

impl PeriodValue {
    pub fn as_str(&self) -> &str {
        match self {
            PeriodValue::Text(s) => s,
            PeriodValue::Keyed { month } => month,
        }
    }
}
