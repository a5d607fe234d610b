//! Endpoint functions for the plan/fact dashboard.
//!
//! Each view first tries its specialized endpoint. A not-found answer means
//! the deployment only exposes the combined endpoint, so the client falls
//! back to it and rebuilds the view model locally (see `normalize`). Any
//! other error — network failure, 5xx — propagates unchanged: a genuine
//! outage must not be papered over by the fallback.

use contracts::dashboards::d100_plan_fact::{
    BySmetaResponse, CombinedDashboardResponse, DailyResponse, DailyRevenuePointDto,
    DailyRevenueResponse, LoadedAtResponse, MonthlySummaryResponse, PeriodValue,
    SmetaDetailsResponse,
};
use urlencoding::encode;

use crate::shared::api_error::ApiError;
use crate::shared::api_utils::request_json;
use crate::shared::date_utils::month_param;

use super::model::{DailyReport, DetailRow, MonthlySummary, SmetaCard};
use super::normalize;

async fn get_combined(month: Option<&str>) -> Result<CombinedDashboardResponse, ApiError> {
    let path = match month {
        Some(month) => format!("/api/dashboard?month={}", encode(&month_param(month))),
        None => "/api/dashboard".to_string(),
    };
    request_json(&path).await
}

pub async fn get_monthly_summary(month: &str) -> Result<MonthlySummary, ApiError> {
    let path = format!(
        "/api/dashboard/monthly/summary?month={}",
        encode(&month_param(month))
    );
    match request_json::<MonthlySummaryResponse>(&path).await {
        Ok(response) => Ok(normalize::summary_from_specialized(month, response)),
        Err(err) if err.is_not_found() => {
            log::debug!("summary endpoint missing, using combined dashboard");
            let combined = get_combined(Some(month)).await?;
            Ok(normalize::summary_from_combined(month, &combined))
        }
        Err(err) => Err(err),
    }
}

pub async fn get_smeta_cards(month: &str) -> Result<Vec<SmetaCard>, ApiError> {
    let path = format!(
        "/api/dashboard/monthly/by-smeta?month={}",
        encode(&month_param(month))
    );
    match request_json::<BySmetaResponse>(&path).await {
        Ok(response) => Ok(normalize::cards_from_specialized(response)),
        Err(err) if err.is_not_found() => {
            log::debug!("by-smeta endpoint missing, using combined dashboard");
            let combined = get_combined(Some(month)).await?;
            if combined.cards.is_empty() {
                Ok(normalize::cards_from_combined(&combined.items))
            } else {
                Ok(normalize::cards_from_dtos(combined.cards))
            }
        }
        Err(err) => Err(err),
    }
}

pub async fn get_smeta_details(month: &str, smeta_key: &str) -> Result<Vec<DetailRow>, ApiError> {
    let path = format!(
        "/api/dashboard/monthly/smeta-details?month={}&smeta_key={}",
        encode(&month_param(month)),
        encode(smeta_key)
    );
    match request_json::<SmetaDetailsResponse>(&path).await {
        Ok(response) => Ok(normalize::details_from_rows(response.rows)),
        Err(err) if err.is_not_found() => {
            log::debug!("smeta-details endpoint missing, using combined dashboard");
            let combined = get_combined(Some(month)).await?;
            Ok(normalize::details_from_combined(&combined.items, smeta_key))
        }
        Err(err) => Err(err),
    }
}

pub async fn get_available_months() -> Result<Vec<String>, ApiError> {
    match request_json::<Vec<PeriodValue>>("/api/dashboard/months").await {
        Ok(values) => Ok(normalize::months_from_values(values)),
        Err(err) if err.is_not_found() => {
            log::debug!("months endpoint missing, using combined dashboard");
            let combined = get_combined(None).await?;
            Ok(normalize::months_from_values(
                combined
                    .available_months
                    .into_iter()
                    .map(PeriodValue::Text)
                    .collect(),
            ))
        }
        Err(err) => Err(err),
    }
}

pub async fn get_available_dates(month: &str) -> Result<Vec<String>, ApiError> {
    let path = format!(
        "/api/dashboard/monthly/dates?month={}",
        encode(&month_param(month))
    );
    match request_json::<Vec<PeriodValue>>(&path).await {
        Ok(values) => Ok(normalize::dates_from_values(values)),
        // the combined endpoint carries no per-date information
        Err(err) if err.is_not_found() => Ok(Vec::new()),
        Err(err) => Err(err),
    }
}

pub async fn get_daily_revenue(month: &str) -> Result<Vec<DailyRevenuePointDto>, ApiError> {
    let path = format!(
        "/api/dashboard/monthly/daily-revenue?month={}",
        encode(&month_param(month))
    );
    let response: DailyRevenueResponse = request_json(&path).await?;
    Ok(response.rows)
}

pub async fn get_daily(date: &str) -> Result<DailyReport, ApiError> {
    let path = format!("/api/dashboard/daily?date={}", encode(date));
    let response: DailyResponse = request_json(&path).await?;
    Ok(normalize::daily_from_response(date, response))
}

pub async fn get_last_loaded() -> Result<Option<String>, ApiError> {
    let response: LoadedAtResponse = request_json("/api/dashboard/last-loaded").await?;
    Ok(response.loaded_at)
}
