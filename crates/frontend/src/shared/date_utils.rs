/// Utilities for month and date handling
///
/// The dashboard operates on two granularities: months as `YYYY-MM` and
/// dates as `YYYY-MM-DD`. Whatever comes from the URL or the backend is
/// normalized to these shapes before use.
use chrono::{Datelike, NaiveDate, Utc};

/// Normalize a month-ish value to `YYYY-MM`.
/// Accepts `YYYY-MM`, `YYYY-MM-DD` and ISO timestamps; returns `None` for
/// anything that does not contain a valid calendar month.
pub fn normalize_month(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.len() < 7 {
        return None;
    }
    let month: String = trimmed.chars().take(7).collect();
    NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d").ok()?;
    Some(month)
}

/// Normalize a date-ish value to `YYYY-MM-DD`.
pub fn normalize_date(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.len() < 10 {
        return None;
    }
    let date: String = trimmed.chars().take(10).collect();
    NaiveDate::parse_from_str(&date, "%Y-%m-%d").ok()?;
    Some(date)
}

/// Expand a month value to the request parameter the backend expects.
///
/// The API takes full dates: a bare `YYYY-MM` becomes `YYYY-MM-01`, a full
/// `YYYY-MM-DD` passes through unchanged. Unparseable input is passed along
/// as-is and left for the backend to reject.
pub fn month_param(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.len() >= 10 {
        if let Some(date) = normalize_date(trimmed) {
            return date;
        }
    }
    match normalize_month(trimmed) {
        Some(month) => format!("{}-01", month),
        None => trimmed.to_string(),
    }
}

/// Current month as `YYYY-MM` (UTC)
pub fn current_month() -> String {
    Utc::now().date_naive().format("%Y-%m").to_string()
}

/// Current date as `YYYY-MM-DD` (UTC)
pub fn current_date() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Last `count` months including the current one, oldest first.
/// Used as a local fallback when the backend has no month list.
pub fn recent_months(count: u32) -> Vec<String> {
    let today = Utc::now().date_naive();
    let mut year = today.year();
    let mut month = today.month();
    let mut list = Vec::with_capacity(count as usize);
    for _ in 0..count {
        list.push(format!("{:04}-{:02}", year, month));
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }
    list.reverse();
    list
}

const MONTH_NAMES: [&str; 12] = [
    "Январь",
    "Февраль",
    "Март",
    "Апрель",
    "Май",
    "Июнь",
    "Июль",
    "Август",
    "Сентябрь",
    "Октябрь",
    "Ноябрь",
    "Декабрь",
];

/// Human label for a `YYYY-MM` value, e.g. "2025-11" -> "Ноябрь 2025".
/// Unparseable input is shown as-is.
pub fn format_month(month: &str) -> String {
    let parsed = normalize_month(month).and_then(|m| {
        let (year, num) = m.split_once('-')?;
        let index = num.parse::<usize>().ok()?.checked_sub(1)?;
        Some(format!("{} {}", MONTH_NAMES.get(index)?, year))
    });
    parsed.unwrap_or_else(|| month.to_string())
}

/// Format ISO date string to DD.MM.YYYY format
/// Example: "2024-03-15" or "2024-03-15T14:02:26Z" -> "15.03.2024"
pub fn format_date(date_str: &str) -> String {
    let date_part = date_str.split('T').next().unwrap_or(date_str);
    if let Some((year, rest)) = date_part.split_once('-') {
        if let Some((month, day)) = rest.split_once('-') {
            return format!("{}.{}.{}", day, month, year);
        }
    }
    date_str.to_string()
}

/// Format ISO datetime string to DD.MM.YYYY HH:MM:SS format
/// Example: "2024-03-15T14:02:26.123Z" -> "15.03.2024 14:02:26"
pub fn format_datetime(datetime_str: &str) -> String {
    if let Some((date_part, time_part)) = datetime_str.split_once('T') {
        if let Some((year, rest)) = date_part.split_once('-') {
            if let Some((month, day)) = rest.split_once('-') {
                let time = time_part.split('.').next().unwrap_or(time_part);
                let time = time.trim_end_matches('Z');
                return format!("{}.{}.{} {}", day, month, year, time);
            }
        }
    }
    datetime_str.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_month() {
        assert_eq!(normalize_month("2025-11"), Some("2025-11".to_string()));
        assert_eq!(normalize_month("2025-11-05"), Some("2025-11".to_string()));
        assert_eq!(
            normalize_month("2025-11-05T10:00:00Z"),
            Some("2025-11".to_string())
        );
        assert_eq!(normalize_month("2025-13"), None);
        assert_eq!(normalize_month("garbage"), None);
        assert_eq!(normalize_month(""), None);
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2025-11-05"), Some("2025-11-05".to_string()));
        assert_eq!(
            normalize_date("2025-11-05T10:00:00Z"),
            Some("2025-11-05".to_string())
        );
        assert_eq!(normalize_date("2025-11"), None);
        assert_eq!(normalize_date("2025-11-32"), None);
    }

    #[test]
    fn test_month_param_expands_bare_month() {
        assert_eq!(month_param("2025-11"), "2025-11-01");
    }

    #[test]
    fn test_month_param_passes_full_date_through() {
        assert_eq!(month_param("2025-11-05"), "2025-11-05");
    }

    #[test]
    fn test_recent_months() {
        let months = recent_months(6);
        assert_eq!(months.len(), 6);
        assert_eq!(months.last(), Some(&current_month()));
        for m in &months {
            assert!(normalize_month(m).is_some());
        }
    }

    #[test]
    fn test_format_month() {
        assert_eq!(format_month("2025-11"), "Ноябрь 2025");
        assert_eq!(format_month("2025-01"), "Январь 2025");
        assert_eq!(format_month("junk"), "junk");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-03-15"), "15.03.2024");
        assert_eq!(format_date("2024-03-15T14:02:26.123Z"), "15.03.2024");
        assert_eq!(format_date("invalid"), "invalid");
    }

    #[test]
    fn test_format_datetime() {
        assert_eq!(
            format_datetime("2024-03-15T14:02:26.123Z"),
            "15.03.2024 14:02:26"
        );
    }
}
