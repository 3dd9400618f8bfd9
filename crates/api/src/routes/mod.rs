//! HTTP route handlers.

pub mod admin;
pub mod auth;
pub mod foods;
pub mod fridge;
pub mod groups;
pub mod health;
pub mod meal_plans;
pub mod recipes;
pub mod shopping;
pub mod users;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Food block embedded in fridge, shopping, meal-plan, and recipe responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodDetails {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub image: String,
}

/// Resolves the caller's group ID.
///
/// Group-scoped routes sit behind the membership gate, so this only fires on
/// a misconfigured router; it degrades to the same no-group error the gate
/// produces rather than panicking.
pub(crate) fn require_group_id(user: &domain::models::User) -> Result<Uuid, crate::error::ApiError> {
    user.group_id.ok_or(crate::error::ApiError::NoGroup {
        code: "00096",
        message: "Bạn không thuộc về nhóm nào.",
    })
}

/// Parses a client-supplied timestamp.
///
/// Accepts RFC 3339 date-times and plain `YYYY-MM-DD` dates (interpreted as
/// UTC midnight).
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Parses a client-supplied value into a calendar day, dropping any time
/// component.
pub(crate) fn parse_day(value: &str) -> Option<NaiveDate> {
    parse_timestamp(value).map(|ts| ts.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let ts = parse_timestamp("2024-03-01T10:30:00+07:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-01T03:30:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_date_only() {
        let ts = parse_timestamp("2024-03-01").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-01T00:00:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_invalid() {
        assert!(parse_timestamp("not-a-date").is_none());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("2024-13-40").is_none());
    }

    #[test]
    fn test_parse_day_normalizes_time_away() {
        let day = parse_day("2024-03-01T23:59:00Z").unwrap();
        assert_eq!(day, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }
}
