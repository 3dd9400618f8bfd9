//! Fridge inventory domain models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// One inventory row per (food, group) pair.
///
/// Adding a food that is already in the fridge increments the existing row's
/// quantity instead of creating a duplicate. `expiry_date` is derived from
/// `use_within` at write time and recomputed from "now" whenever a new
/// use-within value is supplied, never adjusted incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FridgeItem {
    pub id: Uuid,
    #[serde(rename = "food")]
    pub food_id: Uuid,
    #[serde(rename = "group")]
    pub group_id: Uuid,
    pub quantity: f64,
    pub use_within: Option<i32>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub note: String,
    pub location: FridgeLocation,
    pub added_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Computes an expiry date from a use-within day count.
///
/// `days = 0` yields `now` itself: the item counts as expired from today on,
/// which is distinct from having no expiry at all.
pub fn expiry_from_use_within(now: DateTime<Utc>, days: i32) -> DateTime<Utc> {
    now + Duration::days(i64::from(days))
}

/// Storage compartment of a fridge item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FridgeLocation {
    Freezer,
    Chiller,
    Vegetable,
    Door,
}

impl FridgeLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            FridgeLocation::Freezer => "freezer",
            FridgeLocation::Chiller => "chiller",
            FridgeLocation::Vegetable => "vegetable",
            FridgeLocation::Door => "door",
        }
    }
}

impl Default for FridgeLocation {
    fn default() -> Self {
        FridgeLocation::Chiller
    }
}

impl FromStr for FridgeLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "freezer" => Ok(FridgeLocation::Freezer),
            "chiller" => Ok(FridgeLocation::Chiller),
            "vegetable" => Ok(FridgeLocation::Vegetable),
            "door" => Ok(FridgeLocation::Door),
            _ => Err(format!("Invalid fridge location: {}", s)),
        }
    }
}

impl fmt::Display for FridgeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_from_use_within() {
        let now = Utc::now();
        let expiry = expiry_from_use_within(now, 7);
        assert_eq!(expiry - now, Duration::days(7));
    }

    #[test]
    fn test_expiry_from_use_within_zero_is_now() {
        // Zero days means "expires today", not "no expiry"
        let now = Utc::now();
        assert_eq!(expiry_from_use_within(now, 0), now);
    }

    #[test]
    fn test_location_defaults_to_chiller() {
        assert_eq!(FridgeLocation::default(), FridgeLocation::Chiller);
    }

    #[test]
    fn test_location_round_trip() {
        for name in ["freezer", "chiller", "vegetable", "door"] {
            let loc = FridgeLocation::from_str(name).unwrap();
            assert_eq!(loc.as_str(), name);
        }
        assert!(FridgeLocation::from_str("pantry").is_err());
    }

    #[test]
    fn test_location_serialization() {
        assert_eq!(
            serde_json::to_string(&FridgeLocation::Vegetable).unwrap(),
            "\"vegetable\""
        );
        let parsed: FridgeLocation = serde_json::from_str("\"door\"").unwrap();
        assert_eq!(parsed, FridgeLocation::Door);
    }
}
