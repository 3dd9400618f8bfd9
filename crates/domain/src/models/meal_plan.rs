//! Meal plan domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// One planned dish for a group on a given date and meal slot.
///
/// Several dishes may share the same (group, date, meal) slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
    pub id: Uuid,
    #[serde(rename = "group")]
    pub group_id: Uuid,
    #[serde(rename = "food")]
    pub food_id: Uuid,
    pub date: DateTime<Utc>,
    pub meal_type: MealType,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Meal slot within a day.
///
/// Wire values are the Vietnamese labels used by the mobile client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealType {
    #[serde(rename = "sáng")]
    Morning,
    #[serde(rename = "trưa")]
    Noon,
    #[serde(rename = "tối")]
    Evening,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Morning => "sáng",
            MealType::Noon => "trưa",
            MealType::Evening => "tối",
        }
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sáng" => Ok(MealType::Morning),
            "trưa" => Ok(MealType::Noon),
            "tối" => Ok(MealType::Evening),
            _ => Err(format!("Invalid meal type: {}", s)),
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_type_round_trip() {
        for label in ["sáng", "trưa", "tối"] {
            let meal = MealType::from_str(label).unwrap();
            assert_eq!(meal.as_str(), label);
        }
    }

    #[test]
    fn test_meal_type_rejects_unknown_labels() {
        assert!(MealType::from_str("breakfast").is_err());
        assert!(MealType::from_str("").is_err());
        // ASCII approximations are not accepted
        assert!(MealType::from_str("sang").is_err());
    }

    #[test]
    fn test_meal_type_serialization() {
        assert_eq!(
            serde_json::to_string(&MealType::Morning).unwrap(),
            "\"sáng\""
        );
        let parsed: MealType = serde_json::from_str("\"tối\"").unwrap();
        assert_eq!(parsed, MealType::Evening);
    }
}
