//! Shopping list and task domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A per-day shopping list for a group.
///
/// The date is a calendar day (times are normalized away); one list exists
/// per (group, date). Deleting a list removes all of its tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    pub id: Uuid,
    #[serde(rename = "group")]
    pub group_id: Uuid,
    pub name: Option<String>,
    pub date: NaiveDate,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One item to buy on a shopping list.
///
/// A food appears at most once per list; duplicates are rejected at
/// creation. `completed_at` is set and cleared in lockstep with
/// `is_completed` and never diverges from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingTask {
    pub id: Uuid,
    #[serde(rename = "shoppingList")]
    pub shopping_list_id: Uuid,
    #[serde(rename = "food")]
    pub food_id: Uuid,
    pub quantity: f64,
    pub assigned_to: Option<Uuid>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
