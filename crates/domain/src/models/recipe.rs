//! Recipe domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A cooking recipe attached to a food.
///
/// Recipes carry no group of their own; they are reachable through the food
/// they describe. `html_content` is an opaque rich-text blob and is never
/// parsed server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "food")]
    pub food_id: Uuid,
    pub description: String,
    pub html_content: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
