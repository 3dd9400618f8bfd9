//! Food catalog domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog entry scoped to a group.
///
/// Invariant: no two foods in the same group share a name. Foods are created
/// explicitly through the catalog API or vivified on demand when a fridge
/// item, shopping task, or meal plan names a food the group does not have
/// yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "category")]
    pub category_id: Option<Uuid>,
    #[serde(rename = "unit")]
    pub unit_id: Option<Uuid>,
    pub image: String,
    #[serde(rename = "group")]
    pub group_id: Uuid,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
