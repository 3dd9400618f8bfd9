//! Shopping list and task entities (database row mappings).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the shopping_lists table.
#[derive(Debug, Clone, FromRow)]
pub struct ShoppingListEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: Option<String>,
    pub date: NaiveDate,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ShoppingListEntity> for domain::models::ShoppingList {
    fn from(entity: ShoppingListEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            name: entity.name,
            date: entity.date,
            created_by: entity.created_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the shopping_tasks table.
#[derive(Debug, Clone, FromRow)]
pub struct ShoppingTaskEntity {
    pub id: Uuid,
    pub shopping_list_id: Uuid,
    pub food_id: Uuid,
    pub quantity: f64,
    pub assigned_to: Option<Uuid>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ShoppingTaskEntity> for domain::models::ShoppingTask {
    fn from(entity: ShoppingTaskEntity) -> Self {
        Self {
            id: entity.id,
            shopping_list_id: entity.shopping_list_id,
            food_id: entity.food_id,
            quantity: entity.quantity,
            assigned_to: entity.assigned_to,
            is_completed: entity.is_completed,
            completed_at: entity.completed_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Task joined with food details and assignee names for API responses.
#[derive(Debug, Clone, FromRow)]
pub struct ShoppingTaskWithFoodEntity {
    pub id: Uuid,
    pub shopping_list_id: Uuid,
    pub food_id: Uuid,
    pub food_name: String,
    pub category_name: Option<String>,
    pub unit_name: Option<String>,
    pub food_image: String,
    pub quantity: f64,
    pub assigned_to: Option<Uuid>,
    pub assigned_to_name: Option<String>,
    pub assigned_to_username: Option<String>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
