//! Recipe entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the recipes table.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeEntity {
    pub id: Uuid,
    pub name: String,
    pub food_id: Uuid,
    pub description: String,
    pub html_content: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RecipeEntity> for domain::models::Recipe {
    fn from(entity: RecipeEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            food_id: entity.food_id,
            description: entity.description,
            html_content: entity.html_content,
            created_by: entity.created_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Recipe joined with food details for API responses.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeWithFoodEntity {
    pub id: Uuid,
    pub name: String,
    pub food_id: Uuid,
    pub food_name: String,
    pub category_name: Option<String>,
    pub unit_name: Option<String>,
    pub food_image: String,
    pub description: String,
    pub html_content: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
