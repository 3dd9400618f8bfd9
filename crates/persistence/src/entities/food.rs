//! Food entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the foods table.
#[derive(Debug, Clone, FromRow)]
pub struct FoodEntity {
    pub id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub unit_id: Option<Uuid>,
    pub image: String,
    pub group_id: Uuid,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FoodEntity> for domain::models::Food {
    fn from(entity: FoodEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            category_id: entity.category_id,
            unit_id: entity.unit_id,
            image: entity.image,
            group_id: entity.group_id,
            created_by: entity.created_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Food row joined with its category and unit names for API responses.
#[derive(Debug, Clone, FromRow)]
pub struct FoodWithRefsEntity {
    pub id: Uuid,
    pub name: String,
    pub category_name: Option<String>,
    pub unit_name: Option<String>,
    pub image: String,
    pub group_id: Uuid,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
