//! Fridge item entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::FridgeLocation;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for fridge_location that maps to the PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "fridge_location", rename_all = "lowercase")]
pub enum FridgeLocationDb {
    Freezer,
    Chiller,
    Vegetable,
    Door,
}

impl From<FridgeLocationDb> for FridgeLocation {
    fn from(db_location: FridgeLocationDb) -> Self {
        match db_location {
            FridgeLocationDb::Freezer => FridgeLocation::Freezer,
            FridgeLocationDb::Chiller => FridgeLocation::Chiller,
            FridgeLocationDb::Vegetable => FridgeLocation::Vegetable,
            FridgeLocationDb::Door => FridgeLocation::Door,
        }
    }
}

impl From<FridgeLocation> for FridgeLocationDb {
    fn from(location: FridgeLocation) -> Self {
        match location {
            FridgeLocation::Freezer => FridgeLocationDb::Freezer,
            FridgeLocation::Chiller => FridgeLocationDb::Chiller,
            FridgeLocation::Vegetable => FridgeLocationDb::Vegetable,
            FridgeLocation::Door => FridgeLocationDb::Door,
        }
    }
}

/// Database row mapping for the fridge_items table.
#[derive(Debug, Clone, FromRow)]
pub struct FridgeItemEntity {
    pub id: Uuid,
    pub food_id: Uuid,
    pub group_id: Uuid,
    pub quantity: f64,
    pub use_within: Option<i32>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub note: String,
    pub location: FridgeLocationDb,
    pub added_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FridgeItemEntity> for domain::models::FridgeItem {
    fn from(entity: FridgeItemEntity) -> Self {
        Self {
            id: entity.id,
            food_id: entity.food_id,
            group_id: entity.group_id,
            quantity: entity.quantity,
            use_within: entity.use_within,
            expiry_date: entity.expiry_date,
            note: entity.note,
            location: entity.location.into(),
            added_by: entity.added_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Fridge item joined with food, category, and unit names for API responses.
#[derive(Debug, Clone, FromRow)]
pub struct FridgeItemWithFoodEntity {
    pub id: Uuid,
    pub food_id: Uuid,
    pub food_name: String,
    pub category_name: Option<String>,
    pub unit_name: Option<String>,
    pub food_image: String,
    pub group_id: Uuid,
    pub quantity: f64,
    pub use_within: Option<i32>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub note: String,
    pub location: FridgeLocationDb,
    pub added_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
