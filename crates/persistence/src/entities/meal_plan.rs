//! Meal plan entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::MealType;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for meal_type that maps to the PostgreSQL enum type.
///
/// Stored labels are ASCII; the Vietnamese wire labels live on the domain
/// enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "meal_type", rename_all = "lowercase")]
pub enum MealTypeDb {
    Morning,
    Noon,
    Evening,
}

impl From<MealTypeDb> for MealType {
    fn from(db_meal: MealTypeDb) -> Self {
        match db_meal {
            MealTypeDb::Morning => MealType::Morning,
            MealTypeDb::Noon => MealType::Noon,
            MealTypeDb::Evening => MealType::Evening,
        }
    }
}

impl From<MealType> for MealTypeDb {
    fn from(meal: MealType) -> Self {
        match meal {
            MealType::Morning => MealTypeDb::Morning,
            MealType::Noon => MealTypeDb::Noon,
            MealType::Evening => MealTypeDb::Evening,
        }
    }
}

/// Database row mapping for the meal_plans table.
#[derive(Debug, Clone, FromRow)]
pub struct MealPlanEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub food_id: Uuid,
    pub date: DateTime<Utc>,
    pub meal_type: MealTypeDb,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MealPlanEntity> for domain::models::MealPlan {
    fn from(entity: MealPlanEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            food_id: entity.food_id,
            date: entity.date,
            meal_type: entity.meal_type.into(),
            created_by: entity.created_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Meal plan joined with food details for API responses.
#[derive(Debug, Clone, FromRow)]
pub struct MealPlanWithFoodEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub food_id: Uuid,
    pub food_name: String,
    pub category_name: Option<String>,
    pub unit_name: Option<String>,
    pub food_image: String,
    pub date: DateTime<Utc>,
    pub meal_type: MealTypeDb,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
