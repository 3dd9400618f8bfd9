//! Meal plan repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{MealPlanEntity, MealPlanWithFoodEntity, MealTypeDb};
use crate::metrics::QueryTimer;

const PLAN_COLUMNS: &str =
    "id, group_id, food_id, date, meal_type, created_by, created_at, updated_at";

const PLAN_WITH_FOOD: &str = "SELECT p.id, p.group_id, p.food_id, f.name AS food_name, \
            c.name AS category_name, un.name AS unit_name, f.image AS food_image, \
            p.date, p.meal_type, p.created_by, p.created_at, p.updated_at \
     FROM meal_plans p \
     JOIN foods f ON p.food_id = f.id \
     LEFT JOIN categories c ON f.category_id = c.id \
     LEFT JOIN units un ON f.unit_id = un.id";

/// Repository for meal plan operations.
#[derive(Clone)]
pub struct MealPlanRepository {
    pool: PgPool,
}

impl MealPlanRepository {
    /// Creates a new MealPlanRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a meal plan entry.
    pub async fn create(
        &self,
        group_id: Uuid,
        food_id: Uuid,
        date: DateTime<Utc>,
        meal_type: MealTypeDb,
        created_by: Option<Uuid>,
    ) -> Result<MealPlanEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_meal_plan");
        let result = sqlx::query_as::<_, MealPlanEntity>(&format!(
            "INSERT INTO meal_plans (group_id, food_id, date, meal_type, created_by) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {PLAN_COLUMNS}"
        ))
        .bind(group_id)
        .bind(food_id)
        .bind(date)
        .bind(meal_type)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a meal plan by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MealPlanEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_meal_plan_by_id");
        let result = sqlx::query_as::<_, MealPlanEntity>(&format!(
            "SELECT {PLAN_COLUMNS} FROM meal_plans WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a meal plan with its food details joined.
    pub async fn find_with_food(
        &self,
        id: Uuid,
    ) -> Result<Option<MealPlanWithFoodEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_meal_plan_with_food");
        let result = sqlx::query_as::<_, MealPlanWithFoodEntity>(&format!(
            "{PLAN_WITH_FOOD} WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List a group's meal plans, optionally restricted to a time window.
    pub async fn list_by_group(
        &self,
        group_id: Uuid,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<MealPlanWithFoodEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_meal_plans_by_group");
        let (from, to) = window.unzip();
        let result = sqlx::query_as::<_, MealPlanWithFoodEntity>(&format!(
            "{PLAN_WITH_FOOD} \
             WHERE p.group_id = $1 \
               AND ($2::timestamptz IS NULL OR p.date BETWEEN $2 AND $3) \
             ORDER BY p.date ASC, p.meal_type ASC"
        ))
        .bind(group_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Apply the supplied fields to a meal plan.
    pub async fn update(
        &self,
        plan_id: Uuid,
        food_id: Option<Uuid>,
        date: Option<DateTime<Utc>>,
        meal_type: Option<MealTypeDb>,
    ) -> Result<MealPlanEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_meal_plan");
        let result = sqlx::query_as::<_, MealPlanEntity>(&format!(
            "UPDATE meal_plans SET \
                food_id = COALESCE($2, food_id), \
                date = COALESCE($3, date), \
                meal_type = COALESCE($4, meal_type), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PLAN_COLUMNS}"
        ))
        .bind(plan_id)
        .bind(food_id)
        .bind(date)
        .bind(meal_type)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a meal plan.
    pub async fn delete(&self, plan_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_meal_plan");
        let result = sqlx::query("DELETE FROM meal_plans WHERE id = $1")
            .bind(plan_id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    // MealPlanRepository methods require a live PostgreSQL instance; they
    // are exercised end to end through the route handlers.
}
