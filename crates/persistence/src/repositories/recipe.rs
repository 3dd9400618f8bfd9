//! Recipe repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{RecipeEntity, RecipeWithFoodEntity};
use crate::metrics::QueryTimer;

const RECIPE_COLUMNS: &str =
    "id, name, food_id, description, html_content, created_by, created_at, updated_at";

const RECIPE_WITH_FOOD: &str = "SELECT r.id, r.name, r.food_id, f.name AS food_name, \
            c.name AS category_name, un.name AS unit_name, f.image AS food_image, \
            r.description, r.html_content, r.created_by, r.created_at, r.updated_at \
     FROM recipes r \
     JOIN foods f ON r.food_id = f.id \
     LEFT JOIN categories c ON f.category_id = c.id \
     LEFT JOIN units un ON f.unit_id = un.id";

/// Repository for recipe operations.
#[derive(Clone)]
pub struct RecipeRepository {
    pool: PgPool,
}

impl RecipeRepository {
    /// Creates a new RecipeRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a recipe for a food.
    pub async fn create(
        &self,
        name: &str,
        food_id: Uuid,
        description: &str,
        html_content: &str,
        created_by: Option<Uuid>,
    ) -> Result<RecipeEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_recipe");
        let result = sqlx::query_as::<_, RecipeEntity>(&format!(
            "INSERT INTO recipes (name, food_id, description, html_content, created_by) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {RECIPE_COLUMNS}"
        ))
        .bind(name)
        .bind(food_id)
        .bind(description)
        .bind(html_content)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a recipe by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<RecipeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_recipe_by_id");
        let result = sqlx::query_as::<_, RecipeEntity>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a recipe with its food details joined.
    pub async fn find_with_food(
        &self,
        id: Uuid,
    ) -> Result<Option<RecipeWithFoodEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_recipe_with_food");
        let result = sqlx::query_as::<_, RecipeWithFoodEntity>(&format!(
            "{RECIPE_WITH_FOOD} WHERE r.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List recipes, optionally restricted to one food, newest first.
    pub async fn list(
        &self,
        food_id: Option<Uuid>,
    ) -> Result<Vec<RecipeWithFoodEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_recipes");
        let result = sqlx::query_as::<_, RecipeWithFoodEntity>(&format!(
            "{RECIPE_WITH_FOOD} \
             WHERE ($1::uuid IS NULL OR r.food_id = $1) \
             ORDER BY r.created_at DESC"
        ))
        .bind(food_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Apply the supplied fields to a recipe.
    pub async fn update(
        &self,
        recipe_id: Uuid,
        name: Option<&str>,
        food_id: Option<Uuid>,
        description: Option<&str>,
        html_content: Option<&str>,
    ) -> Result<RecipeEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_recipe");
        let result = sqlx::query_as::<_, RecipeEntity>(&format!(
            "UPDATE recipes SET \
                name = COALESCE($2, name), \
                food_id = COALESCE($3, food_id), \
                description = COALESCE($4, description), \
                html_content = COALESCE($5, html_content), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {RECIPE_COLUMNS}"
        ))
        .bind(recipe_id)
        .bind(name)
        .bind(food_id)
        .bind(description)
        .bind(html_content)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a recipe.
    pub async fn delete(&self, recipe_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_recipe");
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    // RecipeRepository methods require a live PostgreSQL instance; they are
    // exercised end to end through the route handlers.
}
