//! Food catalog repository, including on-demand vivification.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{FoodEntity, FoodWithRefsEntity};
use crate::metrics::QueryTimer;
use crate::repositories::is_unique_violation;

const FOOD_COLUMNS: &str =
    "id, name, category_id, unit_id, image, group_id, created_by, created_at, updated_at";

const FOOD_WITH_REFS: &str = "SELECT f.id, f.name, c.name AS category_name, u.name AS unit_name, \
            f.image, f.group_id, f.created_by, f.created_at, f.updated_at \
     FROM foods f \
     LEFT JOIN categories c ON f.category_id = c.id \
     LEFT JOIN units u ON f.unit_id = u.id";

/// Repository for food catalog operations.
#[derive(Clone)]
pub struct FoodRepository {
    pool: PgPool,
}

impl FoodRepository {
    /// Creates a new FoodRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a food by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<FoodEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_food_by_id");
        let result = sqlx::query_as::<_, FoodEntity>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a food by its (name, group) pair.
    pub async fn find_by_name(
        &self,
        group_id: Uuid,
        name: &str,
    ) -> Result<Option<FoodEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_food_by_name");
        let result = sqlx::query_as::<_, FoodEntity>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods WHERE group_id = $1 AND name = $2"
        ))
        .bind(group_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a food by ID with its category and unit names joined.
    pub async fn find_with_refs(
        &self,
        id: Uuid,
    ) -> Result<Option<FoodWithRefsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_food_with_refs");
        let result =
            sqlx::query_as::<_, FoodWithRefsEntity>(&format!("{FOOD_WITH_REFS} WHERE f.id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await;
        timer.record();
        result
    }

    /// List a group's catalog sorted by name.
    pub async fn list_by_group(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<FoodWithRefsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_foods_by_group");
        let result = sqlx::query_as::<_, FoodWithRefsEntity>(&format!(
            "{FOOD_WITH_REFS} WHERE f.group_id = $1 ORDER BY f.name ASC"
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Check for another food with this name in the group.
    pub async fn name_exists(
        &self,
        group_id: Uuid,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("check_food_name_exists");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM foods \
             WHERE group_id = $1 AND name = $2 AND ($3::uuid IS NULL OR id <> $3))",
        )
        .bind(group_id)
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Create a catalog entry.
    pub async fn create(
        &self,
        name: &str,
        category_id: Option<Uuid>,
        unit_id: Option<Uuid>,
        image: &str,
        group_id: Uuid,
        created_by: Option<Uuid>,
    ) -> Result<FoodEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_food");
        let result = sqlx::query_as::<_, FoodEntity>(&format!(
            "INSERT INTO foods (name, category_id, unit_id, image, group_id, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {FOOD_COLUMNS}"
        ))
        .bind(name)
        .bind(category_id)
        .bind(unit_id)
        .bind(image)
        .bind(group_id)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Look up a food by (name, group), creating it on demand.
    ///
    /// Dependent entities (fridge items, shopping tasks, meal plans) call
    /// this before inserting so a referenced food always exists. Rules:
    /// - a missing food is created with whatever category/unit references
    ///   the caller resolved (unresolved names arrive here as `None`);
    /// - an existing food with no category gets the supplied category
    ///   backfilled, one-directionally: an already-set category is never
    ///   overwritten, and the unit is never backfilled;
    /// - losing a creation race to a concurrent request falls back to the
    ///   winner's row.
    pub async fn find_or_create(
        &self,
        group_id: Uuid,
        name: &str,
        category_id: Option<Uuid>,
        unit_id: Option<Uuid>,
        created_by: Option<Uuid>,
    ) -> Result<FoodEntity, sqlx::Error> {
        if let Some(existing) = self.find_by_name(group_id, name).await? {
            return self.backfill_category(existing, category_id).await;
        }

        match self
            .create(name, category_id, unit_id, "", group_id, created_by)
            .await
        {
            Ok(food) => Ok(food),
            Err(err) if is_unique_violation(&err) => {
                let existing = self
                    .find_by_name(group_id, name)
                    .await?
                    .ok_or(sqlx::Error::RowNotFound)?;
                self.backfill_category(existing, category_id).await
            }
            Err(err) => Err(err),
        }
    }

    async fn backfill_category(
        &self,
        food: FoodEntity,
        category_id: Option<Uuid>,
    ) -> Result<FoodEntity, sqlx::Error> {
        let (None, Some(category_id)) = (food.category_id, category_id) else {
            return Ok(food);
        };

        let timer = QueryTimer::new("backfill_food_category");
        let result = sqlx::query_as::<_, FoodEntity>(&format!(
            "UPDATE foods SET category_id = $2, updated_at = NOW() \
             WHERE id = $1 AND category_id IS NULL \
             RETURNING {FOOD_COLUMNS}"
        ))
        .bind(food.id)
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        // A concurrent writer may have set the category first; keep theirs.
        match result? {
            Some(updated) => Ok(updated),
            None => Ok(food),
        }
    }

    /// Apply the supplied fields to a catalog entry.
    pub async fn update(
        &self,
        food_id: Uuid,
        name: Option<&str>,
        category_id: Option<Uuid>,
        unit_id: Option<Uuid>,
    ) -> Result<FoodEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_food");
        let result = sqlx::query_as::<_, FoodEntity>(&format!(
            "UPDATE foods SET \
                name = COALESCE($2, name), \
                category_id = COALESCE($3, category_id), \
                unit_id = COALESCE($4, unit_id), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {FOOD_COLUMNS}"
        ))
        .bind(food_id)
        .bind(name)
        .bind(category_id)
        .bind(unit_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a catalog entry.
    pub async fn delete(&self, food_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_food");
        let result = sqlx::query("DELETE FROM foods WHERE id = $1")
            .bind(food_id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    // FoodRepository methods require a live PostgreSQL instance; they are
    // exercised end to end through the route handlers.
}
