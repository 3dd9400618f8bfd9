//! Repository for global reference data (categories and units).

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{CategoryEntity, UnitEntity};
use crate::metrics::QueryTimer;

const REF_COLUMNS: &str = "id, name, created_at, updated_at";

/// Repository for category and unit lookup tables.
///
/// Both tables are flat, name-keyed, and shared by every group; rows are
/// seeded externally and managed through the system-admin API.
#[derive(Clone)]
pub struct ReferenceRepository {
    pool: PgPool,
}

impl ReferenceRepository {
    /// Creates a new ReferenceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    /// List all categories sorted by name.
    pub async fn list_categories(&self) -> Result<Vec<CategoryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_categories");
        let result = sqlx::query_as::<_, CategoryEntity>(&format!(
            "SELECT {REF_COLUMNS} FROM categories ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a category by exact name.
    pub async fn find_category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<CategoryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_category_by_name");
        let result = sqlx::query_as::<_, CategoryEntity>(&format!(
            "SELECT {REF_COLUMNS} FROM categories WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Create a category.
    pub async fn create_category(&self, name: &str) -> Result<CategoryEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_category");
        let result = sqlx::query_as::<_, CategoryEntity>(&format!(
            "INSERT INTO categories (name) VALUES ($1) RETURNING {REF_COLUMNS}"
        ))
        .bind(name)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Rename a category.
    pub async fn rename_category(
        &self,
        category_id: Uuid,
        new_name: &str,
    ) -> Result<CategoryEntity, sqlx::Error> {
        let timer = QueryTimer::new("rename_category");
        let result = sqlx::query_as::<_, CategoryEntity>(&format!(
            "UPDATE categories SET name = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {REF_COLUMNS}"
        ))
        .bind(category_id)
        .bind(new_name)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a category. Foods referencing it fall back to no category.
    pub async fn delete_category(&self, category_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_category");
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Total number of categories.
    pub async fn count_categories(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_categories");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    // ------------------------------------------------------------------
    // Units
    // ------------------------------------------------------------------

    /// List all units sorted by name.
    pub async fn list_units(&self) -> Result<Vec<UnitEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_units");
        let result = sqlx::query_as::<_, UnitEntity>(&format!(
            "SELECT {REF_COLUMNS} FROM units ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a unit by exact name.
    pub async fn find_unit_by_name(&self, name: &str) -> Result<Option<UnitEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_unit_by_name");
        let result = sqlx::query_as::<_, UnitEntity>(&format!(
            "SELECT {REF_COLUMNS} FROM units WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Create a unit.
    pub async fn create_unit(&self, name: &str) -> Result<UnitEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_unit");
        let result = sqlx::query_as::<_, UnitEntity>(&format!(
            "INSERT INTO units (name) VALUES ($1) RETURNING {REF_COLUMNS}"
        ))
        .bind(name)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Rename a unit.
    pub async fn rename_unit(
        &self,
        unit_id: Uuid,
        new_name: &str,
    ) -> Result<UnitEntity, sqlx::Error> {
        let timer = QueryTimer::new("rename_unit");
        let result = sqlx::query_as::<_, UnitEntity>(&format!(
            "UPDATE units SET name = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {REF_COLUMNS}"
        ))
        .bind(unit_id)
        .bind(new_name)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a unit. Foods referencing it fall back to no unit.
    pub async fn delete_unit(&self, unit_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_unit");
        let result = sqlx::query("DELETE FROM units WHERE id = $1")
            .bind(unit_id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Total number of units.
    pub async fn count_units(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_units");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM units")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    // ReferenceRepository methods require a live PostgreSQL instance; they
    // are exercised end to end through the route handlers.
}
