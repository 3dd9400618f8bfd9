//! Fridge inventory repository.
//!
//! The (food, group) pair is unique at the index level; creating an entry
//! for a food already in the fridge becomes a quantity merge, including when
//! the duplicate only appears through a concurrent insert.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{FridgeItemEntity, FridgeItemWithFoodEntity, FridgeLocationDb};
use crate::metrics::QueryTimer;
use crate::repositories::is_unique_violation;

const FRIDGE_COLUMNS: &str = "id, food_id, group_id, quantity, use_within, expiry_date, note, \
     location, added_by, created_at, updated_at";

const FRIDGE_WITH_FOOD: &str = "SELECT i.id, i.food_id, f.name AS food_name, \
            c.name AS category_name, un.name AS unit_name, f.image AS food_image, \
            i.group_id, i.quantity, i.use_within, i.expiry_date, i.note, i.location, \
            i.added_by, i.created_at, i.updated_at \
     FROM fridge_items i \
     JOIN foods f ON i.food_id = f.id \
     LEFT JOIN categories c ON f.category_id = c.id \
     LEFT JOIN units un ON f.unit_id = un.id";

/// Repository for fridge item operations.
#[derive(Clone)]
pub struct FridgeRepository {
    pool: PgPool,
}

impl FridgeRepository {
    /// Creates a new FridgeRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a fridge item by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<FridgeItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_fridge_item_by_id");
        let result = sqlx::query_as::<_, FridgeItemEntity>(&format!(
            "SELECT {FRIDGE_COLUMNS} FROM fridge_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find the fridge entry for a food in a group, if any.
    pub async fn find_by_food(
        &self,
        group_id: Uuid,
        food_id: Uuid,
    ) -> Result<Option<FridgeItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_fridge_item_by_food");
        let result = sqlx::query_as::<_, FridgeItemEntity>(&format!(
            "SELECT {FRIDGE_COLUMNS} FROM fridge_items WHERE group_id = $1 AND food_id = $2"
        ))
        .bind(group_id)
        .bind(food_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a fridge item with its food details joined.
    pub async fn find_with_food(
        &self,
        id: Uuid,
    ) -> Result<Option<FridgeItemWithFoodEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_fridge_item_with_food");
        let result = sqlx::query_as::<_, FridgeItemWithFoodEntity>(&format!(
            "{FRIDGE_WITH_FOOD} WHERE i.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List a group's fridge contents, soonest expiry first.
    pub async fn list_by_group(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<FridgeItemWithFoodEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_fridge_items_by_group");
        let result = sqlx::query_as::<_, FridgeItemWithFoodEntity>(&format!(
            "{FRIDGE_WITH_FOOD} WHERE i.group_id = $1 ORDER BY i.expiry_date ASC"
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Insert a fridge entry or merge into the existing one for the same
    /// (food, group) pair.
    ///
    /// The merge adds `quantity` to the stored amount and refreshes the
    /// expiry only when `use_within` was supplied with this call. When the
    /// insert loses a race to a concurrent create, the unique index rejects
    /// it and the call falls through to the merge path against the winner's
    /// row. Returns the stored entity and whether a merge happened.
    #[allow(clippy::too_many_arguments)]
    pub async fn upsert(
        &self,
        group_id: Uuid,
        food_id: Uuid,
        quantity: f64,
        use_within: Option<i32>,
        expiry_date: Option<DateTime<Utc>>,
        note: &str,
        location: FridgeLocationDb,
        added_by: Option<Uuid>,
    ) -> Result<(FridgeItemEntity, bool), sqlx::Error> {
        if let Some(existing) = self.find_by_food(group_id, food_id).await? {
            let merged = self
                .merge_quantity(existing.id, quantity, use_within.zip(expiry_date))
                .await?;
            return Ok((merged, true));
        }

        let timer = QueryTimer::new("create_fridge_item");
        let inserted = sqlx::query_as::<_, FridgeItemEntity>(&format!(
            "INSERT INTO fridge_items \
                (food_id, group_id, quantity, use_within, expiry_date, note, location, added_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {FRIDGE_COLUMNS}"
        ))
        .bind(food_id)
        .bind(group_id)
        .bind(quantity)
        .bind(use_within)
        .bind(expiry_date)
        .bind(note)
        .bind(location)
        .bind(added_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();

        match inserted {
            Ok(item) => Ok((item, false)),
            Err(err) if is_unique_violation(&err) => {
                let existing = self
                    .find_by_food(group_id, food_id)
                    .await?
                    .ok_or(sqlx::Error::RowNotFound)?;
                let merged = self
                    .merge_quantity(existing.id, quantity, use_within.zip(expiry_date))
                    .await?;
                Ok((merged, true))
            }
            Err(err) => Err(err),
        }
    }

    async fn merge_quantity(
        &self,
        item_id: Uuid,
        quantity: f64,
        refresh_expiry: Option<(i32, DateTime<Utc>)>,
    ) -> Result<FridgeItemEntity, sqlx::Error> {
        let timer = QueryTimer::new("merge_fridge_item_quantity");
        let (use_within, expiry_date) = refresh_expiry.unzip();
        let result = sqlx::query_as::<_, FridgeItemEntity>(&format!(
            "UPDATE fridge_items SET \
                quantity = quantity + $2, \
                use_within = COALESCE($3, use_within), \
                expiry_date = CASE WHEN $3::int IS NULL THEN expiry_date ELSE $4 END, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {FRIDGE_COLUMNS}"
        ))
        .bind(item_id)
        .bind(quantity)
        .bind(use_within)
        .bind(expiry_date)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Apply the supplied fields to a fridge item.
    ///
    /// A new use-within always arrives with its freshly computed expiry; the
    /// pair is written together or not at all.
    pub async fn update_fields(
        &self,
        item_id: Uuid,
        quantity: Option<f64>,
        note: Option<&str>,
        use_within_expiry: Option<(i32, DateTime<Utc>)>,
        location: Option<FridgeLocationDb>,
    ) -> Result<FridgeItemEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_fridge_item");
        let (use_within, expiry_date) = use_within_expiry.unzip();
        let result = sqlx::query_as::<_, FridgeItemEntity>(&format!(
            "UPDATE fridge_items SET \
                quantity = COALESCE($2, quantity), \
                note = COALESCE($3, note), \
                use_within = COALESCE($4, use_within), \
                expiry_date = CASE WHEN $4::int IS NULL THEN expiry_date ELSE $5 END, \
                location = COALESCE($6, location), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {FRIDGE_COLUMNS}"
        ))
        .bind(item_id)
        .bind(quantity)
        .bind(note)
        .bind(use_within)
        .bind(expiry_date)
        .bind(location)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a fridge item.
    pub async fn delete(&self, item_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_fridge_item");
        let result = sqlx::query("DELETE FROM fridge_items WHERE id = $1")
            .bind(item_id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    // FridgeRepository methods require a live PostgreSQL instance; they are
    // exercised end to end through the route handlers.
}
