//! Shopping list and task repository.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ShoppingListEntity, ShoppingTaskEntity, ShoppingTaskWithFoodEntity};
use crate::metrics::QueryTimer;
use crate::repositories::is_unique_violation;

const LIST_COLUMNS: &str = "id, group_id, name, date, created_by, created_at, updated_at";

const TASK_COLUMNS: &str = "id, shopping_list_id, food_id, quantity, assigned_to, is_completed, \
     completed_at, created_at, updated_at";

const TASK_WITH_FOOD: &str = "SELECT t.id, t.shopping_list_id, t.food_id, f.name AS food_name, \
            c.name AS category_name, un.name AS unit_name, f.image AS food_image, t.quantity, \
            t.assigned_to, a.name AS assigned_to_name, a.username AS assigned_to_username, \
            t.is_completed, t.completed_at, t.created_at, t.updated_at \
     FROM shopping_tasks t \
     JOIN foods f ON t.food_id = f.id \
     LEFT JOIN categories c ON f.category_id = c.id \
     LEFT JOIN units un ON f.unit_id = un.id \
     LEFT JOIN users a ON t.assigned_to = a.id";

/// Repository for shopping list and task operations.
#[derive(Clone)]
pub struct ShoppingRepository {
    pool: PgPool,
}

impl ShoppingRepository {
    /// Creates a new ShoppingRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the group's list for a day, creating it when absent.
    ///
    /// One list exists per (group, date); the unique index turns a creation
    /// race into a re-read of the winner's row. Returns the list and whether
    /// this call created it.
    pub async fn get_or_create_list(
        &self,
        group_id: Uuid,
        name: Option<&str>,
        date: NaiveDate,
        created_by: Uuid,
    ) -> Result<(ShoppingListEntity, bool), sqlx::Error> {
        if let Some(existing) = self.find_list_by_date(group_id, date).await? {
            return Ok((existing, false));
        }

        let timer = QueryTimer::new("create_shopping_list");
        let inserted = sqlx::query_as::<_, ShoppingListEntity>(&format!(
            "INSERT INTO shopping_lists (group_id, name, date, created_by) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {LIST_COLUMNS}"
        ))
        .bind(group_id)
        .bind(name)
        .bind(date)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();

        match inserted {
            Ok(list) => Ok((list, true)),
            Err(err) if is_unique_violation(&err) => {
                let existing = self
                    .find_list_by_date(group_id, date)
                    .await?
                    .ok_or(sqlx::Error::RowNotFound)?;
                Ok((existing, false))
            }
            Err(err) => Err(err),
        }
    }

    /// Find the group's list for a specific day.
    pub async fn find_list_by_date(
        &self,
        group_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<ShoppingListEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_shopping_list_by_date");
        let result = sqlx::query_as::<_, ShoppingListEntity>(&format!(
            "SELECT {LIST_COLUMNS} FROM shopping_lists WHERE group_id = $1 AND date = $2"
        ))
        .bind(group_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a shopping list by ID.
    pub async fn find_list_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ShoppingListEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_shopping_list_by_id");
        let result = sqlx::query_as::<_, ShoppingListEntity>(&format!(
            "SELECT {LIST_COLUMNS} FROM shopping_lists WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List the group's most recent shopping lists.
    pub async fn list_lists(
        &self,
        group_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ShoppingListEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_shopping_lists");
        let result = sqlx::query_as::<_, ShoppingListEntity>(&format!(
            "SELECT {LIST_COLUMNS} FROM shopping_lists \
             WHERE group_id = $1 ORDER BY date DESC LIMIT $2"
        ))
        .bind(group_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a list and every task on it, in one transaction.
    pub async fn delete_list_cascade(&self, list_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_shopping_list");
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM shopping_tasks WHERE shopping_list_id = $1")
            .bind(list_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM shopping_lists WHERE id = $1")
            .bind(list_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        timer.record();
        Ok(deleted)
    }

    /// Check for another task for this food on the list.
    pub async fn task_exists_for_food(
        &self,
        list_id: Uuid,
        food_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("check_task_exists_for_food");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM shopping_tasks \
             WHERE shopping_list_id = $1 AND food_id = $2 \
               AND ($3::uuid IS NULL OR id <> $3))",
        )
        .bind(list_id)
        .bind(food_id)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Create a task on a list.
    pub async fn create_task(
        &self,
        list_id: Uuid,
        food_id: Uuid,
        quantity: f64,
        assigned_to: Option<Uuid>,
    ) -> Result<ShoppingTaskEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_shopping_task");
        let result = sqlx::query_as::<_, ShoppingTaskEntity>(&format!(
            "INSERT INTO shopping_tasks (shopping_list_id, food_id, quantity, assigned_to) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(list_id)
        .bind(food_id)
        .bind(quantity)
        .bind(assigned_to)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a task by ID.
    pub async fn find_task_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ShoppingTaskEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_shopping_task_by_id");
        let result = sqlx::query_as::<_, ShoppingTaskEntity>(&format!(
            "SELECT {TASK_COLUMNS} FROM shopping_tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a task with food and assignee details joined.
    pub async fn find_task_with_food(
        &self,
        id: Uuid,
    ) -> Result<Option<ShoppingTaskWithFoodEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_shopping_task_with_food");
        let result = sqlx::query_as::<_, ShoppingTaskWithFoodEntity>(&format!(
            "{TASK_WITH_FOOD} WHERE t.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List the tasks on a shopping list.
    pub async fn list_tasks(
        &self,
        list_id: Uuid,
    ) -> Result<Vec<ShoppingTaskWithFoodEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_shopping_tasks");
        let result = sqlx::query_as::<_, ShoppingTaskWithFoodEntity>(&format!(
            "{TASK_WITH_FOOD} WHERE t.shopping_list_id = $1 ORDER BY t.created_at ASC"
        ))
        .bind(list_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Apply the supplied fields to a task.
    ///
    /// The completion flag and its timestamp travel as one pair so
    /// `completed_at` can never disagree with `is_completed`.
    pub async fn update_task(
        &self,
        task_id: Uuid,
        food_id: Option<Uuid>,
        quantity: Option<f64>,
        completion: Option<(bool, Option<DateTime<Utc>>)>,
    ) -> Result<ShoppingTaskEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_shopping_task");
        let (is_completed, completed_at) = match completion {
            Some((flag, at)) => (Some(flag), at),
            None => (None, None),
        };
        let result = sqlx::query_as::<_, ShoppingTaskEntity>(&format!(
            "UPDATE shopping_tasks SET \
                food_id = COALESCE($2, food_id), \
                quantity = COALESCE($3, quantity), \
                is_completed = COALESCE($4, is_completed), \
                completed_at = CASE WHEN $4::boolean IS NULL THEN completed_at ELSE $5 END, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(task_id)
        .bind(food_id)
        .bind(quantity)
        .bind(is_completed)
        .bind(completed_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a task.
    pub async fn delete_task(&self, task_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_shopping_task");
        let result = sqlx::query("DELETE FROM shopping_tasks WHERE id = $1")
            .bind(task_id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    // ShoppingRepository methods require a live PostgreSQL instance; they
    // are exercised end to end through the route handlers.
}
