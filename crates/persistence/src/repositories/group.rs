//! Group repository for database operations.
//!
//! Membership is the `group_id` column on users, so every membership
//! mutation is a single conditional update or a short transaction; there is
//! no separate membership table to drift out of sync.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{GroupEntity, MemberWithUserEntity};
use crate::metrics::QueryTimer;

const GROUP_COLUMNS: &str = "id, name, admin_id, created_at, updated_at";

/// Repository for group-related database operations.
#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    /// Creates a new GroupRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create a group with the given user as admin and sole member.
    ///
    /// Returns `None` when the user already belongs to a group: the member
    /// attach is a conditional update guarded on `group_id IS NULL`, so a
    /// concurrent join cannot leave the user in two groups. The whole
    /// operation rolls back in that case.
    pub async fn create_group(
        &self,
        name: &str,
        admin_id: Uuid,
    ) -> Result<Option<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("create_group");
        let mut tx = self.pool.begin().await?;

        let group = sqlx::query_as::<_, GroupEntity>(&format!(
            "INSERT INTO groups (name, admin_id) VALUES ($1, $2) RETURNING {GROUP_COLUMNS}"
        ))
        .bind(name)
        .bind(admin_id)
        .fetch_one(&mut *tx)
        .await?;

        let attached = sqlx::query(
            "UPDATE users SET group_id = $1, updated_at = NOW() \
             WHERE id = $2 AND group_id IS NULL",
        )
        .bind(group.id)
        .bind(admin_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if attached == 0 {
            tx.rollback().await?;
            timer.record();
            return Ok(None);
        }

        tx.commit().await?;
        timer.record();
        Ok(Some(group))
    }

    /// Find a group by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_by_id");
        let result = sqlx::query_as::<_, GroupEntity>(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List the members of a group.
    pub async fn list_members(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<MemberWithUserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_group_members");
        let result = sqlx::query_as::<_, MemberWithUserEntity>(
            "SELECT id, name, email, username, avatar FROM users \
             WHERE group_id = $1 ORDER BY created_at ASC",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Attach a user to a group.
    ///
    /// Returns `false` when the user already belongs to some group; the
    /// guard makes concurrent adds of the same user race-safe.
    pub async fn add_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("add_group_member");
        let result = sqlx::query(
            "UPDATE users SET group_id = $1, updated_at = NOW() \
             WHERE id = $2 AND group_id IS NULL",
        )
        .bind(group_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Detach a user from the given group.
    ///
    /// Returns `false` when the user was not a member of that group.
    pub async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("remove_group_member");
        let result = sqlx::query(
            "UPDATE users SET group_id = NULL, updated_at = NOW() \
             WHERE id = $2 AND group_id = $1",
        )
        .bind(group_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Dissolve a group: clear every member's membership, then delete the
    /// group row, in one transaction.
    ///
    /// No reader can observe a deleted group still referenced by a member.
    /// The member-clear runs first so a retry after a partial failure is
    /// idempotent.
    pub async fn delete_group(&self, group_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_group");
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE users SET group_id = NULL, updated_at = NOW() WHERE group_id = $1")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(group_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        timer.record();
        Ok(deleted)
    }

    /// Total number of groups.
    pub async fn count_all(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_all_groups");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM groups")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    // GroupRepository methods require a live PostgreSQL instance; they are
    // exercised end to end through the route handlers.
}
