//! User repository for database operations.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::entities::{UserEntity, UserRoleDb, UserWithGroupEntity};
use crate::metrics::QueryTimer;

const USER_COLUMNS: &str = "id, email, password_hash, name, username, avatar, role, gender, \
     date_of_birth, language, timezone, is_verified, verification_code, verification_expiry, \
     refresh_token_hash, group_id, created_at, updated_at";

/// Filters for the admin user listing.
#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    /// Case-insensitive substring match against name, email, and username.
    pub search: Option<String>,
    pub role: Option<UserRoleDb>,
    pub limit: i64,
    pub offset: i64,
}

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user by case-folded email address.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user by exact username or case-folded email, resolved in one
    /// disjunction query.
    pub async fn find_by_username_or_email(
        &self,
        key: &str,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_username_or_email");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = LOWER($1)"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Check whether another user already claimed this username.
    pub async fn username_taken(
        &self,
        username: &str,
        exclude_user: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("check_username_taken");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND id <> $2)",
        )
        .bind(username)
        .bind(exclude_user)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Create a new user account with a pending verification code.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
        language: &str,
        timezone: &str,
        verification_code: &str,
        verification_expiry: DateTime<Utc>,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "INSERT INTO users (email, password_hash, name, language, timezone, \
                                verification_code, verification_expiry) \
             VALUES (LOWER($1), $2, $3, $4, $5, $6, $7) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(language)
        .bind(timezone)
        .bind(verification_code)
        .bind(verification_expiry)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Store a fresh verification code and expiry for the account.
    pub async fn set_verification_code(
        &self,
        user_id: Uuid,
        code: &str,
        expiry: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("set_verification_code");
        sqlx::query(
            "UPDATE users SET verification_code = $2, verification_expiry = $3, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(code)
        .bind(expiry)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(())
    }

    /// Find the user holding a verification code that has not expired yet.
    pub async fn find_by_active_verification_code(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_verification_code");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE verification_code = $1 AND verification_expiry > $2"
        ))
        .bind(code)
        .bind(now)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Mark the account verified and clear the code/expiry pair.
    pub async fn mark_verified(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("mark_user_verified");
        sqlx::query(
            "UPDATE users SET is_verified = TRUE, verification_code = NULL, \
             verification_expiry = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(())
    }

    /// Store (or clear, with `None`) the digest of the user's refresh token.
    pub async fn set_refresh_token_hash(
        &self,
        user_id: Uuid,
        token_hash: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("set_refresh_token_hash");
        sqlx::query("UPDATE users SET refresh_token_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(())
    }

    /// Replace the stored password hash.
    pub async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("update_user_password");
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(())
    }

    /// Apply the supplied profile fields, leaving the rest untouched.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        name: Option<&str>,
        username: Option<&str>,
        gender: Option<&str>,
        date_of_birth: Option<NaiveDate>,
        language: Option<&str>,
        avatar: Option<&str>,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_user_profile");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                username = COALESCE($3, username), \
                gender = COALESCE($4, gender), \
                date_of_birth = COALESCE($5, date_of_birth), \
                language = COALESCE($6, language), \
                avatar = COALESCE($7, avatar), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(name)
        .bind(username)
        .bind(gender)
        .bind(date_of_birth)
        .bind(language)
        .bind(avatar)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Change the system role of an account.
    pub async fn update_role(
        &self,
        user_id: Uuid,
        role: UserRoleDb,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_user_role");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete an account, detaching it from its group first.
    ///
    /// If the account administers its group the whole group is dissolved
    /// (every member's membership cleared, then the group row removed) before
    /// the user row goes away, so no group is ever left pointing at a deleted
    /// admin. The group cascade runs before the user delete inside one
    /// transaction; re-running the sequence is idempotent.
    pub async fn delete_account(&self, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_user_account");
        let mut tx = self.pool.begin().await?;

        let group_id: Option<Uuid> =
            sqlx::query_scalar("SELECT group_id FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?
                .flatten();

        if let Some(group_id) = group_id {
            let is_group_admin: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM groups WHERE id = $1 AND admin_id = $2)",
            )
            .bind(group_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

            if is_group_admin {
                sqlx::query("UPDATE users SET group_id = NULL, updated_at = NOW() WHERE group_id = $1")
                    .bind(group_id)
                    .execute(&mut *tx)
                    .await?;
                sqlx::query("DELETE FROM groups WHERE id = $1")
                    .bind(group_id)
                    .execute(&mut *tx)
                    .await?;
            } else {
                sqlx::query("UPDATE users SET group_id = NULL, updated_at = NOW() WHERE id = $1")
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        timer.record();
        Ok(deleted > 0)
    }

    /// List users for the admin console, with optional search and role
    /// filters.
    pub async fn list_users(
        &self,
        query: &UserListQuery,
    ) -> Result<Vec<UserWithGroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_users");

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT u.id, u.email, u.name, u.username, u.avatar, u.role, u.gender, \
                    u.date_of_birth, u.language, u.is_verified, u.group_id, \
                    g.name AS group_name, u.created_at, u.updated_at \
             FROM users u LEFT JOIN groups g ON u.group_id = g.id WHERE TRUE",
        );
        Self::push_user_filters(&mut builder, query);
        builder.push(" ORDER BY u.created_at DESC LIMIT ");
        builder.push_bind(query.limit);
        builder.push(" OFFSET ");
        builder.push_bind(query.offset);

        let result = builder
            .build_query_as::<UserWithGroupEntity>()
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Count users matching the admin listing filters.
    pub async fn count_users(&self, query: &UserListQuery) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_users");

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM users u WHERE TRUE");
        Self::push_user_filters(&mut builder, query);

        let result = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    fn push_user_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &UserListQuery) {
        if let Some(search) = &query.search {
            let pattern = format!("%{}%", search);
            builder.push(" AND (u.name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR u.email ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR u.username ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
        if let Some(role) = query.role {
            builder.push(" AND u.role = ");
            builder.push_bind(role);
        }
    }

    /// Total number of accounts.
    pub async fn count_all(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_all_users");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Number of accounts with the system-administrator role.
    pub async fn count_admins(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_admin_users");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = 'admin'")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Number of accounts that completed email verification.
    pub async fn count_verified(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_verified_users");
        let result =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_verified = TRUE")
                .fetch_one(&self.pool)
                .await;
        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    // UserRepository methods require a live PostgreSQL instance; they are
    // exercised end to end through the route handlers.
}
