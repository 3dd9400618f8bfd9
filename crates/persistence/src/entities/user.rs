//! User entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::user::UserRole;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for user_role that maps to the PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRoleDb {
    User,
    Admin,
}

impl From<UserRoleDb> for UserRole {
    fn from(db_role: UserRoleDb) -> Self {
        match db_role {
            UserRoleDb::User => UserRole::User,
            UserRoleDb::Admin => UserRole::Admin,
        }
    }
}

impl From<UserRole> for UserRoleDb {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::User => UserRoleDb::User,
            UserRole::Admin => UserRoleDb::Admin,
        }
    }
}

/// Database row mapping for the users table, secrets included.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub username: Option<String>,
    pub avatar: String,
    pub role: UserRoleDb,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub language: String,
    pub timezone: String,
    pub is_verified: bool,
    pub verification_code: Option<String>,
    pub verification_expiry: Option<DateTime<Utc>>,
    pub refresh_token_hash: Option<String>,
    pub group_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for domain::models::User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            name: entity.name,
            username: entity.username,
            avatar: entity.avatar,
            role: entity.role.into(),
            gender: entity.gender.as_deref().and_then(|g| g.parse().ok()),
            date_of_birth: entity.date_of_birth,
            language: entity.language.parse().unwrap_or_default(),
            timezone: entity.timezone,
            is_verified: entity.is_verified,
            group_id: entity.group_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// User row without secrets, joined with the group name, for admin listings.
#[derive(Debug, Clone, FromRow)]
pub struct UserWithGroupEntity {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub username: Option<String>,
    pub avatar: String,
    pub role: UserRoleDb,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub language: String,
    pub is_verified: bool,
    pub group_id: Option<Uuid>,
    pub group_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::user::{Gender, Language};

    fn entity() -> UserEntity {
        UserEntity {
            id: Uuid::new_v4(),
            email: "lan@example.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            name: "Lan Nguyễn".to_string(),
            username: Some("lan".to_string()),
            avatar: String::new(),
            role: UserRoleDb::User,
            gender: Some("female".to_string()),
            date_of_birth: None,
            language: "vi".to_string(),
            timezone: "Asia/Ho_Chi_Minh".to_string(),
            is_verified: true,
            verification_code: None,
            verification_expiry: None,
            refresh_token_hash: None,
            group_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_entity_to_domain_drops_secrets() {
        let user: domain::models::User = entity().into();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("verification"));
        assert!(!json.contains("refresh"));
    }

    #[test]
    fn test_entity_to_domain_parses_enums() {
        let user: domain::models::User = entity().into();
        assert_eq!(user.gender, Some(Gender::Female));
        assert_eq!(user.language, Language::Vi);
    }
}
