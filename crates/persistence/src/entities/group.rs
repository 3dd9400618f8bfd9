//! Group entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the groups table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupEntity {
    pub id: Uuid,
    pub name: String,
    pub admin_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupEntity> for domain::models::Group {
    fn from(entity: GroupEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            admin_id: entity.admin_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Member row with user info for listing a group's members.
#[derive(Debug, Clone, FromRow)]
pub struct MemberWithUserEntity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: Option<String>,
    pub avatar: String,
}
