//! Household group domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default display name for a newly created group.
pub const DEFAULT_GROUP_NAME: &str = "Nhóm gia đình";

/// A family unit sharing one fridge, food catalog, shopping lists, and meal
/// plans.
///
/// Membership is carried on the user side (`User::group_id`); a group's
/// member set is the set of users pointing at it. Invariants: a persisted
/// group always has at least one member, and its admin is always a member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "admin")]
    pub admin_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// True when the given user administers this group.
    pub fn is_admin(&self, user_id: Uuid) -> bool {
        self.admin_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_admin() {
        let admin_id = Uuid::new_v4();
        let group = Group {
            id: Uuid::new_v4(),
            name: DEFAULT_GROUP_NAME.to_string(),
            admin_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(group.is_admin(admin_id));
        assert!(!group.is_admin(Uuid::new_v4()));
    }
}
