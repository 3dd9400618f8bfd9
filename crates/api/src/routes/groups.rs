//! Household group routes: lifecycle and membership management.

use axum::{extract::State, response::Response, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{CurrentGroup, CurrentUser};
use crate::response;
use domain::models::group::DEFAULT_GROUP_NAME;
use persistence::entities::MemberWithUserEntity;
use persistence::repositories::{GroupRepository, UserRepository};

/// Member block in group responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: Option<String>,
    pub avatar: String,
}

impl From<MemberWithUserEntity> for MemberResponse {
    fn from(entity: MemberWithUserEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            username: entity.username,
            avatar: entity.avatar,
        }
    }
}

/// Request body for group creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateGroupRequest {
    pub name: Option<String>,
}

/// Create a group with the caller as admin and sole member.
///
/// POST /api/user/group
pub async fn create_group(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    body: Option<Json<CreateGroupRequest>>,
) -> Result<Response, ApiError> {
    if user.group_id.is_some() {
        return Err(ApiError::duplicate(
            "00093",
            "Không thể tạo nhóm, bạn đã thuộc về một nhóm rồi.",
        ));
    }

    let request = body.map(|Json(request)| request).unwrap_or_default();
    let name = request
        .name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(DEFAULT_GROUP_NAME);

    let groups = GroupRepository::new(state.pool.clone());
    let group = groups
        .create_group(name, user.id)
        .await?
        .ok_or(ApiError::Duplicate {
            code: "00093",
            message: "Không thể tạo nhóm, bạn đã thuộc về một nhóm rồi.",
        })?;

    Ok(response::created(
        "00095",
        "Tạo nhóm thành công.",
        json!({
            "id": group.id,
            "name": group.name,
            "admin": user.id,
            "members": [user.id],
        }),
    ))
}

/// Get the caller's group with its members.
///
/// GET /api/user/group
pub async fn get_group_members(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let Some(group_id) = user.group_id else {
        return Err(ApiError::no_group("00096", "Bạn không thuộc về nhóm nào."));
    };

    let groups = GroupRepository::new(state.pool.clone());
    let group = groups
        .find_by_id(group_id)
        .await?
        .ok_or(ApiError::NoGroup {
            code: "00096",
            message: "Bạn không thuộc về nhóm nào.",
        })?;

    let members: Vec<MemberResponse> = groups
        .list_members(group_id)
        .await?
        .into_iter()
        .map(MemberResponse::from)
        .collect();
    let admin = members.iter().find(|m| m.id == group.admin_id).cloned();

    Ok(response::ok(
        "00098",
        "Thành công.",
        json!({
            "id": group.id,
            "name": group.name,
            "admin": admin,
            "members": members,
        }),
    ))
}

/// Request body naming a member by username or email.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberRequest {
    pub username: Option<String>,
}

/// Add a member to the caller's group.
///
/// POST /api/user/group/add (group admin)
pub async fn add_member(
    State(state): State<AppState>,
    Extension(CurrentGroup(group)): Extension<CurrentGroup>,
    Json(request): Json<MemberRequest>,
) -> Result<Response, ApiError> {
    let Some(username) = &request.username else {
        return Err(ApiError::validation(
            "00100",
            "Thiếu username hoặc email.",
        ));
    };

    let users = UserRepository::new(state.pool.clone());
    let target = users
        .find_by_username_or_email(username)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00099x",
            message: "Không tìm thấy người dùng với username/email này.",
        })?;

    if target.group_id.is_some() {
        return Err(ApiError::duplicate(
            "00099",
            "Người này đã thuộc về một nhóm.",
        ));
    }

    let groups = GroupRepository::new(state.pool.clone());
    if !groups.add_member(group.id, target.id).await? {
        // A concurrent join slipped in between the check and the update
        return Err(ApiError::duplicate(
            "00099",
            "Người này đã thuộc về một nhóm.",
        ));
    }

    Ok(response::ok_empty(
        "00102",
        "Người dùng thêm vào nhóm thành công.",
    ))
}

/// Remove a member from the caller's group.
///
/// DELETE /api/user/group (group admin)
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(CurrentGroup(group)): Extension<CurrentGroup>,
    Json(request): Json<MemberRequest>,
) -> Result<Response, ApiError> {
    let Some(username) = &request.username else {
        return Err(ApiError::validation(
            "00107",
            "Thiếu username hoặc email.",
        ));
    };

    let users = UserRepository::new(state.pool.clone());
    let target = users
        .find_by_username_or_email(username)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00099x",
            message: "Không tìm thấy người dùng với username/email này.",
        })?;

    if target.group_id != Some(group.id) {
        return Err(ApiError::validation(
            "00103",
            "Người này chưa vào nhóm nào.",
        ));
    }

    if target.id == group.admin_id {
        return Err(ApiError::validation(
            "00104",
            "Không thể xóa admin khỏi nhóm.",
        ));
    }

    let groups = GroupRepository::new(state.pool.clone());
    groups.remove_member(group.id, target.id).await?;

    Ok(response::ok_empty("00106", "Xóa thành công."))
}

/// Leave the caller's group.
///
/// POST /api/user/group/leave
///
/// The admin cannot leave; dissolving the group is their only exit.
pub async fn leave_group(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let Some(group_id) = user.group_id else {
        return Err(ApiError::no_group("00096", "Bạn không thuộc về nhóm nào."));
    };

    let groups = GroupRepository::new(state.pool.clone());
    let group = groups
        .find_by_id(group_id)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00110",
            message: "Không tìm thấy nhóm.",
        })?;

    if group.admin_id == user.id {
        return Err(ApiError::validation(
            "00111",
            "Admin không thể rời nhóm. Hãy xóa nhóm.",
        ));
    }

    groups.remove_member(group_id, user.id).await?;

    Ok(response::ok_empty("00112", "Bạn đã rời khỏi nhóm."))
}

/// Dissolve the caller's group.
///
/// DELETE /api/user/group/delete (group admin)
///
/// Every member's membership is cleared before the group row is removed, in
/// one transaction.
pub async fn delete_group(
    State(state): State<AppState>,
    Extension(CurrentGroup(group)): Extension<CurrentGroup>,
) -> Result<Response, ApiError> {
    let groups = GroupRepository::new(state.pool.clone());
    groups.delete_group(group.id).await?;

    Ok(response::ok_empty("00116", "Đã xóa nhóm thành công."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_response_from_entity() {
        let entity = MemberWithUserEntity {
            id: Uuid::new_v4(),
            name: "Lan".to_string(),
            email: "lan@example.com".to_string(),
            username: None,
            avatar: String::new(),
        };
        let response = MemberResponse::from(entity.clone());
        assert_eq!(response.id, entity.id);
        assert_eq!(response.name, "Lan");
    }

    #[test]
    fn test_create_group_request_default_has_no_name() {
        let request = CreateGroupRequest::default();
        assert!(request.name.is_none());
    }
}
