//! System-admin routes: reference data, user management, and stats.

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::response;
use domain::models::UserRole;
use persistence::entities::UserWithGroupEntity;
use persistence::repositories::{
    GroupRepository, ReferenceRepository, UserListQuery, UserRepository,
};
use shared::pagination::{PageMeta, PageParams};

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// List all categories.
///
/// GET /api/admin/category
pub async fn get_categories(State(state): State<AppState>) -> Result<Response, ApiError> {
    let references = ReferenceRepository::new(state.pool.clone());
    let categories: Vec<domain::models::Category> = references
        .list_categories()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(response::ok(
        "00129",
        "Lấy các category thành công.",
        categories,
    ))
}

/// Request body for category creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
}

/// Create a category.
///
/// POST /api/admin/category (system admin)
pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<Response, ApiError> {
    let Some(name) = request.name.as_deref() else {
        return Err(ApiError::validation(
            "00131",
            "Thiếu thông tin tên của category.",
        ));
    };

    let references = ReferenceRepository::new(state.pool.clone());
    if references.find_category_by_name(name).await?.is_some() {
        return Err(ApiError::duplicate(
            "00132",
            "Đã tồn tại category có tên này.",
        ));
    }

    let category: domain::models::Category = references.create_category(name).await?.into();

    Ok(response::created(
        "00135",
        "Tạo category thành công.",
        category,
    ))
}

/// Request body for renames addressed by name.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub old_name: Option<String>,
    pub new_name: Option<String>,
}

/// Rename a category.
///
/// PUT /api/admin/category (system admin)
pub async fn edit_category(
    State(state): State<AppState>,
    Json(request): Json<RenameRequest>,
) -> Result<Response, ApiError> {
    let (Some(old_name), Some(new_name)) =
        (request.old_name.as_deref(), request.new_name.as_deref())
    else {
        return Err(ApiError::validation(
            "00136",
            "Thiếu thông tin name cũ, name mới.",
        ));
    };

    if old_name == new_name {
        return Err(ApiError::validation("00137", "Tên cũ trùng với tên mới."));
    }

    let references = ReferenceRepository::new(state.pool.clone());
    let category = references
        .find_category_by_name(old_name)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00138",
            message: "Không tìm thấy category với tên cung cấp.",
        })?;

    if references.find_category_by_name(new_name).await?.is_some() {
        return Err(ApiError::duplicate("00138x", "Tên mới đã tồn tại."));
    }

    let renamed: domain::models::Category =
        references.rename_category(category.id, new_name).await?.into();

    Ok(response::ok(
        "00141",
        "Sửa đổi category thành công.",
        renamed,
    ))
}

/// Request body for category deletion.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteCategoryRequest {
    pub name: Option<String>,
}

/// Delete a category.
///
/// DELETE /api/admin/category (system admin)
pub async fn delete_category(
    State(state): State<AppState>,
    Json(request): Json<DeleteCategoryRequest>,
) -> Result<Response, ApiError> {
    let Some(name) = request.name.as_deref() else {
        return Err(ApiError::validation(
            "00142",
            "Thiếu thông tin tên của category.",
        ));
    };

    let references = ReferenceRepository::new(state.pool.clone());
    let category = references
        .find_category_by_name(name)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00143",
            message: "Không tìm thấy category với tên cung cấp.",
        })?;

    references.delete_category(category.id).await?;

    Ok(response::ok_empty("00146", "Xóa category thành công."))
}

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// List all units.
///
/// GET /api/admin/unit
pub async fn get_units(State(state): State<AppState>) -> Result<Response, ApiError> {
    let references = ReferenceRepository::new(state.pool.clone());
    let units: Vec<domain::models::Unit> = references
        .list_units()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(response::ok("00110", "Lấy các unit thành công.", units))
}

/// Request body for unit creation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUnitRequest {
    pub unit_name: Option<String>,
}

/// Create a unit.
///
/// POST /api/admin/unit (system admin)
pub async fn create_unit(
    State(state): State<AppState>,
    Json(request): Json<CreateUnitRequest>,
) -> Result<Response, ApiError> {
    let Some(name) = request.unit_name.as_deref() else {
        return Err(ApiError::validation(
            "00112",
            "Thiếu thông tin tên của đơn vị.",
        ));
    };

    let references = ReferenceRepository::new(state.pool.clone());
    if references.find_unit_by_name(name).await?.is_some() {
        return Err(ApiError::duplicate(
            "00113",
            "Đã tồn tại đơn vị có tên này.",
        ));
    }

    let unit: domain::models::Unit = references.create_unit(name).await?.into();

    Ok(response::created("00116", "Tạo đơn vị thành công.", unit))
}

/// Rename a unit.
///
/// PUT /api/admin/unit (system admin)
pub async fn edit_unit(
    State(state): State<AppState>,
    Json(request): Json<RenameRequest>,
) -> Result<Response, ApiError> {
    let (Some(old_name), Some(new_name)) =
        (request.old_name.as_deref(), request.new_name.as_deref())
    else {
        return Err(ApiError::validation(
            "00117",
            "Thiếu thông tin name cũ, name mới.",
        ));
    };

    if old_name == new_name {
        return Err(ApiError::validation("00118", "Tên cũ trùng với tên mới."));
    }

    let references = ReferenceRepository::new(state.pool.clone());
    let unit = references
        .find_unit_by_name(old_name)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00119",
            message: "Không tìm thấy đơn vị với tên cung cấp.",
        })?;

    let renamed: domain::models::Unit = references.rename_unit(unit.id, new_name).await?.into();

    Ok(response::ok("00122", "Sửa đổi đơn vị thành công.", renamed))
}

/// Request body for unit deletion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUnitRequest {
    pub unit_name: Option<String>,
}

/// Delete a unit.
///
/// DELETE /api/admin/unit (system admin)
pub async fn delete_unit(
    State(state): State<AppState>,
    Json(request): Json<DeleteUnitRequest>,
) -> Result<Response, ApiError> {
    let Some(name) = request.unit_name.as_deref() else {
        return Err(ApiError::validation(
            "00123",
            "Thiếu thông tin tên của đơn vị.",
        ));
    };

    let references = ReferenceRepository::new(state.pool.clone());
    let unit = references
        .find_unit_by_name(name)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00125",
            message: "Không tìm thấy đơn vị với tên cung cấp.",
        })?;

    references.delete_unit(unit.id).await?;

    Ok(response::ok_empty("00128", "Xóa đơn vị thành công."))
}

// ---------------------------------------------------------------------------
// Logs
// ---------------------------------------------------------------------------

/// Get system logs.
///
/// GET /api/admin/logs (system admin)
///
/// Log aggregation lives outside this service; the endpoint keeps the
/// mobile admin screen functional with an empty collection.
pub async fn get_logs() -> Response {
    response::ok("00109", "Lấy log hệ thống thành công.", json!([]))
}

// ---------------------------------------------------------------------------
// User management
// ---------------------------------------------------------------------------

/// Query parameters for the user listing.
///
/// Page fields stay unflattened: query-string deserialization cannot see
/// through `#[serde(flatten)]` into numeric fields.
#[derive(Debug, Clone, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub role: Option<String>,
}

impl ListUsersQuery {
    fn page_params(&self) -> PageParams {
        let defaults = PageParams::default();
        PageParams {
            page: self.page.unwrap_or(defaults.page),
            limit: self.limit.unwrap_or(defaults.limit),
        }
    }
}

/// Admin view of a user row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub username: Option<String>,
    pub avatar: String,
    pub role: UserRole,
    pub is_verified: bool,
    pub group: Option<serde_json::Value>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserWithGroupEntity> for AdminUserResponse {
    fn from(entity: UserWithGroupEntity) -> Self {
        let group = entity.group_id.map(|id| {
            json!({
                "id": id,
                "name": entity.group_name,
            })
        });
        Self {
            id: entity.id,
            email: entity.email,
            name: entity.name,
            username: entity.username,
            avatar: entity.avatar,
            role: entity.role.into(),
            is_verified: entity.is_verified,
            group,
            created_at: entity.created_at,
        }
    }
}

/// List users with optional search and role filters.
///
/// GET /api/admin/users (system admin)
pub async fn get_all_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Response, ApiError> {
    let role = match query.role.as_deref() {
        Some(raw) => Some(
            raw.parse::<UserRole>()
                .map_err(|_| {
                    ApiError::validation(
                        "00025",
                        "Vui lòng cung cấp role hợp lệ (user hoặc admin).",
                    )
                })?
                .into(),
        ),
        None => None,
    };

    let page = query.page_params();
    let users = UserRepository::new(state.pool.clone());
    let list_query = UserListQuery {
        search: query.search.clone(),
        role,
        limit: page.limit(),
        offset: page.offset(),
    };

    let rows = users.list_users(&list_query).await?;
    let total = users.count_users(&list_query).await?;

    let list: Vec<AdminUserResponse> = rows.into_iter().map(Into::into).collect();

    Ok(response::ok(
        "00098",
        "Lấy danh sách người dùng thành công.",
        json!({
            "users": list,
            "pagination": PageMeta::new(&page, total),
        }),
    ))
}

/// Get one user by ID.
///
/// GET /api/admin/users/:id (system admin)
pub async fn get_user_by_id(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let users = UserRepository::new(state.pool.clone());
    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00052",
            message: "Không thể tìm thấy người dùng.",
        })?;
    let user: domain::models::User = user.into();

    Ok(response::ok(
        "00089",
        "Thông tin người dùng đã được lấy thành công.",
        user,
    ))
}

/// Request body for role changes.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Option<String>,
}

/// Change a user's system role.
///
/// PUT /api/admin/users/:id/role (system admin)
pub async fn update_user_role(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Response, ApiError> {
    let role = request
        .role
        .as_deref()
        .and_then(|raw| raw.parse::<UserRole>().ok())
        .ok_or(ApiError::Validation {
            code: "00025",
            message: "Vui lòng cung cấp role hợp lệ (user hoặc admin).",
        })?;

    let users = UserRepository::new(state.pool.clone());
    let target = users
        .find_by_id(user_id)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00052",
            message: "Không thể tìm thấy người dùng.",
        })?;

    if target.id == caller.id {
        return Err(ApiError::self_action_forbidden(
            "00017",
            "Bạn không thể thay đổi role của chính mình.",
        ));
    }

    let updated = users.update_role(target.id, role.into()).await?;

    Ok(response::ok(
        "00086",
        &format!("Đã cập nhật role thành {} thành công.", role),
        json!({
            "id": updated.id,
            "email": updated.email,
            "name": updated.name,
            "role": UserRole::from(updated.role),
        }),
    ))
}

/// Delete a user account.
///
/// DELETE /api/admin/users/:id (system admin)
///
/// If the target administers a group, the group is dissolved for every
/// member before the account goes away; a plain member is just detached.
pub async fn delete_user_by_admin(
    State(state): State<AppState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let users = UserRepository::new(state.pool.clone());
    let target = users
        .find_by_id(user_id)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00052",
            message: "Không thể tìm thấy người dùng.",
        })?;

    if target.id == caller.id {
        return Err(ApiError::self_action_forbidden(
            "00017",
            "Bạn không thể xóa tài khoản của chính mình.",
        ));
    }

    users.delete_account(target.id).await?;

    Ok(response::ok_empty(
        "00092",
        "Tài khoản người dùng đã được xóa thành công.",
    ))
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// System-wide statistics rollup.
///
/// GET /api/admin/stats (system admin)
pub async fn get_stats(State(state): State<AppState>) -> Result<Response, ApiError> {
    let users = UserRepository::new(state.pool.clone());
    let groups = GroupRepository::new(state.pool.clone());
    let references = ReferenceRepository::new(state.pool.clone());

    let total_users = users.count_all().await?;
    let total_admins = users.count_admins().await?;
    let verified_users = users.count_verified().await?;
    let total_groups = groups.count_all().await?;
    let total_categories = references.count_categories().await?;
    let total_units = references.count_units().await?;

    Ok(response::ok(
        "00098",
        "Thống kê hệ thống.",
        json!({
            "users": {
                "total": total_users,
                "admins": total_admins,
                "verified": verified_users,
            },
            "groups": total_groups,
            "categories": total_categories,
            "units": total_units,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_request_camel_case() {
        let request: RenameRequest =
            serde_json::from_str(r#"{"oldName":"Rau","newName":"Rau củ"}"#).unwrap();
        assert_eq!(request.old_name.as_deref(), Some("Rau"));
        assert_eq!(request.new_name.as_deref(), Some("Rau củ"));
    }

    #[test]
    fn test_list_users_query_defaults() {
        let query: ListUsersQuery = serde_json::from_str("{}").unwrap();
        let page = query.page_params();
        assert_eq!(page.page(), 1);
        assert_eq!(page.offset(), 0);
        assert!(query.search.is_none());
        assert!(query.role.is_none());
    }
}
