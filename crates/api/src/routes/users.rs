//! User profile routes.

use axum::{extract::State, response::Response, Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::response;
use crate::services::auth::AuthError;
use domain::models::{Gender, Language};
use persistence::repositories::{GroupRepository, UserRepository};
use shared::validation::{
    validate_name_length, validate_password_length, validate_username_length,
};

/// Get the caller's profile with their group attached.
///
/// GET /api/user
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let group = match user.group_id {
        Some(group_id) => {
            let groups = GroupRepository::new(state.pool.clone());
            match groups.find_by_id(group_id).await? {
                Some(group) => {
                    let members = groups.list_members(group_id).await?;
                    Some(json!({
                        "id": group.id,
                        "name": group.name,
                        "admin": group.admin_id,
                        "members": members.iter().map(|m| m.id).collect::<Vec<_>>(),
                    }))
                }
                None => None,
            }
        }
        None => None,
    };

    Ok(response::ok(
        "00089",
        "Thông tin người dùng đã được lấy thành công.",
        json!({
            "id": user.id,
            "email": user.email,
            "name": user.name,
            "username": user.username,
            "avatar": user.avatar,
            "role": user.role,
            "gender": user.gender,
            "dateOfBirth": user.date_of_birth,
            "language": user.language,
            "group": group,
        }),
    ))
}

/// Request body for profile updates.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub language: Option<String>,
    pub avatar: Option<String>,
}

/// Update the caller's profile.
///
/// PUT /api/user
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Response, ApiError> {
    let users = UserRepository::new(state.pool.clone());

    if let Some(username) = &request.username {
        if validate_username_length(username).is_err() {
            return Err(ApiError::validation(
                "00081",
                "Vui lòng cung cấp một tên người dùng dài hơn 3 ký tự và ngắn hơn 15 ký tự.",
            ));
        }
        if users.username_taken(username, user.id).await? {
            return Err(ApiError::duplicate(
                "00084",
                "Đã có một người dùng với tên người dùng này, vui lòng nhập tên khác.",
            ));
        }
    }

    if let Some(name) = &request.name {
        if validate_name_length(name).is_err() {
            return Err(ApiError::validation(
                "00077",
                "Vui lòng cung cấp một tên dài hơn 3 ký tự và ngắn hơn 30 ký tự.",
            ));
        }
    }

    if let Some(gender) = &request.gender {
        if gender.parse::<Gender>().is_err() {
            return Err(ApiError::validation(
                "00078",
                "Các tùy chọn giới tính hợp lệ, female-male-other, vui lòng cung cấp một trong số chúng.",
            ));
        }
    }

    if let Some(language) = &request.language {
        if language.parse::<Language>().is_err() {
            return Err(ApiError::validation(
                "00079",
                "Các tùy chọn ngôn ngữ hợp lệ, vi-en, vui lòng cung cấp một trong số chúng.",
            ));
        }
    }

    let date_of_birth: Option<NaiveDate> = match &request.date_of_birth {
        Some(raw) => match super::parse_day(raw) {
            Some(day) => Some(day),
            None => {
                return Err(ApiError::validation(
                    "00080",
                    "Vui lòng cung cấp một ngày sinh hợp lệ.",
                ));
            }
        },
        None => None,
    };

    let updated = users
        .update_profile(
            user.id,
            request.name.as_deref(),
            request.username.as_deref(),
            request.gender.as_deref(),
            date_of_birth,
            request.language.as_deref(),
            request.avatar.as_deref(),
        )
        .await?;
    let updated: domain::models::User = updated.into();

    Ok(response::ok(
        "00086",
        "Thông tin hồ sơ của bạn đã được thay đổi thành công.",
        json!({
            "id": updated.id,
            "email": updated.email,
            "name": updated.name,
            "username": updated.username,
            "avatar": updated.avatar,
            "gender": updated.gender,
            "dateOfBirth": updated.date_of_birth,
            "language": updated.language,
        }),
    ))
}

/// Delete the caller's account.
///
/// DELETE /api/user
///
/// Detaches the account from its group first; if the caller administers the
/// group, the group is dissolved for everyone before the account goes away.
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let users = UserRepository::new(state.pool.clone());
    users.delete_account(user.id).await?;

    Ok(response::ok_empty(
        "00092",
        "Tài khoản của bạn đã bị xóa thành công.",
    ))
}

/// Request body for password changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

/// Change the caller's password.
///
/// POST /api/user/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Response, ApiError> {
    let (Some(old_password), Some(new_password)) =
        (&request.old_password, &request.new_password)
    else {
        return Err(ApiError::validation(
            "00069",
            "Vui lòng cung cấp mật khẩu cũ và mới dài hơn 6 ký tự và ngắn hơn 20 ký tự.",
        ));
    };

    if validate_password_length(new_password).is_err() {
        return Err(ApiError::validation(
            "00068",
            "Vui lòng cung cấp một mật khẩu dài hơn 6 và ngắn hơn 20 ký tự.",
        ));
    }

    let service = state.auth_service();
    service
        .change_password(user.id, old_password, new_password)
        .await
        .map_err(|e| match e {
            AuthError::OldPasswordMismatch => ApiError::validation(
                "00072",
                "Mật khẩu cũ của bạn không khớp với mật khẩu bạn nhập, vui lòng nhập mật khẩu đúng.",
            ),
            AuthError::NewPasswordSameAsOld => ApiError::validation(
                "00073",
                "Mật khẩu mới của bạn không nên giống với mật khẩu cũ, vui lòng thử một mật khẩu khác.",
            ),
            other => ApiError::Internal(other.to_string()),
        })?;

    Ok(response::ok_empty(
        "00076",
        "Mật khẩu của bạn đã được thay đổi thành công.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_profile_request_camel_case() {
        let request: UpdateProfileRequest =
            serde_json::from_str(r#"{"dateOfBirth":"2000-01-15","gender":"other"}"#).unwrap();
        assert_eq!(request.date_of_birth.as_deref(), Some("2000-01-15"));
        assert_eq!(request.gender.as_deref(), Some("other"));
        assert!(request.username.is_none());
    }

    #[test]
    fn test_change_password_request_camel_case() {
        let request: ChangePasswordRequest =
            serde_json::from_str(r#"{"oldPassword":"a","newPassword":"b"}"#).unwrap();
        assert_eq!(request.old_password.as_deref(), Some("a"));
        assert_eq!(request.new_password.as_deref(), Some("b"));
    }
}
