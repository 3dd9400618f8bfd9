//! Authentication routes: registration, login, token refresh, and email
//! verification.

use axum::{extract::State, response::Response, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::response;
use crate::services::auth::{AuthError, AuthService};
use shared::validation::{validate_email_format, validate_name_length, validate_password_length};

/// Request body for user registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub language: Option<String>,
    pub timezone: Option<String>,
}

/// Registered account summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// Register a new user.
///
/// POST /api/user
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let (Some(email), Some(password), Some(name)) =
        (&request.email, &request.password, &request.name)
    else {
        return Err(ApiError::validation(
            "00025",
            "Vui lòng cung cấp tất cả các trường bắt buộc!",
        ));
    };

    if validate_email_format(email).is_err() {
        return Err(ApiError::validation(
            "00026",
            "Vui lòng cung cấp một địa chỉ email hợp lệ!",
        ));
    }

    if validate_password_length(password).is_err() {
        return Err(ApiError::validation(
            "00027",
            "Vui lòng cung cấp mật khẩu dài hơn 6 ký tự và ngắn hơn 20 ký tự.",
        ));
    }

    if validate_name_length(name).is_err() {
        return Err(ApiError::validation(
            "00028",
            "Vui lòng cung cấp một tên dài hơn 3 ký tự và ngắn hơn 30 ký tự.",
        ));
    }

    let language = match request.language.as_deref() {
        Some(lang) if lang.parse::<domain::models::Language>().is_err() => {
            return Err(ApiError::validation(
                "00079",
                "Các tùy chọn ngôn ngữ hợp lệ, vi-en, vui lòng cung cấp một trong số chúng.",
            ));
        }
        Some(lang) => lang,
        None => "vi",
    };
    let timezone = request.timezone.as_deref().unwrap_or("Asia/Ho_Chi_Minh");

    let service = state.auth_service();
    let user = service
        .register(email, password, name, language, timezone)
        .await
        .map_err(|e| match e {
            AuthError::EmailAlreadyExists => ApiError::duplicate(
                "00032",
                "Một tài khoản với địa chỉ email này đã tồn tại.",
            ),
            other => ApiError::Internal(other.to_string()),
        })?;

    Ok(response::created(
        "00035",
        "Bạn đã đăng ký thành công. Vui lòng kiểm tra email để xác thực.",
        RegisteredUser {
            id: user.id,
            email: user.email,
            name: user.name,
        },
    ))
}

/// Request body for login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Log in with email and password.
///
/// POST /api/user/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let (Some(email), Some(password)) = (&request.email, &request.password) else {
        return Err(ApiError::validation(
            "00038",
            "Vui lòng cung cấp tất cả các trường bắt buộc!",
        ));
    };

    if validate_email_format(email).is_err() {
        return Err(ApiError::validation(
            "00039",
            "Vui lòng cung cấp một địa chỉ email hợp lệ!",
        ));
    }

    let service = state.auth_service();
    let (user, tokens) = service.login(email, password).await.map_err(|e| match e {
        AuthError::UserNotFound => ApiError::validation(
            "00042",
            "Không tìm thấy tài khoản với địa chỉ email này.",
        ),
        AuthError::InvalidCredentials => ApiError::validation(
            "00045",
            "Bạn đã nhập một email hoặc mật khẩu không hợp lệ.",
        ),
        other => ApiError::Internal(other.to_string()),
    })?;

    Ok(response::ok(
        "00047",
        "Bạn đã đăng nhập thành công.",
        json!({
            "id": user.id,
            "email": user.email,
            "name": user.name,
            "username": user.username,
            "avatar": user.avatar,
            "role": domain::models::UserRole::from(user.role),
            "group": user.group_id,
            "token": tokens.access_token,
            "refreshToken": tokens.refresh_token,
        }),
    ))
}

/// Log out, invalidating the stored refresh token.
///
/// POST /api/user/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let service = state.auth_service();
    service
        .logout(user.id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(response::ok_empty("00050", "Đăng xuất thành công."))
}

/// Request body for token refresh.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

/// Exchange a refresh token for a new token pair.
///
/// POST /api/user/refresh-token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Response, ApiError> {
    let Some(refresh_token) = &request.refresh_token else {
        return Err(ApiError::validation(
            "00059",
            "Vui lòng cung cấp token làm mới.",
        ));
    };

    let service = state.auth_service();
    let tokens = service
        .refresh(refresh_token)
        .await
        .map_err(|e| match e {
            AuthError::InvalidRefreshToken => ApiError::unauthenticated(
                "00061",
                "Token được cung cấp không khớp với người dùng, vui lòng đăng nhập.",
            ),
            AuthError::TokenError(_) => ApiError::unauthenticated(
                "00063",
                "Token đã hết hạn, vui lòng đăng nhập.",
            ),
            other => ApiError::Internal(other.to_string()),
        })?;

    Ok(response::ok(
        "00066",
        "Token đã được làm mới thành công.",
        json!({
            "token": tokens.access_token,
            "refreshToken": tokens.refresh_token,
        }),
    ))
}

/// Request body for resending the verification code.
#[derive(Debug, Clone, Deserialize)]
pub struct SendVerificationCodeRequest {
    pub email: Option<String>,
}

/// Send a fresh verification code to an account's email.
///
/// POST /api/user/send-verification-code
pub async fn send_verification_code(
    State(state): State<AppState>,
    Json(request): Json<SendVerificationCodeRequest>,
) -> Result<Response, ApiError> {
    let Some(email) = &request.email else {
        return Err(ApiError::validation(
            "00005",
            "Vui lòng cung cấp đầy đủ thông tin để gửi mã.",
        ));
    };

    let service = state.auth_service();
    service
        .resend_verification_code(email)
        .await
        .map_err(|e| match e {
            AuthError::UserNotFound => ApiError::not_found(
                "00036",
                "Không tìm thấy tài khoản với địa chỉ email này.",
            ),
            other => ApiError::Internal(other.to_string()),
        })?;

    Ok(response::ok(
        "00048",
        "Mã đã được gửi đến email của bạn thành công.",
        json!({}),
    ))
}

/// Request body for email verification.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyEmailRequest {
    pub code: Option<String>,
}

/// Redeem an emailed verification code.
///
/// POST /api/user/verify-email
pub async fn verify_email(
    State(state): State<AppState>,
    Json(request): Json<VerifyEmailRequest>,
) -> Result<Response, ApiError> {
    let Some(code) = &request.code else {
        return Err(ApiError::validation(
            "00053",
            "Vui lòng gửi một mã xác nhận.",
        ));
    };

    let service = state.auth_service();
    service.verify_email(code).await.map_err(|e| match e {
        AuthError::InvalidVerificationCode => ApiError::validation(
            "00054",
            "Mã bạn nhập không khớp với mã chúng tôi đã gửi đến email của bạn. Vui lòng kiểm tra lại.",
        ),
        other => ApiError::Internal(other.to_string()),
    })?;

    Ok(response::ok_empty(
        "00058",
        "Địa chỉ email của bạn đã được xác minh thành công.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_deserializes_partial_body() {
        let request: RegisterRequest = serde_json::from_str(r#"{"email":"a@b.c"}"#).unwrap();
        assert_eq!(request.email.as_deref(), Some("a@b.c"));
        assert!(request.password.is_none());
        assert!(request.name.is_none());
    }

    #[test]
    fn test_refresh_request_uses_camel_case() {
        let request: RefreshTokenRequest =
            serde_json::from_str(r#"{"refreshToken":"abc"}"#).unwrap();
        assert_eq!(request.refresh_token.as_deref(), Some("abc"));
    }
}
