//! Bearer-token authentication middleware.
//!
//! `require_auth` resolves the access token to a full user record and makes
//! it available to downstream gates and handlers; `require_system_admin`
//! additionally requires the system-administrator role.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use persistence::repositories::UserRepository;

use crate::app::AppState;
use crate::error::ApiError;
use shared::jwt::{extract_user_id, JwtConfig, JwtError};

/// The authenticated caller, stored in request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub domain::models::User);

/// Middleware that requires a valid Bearer access token.
///
/// The subject of the token is loaded from the store so downstream checks
/// always see the caller's current group membership and role, not the state
/// at token issue time. Rejects when the header is absent, the token is
/// expired or malformed, or the user no longer exists.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let token = match auth_header.and_then(|header| header.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => {
            return ApiError::unauthenticated(
                "00006",
                "Truy cập bị từ chối. Không có token được cung cấp.",
            )
            .into_response();
        }
    };

    let jwt = JwtConfig::with_leeway(
        &state.config.jwt.secret,
        state.config.jwt.access_token_expiry_secs,
        state.config.jwt.refresh_token_expiry_secs,
        state.config.jwt.leeway_secs,
    );

    let claims = match jwt.validate_access_token(token) {
        Ok(claims) => claims,
        Err(JwtError::TokenExpired) => {
            return ApiError::unauthenticated(
                "00011",
                "Phiên của bạn đã hết hạn, vui lòng đăng nhập lại.",
            )
            .into_response();
        }
        Err(_) => {
            return ApiError::unauthenticated(
                "00012",
                "Token không hợp lệ. Token có thể đã hết hạn.",
            )
            .into_response();
        }
    };

    let user_id = match extract_user_id(&claims) {
        Ok(user_id) => user_id,
        Err(_) => {
            return ApiError::unauthenticated(
                "00012",
                "Token không hợp lệ. Token có thể đã hết hạn.",
            )
            .into_response();
        }
    };

    let repo = UserRepository::new(state.pool.clone());
    match repo.find_by_id(user_id).await {
        Ok(Some(user)) => {
            req.extensions_mut().insert(CurrentUser(user.into()));
            next.run(req).await
        }
        Ok(None) => {
            ApiError::unauthenticated("00052", "Không thể tìm thấy người dùng.").into_response()
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}

/// Middleware that requires the system-administrator role.
///
/// Runs after `require_auth`.
pub async fn require_system_admin(req: Request<Body>, next: Next) -> Response {
    match req.extensions().get::<CurrentUser>() {
        Some(CurrentUser(user)) if user.is_system_admin() => next.run(req).await,
        Some(_) => ApiError::forbidden(
            "00017",
            "Truy cập bị từ chối. Bạn không có quyền truy cập.",
        )
        .into_response(),
        None => {
            tracing::warn!("require_system_admin called without CurrentUser in extensions");
            ApiError::unauthenticated(
                "00006",
                "Truy cập bị từ chối. Không có token được cung cấp.",
            )
            .into_response()
        }
    }
}
