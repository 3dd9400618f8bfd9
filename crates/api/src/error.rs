//! API error taxonomy and envelope rendering.
//!
//! Every failure renders as `{code, message}` where `code` is the opaque
//! numeric tag the mobile client branches on and `message` is end-user
//! Vietnamese text. The HTTP status is derived from the error kind, not
//! from the tag.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Status code and message for the generic infrastructure failure.
pub const INTERNAL_CODE: &str = "00008";
pub const INTERNAL_MESSAGE: &str = "Đã xảy ra lỗi máy chủ nội bộ, vui lòng thử lại.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed, or expired credential; or it resolves to no user.
    #[error("{message}")]
    Unauthenticated {
        code: &'static str,
        message: &'static str,
    },

    /// Group-scoped operation attempted without a group membership.
    #[error("{message}")]
    NoGroup {
        code: &'static str,
        message: &'static str,
    },

    /// Privileged group operation attempted by a non-admin member.
    #[error("{message}")]
    NotGroupAdmin {
        code: &'static str,
        message: &'static str,
    },

    /// A referenced entity does not exist.
    #[error("{message}")]
    NotFound {
        code: &'static str,
        message: &'static str,
    },

    /// A uniqueness rule caught by pre-check (name per group, food per list).
    #[error("{message}")]
    Duplicate {
        code: &'static str,
        message: &'static str,
    },

    /// Missing required field, out-of-range number, bad enum value, or an
    /// unparseable date.
    #[error("{message}")]
    Validation {
        code: &'static str,
        message: &'static str,
    },

    /// Cross-group access attempt or insufficient privilege.
    #[error("{message}")]
    Forbidden {
        code: &'static str,
        message: &'static str,
    },

    /// Self-targeted delete or role change.
    #[error("{message}")]
    SelfActionForbidden {
        code: &'static str,
        message: &'static str,
    },

    /// Unexpected store or infrastructure failure; detail is logged, the
    /// caller gets a generic localized message.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn unauthenticated(code: &'static str, message: &'static str) -> Self {
        ApiError::Unauthenticated { code, message }
    }

    pub fn no_group(code: &'static str, message: &'static str) -> Self {
        ApiError::NoGroup { code, message }
    }

    pub fn not_group_admin(code: &'static str, message: &'static str) -> Self {
        ApiError::NotGroupAdmin { code, message }
    }

    pub fn not_found(code: &'static str, message: &'static str) -> Self {
        ApiError::NotFound { code, message }
    }

    pub fn duplicate(code: &'static str, message: &'static str) -> Self {
        ApiError::Duplicate { code, message }
    }

    pub fn validation(code: &'static str, message: &'static str) -> Self {
        ApiError::Validation { code, message }
    }

    pub fn forbidden(code: &'static str, message: &'static str) -> Self {
        ApiError::Forbidden { code, message }
    }

    pub fn self_action_forbidden(code: &'static str, message: &'static str) -> Self {
        ApiError::SelfActionForbidden { code, message }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            ApiError::NoGroup { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotGroupAdmin { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Duplicate { .. } => StatusCode::BAD_REQUEST,
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::SelfActionForbidden { .. } => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match &self {
            ApiError::Unauthenticated { code, message }
            | ApiError::NoGroup { code, message }
            | ApiError::NotGroupAdmin { code, message }
            | ApiError::NotFound { code, message }
            | ApiError::Duplicate { code, message }
            | ApiError::Validation { code, message }
            | ApiError::Forbidden { code, message }
            | ApiError::SelfActionForbidden { code, message } => (*code, *message),
            ApiError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (INTERNAL_CODE, INTERNAL_MESSAGE)
            }
        };

        (
            status,
            Json(json!({
                "code": code,
                "message": message,
            })),
        )
            .into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(format!("Database error: {}", err))
    }
}

impl From<shared::password::PasswordError> for ApiError {
    fn from(err: shared::password::PasswordError) -> Self {
        ApiError::Internal(format!("Password error: {}", err))
    }
}

impl From<shared::jwt::JwtError> for ApiError {
    fn from(err: shared::jwt::JwtError) -> Self {
        ApiError::Internal(format!("Token error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::unauthenticated("00006", "x").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::no_group("00096", "x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::not_group_admin("00104", "x").status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::not_found("00213", "x").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::duplicate("00151", "x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::validation("00192", "x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::forbidden("00212", "x").status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::self_action_forbidden("00017", "x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::not_found("00213", "Mục tủ lạnh không tồn tại.").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_from_sqlx_error_is_internal() {
        let error: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, ApiError::Internal(_)));
    }

    #[test]
    fn test_display_uses_message() {
        let error = ApiError::validation("00192", "Vui lòng cung cấp một số lượng hợp lệ!");
        assert_eq!(
            format!("{}", error),
            "Vui lòng cung cấp một số lượng hợp lệ!"
        );
    }
}
