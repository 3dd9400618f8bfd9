//! Success envelope helpers.
//!
//! Every successful response is `{code, message, data?}`, mirroring the
//! error envelope in shape. Codes are opaque numeric tags; the HTTP status
//! is chosen independently of them.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

/// 200 OK with a data payload.
pub fn ok<T: Serialize>(code: &str, message: &str, data: T) -> Response {
    with_status(StatusCode::OK, code, message, Some(data))
}

/// 200 OK without a data payload.
pub fn ok_empty(code: &str, message: &str) -> Response {
    with_status::<()>(StatusCode::OK, code, message, None)
}

/// 201 Created with a data payload.
pub fn created<T: Serialize>(code: &str, message: &str, data: T) -> Response {
    with_status(StatusCode::CREATED, code, message, Some(data))
}

fn with_status<T: Serialize>(
    status: StatusCode,
    code: &str,
    message: &str,
    data: Option<T>,
) -> Response {
    let body = match data {
        Some(data) => json!({
            "code": code,
            "message": message,
            "data": data,
        }),
        None => json!({
            "code": code,
            "message": message,
        }),
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_status() {
        let response = ok("00178", "Thành công.", json!({"id": 1}));
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_created_status() {
        let response = created("00160", "Tạo thực phẩm thành công.", json!({"id": 1}));
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_ok_empty_status() {
        let response = ok_empty("00050", "Đăng xuất thành công.");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
