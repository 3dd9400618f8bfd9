//! Group membership and group-admin gates.
//!
//! The ordering is fixed: `require_auth` always runs first, then exactly one
//! of these per group-scoped route. An admin-gated route relies on the admin
//! check alone, which implies membership.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use persistence::repositories::GroupRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::auth::CurrentUser;

/// The caller's group, loaded by `require_group_admin` and stored in request
/// extensions so handlers skip a second lookup.
#[derive(Debug, Clone)]
pub struct CurrentGroup(pub domain::models::Group);

/// Middleware that requires the caller to belong to a group.
///
/// Pure precondition: nothing is loaded or mutated.
pub async fn require_group(req: Request<Body>, next: Next) -> Response {
    match req.extensions().get::<CurrentUser>() {
        Some(CurrentUser(user)) if user.group_id.is_some() => next.run(req).await,
        Some(_) => no_group_response(),
        None => missing_auth_response(),
    }
}

/// Middleware that requires the caller to administer their group.
///
/// Loads the group and exposes it as `CurrentGroup`; a vanished group is
/// indistinguishable from having none.
pub async fn require_group_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let user = match req.extensions().get::<CurrentUser>() {
        Some(CurrentUser(user)) => user.clone(),
        None => return missing_auth_response(),
    };

    let Some(group_id) = user.group_id else {
        return no_group_response();
    };

    let repo = GroupRepository::new(state.pool.clone());
    let group = match repo.find_by_id(group_id).await {
        Ok(Some(group)) => group,
        Ok(None) => return no_group_response(),
        Err(err) => return ApiError::from(err).into_response(),
    };

    if group.admin_id != user.id {
        return ApiError::not_group_admin(
            "00104",
            "Bạn không phải admin, không thể thực hiện thao tác này.",
        )
        .into_response();
    }

    req.extensions_mut().insert(CurrentGroup(group.into()));
    next.run(req).await
}

fn no_group_response() -> Response {
    ApiError::no_group("00096", "Bạn không thuộc về nhóm nào.").into_response()
}

fn missing_auth_response() -> Response {
    tracing::warn!("group gate called without CurrentUser in extensions");
    ApiError::unauthenticated(
        "00006",
        "Truy cập bị từ chối. Không có token được cung cấp.",
    )
    .into_response()
}
