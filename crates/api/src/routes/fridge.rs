//! Fridge inventory routes.

use axum::{
    extract::{Path, State},
    response::Response,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::response;
use crate::routes::{require_group_id, FoodDetails};
use domain::models::fridge_item::expiry_from_use_within;
use domain::models::FridgeLocation;
use persistence::entities::FridgeItemWithFoodEntity;
use persistence::repositories::{FoodRepository, FridgeRepository, ReferenceRepository};
use shared::validation::{validate_quantity, validate_use_within};

/// Fridge item response with its food block resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FridgeItemResponse {
    pub id: Uuid,
    pub food: FoodDetails,
    pub group: Uuid,
    pub quantity: f64,
    pub use_within: Option<i32>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub note: String,
    pub location: FridgeLocation,
    pub added_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FridgeItemWithFoodEntity> for FridgeItemResponse {
    fn from(entity: FridgeItemWithFoodEntity) -> Self {
        Self {
            id: entity.id,
            food: FoodDetails {
                id: entity.food_id,
                name: entity.food_name,
                category: entity.category_name,
                unit: entity.unit_name,
                image: entity.food_image,
            },
            group: entity.group_id,
            quantity: entity.quantity,
            use_within: entity.use_within,
            expiry_date: entity.expiry_date,
            note: entity.note,
            location: entity.location.into(),
            added_by: entity.added_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Request body for adding food to the fridge.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFridgeItemRequest {
    pub food_name: Option<String>,
    pub quantity: Option<f64>,
    pub use_within: Option<i32>,
    pub note: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
}

/// Add food to the fridge, merging into the existing entry if the food is
/// already stored.
///
/// POST /api/fridge
///
/// The food is vivified on demand. A merge adds the supplied quantity
/// (default 1) to the stored amount and refreshes the expiry only when a
/// use-within value was supplied; a fresh entry derives its expiry from
/// use-within, where 0 days means "expires today", not "no expiry".
pub async fn create_fridge_item(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<CreateFridgeItemRequest>,
) -> Result<Response, ApiError> {
    let Some(food_name) = request.food_name.as_deref().filter(|n| !n.is_empty()) else {
        return Err(ApiError::validation(
            "00190",
            "Vui lòng cung cấp một tên thực phẩm hợp lệ!",
        ));
    };

    if let Some(use_within) = request.use_within {
        if validate_use_within(use_within).is_err() {
            return Err(ApiError::validation(
                "00191",
                "Vui lòng cung cấp một giá trị 'sử dụng trong khoảng' hợp lệ!",
            ));
        }
    }

    if let Some(quantity) = request.quantity {
        if validate_quantity(quantity).is_err() {
            return Err(ApiError::validation(
                "00192",
                "Vui lòng cung cấp một số lượng hợp lệ!",
            ));
        }
    }

    let location = match request.location.as_deref() {
        Some(raw) => raw.parse::<FridgeLocation>().map_err(|_| {
            ApiError::validation(
                "00193",
                "Vui lòng cung cấp một vị trí hợp lệ, freezer, chiller, vegetable, door.",
            )
        })?,
        None => FridgeLocation::default(),
    };

    let group_id = require_group_id(&user)?;

    // Unresolvable category/unit names are dropped, not an error
    let references = ReferenceRepository::new(state.pool.clone());
    let category_id = match request.category.as_deref() {
        Some(name) => references.find_category_by_name(name).await?.map(|c| c.id),
        None => None,
    };
    let unit_id = match request.unit.as_deref() {
        Some(name) => references.find_unit_by_name(name).await?.map(|u| u.id),
        None => None,
    };

    let foods = FoodRepository::new(state.pool.clone());
    let food = foods
        .find_or_create(group_id, food_name, category_id, unit_id, Some(user.id))
        .await?;

    let quantity = request.quantity.unwrap_or(1.0);
    let expiry_date = request
        .use_within
        .map(|days| expiry_from_use_within(Utc::now(), days));

    let fridge = FridgeRepository::new(state.pool.clone());
    let (item, merged) = fridge
        .upsert(
            group_id,
            food.id,
            quantity,
            request.use_within,
            expiry_date,
            request.note.as_deref().unwrap_or(""),
            location.into(),
            Some(user.id),
        )
        .await?;

    let populated = fridge
        .find_with_food(item.id)
        .await?
        .ok_or_else(|| ApiError::Internal("stored fridge item vanished".to_string()))?;

    if merged {
        Ok(response::ok(
            "00202",
            "Đã cập nhật số lượng thực phẩm.",
            FridgeItemResponse::from(populated),
        ))
    } else {
        Ok(response::created(
            "00202",
            "Mục trong tủ lạnh được tạo thành công.",
            FridgeItemResponse::from(populated),
        ))
    }
}

/// Request body for fridge item updates.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFridgeItemRequest {
    pub item_id: Option<Uuid>,
    pub new_quantity: Option<f64>,
    pub new_note: Option<String>,
    pub new_use_within: Option<i32>,
    pub new_location: Option<String>,
}

/// Update a fridge item.
///
/// PUT /api/fridge
///
/// Only supplied fields change. A new use-within restarts the countdown
/// from now; it never adjusts the previous expiry date.
pub async fn update_fridge_item(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<UpdateFridgeItemRequest>,
) -> Result<Response, ApiError> {
    let Some(item_id) = request.item_id else {
        return Err(ApiError::validation(
            "00204",
            "Vui lòng cung cấp id của item tủ lạnh.",
        ));
    };

    if request.new_quantity.is_none()
        && request.new_note.is_none()
        && request.new_use_within.is_none()
        && request.new_location.is_none()
    {
        return Err(ApiError::validation(
            "00204x",
            "Vui lòng cung cấp ít nhất một trong các trường sau, newQuantity, newNote, newUseWithin, newLocation.",
        ));
    }

    if let Some(use_within) = request.new_use_within {
        if validate_use_within(use_within).is_err() {
            return Err(ApiError::validation(
                "00205",
                "Vui lòng cung cấp một giá trị 'sử dụng trong' hợp lệ!",
            ));
        }
    }

    if let Some(quantity) = request.new_quantity {
        if validate_quantity(quantity).is_err() {
            return Err(ApiError::validation(
                "00206",
                "Vui lòng cung cấp một lượng hợp lệ!",
            ));
        }
    }

    let location = match request.new_location.as_deref() {
        Some(raw) => Some(raw.parse::<FridgeLocation>().map_err(|_| {
            ApiError::validation(
                "00193",
                "Vui lòng cung cấp một vị trí hợp lệ, freezer, chiller, vegetable, door.",
            )
        })?),
        None => None,
    };

    let group_id = require_group_id(&user)?;
    let fridge = FridgeRepository::new(state.pool.clone());
    let item = fridge
        .find_by_id(item_id)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00213",
            message: "Mục tủ lạnh không tồn tại.",
        })?;

    if item.group_id != group_id {
        return Err(ApiError::forbidden(
            "00212",
            "Tủ lạnh không thuộc quản trị viên nhóm.",
        ));
    }

    let use_within_expiry = request
        .new_use_within
        .map(|days| (days, expiry_from_use_within(Utc::now(), days)));

    let updated = fridge
        .update_fields(
            item.id,
            request.new_quantity,
            request.new_note.as_deref(),
            use_within_expiry,
            location.map(Into::into),
        )
        .await?;

    let populated = fridge
        .find_with_food(updated.id)
        .await?
        .ok_or_else(|| ApiError::Internal("updated fridge item vanished".to_string()))?;

    Ok(response::ok(
        "00178",
        "Thành công.",
        FridgeItemResponse::from(populated),
    ))
}

/// Request body for fridge item deletion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFridgeItemRequest {
    pub item_id: Option<Uuid>,
}

/// Remove an item from the fridge.
///
/// DELETE /api/fridge
pub async fn delete_fridge_item(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<DeleteFridgeItemRequest>,
) -> Result<Response, ApiError> {
    let Some(item_id) = request.item_id else {
        return Err(ApiError::validation(
            "00204",
            "Vui lòng cung cấp id của item tủ lạnh.",
        ));
    };

    let group_id = require_group_id(&user)?;
    let fridge = FridgeRepository::new(state.pool.clone());
    let item = fridge
        .find_by_id(item_id)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00213",
            message: "Mục tủ lạnh không tồn tại.",
        })?;

    if item.group_id != group_id {
        return Err(ApiError::forbidden(
            "00212",
            "Tủ lạnh không thuộc quản trị viên nhóm.",
        ));
    }

    fridge.delete(item.id).await?;

    Ok(response::ok_empty("00184", "Xóa thành công."))
}

/// List the group's fridge contents, soonest expiry first.
///
/// GET /api/fridge
pub async fn get_fridge_items(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let fridge = FridgeRepository::new(state.pool.clone());
    let items: Vec<FridgeItemResponse> = fridge
        .list_by_group(require_group_id(&user)?)
        .await?
        .into_iter()
        .map(FridgeItemResponse::from)
        .collect();

    Ok(response::ok(
        "00188",
        "Lấy danh sách thực phẩm thành công.",
        items,
    ))
}

/// Get a single fridge item.
///
/// GET /api/fridge/:id
pub async fn get_fridge_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let fridge = FridgeRepository::new(state.pool.clone());
    let item = fridge
        .find_with_food(item_id)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00213",
            message: "Mục tủ lạnh không tồn tại.",
        })?;

    Ok(response::ok(
        "00178",
        "Thành công.",
        FridgeItemResponse::from(item),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_camel_case() {
        let request: CreateFridgeItemRequest = serde_json::from_str(
            r#"{"foodName":"Sữa","quantity":2,"useWithin":5,"location":"door"}"#,
        )
        .unwrap();
        assert_eq!(request.food_name.as_deref(), Some("Sữa"));
        assert_eq!(request.quantity, Some(2.0));
        assert_eq!(request.use_within, Some(5));
        assert_eq!(request.location.as_deref(), Some("door"));
    }

    #[test]
    fn test_update_request_accepts_zero_use_within() {
        // Zero is "expires today", not absent
        let request: UpdateFridgeItemRequest =
            serde_json::from_str(r#"{"itemId":"550e8400-e29b-41d4-a716-446655440000","newUseWithin":0}"#)
                .unwrap();
        assert_eq!(request.new_use_within, Some(0));
    }
}
