//! Food catalog routes.

use axum::{extract::State, response::Response, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::response;
use crate::routes::require_group_id;
use persistence::entities::FoodWithRefsEntity;
use persistence::repositories::{FoodRepository, ReferenceRepository};

/// Food response with category and unit names resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodResponse {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub image: String,
    pub group: Uuid,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FoodWithRefsEntity> for FoodResponse {
    fn from(entity: FoodWithRefsEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            category: entity.category_name,
            unit: entity.unit_name,
            image: entity.image,
            group: entity.group_id,
            created_by: entity.created_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Request body for food creation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFoodRequest {
    pub name: Option<String>,
    pub food_category_name: Option<String>,
    pub unit_name: Option<String>,
    pub image: Option<String>,
}

/// Create a food in the caller's group catalog.
///
/// POST /api/food
pub async fn create_food(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<CreateFoodRequest>,
) -> Result<Response, ApiError> {
    let (Some(name), Some(category_name), Some(unit_name)) = (
        request.name.as_deref(),
        request.food_category_name.as_deref(),
        request.unit_name.as_deref(),
    ) else {
        return Err(ApiError::validation(
            "00147",
            "Vui lòng cung cấp tất cả các trường bắt buộc!",
        ));
    };

    if name.is_empty() {
        return Err(ApiError::validation(
            "00148",
            "Vui lòng cung cấp tên của thực phẩm hợp lệ!",
        ));
    }

    let group_id = require_group_id(&user)?;
    let references = ReferenceRepository::new(state.pool.clone());

    let category = references
        .find_category_by_name(category_name)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00155",
            message: "Không tìm thấy category với tên cung cấp.",
        })?;

    let unit = references
        .find_unit_by_name(unit_name)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00153",
            message: "Không tìm thấy đơn vị với tên cung cấp.",
        })?;

    let foods = FoodRepository::new(state.pool.clone());
    if foods.name_exists(group_id, name, None).await? {
        return Err(ApiError::duplicate(
            "00151",
            "Đã tồn tại thức ăn với tên này.",
        ));
    }

    let food = foods
        .create(
            name,
            Some(category.id),
            Some(unit.id),
            request.image.as_deref().unwrap_or(""),
            group_id,
            Some(user.id),
        )
        .await?;

    let populated = foods
        .find_with_refs(food.id)
        .await?
        .ok_or_else(|| ApiError::Internal("created food vanished".to_string()))?;

    Ok(response::created(
        "00160",
        "Tạo thực phẩm thành công.",
        FoodResponse::from(populated),
    ))
}

/// Request body for food updates; the target is addressed by name.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFoodRequest {
    pub name: Option<String>,
    pub new_name: Option<String>,
    pub new_category: Option<String>,
    pub new_unit: Option<String>,
}

/// Rename or recategorize a food.
///
/// PUT /api/food
pub async fn update_food(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<UpdateFoodRequest>,
) -> Result<Response, ApiError> {
    let Some(name) = request.name.as_deref() else {
        return Err(ApiError::validation(
            "00161",
            "Vui lòng cung cấp tất cả các trường bắt buộc!",
        ));
    };

    if request.new_name.is_none() && request.new_category.is_none() && request.new_unit.is_none() {
        return Err(ApiError::validation(
            "00163",
            "Vui lòng cung cấp ít nhất một trong các trường sau, newName, newCategory, newUnit.",
        ));
    }

    let group_id = require_group_id(&user)?;
    let foods = FoodRepository::new(state.pool.clone());
    let food = foods
        .find_by_name(group_id, name)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00167",
            message: "Thực phẩm với tên đã cung cấp không tồn tại.",
        })?;

    if let Some(new_name) = request.new_name.as_deref() {
        if foods.name_exists(group_id, new_name, Some(food.id)).await? {
            return Err(ApiError::duplicate(
                "00173",
                "Một thực phẩm với tên này đã tồn tại.",
            ));
        }
    }

    let references = ReferenceRepository::new(state.pool.clone());

    let category_id = match request.new_category.as_deref() {
        Some(category_name) => Some(
            references
                .find_category_by_name(category_name)
                .await?
                .ok_or(ApiError::NotFound {
                    code: "00171",
                    message: "Không tìm thấy danh mục với tên đã cung cấp.",
                })?
                .id,
        ),
        None => None,
    };

    let unit_id = match request.new_unit.as_deref() {
        Some(unit_name) => Some(
            references
                .find_unit_by_name(unit_name)
                .await?
                .ok_or(ApiError::NotFound {
                    code: "00169",
                    message: "Không tìm thấy đơn vị với tên đã cung cấp.",
                })?
                .id,
        ),
        None => None,
    };

    let updated = foods
        .update(food.id, request.new_name.as_deref(), category_id, unit_id)
        .await?;

    let populated = foods
        .find_with_refs(updated.id)
        .await?
        .ok_or_else(|| ApiError::Internal("updated food vanished".to_string()))?;

    Ok(response::ok(
        "00178",
        "Thành công.",
        FoodResponse::from(populated),
    ))
}

/// Request body for food deletion.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteFoodRequest {
    pub name: Option<String>,
}

/// Delete a food from the caller's group catalog.
///
/// DELETE /api/food
pub async fn delete_food(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<DeleteFoodRequest>,
) -> Result<Response, ApiError> {
    let Some(name) = request.name.as_deref() else {
        return Err(ApiError::validation(
            "00179",
            "Vui lòng cung cấp tên thực phẩm.",
        ));
    };

    let group_id = require_group_id(&user)?;
    let foods = FoodRepository::new(state.pool.clone());
    let food = foods
        .find_by_name(group_id, name)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00180",
            message: "Không tìm thấy thực phẩm với tên đã cung cấp.",
        })?;

    foods.delete(food.id).await?;

    Ok(response::ok_empty("00184", "Xóa thực phẩm thành công."))
}

/// List the caller's group catalog.
///
/// GET /api/food
pub async fn get_foods(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let foods = FoodRepository::new(state.pool.clone());
    let list: Vec<FoodResponse> = foods
        .list_by_group(require_group_id(&user)?)
        .await?
        .into_iter()
        .map(FoodResponse::from)
        .collect();

    Ok(response::ok(
        "00188",
        "Lấy danh sách thực phẩm thành công.",
        list,
    ))
}

/// List all food categories.
///
/// GET /api/food/categories
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

/// List all measurement units.
///
/// GET /api/food/units
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_food_request_camel_case() {
        let request: CreateFoodRequest = serde_json::from_str(
            r#"{"name":"Cà chua","foodCategoryName":"Rau củ","unitName":"kg"}"#,
        )
        .unwrap();
        assert_eq!(request.name.as_deref(), Some("Cà chua"));
        assert_eq!(request.food_category_name.as_deref(), Some("Rau củ"));
        assert_eq!(request.unit_name.as_deref(), Some("kg"));
    }

    #[test]
    fn test_food_response_from_entity() {
        let entity = FoodWithRefsEntity {
            id: Uuid::new_v4(),
            name: "Cà chua".to_string(),
            category_name: Some("Rau củ".to_string()),
            unit_name: None,
            image: String::new(),
            group_id: Uuid::new_v4(),
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let response = FoodResponse::from(entity.clone());
        assert_eq!(response.category.as_deref(), Some("Rau củ"));
        assert!(response.unit.is_none());
    }
}
