//! Meal plan routes.

use axum::{
    extract::{Query, State},
    response::Response,
    Extension, Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{CurrentGroup, CurrentUser};
use crate::response;
use crate::routes::{parse_timestamp, require_group_id, FoodDetails};
use domain::models::MealType;
use persistence::entities::MealPlanWithFoodEntity;
use persistence::repositories::{FoodRepository, MealPlanRepository};

/// Meal plan response with its food block resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanResponse {
    pub id: Uuid,
    pub group: Uuid,
    pub food: FoodDetails,
    pub date: DateTime<Utc>,
    pub meal_type: MealType,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MealPlanWithFoodEntity> for MealPlanResponse {
    fn from(entity: MealPlanWithFoodEntity) -> Self {
        Self {
            id: entity.id,
            group: entity.group_id,
            food: FoodDetails {
                id: entity.food_id,
                name: entity.food_name,
                category: entity.category_name,
                unit: entity.unit_name,
                image: entity.food_image,
            },
            date: entity.date,
            meal_type: entity.meal_type.into(),
            created_by: entity.created_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Request body for meal plan creation.
///
/// `name` carries the meal slot label, matching the mobile client's wire
/// format.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMealPlanRequest {
    pub food_name: Option<String>,
    pub timestamp: Option<String>,
    pub name: Option<String>,
}

/// Plan a dish for a meal slot.
///
/// POST /api/meal-plan (group admin)
pub async fn create_meal_plan(
    State(state): State<AppState>,
    Extension(CurrentGroup(group)): Extension<CurrentGroup>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<CreateMealPlanRequest>,
) -> Result<Response, ApiError> {
    let (Some(food_name), Some(timestamp), Some(name)) = (
        request.food_name.as_deref(),
        request.timestamp.as_deref(),
        request.name.as_deref(),
    ) else {
        return Err(ApiError::validation(
            "00313",
            "Vui lòng cung cấp tất cả các trường bắt buộc.",
        ));
    };

    if food_name.is_empty() {
        return Err(ApiError::validation(
            "00314",
            "Vui lòng cung cấp một tên thực phẩm hợp lệ.",
        ));
    }

    let date = parse_timestamp(timestamp).ok_or(ApiError::Validation {
        code: "00315",
        message: "Vui lòng cung cấp một dấu thời gian hợp lệ.",
    })?;

    let meal_type: MealType = name.parse().map_err(|_| {
        ApiError::validation(
            "00316",
            "Vui lòng cung cấp một tên hợp lệ cho bữa ăn, sáng, trưa, tối.",
        )
    })?;

    let foods = FoodRepository::new(state.pool.clone());
    let food = foods
        .find_or_create(group.id, food_name, None, None, Some(user.id))
        .await?;

    let plans = MealPlanRepository::new(state.pool.clone());
    let plan = plans
        .create(group.id, food.id, date, meal_type.into(), Some(user.id))
        .await?;

    let populated = plans
        .find_with_food(plan.id)
        .await?
        .ok_or_else(|| ApiError::Internal("created meal plan vanished".to_string()))?;

    Ok(response::created(
        "00322",
        "Thêm kế hoạch bữa ăn thành công.",
        MealPlanResponse::from(populated),
    ))
}

/// Query parameters for the meal plan listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MealPlanQuery {
    pub date: Option<String>,
}

/// List the group's meal plans, optionally for one day.
///
/// GET /api/meal-plan
pub async fn get_meal_plans(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<MealPlanQuery>,
) -> Result<Response, ApiError> {
    let group_id = require_group_id(&user)?;

    let window = match query.date.as_deref() {
        Some(raw) => {
            let start = parse_timestamp(raw)
                .map(|ts| ts.date_naive().and_hms_opt(0, 0, 0))
                .flatten()
                .ok_or(ApiError::Validation {
                    code: "00315",
                    message: "Vui lòng cung cấp một dấu thời gian hợp lệ.",
                })?
                .and_utc();
            Some((start, start + Duration::days(1) - Duration::milliseconds(1)))
        }
        None => None,
    };

    let plans = MealPlanRepository::new(state.pool.clone());
    let list: Vec<MealPlanResponse> = plans
        .list_by_group(group_id, window)
        .await?
        .into_iter()
        .map(MealPlanResponse::from)
        .collect();

    Ok(response::ok("00349", "Lấy danh sách thành công.", list))
}

/// Request body for meal plan updates.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMealPlanRequest {
    pub plan_id: Option<Uuid>,
    pub new_food_name: Option<String>,
    pub new_timestamp: Option<String>,
    pub new_name: Option<String>,
}

/// Update a meal plan.
///
/// PUT /api/meal-plan (group admin)
pub async fn update_meal_plan(
    State(state): State<AppState>,
    Extension(CurrentGroup(group)): Extension<CurrentGroup>,
    Json(request): Json<UpdateMealPlanRequest>,
) -> Result<Response, ApiError> {
    let Some(plan_id) = request.plan_id else {
        return Err(ApiError::validation(
            "00332",
            "Vui lòng cung cấp một ID kế hoạch!",
        ));
    };

    if request.new_food_name.is_none()
        && request.new_timestamp.is_none()
        && request.new_name.is_none()
    {
        return Err(ApiError::validation(
            "00333",
            "Vui lòng cung cấp ít nhất một trong các trường sau, newFoodName, newTimestamp, newName.",
        ));
    }

    let plans = MealPlanRepository::new(state.pool.clone());
    let plan = plans
        .find_by_id(plan_id)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00339",
            message: "Không tìm thấy kế hoạch với ID đã cung cấp.",
        })?;

    if plan.group_id != group.id {
        return Err(ApiError::forbidden(
            "00341",
            "Người dùng không phải là quản trị viên nhóm.",
        ));
    }

    let new_food_id = match request.new_food_name.as_deref() {
        Some(new_food_name) => {
            let foods = FoodRepository::new(state.pool.clone());
            Some(
                foods
                    .find_by_name(group.id, new_food_name)
                    .await?
                    .ok_or(ApiError::NotFound {
                        code: "00344",
                        message: "Tên thực phẩm mới không tồn tại.",
                    })?
                    .id,
            )
        }
        None => None,
    };

    let new_date = match request.new_timestamp.as_deref() {
        Some(raw) => Some(parse_timestamp(raw).ok_or(ApiError::Validation {
            code: "00335",
            message: "Vui lòng cung cấp một dấu thời gian hợp lệ!",
        })?),
        None => None,
    };

    let new_meal_type = match request.new_name.as_deref() {
        Some(raw) => Some(raw.parse::<MealType>().map_err(|_| {
            ApiError::validation(
                "00337",
                "Vui lòng cung cấp một tên hợp lệ, sáng, trưa, tối!",
            )
        })?),
        None => None,
    };

    let updated = plans
        .update(plan.id, new_food_id, new_date, new_meal_type.map(Into::into))
        .await?;

    let populated = plans
        .find_with_food(updated.id)
        .await?
        .ok_or_else(|| ApiError::Internal("updated meal plan vanished".to_string()))?;

    Ok(response::ok(
        "00345",
        "Cập nhật kế hoạch bữa ăn thành công.",
        MealPlanResponse::from(populated),
    ))
}

/// Request body for meal plan deletion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMealPlanRequest {
    pub plan_id: Option<Uuid>,
}

/// Delete a meal plan.
///
/// DELETE /api/meal-plan (group admin)
pub async fn delete_meal_plan(
    State(state): State<AppState>,
    Extension(CurrentGroup(group)): Extension<CurrentGroup>,
    Json(request): Json<DeleteMealPlanRequest>,
) -> Result<Response, ApiError> {
    let Some(plan_id) = request.plan_id else {
        return Err(ApiError::validation(
            "00324",
            "Vui lòng cung cấp một ID kế hoạch hợp lệ.",
        ));
    };

    let plans = MealPlanRepository::new(state.pool.clone());
    let plan = plans
        .find_by_id(plan_id)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00325",
            message: "Không tìm thấy kế hoạch với ID đã cung cấp.",
        })?;

    if plan.group_id != group.id {
        return Err(ApiError::forbidden(
            "00327",
            "Người dùng không phải là quản trị viên nhóm.",
        ));
    }

    plans.delete(plan.id).await?;

    Ok(response::ok_empty(
        "00330",
        "Kế hoạch bữa ăn của bạn đã được xóa thành công.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_meal_slot_labels() {
        let request: CreateMealPlanRequest = serde_json::from_str(
            r#"{"foodName":"Phở bò","timestamp":"2024-03-01","name":"sáng"}"#,
        )
        .unwrap();
        assert_eq!(request.name.as_deref(), Some("sáng"));
        assert_eq!(
            request.name.unwrap().parse::<MealType>().unwrap(),
            MealType::Morning
        );
    }

    #[test]
    fn test_slot_label_rejects_unknown_value() {
        assert!("brunch".parse::<MealType>().is_err());
    }
}
