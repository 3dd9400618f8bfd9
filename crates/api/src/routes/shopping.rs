//! Shopping list and task routes.

use axum::{
    extract::{Path, State},
    response::Response,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{CurrentGroup, CurrentUser};
use crate::response;
use crate::routes::{parse_day, require_group_id, FoodDetails};
use persistence::entities::ShoppingTaskWithFoodEntity;
use persistence::repositories::{FoodRepository, ShoppingRepository};
use shared::validation::validate_quantity;

/// At most this many lists come back from the listing endpoint.
const LIST_HISTORY_LIMIT: i64 = 30;

/// Task response with food and assignee blocks resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingTaskResponse {
    pub id: Uuid,
    pub shopping_list: Uuid,
    pub food: FoodDetails,
    pub quantity: f64,
    pub assigned_to: Option<AssigneeResponse>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Assignee block in task responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeResponse {
    pub id: Uuid,
    pub name: Option<String>,
    pub username: Option<String>,
}

impl From<ShoppingTaskWithFoodEntity> for ShoppingTaskResponse {
    fn from(entity: ShoppingTaskWithFoodEntity) -> Self {
        Self {
            id: entity.id,
            shopping_list: entity.shopping_list_id,
            food: FoodDetails {
                id: entity.food_id,
                name: entity.food_name,
                category: entity.category_name,
                unit: entity.unit_name,
                image: entity.food_image,
            },
            quantity: entity.quantity,
            assigned_to: entity.assigned_to.map(|id| AssigneeResponse {
                id,
                name: entity.assigned_to_name.clone(),
                username: entity.assigned_to_username.clone(),
            }),
            is_completed: entity.is_completed,
            completed_at: entity.completed_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Request body for creating a day's shopping list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateShoppingListRequest {
    pub date: Option<String>,
    pub name: Option<String>,
}

/// Fetch or create the group's shopping list for a day.
///
/// POST /api/shopping/list
///
/// The date is normalized to a calendar day and defaults to today. One list
/// exists per (group, day); asking again returns the existing list.
pub async fn create_shopping_list(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    body: Option<Json<CreateShoppingListRequest>>,
) -> Result<Response, ApiError> {
    let group_id = require_group_id(&user)?;
    let request = body.map(|Json(request)| request).unwrap_or_default();

    let date: NaiveDate = match request.date.as_deref() {
        Some(raw) => parse_day(raw).ok_or(ApiError::Validation {
            code: "00315",
            message: "Vui lòng cung cấp một dấu thời gian hợp lệ.",
        })?,
        None => Utc::now().date_naive(),
    };

    let shopping = ShoppingRepository::new(state.pool.clone());
    let (list, created) = shopping
        .get_or_create_list(group_id, request.name.as_deref(), date, user.id)
        .await?;
    let list: domain::models::ShoppingList = list.into();

    if created {
        Ok(response::created("00098", "Thành công.", list))
    } else {
        Ok(response::ok("00098", "Danh sách đã tồn tại.", list))
    }
}

/// List the group's recent shopping lists, newest first.
///
/// GET /api/shopping/list
pub async fn get_shopping_lists(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let shopping = ShoppingRepository::new(state.pool.clone());
    let lists: Vec<domain::models::ShoppingList> = shopping
        .list_lists(require_group_id(&user)?, LIST_HISTORY_LIMIT)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(response::ok(
        "00287",
        "Lấy danh sách các shopping list thành công.",
        lists,
    ))
}

/// Request body for shopping list deletion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteShoppingListRequest {
    pub list_id: Option<Uuid>,
}

/// Delete a shopping list and all its tasks.
///
/// DELETE /api/shopping/list (group admin)
pub async fn delete_shopping_list(
    State(state): State<AppState>,
    Extension(CurrentGroup(group)): Extension<CurrentGroup>,
    Json(request): Json<DeleteShoppingListRequest>,
) -> Result<Response, ApiError> {
    let Some(list_id) = request.list_id else {
        return Err(ApiError::validation(
            "00293",
            "Vui lòng cung cấp tất cả các trường bắt buộc.",
        ));
    };

    let shopping = ShoppingRepository::new(state.pool.clone());
    let list = shopping
        .find_list_by_id(list_id)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00296",
            message: "Không tìm thấy danh sách.",
        })?;

    if list.group_id != group.id {
        return Err(ApiError::forbidden(
            "00297",
            "Danh sách không thuộc nhóm của bạn.",
        ));
    }

    shopping.delete_list_cascade(list.id).await?;

    Ok(response::ok_empty("00299", "Xóa thành công."))
}

/// Request body for creating a shopping task.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub list_id: Option<Uuid>,
    pub food_name: Option<String>,
    pub quantity: Option<f64>,
    pub assigned_to: Option<Uuid>,
}

/// Add a food to a shopping list.
///
/// POST /api/shopping/task (group admin)
///
/// The food is vivified on demand; a food already on the list is rejected.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(CurrentGroup(group)): Extension<CurrentGroup>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<Response, ApiError> {
    let (Some(list_id), Some(food_name)) = (request.list_id, request.food_name.as_deref()) else {
        return Err(ApiError::validation(
            "00278",
            "Vui lòng cung cấp tất cả các trường bắt buộc.",
        ));
    };

    if let Some(quantity) = request.quantity {
        if validate_quantity(quantity).is_err() {
            return Err(ApiError::validation(
                "00192",
                "Vui lòng cung cấp một số lượng hợp lệ!",
            ));
        }
    }

    let shopping = ShoppingRepository::new(state.pool.clone());
    let list = shopping
        .find_list_by_id(list_id)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00296",
            message: "Không tìm thấy danh sách.",
        })?;

    let foods = FoodRepository::new(state.pool.clone());
    let food = foods
        .find_or_create(group.id, food_name, None, None, Some(user.id))
        .await?;

    if shopping
        .task_exists_for_food(list.id, food.id, None)
        .await?
    {
        return Err(ApiError::duplicate(
            "00283",
            "Thực phẩm này đã có trong danh sách rồi.",
        ));
    }

    let task = shopping
        .create_task(
            list.id,
            food.id,
            request.quantity.unwrap_or(1.0),
            request.assigned_to,
        )
        .await?;

    let populated = shopping
        .find_task_with_food(task.id)
        .await?
        .ok_or_else(|| ApiError::Internal("created task vanished".to_string()))?;

    Ok(response::created(
        "00284",
        "Thêm nhiệm vụ thành công.",
        ShoppingTaskResponse::from(populated),
    ))
}

/// List the tasks on a shopping list.
///
/// GET /api/shopping/task/:listId
pub async fn get_tasks(
    State(state): State<AppState>,
    Path(list_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let shopping = ShoppingRepository::new(state.pool.clone());
    let tasks: Vec<ShoppingTaskResponse> = shopping
        .list_tasks(list_id)
        .await?
        .into_iter()
        .map(ShoppingTaskResponse::from)
        .collect();

    Ok(response::ok(
        "00287",
        "Lấy danh sách các shopping list thành công.",
        tasks,
    ))
}

/// Request body for shopping task updates.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub task_id: Option<Uuid>,
    pub new_food_name: Option<String>,
    pub new_quantity: Option<f64>,
    pub is_completed: Option<bool>,
}

/// Update a shopping task.
///
/// PUT /api/shopping/task (group admin)
///
/// Renaming the food re-runs the duplicate-in-list check against the other
/// tasks. Toggling completion sets or clears the completion timestamp in the
/// same write as the flag; the two never diverge.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(CurrentGroup(group)): Extension<CurrentGroup>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Response, ApiError> {
    let Some(task_id) = request.task_id else {
        return Err(ApiError::validation(
            "00301",
            "Vui lòng cung cấp một ID nhiệm vụ trong trường taskId.",
        ));
    };

    if let Some(quantity) = request.new_quantity {
        if validate_quantity(quantity).is_err() {
            return Err(ApiError::validation(
                "00192",
                "Vui lòng cung cấp một số lượng hợp lệ!",
            ));
        }
    }

    let shopping = ShoppingRepository::new(state.pool.clone());
    let task = shopping
        .find_task_by_id(task_id)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00306",
            message: "Không tìm thấy nhiệm vụ với ID đã cung cấp.",
        })?;

    let new_food_id = match request.new_food_name.as_deref() {
        Some(new_food_name) => {
            let foods = FoodRepository::new(state.pool.clone());
            let food = foods
                .find_by_name(group.id, new_food_name)
                .await?
                .ok_or(ApiError::NotFound {
                    code: "00308",
                    message: "Không tìm thấy nhiệm vụ với tên đã cung cấp.",
                })?;

            if shopping
                .task_exists_for_food(task.shopping_list_id, food.id, Some(task.id))
                .await?
            {
                return Err(ApiError::duplicate(
                    "00309",
                    "Thực phẩm này đã tồn tại trong danh sách mua hàng hiện tại.",
                ));
            }

            Some(food.id)
        }
        None => None,
    };

    let completion = request
        .is_completed
        .map(|flag| (flag, flag.then(Utc::now)));

    let updated = shopping
        .update_task(task.id, new_food_id, request.new_quantity, completion)
        .await?;

    let populated = shopping
        .find_task_with_food(updated.id)
        .await?
        .ok_or_else(|| ApiError::Internal("updated task vanished".to_string()))?;

    Ok(response::ok(
        "00312",
        "Cập nhật nhiệm vụ thành công.",
        ShoppingTaskResponse::from(populated),
    ))
}

/// Request body for shopping task deletion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTaskRequest {
    pub task_id: Option<Uuid>,
}

/// Delete a shopping task.
///
/// DELETE /api/shopping/task (group admin)
pub async fn delete_task(
    State(state): State<AppState>,
    Json(request): Json<DeleteTaskRequest>,
) -> Result<Response, ApiError> {
    let Some(task_id) = request.task_id else {
        return Err(ApiError::validation(
            "00294",
            "Vui lòng cung cấp một ID nhiệm vụ trong trường taskId.",
        ));
    };

    let shopping = ShoppingRepository::new(state.pool.clone());
    let task = shopping
        .find_task_by_id(task_id)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00296",
            message: "Không tìm thấy nhiệm vụ với ID đã cung cấp.",
        })?;

    shopping.delete_task(task.id).await?;

    Ok(response::ok_empty("00299", "Xóa nhiệm vụ thành công."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_pair_never_diverges() {
        // Completing stamps a time; un-completing clears it
        let completed = Some(true).map(|flag: bool| (flag, flag.then(Utc::now)));
        let (flag, at) = completed.unwrap();
        assert!(flag);
        assert!(at.is_some());

        let cleared = Some(false).map(|flag: bool| (flag, flag.then(Utc::now)));
        let (flag, at) = cleared.unwrap();
        assert!(!flag);
        assert!(at.is_none());
    }

    #[test]
    fn test_create_task_request_camel_case() {
        let request: UpdateTaskRequest =
            serde_json::from_str(r#"{"taskId":"550e8400-e29b-41d4-a716-446655440000","isCompleted":true}"#)
                .unwrap();
        assert_eq!(request.is_completed, Some(true));
        assert!(request.new_food_name.is_none());
    }
}
