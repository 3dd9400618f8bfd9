//! Recipe routes.

use axum::{
    extract::{Query, State},
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
use persistence::entities::RecipeWithFoodEntity;
use persistence::repositories::{FoodRepository, RecipeRepository};

/// Recipe response with its food block resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResponse {
    pub id: Uuid,
    pub name: String,
    pub food: FoodDetails,
    pub description: String,
    pub html_content: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RecipeWithFoodEntity> for RecipeResponse {
    fn from(entity: RecipeWithFoodEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            food: FoodDetails {
                id: entity.food_id,
                name: entity.food_name,
                category: entity.category_name,
                unit: entity.unit_name,
                image: entity.food_image,
            },
            description: entity.description,
            html_content: entity.html_content,
            created_by: entity.created_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Request body for recipe creation.
///
/// `html_content` is stored as an opaque blob; the server never parses it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    pub food_name: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub html_content: Option<String>,
}

/// Create a recipe for an existing food.
///
/// POST /api/recipe
pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<CreateRecipeRequest>,
) -> Result<Response, ApiError> {
    let (Some(food_name), Some(name)) = (request.food_name.as_deref(), request.name.as_deref())
    else {
        return Err(ApiError::validation(
            "00350",
            "Vui lòng cung cấp tất cả các trường bắt buộc.",
        ));
    };

    if food_name.is_empty() {
        return Err(ApiError::validation(
            "00351",
            "Vui lòng cung cấp một tên thực phẩm hợp lệ.",
        ));
    }

    if name.is_empty() {
        return Err(ApiError::validation(
            "00352",
            "Vui lòng cung cấp một tên công thức hợp lệ.",
        ));
    }

    let group_id = require_group_id(&user)?;
    let foods = FoodRepository::new(state.pool.clone());
    let food = foods
        .find_by_name(group_id, food_name)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00354",
            message: "Không tìm thấy thực phẩm với tên đã cung cấp.",
        })?;

    let recipes = RecipeRepository::new(state.pool.clone());
    let recipe = recipes
        .create(
            name,
            food.id,
            request.description.as_deref().unwrap_or(""),
            request.html_content.as_deref().unwrap_or(""),
            Some(user.id),
        )
        .await?;

    let populated = recipes
        .find_with_food(recipe.id)
        .await?
        .ok_or_else(|| ApiError::Internal("created recipe vanished".to_string()))?;

    Ok(response::created(
        "00357",
        "Thêm công thức nấu ăn thành công.",
        RecipeResponse::from(populated),
    ))
}

/// Query parameters for the recipe listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeQuery {
    pub food_id: Option<Uuid>,
}

/// List recipes, optionally for one food, newest first.
///
/// GET /api/recipe
pub async fn get_recipes(
    State(state): State<AppState>,
    Query(query): Query<RecipeQuery>,
) -> Result<Response, ApiError> {
    let recipes = RecipeRepository::new(state.pool.clone());
    let list: Vec<RecipeResponse> = recipes
        .list(query.food_id)
        .await?
        .into_iter()
        .map(RecipeResponse::from)
        .collect();

    Ok(response::ok("00378", "Lấy các công thức thành công.", list))
}

/// Request body for recipe updates.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    pub recipe_id: Option<Uuid>,
    pub new_food_name: Option<String>,
    pub new_name: Option<String>,
    pub new_description: Option<String>,
    pub new_html_content: Option<String>,
}

/// Update a recipe.
///
/// PUT /api/recipe
pub async fn update_recipe(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<UpdateRecipeRequest>,
) -> Result<Response, ApiError> {
    let Some(recipe_id) = request.recipe_id else {
        return Err(ApiError::validation(
            "00359",
            "Vui lòng cung cấp một ID công thức!",
        ));
    };

    if request.new_food_name.is_none()
        && request.new_name.is_none()
        && request.new_description.is_none()
        && request.new_html_content.is_none()
    {
        return Err(ApiError::validation(
            "00360",
            "Vui lòng cung cấp ít nhất một trong các trường sau, newFoodName, newDescription, newHtmlContent, newName.",
        ));
    }

    if let Some(new_name) = request.new_name.as_deref() {
        if new_name.is_empty() {
            return Err(ApiError::validation(
                "00364",
                "Vui lòng cung cấp một tên công thức mới hợp lệ!",
            ));
        }
    }

    let recipes = RecipeRepository::new(state.pool.clone());
    let recipe = recipes
        .find_by_id(recipe_id)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00365",
            message: "Không tìm thấy công thức với ID đã cung cấp.",
        })?;

    let new_food_id = match request.new_food_name.as_deref() {
        Some(new_food_name) => {
            let group_id = require_group_id(&user)?;
            let foods = FoodRepository::new(state.pool.clone());
            Some(
                foods
                    .find_by_name(group_id, new_food_name)
                    .await?
                    .ok_or(ApiError::NotFound {
                        code: "00367",
                        message: "Tên thực phẩm mới không tồn tại.",
                    })?
                    .id,
            )
        }
        None => None,
    };

    let updated = recipes
        .update(
            recipe.id,
            request.new_name.as_deref(),
            new_food_id,
            request.new_description.as_deref(),
            request.new_html_content.as_deref(),
        )
        .await?;

    let populated = recipes
        .find_with_food(updated.id)
        .await?
        .ok_or_else(|| ApiError::Internal("updated recipe vanished".to_string()))?;

    Ok(response::ok(
        "00370",
        "Cập nhật công thức nấu ăn thành công.",
        RecipeResponse::from(populated),
    ))
}

/// Request body for recipe deletion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRecipeRequest {
    pub recipe_id: Option<Uuid>,
}

/// Delete a recipe.
///
/// DELETE /api/recipe
pub async fn delete_recipe(
    State(state): State<AppState>,
    Json(request): Json<DeleteRecipeRequest>,
) -> Result<Response, ApiError> {
    let Some(recipe_id) = request.recipe_id else {
        return Err(ApiError::validation(
            "00372",
            "Vui lòng cung cấp một ID công thức hợp lệ.",
        ));
    };

    let recipes = RecipeRepository::new(state.pool.clone());
    let recipe = recipes
        .find_by_id(recipe_id)
        .await?
        .ok_or(ApiError::NotFound {
            code: "00373",
            message: "Không tìm thấy công thức với ID đã cung cấp.",
        })?;

    recipes.delete(recipe.id).await?;

    Ok(response::ok_empty(
        "00376",
        "Công thức của bạn đã được xóa thành công.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_recipe_request_camel_case() {
        let request: CreateRecipeRequest = serde_json::from_str(
            r#"{"foodName":"Gà","name":"Gà kho gừng","htmlContent":"<p>...</p>"}"#,
        )
        .unwrap();
        assert_eq!(request.food_name.as_deref(), Some("Gà"));
        assert_eq!(request.html_content.as_deref(), Some("<p>...</p>"));
    }

    #[test]
    fn test_update_recipe_request_allows_clearing_description() {
        // An explicit empty string is a real update, distinct from absent
        let request: UpdateRecipeRequest = serde_json::from_str(
            r#"{"recipeId":"550e8400-e29b-41d4-a716-446655440000","newDescription":""}"#,
        )
        .unwrap();
        assert_eq!(request.new_description.as_deref(), Some(""));
    }
}
