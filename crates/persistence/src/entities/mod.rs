//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod food;
pub mod fridge_item;
pub mod group;
pub mod meal_plan;
pub mod recipe;
pub mod reference;
pub mod shopping;
pub mod user;

pub use food::{FoodEntity, FoodWithRefsEntity};
pub use fridge_item::{FridgeItemEntity, FridgeItemWithFoodEntity, FridgeLocationDb};
pub use group::{GroupEntity, MemberWithUserEntity};
pub use meal_plan::{MealPlanEntity, MealPlanWithFoodEntity, MealTypeDb};
pub use recipe::{RecipeEntity, RecipeWithFoodEntity};
pub use reference::{CategoryEntity, UnitEntity};
pub use shopping::{ShoppingListEntity, ShoppingTaskEntity, ShoppingTaskWithFoodEntity};
pub use user::{UserEntity, UserRoleDb, UserWithGroupEntity};
