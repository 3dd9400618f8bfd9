//! Repository implementations for database operations.

pub mod food;
pub mod fridge;
pub mod group;
pub mod meal_plan;
pub mod recipe;
pub mod reference;
pub mod shopping;
pub mod user;

pub use food::FoodRepository;
pub use fridge::FridgeRepository;
pub use group::GroupRepository;
pub use meal_plan::MealPlanRepository;
pub use recipe::RecipeRepository;
pub use reference::ReferenceRepository;
pub use shopping::ShoppingRepository;
pub use user::{UserListQuery, UserRepository};

/// True when the error is a PostgreSQL unique-constraint violation (23505).
///
/// Pre-checked uniqueness rules (fridge merge, shopping-list get-or-create,
/// food vivification) can still lose a race to a concurrent insert; callers
/// treat this condition as retryable and fall back to re-reading the row the
/// winner created.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}
