//! Domain models for the Family Pantry backend.

pub mod food;
pub mod fridge_item;
pub mod group;
pub mod meal_plan;
pub mod recipe;
pub mod reference;
pub mod shopping;
pub mod user;

pub use food::Food;
pub use fridge_item::{FridgeItem, FridgeLocation};
pub use group::Group;
pub use meal_plan::{MealPlan, MealType};
pub use recipe::Recipe;
pub use reference::{Category, Unit};
pub use shopping::{ShoppingList, ShoppingTask};
pub use user::{Gender, Language, User, UserRole};
