//! Domain layer for the Family Pantry backend.
//!
//! This crate contains the pure domain models: users and household groups,
//! the group-scoped food catalog, fridge inventory, shopping lists, meal
//! plans, and recipes. No I/O lives here.

pub mod models;
