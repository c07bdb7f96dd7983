//! # Meal Planner
//!
//! Client-side logic of a recipe and meal planning app: quantity formatting,
//! recipe filtering with quick filters, meal assembly from a main dish and
//! side dishes, ingredient autocomplete and the shopping list, plus an async
//! client for the backend API.

pub mod api;
pub mod api_errors;
pub mod autocomplete;
pub mod circuit_breaker;
pub mod config;
pub mod filter;
pub mod localization;
pub mod meal_slots;
pub mod observability;
pub mod quantity;
pub mod recipe_model;
pub mod shopping;
pub mod toggle;
