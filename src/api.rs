//! # Backend API
//!
//! Async access to the meal planner backend. The traits are the seams the
//! rest of the crate depends on; [`client::ApiClient`] implements them over
//! HTTP, and tests substitute in-memory doubles.

pub mod client;
pub mod dto;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::api_errors::ApiError;
use crate::meal_slots::{MealRequest, SavedMeal};
use crate::recipe_model::{RecipeCard, RecipeId};
use crate::shopping::{BreakdownEntry, ShoppingItem, ShoppingItemUpdate};

pub use client::ApiClient;
pub use dto::RecipePayload;

/// Recipe storage
#[async_trait]
pub trait RecipeBackend: Send + Sync {
    /// Recipes, optionally narrowed server-side to one category.
    /// Entries that fail to decode or validate are dropped one by one.
    async fn list_recipes(&self, category: Option<&str>) -> Result<Vec<RecipeCard>, ApiError>;

    async fn get_recipe(&self, id: &RecipeId) -> Result<RecipeCard, ApiError>;

    async fn create_recipe(&self, recipe: &RecipePayload) -> Result<RecipeCard, ApiError>;

    async fn update_recipe(&self, id: &RecipeId, recipe: &RecipePayload) -> Result<RecipeCard, ApiError>;

    async fn delete_recipe(&self, id: &RecipeId) -> Result<(), ApiError>;
}

/// Saved meals (a main dish plus up to three sides)
#[async_trait]
pub trait MealBackend: Send + Sync {
    async fn list_meals(&self) -> Result<Vec<SavedMeal>, ApiError>;

    async fn create_meal(&self, meal: &MealRequest) -> Result<SavedMeal, ApiError>;

    async fn update_meal(&self, id: &RecipeId, meal: &MealRequest) -> Result<SavedMeal, ApiError>;

    async fn delete_meal(&self, id: &RecipeId) -> Result<(), ApiError>;
}

/// Shopping list aggregated from the meal plan
#[async_trait]
pub trait ShoppingBackend: Send + Sync {
    async fn list_shopping_items(&self) -> Result<Vec<ShoppingItem>, ApiError>;

    /// Rebuild the list from the planner week starting at `start_date`
    async fn generate_from_planner(&self, start_date: NaiveDate) -> Result<Vec<ShoppingItem>, ApiError>;

    /// Per-recipe contributions to an aggregated item
    async fn get_breakdown(&self, id: i64) -> Result<Vec<BreakdownEntry>, ApiError>;

    async fn update_shopping_item(&self, id: i64, update: &ShoppingItemUpdate) -> Result<ShoppingItem, ApiError>;

    async fn delete_shopping_item(&self, id: i64) -> Result<(), ApiError>;

    /// Delete every checked item
    async fn clear_checked(&self) -> Result<(), ApiError>;
}
