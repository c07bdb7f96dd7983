//! # Recipe Data Model
//!
//! Typed projections of the recipes the backend returns, and the
//! parse-or-reject boundary that turns loosely shaped JSON into them.
//!
//! ## Core Concepts
//!
//! - **RecipeCard**: the read-mostly recipe projection used by lists, filters and the meal dialog
//! - **RecipeIngredient**: one ingredient line of a recipe
//! - **DishRole**: main or side dish, derived from the meal type
//! - **RecipeCardDto**: the wire shape, converted with `RecipeCard::try_from`
//!
//! ## Usage
//!
//! ```rust
//! use meal_planner::recipe_model::{DishRole, RecipeCard};
//!
//! let salad = RecipeCard::new(7, "Green Salad")
//!     .with_meal_type("Side")
//!     .with_total_time(10);
//!
//! assert_eq!(salad.dish_role(), DishRole::Side);
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::quantity::parse_quantity;

/// Meal type value that routes a recipe into the side dish bucket
pub const SIDE_MEAL_TYPE: &str = "side";

/// Maximum accepted length of a recipe name
pub const MAX_RECIPE_NAME_LENGTH: usize = 255;

/// Backend identifier of a recipe, numeric or textual
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipeId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeId::Numeric(id) => write!(f, "{id}"),
            RecipeId::Text(id) => write!(f, "{id}"),
        }
    }
}

impl From<i64> for RecipeId {
    fn from(id: i64) -> Self {
        RecipeId::Numeric(id)
    }
}

impl From<&str> for RecipeId {
    fn from(id: &str) -> Self {
        RecipeId::Text(id.to_string())
    }
}

/// Whether a recipe is offered for the main slot or the side slots of a meal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DishRole {
    Main,
    Side,
}

/// One ingredient line of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    /// Ingredient name (e.g., "flour")
    pub name: String,
    /// Amount, `None` when unknown or unparseable
    pub quantity: Option<f64>,
    /// Unit as typed (e.g., "cup", "g")
    pub unit: Option<String>,
    /// Shopping category (e.g., "Produce")
    pub category: Option<String>,
}

/// Recipe projection used by listings, filters and meal assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeCard {
    pub id: RecipeId,
    pub name: String,
    /// Number of servings, 0 when unknown
    pub servings: u32,
    /// Total time in minutes, 0 when unknown
    pub total_time: u32,
    pub category: Option<String>,
    pub meal_type: Option<String>,
    pub dietary_preference: Option<String>,
    pub is_favorite: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub ingredients: Vec<RecipeIngredient>,
}

impl RecipeCard {
    /// Create a recipe card with just an id and a name
    pub fn new(id: impl Into<RecipeId>, name: &str) -> Self {
        Self {
            id: id.into(),
            name: name.to_string(),
            servings: 0,
            total_time: 0,
            category: None,
            meal_type: None,
            dietary_preference: None,
            is_favorite: false,
            created_at: None,
            ingredients: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_meal_type(mut self, meal_type: &str) -> Self {
        self.meal_type = Some(meal_type.to_string());
        self
    }

    pub fn with_dietary_preference(mut self, preference: &str) -> Self {
        self.dietary_preference = Some(preference.to_string());
        self
    }

    pub fn with_total_time(mut self, minutes: u32) -> Self {
        self.total_time = minutes;
        self
    }

    pub fn with_servings(mut self, servings: u32) -> Self {
        self.servings = servings;
        self
    }

    pub fn with_favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_ingredient(mut self, ingredient: RecipeIngredient) -> Self {
        self.ingredients.push(ingredient);
        self
    }

    /// Main or side dish. Only a meal type of "side" (any case) makes a side dish.
    pub fn dish_role(&self) -> DishRole {
        match &self.meal_type {
            Some(meal_type) if meal_type.trim().eq_ignore_ascii_case(SIDE_MEAL_TYPE) => {
                DishRole::Side
            }
            _ => DishRole::Main,
        }
    }

    pub fn is_side_dish(&self) -> bool {
        self.dish_role() == DishRole::Side
    }

    /// Total time for display, `None` when unknown
    pub fn known_total_time(&self) -> Option<u32> {
        (self.total_time > 0).then_some(self.total_time)
    }
}

/// Split recipes into (main dishes, side dishes), preserving order
pub fn partition_by_role(recipes: &[RecipeCard]) -> (Vec<&RecipeCard>, Vec<&RecipeCard>) {
    recipes.iter().partition(|recipe| recipe.dish_role() == DishRole::Main)
}

/// Quantity as the backend may send it: a number, a string, or null
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuantityDto {
    Number(f64),
    Text(String),
}

/// Wire shape of a recipe ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredientDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<QuantityDto>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Wire shape of a recipe card, accepting both camelCase and snake_case keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeCardDto {
    pub id: RecipeId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub servings: Option<i64>,
    #[serde(default, alias = "totalTime")]
    pub total_time: Option<i64>,
    #[serde(default, alias = "recipe_category")]
    pub category: Option<String>,
    #[serde(default, alias = "mealType")]
    pub meal_type: Option<String>,
    #[serde(default, alias = "dietaryPreference")]
    pub dietary_preference: Option<String>,
    #[serde(default, alias = "isFavorite")]
    pub is_favorite: Option<bool>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Vec<RecipeIngredientDto>>,
}

/// Reasons a backend payload is rejected at the model boundary
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Recipe name missing or blank
    MissingName(RecipeId),
    /// Recipe name longer than allowed
    NameTooLong(RecipeId),
    /// A count or duration was negative or out of range
    InvalidNumber { id: RecipeId, field: &'static str, value: i64 },
    /// `createdAt` could not be parsed as a date
    InvalidTimestamp { id: RecipeId, value: String },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::MissingName(id) => write!(f, "Recipe {id} has no name"),
            ModelError::NameTooLong(id) => write!(f, "Recipe {id} has a name longer than {MAX_RECIPE_NAME_LENGTH} characters"),
            ModelError::InvalidNumber { id, field, value } => {
                write!(f, "Recipe {id} has an invalid {field}: {value}")
            }
            ModelError::InvalidTimestamp { id, value } => {
                write!(f, "Recipe {id} has an invalid timestamp: {value}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

impl TryFrom<RecipeCardDto> for RecipeCard {
    type Error = ModelError;

    fn try_from(dto: RecipeCardDto) -> Result<Self, Self::Error> {
        let id = dto.id;

        let name = dto.name.map(|n| n.trim().to_string()).unwrap_or_default();
        if name.is_empty() {
            return Err(ModelError::MissingName(id));
        }
        if name.chars().count() > MAX_RECIPE_NAME_LENGTH {
            return Err(ModelError::NameTooLong(id));
        }

        let servings = non_negative(&id, "servings", dto.servings)?;
        let total_time = non_negative(&id, "totalTime", dto.total_time)?;

        let created_at = match dto.created_at.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_timestamp(raw).ok_or_else(|| ModelError::InvalidTimestamp {
                id: id.clone(),
                value: raw.to_string(),
            })?),
        };

        let ingredients = dto
            .ingredients
            .unwrap_or_default()
            .into_iter()
            .filter_map(|ingredient| convert_ingredient(&id, ingredient))
            .collect();

        Ok(RecipeCard {
            id,
            name,
            servings,
            total_time,
            category: non_blank(dto.category),
            meal_type: non_blank(dto.meal_type),
            dietary_preference: non_blank(dto.dietary_preference),
            is_favorite: dto.is_favorite.unwrap_or(false),
            created_at,
            ingredients,
        })
    }
}

/// Convert a batch of wire recipes, dropping (and logging) the rejected ones
pub fn convert_recipe_cards(dtos: Vec<RecipeCardDto>) -> Vec<RecipeCard> {
    dtos.into_iter()
        .filter_map(|dto| match RecipeCard::try_from(dto) {
            Ok(card) => Some(card),
            Err(e) => {
                warn!("Dropping recipe from backend payload: {e}");
                None
            }
        })
        .collect()
}

/// Decode and convert raw list entries one at a time, so a record that does
/// not match the wire shape (a fractional `totalTime`, a non-string name)
/// is dropped without failing the rest of the list.
pub fn convert_recipe_values(values: Vec<serde_json::Value>) -> Vec<RecipeCard> {
    let dtos = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RecipeCardDto>(value) {
            Ok(dto) => Some(dto),
            Err(e) => {
                warn!("Dropping malformed recipe from backend payload: {e}");
                None
            }
        })
        .collect();
    convert_recipe_cards(dtos)
}

/// Serde helper for quantities sent as a number, a string, or null.
/// Unparseable strings become `None`.
pub fn deserialize_optional_quantity<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<QuantityDto>::deserialize(deserializer)?;
    Ok(match raw {
        None => None,
        Some(QuantityDto::Number(n)) => n.is_finite().then_some(n),
        Some(QuantityDto::Text(text)) => parse_quantity(&text),
    })
}

fn non_negative(id: &RecipeId, field: &'static str, value: Option<i64>) -> Result<u32, ModelError> {
    match value {
        None => Ok(0),
        Some(v) => u32::try_from(v).map_err(|_| ModelError::InvalidNumber {
            id: id.clone(),
            field,
            value: v,
        }),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn convert_ingredient(id: &RecipeId, dto: RecipeIngredientDto) -> Option<RecipeIngredient> {
    let name = non_blank(dto.name)?;
    let quantity = match dto.quantity {
        None => None,
        Some(QuantityDto::Number(n)) if n.is_finite() => Some(n),
        Some(QuantityDto::Number(_)) => None,
        Some(QuantityDto::Text(text)) => {
            let parsed = parse_quantity(&text);
            if parsed.is_none() && !text.trim().is_empty() {
                warn!("Recipe {id}: unparseable quantity {text:?} for {name}");
            }
            parsed
        }
    };

    Some(RecipeIngredient {
        name,
        quantity,
        unit: non_blank(dto.unit),
        category: non_blank(dto.category),
    })
}

/// Parse an ISO-8601 timestamp; naive timestamps and bare dates are taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl fmt::Display for RecipeCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(minutes) = self.known_total_time() {
            write!(f, " ({minutes} min)")?;
        }
        if self.is_favorite {
            write!(f, " ★")?;
        }
        Ok(())
    }
}
