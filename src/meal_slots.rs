//! # Meal Slot Assembly
//!
//! State of the meal dialog: one main dish slot, three side dish slots, a
//! cursor on the slot the next picked recipe goes into, and the meal name.
//! All transitions go through the pure [`reduce`] function.
//!
//! ## Slots
//!
//! - Slot `0` is the main dish
//! - Slots `1..=3` are the side dishes `sides[0..=2]`
//!
//! ## Usage
//!
//! ```rust
//! use meal_planner::meal_slots::{reduce, MealSlotAction, MealSlotState};
//! use meal_planner::recipe_model::RecipeCard;
//!
//! let state = MealSlotState::new_create();
//! let state = reduce(&state, MealSlotAction::AssignRecipe(RecipeCard::new(1, "Lasagna")));
//!
//! assert_eq!(state.meal_name, "Lasagna");
//! assert_eq!(state.active_slot_index, 1);
//! ```

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::recipe_model::{DishRole, RecipeCard, RecipeId};

/// Number of side dish slots
pub const SIDE_SLOT_COUNT: usize = 3;

/// Index of the main dish slot
pub const MAIN_SLOT: usize = 0;

/// Highest valid slot index
pub const LAST_SLOT: usize = SIDE_SLOT_COUNT;

/// Maximum accepted length of a meal name
pub const MAX_MEAL_NAME_LENGTH: usize = 255;

/// Whether the dialog creates a new meal or edits an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealDialogMode {
    Create,
    Edit,
}

/// Slot contents, cursor and name of the meal being assembled
#[derive(Debug, Clone, PartialEq)]
pub struct MealSlotState {
    pub main: Option<RecipeCard>,
    pub sides: [Option<RecipeCard>; SIDE_SLOT_COUNT],
    /// 0 for the main slot, 1..=3 for `sides[index - 1]`
    pub active_slot_index: usize,
    pub meal_name: String,
    /// Set once the user typed into the name field (create mode only)
    pub has_manual_name: bool,
    pub mode: MealDialogMode,
}

/// Transitions of the meal dialog
#[derive(Debug, Clone, PartialEq)]
pub enum MealSlotAction {
    /// Move the cursor to a slot
    SelectSlot(usize),
    /// Put a recipe in the active slot, then advance the cursor
    AssignRecipe(RecipeCard),
    /// Empty a slot without moving the cursor
    ClearSlot(usize),
    /// The user edited the name field
    SetMealName(String),
}

/// A meal as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMeal {
    pub id: RecipeId,
    pub name: String,
    #[serde(alias = "mainRecipeId")]
    pub main_recipe_id: RecipeId,
    #[serde(default, alias = "sideRecipeIds")]
    pub side_recipe_ids: Vec<RecipeId>,
}

/// Body of a meal create or update request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRequest {
    pub name: String,
    pub main_recipe_id: RecipeId,
    pub side_recipe_ids: Vec<RecipeId>,
}

/// Reasons the meal form cannot be submitted
#[derive(Debug, Clone, PartialEq)]
pub enum MealFormError {
    MissingName,
    NameTooLong,
    MissingMainDish,
}

impl fmt::Display for MealFormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MealFormError::MissingName => write!(f, "Meal name is required"),
            MealFormError::NameTooLong => {
                write!(f, "Meal name must be at most {MAX_MEAL_NAME_LENGTH} characters")
            }
            MealFormError::MissingMainDish => write!(f, "A main dish is required"),
        }
    }
}

impl std::error::Error for MealFormError {}

impl MealFormError {
    /// Localization key of the message shown next to the form
    pub fn message_key(&self) -> &'static str {
        match self {
            MealFormError::MissingName => "meal-error-missing-name",
            MealFormError::NameTooLong => "meal-error-name-too-long",
            MealFormError::MissingMainDish => "meal-error-missing-main",
        }
    }
}

impl MealSlotState {
    /// Empty dialog for a new meal, cursor on the main slot
    pub fn new_create() -> Self {
        Self {
            main: None,
            sides: [None, None, None],
            active_slot_index: MAIN_SLOT,
            meal_name: String::new(),
            has_manual_name: false,
            mode: MealDialogMode::Create,
        }
    }

    /// Dialog pre-filled from a saved meal.
    ///
    /// Recipes referenced by the meal but missing from `recipes` leave their
    /// slot empty. Extra side ids beyond the slot count are ignored.
    pub fn for_edit(meal: &SavedMeal, recipes: &[RecipeCard]) -> Self {
        let find = |id: &RecipeId| recipes.iter().find(|r| &r.id == id).cloned();

        let mut sides: [Option<RecipeCard>; SIDE_SLOT_COUNT] = [None, None, None];
        for (slot, id) in sides.iter_mut().zip(meal.side_recipe_ids.iter()) {
            *slot = find(id);
            if slot.is_none() {
                warn!("Meal {} references unknown side recipe {id}", meal.id);
            }
        }
        if meal.side_recipe_ids.len() > SIDE_SLOT_COUNT {
            warn!(
                "Meal {} has {} side dishes, keeping the first {SIDE_SLOT_COUNT}",
                meal.id,
                meal.side_recipe_ids.len()
            );
        }

        Self {
            main: find(&meal.main_recipe_id),
            sides,
            active_slot_index: MAIN_SLOT,
            meal_name: meal.name.clone(),
            has_manual_name: false,
            mode: MealDialogMode::Edit,
        }
    }

    /// Recipe in slot `index`, `None` for empty or out-of-range slots
    pub fn slot(&self, index: usize) -> Option<&RecipeCard> {
        match index {
            MAIN_SLOT => self.main.as_ref(),
            i if i <= LAST_SLOT => self.sides[i - 1].as_ref(),
            _ => None,
        }
    }

    fn slot_mut(&mut self, index: usize) -> Option<&mut Option<RecipeCard>> {
        match index {
            MAIN_SLOT => Some(&mut self.main),
            i if i <= LAST_SLOT => Some(&mut self.sides[i - 1]),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.main.is_some() && self.sides.iter().all(Option::is_some)
    }

    /// Recipes offered by the picker for the active slot: main dishes for the
    /// main slot, side dishes for the side slots.
    pub fn slot_candidates<'a>(&self, recipes: &'a [RecipeCard]) -> Vec<&'a RecipeCard> {
        let wanted = if self.active_slot_index == MAIN_SLOT {
            DishRole::Main
        } else {
            DishRole::Side
        };
        recipes.iter().filter(|r| r.dish_role() == wanted).collect()
    }

    /// Validate the form and build the request body
    pub fn to_request(&self) -> Result<MealRequest, MealFormError> {
        let name = validate_meal_name(&self.meal_name)?;
        let main = self.main.as_ref().ok_or(MealFormError::MissingMainDish)?;

        Ok(MealRequest {
            name,
            main_recipe_id: main.id.clone(),
            side_recipe_ids: self.sides.iter().flatten().map(|r| r.id.clone()).collect(),
        })
    }

    /// Move the cursor after a recipe was written into slot `written`.
    ///
    /// The first empty side slot wins; failing that the main slot if it is
    /// still empty; otherwise the cursor stays put.
    fn auto_advance(&mut self, written: usize) {
        for (i, side) in self.sides.iter().enumerate() {
            if side.is_none() && i + 1 != written {
                self.active_slot_index = i + 1;
                return;
            }
        }
        if self.main.is_none() && self.active_slot_index != MAIN_SLOT {
            self.active_slot_index = MAIN_SLOT;
        }
    }
}

impl Default for MealSlotState {
    fn default() -> Self {
        Self::new_create()
    }
}

/// Validates a meal name input
pub fn validate_meal_name(name: &str) -> Result<String, MealFormError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(MealFormError::MissingName);
    }

    if trimmed.chars().count() > MAX_MEAL_NAME_LENGTH {
        return Err(MealFormError::NameTooLong);
    }

    Ok(trimmed.to_string())
}

/// Apply one action to the dialog state, returning the new state
pub fn reduce(state: &MealSlotState, action: MealSlotAction) -> MealSlotState {
    let mut next = state.clone();

    match action {
        MealSlotAction::SelectSlot(index) => {
            if index <= LAST_SLOT {
                next.active_slot_index = index;
            } else {
                warn!("Ignoring selection of out-of-range slot {index}");
            }
        }
        MealSlotAction::AssignRecipe(recipe) => {
            let written = next.active_slot_index;
            debug!("Assigning recipe {} to slot {written}", recipe.id);

            if written == MAIN_SLOT
                && next.mode == MealDialogMode::Create
                && !next.has_manual_name
            {
                next.meal_name = recipe.name.clone();
            }
            if let Some(slot) = next.slot_mut(written) {
                *slot = Some(recipe);
            }
            next.auto_advance(written);
        }
        MealSlotAction::ClearSlot(index) => match next.slot_mut(index) {
            Some(slot) => {
                *slot = None;
                if index == MAIN_SLOT
                    && next.mode == MealDialogMode::Create
                    && !next.has_manual_name
                {
                    next.meal_name.clear();
                }
            }
            None => warn!("Ignoring clear of out-of-range slot {index}"),
        },
        MealSlotAction::SetMealName(text) => {
            next.meal_name = text;
            if next.mode == MealDialogMode::Create {
                next.has_manual_name = true;
            }
        }
    }

    next
}
