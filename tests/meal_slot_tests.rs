//! # Meal Slot Tests
//!
//! Walks the meal dialog reducer through the flows a user goes through when
//! assembling a meal from a main dish and up to three side dishes.

use meal_planner::meal_slots::{
    reduce, MealDialogMode, MealFormError, MealSlotAction, MealSlotState, SavedMeal, LAST_SLOT, MAIN_SLOT,
};
use meal_planner::recipe_model::{RecipeCard, RecipeId};

#[cfg(test)]
mod tests {
    use super::*;

    fn main_dish(id: i64, name: &str) -> RecipeCard {
        RecipeCard::new(id, name).with_meal_type("dinner")
    }

    fn side_dish(id: i64, name: &str) -> RecipeCard {
        RecipeCard::new(id, name).with_meal_type("side")
    }

    fn run(state: MealSlotState, actions: Vec<MealSlotAction>) -> MealSlotState {
        actions.into_iter().fold(state, |state, action| reduce(&state, action))
    }

    #[test]
    fn test_auto_advance_through_all_slots() {
        let state = MealSlotState::new_create();
        assert_eq!(state.active_slot_index, MAIN_SLOT);

        let state = reduce(&state, MealSlotAction::AssignRecipe(main_dish(1, "Lasagna")));
        assert_eq!(state.active_slot_index, 1);

        let state = reduce(&state, MealSlotAction::AssignRecipe(side_dish(2, "Garlic Bread")));
        assert_eq!(state.active_slot_index, 2);

        let state = reduce(&state, MealSlotAction::AssignRecipe(side_dish(3, "Salad")));
        assert_eq!(state.active_slot_index, LAST_SLOT);

        let state = reduce(&state, MealSlotAction::AssignRecipe(side_dish(4, "Olives")));
        assert_eq!(state.active_slot_index, LAST_SLOT);
        assert!(state.is_complete());
    }

    #[test]
    fn test_name_autofill_then_manual_override() {
        let state = run(
            MealSlotState::new_create(),
            vec![MealSlotAction::AssignRecipe(main_dish(1, "Lasagna"))],
        );
        assert_eq!(state.meal_name, "Lasagna");
        assert!(!state.has_manual_name);

        let state = run(
            state,
            vec![
                MealSlotAction::SetMealName("Sunday Dinner".to_string()),
                MealSlotAction::SelectSlot(MAIN_SLOT),
                MealSlotAction::AssignRecipe(main_dish(5, "Tacos")),
            ],
        );
        assert!(state.has_manual_name);
        assert_eq!(state.meal_name, "Sunday Dinner");
        assert_eq!(state.slot(MAIN_SLOT).map(|r| r.name.as_str()), Some("Tacos"));
    }

    #[test]
    fn test_second_main_overwrites_autofilled_name() {
        let state = run(
            MealSlotState::new_create(),
            vec![
                MealSlotAction::AssignRecipe(main_dish(1, "Lasagna")),
                MealSlotAction::SelectSlot(MAIN_SLOT),
                MealSlotAction::AssignRecipe(main_dish(2, "Tacos")),
            ],
        );
        assert_eq!(state.meal_name, "Tacos");
    }

    #[test]
    fn test_clearing_main_resets_autofilled_name() {
        let state = run(
            MealSlotState::new_create(),
            vec![
                MealSlotAction::AssignRecipe(main_dish(1, "Lasagna")),
                MealSlotAction::ClearSlot(MAIN_SLOT),
            ],
        );
        assert_eq!(state.meal_name, "");
        assert!(state.slot(MAIN_SLOT).is_none());
    }

    #[test]
    fn test_clearing_main_keeps_manual_name() {
        let state = run(
            MealSlotState::new_create(),
            vec![
                MealSlotAction::AssignRecipe(main_dish(1, "Lasagna")),
                MealSlotAction::SetMealName("Family Night".to_string()),
                MealSlotAction::ClearSlot(MAIN_SLOT),
            ],
        );
        assert_eq!(state.meal_name, "Family Night");
    }

    #[test]
    fn test_reduce_does_not_mutate_input() {
        let original = MealSlotState::new_create();
        let snapshot = original.clone();
        let _ = reduce(&original, MealSlotAction::AssignRecipe(main_dish(1, "Lasagna")));
        assert_eq!(original, snapshot);
    }

    #[test]
    fn test_edit_mode_round_trip() {
        let recipes = vec![
            main_dish(1, "Lasagna"),
            side_dish(2, "Garlic Bread"),
            side_dish(3, "Salad"),
        ];
        let saved = SavedMeal {
            id: RecipeId::from(10),
            name: "Italian Night".to_string(),
            main_recipe_id: RecipeId::from(1),
            side_recipe_ids: vec![RecipeId::from(2), RecipeId::from(3)],
        };

        let state = MealSlotState::for_edit(&saved, &recipes);
        assert_eq!(state.mode, MealDialogMode::Edit);
        assert_eq!(state.slot(2).map(|r| r.name.as_str()), Some("Salad"));

        let state = run(
            state,
            vec![
                MealSlotAction::ClearSlot(MAIN_SLOT),
                MealSlotAction::SelectSlot(MAIN_SLOT),
                MealSlotAction::AssignRecipe(main_dish(4, "Risotto")),
            ],
        );
        assert_eq!(state.meal_name, "Italian Night");

        let request = state.to_request().unwrap();
        assert_eq!(request.name, "Italian Night");
        assert_eq!(request.main_recipe_id, RecipeId::from(4));
        assert_eq!(request.side_recipe_ids, vec![RecipeId::from(2), RecipeId::from(3)]);
    }

    #[test]
    fn test_submit_requires_main_and_name() {
        let empty = MealSlotState::new_create();
        assert_eq!(empty.to_request(), Err(MealFormError::MissingName));

        let named = reduce(&empty, MealSlotAction::SetMealName("Brunch".to_string()));
        assert_eq!(named.to_request(), Err(MealFormError::MissingMainDish));

        let too_long = reduce(&empty, MealSlotAction::SetMealName("x".repeat(256)));
        assert_eq!(too_long.to_request(), Err(MealFormError::NameTooLong));
    }
}
