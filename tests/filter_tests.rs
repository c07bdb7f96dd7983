//! # Filter Engine Tests
//!
//! Conjunction of filter clauses, restoring results when a clause is
//! switched off, and quick filter pills layered on the filter state.

use chrono::{DateTime, Duration, TimeZone, Utc};
use meal_planner::filter::{
    default_quick_filters, matches, sort_recipes, FilterEngine, FilterState, QuickFilterDefinition, QuickFilterKind,
    SortOrder,
};
use meal_planner::recipe_model::RecipeCard;

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn recipes() -> Vec<RecipeCard> {
        vec![
            RecipeCard::new(1, "Chickpea Curry")
                .with_category("Dinner")
                .with_meal_type("main")
                .with_dietary_preference("Vegan")
                .with_total_time(25)
                .with_created_at(now() - Duration::days(2)),
            RecipeCard::new(2, "Roast Chicken")
                .with_category("Dinner")
                .with_meal_type("main")
                .with_total_time(90)
                .with_favorite(true)
                .with_created_at(now() - Duration::days(40)),
            RecipeCard::new(3, "Garlic Bread")
                .with_category("Bakery")
                .with_meal_type("Side")
                .with_dietary_preference("vegetarian")
                .with_total_time(15)
                .with_favorite(true),
            RecipeCard::new(4, "Green Salad")
                .with_meal_type("side")
                .with_dietary_preference("vegan")
                .with_total_time(10)
                .with_created_at(now() - Duration::days(6)),
        ]
    }

    fn ids(shown: &[&RecipeCard]) -> Vec<String> {
        shown.iter().map(|r| r.id.to_string()).collect()
    }

    fn states() -> Vec<FilterState> {
        let mut states = vec![FilterState::default()];

        let mut search = FilterState::default();
        search.set_search_term("  CHICK ");
        states.push(search);

        let mut facets = FilterState::default();
        facets.toggle_category("dinner");
        facets.toggle_dietary_preference("VEGAN");
        states.push(facets);

        let mut bounded = FilterState::default();
        bounded.set_max_cook_time(Some(20));
        bounded.set_favorites_only(true);
        states.push(bounded);

        let mut fresh = FilterState::default();
        fresh.set_new_days(Some(7));
        fresh.toggle_meal_type("side");
        states.push(fresh);

        states
    }

    #[test]
    fn test_matches_is_conjunction_of_clauses() {
        let now = now();
        for recipe in recipes() {
            for state in states() {
                let mut clauses = Vec::new();

                let mut only = FilterState::default();
                only.search_term = state.search_term.clone();
                clauses.push(only);

                let mut only = FilterState::default();
                only.categories = state.categories.clone();
                clauses.push(only);

                let mut only = FilterState::default();
                only.meal_types = state.meal_types.clone();
                clauses.push(only);

                let mut only = FilterState::default();
                only.dietary_preferences = state.dietary_preferences.clone();
                clauses.push(only);

                let mut only = FilterState::default();
                only.favorites_only = state.favorites_only;
                clauses.push(only);

                let mut only = FilterState::default();
                only.max_cook_time = state.max_cook_time;
                clauses.push(only);

                let mut only = FilterState::default();
                only.new_days = state.new_days;
                clauses.push(only);

                let expected = clauses.iter().all(|clause| matches(&recipe, clause, now));
                assert_eq!(matches(&recipe, &state, now), expected, "{recipe} with {state:?}");
            }
        }
    }

    #[test]
    fn test_clearing_a_clause_restores_results() {
        let engine = FilterEngine::default();
        let recipes = recipes();
        let mut state = FilterState::default();
        state.toggle_category("Dinner");
        let before = ids(&engine.apply(&recipes, &state, now()));

        state.set_max_cook_time(Some(30));
        assert_eq!(ids(&engine.apply(&recipes, &state, now())), vec!["1"]);

        state.set_max_cook_time(None);
        assert_eq!(ids(&engine.apply(&recipes, &state, now())), before);
    }

    #[test]
    fn test_facet_toggle_twice_restores_state() {
        let original = FilterState::default();
        let mut state = original.clone();
        state.toggle_meal_type("Side");
        assert!(state.meal_types.contains("side"));
        state.toggle_meal_type("side");
        assert_eq!(state, original);
    }

    #[test]
    fn test_new_days_window() {
        let engine = FilterEngine::default();
        let recipes = recipes();
        let mut state = FilterState::default();
        state.set_new_days(Some(7));
        assert_eq!(ids(&engine.apply(&recipes, &state, now())), vec!["1", "4"]);
    }

    #[test]
    fn test_quick_filter_order_independence() {
        let engine = FilterEngine::default();
        let pills = ["favorites", "quick", "new", "vegetarian", "vegan", "sides"];

        for a in pills {
            for b in pills {
                if a == b {
                    continue;
                }
                let ab = engine.toggle_quick_filter(&engine.toggle_quick_filter(&FilterState::default(), a), b);
                let ba = engine.toggle_quick_filter(&engine.toggle_quick_filter(&FilterState::default(), b), a);
                assert_eq!(ab, ba, "{a} then {b}");
            }
        }
    }

    #[test]
    fn test_quick_filter_toggle_off_restores_state() {
        let engine = FilterEngine::default();
        let mut base = FilterState::default();
        base.set_search_term("salad");
        base.toggle_category("dinner");

        for definition in engine.definitions() {
            let on = engine.toggle_quick_filter(&base, &definition.id);
            assert!(engine.is_active(&on, &definition.id));
            assert_ne!(on, base);
            let off = engine.toggle_quick_filter(&on, &definition.id);
            assert_eq!(off, base, "{}", definition.id);
        }
    }

    #[test]
    fn test_quick_pill_and_sidebar_share_cook_time() {
        let engine = FilterEngine::default();
        let state = engine.toggle_quick_filter(&FilterState::default(), "quick");
        assert_eq!(state.max_cook_time, Some(30));

        // The sidebar wins once it writes a different bound
        let mut state = state;
        state.set_max_cook_time(Some(60));
        let state = engine.reconcile(&state);
        assert!(!engine.is_active(&state, "quick"));
        assert_eq!(state.max_cook_time, Some(60));

        // Switching the pill off later does not clear the sidebar's bound
        let mut state = engine.toggle_quick_filter(&state, "quick");
        state.set_max_cook_time(Some(60));
        let state = engine.toggle_quick_filter(&state, "quick");
        assert_eq!(state.max_cook_time, Some(60));
    }

    #[test]
    fn test_quick_filters_narrow_the_listing() {
        let engine = FilterEngine::default();
        let recipes = recipes();
        let state = engine.toggle_quick_filter(&FilterState::default(), "vegan");
        let state = engine.toggle_quick_filter(&state, "sides");
        assert_eq!(ids(&engine.apply(&recipes, &state, now())), vec!["4"]);
        assert_eq!(state.active_count(), 2);
    }

    #[test]
    fn test_custom_definitions() {
        let engine = FilterEngine::new(vec![QuickFilterDefinition::new(
            "weeknight",
            "quick-filter-quick",
            QuickFilterKind::Time(20),
        )]);
        let state = engine.toggle_quick_filter(&FilterState::default(), "weeknight");
        assert_eq!(state.max_cook_time, Some(20));
        assert_eq!(engine.toggle_quick_filter(&state, "quick"), state);
        assert_ne!(default_quick_filters().len(), engine.definitions().len());
    }

    #[test]
    fn test_sort_filtered_listing() {
        let engine = FilterEngine::default();
        let recipes = recipes();
        let mut shown = engine.apply(&recipes, &FilterState::default(), now());

        sort_recipes(&mut shown, SortOrder::QuickestFirst);
        assert_eq!(ids(&shown), vec!["4", "3", "1", "2"]);

        sort_recipes(&mut shown, SortOrder::Newest);
        assert_eq!(ids(&shown), vec!["1", "4", "2", "3"]);
    }
}
