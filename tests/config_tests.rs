//! # Configuration Tests
//!
//! Loading quick filter definitions from JSON files.

use meal_planner::config::{load_quick_filters, AppConfig};
use meal_planner::filter::{FilterEngine, FilterState, QuickFilterKind};
use std::io::Write;
use tempfile::NamedTempFile;

#[cfg(test)]
mod tests {
    use super::*;

    fn write_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const FILTERS_JSON: &str = r#"[
        {"id": "weeknight", "label_key": "quick-filter-quick", "effect": {"type": "time", "value": 20}},
        {"id": "sides", "label_key": "quick-filter-sides", "effect": {"type": "mealType", "value": "side"}},
        {"id": "faves", "label_key": "quick-filter-favorites", "effect": {"type": "favorite"}}
    ]"#;

    #[test]
    fn test_load_quick_filters() {
        let file = write_json(FILTERS_JSON);
        let filters = load_quick_filters(file.path()).unwrap();

        assert_eq!(filters.len(), 3);
        assert_eq!(filters[0].kind, QuickFilterKind::Time(20));
        assert_eq!(filters[1].kind, QuickFilterKind::MealType("side".to_string()));
        assert_eq!(filters[2].kind, QuickFilterKind::Favorite);

        let engine = FilterEngine::new(filters);
        let state = engine.toggle_quick_filter(&FilterState::default(), "weeknight");
        assert_eq!(state.max_cook_time, Some(20));
    }

    #[test]
    fn test_quick_filters_from_environment_lookup() {
        let file = write_json(FILTERS_JSON);
        let path = file.path().to_string_lossy().to_string();
        let config = AppConfig::from_lookup(|key| match key {
            "MEAL_PLANNER_API_URL" => Some("http://localhost:8000/api/".to_string()),
            "MEAL_PLANNER_QUICK_FILTERS" => Some(path.clone()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.quick_filters.len(), 3);
    }

    #[test]
    fn test_rejects_bad_files() {
        let duplicate = write_json(
            r#"[
                {"id": "a", "label_key": "x", "effect": {"type": "time", "value": 20}},
                {"id": "a", "label_key": "y", "effect": {"type": "new", "value": 7}}
            ]"#,
        );
        assert!(load_quick_filters(duplicate.path()).is_err());

        let unknown_kind = write_json(r#"[{"id": "a", "label_key": "x", "effect": {"type": "spicy"}}]"#);
        assert!(load_quick_filters(unknown_kind.path()).is_err());

        let not_json = write_json("favorites, quick");
        assert!(load_quick_filters(not_json.path()).is_err());

        assert!(load_quick_filters(std::path::Path::new("/nonexistent/quick_filters.json")).is_err());
    }
}
