//! # Shopping List Tests
//!
//! Optimistic toggles against an in-memory backend, including rollback when
//! the backend fails.

use async_trait::async_trait;
use chrono::NaiveDate;
use meal_planner::api::ShoppingBackend;
use meal_planner::api_errors::ApiError;
use meal_planner::shopping::{BreakdownEntry, ShoppingItem, ShoppingItemUpdate, ShoppingListState};
use std::sync::Mutex;

/// Backend double that records updates and can be told to fail
struct FakeBackend {
    items: Mutex<Vec<ShoppingItem>>,
    updates: Mutex<Vec<(i64, ShoppingItemUpdate)>>,
    fail_with: Option<ApiError>,
}

impl FakeBackend {
    fn new(items: Vec<ShoppingItem>) -> Self {
        Self {
            items: Mutex::new(items),
            updates: Mutex::new(Vec::new()),
            fail_with: None,
        }
    }

    fn failing(items: Vec<ShoppingItem>, error: ApiError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::new(items)
        }
    }

    fn check(&self) -> Result<(), ApiError> {
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ShoppingBackend for FakeBackend {
    async fn list_shopping_items(&self) -> Result<Vec<ShoppingItem>, ApiError> {
        Ok(self.items.lock().unwrap().clone())
    }

    async fn generate_from_planner(&self, _start_date: NaiveDate) -> Result<Vec<ShoppingItem>, ApiError> {
        self.check()?;
        Ok(self.items.lock().unwrap().clone())
    }

    async fn get_breakdown(&self, _id: i64) -> Result<Vec<BreakdownEntry>, ApiError> {
        Ok(Vec::new())
    }

    async fn update_shopping_item(&self, id: i64, update: &ShoppingItemUpdate) -> Result<ShoppingItem, ApiError> {
        self.updates.lock().unwrap().push((id, update.clone()));
        self.check()?;
        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(ApiError::Status {
                status: 404,
                message: "Not found".to_string(),
            })?;
        if let Some(checked) = update.checked {
            item.checked = checked;
        }
        if let Some(flagged) = update.flagged {
            item.flagged = flagged;
        }
        Ok(item.clone())
    }

    async fn delete_shopping_item(&self, id: i64) -> Result<(), ApiError> {
        self.check()?;
        self.items.lock().unwrap().retain(|item| item.id != id);
        Ok(())
    }

    async fn clear_checked(&self) -> Result<(), ApiError> {
        self.check()?;
        self.items.lock().unwrap().retain(|item| !item.checked);
        Ok(())
    }
}

fn items() -> Vec<ShoppingItem> {
    vec![
        ShoppingItem::new(1, "Flour").with_quantity(2.5, "cups").with_category("Baking"),
        ShoppingItem::new(2, "Eggs").with_quantity(6.0, "").with_category("Dairy"),
        ShoppingItem::new(3, "Milk").with_category("Dairy").with_checked(true),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_toggle_checked_confirmed_by_backend() {
        let backend = FakeBackend::new(items());
        let mut list = ShoppingListState::default();
        list.refresh(&backend).await.unwrap();

        assert!(list.toggle_checked(&backend, 1).await.unwrap());
        assert!(list.item(1).unwrap().checked);

        let updates = backend.updates.lock().unwrap();
        assert_eq!(
            updates.as_slice(),
            &[(
                1,
                ShoppingItemUpdate {
                    checked: Some(true),
                    flagged: None
                }
            )]
        );
    }

    #[tokio::test]
    async fn test_toggle_rolls_back_on_failure() {
        let backend = FakeBackend::failing(items(), ApiError::Network("connection reset".to_string()));
        let mut list = ShoppingListState::new(items());
        let before = list.clone();

        let err = list.toggle_flagged(&backend, 2).await.unwrap_err();
        assert_eq!(err.message_key(), "error-network");
        assert_eq!(list, before);

        let err = list.toggle_checked(&backend, 3).await.unwrap_err();
        assert!(err.is_transient());
        assert!(list.item(3).unwrap().checked);
    }

    #[tokio::test]
    async fn test_toggle_unknown_item_sends_nothing() {
        let backend = FakeBackend::new(items());
        let mut list = ShoppingListState::new(items());

        assert!(!list.toggle_checked(&backend, 42).await.unwrap());
        assert!(backend.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_checked() {
        let backend = FakeBackend::new(items());
        let mut list = ShoppingListState::new(items());

        assert_eq!(list.clear_checked(&backend).await.unwrap(), 1);
        assert!(list.item(3).is_none());
        assert_eq!(backend.items.lock().unwrap().len(), 2);

        // Nothing left to clear
        assert_eq!(list.clear_checked(&backend).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clear_checked_restores_on_failure() {
        let backend = FakeBackend::failing(
            items(),
            ApiError::Status {
                status: 500,
                message: "boom".to_string(),
            },
        );
        let mut list = ShoppingListState::new(items());

        assert!(list.clear_checked(&backend).await.is_err());
        assert_eq!(list.items(), items().as_slice());
    }

    #[tokio::test]
    async fn test_generated_items_display() {
        let backend = FakeBackend::new(items());
        let start = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let list = ShoppingListState::new(backend.generate_from_planner(start).await.unwrap());

        assert_eq!(list.item(1).unwrap().display_quantity(), "2 1/2 cups");
        assert_eq!(list.item(2).unwrap().display_quantity(), "6");
        assert_eq!(list.item(3).unwrap().display_quantity(), "");
    }

    #[test]
    fn test_item_autocomplete_offers_list_names() {
        let list = ShoppingListState::new(items());
        let mut autocomplete = list.item_autocomplete();

        autocomplete.set_input("mi");
        assert_eq!(autocomplete.suggestions().len(), 2);
        assert!(autocomplete.suggestions()[1].is_create_new());

        autocomplete.set_input("milk");
        assert_eq!(autocomplete.suggestions().len(), 1);
        assert!(autocomplete.suggestions()[0].is_exact());
    }

    #[test]
    fn test_items_deserialize_from_backend_json() {
        let items: Vec<ShoppingItem> = serde_json::from_str(
            r#"[
                {"id": 1, "name": "Flour", "quantity": "1 1/2", "unit": "cups", "category": "Baking", "checked": false},
                {"id": 2, "name": "Salt", "quantity": null},
                {"id": 3, "name": "Oil", "quantity": 0.25, "unit": "cup", "flagged": true}
            ]"#,
        )
        .unwrap();

        assert_eq!(items[0].quantity, Some(1.5));
        assert_eq!(items[1].quantity, None);
        assert!(!items[1].checked);
        assert!(items[2].flagged);
        assert_eq!(items[2].display_quantity(), "1/4 cup");
    }
}
