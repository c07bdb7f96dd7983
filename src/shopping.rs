//! # Shopping List
//!
//! Items aggregated by the backend from the meal plan, grouped by category
//! for display, with optimistic check/flag toggles that are rolled back when
//! the backend rejects them.
//!
//! ## Usage
//!
//! ```rust
//! use meal_planner::shopping::{group_by_category, ShoppingItem};
//!
//! let items = vec![
//!     ShoppingItem::new(1, "Milk").with_category("Dairy"),
//!     ShoppingItem::new(2, "Napkins"),
//! ];
//! let groups = group_by_category(&items, "Other");
//! assert_eq!(groups[0].name, "Dairy");
//! assert_eq!(groups[1].name, "Other");
//! ```

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::api::ShoppingBackend;
use crate::api_errors::ApiError;
use crate::autocomplete::{Autocomplete, IngredientMatcher, KnownIngredient};
use crate::quantity::format_optional_quantity;
use crate::recipe_model::deserialize_optional_quantity;

/// A line of the shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_optional_quantity")]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub flagged: bool,
}

impl ShoppingItem {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            quantity: None,
            unit: None,
            category: None,
            checked: false,
            flagged: false,
        }
    }

    pub fn with_quantity(mut self, quantity: f64, unit: &str) -> Self {
        self.quantity = Some(quantity);
        self.unit = Some(unit.to_string()).filter(|u| !u.is_empty());
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Quantity and unit as shown next to the name, e.g. "1 1/2 cups"
    pub fn display_quantity(&self) -> String {
        display_quantity(self.quantity, self.unit.as_deref())
    }

    fn category_name(&self) -> Option<&str> {
        self.category.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

/// Format an optional quantity with its unit. Missing parts are left out.
pub fn display_quantity(quantity: Option<f64>, unit: Option<&str>) -> String {
    let amount = format_optional_quantity(quantity);
    let unit = unit.map(str::trim).unwrap_or_default();
    match (amount.is_empty(), unit.is_empty()) {
        (false, false) => format!("{amount} {unit}"),
        (false, true) => amount,
        (true, _) => unit.to_string(),
    }
}

/// Partial update sent for a toggle
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShoppingItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flagged: Option<bool>,
}

/// Contribution of one recipe to an aggregated item
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BreakdownEntry {
    #[serde(alias = "recipeName")]
    pub recipe_name: String,
    #[serde(default, deserialize_with = "deserialize_optional_quantity")]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// One line per contributing recipe: "Pancakes: 1 1/2 cups"
pub fn breakdown_tooltip(entries: &[BreakdownEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            let amount = display_quantity(entry.quantity, entry.unit.as_deref());
            if amount.is_empty() {
                entry.recipe_name.clone()
            } else {
                format!("{}: {}", entry.recipe_name, amount)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Items sharing a category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<'a> {
    pub name: String,
    pub items: Vec<&'a ShoppingItem>,
}

/// Group items by category. Categories are sorted alphabetically
/// (case-insensitive) with uncategorized items last under
/// `uncategorized_label`; inside a group unchecked items come first, then by name.
pub fn group_by_category<'a>(items: &'a [ShoppingItem], uncategorized_label: &str) -> Vec<CategoryGroup<'a>> {
    // "dairy" and "Dairy" share a group named after the spelling listed first
    let mut categories: BTreeMap<String, &str> = BTreeMap::new();
    for category in items.iter().filter_map(ShoppingItem::category_name) {
        categories.entry(category.to_lowercase()).or_insert(category);
    }

    let mut groups: Vec<CategoryGroup<'a>> = Vec::new();
    for (key, display) in categories {
        let members = items
            .iter()
            .filter(|item| item.category_name().map(str::to_lowercase).as_deref() == Some(key.as_str()))
            .collect();
        groups.push(CategoryGroup {
            name: display.to_string(),
            items: members,
        });
    }

    let uncategorized: Vec<&ShoppingItem> = items.iter().filter(|i| i.category_name().is_none()).collect();
    if !uncategorized.is_empty() {
        groups.push(CategoryGroup {
            name: uncategorized_label.to_string(),
            items: uncategorized,
        });
    }

    for group in &mut groups {
        group
            .items
            .sort_by_key(|item| (item.checked, item.name.to_lowercase()));
    }
    groups
}

/// Previous value of a toggled field, used to undo a failed update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemSnapshot {
    pub id: i64,
    pub field: ToggleField,
    pub previous: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleField {
    Checked,
    Flagged,
}

/// Client-side copy of the shopping list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShoppingListState {
    items: Vec<ShoppingItem>,
}

impl ShoppingListState {
    pub fn new(items: Vec<ShoppingItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ShoppingItem] {
        &self.items
    }

    pub fn item(&self, id: i64) -> Option<&ShoppingItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Replace the list with the backend's current items
    pub async fn refresh<B: ShoppingBackend + ?Sized>(&mut self, backend: &B) -> Result<(), ApiError> {
        self.items = backend.list_shopping_items().await?;
        debug!("Shopping list refreshed with {} items", self.items.len());
        Ok(())
    }

    /// Flip a field locally and return what it was. `None` for an unknown id.
    pub fn apply_toggle(&mut self, id: i64, field: ToggleField) -> Option<ItemSnapshot> {
        let item = self.items.iter_mut().find(|item| item.id == id)?;
        let slot = match field {
            ToggleField::Checked => &mut item.checked,
            ToggleField::Flagged => &mut item.flagged,
        };
        let previous = *slot;
        *slot = !previous;
        Some(ItemSnapshot { id, field, previous })
    }

    /// Restore the field recorded in `snapshot`, leaving the rest of the item alone
    pub fn rollback(&mut self, snapshot: ItemSnapshot) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == snapshot.id) {
            match snapshot.field {
                ToggleField::Checked => item.checked = snapshot.previous,
                ToggleField::Flagged => item.flagged = snapshot.previous,
            }
        }
    }

    pub async fn toggle_checked<B: ShoppingBackend + ?Sized>(&mut self, backend: &B, id: i64) -> Result<bool, ApiError> {
        self.toggle(backend, id, ToggleField::Checked).await
    }

    pub async fn toggle_flagged<B: ShoppingBackend + ?Sized>(&mut self, backend: &B, id: i64) -> Result<bool, ApiError> {
        self.toggle(backend, id, ToggleField::Flagged).await
    }

    /// Optimistic toggle: update locally, send, undo on failure.
    /// Returns `false` when no item has this id.
    async fn toggle<B: ShoppingBackend + ?Sized>(
        &mut self,
        backend: &B,
        id: i64,
        field: ToggleField,
    ) -> Result<bool, ApiError> {
        let Some(snapshot) = self.apply_toggle(id, field) else {
            warn!("Toggle requested for unknown shopping item {id}");
            return Ok(false);
        };

        let update = match field {
            ToggleField::Checked => ShoppingItemUpdate {
                checked: Some(!snapshot.previous),
                flagged: None,
            },
            ToggleField::Flagged => ShoppingItemUpdate {
                checked: None,
                flagged: Some(!snapshot.previous),
            },
        };

        match backend.update_shopping_item(id, &update).await {
            Ok(updated) => {
                if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
                    *item = updated;
                }
                Ok(true)
            }
            Err(err) => {
                warn!("Rolling back {field:?} on shopping item {id}: {err}");
                self.rollback(snapshot);
                Err(err)
            }
        }
    }

    /// Drop checked items locally, then ask the backend to delete them.
    /// The removed items are put back in place if the request fails.
    pub async fn clear_checked<B: ShoppingBackend + ?Sized>(&mut self, backend: &B) -> Result<usize, ApiError> {
        let previous = self.items.clone();
        self.items.retain(|item| !item.checked);
        let removed = previous.len() - self.items.len();
        if removed == 0 {
            return Ok(0);
        }

        match backend.clear_checked().await {
            Ok(()) => Ok(removed),
            Err(err) => {
                warn!("Restoring {removed} checked items after failed clear: {err}");
                self.items = previous;
                Err(err)
            }
        }
    }

    /// Autocomplete for the "add item" input, offering names already on the list
    pub fn item_autocomplete(&self) -> Autocomplete {
        let mut seen = HashSet::new();
        let known = self
            .items
            .iter()
            .filter(|item| seen.insert(item.name.to_lowercase()))
            .map(|item| {
                let ingredient = KnownIngredient::new(&item.name);
                match item.category_name() {
                    Some(category) => ingredient.with_category(category),
                    None => ingredient,
                }
            })
            .collect();
        Autocomplete::new(IngredientMatcher::default().with_create(true), known)
    }
}
