//! # Filter Predicate Engine
//!
//! Decides which recipes a listing shows for a given search term and set of
//! faceted filters, and implements the quick filter pills as shortcuts that
//! write into the same filter state.
//!
//! ## Rules
//!
//! A recipe is shown when it passes every active clause:
//!
//! - **Search**: the name contains the search term (case-insensitive)
//! - **Facets**: category, meal type and dietary preference each match one of the selected values
//! - **Favorites**: the recipe is a favorite
//! - **Cook time**: the total time is at most the bound
//! - **New**: the recipe was created within the last N days
//!
//! ## Usage
//!
//! ```rust
//! use chrono::Utc;
//! use meal_planner::filter::{default_quick_filters, FilterEngine, FilterState};
//! use meal_planner::recipe_model::RecipeCard;
//!
//! let engine = FilterEngine::new(default_quick_filters());
//! let recipes = vec![
//!     RecipeCard::new(1, "Veggie Chili").with_dietary_preference("Vegan"),
//!     RecipeCard::new(2, "Beef Stew"),
//! ];
//!
//! let state = engine.toggle_quick_filter(&FilterState::default(), "vegan");
//! let shown = engine.apply(&recipes, &state, Utc::now());
//! assert_eq!(shown.len(), 1);
//! ```

use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::recipe_model::RecipeCard;
use crate::toggle::{toggle, toggle_facet};

/// Filters applied to a recipe listing. Empty sets and `None` bounds mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search_term: String,
    /// Lowercased category values
    pub categories: BTreeSet<String>,
    /// Lowercased meal type values
    pub meal_types: BTreeSet<String>,
    /// Lowercased dietary preference values
    pub dietary_preferences: BTreeSet<String>,
    pub favorites_only: bool,
    /// Inclusive upper bound on total time, in minutes
    pub max_cook_time: Option<u32>,
    /// Only recipes created within this many days
    pub new_days: Option<u32>,
    /// Ids of the quick filter pills currently switched on
    pub active_quick_filter_ids: BTreeSet<String>,
    /// Active pills whose activation changed the state. Only these undo their effect when switched off.
    pub applied_quick_filter_ids: BTreeSet<String>,
}

impl FilterState {
    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.to_string();
    }

    pub fn toggle_category(&mut self, category: &str) {
        self.categories = toggle_facet(&self.categories, category);
    }

    pub fn toggle_meal_type(&mut self, meal_type: &str) {
        self.meal_types = toggle_facet(&self.meal_types, meal_type);
    }

    pub fn toggle_dietary_preference(&mut self, preference: &str) {
        self.dietary_preferences = toggle_facet(&self.dietary_preferences, preference);
    }

    pub fn set_favorites_only(&mut self, favorites_only: bool) {
        self.favorites_only = favorites_only;
    }

    pub fn set_max_cook_time(&mut self, minutes: Option<u32>) {
        self.max_cook_time = minutes;
    }

    pub fn set_new_days(&mut self, days: Option<u32>) {
        self.new_days = days;
    }

    /// Back to the state a freshly opened page starts with
    pub fn reset(&mut self) {
        *self = FilterState::default();
    }

    /// Number of active clauses, for the "clear filters (N)" affordance
    pub fn active_count(&self) -> usize {
        usize::from(!self.search_term.trim().is_empty())
            + self.categories.len()
            + self.meal_types.len()
            + self.dietary_preferences.len()
            + usize::from(self.favorites_only)
            + usize::from(self.max_cook_time.is_some())
            + usize::from(self.new_days.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }
}

/// Whether `recipe` passes every active clause of `state`.
///
/// `now` anchors the "new within N days" clause. The predicate is total: a
/// recipe lacking a facet simply fails that facet's clause when it is active.
pub fn matches(recipe: &RecipeCard, state: &FilterState, now: DateTime<Utc>) -> bool {
    matches_search(recipe, &state.search_term)
        && matches_facet(recipe.category.as_deref(), &state.categories)
        && matches_facet(recipe.meal_type.as_deref(), &state.meal_types)
        && matches_facet(recipe.dietary_preference.as_deref(), &state.dietary_preferences)
        && (!state.favorites_only || recipe.is_favorite)
        && state.max_cook_time.map_or(true, |max| recipe.total_time <= max)
        && state.new_days.map_or(true, |days| is_new(recipe, days, now))
}

fn matches_search(recipe: &RecipeCard, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    recipe.name.to_lowercase().contains(&term.to_lowercase())
}

fn matches_facet(value: Option<&str>, selected: &BTreeSet<String>) -> bool {
    if selected.is_empty() {
        return true;
    }
    match value {
        Some(value) => {
            let folded = value.trim().to_lowercase();
            selected.iter().any(|s| s.to_lowercase() == folded)
        }
        None => false,
    }
}

/// A window reaching past the earliest representable date covers every dated recipe
fn is_new(recipe: &RecipeCard, days: u32, now: DateTime<Utc>) -> bool {
    let cutoff = Duration::try_days(i64::from(days)).and_then(|window| now.checked_sub_signed(window));
    recipe
        .created_at
        .is_some_and(|created| cutoff.map_or(true, |cutoff| created >= cutoff))
}

/// What a quick filter pill writes into the filter state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum QuickFilterKind {
    /// Adds a meal type value
    MealType(String),
    /// Adds a dietary preference value
    Dietary(String),
    /// Sets the maximum cook time, in minutes
    Time(u32),
    /// Restricts to favorites
    Favorite,
    /// Restricts to recipes created within N days
    New(u32),
}

/// A quick filter pill: an id, a localization key for its label, and its effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickFilterDefinition {
    pub id: String,
    pub label_key: String,
    #[serde(rename = "effect")]
    pub kind: QuickFilterKind,
}

impl QuickFilterDefinition {
    pub fn new(id: &str, label_key: &str, kind: QuickFilterKind) -> Self {
        Self {
            id: id.to_string(),
            label_key: label_key.to_string(),
            kind,
        }
    }

    /// Write this filter's effect into `state`, returning whether anything changed
    fn apply(&self, state: &mut FilterState) -> bool {
        match &self.kind {
            QuickFilterKind::MealType(value) => state.meal_types.insert(value.trim().to_lowercase()),
            QuickFilterKind::Dietary(value) => state.dietary_preferences.insert(value.trim().to_lowercase()),
            QuickFilterKind::Time(minutes) => {
                let changed = state.max_cook_time != Some(*minutes);
                state.max_cook_time = Some(*minutes);
                changed
            }
            QuickFilterKind::Favorite => !std::mem::replace(&mut state.favorites_only, true),
            QuickFilterKind::New(days) => {
                let changed = state.new_days != Some(*days);
                state.new_days = Some(*days);
                changed
            }
        }
    }

    /// Undo exactly what `apply` wrote. A scalar overwritten since then is left alone.
    fn reverse(&self, state: &mut FilterState) {
        match &self.kind {
            QuickFilterKind::MealType(value) => {
                state.meal_types.remove(&value.trim().to_lowercase());
            }
            QuickFilterKind::Dietary(value) => {
                state.dietary_preferences.remove(&value.trim().to_lowercase());
            }
            QuickFilterKind::Time(minutes) => {
                if state.max_cook_time == Some(*minutes) {
                    state.max_cook_time = None;
                }
            }
            QuickFilterKind::Favorite => state.favorites_only = false,
            QuickFilterKind::New(days) => {
                if state.new_days == Some(*days) {
                    state.new_days = None;
                }
            }
        }
    }

    /// Whether the state still carries this filter's effect
    fn holds_in(&self, state: &FilterState) -> bool {
        match &self.kind {
            QuickFilterKind::MealType(value) => {
                state.meal_types.contains(&value.trim().to_lowercase())
            }
            QuickFilterKind::Dietary(value) => state
                .dietary_preferences
                .contains(&value.trim().to_lowercase()),
            QuickFilterKind::Time(minutes) => state.max_cook_time == Some(*minutes),
            QuickFilterKind::Favorite => state.favorites_only,
            QuickFilterKind::New(days) => state.new_days == Some(*days),
        }
    }

    /// Scalar filters write a single field, so two of the same kind cannot both hold
    fn shares_scalar_with(&self, other: &QuickFilterDefinition) -> bool {
        matches!(
            (&self.kind, &other.kind),
            (QuickFilterKind::Time(_), QuickFilterKind::Time(_))
                | (QuickFilterKind::New(_), QuickFilterKind::New(_))
        )
    }
}

/// The quick filter pills shown when no custom definitions are configured
pub fn default_quick_filters() -> Vec<QuickFilterDefinition> {
    vec![
        QuickFilterDefinition::new("favorites", "quick-filter-favorites", QuickFilterKind::Favorite),
        QuickFilterDefinition::new("quick", "quick-filter-quick", QuickFilterKind::Time(30)),
        QuickFilterDefinition::new("new", "quick-filter-new", QuickFilterKind::New(7)),
        QuickFilterDefinition::new(
            "vegetarian",
            "quick-filter-vegetarian",
            QuickFilterKind::Dietary("vegetarian".to_string()),
        ),
        QuickFilterDefinition::new("vegan", "quick-filter-vegan", QuickFilterKind::Dietary("vegan".to_string())),
        QuickFilterDefinition::new("sides", "quick-filter-sides", QuickFilterKind::MealType("side".to_string())),
    ]
}

/// Filter engine holding the immutable quick filter definitions
#[derive(Debug, Clone)]
pub struct FilterEngine {
    definitions: Vec<QuickFilterDefinition>,
}

impl FilterEngine {
    pub fn new(definitions: Vec<QuickFilterDefinition>) -> Self {
        debug!("Creating FilterEngine with {} quick filters", definitions.len());
        Self { definitions }
    }

    pub fn definitions(&self) -> &[QuickFilterDefinition] {
        &self.definitions
    }

    pub fn definition(&self, id: &str) -> Option<&QuickFilterDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    pub fn matches(&self, recipe: &RecipeCard, state: &FilterState, now: DateTime<Utc>) -> bool {
        matches(recipe, state, now)
    }

    /// Recipes passing the filters, in their original order
    pub fn apply<'a>(
        &self,
        recipes: &'a [RecipeCard],
        state: &FilterState,
        now: DateTime<Utc>,
    ) -> Vec<&'a RecipeCard> {
        let shown: Vec<&RecipeCard> = recipes.iter().filter(|r| matches(r, state, now)).collect();
        debug!("Filters kept {} of {} recipes", shown.len(), recipes.len());
        shown
    }

    /// Switch a quick filter pill on or off, returning the new state.
    ///
    /// Switching on writes the pill's effect (and turns off any other pill
    /// writing the same scalar field). Switching off removes exactly that
    /// effect, and only if switching on had written it: a pill matching a
    /// value the sidebar already selected leaves that value in place.
    /// Unknown ids leave the state unchanged.
    pub fn toggle_quick_filter(&self, state: &FilterState, id: &str) -> FilterState {
        let Some(definition) = self.definition(id) else {
            warn!("Ignoring unknown quick filter id: {id}");
            return state.clone();
        };

        let mut next = state.clone();
        let id = id.to_string();
        let activating = !state.active_quick_filter_ids.contains(&id);
        next.active_quick_filter_ids = toggle(&state.active_quick_filter_ids, &id);

        if activating {
            let displaced: Vec<String> = self
                .definitions
                .iter()
                .filter(|other| other.id != definition.id && definition.shares_scalar_with(other))
                .map(|other| other.id.clone())
                .collect();
            for other in displaced {
                next.active_quick_filter_ids.remove(&other);
                next.applied_quick_filter_ids.remove(&other);
            }
            if definition.apply(&mut next) {
                next.applied_quick_filter_ids.insert(id);
            }
        } else if next.applied_quick_filter_ids.remove(&id) {
            definition.reverse(&mut next);
        }

        next
    }

    /// Drop active pill ids whose effect was since overwritten, e.g. by the
    /// sidebar cook time selector.
    pub fn reconcile(&self, state: &FilterState) -> FilterState {
        let mut next = state.clone();
        next.active_quick_filter_ids.retain(|id| {
            self.definition(id)
                .is_some_and(|definition| definition.holds_in(state))
        });
        let active = next.active_quick_filter_ids.clone();
        next.applied_quick_filter_ids.retain(|id| active.contains(id));
        next
    }

    /// Whether a pill is currently switched on
    pub fn is_active(&self, state: &FilterState, id: &str) -> bool {
        state.active_quick_filter_ids.contains(id)
    }
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(default_quick_filters())
    }
}

/// Listing sort orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NameAsc,
    NameDesc,
    /// Most recently created first, undated last
    Newest,
    /// Shortest total time first, unknown times last
    QuickestFirst,
    /// Favorites first, then by name
    FavoritesFirst,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" | "name-asc" => Ok(SortOrder::NameAsc),
            "name-desc" => Ok(SortOrder::NameDesc),
            "newest" => Ok(SortOrder::Newest),
            "quickest" => Ok(SortOrder::QuickestFirst),
            "favorites" => Ok(SortOrder::FavoritesFirst),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortOrder::NameAsc => "name-asc",
            SortOrder::NameDesc => "name-desc",
            SortOrder::Newest => "newest",
            SortOrder::QuickestFirst => "quickest",
            SortOrder::FavoritesFirst => "favorites",
        };
        write!(f, "{name}")
    }
}

fn by_name(a: &RecipeCard, b: &RecipeCard) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

/// Sort recipes in place. The sort is stable.
pub fn sort_recipes<R: AsRef<RecipeCard>>(recipes: &mut [R], order: SortOrder) {
    recipes.sort_by(|a, b| {
        let (a, b) = (a.as_ref(), b.as_ref());
        match order {
            SortOrder::NameAsc => by_name(a, b),
            SortOrder::NameDesc => by_name(b, a),
            SortOrder::Newest => match (a.created_at, b.created_at) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortOrder::QuickestFirst => match (a.known_total_time(), b.known_total_time()) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortOrder::FavoritesFirst => b.is_favorite.cmp(&a.is_favorite).then_with(|| by_name(a, b)),
        }
    });
}

impl AsRef<RecipeCard> for RecipeCard {
    fn as_ref(&self) -> &RecipeCard {
        self
    }
}
