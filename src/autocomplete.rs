//! # Ingredient Autocomplete
//!
//! Suggests known ingredients while the user types an ingredient name, flags
//! an exact match, and offers to create a new ingredient when nothing
//! matches exactly. [`Autocomplete`] adds the keyboard navigation of the
//! suggestion list on top of [`IngredientMatcher`].
//!
//! ## Matching rules
//!
//! - [`MatchRule::WordPrefix`]: the input is a prefix of any word of the name
//!   ("pep" matches "Black Pepper", "ack" does not)
//! - [`MatchRule::Substring`]: the input appears anywhere in the name
//!   ("ack" matches "Black Pepper")
//!
//! Both are case-insensitive and ignore surrounding whitespace. Each call
//! site picks its rule explicitly; the default is `WordPrefix`.

use log::debug;
use serde::{Deserialize, Serialize};

/// How typed text is compared to ingredient names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchRule {
    #[default]
    WordPrefix,
    Substring,
}

/// An ingredient the user can pick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownIngredient {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl KnownIngredient {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }
}

/// One entry of the suggestion list
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestion {
    /// A known ingredient; `exact` when its name equals the input
    Existing { ingredient: KnownIngredient, exact: bool },
    /// Offer to create an ingredient named after the input
    CreateNew { name: String },
}

impl Suggestion {
    pub fn is_exact(&self) -> bool {
        matches!(self, Suggestion::Existing { exact: true, .. })
    }

    pub fn is_create_new(&self) -> bool {
        matches!(self, Suggestion::CreateNew { .. })
    }
}

/// What the user picked from the list
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Existing(KnownIngredient),
    Create(String),
}

/// Pure matcher producing the suggestion list for an input
#[derive(Debug, Clone, Default)]
pub struct IngredientMatcher {
    rule: MatchRule,
    allow_create: bool,
    limit: Option<usize>,
}

impl IngredientMatcher {
    pub fn new(rule: MatchRule) -> Self {
        Self {
            rule,
            allow_create: false,
            limit: None,
        }
    }

    /// Offer a "create new" entry when nothing matches exactly
    pub fn with_create(mut self, allow_create: bool) -> Self {
        self.allow_create = allow_create;
        self
    }

    /// Cap the number of existing ingredients suggested
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn rule(&self) -> MatchRule {
        self.rule
    }

    pub fn allows_create(&self) -> bool {
        self.allow_create
    }

    /// Whether `name` matches the typed `input` under this matcher's rule
    pub fn is_match(&self, name: &str, input: &str) -> bool {
        let input = input.trim().to_lowercase();
        if input.is_empty() {
            return false;
        }
        let name = name.to_lowercase();
        match self.rule {
            MatchRule::WordPrefix => name.split_whitespace().any(|word| word.starts_with(&input)),
            MatchRule::Substring => name.contains(&input),
        }
    }

    /// Suggestions for `input`: matching ingredients with the exact match
    /// first, then a "create new" entry when allowed and nothing matched
    /// exactly. Blank input yields no suggestions.
    pub fn suggestions(&self, candidates: &[KnownIngredient], input: &str) -> Vec<Suggestion> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let mut exact = Vec::new();
        let mut partial = Vec::new();
        for candidate in candidates {
            if is_exact_match(&candidate.name, trimmed) {
                exact.push(candidate);
            } else if self.is_match(&candidate.name, trimmed) {
                partial.push(candidate);
            }
        }

        let has_exact = !exact.is_empty();
        let mut suggestions: Vec<Suggestion> = exact
            .into_iter()
            .map(|ingredient| Suggestion::Existing {
                ingredient: ingredient.clone(),
                exact: true,
            })
            .chain(partial.into_iter().map(|ingredient| Suggestion::Existing {
                ingredient: ingredient.clone(),
                exact: false,
            }))
            .collect();

        if let Some(limit) = self.limit {
            suggestions.truncate(limit);
        }

        if self.allow_create && !has_exact {
            suggestions.push(Suggestion::CreateNew {
                name: trimmed.to_string(),
            });
        }

        debug!("{} suggestions for {trimmed:?}", suggestions.len());
        suggestions
    }
}

/// Case-insensitive equality of the trimmed input and a name
pub fn is_exact_match(name: &str, input: &str) -> bool {
    let input = input.trim();
    !input.is_empty() && name.trim().to_lowercase() == input.to_lowercase()
}

/// Keys handled by the suggestion list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    Enter,
    Escape,
    Tab,
}

/// Result of a key press
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyOutcome {
    pub selection: Option<Selection>,
    /// Whether the input should suppress the browser's default handling of the key
    pub prevent_default: bool,
}

/// Autocomplete input: text, suggestion list and highlighted entry
#[derive(Debug, Clone)]
pub struct Autocomplete {
    matcher: IngredientMatcher,
    candidates: Vec<KnownIngredient>,
    input: String,
    suggestions: Vec<Suggestion>,
    highlighted: Option<usize>,
    open: bool,
}

impl Autocomplete {
    pub fn new(matcher: IngredientMatcher, candidates: Vec<KnownIngredient>) -> Self {
        Self {
            matcher,
            candidates,
            input: String::new(),
            suggestions: Vec::new(),
            highlighted: None,
            open: false,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The user typed: recompute suggestions and open the list
    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
        self.suggestions = self.matcher.suggestions(&self.candidates, text);
        self.highlighted = None;
        self.open = !self.suggestions.is_empty();
    }

    /// Pick the suggestion at `index`. Out-of-range indices are a no-op.
    pub fn select(&mut self, index: usize) -> Option<Selection> {
        let selection = match self.suggestions.get(index)? {
            Suggestion::Existing { ingredient, .. } => Selection::Existing(ingredient.clone()),
            Suggestion::CreateNew { name } => Selection::Create(name.clone()),
        };

        self.input = match &selection {
            Selection::Existing(ingredient) => ingredient.name.clone(),
            Selection::Create(name) => name.clone(),
        };
        self.close();
        Some(selection)
    }

    fn close(&mut self) {
        self.open = false;
        self.highlighted = None;
    }

    fn existing_count(&self) -> usize {
        self.suggestions.iter().filter(|s| !s.is_create_new()).count()
    }

    /// Handle a key press in the input
    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        let count = self.suggestions.len();

        match key {
            Key::ArrowDown | Key::ArrowUp => {
                if count == 0 {
                    return KeyOutcome::default();
                }
                self.open = true;
                self.highlighted = Some(match (key, self.highlighted) {
                    (_, None) => 0,
                    (Key::ArrowDown, Some(i)) => (i + 1).min(count - 1),
                    (_, Some(i)) => i.saturating_sub(1),
                });
                KeyOutcome {
                    selection: None,
                    prevent_default: true,
                }
            }
            Key::Enter => {
                if !self.open {
                    return KeyOutcome::default();
                }
                let target = self
                    .highlighted
                    .or_else(|| {
                        (self.existing_count() == 1)
                            .then(|| self.suggestions.iter().position(|s| !s.is_create_new()))
                            .flatten()
                    })
                    .or_else(|| self.suggestions.iter().position(Suggestion::is_exact))
                    .or_else(|| self.suggestions.iter().position(Suggestion::is_create_new));

                let selection = target.and_then(|index| self.select(index));
                KeyOutcome {
                    prevent_default: selection.is_some(),
                    selection,
                }
            }
            Key::Escape => {
                let was_open = self.open;
                self.close();
                KeyOutcome {
                    selection: None,
                    prevent_default: was_open,
                }
            }
            Key::Tab => {
                let selection = if self.open {
                    self.highlighted.and_then(|index| self.select(index))
                } else {
                    None
                };
                self.close();
                KeyOutcome {
                    selection,
                    prevent_default: false,
                }
            }
        }
    }
}
