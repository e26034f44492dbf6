//! # Grocery List State Manager
//!
//! Pure transforms over a user's persisted grocery list document:
//!
//! ```json
//! {"recipes": [{"name": "...", "items": [...]}], "overrides": {"<key>": {"quantity": "...", "remove": true}}}
//! ```
//!
//! Each transform returns a new document and leaves the input untouched.
//! Storage of the document belongs to the caller.
//!
//! ## Invariants
//!
//! - At most one recipe per name, compared case-insensitively
//! - Overrides are independent of the recipes currently present; an override
//!   for an ingredient no recipe needs is inert, not deleted

use crate::grocery::{aggregate_grocery, GroceryList, ItemOverride, Overrides};
use crate::ingredient_db::IngredientDb;
use crate::ingredient_model::Recipe;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A user's stored grocery list: recipes plus per-item overrides
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct GroceryListDocument {
    pub recipes: Vec<Recipe>,
    pub overrides: Overrides,
}

impl GroceryListDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a stored document, tolerating missing or malformed parts
    ///
    /// Missing `recipes`/`overrides` become empty; recipe entries that are not
    /// objects are dropped, as are overrides with no recognized field.
    pub fn from_value(value: &Value) -> Self {
        let recipes = value
            .get("recipes")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.is_object())
                    .map(Recipe::from_value)
                    .collect()
            })
            .unwrap_or_default();

        let overrides = value
            .get("overrides")
            .and_then(Value::as_object)
            .map(|fields| {
                fields
                    .iter()
                    .map(|(key, fields)| (key.clone(), ItemOverride::from_value(fields)))
                    .filter(|(_, o)| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self { recipes, overrides }
    }

    /// Add a recipe, replacing any recipe with the same name
    pub fn upsert_recipe(&self, recipe: Recipe) -> Self {
        let mut doc = self.without_recipe(&recipe.name);
        debug!(
            "Upserting recipe '{}' with {} items ({} recipes before)",
            recipe.name,
            recipe.items.len(),
            self.recipes.len()
        );
        doc.recipes.push(recipe);
        doc
    }

    /// Drop the recipe with the given name; overrides are kept
    pub fn remove_recipe(&self, recipe_name: &str) -> Self {
        let doc = self.without_recipe(recipe_name);
        debug!(
            "Removed recipe '{}' ({} -> {} recipes)",
            recipe_name,
            self.recipes.len(),
            doc.recipes.len()
        );
        doc
    }

    /// Replace the override for `item_key`, or delete it when `fields` is empty
    ///
    /// Overrides are never merged: the new fields replace the old override wholesale.
    pub fn set_override(&self, item_key: &str, fields: ItemOverride) -> Self {
        let mut doc = self.clone();
        if fields.is_empty() {
            if doc.overrides.remove(item_key).is_some() {
                debug!("Cleared override for '{}'", item_key);
            }
        } else {
            debug!("Set override for '{}': {:?}", item_key, fields);
            doc.overrides.insert(item_key.to_string(), fields);
        }
        doc
    }

    /// [`set_override`](Self::set_override) with fields read from JSON
    pub fn set_override_value(&self, item_key: &str, fields: &Value) -> Self {
        self.set_override(item_key, ItemOverride::from_value(fields))
    }

    /// Aggregate the stored recipes with the stored overrides
    pub fn aggregate<S: AsRef<str>>(&self, db: &IngredientDb, pantry: &[S]) -> GroceryList {
        aggregate_grocery(db, &self.recipes, &self.overrides, pantry)
    }

    /// Names of the stored recipes, in insertion order
    pub fn recipe_names(&self) -> Vec<&str> {
        self.recipes.iter().map(|r| r.name.as_str()).collect()
    }

    fn without_recipe(&self, recipe_name: &str) -> Self {
        let target = recipe_name.trim().to_lowercase();
        Self {
            recipes: self
                .recipes
                .iter()
                .filter(|r| r.name.trim().to_lowercase() != target)
                .cloned()
                .collect(),
            overrides: self.overrides.clone(),
        }
    }
}

impl From<Value> for GroceryListDocument {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}
