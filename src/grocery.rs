//! # Grocery Aggregator
//!
//! Merges ingredient demand from many recipes into one shopping list.
//!
//! ## Pipeline
//!
//! 1. Every item is resolved to its canonical ingredient key
//! 2. Items whose key or raw name is in the pantry are skipped
//! 3. Quantities are converted to grams and summed per key; items that cannot
//!    be converted flag their entry as unknown instead of being dropped
//! 4. Overrides remove entries or replace their displayed quantity, unit and aisle
//! 5. The list is sorted by `(aisle, name)`
//!
//! Entries are rebuilt from scratch on every call, so overrides only ever
//! change presentation and never leak into later aggregations.
//!
//! ## Usage
//!
//! ```rust
//! use recipe_grocer::grocery::{aggregate_grocery, Overrides};
//! use recipe_grocer::ingredient_db::IngredientDb;
//! use recipe_grocer::ingredient_model::{Recipe, RecipeItem};
//!
//! let db = IngredientDb::from_json_str(
//!     r#"{"flour": {"density_g_per_cup": 120, "aisle": "Baking"}}"#,
//! )?;
//! let recipes = vec![
//!     Recipe::new("bread", vec![RecipeItem::new("flour", "1 cup")]),
//!     Recipe::new("pancakes", vec![RecipeItem::new("Flour", "1 cup")]),
//! ];
//!
//! let list = aggregate_grocery(&db, &recipes, &Overrides::new(), &[] as &[&str]);
//! assert_eq!(list.items.len(), 1);
//! assert_eq!(list.items[0].quantity, "240");
//! assert_eq!(list.items[0].unit, "g");
//! assert_eq!(list.items[0].recipes, vec!["bread", "pancakes"]);
//! # Ok::<(), recipe_grocer::errors::IngredientDbError>(())
//! ```

use crate::ingredient_db::{normalize_name, IngredientDb};
use crate::ingredient_model::{display_round, is_truthy, value_text, Recipe};
use crate::mass_normalizer::to_grams;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Aisle used when neither the item nor the ingredient table names one
pub const DEFAULT_AISLE: &str = "Other";

/// Overrides keyed by canonical ingredient key
pub type Overrides = BTreeMap<String, ItemOverride>;

/// A user's manual correction for one aggregated item
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct ItemOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aisle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove: Option<bool>,
}

impl ItemOverride {
    /// Read the recognized override fields from any JSON value
    ///
    /// Unrecognized keys and null values are dropped; non-objects yield an
    /// empty override.
    pub fn from_value(value: &Value) -> Self {
        let Value::Object(fields) = value else {
            return Self::default();
        };
        let text = |key: &str| fields.get(key).filter(|v| !v.is_null()).map(value_text);

        Self {
            quantity: text("quantity"),
            unit: text("unit"),
            aisle: text("aisle"),
            remove: fields.get("remove").filter(|v| !v.is_null()).map(is_truthy),
        }
    }

    /// Override that drops the item from the list
    pub fn removal() -> Self {
        Self {
            remove: Some(true),
            ..Default::default()
        }
    }

    /// Override that replaces the displayed quantity and unit
    pub fn display(quantity: &str, unit: &str) -> Self {
        Self {
            quantity: Some(quantity.to_string()),
            unit: Some(unit.to_string()),
            ..Default::default()
        }
    }

    /// Set the aisle label
    pub fn with_aisle(mut self, aisle: &str) -> Self {
        self.aisle = Some(aisle.to_string());
        self
    }

    /// Check if no field is set
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.unit.is_none() && self.aisle.is_none() && self.remove.is_none()
    }

    /// Check if this override removes the item
    pub fn removes(&self) -> bool {
        self.remove == Some(true)
    }

    /// Check if this override replaces the displayed quantity/unit
    fn replaces_display(&self) -> bool {
        let set = |field: &Option<String>| field.as_deref().is_some_and(|s| !s.is_empty());
        set(&self.quantity) || set(&self.unit)
    }
}

impl From<Value> for ItemOverride {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

/// One raw contribution kept for fallback display
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub quantity: String,
    pub name: String,
}

/// Running demand for one canonical ingredient during a single aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateEntry {
    pub key: String,
    /// First raw name seen for this ingredient
    pub name: String,
    pub grams: f64,
    pub aisle: String,
    pub recipes: BTreeSet<String>,
    /// At least one contribution could not be converted to grams
    pub unknown: bool,
    pub raw_entries: Vec<RawEntry>,
}

/// One line of the shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroceryItem {
    pub name: String,
    pub quantity: String,
    pub unit: String,
    pub aisle: String,
    pub recipes: Vec<String>,
    pub unknown: bool,
    pub key: String,
}

/// Aggregated shopping list
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroceryList {
    pub items: Vec<GroceryItem>,
}

/// Read a pantry list from JSON, keeping only non-blank text entries
///
/// Strings are kept as given and numbers are rendered as text; nulls and
/// every other shape are skipped. Anything but an array yields an empty pantry.
pub fn pantry_from_value(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(_) | Value::Number(_) => Some(value_text(entry)),
            _ => None,
        })
        .filter(|name| !name.trim().is_empty())
        .collect()
}

/// Aggregate recipes into a sorted shopping list
pub fn aggregate_grocery<S: AsRef<str>>(
    db: &IngredientDb,
    recipes: &[Recipe],
    overrides: &Overrides,
    pantry: &[S],
) -> GroceryList {
    let entries = collect_entries(db, recipes, pantry);
    let entry_count = entries.len();

    let mut items: Vec<GroceryItem> = entries
        .into_iter()
        .filter_map(|entry| {
            let item_override = overrides.get(&entry.key);
            finalize_entry(entry, item_override)
        })
        .collect();

    items.sort_by(|a, b| (a.aisle.as_str(), a.name.as_str()).cmp(&(b.aisle.as_str(), b.name.as_str())));

    info!(
        "Aggregated {} recipes into {} grocery items ({} removed by overrides)",
        recipes.len(),
        items.len(),
        entry_count - items.len()
    );
    GroceryList { items }
}

/// Build one entry per canonical ingredient, in first-seen order
///
/// Items are visited recipe by recipe, item by item. Pantry items are
/// skipped without creating an entry.
pub fn collect_entries<S: AsRef<str>>(
    db: &IngredientDb,
    recipes: &[Recipe],
    pantry: &[S],
) -> Vec<AggregateEntry> {
    let pantry: HashSet<String> = pantry
        .iter()
        .map(|p| normalize_name(p.as_ref()))
        .filter(|p| !p.is_empty())
        .collect();

    let mut entries: Vec<AggregateEntry> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for recipe in recipes {
        for item in &recipe.items {
            let raw_name = item.name.trim();
            let quantity = item.composed_quantity();
            let resolved = db.resolve(raw_name);

            if pantry.contains(&resolved.key) || pantry.contains(&raw_name.to_lowercase()) {
                trace!("Skipping pantry item '{}' from '{}'", raw_name, recipe.name);
                continue;
            }

            let grams = to_grams(&quantity, &resolved.key, resolved.record);

            let position = *positions.entry(resolved.key.clone()).or_insert_with(|| {
                let aisle = item
                    .aisle
                    .clone()
                    .filter(|a| !a.is_empty())
                    .or_else(|| resolved.record.and_then(|r| r.aisle.clone()))
                    .unwrap_or_else(|| DEFAULT_AISLE.to_string());
                let name = if raw_name.is_empty() {
                    resolved.key.clone()
                } else {
                    raw_name.to_string()
                };
                entries.push(AggregateEntry {
                    key: resolved.key.clone(),
                    name,
                    grams: 0.0,
                    aisle,
                    recipes: BTreeSet::new(),
                    unknown: false,
                    raw_entries: Vec::new(),
                });
                entries.len() - 1
            });

            let entry = &mut entries[position];
            entry.recipes.insert(recipe.name.clone());
            entry.raw_entries.push(RawEntry {
                quantity,
                name: raw_name.to_string(),
            });
            match grams {
                Some(g) => entry.grams += g,
                None => entry.unknown = true,
            }
        }
    }

    debug!("Collected {} aggregate entries", entries.len());
    entries
}

/// Turn an entry into a list item, applying its override; `None` when removed
fn finalize_entry(entry: AggregateEntry, item_override: Option<&ItemOverride>) -> Option<GroceryItem> {
    if item_override.is_some_and(ItemOverride::removes) {
        debug!("Override removes '{}'", entry.key);
        return None;
    }

    let (quantity, unit) = match item_override.filter(|o| o.replaces_display()) {
        Some(o) => (
            o.quantity.as_deref().unwrap_or_default().trim().to_string(),
            o.unit.as_deref().unwrap_or_default().trim().to_string(),
        ),
        None if entry.grams > 0.0 => (display_round(entry.grams).to_string(), "g".to_string()),
        None => (
            entry
                .raw_entries
                .first()
                .map(|raw| raw.quantity.clone())
                .unwrap_or_default(),
            String::new(),
        ),
    };

    let aisle = item_override
        .and_then(|o| o.aisle.clone())
        .filter(|a| !a.is_empty())
        .unwrap_or(entry.aisle);

    Some(GroceryItem {
        name: entry.name,
        quantity,
        unit,
        aisle,
        recipes: entry.recipes.into_iter().collect(),
        unknown: entry.unknown,
        key: entry.key,
    })
}
