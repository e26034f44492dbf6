//! # Ingredient and Quantity Data Model
//!
//! This module defines the records that flow through the grocery engine:
//! static ingredient metadata, the closed set of unit tokens, parsed
//! quantities, and the recipe/item shapes handed over by callers.
//!
//! ## Core Concepts
//!
//! - **IngredientRecord**: a canonical ingredient with aliases, per-100g macros and conversion factors
//! - **ParsedQuantity**: a numeric amount paired with a normalized [`Unit`]
//! - **RecipeItem**: one ingredient line of a recipe, normalized at the boundary
//! - **Recipe**: a named list of items with a serving count
//!
//! Caller input is loosely typed (ingredient entries may be bare strings or
//! records with alternate key names). [`RecipeItem`] and [`Recipe`] deserialize
//! through [`serde_json::Value`] so that no input shape is ever rejected.
//!
//! ## Usage
//!
//! ```rust
//! use recipe_grocer::ingredient_model::Recipe;
//! use serde_json::json;
//!
//! let recipe = Recipe::from_value(&json!({
//!     "name": "Pancakes",
//!     "ingredients": [{"ingredient": "flour", "qty": "1 cup"}, "salt"],
//! }));
//!
//! assert_eq!(recipe.items.len(), 2);
//! assert_eq!(recipe.items[0].name, "flour");
//! assert_eq!(recipe.items[0].quantity, "1 cup");
//! assert_eq!(recipe.items[1].quantity, "");
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::AddAssign;

/// Name given to recipes that arrive without one
pub const DEFAULT_RECIPE_NAME: &str = "recipe";

/// Macro nutrients expressed per 100 grams (or as running totals)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Macros {
    #[serde(default, deserialize_with = "lenient_non_negative")]
    pub calories: f64,
    #[serde(default, deserialize_with = "lenient_non_negative")]
    pub protein: f64,
    #[serde(default, deserialize_with = "lenient_non_negative")]
    pub carbs: f64,
    #[serde(default, deserialize_with = "lenient_non_negative")]
    pub fat: f64,
    #[serde(default, deserialize_with = "lenient_non_negative")]
    pub fiber: f64,
}

impl Macros {
    /// Multiply every macro by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            calories: self.calories * factor,
            protein: self.protein * factor,
            carbs: self.carbs * factor,
            fat: self.fat * factor,
            fiber: self.fiber * factor,
        }
    }

    /// Contribution of `grams` of an ingredient whose macros are given per 100g
    pub fn for_grams(&self, grams: f64) -> Self {
        self.scaled(grams / 100.0)
    }
}

impl AddAssign for Macros {
    fn add_assign(&mut self, other: Self) {
        self.calories += other.calories;
        self.protein += other.protein;
        self.carbs += other.carbs;
        self.fat += other.fat;
        self.fiber += other.fiber;
    }
}

/// Accepts numbers or numeric strings; anything else (or a negative value) reads as zero.
fn lenient_non_negative<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let number = match &value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if number.is_finite() { number.max(0.0) } else { 0.0 })
}

/// A canonical ingredient from the static metadata table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientRecord {
    /// Lowercase, trimmed canonical name (the aggregation key)
    pub canonical: String,

    /// Alternate names resolving to this record
    pub aliases: Vec<String>,

    /// Macros per 100 grams
    pub per_100g: Macros,

    /// Grams per US cup, when known
    pub density_g_per_cup: Option<f64>,

    /// Grams per discrete unit (one egg, one clove, one slice)
    pub count_g: Option<f64>,

    /// Store aisle label
    pub aisle: Option<String>,
}

/// Normalized measurement units recognized by the quantity parser
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Unit {
    // Mass units
    Grams,
    Milligrams,
    Kilograms,
    Ounces,
    Pounds,

    // Volume units
    Milliliters,
    Liters,
    Cups,
    Tablespoons,
    Teaspoons,

    // Discrete count units
    Cloves,
    Cans,
    Slices,
    Pieces,

    /// No unit word: a bare count ("2")
    Each,

    /// An unrecognized trailing word, kept verbatim
    Unknown(String),
}

impl Unit {
    /// The normalized unit token ("g", "tbsp", "" for a bare count, or the verbatim word)
    pub fn token(&self) -> &str {
        match self {
            Unit::Grams => "g",
            Unit::Milligrams => "mg",
            Unit::Kilograms => "kg",
            Unit::Ounces => "oz",
            Unit::Pounds => "lb",
            Unit::Milliliters => "ml",
            Unit::Liters => "l",
            Unit::Cups => "cup",
            Unit::Tablespoons => "tbsp",
            Unit::Teaspoons => "tsp",
            Unit::Cloves => "clove",
            Unit::Cans => "can",
            Unit::Slices => "slice",
            Unit::Pieces => "piece",
            Unit::Each => "",
            Unit::Unknown(word) => word,
        }
    }

    /// Check if this is a mass unit
    pub fn is_mass(&self) -> bool {
        matches!(
            self,
            Unit::Grams | Unit::Milligrams | Unit::Kilograms | Unit::Ounces | Unit::Pounds
        )
    }

    /// Check if this is a volume unit
    pub fn is_volume(&self) -> bool {
        matches!(
            self,
            Unit::Milliliters | Unit::Liters | Unit::Cups | Unit::Tablespoons | Unit::Teaspoons
        )
    }

    /// Check if this is a discrete count unit
    pub fn is_count(&self) -> bool {
        matches!(self, Unit::Cloves | Unit::Cans | Unit::Slices | Unit::Pieces)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// A numeric amount extracted from freeform quantity text
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuantity {
    /// Non-negative amount, possibly fractional
    pub amount: f64,
    /// Normalized unit
    pub unit: Unit,
}

impl ParsedQuantity {
    pub fn new(amount: f64, unit: Unit) -> Self {
        Self { amount, unit }
    }
}

/// One ingredient line of a recipe in canonical shape
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RecipeItem {
    pub name: String,
    pub quantity: String,
    pub unit: String,
    pub aisle: Option<String>,
}

impl RecipeItem {
    /// Create an item with a name and quantity text
    pub fn new(name: &str, quantity: &str) -> Self {
        Self {
            name: name.to_string(),
            quantity: quantity.to_string(),
            unit: String::new(),
            aisle: None,
        }
    }

    /// Set the unit word
    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    /// Set the aisle label
    pub fn with_aisle(mut self, aisle: &str) -> Self {
        self.aisle = Some(aisle.to_string());
        self
    }

    /// Coerce any JSON entry into an item.
    ///
    /// Objects accept `name`/`ingredient`/`item` for the name and
    /// `quantity`/`qty` for the amount; any other value becomes a bare name
    /// with empty quantity and unit.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(fields) => Self {
                name: first_text(fields, &["name", "ingredient", "item"]).unwrap_or_default(),
                quantity: first_text(fields, &["quantity", "qty"]).unwrap_or_default(),
                unit: first_text(fields, &["unit"]).unwrap_or_default(),
                aisle: first_text(fields, &["aisle"]),
            },
            Value::Null => Self::default(),
            Value::String(s) => Self::new(s, ""),
            other => Self::new(&other.to_string(), ""),
        }
    }

    /// Quantity and unit joined into a single string ("1 1/2 cup")
    pub fn composed_quantity(&self) -> String {
        let quantity = self.quantity.trim();
        let unit = self.unit.trim();
        if unit.is_empty() {
            quantity.to_string()
        } else {
            format!("{quantity} {unit}").trim().to_string()
        }
    }
}

impl From<Value> for RecipeItem {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

/// A named recipe with its ingredient items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Recipe {
    pub name: String,
    pub items: Vec<RecipeItem>,
    /// Always at least 1
    #[serde(skip_serializing)]
    pub servings: u32,
}

impl Recipe {
    /// Create a recipe serving one
    pub fn new(name: &str, items: Vec<RecipeItem>) -> Self {
        Self {
            name: name.to_string(),
            items,
            servings: 1,
        }
    }

    /// Set the serving count (values below 1 become 1)
    pub fn with_servings(mut self, servings: u32) -> Self {
        self.servings = servings.max(1);
        self
    }

    /// Coerce any JSON value into a recipe.
    ///
    /// Items are read from `items`, falling back to `ingredients`. The name
    /// defaults to [`DEFAULT_RECIPE_NAME`] and servings to 1.
    pub fn from_value(value: &Value) -> Self {
        let Value::Object(fields) = value else {
            return Self::new(DEFAULT_RECIPE_NAME, Vec::new());
        };

        let name = first_text(fields, &["name"]).unwrap_or_else(|| DEFAULT_RECIPE_NAME.to_string());
        let items = ["items", "ingredients"]
            .iter()
            .filter_map(|key| fields.get(*key))
            .find(|v| is_truthy(v))
            .and_then(Value::as_array)
            .map(|entries| entries.iter().map(RecipeItem::from_value).collect())
            .unwrap_or_default();

        Self {
            name,
            items,
            servings: coerce_servings(fields.get("servings")),
        }
    }
}

impl From<Value> for Recipe {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

/// Interpret a servings value: integers as-is, floats truncated, integer strings parsed, otherwise 1.
pub fn coerce_servings(value: Option<&Value>) -> u32 {
    let servings = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(1),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(1),
        Some(Value::Bool(true)) => 1,
        _ => 1,
    };
    servings.clamp(1, u32::MAX as i64) as u32
}

/// Round to the nearest whole number for display, ties to even (2.5 -> 2, 3.5 -> 4).
pub fn display_round(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// JSON truthiness: null, false, zero, and empty strings/collections are falsy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Render a scalar as text, leaving strings unquoted.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// First truthy field among `keys`, rendered as text.
pub(crate) fn first_text(fields: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find(|v| is_truthy(v))
        .map(value_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unit_tokens() {
        assert_eq!(Unit::Tablespoons.token(), "tbsp");
        assert_eq!(Unit::Each.token(), "");
        assert_eq!(Unit::Unknown("bunch".to_string()).token(), "bunch");
    }

    #[test]
    fn test_unit_properties() {
        assert!(Unit::Cups.is_volume());
        assert!(!Unit::Cups.is_mass());
        assert!(!Unit::Cups.is_count());

        assert!(Unit::Pounds.is_mass());
        assert!(Unit::Cloves.is_count());
        assert!(!Unit::Each.is_count());
    }

    #[test]
    fn test_macros_for_grams() {
        let per_100g = Macros {
            calories: 364.0,
            protein: 10.0,
            carbs: 76.0,
            fat: 1.0,
            fiber: 2.7,
        };
        let contribution = per_100g.for_grams(50.0);
        assert_eq!(contribution.calories, 182.0);
        assert_eq!(contribution.protein, 5.0);
    }

    #[test]
    fn test_macros_lenient_deserialization() {
        let macros: Macros =
            serde_json::from_value(json!({"calories": "120", "protein": -3, "fat": null})).unwrap();
        assert_eq!(macros.calories, 120.0);
        assert_eq!(macros.protein, 0.0);
        assert_eq!(macros.fat, 0.0);
        assert_eq!(macros.fiber, 0.0);
    }

    #[test]
    fn test_item_alternate_keys() {
        let item = RecipeItem::from_value(&json!({"item": "butter", "qty": 2, "unit": "tbsp"}));
        assert_eq!(item.name, "butter");
        assert_eq!(item.quantity, "2");
        assert_eq!(item.unit, "tbsp");
        assert_eq!(item.aisle, None);
    }

    #[test]
    fn test_item_falsy_values_read_as_empty() {
        let item = RecipeItem::from_value(&json!({"name": "salt", "quantity": 0, "aisle": ""}));
        assert_eq!(item.quantity, "");
        assert_eq!(item.aisle, None);
    }

    #[test]
    fn test_bare_string_item() {
        let item: RecipeItem = serde_json::from_value(json!("fresh basil")).unwrap();
        assert_eq!(item, RecipeItem::new("fresh basil", ""));
    }

    #[test]
    fn test_composed_quantity() {
        assert_eq!(RecipeItem::new("flour", "1 1/2").with_unit("cups").composed_quantity(), "1 1/2 cups");
        assert_eq!(RecipeItem::new("flour", " 200g ").composed_quantity(), "200g");
        assert_eq!(RecipeItem::new("flour", "").with_unit("pinch").composed_quantity(), "pinch");
    }

    #[test]
    fn test_recipe_defaults() {
        let recipe = Recipe::from_value(&json!({"ingredients": ["egg"]}));
        assert_eq!(recipe.name, DEFAULT_RECIPE_NAME);
        assert_eq!(recipe.servings, 1);
        assert_eq!(recipe.items.len(), 1);

        let recipe = Recipe::from_value(&json!("not a recipe"));
        assert!(recipe.items.is_empty());
    }

    #[test]
    fn test_recipe_prefers_items_over_ingredients() {
        let recipe = Recipe::from_value(&json!({
            "name": "Soup",
            "items": [{"name": "leek"}],
            "ingredients": [{"name": "onion"}, {"name": "carrot"}],
        }));
        assert_eq!(recipe.items.len(), 1);
        assert_eq!(recipe.items[0].name, "leek");
    }

    #[test]
    fn test_servings_coercion() {
        assert_eq!(coerce_servings(Some(&json!(4))), 4);
        assert_eq!(coerce_servings(Some(&json!(2.9))), 2);
        assert_eq!(coerce_servings(Some(&json!("3"))), 3);
        assert_eq!(coerce_servings(Some(&json!("2.5"))), 1);
        assert_eq!(coerce_servings(Some(&json!(0))), 1);
        assert_eq!(coerce_servings(Some(&json!(-6))), 1);
        assert_eq!(coerce_servings(Some(&json!("many"))), 1);
        assert_eq!(coerce_servings(None), 1);
    }

    #[test]
    fn test_display_round_ties_to_even() {
        assert_eq!(display_round(239.6), 240);
        assert_eq!(display_round(2.5), 2);
        assert_eq!(display_round(3.5), 4);
        assert_eq!(display_round(0.4), 0);
    }
}
