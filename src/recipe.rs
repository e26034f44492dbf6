//! # Recipe Normalization
//!
//! Coerces a loosely shaped recipe (as produced by a user form or a language
//! model) into the canonical record the rest of the engine stores.

use crate::ingredient_model::{first_text, is_truthy, value_text, DEFAULT_RECIPE_NAME};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Name given to ingredient records that carry none
pub const DEFAULT_INGREDIENT_NAME: &str = "ingredient";

/// One ingredient line in canonical recipe shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedIngredient {
    pub name: String,
    pub quantity: String,
}

/// A recipe in canonical shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecipe {
    pub name: String,
    pub ingredients: Vec<NormalizedIngredient>,
    pub steps: Vec<String>,
    pub nutrition: Option<BTreeMap<String, String>>,
    pub serving_size: Option<String>,
}

/// Normalize any JSON value into a [`NormalizedRecipe`]
///
/// ```rust
/// use recipe_grocer::recipe::normalize_recipe;
/// use serde_json::json;
///
/// let recipe = normalize_recipe(&json!({
///     "name": "  Soup ",
///     "ingredients": ["leek", {"item": "stock", "qty": "1 l"}, 7],
///     "steps": "Chop\n\n  Simmer  ",
/// }));
///
/// assert_eq!(recipe.name, "Soup");
/// assert_eq!(recipe.ingredients.len(), 2);
/// assert_eq!(recipe.steps, vec!["Chop", "Simmer"]);
/// assert!(recipe.nutrition.is_none());
/// ```
pub fn normalize_recipe(value: &Value) -> NormalizedRecipe {
    let empty = Map::new();
    let fields = value.as_object().unwrap_or(&empty);

    let name = fields
        .get("name")
        .filter(|v| !v.is_null())
        .map(|v| value_text(v).trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_RECIPE_NAME.to_string());

    let ingredients = fields
        .get("ingredients")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(normalize_ingredient).collect())
        .unwrap_or_default();

    let nutrition_fields = fields.get("nutrition").and_then(Value::as_object);

    NormalizedRecipe {
        name,
        ingredients,
        steps: normalize_steps(fields.get("steps")),
        nutrition: nutrition_fields.and_then(normalize_nutrition),
        serving_size: serving_size(fields, nutrition_fields),
    }
}

fn normalize_ingredient(entry: &Value) -> Option<NormalizedIngredient> {
    match entry {
        Value::Object(fields) => Some(NormalizedIngredient {
            name: first_text(fields, &["name", "ingredient", "item"])
                .unwrap_or_else(|| DEFAULT_INGREDIENT_NAME.to_string()),
            quantity: first_text(fields, &["quantity", "qty"]).unwrap_or_default(),
        }),
        Value::String(name) => Some(NormalizedIngredient {
            name: name.clone(),
            quantity: String::new(),
        }),
        _ => None,
    }
}

fn normalize_steps(steps: Option<&Value>) -> Vec<String> {
    match steps {
        Some(Value::String(text)) => text
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::Array(lines)) => lines.iter().map(value_text).collect(),
        _ => Vec::new(),
    }
}

fn normalize_nutrition(fields: &Map<String, Value>) -> Option<BTreeMap<String, String>> {
    let nutrition: BTreeMap<String, String> = fields
        .iter()
        .filter_map(|(key, value)| {
            let key = key.trim();
            let text = match value {
                Value::Null => return None,
                Value::Number(n) => n.to_string(),
                other => value_text(other).trim().to_string(),
            };
            (!key.is_empty() && !text.is_empty()).then(|| (key.to_string(), text))
        })
        .collect();

    (!nutrition.is_empty()).then_some(nutrition)
}

fn serving_size(fields: &Map<String, Value>, nutrition: Option<&Map<String, Value>>) -> Option<String> {
    let keys = ["serving_size", "servingSize"];
    let top_level = keys.iter().filter_map(|key| fields.get(*key));
    let nested = nutrition
        .into_iter()
        .flat_map(|n| keys.iter().filter_map(move |key| n.get(*key)));

    top_level
        .chain(nested)
        .find(|v| is_truthy(v))
        .map(|v| value_text(v).trim().to_string())
        .filter(|size| !size.is_empty())
}
