//! # Nutrition Calculator
//!
//! Computes per-serving macros for a recipe from the per-100g figures in the
//! ingredient table. Each ingredient is resolved, its quantity converted to
//! grams, and its share of every macro added to the recipe totals, which are
//! then divided by the serving count.
//!
//! Ingredients that are not in the table, or whose quantity cannot be
//! converted, contribute nothing and are listed as unknown; they never stop
//! the rest of the recipe from being computed.
//!
//! ## Usage
//!
//! ```rust
//! use recipe_grocer::ingredient_db::IngredientDb;
//! use recipe_grocer::ingredient_model::{Recipe, RecipeItem};
//! use recipe_grocer::nutrition::compute_recipe_nutrition;
//!
//! let db = IngredientDb::from_json_str(
//!     r#"{"flour": {"per_100g": {"calories": 364}, "density_g_per_cup": 120}}"#,
//! )?;
//! let recipe = Recipe::new("Bread", vec![RecipeItem::new("flour", "2 cups")]).with_servings(2);
//!
//! let report = compute_recipe_nutrition(&db, &recipe);
//! assert_eq!(report.facts.calories, "437 kcal");
//! assert!(report.unknown_items.is_empty());
//! # Ok::<(), recipe_grocer::errors::IngredientDbError>(())
//! ```

use crate::ingredient_db::IngredientDb;
use crate::ingredient_model::{display_round, Macros, Recipe};
use crate::mass_normalizer::to_grams;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-serving macros formatted for display ("200 kcal", "12 g")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub calories: String,
    pub protein: String,
    pub carbs: String,
    pub fat: String,
    pub fiber: String,
}

impl NutritionFacts {
    pub fn from_macros(per_serving: &Macros) -> Self {
        Self {
            calories: format_amount(per_serving.calories, "kcal"),
            protein: format_amount(per_serving.protein, "g"),
            carbs: format_amount(per_serving.carbs, "g"),
            fat: format_amount(per_serving.fat, "g"),
            fiber: format_amount(per_serving.fiber, "g"),
        }
    }
}

fn format_amount(value: f64, unit: &str) -> String {
    format!("{} {}", display_round(value), unit)
}

/// Result of a nutrition computation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionReport {
    /// Formatted per-serving values
    #[serde(flatten)]
    pub facts: NutritionFacts,

    /// Raw names of ingredients that could not be resolved or converted
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown_items: Vec<String>,

    /// Unrounded per-serving values
    #[serde(skip)]
    pub per_serving: Macros,
}

/// Compute per-serving nutrition for a recipe
pub fn compute_recipe_nutrition(db: &IngredientDb, recipe: &Recipe) -> NutritionReport {
    let servings = recipe.servings.max(1);
    let mut totals = Macros::default();
    let mut unknown_items = Vec::new();

    for item in &recipe.items {
        let resolved = db.resolve(&item.name);
        let grams = to_grams(&item.composed_quantity(), &resolved.key, resolved.record);

        match (resolved.record, grams) {
            (Some(record), Some(grams)) => totals += record.per_100g.for_grams(grams),
            _ => {
                debug!(
                    "No nutrition contribution from '{}' in '{}'",
                    item.name, recipe.name
                );
                unknown_items.push(item.name.clone());
            }
        }
    }

    let per_serving = totals.scaled(1.0 / f64::from(servings));
    info!(
        "Computed nutrition for '{}': {:.0} kcal per serving over {} servings, {} unknown items",
        recipe.name,
        per_serving.calories,
        servings,
        unknown_items.len()
    );

    NutritionReport {
        facts: NutritionFacts::from_macros(&per_serving),
        unknown_items,
        per_serving,
    }
}

/// Return a copy of a recipe record with computed nutrition attached
///
/// Sets `nutrition` to the per-serving facts and, when any ingredient could
/// not be counted, `nutrition_unknown_items`. Values that are not JSON
/// objects are returned unchanged.
pub fn annotate_recipe_nutrition(db: &IngredientDb, recipe: &Value) -> Value {
    let Value::Object(fields) = recipe else {
        return recipe.clone();
    };
    if fields.is_empty() {
        return recipe.clone();
    }

    let report = compute_recipe_nutrition(db, &Recipe::from_value(recipe));
    let mut annotated = fields.clone();
    annotated.insert(
        "nutrition".to_string(),
        serde_json::to_value(&report.facts).unwrap_or(Value::Null),
    );
    if !report.unknown_items.is_empty() {
        annotated.insert(
            "nutrition_unknown_items".to_string(),
            Value::from(report.unknown_items),
        );
    }
    Value::Object(annotated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingredient_model::RecipeItem;
    use serde_json::json;

    fn sample_db() -> IngredientDb {
        IngredientDb::from_value(&json!({
            "flour": {
                "per_100g": {"calories": 364, "protein": 10, "carbs": 76, "fat": 1, "fiber": 2.7},
                "density_g_per_cup": 120
            },
            "egg": {
                "aliases": ["eggs"],
                "per_100g": {"calories": 143, "protein": 12.6, "carbs": 0.7, "fat": 9.5, "fiber": 0},
                "count_g": 50
            },
            "butter": {"per_100g": {"calories": 800, "fat": 80}}
        }))
        .unwrap()
    }

    #[test]
    fn test_divides_by_servings() {
        let db = sample_db();
        let recipe = Recipe::new("Shortbread", vec![RecipeItem::new("butter", "50 g")]).with_servings(2);

        let report = compute_recipe_nutrition(&db, &recipe);
        assert_eq!(report.facts.calories, "200 kcal");
        assert_eq!(report.facts.fat, "20 g");
        assert_eq!(report.facts.protein, "0 g");
        assert!(report.unknown_items.is_empty());
    }

    #[test]
    fn test_unknown_ingredient_contributes_zero() {
        let db = sample_db();
        let recipe = Recipe::new(
            "Omelette",
            vec![
                RecipeItem::new("eggs", "2"),
                RecipeItem::new("Dragon Fruit", "1"),
                RecipeItem::new("flour", "a sprinkle"),
            ],
        );

        let report = compute_recipe_nutrition(&db, &recipe);
        assert_eq!(report.facts.calories, "143 kcal");
        assert_eq!(report.unknown_items, vec!["Dragon Fruit", "flour"]);
    }

    #[test]
    fn test_unit_is_composed_with_quantity() {
        let db = sample_db();
        let recipe = Recipe::new("Dough", vec![RecipeItem::new("flour", "1").with_unit("cup")]);

        let report = compute_recipe_nutrition(&db, &recipe);
        assert!((report.per_serving.calories - 436.8).abs() < 1e-9);
        assert_eq!(report.facts.calories, "437 kcal");
    }

    #[test]
    fn test_overlong_quantity_is_unknown() {
        let db = sample_db();
        let big = "9".repeat(400);
        let recipe = Recipe::new(
            "Shortbread",
            vec![RecipeItem::new("butter", &format!("{big} g")), RecipeItem::new("butter", "50 g")],
        );

        let report = compute_recipe_nutrition(&db, &recipe);
        assert_eq!(report.facts.calories, "400 kcal");
        assert_eq!(report.unknown_items, vec!["butter"]);
    }

    #[test]
    fn test_empty_recipe() {
        let db = sample_db();
        let report = compute_recipe_nutrition(&db, &Recipe::new("Air", Vec::new()));
        assert_eq!(report.facts.calories, "0 kcal");
        assert_eq!(report.facts.fiber, "0 g");
    }

    #[test]
    fn test_serialized_shape() {
        let db = sample_db();
        let recipe = Recipe::new("Mystery", vec![RecipeItem::new("unobtainium", "1 g")]);
        let value = serde_json::to_value(compute_recipe_nutrition(&db, &recipe)).unwrap();

        assert_eq!(value["calories"], "0 kcal");
        assert_eq!(value["unknown_items"], json!(["unobtainium"]));
        assert!(value.get("per_serving").is_none());
    }

    #[test]
    fn test_annotate_recipe() {
        let db = sample_db();
        let recipe = json!({
            "name": "Pancakes",
            "servings": "2",
            "ingredients": [{"name": "flour", "quantity": "1 cup"}, {"name": "moon dust", "quantity": "1 tsp"}],
            "steps": ["mix", "fry"]
        });

        let annotated = annotate_recipe_nutrition(&db, &recipe);
        assert_eq!(annotated["nutrition"]["calories"], "218 kcal");
        assert_eq!(annotated["nutrition_unknown_items"], json!(["moon dust"]));
        assert_eq!(annotated["steps"], json!(["mix", "fry"]));
    }

    #[test]
    fn test_annotate_passes_through_non_objects() {
        let db = sample_db();
        assert_eq!(annotate_recipe_nutrition(&db, &Value::Null), Value::Null);
        assert_eq!(annotate_recipe_nutrition(&db, &json!({})), json!({}));
    }
}
