//! Integration tests for per-serving nutrition and recipe normalization

#[cfg(test)]
mod tests {
    use recipe_grocer::ingredient_db::IngredientDb;
    use recipe_grocer::ingredient_model::{Recipe, RecipeItem};
    use recipe_grocer::nutrition::{annotate_recipe_nutrition, compute_recipe_nutrition};
    use recipe_grocer::recipe::normalize_recipe;
    use serde_json::json;

    fn sample_db() -> IngredientDb {
        IngredientDb::from_json_str(
            r#"{
                "butter": {"per_100g": {"calories": 720, "fat": 81, "protein": 0.9}, "density_g_per_cup": 227},
                "sugar": {"per_100g": {"calories": 400, "carbs": 100}, "density_g_per_cup": 200},
                "egg": {"aliases": ["eggs"], "per_100g": {"calories": 143, "protein": 12.6, "fat": 9.5}, "count_g": 50}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_total_divided_by_servings() {
        let db = sample_db();
        let recipe = Recipe::new("Syrup", vec![RecipeItem::new("sugar", "100 g")]).with_servings(2);

        let report = compute_recipe_nutrition(&db, &recipe);
        assert!((report.per_serving.calories - 200.0).abs() < 1e-9);
        assert_eq!(report.facts.calories, "200 kcal");
        assert_eq!(report.facts.carbs, "50 g");
        assert!(report.unknown_items.is_empty());
    }

    #[test]
    fn test_unresolvable_ingredient_contributes_zero() {
        let db = sample_db();
        let recipe = Recipe::new(
            "Custard",
            vec![RecipeItem::new("eggs", "2"), RecipeItem::new("vanilla pod", "1"), RecipeItem::new("sugar", "some")],
        );

        let report = compute_recipe_nutrition(&db, &recipe);
        assert_eq!(report.facts.calories, "143 kcal");
        assert_eq!(report.facts.protein, "13 g");
        assert_eq!(report.unknown_items, vec!["vanilla pod", "sugar"]);
    }

    #[test]
    fn test_annotate_recipe_from_json() {
        let db = sample_db();
        let recipe = json!({
            "name": "Shortbread",
            "servings": 4,
            "ingredients": [
                {"name": "butter", "quantity": "1 cup"},
                {"name": "sugar", "quantity": "1/2 cup"},
                {"name": "rice flour", "quantity": "1 cup"}
            ],
            "nutrition": {"calories": "unknown"}
        });

        let annotated = annotate_recipe_nutrition(&db, &recipe);
        // butter 227 g and sugar 100 g come to 2034.4 kcal over 4 servings
        assert_eq!(annotated["nutrition"]["calories"], "509 kcal");
        assert_eq!(annotated["nutrition_unknown_items"], json!(["rice flour"]));
        assert_eq!(annotated["name"], "Shortbread");
    }

    #[test]
    fn test_normalized_recipe_feeds_nutrition() {
        let db = sample_db();
        let normalized = normalize_recipe(&json!({
            "name": "Meringue",
            "ingredients": [{"item": "eggs", "qty": "4"}, "sugar"],
            "steps": "Whisk\nBake"
        }));
        assert_eq!(normalized.steps, vec!["Whisk", "Bake"]);

        let recipe: Recipe = serde_json::from_value(serde_json::to_value(&normalized).unwrap()).unwrap();
        let report = compute_recipe_nutrition(&db, &recipe);
        assert_eq!(report.facts.calories, "286 kcal");
        assert_eq!(report.unknown_items, vec!["sugar"]);
    }
}
