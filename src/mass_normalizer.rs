//! Mass normalization: converts quantity text for an ingredient into grams.
//!
//! Mass units convert by fixed factors. Bare counts and discrete units
//! (clove, slice, piece, can, or any text mentioning "whole") need the
//! ingredient's grams-per-unit figure. Volumes go through a grams-per-cup
//! density: the ingredient's own, else its count mass as a rough stand-in,
//! else the density of water. The same water constant is used for every
//! ingredient without density data so that aggregation stays deterministic.

use crate::ingredient_model::{IngredientRecord, Unit};
use crate::ingredient_parser::parse_quantity;
use log::{debug, trace};

/// Grams per cup assumed when an ingredient has no density data
pub const WATER_DENSITY_G_PER_CUP: f64 = 240.0;

pub const GRAMS_PER_OUNCE: f64 = 28.3495;
pub const GRAMS_PER_POUND: f64 = 453.592;

/// Volume ratios relative to one cup.
pub const TBSP_PER_CUP: f64 = 16.0;
pub const TSP_PER_CUP: f64 = 48.0;
pub const ML_PER_CUP: f64 = 240.0;
pub const ML_PER_LITER: f64 = 1000.0;

/// Convert quantity text for an ingredient into grams
///
/// Returns `None` when the text has no parseable amount or no conversion
/// path exists for its unit. Never panics on malformed text.
pub fn to_grams(
    quantity_text: &str,
    ingredient_key: &str,
    record: Option<&IngredientRecord>,
) -> Option<f64> {
    let Some(parsed) = parse_quantity(quantity_text) else {
        debug!(
            "Unparseable quantity '{}' for '{}'",
            quantity_text, ingredient_key
        );
        return None;
    };

    let amount = parsed.amount;
    let count_g = record.and_then(|r| r.count_g);
    let mentions_whole = quantity_text.to_lowercase().contains("whole");

    let grams = match &parsed.unit {
        Unit::Grams => Some(amount),
        Unit::Milligrams => Some(amount / 1000.0),
        Unit::Kilograms => Some(amount * 1000.0),
        Unit::Ounces => Some(amount * GRAMS_PER_OUNCE),
        Unit::Pounds => Some(amount * GRAMS_PER_POUND),
        Unit::Each => count_g.map(|each| amount * each),
        unit if unit.is_count() || mentions_whole => count_g.map(|each| amount * each),
        unit if unit.is_volume() => {
            let density = density_g_per_cup(record);
            cups_in(amount, unit).map(|cups| cups * density)
        }
        _ => None,
    }
    .filter(|g| g.is_finite());

    match grams {
        Some(g) => trace!(
            "Converted '{}' of '{}' to {:.2} g",
            quantity_text,
            ingredient_key,
            g
        ),
        None => debug!(
            "No gram conversion for '{}' of '{}' (unit '{}')",
            quantity_text,
            ingredient_key,
            parsed.unit
        ),
    }
    grams
}

/// Density used for volume conversion: own density, else count mass, else water
pub fn density_g_per_cup(record: Option<&IngredientRecord>) -> f64 {
    record
        .and_then(|r| r.density_g_per_cup.or(r.count_g))
        .unwrap_or(WATER_DENSITY_G_PER_CUP)
}

/// Express a volume amount in cups
fn cups_in(amount: f64, unit: &Unit) -> Option<f64> {
    match unit {
        Unit::Cups => Some(amount),
        Unit::Tablespoons => Some(amount / TBSP_PER_CUP),
        Unit::Teaspoons => Some(amount / TSP_PER_CUP),
        Unit::Milliliters => Some(amount / ML_PER_CUP),
        Unit::Liters => Some(amount * ML_PER_LITER / ML_PER_CUP),
        _ => None,
    }
}
