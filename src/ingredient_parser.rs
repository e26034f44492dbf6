//! # Quantity Parser
//!
//! This module converts freeform quantity text ("1 1/2 cups", "200g", "2")
//! into a numeric amount and a normalized unit token.
//!
//! ## Features
//!
//! - Plain decimals ("1.5"), simple fractions ("1/2") and mixed numbers ("1 1/2")
//! - Unit synonyms mapped onto a closed set of tokens ("tablespoons" -> "tbsp")
//! - Unrecognized unit words kept verbatim so conversion can decide later
//! - Text without a leading number yields no quantity rather than zero
//!
//! ## Usage
//!
//! ```rust
//! use recipe_grocer::ingredient_parser::parse_quantity;
//! use recipe_grocer::ingredient_model::Unit;
//!
//! let parsed = parse_quantity("1 1/2 cups").unwrap();
//! assert_eq!(parsed.amount, 1.5);
//! assert_eq!(parsed.unit, Unit::Cups);
//!
//! assert!(parse_quantity("eggs").is_none());
//! ```

use crate::ingredient_model::{ParsedQuantity, Unit};
use crate::measurement_patterns::QUANTITY_REGEX;
use log::trace;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Unit words and their normalized units
static UNIT_MAPPINGS: LazyLock<HashMap<&'static str, Unit>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Mass units
    map.insert("g", Unit::Grams);
    map.insert("gram", Unit::Grams);
    map.insert("grams", Unit::Grams);
    map.insert("kg", Unit::Kilograms);
    map.insert("kilogram", Unit::Kilograms);
    map.insert("kilograms", Unit::Kilograms);
    map.insert("mg", Unit::Milligrams);
    map.insert("milligram", Unit::Milligrams);
    map.insert("milligrams", Unit::Milligrams);
    map.insert("oz", Unit::Ounces);
    map.insert("ounce", Unit::Ounces);
    map.insert("ounces", Unit::Ounces);
    map.insert("lb", Unit::Pounds);
    map.insert("lbs", Unit::Pounds);
    map.insert("pound", Unit::Pounds);
    map.insert("pounds", Unit::Pounds);

    // Volume units
    map.insert("ml", Unit::Milliliters);
    map.insert("milliliter", Unit::Milliliters);
    map.insert("milliliters", Unit::Milliliters);
    map.insert("l", Unit::Liters);
    map.insert("liter", Unit::Liters);
    map.insert("liters", Unit::Liters);
    map.insert("cup", Unit::Cups);
    map.insert("cups", Unit::Cups);
    map.insert("tbsp", Unit::Tablespoons);
    map.insert("tbsps", Unit::Tablespoons);
    map.insert("tablespoon", Unit::Tablespoons);
    map.insert("tablespoons", Unit::Tablespoons);
    map.insert("tsp", Unit::Teaspoons);
    map.insert("tsps", Unit::Teaspoons);
    map.insert("teaspoon", Unit::Teaspoons);
    map.insert("teaspoons", Unit::Teaspoons);

    // Count units
    map.insert("clove", Unit::Cloves);
    map.insert("cloves", Unit::Cloves);
    map.insert("can", Unit::Cans);
    map.insert("cans", Unit::Cans);
    map.insert("slice", Unit::Slices);
    map.insert("slices", Unit::Slices);
    map.insert("piece", Unit::Pieces);
    map.insert("pieces", Unit::Pieces);

    map
});

/// Parse quantity text into an amount and unit
///
/// Returns `None` for empty text, text with no leading number ("eggs",
/// "a pinch"), and numbers that cannot be evaluated ("1/0").
pub fn parse_quantity(text: &str) -> Option<ParsedQuantity> {
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    let Some(captures) = QUANTITY_REGEX.captures(&text) else {
        trace!("No leading number in quantity '{}'", text);
        return None;
    };

    let amount = parse_number(captures.name("number")?.as_str())?;
    let unit = captures
        .name("unit")
        .map(|m| parse_unit(m.as_str()))
        .unwrap_or(Unit::Each);

    trace!("Parsed quantity '{}' -> {} {:?}", text, amount, unit);
    Some(ParsedQuantity::new(amount, unit))
}

/// Parse numbers like "1", "1.5", "1/2" and "1 1/2"
///
/// Space-separated tokens are summed; a non-positive sum counts as no amount.
/// Digit runs too long to represent as a finite float are rejected.
pub fn parse_number(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    if token.contains(char::is_whitespace) {
        let mut total = 0.0;
        for part in token.split_whitespace() {
            if let Ok(value) = part.parse::<f64>() {
                total += value;
            } else if part.contains('/') {
                total += parse_fraction(part)?;
            }
        }
        return (total > 0.0 && total.is_finite()).then_some(total);
    }

    if token.contains('/') {
        return parse_fraction(token);
    }

    token.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parse "numerator/denominator"; a zero denominator or an overflowing part is not a number
fn parse_fraction(token: &str) -> Option<f64> {
    let (numerator, denominator) = token.split_once('/')?;
    let numerator = numerator.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    let denominator = denominator.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator).filter(|v| v.is_finite())
}

/// Map a unit word onto its normalized unit, keeping unknown words verbatim
pub fn parse_unit(unit_str: &str) -> Unit {
    let unit_str = unit_str.trim().to_lowercase();
    if unit_str.is_empty() {
        return Unit::Each;
    }

    match UNIT_MAPPINGS.get(unit_str.as_str()) {
        Some(unit) => unit.clone(),
        None => Unit::Unknown(unit_str),
    }
}
