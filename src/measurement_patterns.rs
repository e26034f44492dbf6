//! # Measurement Patterns Module
//!
//! This module contains the regex pattern used to split quantity text into
//! its numeric part and its trailing unit word.

use lazy_static::lazy_static;
use regex::Regex;

// Leading numeric run (digits, decimal points, slashes and spaces for mixed numbers like "1 1/2"),
// then an optional alphabetic unit word. Anything after the unit word is ignored.
pub const QUANTITY_PATTERN: &str = r"^(?P<number>[0-9./\s]+)\s*(?P<unit>[a-zA-Z]+)?";

// Lazy static regex for the quantity pattern to avoid recompilation
lazy_static! {
    pub static ref QUANTITY_REGEX: Regex =
        Regex::new(QUANTITY_PATTERN).expect("Quantity pattern should be valid");
}
