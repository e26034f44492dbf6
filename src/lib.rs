//! # Recipe Grocer
//!
//! Ingredient resolution and grocery aggregation engine: resolves freeform
//! ingredient names against a static metadata table, parses quantity text,
//! converts amounts to grams, computes per-serving nutrition and merges
//! recipes into a deduplicated, aisle-sorted shopping list.

pub mod config;
pub mod db_cache;
pub mod errors;
pub mod grocery;
pub mod grocery_list;
pub mod ingredient_db;
pub mod ingredient_model;
pub mod ingredient_parser;
pub mod mass_normalizer;
pub mod measurement_patterns;
pub mod nutrition;
pub mod recipe;
