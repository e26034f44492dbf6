//! # Engine Configuration Module
//!
//! This module defines where the grocery engine finds its ingredient
//! metadata table. Values come from the environment (a `.env` file is
//! honored by the binary) with defaults for local development.

use std::env;
use std::path::PathBuf;

// Constants for engine configuration
pub const DEFAULT_INGREDIENT_DB_PATH: &str = "data/ingredients.json";
pub const INGREDIENT_DB_PATH_VAR: &str = "INGREDIENT_DB_PATH";

/// Configuration structure for the grocery engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Path to the ingredient metadata table (JSON object keyed by canonical name)
    pub ingredient_db_path: PathBuf,
}

impl EngineConfig {
    /// Build a configuration from environment variables
    ///
    /// Reads `INGREDIENT_DB_PATH`; an unset or blank value falls back to
    /// [`DEFAULT_INGREDIENT_DB_PATH`].
    pub fn from_env() -> Self {
        let ingredient_db_path = env::var(INGREDIENT_DB_PATH_VAR)
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INGREDIENT_DB_PATH));

        Self { ingredient_db_path }
    }

    /// Replace the metadata table path
    pub fn with_ingredient_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ingredient_db_path = path.into();
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ingredient_db_path: PathBuf::from(DEFAULT_INGREDIENT_DB_PATH),
        }
    }
}
