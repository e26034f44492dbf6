//! # Error Types Module
//!
//! This module defines the error type for loading the ingredient metadata table.
//! The grocery and nutrition operations themselves never fail: unknown
//! ingredients and unparseable quantities are reported as flagged results.

/// Errors raised while reading the ingredient metadata table
#[derive(Debug)]
pub enum IngredientDbError {
    /// The table file could not be read
    Io(std::io::Error),
    /// The table file is not valid JSON
    Parse(serde_json::Error),
    /// The top-level JSON value is not an object keyed by ingredient name
    NotAnObject,
}

impl std::fmt::Display for IngredientDbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngredientDbError::Io(err) => write!(f, "Failed to read ingredient table: {err}"),
            IngredientDbError::Parse(err) => write!(f, "Invalid ingredient table JSON: {err}"),
            IngredientDbError::NotAnObject => {
                write!(f, "Ingredient table must be an object keyed by ingredient name")
            }
        }
    }
}

impl std::error::Error for IngredientDbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngredientDbError::Io(err) => Some(err),
            IngredientDbError::Parse(err) => Some(err),
            IngredientDbError::NotAnObject => None,
        }
    }
}

impl From<std::io::Error> for IngredientDbError {
    fn from(err: std::io::Error) -> Self {
        IngredientDbError::Io(err)
    }
}

impl From<serde_json::Error> for IngredientDbError {
    fn from(err: serde_json::Error) -> Self {
        IngredientDbError::Parse(err)
    }
}
