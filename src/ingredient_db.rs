//! # Ingredient Metadata Store
//!
//! Loads the static ingredient table (canonical names, aliases, per-100g
//! macros, density and count conversion factors, aisle labels) and resolves
//! freeform ingredient names against it.
//!
//! ## Table format
//!
//! ```json
//! {
//!   "flour": {
//!     "aliases": ["all-purpose flour", "plain flour"],
//!     "per_100g": {"calories": 364, "protein": 10, "carbs": 76, "fat": 1, "fiber": 2.7},
//!     "density_g_per_cup": 120,
//!     "aisle": "Baking"
//!   }
//! }
//! ```
//!
//! ## Resolution
//!
//! Lookups are case-insensitive and trimmed. An exact match on a canonical
//! name or alias wins; otherwise the longest table key contained in the input
//! is used (ties go to the lexically smallest key), so that
//! "light brown sugar" resolves to "brown sugar" rather than "sugar" no matter
//! how the table was ordered. Names that match nothing resolve to themselves
//! with no metadata.
//!
//! ```rust
//! use recipe_grocer::ingredient_db::IngredientDb;
//!
//! let db = IngredientDb::from_json_str(r#"{"egg": {"aliases": ["eggs"], "count_g": 50}}"#)?;
//! let resolved = db.resolve("  Eggs ");
//! assert_eq!(resolved.key, "egg");
//! assert_eq!(resolved.record.and_then(|r| r.count_g), Some(50.0));
//!
//! let unknown = db.resolve("Saffron");
//! assert_eq!(unknown.key, "saffron");
//! assert!(unknown.record.is_none());
//! # Ok::<(), recipe_grocer::errors::IngredientDbError>(())
//! ```

use crate::errors::IngredientDbError;
use crate::ingredient_model::{is_truthy, value_text, IngredientRecord, Macros};
use log::{debug, info, trace, warn};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One raw table entry as it appears in the JSON file
#[derive(Debug, Deserialize)]
struct IngredientEntry {
    #[serde(default)]
    aliases: Option<Vec<Value>>,
    #[serde(default)]
    per_100g: Option<Macros>,
    #[serde(default, deserialize_with = "positive_factor")]
    density_g_per_cup: Option<f64>,
    #[serde(default, deserialize_with = "positive_factor")]
    count_g: Option<f64>,
    #[serde(default)]
    aisle: Option<Value>,
}

/// Conversion factors are only meaningful when positive; zero, negative or non-numeric values read as absent.
fn positive_factor<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let factor = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(factor.filter(|f| f.is_finite() && *f > 0.0))
}

/// Lowercase, trimmed lookup key
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Outcome of resolving a freeform ingredient name
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedIngredient<'a> {
    /// Canonical key when known, otherwise the normalized input
    pub key: String,
    /// Metadata for known ingredients
    pub record: Option<&'a IngredientRecord>,
}

impl ResolvedIngredient<'_> {
    /// Check if the name matched a table entry
    pub fn is_known(&self) -> bool {
        self.record.is_some()
    }
}

/// Immutable, indexed ingredient metadata table
#[derive(Debug, Clone, Default)]
pub struct IngredientDb {
    records: Vec<IngredientRecord>,
    /// Canonical names and aliases -> index into `records`
    index: BTreeMap<String, usize>,
}

impl IngredientDb {
    /// Create a store with no entries; every name resolves to itself
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the store from an already parsed JSON table
    ///
    /// Entries that are not objects, or whose fields cannot be read, are
    /// skipped with a warning. Canonical names are registered before aliases,
    /// and the first registration of a key wins.
    pub fn from_value(raw: &Value) -> Result<Self, IngredientDbError> {
        let table = raw.as_object().ok_or(IngredientDbError::NotAnObject)?;
        let mut db = Self::empty();
        let mut pending_aliases: Vec<(usize, Vec<String>)> = Vec::new();

        for (base_name, meta) in table {
            let canonical = normalize_name(base_name);
            if canonical.is_empty() || !meta.is_object() {
                debug!("Skipping ingredient table entry '{}'", base_name);
                continue;
            }
            if db.index.contains_key(&canonical) {
                warn!("Duplicate canonical ingredient '{}' ignored", canonical);
                continue;
            }

            let entry: IngredientEntry = match serde_json::from_value(meta.clone()) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping malformed ingredient entry '{}': {}", base_name, e);
                    continue;
                }
            };

            let aliases: Vec<String> = entry
                .aliases
                .unwrap_or_default()
                .iter()
                .filter(|alias| is_truthy(alias))
                .map(|alias| normalize_name(&value_text(alias)))
                .filter(|alias| !alias.is_empty())
                .collect();

            let record = IngredientRecord {
                canonical: canonical.clone(),
                aliases: aliases.clone(),
                per_100g: entry.per_100g.unwrap_or_default(),
                density_g_per_cup: entry.density_g_per_cup,
                count_g: entry.count_g,
                aisle: entry.aisle.filter(is_truthy).map(|a| value_text(&a)),
            };

            let idx = db.records.len();
            db.records.push(record);
            db.index.insert(canonical, idx);
            pending_aliases.push((idx, aliases));
        }

        for (idx, aliases) in pending_aliases {
            for alias in aliases {
                match db.index.get(&alias) {
                    Some(&existing) if existing != idx => warn!(
                        "Alias '{}' of '{}' already maps to '{}'; keeping the first",
                        alias, db.records[idx].canonical, db.records[existing].canonical
                    ),
                    Some(_) => {}
                    None => {
                        db.index.insert(alias, idx);
                    }
                }
            }
        }

        info!(
            "Loaded ingredient table with {} ingredients and {} lookup keys",
            db.records.len(),
            db.index.len()
        );
        Ok(db)
    }

    /// Parse a JSON table from a string
    pub fn from_json_str(json: &str) -> Result<Self, IngredientDbError> {
        let raw: Value = serde_json::from_str(json)?;
        Self::from_value(&raw)
    }

    /// Load the table from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IngredientDbError> {
        let path = path.as_ref();
        info!("Loading ingredient table from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Load the table from a file, degrading to an empty store when it is missing or unreadable
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(db) => db,
            Err(e) => {
                warn!(
                    "Ingredient table unavailable at {} ({}); nutrition and conversions will be limited",
                    path.display(),
                    e
                );
                Self::empty()
            }
        }
    }

    /// Resolve a freeform name to its canonical key and metadata
    ///
    /// Never fails: an unknown name resolves to its normalized form with no record.
    pub fn resolve(&self, name: &str) -> ResolvedIngredient<'_> {
        let key = normalize_name(name);

        if let Some(&idx) = self.index.get(&key) {
            let record = &self.records[idx];
            trace!("Resolved '{}' exactly to '{}'", key, record.canonical);
            return ResolvedIngredient {
                key: record.canonical.clone(),
                record: Some(record),
            };
        }

        let mut best: Option<(&str, usize)> = None;
        for (candidate, &idx) in &self.index {
            if !key.contains(candidate.as_str()) {
                continue;
            }
            let longer = best.map_or(true, |(current, _)| {
                candidate.chars().count() > current.chars().count()
            });
            if longer {
                best = Some((candidate, idx));
            }
        }

        match best {
            Some((matched, idx)) => {
                let record = &self.records[idx];
                debug!(
                    "Resolved '{}' by containment of '{}' to '{}'",
                    key, matched, record.canonical
                );
                ResolvedIngredient {
                    key: record.canonical.clone(),
                    record: Some(record),
                }
            }
            None => {
                trace!("No metadata for ingredient '{}'", key);
                ResolvedIngredient { key, record: None }
            }
        }
    }

    /// Exact lookup by canonical name or alias
    pub fn get(&self, name: &str) -> Option<&IngredientRecord> {
        self.index.get(&normalize_name(name)).map(|&idx| &self.records[idx])
    }

    /// Number of canonical ingredients
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the table has no ingredients
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_db() -> IngredientDb {
        IngredientDb::from_value(&json!({
            "Flour": {
                "aliases": ["all-purpose flour", "Plain Flour"],
                "per_100g": {"calories": 364, "protein": 10, "carbs": 76, "fat": 1, "fiber": 2.7},
                "density_g_per_cup": 120,
                "aisle": "Baking"
            },
            "sugar": {"density_g_per_cup": 200, "aisle": "Baking"},
            "brown sugar": {"density_g_per_cup": 220, "aisle": "Baking"},
            "egg": {"aliases": ["eggs"], "count_g": 50, "aisle": "Dairy"},
            "broken": "not an object"
        }))
        .unwrap()
    }

    #[test]
    fn test_load_skips_non_objects() {
        let db = sample_db();
        assert_eq!(db.len(), 4);
        assert!(db.get("broken").is_none());
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let db = sample_db();
        let resolved = db.resolve("  FLOUR ");
        assert_eq!(resolved.key, "flour");
        assert_eq!(resolved.record.unwrap().density_g_per_cup, Some(120.0));
    }

    #[test]
    fn test_alias_resolves_to_canonical() {
        let db = sample_db();
        assert_eq!(db.resolve("plain flour").key, "flour");
        assert_eq!(db.resolve("Eggs").key, "egg");
    }

    #[test]
    fn test_substring_fallback_prefers_longest_key() {
        let db = sample_db();
        assert_eq!(db.resolve("light brown sugar").key, "brown sugar");
        assert_eq!(db.resolve("caster sugar").key, "sugar");
        assert_eq!(db.resolve("sifted all-purpose flour").key, "flour");
    }

    #[test]
    fn test_substring_fallback_ties_go_to_lexically_smallest_key() {
        let db = IngredientDb::from_value(&json!({"chili": {}, "flake": {}})).unwrap();
        assert_eq!(db.resolve("chili flakes").key, "chili");

        let reversed = IngredientDb::from_value(&json!({"flake": {}, "chili": {}})).unwrap();
        assert_eq!(reversed.resolve("chili flakes").key, "chili");

        // Tied keys reached through aliases of records in the opposite order
        let aliased = IngredientDb::from_value(&json!({
            "alpha": {"aliases": ["flake"]},
            "zulu": {"aliases": ["chili"]}
        }))
        .unwrap();
        assert_eq!(aliased.resolve("chili flakes").key, "zulu");
        assert_eq!(aliased.resolve("flakes of chili").key, "zulu");
    }

    #[test]
    fn test_unknown_name_resolves_to_itself() {
        let db = sample_db();
        let resolved = db.resolve(" Star Anise ");
        assert_eq!(resolved.key, "star anise");
        assert!(!resolved.is_known());
    }

    #[test]
    fn test_empty_name() {
        let db = sample_db();
        let resolved = db.resolve("   ");
        assert_eq!(resolved.key, "");
        assert!(resolved.record.is_none());
    }

    #[test]
    fn test_alias_cannot_shadow_canonical_name() {
        let db = IngredientDb::from_value(&json!({
            "butter": {"aisle": "Dairy"},
            "margarine": {"aliases": ["butter", "oleo"], "aisle": "Dairy"}
        }))
        .unwrap();
        assert_eq!(db.resolve("butter").key, "butter");
        assert_eq!(db.resolve("oleo").key, "margarine");
    }

    #[test]
    fn test_non_positive_factors_read_as_absent() {
        let db = IngredientDb::from_value(&json!({
            "water": {"density_g_per_cup": 0, "count_g": "abc"},
            "lemon": {"count_g": "58"}
        }))
        .unwrap();
        assert_eq!(db.get("water").unwrap().density_g_per_cup, None);
        assert_eq!(db.get("water").unwrap().count_g, None);
        assert_eq!(db.get("lemon").unwrap().count_g, Some(58.0));
    }

    #[test]
    fn test_top_level_must_be_object() {
        let err = IngredientDb::from_json_str("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, IngredientDbError::NotAnObject));
    }

    #[test]
    fn test_load_or_empty_on_missing_file() {
        let db = IngredientDb::load_or_empty("/definitely/not/here/ingredients.json");
        assert!(db.is_empty());
        assert_eq!(db.resolve("Flour").key, "flour");
    }
}
