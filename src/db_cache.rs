//! # Ingredient Table Cache Module
//!
//! This module provides a thread-safe, lazily loaded handle to the ingredient
//! metadata table. The table is parsed once on first use and shared by
//! reference afterwards.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::EngineConfig;
use crate::ingredient_db::IngredientDb;

/// Thread-safe lazy loader for the ingredient metadata table
///
/// The cache is constructed explicitly and handed to whatever needs the
/// table; there is no process-wide global.
///
/// # Table Lifecycle
///
/// - The table is read from disk on the first call to `get()`
/// - Later calls return the same `Arc` without touching the file
/// - `clear()` drops the cached table so the next `get()` reloads it
///
/// # Thread Safety
///
/// The first load happens under a `Mutex`, so concurrent callers never parse
/// the table twice. The returned `IngredientDb` is immutable and can be read
/// from any number of threads.
///
/// A missing or malformed table file yields an empty table (logged once per
/// load) rather than an error.
pub struct IngredientDbCache {
    path: PathBuf,
    table: Mutex<Option<Arc<IngredientDb>>>,
}

impl IngredientDbCache {
    /// Create a cache for the table at `path`
    ///
    /// Nothing is read until `get()` is first called.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recipe_grocer::db_cache::IngredientDbCache;
    ///
    /// let cache = IngredientDbCache::new("data/ingredients.json");
    /// assert!(!cache.is_loaded());
    /// ```
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: Mutex::new(None),
        }
    }

    /// Create a cache for the table named by the configuration
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.ingredient_db_path.clone())
    }

    /// Get the table, loading it on first use
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recipe_grocer::db_cache::IngredientDbCache;
    ///
    /// let cache = IngredientDbCache::new("/nonexistent/ingredients.json");
    /// let db = cache.get();
    /// assert!(db.is_empty());
    /// assert!(cache.is_loaded());
    /// ```
    pub fn get(&self) -> Arc<IngredientDb> {
        let mut table = self.lock();
        if let Some(db) = table.as_ref() {
            return Arc::clone(db);
        }

        log::debug!("Ingredient table not cached yet; loading {}", self.path.display());
        let db = Arc::new(IngredientDb::load_or_empty(&self.path));
        *table = Some(Arc::clone(&db));
        db
    }

    /// Drop the cached table so the next `get()` reads the file again
    pub fn clear(&self) {
        let mut table = self.lock();
        if table.take().is_some() {
            log::info!("Cleared cached ingredient table for {}", self.path.display());
        }
    }

    /// Check if the table has been loaded
    pub fn is_loaded(&self) -> bool {
        self.lock().is_some()
    }

    /// Path of the backing table file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<IngredientDb>>> {
        // The slot is only ever replaced wholesale; a poisoned lock still holds a valid table.
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
