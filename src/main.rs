use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use recipe_grocer::config::EngineConfig;
use recipe_grocer::db_cache::IngredientDbCache;
use recipe_grocer::grocery::pantry_from_value;
use recipe_grocer::grocery_list::GroceryListDocument;
use recipe_grocer::nutrition::annotate_recipe_nutrition;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about = "Ingredient resolution and grocery list aggregation", long_about = None)]
struct Args {
    /// Path to the ingredient metadata table (overrides INGREDIENT_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge recipes into one aisle-sorted grocery list
    Aggregate {
        /// JSON file with `recipes`, and optionally `overrides` and `pantry`
        request: PathBuf,
    },
    /// Attach per-serving nutrition to a recipe
    Nutrition {
        /// JSON file holding one recipe object
        recipe: PathBuf,
    },
    /// Show which table entry an ingredient name resolves to
    Resolve {
        /// Freeform ingredient name
        name: String,
    },
}

#[derive(Debug, Serialize)]
struct Resolution<'a> {
    key: &'a str,
    known: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    aisle: Option<&'a str>,
}

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {} as JSON", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{rendered}");
    Ok(())
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let mut config = EngineConfig::from_env();
    if let Some(path) = args.db {
        config = config.with_ingredient_db_path(path);
    }
    info!("Using ingredient table at {}", config.ingredient_db_path.display());

    let cache = IngredientDbCache::from_config(&config);
    let db = cache.get();

    match args.command {
        Command::Aggregate { request } => {
            // Same shape as a stored list document, plus an optional pantry
            let request = read_json(&request)?;
            let pantry = pantry_from_value(request.get("pantry"));
            let list = GroceryListDocument::from_value(&request).aggregate(&db, pantry.as_slice());
            print_json(&list)
        }
        Command::Nutrition { recipe } => {
            let recipe = read_json(&recipe)?;
            print_json(&annotate_recipe_nutrition(&db, &recipe))
        }
        Command::Resolve { name } => {
            let resolved = db.resolve(&name);
            print_json(&Resolution {
                key: &resolved.key,
                known: resolved.is_known(),
                aisle: resolved.record.and_then(|r| r.aisle.as_deref()),
            })
        }
    }
}
