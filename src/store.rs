//! Plain-text snapshots of the catalogues.
//!
//! Ingredient files hold one `name (quantity)` per line. The recipe file holds
//! blocks of an unindented recipe name followed by indented ingredient lines,
//! with a blank line between recipes. Lines that don't parse are skipped with
//! a warning.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use crate::catalogue::{Catalogue, Inventory, RecipeBook};
use crate::config::StorageConfig;
use crate::error::Result;
use crate::model::{Ingredient, Recipe, MAX_QUANTITY};

static INGREDIENT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.+?)\s*\((?P<qty>-?\d+)\)$").expect("ingredient line pattern")
});

/// The catalogues a session keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CatalogueKind {
    Inventory,
    Shopping,
    Recipes,
}

impl fmt::Display for CatalogueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogueKind::Inventory => write!(f, "inventory"),
            CatalogueKind::Shopping => write!(f, "shopping list"),
            CatalogueKind::Recipes => write!(f, "recipe book"),
        }
    }
}

/// Parse one `name (quantity)` line. Quantities above the limit are clamped.
pub fn parse_ingredient_line(line: &str) -> Option<Ingredient> {
    let caps = INGREDIENT_LINE.captures(line.trim())?;
    let digits = &caps["qty"];
    let quantity = match digits.parse::<i64>() {
        Ok(q) => q,
        Err(_) if !digits.starts_with('-') => i64::MAX,
        Err(_) => return None,
    };
    let limit = i64::from(MAX_QUANTITY);
    let quantity = if quantity > limit {
        warn!(name = &caps["name"], quantity = digits, "quantity above {}, clamping", MAX_QUANTITY);
        limit
    } else {
        quantity
    };
    Ingredient::new(&caps["name"], quantity).ok()
}

fn decode_lines(bytes: &[u8]) -> Vec<String> {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    if bytes.is_empty() {
        return Vec::new();
    }
    let mut lines = Vec::new();
    for (n, raw) in bytes.split(|&b| b == b'\n').enumerate() {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        match std::str::from_utf8(raw) {
            Ok(line) => lines.push(line.to_string()),
            Err(e) => warn!(line = n + 1, error = %e, "skipping line that is not valid UTF-8"),
        }
    }
    lines
}

/// Build an ingredient catalogue from snapshot lines. Repeated names are
/// folded into the first entry.
pub fn parse_ingredients<S: AsRef<str>>(lines: &[S]) -> Inventory {
    let mut inventory = Inventory::new();
    for (n, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        let Some(ingredient) = parse_ingredient_line(line) else {
            warn!(line = n + 1, content = line, "skipping malformed ingredient line");
            continue;
        };
        match inventory.position(ingredient.name()) {
            Some(i) => {
                warn!(line = n + 1, name = ingredient.name(), "repeated entry, merging");
                if let Some(existing) = inventory.get_mut(i) {
                    existing.increase(ingredient.quantity());
                }
            }
            None => inventory.push(ingredient),
        }
    }
    inventory
}

/// Build a recipe book from snapshot lines.
pub fn parse_recipes<S: AsRef<str>>(lines: &[S]) -> RecipeBook {
    let mut book = RecipeBook::new();
    let mut current: Option<Recipe> = None;

    let finish = |book: &mut RecipeBook, recipe: Option<Recipe>| {
        if let Some(recipe) = recipe {
            if book.position(recipe.name()).is_some() {
                warn!(name = recipe.name(), "repeated recipe, keeping the first");
            } else {
                book.push(recipe);
            }
        }
    };

    for (n, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            finish(&mut book, current.take());
        } else if line.starts_with(char::is_whitespace) {
            match (current.as_mut(), parse_ingredient_line(line)) {
                (Some(recipe), Some(ingredient)) => recipe.add_ingredient(ingredient),
                (None, _) => warn!(line = n + 1, content = line, "ingredient outside a recipe"),
                (_, None) => warn!(line = n + 1, content = line, "skipping malformed ingredient line"),
            }
        } else {
            finish(&mut book, current.take());
            match Recipe::new(line) {
                Ok(recipe) => current = Some(recipe),
                Err(e) => warn!(line = n + 1, error = %e, "skipping recipe header"),
            }
        }
    }
    finish(&mut book, current.take());
    book
}

pub fn render_ingredients(inventory: &Inventory) -> String {
    inventory.iter().map(|i| format!("{}\n", i)).collect()
}

pub fn render_recipes(book: &RecipeBook) -> String {
    book.iter()
        .map(|recipe| {
            let mut block = format!("{}\n", recipe.name());
            for ingredient in recipe.ingredients().iter() {
                block.push_str(&format!("    {}\n", ingredient));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// File-backed snapshot storage, one file per [`CatalogueKind`].
#[derive(Debug, Clone)]
pub struct Store {
    config: StorageConfig,
}

impl Store {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn path(&self, kind: CatalogueKind) -> PathBuf {
        let file = match kind {
            CatalogueKind::Inventory => &self.config.inventory_file,
            CatalogueKind::Shopping => &self.config.shopping_file,
            CatalogueKind::Recipes => &self.config.recipes_file,
        };
        self.config.data_dir.join(file)
    }

    /// Raw snapshot lines. A missing file reads as empty, and lines that are
    /// not valid UTF-8 are skipped.
    pub fn load(&self, kind: CatalogueKind) -> Result<Vec<String>> {
        let path = self.path(kind);
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(path = %path.display(), "loaded snapshot");
                Ok(decode_lines(&bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no snapshot yet");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite the snapshot for `kind`.
    pub fn save(&self, kind: CatalogueKind, content: &str) -> Result<()> {
        let path = self.path(kind);
        fs::create_dir_all(&self.config.data_dir)?;
        fs::write(&path, content)?;
        info!(path = %path.display(), "saved {}", kind);
        Ok(())
    }

    pub fn load_ingredients(&self, kind: CatalogueKind) -> Result<Catalogue<Ingredient>> {
        Ok(parse_ingredients(&self.load(kind)?))
    }

    pub fn load_recipes(&self) -> Result<RecipeBook> {
        Ok(parse_recipes(&self.load(CatalogueKind::Recipes)?))
    }
}
