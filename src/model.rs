//! Entity model: ingredients, recipes and the capability traits the catalogue
//! engine works through.

use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::catalogue::Catalogue;
use crate::error::{PantryError, Result};

/// Upper bound for any stored quantity. Additions past it are clamped.
pub const MAX_QUANTITY: u32 = 99_999;

/// Anything the similarity matcher can search by name.
pub trait Named {
    fn name(&self) -> &str;

    /// Case-insensitive full-name comparison.
    fn is_named(&self, other: &str) -> bool {
        self.name().trim().to_lowercase() == other.trim().to_lowercase()
    }
}

/// Items whose quantities can be merged into or withdrawn from an existing entry.
pub trait Mergeable: Named {
    fn quantity(&self) -> u32;

    /// Fold `other`'s quantity into `self`, returning the new total.
    fn absorb(&mut self, other: &Self) -> u32;

    /// Take `other`'s quantity out of `self`, returning what is left.
    fn withdraw(&mut self, other: &Self) -> Result<u32>;
}

fn clean_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PantryError::validation("name cannot be blank"));
    }
    Ok(name.to_string())
}

fn check_quantity(quantity: i64) -> Result<u32> {
    if quantity <= 0 {
        return Err(PantryError::validation(format!(
            "quantity must be positive, got {}",
            quantity
        )));
    }
    if quantity > MAX_QUANTITY as i64 {
        return Err(PantryError::validation(format!(
            "quantity must be at most {}, got {}",
            MAX_QUANTITY, quantity
        )));
    }
    Ok(quantity as u32)
}

// ============================================================================
// Ingredient
// ============================================================================

/// A named stock entry. Identity is the case-insensitive name; quantity is not
/// part of equality.
#[derive(Debug, Clone, Serialize)]
pub struct Ingredient {
    name: String,
    quantity: u32,
}

impl Ingredient {
    pub fn new(name: impl AsRef<str>, quantity: i64) -> Result<Self> {
        Ok(Self {
            name: clean_name(name.as_ref())?,
            quantity: check_quantity(quantity)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Add to the stock, clamping at [`MAX_QUANTITY`]. Never fails.
    pub fn increase(&mut self, by: u32) -> u32 {
        self.quantity = self.quantity.saturating_add(by).min(MAX_QUANTITY);
        self.quantity
    }

    /// Remove from the stock. Fails without touching the quantity if `by`
    /// exceeds what is held.
    pub fn decrease(&mut self, by: u32) -> Result<u32> {
        if by > self.quantity {
            return Err(PantryError::InsufficientQuantity {
                name: self.name.clone(),
                requested: by,
                available: self.quantity,
            });
        }
        self.quantity -= by;
        Ok(self.quantity)
    }

    pub fn set_quantity(&mut self, quantity: i64) -> Result<()> {
        self.quantity = check_quantity(quantity)?;
        Ok(())
    }

    pub fn rename(&mut self, name: &str) -> Result<()> {
        self.name = clean_name(name)?;
        Ok(())
    }

    /// The part of this requirement not covered by `available`, if any.
    pub fn shortfall(&self, available: u32) -> Option<Ingredient> {
        (available < self.quantity).then(|| Ingredient {
            name: self.name.clone(),
            quantity: self.quantity - available,
        })
    }
}

impl PartialEq for Ingredient {
    fn eq(&self, other: &Self) -> bool {
        self.name.to_lowercase() == other.name.to_lowercase()
    }
}

impl Eq for Ingredient {}

impl Hash for Ingredient {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.to_lowercase().hash(state);
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.quantity)
    }
}

impl Named for Ingredient {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Mergeable for Ingredient {
    fn quantity(&self) -> u32 {
        self.quantity
    }

    fn absorb(&mut self, other: &Self) -> u32 {
        self.increase(other.quantity)
    }

    fn withdraw(&mut self, other: &Self) -> Result<u32> {
        self.decrease(other.quantity)
    }
}

// ============================================================================
// Recipe
// ============================================================================

/// A named list of ingredient requirements. Requirements with the same name
/// are kept as separate entries.
#[derive(Debug, Clone, Serialize)]
pub struct Recipe {
    name: String,
    ingredients: Catalogue<Ingredient>,
}

impl Recipe {
    pub fn new(name: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            name: clean_name(name.as_ref())?,
            ingredients: Catalogue::new(),
        })
    }

    pub fn with_ingredients(name: impl AsRef<str>, ingredients: Vec<Ingredient>) -> Result<Self> {
        let mut recipe = Self::new(name)?;
        for ingredient in ingredients {
            recipe.add_ingredient(ingredient);
        }
        Ok(recipe)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ingredients(&self) -> &Catalogue<Ingredient> {
        &self.ingredients
    }

    pub fn ingredients_mut(&mut self) -> &mut Catalogue<Ingredient> {
        &mut self.ingredients
    }

    /// Append a requirement without merging.
    pub fn add_ingredient(&mut self, ingredient: Ingredient) {
        self.ingredients.push(ingredient);
    }
}

impl PartialEq for Recipe {
    fn eq(&self, other: &Self) -> bool {
        self.name.to_lowercase() == other.name.to_lowercase()
    }
}

impl Eq for Recipe {}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Named for Recipe {
    fn name(&self) -> &str {
        &self.name
    }
}
