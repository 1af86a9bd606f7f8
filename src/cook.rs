//! Cookability: what a recipe is missing, which recipes can be made, and the
//! all-or-nothing consumption of stock when cooking.

use ahash::AHashMap;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

use crate::catalogue::{Inventory, RecipeBook};
use crate::error::{PantryError, Result};
use crate::model::{Ingredient, Recipe};

/// What a successful cook consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CookReport {
    pub recipe: String,
    pub used: Vec<Ingredient>,
    /// Stock entries that hit zero and were dropped.
    pub exhausted: Vec<String>,
}

impl fmt::Display for CookReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cooked {}", self.recipe)?;
        if !self.exhausted.is_empty() {
            write!(f, " (used up: {})", self.exhausted.join(", "))?;
        }
        Ok(())
    }
}

/// Lowercased name -> first matching stock position.
fn stock_index(inventory: &Inventory) -> AHashMap<String, usize> {
    let mut index = AHashMap::with_capacity(inventory.len());
    for (i, item) in inventory.iter().enumerate() {
        index.entry(item.name().to_lowercase()).or_insert(i);
    }
    index
}

/// Shortfall per requirement, in recipe order.
///
/// Requirements sharing a name draw from the same stock, so a second "Flour"
/// line only sees what the first one left behind.
pub fn missing_ingredients(recipe: &Recipe, inventory: &Inventory) -> Vec<Ingredient> {
    let index = stock_index(inventory);
    let mut drawn: AHashMap<String, u32> = AHashMap::new();
    let mut missing = Vec::new();

    for need in recipe.ingredients().iter() {
        let key = need.name().to_lowercase();
        let available = index
            .get(&key)
            .and_then(|&i| inventory.get(i))
            .map_or(0, Ingredient::quantity);
        let used = drawn.entry(key).or_insert(0);
        let left = available.saturating_sub(*used);
        *used = used.saturating_add(need.quantity());

        if let Some(short) = need.shortfall(left) {
            missing.push(short);
        }
    }

    debug!(recipe = recipe.name(), missing = missing.len(), "checked recipe");
    missing
}

pub fn is_cookable(recipe: &Recipe, inventory: &Inventory) -> bool {
    missing_ingredients(recipe, inventory).is_empty()
}

/// Consume every requirement of `recipe` from `inventory`.
///
/// Nothing is touched unless the whole recipe is covered. Entries that reach
/// zero are removed after all requirements have been taken.
pub fn cook(recipe: &Recipe, inventory: &mut Inventory) -> Result<CookReport> {
    let missing = missing_ingredients(recipe, inventory);
    if !missing.is_empty() {
        info!(recipe = recipe.name(), missing = missing.len(), "cannot cook");
        return Err(PantryError::MissingIngredients(missing));
    }

    let index = stock_index(inventory);
    let mut next = inventory.clone();
    for need in recipe.ingredients().iter() {
        let stock = index
            .get(&need.name().to_lowercase())
            .and_then(|&i| next.get_mut(i))
            .ok_or_else(|| PantryError::NotFound(need.name().to_string()))?;
        stock.decrease(need.quantity())?;
    }

    let exhausted: Vec<String> = next
        .iter()
        .filter(|item| item.quantity() == 0)
        .map(|item| item.name().to_string())
        .collect();
    next.retain(|item| item.quantity() > 0);
    *inventory = next;

    info!(recipe = recipe.name(), exhausted = exhausted.len(), "cooked");
    Ok(CookReport {
        recipe: recipe.name().to_string(),
        used: recipe.ingredients().items().to_vec(),
        exhausted,
    })
}

/// Recipes whose every requirement is in stock, in book order.
pub fn cookable_recipes<'a>(book: &'a RecipeBook, inventory: &Inventory) -> Vec<&'a Recipe> {
    book.iter().filter(|r| is_cookable(r, inventory)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::Catalogue;

    fn ing(name: &str, qty: i64) -> Ingredient {
        Ingredient::new(name, qty).unwrap()
    }

    fn stock(entries: &[(&str, i64)]) -> Inventory {
        Catalogue::from_items(entries.iter().map(|(n, q)| ing(n, *q)).collect())
    }

    fn recipe(name: &str, needs: &[(&str, i64)]) -> Recipe {
        Recipe::with_ingredients(name, needs.iter().map(|(n, q)| ing(n, *q)).collect()).unwrap()
    }

    fn quantities(inv: &Inventory) -> Vec<(String, u32)> {
        inv.iter().map(|i| (i.name().to_string(), i.quantity())).collect()
    }

    #[test]
    fn test_missing_reports_shortfall() {
        let inv = stock(&[("Flour", 1000), ("Eggs", 4), ("Milk", 250)]);
        let crepes = recipe("Crepes", &[("Flour", 500), ("Eggs", 2), ("Milk", 300)]);
        let missing = missing_ingredients(&crepes, &inv);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].name(), "Milk");
        assert_eq!(missing[0].quantity(), 50);
    }

    #[test]
    fn test_cook_fails_without_mutation() {
        let mut inv = stock(&[("Flour", 1000), ("Eggs", 4), ("Milk", 250)]);
        let before = quantities(&inv);
        let crepes = recipe("Crepes", &[("Flour", 500), ("Eggs", 2), ("Milk", 300)]);
        let err = cook(&crepes, &mut inv).unwrap_err();
        match err {
            PantryError::MissingIngredients(list) => assert_eq!(list[0].quantity(), 50),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(quantities(&inv), before);
    }

    #[test]
    fn test_missing_absent_reports_full_amount_in_order() {
        let inv = stock(&[("Milk", 1)]);
        let omelette = recipe("Omelette", &[("Egg", 2), ("Milk", 1), ("Cheese", 30)]);
        let missing: Vec<_> = missing_ingredients(&omelette, &inv)
            .into_iter()
            .map(|i| (i.name().to_string(), i.quantity()))
            .collect();
        assert_eq!(missing, vec![("Egg".to_string(), 2), ("Cheese".to_string(), 30)]);
    }

    #[test]
    fn test_lookup_is_exact_not_similar() {
        let inv = stock(&[("Brown Sugar", 10)]);
        let tea = recipe("Tea", &[("Sugar", 1)]);
        assert_eq!(missing_ingredients(&tea, &inv).len(), 1);
    }

    #[test]
    fn test_cook_consumes_and_drops_empty() {
        let mut inv = stock(&[("Flour", 2), ("Sugar", 1), ("Salt", 5)]);
        let cake = recipe("Cake", &[("flour", 2), ("Sugar", 1)]);
        let report = cook(&cake, &mut inv).unwrap();
        assert_eq!(report.exhausted, vec!["Flour".to_string(), "Sugar".to_string()]);
        assert_eq!(report.to_string(), "Cooked Cake (used up: Flour, Sugar)");
        assert_eq!(quantities(&inv), vec![("Salt".to_string(), 5)]);
    }

    #[test]
    fn test_cook_partial_use() {
        let mut inv = stock(&[("Flour", 1000), ("Eggs", 4), ("Milk", 500)]);
        let crepes = recipe("Crepes", &[("Flour", 500), ("Eggs", 2), ("Milk", 300)]);
        let report = cook(&crepes, &mut inv).unwrap();
        assert!(report.exhausted.is_empty());
        assert_eq!(
            quantities(&inv),
            vec![
                ("Flour".to_string(), 500),
                ("Eggs".to_string(), 2),
                ("Milk".to_string(), 200)
            ]
        );
    }

    #[test]
    fn test_duplicate_requirements_share_stock() {
        let mut inv = stock(&[("Flour", 3)]);
        let bread = recipe("Bread", &[("Flour", 2), ("Flour", 2)]);
        let missing = missing_ingredients(&bread, &inv);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].quantity(), 1);
        assert!(cook(&bread, &mut inv).is_err());
        assert_eq!(quantities(&inv), vec![("Flour".to_string(), 3)]);

        inv = stock(&[("Flour", 4)]);
        cook(&bread, &mut inv).unwrap();
        assert!(inv.is_empty());
    }

    #[test]
    fn test_cookable_recipes() {
        let inv = stock(&[("Flour", 2), ("Sugar", 1)]);
        let book = Catalogue::from_items(vec![
            recipe("Cake", &[("Flour", 2), ("Sugar", 1)]),
            recipe("Omelette", &[("Egg", 2), ("Milk", 1)]),
        ]);
        let names: Vec<_> = cookable_recipes(&book, &inv).iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Cake"]);
    }

    #[test]
    fn test_cookable_preserves_book_order() {
        let inv = stock(&[("Bread", 4), ("Butter", 1), ("Jam", 1)]);
        let book = Catalogue::from_items(vec![
            recipe("Jam Toast", &[("Bread", 1), ("Jam", 1)]),
            recipe("Feast", &[("Bread", 10)]),
            recipe("Butter Toast", &[("Bread", 1), ("Butter", 1)]),
        ]);
        let names: Vec<_> = cookable_recipes(&book, &inv).iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Jam Toast", "Butter Toast"]);
    }
}
