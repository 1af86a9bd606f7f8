//! Error types for pantry operations.

use thiserror::Error;

use crate::model::Ingredient;

/// Result type alias for pantry operations.
pub type Result<T> = std::result::Result<T, PantryError>;

/// Errors that can occur while running a pantry command.
#[derive(Debug, Error)]
pub enum PantryError {
    /// Bad name or quantity on an entry
    #[error("Invalid entry: {0}")]
    Validation(String),

    /// Lookup miss
    #[error("{0} does not exist")]
    NotFound(String),

    /// Subtraction would take stock below zero
    #[error("Cannot remove {requested} of {name}: only {available} available")]
    InsufficientQuantity {
        name: String,
        requested: u32,
        available: u32,
    },

    /// An entry with the same name already exists
    #[error("{0} already exists")]
    Duplicate(String),

    /// Recipe cannot be cooked with current stock
    #[error("Missing ingredients: {}", format_shortfall(.0))]
    MissingIngredients(Vec<Ingredient>),

    /// Disambiguation response was not a usable number
    #[error("Not a valid choice: {0}")]
    AmbiguousInput(String),

    /// Unknown or malformed command
    #[error("{0}")]
    Command(String),

    /// Recipe screen used without a selected recipe
    #[error("No recipe is open")]
    NoActiveRecipe,

    /// Config file could not be parsed
    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PantryError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn command(msg: impl Into<String>) -> Self {
        Self::Command(msg.into())
    }
}

fn format_shortfall(items: &[Ingredient]) -> String {
    items
        .iter()
        .map(|i| format!("{} ({})", i.name(), i.quantity()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_message() {
        let err = PantryError::InsufficientQuantity {
            name: "Flour".to_string(),
            requested: 5,
            available: 2,
        };
        assert_eq!(err.to_string(), "Cannot remove 5 of Flour: only 2 available");
    }

    #[test]
    fn test_missing_ingredients_message() {
        let err = PantryError::MissingIngredients(vec![
            Ingredient::new("Milk", 50).unwrap(),
            Ingredient::new("Eggs", 1).unwrap(),
        ]);
        assert_eq!(err.to_string(), "Missing ingredients: Milk (50), Eggs (1)");
    }
}
