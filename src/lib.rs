//! pantry - kitchen inventory, recipes and shopping list tracking.
//!
//! The interesting part is the catalogue engine: deciding whether a new entry
//! duplicates an existing one, asking which entry was meant when a name is
//! ambiguous, and keeping quantities consistent across add, delete and cook.
//!
//! - [`matcher`] finds entries whose names contain every query token
//! - [`resolver`] turns ambiguous matches into a [`resolver::Decision`]
//! - [`catalogue`] applies those decisions to an ordered [`catalogue::Catalogue`]
//! - [`cook`] computes shortfalls and consumes stock atomically

pub mod catalogue;
pub mod command;
pub mod config;
pub mod console;
pub mod cook;
pub mod error;
pub mod matcher;
pub mod model;
pub mod resolver;
pub mod session;
pub mod store;

pub use catalogue::{Catalogue, Inventory, Outcome, RecipeBook};
pub use error::{PantryError, Result};
pub use model::{Ingredient, Recipe, MAX_QUANTITY};
pub use session::Session;
