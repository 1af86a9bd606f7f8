//! Catalogue engine: an ordered container plus the add/delete/edit logic that
//! keeps names unique and quantities consistent.
//!
//! The container itself never enforces uniqueness. Every mutation goes through
//! the similarity matcher first and, when the match set is ambiguous, through
//! the [`ConflictResolver`].

use serde::Serialize;
use std::fmt::{self, Display};
use tracing::{debug, info};

use crate::error::{PantryError, Result};
use crate::matcher::{is_exact, search, search_indices};
use crate::model::{Ingredient, Mergeable, Named, Recipe};
use crate::resolver::{ConflictResolver, Decision};

/// Result of a catalogue command that completed normally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Added { name: String },
    Merged { name: String, initial: u32, added: u32, total: u32 },
    Reduced { name: String, removed: u32, remaining: u32 },
    Removed { name: String },
    Renamed { from: String, to: String },
    Updated { name: String, from: u32, to: u32 },
    /// An existing entry was picked instead of creating a new one.
    Opened { name: String },
    NotFound { name: String },
    Cancelled,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Added { name } => write!(f, "Added {}", name),
            Outcome::Merged { name, initial, added, total } => write!(
                f,
                "Updated {}: had {}, added {}, now {}",
                name, initial, added, total
            ),
            Outcome::Reduced { name, removed, remaining } => {
                write!(f, "Removed {} of {}, {} left", removed, name, remaining)
            }
            Outcome::Removed { name } => write!(f, "Removed {}", name),
            Outcome::Renamed { from, to } => write!(f, "Renamed {} to {}", from, to),
            Outcome::Updated { name, from, to } => {
                write!(f, "Set {} from {} to {}", name, from, to)
            }
            Outcome::Opened { name } => write!(f, "Opened {}", name),
            Outcome::NotFound { name } => write!(f, "{} does not exist", name),
            Outcome::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Where a delete/edit target landed after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Located {
    Found(usize),
    NotFound,
    Cancelled,
}

/// Insertion-ordered collection of catalogue entries.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Catalogue<T> {
    items: Vec<T>,
}

pub type Inventory = Catalogue<Ingredient>;
pub type RecipeBook = Catalogue<Recipe>;

impl<T> Default for Catalogue<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Catalogue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Append without any similarity check.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.items.retain(keep);
    }
}

impl<T: Named + Display> Catalogue<T> {
    /// Entries similar to `query`, in catalogue order.
    pub fn find(&self, query: &str) -> Vec<&T> {
        search(&self.items, query)
    }

    /// First entry whose name equals `name` case-insensitively.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|item| is_exact(item, name))
    }

    /// Resolve a delete/edit target to a single position.
    pub fn locate(&self, name: &str, resolver: &mut ConflictResolver<'_>) -> Result<Located> {
        let indices = search_indices(&self.items, name);
        if indices.is_empty() {
            debug!(name, "no similar entries");
            return Ok(Located::NotFound);
        }
        let matches: Vec<&T> = indices.iter().map(|&i| &self.items[i]).collect();
        match resolver.resolve_delete(&matches, name)? {
            Decision::UseExisting(k) => Ok(indices
                .get(k)
                .map_or(Located::Cancelled, |&i| Located::Found(i))),
            Decision::AddAsNew | Decision::Cancel => Ok(Located::Cancelled),
        }
    }

    /// Remove a whole entry, whatever its quantity.
    pub fn remove_item(&mut self, name: &str, resolver: &mut ConflictResolver<'_>) -> Result<Outcome> {
        match self.locate(name, resolver)? {
            Located::Found(idx) => {
                let removed = self.items.remove(idx);
                info!(name = removed.name(), "removed entry");
                Ok(Outcome::Removed {
                    name: removed.name().to_string(),
                })
            }
            Located::NotFound => Ok(Outcome::NotFound {
                name: name.trim().to_string(),
            }),
            Located::Cancelled => Ok(Outcome::Cancelled),
        }
    }
}

impl<T: Mergeable + Display> Catalogue<T> {
    /// Add an entry, merging into an existing one when the resolver says so.
    pub fn add_item(&mut self, item: T, resolver: &mut ConflictResolver<'_>) -> Result<Outcome> {
        let indices = search_indices(&self.items, item.name());
        let matches: Vec<&T> = indices.iter().map(|&i| &self.items[i]).collect();

        match resolver.resolve_add(&matches, item.name())? {
            Decision::AddAsNew => {
                let name = item.name().to_string();
                info!(name = %name, quantity = item.quantity(), "added entry");
                self.items.push(item);
                Ok(Outcome::Added { name })
            }
            Decision::UseExisting(k) => match indices.get(k) {
                Some(&idx) => Ok(self.merge_into(idx, &item)),
                None => Ok(Outcome::Cancelled),
            },
            Decision::Cancel => Ok(Outcome::Cancelled),
        }
    }

    /// Take `target`'s quantity out of the matching entry, removing it once
    /// the stock reaches zero.
    pub fn delete_item(&mut self, target: &T, resolver: &mut ConflictResolver<'_>) -> Result<Outcome> {
        let idx = match self.locate(target.name(), resolver)? {
            Located::Found(idx) => idx,
            Located::NotFound => {
                return Ok(Outcome::NotFound {
                    name: target.name().to_string(),
                })
            }
            Located::Cancelled => return Ok(Outcome::Cancelled),
        };

        let remaining = self.items[idx].withdraw(target)?;
        let name = self.items[idx].name().to_string();
        if remaining == 0 {
            self.items.remove(idx);
            info!(name = %name, "stock exhausted, entry removed");
            Ok(Outcome::Removed { name })
        } else {
            info!(name = %name, remaining, "reduced entry");
            Ok(Outcome::Reduced {
                name,
                removed: target.quantity(),
                remaining,
            })
        }
    }

    fn merge_into(&mut self, idx: usize, item: &T) -> Outcome {
        let existing = &mut self.items[idx];
        let initial = existing.quantity();
        let total = existing.absorb(item);
        info!(name = existing.name(), initial, total, "merged entry");
        Outcome::Merged {
            name: existing.name().to_string(),
            initial,
            added: item.quantity(),
            total,
        }
    }
}

impl Catalogue<Ingredient> {
    /// Rename the entry matching `query`. The new name must not collide with
    /// any other entry.
    pub fn rename_item(
        &mut self,
        query: &str,
        new_name: &str,
        resolver: &mut ConflictResolver<'_>,
    ) -> Result<Outcome> {
        if new_name.trim().is_empty() {
            return Err(PantryError::validation("name cannot be blank"));
        }
        let idx = match self.locate(query, resolver)? {
            Located::Found(idx) => idx,
            Located::NotFound => {
                return Ok(Outcome::NotFound {
                    name: query.trim().to_string(),
                })
            }
            Located::Cancelled => return Ok(Outcome::Cancelled),
        };
        let clash = self
            .items
            .iter()
            .enumerate()
            .any(|(i, item)| i != idx && item.is_named(new_name));
        if clash {
            return Err(PantryError::Duplicate(new_name.trim().to_string()));
        }

        let item = &mut self.items[idx];
        let from = item.name().to_string();
        item.rename(new_name)?;
        info!(from = %from, to = item.name(), "renamed entry");
        Ok(Outcome::Renamed {
            from,
            to: item.name().to_string(),
        })
    }

    /// Overwrite the quantity of the entry matching `query`.
    pub fn update_quantity(
        &mut self,
        query: &str,
        quantity: i64,
        resolver: &mut ConflictResolver<'_>,
    ) -> Result<Outcome> {
        let idx = match self.locate(query, resolver)? {
            Located::Found(idx) => idx,
            Located::NotFound => {
                return Ok(Outcome::NotFound {
                    name: query.trim().to_string(),
                })
            }
            Located::Cancelled => return Ok(Outcome::Cancelled),
        };
        let item = &mut self.items[idx];
        let from = item.quantity();
        item.set_quantity(quantity)?;
        info!(name = item.name(), from, to = item.quantity(), "updated quantity");
        Ok(Outcome::Updated {
            name: item.name().to_string(),
            from,
            to: item.quantity(),
        })
    }
}

impl Catalogue<Recipe> {
    /// Create an empty recipe, or open an existing one the resolver picks.
    ///
    /// Returns the outcome and the position of the recipe now in use, if any.
    pub fn add_recipe(
        &mut self,
        name: &str,
        resolver: &mut ConflictResolver<'_>,
    ) -> Result<(Outcome, Option<usize>)> {
        let recipe = Recipe::new(name)?;
        let indices = search_indices(&self.items, recipe.name());
        let matches: Vec<&Recipe> = indices.iter().map(|&i| &self.items[i]).collect();

        match resolver.resolve_add(&matches, recipe.name())? {
            Decision::AddAsNew => {
                let name = recipe.name().to_string();
                info!(name = %name, "added recipe");
                self.items.push(recipe);
                Ok((Outcome::Added { name }, Some(self.items.len() - 1)))
            }
            Decision::UseExisting(k) => match indices.get(k) {
                Some(&idx) => Ok((
                    Outcome::Opened {
                        name: self.items[idx].name().to_string(),
                    },
                    Some(idx),
                )),
                None => Ok((Outcome::Cancelled, None)),
            },
            Decision::Cancel => Ok((Outcome::Cancelled, None)),
        }
    }

    pub fn delete_recipe(&mut self, name: &str, resolver: &mut ConflictResolver<'_>) -> Result<Outcome> {
        self.remove_item(name, resolver)
    }
}
