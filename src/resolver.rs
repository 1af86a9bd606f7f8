//! Conflict resolution for ambiguous catalogue matches.
//!
//! The decision policy here is pure. Asking a human (or a script) which entry
//! they meant goes through the [`Chooser`] capability, so the console adapter
//! and the tests plug in the same way.

use std::fmt::Display;

use tracing::debug;

use crate::error::Result;
use crate::matcher::is_exact;
use crate::model::Named;

/// Choice value meaning "cancel".
pub const CANCEL: i64 = -1;

/// Outcome of resolving a new or target entry against similar existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    AddAsNew,
    /// Index into the match list handed to the resolver.
    UseExisting(usize),
    Cancel,
}

/// A disambiguation menu: heading, one label per candidate, and whether
/// `0` ("add as new") is on offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disambiguation {
    pub heading: String,
    pub options: Vec<String>,
    pub allow_new: bool,
}

impl Disambiguation {
    /// Whether `choice` is a value the menu offers.
    pub fn accepts(&self, choice: i64) -> bool {
        choice == CANCEL
            || (self.allow_new && choice == 0)
            || (1..=self.options.len() as i64).contains(&choice)
    }

    /// Menu text, one entry per line.
    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![self.heading.clone()];
        if self.allow_new {
            lines.push("  0. Add as a new entry".to_string());
        }
        for (i, label) in self.options.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, label));
        }
        lines.push(format!("  {}. Cancel", CANCEL));
        lines
    }
}

/// Something that can pick one entry from a disambiguation menu.
///
/// Implementations return a value the menu [accepts](Disambiguation::accepts);
/// any other value is treated as a cancel by the policy functions.
pub trait Chooser {
    fn choose_among(&mut self, request: &Disambiguation) -> Result<i64>;
}

/// Map a choice on the add menu: `0` adds, `1..=n` picks, anything else cancels.
pub fn decision_for_add(choice: i64, n: usize) -> Decision {
    match choice {
        0 => Decision::AddAsNew,
        k if k >= 1 && k <= n as i64 => Decision::UseExisting((k - 1) as usize),
        _ => Decision::Cancel,
    }
}

/// Map a choice on the delete menu: `1..=n` picks (inclusive), anything else cancels.
pub fn decision_for_delete(choice: i64, n: usize) -> Decision {
    match choice {
        k if k >= 1 && k <= n as i64 => Decision::UseExisting((k - 1) as usize),
        _ => Decision::Cancel,
    }
}

/// Applies the add/delete policies, consulting the chooser only when the
/// match set is ambiguous.
pub struct ConflictResolver<'a> {
    chooser: &'a mut dyn Chooser,
}

impl<'a> ConflictResolver<'a> {
    pub fn new(chooser: &'a mut dyn Chooser) -> Self {
        Self { chooser }
    }

    /// Resolve an add. "Add as new" is only offered when no candidate already
    /// carries the exact name.
    pub fn resolve_add<T: Named + Display>(&mut self, matches: &[&T], name: &str) -> Result<Decision> {
        match matches {
            [] => Ok(Decision::AddAsNew),
            [only] if is_exact(*only, name) => Ok(Decision::UseExisting(0)),
            _ => {
                let request = Disambiguation {
                    heading: format!("Found entries similar to \"{}\":", name.trim()),
                    options: matches.iter().map(|m| m.to_string()).collect(),
                    allow_new: !matches.iter().any(|m| is_exact(*m, name)),
                };
                let choice = self.chooser.choose_among(&request)?;
                let decision = if request.accepts(choice) {
                    decision_for_add(choice, matches.len())
                } else {
                    Decision::Cancel
                };
                debug!(name, choice, ?decision, "resolved add");
                Ok(decision)
            }
        }
    }

    /// Resolve a delete/edit target. An empty match set yields `Cancel`; the
    /// engine reports not-found before getting here.
    pub fn resolve_delete<T: Named + Display>(&mut self, matches: &[&T], name: &str) -> Result<Decision> {
        match matches {
            [] => Ok(Decision::Cancel),
            [only] if is_exact(*only, name) => Ok(Decision::UseExisting(0)),
            _ => {
                let request = Disambiguation {
                    heading: format!("Which entry did you mean by \"{}\"?", name.trim()),
                    options: matches.iter().map(|m| m.to_string()).collect(),
                    allow_new: false,
                };
                let choice = self.chooser.choose_among(&request)?;
                let decision = decision_for_delete(choice, matches.len());
                debug!(name, choice, ?decision, "resolved delete");
                Ok(decision)
            }
        }
    }
}

#[cfg(test)]
pub(crate) use scripted::ScriptedChooser;
