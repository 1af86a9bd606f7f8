//! Session state and command dispatch.
//!
//! A [`Session`] owns the three catalogues, knows which screen is showing,
//! and holds the active recipe while one is open. Everything a command needs
//! is reached through it.

use tracing::{debug, error, info};

use crate::catalogue::{Inventory, Located, Outcome, RecipeBook};
use crate::command::{self, Command, Screen};
use crate::cook::{cook, cookable_recipes, missing_ingredients};
use crate::error::{PantryError, Result};
use crate::model::{Ingredient, Recipe};
use crate::resolver::{Chooser, ConflictResolver};
use crate::store::{render_ingredients, render_recipes, CatalogueKind, Store};

/// Text produced by one command, and whether the session should end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub lines: Vec<String>,
    pub exit: bool,
}

impl Response {
    fn line(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            exit: false,
        }
    }

    fn lines(lines: Vec<String>) -> Self {
        Self { lines, exit: false }
    }
}

impl From<Outcome> for Response {
    fn from(outcome: Outcome) -> Self {
        Response::line(outcome.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    screen: Screen,
    inventory: Inventory,
    shopping: Inventory,
    recipes: RecipeBook,
    /// Position in `recipes` of the recipe being edited. Set when a recipe is
    /// added or opened from the recipe list, cleared on `back`.
    active_recipe: Option<usize>,
}

fn numbered<T: std::fmt::Display>(items: impl IntoIterator<Item = T>) -> Vec<String> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect()
}

fn require_quantity(quantity: Option<i64>) -> Result<i64> {
    quantity.ok_or_else(|| PantryError::command("expected a quantity"))
}

impl Session {
    pub fn new(inventory: Inventory, shopping: Inventory, recipes: RecipeBook) -> Self {
        Self {
            inventory,
            shopping,
            recipes,
            ..Self::default()
        }
    }

    /// Read every catalogue snapshot from `store`.
    pub fn load(store: &Store) -> Result<Self> {
        let session = Self::new(
            store.load_ingredients(CatalogueKind::Inventory)?,
            store.load_ingredients(CatalogueKind::Shopping)?,
            store.load_recipes()?,
        );
        info!(
            inventory = session.inventory.len(),
            shopping = session.shopping.len(),
            recipes = session.recipes.len(),
            "session loaded"
        );
        Ok(session)
    }

    /// Write every catalogue snapshot. Failures are logged, not returned;
    /// the result says whether all writes went through.
    pub fn save(&self, store: &Store) -> bool {
        let snapshots = [
            (CatalogueKind::Inventory, render_ingredients(&self.inventory)),
            (CatalogueKind::Shopping, render_ingredients(&self.shopping)),
            (CatalogueKind::Recipes, render_recipes(&self.recipes)),
        ];
        let mut ok = true;
        for (kind, content) in snapshots {
            if let Err(e) = store.save(kind, &content) {
                error!(%kind, error = %e, "failed to save");
                ok = false;
            }
        }
        ok
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn shopping(&self) -> &Inventory {
        &self.shopping
    }

    pub fn recipes(&self) -> &RecipeBook {
        &self.recipes
    }

    pub fn active_recipe(&self) -> Option<&Recipe> {
        self.active_recipe.and_then(|i| self.recipes.get(i))
    }

    /// Prompt label for the current screen.
    pub fn prompt(&self) -> String {
        match (self.screen, self.active_recipe()) {
            (Screen::Recipe, Some(recipe)) => format!("recipe:{}", recipe.name()),
            (screen, _) => screen.to_string(),
        }
    }

    /// Parse and run one input line.
    pub fn execute(&mut self, line: &str, chooser: &mut dyn Chooser) -> Result<Response> {
        let command = command::parse(line, self.screen)?;
        debug!(screen = %self.screen, ?command, "executing");
        let mut resolver = ConflictResolver::new(chooser);

        match command {
            Command::Help => Ok(Response::lines(
                command::help(self.screen).iter().map(|s| s.to_string()).collect(),
            )),
            Command::Bye => Ok(Response {
                lines: vec!["Bye!".to_string()],
                exit: true,
            }),
            Command::Open(screen) => Ok(self.switch_to(screen)),
            Command::Back => Ok(self.back()),
            command => match self.screen {
                Screen::Main => Err(PantryError::command("not available on the main menu")),
                Screen::Inventory => self.run_stock(CatalogueKind::Inventory, command, &mut resolver),
                Screen::Shopping => self.run_stock(CatalogueKind::Shopping, command, &mut resolver),
                Screen::Recipes => self.run_recipes(command, &mut resolver),
                Screen::Recipe => self.run_recipe(command, &mut resolver),
            },
        }
    }

    fn switch_to(&mut self, screen: Screen) -> Response {
        self.screen = screen;
        info!(%screen, "switched screen");
        Response::line(format!("Now in {}. Type help for commands.", screen))
    }

    fn back(&mut self) -> Response {
        match self.screen {
            Screen::Recipe => {
                self.active_recipe = None;
                self.switch_to(Screen::Recipes)
            }
            _ => self.switch_to(Screen::Main),
        }
    }

    fn stock_mut(&mut self, kind: CatalogueKind) -> &mut Inventory {
        match kind {
            CatalogueKind::Shopping => &mut self.shopping,
            CatalogueKind::Inventory | CatalogueKind::Recipes => &mut self.inventory,
        }
    }

    // ========================================================================
    // Inventory and shopping list
    // ========================================================================

    fn run_stock(
        &mut self,
        kind: CatalogueKind,
        command: Command,
        resolver: &mut ConflictResolver<'_>,
    ) -> Result<Response> {
        let screen = self.screen;
        let stock = self.stock_mut(kind);
        match command {
            Command::Add { name, quantity } => {
                let item = Ingredient::new(&name, require_quantity(quantity)?)?;
                Ok(stock.add_item(item, resolver)?.into())
            }
            Command::Delete { name, quantity } => {
                let target = Ingredient::new(&name, require_quantity(quantity)?)?;
                Ok(stock.delete_item(&target, resolver)?.into())
            }
            Command::Edit { name, new_name: Some(new_name) } => {
                Ok(stock.rename_item(&name, &new_name, resolver)?.into())
            }
            Command::Update { name, quantity } => {
                Ok(stock.update_quantity(&name, quantity, resolver)?.into())
            }
            Command::List if stock.is_empty() => Ok(Response::line(format!("The {} is empty", kind))),
            Command::List => Ok(Response::lines(numbered(stock.iter()))),
            Command::Find(query) => {
                let found = stock.find(&query);
                if found.is_empty() {
                    Ok(Response::line(format!("Nothing matches \"{}\"", query)))
                } else {
                    Ok(Response::lines(numbered(found)))
                }
            }
            other => Err(unsupported(&other, screen)),
        }
    }

    // ========================================================================
    // Recipe book
    // ========================================================================

    fn run_recipes(&mut self, command: Command, resolver: &mut ConflictResolver<'_>) -> Result<Response> {
        match command {
            Command::Add { name, .. } => {
                let (outcome, opened) = self.recipes.add_recipe(&name, resolver)?;
                Ok(self.open_recipe(outcome, opened))
            }
            Command::Delete { name, .. } => Ok(self.recipes.delete_recipe(&name, resolver)?.into()),
            Command::Edit { name, .. } => match self.recipes.locate(&name, resolver)? {
                Located::Found(idx) => {
                    let outcome = Outcome::Opened {
                        name: self.recipes.items()[idx].name().to_string(),
                    };
                    Ok(self.open_recipe(outcome, Some(idx)))
                }
                Located::NotFound => Ok(Outcome::NotFound { name }.into()),
                Located::Cancelled => Ok(Outcome::Cancelled.into()),
            },
            Command::List if self.recipes.is_empty() => Ok(Response::line("No recipes yet")),
            Command::List => Ok(Response::lines(numbered(self.recipes.iter().map(|r| {
                format!("{} ({} ingredients)", r.name(), r.ingredients().len())
            })))),
            Command::Find(query) => {
                let found = self.recipes.find(&query);
                if found.is_empty() {
                    Ok(Response::line(format!("Nothing matches \"{}\"", query)))
                } else {
                    Ok(Response::lines(numbered(found)))
                }
            }
            Command::Cook(Some(name)) => match self.recipes.locate(&name, resolver)? {
                Located::Found(idx) => {
                    let report = cook(&self.recipes.items()[idx], &mut self.inventory)?;
                    Ok(Response::line(report.to_string()))
                }
                Located::NotFound => Ok(Outcome::NotFound { name }.into()),
                Located::Cancelled => Ok(Outcome::Cancelled.into()),
            },
            Command::Cookable => {
                let ready = cookable_recipes(&self.recipes, &self.inventory);
                if ready.is_empty() {
                    Ok(Response::line("Nothing can be cooked with what is in stock"))
                } else {
                    Ok(Response::lines(numbered(ready)))
                }
            }
            other => Err(unsupported(&other, self.screen)),
        }
    }

    fn open_recipe(&mut self, outcome: Outcome, opened: Option<usize>) -> Response {
        let mut response = Response::from(outcome);
        if let Some(idx) = opened {
            self.active_recipe = Some(idx);
            self.screen = Screen::Recipe;
            response
                .lines
                .push("Add ingredients with: add <name> <qty>".to_string());
        }
        response
    }

    // ========================================================================
    // Active recipe
    // ========================================================================

    fn run_recipe(&mut self, command: Command, resolver: &mut ConflictResolver<'_>) -> Result<Response> {
        let idx = self.active_recipe.ok_or(PantryError::NoActiveRecipe)?;
        let recipe = self.recipes.get_mut(idx).ok_or(PantryError::NoActiveRecipe)?;

        match command {
            Command::Add { name, quantity } => {
                let ingredient = Ingredient::new(&name, require_quantity(quantity)?)?;
                let name = ingredient.name().to_string();
                recipe.add_ingredient(ingredient);
                info!(recipe = recipe.name(), ingredient = %name, "added requirement");
                Ok(Outcome::Added { name }.into())
            }
            Command::Delete { name, .. } => Ok(recipe.ingredients_mut().remove_item(&name, resolver)?.into()),
            Command::Update { name, quantity } => Ok(recipe
                .ingredients_mut()
                .update_quantity(&name, quantity, resolver)?
                .into()),
            Command::List => {
                let recipe = &self.recipes.items()[idx];
                if recipe.ingredients().is_empty() {
                    return Ok(Response::line(format!("{} has no ingredients yet", recipe.name())));
                }
                let mut lines = vec![format!("{}:", recipe.name())];
                lines.extend(numbered(recipe.ingredients().iter()));
                let missing = missing_ingredients(recipe, &self.inventory);
                if missing.is_empty() {
                    lines.push("Everything is in stock".to_string());
                } else {
                    lines.push("Missing:".to_string());
                    lines.extend(missing.iter().map(|m| format!("  {}", m)));
                }
                Ok(Response::lines(lines))
            }
            Command::Cook(None) => {
                let report = cook(&self.recipes.items()[idx], &mut self.inventory)?;
                Ok(Response::line(report.to_string()))
            }
            Command::Shop => {
                let missing = missing_ingredients(&self.recipes.items()[idx], &self.inventory);
                if missing.is_empty() {
                    return Ok(Response::line("Nothing is missing"));
                }
                let mut lines = Vec::with_capacity(missing.len());
                for item in missing {
                    lines.push(self.shopping.add_item(item, resolver)?.to_string());
                }
                Ok(Response::lines(lines))
            }
            other => Err(unsupported(&other, self.screen)),
        }
    }
}

fn unsupported(command: &Command, screen: Screen) -> PantryError {
    PantryError::command(format!("{:?} is not available on the {}", command, screen))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::Catalogue;
    use crate::config::StorageConfig;
    use crate::resolver::ScriptedChooser;

    fn ing(name: &str, qty: i64) -> Ingredient {
        Ingredient::new(name, qty).unwrap()
    }

    fn run(session: &mut Session, chooser: &mut ScriptedChooser, line: &str) -> Result<Response> {
        session.execute(line, chooser)
    }

    fn ok(session: &mut Session, line: &str) -> Vec<String> {
        let mut chooser = ScriptedChooser::default();
        run(session, &mut chooser, line).unwrap().lines
    }

    #[test]
    fn test_navigation() {
        let mut session = Session::default();
        assert_eq!(session.prompt(), "main menu");
        ok(&mut session, "inventory");
        assert_eq!(session.screen(), Screen::Inventory);
        ok(&mut session, "back");
        assert_eq!(session.screen(), Screen::Main);
        ok(&mut session, "3");
        assert_eq!(session.screen(), Screen::Shopping);

        let mut chooser = ScriptedChooser::default();
        let bye = run(&mut session, &mut chooser, "bye").unwrap();
        assert!(bye.exit);
    }

    #[test]
    fn test_inventory_flow() {
        let mut session = Session::default();
        ok(&mut session, "inventory");
        assert_eq!(ok(&mut session, "list"), vec!["The inventory is empty"]);
        assert_eq!(ok(&mut session, "add Flour 500"), vec!["Added Flour"]);
        assert_eq!(
            ok(&mut session, "add flour 250"),
            vec!["Updated Flour: had 500, added 250, now 750"]
        );
        ok(&mut session, "add Brown Sugar 100");
        assert_eq!(ok(&mut session, "find sugar"), vec!["1. Brown Sugar (100)"]);
        assert_eq!(ok(&mut session, "edit brown sugar / Demerara"), vec!["Renamed Brown Sugar to Demerara"]);
        assert_eq!(ok(&mut session, "update flour 10"), vec!["Set Flour from 750 to 10"]);
        assert_eq!(ok(&mut session, "delete flour 10"), vec!["Removed Flour"]);
        assert_eq!(ok(&mut session, "list"), vec!["1. Demerara (100)"]);
    }

    #[test]
    fn test_errors_do_not_change_state() {
        let mut session = Session::default();
        ok(&mut session, "inventory");
        ok(&mut session, "add Eggs 6");
        let mut chooser = ScriptedChooser::default();
        let err = run(&mut session, &mut chooser, "delete eggs 7").unwrap_err();
        assert!(matches!(err, PantryError::InsufficientQuantity { .. }));
        let err = run(&mut session, &mut chooser, "add Milk 0").unwrap_err();
        assert!(matches!(err, PantryError::Validation(_)));
        assert!(run(&mut session, &mut chooser, "cookable").is_err());
        assert_eq!(session.inventory().len(), 1);
        assert_eq!(session.inventory().get(0).unwrap().quantity(), 6);
    }

    #[test]
    fn test_shopping_is_separate() {
        let mut session = Session::default();
        ok(&mut session, "shopping");
        ok(&mut session, "add Milk 2");
        assert_eq!(session.shopping().len(), 1);
        assert!(session.inventory().is_empty());
    }

    #[test]
    fn test_disambiguation_during_add() {
        let mut session = Session::new(
            Catalogue::from_items(vec![ing("Whole Milk", 1), ing("Oat Milk", 1)]),
            Inventory::new(),
            RecipeBook::new(),
        );
        ok(&mut session, "inventory");
        let mut chooser = ScriptedChooser::new([2]);
        let response = run(&mut session, &mut chooser, "add milk 3").unwrap();
        assert_eq!(response.lines, vec!["Updated Oat Milk: had 1, added 3, now 4"]);
        assert_eq!(chooser.asked().len(), 1);
    }

    #[test]
    fn test_recipe_flow() {
        let mut session = Session::new(
            Catalogue::from_items(vec![ing("Flour", 2), ing("Sugar", 1)]),
            Inventory::new(),
            RecipeBook::new(),
        );
        ok(&mut session, "recipes");
        ok(&mut session, "add Cake");
        assert_eq!(session.screen(), Screen::Recipe);
        assert_eq!(session.prompt(), "recipe:Cake");
        ok(&mut session, "add Flour 2");
        ok(&mut session, "add Sugar 1");
        ok(&mut session, "add Eggs 2");
        let listing = ok(&mut session, "list");
        assert_eq!(listing.last().unwrap(), "  Eggs (2)");
        ok(&mut session, "delete eggs");
        assert_eq!(session.active_recipe().unwrap().ingredients().len(), 2);

        ok(&mut session, "back");
        assert_eq!(session.screen(), Screen::Recipes);
        assert!(session.active_recipe().is_none());
        assert_eq!(ok(&mut session, "cookable"), vec!["1. Cake"]);
        assert_eq!(ok(&mut session, "cook cake"), vec!["Cooked Cake (used up: Flour, Sugar)"]);
        assert!(session.inventory().is_empty());
        assert_eq!(
            ok(&mut session, "cookable"),
            vec!["Nothing can be cooked with what is in stock"]
        );
    }

    #[test]
    fn test_cook_missing_reports_shortfall() {
        let mut session = Session::new(
            Catalogue::from_items(vec![ing("Flour", 1000), ing("Eggs", 4), ing("Milk", 250)]),
            Inventory::new(),
            RecipeBook::from_items(vec![Recipe::with_ingredients(
                "Crepes",
                vec![ing("Flour", 500), ing("Eggs", 2), ing("Milk", 300)],
            )
            .unwrap()]),
        );
        ok(&mut session, "recipes");
        let mut chooser = ScriptedChooser::default();
        let err = run(&mut session, &mut chooser, "cook crepes").unwrap_err();
        assert_eq!(err.to_string(), "Missing ingredients: Milk (50)");
        assert_eq!(session.inventory().get(2).unwrap().quantity(), 250);
    }

    #[test]
    fn test_shop_adds_shortfall() {
        let mut session = Session::new(
            Catalogue::from_items(vec![ing("Milk", 250)]),
            Catalogue::from_items(vec![ing("Milk", 1)]),
            RecipeBook::from_items(vec![Recipe::with_ingredients(
                "Custard",
                vec![ing("Milk", 300), ing("Eggs", 3)],
            )
            .unwrap()]),
        );
        ok(&mut session, "recipes");
        ok(&mut session, "edit custard");
        let lines = ok(&mut session, "shop");
        assert_eq!(
            lines,
            vec!["Updated Milk: had 1, added 50, now 51", "Added Eggs"]
        );
        assert_eq!(session.shopping().len(), 2);
    }

    #[test]
    fn test_recipe_add_existing_opens_it() {
        let mut session = Session::new(
            Inventory::new(),
            Inventory::new(),
            RecipeBook::from_items(vec![Recipe::new("Soup").unwrap()]),
        );
        ok(&mut session, "recipes");
        assert_eq!(ok(&mut session, "add soup")[0], "Opened Soup");
        assert_eq!(session.screen(), Screen::Recipe);
    }

    #[test]
    fn test_recipe_update_requirement() {
        let mut session = Session::new(
            Inventory::new(),
            Inventory::new(),
            RecipeBook::from_items(vec![Recipe::with_ingredients(
                "Bread",
                vec![ing("Flour", 2), ing("Yeast", 1)],
            )
            .unwrap()]),
        );
        ok(&mut session, "recipes");
        ok(&mut session, "add bread");
        assert_eq!(ok(&mut session, "update flour 5"), vec!["Set Flour from 2 to 5"]);
        let flour = session.active_recipe().unwrap().ingredients().get(0).unwrap();
        assert_eq!(flour.quantity(), 5);
        assert!(run(&mut session, &mut ScriptedChooser::default(), "update yeast 0").is_err());
        assert_eq!(ok(&mut session, "update salt 1"), vec!["salt does not exist"]);
    }

    #[test]
    fn test_recipe_delete_repeated_requirement() {
        let mut session = Session::new(
            Inventory::new(),
            Inventory::new(),
            RecipeBook::from_items(vec![Recipe::with_ingredients(
                "Bread",
                vec![ing("Flour", 2), ing("Water", 1), ing("Flour", 3)],
            )
            .unwrap()]),
        );
        ok(&mut session, "recipes");
        ok(&mut session, "add bread");

        let mut chooser = ScriptedChooser::new([2]);
        let response = run(&mut session, &mut chooser, "delete flour").unwrap();
        assert_eq!(response.lines, vec!["Removed Flour"]);
        assert_eq!(chooser.asked().len(), 1);
        assert_eq!(chooser.asked()[0].options, vec!["Flour (2)", "Flour (3)"]);

        let left: Vec<_> = session
            .active_recipe()
            .unwrap()
            .ingredients()
            .iter()
            .map(|i| (i.name(), i.quantity()))
            .collect();
        assert_eq!(left, vec![("Flour", 2), ("Water", 1)]);
    }

    #[test]
    fn test_recipe_edit_cancelled_stays() {
        let mut session = Session::new(
            Inventory::new(),
            Inventory::new(),
            RecipeBook::from_items(vec![Recipe::new("Tomato Soup").unwrap(), Recipe::new("Onion Soup").unwrap()]),
        );
        ok(&mut session, "recipes");
        let mut chooser = ScriptedChooser::new([-1]);
        let response = run(&mut session, &mut chooser, "edit soup").unwrap();
        assert_eq!(response.lines, vec!["Cancelled"]);
        assert_eq!(session.screen(), Screen::Recipes);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(StorageConfig {
            data_dir: dir.path().to_path_buf(),
            ..StorageConfig::default()
        });
        let mut session = Session::default();
        ok(&mut session, "inventory");
        ok(&mut session, "add Flour 2");
        ok(&mut session, "back");
        ok(&mut session, "recipes");
        ok(&mut session, "add Cake");
        ok(&mut session, "add Flour 2");
        assert!(session.save(&store));

        let loaded = Session::load(&store).unwrap();
        assert_eq!(loaded.inventory().len(), 1);
        assert_eq!(loaded.recipes().len(), 1);
        assert_eq!(loaded.recipes().get(0).unwrap().ingredients().len(), 1);
        assert_eq!(loaded.screen(), Screen::Main);
    }

    #[test]
    fn test_save_failure_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let store = Store::new(StorageConfig {
            data_dir: blocker.join("nested"),
            ..StorageConfig::default()
        });
        assert!(!Session::default().save(&store));
    }
}
