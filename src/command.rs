//! Command-line grammar for the interactive menu.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::error::{PantryError, Result};

static TRAILING_QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.*\S)\s+(?P<qty>[+-]?\d+)$").expect("quantity pattern")
});

/// Which menu the session is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Main,
    Inventory,
    Shopping,
    Recipes,
    /// Editing the active recipe
    Recipe,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::Main => "main menu",
            Screen::Inventory => "inventory",
            Screen::Shopping => "shopping list",
            Screen::Recipes => "recipes",
            Screen::Recipe => "recipe",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(Screen),
    Add { name: String, quantity: Option<i64> },
    Delete { name: String, quantity: Option<i64> },
    Edit { name: String, new_name: Option<String> },
    Update { name: String, quantity: i64 },
    List,
    Find(String),
    Cook(Option<String>),
    Cookable,
    /// Copy the active recipe's shortfall onto the shopping list
    Shop,
    Help,
    Back,
    Bye,
}

fn split_quantity(args: &str) -> Result<(String, i64)> {
    let caps = TRAILING_QUANTITY
        .captures(args.trim())
        .ok_or_else(|| PantryError::command("expected <name> <quantity>"))?;
    let quantity = caps["qty"]
        .parse::<i64>()
        .map_err(|_| PantryError::validation(format!("quantity {} is out of range", &caps["qty"])))?;
    Ok((caps["name"].to_string(), quantity))
}

fn require(args: &str, what: &str) -> Result<String> {
    let args = args.trim();
    if args.is_empty() {
        return Err(PantryError::command(format!("expected {}", what)));
    }
    Ok(args.to_string())
}

fn no_args(args: &str, command: Command) -> Result<Command> {
    if args.trim().is_empty() {
        Ok(command)
    } else {
        Err(PantryError::command("this command takes no arguments"))
    }
}

/// Parse one input line in the context of `screen`.
pub fn parse(line: &str, screen: Screen) -> Result<Command> {
    let line = line.trim();
    let (word, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let word = word.to_lowercase();

    match (screen, word.as_str()) {
        (_, "help" | "?") => no_args(args, Command::Help),
        (_, "bye") => no_args(args, Command::Bye),
        (Screen::Main, "inventory" | "1") => no_args(args, Command::Open(Screen::Inventory)),
        (Screen::Main, "recipes" | "2") => no_args(args, Command::Open(Screen::Recipes)),
        (Screen::Main, "shopping" | "3") => no_args(args, Command::Open(Screen::Shopping)),
        (Screen::Main, _) => Err(unknown(&word, screen)),
        (_, "back") => no_args(args, Command::Back),
        (_, "list") => no_args(args, Command::List),

        (Screen::Inventory | Screen::Shopping, "add") => {
            let (name, quantity) = split_quantity(args)?;
            Ok(Command::Add { name, quantity: Some(quantity) })
        }
        (Screen::Inventory | Screen::Shopping, "delete") => {
            let (name, quantity) = split_quantity(args)?;
            Ok(Command::Delete { name, quantity: Some(quantity) })
        }
        (Screen::Inventory | Screen::Shopping, "edit") => {
            let (name, new_name) = args
                .split_once('/')
                .ok_or_else(|| PantryError::command("expected <name> / <new name>"))?;
            Ok(Command::Edit {
                name: require(name, "<name>")?,
                new_name: Some(require(new_name, "<new name>")?),
            })
        }
        (Screen::Inventory | Screen::Shopping | Screen::Recipe, "update") => {
            let (name, quantity) = split_quantity(args)?;
            Ok(Command::Update { name, quantity })
        }
        (Screen::Inventory | Screen::Shopping | Screen::Recipes, "find") => {
            Ok(Command::Find(require(args, "a search term")?))
        }

        (Screen::Recipes, "add") => Ok(Command::Add {
            name: require(args, "a recipe name")?,
            quantity: None,
        }),
        (Screen::Recipes, "delete") => Ok(Command::Delete {
            name: require(args, "a recipe name")?,
            quantity: None,
        }),
        (Screen::Recipes, "edit") => Ok(Command::Edit {
            name: require(args, "a recipe name")?,
            new_name: None,
        }),
        (Screen::Recipes, "cook") => Ok(Command::Cook(Some(require(args, "a recipe name")?))),
        (Screen::Recipes, "cookable") => no_args(args, Command::Cookable),

        (Screen::Recipe, "add") => {
            let (name, quantity) = split_quantity(args)?;
            Ok(Command::Add { name, quantity: Some(quantity) })
        }
        (Screen::Recipe, "delete") => Ok(Command::Delete {
            name: require(args, "an ingredient name")?,
            quantity: None,
        }),
        (Screen::Recipe, "cook") => no_args(args, Command::Cook(None)),
        (Screen::Recipe, "shop") => no_args(args, Command::Shop),

        _ => Err(unknown(&word, screen)),
    }
}

fn unknown(word: &str, screen: Screen) -> PantryError {
    if word.is_empty() {
        PantryError::command("empty command, type help for a list")
    } else {
        PantryError::command(format!(
            "unknown command \"{}\" on the {}, type help for a list",
            word, screen
        ))
    }
}

/// Usage lines for `screen`.
pub fn help(screen: Screen) -> &'static [&'static str] {
    match screen {
        Screen::Main => &[
            "inventory (1)            Manage what is in stock",
            "recipes (2)              Manage recipes",
            "shopping (3)             Manage the shopping list",
            "bye                      Save and quit",
        ],
        Screen::Inventory | Screen::Shopping => &[
            "add <name> <qty>         Add stock, merging with an existing entry",
            "delete <name> <qty>      Remove stock",
            "edit <name> / <new>      Rename an entry",
            "update <name> <qty>      Set the quantity of an entry",
            "list                     Show all entries",
            "find <terms>             Show entries containing every term",
            "back                     Return to the main menu",
            "bye                      Save and quit",
        ],
        Screen::Recipes => &[
            "add <recipe>             Create a recipe and open it",
            "delete <recipe>          Delete a recipe",
            "edit <recipe>            Open a recipe",
            "list                     Show all recipes",
            "find <terms>             Show recipes containing every term",
            "cook <recipe>            Cook a recipe from the inventory",
            "cookable                 Show recipes that can be cooked now",
            "back                     Return to the main menu",
            "bye                      Save and quit",
        ],
        Screen::Recipe => &[
            "add <name> <qty>         Add a requirement",
            "delete <name>            Remove a requirement",
            "update <name> <qty>      Change a requirement's quantity",
            "list                     Show requirements and what is missing",
            "cook                     Cook this recipe",
            "shop                     Put what is missing on the shopping list",
            "back                     Return to the recipe list",
            "bye                      Save and quit",
        ],
    }
}
