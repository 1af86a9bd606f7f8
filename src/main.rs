use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pantry::command::{help, Screen};
use pantry::config::Config;
use pantry::console::Console;
use pantry::cook::{cookable_recipes, missing_ingredients};
use pantry::store::{CatalogueKind, Store};
use pantry::{PantryError, Result, Session};

/// pantry - Track kitchen stock, recipes and what you can cook
#[derive(Parser)]
#[command(name = "pantry")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long, global = true, default_value = ".pantry.toml")]
    config: PathBuf,

    /// Directory holding the snapshot files (overrides the config)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive menu (default)
    Repl,

    /// Print a catalogue
    List {
        /// Which catalogue to print
        #[arg(value_enum)]
        kind: CatalogueKind,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recipes that can be cooked with current stock
    Cookable {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what a recipe is missing
    Missing {
        /// Recipe name
        recipe: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = load_store(&cli).and_then(|store| match cli.command {
        None | Some(Commands::Repl) => cmd_repl(&store, cli.quiet),
        Some(Commands::List { kind, json }) => cmd_list(&store, kind, json),
        Some(Commands::Cookable { json }) => cmd_cookable(&store, json),
        Some(Commands::Missing { recipe, json }) => cmd_missing(&store, &recipe.join(" "), json),
    });

    if let Err(e) = result {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "pantry=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn load_store(cli: &Cli) -> Result<Store> {
    let mut config = Config::load(&cli.config)?;
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.clone();
    }
    if !config.display.color {
        colored::control::set_override(false);
    }
    tracing::debug!(data_dir = %config.storage.data_dir.display(), "using data directory");
    Ok(Store::new(config.storage))
}

fn cmd_repl(store: &Store, quiet: bool) -> Result<()> {
    let mut session = Session::load(store)?;
    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout());

    if !quiet {
        println!("{}", "pantry".green().bold());
        for line in help(Screen::Main) {
            println!("  {}", line);
        }
        println!();
    }

    let result = run_loop(&mut session, &mut console);

    if session.save(store) {
        if !quiet {
            println!("{}", "Saved.".dimmed());
        }
    } else {
        eprintln!("{}", "Some changes could not be saved, see log above.".yellow());
    }
    result
}

fn run_loop<R: BufRead, W: Write>(session: &mut Session, console: &mut Console<R, W>) -> Result<()> {
    loop {
        let Some(line) = console.prompt(&session.prompt())? else {
            console.print("")?;
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match session.execute(&line, console) {
            Ok(response) => {
                for text in &response.lines {
                    console.print(text)?;
                }
                if response.exit {
                    break;
                }
            }
            Err(e) => console.print(&format!("{}: {}", "error".red().bold(), e))?,
        }
    }
    Ok(())
}

fn cmd_list(store: &Store, kind: CatalogueKind, json: bool) -> Result<()> {
    let session = Session::load(store)?;

    if json {
        let out = match kind {
            CatalogueKind::Inventory => serde_json::to_string_pretty(session.inventory())?,
            CatalogueKind::Shopping => serde_json::to_string_pretty(session.shopping())?,
            CatalogueKind::Recipes => serde_json::to_string_pretty(session.recipes())?,
        };
        println!("{}", out);
        return Ok(());
    }

    let lines: Vec<String> = match kind {
        CatalogueKind::Inventory => session.inventory().iter().map(|i| i.to_string()).collect(),
        CatalogueKind::Shopping => session.shopping().iter().map(|i| i.to_string()).collect(),
        CatalogueKind::Recipes => session
            .recipes()
            .iter()
            .map(|r| {
                let needs: Vec<String> = r.ingredients().iter().map(|i| i.to_string()).collect();
                format!("{}: {}", r.name().cyan(), needs.join(", "))
            })
            .collect(),
    };

    if lines.is_empty() {
        println!("{}", format!("The {} is empty.", kind).yellow());
        return Ok(());
    }
    println!("{} entries in the {}\n", lines.len().to_string().green().bold(), kind);
    for line in lines {
        println!("  {}", line);
    }
    Ok(())
}

fn cmd_cookable(store: &Store, json: bool) -> Result<()> {
    let session = Session::load(store)?;
    let ready = cookable_recipes(session.recipes(), session.inventory());

    if json {
        println!("{}", serde_json::to_string_pretty(&ready)?);
        return Ok(());
    }

    if ready.is_empty() {
        println!("{}", "Nothing can be cooked with what is in stock.".yellow());
        return Ok(());
    }
    println!("{} recipes ready to cook\n", ready.len().to_string().green().bold());
    for recipe in ready {
        println!("  {}", recipe.name().cyan());
    }
    Ok(())
}

fn cmd_missing(store: &Store, name: &str, json: bool) -> Result<()> {
    let session = Session::load(store)?;
    let recipes = session.recipes();
    let recipe = match recipes.position(name) {
        Some(idx) => &recipes.items()[idx],
        None => {
            let similar: Vec<&str> = recipes.find(name).iter().map(|r| r.name()).collect();
            if !similar.is_empty() {
                eprintln!("Did you mean: {}", similar.join(", ").cyan());
            }
            return Err(PantryError::NotFound(name.trim().to_string()));
        }
    };
    let missing = missing_ingredients(recipe, session.inventory());

    if json {
        println!("{}", serde_json::to_string_pretty(&missing)?);
        return Ok(());
    }

    if missing.is_empty() {
        println!("{} {}", recipe.name().cyan(), "has everything it needs.".green());
        return Ok(());
    }
    println!("{} is missing:\n", recipe.name().cyan());
    for item in missing {
        println!("  {}", item);
    }
    Ok(())
}
