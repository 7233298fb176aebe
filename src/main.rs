//! filterbind - compile a filter expression and run it against a JSON dataset

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use filterbind::expression::{ExpressionTree, Grammar, GrammarConfig};
use filterbind::{MapperRegistry, MemoryTable};
use std::path::PathBuf;

/// Compile a filter expression and select the matching rows of a dataset
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Filter expression, e.g. "{title} = 'x' and {active} = true"
    expression: String,

    /// JSON file holding an array of objects to filter
    #[arg(short = 'D', long)]
    data: Option<PathBuf>,

    /// JSON grammar configuration
    #[arg(short, long)]
    grammar: Option<PathBuf>,

    /// Only print the expression tree
    #[arg(short, long)]
    tree: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &args.grammar {
        Some(path) => GrammarConfig::load(path)?,
        None => GrammarConfig::default(),
    };
    let grammar = Grammar::from_config(&config);

    let tree = ExpressionTree::build(&args.expression, &grammar)
        .with_context(|| format!("Failed to compile {:?}", args.expression))?;
    println!("{}", tree);

    if args.tree {
        return Ok(());
    }
    let Some(data) = &args.data else {
        return Ok(());
    };

    let table = MemoryTable::load(data)?;
    let filter = tree
        .bind(&table, &MapperRegistry::standard())
        .context("Failed to bind expression")?;

    let mut matched = 0;
    for row in table.select(&filter) {
        println!("{}", table.row_to_json(row));
        matched += 1;
    }
    log::info!("{} of {} rows matched", matched, table.rows().len());

    Ok(())
}
