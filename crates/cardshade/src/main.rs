mod backend;
mod cards;
mod cli;
mod config;
mod layout;
mod paths;
mod run;

use std::path::PathBuf;

use anyhow::{Context, Result};
use cli::{Command, ConfigAction, SelectArgs, VariantsArgs};
use paths::AppPaths;
use serde::Serialize;
use shaderlib::{select, CardIdentity, VariantParams};

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Command::Run(args) => run::run(args),
        Command::Select(args) => run_select(args),
        Command::Variants(args) => run_variants(args),
        Command::Config(config) => match config.action {
            ConfigAction::Where => run_config_where(),
        },
    }
}

fn resolve_pack_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(dir) => Ok(dir),
        None => Ok(AppPaths::discover()?.variant_dir()),
    }
}

#[derive(Serialize)]
struct SelectionReport<'a> {
    identity: CardIdentity,
    index: usize,
    variant: &'a str,
    params: VariantParams,
}

fn run_select(args: SelectArgs) -> Result<()> {
    let library = run::load_library(&resolve_pack_dir(args.pack_dir)?)?;
    let identity = CardIdentity::new(args.overall, args.group);
    let selection = select(&library, identity);

    if args.json {
        let report = SelectionReport {
            identity,
            index: selection.index,
            variant: selection.variant.name(),
            params: selection.params,
        };
        let json =
            serde_json::to_string_pretty(&report).context("failed to serialise selection")?;
        println!("{json}");
        return Ok(());
    }

    let params = selection.params;
    println!(
        "{} (index {} of {})",
        selection.variant.name(),
        selection.index,
        library.count()
    );
    println!("  random_seed       {:.6}", params.random_seed);
    println!("  speed_multiplier  {:.6}", params.speed_multiplier);
    println!("  color_shift       {:.6}", params.color_shift);
    println!("  intensity         {:.6}", params.intensity);
    Ok(())
}

fn run_variants(args: VariantsArgs) -> Result<()> {
    let library = run::load_library(&resolve_pack_dir(args.pack_dir)?)?;
    for (index, name) in library.names().enumerate() {
        println!("{index:>3}  {name}");
    }
    Ok(())
}

fn run_config_where() -> Result<()> {
    let paths = AppPaths::discover()?;
    let file = paths.config_file();
    let status = if file.is_file() { "present" } else { "missing" };
    println!("config: {} ({status})", file.display());
    println!("variants: {}", paths.variant_dir().display());
    Ok(())
}
