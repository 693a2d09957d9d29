#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Skirmish in a terminal.

mod input;
mod terminal;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use skirmish_controller::{MatchConfig, MatchController};
use skirmish_persistence::FileStore;
use tokio::io::{self, AsyncBufReadExt, BufReader};

use crate::{
    input::{parse_line, Line, HELP},
    terminal::TerminalPresenter,
};

/// Turn-based tactical skirmish on a square grid.
#[derive(Debug, Parser)]
#[command(name = "skirmish")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File holding the saved match.
    #[arg(long, default_value = "skirmish-save.json")]
    save: PathBuf,

    /// TOML file overriding match settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible match (default: random).
    #[arg(long)]
    seed: Option<u64>,
}

/// Entry point for the Skirmish command-line interface.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => MatchConfig::from_path(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => MatchConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let presenter = TerminalPresenter::new(std::io::stdout(), config.board());
    let store = FileStore::new(args.save.clone());
    let mut controller = MatchController::new(config, presenter, store);
    controller.init().await;
    controller.presenter_mut().render()?;
    println!("{HELP}");

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        match parse_line(&line, controller.config().board()) {
            Ok(None) => continue,
            Ok(Some(Line::Quit)) => break,
            Ok(Some(Line::Help)) => println!("{HELP}"),
            Ok(Some(Line::Input(input))) => controller.handle_input(input).await,
            Err(error) => eprintln!("{error:#}"),
        }
        controller.presenter_mut().render()?;
    }

    controller.persist();
    info!("[Cli] match saved to {}", args.save.display());
    Ok(())
}
