#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Tilefall game in the terminal.

mod save_file;
mod session;

use std::{io, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{error::ErrorKind, CommandFactory, Parser};
use tilefall_core::{Command, SessionSnapshot};
use tilefall_rendering_jgraph::{JgraphBackend, RenderConfig};
use tilefall_world::{apply, query, World};

use crate::{
    save_file::SaveFileError,
    session::{Outcome, Session},
};

/// Exit status reported for an unusable command line.
const USAGE_EXIT: u8 = 255;

/// Play Tilefall: pop matching tiles, chain cascades, and chase a high score.
///
/// Every turn the board is written to an image through `jgraph` and `convert`.
#[derive(Debug, Parser)]
#[command(name = "tilefall", about, long_about = None)]
struct Args {
    /// Save file to resume from and write back on quit (need not exist)
    #[arg(short = 's', long = "save", value_name = "FILE")]
    save: Option<PathBuf>,
}

/// Entry point for the Tilefall command-line interface.
fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(error) => {
            if matches!(
                error.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) {
                error.exit();
            }
            println!("Provided {} arguments...", std::env::args_os().count());
            println!("{}", Args::command().render_usage());
            return ExitCode::from(USAGE_EXIT);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let restored = match args.save.as_deref().map(save_file::load).transpose() {
        Ok(restored) => restored.flatten(),
        Err(error @ SaveFileError::Corrupt { .. }) => {
            println!("{error}");
            log::error!("{:#}", anyhow::Error::new(error));
            return ExitCode::FAILURE;
        }
        Err(error) => {
            eprintln!("error: {:#}", anyhow::Error::new(error));
            return ExitCode::FAILURE;
        }
    };

    match run(args.save, restored) {
        Ok(Outcome::GameOver { score }) => {
            log::info!("game finished with score {score}");
            ExitCode::SUCCESS
        }
        Ok(outcome) => {
            log::info!("session ended: {outcome:?}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(save: Option<PathBuf>, restored: Option<SessionSnapshot>) -> Result<Outcome> {
    let mut world = World::new(rand::random());
    let mut events = Vec::new();
    if let Some(snapshot) = restored {
        apply(&mut world, Command::Restore { snapshot }, &mut events);
    }
    log::info!(
        "{} score {}, {} turns left",
        query::welcome_banner(&world),
        query::score(&world),
        query::turns_remaining(&world)
    );

    let config = RenderConfig::from_env().context("failed to load render configuration")?;
    let backend = JgraphBackend::new(config);
    log::debug!("rendering to {}", backend.config().output.display());

    let stdin = io::stdin();
    let mut session = Session::new(world, stdin.lock(), io::stdout(), backend, save);
    session.run()
}
