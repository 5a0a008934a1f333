#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Binary entrypoint that wires the `arbor` pipeline together and runs it
//! until interrupted.

use std::process::ExitCode;

use arbor_app::bootstrap::Program;
use arbor_app::cli::{Cli, Command, parse_item_json};
use arbor_config::Settings;
use arbor_telemetry::{LoggingConfig, init_logging};
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load(&cli.config)?;
    init_logging(&LoggingConfig::default())?;

    match cli.command {
        Command::Run(args) => {
            let program = Program::start(&settings)?;
            if let Some(path) = args.seed_library {
                seed_library(&program, &path)?;
            }
            info!("arbor pipeline running; press ctrl-c to stop");
            tokio::signal::ctrl_c().await?;
            info!("shutdown signal received");
        }
        Command::Add(args) => {
            let item = parse_item_json(&args.item_json)?;
            let program = Program::start(&settings)?;
            program.add_to_queue(item)?;
            program.trigger_source_now(
                settings
                    .sources
                    .first()
                    .map_or("", |source| source.name.as_str()),
            );
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        }
        Command::Dump => {
            let program = Program::start(&settings)?;
            let incomplete = program.graph().get_incomplete_items().await;
            println!("{}", serde_json::to_string_pretty(&incomplete)?);
        }
    }
    Ok(())
}

fn seed_library(program: &Program, path: &std::path::Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)?;
    let items: Vec<arbor_model::MediaItem> = serde_json::from_str(&raw)?;
    let count = items.len();
    for item in items {
        program.seed_item(item);
    }
    info!(count, path = %path.display(), "seeded library from file");
    Ok(())
}
