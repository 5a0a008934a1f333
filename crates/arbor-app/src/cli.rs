//! Command-line surface for the `arbor` binary.
//!
//! Simplified from `revaer-cli`'s HTTP-client command structure (this core
//! has no API server to talk to) down to the handful of operations the
//! pipeline actually exposes: run, seed the library, enqueue one item, and
//! dump the incomplete items currently tracked.

use std::path::PathBuf;

use arbor_model::MediaItem;
use clap::{Parser, Subcommand};

const DEFAULT_CONFIG_PATH: &str = "arbor.toml";

/// Administrative CLI for an `arbor` pipeline instance.
#[derive(Parser)]
#[command(name = "arbor", about = "Media acquisition state engine")]
pub struct Cli {
    /// Path to the TOML settings file.
    #[arg(long, env = "ARBOR_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Start the pipeline and run until interrupted.
    Run(RunArgs),
    /// Enqueue a single item, given as JSON matching [`MediaItem`]'s
    /// tagged representation, then run until it reaches a stable state.
    Add(AddArgs),
    /// Print every item currently tracked in a non-`Completed` state, as
    /// a JSON array, then exit.
    Dump,
}

/// Arguments for `arbor run`.
#[derive(clap::Args)]
pub struct RunArgs {
    /// Path to a JSON file containing an array of [`MediaItem`]s to seed
    /// the graph with at startup, bypassing the normal source intake path.
    #[arg(long)]
    pub seed_library: Option<PathBuf>,
}

/// Arguments for `arbor add`.
#[derive(clap::Args)]
pub struct AddArgs {
    /// JSON for a single item, matching [`MediaItem`]'s `#[serde(tag =
    /// "type")]` representation, e.g. `{"type":"movie","header":{...}}`.
    pub item_json: String,
}

/// Parse `item_json` into a [`MediaItem`].
///
/// # Errors
///
/// Returns an error if the JSON does not match `MediaItem`'s shape.
pub fn parse_item_json(item_json: &str) -> Result<MediaItem, serde_json::Error> {
    serde_json::from_str(item_json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_movie() {
        let json = r#"{
            "type": "movie",
            "header": {
                "item_id": "00000000-0000-0000-0000-000000000001",
                "imdb_id": null,
                "title": "Dune",
                "log_string": "Dune",
                "indexed_at": null,
                "scraped_times": 0,
                "file": null,
                "folder": null,
                "symlinked": false,
                "update_folder": null,
                "aired_at": null,
                "is_anime": false
            }
        }"#;
        let item = parse_item_json(json).expect("parses");
        assert_eq!(item.header().title, "Dune");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(parse_item_json("not json").is_err());
    }

    #[test]
    fn dump_subcommand_parses_with_no_arguments() {
        let cli = Cli::try_parse_from(["arbor", "dump"]).expect("parses");
        assert!(matches!(cli.command, Command::Dump));
    }
}
