//! CLI command definitions and dispatch.

mod convert;
mod flatten;
mod lineage;

use clap::{Parser, Subcommand};

/// Monodef — flatten container build scripts into Singularity recipes.
#[derive(Parser)]
#[command(name = "monodef", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Command {
    /// Translate one image's build script into a definition file
    Convert(convert::ConvertArgs),
    /// Resolve an image's ancestry and emit one flattened recipe
    Flatten(flatten::FlattenArgs),
    /// Print an image's ancestor chain
    Lineage(lineage::LineageArgs),
}

/// Dispatch a parsed CLI to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Convert(args) => convert::execute(args).await,
        Command::Flatten(args) => flatten::execute(args).await,
        Command::Lineage(args) => lineage::execute(args).await,
    }
}
