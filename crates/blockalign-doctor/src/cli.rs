use std::io::{self, Write};

use clap::{Parser, Subcommand};

use crate::commands::{ApplyArgs, CheckArgs, ListBlocksArgs, ToolbarArgs};
use crate::error::Result;
use crate::logging;

#[derive(Debug, Parser)]
#[command(
    name = "blockalign-doctor",
    about = "Inspect block alignment support, toolbars and saved markup",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List registered block types and their alignment options.
    #[command(name = "list-blocks")]
    ListBlocks(ListBlocksArgs),

    /// Show the alignment toolbar for a block and stored value.
    Toolbar(ToolbarArgs),

    /// Insert a block, apply clicks and print the saved markup.
    Apply(ApplyArgs),

    /// Validate saved markup against the registered block types.
    Check(CheckArgs),
}

pub fn run_from_env() -> Result<()> {
    logging::init();
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(cli.command, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Run a command, writing its report to `out`.
pub fn execute(command: Commands, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::ListBlocks(args) => crate::commands::list_blocks(&args, out),
        Commands::Toolbar(args) => crate::commands::toolbar(&args, out),
        Commands::Apply(args) => crate::commands::apply(&args, out),
        Commands::Check(args) => crate::commands::check(&args, out),
    }
}
