//! CLI argument parsing for ideastore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "is")]
#[command(author, version, about = "Inspect persisted patent idea records", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all ideas
    List,

    /// Show one idea in full (id prefix accepted)
    Show {
        /// Idea id or unique prefix
        #[arg(required = true)]
        id: String,

        /// Print the raw persisted JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Delete an idea (id must be exact)
    Delete {
        /// Idea id to delete
        #[arg(required = true)]
        id: String,
    },

    /// Print the path of the backing ideas file
    Path,
}
