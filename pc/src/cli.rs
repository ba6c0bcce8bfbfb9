//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ideastore::Answer;

/// PatentChat - guided patent specification drafting
#[derive(Parser)]
#[command(
    name = "pc",
    version,
    about = "Turn a raw idea into a patent specification draft through LLM-guided Q&A"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new idea: title, first draft, and opening questions
    New {
        /// The raw idea description
        description: String,

        /// Free-text category label
        #[arg(short = 'g', long, default_value = "")]
        category: String,
    },

    /// List all ideas
    List,

    /// Show an idea's draft and conversation (id prefix accepted)
    Show {
        /// Idea id or unique prefix
        id: String,
    },

    /// Answer a pending question by turn index
    Answer {
        /// Idea id or unique prefix
        id: String,

        /// Turn index as shown by `show`
        index: usize,

        /// yes or no
        answer: Answer,
    },

    /// Regenerate the draft from all answered turns and fetch a fresh
    /// question batch
    Regen {
        /// Idea id or unique prefix
        id: String,
    },

    /// Fetch a fresh question batch for the current draft
    Questions {
        /// Idea id or unique prefix
        id: String,
    },

    /// Write the current draft markdown to a file
    Export {
        /// Idea id or unique prefix
        id: String,

        /// Output file path
        output: PathBuf,
    },

    /// Delete an idea
    Delete {
        /// Idea id or unique prefix
        id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_new() {
        let cli = Cli::parse_from(["pc", "new", "A folding bicycle frame", "--category", "transport"]);
        if let Command::New { description, category } = cli.command {
            assert_eq!(description, "A folding bicycle frame");
            assert_eq!(category, "transport");
        } else {
            panic!("Expected New command");
        }
    }

    #[test]
    fn test_cli_parse_answer() {
        let cli = Cli::parse_from(["pc", "answer", "abc123", "2", "yes"]);
        if let Command::Answer { id, index, answer } = cli.command {
            assert_eq!(id, "abc123");
            assert_eq!(index, 2);
            assert_eq!(answer, Answer::Yes);
        } else {
            panic!("Expected Answer command");
        }
    }

    #[test]
    fn test_cli_rejects_bad_answer() {
        assert!(Cli::try_parse_from(["pc", "answer", "abc123", "2", "maybe"]).is_err());
    }

    #[test]
    fn test_cli_parse_with_config_and_log_level() {
        let cli = Cli::parse_from(["pc", "-c", "/tmp/config.yml", "-l", "DEBUG", "list"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.yml")));
        assert_eq!(cli.log_level.as_deref(), Some("DEBUG"));
        assert!(matches!(cli.command, Command::List));
    }
}
