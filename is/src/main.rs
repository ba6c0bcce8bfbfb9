use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use log::info;

use ideastore::cli::{Cli, Command};
use ideastore::config::Config;
use ideastore::{IdeaStore, delete_idea, find_idea};

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("ideastore starting");

    let store = IdeaStore::open(&config.ideas_path)?;

    match cli.command {
        Command::List => {
            let ideas = store.load()?;
            if ideas.is_empty() {
                println!("No ideas found");
            } else {
                for idea in ideas {
                    let title = if idea.title.is_empty() { "(untitled)" } else { &idea.title };
                    println!(
                        "{}  v{}  {}  [{} turns]",
                        idea.id.cyan(),
                        idea.version,
                        title,
                        idea.conversation.len()
                    );
                }
            }
        }
        Command::Show { id, json } => {
            let ideas = store.load()?;
            let idea = find_idea(&ideas, &id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(idea)?);
            } else {
                println!("{}: {}", "id".yellow(), idea.id);
                println!("{}: {}", "title".yellow(), idea.title);
                println!("{}: {}", "category".yellow(), idea.category);
                println!("{}: v{}", "version".yellow(), idea.version);
                println!("{}: {}", "description".yellow(), idea.description);
                for (i, turn) in idea.conversation.iter().enumerate() {
                    println!("  [{}] {} -> {}", i, turn.question, turn.answer);
                }
                if !idea.draft.is_empty() {
                    println!("{}", "--- draft ---".dimmed());
                    println!("{}", idea.draft);
                }
            }
        }
        Command::Delete { id } => {
            let mut ideas = store.load()?;
            if delete_idea(&mut ideas, &id) {
                store.save(&ideas)?;
                println!("{} Deleted idea: {}", "✓".green(), id);
            } else {
                return Err(eyre!("Idea not found: {}", id));
            }
        }
        Command::Path => {
            println!("{}", store.path().display());
        }
    }

    Ok(())
}
