//! PatentChat CLI entry point
//!
//! Each subcommand is one user action: it loads the idea collection,
//! runs the draft-engine operations it needs, folds the results into
//! the record, and saves the whole collection back. Model failures
//! degrade inside the engine; persistence failures propagate and are
//! reported explicitly.

use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use std::path::Path;
use tracing::{debug, info};

use ideastore::{Idea, IdeaStore, delete_idea, find_idea, find_idea_mut};
use patentchat::cli::{Cli, Command};
use patentchat::config::Config;
use patentchat::engine::DraftEngine;
use patentchat::llm::create_client;
use patentchat::prompts::PromptLoader;

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    let level = match cli_log_level.map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to WARN", other);
            tracing::Level::WARN
        }
        None => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(model = %config.llm.model, "PatentChat loaded config");

    let store = IdeaStore::open(&config.ideas_path)?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::New { description, category } => cmd_new(&config, &store, &description, &category).await,
        Command::List => cmd_list(&store),
        Command::Show { id } => cmd_show(&store, &id),
        Command::Answer { id, index, answer } => cmd_answer(&store, &id, index, answer),
        Command::Regen { id } => cmd_regen(&config, &store, &id).await,
        Command::Questions { id } => cmd_questions(&config, &store, &id).await,
        Command::Export { id, output } => cmd_export(&store, &id, &output),
        Command::Delete { id } => cmd_delete(&store, &id),
    }
}

/// Build the draft engine from config
fn build_engine(config: &Config) -> Result<DraftEngine> {
    let llm = create_client(&config.llm).map_err(|e| eyre!("Failed to create LLM client: {}", e))?;
    let prompts = PromptLoader::new(".", config.instructions.clone());
    Ok(DraftEngine::new(llm, prompts, config.llm.max_tokens))
}

/// Create a new idea: title, bootstrap draft, first question batch
async fn cmd_new(config: &Config, store: &IdeaStore, description: &str, category: &str) -> Result<()> {
    debug!(idea_len = description.len(), "cmd_new: called");
    if description.trim().is_empty() {
        return Err(eyre!("The idea description must not be empty"));
    }

    let engine = build_engine(config)?;
    let mut idea = Idea::new(description.trim(), category);

    idea.title = engine.generate_title(&idea.description).await;

    let draft = engine
        .bootstrap_spec(&idea)
        .await
        .map_err(|e| eyre!("Bootstrap failed: {}", e))?;
    idea.apply_draft(draft);

    let questions = engine.next_questions(&idea).await;
    for q in &questions {
        idea.add_turn(q.clone());
    }

    let mut ideas = store.load()?;
    ideas.push(idea.clone());
    store.save(&ideas)?;

    println!("{} Created idea: {} ({})", "✓".green(), idea.title, idea.id.cyan());
    println!("  draft v{} ({} chars)", idea.version, idea.draft.len());
    print_pending(&idea);
    Ok(())
}

fn cmd_list(store: &IdeaStore) -> Result<()> {
    let ideas = store.load()?;
    if ideas.is_empty() {
        println!("No ideas found");
        return Ok(());
    }
    for idea in ideas {
        let title = if idea.title.is_empty() { "(untitled)" } else { &idea.title };
        let pending = idea.pending_questions().len();
        println!("{}  v{}  {}  [{} pending]", idea.id.cyan(), idea.version, title, pending);
    }
    Ok(())
}

fn cmd_show(store: &IdeaStore, id: &str) -> Result<()> {
    let ideas = store.load()?;
    let idea = find_idea(&ideas, id)?;

    println!("{}: {}", "title".yellow(), idea.title);
    println!("{}: v{}", "version".yellow(), idea.version);
    println!("{}: {}", "description".yellow(), idea.description);
    for (i, turn) in idea.conversation.iter().enumerate() {
        let marker = if turn.is_answered() { " " } else { "?" };
        println!("  {}[{}] {} -> {}", marker, i, turn.question, turn.answer);
    }
    println!("{}", "--- draft ---".dimmed());
    println!("{}", idea.draft);
    Ok(())
}

fn cmd_answer(store: &IdeaStore, id: &str, index: usize, answer: ideastore::Answer) -> Result<()> {
    debug!(id, index, %answer, "cmd_answer: called");
    let mut ideas = store.load()?;
    let idea = find_idea_mut(&mut ideas, id)?;

    idea.answer_turn(index, answer)
        .map_err(|e| eyre!("Cannot answer turn {}: {}", index, e))?;
    let remaining = idea.pending_questions().len();
    store.save(&ideas)?;

    println!("{} Recorded answer for turn {}", "✓".green(), index);
    if remaining == 0 {
        println!("  all questions answered; run {} to update the draft", "pc regen".bold());
    } else {
        println!("  {} question(s) still pending", remaining);
    }
    Ok(())
}

/// Regenerate the draft from all answered turns, then fetch the next
/// question batch
async fn cmd_regen(config: &Config, store: &IdeaStore, id: &str) -> Result<()> {
    debug!(id, "cmd_regen: called");
    let engine = build_engine(config)?;
    let mut ideas = store.load()?;
    let idea = find_idea_mut(&mut ideas, id)?;

    let outcome = engine
        .regenerate_spec(idea)
        .await
        .map_err(|e| eyre!("Cannot regenerate: {}", e))?;

    match outcome {
        Some(draft) => {
            idea.apply_draft(draft);
            let questions = engine.next_questions(idea).await;
            for q in &questions {
                idea.add_turn(q.clone());
            }
            println!("{} Regenerated draft: now v{}", "✓".green(), idea.version);
            print_pending(idea);
        }
        None => {
            // Distinct from a no-op: the model was unreachable and the
            // draft was left as it was
            println!(
                "{} Model unavailable; draft left unchanged at v{}. Retry later.",
                "!".red(),
                idea.version
            );
        }
    }

    store.save(&ideas)?;
    Ok(())
}

/// Fetch a fresh question batch for the current draft
async fn cmd_questions(config: &Config, store: &IdeaStore, id: &str) -> Result<()> {
    debug!(id, "cmd_questions: called");
    let engine = build_engine(config)?;
    let mut ideas = store.load()?;
    let idea = find_idea_mut(&mut ideas, id)?;

    let questions = engine.next_questions(idea).await;
    if questions.is_empty() {
        println!("No questions generated (model unavailable or draft complete)");
        return Ok(());
    }
    for q in &questions {
        idea.add_turn(q.clone());
    }
    print_pending(idea);
    store.save(&ideas)?;
    Ok(())
}

fn cmd_export(store: &IdeaStore, id: &str, output: &Path) -> Result<()> {
    let ideas = store.load()?;
    let idea = find_idea(&ideas, id)?;
    if idea.draft.is_empty() {
        return Err(eyre!("Idea has no draft yet"));
    }
    std::fs::write(output, &idea.draft).context(format!("Failed to write {}", output.display()))?;
    println!("{} Exported draft v{} to {}", "✓".green(), idea.version, output.display());
    Ok(())
}

fn cmd_delete(store: &IdeaStore, id: &str) -> Result<()> {
    let mut ideas = store.load()?;
    let full_id = find_idea(&ideas, id)?.id.clone();
    delete_idea(&mut ideas, &full_id);
    store.save(&ideas)?;
    println!("{} Deleted idea: {}", "✓".green(), full_id);
    Ok(())
}

fn print_pending(idea: &Idea) {
    let pending = idea.pending_questions();
    if pending.is_empty() {
        return;
    }
    println!("Pending questions:");
    for (index, question) in pending {
        println!("  [{}] {}", index, question);
    }
}
