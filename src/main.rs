//! Persona Agent - multi-persona conversational assistant
//!
//! This is the main entry point for the persona-agent binary.
//! Each user message is classified, answered by one persona, and appended to
//! a conversation thread stored on disk.

mod agent;
mod cli;
mod config;
mod engine;
mod error;
mod llm;
mod logging;
mod persona;
mod specification;
mod types;
mod version;

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::cli::{Cli, Commands, ConfigSubcommand, PersonaSubcommand, SpecSubcommand};
use crate::config::AgentConfig;
use crate::engine::{
    build_controller, ConversationTurnController, FileThreadStore, MemoryThreadStore, ThreadStore,
};
use crate::error::{Error, Result};
use crate::llm::build_client;
use crate::persona::{PersonaClassifier, PersonaRegistry};
use crate::specification::{FileSpecificationStore, SpecificationStore};

/// Printed after each reply in interactive mode
const REPLY_SEPARATOR: &str = "-------------------";

fn main() {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    // Commands that need no configuration
    match &cli.command {
        Commands::Version => {
            version::print_version();
            return Ok(());
        }
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            return handle_config_command(subcommand.clone());
        }
        Commands::Persona {
            subcommand: PersonaSubcommand::List,
        } => {
            print_persona_list();
            return Ok(());
        }
        _ => {}
    }

    let config_path = match &cli.command {
        Commands::Chat { config, .. } | Commands::Repl { config, .. } => config.config.clone(),
        Commands::Persona {
            subcommand: PersonaSubcommand::Classify { config, .. },
        } => config.config.clone(),
        Commands::Spec {
            subcommand: SpecSubcommand::Show { config } | SpecSubcommand::Clear { config },
        } => config.config.clone(),
        _ => None,
    };

    let config = AgentConfig::load(config_path.as_deref())?;

    // The guards must be kept alive for the lifetime of the program
    let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;

    let build = version::build_info();
    debug!(
        version = %build.full_version(),
        target = %build.target,
        profile = %build.profile,
        "Starting persona-agent"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create async runtime: {}", e)))?;

    runtime.block_on(async move {
        match cli.command {
            Commands::Chat {
                thread, message, ..
            } => run_chat(&config, thread, &message.join(" "), cli.quiet).await,
            Commands::Repl {
                thread, ephemeral, ..
            } => run_repl(&config, thread, ephemeral, cli.quiet).await,
            Commands::Persona {
                subcommand: PersonaSubcommand::Classify { text, .. },
            } => classify(&config, &text.join(" ")).await,
            Commands::Spec { subcommand } => handle_spec_command(&config, subcommand).await,
            Commands::Version | Commands::Config { .. } | Commands::Persona { .. } => {
                // Already handled above
                Ok(())
            }
        }
    })
}

/// Build the turn controller; ephemeral sessions keep threads in memory
fn build_engine(config: &AgentConfig, ephemeral: bool) -> Result<ConversationTurnController> {
    let threads: Arc<dyn ThreadStore> = if ephemeral {
        Arc::new(MemoryThreadStore::new())
    } else {
        Arc::new(FileThreadStore::new(config.threads_dir()))
    };
    build_controller(config, threads)
}

/// Use the given thread id or start a new thread
fn resolve_thread(thread: Option<String>, quiet: bool) -> String {
    thread.unwrap_or_else(|| {
        let id = uuid::Uuid::new_v4().to_string();
        if !quiet {
            eprintln!("Started new thread: {}", id);
        }
        id
    })
}

/// One turn
async fn run_chat(
    config: &AgentConfig,
    thread: Option<String>,
    message: &str,
    quiet: bool,
) -> Result<()> {
    let controller = build_engine(config, false)?;
    let thread_id = resolve_thread(thread, quiet);

    let reply = controller.run_turn(&thread_id, message).await?;
    println!("{}", reply);
    Ok(())
}

/// Interactive loop: one turn per stdin line until EOF or `exit`
async fn run_repl(
    config: &AgentConfig,
    thread: Option<String>,
    ephemeral: bool,
    quiet: bool,
) -> Result<()> {
    let controller = build_engine(config, ephemeral)?;
    let thread_id = resolve_thread(thread, quiet);
    info!(thread_id = %thread_id, ephemeral, "Interactive session started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if !quiet {
            eprint!("\nPrompt: ");
            std::io::stderr().flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        let reply = controller.run_turn(&thread_id, line).await?;
        println!("{}", reply);
        println!("{}", REPLY_SEPARATOR);
    }

    Ok(())
}

async fn classify(config: &AgentConfig, text: &str) -> Result<()> {
    let classifier = PersonaClassifier::new(build_client(&config.model)?);
    let result = classifier.classify_utterance(text).await;
    println!("{} ({})", result.label, result.provenance);
    Ok(())
}

fn print_persona_list() {
    let registry = PersonaRegistry::new();
    for listing in registry.list_available() {
        let marker = if listing.is_default { " (default)" } else { "" };
        println!(
            "{:<8} {:<18} {}{}",
            listing.label.slug(),
            listing.label.display_name(),
            listing.description,
            marker
        );
    }
}

/// Handle specification subcommands
async fn handle_spec_command(config: &AgentConfig, subcommand: SpecSubcommand) -> Result<()> {
    let store = FileSpecificationStore::new(config.spec_path());

    match subcommand {
        SpecSubcommand::Show { .. } => match store.read().await {
            Some(spec) => println!("{}", spec),
            None => eprintln!(
                "No specification has been written yet ({}).",
                store.path().display()
            ),
        },
        SpecSubcommand::Clear { .. } => {
            store.clear().await?;
            println!("Specification cleared: {}", store.path().display());
        }
    }

    Ok(())
}

/// Handle configuration subcommands
fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let mut cfg = AgentConfig::load(config.config.as_deref())?;
            if !cfg.model.api_key.is_empty() {
                cfg.model.api_key = "********".to_string();
            }
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let path = config::init_config(path.as_deref(), force)?;
            println!("Configuration file created: {}", path.display());
        }
        ConfigSubcommand::Validate { config } => {
            AgentConfig::load(config.config.as_deref())?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
