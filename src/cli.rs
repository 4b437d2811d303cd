//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for the persona agent.

use clap::{Args, Parser, Subcommand};

/// Persona Agent - multi-persona conversational assistant
///
/// Routes each message to one of five personas (product manager, software
/// engineer, travel agent, joker, AI with ADHD). The product manager keeps a
/// project specification on disk that it refines across turns.
#[derive(Parser, Debug)]
#[command(name = "persona-agent")]
#[command(
    author,
    version,
    about = "Persona Agent - multi-persona conversational assistant",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by commands that load the configuration
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArg {
    /// Path to configuration file
    #[arg(short, long, env = "PERSONA_AGENT_CONFIG")]
    pub config: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one message and print the reply
    Chat {
        #[command(flatten)]
        config: ConfigArg,

        /// Conversation thread to continue (a new one is started if omitted)
        #[arg(short, long)]
        thread: Option<String>,

        /// The message (multiple words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Interactive conversation over stdin
    Repl {
        #[command(flatten)]
        config: ConfigArg,

        /// Conversation thread to continue (a new one is started if omitted)
        #[arg(short, long)]
        thread: Option<String>,

        /// Keep the conversation in memory only; nothing is written to the threads directory
        #[arg(long)]
        ephemeral: bool,
    },

    /// Persona inspection
    Persona {
        #[command(subcommand)]
        subcommand: PersonaSubcommand,
    },

    /// The product manager's specification document
    Spec {
        #[command(subcommand)]
        subcommand: SpecSubcommand,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Display version and build information
    Version,
}

/// Persona subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PersonaSubcommand {
    /// List all personas
    List,

    /// Show which persona would answer a message
    Classify {
        #[command(flatten)]
        config: ConfigArg,

        /// The message to classify
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}

/// Specification subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SpecSubcommand {
    /// Print the current specification
    Show {
        #[command(flatten)]
        config: ConfigArg,
    },

    /// Delete the current specification
    Clear {
        #[command(flatten)]
        config: ConfigArg,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration
    Show {
        #[command(flatten)]
        config: ConfigArg,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        #[command(flatten)]
        config: ConfigArg,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        // Verifies that the CLI definition is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_chat_joins_words() {
        let cli = Cli::parse_from(["persona-agent", "chat", "tell", "me", "a", "joke"]);
        match cli.command {
            Commands::Chat { message, thread, .. } => {
                assert_eq!(message.join(" "), "tell me a joke");
                assert!(thread.is_none());
            }
            _ => panic!("Expected Chat command"),
        }
    }

    #[test]
    fn test_chat_with_thread_and_config() {
        let cli = Cli::parse_from([
            "persona-agent",
            "chat",
            "--thread",
            "abc",
            "--config",
            "/path/to/config.toml",
            "hello",
        ]);
        match cli.command {
            Commands::Chat { config, thread, .. } => {
                assert_eq!(thread.as_deref(), Some("abc"));
                assert_eq!(config.config.as_deref(), Some("/path/to/config.toml"));
            }
            _ => panic!("Expected Chat command"),
        }
    }

    #[test]
    fn test_chat_requires_message() {
        assert!(Cli::try_parse_from(["persona-agent", "chat"]).is_err());
    }

    #[test]
    fn test_persona_classify() {
        let cli = Cli::parse_from(["persona-agent", "persona", "classify", "plan", "a", "trip"]);
        match cli.command {
            Commands::Persona {
                subcommand: PersonaSubcommand::Classify { text, .. },
            } => assert_eq!(text, vec!["plan", "a", "trip"]),
            _ => panic!("Expected Persona Classify command"),
        }
    }

    #[test]
    fn test_spec_clear() {
        let cli = Cli::parse_from(["persona-agent", "spec", "clear"]);
        assert!(matches!(
            cli.command,
            Commands::Spec {
                subcommand: SpecSubcommand::Clear { .. }
            }
        ));
    }

    #[test]
    fn test_repl_ephemeral() {
        let cli = Cli::parse_from(["persona-agent", "repl", "--ephemeral"]);
        match cli.command {
            Commands::Repl { ephemeral, thread, .. } => {
                assert!(ephemeral);
                assert!(thread.is_none());
            }
            _ => panic!("Expected Repl command"),
        }

        let cli = Cli::parse_from(["persona-agent", "repl"]);
        assert!(matches!(cli.command, Commands::Repl { ephemeral: false, .. }));
    }

    #[test]
    fn test_help_shows_title() {
        let help = Cli::command().render_help().to_string();
        assert!(help.contains("Persona Agent - multi-persona conversational assistant"));
    }

    #[test]
    fn test_verbose_flags() {
        let cli = Cli::parse_from(["persona-agent", "-vv", "version"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_quiet_flag() {
        let cli = Cli::parse_from(["persona-agent", "--quiet", "version"]);
        assert!(cli.quiet);
    }

    #[test]
    fn test_config_init() {
        let cli = Cli::parse_from(["persona-agent", "config", "init", "--force"]);
        match cli.command {
            Commands::Config {
                subcommand: ConfigSubcommand::Init { path, force },
            } => {
                assert!(path.is_none());
                assert!(force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }
}
