//! # Betsy CLI (`betsy`)
//!
//! ## Usage
//!
//! ```bash
//! betsy --config ./config/betsy.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `betsy chat` | Interactive conversation on stdin |
//! | `betsy ask "<query>"...` | Run queries as successive turns of one session |
//! | `betsy catalog` | List the active (in-stock) catalog |
//! | `betsy serve` | Start the HTTP session server |
//! | `betsy completions <shell>` | Print a shell completion script |
//!
//! ## Examples
//!
//! ```bash
//! # Find a product, then refine with a size
//! betsy ask "sneakers" "red size 42"
//!
//! # Machine-readable turns
//! betsy ask "what's on sale?" --json
//!
//! # Keep a record of an interactive chat
//! betsy chat --transcript ./chat.json
//! ```

use anyhow::Result;
use betsy::{catalog, chat, config, logging, server};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Betsy, a conversational product-search assistant.
///
/// All commands except `completions` read a TOML configuration file given
/// by `--config`. See `config/betsy.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "betsy",
    about = "Betsy, a conversational product-search assistant",
    version,
    long_about = "Betsy answers free-form shopping questions against a local product catalog. \
    Colors, sizes, prices, attribute pairs and sale intent are pulled out of each query and \
    matched strictly; when nothing matches, constraints are relaxed step by step."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/betsy.toml")]
    config: PathBuf,

    /// Log at debug level (overridden by `RUST_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Chat interactively.
    ///
    /// Reads one query per line from stdin. `/clear` starts over,
    /// `/quit` or EOF ends the conversation.
    Chat {
        /// Write the conversation as JSON to this file on exit.
        #[arg(long)]
        transcript: Option<PathBuf>,
    },

    /// Run one or more queries as successive turns of a single session.
    Ask {
        /// Queries, in order.
        #[arg(required = true)]
        queries: Vec<String>,

        /// Print the turn results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the active catalog.
    Catalog {
        /// Print the records as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP server.
    ///
    /// Binds to the address configured in `[server].bind`.
    Serve,

    /// Generate a shell completion script.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // Commands that don't require config
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "betsy", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Chat { transcript } => {
            chat::run_chat(&cfg, transcript.as_deref())?;
        }
        Commands::Ask { queries, json } => {
            chat::run_ask(&cfg, &queries, json)?;
        }
        Commands::Catalog { json } => {
            catalog::run_catalog(&cfg, json)?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
