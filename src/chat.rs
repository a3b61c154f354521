//! Interactive chat loop and one-shot `ask`.
//!
//! `betsy chat` reads one query per line. Two commands are recognised:
//!
//! | Input | Effect |
//! |-------|--------|
//! | `/clear` | Reset the session to the greeting, forgetting context |
//! | `/quit` | End the loop (EOF does the same) |
//!
//! With `--transcript <file>` the final session is written as JSON when
//! the loop ends.

use anyhow::{Context, Result};
use betsy_core::models::Message;
use betsy_core::{Assistant, AssistantSettings, Session, TurnResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use crate::catalog::load_from_config;
use crate::config::Config;
use crate::render::{format_message, format_turn};

const PROMPT: &str = "> ";

/// Build the assistant for `config`: catalog plus `[assistant]` settings.
pub fn build_assistant(config: &Config) -> Result<Assistant> {
    let catalog = load_from_config(config)?;
    Ok(Assistant::new(Arc::new(catalog), config.assistant.clone()))
}

/// Serialized form of `--transcript`.
#[derive(Debug, Serialize)]
pub struct Transcript<'a> {
    pub exported_at: DateTime<Utc>,
    pub turns: usize,
    pub messages: &'a [Message],
}

impl<'a> Transcript<'a> {
    pub fn of(session: &'a Session) -> Self {
        Self {
            exported_at: Utc::now(),
            turns: session.turns(),
            messages: session.messages(),
        }
    }
}

pub fn write_transcript(session: &Session, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&Transcript::of(session))?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write transcript: {}", path.display()))?;
    tracing::info!(path = %path.display(), turns = session.turns(), "transcript written");
    Ok(())
}

/// Drive a session from `input` until `/quit` or EOF.
///
/// Prompts are written only when `prompt` is set, so piped input yields
/// clean output.
pub fn chat_loop<R: BufRead, W: Write>(
    assistant: &Assistant,
    input: R,
    output: &mut W,
    prompt: bool,
) -> Result<Session> {
    let mut session = assistant.start_session();
    writeln!(output, "{}", format_message(&session.messages()[0]))?;

    let mut lines = input.lines();
    loop {
        if prompt {
            write!(output, "{}", PROMPT)?;
            output.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read from stdin")?;

        match line.trim() {
            "/quit" => break,
            "/clear" => {
                assistant.reset(&mut session);
                writeln!(output, "{}", format_message(&session.messages()[0]))?;
            }
            query => {
                if let Some(turn) = assistant.submit(&mut session, query) {
                    writeln!(output, "{}", format_turn(&turn))?;
                }
            }
        }
    }
    Ok(session)
}

/// `betsy chat`.
pub fn run_chat(config: &Config, transcript: Option<&Path>) -> Result<()> {
    let assistant = build_assistant(config)?;
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let interactive = atty::is(atty::Stream::Stdin);

    let session = chat_loop(&assistant, stdin.lock(), &mut stdout, interactive)?;

    if let Some(path) = transcript {
        write_transcript(&session, path)?;
    }
    Ok(())
}

/// Submit each query as a successive turn of one session.
///
/// Blank queries yield `None` in place, matching what the session does.
pub fn ask_all(assistant: &Assistant, queries: &[String]) -> Vec<Option<TurnResult>> {
    let mut session = assistant.start_session();
    queries
        .iter()
        .map(|q| assistant.submit(&mut session, q))
        .collect()
}

/// `betsy ask`.
pub fn run_ask(config: &Config, queries: &[String], json: bool) -> Result<()> {
    let assistant = build_assistant(config)?;
    let turns = ask_all(&assistant, queries);

    if json {
        println!("{}", serde_json::to_string_pretty(&turns)?);
        return Ok(());
    }

    for (query, turn) in queries.iter().zip(&turns) {
        match turn {
            Some(turn) => {
                println!("You: {}", query);
                println!("{}", format_turn(turn));
                println!();
            }
            None => println!("(skipped blank query)"),
        }
    }
    Ok(())
}

/// Assistant over an in-memory catalog, for tests and embedding.
pub fn assistant_from_json(json: &str, settings: AssistantSettings) -> Result<Assistant> {
    let records = crate::catalog::parse_records(json)?;
    let catalog = betsy_core::Catalog::new(records)?;
    Ok(Assistant::new(Arc::new(catalog), settings))
}
