//! Conversation sessions and turn processing.
//!
//! A [`Session`] is a plain value: the append-only message log plus the
//! small [`SessionContext`] carried between turns. It is owned by whoever
//! drives the conversation (a CLI loop, one HTTP client) and handed to
//! [`Assistant::submit`] for each query. The [`Assistant`] itself only holds
//! the shared, read-only catalog and settings, so one assistant can serve
//! any number of independent sessions.
//!
//! # Turn
//!
//! 1. Blank query: nothing happens, `submit` returns `None`.
//! 2. Tokenize, extract filters with the current context, match.
//! 3. Non-empty match: `match` outcome; context picks up this turn's
//!    product-type term, if it named one.
//! 4. Otherwise try the relaxation chain: `fallback-match` on success.
//! 5. Otherwise `no-match` with the apology text.
//!
//! The user message, the bot message and the context update are applied
//! together once the turn is fully resolved.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::extract::{Extraction, FilterExtractor};
use crate::matcher::Matcher;
use crate::models::{product_noun, Message, ProductRecord, Sender, TurnOutcome, TurnResult};
use crate::relax::{relax, Relaxation};
use crate::tokenize::Tokenizer;

pub const DEFAULT_GREETING: &str = "👋 Hi! What product are you looking for today?";
pub const DEFAULT_APOLOGY: &str =
    "😔 Sorry, I couldn’t find an exact match. Maybe try another color or size?";

/// Context carried from one turn to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Product-type term of the last successful search that named one.
    pub last_search_term: Option<String>,
}

/// One conversation: message log plus carried context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    messages: Vec<Message>,
    context: SessionContext,
}

impl Session {
    /// A session whose log holds only `greeting`.
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::bot(greeting)],
            context: SessionContext::default(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Number of completed turns.
    pub fn turns(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.sender == Sender::User)
            .count()
    }
}

/// Assistant texts and vocabulary knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    pub greeting: String,
    pub apology: String,
    /// Attribute holding a record's color.
    pub color_attribute: String,
    /// Attribute holding a record's size.
    pub size_attribute: String,
    /// Added to the built-in stop words.
    pub extra_stop_words: Vec<String>,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
            apology: DEFAULT_APOLOGY.to_string(),
            color_attribute: "color".to_string(),
            size_attribute: "size".to_string(),
            extra_stop_words: Vec::new(),
        }
    }
}

/// A fully resolved turn, before anything is written to a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub extraction: Extraction,
    pub outcome: TurnOutcome,
    pub results: Vec<ProductRecord>,
    pub relaxation: Option<Relaxation>,
}

/// Shared query engine: catalog plus settings.
#[derive(Debug, Clone)]
pub struct Assistant {
    catalog: Arc<Catalog>,
    settings: AssistantSettings,
    extractor: FilterExtractor,
    matcher: Matcher,
}

impl Assistant {
    pub fn new(catalog: Arc<Catalog>, settings: AssistantSettings) -> Self {
        let tokenizer = Tokenizer::with_extra_stop_words(&settings.extra_stop_words);
        let extractor = FilterExtractor::new(
            tokenizer,
            settings.color_attribute.clone(),
            settings.size_attribute.clone(),
        );
        let matcher = Matcher::new(
            settings.color_attribute.clone(),
            settings.size_attribute.clone(),
        );
        Self {
            catalog,
            settings,
            extractor,
            matcher,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    /// A fresh session seeded with the greeting.
    pub fn start_session(&self) -> Session {
        Session::new(self.settings.greeting.clone())
    }

    /// Clear the log back to the greeting and forget the context.
    pub fn reset(&self, session: &mut Session) {
        *session = self.start_session();
    }

    /// Tokenize and extract `query` against `context`.
    pub fn interpret(&self, query: &str, context: &SessionContext) -> Extraction {
        let tokens = self.extractor.tokenizer().tokenize(query);
        self.extractor
            .extract(query, &tokens, &self.catalog, context)
    }

    /// Resolve `query` without touching any session.
    pub fn resolve(&self, query: &str, context: &SessionContext) -> Resolution {
        let tokens = self.extractor.tokenizer().tokenize(query);
        let extraction = self
            .extractor
            .extract(query, &tokens, &self.catalog, context);

        let results = self.matcher.find_extracted(&self.catalog, &extraction);
        if !results.is_empty() {
            return Resolution {
                extraction,
                outcome: TurnOutcome::Match,
                results,
                relaxation: None,
            };
        }

        match relax(&self.catalog, &self.matcher, &extraction) {
            Some(relaxed) => Resolution {
                extraction,
                outcome: TurnOutcome::FallbackMatch,
                results: relaxed.results,
                relaxation: Some(relaxed.relaxation),
            },
            None => Resolution {
                extraction,
                outcome: TurnOutcome::NoMatch,
                results: Vec::new(),
                relaxation: None,
            },
        }
    }

    /// Process one user query against `session`.
    ///
    /// Returns `None`, leaving the session untouched, for blank input.
    pub fn submit(&self, session: &mut Session, query: &str) -> Option<TurnResult> {
        if query.trim().is_empty() {
            return None;
        }

        let resolution = self.resolve(query, &session.context);
        let bot_message = self.reply(query, &resolution);

        tracing::debug!(
            query,
            outcome = resolution.outcome.as_str(),
            kinds = ?resolution.extraction.kinds(),
            free_text = ?resolution.extraction.free_text,
            results = resolution.results.len(),
            "turn resolved"
        );

        session.messages.push(Message::user(query));
        session.messages.push(bot_message.clone());
        if resolution.outcome == TurnOutcome::Match {
            if let Some(term) = resolution.extraction.detected_term() {
                session.context.last_search_term = Some(term.to_string());
            }
        }

        Some(TurnResult {
            outcome: resolution.outcome,
            bot_message,
            results: resolution.results,
        })
    }

    fn reply(&self, query: &str, resolution: &Resolution) -> Message {
        let count = resolution.results.len();
        let noun = product_noun(count);
        let (text, label) = match (&resolution.outcome, &resolution.relaxation) {
            (TurnOutcome::Match, _) => (
                format!(
                    "Found {} {} for: \"{}\". That might interest you!",
                    count, noun, query
                ),
                noun.to_string(),
            ),
            (TurnOutcome::FallbackMatch, Some(relaxation)) => {
                let label = relaxation.label();
                (
                    format!(
                        "No exact match for \"{}\". Showing {} {} for {} instead.",
                        query, count, noun, label
                    ),
                    label,
                )
            }
            _ => {
                let mut message = Message::bot(self.settings.apology.clone());
                message.query = Some(query.to_string());
                return message;
            }
        };

        Message {
            sender: Sender::Bot,
            text,
            results: Some(resolution.results.clone()),
            label: Some(label),
            count: Some(count),
            query: Some(query.to_string()),
        }
    }
}
