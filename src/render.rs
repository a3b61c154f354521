//! Plain-text rendering of conversation turns for the terminal.

use betsy_core::models::{Message, ProductRecord, Sender};
use betsy_core::TurnResult;

/// Name shown in front of bot messages.
pub const BOT_NAME: &str = "Betsy";

/// One product as a single indented line.
pub fn format_product(record: &ProductRecord) -> String {
    let mut line = format!("  [{}] {} - ${}", record.id, record.name, record.price_text());
    if record.on_sale {
        line.push_str(" (on sale)");
    }
    let attrs: Vec<String> = record
        .attributes
        .iter()
        .map(|a| format!("{}: {}", a.name, a.value))
        .collect();
    if !attrs.is_empty() {
        line.push_str(&format!("  {}", attrs.join(", ")));
    }
    line
}

/// A bot or user message followed by any attached results.
pub fn format_message(message: &Message) -> String {
    let speaker = match message.sender {
        Sender::Bot => BOT_NAME,
        Sender::User => "You",
    };
    let mut out = format!("{}: {}", speaker, message.text);
    if let Some(results) = &message.results {
        for record in results {
            out.push('\n');
            out.push_str(&format_product(record));
        }
    }
    out
}

pub fn format_turn(turn: &TurnResult) -> String {
    format_message(&turn.bot_message)
}
