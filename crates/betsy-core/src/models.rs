//! Core data models used throughout Betsy.
//!
//! These types represent the product records the assistant searches over,
//! the messages appended to a conversation log, and the result of a single
//! conversation turn.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single attribute value: free text (`"750ml"`) or a number (`2021`).
///
/// Deserializes from either a JSON string or a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Number(n) => f.write_str(&format_number(*n)),
            AttributeValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        AttributeValue::Number(n)
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        AttributeValue::Number(n as f64)
    }
}

/// A named product attribute such as `Size = 42` or `Volume = "750ml"`.
///
/// Names compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// An immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub related: Vec<u64>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default, rename = "onSale", alias = "on_sale")]
    pub on_sale: bool,
}

impl ProductRecord {
    /// First attribute whose name matches `name` case-insensitively.
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|a| a.is_named(name))
            .map(|a| &a.value)
    }

    /// Price rendered the same way numeric attribute values are.
    pub fn price_text(&self) -> String {
        format_number(self.price)
    }
}

/// Render a number without a trailing `.0` when it is integral.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Who sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One entry of the append-only conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<ProductRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::plain(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::plain(Sender::Bot, text)
    }

    fn plain(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            results: None,
            label: None,
            count: None,
            query: None,
        }
    }
}

/// How a turn was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TurnOutcome {
    /// The strict match produced results.
    Match,
    /// The strict match was empty; a relaxation step produced results.
    FallbackMatch,
    /// Nothing matched, even after relaxation.
    NoMatch,
}

impl TurnOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnOutcome::Match => "match",
            TurnOutcome::FallbackMatch => "fallback-match",
            TurnOutcome::NoMatch => "no-match",
        }
    }
}

/// Everything the rendering layer needs from one submitted query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResult {
    pub outcome: TurnOutcome,
    pub bot_message: Message,
    pub results: Vec<ProductRecord>,
}

/// `"product"` or `"products"` depending on `count`.
pub fn product_noun(count: usize) -> &'static str {
    if count == 1 {
        "product"
    } else {
        "products"
    }
}
