//! Query tokenizer.
//!
//! Lowercases a raw query, splits it on whitespace runs, trims punctuation
//! from the edges of each word and drops stop words. Token order is
//! preserved and duplicates are kept, since the filter extractor rebuilds
//! multi-word phrases from adjacent tokens.
//!
//! # Example
//!
//! ```rust
//! use betsy_core::tokenize::tokenize;
//!
//! let tokens = tokenize("I am looking for the GREEN sneakers?");
//! assert_eq!(tokens, vec!["green", "sneakers"]);
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

/// Built-in stop words: articles, prepositions, auxiliary verbs, pronouns
/// and query-framing words.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    // articles and determiners
    "a", "an", "the", "some", "any", "this", "that", "these", "those",
    // prepositions and conjunctions
    "to", "for", "of", "in", "on", "at", "with", "by", "from", "about", "and", "or",
    // auxiliaries
    "is", "are", "am", "be", "was", "were", "been", "do", "does", "did", "have", "has",
    "had", "can", "could", "would", "will", "should", "may", "might",
    // pronouns
    "i", "i'm", "im", "i'd", "me", "my", "you", "your", "we", "it", "there", "here",
    "what", "what's", "whats", "which", "there's", "it's",
    // query framing
    "looking", "look", "find", "want", "need", "show", "get", "give", "search",
    "searching", "buy", "got", "please", "something", "anything", "items", "products",
    "stuff", "things", "hi", "hello", "hey",
];

/// Characters trimmed from both ends of every word.
const EDGE_PUNCTUATION: &[char] = &['?', '!', ',', ';', ':', '.', '"', '\'', '(', ')'];

static DEFAULT_TOKENIZER: LazyLock<Tokenizer> = LazyLock::new(Tokenizer::new);

/// Splits and normalizes queries against a fixed stop-word set.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stop_words: HashSet<String>,
}

impl Tokenizer {
    /// Tokenizer with [`DEFAULT_STOP_WORDS`].
    pub fn new() -> Self {
        Self {
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Tokenizer with [`DEFAULT_STOP_WORDS`] plus `extra`.
    pub fn with_extra_stop_words<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tokenizer = Self::new();
        for word in extra {
            let w = normalize_word(word.as_ref());
            if !w.is_empty() {
                tokenizer.stop_words.insert(w);
            }
        }
        tokenizer
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Split `query` into its significant, lowercased tokens.
    pub fn tokenize(&self, query: &str) -> Vec<String> {
        words(query)
            .filter(|w| !self.is_stop_word(w))
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Tokenize with the default stop-word set.
pub fn tokenize(query: &str) -> Vec<String> {
    DEFAULT_TOKENIZER.tokenize(query)
}

/// Lowercase `raw` and trim edge punctuation.
pub fn normalize_word(raw: &str) -> String {
    raw.to_lowercase().trim_matches(EDGE_PUNCTUATION).to_string()
}

/// All non-empty normalized words of `text`, stop words included.
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(normalize_word)
        .filter(|w| !w.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n ").is_empty());
    }

    #[test]
    fn test_drops_stop_words_and_lowercases() {
        assert_eq!(
            tokenize("Do you have Red Wine for a dinner?"),
            vec!["red", "wine", "dinner"]
        );
    }

    #[test]
    fn test_keeps_order_and_duplicates() {
        assert_eq!(tokenize("red  red   wine"), vec!["red", "red", "wine"]);
    }

    #[test]
    fn test_keeps_currency_and_percent() {
        assert_eq!(tokenize("price $40"), vec!["price", "$40"]);
        assert_eq!(tokenize("abv 12.5%"), vec!["abv", "12.5%"]);
    }

    #[test]
    fn test_retokenizing_is_stable() {
        let queries = [
            "I'm LOOKING for the green sneakers, size 42!",
            "show me something on sale",
            "vintage 2021 please",
            "\"quoted\" (words) here.",
        ];
        for q in queries {
            let once = tokenize(q);
            let twice = tokenize(&once.join(" "));
            assert_eq!(once, twice, "unstable tokenization for {:?}", q);
        }
    }

    #[test]
    fn test_extra_stop_words() {
        let t = Tokenizer::with_extra_stop_words(["Betsy", "  "]);
        assert_eq!(t.tokenize("betsy find sneakers"), vec!["sneakers"]);
        assert!(t.is_stop_word("the"));
    }
}
