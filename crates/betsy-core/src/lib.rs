//! # Betsy Core
//!
//! Query interpretation and matching engine for the Betsy product-search
//! assistant: catalog model, tokenizer, filter extraction, strict matching,
//! fallback relaxation and conversation turns.
//!
//! This crate performs no I/O. Catalog loading, configuration, and any
//! rendering of the conversation live in the application crate.
//!
//! ```text
//! query ─▶ tokenize ─▶ extract ─▶ matcher ──(empty)──▶ relax
//!                                    │                   │
//!                                    ▼                   ▼
//!                              session: user msg + bot msg + context
//! ```
//!
//! ```rust
//! use std::sync::Arc;
//! use betsy_core::catalog::Catalog;
//! use betsy_core::models::{Attribute, ProductRecord, TurnOutcome};
//! use betsy_core::session::{Assistant, AssistantSettings};
//!
//! let record = ProductRecord {
//!     id: 1,
//!     name: "Green Sneakers".into(),
//!     sku: None,
//!     price: 89.0,
//!     description: String::new(),
//!     image: None,
//!     categories: vec![],
//!     tags: vec![],
//!     attributes: vec![Attribute::new("Color", "Green"), Attribute::new("Size", 42)],
//!     related: vec![],
//!     stock: 4,
//!     on_sale: false,
//! };
//! let catalog = Catalog::new(vec![record]).unwrap();
//! let assistant = Assistant::new(Arc::new(catalog), AssistantSettings::default());
//!
//! let mut session = assistant.start_session();
//! let turn = assistant.submit(&mut session, "green sneakers").unwrap();
//! assert_eq!(turn.outcome, TurnOutcome::Match);
//! assert_eq!(session.messages().len(), 3);
//! ```

pub mod catalog;
pub mod compare;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod models;
pub mod relax;
pub mod session;
pub mod tokenize;

pub use catalog::Catalog;
pub use error::CatalogError;
pub use models::{Message, ProductRecord, TurnOutcome, TurnResult};
pub use session::{Assistant, AssistantSettings, Session, SessionContext};
