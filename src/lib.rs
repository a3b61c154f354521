//! # Betsy
//!
//! A conversational product-search assistant over a local JSON catalog.
//!
//! The query engine lives in [`betsy_core`]; this crate adds configuration,
//! catalog loading, the terminal chat, and an HTTP server for storefront
//! widgets.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌────────────────────┐
//! │ catalog.json │──▶│   Catalog    │──▶│     Assistant      │
//! └──────────────┘   │ (in stock)   │   │ tokenize ▸ extract │
//!                    └──────────────┘   │ match ▸ relax      │
//!                                       └─────────┬──────────┘
//!                          ┌──────────────────────┤
//!                          ▼                      ▼
//!                    ┌──────────┐           ┌──────────┐
//!                    │   CLI    │           │   HTTP   │
//!                    │ chat/ask │           │ sessions │
//!                    └──────────┘           └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! betsy catalog                           # list in-stock products
//! betsy ask "green sneakers" "size 42"    # two turns of one session
//! betsy chat --transcript chat.json       # interactive
//! betsy serve                             # HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`catalog`] | Catalog file loading and listing |
//! | [`chat`] | Chat loop, `ask`, transcripts |
//! | [`render`] | Terminal rendering of messages |
//! | [`server`] | HTTP session server |
//! | [`logging`] | Tracing subscriber setup |

pub mod catalog;
pub mod chat;
pub mod config;
pub mod logging;
pub mod render;
pub mod server;
