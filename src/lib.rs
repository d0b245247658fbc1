//! # catecismo-search
//!
//! Search over catechism paragraphs: an instant, accent-insensitive filter
//! over a static corpus, augmented by a text-generation service that
//! suggests further paragraphs.
//!
//! ## Pipeline
//!
//! ```text
//!                   ┌──────────────┐
//!                   │  User Query  │
//!                   └──────┬───────┘
//!            ┌─────────────┴─────────────┐
//!            ▼ immediate                 ▼ debounced 800ms, ≥3 chars
//!   ┌─────────────────┐        ┌─────────────────────┐
//!   │  Local Matcher  │        │  Remote Augmenter   │
//!   │ NFD, no accents │        │ LLM → JSON array    │
//!   │ id or text hit  │        │ best-effort, tagged │
//!   └────────┬────────┘        └──────────┬──────────┘
//!            └─────────────┬──────────────┘
//!                          ▼
//!              ┌───────────────────────┐
//!              │ Merge                 │
//!              │ local wins on same id │
//!              │ section range filter  │
//!              │ sort by id            │
//!              └───────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration, read-only after startup
//! - [`models`] - `Paragraph`, `Section`, request/response types
//! - [`corpus`] - The embedded paragraph table
//! - [`search::normalize`] - Case and diacritic folding
//! - [`search::local`] - Local Matcher
//! - [`search::merge`] - Merge and de-duplication
//! - [`search::highlight`] - Accent-insensitive match spans for display
//! - [`llm::augment`] - Remote Augmenter over Gemini, OpenAI-compatible or Ollama APIs
//! - [`session`] - Debounced search session with stale-response guard
//! - [`citation`] - Citation text and permalinks
//! - [`api`] - Axum HTTP handlers
//! - [`shell`] - Interactive terminal front end
//! - [`state`] - Shared application state

pub mod api;
pub mod citation;
pub mod config;
pub mod corpus;
pub mod llm;
pub mod models;
pub mod search;
pub mod session;
pub mod shell;
pub mod state;
