//! Word-completion service client for the notepad editor.
//!
//! [`HttpSuggestionSource`] implements the editor's `SuggestionSource` against
//! a service exposing `GET /suggest?word=<prefix>`, and [`SuggestConfig`]
//! holds where that service lives and how eagerly to query it.

pub mod config;
pub mod error;
pub mod http;

pub use config::SuggestConfig;
pub use error::ConfigError;
pub use http::{HttpSuggestionSource, parse_suggestions};
