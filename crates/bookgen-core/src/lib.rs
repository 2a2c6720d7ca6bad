//! Core types for bookgen.
//!
//! Provides the in-memory document model ([`book::Book`]), the numbered-list
//! outline parser used to turn generated text into chapter and section titles,
//! and the run configuration loaded from `bookgen.toml`.

pub mod book;
pub mod config;
pub mod outline;

pub use book::{Book, BookError, Chapter, Section};
pub use config::{BookgenConfig, ConfigError};
pub use outline::{OutlineError, OutlineKind, parse_outline};
