//! Dictionary-driven translation into Vietnamese.
//!
//! Dictionaries are plain text files (`key=value` phrase lists, headword
//! files, punctuation and normalization tables, regex rewrite rules) stored
//! per source language. The [`loader`] reads them into an immutable
//! [`Lexicon`], and the [`Translator`] segments input by longest dictionary
//! match and substitutes each segment with its Vietnamese meaning.
//!
//! ```ignore
//! use vietphrase::{Language, Session, source::MemorySource};
//! use std::sync::Arc;
//!
//! let source = MemorySource::new().with_file("zh/VietPhrase.txt", "你好=xin chào\n");
//! let session = Session::new(Arc::new(source));
//! session.load_language(Language::Chinese).await?;
//! assert_eq!(session.translate("你好").as_deref(), Some("Xin chào"));
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod format;
pub mod formats;
pub mod language;
pub mod lexicon;
pub mod loader;
pub mod report;
pub mod rules;
pub mod session;
pub mod source;
pub mod trie;

pub use config::Config;
pub use engine::Translator;
pub use error::{Error, Result};
pub use fetch::{DictionaryFetcher, HttpFetcher};
pub use language::Language;
pub use lexicon::{Lexicon, LexiconBuilder};
pub use loader::Loader;
pub use report::{FileOutcome, FileReport, LoadReport};
pub use session::{InputOutcome, Session};
pub use source::{DirSource, LineSource, MemorySource};
