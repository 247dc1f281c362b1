//! lexigap: a persisted multilingual vocabulary dictionary.
//!
//! Every word carries its source language, grammar class, IPA
//! pronunciation, and a map of translations into arbitrary target
//! languages. The interesting part is convergence: the set of known target
//! languages grows as words are added, and [`engine::fill_gaps`] keeps
//! every word's translation map complete across that set.
//!
//! - `store`: the word records and the persisted JSON snapshot
//! - `rank`: target languages ranked by translation frequency
//! - `builder`: assembles one record from the collaborator services
//! - `engine`: gap-filling convergence and bulk ingestion
//! - `export`: Markdown table rendering
//! - `services`: collaborator traits and their HTTP clients

pub mod builder;
pub mod config;
pub mod engine;
pub mod export;
pub mod rank;
pub mod retry;
pub mod services;
pub mod store;

pub use builder::{build_record, SourceLanguage};
pub use engine::{add_word, fill_gaps, ingest, GapPolicy, IngestOptions, IngestReport};
pub use export::{export_markdown, to_markdown};
pub use rank::rank_languages;
pub use services::{FailurePolicy, ServiceSet};
pub use store::{normalize_word, Dictionary, WordRecord};
