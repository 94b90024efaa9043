//! `phrasir`: phrase-level lexical retrieval with thesaurus expansion.
//!
//! The crate builds an in-memory inverted index over **phrases** (n-grams of 1–3
//! lexemes), compiles per-phrase tf/idf statistics, and ranks documents for a query
//! with BM25, adding weighted contributions from thesaurus synonyms and
//! generalizations of every query term.
//!
//! Pipeline:
//! - [`lexeme::Dictionary`] interns canonical word forms; [`tokenize`] splits text.
//! - [`relation::RelationModel`] holds the thesaurus graph.
//! - [`index::PhraseIndex`] slides windows of size 1..=3 over each document.
//! - [`stats::Statistics`] turns postings into tf/idf records.
//! - [`score::search`] ranks documents and attaches per-term diagnostics.
//! - [`engine::Engine`] wires the phases together for repeated querying.
//!
//! Scope:
//! - Batch build from a static corpus snapshot (no incremental updates)
//! - Deterministic ranking (tie-break by doc id)
//! - Caller-provided token streams, or the bundled delimiter tokenizer
//!
//! Non-goals:
//! - Stemming beyond a caller-supplied lemma table
//! - Fuzzy / typo-tolerant matching
//! - Persisting the index
//!
//! References:
//! - Robertson & Zaragoza (2009): BM25 and beyond
//! - Spärck Jones (1972): term specificity / IDF motivation

pub mod config;
pub mod corpus;
pub mod engine;
pub mod index;
pub mod lexeme;
pub mod phrase;
pub mod relation;
pub mod score;
pub mod stats;
pub mod tokenize;

pub use error::Error;

/// Identifier of a document inside a [`corpus::Corpus`] (its insertion index).
pub type DocId = u32;

mod error {
    use std::path::PathBuf;

    /// Errors for phrase indexing and retrieval.
    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        /// Query produced no lexemes.
        #[error("empty query")]
        EmptyQuery,
        /// Corpus contains no documents, so corpus statistics are undefined.
        #[error("empty corpus")]
        EmptyCorpus,
        /// Window size outside `1..=MAX_WINDOW`.
        #[error("invalid window size {0} (expected 1..={max})", max = crate::config::MAX_WINDOW)]
        InvalidWindow(usize),
        /// A posting refers to a document whose reported length cannot normalize it.
        #[error("document {doc} has length {len} but holds {count} postings")]
        DocumentLength {
            /// Offending document.
            doc: crate::DocId,
            /// Length reported by the corpus statistics (0 for unknown documents).
            len: u32,
            /// Number of positions recorded for it.
            count: usize,
        },
        /// Reading an input file failed.
        #[error("failed to read {}: {source}", .path.display())]
        Io {
            /// File or directory being read.
            path: PathBuf,
            /// Underlying I/O error.
            #[source]
            source: std::io::Error,
        },
        /// Walking the corpus directory failed.
        #[error("failed to walk corpus directory: {0}")]
        Walk(#[from] walkdir::Error),
        /// A JSON configuration input was malformed.
        #[error("invalid JSON input: {0}")]
        Json(#[from] serde_json::Error),
    }
}
