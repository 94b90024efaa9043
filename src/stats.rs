//! tf / idf statistics compiled from a [`PhraseIndex`].
//!
//! - `tf(phrase, doc) = occurrences / doc_len` (an occurrence rate, 0 for reserved buckets)
//! - `idf(phrase) = log10(N / df)` where `df` counts every bucket, reserved ones included
//!
//! No smoothing is applied: a phrase present in every document has `idf = 0`.

use crate::corpus::CorpusStats;
use crate::index::PhraseIndex;
use crate::lexeme::Lexeme;
use crate::phrase::PhraseKey;
use crate::{DocId, Error};
use std::collections::HashMap;

/// Statistics of one phrase in one document.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticRecord {
    /// Document.
    pub doc: DocId,
    /// Start positions of the phrase (empty for reserved buckets).
    pub positions: Vec<u32>,
    /// Occurrence rate `positions.len() / doc_len`.
    pub tf: f64,
}

impl StatisticRecord {
    /// Literal occurrences in the document.
    pub fn count(&self) -> usize {
        self.positions.len()
    }
}

/// Statistics of one phrase across the corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseStats {
    idf: f64,
    records: Vec<StatisticRecord>,
}

impl PhraseStats {
    /// Inverse document frequency, shared by all records.
    pub fn idf(&self) -> f64 {
        self.idf
    }

    /// Per-document records, sorted by doc id.
    pub fn records(&self) -> &[StatisticRecord] {
        &self.records
    }

    /// Record for `doc`, if the phrase has a bucket there.
    pub fn record(&self, doc: DocId) -> Option<&StatisticRecord> {
        self.records
            .binary_search_by_key(&doc, |r| r.doc)
            .ok()
            .map(|i| &self.records[i])
    }
}

/// Compiled, read-only statistics for every indexed phrase.
#[derive(Debug, Default, PartialEq)]
pub struct Statistics {
    phrases: HashMap<PhraseKey, PhraseStats>,
}

impl Statistics {
    /// Compile tf/idf records for every `(phrase, document)` bucket.
    ///
    /// Fails with [`Error::DocumentLength`] if a bucket refers to a document the
    /// corpus statistics do not know, or to a zero-length document that
    /// nevertheless holds positions.
    pub fn compile(index: &PhraseIndex, corpus: &CorpusStats) -> Result<Self, Error> {
        let num_docs = f64::from(corpus.num_docs());
        let mut phrases = HashMap::with_capacity(index.len());

        for entry in index.entries() {
            let idf = (num_docs / entry.num_docs() as f64).log10();
            let mut records = Vec::with_capacity(entry.num_docs());
            for (doc, positions) in entry.postings() {
                let tf = match corpus.doc_len(doc) {
                    Some(len) if len > 0 => positions.len() as f64 / f64::from(len),
                    Some(0) if positions.is_empty() => 0.0,
                    len => {
                        return Err(Error::DocumentLength {
                            doc,
                            len: len.unwrap_or(0),
                            count: positions.len(),
                        })
                    }
                };
                records.push(StatisticRecord {
                    doc,
                    positions: positions.to_vec(),
                    tf,
                });
            }
            phrases.insert(entry.key().clone(), PhraseStats { idf, records });
        }

        tracing::info!(phrases = phrases.len(), docs = corpus.num_docs(), "compiled statistics");
        Ok(Self { phrases })
    }

    /// Statistics for a phrase.
    pub fn get(&self, key: &[Lexeme]) -> Option<&PhraseStats> {
        self.phrases.get(key)
    }

    /// Record for `(phrase, doc)`.
    pub fn record(&self, key: &[Lexeme], doc: DocId) -> Option<&StatisticRecord> {
        self.get(key).and_then(|s| s.record(doc))
    }

    /// Iterate all phrases with their statistics (arbitrary order).
    pub fn iter(&self) -> impl Iterator<Item = (&PhraseKey, &PhraseStats)> + '_ {
        self.phrases.iter()
    }

    /// Number of phrases.
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    /// Whether no phrase was compiled.
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}
