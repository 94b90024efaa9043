//! Positional phrase index.
//!
//! For each window size `w` the index slides a `w`-lexeme window over every
//! document and appends the window's start position to the posting bucket of
//! `(phrase, document)`. Entries live in a slot arena addressed through a
//! `PhraseKey -> slot` map; the whole structure is dropped after statistics are
//! compiled.
//!
//! Related-phrase reservation: when a window matches a phrase that has thesaurus
//! relations, each related phrase also gets an (empty) bucket for the same
//! document. The document then counts as "containing" the related phrase for idf
//! purposes, with zero occurrences and therefore zero tf. [`RelatedSlots`] makes
//! this policy explicit.

use crate::config::MAX_WINDOW;
use crate::corpus::Corpus;
use crate::lexeme::Lexeme;
use crate::phrase::PhraseKey;
use crate::relation::RelationModel;
use crate::{DocId, Error};
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

/// What to do with thesaurus-related phrases of an indexed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelatedSlots {
    /// Create an empty bucket for each related phrase in the same document.
    #[default]
    Reserve,
    /// Only record phrases that literally occur.
    Skip,
}

/// Index build configuration.
#[derive(Debug, Clone, Copy)]
pub struct IndexConfig {
    /// Longest window indexed (clamped to `1..=MAX_WINDOW`).
    pub max_window: usize,
    /// Related-phrase reservation policy.
    pub related_slots: RelatedSlots,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_window: MAX_WINDOW,
            related_slots: RelatedSlots::Reserve,
        }
    }
}

/// All postings of one phrase: document -> start positions.
#[derive(Debug, Clone)]
pub struct PhraseEntry {
    key: PhraseKey,
    postings: BTreeMap<DocId, Vec<u32>>,
}

impl PhraseEntry {
    /// The phrase.
    pub fn key(&self) -> &PhraseKey {
        &self.key
    }

    /// Iterate `(doc, positions)` in doc order. Reserved buckets have no positions.
    pub fn postings(&self) -> impl Iterator<Item = (DocId, &[u32])> + '_ {
        self.postings.iter().map(|(&doc, pos)| (doc, pos.as_slice()))
    }

    /// Positions in `doc`, or `None` if the document has no bucket.
    pub fn positions(&self, doc: DocId) -> Option<&[u32]> {
        self.postings.get(&doc).map(Vec::as_slice)
    }

    /// Number of documents with a bucket (including reserved ones).
    pub fn num_docs(&self) -> usize {
        self.postings.len()
    }
}

/// Inverted index from phrase keys to positional postings.
#[derive(Debug, Default)]
pub struct PhraseIndex {
    slots: HashMap<PhraseKey, usize>,
    entries: Vec<PhraseEntry>,
    related_slots: RelatedSlots,
}

impl PhraseIndex {
    /// Create an empty index with the default reservation policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty index with an explicit reservation policy.
    pub fn with_policy(related_slots: RelatedSlots) -> Self {
        Self {
            related_slots,
            ..Self::default()
        }
    }

    /// Build the index over a whole corpus.
    ///
    /// Windows `1..=max_window` are indexed in turn; the loop stops early once a
    /// window size yields no phrase in any document.
    pub fn build(
        corpus: &Corpus,
        relations: &RelationModel,
        config: &IndexConfig,
    ) -> Result<Self, Error> {
        let started = Instant::now();
        let max_window = config.max_window.clamp(1, MAX_WINDOW);
        let mut index = Self::with_policy(config.related_slots);

        for window in 1..=max_window {
            let mut produced = 0;
            for (doc, document) in corpus.documents() {
                produced += index.index_document(doc, &document.tokens, window, relations)?;
            }
            tracing::debug!(window, windows = produced, phrases = index.len(), "indexed window size");
            if produced == 0 {
                break;
            }
        }

        tracing::info!(
            docs = corpus.len(),
            phrases = index.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built phrase index"
        );
        Ok(index)
    }

    /// Index every `window`-lexeme phrase of one document.
    ///
    /// Returns the number of windows recorded, `max(0, len - window + 1)`.
    pub fn index_document(
        &mut self,
        doc: DocId,
        tokens: &[Lexeme],
        window: usize,
        relations: &RelationModel,
    ) -> Result<usize, Error> {
        if window == 0 || window > MAX_WINDOW {
            return Err(Error::InvalidWindow(window));
        }
        if tokens.len() < window {
            return Ok(0);
        }

        let mut count = 0;
        for (pos, phrase) in tokens.windows(window).enumerate() {
            let slot = self.slot(phrase);
            self.entries[slot]
                .postings
                .entry(doc)
                .or_default()
                .push(pos as u32);
            count += 1;

            if self.related_slots == RelatedSlots::Reserve {
                for related in relations.related_of(phrase) {
                    let slot = self.slot(&related.key);
                    self.entries[slot].postings.entry(doc).or_default();
                }
            }
        }
        Ok(count)
    }

    fn slot(&mut self, key: &[Lexeme]) -> usize {
        if let Some(&slot) = self.slots.get(key) {
            return slot;
        }
        let slot = self.entries.len();
        let key = PhraseKey::new(key);
        self.entries.push(PhraseEntry {
            key: key.clone(),
            postings: BTreeMap::new(),
        });
        self.slots.insert(key, slot);
        slot
    }

    /// Entry for a phrase, if it was ever seen or reserved.
    pub fn get(&self, key: &[Lexeme]) -> Option<&PhraseEntry> {
        self.slots.get(key).map(|&slot| &self.entries[slot])
    }

    /// Iterate all entries in first-seen order.
    pub fn entries(&self) -> impl Iterator<Item = &PhraseEntry> + '_ {
        self.entries.iter()
    }

    /// Number of distinct phrases.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The reservation policy in effect.
    pub fn related_slots(&self) -> RelatedSlots {
        self.related_slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexeme::Dictionary;
    use crate::relation::RelationSpec;

    fn corpus(d: &mut Dictionary, docs: &[&str]) -> Corpus {
        let mut c = Corpus::new();
        for (i, text) in docs.iter().enumerate() {
            c.push_text(format!("doc{i}"), text, d);
        }
        c
    }

    #[test]
    fn windows_record_start_positions() {
        let mut d = Dictionary::new();
        let tokens = d.analyze("a b a b");
        let mut ix = PhraseIndex::new();
        let rel = RelationModel::new();
        assert_eq!(ix.index_document(7, &tokens, 2, &rel).unwrap(), 3);

        let ab = d.analyze("a b");
        let ba = d.analyze("b a");
        assert_eq!(ix.get(&ab).unwrap().positions(7), Some(&[0, 2][..]));
        assert_eq!(ix.get(&ba).unwrap().positions(7), Some(&[1][..]));
        assert_eq!(ix.len(), 2);
    }

    #[test]
    fn short_documents_contribute_nothing() {
        let mut d = Dictionary::new();
        let tokens = d.analyze("solo");
        let mut ix = PhraseIndex::new();
        assert_eq!(
            ix.index_document(0, &tokens, 3, &RelationModel::new()).unwrap(),
            0
        );
        assert!(ix.is_empty());
    }

    #[test]
    fn invalid_window_is_rejected() {
        let mut ix = PhraseIndex::new();
        let rel = RelationModel::new();
        assert!(matches!(
            ix.index_document(0, &[], 0, &rel),
            Err(Error::InvalidWindow(0))
        ));
        assert!(matches!(
            ix.index_document(0, &[], 4, &rel),
            Err(Error::InvalidWindow(4))
        ));
    }

    #[test]
    fn build_stops_when_documents_run_out() {
        let mut d = Dictionary::new();
        let c = corpus(&mut d, &["x", "y"]);
        let ix = PhraseIndex::build(&c, &RelationModel::new(), &IndexConfig::default()).unwrap();
        assert_eq!(ix.len(), 2);
        assert!(ix.entries().all(|e| e.key().len() == 1));
    }

    #[test]
    fn build_respects_max_window() {
        let mut d = Dictionary::new();
        let c = corpus(&mut d, &["a b c d"]);
        let cfg = IndexConfig {
            max_window: 2,
            ..Default::default()
        };
        let ix = PhraseIndex::build(&c, &RelationModel::new(), &cfg).unwrap();
        // 4 unigrams + 3 bigrams
        assert_eq!(ix.len(), 7);

        let full = PhraseIndex::build(&c, &RelationModel::new(), &IndexConfig::default()).unwrap();
        assert_eq!(full.len(), 9);
    }

    #[test]
    fn related_phrases_get_empty_buckets() {
        let mut d = Dictionary::new();
        let spec = RelationSpec {
            synonyms: vec![vec!["cat".into(), "big feline".into()]],
            ..Default::default()
        };
        let rel = RelationModel::load(&spec, &mut d);
        let c = corpus(&mut d, &["a cat sat", "dog"]);
        let ix = PhraseIndex::build(&c, &rel, &IndexConfig::default()).unwrap();

        let reserved = ix.get(&d.analyze("big feline")).unwrap();
        assert_eq!(reserved.positions(0), Some(&[][..]));
        assert_eq!(reserved.num_docs(), 1);
        assert_eq!(reserved.positions(1), None);
    }

    #[test]
    fn skip_policy_reserves_nothing() {
        let mut d = Dictionary::new();
        let spec = RelationSpec {
            synonyms: vec![vec!["cat".into(), "feline".into()]],
            ..Default::default()
        };
        let rel = RelationModel::load(&spec, &mut d);
        let c = corpus(&mut d, &["cat"]);
        let cfg = IndexConfig {
            related_slots: RelatedSlots::Skip,
            ..Default::default()
        };
        let ix = PhraseIndex::build(&c, &rel, &cfg).unwrap();
        assert!(ix.get(&d.analyze("feline")).is_none());
        assert_eq!(ix.related_slots(), RelatedSlots::Skip);
    }
}
