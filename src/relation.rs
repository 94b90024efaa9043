//! Thesaurus relations between phrases.
//!
//! Two kinds of edges are kept:
//! - [`RelationKind::Synonym`]: every member of a synonym group points at every
//!   other member.
//! - [`RelationKind::Generalization`]: broader and narrower terms point at each
//!   other; the kind lets scoring discount them differently.
//!
//! Thesaurus terms go through the same tokenizer and [`Dictionary`] as documents,
//! so multi-word terms (up to [`MAX_WINDOW`] lexemes) relate phrases, not just
//! single words.

use crate::config::MAX_WINDOW;
use crate::lexeme::{Dictionary, Lexeme};
use crate::phrase::PhraseKey;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Kind of thesaurus edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    /// Same meaning.
    Synonym,
    /// Broader or narrower meaning.
    Generalization,
}

/// A related phrase reachable from some source phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Related {
    /// Target phrase.
    pub key: PhraseKey,
    /// Edge kind.
    pub kind: RelationKind,
}

/// Parsed thesaurus definition, before normalization.
///
/// JSON layout:
///
/// ```json
/// {
///   "synonyms": [["cat", "feline"], ["car", "automobile", "motor car"]],
///   "generalizations": [{"animal": ["cat", "dog"]}]
/// }
/// ```
///
/// The keys `synonims` and `generalization` are accepted as aliases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationSpec {
    /// Groups of interchangeable terms.
    #[serde(default, alias = "synonims")]
    pub synonyms: Vec<Vec<String>>,
    /// Objects mapping a broad term to its narrower terms.
    #[serde(default, alias = "generalization")]
    pub generalizations: Vec<BTreeMap<String, Vec<String>>>,
}

impl RelationSpec {
    /// Parse a thesaurus from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a thesaurus from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::from_json_str(&crate::config::read_to_string(path.as_ref())?)
    }
}

/// Directed thesaurus graph over phrase keys.
#[derive(Debug, Default)]
pub struct RelationModel {
    edges: HashMap<PhraseKey, Vec<Related>>,
    num_edges: usize,
}

impl RelationModel {
    /// Create an empty model (no expansion).
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize and register every relation in `spec`.
    ///
    /// Malformed entries are logged and skipped; loading never fails.
    pub fn load(spec: &RelationSpec, dict: &mut Dictionary) -> Self {
        let mut model = Self::new();

        for (group_no, group) in spec.synonyms.iter().enumerate() {
            let keys: Vec<PhraseKey> = group
                .iter()
                .filter_map(|term| term_key(dict, term))
                .collect();
            let mut distinct = keys.clone();
            distinct.sort();
            distinct.dedup();
            if distinct.len() < 2 {
                tracing::warn!(group = group_no, "skipping synonym group with fewer than two distinct terms");
                continue;
            }
            model.insert_synonyms(&keys);
        }

        for generalization in &spec.generalizations {
            for (broad, narrows) in generalization {
                let Some(broad_key) = term_key(dict, broad) else {
                    continue;
                };
                for narrow in narrows {
                    let Some(narrow_key) = term_key(dict, narrow) else {
                        continue;
                    };
                    if broad_key == narrow_key {
                        tracing::warn!(term = %broad, "skipping self-referential generalization");
                        continue;
                    }
                    model.insert_generalization(&broad_key, &narrow_key);
                }
            }
        }

        tracing::info!(
            phrases = model.edges.len(),
            edges = model.num_edges,
            "loaded thesaurus"
        );
        model
    }

    /// Link every member of a synonym group to every other member.
    ///
    /// Repeated members collapse. Returns the number of new edges.
    pub fn insert_synonyms(&mut self, group: &[PhraseKey]) -> usize {
        let mut added = 0;
        for source in group {
            for target in group {
                if self.insert(source, target, RelationKind::Synonym) {
                    added += 1;
                }
            }
        }
        added
    }

    /// Link a broader and a narrower phrase in both directions.
    ///
    /// Returns the number of new edges (0 when `broad == narrow` or already linked).
    pub fn insert_generalization(&mut self, broad: &PhraseKey, narrow: &PhraseKey) -> usize {
        usize::from(self.insert(broad, narrow, RelationKind::Generalization))
            + usize::from(self.insert(narrow, broad, RelationKind::Generalization))
    }

    fn insert(&mut self, source: &PhraseKey, target: &PhraseKey, kind: RelationKind) -> bool {
        if source == target {
            return false;
        }
        let related = Related {
            key: target.clone(),
            kind,
        };
        let list = self.edges.entry(source.clone()).or_default();
        if list.contains(&related) {
            return false;
        }
        list.push(related);
        self.num_edges += 1;
        true
    }

    /// Phrases related to `key`, in insertion order (empty if none).
    pub fn related_of(&self, key: &[Lexeme]) -> &[Related] {
        self.edges.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of directed edges.
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Whether the model has no edges.
    pub fn is_empty(&self) -> bool {
        self.num_edges == 0
    }
}

fn term_key(dict: &mut Dictionary, term: &str) -> Option<PhraseKey> {
    let lexemes = dict.analyze(term);
    if lexemes.is_empty() {
        tracing::warn!(term = %term, "skipping empty thesaurus term");
        return None;
    }
    if lexemes.len() > MAX_WINDOW {
        tracing::warn!(
            term = %term,
            len = lexemes.len(),
            max = MAX_WINDOW,
            "skipping thesaurus term longer than the longest indexed phrase"
        );
        return None;
    }
    Some(PhraseKey::new(&lexemes))
}
