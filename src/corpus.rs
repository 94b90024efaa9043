//! Documents as lexeme streams, plus the corpus-wide length statistics BM25 needs.

use crate::lexeme::{Dictionary, Lexeme};
use crate::{DocId, Error};
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// One document: a display name and its normalized token stream.
#[derive(Debug, Clone)]
pub struct Document {
    /// Human-readable identifier (relative path for directory corpora).
    pub name: String,
    /// Lexemes in reading order.
    pub tokens: Vec<Lexeme>,
}

/// Static snapshot of documents; [`DocId`]s are insertion indices.
#[derive(Debug, Default)]
pub struct Corpus {
    docs: Vec<Document>,
}

impl Corpus {
    /// Create an empty corpus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pre-tokenized document and return its id.
    pub fn push(&mut self, name: impl Into<String>, tokens: Vec<Lexeme>) -> DocId {
        let id = self.docs.len() as DocId;
        self.docs.push(Document {
            name: name.into(),
            tokens,
        });
        id
    }

    /// Tokenize `text` with `dict` and add it as a document.
    pub fn push_text(&mut self, name: impl Into<String>, text: &str, dict: &mut Dictionary) -> DocId {
        let tokens = dict.analyze(text);
        self.push(name, tokens)
    }

    /// Read every file under `root` (recursively, sorted by path) as one document.
    ///
    /// Hidden entries (names starting with `.`, e.g. `.DS_Store`) are skipped.
    /// Content is decoded as UTF-8, replacing invalid sequences.
    pub fn read_dir(root: impl AsRef<Path>, dict: &mut Dictionary) -> Result<Self, Error> {
        let root = root.as_ref();
        let mut corpus = Self::new();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let bytes = std::fs::read(path).map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let name = path
                .strip_prefix(root)
                .unwrap_or(path)
                .display()
                .to_string();
            let doc = corpus.push_text(name, &String::from_utf8_lossy(&bytes), dict);
            tracing::debug!(
                path = %path.display(),
                doc,
                tokens = corpus.docs[doc as usize].tokens.len(),
                "read document"
            );
        }

        tracing::info!(root = %root.display(), docs = corpus.len(), "read corpus");
        Ok(corpus)
    }

    /// Document by id.
    pub fn get(&self, doc: DocId) -> Option<&Document> {
        self.docs.get(doc as usize)
    }

    /// Iterate `(id, document)` in id order.
    pub fn documents(&self) -> impl Iterator<Item = (DocId, &Document)> + '_ {
        self.docs.iter().enumerate().map(|(i, d)| (i as DocId, d))
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether the corpus has no documents.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Length statistics for BM25 normalization.
    pub fn stats(&self) -> Result<CorpusStats, Error> {
        CorpusStats::from_lengths(self.docs.iter().map(|d| d.tokens.len() as u32).collect())
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|s| s.starts_with('.'))
}

/// Document count, per-document lengths, and average length.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusStats {
    lengths: Vec<u32>,
    avg_doc_len: f64,
}

impl CorpusStats {
    /// Build statistics from per-document token counts (indexed by [`DocId`]).
    ///
    /// Fails with [`Error::EmptyCorpus`]: the average length of zero documents is
    /// undefined.
    pub fn from_lengths(lengths: Vec<u32>) -> Result<Self, Error> {
        if lengths.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        let total: u64 = lengths.iter().map(|&l| u64::from(l)).sum();
        let avg_doc_len = total as f64 / lengths.len() as f64;
        Ok(Self {
            lengths,
            avg_doc_len,
        })
    }

    /// Number of documents.
    pub fn num_docs(&self) -> u32 {
        self.lengths.len() as u32
    }

    /// Token count of `doc`, or `None` for ids outside the corpus.
    pub fn doc_len(&self, doc: DocId) -> Option<u32> {
        self.lengths.get(doc as usize).copied()
    }

    /// Mean token count over all documents.
    pub fn avg_doc_len(&self) -> f64 {
        self.avg_doc_len
    }
}
