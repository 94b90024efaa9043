//! Lexeme interning.
//!
//! A [`Lexeme`] is a small integer handle for a canonical word form. The
//! [`Dictionary`] owns every form string; the rest of the crate only copies ids.

use crate::tokenize::tokenize;
use crate::Error;
use std::collections::HashMap;
use std::path::Path;

/// Canonical identifier of a normalized token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Lexeme(u32);

impl Lexeme {
    /// Raw id (dense, assigned in first-seen order).
    pub fn id(self) -> u32 {
        self.0
    }
}

/// Interning arena from canonical forms to [`Lexeme`] ids.
///
/// Normalization upper-cases the surface form and then applies the optional lemma
/// table (surface form -> canonical form). Unknown words are interned as-is, so
/// normalization never fails.
#[derive(Debug, Default)]
pub struct Dictionary {
    ids: HashMap<String, Lexeme>,
    forms: Vec<String>,
    lemmas: HashMap<String, String>,
}

impl Dictionary {
    /// Create an empty dictionary without a lemma table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dictionary that maps surface forms to lemmas before interning.
    ///
    /// Both sides are upper-cased, so the table is case-insensitive.
    pub fn with_lemmas<I, F, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (F, L)>,
        F: AsRef<str>,
        L: AsRef<str>,
    {
        let lemmas = pairs
            .into_iter()
            .map(|(form, lemma)| (form.as_ref().to_uppercase(), lemma.as_ref().to_uppercase()))
            .collect();
        Self {
            lemmas,
            ..Self::default()
        }
    }

    /// Parse a lemma table: one `form<TAB>lemma` pair per line.
    ///
    /// Blank lines and lines starting with `#` are ignored; lines without a tab are
    /// skipped with a warning.
    pub fn parse_lemmas(text: &str) -> Self {
        let mut pairs = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once('\t') {
                Some((form, lemma)) if !form.trim().is_empty() && !lemma.trim().is_empty() => {
                    pairs.push((form.trim(), lemma.trim()));
                }
                _ => tracing::warn!(line = lineno + 1, "skipping malformed lemma entry"),
            }
        }
        Self::with_lemmas(pairs)
    }

    /// Load a lemma table from a file (see [`Dictionary::parse_lemmas`]).
    pub fn load_lemmas(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let dict = Self::parse_lemmas(&crate::config::read_to_string(path)?);
        tracing::debug!(path = %path.display(), lemmas = dict.lemmas.len(), "loaded lemma table");
        Ok(dict)
    }

    fn canonical(&self, raw: &str) -> String {
        let upper = raw.to_uppercase();
        match self.lemmas.get(&upper) {
            Some(lemma) => lemma.clone(),
            None => upper,
        }
    }

    /// Normalize a surface token and intern it.
    pub fn normalize(&mut self, raw: &str) -> Lexeme {
        let form = self.canonical(raw);
        if let Some(&id) = self.ids.get(&form) {
            return id;
        }
        let id = Lexeme(self.forms.len() as u32);
        self.forms.push(form.clone());
        self.ids.insert(form, id);
        id
    }

    /// Normalize without interning: `None` if the canonical form was never seen.
    pub fn lookup(&self, raw: &str) -> Option<Lexeme> {
        self.ids.get(&self.canonical(raw)).copied()
    }

    /// Tokenize `text` and normalize every token.
    pub fn analyze(&mut self, text: &str) -> Vec<Lexeme> {
        tokenize(text).into_iter().map(|t| self.normalize(t)).collect()
    }

    /// Canonical form of an interned lexeme.
    ///
    /// # Panics
    ///
    /// If `lexeme` was produced by a different dictionary with more entries.
    pub fn resolve(&self, lexeme: Lexeme) -> &str {
        &self.forms[lexeme.0 as usize]
    }

    /// Number of interned forms.
    pub fn len(&self) -> usize {
        self.forms.len()
    }

    /// Whether nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}
