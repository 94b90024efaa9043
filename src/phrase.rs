//! Phrase keys: ordered lexeme sequences used as index keys.

use crate::lexeme::{Dictionary, Lexeme};
use std::borrow::Borrow;
use std::ops::Deref;

/// An ordered sequence of lexemes identifying an n-gram.
///
/// Equality is element-wise, so `CAT DOG` and `DOG CAT` are distinct keys. Keys
/// borrow as `[Lexeme]`, so maps keyed by `PhraseKey` can be probed with a token
/// window without allocating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhraseKey(Box<[Lexeme]>);

impl PhraseKey {
    /// Key for a window of lexemes.
    pub fn new(window: &[Lexeme]) -> Self {
        Self(window.into())
    }

    /// Key for a single lexeme.
    pub fn single(lexeme: Lexeme) -> Self {
        Self(Box::new([lexeme]))
    }

    /// The lexemes, in order.
    pub fn lexemes(&self) -> &[Lexeme] {
        &self.0
    }

    /// Space-joined canonical forms.
    pub fn render(&self, dict: &Dictionary) -> String {
        let mut out = String::new();
        for (i, &lx) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(dict.resolve(lx));
        }
        out
    }
}

impl Deref for PhraseKey {
    type Target = [Lexeme];

    fn deref(&self) -> &[Lexeme] {
        &self.0
    }
}

impl Borrow<[Lexeme]> for PhraseKey {
    fn borrow(&self) -> &[Lexeme] {
        &self.0
    }
}

impl From<Lexeme> for PhraseKey {
    fn from(lexeme: Lexeme) -> Self {
        Self::single(lexeme)
    }
}
