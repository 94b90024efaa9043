//! Delimiter tokenizer.
//!
//! Words are maximal runs of non-delimiter characters. Sentence punctuation that
//! immediately follows a word is kept as its own token so that phrases do not
//! silently span sentence boundaries.

/// Characters that separate words.
pub const DELIMITERS: &[char] = &[' ', ':', ';', '.', ',', '!', '?', '(', ')', '\t', '\r', '\n'];

/// Delimiters that are also emitted as tokens when they end a word.
pub const PUNCTUATION: &[char] = &['.', ',', '!', '?'];

/// Split `text` into surface tokens (borrowed slices of the input).
///
/// ```
/// use phrasir::tokenize::tokenize;
/// assert_eq!(tokenize("Cats sleep. Dogs (bark)!"), ["Cats", "sleep", ".", "Dogs", "bark"]);
/// ```
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in text.char_indices() {
        if !DELIMITERS.contains(&c) {
            start.get_or_insert(i);
            continue;
        }
        if let Some(s) = start.take() {
            out.push(&text[s..i]);
            if PUNCTUATION.contains(&c) {
                out.push(&text[i..i + c.len_utf8()]);
            }
        }
    }
    if let Some(s) = start {
        out.push(&text[s..]);
    }
    out
}
