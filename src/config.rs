//! Default tuning constants and JSON input loading.
//!
//! Runtime parameters live next to the code that consumes them
//! ([`crate::score::ScoreParams`], [`crate::index::IndexConfig`]); their `Default`
//! impls are built from the constants below.

use crate::Error;
use std::path::Path;

/// BM25 term-frequency saturation parameter.
///
/// The tf fed to BM25 here is an occurrence *rate* (`count / doc_len`), not a raw
/// count, so saturation is much weaker than with the textbook `k1 = 1.2`.
pub const BM25_K1: f64 = 2.0;

/// BM25 document length normalization parameter (0.0 = none, 1.0 = full).
pub const BM25_B: f64 = 0.75;

/// Number of ranked documents returned per query.
pub const DEFAULT_TOP_K: usize = 10;

/// Longest phrase (in lexemes) the index records.
pub const MAX_WINDOW: usize = 3;

/// Weight applied to contributions from thesaurus synonyms.
pub const SYNONYM_WEIGHT: f64 = 0.9;

/// Weight applied to contributions from broader/narrower thesaurus terms.
pub const GENERALIZATION_WEIGHT: f64 = 0.3;

/// Read a file into a string, attaching the path to any I/O error.
pub(crate) fn read_to_string(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a query list: a JSON array of strings, answered in order.
pub fn parse_queries(json: &str) -> Result<Vec<String>, Error> {
    Ok(serde_json::from_str(json)?)
}

/// Load a query list from a JSON file (see [`parse_queries`]).
pub fn load_queries(path: impl AsRef<Path>) -> Result<Vec<String>, Error> {
    parse_queries(&read_to_string(path.as_ref())?)
}
