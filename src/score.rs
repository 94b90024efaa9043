//! BM25 ranking with thesaurus expansion.
//!
//! Every query lexeme `w` contributes, for each document `d`:
//! - `bm25(w, d)` at weight 1.0 when `w` has a record for `d`;
//! - `weight(kind) * bm25(r, d)` for every related phrase `r` of `w` with a record
//!   for `d`, where the weight depends on the relation kind.
//!
//! Related phrases are followed even when `w` itself never occurs in the corpus.
//! Ranking is deterministic (score desc, then doc id asc).

use crate::config::{BM25_B, BM25_K1, DEFAULT_TOP_K, GENERALIZATION_WEIGHT, SYNONYM_WEIGHT};
use crate::corpus::CorpusStats;
use crate::lexeme::Lexeme;
use crate::phrase::PhraseKey;
use crate::relation::{RelationKind, RelationModel};
use crate::stats::{PhraseStats, StatisticRecord, Statistics};
use crate::{DocId, Error};
use std::collections::HashMap;

/// Scaling applied to contributions of related phrases, per relation kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelationWeights {
    /// Weight of synonym matches.
    pub synonym: f64,
    /// Weight of broader/narrower matches.
    pub generalization: f64,
}

impl Default for RelationWeights {
    fn default() -> Self {
        Self {
            synonym: SYNONYM_WEIGHT,
            generalization: GENERALIZATION_WEIGHT,
        }
    }
}

impl RelationWeights {
    /// Same weight for every relation kind.
    pub fn uniform(weight: f64) -> Self {
        Self {
            synonym: weight,
            generalization: weight,
        }
    }

    /// Weight for an edge kind.
    pub fn weight(&self, kind: RelationKind) -> f64 {
        match kind {
            RelationKind::Synonym => self.synonym,
            RelationKind::Generalization => self.generalization,
        }
    }
}

/// Ranking parameters.
#[derive(Debug, Clone, Copy)]
pub struct ScoreParams {
    /// Term-frequency saturation parameter.
    pub k1: f64,
    /// Length normalization parameter.
    pub b: f64,
    /// Relation weight table.
    pub weights: RelationWeights,
    /// Maximum number of hits returned.
    pub top_k: usize,
}

impl Default for ScoreParams {
    fn default() -> Self {
        Self {
            k1: BM25_K1,
            b: BM25_B,
            weights: RelationWeights::default(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl ScoreParams {
    /// Default parameters returning at most `top_k` hits.
    pub fn with_top_k(top_k: usize) -> Self {
        Self {
            top_k,
            ..Self::default()
        }
    }
}

/// BM25 contribution of one (phrase, document) record.
///
/// `idf * tf * (k1 + 1) / (tf + k1 * (1 - b + b * doc_len / avg_doc_len))`
pub fn bm25(tf: f64, idf: f64, doc_len: f64, avg_doc_len: f64, k1: f64, b: f64) -> f64 {
    if tf == 0.0 || avg_doc_len <= 0.0 {
        return 0.0;
    }
    idf * tf * (k1 + 1.0) / (tf + k1 * (1.0 - b + b * doc_len / avg_doc_len))
}

/// Occurrence statistics behind one contribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchStats {
    /// Literal occurrences in the document.
    pub count: usize,
    /// Occurrence rate.
    pub tf: f64,
    /// Inverse document frequency of the phrase.
    pub idf: f64,
}

impl MatchStats {
    fn of(phrase: &PhraseStats, record: &StatisticRecord) -> Self {
        Self {
            count: record.count(),
            tf: record.tf,
            idf: phrase.idf(),
        }
    }
}

/// A related phrase that occurs in the hit document.
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedMatch {
    /// The related phrase.
    pub key: PhraseKey,
    /// How it relates to the query lexeme.
    pub kind: RelationKind,
    /// Its statistics in the document.
    pub stats: MatchStats,
}

/// Diagnostics for one query lexeme within a hit.
#[derive(Debug, Clone, PartialEq)]
pub struct TermMatch {
    /// The query lexeme.
    pub lexeme: Lexeme,
    /// Literal occurrences of the lexeme itself (`None` if it does not occur).
    pub direct: Option<MatchStats>,
    /// Occurring related phrases.
    pub related: Vec<RelatedMatch>,
}

/// A ranked document.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// Document.
    pub doc: DocId,
    /// Total relevance score (> 0).
    pub score: f64,
    /// One entry per query lexeme, in query order.
    pub terms: Vec<TermMatch>,
}

/// Rank documents for a tokenized query.
///
/// Documents whose total score is not positive are dropped; at most
/// `params.top_k` hits are returned.
pub fn search(
    query: &[Lexeme],
    stats: &Statistics,
    relations: &RelationModel,
    corpus: &CorpusStats,
    params: &ScoreParams,
) -> Result<Vec<Hit>, Error> {
    if query.is_empty() {
        return Err(Error::EmptyQuery);
    }
    if params.top_k == 0 {
        return Ok(Vec::new());
    }

    let avg_doc_len = corpus.avg_doc_len();
    let mut scores: HashMap<DocId, f64> = HashMap::new();
    let mut accumulate = |phrase: &PhraseStats, weight: f64| {
        for record in phrase.records() {
            let Some(doc_len) = corpus.doc_len(record.doc) else {
                continue;
            };
            let s = bm25(
                record.tf,
                phrase.idf(),
                f64::from(doc_len),
                avg_doc_len,
                params.k1,
                params.b,
            );
            *scores.entry(record.doc).or_insert(0.0) += weight * s;
        }
    };

    for lexeme in query {
        let key = std::slice::from_ref(lexeme);
        if let Some(phrase) = stats.get(key) {
            accumulate(phrase, 1.0);
        }
        for related in relations.related_of(key) {
            if let Some(phrase) = stats.get(&related.key) {
                accumulate(phrase, params.weights.weight(related.kind));
            }
        }
    }

    let mut ranked: Vec<(DocId, f64)> = scores
        .into_iter()
        .filter(|(_, score)| score.is_finite() && *score > 0.0)
        .collect();

    // Deterministic: score desc, then doc_id asc.
    ranked.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(params.top_k);

    tracing::debug!(query_len = query.len(), hits = ranked.len(), "scored query");
    Ok(ranked
        .into_iter()
        .map(|(doc, score)| Hit {
            doc,
            score,
            terms: query
                .iter()
                .map(|&lexeme| explain(lexeme, doc, stats, relations))
                .collect(),
        })
        .collect())
}

fn explain(lexeme: Lexeme, doc: DocId, stats: &Statistics, relations: &RelationModel) -> TermMatch {
    let occurring = |key: &[Lexeme]| -> Option<MatchStats> {
        let phrase = stats.get(key)?;
        let record = phrase.record(doc).filter(|r| r.count() > 0)?;
        Some(MatchStats::of(phrase, record))
    };

    let key = std::slice::from_ref(&lexeme);
    TermMatch {
        lexeme,
        direct: occurring(key),
        related: relations
            .related_of(key)
            .iter()
            .filter_map(|related| {
                occurring(&related.key).map(|stats| RelatedMatch {
                    key: related.key.clone(),
                    kind: related.kind,
                    stats,
                })
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;
    use crate::index::{IndexConfig, PhraseIndex};
    use crate::lexeme::Dictionary;
    use crate::relation::RelationSpec;

    struct Fixture {
        dict: Dictionary,
        corpus: CorpusStats,
        stats: Statistics,
        relations: RelationModel,
    }

    impl Fixture {
        fn new(docs: &[&str], spec: &RelationSpec) -> Self {
            let mut dict = Dictionary::new();
            let relations = RelationModel::load(spec, &mut dict);
            let mut c = Corpus::new();
            for (i, text) in docs.iter().enumerate() {
                c.push_text(format!("doc{i}"), text, &mut dict);
            }
            let ix = PhraseIndex::build(&c, &relations, &IndexConfig::default()).unwrap();
            let corpus = c.stats().unwrap();
            let stats = Statistics::compile(&ix, &corpus).unwrap();
            Self {
                dict,
                corpus,
                stats,
                relations,
            }
        }

        fn search(&mut self, q: &str, params: &ScoreParams) -> Result<Vec<Hit>, Error> {
            let query = self.dict.analyze(q);
            search(&query, &self.stats, &self.relations, &self.corpus, params)
        }
    }

    fn synonyms(groups: &[&[&str]]) -> RelationSpec {
        RelationSpec {
            synonyms: groups
                .iter()
                .map(|g| g.iter().map(|s| s.to_string()).collect())
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn direct_match_uses_bm25_formula() {
        let mut fx = Fixture::new(&["CAT DOG CAT", "DOG"], &RelationSpec::default());
        let hits = fx.search("CAT", &ScoreParams::default()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc, 0);

        let idf = 2f64.log10();
        let expected = bm25(2.0 / 3.0, idf, 3.0, 2.0, 2.0, 0.75);
        assert!((hits[0].score - expected).abs() < 1e-12);
        assert!((hits[0].score - 0.176_213).abs() < 1e-5);

        let direct = hits[0].terms[0].direct.unwrap();
        assert_eq!(direct.count, 2);
        assert!((direct.tf - 2.0 / 3.0).abs() < 1e-12);
        assert!((direct.idf - idf).abs() < 1e-12);
        assert!(hits[0].terms[0].related.is_empty());
    }

    #[test]
    fn synonym_match_is_weighted_and_labeled_related() {
        let mut fx = Fixture::new(&["CAT DOG CAT", "DOG", "FELINE"], &synonyms(&[&["CAT", "FELINE"]]));
        let hits = fx.search("cat", &ScoreParams::default()).unwrap();
        let doc3 = hits.iter().find(|h| h.doc == 2).expect("synonym document is returned");

        // both CAT and FELINE have one literal doc and one reserved doc
        let idf = 1.5f64.log10();
        let expected = 0.9 * bm25(1.0, idf, 1.0, 5.0 / 3.0, 2.0, 0.75);
        assert!((doc3.score - expected).abs() < 1e-12);

        let term = &doc3.terms[0];
        assert!(term.direct.is_none());
        assert_eq!(term.related.len(), 1);
        assert_eq!(term.related[0].kind, RelationKind::Synonym);
        assert_eq!(term.related[0].key.render(&fx.dict), "FELINE");
        assert_eq!(term.related[0].stats.count, 1);
    }

    #[test]
    fn generalization_weight_is_configurable() {
        let spec = RelationSpec::from_json_str(r#"{"generalizations": [{"animal": ["cat"]}]}"#).unwrap();
        let mut fx = Fixture::new(&["cat", "dog", "bird"], &spec);

        let low = fx.search("animal", &ScoreParams::default()).unwrap();
        let params = ScoreParams {
            weights: RelationWeights::uniform(0.7),
            ..Default::default()
        };
        let high = fx.search("animal", &params).unwrap();
        assert_eq!(low.len(), 1);
        assert!((high[0].score / low[0].score - 0.7 / 0.3).abs() < 1e-9);
        assert_eq!(low[0].terms[0].related[0].kind, RelationKind::Generalization);
    }

    #[test]
    fn shorter_document_wins_at_equal_rate() {
        // lengths 2, 4, 1 -> avg 7/3; doc0 is closer to average than doc1
        let mut fx = Fixture::new(&["x y", "x y x y", "z"], &RelationSpec::default());
        let hits = fx.search("x", &ScoreParams::default()).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].doc, 0);
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn ties_break_by_doc_id_and_top_k_truncates() {
        let mut fx = Fixture::new(&["a b", "z", "a b", "a b", "q"], &RelationSpec::default());
        let hits = fx.search("a", &ScoreParams::with_top_k(2)).unwrap();
        assert_eq!(hits.iter().map(|h| h.doc).collect::<Vec<_>>(), vec![0, 2]);
        assert!(fx.search("a", &ScoreParams::with_top_k(0)).unwrap().is_empty());
    }

    #[test]
    fn unknown_terms_score_nothing() {
        let mut fx = Fixture::new(&["a b"], &RelationSpec::default());
        assert!(fx.search("nope", &ScoreParams::default()).unwrap().is_empty());
    }

    #[test]
    fn empty_query_is_an_error() {
        let mut fx = Fixture::new(&["a b"], &RelationSpec::default());
        assert!(matches!(
            fx.search(" ( ) ", &ScoreParams::default()),
            Err(Error::EmptyQuery)
        ));
    }

    #[test]
    fn repeated_query_terms_add_up() {
        let mut fx = Fixture::new(&["a b", "c"], &RelationSpec::default());
        let once = fx.search("a", &ScoreParams::default()).unwrap();
        let twice = fx.search("a a", &ScoreParams::default()).unwrap();
        assert!((twice[0].score - 2.0 * once[0].score).abs() < 1e-12);
        assert_eq!(twice[0].terms.len(), 2);
    }

    #[test]
    fn multiword_related_phrase_contributes() {
        let mut fx = Fixture::new(
            &["the big cat sleeps", "a dog", "birds"],
            &synonyms(&[&["lion", "big cat"]]),
        );
        let hits = fx.search("lion", &ScoreParams::default()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc, 0);
        assert_eq!(hits[0].terms[0].related[0].key.render(&fx.dict), "BIG CAT");
    }

    #[test]
    fn bm25_guards_degenerate_inputs() {
        assert_eq!(bm25(0.0, 1.0, 3.0, 2.0, 2.0, 0.75), 0.0);
        assert_eq!(bm25(0.5, 1.0, 3.0, 0.0, 2.0, 0.75), 0.0);
        assert!(bm25(0.5, 1.0, 2.0, 2.0, 2.0, 0.75) > bm25(0.5, 1.0, 4.0, 2.0, 2.0, 0.75));
    }
}
