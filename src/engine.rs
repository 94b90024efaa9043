//! Batch pipeline: build once, query many times.
//!
//! [`Engine::build`] runs indexing and statistics compilation; afterwards the
//! engine is immutable and every query is answered from the compiled statistics.

use crate::corpus::{Corpus, CorpusStats};
use crate::index::{IndexConfig, PhraseIndex};
use crate::lexeme::{Dictionary, Lexeme};
use crate::relation::RelationModel;
use crate::score::{self, Hit, ScoreParams};
use crate::stats::Statistics;
use crate::Error;

/// Compiled corpus ready for querying.
#[derive(Debug)]
pub struct Engine {
    corpus: Corpus,
    corpus_stats: CorpusStats,
    relations: RelationModel,
    stats: Statistics,
}

impl Engine {
    /// Index `corpus` with `relations` and compile statistics.
    ///
    /// Fails with [`Error::EmptyCorpus`] when there is nothing to index.
    pub fn build(
        corpus: Corpus,
        relations: RelationModel,
        config: &IndexConfig,
    ) -> Result<Self, Error> {
        let corpus_stats = corpus.stats()?;
        let stats = {
            let index = PhraseIndex::build(&corpus, &relations, config)?;
            Statistics::compile(&index, &corpus_stats)?
        };
        Ok(Self {
            corpus,
            corpus_stats,
            relations,
            stats,
        })
    }

    /// Rank documents for a tokenized query.
    pub fn search(&self, query: &[Lexeme], params: &ScoreParams) -> Result<Vec<Hit>, Error> {
        score::search(
            query,
            &self.stats,
            &self.relations,
            &self.corpus_stats,
            params,
        )
    }

    /// Tokenize `text` with `dict` (the one used to build the corpus) and rank.
    pub fn search_text(
        &self,
        dict: &mut Dictionary,
        text: &str,
        params: &ScoreParams,
    ) -> Result<Vec<Hit>, Error> {
        let query = dict.analyze(text);
        self.search(&query, params)
    }

    /// The indexed documents.
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Corpus length statistics.
    pub fn corpus_stats(&self) -> &CorpusStats {
        &self.corpus_stats
    }

    /// Compiled phrase statistics.
    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// The thesaurus.
    pub fn relations(&self) -> &RelationModel {
        &self.relations
    }
}
