//! `phrasir` CLI: index a directory of documents and answer queries.

#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};
#[cfg(feature = "cli")]
use phrasir::corpus::Corpus;
#[cfg(feature = "cli")]
use phrasir::engine::Engine;
#[cfg(feature = "cli")]
use phrasir::index::{IndexConfig, RelatedSlots};
#[cfg(feature = "cli")]
use phrasir::lexeme::Dictionary;
#[cfg(feature = "cli")]
use phrasir::relation::{RelationKind, RelationModel, RelationSpec};
#[cfg(feature = "cli")]
use phrasir::score::{Hit, MatchStats, RelationWeights, ScoreParams};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(author, version, about = "Phrase search with thesaurus expansion", long_about = None)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Args, Debug)]
struct CorpusArgs {
    /// Directory of documents (read recursively, one document per file).
    #[arg(short, long)]
    corpus: PathBuf,

    /// Thesaurus JSON (`synonyms` groups and `generalizations` objects).
    #[arg(short, long)]
    thesaurus: Option<PathBuf>,

    /// Lemma table: one `form<TAB>lemma` pair per line.
    #[arg(long)]
    lemmas: Option<PathBuf>,

    /// Longest phrase indexed, in words (1-3).
    #[arg(long, default_value_t = phrasir::config::MAX_WINDOW)]
    max_window: usize,

    /// Do not reserve statistics slots for thesaurus-related phrases.
    #[arg(long, default_value_t = false)]
    no_reserve: bool,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the index and rank documents for each query.
    Search {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// JSON file holding an array of query strings.
        #[arg(short, long)]
        queries: Option<PathBuf>,

        /// Top-k results per query.
        #[arg(short, long, default_value_t = phrasir::config::DEFAULT_TOP_K)]
        k: usize,

        /// BM25 term-frequency saturation.
        #[arg(long, default_value_t = phrasir::config::BM25_K1)]
        k1: f64,

        /// BM25 length normalization.
        #[arg(long, default_value_t = phrasir::config::BM25_B)]
        b: f64,

        /// Weight of synonym matches.
        #[arg(long, default_value_t = phrasir::config::SYNONYM_WEIGHT)]
        synonym_weight: f64,

        /// Weight of broader/narrower matches.
        #[arg(long, default_value_t = phrasir::config::GENERALIZATION_WEIGHT)]
        generalization_weight: f64,

        /// Print one JSON object per query instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Queries (each argument is one query), answered after those from `--queries`.
        query: Vec<String>,
    },

    /// Print the statistics of one phrase.
    Phrase {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Phrase words.
        phrase: Vec<String>,
    },
}

#[cfg(feature = "cli")]
#[derive(serde::Serialize)]
struct JsonStats {
    count: usize,
    tf: f64,
    idf: f64,
}

#[cfg(feature = "cli")]
impl From<MatchStats> for JsonStats {
    fn from(s: MatchStats) -> Self {
        Self {
            count: s.count,
            tf: s.tf,
            idf: s.idf,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(serde::Serialize)]
struct JsonRelated {
    phrase: String,
    kind: RelationKind,
    #[serde(flatten)]
    stats: JsonStats,
}

#[cfg(feature = "cli")]
#[derive(serde::Serialize)]
struct JsonTerm {
    term: String,
    direct: Option<JsonStats>,
    related: Vec<JsonRelated>,
}

#[cfg(feature = "cli")]
#[derive(serde::Serialize)]
struct JsonHit {
    rank: usize,
    name: String,
    score: f64,
    size: usize,
    terms: Vec<JsonTerm>,
}

#[cfg(feature = "cli")]
#[derive(serde::Serialize)]
struct JsonResponse<'a> {
    request: &'a str,
    results: Vec<JsonHit>,
}

#[cfg(feature = "cli")]
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "phrasir=debug" } else { "phrasir=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn load(args: &CorpusArgs) -> Result<(Dictionary, Engine), Box<dyn std::error::Error>> {
    let mut dict = match &args.lemmas {
        Some(path) => Dictionary::load_lemmas(path)?,
        None => Dictionary::new(),
    };
    let relations = match &args.thesaurus {
        Some(path) => RelationModel::load(&RelationSpec::from_path(path)?, &mut dict),
        None => RelationModel::new(),
    };
    let corpus = Corpus::read_dir(&args.corpus, &mut dict)?;
    let config = IndexConfig {
        max_window: args.max_window,
        related_slots: if args.no_reserve {
            RelatedSlots::Skip
        } else {
            RelatedSlots::Reserve
        },
    };
    let engine = Engine::build(corpus, relations, &config)?;
    Ok((dict, engine))
}

#[cfg(feature = "cli")]
fn to_json(hits: &[Hit], engine: &Engine, dict: &Dictionary) -> Vec<JsonHit> {
    hits.iter()
        .enumerate()
        .filter_map(|(i, hit)| {
            let doc = engine.corpus().get(hit.doc)?;
            Some(JsonHit {
                rank: i + 1,
                name: doc.name.clone(),
                score: hit.score,
                size: doc.tokens.len(),
                terms: hit
                    .terms
                    .iter()
                    .map(|t| JsonTerm {
                        term: dict.resolve(t.lexeme).to_string(),
                        direct: t.direct.map(JsonStats::from),
                        related: t
                            .related
                            .iter()
                            .map(|r| JsonRelated {
                                phrase: r.key.render(dict),
                                kind: r.kind,
                                stats: r.stats.into(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
        })
        .collect()
}

#[cfg(feature = "cli")]
fn print_hits(hits: &[Hit], engine: &Engine, dict: &Dictionary) {
    for (i, hit) in hits.iter().enumerate() {
        let Some(doc) = engine.corpus().get(hit.doc) else {
            continue;
        };
        println!(
            "Result {} | {} | Score: {:.4} | File size: {}",
            i + 1,
            doc.name,
            hit.score,
            doc.tokens.len()
        );
        for term in &hit.terms {
            if let Some(s) = term.direct {
                println!(
                    " - {} - Count: {}, TF: {:.4}, IDF: {:.4}",
                    dict.resolve(term.lexeme),
                    s.count,
                    s.tf,
                    s.idf
                );
            }
            for r in &term.related {
                println!(
                    "    - {} - Count: {}, TF: {:.4}, IDF: {:.4}",
                    r.key.render(dict),
                    r.stats.count,
                    r.stats.tf,
                    r.stats.idf
                );
            }
        }
    }
}

#[cfg(feature = "cli")]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Search {
            corpus,
            queries,
            k,
            k1,
            b,
            synonym_weight,
            generalization_weight,
            json,
            query,
        } => {
            let mut requests = match &queries {
                Some(path) => phrasir::config::load_queries(path)?,
                None => Vec::new(),
            };
            requests.extend(query);
            if requests.is_empty() {
                return Err("no queries given (use --queries or positional arguments)".into());
            }

            let (mut dict, engine) = load(&corpus)?;
            let params = ScoreParams {
                k1,
                b,
                weights: RelationWeights {
                    synonym: synonym_weight,
                    generalization: generalization_weight,
                },
                top_k: k,
            };

            for (n, request) in requests.iter().enumerate() {
                let hits = match engine.search_text(&mut dict, request, &params) {
                    Ok(hits) => hits,
                    Err(phrasir::Error::EmptyQuery) => {
                        tracing::warn!(request = %request, "skipping query without words");
                        Vec::new()
                    }
                    Err(e) => return Err(e.into()),
                };
                if json {
                    let response = JsonResponse {
                        request,
                        results: to_json(&hits, &engine, &dict),
                    };
                    println!("{}", serde_json::to_string(&response)?);
                } else {
                    println!("\nRequest {}: {}", n + 1, request);
                    if hits.is_empty() {
                        println!("No results");
                    }
                    print_hits(&hits, &engine, &dict);
                }
            }
        }
        Commands::Phrase { corpus, phrase } => {
            let (mut dict, engine) = load(&corpus)?;
            let key = dict.analyze(&phrase.join(" "));
            if key.is_empty() {
                return Err("empty phrase".into());
            }
            let Some(stats) = engine.stats().get(&key) else {
                println!("not indexed: {}", phrase.join(" "));
                return Ok(());
            };
            println!("IDF: {:.4} | Documents: {}", stats.idf(), stats.records().len());
            for record in stats.records() {
                let name = engine
                    .corpus()
                    .get(record.doc)
                    .map(|d| d.name.as_str())
                    .unwrap_or("?");
                println!(
                    " - {} | Count: {}, TF: {:.4}, Positions: {:?}",
                    name,
                    record.count(),
                    record.tf,
                    record.positions
                );
            }
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "cli")]
    return run();

    #[cfg(not(feature = "cli"))]
    {
        println!("CLI feature is disabled. Build with --features cli to enable.");
        Ok(())
    }
}
