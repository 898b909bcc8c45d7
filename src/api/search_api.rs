//! Search API
//!
//! One handle over an opened index that both the command line and the HTTP
//! server use for lookup, ranked search, chain traversal and printing.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::querying::{
    BasicRanker, FieldSet, KbIndex, MultiFieldRanker, PredicateChain, PredicateChainWalker,
    PrintMode, Ranker, RankerKind, SubjectDocument, SubjectResolver,
};
use crate::render::{self, english_value, LABEL_PREDICATE, TYPE_PREDICATE};

/// A found document with its score.
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub doc: SubjectDocument,
    pub score: f32,
}

/// Documents of a search, best first.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub total_hits: usize,
    pub documents: Vec<ScoredDocument>,
}

/// Summary of one hit, as served over HTTP.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchHit {
    pub subject: String,
    pub score: f32,
    pub importance: i64,
    pub types: Vec<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResponse {
    pub query: String,
    pub ranker: String,
    pub total_hits: usize,
    pub hits: Vec<SearchHit>,
}

pub struct SearchApi {
    index: Arc<KbIndex>,
    resolver: SubjectResolver,
    basic: BasicRanker,
    multi: Option<MultiFieldRanker>,
    config: SearchConfig,
}

impl SearchApi {
    /// Opens the index named by `config`.
    pub fn open(config: SearchConfig) -> Result<Self> {
        let location = config.index_directory()?;
        let index = Arc::new(KbIndex::open(&location)?);
        Ok(Self::new(index, config))
    }

    /// Opens the index at `location` with otherwise default settings.
    pub fn open_dir(location: &Path) -> Result<Self> {
        Self::open(SearchConfig { index_directory: Some(location.to_path_buf()), ..SearchConfig::default() })
    }

    pub fn new(index: Arc<KbIndex>, config: SearchConfig) -> Self {
        let basic = BasicRanker::new(Arc::clone(&index), config.default_search_field.clone())
            .with_depth(config.search_depth);
        let multi = match MultiFieldRanker::new(Arc::clone(&index)) {
            Ok(ranker) => Some(ranker.with_depth(config.search_depth)),
            Err(e) => {
                debug!("Multi-field ranking unavailable: {}", e);
                None
            }
        };
        let resolver = SubjectResolver::new(Arc::clone(&index));
        Self { index, resolver, basic, multi, config }
    }

    pub fn index(&self) -> &Arc<KbIndex> {
        &self.index
    }

    pub fn resolver(&self) -> &SubjectResolver {
        &self.resolver
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn ranker(&self, kind: RankerKind) -> Result<&dyn Ranker> {
        match kind {
            RankerKind::Basic => Ok(&self.basic),
            RankerKind::Multi => match &self.multi {
                Some(ranker) => Ok(ranker),
                None => Err(Error::Config(
                    "The index has none of the fields the multi-field ranker searches".to_string(),
                )),
            },
        }
    }

    /// Document of `subject`, reading only what `mode` prints.
    pub fn lookup(&self, subject: &str, mode: &PrintMode) -> Result<Option<SubjectDocument>> {
        self.resolver.lookup(subject, mode.projection().as_ref())
    }

    /// Runs a ranked search and reads the hits, keeping `projection` only.
    pub fn search(
        &self,
        query: &str,
        kind: RankerKind,
        limit: Option<usize>,
        projection: Option<&FieldSet>,
    ) -> Result<SearchOutcome> {
        let ranker = self.ranker(kind)?;
        let results = ranker.rank(query, limit)?;
        debug!("{} ranker found {} hits for `{}`", ranker.name(), results.total_hits, query);

        let mut documents = Vec::with_capacity(results.hits.len());
        for hit in results.hits {
            let doc = self.resolver.document(hit.doc, projection)?;
            documents.push(ScoredDocument { doc, score: hit.score });
        }
        Ok(SearchOutcome { total_hits: results.total_hits, documents })
    }

    /// Search summarised per hit with types and English label.
    pub fn search_hits(&self, query: &str, kind: RankerKind, limit: Option<usize>) -> Result<SearchResponse> {
        let projection: FieldSet =
            [TYPE_PREDICATE, LABEL_PREDICATE].iter().map(|p| p.to_string()).collect();
        let outcome = self.search(query, kind, limit, Some(&projection))?;
        let hits = outcome
            .documents
            .into_iter()
            .map(|ScoredDocument { doc, score }| SearchHit {
                label: english_value(doc.values(LABEL_PREDICATE)).map(str::to_string),
                types: doc.values(TYPE_PREDICATE).to_vec(),
                subject: doc.subject,
                importance: doc.importance,
                score,
            })
            .collect();
        Ok(SearchResponse {
            query: query.to_string(),
            ranker: self.ranker(kind)?.name().to_string(),
            total_hits: outcome.total_hits,
            hits,
        })
    }

    /// Rows of every chain from `subject`. `suppress_loops` overrides the configured setting.
    pub fn chain_rows(
        &self,
        subject: &str,
        chains: &[PredicateChain],
        suppress_loops: Option<bool>,
    ) -> Result<Vec<Vec<String>>> {
        PredicateChainWalker::new(&self.resolver)
            .with_loop_suppression(suppress_loops.unwrap_or(self.config.suppress_predicate_loops))
            .rows(subject, chains)
    }

    /// Text of one result in `mode`, every line newline-terminated.
    pub fn print(&self, doc: &SubjectDocument, score: Option<f32>, mode: &PrintMode) -> Result<String> {
        let collapse = self.config.normalize_newlines;
        match mode {
            PrintMode::All => Ok(render::all_predicates(doc, score, collapse)),
            PrintMode::Subject => Ok(format!("{}\n", render::subject_line(doc, score))),
            PrintMode::Chains(chains) => {
                let walker = PredicateChainWalker::new(&self.resolver)
                    .with_loop_suppression(self.config.suppress_predicate_loops);
                let mut out = String::new();
                for chain in chains {
                    for row in walker.document_rows(doc, std::slice::from_ref(chain))? {
                        out.push_str(&render::chain_row(&row, score, chain, collapse));
                        out.push('\n');
                    }
                }
                Ok(out)
            }
        }
    }
}
