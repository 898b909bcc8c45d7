//! Rankers turn a query string into scored documents.

use std::str::FromStr;
use std::sync::Arc;

use tantivy::collector::{Collector, Count, TopDocs};
use tantivy::query::{BooleanQuery, Occur, Query, QueryParser};
use tantivy::schema::Field;
use tantivy::{DocAddress, DocId, Score, SegmentReader};
use tracing::debug;

use super::kb_index::KbIndex;
use crate::error::{Error, Result};
use crate::indexing::schema::FIELD_IMPORTANCE;

/// Fields searched by [`MultiFieldRanker`] when present in the index, in order.
pub const MULTI_FIELD_DEFAULTS: &[&str] = &[
    "text@en",
    "text@es",
    "text@zh",
    "rs_label@en",
    "rs_label@es",
    "rs_label@zh",
    "text",
    "rs_label",
];

const QUERY_SYNTAX: &[char] = &['"', '+', '(', ')', '-'];

/// True if the query uses phrase, required/excluded or grouping syntax.
pub fn has_query_syntax(query: &str) -> bool {
    query.contains(QUERY_SYNTAX)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedHit {
    pub doc: DocAddress,
    pub score: Score,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedResults {
    /// Number of matching documents, collected or not.
    pub total_hits: usize,
    /// Best hits first.
    pub hits: Vec<RankedHit>,
}

pub trait Ranker: Send + Sync {
    fn name(&self) -> &'static str;

    /// Runs `query` and returns at most `limit` hits, or all of them for `None`.
    /// A ranker built with a depth never returns more than that many.
    fn rank(&self, query: &str, limit: Option<usize>) -> Result<RankedResults>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RankerKind {
    #[default]
    Basic,
    Multi,
}

impl FromStr for RankerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(RankerKind::Basic),
            "multi" | "multi-field" => Ok(RankerKind::Multi),
            other => Err(Error::Config(format!("Unknown ranker: {}", other))),
        }
    }
}

fn parse(parser: &QueryParser, query: &str) -> Result<Box<dyn Query>> {
    parser
        .parse_query(query)
        .map_err(|source| Error::QueryParse { query: query.to_string(), source })
}

/// Hits to collect: `limit`, or every match when `None`, never more than `depth`.
fn resolve_limit(
    index: &KbIndex,
    query: &dyn Query,
    limit: Option<usize>,
    depth: Option<usize>,
) -> Result<usize> {
    let limit = match (limit, depth) {
        (Some(limit), Some(depth)) => limit.min(depth),
        (Some(limit), None) => limit,
        (None, Some(depth)) => depth,
        (None, None) => index.searcher().search(query, &Count).map_err(Error::storage("counting hits"))?,
    };
    Ok(limit)
}

/// Collects `limit` hits. The engine rejects a zero limit, so that case only counts.
fn run<C, F>(index: &KbIndex, query: &dyn Query, limit: usize, collector: F) -> Result<RankedResults>
where
    C: Collector<Fruit = Vec<(Score, DocAddress)>>,
    F: FnOnce(usize) -> C,
{
    if limit == 0 {
        let total_hits = index.searcher().search(query, &Count).map_err(Error::storage("counting hits"))?;
        return Ok(RankedResults { total_hits, hits: Vec::new() });
    }
    let (top, total_hits) = index
        .searcher()
        .search(query, &(collector(limit), Count))
        .map_err(Error::storage("running a search"))?;
    let hits = top.into_iter().map(|(score, doc)| RankedHit { doc, score }).collect();
    Ok(RankedResults { total_hits, hits })
}

/// Parses the query against a single default field and keeps the engine's scores.
pub struct BasicRanker {
    index: Arc<KbIndex>,
    field: String,
    depth: Option<usize>,
}

impl BasicRanker {
    pub fn new(index: Arc<KbIndex>, field: impl Into<String>) -> Self {
        Self { index, field: field.into(), depth: None }
    }

    /// Caps every result list at `depth` hits.
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }
}

impl Ranker for BasicRanker {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn rank(&self, query: &str, limit: Option<usize>) -> Result<RankedResults> {
        let field = self.index.schema().require_field(&self.field)?;
        let parser = QueryParser::for_index(self.index.index(), vec![field]);
        let parsed = parse(&parser, query)?;
        let limit = resolve_limit(&self.index, parsed.as_ref(), limit, self.depth)?;
        run(&self.index, parsed.as_ref(), limit, TopDocs::with_limit)
    }
}

/// Multiplies relevance by the per-document importance column.
///
/// Documents whose importance is missing, zero or negative get the neutral
/// multiplier 1.
#[derive(Debug, Clone)]
pub struct ImportanceWeight {
    column: String,
}

impl Default for ImportanceWeight {
    fn default() -> Self {
        Self::new(FIELD_IMPORTANCE)
    }
}

impl ImportanceWeight {
    pub fn new(column: impl Into<String>) -> Self {
        Self { column: column.into() }
    }

    pub fn effective(importance: Option<i64>) -> Score {
        match importance {
            Some(value) if value > 0 => value as Score,
            _ => 1.0,
        }
    }

    pub fn top_docs(&self, limit: usize) -> impl Collector<Fruit = Vec<(Score, DocAddress)>> {
        let column = self.column.clone();
        TopDocs::with_limit(limit).tweak_score(move |segment_reader: &SegmentReader| {
            let importance = segment_reader.fast_fields().i64(&column).ok();
            move |doc: DocId, score: Score| {
                score * ImportanceWeight::effective(importance.as_ref().and_then(|c| c.first(doc)))
            }
        })
    }
}

/// Searches several language and field variants at once, boosts exact
/// phrase matches and weighs scores by importance.
pub struct MultiFieldRanker {
    index: Arc<KbIndex>,
    fields: Vec<Field>,
    importance: ImportanceWeight,
    depth: Option<usize>,
}

impl MultiFieldRanker {
    /// Uses the [`MULTI_FIELD_DEFAULTS`] fields the index has.
    pub fn new(index: Arc<KbIndex>) -> Result<Self> {
        Self::with_fields(index, MULTI_FIELD_DEFAULTS)
    }

    pub fn with_fields(index: Arc<KbIndex>, names: &[&str]) -> Result<Self> {
        let mut fields = Vec::new();
        for name in names {
            match index.schema().field(name) {
                Some(field) => fields.push(field),
                None => debug!("Skipping field {}, not in the index", name),
            }
        }
        if fields.is_empty() {
            return Err(Error::Config(format!("None of the fields {} is indexed", names.join(", "))));
        }
        Ok(Self { index, fields, importance: ImportanceWeight::default(), depth: None })
    }

    /// Caps every result list at `depth` hits.
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    fn build_query(&self, query: &str) -> Result<Box<dyn Query>> {
        let parser = QueryParser::for_index(self.index.index(), self.fields.clone());
        let base = parse(&parser, query)?;
        if query.trim().is_empty() || has_query_syntax(query) {
            return Ok(base);
        }
        let phrase = format!("\"{}\"", query.trim());
        match parser.parse_query(&phrase) {
            Ok(phrase) => Ok(Box::new(BooleanQuery::new(vec![(Occur::Should, base), (Occur::Should, phrase)]))),
            Err(e) => {
                debug!("Skipping phrase boost for `{}`: {}", query, e);
                Ok(base)
            }
        }
    }
}

impl Ranker for MultiFieldRanker {
    fn name(&self) -> &'static str {
        "multi"
    }

    fn rank(&self, query: &str, limit: Option<usize>) -> Result<RankedResults> {
        let parsed = self.build_query(query)?;
        let limit = resolve_limit(&self.index, parsed.as_ref(), limit, self.depth)?;
        run(&self.index, parsed.as_ref(), limit, |limit| self.importance.top_docs(limit))
    }
}
