//! Recursive traversal of predicate chains such as `r_type>rs_label`.
//!
//! Every complete path from a subject through the chain becomes one row of
//! node values. A hop without values ends the row with [`NULL_CELL`].

use super::resolver::{SubjectDocument, ValueSource};
use crate::error::Result;

/// Placeholder for a hop that has no values.
pub const NULL_CELL: &str = "null";

/// Separator between the hops of a chain.
pub const CHAIN_SEPARATOR: char = '>';

/// An ordered list of predicates, each hop applied to the values of the previous one.
pub type PredicateChain = Vec<String>;

/// Splits `p1>p2>p3` into its hops. Empty hops are dropped.
pub fn parse_chain(text: &str) -> PredicateChain {
    text.split(CHAIN_SEPARATOR)
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(str::to_string)
        .collect()
}

/// Walks chains through a [`ValueSource`].
///
/// With loop suppression on, a path never revisits a node already on it.
pub struct PredicateChainWalker<'a, S: ValueSource + ?Sized> {
    source: &'a S,
    suppress_loops: bool,
}

impl<'a, S: ValueSource + ?Sized> PredicateChainWalker<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source, suppress_loops: true }
    }

    pub fn with_loop_suppression(mut self, suppress_loops: bool) -> Self {
        self.suppress_loops = suppress_loops;
        self
    }

    /// Rows for every chain, starting from the subject's own values.
    pub fn rows(&self, subject: &str, chains: &[PredicateChain]) -> Result<Vec<Vec<String>>> {
        let mut rows = Vec::new();
        for chain in chains.iter().filter(|chain| !chain.is_empty()) {
            let first = self.source.values(subject, &chain[0])?;
            self.walk_from(subject, &first, chain, &mut |row: &[String]| rows.push(row.to_vec()))?;
        }
        Ok(rows)
    }

    /// Like [`PredicateChainWalker::rows`], taking the first hop from an already loaded document.
    pub fn document_rows(
        &self,
        doc: &SubjectDocument,
        chains: &[PredicateChain],
    ) -> Result<Vec<Vec<String>>> {
        let mut rows = Vec::new();
        for chain in chains.iter().filter(|chain| !chain.is_empty()) {
            let first = doc.values(&chain[0]);
            self.walk_from(&doc.subject, first, chain, &mut |row: &[String]| rows.push(row.to_vec()))?;
        }
        Ok(rows)
    }

    /// Emits the rows of one chain given the subject and its first-hop values.
    pub fn walk_from(
        &self,
        subject: &str,
        first: &[String],
        chain: &[String],
        emit: &mut dyn FnMut(&[String]),
    ) -> Result<()> {
        let mut row = vec![subject.to_string()];
        if first.is_empty() {
            row.push(NULL_CELL.to_string());
            emit(&row);
            return Ok(());
        }
        for value in first {
            self.walk(value, chain, 1, &mut row, emit)?;
        }
        Ok(())
    }

    /// Visits `node`, reached through hop `depth - 1`, with `row` holding the path so far.
    fn walk(
        &self,
        node: &str,
        chain: &[String],
        depth: usize,
        row: &mut Vec<String>,
        emit: &mut dyn FnMut(&[String]),
    ) -> Result<()> {
        if self.suppress_loops && row.iter().any(|visited| visited == node) {
            return Ok(());
        }
        row.push(node.to_string());

        if depth == chain.len() {
            emit(row.as_slice());
        } else {
            let values = self.source.values(node, &chain[depth])?;
            if values.is_empty() {
                row.push(NULL_CELL.to_string());
                emit(row.as_slice());
                row.pop();
            } else {
                for value in &values {
                    self.walk(value, chain, depth + 1, row, emit)?;
                }
            }
        }

        row.pop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Graph {
        edges: HashMap<(String, String), Vec<String>>,
    }

    impl Graph {
        fn add(&mut self, s: &str, p: &str, o: &str) -> &mut Self {
            self.edges.entry((s.to_string(), p.to_string())).or_default().push(o.to_string());
            self
        }
    }

    impl ValueSource for Graph {
        fn values(&self, subject: &str, predicate: &str) -> Result<Vec<String>> {
            Ok(self.edges.get(&(subject.to_string(), predicate.to_string())).cloned().unwrap_or_default())
        }
    }

    fn rows(graph: &Graph, subject: &str, chain: &str, suppress: bool) -> Vec<Vec<String>> {
        PredicateChainWalker::new(graph)
            .with_loop_suppression(suppress)
            .rows(subject, &[parse_chain(chain)])
            .unwrap()
    }

    #[test]
    fn test_parse_chain() {
        assert_eq!(parse_chain("r_type>rs_label"), vec!["r_type", "rs_label"]);
        assert_eq!(parse_chain(" knows > >name "), vec!["knows", "name"]);
        assert!(parse_chain("").is_empty());
    }

    #[test]
    fn test_two_hop_chain() {
        let mut graph = Graph::default();
        graph.add("a", "knows", "b").add("b", "knows", "c");
        assert_eq!(rows(&graph, "a", "knows>knows", true), vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn test_missing_hop_yields_null() {
        let mut graph = Graph::default();
        graph.add("a", "knows", "b");
        assert_eq!(rows(&graph, "a", "knows>unknown_pred", true), vec![vec!["a", "b", NULL_CELL]]);
        assert_eq!(rows(&graph, "a", "unknown_pred", true), vec![vec!["a", NULL_CELL]]);
    }

    #[test]
    fn test_fan_out() {
        let mut graph = Graph::default();
        graph.add("a", "p", "b").add("a", "p", "c").add("b", "q", "x").add("c", "q", "y").add("c", "q", "z");
        assert_eq!(
            rows(&graph, "a", "p>q", true),
            vec![vec!["a", "b", "x"], vec!["a", "c", "y"], vec!["a", "c", "z"]]
        );
    }

    #[test]
    fn test_loop_suppression() {
        let mut graph = Graph::default();
        graph.add("a", "p", "b").add("b", "p", "a").add("b", "p", "c");
        assert_eq!(rows(&graph, "a", "p>p", true), vec![vec!["a", "b", "c"]]);
        assert_eq!(rows(&graph, "a", "p>p", false), vec![vec!["a", "b", "a"], vec!["a", "b", "c"]]);
    }

    #[test]
    fn test_self_loop_on_first_hop() {
        let mut graph = Graph::default();
        graph.add("a", "same_as", "a");
        assert!(rows(&graph, "a", "same_as", true).is_empty());
        assert_eq!(rows(&graph, "a", "same_as", false), vec![vec!["a", "a"]]);
    }

    #[test]
    fn test_document_rows_use_loaded_values() {
        let mut graph = Graph::default();
        graph.add("person", "rs_label", "\"Person\"@en");
        let doc = SubjectDocument::new("a", 0, vec![("r_type".to_string(), vec!["person".to_string()])]);
        let walker = PredicateChainWalker::new(&graph);
        let rows = walker.document_rows(&doc, &[parse_chain("r_type>rs_label"), parse_chain("r_type")]).unwrap();
        assert_eq!(rows, vec![vec!["a", "person", "\"Person\"@en"], vec!["a", "person"]]);
    }
}
