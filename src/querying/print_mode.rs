use super::chain::{parse_chain, PredicateChain};
use super::resolver::FieldSet;

/// What to show for each looked-up or found subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintMode {
    /// Every stored predicate and value.
    All,
    /// The subject only.
    Subject,
    /// One row per path through each chain.
    Chains(Vec<PredicateChain>),
}

/// Splits a comma or whitespace separated list.
pub fn parse_list(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

impl PrintMode {
    /// `all`, `subject`, or a list of chains like `rs_label, r_type>rs_label`.
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "" | "all" => PrintMode::All,
            "subject" => PrintMode::Subject,
            chains => PrintMode::Chains(
                parse_list(chains)
                    .iter()
                    .map(|chain| parse_chain(chain))
                    .filter(|chain| !chain.is_empty())
                    .collect(),
            ),
        }
    }

    /// Predicates that must be read from each document, `None` for all of them.
    pub fn projection(&self) -> Option<FieldSet> {
        match self {
            PrintMode::All => None,
            PrintMode::Subject => Some(FieldSet::new()),
            PrintMode::Chains(chains) => {
                Some(chains.iter().filter_map(|chain| chain.first().cloned()).collect())
            }
        }
    }

    pub fn chains(&self) -> &[PredicateChain] {
        match self {
            PrintMode::Chains(chains) => chains,
            _ => &[],
        }
    }
}
