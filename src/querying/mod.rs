//! Lookup, predicate-chain traversal and ranked search over a finished index

pub mod chain;
pub mod kb_index;
pub mod print_mode;
pub mod ranker;
pub mod resolver;

pub use chain::{parse_chain, PredicateChain, PredicateChainWalker, NULL_CELL};
pub use kb_index::KbIndex;
pub use print_mode::{parse_list, PrintMode};
pub use ranker::{
    BasicRanker, ImportanceWeight, MultiFieldRanker, RankedHit, RankedResults, Ranker, RankerKind,
};
pub use resolver::{DocId, FieldSet, SubjectDocument, SubjectResolver, ValueSource};
