//! Groups a subject-sorted triple stream into one record per subject.

use crate::core::{normalize_uri, SubjectRecord, Triple, ValueNormalizer};

/// Streaming grouper. Only the record of the current subject is held in memory.
///
/// Input sorted by subject yields one record per subject. A subject that
/// reappears after another one starts a second record; uniqueness is up to
/// the caller.
#[derive(Debug, Default)]
pub struct SubjectAggregator {
    normalizer: ValueNormalizer,
    current: Option<SubjectRecord>,
}

impl SubjectAggregator {
    pub fn new(normalizer: ValueNormalizer) -> Self {
        Self { normalizer, current: None }
    }

    /// Adds a triple. Returns the finished record of the previous subject
    /// when the subject changes.
    pub fn accept(&mut self, triple: &Triple) -> Option<SubjectRecord> {
        let subject = normalize_uri(&triple.subject);
        let predicate = normalize_uri(&triple.predicate);
        let value = self.normalizer.parse(&triple.value);

        let subject_changed = self.current.as_ref().map_or(false, |record| record.subject != subject);
        let finished = if subject_changed { self.current.take() } else { None };
        self.current
            .get_or_insert_with(|| SubjectRecord::new(subject))
            .push(predicate, value);
        finished
    }

    /// Returns the record being built, if any.
    pub fn flush(&mut self) -> Option<SubjectRecord> {
        self.current.take()
    }

    pub fn current_subject(&self) -> Option<&str> {
        self.current.as_ref().map(|record| record.subject.as_str())
    }
}
