//! Text output for subjects, chain rows and whole entities.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::core::collapse_newlines;
use crate::error::Result;
use crate::querying::{FieldSet, SubjectDocument, SubjectResolver};

/// Multi-valued fields list this many values before summarising the rest.
pub const MAX_LISTED_VALUES: usize = 10;

/// Prefix of values that are themselves subject keys.
pub const ENTITY_PREFIX: &str = "f_m.";

pub const TYPE_PREDICATE: &str = "r_type";
pub const LABEL_PREDICATE: &str = "rs_label";

/// Text of a `"..."@en` value.
pub fn english_text(value: &str) -> Option<&str> {
    value.strip_prefix('"')?.strip_suffix("\"@en")
}

/// Last English value among `values`.
pub fn english_value(values: &[String]) -> Option<&str> {
    values.iter().rev().find_map(|v| english_text(v))
}

fn cell(value: &str, collapse: bool) -> String {
    if collapse {
        collapse_newlines(value)
    } else {
        value.to_string()
    }
}

/// `subject` or `subject<TAB>score`.
pub fn subject_line(doc: &SubjectDocument, score: Option<f32>) -> String {
    match score {
        Some(score) => format!("{}\t{}", doc.subject, score),
        None => doc.subject.clone(),
    }
}

/// `subject: [score=S]` followed by one `    predicate: value` line per value.
pub fn all_predicates(doc: &SubjectDocument, score: Option<f32>, collapse: bool) -> String {
    let mut out = header(doc, score);
    for (predicate, values) in doc.fields() {
        for value in values {
            let _ = writeln!(out, "    {}: {}", predicate, cell(value, collapse));
        }
    }
    out
}

/// `subject[<TAB>score]` then `<TAB>predicate<TAB>value` for every hop of the row.
pub fn chain_row(row: &[String], score: Option<f32>, chain: &[String], collapse: bool) -> String {
    let mut out = row.first().cloned().unwrap_or_default();
    if let Some(score) = score {
        let _ = write!(out, "\t{}", score);
    }
    for (predicate, value) in chain.iter().zip(row.iter().skip(1)) {
        let _ = write!(out, "\t{}\t{}", predicate, cell(value, collapse));
    }
    out
}

fn header(doc: &SubjectDocument, score: Option<f32>) -> String {
    match score {
        Some(score) => format!("{}: [score={}]\n", doc.subject, score),
        None => format!("{}:\n", doc.subject),
    }
}

/// Finds a display label for a subject key.
pub trait LabelLookup {
    fn english_label(&self, subject: &str) -> Result<Option<String>>;
}

impl LabelLookup for SubjectResolver {
    fn english_label(&self, subject: &str) -> Result<Option<String>> {
        let projection: FieldSet = std::iter::once(LABEL_PREDICATE.to_string()).collect();
        Ok(self
            .lookup(subject, Some(&projection))?
            .and_then(|doc| english_value(doc.values(LABEL_PREDICATE)).map(str::to_string)))
    }
}

/// Renders one entity as indented text.
pub trait Render {
    fn render(&self, doc: &SubjectDocument, score: Option<f32>, labels: Option<&dyn LabelLookup>)
        -> Result<String>;
}

/// `f_m.x (Label)` for subject keys with an English label.
fn expand(value: &str, labels: Option<&dyn LabelLookup>) -> Result<String> {
    let value = collapse_newlines(value);
    if !value.starts_with(ENTITY_PREFIX) {
        return Ok(value);
    }
    match labels {
        Some(labels) => Ok(match labels.english_label(&value)? {
            Some(label) => format!("{} ({})", value, label),
            None => value,
        }),
        None => Ok(value),
    }
}

/// Priority fields first, then fields starting with the type prefix, then the rest.
#[derive(Debug, Clone, Default)]
pub struct EntityRenderer {
    priority: Vec<String>,
    type_match: Option<String>,
}

impl EntityRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_priority_field(mut self, field: &str) -> Self {
        if !self.priority.iter().any(|f| f == field) {
            self.priority.push(field.to_string());
        }
        self
    }

    pub fn with_type_match(mut self, prefix: &str) -> Self {
        self.type_match = Some(prefix.to_string());
        self
    }

    fn matches_type(&self, field: &str) -> bool {
        self.type_match.as_deref().map_or(false, |prefix| field.starts_with(prefix))
    }

    fn render_field(
        &self,
        out: &mut String,
        subject: &str,
        field: &str,
        values: &[String],
        labels: Option<&dyn LabelLookup>,
    ) -> Result<()> {
        if let [value] = values {
            let _ = writeln!(out, "    {}: {}", field, expand(value, labels)?);
            return Ok(());
        }
        let _ = writeln!(out, "    {}:", field);
        for value in values.iter().take(MAX_LISTED_VALUES) {
            let _ = writeln!(out, "        {}", expand(value, labels)?);
        }
        if values.len() > MAX_LISTED_VALUES {
            let _ = writeln!(
                out,
                "        (and {} more... see {}#{})",
                values.len() - MAX_LISTED_VALUES,
                subject,
                field
            );
        }
        Ok(())
    }
}

impl Render for EntityRenderer {
    fn render(
        &self,
        doc: &SubjectDocument,
        score: Option<f32>,
        labels: Option<&dyn LabelLookup>,
    ) -> Result<String> {
        let mut out = header(doc, score);
        for field in &self.priority {
            for value in doc.values(field) {
                let _ = writeln!(out, "    {}: {}", field, collapse_newlines(value));
            }
        }
        for (field, values) in doc.fields().filter(|(field, _)| self.matches_type(field)) {
            self.render_field(&mut out, &doc.subject, field, values, labels)?;
        }
        for (field, values) in doc.fields() {
            if self.priority.iter().any(|p| p == field) || self.matches_type(field) {
                continue;
            }
            self.render_field(&mut out, &doc.subject, field, values, labels)?;
        }
        Ok(out)
    }
}

/// Every field in stored order, nothing truncated.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongFormRenderer;

impl Render for LongFormRenderer {
    fn render(
        &self,
        doc: &SubjectDocument,
        score: Option<f32>,
        labels: Option<&dyn LabelLookup>,
    ) -> Result<String> {
        let mut out = header(doc, score);
        for (field, values) in doc.fields() {
            if let [value] = values {
                let _ = writeln!(out, "    {}: {}", field, expand(value, labels)?);
                continue;
            }
            let _ = writeln!(out, "    {}:", field);
            for value in values {
                let _ = writeln!(out, "        {}", expand(value, labels)?);
            }
        }
        Ok(out)
    }
}

/// Picks a renderer from the entity's type.
#[derive(Debug, Clone)]
pub struct TypedRenderer {
    renderers: HashMap<String, EntityRenderer>,
    fallback: EntityRenderer,
}

/// Types [`TypedRenderer::best_type`] recognises. The first `r_type` value in
/// document order that appears here wins; this list does not rank them.
pub const KNOWN_TYPES: &[&str] = &["f_people.person", "f_location.location", "f_organization.organization"];

impl Default for TypedRenderer {
    fn default() -> Self {
        let person = EntityRenderer::new()
            .with_priority_field("f_type.object.name")
            .with_priority_field("f_common.topic.description")
            .with_type_match("f_people.person");
        let place = EntityRenderer::new()
            .with_priority_field("f_type.object.name")
            .with_priority_field("f_common.topic.description")
            .with_priority_field("f_base.locations")
            .with_priority_field("f_government.political_district")
            .with_priority_field("f_organization.organization_member")
            .with_type_match("f_location");

        // Organizations have no dedicated layout and render with the fallback.
        let mut renderers = HashMap::new();
        renderers.insert("f_people.person".to_string(), person);
        renderers.insert("f_location.location".to_string(), place);
        Self { renderers, fallback: EntityRenderer::new() }
    }
}

impl TypedRenderer {
    /// First `r_type` value that is one of [`KNOWN_TYPES`].
    pub fn best_type(doc: &SubjectDocument) -> Option<&str> {
        doc.values(TYPE_PREDICATE)
            .iter()
            .map(String::as_str)
            .find(|t| KNOWN_TYPES.contains(t))
    }

    pub fn renderer_for(&self, entity_type: Option<&str>) -> &EntityRenderer {
        entity_type.and_then(|t| self.renderers.get(t)).unwrap_or(&self.fallback)
    }
}

impl Render for TypedRenderer {
    fn render(
        &self,
        doc: &SubjectDocument,
        score: Option<f32>,
        labels: Option<&dyn LabelLookup>,
    ) -> Result<String> {
        self.renderer_for(Self::best_type(doc)).render(doc, score, labels)
    }
}
