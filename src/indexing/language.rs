//! Language registry and the text analyzers behind each language.
//!
//! Language tags are lower-cased on the way in. A tag that is not registered
//! falls back to its root (`zh-hant` to `zh`) when the root is registered.

use std::collections::BTreeMap;

use tantivy::schema::{FieldType, Schema};
use tantivy::tokenizer::{
    Language, LowerCaser, RegexTokenizer, RemoveLongFilter, Stemmer, TextAnalyzer,
};
use tantivy::Index;
use tracing::debug;

use super::cjk::CjkBigramTokenizer;
use crate::error::{Error, Result};

/// Tokens longer than this many bytes are dropped instead of indexed.
pub const MAX_TOKEN_BYTES: usize = 255;

/// Prefix of every tokenizer name registered with the index.
pub const TOKENIZER_PREFIX: &str = "kb_";

/// Word pattern of the standard analyzer. Dotted identifiers such as
/// `f_people.person` stay one token.
const WORD_PATTERN: &str = r"[\p{L}\p{N}_]+(?:[.'\-][\p{L}\p{N}_]+)*";

const STEMMERS: &[(&str, Language)] = &[
    ("arabic", Language::Arabic),
    ("danish", Language::Danish),
    ("dutch", Language::Dutch),
    ("english", Language::English),
    ("finnish", Language::Finnish),
    ("french", Language::French),
    ("german", Language::German),
    ("greek", Language::Greek),
    ("hungarian", Language::Hungarian),
    ("italian", Language::Italian),
    ("norwegian", Language::Norwegian),
    ("portuguese", Language::Portuguese),
    ("romanian", Language::Romanian),
    ("russian", Language::Russian),
    ("spanish", Language::Spanish),
    ("swedish", Language::Swedish),
    ("tamil", Language::Tamil),
    ("turkish", Language::Turkish),
];

/// How text of a field is tokenized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerKind {
    /// Unicode words, lower-cased.
    Standard,
    /// Standard analysis followed by a Snowball stemmer.
    Stemmed(Language),
    /// Overlapping character bigrams, for scripts without word separators.
    Cjk,
}

impl Default for AnalyzerKind {
    fn default() -> Self {
        AnalyzerKind::Standard
    }
}

impl AnalyzerKind {
    /// Resolves a configured analyzer name such as `standard`, `english` or `cjk`.
    ///
    /// Qualified class-style names are accepted too: `org.x.en.EnglishAnalyzer` is `english`.
    pub fn from_name(name: &str) -> Result<Self> {
        let name = name.trim();
        let name = name.rsplit('.').next().unwrap_or(name);
        let name = name.strip_suffix("Analyzer").unwrap_or(name).to_lowercase();
        match name.as_str() {
            "standard" | "default" => Ok(AnalyzerKind::Standard),
            "cjk" | "chinese" | "japanese" | "korean" => Ok(AnalyzerKind::Cjk),
            _ => STEMMERS
                .iter()
                .find(|(stemmer, _)| *stemmer == name)
                .map(|(_, language)| AnalyzerKind::Stemmed(*language))
                .ok_or_else(|| Error::Config(format!("Unknown analyzer: {}", name))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AnalyzerKind::Standard => "standard",
            AnalyzerKind::Cjk => "cjk",
            AnalyzerKind::Stemmed(language) => STEMMERS
                .iter()
                .find(|(_, candidate)| candidate == language)
                .map(|(name, _)| *name)
                .unwrap_or("standard"),
        }
    }

    /// Name under which this analyzer is registered with the index.
    pub fn tokenizer_name(&self) -> String {
        format!("{}{}", TOKENIZER_PREFIX, self.name())
    }

    /// Inverse of [`AnalyzerKind::tokenizer_name`].
    pub fn from_tokenizer_name(tokenizer: &str) -> Option<Self> {
        tokenizer.strip_prefix(TOKENIZER_PREFIX).and_then(|name| Self::from_name(name).ok())
    }

    pub fn build(&self) -> Result<TextAnalyzer> {
        let analyzer = match self {
            AnalyzerKind::Standard => TextAnalyzer::builder(RegexTokenizer::new(WORD_PATTERN)?)
                .filter(RemoveLongFilter::limit(MAX_TOKEN_BYTES))
                .filter(LowerCaser)
                .build(),
            AnalyzerKind::Stemmed(language) => {
                TextAnalyzer::builder(RegexTokenizer::new(WORD_PATTERN)?)
                    .filter(RemoveLongFilter::limit(MAX_TOKEN_BYTES))
                    .filter(LowerCaser)
                    .filter(Stemmer::new(*language))
                    .build()
            }
            AnalyzerKind::Cjk => TextAnalyzer::builder(CjkBigramTokenizer)
                .filter(RemoveLongFilter::limit(MAX_TOKEN_BYTES))
                .filter(LowerCaser)
                .build(),
        };
        Ok(analyzer)
    }
}

/// Registers every `kb_*` tokenizer referenced by the schema of `index`.
///
/// Tokenizers are not persisted with the index, so this runs both when an
/// index is created and every time one is opened.
pub fn register_schema_tokenizers(index: &Index) -> Result<()> {
    for kind in schema_analyzers(&index.schema()) {
        debug!("Registering tokenizer {}", kind.tokenizer_name());
        index.tokenizers().register(&kind.tokenizer_name(), kind.build()?);
    }
    Ok(())
}

fn schema_analyzers(schema: &Schema) -> Vec<AnalyzerKind> {
    let mut kinds = vec![AnalyzerKind::Standard];
    for (_, entry) in schema.fields() {
        if let FieldType::Str(options) = entry.field_type() {
            let kind = options
                .get_indexing_options()
                .and_then(|indexing| AnalyzerKind::from_tokenizer_name(indexing.tokenizer()));
            if let Some(kind) = kind {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
        }
    }
    kinds
}

/// Lower-cases a language tag.
pub fn normalize_language(language: &str) -> String {
    language.to_lowercase()
}

/// The part of a tag before its first `-`, or the whole tag.
pub fn language_root(language: &str) -> &str {
    match language.find('-') {
        Some(pos) if pos > 0 => &language[..pos],
        _ => language,
    }
}

/// The set of languages that get their own fields, and the analyzer of each.
#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
    analyzers: BTreeMap<String, AnalyzerKind>,
    default_analyzer: AnalyzerKind,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// English, Spanish and Chinese, the languages multi-field ranking looks at.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("en", AnalyzerKind::Stemmed(Language::English));
        registry.register("es", AnalyzerKind::Stemmed(Language::Spanish));
        registry.register("zh", AnalyzerKind::Cjk);
        registry
    }

    pub fn register(&mut self, language: &str, analyzer: AnalyzerKind) {
        self.analyzers.insert(normalize_language(language), analyzer);
    }

    pub fn set_default_analyzer(&mut self, analyzer: AnalyzerKind) {
        self.default_analyzer = analyzer;
    }

    pub fn default_analyzer(&self) -> AnalyzerKind {
        self.default_analyzer
    }

    /// True if the tag itself is registered.
    pub fn is_supported(&self, language: &str) -> bool {
        self.analyzers.contains_key(&normalize_language(language))
    }

    /// True if the tag or its root is registered.
    pub fn is_routable(&self, language: &str) -> bool {
        let language = normalize_language(language);
        self.analyzers.contains_key(&language) || self.analyzers.contains_key(language_root(&language))
    }

    /// Field name for `field` in `language`: `field@lang` when the tag is
    /// registered, `field@root` otherwise.
    pub fn qualify(&self, field: &str, language: &str) -> String {
        let language = normalize_language(language);
        if self.analyzers.contains_key(&language) {
            format!("{}@{}", field, language)
        } else {
            format!("{}@{}", field, language_root(&language))
        }
    }

    pub fn analyzer_for(&self, language: &str) -> Option<AnalyzerKind> {
        let language = normalize_language(language);
        self.analyzers
            .get(&language)
            .or_else(|| self.analyzers.get(language_root(&language)))
            .copied()
    }

    pub fn supported_languages(&self) -> impl Iterator<Item = &str> {
        self.analyzers.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.analyzers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tantivy::tokenizer::TokenStream;

    fn registry() -> LanguageRegistry {
        let mut registry = LanguageRegistry::new();
        registry.register("EN", AnalyzerKind::Stemmed(Language::English));
        registry.register("zh", AnalyzerKind::Cjk);
        registry.register("es-419", AnalyzerKind::Stemmed(Language::Spanish));
        registry
    }

    #[test]
    fn test_support_is_case_insensitive() {
        let registry = registry();
        assert!(registry.is_supported("en"));
        assert!(registry.is_supported("En"));
        assert!(!registry.is_supported("en-gb"));
        assert!(registry.is_routable("en-GB"));
        assert!(!registry.is_routable("es-mx"));
        assert!(registry.is_routable("ES-419"));
    }

    #[test]
    fn test_qualify() {
        let registry = registry();
        assert_eq!(registry.qualify("rs_label", "EN"), "rs_label@en");
        assert_eq!(registry.qualify("rs_label", "zh-Hant"), "rs_label@zh");
        assert_eq!(registry.qualify("text", "es-419"), "text@es-419");
        assert_eq!(registry.qualify("text", "fr-CA"), "text@fr");
    }

    #[test]
    fn test_language_root() {
        assert_eq!(language_root("zh-hant"), "zh");
        assert_eq!(language_root("en"), "en");
        assert_eq!(language_root("-x"), "-x");
    }

    #[test]
    fn test_analyzer_for_falls_back_to_root() {
        let registry = registry();
        assert_eq!(registry.analyzer_for("zh-TW"), Some(AnalyzerKind::Cjk));
        assert_eq!(registry.analyzer_for("de"), None);
    }

    #[test]
    fn test_analyzer_names() {
        assert_eq!(AnalyzerKind::from_name("English").unwrap(), AnalyzerKind::Stemmed(Language::English));
        assert_eq!(AnalyzerKind::from_name("cjk").unwrap(), AnalyzerKind::Cjk);
        assert_eq!(
            AnalyzerKind::from_name("org.apache.lucene.analysis.cjk.CJKAnalyzer").unwrap(),
            AnalyzerKind::Cjk
        );
        assert!(AnalyzerKind::from_name("klingon").is_err());
        assert_eq!(AnalyzerKind::Stemmed(Language::German).tokenizer_name(), "kb_german");
        assert_eq!(AnalyzerKind::from_tokenizer_name("kb_spanish"), Some(AnalyzerKind::Stemmed(Language::Spanish)));
        assert_eq!(AnalyzerKind::from_tokenizer_name("default"), None);
    }

    #[test]
    fn test_standard_analyzer_keeps_identifiers() {
        let mut analyzer = AnalyzerKind::Standard.build().unwrap();
        let mut stream = analyzer.token_stream("Type f_people.person, O'Brien rocks");
        let mut tokens = Vec::new();
        while let Some(token) = stream.next() {
            tokens.push(token.text.clone());
        }
        assert_eq!(tokens, vec!["type", "f_people.person", "o'brien", "rocks"]);
    }

    #[test]
    fn test_english_analyzer_stems() {
        let mut analyzer = AnalyzerKind::Stemmed(Language::English).build().unwrap();
        let mut stream = analyzer.token_stream("Running horses");
        let mut tokens = Vec::new();
        while let Some(token) = stream.next() {
            tokens.push(token.text.clone());
        }
        assert_eq!(tokens, vec!["run", "hors"]);
    }
}
