//! Configuration structures and utilities
//!
//! Settings come from built-in defaults, then an optional configuration file
//! of `setenv NAME value` lines, then command-line flags.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::indexing::{AnalyzerKind, BuildOptions, LanguageRegistry, DEFAULT_WRITER_MEMORY};
use crate::parsing::read_list_file;

/// Name of the configuration file inside the home directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.dat";
/// Placeholder expanded to the home directory in configuration values.
pub const HOME_VARIABLE: &str = "$KB_HOME";
/// Prefix of per-language analyzer keys, e.g. `INDEX_ANALYZER_ES_419`.
pub const ANALYZER_PREFIX: &str = "INDEX_ANALYZER_";
/// Lines indexed when not running over the full data.
pub const TEST_MODE_MAX_LINES: u64 = 20_000_000;
pub const DEFAULT_SEARCH_FIELD: &str = "rs_label";
pub const DEFAULT_MAX_HITS: i64 = 10;
/// Hits collected by a ranker before printing.
pub const DEFAULT_SEARCH_DEPTH: usize = 100;

/// Key/value pairs read from a configuration file.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    properties: BTreeMap<String, String>,
}

impl ConfigFile {
    pub fn parse(text: &str, home: &Path) -> Result<Self> {
        let vardef = Regex::new(r"^setenv\s+(\S+)\s+(.*)$")
            .map_err(|e| Error::Config(format!("Invalid setenv pattern: {}", e)))?;
        let home = home.to_string_lossy();
        let mut properties = BTreeMap::new();
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(captures) = vardef.captures(line) {
                let value = captures[2].trim().replace(HOME_VARIABLE, &home);
                properties.insert(captures[1].to_string(), value);
            }
        }
        Ok(Self { properties })
    }

    pub fn load(path: &Path, home: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(Error::io(format!("reading config file {}", path.display())))?;
        Self::parse(&text, home)
    }

    /// Like [`ConfigFile::load`], but a missing or unreadable file only logs a warning.
    pub fn load_or_default(path: &Path, home: &Path) -> Self {
        match Self::load(path, home) {
            Ok(config) => {
                debug!("Read {} settings from {}", config.properties.len(), path.display());
                config
            }
            Err(e) => {
                warn!("Problem reading config file `{}`: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.properties.insert(key.to_string(), value.to_string());
    }

    pub fn path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).filter(|v| !v.is_empty()).map(PathBuf::from)
    }

    pub fn parse_value<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, raw))),
        }
    }

    /// Languages from `INDEX_ANALYZER_<LANG>` keys, default analyzer from `INDEX_ANALYZER_DEFAULT`.
    pub fn language_registry(&self) -> Result<LanguageRegistry> {
        let mut registry = LanguageRegistry::new();
        for (key, value) in &self.properties {
            let Some(suffix) = key.strip_prefix(ANALYZER_PREFIX) else { continue };
            let language = suffix.to_lowercase().replace('_', "-");
            let analyzer = AnalyzerKind::from_name(value)?;
            if language == "default" {
                registry.set_default_analyzer(analyzer);
            } else {
                debug!("Language {} uses analyzer {}", language, analyzer.name());
                registry.register(&language, analyzer);
            }
        }
        Ok(registry)
    }
}

/// `index_directory` if given, else `<triples_file>.index`.
pub fn resolve_index_directory(
    index_directory: Option<&Path>,
    triples_file: Option<&Path>,
) -> Result<PathBuf> {
    match (index_directory, triples_file) {
        (Some(dir), _) => Ok(dir.to_path_buf()),
        (None, Some(triples)) => {
            let mut name = OsString::from(triples.as_os_str());
            name.push(".index");
            Ok(PathBuf::from(name))
        }
        (None, None) => Err(Error::Config(
            "Cannot determine index directory, supply one with --index".to_string(),
        )),
    }
}

/// Settings of an indexing run.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub triples_file: Option<PathBuf>,
    pub index_directory: Option<PathBuf>,
    pub indexed_predicates_file: Option<PathBuf>,
    pub languages: LanguageRegistry,
    pub build: BuildOptions,
    pub normalize_newlines: bool,
    /// Index every line instead of stopping at [`TEST_MODE_MAX_LINES`].
    pub full_data: bool,
    /// Merge the index into a single segment at the end.
    pub optimize: bool,
    pub writer_memory: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            triples_file: None,
            index_directory: None,
            indexed_predicates_file: None,
            languages: LanguageRegistry::new(),
            build: BuildOptions::default(),
            normalize_newlines: false,
            full_data: false,
            optimize: true,
            writer_memory: DEFAULT_WRITER_MEMORY,
        }
    }
}

impl IndexConfig {
    /// Defaults overlaid with the settings of a configuration file.
    pub fn from_file(file: &ConfigFile) -> Result<Self> {
        let mut config = Self::default();
        config.triples_file = file.path("TRIPLES_FILE");
        config.index_directory = file.path("INDEX_DIRECTORY");
        config.indexed_predicates_file = file.path("INDEXED_PREDICATES");
        config.languages = file.language_registry()?;
        if let Some(predicate) = file.get("IMPORTANCE_PREDICATE") {
            config.build.importance_predicate = predicate.to_string();
        }
        Ok(config)
    }

    pub fn index_directory(&self) -> Result<PathBuf> {
        resolve_index_directory(self.index_directory.as_deref(), self.triples_file.as_deref())
    }

    pub fn triples_file(&self) -> Result<&Path> {
        self.triples_file
            .as_deref()
            .ok_or_else(|| Error::Config("No triples file given".to_string()))
    }

    pub fn max_lines(&self) -> Option<u64> {
        if self.full_data {
            None
        } else {
            Some(TEST_MODE_MAX_LINES)
        }
    }

    /// Reads the indexed predicates list. Without one only the combined fields get text.
    pub fn indexed_predicates(&self) -> Result<Vec<String>> {
        match &self.indexed_predicates_file {
            Some(path) => read_list_file(path),
            None => {
                warn!("No indexed predicates file given, no predicate will be searchable");
                Ok(Vec::new())
            }
        }
    }
}

/// Settings of lookup and search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub index_directory: Option<PathBuf>,
    pub triples_file: Option<PathBuf>,
    pub default_search_field: String,
    /// Hits to print, `-1` for all.
    pub max_hits: i64,
    /// Most hits a ranker collects, whatever the caller asks for.
    pub search_depth: usize,
    pub print_mode: String,
    pub normalize_newlines: bool,
    pub suppress_predicate_loops: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_directory: None,
            triples_file: None,
            default_search_field: DEFAULT_SEARCH_FIELD.to_string(),
            max_hits: DEFAULT_MAX_HITS,
            search_depth: DEFAULT_SEARCH_DEPTH,
            print_mode: "all".to_string(),
            normalize_newlines: false,
            suppress_predicate_loops: true,
        }
    }
}

impl SearchConfig {
    pub fn from_file(file: &ConfigFile) -> Result<Self> {
        let mut config = Self::default();
        config.index_directory = file.path("INDEX_DIRECTORY");
        config.triples_file = file.path("TRIPLES_FILE");
        if let Some(field) = file.get("DEFAULT_SEARCH_FIELD") {
            config.default_search_field = field.to_string();
        }
        if let Some(max_hits) = file.parse_value("MAX_HITS")? {
            config.max_hits = max_hits;
        }
        if let Some(depth) = file.parse_value("SEARCH_DEPTH")? {
            config.search_depth = depth;
        }
        Ok(config)
    }

    pub fn index_directory(&self) -> Result<PathBuf> {
        resolve_index_directory(self.index_directory.as_deref(), self.triples_file.as_deref())
    }

    /// Number of hits to collect, `None` for all.
    pub fn hit_limit(&self) -> Option<usize> {
        usize::try_from(self.max_hits).ok()
    }
}
