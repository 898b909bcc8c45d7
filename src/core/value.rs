//! Classification and normalization of raw triple values.
//!
//! Values arrive in N-Triples surface form: `<uri>`, `"plain"`, `"text"@lang`,
//! bare integers, or anything else. The indexer needs both the kind and a
//! normalized textual form of each value.

use serde::{Deserialize, Serialize};

/// The surface kind of a raw value, decided from its first and last characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Uri,
    PlainString,
    LangText,
    Integer,
    Other,
}

/// A classified and normalized value.
///
/// Text variants keep their surrounding quotes and language suffix, only escape
/// sequences are decoded. URIs lose their angle brackets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Uri(String),
    PlainString(String),
    LangText { text: String, lang: Option<String> },
    Integer { value: i64, text: String },
    Other(String),
}

/// Classifies a raw value.
///
/// - leading digit: [`ValueKind::Integer`]
/// - leading `<`: [`ValueKind::Uri`]
/// - leading and trailing `"`: [`ValueKind::PlainString`]
/// - leading `"` otherwise: [`ValueKind::LangText`]
/// - anything else, including the empty string: [`ValueKind::Other`]
pub fn classify(raw: &str) -> ValueKind {
    match raw.chars().next() {
        Some(c) if c.is_ascii_digit() => ValueKind::Integer,
        Some('<') => ValueKind::Uri,
        Some('"') if raw.ends_with('"') => ValueKind::PlainString,
        Some('"') => ValueKind::LangText,
        _ => ValueKind::Other,
    }
}

/// Strips the angle brackets from `<uri>`. Values that are not bracketed are returned as is.
pub fn normalize_uri(raw: &str) -> &str {
    match raw.strip_prefix('<') {
        Some(inner) => inner.strip_suffix('>').unwrap_or(inner),
        None => raw,
    }
}

/// Returns the language tag of a `"text"@tag` value.
///
/// The tag is whatever follows the last `"@` that starts at least four bytes
/// before the end, so tags are always two characters or more.
pub fn extract_language(value: &str) -> Option<&str> {
    let limit = value.len().checked_sub(4)?;
    let pos = value.rmatch_indices("\"@").map(|(i, _)| i).find(|&i| i <= limit)?;
    Some(&value[pos + 2..])
}

/// Decodes N-Triples escape sequences.
///
/// Unknown or truncated escapes are kept verbatim.
pub fn unescape(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some(marker @ ('u' | 'U')) => {
                let width = if marker == 'u' { 4 } else { 8 };
                let digits: String = chars.clone().take(width).collect();
                let decoded = (digits.len() == width)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => {
                        out.push(ch);
                        for _ in 0..width {
                            chars.next();
                        }
                    }
                    None => {
                        out.push('\\');
                        out.push(marker);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Replaces every run of line breaks with a single space.
pub fn collapse_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_break = false;
    for c in text.chars() {
        if c == '\n' || c == '\r' {
            if !in_break {
                out.push(' ');
            }
            in_break = true;
        } else {
            out.push(c);
            in_break = false;
        }
    }
    out
}

/// Turns raw values into [`Value`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueNormalizer {
    /// Collapse line breaks inside text values into single spaces.
    pub collapse_newlines: bool,
}

impl ValueNormalizer {
    pub fn new(collapse_newlines: bool) -> Self {
        Self { collapse_newlines }
    }

    /// Returns the normalized textual form of a raw value.
    pub fn normalize(&self, raw: &str) -> String {
        match classify(raw) {
            ValueKind::Uri => normalize_uri(raw).to_string(),
            ValueKind::PlainString | ValueKind::LangText => self.normalize_text(raw),
            ValueKind::Integer | ValueKind::Other => raw.to_string(),
        }
    }

    /// Classifies and normalizes a raw value.
    ///
    /// A value that starts with a digit but does not parse as an `i64` becomes [`Value::Other`].
    pub fn parse(&self, raw: &str) -> Value {
        match classify(raw) {
            ValueKind::Uri => Value::Uri(normalize_uri(raw).to_string()),
            ValueKind::PlainString => Value::PlainString(self.normalize_text(raw)),
            ValueKind::LangText => {
                let text = self.normalize_text(raw);
                let lang = extract_language(&text).map(str::to_string);
                Value::LangText { text, lang }
            }
            ValueKind::Integer => match raw.parse::<i64>() {
                Ok(value) => Value::Integer { value, text: raw.to_string() },
                Err(_) => Value::Other(raw.to_string()),
            },
            ValueKind::Other => Value::Other(raw.to_string()),
        }
    }

    fn normalize_text(&self, raw: &str) -> String {
        let text = unescape(raw);
        if self.collapse_newlines {
            collapse_newlines(&text)
        } else {
            text
        }
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Uri(_) => ValueKind::Uri,
            Value::PlainString(_) => ValueKind::PlainString,
            Value::LangText { .. } => ValueKind::LangText,
            Value::Integer { .. } => ValueKind::Integer,
            Value::Other(_) => ValueKind::Other,
        }
    }

    /// The normalized text as it is stored and displayed.
    pub fn as_str(&self) -> &str {
        match self {
            Value::Uri(s) | Value::PlainString(s) | Value::Other(s) => s,
            Value::LangText { text, .. } => text,
            Value::Integer { text, .. } => text,
        }
    }

    pub fn language(&self) -> Option<&str> {
        match self {
            Value::LangText { lang, .. } => lang.as_deref(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Value::Uri(s) | Value::PlainString(s) | Value::Other(s) => s,
            Value::LangText { text, .. } => text,
            Value::Integer { text, .. } => text,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("<f_m.0abc>"), ValueKind::Uri);
        assert_eq!(classify("\"Paris\""), ValueKind::PlainString);
        assert_eq!(classify("\"Paris\"@fr"), ValueKind::LangText);
        assert_eq!(classify("1984"), ValueKind::Integer);
        assert_eq!(classify("true"), ValueKind::Other);
        assert_eq!(classify(""), ValueKind::Other);
        assert_eq!(classify("\""), ValueKind::PlainString);
    }

    #[test]
    fn test_normalize_uri() {
        assert_eq!(normalize_uri("<f_people.person>"), "f_people.person");
        assert_eq!(normalize_uri("f_people.person"), "f_people.person");
        assert_eq!(normalize_uri("<unterminated"), "unterminated");
    }

    #[test]
    fn test_extract_language() {
        assert_eq!(extract_language("\"Berlin\"@de"), Some("de"));
        assert_eq!(extract_language("\"Peking\"@zh-Hant"), Some("zh-Hant"));
        assert_eq!(extract_language("\"say \"@hi\" twice\"@en"), Some("en"));
        assert_eq!(extract_language("\"x\"@e"), None);
        assert_eq!(extract_language("\"no tag\""), None);
        assert_eq!(extract_language("\"@"), None);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r#""a\tb\"c\\d""#), "\"a\tb\"c\\d\"");
        assert_eq!(unescape(r"café"), "café");
        assert_eq!(unescape(r"\U0001F600"), "😀");
        assert_eq!(unescape(r"bad \uZZ escape"), r"bad \uZZ escape");
        assert_eq!(unescape(r"trailing \"), r"trailing \");
        assert_eq!(unescape("plain"), "plain");
    }

    #[test]
    fn test_normalize_keeps_quotes_and_tag() {
        let normalizer = ValueNormalizer::default();
        assert_eq!(normalizer.normalize("\"line\\nbreak\"@en"), "\"line\nbreak\"@en");
        assert_eq!(normalizer.normalize("<f_m.02mjmr>"), "f_m.02mjmr");
        assert_eq!(normalizer.normalize("42"), "42");

        let collapsing = ValueNormalizer::new(true);
        assert_eq!(collapsing.normalize("\"one\\r\\ntwo\"@en"), "\"one two\"@en");
    }

    #[test]
    fn test_parse() {
        let normalizer = ValueNormalizer::default();
        assert_eq!(normalizer.parse("<f_m.1>"), Value::Uri("f_m.1".to_string()));
        assert_eq!(
            normalizer.parse("\"Obama\"@en-GB"),
            Value::LangText { text: "\"Obama\"@en-GB".to_string(), lang: Some("en-GB".to_string()) }
        );
        assert_eq!(normalizer.parse("7").as_i64(), Some(7));
        assert_eq!(normalizer.parse("1984-05-01").kind(), ValueKind::Other);
        assert_eq!(normalizer.parse("1984-05-01").as_str(), "1984-05-01");
    }
}
