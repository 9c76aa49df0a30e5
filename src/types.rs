//! Source type token to Python type mapping.

use log::debug;

/// Fixed lookup table with a string fallback for unknown tokens. Owned by the
/// caller rather than living in module state so tests can build alternates.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeMap {
    entries: Vec<(String, String)>,
    fallback: String,
}

impl Default for TypeMap {
    fn default() -> Self {
        let entries = [
            ("int", "int"),
            ("string", "str"),
            ("text", "str"),
            ("bigint", "int"),
            ("decimal", "float"),
            ("float", "float"),
            ("boolean", "bool"),
            ("datetime", "datetime.datetime"),
            ("date", "datetime.date"),
            ("time", "datetime.time"),
        ];
        Self {
            entries: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            fallback: "str".to_string(),
        }
    }
}

impl TypeMap {
    pub fn new(entries: Vec<(String, String)>, fallback: String) -> Self {
        Self { entries, fallback }
    }

    /// Map a source type token to its Python type. Size suffixes like
    /// `varchar(255)` are stripped before lookup; unknown tokens fall back to
    /// the string type.
    pub fn lookup(&self, token: &str) -> &str {
        let base = token
            .split('(')
            .next()
            .unwrap_or(token)
            .trim()
            .to_ascii_lowercase();
        match self.entries.iter().find(|(k, _)| *k == base) {
            Some((_, v)) => v,
            None => {
                debug!("unknown type token {token}, falling back to {}", self.fallback);
                &self.fallback
            }
        }
    }

    /// The last path segment of the mapped type, for contexts that cannot
    /// carry a qualified name (diagram attribute lists, doc tables).
    pub fn lookup_short(&self, token: &str) -> &str {
        let full = self.lookup(token);
        full.rsplit('.').next().unwrap_or(full)
    }

    /// Whether any of the given tokens maps into the `datetime` module.
    pub fn needs_datetime_import<'a>(&self, tokens: impl IntoIterator<Item = &'a str>) -> bool {
        tokens
            .into_iter()
            .any(|t| self.lookup(t).starts_with("datetime."))
    }
}
