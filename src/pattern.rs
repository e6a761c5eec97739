//! Matching git references against configured branch patterns.
//!
//! Two forms are supported:
//! - exact: `master` matches only `master`
//! - trailing wildcard: `feature/*` matches `feature/` plus at least one
//!   more character
//!
//! A `*` anywhere but the end of a pattern is a literal character. Matching is
//! case-sensitive.

/// A single parsed branch pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RefPattern {
    Exact(String),
    Prefix(String),
}

impl RefPattern {
    /// Parse one pattern entry. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.strip_suffix('*') {
            Some(prefix) if !prefix.contains('*') => Some(RefPattern::Prefix(prefix.to_string())),
            _ => Some(RefPattern::Exact(raw.to_string())),
        }
    }

    pub fn matches(&self, reference: &str) -> bool {
        match self {
            RefPattern::Exact(name) => reference == name,
            RefPattern::Prefix(prefix) => {
                reference.len() > prefix.len() && reference.starts_with(prefix.as_str())
            }
        }
    }
}

impl std::fmt::Display for RefPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefPattern::Exact(name) => f.write_str(name),
            RefPattern::Prefix(prefix) => write!(f, "{prefix}*"),
        }
    }
}

/// Split a stored comma-separated pattern field. Blank entries are dropped.
pub fn parse_pattern_list(list: &str) -> Vec<RefPattern> {
    list.split(',').filter_map(RefPattern::parse).collect()
}

/// Check if a pattern entry matches a reference.
pub fn pattern_matches(pattern: &str, reference: &str) -> bool {
    RefPattern::parse(pattern).is_some_and(|p| p.matches(reference))
}

/// Check if a reference matches any of the given patterns.
///
/// An empty pattern list matches nothing.
pub fn is_ref_pattern_match<P: AsRef<str>>(reference: &str, patterns: &[P]) -> bool {
    patterns.iter().any(|p| pattern_matches(p.as_ref(), reference))
}
