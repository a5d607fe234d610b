use std::rc::Rc;

/// Cache key: an ordered sequence of string parts.
///
/// Two keys are equal iff their parts are equal; the canonical string form
/// (a JSON array) exists for logging and stable external identity. Prefix
/// matching is element-wise on the parts — never a raw `starts_with` on the
/// canonical string, which would fail on the closing bracket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    parts: Vec<String>,
}

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Canonical string identity of the key.
    pub fn canonical(&self) -> String {
        serde_json::to_string(&self.parts).unwrap_or_default()
    }

    pub fn starts_with(&self, prefix: &[String]) -> bool {
        self.parts.starts_with(prefix)
    }
}

/// Matcher for [`QueryClient::invalidate`](super::QueryClient::invalidate).
#[derive(Clone)]
pub enum KeyMatcher {
    /// Exact key match.
    Exact(QueryKey),
    /// Element-wise prefix match on the key parts.
    Prefix(Vec<String>),
    /// Arbitrary predicate over the key.
    Predicate(Rc<dyn Fn(&QueryKey) -> bool>),
}

impl KeyMatcher {
    pub fn exact<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeyMatcher::Exact(QueryKey::new(parts))
    }

    pub fn prefix<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeyMatcher::Prefix(parts.into_iter().map(Into::into).collect())
    }

    pub fn predicate(f: impl Fn(&QueryKey) -> bool + 'static) -> Self {
        KeyMatcher::Predicate(Rc::new(f))
    }

    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            KeyMatcher::Exact(exact) => key == exact,
            KeyMatcher::Prefix(prefix) => key.starts_with(prefix),
            KeyMatcher::Predicate(pred) => pred(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_is_idempotent() {
        let a = QueryKey::new(["a", "b"]);
        let b = QueryKey::new(["a", "b"]);
        assert_eq!(a, b);
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn different_parts_differ() {
        let a = QueryKey::new(["a", "b"]);
        let c = QueryKey::new(["a", "c"]);
        assert_ne!(a, c);
        assert_ne!(a.canonical(), c.canonical());
    }

    #[test]
    fn prefix_matches_elementwise() {
        let key = QueryKey::new(["smeta-details", "2025-11", "leto"]);
        assert!(KeyMatcher::prefix(["smeta-details"]).matches(&key));
        assert!(KeyMatcher::prefix(["smeta-details", "2025-11"]).matches(&key));
        assert!(!KeyMatcher::prefix(["smeta-details", "2025-12"]).matches(&key));
        // a prefix is about whole parts, not substrings
        assert!(!KeyMatcher::prefix(["smeta"]).matches(&key));
    }

    #[test]
    fn exact_and_predicate_matchers() {
        let key = QueryKey::new(["daily", "2025-11-05"]);
        assert!(KeyMatcher::exact(["daily", "2025-11-05"]).matches(&key));
        assert!(!KeyMatcher::exact(["daily"]).matches(&key));
        assert!(KeyMatcher::predicate(|k| k.parts()[0] == "daily").matches(&key));
    }
}
