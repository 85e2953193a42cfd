//! Name matching and resolution results
//!
//! Table lookups report their matches to a [`Resolved`] sink instead of
//! returning them, so a lookup may yield nothing, one match, or several.

use std::fmt;

use super::namespace::NamespaceId;
use super::path::Path;
use super::scope::ScopeId;

/// Comparison of identifiers
pub trait NameMatcher: fmt::Debug + Send + Sync {
    fn is_case_sensitive(&self) -> bool;

    fn matches(&self, expected: &str, actual: &str) -> bool;

    /// Whether two qualified names match component-wise
    fn list_matches(&self, expected: &[String], actual: &[String]) -> bool {
        expected.len() == actual.len()
            && expected.iter().zip(actual).all(|(e, a)| self.matches(e, a))
    }

    /// Whether `prefix` matches the leading components of `names`
    fn is_prefix(&self, prefix: &[String], names: &[String]) -> bool {
        prefix.len() <= names.len() && self.list_matches(prefix, &names[..prefix.len()])
    }
}

/// Matches names exactly
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseSensitiveMatcher;

impl NameMatcher for CaseSensitiveMatcher {
    fn is_case_sensitive(&self) -> bool {
        true
    }

    fn matches(&self, expected: &str, actual: &str) -> bool {
        expected == actual
    }
}

/// Matches names ignoring ASCII case
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseInsensitiveMatcher;

impl NameMatcher for CaseInsensitiveMatcher {
    fn is_case_sensitive(&self) -> bool {
        false
    }

    fn matches(&self, expected: &str, actual: &str) -> bool {
        expected.eq_ignore_ascii_case(actual)
    }
}

/// Matcher for the given case sensitivity
pub fn name_matcher(case_sensitive: bool) -> &'static dyn NameMatcher {
    if case_sensitive {
        &CaseSensitiveMatcher
    } else {
        &CaseInsensitiveMatcher
    }
}

/// One successful table resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolve {
    pub namespace: NamespaceId,
    /// Whether the namespace's rows may be absent (outer join side)
    pub nullable: bool,
    /// Scope in which the match was found
    pub scope: ScopeId,
    pub path: Path,
    /// Name components left over after the match, e.g. a column name
    pub remaining_names: Vec<String>,
}

/// Sink receiving table resolutions
pub trait Resolved {
    fn found(
        &mut self,
        namespace: NamespaceId,
        nullable: bool,
        scope: ScopeId,
        path: Path,
        remaining_names: Vec<String>,
    );

    fn count(&self) -> usize;

    fn clear(&mut self);
}

/// [`Resolved`] sink that keeps every match in order
#[derive(Debug, Clone, Default)]
pub struct ResolvedCollector {
    resolves: Vec<Resolve>,
}

impl ResolvedCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the matches in the order reported
    pub fn resolves(&self) -> &[Resolve] {
        &self.resolves
    }

    /// Get the first match
    pub fn first(&self) -> Option<&Resolve> {
        self.resolves.first()
    }

    /// The match, when there is exactly one
    pub fn only(&self) -> Option<&Resolve> {
        match self.resolves.as_slice() {
            [resolve] => Some(resolve),
            _ => None,
        }
    }

    /// Take the matches
    pub fn into_vec(self) -> Vec<Resolve> {
        self.resolves
    }
}

impl Resolved for ResolvedCollector {
    fn found(
        &mut self,
        namespace: NamespaceId,
        nullable: bool,
        scope: ScopeId,
        path: Path,
        remaining_names: Vec<String>,
    ) {
        self.resolves.push(Resolve {
            namespace,
            nullable,
            scope,
            path,
            remaining_names,
        });
    }

    fn count(&self) -> usize {
        self.resolves.len()
    }

    fn clear(&mut self) {
        self.resolves.clear();
    }
}
