//! Resolution paths
//!
//! A [`Path`] records how a name was resolved: one [`Step`] per matched
//! component, each carrying the row type it was found in.

use smallvec::SmallVec;
use std::fmt;

use crate::type_system::SqlType;

/// One matched name component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub row_type: SqlType,
    pub ordinal: usize,
    pub name: String,
}

/// Sequence of steps from a scope to a resolved namespace or field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    steps: SmallVec<[Step; 4]>,
}

impl Path {
    /// Path with no steps
    pub fn empty() -> Self {
        Self::default()
    }

    /// New path extending this one by a step
    pub fn plus(&self, row_type: SqlType, ordinal: usize, name: impl Into<String>) -> Self {
        let mut steps = self.steps.clone();
        steps.push(Step {
            row_type,
            ordinal,
            name: name.into(),
        });
        Self { steps }
    }

    /// Get the steps from the outermost match
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Get the number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if nothing has been matched
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Get the innermost step
    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// Get the matched names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.name.as_str())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.names().collect();
        write!(f, "{}", names.join("."))
    }
}
