//! SQL syntax tree for semantic analysis
//!
//! The tree is stored in an [`Ast`] arena and nodes refer to each other by
//! [`NodeId`]. The validator rewrites calls in place (for example to insert
//! an implicit CAST) by replacing the child id stored in the parent node.

mod arena;
mod literal;
mod node;
mod types;

pub use arena::*;
pub use literal::*;
pub use node::*;
pub use types::*;

use smallvec::SmallVec;
use std::fmt;

pub use sqlsema_diagnostics::{Span, Spanned};

/// A possibly qualified identifier (`emp`, `hr.emp`, `e.deptno`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    /// Name parts, outermost qualifier first
    pub names: SmallVec<[String; 2]>,
}

impl Identifier {
    /// Create a single-part identifier
    pub fn simple(name: impl Into<String>) -> Self {
        let mut names = SmallVec::new();
        names.push(name.into());
        Self { names }
    }

    /// Create a compound identifier from its parts
    pub fn compound<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if the identifier has a single part
    pub fn is_simple(&self) -> bool {
        self.names.len() == 1
    }

    /// The single name of a one-part identifier
    pub fn get_simple(&self) -> Option<&str> {
        match self.names.as_slice() {
            [name] => Some(name.as_str()),
            _ => None,
        }
    }

    /// Get the name parts
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self::simple(s)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names.join("."))
    }
}
