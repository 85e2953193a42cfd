//! Validation errors
//!
//! Every check returns `Result<_, ValidationError>`. Callers probing
//! candidate interpretations (e.g. alternatives of an OR-composed signature)
//! discard operand type errors and pass every other error on; the final
//! verdict is surfaced to the user through [`ValidationError::to_diagnostic`].

use sqlsema_diagnostics::{
    Diagnostic, ErrorCode, SQL0001, SQL0002, SQL0100, SQL0101, SQL0102, SQL0103, SQL0110, SQL0111,
    SQL0112, SQL0120, SQL0121, SQL0122, SQL0400, Span, SqlError,
};
use thiserror::Error;

/// Errors raised while resolving names and checking operand types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An operand's type is outside its family and coercion did not fix it
    #[error("Cannot apply '{operator}' to arguments of type '{actual}'. Supported form(s): {allowed}")]
    SignatureMismatch {
        operator: String,
        actual: String,
        allowed: String,
    },

    /// NULL literal operand while type coercion is disabled
    #[error("Illegal use of 'NULL'")]
    NullIllegal { operator: String, operand: usize },

    #[error("Invalid number of arguments to function '{operator}'. Was expecting {expected} arguments")]
    WrongArgumentCount {
        operator: String,
        expected: String,
        found: usize,
    },

    #[error("No match found for function signature {name}")]
    UnknownFunction { name: String },

    /// Table or WITH item not visible from the referencing scope
    #[error("Object '{name}' not found")]
    ObjectNotFound { name: String },

    #[error("Column '{name}' not found in any table")]
    ColumnNotFound { name: String },

    #[error("Column '{column}' not found in table '{table}'")]
    ColumnNotFoundInTable { column: String, table: String },

    #[error("Column '{name}' is ambiguous")]
    AmbiguousColumn { name: String },

    #[error("Recursive WITH item '{name}' must be a set operation whose first input does not reference '{name}'")]
    RecursiveWithoutAnchor { name: String },

    #[error("Number of columns must match number of query columns in WITH item '{name}': declared {declared}, query has {actual}")]
    ColumnCountMismatch {
        name: String,
        declared: usize,
        actual: usize,
    },

    #[error("Column count mismatch in {operation}")]
    SetOperandMismatch { operation: String },

    #[error("{kind} node {node} is not a query")]
    NotAQuery { node: String, kind: &'static str },

    #[error("{kind} node {node} is not an expression")]
    NotAnExpression { node: String, kind: &'static str },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ValidationError {
    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the diagnostic code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::SignatureMismatch { .. } => SQL0110,
            Self::NullIllegal { .. } => SQL0112,
            Self::WrongArgumentCount { .. } => SQL0111,
            Self::UnknownFunction { .. } => SQL0101,
            Self::ObjectNotFound { .. } => SQL0100,
            Self::ColumnNotFound { .. } | Self::ColumnNotFoundInTable { .. } => SQL0102,
            Self::AmbiguousColumn { .. } => SQL0103,
            Self::RecursiveWithoutAnchor { .. } => SQL0120,
            Self::ColumnCountMismatch { .. } => SQL0121,
            Self::SetOperandMismatch { .. } => SQL0122,
            Self::NotAQuery { .. } => SQL0001,
            Self::NotAnExpression { .. } => SQL0002,
            Self::Internal(_) => SQL0400,
        }
    }

    /// Whether this is a signature or NULL-usage failure of a call
    pub fn is_operand_type_error(&self) -> bool {
        matches!(
            self,
            Self::SignatureMismatch { .. } | Self::NullIllegal { .. }
        )
    }

    /// Convert to the host-facing error
    pub fn to_sql_error(&self) -> SqlError {
        match self {
            Self::Internal(_) => SqlError::internal(self.code(), self.to_string()),
            _ => SqlError::semantic(self.code(), self.to_string()),
        }
    }

    /// Diagnostic positioned at `span` of `sql`
    pub fn to_diagnostic(&self, span: Option<Span>, sql: &str) -> Diagnostic {
        let diag = self.to_sql_error().to_diagnostic();
        match span {
            Some(span) => diag.with_span(span, sql),
            None => diag,
        }
    }
}

/// Result of validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;
