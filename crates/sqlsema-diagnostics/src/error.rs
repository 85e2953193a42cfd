//! Error and diagnostic types surfaced to the host

use crate::{ErrorCode, SourceLocation, Span};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A user-facing diagnostic with code, message and optional location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub message: String,
    pub location: Option<SourceLocation>,
    /// Additional context or help
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            location: None,
            help: None,
        }
    }

    /// Attach a resolved source location
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Attach a location computed from a span of `sql`
    pub fn with_span(mut self, span: Span, sql: &str) -> Self {
        self.location = Some(SourceLocation::from_span(span, sql));
        self
    }

    /// Attach help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {} - {}", self.code, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " at {}", loc)?;
        }
        Ok(())
    }
}

/// Error returned to hosts of the validator
#[derive(Debug, Clone, Error)]
pub enum SqlError {
    /// Name resolution or type checking failure
    #[error("{code}: {message}")]
    Semantic {
        code: ErrorCode,
        message: String,
        location: Option<SourceLocation>,
        context: Option<String>,
    },

    /// A validator invariant does not hold
    #[error("{code}: {message}")]
    Internal { code: ErrorCode, message: String },
}

impl SqlError {
    /// Create a semantic error without location
    pub fn semantic(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Semantic {
            code,
            message: message.into(),
            location: None,
            context: None,
        }
    }

    /// Create an internal error
    pub fn internal(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Internal {
            code,
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Semantic { code, .. } | Self::Internal { code, .. } => *code,
        }
    }

    /// Convert to a diagnostic, falling back to the code's help text
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::Semantic {
                code,
                message,
                location,
                context,
            } => {
                let mut diag = Diagnostic::error(*code, message.clone());
                if let Some(loc) = location {
                    diag = diag.with_location(loc.clone());
                }
                if let Some(ctx) = context {
                    diag = diag.with_help(ctx.clone());
                } else if let Some(help) = code.info().help {
                    diag = diag.with_help(help);
                }
                diag
            }
            Self::Internal { code, message } => Diagnostic::error(*code, message.clone()),
        }
    }
}
