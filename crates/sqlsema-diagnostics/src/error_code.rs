//! Structured error codes for the validator
//!
//! Error code ranges:
//! - SQL0001-SQL0099: AST shape errors (malformed input handed to the validator)
//! - SQL0100-SQL0199: Semantic errors (resolution, type checking)
//! - SQL0400-SQL0499: Internal errors (broken invariants)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create an error code from its number
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Static description for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if the code is in the AST shape range
    pub const fn is_shape_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if the code is in the semantic range
    pub const fn is_semantic_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if the code is in the internal range
    pub const fn is_internal_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SQL{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    pub description: &'static str,
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    map.insert(1, ErrorInfo::new("Node is not a query"));
    map.insert(2, ErrorInfo::new("Node is not an expression"));

    map.insert(
        100,
        ErrorInfo::new("Object not found")
            .with_help("Check that the table or WITH item is visible from this query block"),
    );
    map.insert(101, ErrorInfo::new("Unknown function"));
    map.insert(102, ErrorInfo::new("Column not found"));
    map.insert(103, ErrorInfo::new("Ambiguous column reference"));
    map.insert(
        110,
        ErrorInfo::new("Cannot apply operator to arguments")
            .with_help("Cast the arguments explicitly to one of the supported forms"),
    );
    map.insert(111, ErrorInfo::new("Invalid number of arguments"));
    map.insert(
        112,
        ErrorInfo::new("Illegal use of NULL")
            .with_help("Enable type coercion or CAST the NULL literal to the expected type"),
    );
    map.insert(120, ErrorInfo::new("Recursive WITH item has no anchor"));
    map.insert(121, ErrorInfo::new("Column count mismatch in WITH item"));
    map.insert(122, ErrorInfo::new("Set operation inputs differ in column count"));

    map.insert(400, ErrorInfo::new("Internal error"));

    map
});

pub const SQL0001: ErrorCode = ErrorCode::new(1);
pub const SQL0002: ErrorCode = ErrorCode::new(2);

pub const SQL0100: ErrorCode = ErrorCode::new(100);
pub const SQL0101: ErrorCode = ErrorCode::new(101);
pub const SQL0102: ErrorCode = ErrorCode::new(102);
pub const SQL0103: ErrorCode = ErrorCode::new(103);
pub const SQL0110: ErrorCode = ErrorCode::new(110);
pub const SQL0111: ErrorCode = ErrorCode::new(111);
pub const SQL0112: ErrorCode = ErrorCode::new(112);
pub const SQL0120: ErrorCode = ErrorCode::new(120);
pub const SQL0121: ErrorCode = ErrorCode::new(121);
pub const SQL0122: ErrorCode = ErrorCode::new(122);

pub const SQL0400: ErrorCode = ErrorCode::new(400);
