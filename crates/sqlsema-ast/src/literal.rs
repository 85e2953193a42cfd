//! Literal AST nodes

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A literal value in a SQL statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Untyped NULL
    Null,
    Boolean(bool),
    /// Exact integer literal (`42`)
    Integer(i64),
    /// Exact decimal literal (`3.14`)
    Decimal(Decimal),
    /// Approximate literal (`1.5e3`)
    Double(f64),
    /// Character string literal (`'abc'`)
    String(String),
    /// Binary string literal (`X'0AFF'`)
    Binary(Vec<u8>),
    /// `DATE '2024-01-31'`
    Date(NaiveDate),
    /// `TIME '12:30:00'`
    Time(NaiveTime),
    /// `TIMESTAMP '2024-01-31 12:30:00'`
    Timestamp(NaiveDateTime),
}

impl Literal {
    /// Check if this is the NULL literal
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Create a character string literal
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Double(d) => write!(f, "{d:E}"),
            Self::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Binary(bytes) => {
                write!(f, "X'")?;
                for b in bytes {
                    write!(f, "{b:02X}")?;
                }
                write!(f, "'")
            }
            Self::Date(d) => write!(f, "DATE '{}'", d.format("%Y-%m-%d")),
            Self::Time(t) => write!(f, "TIME '{}'", t.format("%H:%M:%S")),
            Self::Timestamp(ts) => write!(f, "TIMESTAMP '{}'", ts.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}
