//! SQL type names and CAST target specifications

use serde::{Deserialize, Serialize};
use std::fmt;

/// Concrete SQL type names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SqlTypeName {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Decimal,
    Real,
    Float,
    Double,
    Char,
    Varchar,
    Binary,
    Varbinary,
    Date,
    Time,
    Timestamp,
    IntervalYear,
    IntervalYearMonth,
    IntervalMonth,
    IntervalDay,
    IntervalDayHour,
    IntervalDayMinute,
    IntervalDaySecond,
    IntervalHour,
    IntervalMinute,
    IntervalSecond,
    /// Type of the untyped NULL literal
    Null,
    /// Dynamically typed value; passes every family check
    Any,
    /// Flag keyword argument (e.g. a time unit)
    Symbol,
    Array,
    Map,
    Multiset,
    /// Record type of a table, subquery or WITH item
    Row,
    /// CURSOR(query) argument of a table function
    Cursor,
    ColumnList,
}

impl SqlTypeName {
    /// SQL spelling of the type name
    pub const fn sql_name(&self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Decimal => "DECIMAL",
            Self::Real => "REAL",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Char => "CHAR",
            Self::Varchar => "VARCHAR",
            Self::Binary => "BINARY",
            Self::Varbinary => "VARBINARY",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::IntervalYear => "INTERVAL YEAR",
            Self::IntervalYearMonth => "INTERVAL YEAR TO MONTH",
            Self::IntervalMonth => "INTERVAL MONTH",
            Self::IntervalDay => "INTERVAL DAY",
            Self::IntervalDayHour => "INTERVAL DAY TO HOUR",
            Self::IntervalDayMinute => "INTERVAL DAY TO MINUTE",
            Self::IntervalDaySecond => "INTERVAL DAY TO SECOND",
            Self::IntervalHour => "INTERVAL HOUR",
            Self::IntervalMinute => "INTERVAL MINUTE",
            Self::IntervalSecond => "INTERVAL SECOND",
            Self::Null => "NULL",
            Self::Any => "ANY",
            Self::Symbol => "SYMBOL",
            Self::Array => "ARRAY",
            Self::Map => "MAP",
            Self::Multiset => "MULTISET",
            Self::Row => "ROW",
            Self::Cursor => "CURSOR",
            Self::ColumnList => "COLUMN_LIST",
        }
    }

    /// Whether the type accepts a precision argument, e.g. `VARCHAR(20)`
    pub const fn allows_precision(&self) -> bool {
        matches!(
            self,
            Self::Char
                | Self::Varchar
                | Self::Binary
                | Self::Varbinary
                | Self::Decimal
                | Self::Time
                | Self::Timestamp
        )
    }

    /// Whether the type accepts a scale argument, e.g. `DECIMAL(10, 2)`
    pub const fn allows_scale(&self) -> bool {
        matches!(self, Self::Decimal)
    }

    /// Check if this is an interval type
    pub const fn is_interval(&self) -> bool {
        matches!(
            self,
            Self::IntervalYear
                | Self::IntervalYearMonth
                | Self::IntervalMonth
                | Self::IntervalDay
                | Self::IntervalDayHour
                | Self::IntervalDayMinute
                | Self::IntervalDaySecond
                | Self::IntervalHour
                | Self::IntervalMinute
                | Self::IntervalSecond
        )
    }
}

impl fmt::Display for SqlTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// Target of a CAST expression: `CAST(x AS DECIMAL(10, 2))`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataTypeSpec {
    pub type_name: SqlTypeName,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
}

impl DataTypeSpec {
    /// Create a specifier without precision or scale
    pub fn new(type_name: SqlTypeName) -> Self {
        Self {
            type_name,
            precision: None,
            scale: None,
        }
    }

    /// Set the precision
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Set the scale
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = Some(scale);
        self
    }
}

impl fmt::Display for DataTypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.precision, self.scale) {
            (Some(p), Some(s)) => write!(f, "{}({}, {})", self.type_name, p, s),
            (Some(p), None) => write!(f, "{}({})", self.type_name, p),
            _ => write!(f, "{}", self.type_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_spec_display() {
        let spec = DataTypeSpec::new(SqlTypeName::Decimal)
            .with_precision(10)
            .with_scale(2);
        assert_eq!(spec.to_string(), "DECIMAL(10, 2)");
        assert_eq!(
            DataTypeSpec::new(SqlTypeName::IntervalDaySecond).to_string(),
            "INTERVAL DAY TO SECOND"
        );
    }
}
