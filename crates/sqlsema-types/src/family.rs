//! Type families
//!
//! A family is a set of concrete type names that are interchangeable for
//! signature matching. Operand type checkers declare one family per formal
//! operand position.

use serde::{Deserialize, Serialize};
use sqlsema_ast::SqlTypeName;
use std::fmt;

use sqlsema_ast::SqlTypeName as T;

const CHARACTER: &[SqlTypeName] = &[T::Char, T::Varchar];
const BINARY: &[SqlTypeName] = &[T::Binary, T::Varbinary];
const STRING: &[SqlTypeName] = &[T::Char, T::Varchar, T::Binary, T::Varbinary];
const INTEGER: &[SqlTypeName] = &[T::TinyInt, T::SmallInt, T::Integer, T::BigInt];
const EXACT_NUMERIC: &[SqlTypeName] = &[T::TinyInt, T::SmallInt, T::Integer, T::BigInt, T::Decimal];
const APPROXIMATE_NUMERIC: &[SqlTypeName] = &[T::Real, T::Float, T::Double];
const NUMERIC: &[SqlTypeName] = &[
    T::TinyInt,
    T::SmallInt,
    T::Integer,
    T::BigInt,
    T::Decimal,
    T::Real,
    T::Float,
    T::Double,
];
const DATETIME: &[SqlTypeName] = &[T::Date, T::Time, T::Timestamp];
const INTERVAL_YEAR_MONTH: &[SqlTypeName] =
    &[T::IntervalYear, T::IntervalYearMonth, T::IntervalMonth];
const INTERVAL_DAY_TIME: &[SqlTypeName] = &[
    T::IntervalDay,
    T::IntervalDayHour,
    T::IntervalDayMinute,
    T::IntervalDaySecond,
    T::IntervalHour,
    T::IntervalMinute,
    T::IntervalSecond,
];
const DATETIME_INTERVAL: &[SqlTypeName] = &[
    T::IntervalYear,
    T::IntervalYearMonth,
    T::IntervalMonth,
    T::IntervalDay,
    T::IntervalDayHour,
    T::IntervalDayMinute,
    T::IntervalDaySecond,
    T::IntervalHour,
    T::IntervalMinute,
    T::IntervalSecond,
];
const ALL: &[SqlTypeName] = &[
    T::Boolean,
    T::TinyInt,
    T::SmallInt,
    T::Integer,
    T::BigInt,
    T::Decimal,
    T::Real,
    T::Float,
    T::Double,
    T::Char,
    T::Varchar,
    T::Binary,
    T::Varbinary,
    T::Date,
    T::Time,
    T::Timestamp,
    T::IntervalYear,
    T::IntervalYearMonth,
    T::IntervalMonth,
    T::IntervalDay,
    T::IntervalDayHour,
    T::IntervalDayMinute,
    T::IntervalDaySecond,
    T::IntervalHour,
    T::IntervalMinute,
    T::IntervalSecond,
    T::Null,
    T::Any,
    T::Symbol,
    T::Array,
    T::Map,
    T::Multiset,
    T::Row,
    T::Cursor,
    T::ColumnList,
];

/// Semantic family of concrete types accepted at one operand position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SqlTypeFamily {
    Character,
    Binary,
    Numeric,
    ExactNumeric,
    ApproximateNumeric,
    Integer,
    Decimal,
    Date,
    Time,
    Timestamp,
    Datetime,
    Boolean,
    IntervalYearMonth,
    IntervalDayTime,
    DatetimeInterval,
    /// Character or binary strings
    String,
    Array,
    Map,
    Multiset,
    Null,
    Cursor,
    ColumnList,
    /// Everything except CURSOR
    Any,
    /// Not checked here; legality is decided elsewhere
    Ignore,
}

impl SqlTypeFamily {
    /// The family a concrete type name belongs to
    ///
    /// Type names such as SYMBOL and ROW belong to no family.
    pub const fn of(type_name: SqlTypeName) -> Option<Self> {
        Some(match type_name {
            T::Boolean => Self::Boolean,
            T::TinyInt
            | T::SmallInt
            | T::Integer
            | T::BigInt
            | T::Decimal
            | T::Real
            | T::Float
            | T::Double => Self::Numeric,
            T::Char | T::Varchar => Self::Character,
            T::Binary | T::Varbinary => Self::Binary,
            T::Date => Self::Date,
            T::Time => Self::Time,
            T::Timestamp => Self::Timestamp,
            T::IntervalYear | T::IntervalYearMonth | T::IntervalMonth => Self::IntervalYearMonth,
            T::IntervalDay
            | T::IntervalDayHour
            | T::IntervalDayMinute
            | T::IntervalDaySecond
            | T::IntervalHour
            | T::IntervalMinute
            | T::IntervalSecond => Self::IntervalDayTime,
            T::Null => Self::Null,
            T::Any => Self::Any,
            T::Array => Self::Array,
            T::Map => Self::Map,
            T::Multiset => Self::Multiset,
            T::Cursor => Self::Cursor,
            T::ColumnList => Self::ColumnList,
            T::Symbol | T::Row => return None,
        })
    }

    /// The static set of type names this family accepts
    pub const fn type_names(&self) -> &'static [SqlTypeName] {
        match self {
            Self::Character => CHARACTER,
            Self::Binary => BINARY,
            Self::Numeric => NUMERIC,
            Self::ExactNumeric => EXACT_NUMERIC,
            Self::ApproximateNumeric => APPROXIMATE_NUMERIC,
            Self::Integer => INTEGER,
            Self::Decimal => &[T::Decimal],
            Self::Date => &[T::Date],
            Self::Time => &[T::Time],
            Self::Timestamp => &[T::Timestamp],
            Self::Datetime => DATETIME,
            Self::Boolean => &[T::Boolean],
            Self::IntervalYearMonth => INTERVAL_YEAR_MONTH,
            Self::IntervalDayTime => INTERVAL_DAY_TIME,
            Self::DatetimeInterval => DATETIME_INTERVAL,
            Self::String => STRING,
            Self::Array => &[T::Array],
            Self::Map => &[T::Map],
            Self::Multiset => &[T::Multiset],
            Self::Null => &[T::Null],
            Self::Cursor => &[T::Cursor],
            Self::ColumnList => &[T::ColumnList],
            Self::Any => ALL,
            Self::Ignore => &[],
        }
    }

    /// Whether `type_name` is in this family's accepted set
    pub fn contains(&self, type_name: SqlTypeName) -> bool {
        self.type_names().contains(&type_name)
    }

    /// Concrete type an implicit cast into this family targets
    pub const fn default_type_name(&self) -> Option<SqlTypeName> {
        match self {
            Self::Character | Self::String => Some(T::Varchar),
            Self::Binary => Some(T::Varbinary),
            Self::Numeric | Self::ExactNumeric | Self::Decimal => Some(T::Decimal),
            Self::ApproximateNumeric => Some(T::Double),
            Self::Integer => Some(T::BigInt),
            Self::Date => Some(T::Date),
            Self::Time => Some(T::Time),
            Self::Timestamp | Self::Datetime => Some(T::Timestamp),
            Self::Boolean => Some(T::Boolean),
            Self::IntervalYearMonth | Self::DatetimeInterval => Some(T::IntervalYearMonth),
            Self::IntervalDayTime => Some(T::IntervalDaySecond),
            Self::Array
            | Self::Map
            | Self::Multiset
            | Self::Null
            | Self::Cursor
            | Self::ColumnList
            | Self::Any
            | Self::Ignore => None,
        }
    }

    /// Get the name shown in signatures
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Character => "CHARACTER",
            Self::Binary => "BINARY",
            Self::Numeric => "NUMERIC",
            Self::ExactNumeric => "EXACT_NUMERIC",
            Self::ApproximateNumeric => "APPROXIMATE_NUMERIC",
            Self::Integer => "INTEGER",
            Self::Decimal => "DECIMAL",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Datetime => "DATETIME",
            Self::Boolean => "BOOLEAN",
            Self::IntervalYearMonth => "INTERVAL_YEAR_MONTH",
            Self::IntervalDayTime => "INTERVAL_DAY_TIME",
            Self::DatetimeInterval => "DATETIME_INTERVAL",
            Self::String => "STRING",
            Self::Array => "ARRAY",
            Self::Map => "MAP",
            Self::Multiset => "MULTISET",
            Self::Null => "NULL",
            Self::Cursor => "CURSOR",
            Self::ColumnList => "COLUMN_LIST",
            Self::Any => "ANY",
            Self::Ignore => "IGNORE",
        }
    }
}

impl fmt::Display for SqlTypeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SqlTypeFamily::Numeric, T::Integer, true)]
    #[case(SqlTypeFamily::Numeric, T::Double, true)]
    #[case(SqlTypeFamily::Numeric, T::Varchar, false)]
    #[case(SqlTypeFamily::Integer, T::Decimal, false)]
    #[case(SqlTypeFamily::ExactNumeric, T::Decimal, true)]
    #[case(SqlTypeFamily::String, T::Varbinary, true)]
    #[case(SqlTypeFamily::Character, T::Varbinary, false)]
    #[case(SqlTypeFamily::Datetime, T::Time, true)]
    #[case(SqlTypeFamily::DatetimeInterval, T::IntervalMonth, true)]
    #[case(SqlTypeFamily::IntervalDayTime, T::IntervalMonth, false)]
    #[case(SqlTypeFamily::Ignore, T::Integer, false)]
    fn test_family_membership(
        #[case] family: SqlTypeFamily,
        #[case] type_name: SqlTypeName,
        #[case] expected: bool,
    ) {
        assert_eq!(family.contains(type_name), expected);
    }

    #[test]
    fn test_own_family_is_member() {
        for &name in ALL {
            if let Some(family) = SqlTypeFamily::of(name) {
                assert!(family.contains(name), "{name} not in its own family {family}");
            }
        }
    }

    #[test]
    fn test_special_type_families() {
        assert_eq!(SqlTypeFamily::of(T::Any), Some(SqlTypeFamily::Any));
        assert_eq!(SqlTypeFamily::of(T::Cursor), Some(SqlTypeFamily::Cursor));
        assert_eq!(SqlTypeFamily::of(T::Row), None);
    }

    #[test]
    fn test_default_type_is_member() {
        for family in [
            SqlTypeFamily::Character,
            SqlTypeFamily::Numeric,
            SqlTypeFamily::Integer,
            SqlTypeFamily::Datetime,
            SqlTypeFamily::IntervalDayTime,
            SqlTypeFamily::String,
        ] {
            let default = family.default_type_name().unwrap();
            assert!(family.contains(default));
        }
        assert_eq!(SqlTypeFamily::Any.default_type_name(), None);
    }
}
