//! Named operand type checkers for common operator signatures

use std::sync::Arc;

use super::{CompositeOperandTypeChecker, FamilyOperandTypeChecker, OperandTypeChecker};
use crate::family::SqlTypeFamily;

/// Checker requiring one operand per family
pub fn family(families: impl IntoIterator<Item = SqlTypeFamily>) -> FamilyOperandTypeChecker {
    FamilyOperandTypeChecker::new(families)
}

/// Checker whose operands at positions where `optional` holds may be
/// omitted
pub fn family_with_optional(
    families: impl IntoIterator<Item = SqlTypeFamily>,
    optional: impl Fn(usize) -> bool + Send + Sync + 'static,
) -> FamilyOperandTypeChecker {
    FamilyOperandTypeChecker::with_optional(families, optional)
}

/// Disjunction of `alternatives`
pub fn or(
    alternatives: impl IntoIterator<Item = Arc<dyn OperandTypeChecker>>,
) -> CompositeOperandTypeChecker {
    CompositeOperandTypeChecker::or(alternatives)
}

/// One operand of any type but CURSOR
pub fn any() -> FamilyOperandTypeChecker {
    family([SqlTypeFamily::Any])
}

/// One BOOLEAN operand
pub fn boolean() -> FamilyOperandTypeChecker {
    family([SqlTypeFamily::Boolean])
}

/// One numeric operand
pub fn numeric() -> FamilyOperandTypeChecker {
    family([SqlTypeFamily::Numeric])
}

/// One integer operand
pub fn integer() -> FamilyOperandTypeChecker {
    family([SqlTypeFamily::Integer])
}

/// Two numeric operands
pub fn numeric_numeric() -> FamilyOperandTypeChecker {
    family([SqlTypeFamily::Numeric, SqlTypeFamily::Numeric])
}

/// Two exact numeric operands
pub fn exact_numeric_exact_numeric() -> FamilyOperandTypeChecker {
    family([SqlTypeFamily::ExactNumeric, SqlTypeFamily::ExactNumeric])
}

/// One character or binary string
pub fn string() -> FamilyOperandTypeChecker {
    family([SqlTypeFamily::String])
}

/// One character string
pub fn character() -> FamilyOperandTypeChecker {
    family([SqlTypeFamily::Character])
}

/// Two strings
pub fn string_string() -> FamilyOperandTypeChecker {
    family([SqlTypeFamily::String, SqlTypeFamily::String])
}

/// `(STRING, INTEGER)`, as taken by LEFT and RIGHT
pub fn string_integer() -> FamilyOperandTypeChecker {
    family([SqlTypeFamily::String, SqlTypeFamily::Integer])
}

/// `(STRING, NUMERIC [, STRING])`, as taken by the padding functions
pub fn string_numeric_optional_string() -> FamilyOperandTypeChecker {
    family_with_optional(
        [SqlTypeFamily::String, SqlTypeFamily::Numeric, SqlTypeFamily::String],
        |i| i == 2,
    )
}

/// `(STRING, INTEGER [, INTEGER])`, as taken by SUBSTR
pub fn string_integer_optional_integer() -> FamilyOperandTypeChecker {
    family_with_optional(
        [SqlTypeFamily::String, SqlTypeFamily::Integer, SqlTypeFamily::Integer],
        |i| i == 2,
    )
}

/// One DATE operand
pub fn date() -> FamilyOperandTypeChecker {
    family([SqlTypeFamily::Date])
}

/// One DATE, TIME or TIMESTAMP operand
pub fn datetime() -> FamilyOperandTypeChecker {
    family([SqlTypeFamily::Datetime])
}

/// One TIMESTAMP operand
pub fn timestamp() -> FamilyOperandTypeChecker {
    family([SqlTypeFamily::Timestamp])
}

/// `(STRING [, STRING])`, as taken by the trim functions
pub fn string_optional_string() -> CompositeOperandTypeChecker {
    or([
        Arc::new(string()) as Arc<dyn OperandTypeChecker>,
        Arc::new(string_string()),
    ])
}

/// `(unit, DATE)` or `(unit, TIMESTAMP)`, the unit being a keyword
pub fn unit_date_or_timestamp() -> CompositeOperandTypeChecker {
    or([
        Arc::new(family([SqlTypeFamily::Ignore, SqlTypeFamily::Date]))
            as Arc<dyn OperandTypeChecker>,
        Arc::new(family([SqlTypeFamily::Ignore, SqlTypeFamily::Timestamp])),
    ])
}
