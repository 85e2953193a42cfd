//! Implicit type coercion
//!
//! When a call fails its first family check, the operand type checker asks
//! the [`TypeCoercion`] engine to rewrite the call so that it becomes legal.
//! [`ImplicitCastCoercion`] does this by wrapping mismatched operands in
//! CAST nodes targeting a concrete type of the required family.

use log::{debug, trace};
use sqlsema_ast::SqlTypeName;
use std::fmt;

use crate::binding::CallBinding;
use crate::error::ValidationResult;
use crate::family::SqlTypeFamily;
use crate::type_system::SqlType;

/// Coercion engine consumed by operand type checkers
pub trait TypeCoercion: fmt::Debug + Send + Sync {
    /// Rewrite the operands of `binding` in place so that each operand
    /// `i` belongs to `families[i]`
    ///
    /// `operand_types` are the operand types derived before any rewrite.
    /// Returns whether at least one operand was rewritten.
    fn builtin_function_coercion(
        &self,
        binding: &mut dyn CallBinding,
        operand_types: &[SqlType],
        families: &[SqlTypeFamily],
    ) -> ValidationResult<bool>;
}

/// Coercion by implicit CAST insertion
///
/// Implicit conversions:
/// - NULL to the family's default type
/// - CHARACTER to NUMERIC, datetime, BOOLEAN and BINARY families
/// - NUMERIC, BOOLEAN, datetime and interval types to CHARACTER/STRING
/// - NUMERIC to any other numeric family (widening or narrowing)
/// - DATE to TIMESTAMP and TIMESTAMP to DATE
#[derive(Debug, Clone, Default)]
pub struct ImplicitCastCoercion;

impl ImplicitCastCoercion {
    /// Create the engine with the standard implicit cast table
    pub fn new() -> Self {
        Self
    }

    /// Target type for implicitly converting `from` into `family`
    ///
    /// Returns `None` when no cast is needed or none is allowed. The
    /// target keeps the nullability of `from`.
    pub fn implicit_cast(&self, from: &SqlType, family: SqlTypeFamily) -> Option<SqlType> {
        if family.contains(from.type_name) {
            return None;
        }
        let target = family.default_type_name()?;
        if from.is_null_type() {
            return Some(SqlType::nullable(target));
        }

        let allowed = match (SqlTypeFamily::of(from.type_name)?, family) {
            (
                SqlTypeFamily::Character,
                SqlTypeFamily::Numeric
                | SqlTypeFamily::ExactNumeric
                | SqlTypeFamily::ApproximateNumeric
                | SqlTypeFamily::Integer
                | SqlTypeFamily::Decimal
                | SqlTypeFamily::Date
                | SqlTypeFamily::Time
                | SqlTypeFamily::Timestamp
                | SqlTypeFamily::Datetime
                | SqlTypeFamily::Boolean
                | SqlTypeFamily::Binary,
            ) => true,

            (
                SqlTypeFamily::Numeric
                | SqlTypeFamily::Boolean
                | SqlTypeFamily::Date
                | SqlTypeFamily::Time
                | SqlTypeFamily::Timestamp
                | SqlTypeFamily::IntervalYearMonth
                | SqlTypeFamily::IntervalDayTime,
                SqlTypeFamily::Character | SqlTypeFamily::String,
            ) => true,

            (
                SqlTypeFamily::Numeric,
                SqlTypeFamily::ExactNumeric
                | SqlTypeFamily::ApproximateNumeric
                | SqlTypeFamily::Integer
                | SqlTypeFamily::Decimal,
            ) => true,

            (SqlTypeFamily::Date, SqlTypeFamily::Timestamp)
            | (SqlTypeFamily::Timestamp, SqlTypeFamily::Date) => true,

            _ => false,
        };

        allowed.then(|| Self::concrete(target).with_nullable(from.nullable))
    }

    fn concrete(type_name: SqlTypeName) -> SqlType {
        match type_name {
            SqlTypeName::Decimal => SqlType::new(type_name).with_precision(19).with_scale(0),
            _ => SqlType::new(type_name),
        }
    }
}

impl TypeCoercion for ImplicitCastCoercion {
    fn builtin_function_coercion(
        &self,
        binding: &mut dyn CallBinding,
        operand_types: &[SqlType],
        families: &[SqlTypeFamily],
    ) -> ValidationResult<bool> {
        let mut coerced = false;
        for (i, (from, family)) in operand_types.iter().zip(families).enumerate() {
            if binding.is_default(i) {
                continue;
            }
            match self.implicit_cast(from, *family) {
                Some(target) => {
                    debug!(
                        "coercing operand {} of {} from {} to {}",
                        i,
                        binding.operator_name(),
                        from,
                        target
                    );
                    coerced = binding.cast_operand(i, &target)? || coerced;
                }
                None => trace!("operand {} ({}) needs no cast to {}", i, from, family),
            }
        }
        Ok(coerced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SqlTypeName::Varchar, SqlTypeFamily::Numeric, Some(SqlTypeName::Decimal))]
    #[case(SqlTypeName::Char, SqlTypeFamily::Date, Some(SqlTypeName::Date))]
    #[case(SqlTypeName::Integer, SqlTypeFamily::String, Some(SqlTypeName::Varchar))]
    #[case(SqlTypeName::Date, SqlTypeFamily::Character, Some(SqlTypeName::Varchar))]
    #[case(SqlTypeName::Double, SqlTypeFamily::Integer, Some(SqlTypeName::BigInt))]
    #[case(SqlTypeName::Date, SqlTypeFamily::Timestamp, Some(SqlTypeName::Timestamp))]
    #[case(SqlTypeName::Boolean, SqlTypeFamily::Numeric, None)]
    #[case(SqlTypeName::Varchar, SqlTypeFamily::Boolean, Some(SqlTypeName::Boolean))]
    #[case(SqlTypeName::Varbinary, SqlTypeFamily::Numeric, None)]
    #[case(SqlTypeName::Integer, SqlTypeFamily::Numeric, None)]
    #[case(SqlTypeName::Integer, SqlTypeFamily::Any, None)]
    #[case(SqlTypeName::Cursor, SqlTypeFamily::String, None)]
    fn test_implicit_cast_targets(
        #[case] from: SqlTypeName,
        #[case] family: SqlTypeFamily,
        #[case] expected: Option<SqlTypeName>,
    ) {
        let coercion = ImplicitCastCoercion::new();
        let target = coercion.implicit_cast(&SqlType::new(from), family);
        assert_eq!(target.map(|t| t.type_name), expected);
    }

    #[test]
    fn test_implicit_cast_keeps_nullability() {
        let coercion = ImplicitCastCoercion::new();
        let target = coercion
            .implicit_cast(&SqlType::nullable(SqlTypeName::Varchar), SqlTypeFamily::Integer)
            .unwrap();
        assert!(target.nullable);

        let from_null = coercion
            .implicit_cast(&SqlType::null(), SqlTypeFamily::Character)
            .unwrap();
        assert_eq!(from_null, SqlType::nullable(SqlTypeName::Varchar));
    }
}
