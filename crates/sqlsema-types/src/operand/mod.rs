//! Operand type checking
//!
//! An [`OperandTypeChecker`] decides whether the operands of one call are
//! legal for an operator. Checking returns:
//! - `Ok(false)` when the checker does not apply to the call at all (its
//!   arity differs), so an enclosing OR can try the next alternative
//! - `Ok(true)` when the call is legal, possibly after implicit coercion
//! - `Err` with the precise failure otherwise
//!
//! Callers that only try a candidate signature discard errors for which
//! [`ValidationError::is_operand_type_error`] holds.

mod composite;
mod family;
pub mod operand_types;

pub use composite::CompositeOperandTypeChecker;
pub use family::{FamilyOperandTypeChecker, OptionalPredicate};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::binding::CallBinding;
use crate::error::{ValidationError, ValidationResult};
use crate::family::SqlTypeFamily;

/// Strategy for checking the operand types of calls to one operator
pub trait OperandTypeChecker: fmt::Debug + Send + Sync {
    /// Check the call, letting the coercion engine rewrite operands once
    /// when the first pass fails and coercion is enabled
    fn check_operand_types(&self, binding: &mut dyn CallBinding) -> ValidationResult<bool>;

    /// Check the call as written; never invokes coercion and never
    /// mutates the call
    fn check_operand_types_without_coercion(
        &self,
        binding: &mut dyn CallBinding,
    ) -> ValidationResult<bool>;

    /// Legal number of operands
    fn operand_count_range(&self) -> OperandCountRange;

    /// Signature text for diagnostics, e.g. `'LEFT(<STRING>, <INTEGER>)'`
    fn allowed_signatures(&self, op_name: &str) -> String;

    /// Whether operand `index` may be omitted
    fn is_optional(&self, _index: usize) -> bool {
        false
    }

    /// Family required at operand `index`, when the checker has one
    fn operand_family(&self, _index: usize) -> Option<SqlTypeFamily> {
        None
    }
}

/// Legal operand count of an operator, `max == None` meaning unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperandCountRange {
    pub min: usize,
    pub max: Option<usize>,
}

impl OperandCountRange {
    /// Range `min..=max`
    pub const fn between(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    /// Exactly `count` operands
    pub const fn of(count: usize) -> Self {
        Self::between(count, count)
    }

    /// At least `min` operands
    pub const fn from(min: usize) -> Self {
        Self { min, max: None }
    }

    /// Check if `count` is in the range
    pub fn is_valid_count(&self, count: usize) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }

    /// Smallest range covering both
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: match (self.max, other.max) {
                (Some(a), Some(b)) => Some(a.max(b)),
                _ => None,
            },
        }
    }
}

impl fmt::Display for OperandCountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{max}"),
            Some(max) => write!(f, "{} to {}", self.min, max),
            None => write!(f, "{} or more", self.min),
        }
    }
}

/// Signature of an operator over families, e.g. `LEFT(<STRING>, <INTEGER>)`
pub fn signature(op_name: &str, families: &[SqlTypeFamily]) -> String {
    let operands: Vec<String> = families.iter().map(|f| format!("<{f}>")).collect();
    format!("{}({})", op_name, operands.join(", "))
}

/// Quoted signature as listed under "Supported form(s)"
pub fn aliased_signature(op_name: &str, families: &[SqlTypeFamily]) -> String {
    format!("'{}'", signature(op_name, families))
}

/// Signature error for `binding`, listing `allowed`
pub(crate) fn signature_error(binding: &mut dyn CallBinding, allowed: String) -> ValidationError {
    ValidationError::SignatureMismatch {
        operator: binding.operator_name().to_string(),
        actual: binding.call_signature(),
        allowed,
    }
}
