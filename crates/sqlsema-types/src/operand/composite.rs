//! Disjunction of operand type checkers

use log::trace;
use std::sync::Arc;

use super::{OperandCountRange, OperandTypeChecker, signature_error};
use crate::binding::CallBinding;
use crate::error::ValidationResult;
use crate::family::SqlTypeFamily;

/// Accepts a call when any alternative accepts it
///
/// Every alternative is first tried as written; only when none matches
/// are they tried again in order with coercion allowed. An alternative
/// that does not apply or rejects the operand types is skipped. Any other
/// failure, such as an operand that does not resolve, ends the check.
#[derive(Debug, Clone)]
pub struct CompositeOperandTypeChecker {
    alternatives: Vec<Arc<dyn OperandTypeChecker>>,
}

impl CompositeOperandTypeChecker {
    /// Checker accepting what any of `alternatives` accepts, tried in order
    pub fn or(alternatives: impl IntoIterator<Item = Arc<dyn OperandTypeChecker>>) -> Self {
        Self {
            alternatives: alternatives.into_iter().collect(),
        }
    }

    /// Get the alternatives in the order they are tried
    pub fn alternatives(&self) -> &[Arc<dyn OperandTypeChecker>] {
        &self.alternatives
    }

    fn any_strict(&self, binding: &mut dyn CallBinding) -> ValidationResult<bool> {
        for (i, alt) in self.alternatives.iter().enumerate() {
            match alt.check_operand_types_without_coercion(binding) {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(err) if err.is_operand_type_error() => {
                    trace!("alternative {} of {} rejects: {}", i, binding.operator_name(), err);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(false)
    }

    fn mismatch(&self, binding: &mut dyn CallBinding) -> ValidationResult<bool> {
        let allowed = self.allowed_signatures(binding.operator_name());
        Err(signature_error(binding, allowed))
    }
}

impl OperandTypeChecker for CompositeOperandTypeChecker {
    fn check_operand_types(&self, binding: &mut dyn CallBinding) -> ValidationResult<bool> {
        if self.any_strict(binding)? {
            return Ok(true);
        }
        for (i, alt) in self.alternatives.iter().enumerate() {
            match alt.check_operand_types(binding) {
                Ok(true) => return Ok(true),
                Ok(false) => {
                    trace!("alternative {} of {} does not apply", i, binding.operator_name());
                }
                Err(err) if err.is_operand_type_error() => {
                    trace!("alternative {} of {} failed: {}", i, binding.operator_name(), err);
                }
                Err(err) => return Err(err),
            }
        }
        self.mismatch(binding)
    }

    fn check_operand_types_without_coercion(
        &self,
        binding: &mut dyn CallBinding,
    ) -> ValidationResult<bool> {
        if self.any_strict(binding)? {
            return Ok(true);
        }
        self.mismatch(binding)
    }

    fn operand_count_range(&self) -> OperandCountRange {
        self.alternatives
            .iter()
            .map(|alt| alt.operand_count_range())
            .reduce(|a, b| a.union(&b))
            .unwrap_or(OperandCountRange::of(0))
    }

    fn allowed_signatures(&self, op_name: &str) -> String {
        self.alternatives
            .iter()
            .map(|alt| alt.allowed_signatures(op_name))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn is_optional(&self, index: usize) -> bool {
        self.alternatives.iter().any(|alt| alt.is_optional(index))
    }

    /// Family shared at `index` by every alternative that has the position
    fn operand_family(&self, index: usize) -> Option<SqlTypeFamily> {
        let mut families = self
            .alternatives
            .iter()
            .filter(|alt| alt.operand_count_range().max.is_none_or(|max| index < max))
            .map(|alt| alt.operand_family(index));
        let first = families.next()??;
        families.all(|family| family == Some(first)).then_some(first)
    }
}
