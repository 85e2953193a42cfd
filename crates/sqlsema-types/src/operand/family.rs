//! Family-based operand type checker

use log::{debug, trace};
use sqlsema_ast::SqlTypeName;
use std::fmt;
use std::sync::Arc;

use super::{OperandCountRange, OperandTypeChecker, aliased_signature, signature_error};
use crate::binding::CallBinding;
use crate::error::{ValidationError, ValidationResult};
use crate::family::SqlTypeFamily;

/// Predicate telling whether the operand at an index may be omitted
pub type OptionalPredicate = Arc<dyn Fn(usize) -> bool + Send + Sync>;

/// Checks each operand against the family declared for its position
///
/// Optional operands must form a trailing suffix of the family list.
#[derive(Clone)]
pub struct FamilyOperandTypeChecker {
    families: Vec<SqlTypeFamily>,
    optional: OptionalPredicate,
}

impl FamilyOperandTypeChecker {
    /// Checker where every operand is required
    pub fn new(families: impl IntoIterator<Item = SqlTypeFamily>) -> Self {
        Self::with_optional(families, |_| false)
    }

    /// Checker whose operands at positions where `optional` holds may be
    /// omitted; only a trailing run of such positions counts toward the
    /// minimum operand count
    pub fn with_optional(
        families: impl IntoIterator<Item = SqlTypeFamily>,
        optional: impl Fn(usize) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            families: families.into_iter().collect(),
            optional: Arc::new(optional),
        }
    }

    /// Declared family of each operand position
    pub fn families(&self) -> &[SqlTypeFamily] {
        &self.families
    }

    /// Check operand `index` against `family`
    ///
    /// IGNORE accepts without deriving a type. ANY accepts every type but
    /// CURSOR. A NULL literal is accepted only when coercion is enabled,
    /// failing with [`ValidationError::NullIllegal`] otherwise. Any other
    /// operand is accepted when its type is opaque (ANY) or belongs to the
    /// family. A DEFAULT placeholder is accepted only at an optional position.
    pub fn check_single_operand(
        &self,
        binding: &mut dyn CallBinding,
        index: usize,
        family: SqlTypeFamily,
    ) -> ValidationResult<()> {
        match family {
            SqlTypeFamily::Ignore => return Ok(()),
            _ if binding.is_default(index) => {
                if self.is_optional(index) {
                    trace!("operand {} of {} omitted", index, binding.operator_name());
                    return Ok(());
                }
                return Err(self.signature_error(binding));
            }
            SqlTypeFamily::Any => {
                let ty = binding.derive_operand_type(index)?;
                if ty.type_name == SqlTypeName::Cursor {
                    trace!("operand {} of {} is a cursor", index, binding.operator_name());
                    return Err(self.signature_error(binding));
                }
                return Ok(());
            }
            _ => {}
        }

        if binding.is_null_literal(index) {
            if binding.is_type_coercion_enabled() {
                return Ok(());
            }
            return Err(ValidationError::NullIllegal {
                operator: binding.operator_name().to_string(),
                operand: index,
            });
        }

        let ty = binding.derive_operand_type(index)?;
        if SqlTypeFamily::of(ty.type_name) == Some(SqlTypeFamily::Any) {
            return Ok(());
        }
        if !family.contains(ty.type_name) {
            trace!(
                "operand {} of {}: {} is not {}",
                index,
                binding.operator_name(),
                ty,
                family
            );
            return Err(self.signature_error(binding));
        }
        Ok(())
    }

    /// Check a lone operand against the single declared family
    ///
    /// Only meaningful for one-family checkers; anything else is a broken
    /// operator definition.
    pub fn check_single_operand_type(
        &self,
        binding: &mut dyn CallBinding,
        index: usize,
    ) -> ValidationResult<bool> {
        match self.families.as_slice() {
            [family] => self.check_single_operand(binding, index, *family).map(|()| true),
            families => Err(ValidationError::internal(format!(
                "single operand check on a checker with {} families",
                families.len()
            ))),
        }
    }

    fn check_all(&self, binding: &mut dyn CallBinding) -> ValidationResult<()> {
        for (index, family) in self.families.iter().enumerate() {
            self.check_single_operand(binding, index, *family)?;
        }
        Ok(())
    }

    fn is_applicable(&self, binding: &dyn CallBinding) -> bool {
        let applicable = self.families.len() == binding.operand_count();
        if !applicable {
            trace!(
                "{} expects {} operands, call has {}",
                binding.operator_name(),
                self.families.len(),
                binding.operand_count()
            );
        }
        applicable
    }

    fn signature_error(&self, binding: &mut dyn CallBinding) -> ValidationError {
        let allowed = self.allowed_signatures(binding.operator_name());
        signature_error(binding, allowed)
    }
}

impl OperandTypeChecker for FamilyOperandTypeChecker {
    fn check_operand_types(&self, binding: &mut dyn CallBinding) -> ValidationResult<bool> {
        if !self.is_applicable(binding) {
            return Ok(false);
        }
        match self.check_all(binding) {
            Ok(()) => return Ok(true),
            Err(err) if !err.is_operand_type_error() => return Err(err),
            Err(_) => {}
        }

        let mut coerced = false;
        if binding.is_type_coercion_enabled() {
            let operand_types = binding.operand_types()?;
            let coercion = binding.type_coercion();
            coerced =
                coercion.builtin_function_coercion(binding, &operand_types, &self.families)?;
            debug!(
                "coercion of {} {}",
                binding.operator_name(),
                if coerced { "rewrote operands" } else { "found no cast" }
            );
        }

        // Coercion may touch operands it was not asked about, so every
        // position is checked again.
        self.check_all(binding)?;
        Ok(coerced)
    }

    fn check_operand_types_without_coercion(
        &self,
        binding: &mut dyn CallBinding,
    ) -> ValidationResult<bool> {
        if !self.is_applicable(binding) {
            return Ok(false);
        }
        self.check_all(binding)?;
        Ok(true)
    }

    fn operand_count_range(&self) -> OperandCountRange {
        let max = self.families.len();
        let mut min = max;
        while min > 0 && (self.optional)(min - 1) {
            min -= 1;
        }
        OperandCountRange::between(min, max)
    }

    fn allowed_signatures(&self, op_name: &str) -> String {
        aliased_signature(op_name, &self.families)
    }

    fn is_optional(&self, index: usize) -> bool {
        (self.optional)(index)
    }

    fn operand_family(&self, index: usize) -> Option<SqlTypeFamily> {
        self.families.get(index).copied()
    }
}

impl fmt::Debug for FamilyOperandTypeChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let optional: Vec<usize> = (0..self.families.len())
            .filter(|&i| (self.optional)(i))
            .collect();
        f.debug_struct("FamilyOperandTypeChecker")
            .field("families", &self.families)
            .field("optional", &optional)
            .finish()
    }
}
