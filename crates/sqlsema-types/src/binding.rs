//! Call binding
//!
//! A [`CallBinding`] is one concrete invocation of an operator as seen by
//! operand type checkers: the operands, how to derive their types, whether
//! implicit coercion is enabled, and the coercion engine to use. The host
//! validator implements it over its AST arena.

use sqlsema_ast::NodeId;
use std::sync::Arc;

use crate::coercion::TypeCoercion;
use crate::error::ValidationResult;
use crate::type_system::SqlType;

/// A call being checked, as seen by operand type checkers
///
/// Operand indexes count DEFAULT placeholders for omitted optional
/// operands as well as the operands actually written.
pub trait CallBinding {
    /// Display name of the invoked operator
    fn operator_name(&self) -> &str;

    /// Number of operands, including DEFAULT placeholders for omitted
    /// optional operands
    fn operand_count(&self) -> usize;

    /// Node of operand `index`
    fn operand(&self, index: usize) -> Option<NodeId>;

    /// Whether operand `index` is the untyped NULL literal
    fn is_null_literal(&self, index: usize) -> bool;

    /// Whether operand `index` is a DEFAULT placeholder
    fn is_default(&self, index: usize) -> bool;

    /// Derive the type of operand `index` in the call's scope
    fn derive_operand_type(&mut self, index: usize) -> ValidationResult<SqlType>;

    /// Ambient session flag: may the validator insert implicit casts
    fn is_type_coercion_enabled(&self) -> bool;

    /// Coercion engine of the active validator
    fn type_coercion(&self) -> Arc<dyn TypeCoercion>;

    /// Replace operand `index` in place with `CAST(operand AS target)`
    ///
    /// Returns false when the operand cannot be rewritten. Only the
    /// coercion engine calls this.
    fn cast_operand(&mut self, index: usize, target: &SqlType) -> ValidationResult<bool>;

    /// Current types of all operands, in order
    fn operand_types(&mut self) -> ValidationResult<Vec<SqlType>> {
        (0..self.operand_count())
            .map(|i| self.derive_operand_type(i))
            .collect()
    }

    /// Signature of the call as written, e.g. `LEFT(<INTEGER>, <CHAR(3)>)`
    fn call_signature(&mut self) -> String {
        let operands: Vec<String> = (0..self.operand_count())
            .map(|i| {
                if self.is_default(i) {
                    return "DEFAULT".to_string();
                }
                match self.derive_operand_type(i) {
                    Ok(ty) => format!("<{ty}>"),
                    Err(_) => "<?>".to_string(),
                }
            })
            .collect();
        format!("{}({})", self.operator_name(), operands.join(", "))
    }
}
