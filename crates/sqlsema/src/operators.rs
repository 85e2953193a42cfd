//! Operator table
//!
//! Maps function names to their operand type checker and return type rule.

use indexmap::IndexMap;
use sqlsema_types::operand_types;
use sqlsema_types::{
    OperandCountRange, OperandTypeChecker, SqlType, SqlTypeFamily, SqlTypeName, ValidationError,
    ValidationResult,
};
use std::sync::Arc;

/// How the type of a call is inferred from its operand types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnTypeRule {
    /// Always this type
    Explicit(SqlType),
    /// This type, nullable when any operand is nullable
    ExplicitNullable(SqlType),
    /// Type of operand `n`, nullable when any operand is nullable
    Operand(usize),
    /// The inner rule's type, always nullable
    ForceNullable(Box<ReturnTypeRule>),
}

impl ReturnTypeRule {
    /// Type of the first operand
    pub fn first_operand() -> Self {
        Self::Operand(0)
    }

    /// Make the inferred type always nullable
    pub fn force_nullable(self) -> Self {
        Self::ForceNullable(Box::new(self))
    }

    /// Infer the call's type from the types of its supplied operands
    pub fn infer(&self, operand_types: &[SqlType]) -> ValidationResult<SqlType> {
        let any_nullable = operand_types.iter().any(|t| t.nullable);
        match self {
            Self::Explicit(ty) => Ok(ty.clone()),
            Self::ExplicitNullable(ty) => Ok(ty.clone().with_nullable(ty.nullable || any_nullable)),
            Self::Operand(n) => {
                let ty = operand_types.get(*n).ok_or_else(|| {
                    ValidationError::internal(format!(
                        "return type taken from operand {n} of a call with {} operands",
                        operand_types.len()
                    ))
                })?;
                Ok(ty.clone().with_nullable(any_nullable))
            }
            Self::ForceNullable(inner) => Ok(inner.infer(operand_types)?.with_nullable(true)),
        }
    }
}

/// A named function known to the validator
#[derive(Debug, Clone)]
pub struct SqlOperator {
    pub name: String,
    pub checker: Arc<dyn OperandTypeChecker>,
    pub return_type: ReturnTypeRule,
}

impl SqlOperator {
    /// Create an operator
    pub fn new(
        name: impl Into<String>,
        checker: impl OperandTypeChecker + 'static,
        return_type: ReturnTypeRule,
    ) -> Self {
        Self {
            name: name.into(),
            checker: Arc::new(checker),
            return_type,
        }
    }

    /// Get the legal operand count
    pub fn operand_count_range(&self) -> OperandCountRange {
        self.checker.operand_count_range()
    }

    /// Get the signatures listed in mismatch errors
    pub fn allowed_signatures(&self) -> String {
        self.checker.allowed_signatures(&self.name)
    }
}

/// Registry of operators by upper-case name
#[derive(Debug, Clone, Default)]
pub struct SqlOperatorTable {
    operators: IndexMap<String, SqlOperator>,
}

impl SqlOperatorTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the standard library functions
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.register_string_functions();
        table.register_numeric_functions();
        table.register_datetime_functions();
        table.register_logical_functions();
        table
    }

    /// Register an operator, replacing one of the same name
    pub fn register(&mut self, operator: SqlOperator) {
        self.operators
            .insert(operator.name.to_ascii_uppercase(), operator);
    }

    /// Look up an operator; names are case-insensitive
    pub fn lookup(&self, name: &str) -> Option<&SqlOperator> {
        self.operators.get(&name.to_ascii_uppercase())
    }

    /// Get the number of operators
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// Check if no operator is registered
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Get the registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operators.keys().map(String::as_str)
    }

    fn register_string_functions(&mut self) {
        let varchar = SqlType::new(SqlTypeName::Varchar);

        for name in ["UPPER", "LOWER"] {
            self.register(SqlOperator::new(
                name,
                operand_types::character(),
                ReturnTypeRule::first_operand(),
            ));
        }
        for name in ["LEFT", "RIGHT"] {
            self.register(SqlOperator::new(
                name,
                operand_types::string_integer(),
                ReturnTypeRule::first_operand(),
            ));
        }
        self.register(SqlOperator::new(
            "LPAD",
            operand_types::string_numeric_optional_string(),
            ReturnTypeRule::first_operand(),
        ));
        self.register(SqlOperator::new(
            "RPAD",
            operand_types::string_numeric_optional_string(),
            ReturnTypeRule::first_operand(),
        ));
        self.register(SqlOperator::new(
            "SUBSTR",
            operand_types::string_integer_optional_integer(),
            ReturnTypeRule::first_operand(),
        ));
        self.register(SqlOperator::new(
            "LTRIM",
            operand_types::string_optional_string(),
            ReturnTypeRule::first_operand(),
        ));
        self.register(SqlOperator::new(
            "RTRIM",
            operand_types::string_optional_string(),
            ReturnTypeRule::first_operand(),
        ));
        self.register(SqlOperator::new(
            "CHR",
            operand_types::integer(),
            ReturnTypeRule::ExplicitNullable(SqlType::new(SqlTypeName::Char).with_precision(1)),
        ));
        self.register(SqlOperator::new(
            "CONCAT",
            operand_types::string_string(),
            ReturnTypeRule::ExplicitNullable(varchar),
        ));
    }

    fn register_numeric_functions(&mut self) {
        self.register(SqlOperator::new(
            "ABS",
            operand_types::numeric(),
            ReturnTypeRule::first_operand(),
        ));
        self.register(SqlOperator::new(
            "MOD",
            operand_types::exact_numeric_exact_numeric(),
            ReturnTypeRule::Operand(1),
        ));
    }

    fn register_datetime_functions(&mut self) {
        let integer = SqlType::new(SqlTypeName::Integer);

        // time unit operands are keywords, so they are not type checked
        self.register(SqlOperator::new(
            "DATEDIFF",
            operand_types::family([
                SqlTypeFamily::Ignore,
                SqlTypeFamily::Date,
                SqlTypeFamily::Date,
            ]),
            ReturnTypeRule::ExplicitNullable(integer.clone()),
        ));
        self.register(SqlOperator::new(
            "DATE_PART",
            operand_types::unit_date_or_timestamp(),
            ReturnTypeRule::ExplicitNullable(SqlType::new(SqlTypeName::BigInt)),
        ));
        self.register(SqlOperator::new(
            "TIMESTAMP_DIFF",
            operand_types::family([
                SqlTypeFamily::Timestamp,
                SqlTypeFamily::Timestamp,
                SqlTypeFamily::Ignore,
            ]),
            ReturnTypeRule::ExplicitNullable(SqlType::new(SqlTypeName::BigInt)),
        ));
        self.register(SqlOperator::new(
            "UNIX_DATE",
            operand_types::date(),
            ReturnTypeRule::ExplicitNullable(integer),
        ));
        self.register(SqlOperator::new(
            "DATE_FROM_UNIX_DATE",
            operand_types::integer(),
            ReturnTypeRule::ExplicitNullable(SqlType::new(SqlTypeName::Date)),
        ));
    }

    fn register_logical_functions(&mut self) {
        self.register(SqlOperator::new(
            "IF",
            operand_types::family([
                SqlTypeFamily::Boolean,
                SqlTypeFamily::Any,
                SqlTypeFamily::Any,
            ]),
            ReturnTypeRule::Operand(1),
        ));
        self.register(SqlOperator::new(
            "BOOL_AND",
            operand_types::boolean(),
            ReturnTypeRule::Explicit(SqlType::new(SqlTypeName::Boolean)).force_nullable(),
        ));
    }
}
