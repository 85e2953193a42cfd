//! Concrete SQL types
//!
//! [`SqlType`] is the type the validator derives for an expression: a
//! [`SqlTypeName`] plus nullability, optional precision and scale, and the
//! structure of row and collection types. Row types describe what a
//! namespace (table, subquery, WITH item) exposes.

use serde::{Deserialize, Serialize};
use sqlsema_ast::{DataTypeSpec, SqlTypeName};
use std::fmt;

use crate::family::SqlTypeFamily;

/// A derived SQL type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SqlType {
    pub type_name: SqlTypeName,
    pub nullable: bool,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    /// Fields of a ROW type, in order
    pub fields: Vec<RowField>,
    /// Element type of ARRAY and MULTISET, value type of MAP
    pub component: Option<Box<SqlType>>,
}

/// A named field of a row type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowField {
    pub name: String,
    pub index: usize,
    pub field_type: SqlType,
}

impl SqlType {
    // === Constructors ===

    /// A NOT NULL scalar type
    pub fn new(type_name: SqlTypeName) -> Self {
        Self {
            type_name,
            nullable: false,
            precision: None,
            scale: None,
            fields: Vec::new(),
            component: None,
        }
    }

    /// A nullable scalar type
    pub fn nullable(type_name: SqlTypeName) -> Self {
        Self::new(type_name).with_nullable(true)
    }

    /// Type of the untyped NULL literal
    pub fn null() -> Self {
        Self::nullable(SqlTypeName::Null)
    }

    /// Opaque type accepted by every family
    pub fn any() -> Self {
        Self::nullable(SqlTypeName::Any)
    }

    /// Type of a CURSOR operand
    pub fn cursor() -> Self {
        Self::new(SqlTypeName::Cursor)
    }

    /// A row type from `(name, type)` pairs
    pub fn row<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, SqlType)>,
        S: Into<String>,
    {
        let fields = fields
            .into_iter()
            .enumerate()
            .map(|(index, (name, field_type))| RowField {
                name: name.into(),
                index,
                field_type,
            })
            .collect();
        Self {
            fields,
            ..Self::new(SqlTypeName::Row)
        }
    }

    /// Row type with no fields, used before a namespace has been validated
    pub fn empty_row() -> Self {
        Self::new(SqlTypeName::Row)
    }

    /// Array of `component`
    pub fn array(component: SqlType) -> Self {
        Self {
            component: Some(Box::new(component)),
            ..Self::new(SqlTypeName::Array)
        }
    }

    /// Type named by a CAST target
    pub fn from_spec(spec: &DataTypeSpec, nullable: bool) -> Self {
        Self {
            precision: spec.precision,
            scale: spec.scale,
            ..Self::new(spec.type_name).with_nullable(nullable)
        }
    }

    // === Modifiers ===

    /// Set nullability
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
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

    /// Same row type with fields renamed positionally
    ///
    /// Returns `None` when the number of names differs from the field count.
    pub fn rename_fields(&self, names: &[String]) -> Option<Self> {
        if names.len() != self.fields.len() {
            return None;
        }
        Some(Self::row(
            names
                .iter()
                .zip(&self.fields)
                .map(|(name, f)| (name.clone(), f.field_type.clone())),
        ))
    }

    // === Properties ===

    /// Check if this is a row type
    pub fn is_row(&self) -> bool {
        self.type_name == SqlTypeName::Row
    }

    /// Check if this is the type of the NULL literal
    pub fn is_null_type(&self) -> bool {
        self.type_name == SqlTypeName::Null
    }

    /// The family this type belongs to
    pub fn family(&self) -> Option<SqlTypeFamily> {
        SqlTypeFamily::of(self.type_name)
    }

    /// Get the number of row fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Get the row field names in order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Look up a field by name
    pub fn field(&self, name: &str, case_sensitive: bool) -> Option<&RowField> {
        self.fields.iter().find(|f| {
            if case_sensitive {
                f.name == name
            } else {
                f.name.eq_ignore_ascii_case(name)
            }
        })
    }

    /// Type string including nullability, e.g. `INTEGER NOT NULL`
    pub fn full_type_string(&self) -> String {
        if self.nullable || self.is_row() {
            self.to_string()
        } else {
            format!("{self} NOT NULL")
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.type_name {
            SqlTypeName::Row => {
                write!(f, "RecordType(")?;
                for (i, field) in self.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", field.field_type, field.name)?;
                }
                write!(f, ")")
            }
            SqlTypeName::Array | SqlTypeName::Multiset | SqlTypeName::Map => {
                match &self.component {
                    Some(component) => write!(f, "{} {}", component, self.type_name),
                    None => write!(f, "{}", self.type_name),
                }
            }
            name => match (self.precision, self.scale) {
                (Some(p), Some(s)) => write!(f, "{}({}, {})", name, p, s),
                (Some(p), None) => write!(f, "{}({})", name, p),
                _ => write!(f, "{}", name),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn emp_row() -> SqlType {
        SqlType::row([
            ("EMPNO", SqlType::new(SqlTypeName::Integer)),
            (
                "ENAME",
                SqlType::nullable(SqlTypeName::Varchar).with_precision(20),
            ),
        ])
    }

    #[test]
    fn test_row_display() {
        assert_eq!(
            emp_row().to_string(),
            "RecordType(INTEGER EMPNO, VARCHAR(20) ENAME)"
        );
    }

    #[test]
    fn test_full_type_string() {
        assert_eq!(
            SqlType::new(SqlTypeName::Integer).full_type_string(),
            "INTEGER NOT NULL"
        );
        assert_eq!(SqlType::null().full_type_string(), "NULL");
        assert_eq!(
            SqlType::array(SqlType::new(SqlTypeName::Date)).to_string(),
            "DATE ARRAY"
        );
    }

    #[test]
    fn test_field_lookup_respects_case() {
        let row = emp_row();
        assert_eq!(row.field("EMPNO", true).map(|f| f.index), Some(0));
        assert!(row.field("empno", true).is_none());
        assert_eq!(row.field("ename", false).map(|f| f.index), Some(1));
    }

    #[test]
    fn test_rename_fields() {
        let renamed = emp_row()
            .rename_fields(&["ID".to_string(), "NAME".to_string()])
            .unwrap();
        assert_eq!(renamed.field_names().collect::<Vec<_>>(), vec!["ID", "NAME"]);
        assert_eq!(renamed.fields[1].field_type.precision, Some(20));
        assert!(emp_row().rename_fields(&["ID".to_string()]).is_none());
    }
}
