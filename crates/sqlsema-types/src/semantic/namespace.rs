//! Namespaces
//!
//! A namespace is the row-typed object a table name refers to: a catalog
//! table, a subquery, a WITH item, or the self-referencing leg of a
//! recursive WITH item. Namespaces live in an arena and are addressed by
//! [`NamespaceId`]; scopes refer to them by id only.

use indexmap::IndexMap;
use log::debug;
use sqlsema_ast::NodeId;
use std::fmt;

use crate::error::{ValidationError, ValidationResult};
use crate::type_system::SqlType;

/// Index of a namespace in a [`Namespaces`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(u32);

impl NamespaceId {
    /// Position in the registry
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ns{}", self.0)
    }
}

/// What a namespace stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceKind {
    /// Catalog table, by its qualified name
    Table { names: Vec<String> },
    /// SELECT, set operation, or WITH query
    Query,
    /// A WITH item
    WithItem,
    /// Self-reference of a recursive WITH item from inside its own body
    RecursiveWithItem { item: NamespaceId },
}

/// Source of rows a scope can bind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// Node introducing the namespace; `None` for catalog tables
    pub node: Option<NodeId>,
    pub kind: NamespaceKind,
    /// Row type; empty until the namespace has been validated
    pub row_type: SqlType,
    /// Node the namespace is referenced from
    pub enclosing_node: Option<NodeId>,
}

impl Namespace {
    /// Check if this is the recursive view of a WITH item
    pub fn is_recursive(&self) -> bool {
        matches!(self.kind, NamespaceKind::RecursiveWithItem { .. })
    }

    /// Check if this namespace belongs to a WITH item
    pub fn is_with_item(&self) -> bool {
        matches!(self.kind, NamespaceKind::WithItem)
    }
}

/// Lookup of namespaces by id and by introducing node
pub trait NamespaceRegistry {
    fn namespace(&self, id: NamespaceId) -> Option<&Namespace>;

    /// Namespace introduced by `node`
    fn namespace_of(&self, node: NodeId) -> Option<NamespaceId>;

    /// Recursive namespace of the WITH item `item`
    fn recursive_namespace_of(&self, item: NodeId) -> Option<NamespaceId>;

    fn row_type(&self, id: NamespaceId) -> Option<&SqlType> {
        self.namespace(id).map(|ns| &ns.row_type)
    }
}

/// Arena of the namespaces of one validation pass
#[derive(Debug, Clone, Default)]
pub struct Namespaces {
    namespaces: Vec<Namespace>,
    by_node: IndexMap<NodeId, NamespaceId>,
    recursive: IndexMap<NodeId, NamespaceId>,
}

impl Namespaces {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of namespaces
    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    /// Check if no namespace is registered
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    fn push(&mut self, namespace: Namespace) -> NamespaceId {
        let id = NamespaceId(self.namespaces.len() as u32);
        self.namespaces.push(namespace);
        id
    }

    /// Register a catalog table
    pub fn register_table(&mut self, names: Vec<String>, row_type: SqlType) -> NamespaceId {
        self.push(Namespace {
            node: None,
            kind: NamespaceKind::Table { names },
            row_type,
            enclosing_node: None,
        })
    }

    /// Register the namespace introduced by `node`, replacing an earlier
    /// registration of the same node
    pub fn register(
        &mut self,
        node: NodeId,
        kind: NamespaceKind,
        enclosing_node: Option<NodeId>,
    ) -> NamespaceId {
        let id = self.push(Namespace {
            node: Some(node),
            kind,
            row_type: SqlType::empty_row(),
            enclosing_node,
        });
        self.by_node.insert(node, id);
        id
    }

    /// Recursive namespace of WITH item `item`, created on first use
    ///
    /// The item itself must already be registered.
    pub fn get_or_create_recursive(&mut self, item: NodeId) -> ValidationResult<NamespaceId> {
        if let Some(&id) = self.recursive.get(&item) {
            return Ok(id);
        }
        let item_ns = self.by_node.get(&item).copied().ok_or_else(|| {
            ValidationError::internal(format!("WITH item {item} has no namespace"))
        })?;
        let enclosing_node = self.get(item_ns).and_then(|ns| ns.enclosing_node);
        let id = self.push(Namespace {
            node: Some(item),
            kind: NamespaceKind::RecursiveWithItem { item: item_ns },
            row_type: SqlType::empty_row(),
            enclosing_node,
        });
        self.recursive.insert(item, id);
        debug!("created recursive namespace {} for WITH item {}", id, item);
        Ok(id)
    }

    /// Get a namespace by id
    pub fn get(&self, id: NamespaceId) -> Option<&Namespace> {
        self.namespaces.get(id.index())
    }

    /// Set the row type once it is known
    pub fn set_row_type(&mut self, id: NamespaceId, row_type: SqlType) -> ValidationResult<()> {
        let namespace = self
            .namespaces
            .get_mut(id.index())
            .ok_or_else(|| ValidationError::internal(format!("unknown namespace {id}")))?;
        namespace.row_type = row_type;
        Ok(())
    }

    /// Iterate namespaces in registration order
    pub fn iter(&self) -> impl Iterator<Item = (NamespaceId, &Namespace)> {
        self.namespaces
            .iter()
            .enumerate()
            .map(|(i, ns)| (NamespaceId(i as u32), ns))
    }
}

impl NamespaceRegistry for Namespaces {
    fn namespace(&self, id: NamespaceId) -> Option<&Namespace> {
        self.get(id)
    }

    fn namespace_of(&self, node: NodeId) -> Option<NamespaceId> {
        self.by_node.get(&node).copied()
    }

    fn recursive_namespace_of(&self, item: NodeId) -> Option<NamespaceId> {
        self.recursive.get(&item).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlsema_ast::Ast;

    #[test]
    fn test_recursive_namespace_is_memoized_and_distinct() {
        let mut ast = Ast::new();
        let item = ast.default_operand();
        let mut namespaces = Namespaces::new();
        let plain = namespaces.register(item, NamespaceKind::WithItem, None);

        let first = namespaces.get_or_create_recursive(item).unwrap();
        let second = namespaces.get_or_create_recursive(item).unwrap();
        assert_eq!(first, second);
        assert_ne!(first, plain);
        assert_eq!(namespaces.namespace_of(item), Some(plain));
        assert_eq!(namespaces.recursive_namespace_of(item), Some(first));
        assert!(namespaces.get(first).unwrap().is_recursive());
    }

    #[test]
    fn test_recursive_namespace_requires_item() {
        let mut ast = Ast::new();
        let item = ast.default_operand();
        let err = Namespaces::new().get_or_create_recursive(item).unwrap_err();
        assert!(matches!(err, ValidationError::Internal(_)));
    }
}
