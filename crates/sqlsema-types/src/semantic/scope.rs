//! Scope Management for SQL Semantic Analysis
//!
//! Every query block, WITH item and recursive WITH item gets a scope.
//! Scopes form a tree stored in a [`ScopeArena`]; each scope knows its
//! parent by [`ScopeId`] and a lookup that finds nothing locally is
//! delegated to the parent. The root scope holds the catalog tables.
//!
//! For `WITH t1 AS (..), t2 AS (..), t3 AS (..) main`, the scope chain is
//! `main -> t3 -> t2 -> t1 -> enclosing`, so the body of `t2` sees only
//! `t1` while `main` sees all three. A recursive item additionally sees
//! itself, through its recursive namespace.

use log::{debug, trace};
use smallvec::SmallVec;
use sqlsema_ast::NodeId;
use std::fmt;

use super::namespace::{NamespaceId, NamespaceRegistry};
use super::path::Path;
use super::resolver::{NameMatcher, Resolve, Resolved, ResolvedCollector};
use crate::error::{ValidationError, ValidationResult};
use crate::type_system::{RowField, SqlType};

/// Index of a scope in a [`ScopeArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    /// Position in the arena
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope{}", self.0)
    }
}

/// Role of a scope, fixed when the scope is created
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeRole {
    /// Root scope holding catalog tables
    Catalog,
    /// Query block with its FROM-list bindings
    Base,
    /// Exposes WITH item `item`, bound as `name`
    WithItem { item: NodeId, name: String },
    /// Exposes WITH item `item` to its own body, through the item's
    /// recursive namespace
    RecursiveWithItem { item: NodeId, name: String },
}

impl fmt::Display for ScopeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog => write!(f, "catalog"),
            Self::Base => write!(f, "base"),
            Self::WithItem { name, .. } => write!(f, "with {name}"),
            Self::RecursiveWithItem { name, .. } => write!(f, "with recursive {name}"),
        }
    }
}

/// A named namespace local to a scope, e.g. a FROM-list alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeBinding {
    pub names: SmallVec<[String; 2]>,
    pub namespace: NamespaceId,
    pub nullable: bool,
}

impl ScopeBinding {
    /// Get the binding name as written, parts joined by `.`
    pub fn display_name(&self) -> String {
        self.names.join(".")
    }
}

/// One scope of the tree
#[derive(Debug, Clone)]
pub struct Scope {
    parent: Option<ScopeId>,
    role: ScopeRole,
    /// Node the scope was created for
    node: Option<NodeId>,
    children: Vec<ScopeBinding>,
    depth: usize,
}

impl Scope {
    /// Get the enclosing scope; only the catalog scope has none
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Get the scope role
    pub fn role(&self) -> &ScopeRole {
        &self.role
    }

    /// Get the node the scope was created for
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Get the local bindings in the order added
    pub fn children(&self) -> &[ScopeBinding] {
        &self.children
    }

    /// Get the scope depth, the catalog scope being 0
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Name this scope exposes through its role, if any
    pub fn with_item_name(&self) -> Option<&str> {
        match &self.role {
            ScopeRole::WithItem { name, .. } | ScopeRole::RecursiveWithItem { name, .. } => {
                Some(name)
            }
            ScopeRole::Catalog | ScopeRole::Base => None,
        }
    }
}

/// Column found by [`ScopeArena::resolve_column`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnResolution {
    pub scope: ScopeId,
    pub namespace: NamespaceId,
    /// Name of the binding the column belongs to
    pub table: String,
    pub field: RowField,
    /// Whether the binding's rows may be absent
    pub nullable: bool,
}

/// All scopes of one validation pass
#[derive(Debug, Clone)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    /// Arena containing only the catalog scope
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                parent: None,
                role: ScopeRole::Catalog,
                node: None,
                children: Vec::new(),
                depth: 0,
            }],
        }
    }

    /// Get the catalog scope
    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Get the number of scopes, the catalog scope included
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Check if the arena has no scopes
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Get a scope by id
    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.index())
    }

    fn scope(&self, id: ScopeId) -> ValidationResult<&Scope> {
        self.get(id)
            .ok_or_else(|| ValidationError::internal(format!("unknown scope {id}")))
    }

    fn push(
        &mut self,
        parent: ScopeId,
        role: ScopeRole,
        node: Option<NodeId>,
    ) -> ValidationResult<ScopeId> {
        let depth = self.scope(parent)?.depth + 1;
        let id = ScopeId(self.scopes.len() as u32);
        debug!("created {} scope {} under {}", role, id, parent);
        self.scopes.push(Scope {
            parent: Some(parent),
            role,
            node,
            children: Vec::new(),
            depth,
        });
        Ok(id)
    }

    /// Scope for a query block
    pub fn new_base(&mut self, parent: ScopeId, node: Option<NodeId>) -> ValidationResult<ScopeId> {
        self.push(parent, ScopeRole::Base, node)
    }

    /// Scope exposing WITH item `item` as `name` on top of `parent`
    pub fn new_with_item(
        &mut self,
        parent: ScopeId,
        item: NodeId,
        name: impl Into<String>,
    ) -> ValidationResult<ScopeId> {
        let name = name.into();
        self.push(parent, ScopeRole::WithItem { item, name }, Some(item))
    }

    /// Scope in which the body of recursive WITH item `item` is validated
    pub fn new_recursive_with_item(
        &mut self,
        parent: ScopeId,
        item: NodeId,
        name: impl Into<String>,
    ) -> ValidationResult<ScopeId> {
        let name = name.into();
        self.push(parent, ScopeRole::RecursiveWithItem { item, name }, Some(item))
    }

    /// Add a named namespace to `scope`
    pub fn add_child<I, S>(
        &mut self,
        scope: ScopeId,
        names: I,
        namespace: NamespaceId,
        nullable: bool,
    ) -> ValidationResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let target = self
            .scopes
            .get_mut(scope.index())
            .ok_or_else(|| ValidationError::internal(format!("unknown scope {scope}")))?;
        target.children.push(ScopeBinding {
            names: names.into_iter().map(Into::into).collect(),
            namespace,
            nullable,
        });
        Ok(())
    }

    /// `scope` followed by its ancestors up to the root
    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), move |id| self.get(*id).and_then(|s| s.parent))
    }

    /// Resolve a table name as seen from `scope`, reporting matches to
    /// `resolved`
    ///
    /// A WITH scope matches only the one-part name of its item, compared
    /// exactly. Other scopes match a binding whose name is a prefix of
    /// `names`; the rest of `names` is reported as remaining. The first
    /// scope with a match stops the lookup. Reports nothing when the name
    /// is not visible.
    pub fn resolve_table(
        &self,
        scope: ScopeId,
        names: &[String],
        matcher: &dyn NameMatcher,
        path: &Path,
        registry: &dyn NamespaceRegistry,
        resolved: &mut dyn Resolved,
    ) -> ValidationResult<()> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.scope(id)?;

            if let Some(namespace) = self.with_item_match(s, names, registry)? {
                let name = &names[0];
                let row_type = registry
                    .row_type(namespace)
                    .cloned()
                    .unwrap_or_else(SqlType::empty_row);
                let path = path.plus(row_type, 0, name.clone());
                resolved.found(namespace, false, id, path, Vec::new());
                return Ok(());
            }

            let child = s
                .children
                .iter()
                .enumerate()
                .find(|(_, child)| matcher.is_prefix(&child.names, names));
            if let Some((ordinal, child)) = child {
                let row_type = registry
                    .row_type(child.namespace)
                    .cloned()
                    .unwrap_or_else(SqlType::empty_row);
                let path = path.plus(row_type, ordinal, child.display_name());
                let remaining = names[child.names.len()..].to_vec();
                resolved.found(child.namespace, child.nullable, id, path, remaining);
                return Ok(());
            }

            trace!("table {} not in {}, delegating", names.join("."), id);
            current = s.parent;
        }
        Ok(())
    }

    /// Namespace a WITH scope exposes for `names`, when it matches
    fn with_item_match(
        &self,
        scope: &Scope,
        names: &[String],
        registry: &dyn NamespaceRegistry,
    ) -> ValidationResult<Option<NamespaceId>> {
        let (item, name, recursive) = match &scope.role {
            ScopeRole::WithItem { item, name } => (*item, name, false),
            ScopeRole::RecursiveWithItem { item, name } => (*item, name, true),
            ScopeRole::Catalog | ScopeRole::Base => return Ok(None),
        };
        if names.len() != 1 || names[0] != *name {
            return Ok(None);
        }
        let namespace = if recursive {
            debug!("{} resolves to the recursive leg of WITH item {}", name, item);
            registry.recursive_namespace_of(item)
        } else {
            registry.namespace_of(item)
        };
        namespace.map(Some).ok_or_else(|| {
            ValidationError::internal(format!("WITH item {name} ({item}) has no namespace"))
        })
    }

    /// Like [`resolve_table`](Self::resolve_table), returning the first
    /// match or [`ValidationError::ObjectNotFound`]
    pub fn resolve_table_or_err(
        &self,
        scope: ScopeId,
        names: &[String],
        matcher: &dyn NameMatcher,
        registry: &dyn NamespaceRegistry,
    ) -> ValidationResult<Resolve> {
        let mut collector = ResolvedCollector::new();
        self.resolve_table(scope, names, matcher, &Path::empty(), registry, &mut collector)?;
        collector
            .into_vec()
            .into_iter()
            .next()
            .ok_or_else(|| ValidationError::ObjectNotFound {
                name: names.join("."),
            })
    }

    /// Namespace named exactly `names` as seen from `scope`
    ///
    /// WITH scopes, recursive ones included, yield the item's plain
    /// namespace.
    pub fn get_table_namespace(
        &self,
        scope: ScopeId,
        names: &[String],
        matcher: &dyn NameMatcher,
        registry: &dyn NamespaceRegistry,
    ) -> ValidationResult<Option<NamespaceId>> {
        for id in self.ancestors(scope) {
            let s = self.scope(id)?;
            match &s.role {
                ScopeRole::WithItem { item, name } | ScopeRole::RecursiveWithItem { item, name }
                    if names.len() == 1 && names[0] == *name =>
                {
                    let namespace = registry.namespace_of(*item).ok_or_else(|| {
                        ValidationError::internal(format!(
                            "WITH item {name} ({item}) has no namespace"
                        ))
                    })?;
                    return Ok(Some(namespace));
                }
                _ => {}
            }
            if let Some(child) = s.children.iter().find(|c| matcher.list_matches(&c.names, names)) {
                return Ok(Some(child.namespace));
            }
        }
        Ok(None)
    }

    /// Like [`get_table_namespace`](Self::get_table_namespace), failing
    /// with [`ValidationError::ObjectNotFound`]
    pub fn get_table_namespace_or_err(
        &self,
        scope: ScopeId,
        names: &[String],
        matcher: &dyn NameMatcher,
        registry: &dyn NamespaceRegistry,
    ) -> ValidationResult<NamespaceId> {
        self.get_table_namespace(scope, names, matcher, registry)?
            .ok_or_else(|| ValidationError::ObjectNotFound {
                name: names.join("."),
            })
    }

    /// Resolve an unqualified column name as seen from `scope`
    ///
    /// Searches the bindings of each scope outward; the first scope with a
    /// match wins, and two matching bindings in that scope are ambiguous.
    /// Catalog tables are never searched.
    pub fn resolve_column(
        &self,
        scope: ScopeId,
        name: &str,
        matcher: &dyn NameMatcher,
        registry: &dyn NamespaceRegistry,
    ) -> ValidationResult<Option<ColumnResolution>> {
        for id in self.ancestors(scope) {
            let s = self.scope(id)?;
            if s.role == ScopeRole::Catalog {
                break;
            }
            let mut found: Option<ColumnResolution> = None;
            for child in &s.children {
                let Some(row_type) = registry.row_type(child.namespace) else {
                    continue;
                };
                let Some(field) = row_type.field(name, matcher.is_case_sensitive()) else {
                    continue;
                };
                if found.is_some() {
                    return Err(ValidationError::AmbiguousColumn {
                        name: name.to_string(),
                    });
                }
                found = Some(ColumnResolution {
                    scope: id,
                    namespace: child.namespace,
                    table: child.display_name(),
                    field: field.clone(),
                    nullable: child.nullable,
                });
            }
            if found.is_some() {
                return Ok(found);
            }
            trace!("column {} not in {}, delegating", name, id);
        }
        Ok(None)
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}
