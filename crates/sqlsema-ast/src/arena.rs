//! Node arena

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    CallNode, CastNode, DataTypeSpec, Identifier, Literal, SelectItem, SelectNode, SetOpKind,
    SetOpNode, Span, Spanned, SqlNode, SubqueryRefNode, TableRefNode, WithItemNode, WithNode,
};

/// Stable index of a node in an [`Ast`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in its arena
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Arena owning every node of one statement
///
/// Nodes are never removed; rewriting replaces the child id stored in the
/// parent, so ids handed out earlier stay valid.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Spanned<SqlNode>>,
}

impl Ast {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node with the span it was parsed from
    pub fn add_at(&mut self, node: SqlNode, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Spanned::new(node, span));
        id
    }

    /// Add a node without source position
    pub fn add(&mut self, node: SqlNode) -> NodeId {
        self.add_at(node, Span::synthetic())
    }

    /// Get a node by id
    pub fn get(&self, id: NodeId) -> Option<&SqlNode> {
        self.nodes.get(id.index()).map(|n| &n.inner)
    }

    /// Get a node by id for rewriting
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SqlNode> {
        self.nodes.get_mut(id.index()).map(|n| &mut n.inner)
    }

    /// Get the source span of a node
    pub fn span(&self, id: NodeId) -> Option<Span> {
        self.nodes.get(id.index()).map(|n| n.span)
    }

    /// Operand ids of a call node
    pub fn operands(&self, call: NodeId) -> Option<&[NodeId]> {
        self.get(call)
            .and_then(SqlNode::as_call)
            .map(|c| c.operands.as_slice())
    }

    /// Point operand `index` of `call` at `replacement`
    ///
    /// Returns false if `call` is not a call or has no such operand.
    pub fn replace_operand(&mut self, call: NodeId, index: usize, replacement: NodeId) -> bool {
        match self.get_mut(call) {
            Some(SqlNode::Call(c)) => match c.operands.get_mut(index) {
                Some(slot) => {
                    *slot = replacement;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    // === Builders ===

    /// Add a literal
    pub fn literal(&mut self, literal: Literal) -> NodeId {
        self.add(SqlNode::Literal(literal))
    }

    /// Add a NULL literal
    pub fn null(&mut self) -> NodeId {
        self.literal(Literal::Null)
    }

    /// Add a simple or compound identifier
    pub fn identifier(&mut self, id: impl Into<Identifier>) -> NodeId {
        self.add(SqlNode::Identifier(id.into()))
    }

    /// Add a function call
    pub fn call(&mut self, operator: impl Into<String>, operands: Vec<NodeId>) -> NodeId {
        self.add(SqlNode::Call(CallNode::new(operator, operands)))
    }

    /// Add an explicit CAST
    pub fn cast(&mut self, operand: NodeId, target: DataTypeSpec) -> NodeId {
        let span = self.span(operand).unwrap_or_default();
        self.add_at(
            SqlNode::Cast(CastNode {
                operand,
                target,
                implicit: false,
            }),
            span,
        )
    }

    /// CAST inserted by coercion; keeps the operand's span
    pub fn implicit_cast(&mut self, operand: NodeId, target: DataTypeSpec) -> NodeId {
        let span = self.span(operand).unwrap_or_default();
        self.add_at(
            SqlNode::Cast(CastNode {
                operand,
                target,
                implicit: true,
            }),
            span,
        )
    }

    /// Add a CURSOR over a query
    pub fn cursor(&mut self, query: NodeId) -> NodeId {
        self.add(SqlNode::Cursor(query))
    }

    /// Add a DEFAULT placeholder
    pub fn default_operand(&mut self) -> NodeId {
        self.add(SqlNode::Default)
    }

    /// Add a FROM-list table reference
    pub fn table_ref(&mut self, name: impl Into<Identifier>, alias: Option<&str>) -> NodeId {
        self.add(SqlNode::TableRef(TableRefNode {
            name: name.into(),
            alias: alias.map(str::to_string),
        }))
    }

    /// Add a FROM-list subquery with its alias
    pub fn subquery_ref(&mut self, query: NodeId, alias: impl Into<String>) -> NodeId {
        self.add(SqlNode::SubqueryRef(SubqueryRefNode {
            query,
            alias: alias.into(),
        }))
    }

    /// Add a SELECT without WHERE
    pub fn select(&mut self, items: Vec<SelectItem>, from: Vec<NodeId>) -> NodeId {
        self.add(SqlNode::Select(SelectNode {
            items,
            from,
            where_clause: None,
        }))
    }

    /// Add a SELECT with a WHERE condition
    pub fn select_where(
        &mut self,
        items: Vec<SelectItem>,
        from: Vec<NodeId>,
        where_clause: NodeId,
    ) -> NodeId {
        self.add(SqlNode::Select(SelectNode {
            items,
            from,
            where_clause: Some(where_clause),
        }))
    }

    /// Add `left UNION ALL right`
    pub fn union_all(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.add(SqlNode::SetOp(SetOpNode {
            kind: SetOpKind::Union,
            all: true,
            left,
            right,
        }))
    }

    /// Add a WITH item
    pub fn with_item(
        &mut self,
        name: &str,
        columns: Option<Vec<String>>,
        query: NodeId,
        recursive: bool,
    ) -> NodeId {
        self.add(SqlNode::WithItem(WithItemNode {
            name: Identifier::simple(name),
            columns,
            query,
            recursive,
        }))
    }

    /// Add a WITH query
    pub fn with(&mut self, items: Vec<NodeId>, body: NodeId) -> NodeId {
        self.add(SqlNode::With(WithNode { items, body }))
    }
}

impl SelectItem {
    /// Unaliased select item
    pub fn expr(expr: NodeId) -> Self {
        Self::Expr { expr, alias: None }
    }

    /// Select item with an alias
    pub fn aliased(expr: NodeId, alias: impl Into<String>) -> Self {
        Self::Expr {
            expr,
            alias: Some(alias.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_replace_operand_keeps_other_ids() {
        let mut ast = Ast::new();
        let a = ast.literal(Literal::Integer(1));
        let b = ast.literal(Literal::string("2"));
        let call = ast.call("MOD", vec![a, b]);

        let cast = ast.implicit_cast(b, DataTypeSpec::new(crate::SqlTypeName::Decimal));
        assert!(ast.replace_operand(call, 1, cast));
        assert_eq!(ast.operands(call), Some(&[a, cast][..]));
        assert!(matches!(ast.get(b), Some(SqlNode::Literal(Literal::String(_)))));
    }

    #[test]
    fn test_replace_operand_out_of_range() {
        let mut ast = Ast::new();
        let a = ast.null();
        let call = ast.call("UPPER", vec![a]);
        assert!(!ast.replace_operand(call, 3, a));
        assert!(!ast.replace_operand(a, 0, a));
    }

    #[test]
    fn test_implicit_cast_inherits_span() {
        let mut ast = Ast::new();
        let lit = ast.add_at(SqlNode::Literal(Literal::Integer(7)), Span::new(10, 11));
        let cast = ast.implicit_cast(lit, DataTypeSpec::new(crate::SqlTypeName::Varchar));
        assert_eq!(ast.span(cast), Some(Span::new(10, 11)));
        assert!(matches!(
            ast.get(cast),
            Some(SqlNode::Cast(CastNode { implicit: true, .. }))
        ));
    }
}
