//! AST node kinds

use crate::{DataTypeSpec, Identifier, Literal, NodeId};

/// All node kinds the validator understands
#[derive(Debug, Clone, PartialEq)]
pub enum SqlNode {
    // === Expressions ===
    Literal(Literal),
    /// Column or table reference
    Identifier(Identifier),
    /// Operator or function invocation
    Call(CallNode),
    /// Explicit or validator-inserted conversion
    Cast(CastNode),
    /// `CURSOR(query)` argument
    Cursor(NodeId),
    /// Placeholder for an omitted optional operand
    Default,

    // === Queries ===
    Select(SelectNode),
    SetOp(SetOpNode),
    With(WithNode),
    WithItem(WithItemNode),

    // === FROM entries ===
    TableRef(TableRefNode),
    SubqueryRef(SubqueryRefNode),
}

impl SqlNode {
    /// Check if the node can stand where a query is expected
    pub fn is_query(&self) -> bool {
        matches!(self, Self::Select(_) | Self::SetOp(_) | Self::With(_))
    }

    /// Whether this is the untyped NULL literal
    pub fn is_null_literal(&self) -> bool {
        matches!(self, Self::Literal(Literal::Null))
    }

    /// Get the call, if this node is one
    pub fn as_call(&self) -> Option<&CallNode> {
        match self {
            Self::Call(call) => Some(call),
            _ => None,
        }
    }

    /// Short kind name for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Literal(_) => "literal",
            Self::Identifier(_) => "identifier",
            Self::Call(_) => "call",
            Self::Cast(_) => "cast",
            Self::Cursor(_) => "cursor",
            Self::Default => "default",
            Self::Select(_) => "select",
            Self::SetOp(_) => "set operation",
            Self::With(_) => "with",
            Self::WithItem(_) => "with item",
            Self::TableRef(_) => "table reference",
            Self::SubqueryRef(_) => "subquery",
        }
    }
}

/// `name(operand, ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct CallNode {
    pub operator: String,
    pub operands: Vec<NodeId>,
}

impl CallNode {
    /// Create a call node
    pub fn new(operator: impl Into<String>, operands: Vec<NodeId>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }
}

/// `CAST(operand AS target)`
#[derive(Debug, Clone, PartialEq)]
pub struct CastNode {
    pub operand: NodeId,
    pub target: DataTypeSpec,
    /// Inserted by type coercion rather than written by the user
    pub implicit: bool,
}

/// One entry of a SELECT list
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    Expr { expr: NodeId, alias: Option<String> },
    /// `*`
    Star,
}

/// A SELECT query block
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectNode {
    pub items: Vec<SelectItem>,
    /// FROM entries, each a [`SqlNode::TableRef`] or [`SqlNode::SubqueryRef`]
    pub from: Vec<NodeId>,
    pub where_clause: Option<NodeId>,
}

/// Kind of a set operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOpKind {
    Union,
    Intersect,
    Except,
}

/// `left UNION [ALL] right` and friends
#[derive(Debug, Clone, PartialEq)]
pub struct SetOpNode {
    pub kind: SetOpKind,
    pub all: bool,
    pub left: NodeId,
    pub right: NodeId,
}

/// `WITH [RECURSIVE] item, ... body`
#[derive(Debug, Clone, PartialEq)]
pub struct WithNode {
    /// [`SqlNode::WithItem`] nodes in declaration order
    pub items: Vec<NodeId>,
    pub body: NodeId,
}

/// `name [(col, ...)] AS (query)`
#[derive(Debug, Clone, PartialEq)]
pub struct WithItemNode {
    pub name: Identifier,
    pub columns: Option<Vec<String>>,
    pub query: NodeId,
    /// Declared under `WITH RECURSIVE`
    pub recursive: bool,
}

/// `FROM name [AS alias]`
#[derive(Debug, Clone, PartialEq)]
pub struct TableRefNode {
    pub name: Identifier,
    pub alias: Option<String>,
}

impl TableRefNode {
    /// Name the entry is visible under inside its SELECT
    pub fn exposed_name(&self) -> Option<&str> {
        self.alias
            .as_deref()
            .or_else(|| self.name.names.last().map(String::as_str))
    }
}

/// `FROM (query) AS alias`
#[derive(Debug, Clone, PartialEq)]
pub struct SubqueryRefNode {
    pub query: NodeId,
    pub alias: String,
}
