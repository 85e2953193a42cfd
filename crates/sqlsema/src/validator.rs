//! SQL Validator
//!
//! The [`Validator`] owns the AST of one statement together with the scope
//! tree and namespaces built while validating it. It resolves every table
//! and column reference through the scope chain, and checks every call with
//! its operator's operand type checker, which may rewrite operands in place.

use indexmap::IndexMap;
use log::{debug, trace};
use sqlsema_ast::{
    Ast, CallNode, DataTypeSpec, Identifier, Literal, NodeId, SelectItem, SelectNode, SetOpKind,
    SetOpNode, SqlNode, WithItemNode, WithNode,
};
use sqlsema_diagnostics::Diagnostic;
use sqlsema_types::semantic::{
    NamespaceId, NamespaceKind, NamespaceRegistry, Namespaces, ScopeArena, ScopeId, ScopeRole,
};
use sqlsema_types::{
    CallBinding, ImplicitCastCoercion, SqlType, SqlTypeFamily, SqlTypeName, TypeCoercion,
    ValidationError, ValidationResult,
};
use std::sync::Arc;

use crate::config::ValidatorConfig;
use crate::operators::SqlOperatorTable;

/// Validates queries and expressions of one statement
#[derive(Debug)]
pub struct Validator {
    config: ValidatorConfig,
    ast: Ast,
    operators: SqlOperatorTable,
    coercion: Arc<dyn TypeCoercion>,
    scopes: ScopeArena,
    namespaces: Namespaces,
    /// Derived type of every validated node
    node_types: IndexMap<NodeId, SqlType>,
    /// FROM entries that resolved to the recursive leg of a WITH item
    recursive_references: Vec<(NodeId, NamespaceId)>,
}

impl Validator {
    /// Create a validator with the standard operators and an empty AST
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            config,
            ast: Ast::new(),
            operators: SqlOperatorTable::standard(),
            coercion: Arc::new(ImplicitCastCoercion::new()),
            scopes: ScopeArena::new(),
            namespaces: Namespaces::new(),
            node_types: IndexMap::new(),
            recursive_references: Vec::new(),
        }
    }

    /// Validate `ast` instead of an empty one
    pub fn with_ast(mut self, ast: Ast) -> Self {
        self.ast = ast;
        self
    }

    /// Resolve calls against `operators` instead of the standard table
    pub fn with_operator_table(mut self, operators: SqlOperatorTable) -> Self {
        self.operators = operators;
        self
    }

    /// Replace the engine that inserts implicit casts
    pub fn with_coercion_engine(mut self, coercion: Arc<dyn TypeCoercion>) -> Self {
        self.coercion = coercion;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Get the AST, including any inserted casts
    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// Get the AST for building the statement
    pub fn ast_mut(&mut self) -> &mut Ast {
        &mut self.ast
    }

    /// Get the operator table
    pub fn operators(&self) -> &SqlOperatorTable {
        &self.operators
    }

    /// Get the scopes created so far
    pub fn scopes(&self) -> &ScopeArena {
        &self.scopes
    }

    /// Get the namespaces created so far
    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    /// Derived type of a validated node
    pub fn node_type(&self, node: NodeId) -> Option<&SqlType> {
        self.node_types.get(&node)
    }

    /// FROM entries referencing a recursive WITH item from inside its own
    /// body, with the recursive namespace each resolved to
    pub fn recursive_references(&self) -> &[(NodeId, NamespaceId)] {
        &self.recursive_references
    }

    /// Register a catalog table visible from every scope
    pub fn add_table<I, S>(&mut self, names: I, row_type: SqlType) -> ValidationResult<NamespaceId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let root = self.scopes.root();
        let ns = self.namespaces.register_table(names.clone(), row_type);
        self.scopes.add_child(root, names, ns, false)?;
        Ok(ns)
    }

    /// Diagnostic for `error`, positioned at `node` in `sql`
    pub fn diagnostic(
        &self,
        error: &ValidationError,
        node: Option<NodeId>,
        sql: &str,
    ) -> Diagnostic {
        let span = node.and_then(|n| self.ast.span(n)).filter(|s| !s.is_empty());
        error.to_diagnostic(span, sql)
    }

    // === Queries ===

    /// Validate a top-level query, returning its row type
    pub fn validate_query(&mut self, query: NodeId) -> ValidationResult<SqlType> {
        let root = self.scopes.root();
        self.validate_query_in(root, query)
    }

    fn node(&self, id: NodeId) -> ValidationResult<&SqlNode> {
        self.ast
            .get(id)
            .ok_or_else(|| ValidationError::internal(format!("unknown node {id}")))
    }

    fn validate_query_in(&mut self, scope: ScopeId, query: NodeId) -> ValidationResult<SqlType> {
        let row_type = match self.node(query)?.clone() {
            SqlNode::Select(select) => self.validate_select(scope, query, &select)?,
            SqlNode::SetOp(set_op) => self.validate_set_op(scope, &set_op)?,
            SqlNode::With(with) => self.validate_with(scope, &with)?,
            other => {
                return Err(ValidationError::NotAQuery {
                    node: query.to_string(),
                    kind: other.kind_name(),
                });
            }
        };
        self.node_types.insert(query, row_type.clone());
        Ok(row_type)
    }

    fn validate_select(
        &mut self,
        parent: ScopeId,
        node: NodeId,
        select: &SelectNode,
    ) -> ValidationResult<SqlType> {
        let scope = self.scopes.new_base(parent, Some(node))?;
        for &from in &select.from {
            self.validate_from(parent, scope, node, from)?;
        }
        if let Some(condition) = select.where_clause {
            self.derive_type(scope, condition)?;
        }

        let mut fields: Vec<(String, SqlType)> = Vec::new();
        for (i, item) in select.items.iter().enumerate() {
            match item {
                SelectItem::Star => {
                    let children = self
                        .scopes
                        .get(scope)
                        .map(|s| s.children().to_vec())
                        .unwrap_or_default();
                    for child in children {
                        let row_type = self
                            .namespaces
                            .row_type(child.namespace)
                            .cloned()
                            .unwrap_or_else(SqlType::empty_row);
                        for field in row_type.fields {
                            let name = unique_name(&field.name, &fields);
                            let nullable = field.field_type.nullable || child.nullable;
                            fields.push((name, field.field_type.with_nullable(nullable)));
                        }
                    }
                }
                SelectItem::Expr { expr, alias } => {
                    let ty = self.derive_type(scope, *expr)?;
                    let name = match (alias, self.node(*expr)?) {
                        (Some(alias), _) => alias.clone(),
                        (None, SqlNode::Identifier(id)) => {
                            id.names().last().cloned().unwrap_or_else(|| format!("EXPR${i}"))
                        }
                        (None, _) => format!("EXPR${i}"),
                    };
                    fields.push((unique_name(&name, &fields), ty));
                }
            }
        }
        Ok(SqlType::row(fields))
    }

    /// Resolve one FROM entry of the SELECT at `select_node`, binding it in
    /// `select_scope`; table names are looked up from `parent`
    fn validate_from(
        &mut self,
        parent: ScopeId,
        select_scope: ScopeId,
        select_node: NodeId,
        from: NodeId,
    ) -> ValidationResult<()> {
        match self.node(from)?.clone() {
            SqlNode::TableRef(table) => {
                let matcher = self.config.name_matcher();
                let resolve = self.scopes.resolve_table_or_err(
                    parent,
                    table.name.names(),
                    matcher,
                    &self.namespaces,
                )?;
                if !resolve.remaining_names.is_empty() {
                    return Err(ValidationError::ObjectNotFound {
                        name: table.name.to_string(),
                    });
                }
                if self
                    .namespaces
                    .namespace(resolve.namespace)
                    .is_some_and(|ns| ns.is_recursive())
                {
                    debug!("{} references recursive namespace {}", table.name, resolve.namespace);
                    self.recursive_references.push((from, resolve.namespace));
                }

                let exposed = table.exposed_name().map(str::to_string).ok_or_else(|| {
                    ValidationError::internal(format!("table reference {from} has no name"))
                })?;
                if let Some(row_type) = self.namespaces.row_type(resolve.namespace).cloned() {
                    self.node_types.insert(from, row_type);
                }
                self.scopes.add_child(select_scope, [exposed], resolve.namespace, false)
            }
            SqlNode::SubqueryRef(subquery) => {
                let row_type = self.validate_query_in(parent, subquery.query)?;
                let ns = self
                    .namespaces
                    .register(from, NamespaceKind::Query, Some(select_node));
                self.namespaces.set_row_type(ns, row_type.clone())?;
                self.node_types.insert(from, row_type);
                self.scopes.add_child(select_scope, [subquery.alias], ns, false)
            }
            other => Err(ValidationError::NotAQuery {
                node: from.to_string(),
                kind: other.kind_name(),
            }),
        }
    }

    fn validate_set_op(&mut self, scope: ScopeId, set_op: &SetOpNode) -> ValidationResult<SqlType> {
        let left = self.validate_query_in(scope, set_op.left)?;
        let right = self.validate_query_in(scope, set_op.right)?;
        if left.field_count() != right.field_count() {
            return Err(ValidationError::SetOperandMismatch {
                operation: set_op_name(set_op),
            });
        }
        Ok(SqlType::row(left.fields.iter().zip(&right.fields).map(
            |(l, r)| {
                let nullable = l.field_type.nullable || r.field_type.nullable;
                (l.name.clone(), l.field_type.clone().with_nullable(nullable))
            },
        )))
    }

    /// Bind WITH items left to right, then validate the body in a scope
    /// exposing all of them
    fn validate_with(&mut self, parent: ScopeId, with: &WithNode) -> ValidationResult<SqlType> {
        let mut scope = parent;
        for &item in &with.items {
            scope = self.validate_with_item(scope, item)?;
        }
        self.validate_query_in(scope, with.body)
    }

    /// Validate one WITH item in `parent`, which exposes the items before
    /// it, and return the scope exposing it as well
    fn validate_with_item(&mut self, parent: ScopeId, item: NodeId) -> ValidationResult<ScopeId> {
        let with_item: WithItemNode = match self.node(item)? {
            SqlNode::WithItem(with_item) => with_item.clone(),
            other => {
                return Err(ValidationError::NotAQuery {
                    node: item.to_string(),
                    kind: other.kind_name(),
                });
            }
        };
        let name = with_item.name.to_string();
        let ns = self.namespaces.register(item, NamespaceKind::WithItem, None);

        let row_type = if with_item.recursive {
            self.validate_recursive_body(parent, item, &name, &with_item)?
        } else {
            self.validate_query_in(parent, with_item.query)?
        };
        let row_type = apply_column_list(&name, with_item.columns.as_deref(), row_type)?;
        self.namespaces.set_row_type(ns, row_type.clone())?;
        self.node_types.insert(item, row_type);

        self.scopes.new_with_item(parent, item, name)
    }

    /// The anchor leg is validated where the item itself is not yet
    /// visible and fixes the row type of the recursive namespace; the whole
    /// body is then validated with the item visible through that namespace.
    fn validate_recursive_body(
        &mut self,
        parent: ScopeId,
        item: NodeId,
        name: &str,
        with_item: &WithItemNode,
    ) -> ValidationResult<SqlType> {
        let anchor = match self.node(with_item.query)? {
            SqlNode::SetOp(set_op) => set_op.left,
            _ => {
                return Err(ValidationError::RecursiveWithoutAnchor {
                    name: name.to_string(),
                });
            }
        };

        let recursive_ns = self.namespaces.get_or_create_recursive(item)?;
        let anchor_type = self.validate_query_in(parent, anchor)?;
        let anchor_type = apply_column_list(name, with_item.columns.as_deref(), anchor_type)?;
        self.namespaces.set_row_type(recursive_ns, anchor_type)?;

        let scope = self.scopes.new_recursive_with_item(parent, item, name)?;
        self.validate_query_in(scope, with_item.query)
    }

    // === Expressions ===

    /// Validate an expression in `scope`, returning its type
    pub fn validate_expression(
        &mut self,
        scope: ScopeId,
        expr: NodeId,
    ) -> ValidationResult<SqlType> {
        self.derive_type(scope, expr)
    }

    /// Derive the type of an expression, recording it for the node
    pub fn derive_type(&mut self, scope: ScopeId, expr: NodeId) -> ValidationResult<SqlType> {
        let ty = match self.node(expr)?.clone() {
            SqlNode::Literal(literal) => literal_type(&literal),
            SqlNode::Identifier(id) => self.resolve_identifier(scope, &id)?,
            SqlNode::Cast(cast) => {
                let operand = self.derive_type(scope, cast.operand)?;
                SqlType::from_spec(&cast.target, operand.nullable)
            }
            SqlNode::Cursor(query) => {
                self.validate_query_in(scope, query)?;
                SqlType::cursor()
            }
            SqlNode::Default => SqlType::any(),
            SqlNode::Call(call) => self.validate_call(scope, expr, &call)?,
            other => {
                return Err(ValidationError::NotAnExpression {
                    node: expr.to_string(),
                    kind: other.kind_name(),
                });
            }
        };
        trace!("{} : {}", expr, ty.full_type_string());
        self.node_types.insert(expr, ty.clone());
        Ok(ty)
    }

    fn derive_type_cached(&mut self, scope: ScopeId, expr: NodeId) -> ValidationResult<SqlType> {
        match self.node_types.get(&expr) {
            Some(ty) => Ok(ty.clone()),
            None => self.derive_type(scope, expr),
        }
    }

    fn resolve_identifier(&mut self, scope: ScopeId, id: &Identifier) -> ValidationResult<SqlType> {
        let matcher = self.config.name_matcher();
        match id.names() {
            [] => Err(ValidationError::internal("empty identifier")),
            [column] => {
                let resolution = self
                    .scopes
                    .resolve_column(scope, column, matcher, &self.namespaces)?
                    .ok_or_else(|| ValidationError::ColumnNotFound {
                        name: column.clone(),
                    })?;
                let nullable = resolution.field.field_type.nullable || resolution.nullable;
                Ok(resolution.field.field_type.with_nullable(nullable))
            }
            names => {
                let qualifier = names[..names.len() - 1].join(".");
                let resolve = self
                    .scopes
                    .resolve_table_or_err(scope, names, matcher, &self.namespaces)
                    .map_err(|err| match err {
                        ValidationError::ObjectNotFound { .. } => ValidationError::ObjectNotFound {
                            name: qualifier.clone(),
                        },
                        other => other,
                    })?;
                // catalog tables are only visible through FROM
                let from_catalog = self
                    .scopes
                    .get(resolve.scope)
                    .is_some_and(|s| *s.role() == ScopeRole::Catalog);
                if from_catalog {
                    return Err(ValidationError::ObjectNotFound { name: qualifier });
                }
                let [column] = resolve.remaining_names.as_slice() else {
                    return Err(ValidationError::ColumnNotFound {
                        name: id.to_string(),
                    });
                };
                let row_type = self.namespaces.row_type(resolve.namespace).ok_or_else(|| {
                    ValidationError::internal(format!("unknown namespace {}", resolve.namespace))
                })?;
                let field = row_type
                    .field(column, matcher.is_case_sensitive())
                    .ok_or_else(|| ValidationError::ColumnNotFoundInTable {
                        column: column.clone(),
                        table: resolve.path.to_string(),
                    })?;
                let ty = &field.field_type;
                Ok(ty.clone().with_nullable(ty.nullable || resolve.nullable))
            }
        }
    }

    /// Check a call's operands and infer its type
    ///
    /// Every written operand is validated before the operator's checker
    /// runs, so a failure inside an operand is reported as such. Omitted
    /// optional operands are presented to the checker as DEFAULT
    /// placeholders; the AST keeps only the operands actually written.
    fn validate_call(
        &mut self,
        scope: ScopeId,
        node: NodeId,
        call: &CallNode,
    ) -> ValidationResult<SqlType> {
        let operator = self
            .operators
            .lookup(&call.operator)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownFunction {
                name: call.operator.clone(),
            })?;

        let range = operator.operand_count_range();
        let count = call.operands.len();
        if !range.is_valid_count(count) {
            return Err(ValidationError::WrongArgumentCount {
                operator: operator.name.clone(),
                expected: range.to_string(),
                found: count,
            });
        }

        let mut operands = call.operands.clone();
        let padded_len = range.max.unwrap_or(count);
        if count < padded_len && (count..padded_len).all(|i| operator.checker.is_optional(i)) {
            let default = self.ast.default_operand();
            operands.resize(padded_len, default);
        }

        // operands the checker ignores are keywords such as time units
        let symbols: Vec<bool> = (0..operands.len())
            .map(|i| operator.checker.operand_family(i) == Some(SqlTypeFamily::Ignore))
            .collect();

        for (&operand, &symbol) in call.operands.iter().zip(&symbols) {
            if !symbol {
                self.derive_type(scope, operand)?;
            }
        }

        let mut binding = ValidatorCallBinding {
            validator: self,
            scope,
            call: node,
            operator_name: operator.name.clone(),
            operands,
            symbols: symbols.clone(),
        };
        if !operator.checker.check_operand_types(&mut binding)? {
            debug!("no operand checker of {} applies to {} operands", operator.name, count);
        }

        let written = self.ast.operands(node).map(<[NodeId]>::to_vec).unwrap_or_default();
        let mut operand_types = Vec::with_capacity(written.len());
        for (i, operand) in written.into_iter().enumerate() {
            if symbols.get(i).copied().unwrap_or(false) {
                operand_types.push(SqlType::new(SqlTypeName::Symbol));
            } else {
                operand_types.push(self.derive_type_cached(scope, operand)?);
            }
        }
        operator.return_type.infer(&operand_types)
    }
}

/// [`CallBinding`] over a call node of a validator's AST
struct ValidatorCallBinding<'a> {
    validator: &'a mut Validator,
    scope: ScopeId,
    call: NodeId,
    operator_name: String,
    /// Written operands followed by DEFAULT placeholders
    operands: Vec<NodeId>,
    /// Positions typed as SYMBOL without being resolved
    symbols: Vec<bool>,
}

impl ValidatorCallBinding<'_> {
    fn operand_node(&self, index: usize) -> Option<&SqlNode> {
        self.operands
            .get(index)
            .and_then(|&id| self.validator.ast.get(id))
    }
}

impl CallBinding for ValidatorCallBinding<'_> {
    fn operator_name(&self) -> &str {
        &self.operator_name
    }

    fn operand_count(&self) -> usize {
        self.operands.len()
    }

    fn operand(&self, index: usize) -> Option<NodeId> {
        self.operands.get(index).copied()
    }

    fn is_null_literal(&self, index: usize) -> bool {
        self.operand_node(index).is_some_and(SqlNode::is_null_literal)
    }

    fn is_default(&self, index: usize) -> bool {
        matches!(self.operand_node(index), Some(SqlNode::Default))
    }

    fn derive_operand_type(&mut self, index: usize) -> ValidationResult<SqlType> {
        let operand = self.operand(index).ok_or_else(|| {
            ValidationError::internal(format!("{} has no operand {index}", self.operator_name))
        })?;
        if self.symbols.get(index).copied().unwrap_or(false) {
            return Ok(SqlType::new(SqlTypeName::Symbol));
        }
        self.validator.derive_type_cached(self.scope, operand)
    }

    fn is_type_coercion_enabled(&self) -> bool {
        self.validator.config.type_coercion
    }

    fn type_coercion(&self) -> Arc<dyn TypeCoercion> {
        Arc::clone(&self.validator.coercion)
    }

    fn cast_operand(&mut self, index: usize, target: &SqlType) -> ValidationResult<bool> {
        if self.is_default(index) {
            return Ok(false);
        }
        let Some(operand) = self.operand(index) else {
            return Ok(false);
        };
        let mut spec = DataTypeSpec::new(target.type_name);
        spec.precision = target.precision;
        spec.scale = target.scale;

        let ast = &mut self.validator.ast;
        let cast = ast.implicit_cast(operand, spec);
        if !ast.replace_operand(self.call, index, cast) {
            return Ok(false);
        }
        self.operands[index] = cast;
        debug!("{} operand {} is now {}", self.operator_name, index, cast);
        self.validator.derive_type(self.scope, cast)?;
        Ok(true)
    }
}

fn literal_type(literal: &Literal) -> SqlType {
    match literal {
        Literal::Null => SqlType::null(),
        Literal::Boolean(_) => SqlType::new(SqlTypeName::Boolean),
        Literal::Integer(value) => {
            if i32::try_from(*value).is_ok() {
                SqlType::new(SqlTypeName::Integer)
            } else {
                SqlType::new(SqlTypeName::BigInt)
            }
        }
        Literal::Decimal(value) => {
            let digits = value.mantissa().unsigned_abs().to_string().len() as u32;
            let scale = value.scale();
            SqlType::new(SqlTypeName::Decimal)
                .with_precision(digits.max(scale).max(1))
                .with_scale(scale)
        }
        Literal::Double(_) => SqlType::new(SqlTypeName::Double),
        Literal::String(value) => {
            SqlType::new(SqlTypeName::Char).with_precision(value.chars().count() as u32)
        }
        Literal::Binary(bytes) => {
            SqlType::new(SqlTypeName::Binary).with_precision(bytes.len() as u32)
        }
        Literal::Date(_) => SqlType::new(SqlTypeName::Date),
        Literal::Time(_) => SqlType::new(SqlTypeName::Time),
        Literal::Timestamp(_) => SqlType::new(SqlTypeName::Timestamp),
    }
}

/// Rename the fields of a WITH item's row type after its column list
fn apply_column_list(
    name: &str,
    columns: Option<&[String]>,
    row_type: SqlType,
) -> ValidationResult<SqlType> {
    let Some(columns) = columns else {
        return Ok(row_type);
    };
    row_type
        .rename_fields(columns)
        .ok_or_else(|| ValidationError::ColumnCountMismatch {
            name: name.to_string(),
            declared: columns.len(),
            actual: row_type.field_count(),
        })
}

/// `name`, suffixed with a counter when already taken
fn unique_name(name: &str, fields: &[(String, SqlType)]) -> String {
    let taken = |candidate: &str| fields.iter().any(|(n, _)| n == candidate);
    if !taken(name) {
        return name.to_string();
    }
    (0..)
        .map(|i| format!("{name}{i}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| name.to_string())
}

fn set_op_name(set_op: &SetOpNode) -> String {
    let kind = match set_op.kind {
        SetOpKind::Union => "UNION",
        SetOpKind::Intersect => "INTERSECT",
        SetOpKind::Except => "EXCEPT",
    };
    if set_op.all {
        format!("{kind} ALL")
    } else {
        kind.to_string()
    }
}
