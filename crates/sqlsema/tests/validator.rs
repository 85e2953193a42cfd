//! End-to-end validation of queries over a small EMP/DEPT catalog

use pretty_assertions::assert_eq;
use rstest::rstest;
use sqlsema::ast::{CallNode, Identifier, Literal, NodeId, SelectItem, Span, SqlNode, SqlTypeName};
use sqlsema::diagnostics::{SQL0102, SQL0110, SQL0112};
use sqlsema::types::semantic::NamespaceRegistry;
use sqlsema::{SqlType, ValidationError, Validator, ValidatorConfig};

fn emp_row() -> SqlType {
    SqlType::row([
        ("EMPNO", SqlType::new(SqlTypeName::Integer)),
        ("ENAME", SqlType::nullable(SqlTypeName::Varchar).with_precision(20)),
        ("DEPTNO", SqlType::new(SqlTypeName::Integer)),
        ("HIREDATE", SqlType::new(SqlTypeName::Date)),
    ])
}

fn dept_row() -> SqlType {
    SqlType::row([
        ("DEPTNO", SqlType::new(SqlTypeName::Integer)),
        ("DNAME", SqlType::new(SqlTypeName::Varchar).with_precision(10)),
    ])
}

fn validator(config: ValidatorConfig) -> Validator {
    let mut validator = Validator::new(config);
    validator.add_table(["EMP"], emp_row()).unwrap();
    validator.add_table(["DEPT"], dept_row()).unwrap();
    validator
}

fn default_validator() -> Validator {
    validator(ValidatorConfig::default())
}

fn string(validator: &mut Validator, s: &str) -> NodeId {
    validator.ast_mut().literal(Literal::string(s))
}

fn int(validator: &mut Validator, i: i64) -> NodeId {
    validator.ast_mut().literal(Literal::Integer(i))
}

fn ident(validator: &mut Validator, name: &str) -> NodeId {
    validator.ast_mut().identifier(name)
}

fn qualified(validator: &mut Validator, parts: &[&str]) -> NodeId {
    validator
        .ast_mut()
        .identifier(Identifier::compound(parts.iter().copied()))
}

/// `SELECT <exprs> FROM <table>`
fn select_from(validator: &mut Validator, exprs: Vec<NodeId>, table: &str) -> NodeId {
    let ast = validator.ast_mut();
    let from = ast.table_ref(table, None);
    ast.select(exprs.into_iter().map(SelectItem::expr).collect(), vec![from])
}

/// `SELECT <call>(<operands>) FROM EMP`, returning the query and call nodes
fn call_on_emp(
    validator: &mut Validator,
    operator: &str,
    operands: Vec<NodeId>,
) -> (NodeId, NodeId) {
    let call = validator.ast_mut().call(operator, operands);
    let query = select_from(validator, vec![call], "EMP");
    (query, call)
}

fn field_types(row: &SqlType) -> Vec<(String, String)> {
    row.fields
        .iter()
        .map(|f| (f.name.clone(), f.field_type.full_type_string()))
        .collect()
}

fn cast_target(validator: &Validator, node: NodeId) -> Option<SqlTypeName> {
    match validator.ast().get(node)? {
        SqlNode::Cast(cast) if cast.implicit => Some(cast.target.type_name),
        _ => None,
    }
}

// === Coercion ===

#[test]
fn test_coercion_inserts_cast_in_place() {
    let mut v = default_validator();
    let empno = ident(&mut v, "EMPNO");
    let two = int(&mut v, 2);
    let (query, call) = call_on_emp(&mut v, "LEFT", vec![empno, two]);

    let row = v.validate_query(query).unwrap();

    let operands = v.ast().operands(call).unwrap().to_vec();
    assert_eq!(operands.len(), 2);
    assert_ne!(operands[0], empno);
    assert_eq!(cast_target(&v, operands[0]), Some(SqlTypeName::Varchar));
    assert_eq!(operands[1], two);
    assert_eq!(
        field_types(&row),
        vec![("EXPR$0".to_string(), "VARCHAR NOT NULL".to_string())]
    );
}

#[test]
fn test_coercion_keeps_operand_nullability() {
    let mut v = default_validator();
    let ename = ident(&mut v, "ENAME");
    let (query, call) = call_on_emp(&mut v, "ABS", vec![ename]);

    v.validate_query(query).unwrap();

    let cast = v.ast().operands(call).unwrap()[0];
    assert_eq!(cast_target(&v, cast), Some(SqlTypeName::Decimal));
    let ty = v.node_type(cast).unwrap();
    assert!(ty.nullable);
    assert_eq!(ty.to_string(), "DECIMAL(19, 0)");
}

#[test]
fn test_disabled_coercion_reports_signature() {
    let mut v = validator(ValidatorConfig::default().with_type_coercion(false));
    let empno = ident(&mut v, "EMPNO");
    let two = int(&mut v, 2);
    let (query, call) = call_on_emp(&mut v, "LEFT", vec![empno, two]);

    let err = v.validate_query(query).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot apply 'LEFT' to arguments of type 'LEFT(<INTEGER>, <INTEGER>)'. \
         Supported form(s): 'LEFT(<STRING>, <INTEGER>)'"
    );
    assert_eq!(err.code(), SQL0110);
    // nothing was rewritten
    assert_eq!(v.ast().operands(call).unwrap(), &[empno, two]);
}

#[rstest]
#[case(true, None)]
#[case(
    false,
    Some(ValidationError::NullIllegal { operator: "UPPER".into(), operand: 0 })
)]
fn test_null_operand(#[case] type_coercion: bool, #[case] expected: Option<ValidationError>) {
    let mut v = validator(ValidatorConfig::default().with_type_coercion(type_coercion));
    let null = v.ast_mut().null();
    let call = v.ast_mut().call("UPPER", vec![null]);
    let root = v.scopes().root();

    let result = v.validate_expression(root, call);
    assert_eq!(result.err(), expected);
}

#[test]
fn test_ignored_operand_is_not_resolved() {
    let mut v = default_validator();
    let unit = ident(&mut v, "DAY");
    let hiredate = ident(&mut v, "HIREDATE");
    let date = string(&mut v, "2024-01-01");
    let (query, call) = call_on_emp(&mut v, "DATEDIFF", vec![unit, hiredate, date]);

    let row = v.validate_query(query).unwrap();

    let operands = v.ast().operands(call).unwrap().to_vec();
    assert_eq!(operands[0], unit);
    assert_eq!(cast_target(&v, operands[2]), Some(SqlTypeName::Date));
    assert_eq!(row.fields[0].field_type, SqlType::new(SqlTypeName::Integer));
}

// === Operand counts and composites ===

#[rstest]
#[case("LEFT", 1, "2")]
#[case("SUBSTR", 1, "2 to 3")]
#[case("LTRIM", 3, "1 to 2")]
fn test_wrong_argument_count(#[case] operator: &str, #[case] count: usize, #[case] expected: &str) {
    let mut v = default_validator();
    let operands = (0..count).map(|_| ident(&mut v, "ENAME")).collect();
    let (query, _) = call_on_emp(&mut v, operator, operands);

    assert_eq!(
        v.validate_query(query),
        Err(ValidationError::WrongArgumentCount {
            operator: operator.to_string(),
            expected: expected.to_string(),
            found: count,
        })
    );
}

#[test]
fn test_unknown_function() {
    let mut v = default_validator();
    let one = int(&mut v, 1);
    let (query, _) = call_on_emp(&mut v, "NO_SUCH_FN", vec![one]);
    assert_eq!(
        v.validate_query(query),
        Err(ValidationError::UnknownFunction {
            name: "NO_SUCH_FN".into()
        })
    );
}

#[test]
fn test_omitted_optional_operand() {
    let mut v = default_validator();
    let ename = ident(&mut v, "ENAME");
    let two = int(&mut v, 2);
    let (query, call) = call_on_emp(&mut v, "SUBSTR", vec![ename, two]);

    let row = v.validate_query(query).unwrap();

    // the placeholder never reaches the tree
    assert_eq!(v.ast().operands(call).unwrap(), &[ename, two]);
    assert_eq!(row.fields[0].field_type.full_type_string(), "VARCHAR(20)");
}

#[test]
fn test_composite_accepts_either_form() {
    let mut v = default_validator();
    let ename = ident(&mut v, "ENAME");
    let one_arg = v.ast_mut().call("LTRIM", vec![ename]);
    let ename = ident(&mut v, "ENAME");
    let chars = string(&mut v, "x");
    let two_args = v.ast_mut().call("LTRIM", vec![ename, chars]);
    let query = select_from(&mut v, vec![one_arg, two_args], "EMP");

    let row = v.validate_query(query).unwrap();
    assert_eq!(row.field_count(), 2);
    assert_eq!(cast_target(&v, v.ast().operands(two_args).unwrap()[1]), None);
}

#[test]
fn test_composite_coerces_after_strict_pass() {
    let mut v = default_validator();
    let empno = ident(&mut v, "EMPNO");
    let (query, call) = call_on_emp(&mut v, "LTRIM", vec![empno]);

    v.validate_query(query).unwrap();
    let operand = v.ast().operands(call).unwrap()[0];
    assert_eq!(cast_target(&v, operand), Some(SqlTypeName::Varchar));
}

#[test]
fn test_composite_mismatch_lists_every_form() {
    let mut v = validator(ValidatorConfig::default().with_type_coercion(false));
    let empno = ident(&mut v, "EMPNO");
    let (query, _) = call_on_emp(&mut v, "LTRIM", vec![empno]);

    match v.validate_query(query) {
        Err(ValidationError::SignatureMismatch { allowed, .. }) => {
            assert_eq!(allowed, "'LTRIM(<STRING>)'\n'LTRIM(<STRING>, <STRING>)'");
        }
        other => panic!("expected signature mismatch, got {other:?}"),
    }
}

#[test]
fn test_composite_reports_unknown_column() {
    let mut v = default_validator();
    let missing = ident(&mut v, "NOSUCH");
    let (query, _) = call_on_emp(&mut v, "LTRIM", vec![missing]);

    let err = v.validate_query(query).unwrap_err();
    assert_eq!(
        err,
        ValidationError::ColumnNotFound {
            name: "NOSUCH".into()
        }
    );
    assert_eq!(err.code(), SQL0102);
}

#[test]
fn test_composite_reports_nested_call_error() {
    let mut v = default_validator();
    let a = string(&mut v, "a");
    let left = v.ast_mut().call("LEFT", vec![a]);
    let (query, _) = call_on_emp(&mut v, "LTRIM", vec![left]);

    assert_eq!(
        v.validate_query(query),
        Err(ValidationError::WrongArgumentCount {
            operator: "LEFT".into(),
            expected: "2".into(),
            found: 1,
        })
    );
}

#[test]
fn test_composite_ignored_operand_is_not_resolved() {
    let mut v = default_validator();
    let unit = ident(&mut v, "DAY");
    let hiredate = ident(&mut v, "HIREDATE");
    let (query, call) = call_on_emp(&mut v, "DATE_PART", vec![unit, hiredate]);

    let row = v.validate_query(query).unwrap();

    assert_eq!(v.ast().operands(call).unwrap(), &[unit, hiredate]);
    assert!(v.node_type(unit).is_none());
    assert_eq!(row.fields[0].field_type, SqlType::new(SqlTypeName::BigInt));
}

// === Name resolution ===

#[test]
fn test_case_insensitive_names() {
    let mut v = validator(ValidatorConfig::default().with_case_sensitive(false));
    let empno = ident(&mut v, "empno");
    let query = select_from(&mut v, vec![empno], "emp");

    let row = v.validate_query(query).unwrap();
    assert_eq!(row.fields[0].name, "empno");
    assert_eq!(row.fields[0].field_type, SqlType::new(SqlTypeName::Integer));
}

#[test]
fn test_case_sensitive_names() {
    let mut v = default_validator();
    let empno = ident(&mut v, "EMPNO");
    let query = select_from(&mut v, vec![empno], "emp");

    assert_eq!(
        v.validate_query(query),
        Err(ValidationError::ObjectNotFound { name: "emp".into() })
    );
}

#[test]
fn test_ambiguous_column() {
    let mut v = default_validator();
    let deptno = ident(&mut v, "DEPTNO");
    let ast = v.ast_mut();
    let emp = ast.table_ref("EMP", None);
    let dept = ast.table_ref("DEPT", None);
    let query = ast.select(vec![SelectItem::expr(deptno)], vec![emp, dept]);

    assert_eq!(
        v.validate_query(query),
        Err(ValidationError::AmbiguousColumn {
            name: "DEPTNO".into()
        })
    );
}

#[test]
fn test_qualified_columns() {
    let mut v = default_validator();
    let emp_deptno = qualified(&mut v, &["e", "DEPTNO"]);
    let dname = qualified(&mut v, &["DEPT", "DNAME"]);
    let ast = v.ast_mut();
    let emp = ast.table_ref("EMP", Some("e"));
    let dept = ast.table_ref("DEPT", None);
    let query = ast.select(
        vec![SelectItem::expr(emp_deptno), SelectItem::expr(dname)],
        vec![emp, dept],
    );

    let row = v.validate_query(query).unwrap();
    assert_eq!(
        field_types(&row),
        vec![
            ("DEPTNO".to_string(), "INTEGER NOT NULL".to_string()),
            ("DNAME".to_string(), "VARCHAR(10) NOT NULL".to_string()),
        ]
    );
}

#[test]
fn test_qualifier_must_be_in_from() {
    let mut v = default_validator();
    let dname = qualified(&mut v, &["DEPT", "DNAME"]);
    let query = select_from(&mut v, vec![dname], "EMP");

    assert_eq!(
        v.validate_query(query),
        Err(ValidationError::ObjectNotFound {
            name: "DEPT".into()
        })
    );
}

#[test]
fn test_star_makes_names_unique() {
    let mut v = default_validator();
    let ast = v.ast_mut();
    let emp = ast.table_ref("EMP", None);
    let dept = ast.table_ref("DEPT", None);
    let query = ast.select(vec![SelectItem::Star], vec![emp, dept]);

    let row = v.validate_query(query).unwrap();
    let names: Vec<&str> = row.field_names().collect();
    assert_eq!(
        names,
        vec!["EMPNO", "ENAME", "DEPTNO", "HIREDATE", "DEPTNO0", "DNAME"]
    );
}

#[test]
fn test_subquery_in_from() {
    let mut v = default_validator();
    let ename = ident(&mut v, "ENAME");
    let inner = select_from(&mut v, vec![ename], "EMP");
    let s_ename = qualified(&mut v, &["s", "ENAME"]);
    let ast = v.ast_mut();
    let sub = ast.subquery_ref(inner, "s");
    let query = ast.select(vec![SelectItem::aliased(s_ename, "NAME")], vec![sub]);

    let row = v.validate_query(query).unwrap();
    assert_eq!(
        field_types(&row),
        vec![("NAME".to_string(), "VARCHAR(20)".to_string())]
    );
}

#[test]
fn test_set_operation_column_mismatch() {
    let mut v = default_validator();
    let empno = ident(&mut v, "EMPNO");
    let ename = ident(&mut v, "ENAME");
    let left = select_from(&mut v, vec![empno, ename], "EMP");
    let deptno = ident(&mut v, "DEPTNO");
    let right = select_from(&mut v, vec![deptno], "DEPT");
    let query = v.ast_mut().union_all(left, right);

    assert_eq!(
        v.validate_query(query),
        Err(ValidationError::SetOperandMismatch {
            operation: "UNION ALL".into()
        })
    );
}

// === WITH ===

/// `WITH t1 AS (SELECT EMPNO FROM EMP), t2 AS (SELECT EMPNO FROM <t2_source>)
/// SELECT * FROM t2`
fn with_chain(v: &mut Validator, t2_source: &str) -> NodeId {
    let empno = ident(v, "EMPNO");
    let q1 = select_from(v, vec![empno], "EMP");
    let empno = ident(v, "EMPNO");
    let q2 = select_from(v, vec![empno], t2_source);
    let ast = v.ast_mut();
    let t1 = ast.with_item("t1", None, q1, false);
    let t2 = ast.with_item("t2", None, q2, false);
    let from = ast.table_ref("t2", None);
    let body = ast.select(vec![SelectItem::Star], vec![from]);
    ast.with(vec![t1, t2], body)
}

#[test]
fn test_with_item_sees_preceding_items() {
    let mut v = default_validator();
    let query = with_chain(&mut v, "t1");

    let row = v.validate_query(query).unwrap();
    assert_eq!(
        field_types(&row),
        vec![("EMPNO".to_string(), "INTEGER NOT NULL".to_string())]
    );
}

#[test]
fn test_with_item_cannot_see_itself() {
    let mut v = default_validator();
    let query = with_chain(&mut v, "t2");

    assert_eq!(
        v.validate_query(query),
        Err(ValidationError::ObjectNotFound { name: "t2".into() })
    );
}

#[test]
fn test_with_column_list_count_mismatch() {
    let mut v = default_validator();
    let empno = ident(&mut v, "EMPNO");
    let q = select_from(&mut v, vec![empno], "EMP");
    let ast = v.ast_mut();
    let item = ast.with_item("t", Some(vec!["a".into(), "b".into()]), q, false);
    let from = ast.table_ref("t", None);
    let body = ast.select(vec![SelectItem::Star], vec![from]);
    let query = ast.with(vec![item], body);

    assert_eq!(
        v.validate_query(query),
        Err(ValidationError::ColumnCountMismatch {
            name: "t".into(),
            declared: 2,
            actual: 1,
        })
    );
}

/// `WITH RECURSIVE r(n) AS (<anchor> UNION ALL SELECT n FROM r)
/// SELECT n FROM r`
fn recursive_query(v: &mut Validator, anchor_from: Option<&str>) -> (NodeId, NodeId) {
    let anchor = match anchor_from {
        Some(table) => {
            let n = ident(v, "n");
            select_from(v, vec![n], table)
        }
        None => {
            let one = int(v, 1);
            v.ast_mut().select(vec![SelectItem::expr(one)], Vec::new())
        }
    };
    let n = ident(v, "n");
    let ast = v.ast_mut();
    let self_ref = ast.table_ref("r", None);
    let step = ast.select(vec![SelectItem::expr(n)], vec![self_ref]);
    let union = ast.union_all(anchor, step);
    let item = ast.with_item("r", Some(vec!["n".into()]), union, true);
    let n = ast.identifier("n");
    let from = ast.table_ref("r", None);
    let body = ast.select(vec![SelectItem::expr(n)], vec![from]);
    (ast.with(vec![item], body), self_ref)
}

#[test]
fn test_recursive_reference_uses_recursive_namespace() {
    let mut v = default_validator();
    let (query, self_ref) = recursive_query(&mut v, None);

    let row = v.validate_query(query).unwrap();
    assert_eq!(
        field_types(&row),
        vec![("n".to_string(), "INTEGER NOT NULL".to_string())]
    );

    let references = v.recursive_references();
    assert_eq!(references.len(), 1);
    let (node, namespace) = references[0];
    assert_eq!(node, self_ref);
    assert!(v.namespaces().namespace(namespace).unwrap().is_recursive());
}

#[test]
fn test_recursive_anchor_cannot_reference_item() {
    let mut v = default_validator();
    let (query, _) = recursive_query(&mut v, Some("r"));

    assert_eq!(
        v.validate_query(query),
        Err(ValidationError::ObjectNotFound { name: "r".into() })
    );
}

#[test]
fn test_recursive_item_needs_anchor() {
    let mut v = default_validator();
    let one = int(&mut v, 1);
    let ast = v.ast_mut();
    let q = ast.select(vec![SelectItem::expr(one)], Vec::new());
    let item = ast.with_item("r", None, q, true);
    let from = ast.table_ref("r", None);
    let body = ast.select(vec![SelectItem::Star], vec![from]);
    let query = ast.with(vec![item], body);

    assert_eq!(
        v.validate_query(query),
        Err(ValidationError::RecursiveWithoutAnchor { name: "r".into() })
    );
}

// === Diagnostics ===

#[test]
fn test_diagnostic_points_at_call() {
    let sql = "select upper(null) from emp";
    let mut v = validator(ValidatorConfig::default().with_type_coercion(false));
    let ast = v.ast_mut();
    let null = ast.add_at(SqlNode::Literal(Literal::Null), Span::new(13, 17));
    let call = ast.add_at(
        SqlNode::Call(CallNode::new("upper", vec![null])),
        Span::new(7, 18),
    );
    let root = v.scopes().root();

    let err = v.validate_expression(root, call).unwrap_err();
    let diag = v.diagnostic(&err, Some(call), sql);
    assert_eq!(diag.code, SQL0112);
    assert_eq!(diag.location.map(|l| l.column), Some(8));
}

#[test]
fn test_not_a_query() {
    let mut v = default_validator();
    let one = int(&mut v, 1);
    assert!(matches!(
        v.validate_query(one),
        Err(ValidationError::NotAQuery { kind: "literal", .. })
    ));
}
