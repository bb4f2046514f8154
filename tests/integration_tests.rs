// tests/integration_tests.rs

use iql_lang::{
    CompileError, CompileOptions, Model, PathEnd, PathTarget, QueryConstraint, QueryExpression,
    ValueType, VisibilityViolation, compile, compile_with,
};
use pretty_assertions::assert_eq;

const NS: &str = "org.flymine.model.testmodel";

fn model() -> Model {
    Model::from_json(include_str!("data/testmodel.json")).unwrap()
}

fn canonical(text: &str) -> String {
    compile(text, NS, &model()).unwrap().to_canonical_text()
}

fn error(text: &str) -> CompileError {
    compile(text, NS, &model()).unwrap_err()
}

// ============================================================================
// Canonical Output
// ============================================================================

#[test]
fn test_constants() {
    assert_eq!(
        canonical(
            "select 1 as b, false as c, true as d, 1.2 as e, 'hello' as f, \
             '2003-04-30 14:12:30.333' as g from Company"
        ),
        "SELECT 1 AS b, false AS c, true AS d, 1.2 AS e, hello AS f, \
         Wed Apr 30 14:12:30 2003 AS g FROM org.flymine.model.testmodel.Company AS Company"
    );
}

#[test]
fn test_valid_path_expressions() {
    assert_eq!(
        canonical(
            "select subquery.c_.name as a, subquery.b as b \
             from (select c_, c_.name as b from Company as c_) as subquery"
        ),
        "SELECT subquery.c_.name AS a, subquery.b AS b FROM (SELECT c_, c_.name AS b \
         FROM org.flymine.model.testmodel.Company AS c_) AS subquery"
    );
}

#[test]
fn test_normal_expressions() {
    assert_eq!(
        canonical(
            "select 1 + Company.vatNumber as a, 3 - 4 as b, 5 * 6 as c, 7 / 8 as d from Company"
        ),
        "SELECT 1 + Company.vatNumber AS a, 3 - 4 AS b, 5 * 6 AS c, 7 / 8 AS d \
         FROM org.flymine.model.testmodel.Company AS Company"
    );
}

#[test]
fn test_safe_functions() {
    assert_eq!(
        canonical(
            "select count(*) as a, sum(Company.vatNumber + 3) as b, avg(Company.vatNumber) as c, \
             min(Company.vatNumber) as d, substr('flibble', 3, max(Company.vatNumber)) as e \
             from Company"
        ),
        "SELECT COUNT(*) AS a, SUM(Company.vatNumber + 3) AS b, AVG(Company.vatNumber) AS c, \
         MIN(Company.vatNumber) AS d, SUBSTR(flibble, 3, MAX(Company.vatNumber)) AS e \
         FROM org.flymine.model.testmodel.Company AS Company"
    );
}

#[test]
fn test_group_order() {
    assert_eq!(
        canonical("select Company from Company group by 1 order by Company"),
        "SELECT Company FROM org.flymine.model.testmodel.Company AS Company \
         GROUP BY 1 ORDER BY Company"
    );
}

#[test]
fn test_valid_constraints() {
    assert_eq!(
        canonical(
            "select c_, d_, e_ from Company as c_, Department as d_, CEO as e_ \
             where c_.departments does not contain d_ and c_.CEO contains e_ \
             and (c_.vatNumber < 5 or c_.name like 'fish%') and e_.salary is not null \
             and c_.vatNumber > e_.age and c_.name in (select Company.name as name from Company)"
        ),
        "SELECT c_, d_, e_ FROM org.flymine.model.testmodel.Company AS c_, \
         org.flymine.model.testmodel.Department AS d_, org.flymine.model.testmodel.CEO AS e_ \
         WHERE (c_.CEO CONTAINS e_ AND c_.departments DOES NOT CONTAIN d_ \
         AND (c_.name LIKE fish% OR c_.vatNumber < 5) AND e_.salary IS NOT NULL \
         AND c_.vatNumber > e_.age AND c_.name IN (SELECT Company.name AS name \
         FROM org.flymine.model.testmodel.Company AS Company))"
    );
}

#[test]
fn test_qualified_from_class() {
    assert_eq!(
        canonical("select c.name as n from org.flymine.model.testmodel.Company as c"),
        "SELECT c.name AS n FROM org.flymine.model.testmodel.Company AS c"
    );
}

#[test]
fn test_not_and_nested_groups() {
    assert_eq!(
        canonical(
            "select e from Employee as e \
             where not (e.age > 3 or e.name = 'x') and not not e.fullTime = true"
        ),
        "SELECT e FROM org.flymine.model.testmodel.Employee AS e \
         WHERE (NOT (e.age > 3 OR e.name = x) AND e.fullTime = true)"
    );
}

#[test]
fn test_fields_spelled_like_keywords() {
    let stock = Model::builder("org.example")
        .attribute("Stock", "count", ValueType::Integer)
        .attribute("Stock", "max", ValueType::Integer)
        .build();
    let query = compile(
        "select s.count, s.max + 1 as min from Stock as s where s.count > 3 order by s.max",
        "org.example",
        &stock,
    )
    .unwrap();
    assert_eq!(
        query.to_canonical_text(),
        "SELECT s.count, s.max + 1 AS min FROM org.example.Stock AS s \
         WHERE s.count > 3 ORDER BY s.max"
    );
    assert_eq!(compile(&query.to_iql(), "org.example", &stock).unwrap(), query);
}

// ============================================================================
// Typed Model
// ============================================================================

#[test]
fn test_select_types() {
    let query = compile(
        "select e.name, e.age + 1.5, avg(e.age) as a, count(*) as n, e.department, e \
         from Employee as e",
        NS,
        &model(),
    )
    .unwrap();

    let types: Vec<ValueType> = query.select().iter().map(|item| item.value_type()).collect();
    assert_eq!(
        types,
        vec![
            ValueType::Text,
            ValueType::Decimal,
            ValueType::Decimal,
            ValueType::Integer,
            ValueType::ClassReference,
            ValueType::ClassReference,
        ]
    );

    let aliases: Vec<&str> = query.select().iter().map(|item| item.alias()).collect();
    assert_eq!(aliases, vec!["name", "a2_", "a", "n", "department", "e"]);
    assert!(query.select()[0].is_implicit_alias());
    assert!(!query.select()[2].is_implicit_alias());
}

#[test]
fn test_inherited_field_through_reference() {
    let query = compile(
        "select d.manager.age as age from Department as d",
        NS,
        &model(),
    )
    .unwrap();
    match query.select()[0].expression() {
        QueryExpression::FieldRef(path) => assert_eq!(
            path.target(),
            &PathTarget::Attribute {
                class: "Manager".to_string(),
                ty: ValueType::Integer,
            }
        ),
        other => panic!("expected a field reference, got {:?}", other),
    }
}

#[test]
fn test_scalar_subquery() {
    let query = compile(
        "select (select max(c.vatNumber) as m from Company as c) as top from Company",
        NS,
        &model(),
    )
    .unwrap();
    assert_eq!(query.select()[0].value_type(), ValueType::Integer);
    assert_eq!(
        query.to_canonical_text(),
        "SELECT (SELECT MAX(c.vatNumber) AS m FROM org.flymine.model.testmodel.Company AS c) \
         AS top FROM org.flymine.model.testmodel.Company AS Company"
    );
}

#[test]
fn test_outer_select_alias_in_where_subquery() {
    let query = compile(
        "select c.name as n from Company as c \
         where c.name in (select d.name as dn from Department as d where d.name = n)",
        NS,
        &model(),
    )
    .unwrap();
    let Some(QueryConstraint::InSubquery { subquery, .. }) = query.where_clause() else {
        panic!("expected an IN constraint");
    };
    let Some(QueryConstraint::Comparison { right, .. }) = subquery.where_clause() else {
        panic!("expected a comparison");
    };
    assert!(matches!(
        right,
        QueryExpression::FieldRef(path) if path.target() == &PathTarget::OuterColumn(ValueType::Text)
    ));
}

#[test]
fn test_date_comparison() {
    assert_eq!(
        canonical(
            "select e from Employee as e where e.end < '2003-04-30 14:12:30.000'"
        ),
        "SELECT e FROM org.flymine.model.testmodel.Employee AS e \
         WHERE e.end < Wed Apr 30 14:12:30 2003"
    );
}

// ============================================================================
// Path Errors
// ============================================================================

#[test]
fn test_unknown_field() {
    let err = error("select Company.nonExistentField from Company");
    assert_eq!(
        err,
        CompileError::UnknownField {
            field: "nonExistentField".to_string(),
            class: "org.flymine.model.testmodel.Company".to_string(),
        }
    );
    assert_eq!(
        err.to_string(),
        "field nonExistentField not found in class org.flymine.model.testmodel.Company"
    );
}

#[test]
fn test_path_extends_beyond_field() {
    assert_eq!(
        error("select Company.name.something from Company"),
        CompileError::PathTooLong {
            path: "Company.name.something".to_string(),
            end: PathEnd::Field,
        }
    );
    assert_eq!(
        error("select c.Company.name.something from (select Company from Company) as c"),
        CompileError::PathTooLong {
            path: "c.Company.name.something".to_string(),
            end: PathEnd::Field,
        }
    );
    assert_eq!(
        error("select c.name.something from (select Company.name as name from Company) as c"),
        CompileError::PathTooLong {
            path: "c.name.something".to_string(),
            end: PathEnd::Field,
        }
    );
}

#[test]
fn test_path_ends_at_subquery() {
    let err = error("select c from (select Company from Company) as c");
    assert_eq!(err.to_string(), "path expression c cannot end at a subquery");
}

#[test]
fn test_class_inside_subquery() {
    assert_eq!(
        error("select c.Company from (select Company from Company) as c"),
        CompileError::SubqueryVisibility {
            path: "c.Company".to_string(),
            reason: VisibilityViolation::ClassInsideSubquery,
        }
    );
    assert!(matches!(
        error("select c.Company.nonExistentField from (select Company from Company) as c"),
        CompileError::UnknownField { .. }
    ));
}

#[test]
fn test_nested_subquery_reference() {
    assert_eq!(
        error(
            "select c.subquery from (select subquery.Company.name as name \
             from (select Company from Company) as subquery) as c"
        ),
        CompileError::SubqueryVisibility {
            path: "c.subquery".to_string(),
            reason: VisibilityViolation::NestedSubquery {
                name: "subquery".to_string(),
                subquery: "c".to_string(),
            },
        }
    );
}

#[test]
fn test_unknown_alias() {
    let err = error("select c.something from (select Company from Company) as c");
    assert_eq!(err.to_string(), "no such object something found in subquery c");

    let err = error("select c from Company");
    assert_eq!(err.to_string(), "no such object c");
}

#[test]
fn test_not_selected_in_subquery() {
    assert_eq!(
        error("select a.Company.name as a from (select Company.name as a from Company) as a"),
        CompileError::SubqueryVisibility {
            path: "a.Company.name".to_string(),
            reason: VisibilityViolation::NotSelected {
                name: "Company".to_string(),
                subquery: "a".to_string(),
            },
        }
    );
}

#[test]
fn test_class_without_alias() {
    assert_eq!(
        error("select Department.name as n from Company"),
        CompileError::AmbiguousOrMissingAlias {
            class: "Department".to_string()
        }
    );
}

#[test]
fn test_unknown_class() {
    assert_eq!(
        error("select c from Nothing as c"),
        CompileError::UnknownClass {
            class: "Nothing".to_string(),
            namespace: NS.to_string(),
        }
    );
    assert!(matches!(
        error("select c from org.other.Company as c"),
        CompileError::UnknownClass { .. }
    ));
}

// ============================================================================
// Expression And Function Errors
// ============================================================================

#[test]
fn test_invalid_normal_expressions() {
    assert_eq!(
        error("select Company + 3 as a from Company").to_string(),
        "expressions cannot contain classes as arguments"
    );
    assert_eq!(
        error("select 1 + 2 + 3 as a from Company"),
        CompileError::Syntax {
            line: 1,
            column: 14,
            expected: "AS".to_string(),
            found: "'+'".to_string(),
        }
    );
    assert!(matches!(
        error("select 'flibble' + 3 as a from Company"),
        CompileError::TypeMismatch { .. }
    ));
    assert!(matches!(
        error("select Company.name + 3 as a from Company"),
        CompileError::TypeMismatch { .. }
    ));
}

#[test]
fn test_invalid_safe_functions() {
    assert_eq!(
        error("select count(5) as a from Company").to_string(),
        "line 1:14: expected '*', found '5'"
    );
    assert_eq!(
        error("select sum(5, 3) as a from Company"),
        CompileError::Arity {
            function: "SUM".to_string(),
            expected: 1,
            found: 2,
        }
    );
    assert!(matches!(
        error("select substr('fdsafds', 3, 4, 5) as a from Company"),
        CompileError::Arity { expected: 3, found: 4, .. }
    ));
    assert_eq!(
        error("select max(Company) as a from Company"),
        CompileError::ClassInExpression {
            context: "functions"
        }
    );
    assert!(matches!(
        error("select substr('fdsafds', 3) as a from Company"),
        CompileError::Arity { expected: 3, found: 2, .. }
    ));
    assert!(matches!(
        error("select min() as a from Company"),
        CompileError::Arity { expected: 1, found: 0, .. }
    ));
    assert_eq!(
        error("select min(4) as a from Company"),
        CompileError::InvalidAggregateArgument {
            function: "MIN".to_string()
        }
    );
    assert!(matches!(
        error("select min(Company.name) as a from Company"),
        CompileError::TypeMismatch { .. }
    ));
}

#[test]
fn test_constraint_type_errors() {
    assert_eq!(
        error("select c from Company as c where c = 3"),
        CompileError::ClassInExpression {
            context: "comparisons"
        }
    );
    assert!(matches!(
        error("select c from Company as c where c.vatNumber like 'x%'"),
        CompileError::TypeMismatch { .. }
    ));
    assert!(matches!(
        error("select e from Employee as e where e.fullTime < true"),
        CompileError::TypeMismatch { .. }
    ));
    assert!(matches!(
        error("select c from Company as c where c.vatNumber in (select d.name as n from Department as d)"),
        CompileError::TypeMismatch { .. }
    ));
    assert!(matches!(
        error(
            "select c from Company as c \
             where c.name in (select d.name as n, d.name as m from Department as d)"
        ),
        CompileError::Arity { expected: 1, found: 2, .. }
    ));
    assert!(matches!(
        error("select c, d from Company as c, Department as d where c.name contains d"),
        CompileError::TypeMismatch { .. }
    ));
    assert_eq!(
        error("select c from Company as c where c.departments contains x"),
        CompileError::UnknownAlias {
            name: "x".to_string(),
            subquery: None,
        }
    );
}

#[test]
fn test_collection_as_value() {
    assert!(matches!(
        error("select c.departments as d from Company as c"),
        CompileError::TypeMismatch { .. }
    ));
}

#[test]
fn test_group_by_ordinal_out_of_range() {
    assert_eq!(
        error("select Company from Company group by 2"),
        CompileError::InvalidOrdinal {
            ordinal: 2,
            columns: 1,
        }
    );
}

#[test]
fn test_duplicate_select_alias() {
    assert_eq!(
        error("select c.name, c.name from Company as c"),
        CompileError::DuplicateAlias {
            alias: "name".to_string()
        }
    );
}

#[test]
fn test_recursion_limit() {
    let options = CompileOptions { max_depth: 2 };
    let text = "select a.n as n from (select b.n as n from (select c.n as n from \
                (select d.name as n from Company as d) as c) as b) as a";
    assert!(compile(text, NS, &model()).is_ok());
    assert_eq!(
        compile_with(text, NS, &model(), &options).unwrap_err(),
        CompileError::RecursionLimit { limit: 2 }
    );

    let deep = format!(
        "select c from Company as c where {}c.vatNumber = 1{}",
        "(".repeat(40),
        ")".repeat(40)
    );
    assert_eq!(
        compile(&deep, NS, &model()).unwrap_err(),
        CompileError::RecursionLimit { limit: 32 }
    );

    let calls = format!(
        "select {}'x'{} as a from Company",
        "substr(".repeat(100_000),
        ", 1, 1)".repeat(100_000)
    );
    assert_eq!(
        compile(&calls, NS, &model()).unwrap_err(),
        CompileError::RecursionLimit { limit: 32 }
    );
}
