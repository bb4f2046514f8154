// tests/canonical_tests.rs
//
// Properties of the canonical form: written order never matters, and the
// printed query compiles back to the same model.

use iql_lang::{Model, QueryObjectModel, compile};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const NS: &str = "org.flymine.model.testmodel";

fn model() -> Model {
    Model::from_json(include_str!("data/testmodel.json")).unwrap()
}

fn compile_ok(text: &str) -> QueryObjectModel {
    compile(text, NS, &model()).unwrap_or_else(|e| panic!("{} failed to compile: {}", text, e))
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}

const CONDITIONS: [&str; 7] = [
    "c.departments contains d",
    "c.name like 'fish%'",
    "c.vatNumber < 5",
    "c.vatNumber > 2",
    "c.name is not null",
    "not c.vatNumber = 7",
    "c.name in (select Company.name as name from Company)",
];

const ALTERNATIVES: [&str; 3] = ["c.vatNumber = 1", "c.name = 'x'", "d.name like 'a%'"];

fn conditions_query(conditions: &[&str], alternatives: &[&str]) -> String {
    format!(
        "select c, d from Company as c, Department as d where {} and ({})",
        conditions.join(" and "),
        alternatives.join(" or ")
    )
}

// ============================================================================
// Order Independence
// ============================================================================

proptest! {
    #[test]
    fn prop_condition_order_is_irrelevant(
        conditions in Just(CONDITIONS.to_vec()).prop_shuffle(),
        alternatives in Just(ALTERNATIVES.to_vec()).prop_shuffle(),
    ) {
        let baseline = compile_ok(&conditions_query(&CONDITIONS, &ALTERNATIVES));
        let shuffled = compile_ok(&conditions_query(&conditions, &alternatives));
        prop_assert_eq!(shuffled.to_canonical_text(), baseline.to_canonical_text());
        prop_assert_eq!(shuffled, baseline);
    }
}

#[test]
fn test_nesting_does_not_change_canonical_form() {
    let flat = compile_ok(
        "select c from Company as c where c.vatNumber = 1 and c.vatNumber = 2 and c.vatNumber = 3",
    );
    let nested = compile_ok(
        "select c from Company as c where (c.vatNumber = 3 and (c.vatNumber = 1)) and c.vatNumber = 2",
    );
    assert_eq!(nested.to_canonical_text(), flat.to_canonical_text());
}

// ============================================================================
// Round Trips
// ============================================================================

fn date_literal() -> impl Strategy<Value = String> {
    (1970i32..2100, 1u32..13, 1u32..29, 0u32..24, 0u32..60, 0u32..60, 0u32..1000).prop_map(
        |(y, mo, d, h, mi, s, ms)| {
            format!("'{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}'", y, mo, d, h, mi, s, ms)
        },
    )
}

fn decimal_literal() -> impl Strategy<Value = String> {
    (0u32..1000, 0u32..100).prop_map(|(whole, cents)| format!("{}.{:02}", whole, cents))
}

proptest! {
    #[test]
    fn prop_iql_text_compiles_to_equal_model(
        text in "[a-z' \\\\]{0,8}",
        pattern in "[a-z%]{1,6}",
        number in -1000i64..1000,
        bound in -1000i64..1000,
        decimal in decimal_literal(),
        date in date_literal(),
        flag in any::<bool>(),
    ) {
        let source = format!(
            "select {} as t, {} as i, {} as x, {} as dt, {} as f, e.name, e.age + {} \
             from Employee as e where e.age > {} and e.name like {} and e.end < {}",
            quote(&text), number, decimal, date, flag, number, bound, quote(&pattern), date
        );
        let first = compile_ok(&source);
        let printed = first.to_iql();
        let second = compile_ok(&printed);
        prop_assert_eq!(&second, &first);
        prop_assert_eq!(second.to_iql(), printed);
    }
}

#[test]
fn test_canonical_text_reparses_without_text_constants() {
    let queries = [
        "select c.name as n, c.vatNumber + 3 as v from Company as c where c.vatNumber >= 3",
        "select s.n as n from (select c.name as n from Company as c) as s order by s.n",
        "select c, d from Company as c, Department as d \
         where c.departments contains d or not d.name is null",
        "select count(*) as k, avg(e.age) as a from Employee as e group by 1",
    ];
    for text in queries {
        let first = compile_ok(text);
        let canonical = first.to_canonical_text();
        let second = compile_ok(&canonical);
        assert_eq!(second.to_canonical_text(), canonical);
        assert_eq!(second, first);
    }
}

#[test]
fn test_dates_differing_in_millis_keep_a_fixed_order() {
    let written = compile_ok(
        "select e from Employee as e \
         where e.end < '2003-04-30 14:12:30.333' or e.end < '2003-04-30 14:12:30.444'",
    );
    let swapped = compile_ok(
        "select e from Employee as e \
         where e.end < '2003-04-30 14:12:30.444' or e.end < '2003-04-30 14:12:30.333'",
    );
    assert_eq!(swapped.to_canonical_text(), written.to_canonical_text());
    assert_eq!(swapped.to_iql(), written.to_iql());
    assert_eq!(swapped, written);
}
