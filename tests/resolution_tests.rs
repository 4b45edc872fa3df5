//! Resolution tests for symbols, applications and lists
//!
//! Covers lookup chaining, memoization and error propagation outside of
//! contexts.

use pretty_assertions::assert_eq;
use rstest::rstest;
use std::cell::Cell;
use std::rc::Rc;
use tracelang::prelude::*;
use tracelang::{BinaryOperator, NodeKind};

#[rstest]
#[case::string_key(Value::from("x"), Value::from(2))]
#[case::integer_key(Value::from(1), Value::from("a"))]
#[case::boolean_key(Value::from(true), Value::from(1.5))]
#[case::nested_value(Value::from("k"), Value::list([Value::from(1), Value::Nil]))]
fn test_lookup_round_trip(#[case] key: Value, #[case] value: Value) {
    let mut scope = Mapping::default();
    scope.insert(key.clone(), value.clone());
    assert_eq!(sym_in(key, scope).value().unwrap(), value);
}

#[rstest]
#[case::float_for_integer(Value::from(1.0), "one")]
#[case::boolean_for_integer(Value::from(true), "one")]
#[case::computed_float(Value::from(&literal(2.0) / 2), "one")]
#[case::computed_comparison(Value::from(literal(0).equals(0)), "one")]
#[case::negative_zero(Value::from(-0.0), "zero")]
fn test_numeric_keys_match_across_kinds(#[case] key: Value, #[case] expected: &str) {
    let scope = bindings! { 0 => "zero", 1 => "one", 1.5 => "half" };
    assert_eq!(sym_in(key, scope).value().unwrap(), Value::from(expected));
}

#[test]
fn test_fractional_key_does_not_match_integer() {
    let err = sym_in(&literal(3) / 2, bindings! { 1 => "one" }).value().unwrap_err();
    assert!(matches!(err, EvalError::KeyNotFound { .. }), "{err:?}");
}

#[test]
fn test_nested_scope() {
    let scope = sym_in("context", bindings! { "context" => bindings! { "x" => 2 } });
    assert_eq!(sym_in("x", scope).value().unwrap(), Value::from(2));
}

#[test]
fn test_symbolic_key() {
    let key = sym_in("x", bindings! { "x" => 2 });
    assert_eq!(
        sym_in(key, bindings! { 2 => 4 }).value().unwrap(),
        Value::from(4)
    );
}

#[test]
fn test_lookups_chain_through_symbols() {
    let inner = sym_in("b", bindings! { "b" => "done" });
    let outer = sym_in("a", bindings! { "a" => inner });
    assert_eq!(outer.value().unwrap(), Value::from("done"));
}

#[test]
fn test_indexing_builds_lookups() {
    let list = literal(Value::list([Value::from(10), Value::from(20)]));
    let last = list.index(-1);
    assert!(matches!(last.kind(), NodeKind::Lookup { .. }));
    assert_eq!(last.value().unwrap(), Value::from(20));
}

#[rstest]
#[case::add(BinaryOperator::Add, 2, 3, Value::from(5))]
#[case::subtract(BinaryOperator::Subtract, 2, 3, Value::from(-1))]
#[case::floor_divide(BinaryOperator::FloorDivide, -7, 2, Value::from(-4))]
#[case::modulo(BinaryOperator::Modulo, -7, 2, Value::from(1))]
#[case::divide(BinaryOperator::Divide, 7, 2, Value::from(3.5))]
#[case::less_than(BinaryOperator::LessThan, 2, 3, Value::from(true))]
fn test_application_law(
    #[case] op: BinaryOperator,
    #[case] a: i64,
    #[case] b: i64,
    #[case] expected: Value,
) {
    let direct = op.evaluate(&Value::from(a), &Value::from(b)).unwrap();
    let applied = apply(op.function(), [a, b]).value().unwrap();
    assert_eq!(applied, direct);
    assert_eq!(applied, expected);
}

#[test]
fn test_application_of_native_function() {
    let concat = function("concat", |args| {
        let parts: Vec<String> = args.iter().map(ToString::to_string).collect();
        Ok(Value::from(parts.join("")))
    });
    assert_eq!(
        apply(concat, [Value::from(1), Value::from("b")]).value().unwrap(),
        Value::from("1'b'")
    );
}

#[test]
fn test_memoization_computes_once() {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let tick = function("tick", move |_| {
        counter.set(counter.get() + 1);
        Ok(Value::from(counter.get()))
    });

    let node = apply(tick, Vec::<Value>::new());
    let doubled = &node * 2;
    for _ in 0..3 {
        assert_eq!(node.value().unwrap(), Value::from(1));
        assert_eq!(doubled.value().unwrap(), Value::from(2));
    }
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_shared_subexpression_is_forced_once() {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let expensive = apply(
        function("expensive", move |_| {
            counter.set(counter.get() + 1);
            Ok(Value::from(7))
        }),
        Vec::<Value>::new(),
    );

    let sum = &expensive + &expensive;
    assert_eq!(sum.value().unwrap(), Value::from(14));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_operators_are_deferred() {
    let missing = sym("missing");
    // building never forces
    let expr = (&missing + 1).lt(10);
    assert!(matches!(expr.kind(), NodeKind::Apply { .. }));

    let err = expr.value().unwrap_err();
    assert!(matches!(err, EvalError::UnboundSymbol { .. }));
}

#[test]
fn test_comparisons_and_reflected_forms() {
    let n = literal(4);
    assert_eq!(n.ge(4).value().unwrap(), Value::from(true));
    assert_eq!(n.not_equals(4.0).value().unwrap(), Value::from(false));
    assert_eq!((2_i64 * &n).value().unwrap(), Value::from(8));
    assert_eq!(n.divmod(3).value().unwrap(), Value::list([Value::from(1), Value::from(1)]));
    assert_eq!(n.pow(2).value().unwrap(), Value::from(16));
}

#[test]
fn test_eager_list_forces_all_items() {
    let list = eager_list([Value::from(&literal(1) + 1), Value::from(sym("unbound"))]);
    assert_eq!(list.items().map(<[Value]>::len), Some(2));
    assert!(list.value().is_err());
}

#[test]
fn test_lazy_list_forces_on_access() {
    let list = lazy_list([Value::from(&literal(1) + 1), Value::from(sym("unbound"))]);
    let first = list.index(0);
    assert_eq!(first.value().unwrap(), Value::from(2));
    assert!(list.index(1).value().is_err());
}

#[test]
fn test_lazy_list_intervention() {
    let list = lazy_list([Value::from(sym("unbound")), Value::from(&literal(2) * 2)]);
    let patched = list.call(bindings! { 0 => "fixed" });

    assert_eq!(patched.index(0).value().unwrap(), Value::from("fixed"));
    assert_eq!(patched.index(1).value().unwrap(), Value::from(4));
    // the original list still fails on its unbound element
    assert!(list.index(0).value().is_err());
}

#[test]
fn test_lazy_list_intervention_with_boolean_index() {
    let list = lazy_list([Value::from(1), Value::from(sym("unbound"))]);
    let patched = list.call(bindings! { true => "second" });
    assert_eq!(patched.index(1).value().unwrap(), Value::from("second"));
    assert_eq!(patched.index(0).value().unwrap(), Value::from(1));
}

#[rstest]
#[case::missing_key(sym_in("y", bindings! { "x" => 1 }), "KeyNotFound")]
#[case::unbound(sym("x"), "UnboundSymbol")]
#[case::not_indexable(literal(3).index("x"), "NotIndexable")]
#[case::not_callable(literal("f").call(bindings! {}), "NotCallable")]
#[case::bad_operands(&literal("a") - 1, "InvalidOperandTypes")]
#[case::division_by_zero(&literal(1) / 0, "DivisionByZero")]
fn test_errors_propagate(#[case] node: Node, #[case] kind: &str) {
    let err = node.value().unwrap_err();
    let name = format!("{err:?}");
    assert!(name.starts_with(kind), "{name}");
}

#[test]
fn test_failed_force_can_be_retried() {
    let node = sym_in("x", bindings! {});
    assert!(node.value().is_err());
    assert!(node.value().is_err());
    assert!(!node.is_resolved());
}
