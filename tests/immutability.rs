//! Mutability transitions and deep-freeze guarantees through the facade.

use datum::prelude::*;

#[test]
fn lock_then_set_fails_and_value_is_deeply_frozen() {
    let mut cell = DataCell::new(Value::object([("a", 1)]));
    cell.lock();

    let err = cell.set(Value::object([("a", 2)])).unwrap_err();
    assert!(err.is_locked());

    let value = cell.value();
    assert!(value.is_deeply_frozen());
    assert!(matches!(value.insert("b", 2), Err(Error::Frozen)));
    // untouched by the rejected set
    assert_eq!(value.field("a").unwrap(), Value::from(1));
}

#[test]
fn lock_freezes_nested_composites_recursively() {
    let nested = Value::object([(
        "outer",
        Value::object([("inner", Value::array([1, 2, 3]))]),
    )]);
    let mut cell = DataCell::new(nested);
    cell.lock();

    let inner = cell
        .value()
        .field("outer")
        .unwrap()
        .field("inner")
        .unwrap();
    assert!(inner.is_frozen());
    assert!(inner.push(4).is_err());
}

#[test]
fn lock_handles_cyclic_value_graphs() {
    let graph = Value::array([Value::from(1)]);
    graph.push(graph.clone()).unwrap();

    let mut cell = DataCell::new(graph);
    cell.lock();
    assert!(cell.value().is_deeply_frozen());
}

#[test]
fn state_transitions_are_one_directional() {
    let mut cell = DataCell::new(1);
    assert!(cell.is_mutable());

    cell.seal().unwrap();
    assert!(cell.is_sealed());
    assert!(!cell.is_mutable());
    // sealed still allows set
    cell.set(2).unwrap();

    cell.freeze().unwrap();
    assert!(cell.is_frozen());
    assert!(cell.is_sealed());
    // frozen (but unlocked) still allows set
    cell.set(3).unwrap();

    cell.lock();
    assert!(cell.is_locked());
    assert!(cell.set(4).is_err());
}

#[test]
fn seal_and_freeze_on_locked_cell_are_rejected_not_ignored() {
    let mut cell = DataCell::new(1);
    cell.lock();
    assert!(matches!(cell.seal(), Err(Error::Locked { op: "seal" })));
    assert!(matches!(cell.freeze(), Err(Error::Locked { op: "freeze" })));
}

#[test]
fn second_lock_is_tolerated() {
    let mut cell = DataCell::new(Value::array([1]));
    cell.lock();
    cell.lock();
    assert!(cell.is_locked());
    assert!(cell.value().is_deeply_frozen());
}

#[test]
fn clear_on_locked_cell_is_rejected() {
    let mut cell = DataCell::new("x");
    cell.lock();
    assert!(matches!(cell.clear(), Err(Error::Locked { op: "clear" })));
    assert_eq!(cell.value(), Value::from("x"));
}

#[test]
fn destroy_yields_sentinel_and_is_idempotent() {
    let mut cell = DataCell::new(Value::object([("k", "v")]));
    cell.destroy();
    assert!(cell.value().is_null());
    // a second destroy neither fails nor changes anything
    cell.destroy();
    assert!(cell.value().is_null());
}

#[test]
fn round_trip_identity_for_unlocked_direct_cells() {
    let v = Value::object([("n", Value::array([1, 2]))]);
    let mut cell = DataCell::new(Value::null());
    cell.set(v.clone()).unwrap();
    // same node handle comes straight back
    assert_eq!(cell.value(), v);
}

#[test]
fn shared_subtrees_freeze_exactly_once() {
    let shared = Value::array([1]);
    let v = Value::object([("left", shared.clone()), ("right", shared.clone())]);
    let mut cell = DataCell::new(v);
    cell.lock();
    assert!(shared.is_frozen());
    assert!(cell.value().is_deeply_frozen());
}
