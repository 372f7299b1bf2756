//! Indexed and named registry variants through the facade.

use std::sync::Arc;

use datum::prelude::*;

#[test]
fn indexed_lookup_before_and_after_destroy() {
    let registry = Arc::new(IndexRegistry::new());
    let cell = IndexedCell::new(
        &registry,
        Value::object([("id", Value::from(7)), ("name", Value::from("seven"))]),
        "id",
    )
    .unwrap();

    // a global lookup by index returns the same instance
    let found = registry.get(7).expect("cell should be registered");
    assert!(Arc::ptr_eq(&found, &cell));
    assert_eq!(found.value().field("name").unwrap(), Value::from("seven"));

    cell.destroy();
    assert!(registry.get(7).is_none());
}

#[test]
fn indexed_construction_validates_the_key() {
    let registry = Arc::new(IndexRegistry::new());

    let missing = IndexedCell::new(&registry, Value::object([("x", 1)]), "id");
    assert!(matches!(missing, Err(Error::IndexKey { .. })));

    let non_numeric = IndexedCell::new(&registry, Value::object([("id", "7")]), "id");
    assert!(matches!(non_numeric, Err(Error::IndexKey { .. })));

    assert!(registry.is_empty());
}

#[test]
fn indexed_cells_expire_from_the_registry_when_dropped() {
    let registry = Arc::new(IndexRegistry::new());
    {
        let _cell =
            IndexedCell::new(&registry, Value::object([("id", Value::from(42))]), "id").unwrap();
        assert!(registry.get(42).is_some());
    }
    // the weak entry expires on the next lookup
    assert!(registry.get(42).is_none());
}

#[test]
fn global_index_registry_is_shared() {
    let a = IndexRegistry::global();
    let b = IndexRegistry::global();
    let cell = IndexedCell::new(&a, Value::object([("id", Value::from(1001))]), "id").unwrap();
    assert!(b.get(1001).is_some());
    cell.destroy();
    assert!(b.get(1001).is_none());
}

#[test]
fn indexed_hooks_can_use_the_shared_handle() {
    let registry = Arc::new(IndexRegistry::new());
    let cell = IndexedCell::new(
        &registry,
        Value::object([("id", Value::from(70)), ("state", Value::from("new"))]),
        "id",
    )
    .unwrap();

    // the observer reads the cell it is attached to while set is in flight
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    {
        let observer = cell.clone();
        let seen = seen.clone();
        cell.on_change(move |_, _| {
            seen.lock().unwrap().push(observer.value());
        });
    }
    cell.set(Value::object([("id", Value::from(70)), ("state", Value::from("ready"))]))
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].field("state").unwrap(), Value::from("ready"));
}

#[test]
fn variants_expose_the_full_mutability_and_hook_surface() {
    let indexed = Arc::new(IndexRegistry::new());
    let cell = IndexedCell::new(&indexed, Value::object([("id", Value::from(71))]), "id").unwrap();
    cell.on_change(|_, _| panic!("on_change was cleared"));
    cell.clear_on_change();
    cell.set(Value::object([("id", Value::from(72))])).unwrap();
    cell.seal().unwrap();
    assert!(cell.is_sealed());
    cell.freeze().unwrap();
    assert!(cell.is_frozen());

    let named = Arc::new(NamedRegistry::new());
    let mut cell = NamedCell::new(&named, "surface", 1);
    cell.on_destroy(|| panic!("on_destroy was cleared"));
    cell.clear_on_destroy();
    cell.seal().unwrap();
    assert!(cell.is_sealed());
    cell.freeze().unwrap();
    assert!(cell.is_frozen());
    cell.destroy();
}

#[test]
fn named_cell_registers_and_unregisters() {
    let registry = Arc::new(NamedRegistry::new());
    let mut cell = NamedCell::new(&registry, "session", Value::object([("user", "alice")]));

    assert_eq!(
        registry.get("session").unwrap().field("user").unwrap(),
        Value::from("alice")
    );

    cell.set(Value::object([("user", "bob")])).unwrap();
    assert_eq!(
        registry.get("session").unwrap().field("user").unwrap(),
        Value::from("bob")
    );

    cell.destroy();
    assert!(registry.get("session").is_none());
}

#[test]
fn named_cell_hooks_observe_registry_writes() {
    let registry = Arc::new(NamedRegistry::new());
    let mut cell = NamedCell::new(&registry, "counter", 0);
    cell.on_set(|v| Value::from(v.as_int().unwrap_or(0).max(0)));
    cell.set(-5).unwrap();
    // clamped by on_set before reaching the registry
    assert_eq!(registry.get("counter"), Some(Value::from(0)));
}

#[test]
fn named_cell_lock_freezes_the_registry_value() {
    let registry = Arc::new(NamedRegistry::new());
    let mut cell = NamedCell::new(&registry, "frozen", Value::array([1, 2]));
    cell.lock();
    assert!(cell.set(3).is_err());
    // the registry holds the same nodes, so they are frozen too
    assert!(registry.get("frozen").unwrap().is_deeply_frozen());
}
