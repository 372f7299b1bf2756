//! Hook dispatch behavior through the public facade.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use datum::prelude::*;

fn change_log(cell: &mut DataCell) -> Arc<Mutex<Vec<(Value, Value)>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    {
        let log = log.clone();
        cell.on_change(move |new, old| {
            log.lock().unwrap().push((new.clone(), old.clone()));
        });
    }
    log
}

#[test]
fn on_change_fires_once_per_distinct_value() {
    let mut cell = DataCell::new("v1");
    let log = change_log(&mut cell);

    cell.set("v2").unwrap();
    assert_eq!(
        log.lock().unwrap().as_slice(),
        &[(Value::from("v2"), Value::from("v1"))]
    );

    // same value again: no dispatch
    cell.set("v2").unwrap();
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[test]
fn same_scalar_does_not_fire_on_change() {
    let mut cell = DataCell::new(5);
    let log = change_log(&mut cell);

    cell.set(5).unwrap();
    assert!(log.lock().unwrap().is_empty());

    cell.set(6).unwrap();
    assert_eq!(
        log.lock().unwrap().as_slice(),
        &[(Value::from(6), Value::from(5))]
    );
}

#[test]
fn on_set_return_is_the_stored_value() {
    let mut cell = DataCell::new(0);
    cell.on_set(|v| Value::from(v.as_int().unwrap_or(0) + 100));
    cell.set(1).unwrap();
    assert_eq!(cell.value(), Value::from(101));
}

#[test]
fn on_set_runs_before_on_change() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let mut cell = DataCell::new(0);
    {
        let order = order.clone();
        cell.on_set(move |v| {
            order.lock().unwrap().push("on_set");
            v
        });
    }
    {
        let order = order.clone();
        cell.on_change(move |_, _| {
            order.lock().unwrap().push("on_change");
        });
    }
    cell.set(1).unwrap();
    assert_eq!(order.lock().unwrap().as_slice(), &["on_set", "on_change"]);
}

#[test]
fn unregistered_hooks_stay_silent() {
    let count = Arc::new(AtomicUsize::new(0));
    let mut cell = DataCell::new("initial");
    {
        let count = count.clone();
        cell.on_change(move |_, _| {
            count.fetch_add(1, Ordering::SeqCst);
        });
    }
    cell.clear_on_change();
    cell.set("updated").unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(cell.value(), Value::from("updated"));
}

#[test]
fn on_destroy_fires_and_can_be_unregistered() {
    let count = Arc::new(AtomicUsize::new(0));

    let mut cell = DataCell::new("a");
    {
        let count = count.clone();
        cell.on_destroy(move || {
            count.fetch_add(1, Ordering::SeqCst);
        });
    }
    cell.destroy();
    assert_eq!(count.load(Ordering::SeqCst), 1);

    let mut silent = DataCell::new("b");
    {
        let count = count.clone();
        silent.on_destroy(move || {
            count.fetch_add(1, Ordering::SeqCst);
        });
    }
    silent.clear_on_destroy();
    silent.destroy();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn clear_fires_on_change_with_the_sentinel() {
    let mut cell = DataCell::new("value");
    let log = change_log(&mut cell);
    cell.clear().unwrap();
    let entries = log.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].0.is_null());
    assert_eq!(entries[0].1, Value::from("value"));
}

#[test]
fn canonical_json_comparator_detects_structural_change() {
    let mut cell = DataCell::builder(Value::object([("a", 1)]))
        .comparator(Comparator::CanonicalJson)
        .build();
    let log = change_log(&mut cell);

    // structurally identical object: no dispatch
    cell.set(Value::object([("a", 1)])).unwrap();
    assert!(log.lock().unwrap().is_empty());

    cell.set(Value::object([("a", 2)])).unwrap();
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[test]
fn update_runs_the_full_hook_chain() {
    let mut cell = DataCell::new(10);
    let log = change_log(&mut cell);
    cell.update(|v| Value::from(v.as_int().unwrap() * 2)).unwrap();
    assert_eq!(cell.value(), Value::from(20));
    assert_eq!(log.lock().unwrap().len(), 1);
}
