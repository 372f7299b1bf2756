//! Adapter delegation, sync and async, through the facade.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use datum::prelude::*;

/// Adapter that counts every forwarded call.
struct CountingAdapter {
    value: Value,
    sets: Arc<AtomicUsize>,
}

impl StorageAdapter for CountingAdapter {
    fn value(&self) -> Value {
        self.value.clone()
    }

    fn set(&mut self, value: Value) -> Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.value = value;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.value = Value::null();
        Ok(())
    }

    fn destroy(&mut self) -> Result<()> {
        self.value = Value::null();
        Ok(())
    }
}

#[test]
fn every_mutation_is_forwarded_to_the_adapter() {
    let sets = Arc::new(AtomicUsize::new(0));
    let mut cell = DataCell::with_adapter(CountingAdapter {
        value: Value::from("initial"),
        sets: sets.clone(),
    });

    assert_eq!(cell.value(), Value::from("initial"));
    cell.set("next").unwrap();
    cell.set("final").unwrap();
    assert_eq!(sets.load(Ordering::SeqCst), 2);
    assert_eq!(cell.value(), Value::from("final"));

    cell.clear().unwrap();
    assert!(cell.value().is_null());
}

#[test]
fn memory_adapter_behaves_like_direct_storage() {
    let mut direct = DataCell::new(5);
    let mut delegated = DataCell::with_adapter(MemoryAdapter::new(5));

    direct.set(6).unwrap();
    delegated.set(6).unwrap();
    assert_eq!(direct.value(), delegated.value());

    direct.destroy();
    delegated.destroy();
    assert!(direct.value().is_null());
    assert!(delegated.value().is_null());
}

#[test]
fn hooks_wrap_adapter_storage() {
    let mut cell = DataCell::with_adapter(MemoryAdapter::new(1));
    cell.on_set(|v| Value::from(v.as_int().unwrap_or(0) * 3));
    let fired = Arc::new(AtomicUsize::new(0));
    {
        let fired = fired.clone();
        cell.on_change(move |_, _| {
            fired.fetch_add(1, Ordering::SeqCst);
        });
    }
    cell.set(2).unwrap();
    assert_eq!(cell.value(), Value::from(6));
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn lock_freezes_through_the_adapter() {
    let mut cell = DataCell::with_adapter(MemoryAdapter::new(Value::object([("a", 1)])));
    cell.lock();
    assert!(cell.set(Value::object([("a", 2)])).is_err());
    assert!(cell.value().is_deeply_frozen());
}

mod async_mode {
    use super::*;

    struct SlowAdapter {
        value: Value,
    }

    impl AsyncAdapter for SlowAdapter {
        async fn value(&self) -> Value {
            tokio::task::yield_now().await;
            self.value.clone()
        }

        async fn set(&mut self, value: Value) -> Result<()> {
            tokio::task::yield_now().await;
            self.value = value;
            Ok(())
        }

        async fn clear(&mut self) -> Result<()> {
            self.value = Value::null();
            Ok(())
        }

        async fn destroy(&mut self) -> Result<()> {
            self.value = Value::null();
            Ok(())
        }
    }

    #[tokio::test]
    async fn all_operations_await_uniformly() {
        let mut cell = AsyncDataCell::new(SlowAdapter {
            value: Value::from(1),
        });
        cell.set(2).await.unwrap();
        assert_eq!(cell.value().await, Value::from(2));
        cell.clear().await.unwrap();
        assert!(cell.value().await.is_null());
    }

    #[tokio::test]
    async fn locked_async_cell_rejects_set() {
        let mut cell = AsyncDataCell::new(SlowAdapter {
            value: Value::from(1),
        });
        cell.lock().await;
        assert!(cell.set(2).await.is_err());
    }

    #[tokio::test]
    async fn async_destroy_fires_on_destroy_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut cell = AsyncDataCell::new(SlowAdapter {
            value: Value::from(1),
        });
        {
            let count = count.clone();
            cell.on_destroy(move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }
        cell.destroy().await;
        cell.destroy().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
