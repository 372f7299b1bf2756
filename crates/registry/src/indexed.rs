//! Index registry and the indexed cell variant.
//!
//! An [`IndexedCell`] wraps an Object value carrying a numeric identity
//! field and registers itself in an explicit [`IndexRegistry`] service, so
//! collaborators can look a cell up by its index. Registration is tied 1:1
//! to construction and `destroy()`; entries hold [`Weak`] references, so a
//! cell that is simply dropped expires from the registry on the next
//! lookup instead of leaking.
//!
//! Because the cell is shared as `Arc`, its hook slots live on the cell
//! itself rather than on the inner [`DataCell`], and dispatch happens
//! after the value guard is released. A hook may therefore read the cell
//! it observes, including through [`IndexRegistry::get`].

use std::sync::{Arc, Weak};

use dashmap::DashMap;
use datum_core::{Error, Result, Value};
use datum_cell::DataCell;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::debug;

static GLOBAL: Lazy<Arc<IndexRegistry>> = Lazy::new(|| Arc::new(IndexRegistry::new()));

/// Process-wide lookup from numeric index to live indexed cells.
///
/// At most one entry exists per index; registering a second cell under the
/// same index replaces the first (last registration wins, mirroring cell
/// hook slots).
#[derive(Default)]
pub struct IndexRegistry {
    entries: DashMap<i64, Weak<IndexedCell>>,
}

impl IndexRegistry {
    /// Create an empty registry service.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide default registry.
    pub fn global() -> Arc<IndexRegistry> {
        GLOBAL.clone()
    }

    /// Look up a live cell by index, pruning an expired entry on miss.
    pub fn get(&self, index: i64) -> Option<Arc<IndexedCell>> {
        let entry = self.entries.get(&index)?;
        match entry.value().upgrade() {
            Some(cell) => Some(cell),
            None => {
                drop(entry);
                self.entries.remove(&index);
                None
            }
        }
    }

    /// Number of registered entries, counting not-yet-pruned expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn register(&self, index: i64, cell: &Arc<IndexedCell>) {
        self.entries.insert(index, Arc::downgrade(cell));
        debug!(index, "indexed cell registered");
    }

    /// Remove the entry for `index` if it still points at `cell`. A cell
    /// replaced under the same index must not evict its successor.
    fn unregister(&self, index: i64, cell: &IndexedCell) {
        self.entries.remove_if(&index, |_, weak| {
            weak.upgrade()
                .map(|live| std::ptr::eq(Arc::as_ptr(&live), cell))
                .unwrap_or(true)
        });
        debug!(index, "indexed cell unregistered");
    }
}

#[derive(Default)]
struct Hooks {
    on_set: Option<Box<dyn FnMut(Value) -> Value + Send>>,
    on_change: Option<Box<dyn FnMut(&Value, &Value) + Send>>,
    on_destroy: Option<Box<dyn FnMut() + Send>>,
}

/// A cell wrapping an Object value with a numeric identity field.
///
/// Shared as `Arc` so the registry can hand out live references; the inner
/// [`DataCell`] sits behind a mutex to keep the shared handle usable.
/// Hooks are never dispatched while that mutex is held.
pub struct IndexedCell {
    key: String,
    index: i64,
    registry: Weak<IndexRegistry>,
    inner: Mutex<DataCell>,
    hooks: Mutex<Hooks>,
}

impl IndexedCell {
    /// Wrap `object` and register it under the value of its `key` field.
    ///
    /// Fails with [`Error::IndexKey`] when the field is missing or does
    /// not hold an Int.
    pub fn new(
        registry: &Arc<IndexRegistry>,
        object: Value,
        key: impl Into<String>,
    ) -> Result<Arc<Self>> {
        let key = key.into();
        let index = match object.field(&key) {
            Some(field) => field.as_int().ok_or_else(|| Error::IndexKey {
                key: key.clone(),
                actual: field.kind_name(),
            })?,
            None => {
                return Err(Error::IndexKey {
                    key,
                    actual: "missing",
                })
            }
        };
        let cell = Arc::new(IndexedCell {
            key,
            index,
            registry: Arc::downgrade(registry),
            inner: Mutex::new(DataCell::builder(object).tag("IndexedCell").build()),
            hooks: Mutex::new(Hooks::default()),
        });
        registry.register(index, &cell);
        Ok(cell)
    }

    /// The numeric index this cell is registered under.
    pub fn index(&self) -> i64 {
        self.index
    }

    /// The field name the index was read from.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read-only tag naming the concrete container kind.
    pub fn tag(&self) -> &'static str {
        "IndexedCell"
    }

    /// Current wrapped value.
    pub fn value(&self) -> Value {
        self.inner.lock().value()
    }

    /// Set the wrapped value, running the hook chain.
    ///
    /// The registry entry is keyed by the index captured at construction;
    /// changing the identity field does not re-register the cell.
    pub fn set(&self, value: impl Into<Value>) -> Result<&Self> {
        {
            let inner = self.inner.lock();
            if inner.is_locked() {
                return Err(Error::Locked { op: "set" });
            }
            if inner.is_destroyed() {
                return Err(Error::Destroyed { op: "set" });
            }
        }
        let value = self.run_on_set(value.into());
        let old = {
            let mut inner = self.inner.lock();
            let old = inner.value();
            // revalidated here; a lock() that raced past the pre-check
            // still rejects the store
            inner.set(value.clone())?;
            old
        };
        if !value.deep_eq(&old) {
            self.dispatch_on_change(&value, &old);
        }
        Ok(self)
    }

    /// Apply a transform to the current value and store the result.
    pub fn update(&self, f: impl FnOnce(&Value) -> Value) -> Result<&Self> {
        let next = f(&self.value());
        self.set(next)
    }

    /// Reset the wrapped value to the empty sentinel.
    pub fn clear(&self) -> Result<&Self> {
        let old = {
            let mut inner = self.inner.lock();
            let old = inner.value();
            inner.clear()?;
            old
        };
        if !old.is_null() {
            self.dispatch_on_change(&Value::null(), &old);
        }
        Ok(self)
    }

    /// Unregister from the registry and release the value. Idempotent.
    pub fn destroy(&self) -> &Self {
        if let Some(registry) = self.registry.upgrade() {
            registry.unregister(self.index, self);
        }
        let newly_destroyed = {
            let mut inner = self.inner.lock();
            let was = inner.is_destroyed();
            inner.destroy();
            !was
        };
        if newly_destroyed {
            let taken = self.hooks.lock().on_destroy.take();
            if let Some(mut hook) = taken {
                hook();
                let mut hooks = self.hooks.lock();
                if hooks.on_destroy.is_none() {
                    hooks.on_destroy = Some(hook);
                }
            }
        }
        self
    }

    // =========================================================================
    // Hook dispatch (slot taken out for the call, so a hook may read or
    // even mutate this cell without deadlocking)
    // =========================================================================

    fn run_on_set(&self, value: Value) -> Value {
        let Some(mut hook) = self.hooks.lock().on_set.take() else {
            return value;
        };
        let value = hook(value);
        let mut hooks = self.hooks.lock();
        if hooks.on_set.is_none() {
            hooks.on_set = Some(hook);
        }
        value
    }

    fn dispatch_on_change(&self, new: &Value, old: &Value) {
        let taken = self.hooks.lock().on_change.take();
        if let Some(mut hook) = taken {
            hook(new, old);
            let mut hooks = self.hooks.lock();
            if hooks.on_change.is_none() {
                hooks.on_change = Some(hook);
            }
        }
    }

    // =========================================================================
    // Hooks (one slot each; last registration wins)
    // =========================================================================

    /// Register the pre-mutation transform.
    pub fn on_set(&self, f: impl FnMut(Value) -> Value + Send + 'static) -> &Self {
        self.hooks.lock().on_set = Some(Box::new(f));
        self
    }

    /// Unregister the pre-mutation transform.
    pub fn clear_on_set(&self) -> &Self {
        self.hooks.lock().on_set = None;
        self
    }

    /// Register the post-mutation observer, fed `(new, old)`.
    pub fn on_change(&self, f: impl FnMut(&Value, &Value) + Send + 'static) -> &Self {
        self.hooks.lock().on_change = Some(Box::new(f));
        self
    }

    /// Unregister the post-mutation observer.
    pub fn clear_on_change(&self) -> &Self {
        self.hooks.lock().on_change = None;
        self
    }

    /// Register the destroy observer.
    pub fn on_destroy(&self, f: impl FnMut() + Send + 'static) -> &Self {
        self.hooks.lock().on_destroy = Some(Box::new(f));
        self
    }

    /// Unregister the destroy observer.
    pub fn clear_on_destroy(&self) -> &Self {
        self.hooks.lock().on_destroy = None;
        self
    }

    // =========================================================================
    // Mutability control
    // =========================================================================

    /// Apply the shallow seal. Fails if locked.
    pub fn seal(&self) -> Result<&Self> {
        self.inner.lock().seal()?;
        Ok(self)
    }

    /// Apply the shallow freeze. Fails if locked.
    pub fn freeze(&self) -> Result<&Self> {
        self.inner.lock().freeze()?;
        Ok(self)
    }

    /// Deep-freeze the wrapped value and enter the locked state.
    pub fn lock(&self) -> &Self {
        self.inner.lock().lock();
        self
    }

    /// True iff not sealed, not frozen, not locked.
    pub fn is_mutable(&self) -> bool {
        self.inner.lock().is_mutable()
    }

    /// Whether the cell is sealed.
    pub fn is_sealed(&self) -> bool {
        self.inner.lock().is_sealed()
    }

    /// Whether the cell is frozen.
    pub fn is_frozen(&self) -> bool {
        self.inner.lock().is_frozen()
    }

    /// Whether the cell is locked.
    pub fn is_locked(&self) -> bool {
        self.inner.lock().is_locked()
    }
}

impl std::fmt::Debug for IndexedCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexedCell")
            .field("key", &self.key)
            .field("index", &self.index)
            .field("value", &self.value())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
