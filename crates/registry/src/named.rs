//! Name registry and the named cell variant.
//!
//! A [`NamedCell`] keeps its value inside an explicit [`NamedRegistry`]
//! service instead of holding it directly: the registry is the storage.
//! The wiring goes through the ordinary [`StorageAdapter`] seam, so the
//! named variant doubles as the in-tree example of adapter delegation.
//! One value exists per name; constructing a second cell under the same
//! name takes the entry over, and `destroy()` removes it.

use std::sync::Arc;

use dashmap::DashMap;
use datum_core::{Result, Value};
use datum_cell::{DataCell, StorageAdapter};
use once_cell::sync::Lazy;
use tracing::debug;

static GLOBAL: Lazy<Arc<NamedRegistry>> = Lazy::new(|| Arc::new(NamedRegistry::new()));

/// Process-wide name-to-value store backing named cells.
#[derive(Default)]
pub struct NamedRegistry {
    entries: DashMap<String, Value>,
}

impl NamedRegistry {
    /// Create an empty registry service.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide default registry.
    pub fn global() -> Arc<NamedRegistry> {
        GLOBAL.clone()
    }

    /// Current value stored under `name`, if any cell owns that name.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.entries.get(name).map(|entry| entry.value().clone())
    }

    /// Whether a value is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of named entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Registry-backed storage delegate for one name.
struct NamedAdapter {
    name: String,
    registry: Arc<NamedRegistry>,
}

impl StorageAdapter for NamedAdapter {
    fn value(&self) -> Value {
        self.registry
            .entries
            .get(&self.name)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(Value::null)
    }

    fn set(&mut self, value: Value) -> Result<()> {
        self.registry.entries.insert(self.name.clone(), value);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.registry
            .entries
            .insert(self.name.clone(), Value::null());
        Ok(())
    }

    fn destroy(&mut self) -> Result<()> {
        self.registry.entries.remove(&self.name);
        debug!(name = %self.name, "named entry removed");
        Ok(())
    }
}

/// A cell whose value lives in a [`NamedRegistry`] under a string name.
pub struct NamedCell {
    name: String,
    cell: DataCell,
}

impl NamedCell {
    /// Store `value` under `name` in the registry and wrap it in a cell.
    pub fn new(
        registry: &Arc<NamedRegistry>,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        let name = name.into();
        // seed the entry; the registry is the storage
        registry.entries.insert(name.clone(), value.into());
        let adapter = NamedAdapter {
            name: name.clone(),
            registry: registry.clone(),
        };
        debug!(name = %name, "named cell registered");
        NamedCell {
            name,
            cell: DataCell::builder(Value::null())
                .adapter(adapter)
                .tag("NamedCell")
                .build(),
        }
    }

    /// The name this cell's value is stored under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read-only tag naming the concrete container kind.
    pub fn tag(&self) -> &'static str {
        self.cell.tag()
    }

    /// Current value read through the registry.
    pub fn value(&self) -> Value {
        self.cell.value()
    }

    /// Set the value, running the hook chain; writes through to the
    /// registry entry.
    pub fn set(&mut self, value: impl Into<Value>) -> Result<&mut Self> {
        self.cell.set(value)?;
        Ok(self)
    }

    /// Apply a transform to the current value and store the result.
    pub fn update(&mut self, f: impl FnOnce(&Value) -> Value) -> Result<&mut Self> {
        self.cell.update(f)?;
        Ok(self)
    }

    /// Reset the registry entry to the empty sentinel.
    pub fn clear(&mut self) -> Result<&mut Self> {
        self.cell.clear()?;
        Ok(self)
    }

    /// Remove the registry entry and fire `on_destroy`. Idempotent.
    pub fn destroy(&mut self) -> &mut Self {
        self.cell.destroy();
        self
    }

    /// Register the pre-mutation transform.
    pub fn on_set(&mut self, f: impl FnMut(Value) -> Value + Send + 'static) -> &mut Self {
        self.cell.on_set(f);
        self
    }

    /// Unregister the pre-mutation transform.
    pub fn clear_on_set(&mut self) -> &mut Self {
        self.cell.clear_on_set();
        self
    }

    /// Register the post-mutation observer, fed `(new, old)`.
    pub fn on_change(&mut self, f: impl FnMut(&Value, &Value) + Send + 'static) -> &mut Self {
        self.cell.on_change(f);
        self
    }

    /// Unregister the post-mutation observer.
    pub fn clear_on_change(&mut self) -> &mut Self {
        self.cell.clear_on_change();
        self
    }

    /// Register the destroy observer.
    pub fn on_destroy(&mut self, f: impl FnMut() + Send + 'static) -> &mut Self {
        self.cell.on_destroy(f);
        self
    }

    /// Unregister the destroy observer.
    pub fn clear_on_destroy(&mut self) -> &mut Self {
        self.cell.clear_on_destroy();
        self
    }

    /// Apply the shallow seal. Fails if locked.
    pub fn seal(&mut self) -> Result<&mut Self> {
        self.cell.seal()?;
        Ok(self)
    }

    /// Apply the shallow freeze. Fails if locked.
    pub fn freeze(&mut self) -> Result<&mut Self> {
        self.cell.freeze()?;
        Ok(self)
    }

    /// Deep-freeze the stored value and enter the locked state.
    pub fn lock(&mut self) -> &mut Self {
        self.cell.lock();
        self
    }

    /// True iff not sealed, not frozen, not locked.
    pub fn is_mutable(&self) -> bool {
        self.cell.is_mutable()
    }

    /// Whether the cell is sealed.
    pub fn is_sealed(&self) -> bool {
        self.cell.is_sealed()
    }

    /// Whether the cell is frozen.
    pub fn is_frozen(&self) -> bool {
        self.cell.is_frozen()
    }

    /// Whether the cell is locked.
    pub fn is_locked(&self) -> bool {
        self.cell.is_locked()
    }
}

impl std::fmt::Debug for NamedCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedCell")
            .field("name", &self.name)
            .field("value", &self.value())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
