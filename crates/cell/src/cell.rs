//! Hook-dispatching value container.
//!
//! [`DataCell`] wraps exactly one logical value and decorates every
//! mutation with guard checks and hook dispatch:
//!
//! 1. `validate()` - rejected with [`Error::Locked`] on a locked cell
//! 2. `on_set` - pre-mutation transform, its return is the effective value
//! 3. store - direct field or delegated [`StorageAdapter`]
//! 4. `on_change(new, old)` - fires iff the comparator reports a difference
//! 5. the cell is returned for chaining
//!
//! ## Lifecycle rules
//!
//! - `clear()` resets to the empty sentinel ([`Value::null`]); it never
//!   runs `on_set`, and fires `on_change` only when the value actually
//!   changed.
//! - `destroy()` releases the value and fires `on_destroy` exactly once;
//!   it never re-invokes `on_set` or `on_change`, never fails, and is
//!   idempotent. Reads on a destroyed cell return the sentinel; `set`
//!   fails with [`Error::Destroyed`].

use datum_core::{Comparator, Error, Mutability, Result, Value};
use tracing::{trace, warn};

use crate::adapter::StorageAdapter;

enum Storage {
    Direct(Value),
    Delegated(Box<dyn StorageAdapter>),
}

impl Storage {
    fn value(&self) -> Value {
        match self {
            Storage::Direct(value) => value.clone(),
            Storage::Delegated(adapter) => adapter.value(),
        }
    }

    fn set(&mut self, value: Value) -> Result<()> {
        match self {
            Storage::Direct(slot) => {
                *slot = value;
                Ok(())
            }
            Storage::Delegated(adapter) => adapter.set(value),
        }
    }

    fn clear(&mut self) -> Result<()> {
        match self {
            Storage::Direct(slot) => {
                *slot = Value::null();
                Ok(())
            }
            Storage::Delegated(adapter) => adapter.clear(),
        }
    }

    fn destroy(&mut self) -> Result<()> {
        match self {
            Storage::Direct(slot) => {
                *slot = Value::null();
                Ok(())
            }
            Storage::Delegated(adapter) => adapter.destroy(),
        }
    }
}

#[derive(Default)]
struct Hooks {
    on_set: Option<Box<dyn FnMut(Value) -> Value + Send>>,
    on_change: Option<Box<dyn FnMut(&Value, &Value) + Send>>,
    on_destroy: Option<Box<dyn FnMut() + Send>>,
}

/// Single-value container with lifecycle hooks, immutability locking, and
/// optional storage delegation.
pub struct DataCell {
    storage: Storage,
    hooks: Hooks,
    mutability: Mutability,
    comparator: Comparator,
    destroyed: bool,
    tag: &'static str,
}

impl DataCell {
    /// Create a cell with direct in-instance storage.
    pub fn new(value: impl Into<Value>) -> Self {
        DataCell::builder(value).build()
    }

    /// Create a cell delegating storage to an adapter. The adapter carries
    /// the initial value.
    pub fn with_adapter(adapter: impl StorageAdapter + 'static) -> Self {
        CellBuilder::default().adapter(adapter).build()
    }

    /// Start a builder with the given initial value.
    pub fn builder(value: impl Into<Value>) -> CellBuilder {
        CellBuilder {
            value: value.into(),
            ..CellBuilder::default()
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current value. Never fails; the empty sentinel after `clear` or
    /// `destroy`.
    pub fn value(&self) -> Value {
        if self.destroyed {
            return Value::null();
        }
        self.storage.value()
    }

    /// Read-only tag naming the concrete container kind.
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Whether `destroy()` has been called.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Set the value, running the hook chain.
    pub fn set(&mut self, value: impl Into<Value>) -> Result<&mut Self> {
        self.mutability.validate("set")?;
        if self.destroyed {
            return Err(Error::Destroyed { op: "set" });
        }
        let mut value = value.into();
        if let Some(transform) = self.hooks.on_set.as_mut() {
            value = transform(value);
        }
        let old = self.storage.value();
        self.storage.set(value.clone())?;
        if self.comparator.changed(&old, &value) {
            if let Some(observe) = self.hooks.on_change.as_mut() {
                observe(&value, &old);
            }
        }
        trace!(tag = self.tag, "value set");
        Ok(self)
    }

    /// Apply a transform to the current value and store the result.
    pub fn update(&mut self, f: impl FnOnce(&Value) -> Value) -> Result<&mut Self> {
        let next = f(&self.value());
        self.set(next)
    }

    /// Reset to the empty sentinel.
    ///
    /// Does not run `on_set`; fires `on_change(Null, old)` iff the stored
    /// value was not already the sentinel.
    pub fn clear(&mut self) -> Result<&mut Self> {
        self.mutability.validate("clear")?;
        if self.destroyed {
            return Ok(self);
        }
        let old = self.storage.value();
        self.storage.clear()?;
        let sentinel = Value::null();
        if self.comparator.changed(&old, &sentinel) {
            if let Some(observe) = self.hooks.on_change.as_mut() {
                observe(&sentinel, &old);
            }
        }
        trace!(tag = self.tag, "value cleared");
        Ok(self)
    }

    /// Release the value and fire `on_destroy` exactly once.
    ///
    /// Idempotent; a second call is a no-op. Adapter failures during
    /// release are logged and swallowed so teardown always completes.
    pub fn destroy(&mut self) -> &mut Self {
        if self.destroyed {
            return self;
        }
        if let Err(error) = self.storage.destroy() {
            warn!(tag = self.tag, %error, "adapter destroy failed");
        }
        self.destroyed = true;
        if let Some(observe) = self.hooks.on_destroy.as_mut() {
            observe();
        }
        trace!(tag = self.tag, "cell destroyed");
        self
    }

    // =========================================================================
    // Hooks (one slot each; last registration wins)
    // =========================================================================

    /// Register the pre-mutation transform.
    pub fn on_set(&mut self, f: impl FnMut(Value) -> Value + Send + 'static) -> &mut Self {
        self.hooks.on_set = Some(Box::new(f));
        self
    }

    /// Unregister the pre-mutation transform.
    pub fn clear_on_set(&mut self) -> &mut Self {
        self.hooks.on_set = None;
        self
    }

    /// Register the post-mutation observer, fed `(new, old)`.
    pub fn on_change(&mut self, f: impl FnMut(&Value, &Value) + Send + 'static) -> &mut Self {
        self.hooks.on_change = Some(Box::new(f));
        self
    }

    /// Unregister the post-mutation observer.
    pub fn clear_on_change(&mut self) -> &mut Self {
        self.hooks.on_change = None;
        self
    }

    /// Register the destroy observer.
    pub fn on_destroy(&mut self, f: impl FnMut() + Send + 'static) -> &mut Self {
        self.hooks.on_destroy = Some(Box::new(f));
        self
    }

    /// Unregister the destroy observer.
    pub fn clear_on_destroy(&mut self) -> &mut Self {
        self.hooks.on_destroy = None;
        self
    }

    // =========================================================================
    // Mutability control
    // =========================================================================

    /// Apply the shallow seal. Fails if locked.
    pub fn seal(&mut self) -> Result<&mut Self> {
        self.mutability.seal()?;
        Ok(self)
    }

    /// Apply the shallow freeze. Fails if locked.
    pub fn freeze(&mut self) -> Result<&mut Self> {
        self.mutability.freeze()?;
        Ok(self)
    }

    /// Deep-freeze the wrapped value and enter the terminal locked state.
    ///
    /// Subsequent `set`/`seal`/`freeze` fail with [`Error::Locked`]; a
    /// second `lock()` is a no-op.
    pub fn lock(&mut self) -> &mut Self {
        self.value().deep_freeze();
        self.mutability.lock();
        trace!(tag = self.tag, "cell locked");
        self
    }

    /// True iff not sealed, not frozen, not locked.
    pub fn is_mutable(&self) -> bool {
        self.mutability.is_mutable()
    }

    /// Whether the cell is sealed.
    pub fn is_sealed(&self) -> bool {
        self.mutability.is_sealed()
    }

    /// Whether the cell is frozen.
    pub fn is_frozen(&self) -> bool {
        self.mutability.is_frozen()
    }

    /// Whether the cell is locked.
    pub fn is_locked(&self) -> bool {
        self.mutability.is_locked()
    }
}

impl std::fmt::Debug for DataCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataCell")
            .field("tag", &self.tag)
            .field("value", &self.value())
            .field("mutability", &self.mutability)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

/// Builder for [`DataCell`]: initial value, optional adapter, comparator
/// policy, and tag override.
pub struct CellBuilder {
    value: Value,
    adapter: Option<Box<dyn StorageAdapter>>,
    comparator: Comparator,
    tag: &'static str,
}

impl Default for CellBuilder {
    fn default() -> Self {
        CellBuilder {
            value: Value::null(),
            adapter: None,
            comparator: Comparator::default(),
            tag: "DataCell",
        }
    }
}

impl CellBuilder {
    /// Delegate storage to an adapter. The adapter's current value wins
    /// over any initial value given to the builder.
    pub fn adapter(mut self, adapter: impl StorageAdapter + 'static) -> Self {
        self.adapter = Some(Box::new(adapter));
        self
    }

    /// Override the change-detection policy.
    pub fn comparator(mut self, comparator: Comparator) -> Self {
        self.comparator = comparator;
        self
    }

    /// Override the container kind tag.
    pub fn tag(mut self, tag: &'static str) -> Self {
        self.tag = tag;
        self
    }

    /// Finish the cell.
    pub fn build(self) -> DataCell {
        let storage = match self.adapter {
            Some(adapter) => Storage::Delegated(adapter),
            None => Storage::Direct(self.value),
        };
        DataCell {
            storage,
            hooks: Hooks::default(),
            mutability: Mutability::new(),
            comparator: self.comparator,
            destroyed: false,
            tag: self.tag,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
