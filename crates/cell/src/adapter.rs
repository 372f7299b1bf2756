//! Storage delegation.
//!
//! A cell either stores its value directly or forwards every operation to
//! a [`StorageAdapter`] chosen at construction. The adapter is never
//! swapped afterwards; it carries the initial value itself.

use datum_core::{Result, Value};

/// Value-access contract a delegate must implement.
///
/// Mirrors the cell surface: reads go through `value()`, mutation through
/// `set`/`clear`/`destroy`. Implementations are constructed with the
/// initial value before being handed to the cell.
pub trait StorageAdapter: Send {
    /// Current value held by the delegate.
    fn value(&self) -> Value;

    /// Replace the held value.
    fn set(&mut self, value: Value) -> Result<()>;

    /// Reset the held value to the empty sentinel.
    fn clear(&mut self) -> Result<()>;

    /// Release the held value and any external association.
    fn destroy(&mut self) -> Result<()>;
}

/// In-memory reference adapter.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    value: Value,
}

impl MemoryAdapter {
    /// Create an adapter holding the initial value.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl StorageAdapter for MemoryAdapter {
    fn value(&self) -> Value {
        self.value.clone()
    }

    fn set(&mut self, value: Value) -> Result<()> {
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
