//! Asynchronous adapter mode.
//!
//! The async mode is an all-or-nothing switch fixed at construction: an
//! [`AsyncDataCell`] makes every container operation return a future, so
//! callers treat the whole surface as potentially asynchronous. It is a
//! cooperative contract, not concurrency - no two operations on one cell
//! are assumed to run at the same time, and there is no cancellation or
//! timeout handling.
//!
//! Hook and guard semantics are identical to the synchronous
//! [`DataCell`](crate::DataCell); errors surface as `Err` from the
//! returned future.

use std::future::Future;

use datum_core::{Comparator, Error, Mutability, Result, Value};
use tracing::{trace, warn};

/// Value-access contract for asynchronous delegates.
///
/// The counterpart of [`StorageAdapter`](crate::StorageAdapter) with
/// future-returning operations. Implementations usually just write
/// `async fn` bodies.
pub trait AsyncAdapter: Send {
    /// Current value held by the delegate.
    fn value(&self) -> impl Future<Output = Value> + Send;

    /// Replace the held value.
    fn set(&mut self, value: Value) -> impl Future<Output = Result<()>> + Send;

    /// Reset the held value to the empty sentinel.
    fn clear(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Release the held value and any external association.
    fn destroy(&mut self) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Default)]
struct Hooks {
    on_set: Option<Box<dyn FnMut(Value) -> Value + Send>>,
    on_change: Option<Box<dyn FnMut(&Value, &Value) + Send>>,
    on_destroy: Option<Box<dyn FnMut() + Send>>,
}

/// Asynchronous hook-dispatching container delegating to an
/// [`AsyncAdapter`].
pub struct AsyncDataCell<A: AsyncAdapter> {
    adapter: A,
    hooks: Hooks,
    mutability: Mutability,
    comparator: Comparator,
    destroyed: bool,
    tag: &'static str,
}

impl<A: AsyncAdapter> AsyncDataCell<A> {
    /// Create a cell around an adapter that already carries the initial
    /// value.
    pub fn new(adapter: A) -> Self {
        AsyncDataCell {
            adapter,
            hooks: Hooks::default(),
            mutability: Mutability::new(),
            comparator: Comparator::default(),
            destroyed: false,
            tag: "AsyncDataCell",
        }
    }

    /// Override the change-detection policy.
    pub fn with_comparator(mut self, comparator: Comparator) -> Self {
        self.comparator = comparator;
        self
    }

    /// Current value; the empty sentinel after `destroy`.
    pub async fn value(&self) -> Value {
        if self.destroyed {
            return Value::null();
        }
        self.adapter.value().await
    }

    /// Read-only tag naming the concrete container kind.
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Set the value, running the hook chain.
    pub async fn set(&mut self, value: impl Into<Value>) -> Result<&mut Self> {
        self.mutability.validate("set")?;
        if self.destroyed {
            return Err(Error::Destroyed { op: "set" });
        }
        let mut value = value.into();
        if let Some(transform) = self.hooks.on_set.as_mut() {
            value = transform(value);
        }
        let old = self.adapter.value().await;
        self.adapter.set(value.clone()).await?;
        if self.comparator.changed(&old, &value) {
            if let Some(observe) = self.hooks.on_change.as_mut() {
                observe(&value, &old);
            }
        }
        trace!(tag = self.tag, "value set");
        Ok(self)
    }

    /// Apply a transform to the current value and store the result.
    pub async fn update(&mut self, f: impl FnOnce(&Value) -> Value) -> Result<&mut Self> {
        let next = f(&self.value().await);
        self.set(next).await
    }

    /// Reset to the empty sentinel; `on_change` fires iff the value
    /// actually changed, `on_set` never runs.
    pub async fn clear(&mut self) -> Result<&mut Self> {
        self.mutability.validate("clear")?;
        if self.destroyed {
            return Ok(self);
        }
        let old = self.adapter.value().await;
        self.adapter.clear().await?;
        let sentinel = Value::null();
        if self.comparator.changed(&old, &sentinel) {
            if let Some(observe) = self.hooks.on_change.as_mut() {
                observe(&sentinel, &old);
            }
        }
        Ok(self)
    }

    /// Release the value and fire `on_destroy` exactly once. Idempotent.
    pub async fn destroy(&mut self) -> &mut Self {
        if self.destroyed {
            return self;
        }
        if let Err(error) = self.adapter.destroy().await {
            warn!(tag = self.tag, %error, "adapter destroy failed");
        }
        self.destroyed = true;
        if let Some(observe) = self.hooks.on_destroy.as_mut() {
            observe();
        }
        self
    }

    /// Deep-freeze the adapter's value and enter the locked state.
    pub async fn lock(&mut self) -> &mut Self {
        self.adapter.value().await.deep_freeze();
        self.mutability.lock();
        self
    }

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

    /// Register the pre-mutation transform.
    pub fn on_set(&mut self, f: impl FnMut(Value) -> Value + Send + 'static) -> &mut Self {
        self.hooks.on_set = Some(Box::new(f));
        self
    }

    /// Register the post-mutation observer, fed `(new, old)`.
    pub fn on_change(&mut self, f: impl FnMut(&Value, &Value) + Send + 'static) -> &mut Self {
        self.hooks.on_change = Some(Box::new(f));
        self
    }

    /// Register the destroy observer.
    pub fn on_destroy(&mut self, f: impl FnMut() + Send + 'static) -> &mut Self {
        self.hooks.on_destroy = Some(Box::new(f));
        self
    }

    /// Unregister the pre-mutation transform.
    pub fn clear_on_set(&mut self) -> &mut Self {
        self.hooks.on_set = None;
        self
    }

    /// Unregister the post-mutation observer.
    pub fn clear_on_change(&mut self) -> &mut Self {
        self.hooks.on_change = None;
        self
    }

    /// Unregister the destroy observer.
    pub fn clear_on_destroy(&mut self) -> &mut Self {
        self.hooks.on_destroy = None;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
