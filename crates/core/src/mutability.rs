//! Immutability state machine.
//!
//! Tracks whether an instance is mutable, sealed, frozen, or locked, and
//! gates every mutating operation. Transitions are one-directional: there
//! is no unseal, unfreeze, or unlock.
//!
//! ## States
//!
//! - `mutable` - none of the flags set; everything is permitted
//! - `sealed` - shape is fixed; reported by `is_sealed`
//! - `frozen` - shallow-frozen; `freeze` implies `sealed`
//! - `locked` - terminal; `set`/`seal`/`freeze` are rejected with
//!   [`Error::Locked`], and the owner is expected to have deep-frozen the
//!   wrapped value before locking
//!
//! A second `lock()` is not itself rejected (locking is idempotent), but
//! `seal()`/`freeze()` called after `lock()` fail rather than silently
//! no-oping.

use crate::error::{Error, Result};

/// Per-instance mutability state.
#[derive(Debug, Default, Clone)]
pub struct Mutability {
    sealed: bool,
    frozen: bool,
    locked: bool,
}

impl Mutability {
    /// A fresh, fully mutable state.
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff not sealed, not frozen, not locked.
    pub fn is_mutable(&self) -> bool {
        !self.sealed && !self.frozen && !self.locked
    }

    /// Whether `seal` (or `freeze`, which implies it) has been applied.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Whether `freeze` has been applied.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Whether the terminal `lock` state has been reached.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Apply the shallow seal. Fails if already locked.
    pub fn seal(&mut self) -> Result<()> {
        self.validate("seal")?;
        self.sealed = true;
        Ok(())
    }

    /// Apply the shallow freeze (implies sealed). Fails if already locked.
    pub fn freeze(&mut self) -> Result<()> {
        self.validate("freeze")?;
        self.sealed = true;
        self.frozen = true;
        Ok(())
    }

    /// Enter the terminal locked state. Idempotent; never fails.
    ///
    /// The caller deep-freezes the wrapped value before calling this.
    pub fn lock(&mut self) {
        self.sealed = true;
        self.frozen = true;
        self.locked = true;
    }

    /// Guard called before every mutating operation.
    pub fn validate(&self, op: &'static str) -> Result<()> {
        if self.locked {
            return Err(Error::Locked { op });
        }
        Ok(())
    }
}
