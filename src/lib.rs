//! # Datum
//!
//! Small object-style wrappers around mutable values: each container holds
//! exactly one logical value and decorates mutation with lifecycle hooks,
//! an immutability state machine, and optional storage delegation.
//!
//! ## Quick Start
//!
//! ```
//! use datum::prelude::*;
//!
//! let mut cell = DataCell::new(5);
//! cell.on_set(|v| Value::from(v.as_int().unwrap_or(0) + 1))
//!     .on_change(|new, old| println!("{old:?} -> {new:?}"));
//!
//! cell.set(9)?; // stores 10, prints the change
//! assert_eq!(cell.value(), Value::from(10));
//!
//! cell.lock();
//! assert!(cell.set(11).is_err()); // locked is terminal
//! # Ok::<(), datum::Error>(())
//! ```
//!
//! ## Pieces
//!
//! - [`Value`] - the canonical value model: a shared node graph with
//!   per-node freeze flags, structural equality, and canonical JSON
//! - [`DataCell`] - the hook-dispatching container (`set`/`clear`/
//!   `destroy` with `on_set`/`on_change`/`on_destroy`)
//! - [`Mutability`] - mutable → sealed → frozen → locked, one-directional
//! - [`StorageAdapter`] / [`AsyncAdapter`] - delegation seam chosen at
//!   construction, sync or all-async
//! - [`IndexedCell`] / [`NamedCell`] - variants registered in explicit
//!   process-wide registry services
//!
//! ## Lifecycle rules
//!
//! The empty sentinel is [`Value::null`]. `clear()` fires `on_change`
//! only when the value actually changed and never runs `on_set`;
//! `destroy()` fires only `on_destroy`, exactly once.

#![warn(missing_docs)]

pub mod prelude;

// Core types
pub use datum_core::{Comparator, Error, Mutability, Result, Value};

// Containers and delegation
pub use datum_cell::{AsyncAdapter, AsyncDataCell, CellBuilder, DataCell, MemoryAdapter, StorageAdapter};

// Registry variants
pub use datum_registry::{IndexRegistry, IndexedCell, NamedCell, NamedRegistry};
