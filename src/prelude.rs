//! Convenience re-exports for the common surface.
//!
//! ```
//! use datum::prelude::*;
//! ```

pub use crate::{
    AsyncAdapter, AsyncDataCell, CellBuilder, Comparator, DataCell, Error, IndexRegistry,
    IndexedCell, MemoryAdapter, Mutability, NamedCell, NamedRegistry, Result, StorageAdapter,
    Value,
};
