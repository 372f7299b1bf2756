//! # datum-cell
//!
//! The hook-dispatching value container and its storage delegation
//! contracts: [`DataCell`] with direct or adapter-backed storage, the
//! [`StorageAdapter`] trait with the in-memory reference implementation,
//! and the all-async rendition [`AsyncDataCell`]/[`AsyncAdapter`].

#![warn(missing_docs)]

mod adapter;
mod async_cell;
mod cell;

pub use adapter::{MemoryAdapter, StorageAdapter};
pub use async_cell::{AsyncAdapter, AsyncDataCell};
pub use cell::{CellBuilder, DataCell};
