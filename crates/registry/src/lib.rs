//! # datum-registry
//!
//! Process-wide registry services and the cell variants tied to them:
//! [`IndexedCell`] looked up by a numeric identity field through an
//! [`IndexRegistry`], and [`NamedCell`] whose value lives in a
//! [`NamedRegistry`] under a string name.
//!
//! Both registries are explicit services (constructed and passed around,
//! with a process-wide default behind `global()`), not hidden class-level
//! state. Registration is tied 1:1 to construction and `destroy()`.

#![warn(missing_docs)]

mod indexed;
mod named;

pub use indexed::{IndexRegistry, IndexedCell};
pub use named::{NamedCell, NamedRegistry};
