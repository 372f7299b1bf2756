//! # datum-core
//!
//! Core types for the Datum workspace: the canonical [`Value`] model, the
//! [`Mutability`] state machine, the change-detection [`Comparator`], and
//! the unified [`Error`] taxonomy.
//!
//! Containers live in `datum-cell`; the indexed/named registries live in
//! `datum-registry`. This crate holds everything they agree on.

#![warn(missing_docs)]

mod compare;
mod error;
mod mutability;
mod value;

pub use compare::Comparator;
pub use error::{Error, Result};
pub use mutability::Mutability;
pub use value::Value;
