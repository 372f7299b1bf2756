//! Change-detection policy.
//!
//! Containers decide whether `on_change` fires by comparing the previous
//! and effective new value through a [`Comparator`]. The default is
//! structural deep equality; the legacy canonical-JSON policy is kept for
//! callers that want serialized-text comparison, and a custom predicate can be
//! injected for anything else.

use std::fmt;

use crate::value::Value;

/// Equality policy used for `on_change` dispatch.
pub enum Comparator {
    /// Structural deep equality (cycle-safe, IEEE-754 floats). Default.
    Structural,
    /// Canonical-JSON string comparison, the legacy policy. Values whose
    /// serialization fails (cyclic graphs) always count as changed.
    CanonicalJson,
    /// Caller-supplied equality predicate; returns true when equal.
    Custom(Box<dyn Fn(&Value, &Value) -> bool + Send>),
}

impl Comparator {
    /// Wrap a custom equality predicate.
    pub fn custom(eq: impl Fn(&Value, &Value) -> bool + Send + 'static) -> Self {
        Comparator::Custom(Box::new(eq))
    }

    /// Whether the two values count as different under this policy.
    pub fn changed(&self, old: &Value, new: &Value) -> bool {
        match self {
            Comparator::Structural => !old.deep_eq(new),
            Comparator::CanonicalJson => {
                match (old.to_canonical_json(), new.to_canonical_json()) {
                    (Ok(a), Ok(b)) => a != b,
                    _ => true,
                }
            }
            Comparator::Custom(eq) => !eq(old, new),
        }
    }
}

impl Default for Comparator {
    fn default() -> Self {
        Comparator::Structural
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::Structural => f.write_str("Comparator::Structural"),
            Comparator::CanonicalJson => f.write_str("Comparator::CanonicalJson"),
            Comparator::Custom(_) => f.write_str("Comparator::Custom(..)"),
        }
    }
}
