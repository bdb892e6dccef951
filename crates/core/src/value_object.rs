//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity** — they are defined entirely by their
//! attribute values. Two value objects with the same values are equal.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// create a new one with the new values. `Sku` is the canonical example here:
/// `Sku::parse("ABC-1")` equals any other `Sku` parsed from the same text,
/// regardless of which product carries it.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
