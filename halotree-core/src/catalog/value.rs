//! Typed column storage and runtime-checked field access.

use crate::catalog::FieldKind;

/// One loaded column, stored as a dense vector of its kind
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Column {
    Int(Vec<i64>),
    Real(Vec<f64>),
}

impl Column {
    pub(crate) fn with_capacity(kind: FieldKind, capacity: usize) -> Self {
        match kind {
            FieldKind::Int => Column::Int(Vec::with_capacity(capacity)),
            FieldKind::Real => Column::Real(Vec::with_capacity(capacity)),
        }
    }

    pub(crate) fn kind(&self) -> FieldKind {
        match self {
            Column::Int(_) => FieldKind::Int,
            Column::Real(_) => FieldKind::Real,
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Column::Int(values) => values.len(),
            Column::Real(values) => values.len(),
        }
    }

    pub(crate) fn value(&self, row: usize) -> Option<FieldValue> {
        match self {
            Column::Int(values) => values.get(row).copied().map(FieldValue::Int),
            Column::Real(values) => values.get(row).copied().map(FieldValue::Real),
        }
    }
}

/// A single field value read from a catalog
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    /// Integer field
    Int(i64),
    /// Floating point field
    Real(f64),
}

impl FieldValue {
    /// Storage kind of this value
    #[must_use]
    pub fn kind(self) -> FieldKind {
        match self {
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::Real(_) => FieldKind::Real,
        }
    }

    /// Numeric value widened to `f64`.
    ///
    /// Integer ids above 2^53 lose precision; use [`FieldValue::as_int`] for ids.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            FieldValue::Int(v) => v as f64,
            FieldValue::Real(v) => v,
        }
    }

    /// Integer payload, if this is an integer field
    #[must_use]
    pub fn as_int(self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(v),
            FieldValue::Real(_) => None,
        }
    }
}

/// Rust types that can be read out of a catalog column.
///
/// Implemented for `i64` and `f64`; the accessor checks the column kind at
/// runtime and reports a mismatch instead of converting.
pub trait FieldType: Copy + sealed::Sealed {
    /// Column kind this type reads from
    const KIND: FieldKind;

    /// Extracts the payload if `value` has this type's kind
    fn from_value(value: FieldValue) -> Option<Self>;
}

impl FieldType for i64 {
    const KIND: FieldKind = FieldKind::Int;

    fn from_value(value: FieldValue) -> Option<Self> {
        value.as_int()
    }
}

impl FieldType for f64 {
    const KIND: FieldKind = FieldKind::Real;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Real(v) => Some(v),
            FieldValue::Int(_) => None,
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for i64 {}
    impl Sealed for f64 {}
}
