//! Column-indexed access to a parsed halo catalog.
//!
//! A [`Catalog`] stores only the fields named in its column mask, one dense
//! typed column per field. Fields are addressed by a [`ColumnKey`] resolved
//! once from the field name, then read per row with a runtime kind check.

#[cfg(feature = "internals")]
pub mod reader;
#[cfg(not(feature = "internals"))]
pub(crate) mod reader;

mod schema;
mod value;

pub use schema::{CatalogFormat, FieldKind, FieldSpec};
pub use value::{FieldType, FieldValue};

use crate::error::{Error, Result};
use crate::header::CatalogHeader;
use std::path::Path;
use std::time::Instant;
use value::Column;

/// Resolved handle to a loaded column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnKey(usize);

impl ColumnKey {
    /// Internal column index
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Read-only, typed view of one catalog file
#[derive(Debug)]
pub struct Catalog {
    format: CatalogFormat,
    fields: Vec<FieldSpec>,
    columns: Vec<Column>,
    header: CatalogHeader,
    rows: usize,
}

impl Catalog {
    /// Loads a catalog file, keeping only the fields named in `mask`.
    ///
    /// An empty mask loads every field of the format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if the mask names a field the format
    /// does not have, plus any I/O, encoding or row parsing error.
    pub fn read_data_from_file<P, S>(path: P, format: CatalogFormat, mask: &[S]) -> Result<Self>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let path = path.as_ref();
        let fields = resolve_mask(format, mask)?;

        let started = Instant::now();
        let parsed = reader::read_file(path, format, &fields)?;
        let elapsed = started.elapsed().as_secs_f64();

        #[allow(clippy::cast_precision_loss)]
        let rows_per_second = if elapsed > 0.0 { parsed.rows as f64 / elapsed } else { 0.0 };
        tracing::info!(
            path = %path.display(),
            %format,
            rows = parsed.rows,
            seconds = elapsed,
            rows_per_second,
            "loaded catalog"
        );

        Ok(Self::from_parts(format, fields, parsed))
    }

    /// Parses catalog text already in memory
    ///
    /// # Errors
    ///
    /// Same as [`Catalog::read_data_from_file`], minus I/O.
    pub fn parse<S: AsRef<str>>(text: &str, format: CatalogFormat, mask: &[S]) -> Result<Self> {
        let fields = resolve_mask(format, mask)?;
        let parsed = reader::parse_rows(text, format, &fields)?;
        Ok(Self::from_parts(format, fields, parsed))
    }

    fn from_parts(format: CatalogFormat, fields: Vec<FieldSpec>, parsed: reader::ParsedRows) -> Self {
        debug_assert!(parsed.columns.iter().all(|c| c.len() == parsed.rows));
        Self { format, fields, columns: parsed.columns, header: parsed.header, rows: parsed.rows }
    }

    /// File format this catalog was read as
    pub fn format(&self) -> CatalogFormat {
        self.format
    }

    /// Leading comment block of the source file
    pub fn header(&self) -> &CatalogHeader {
        &self.header
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// True when the catalog has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Number of loaded columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Names of the loaded fields, in internal column order
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|spec| spec.name)
    }

    /// Resolves a field name to its internal column
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if the field was not loaded.
    pub fn internal_key(&self, name: &str) -> Result<ColumnKey> {
        self.fields
            .iter()
            .position(|spec| spec.name == name)
            .map(ColumnKey)
            .ok_or_else(|| Error::UnknownField(name.to_string()))
    }

    /// Resolves a field name only if it was loaded
    pub fn optional_key(&self, name: &str) -> Option<ColumnKey> {
        self.internal_key(name).ok()
    }

    /// Schema entry of a loaded column
    pub fn field_spec(&self, key: ColumnKey) -> Option<FieldSpec> {
        self.fields.get(key.0).copied()
    }

    /// Typed read of one field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] for an invalid row or key and
    /// [`Error::TypeMismatch`] if `T` does not match the column kind.
    pub fn get<T: FieldType>(&self, row: usize, key: ColumnKey) -> Result<T> {
        let value = self.value(row, key)?;
        T::from_value(value).ok_or_else(|| Error::TypeMismatch {
            column: self.fields.get(key.0).map_or("?", |spec| spec.name).to_string(),
            requested: T::KIND,
            actual: value.kind(),
        })
    }

    /// Untyped read of one field
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] for an invalid row or key.
    pub fn value(&self, row: usize, key: ColumnKey) -> Result<FieldValue> {
        self.columns.get(key.0).and_then(|column| column.value(row)).ok_or(Error::OutOfRange {
            row,
            column: key.0,
            rows: self.rows,
            columns: self.columns.len(),
        })
    }
}

/// Turns a column mask into schema entries sorted by file column
fn resolve_mask<S: AsRef<str>>(format: CatalogFormat, mask: &[S]) -> Result<Vec<FieldSpec>> {
    if mask.is_empty() {
        return Ok(format.fields().to_vec());
    }

    let mut fields = mask
        .iter()
        .map(|name| {
            let name = name.as_ref();
            format.field(name).ok_or_else(|| Error::UnknownField(name.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    fields.sort_by_key(|spec| spec.column);
    fields.dedup_by_key(|spec| spec.column);
    Ok(fields)
}
