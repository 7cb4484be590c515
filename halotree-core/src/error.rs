//! Error taxonomy for catalog access and tree construction.
//!
//! Every failure is returned to the caller. Tree construction and traversal
//! are deterministic for a fixed catalog, so none of these are retryable.

use crate::catalog::FieldKind;
use thiserror::Error;

/// Result alias used throughout the library layers
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the catalog accessor and the tree engine
#[derive(Debug, Error)]
pub enum Error {
    /// The row stream is not tree-contiguous: a root marker showed up inside
    /// another tree's row range.
    #[error(
        "malformed input: row {row} is a root (descendant_id == -1) inside tree range [{start}, {end}); should never reach the next tree"
    )]
    MalformedInput {
        /// Offending row
        row: usize,
        /// First row of the range being built
        start: usize,
        /// One past the last row of the range being built
        end: usize,
    },

    /// Field name is not part of the schema, or was masked out at load time
    #[error("unknown field `{0}`")]
    UnknownField(String),

    /// Typed read against a column of the other kind
    #[error("type mismatch on column `{column}`: requested {requested}, column holds {actual}")]
    TypeMismatch {
        /// Field name of the column
        column: String,
        /// Kind the caller asked for
        requested: FieldKind,
        /// Kind the column stores
        actual: FieldKind,
    },

    /// Row or column outside the loaded catalog
    #[error("index out of range: row {row}, column {column} (catalog has {rows} rows, {columns} columns)")]
    OutOfRange {
        /// Requested row
        row: usize,
        /// Requested internal column
        column: usize,
        /// Loaded row count
        rows: usize,
        /// Loaded column count
        columns: usize,
    },

    /// A field could not be parsed as its declared kind
    #[error("line {line}, column {column}: cannot parse `{value}` as {kind}")]
    Parse {
        /// 1-based line number in the source text
        line: usize,
        /// File column index
        column: usize,
        /// Raw text of the field
        value: String,
        /// Kind the schema declares
        kind: FieldKind,
    },

    /// A data row is shorter than the highest requested column
    #[error("line {line}: missing column {column} (row has {found} fields)")]
    MissingColumn {
        /// 1-based line number in the source text
        line: usize,
        /// File column index that was required
        column: usize,
        /// Number of fields present on the line
        found: usize,
    },

    /// A header parser did not find its entry
    #[error("header has no {0} entry")]
    MissingHeaderField(&'static str),

    /// Catalog bytes are not valid UTF-8
    #[error("catalog is not valid UTF-8")]
    Encoding(#[from] std::str::Utf8Error),

    /// Underlying file access failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
