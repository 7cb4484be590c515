//! Row scanner for whitespace-delimited catalog text.
//!
//! Leading comment lines become the [`CatalogHeader`]; comment lines after
//! the first data row and blank lines are skipped. consistent-trees files
//! also carry a bare tree-count line after the comment block, which goes into
//! the header as well. Every remaining line is a data row, and only the
//! requested fields are parsed out of it.

use crate::catalog::value::Column;
use crate::catalog::{CatalogFormat, FieldSpec};
use crate::error::{Error, Result};
use crate::header::{COMMENT_MARKER, CatalogHeader};
use fs2::FileExt;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Parsed contents of one catalog
#[derive(Debug)]
pub struct ParsedRows {
    /// Leading comment block
    pub header: CatalogHeader,
    /// One column per requested field, in the order of `fields`
    pub(crate) columns: Vec<Column>,
    /// Number of data rows
    pub rows: usize,
}

/// Parses catalog text, keeping only `fields`.
///
/// `fields` must be sorted by ascending file column. For
/// [`CatalogFormat::ConsistentTrees`], a line holding a single integer before
/// the first data row is taken as the tree count, not as a row.
///
/// # Errors
///
/// Returns [`Error::MissingColumn`] for rows shorter than the highest
/// requested column and [`Error::Parse`] for fields that do not parse as
/// their declared kind.
pub fn parse_rows(text: &str, format: CatalogFormat, fields: &[FieldSpec]) -> Result<ParsedRows> {
    debug_assert!(fields.windows(2).all(|w| w[0].column < w[1].column));

    // Rough row count, data rows are a few hundred bytes wide
    let estimate = text.len() / 256;
    let mut columns: Vec<Column> =
        fields.iter().map(|spec| Column::with_capacity(spec.kind, estimate)).collect();

    let mut header_lines = Vec::new();
    let mut tree_count = None;
    let mut in_header = true;
    let mut rows = 0;

    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim_start();

        if trimmed.starts_with(COMMENT_MARKER) {
            if in_header {
                header_lines.push(line.to_string());
            }
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }

        if in_header && tree_count.is_none() && format == CatalogFormat::ConsistentTrees {
            tree_count = parse_tree_count(trimmed);
            if tree_count.is_some() {
                continue;
            }
        }

        in_header = false;
        parse_line(line, index + 1, fields, &mut columns)?;
        rows += 1;
    }

    let mut header = CatalogHeader::from_lines(header_lines);
    if let Some(count) = tree_count {
        header = header.with_tree_count(count);
    }

    Ok(ParsedRows { header, columns, rows })
}

/// A line holding exactly one unsigned integer
fn parse_tree_count(line: &str) -> Option<u64> {
    let mut tokens = line.split_whitespace();
    let count = tokens.next()?.parse().ok()?;
    tokens.next().is_none().then_some(count)
}

/// Parses one data row, appending each requested field to its column.
///
/// # Errors
///
/// See [`parse_rows`].
pub(crate) fn parse_line(
    line: &str,
    line_number: usize,
    fields: &[FieldSpec],
    columns: &mut [Column],
) -> Result<()> {
    let mut tokens = line.split_whitespace();
    let mut consumed = 0;

    for (spec, column) in fields.iter().zip(columns.iter_mut()) {
        let token = tokens.nth(spec.column - consumed).ok_or_else(|| Error::MissingColumn {
            line: line_number,
            column: spec.column,
            found: line.split_whitespace().count(),
        })?;
        consumed = spec.column + 1;

        let parse_error = || Error::Parse {
            line: line_number,
            column: spec.column,
            value: token.to_string(),
            kind: spec.kind,
        };

        match column {
            Column::Int(values) => values.push(token.parse().map_err(|_| parse_error())?),
            Column::Real(values) => values.push(token.parse().map_err(|_| parse_error())?),
        }
    }

    Ok(())
}

/// Maps a catalog file read-only and parses it.
///
/// The file is held under a shared advisory lock for the duration of the
/// parse, so a writer holding an exclusive lock is reported instead of
/// truncating the mapping underneath us.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened, locked or mapped,
/// [`Error::Encoding`] if it is not UTF-8, and any [`parse_rows`] error.
pub fn read_file(path: &Path, format: CatalogFormat, fields: &[FieldSpec]) -> Result<ParsedRows> {
    let file = File::open(path)?;
    FileExt::try_lock_shared(&file)?;

    let parsed = map_and_parse(&file, format, fields);

    // Closing the handle releases the lock too; unlock failures are moot here
    let _ = FileExt::unlock(&file);
    parsed
}

fn map_and_parse(file: &File, format: CatalogFormat, fields: &[FieldSpec]) -> Result<ParsedRows> {
    if file.metadata()?.len() == 0 {
        return parse_rows("", format, fields);
    }

    // SAFETY: the mapping is read-only, lives only for this call, and the
    // shared lock keeps cooperating writers from truncating the file.
    let mmap = unsafe { Mmap::map(file)? };
    let text = std::str::from_utf8(&mmap)?;
    parse_rows(text, format, fields)
}
