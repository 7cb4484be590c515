//! Leading `#` comment block of a catalog file.
//!
//! Rockstar and consistent-trees both write simulation metadata as comment
//! lines before the first data row. Only three entries are interpreted:
//!
//! ```text
//! #a = 0.500000                                   (Rockstar only)
//! #Om = 0.307115; Ol = 0.692885; h = 0.677700     (Rockstar)
//! #Omega_M = 0.307115; Omega_L = 0.692885; h0 = 0.677700   (consistent-trees)
//! #Box size: 250.000000 Mpc/h                     (Rockstar)
//! #Full box size = 250.000000 Mpc/h               (consistent-trees)
//! ```

use crate::error::{Error, Result};

/// Marker that starts every header line
pub const COMMENT_MARKER: char = '#';

/// Cosmological parameters recorded in a catalog header
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cosmology {
    /// Matter density parameter
    pub omega_matter: f64,
    /// Dark energy density parameter
    pub omega_lambda: f64,
    /// Dimensionless Hubble parameter
    pub hubble: f64,
}

/// Header lines of one catalog file, markers included
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogHeader {
    lines: Vec<String>,
    tree_count: Option<u64>,
}

impl CatalogHeader {
    /// Creates a header from raw comment lines
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { lines: lines.into_iter().map(Into::into).collect(), tree_count: None }
    }

    /// Sets the tree count read from a consistent-trees file
    #[must_use]
    pub fn with_tree_count(mut self, count: u64) -> Self {
        self.tree_count = Some(count);
        self
    }

    /// Number of trees announced by a consistent-trees file.
    ///
    /// consistent-trees writes this as a bare integer line between the
    /// comment block and the first `#tree` marker. `None` for Rockstar files
    /// and for tree files without the line.
    pub fn tree_count(&self) -> Option<u64> {
        self.tree_count
    }

    /// Raw header lines
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// True when the file had no header block
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Snapshot scale factor from the `#a = ...` line.
    ///
    /// Merger-tree files span many snapshots and carry no such line, so a
    /// missing entry is `None` rather than an error. The last matching line
    /// wins.
    pub fn scale_factor(&self) -> Option<f64> {
        self.lines.iter().filter_map(|line| parse_scale_factor(line)).next_back()
    }

    /// Comoving box side length in Mpc/h
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingHeaderField`] if no box size line parses.
    pub fn box_size(&self) -> Result<f64> {
        self.lines
            .iter()
            .filter_map(|line| parse_box_size(line))
            .next_back()
            .ok_or(Error::MissingHeaderField("box size"))
    }

    /// Cosmological parameters
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingHeaderField`] if no `#Om...` line carries three
    /// parseable values.
    pub fn cosmology(&self) -> Result<Cosmology> {
        self.lines
            .iter()
            .filter_map(|line| parse_cosmology(line))
            .next_back()
            .ok_or(Error::MissingHeaderField("cosmology"))
    }
}

/// Strips the comment marker and surrounding blanks
fn comment_body(line: &str) -> Option<&str> {
    line.trim().strip_prefix(COMMENT_MARKER).map(str::trim)
}

fn parse_scale_factor(line: &str) -> Option<f64> {
    let rest = comment_body(line)?.strip_prefix('a')?;
    let value = rest.trim_start().strip_prefix('=')?;
    value.trim().parse().ok()
}

fn parse_box_size(line: &str) -> Option<f64> {
    let body = comment_body(line)?;
    let lower = body.to_ascii_lowercase();
    let at = lower.find("box size")? + "box size".len();
    let rest = body.get(at..)?.trim_start_matches([':', '=', ' ', '\t']);
    rest.split_whitespace().next()?.parse().ok()
}

fn parse_cosmology(line: &str) -> Option<Cosmology> {
    let body = comment_body(line)?;
    if !body.starts_with("Om") {
        return None;
    }

    let mut values = body.split(';').map(|part| {
        let (_, value) = part.split_once('=')?;
        value.trim().parse::<f64>().ok()
    });

    let omega_matter = values.next()??;
    let omega_lambda = values.next()??;
    let hubble = values.next()??;

    Some(Cosmology { omega_matter, omega_lambda, hubble })
}
