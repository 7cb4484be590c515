//! Assembly times from main-branch mass histories.
//!
//! The assembly scale for a ratio `f` is the scale factor at which the main
//! branch first drops below `f` times its final mass. With `f = 0.5` this is
//! the usual half-mass formation time.

use crate::catalog::Catalog;
use crate::error::Result;
use crate::tree::{traverse_most_massive_branch, Tree, SCALE_FIELD, VIRIAL_MASS_FIELD};

/// Assembly scale of one mass history.
///
/// `masses` and `scales` run backwards in time from the same starting halo.
/// At the first index `i` where `masses[i] < ratio * masses[0]` the result
/// is the midpoint of `scales[i - 1]` and `scales[i]`, or `scales[0]` when
/// `i == 0`. Returns `None` if the mass never drops below the threshold or
/// the history is empty.
#[must_use]
pub fn assembly_scale(masses: &[f64], scales: &[f64], ratio: f64) -> Option<f64> {
    let threshold = ratio * masses.first()?;
    let index = masses.iter().zip(scales).position(|(&mass, _)| mass < threshold)?;

    match index {
        0 => scales.first().copied(),
        i => Some(0.5 * (scales.get(i - 1)? + scales.get(i)?)),
    }
}

/// Assembly scales of a tree's main branch, one per ratio
///
/// # Errors
///
/// Returns [`crate::Error::UnknownField`] if `scale` or `virial_mass` was
/// not loaded.
pub fn assembly_scales(catalog: &Catalog, tree: &Tree, ratios: &[f64]) -> Result<Vec<Option<f64>>> {
    let masses: Vec<f64> =
        traverse_most_massive_branch(catalog, tree.root(), catalog.internal_key(VIRIAL_MASS_FIELD)?)?;
    let scales: Vec<f64> = traverse_most_massive_branch(catalog, tree.root(), catalog.internal_key(SCALE_FIELD)?)?;

    Ok(ratios.iter().map(|&ratio| assembly_scale(&masses, &scales, ratio)).collect())
}
