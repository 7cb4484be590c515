//! Column layouts of the supported catalog formats.
//!
//! This is not a generic ASCII table reader: each format has a fixed set of
//! named fields at known file columns, and every field is either a 64-bit
//! integer or a 64-bit float. Columns not listed here are ignored by the
//! reader.

use std::fmt;

/// Storage kind of a catalog field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Signed 64-bit integer (ids, flags, counters)
    Int,
    /// 64-bit float (masses, radii, positions, scale factors)
    Real,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Int => write!(f, "int64"),
            FieldKind::Real => write!(f, "float64"),
        }
    }
}

/// One named field of a catalog format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Logical field name used for lookups
    pub name: &'static str,
    /// Zero-based column in the whitespace-delimited row
    pub column: usize,
    /// Storage kind
    pub kind: FieldKind,
}

const fn int(name: &'static str, column: usize) -> FieldSpec {
    FieldSpec { name, column, kind: FieldKind::Int }
}

const fn real(name: &'static str, column: usize) -> FieldSpec {
    FieldSpec { name, column, kind: FieldKind::Real }
}

/// Rockstar halo list, one snapshot per file.
///
/// `ID DescID Mvir Vmax Vrms Rvir Rs Np X Y Z VX VY VZ JX JY JZ Spin rs_klypin
/// Mvir_all M200b M200c M500c M2500c Xoff Voff spin_bullock b_to_a c_to_a A[x]
/// A[y] A[z] b_to_a(500c) c_to_a(500c) A[x](500c) A[y](500c) A[z](500c) T/|U|
/// M_pe_Behroozi M_pe_Diemer Type SM Gas BH_Mass`
const ROCKSTAR_FIELDS: &[FieldSpec] = &[
    int("id", 0),
    int("descendant_id", 1),
    real("virial_mass", 2),
    real("maximum_velocity", 3),
    real("rms_velocity", 4),
    real("virial_radius", 5),
    real("scale_radius", 6),
    int("num_particles", 7),
    real("x", 8),
    real("y", 9),
    real("z", 10),
    real("x_velocity", 11),
    real("y_velocity", 12),
    real("z_velocity", 13),
    real("x_angular_momentum", 14),
    real("y_angular_momentum", 15),
    real("z_angular_momentum", 16),
    real("spin", 17),
    real("klypin_scale_radius", 18),
    real("virial_mass_all", 19),
    real("m200b", 20),
    real("m200c", 21),
    real("m500c", 22),
    real("m2500c", 23),
    real("position_offset", 24),
    real("velocity_offset", 25),
    real("bullock_spin", 26),
    real("b_to_a", 27),
    real("c_to_a", 28),
    real("x_shape", 29),
    real("y_shape", 30),
    real("z_shape", 31),
    real("b_to_a_500c", 32),
    real("c_to_a_500c", 33),
    real("x_shape_500c", 34),
    real("y_shape_500c", 35),
    real("z_shape_500c", 36),
    real("ke_to_pe_ratio", 37),
    real("behroozi_mass", 38),
    real("diemer_mass", 39),
    int("type", 40),
    real("stellar_mass", 41),
    real("gas_mass", 42),
    real("bh_mass", 43),
];

/// consistent-trees merger history, many snapshots and trees per file.
///
/// Rows are grouped by tree, each tree starting at its root and continuing in
/// depth-first order.
const CONSISTENT_TREES_FIELDS: &[FieldSpec] = &[
    real("scale", 0),
    int("id", 1),
    real("descendant_scale", 2),
    int("descendant_id", 3),
    int("number_of_progenitors", 4),
    int("parent_id", 5),
    int("uparent_id", 6),
    int("descendant_parent_id", 7),
    int("phantom", 8),
    real("sam_virial_mass", 9),
    real("virial_mass", 10),
    real("virial_radius", 11),
    real("scale_radius", 12),
    real("rms_velocity", 13),
    int("is_most_massive_progenitor", 14),
    real("scale_of_last_major_merger", 15),
    real("maximum_velocity", 16),
    real("x", 17),
    real("y", 18),
    real("z", 19),
    real("x_velocity", 20),
    real("y_velocity", 21),
    real("z_velocity", 22),
    real("x_angular_momentum", 23),
    real("y_angular_momentum", 24),
    real("z_angular_momentum", 25),
    real("spin", 26),
    int("breadth_first_id", 27),
    int("depth_first_id", 28),
    int("tree_root_id", 29),
    int("original_halo_id", 30),
    int("snapshot_index", 31),
    int("next_coprogenitor_depthfirst_id", 32),
    int("last_progenitor_depthfirst_id", 33),
    int("last_mainleaf_depthfirst_id", 34),
    real("tidal_force", 35),
    int("tidal_id", 36),
    real("klypin_scale_radius", 37),
    real("virial_mass_all", 38),
    real("m200b", 39),
    real("m200c", 40),
    real("m500c", 41),
    real("m2500c", 42),
    real("position_offset", 43),
    real("velocity_offset", 44),
    real("bullock_spin", 45),
    real("b_to_a", 46),
    real("c_to_a", 47),
    real("x_shape", 48),
    real("y_shape", 49),
    real("z_shape", 50),
    real("b_to_a_500c", 51),
    real("c_to_a_500c", 52),
    real("x_shape_500c", 53),
    real("y_shape_500c", 54),
    real("z_shape_500c", 55),
    real("ke_to_pe_ratio", 56),
    real("behroozi_mass", 57),
    real("diemer_mass", 58),
    real("stellar_mass", 59),
    real("gas_mass", 60),
    real("bh_mass", 61),
];

/// Supported catalog file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CatalogFormat {
    /// Rockstar `out_*.list` halo lists
    Rockstar,
    /// consistent-trees `tree_*.dat` merger histories
    #[default]
    ConsistentTrees,
}

impl CatalogFormat {
    /// All fields of this format, in file column order
    #[must_use]
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            CatalogFormat::Rockstar => ROCKSTAR_FIELDS,
            CatalogFormat::ConsistentTrees => CONSISTENT_TREES_FIELDS,
        }
    }

    /// Looks up a field by logical name
    #[must_use]
    pub fn field(self, name: &str) -> Option<FieldSpec> {
        self.fields().iter().find(|spec| spec.name == name).copied()
    }

    /// Default column mask: the fields the tree engine reads
    #[must_use]
    pub fn tree_columns(self) -> &'static [&'static str] {
        match self {
            CatalogFormat::Rockstar => &["id", "descendant_id", "virial_mass"],
            CatalogFormat::ConsistentTrees => &["id", "descendant_id", "scale", "virial_mass"],
        }
    }
}

impl fmt::Display for CatalogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogFormat::Rockstar => write!(f, "rockstar"),
            CatalogFormat::ConsistentTrees => write!(f, "consistent-trees"),
        }
    }
}
