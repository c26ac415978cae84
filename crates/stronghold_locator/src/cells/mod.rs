//! Placement cells: the rectangles where a stronghold class may spawn, each tagged
//! with a prior from an empirical distance table.
//!
//! [`CellSet`] is generated once from a [`GridConfig`] and is read-only afterwards.
//! Cells are addressed by [`CellId`], an index into the set.
use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::Bounds;

pub mod generator;
pub mod rules;
pub mod table;

pub use generator::{CellSet, GridConfig, MIN_SPAWN_RADIUS};
pub use rules::{ClassConfig, PlacementRule, StructureClass, CHUNK_SIZE};
pub use table::{DistanceTable, STANDARD_DISTANCE_PROBABILITIES};

/// Index of a cell inside its [`CellSet`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub usize);

/// A candidate rectangular spawn region.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementCell {
    pub center: DVec2,
    pub bounds: Bounds,
    /// Euclidean distance of `center` from the world origin.
    pub distance_from_origin: f64,
    /// Nearest key of the class's distance table.
    pub distance_bucket: i32,
    /// Table probability scaled by the class's generation rate and share.
    pub prior_probability: f64,
    pub structure_class: StructureClass,
}
