//! Chunk-level refinement inside a placement cell.
//!
//! A structure always starts at a fixed offset from the origin of its chunk, so the
//! feasible positions inside a cell form a sparse lattice of chunk targets. Refinement
//! scores each target and keeps the best one.
use glam::DVec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cells::CHUNK_SIZE;
use crate::error::{Error, Result};
use crate::geometry::{Bounds, Ray};
use crate::scoring::likelihood::gaussian_kernel;

/// Integer chunk coordinates `(x, z)`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkId(pub i32, pub i32);

/// Sub-cell refinement parameters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubCellPrecision {
    /// Offset of the structure start from the chunk origin, on both axes.
    pub target_offset: f64,
    /// Lower bound of the perpendicular standard deviation, in blocks.
    pub min_sigma: f64,
}

impl Default for SubCellPrecision {
    fn default() -> Self {
        Self {
            target_offset: 4.0,
            min_sigma: 1.0,
        }
    }
}

impl SubCellPrecision {
    pub fn validate(&self) -> Result<()> {
        let chunk = CHUNK_SIZE as f64;
        if !(self.target_offset.is_finite() && (0.0..chunk).contains(&self.target_offset)) {
            return Err(Error::InvalidConfig(format!(
                "target_offset must be in [0, {chunk}), got {}",
                self.target_offset
            )));
        }
        if !(self.min_sigma.is_finite() && self.min_sigma > 0.0) {
            return Err(Error::InvalidConfig("min_sigma must be > 0".into()));
        }
        Ok(())
    }
}

/// The winning chunk target of a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Refinement {
    pub chunk: ChunkId,
    pub point: DVec2,
    /// Likelihood factor in `(0, 1]` to multiply into the cell score.
    pub likelihood: f64,
}

/// Chunk containing world position `position`.
pub fn chunk_id_for_position(position: DVec2) -> ChunkId {
    let size = CHUNK_SIZE as f64;
    ChunkId(
        (position.x / size).floor() as i32,
        (position.y / size).floor() as i32,
    )
}

/// World origin of chunk `id`.
pub fn chunk_origin(id: ChunkId) -> DVec2 {
    DVec2::new(id.0 as f64, id.1 as f64) * CHUNK_SIZE as f64
}

/// Chunk targets whose offset point lies inside `bounds`, in x-major order.
pub fn chunk_targets(bounds: &Bounds, offset: f64) -> Vec<(ChunkId, DVec2)> {
    let lo = chunk_id_for_position(DVec2::new(bounds.x_min, bounds.z_min));
    let hi = chunk_id_for_position(DVec2::new(bounds.x_max, bounds.z_max));
    let mut targets = Vec::new();
    for cx in lo.0..=hi.0 {
        for cz in lo.1..=hi.1 {
            let id = ChunkId(cx, cz);
            let point = chunk_origin(id) + DVec2::splat(offset);
            if bounds.contains(point) {
                targets.push((id, point));
            }
        }
    }
    targets
}

/// Highest-scoring chunk target of `bounds`. `score` returns `None` for infeasible
/// targets; the first target wins ties.
pub fn best_target<F>(bounds: &Bounds, precision: &SubCellPrecision, score: F) -> Option<Refinement>
where
    F: Fn(DVec2) -> Option<f64>,
{
    let mut best: Option<Refinement> = None;
    for (chunk, point) in chunk_targets(bounds, precision.target_offset) {
        let Some(likelihood) = score(point) else {
            continue;
        };
        if best.is_none_or(|b| likelihood > b.likelihood) {
            best = Some(Refinement {
                chunk,
                point,
                likelihood,
            });
        }
    }
    best
}

/// Gaussian on the perpendicular distance from `target` to `ray`, with a standard
/// deviation that grows with range: `max(t * tan(angle_sd), min_sigma)`.
pub fn perpendicular_likelihood(
    ray: &Ray,
    angle_std_dev_deg: f64,
    precision: &SubCellPrecision,
    target: DVec2,
) -> Option<f64> {
    let t = ray.project(target);
    if t <= 0.0 {
        return None;
    }
    let sigma = (t * angle_std_dev_deg.to_radians().tan()).max(precision.min_sigma);
    Some(gaussian_kernel(ray.distance_to(target), sigma))
}
