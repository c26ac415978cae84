//! Placement rules: how each structure class lays its spawn tiles over the world.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cells::table::DistanceTable;
use crate::error::{Error, Result};
use crate::geometry::Bounds;

/// Blocks per chunk edge.
pub const CHUNK_SIZE: i32 = 16;

/// Which placement family a cell belongs to.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StructureClass {
    /// Village-linked ring placement on a gapped grid.
    Primary,
    /// Scattered placement on a chunk-aligned region grid.
    Secondary,
}

/// Periodic tiling that produces one candidate rectangle per grid index pair.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum PlacementRule {
    /// Square cells of `cell_size` separated by `gap`. Non-negative indices extend
    /// rightward from a grid line; negative indices extend leftward from the line
    /// minus the gap, so both sides of an axis keep the same inner gap.
    GappedGrid {
        cell_size: f64,
        gap: f64,
        index_min: i32,
        index_max: i32,
    },
    /// Regions of `region_chunks` chunks, of which the first `spawn_chunks` may host
    /// the structure.
    ChunkGrid {
        region_chunks: i32,
        spawn_chunks: i32,
        index_min: i32,
        index_max: i32,
    },
}

impl PlacementRule {
    /// The vanilla ring grid: 272-block cells with 160-block gaps, indices -15..=15.
    pub fn standard_gapped() -> Self {
        PlacementRule::GappedGrid {
            cell_size: 272.0,
            gap: 160.0,
            index_min: -15,
            index_max: 15,
        }
    }

    pub fn standard_chunk_grid() -> Self {
        PlacementRule::ChunkGrid {
            region_chunks: 32,
            spawn_chunks: 24,
            index_min: -6,
            index_max: 6,
        }
    }

    pub fn index_range(&self) -> std::ops::RangeInclusive<i32> {
        match *self {
            PlacementRule::GappedGrid {
                index_min,
                index_max,
                ..
            }
            | PlacementRule::ChunkGrid {
                index_min,
                index_max,
                ..
            } => index_min..=index_max,
        }
    }

    /// Extent `(min, max)` of tile `index` along one axis.
    pub fn axis_extent(&self, index: i32) -> (f64, f64) {
        match *self {
            PlacementRule::GappedGrid { cell_size, gap, .. } => {
                let step = cell_size + gap;
                if index >= 0 {
                    let min = index as f64 * step;
                    (min, min + cell_size)
                } else {
                    let max = index as f64 * step - gap;
                    (max - cell_size, max)
                }
            }
            PlacementRule::ChunkGrid {
                region_chunks,
                spawn_chunks,
                ..
            } => {
                let min = (index as f64) * (region_chunks * CHUNK_SIZE) as f64;
                (min, min + (spawn_chunks * CHUNK_SIZE) as f64)
            }
        }
    }

    /// World-space rectangle of the tile at `(x_index, z_index)`.
    pub fn tile_bounds(&self, x_index: i32, z_index: i32) -> Bounds {
        let (x_min, x_max) = self.axis_extent(x_index);
        let (z_min, z_max) = self.axis_extent(z_index);
        Bounds::new(x_min, x_max, z_min, z_max)
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            PlacementRule::GappedGrid {
                cell_size,
                gap,
                index_min,
                index_max,
            } => {
                if !(cell_size.is_finite() && cell_size > 0.0) {
                    return Err(Error::InvalidConfig("cell_size must be > 0".into()));
                }
                if !(gap.is_finite() && gap >= 0.0) {
                    return Err(Error::InvalidConfig("gap must be >= 0".into()));
                }
                if index_min > index_max {
                    return Err(Error::InvalidConfig(
                        "index_min must not exceed index_max".into(),
                    ));
                }
            }
            PlacementRule::ChunkGrid {
                region_chunks,
                spawn_chunks,
                index_min,
                index_max,
            } => {
                if spawn_chunks <= 0 || region_chunks < spawn_chunks {
                    return Err(Error::InvalidConfig(
                        "chunk grid needs 0 < spawn_chunks <= region_chunks".into(),
                    ));
                }
                if index_min > index_max {
                    return Err(Error::InvalidConfig(
                        "index_min must not exceed index_max".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Everything needed to generate the cells of one structure class.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct ClassConfig {
    pub class: StructureClass,
    pub rule: PlacementRule,
    pub table: DistanceTable,
    /// Chance that a tile of this class actually generates a structure.
    pub generation_rate: f64,
    /// Share of all structures that belong to this class.
    pub class_share: f64,
}

impl ClassConfig {
    pub fn new(class: StructureClass, rule: PlacementRule, table: DistanceTable) -> Self {
        Self {
            class,
            rule,
            table,
            generation_rate: 1.0,
            class_share: 1.0,
        }
    }

    /// Ring placement with the standard grid and table.
    pub fn primary() -> Self {
        Self::new(
            StructureClass::Primary,
            PlacementRule::standard_gapped(),
            DistanceTable::standard(),
        )
    }

    /// Scattered placement on the standard chunk grid.
    pub fn scattered() -> Self {
        Self::new(
            StructureClass::Secondary,
            PlacementRule::standard_chunk_grid(),
            DistanceTable::standard(),
        )
        .with_generation_rate(0.25)
        .with_class_share(0.2)
    }

    pub fn with_rule(mut self, rule: PlacementRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_table(mut self, table: DistanceTable) -> Self {
        self.table = table;
        self
    }

    pub fn with_generation_rate(mut self, generation_rate: f64) -> Self {
        self.generation_rate = generation_rate;
        self
    }

    pub fn with_class_share(mut self, class_share: f64) -> Self {
        self.class_share = class_share;
        self
    }

    /// Multiplier applied to the table probability of every cell in this class.
    pub fn prior_scale(&self) -> f64 {
        self.generation_rate * self.class_share
    }

    pub fn validate(&self) -> Result<()> {
        self.rule.validate()?;
        self.table.validate()?;
        for (name, value) in [
            ("generation_rate", self.generation_rate),
            ("class_share", self.class_share),
        ] {
            if !(value.is_finite() && value > 0.0 && value <= 1.0) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gapped_grid_keeps_inner_gap_on_both_sides() {
        let rule = PlacementRule::standard_gapped();
        assert_eq!(rule.axis_extent(0), (0.0, 272.0));
        assert_eq!(rule.axis_extent(1), (432.0, 704.0));
        assert_eq!(rule.axis_extent(-1), (-864.0, -592.0));
        // Tile -1 ends 160 blocks before the grid line at -432.
        let (_, max) = rule.axis_extent(-1);
        assert_eq!(-432.0 - max, 160.0);
    }

    #[test]
    fn chunk_grid_spans_spawn_range_only() {
        let rule = PlacementRule::standard_chunk_grid();
        assert_eq!(rule.axis_extent(0), (0.0, 384.0));
        assert_eq!(rule.axis_extent(-1), (-512.0, -128.0));
        assert_eq!(rule.index_range(), -6..=6);
    }

    #[test]
    fn tile_bounds_combine_axes() {
        let rule = PlacementRule::standard_gapped();
        let b = rule.tile_bounds(1, -1);
        assert_eq!(b, Bounds::new(432.0, 704.0, -864.0, -592.0));
        assert!(b.is_well_formed());
    }

    #[test]
    fn validate_rejects_bad_rules() {
        let bad_size = PlacementRule::GappedGrid {
            cell_size: 0.0,
            gap: 10.0,
            index_min: 0,
            index_max: 1,
        };
        assert!(bad_size.validate().is_err());

        let bad_range = PlacementRule::ChunkGrid {
            region_chunks: 8,
            spawn_chunks: 4,
            index_min: 3,
            index_max: 2,
        };
        assert!(bad_range.validate().is_err());

        let spawn_exceeds_region = PlacementRule::ChunkGrid {
            region_chunks: 4,
            spawn_chunks: 8,
            index_min: 0,
            index_max: 2,
        };
        assert!(spawn_exceeds_region.validate().is_err());
    }

    #[test]
    fn class_config_validates_rates() {
        assert!(ClassConfig::primary().validate().is_ok());
        assert!(ClassConfig::scattered().validate().is_ok());
        assert!(ClassConfig::primary()
            .with_generation_rate(0.0)
            .validate()
            .is_err());
        assert!(ClassConfig::primary()
            .with_class_share(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn prior_scale_multiplies_rate_and_share() {
        let scattered = ClassConfig::scattered();
        assert!((scattered.prior_scale() - 0.05).abs() < 1e-12);
        assert_eq!(ClassConfig::primary().prior_scale(), 1.0);
    }
}
