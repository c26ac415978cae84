//! Generation of the immutable placement-cell arena.
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cells::rules::{ClassConfig, StructureClass};
use crate::cells::{CellId, PlacementCell};
use crate::error::{Error, Result};
use crate::geometry::Bounds;

/// Structures never spawn with their cell center closer than this to the origin.
pub const MIN_SPAWN_RADIUS: f64 = 512.0;

/// Configuration of the full candidate grid.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct GridConfig {
    /// Exclusion radius around the world origin.
    pub min_spawn_radius: f64,
    /// Classes generated, in order.
    pub classes: Vec<ClassConfig>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_spawn_radius: MIN_SPAWN_RADIUS,
            classes: vec![ClassConfig::primary()],
        }
    }
}

impl GridConfig {
    /// A grid with no classes; add them with [`GridConfig::with_class`].
    pub fn empty() -> Self {
        Self {
            min_spawn_radius: MIN_SPAWN_RADIUS,
            classes: Vec::new(),
        }
    }

    pub fn with_min_spawn_radius(mut self, radius: f64) -> Self {
        self.min_spawn_radius = radius;
        self
    }

    pub fn with_class(mut self, class: ClassConfig) -> Self {
        self.classes.push(class);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_spawn_radius.is_finite() && self.min_spawn_radius >= 0.0) {
            return Err(Error::InvalidConfig("min_spawn_radius must be >= 0".into()));
        }
        if self.classes.is_empty() {
            return Err(Error::InvalidConfig(
                "grid must contain at least one structure class".into(),
            ));
        }
        for class in &self.classes {
            class.validate()?;
        }
        Ok(())
    }
}

/// Read-only arena of placement cells, addressed by [`CellId`].
#[derive(Clone, Debug, PartialEq)]
pub struct CellSet {
    cells: Vec<PlacementCell>,
    bucket_population: HashMap<(StructureClass, i32), usize>,
    min_spawn_radius: f64,
}

impl CellSet {
    /// Validates `config` and generates its cells in grid-scan order.
    pub fn generate(config: &GridConfig) -> Result<Self> {
        config.validate()?;
        Ok(generate_cells(config))
    }

    /// Cells of the default grid.
    pub fn standard() -> Self {
        generate_cells(&GridConfig::default())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, id: CellId) -> Option<&PlacementCell> {
        self.cells.get(id.0)
    }

    pub fn cells(&self) -> &[PlacementCell] {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellId, &PlacementCell)> {
        self.cells.iter().enumerate().map(|(i, c)| (CellId(i), c))
    }

    pub fn min_spawn_radius(&self) -> f64 {
        self.min_spawn_radius
    }

    /// Number of cells of `class` that share `bucket`.
    pub fn bucket_population(&self, class: StructureClass, bucket: i32) -> usize {
        self.bucket_population
            .get(&(class, bucket))
            .copied()
            .unwrap_or(0)
    }

    /// First cell, in arena order, containing `point`.
    pub fn containing(&self, point: glam::DVec2) -> Option<(CellId, &PlacementCell)> {
        self.iter().find(|(_, c)| c.bounds.contains(point))
    }
}

fn generate_cells(config: &GridConfig) -> CellSet {
    let mut cells = Vec::new();
    let mut bucket_population: HashMap<(StructureClass, i32), usize> = HashMap::new();

    for class in &config.classes {
        let before = cells.len();
        let range = class.rule.index_range();
        for x_index in range.clone() {
            for z_index in range.clone() {
                let bounds = class.rule.tile_bounds(x_index, z_index);
                if let Some(cell) = make_cell(class, bounds, config.min_spawn_radius) {
                    *bucket_population
                        .entry((cell.structure_class, cell.distance_bucket))
                        .or_insert(0) += 1;
                    cells.push(cell);
                }
            }
        }
        info!(
            "Generated {} placement cells for {:?}.",
            cells.len() - before,
            class.class
        );
    }

    CellSet {
        cells,
        bucket_population,
        min_spawn_radius: config.min_spawn_radius,
    }
}

fn make_cell(class: &ClassConfig, bounds: Bounds, min_spawn_radius: f64) -> Option<PlacementCell> {
    let center = bounds.center();
    let distance_from_origin = center.length();
    if distance_from_origin < min_spawn_radius {
        return None;
    }
    let (distance_bucket, probability) = class.table.nearest(distance_from_origin)?;

    Some(PlacementCell {
        center,
        bounds,
        distance_from_origin,
        distance_bucket,
        prior_probability: probability * class.prior_scale(),
        structure_class: class.class,
    })
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::*;
    use crate::cells::rules::PlacementRule;

    #[test]
    fn standard_cells_respect_radius_and_shape() {
        let set = CellSet::standard();
        assert!(!set.is_empty());
        for cell in set.cells() {
            assert!(cell.distance_from_origin >= MIN_SPAWN_RADIUS);
            assert!(cell.bounds.x_min < cell.bounds.x_max);
            assert!(cell.bounds.z_min < cell.bounds.z_max);
            assert!(cell.prior_probability > 0.0 && cell.prior_probability <= 1.0);
        }
    }

    #[test]
    fn standard_grid_excludes_only_the_origin_tile() {
        // 31 x 31 tiles; only the (0, 0) tile, centered 192 blocks out, is dropped.
        let set = CellSet::standard();
        assert_eq!(set.len(), 31 * 31 - 1);
        assert!(set.containing(DVec2::new(136.0, 136.0)).is_none());
    }

    #[test]
    fn generation_is_deterministic() {
        let a = CellSet::standard();
        let b = CellSet::generate(&GridConfig::default()).expect("default config is valid");
        assert_eq!(a.len(), b.len());
        for (x, y) in a.cells().iter().zip(b.cells()) {
            assert_eq!(x.center.x.to_bits(), y.center.x.to_bits());
            assert_eq!(x.center.y.to_bits(), y.center.y.to_bits());
            assert_eq!(x.prior_probability.to_bits(), y.prior_probability.to_bits());
            assert_eq!(x.distance_bucket, y.distance_bucket);
        }
    }

    #[test]
    fn first_cell_follows_scan_order() {
        let set = CellSet::standard();
        let first = &set.cells()[0];
        // Index (-15, -15): max = -15 * 432 - 160.
        assert_eq!(first.bounds.x_max, -6640.0);
        assert_eq!(first.bounds.z_max, -6640.0);
        assert_eq!(first.distance_bucket, 3200);
    }

    #[test]
    fn buckets_are_populated_per_class() {
        let set = CellSet::standard();
        let total: usize = set
            .cells()
            .iter()
            .map(|c| c.distance_bucket)
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .map(|bucket| set.bucket_population(StructureClass::Primary, bucket))
            .sum();
        assert_eq!(total, set.len());
        assert_eq!(set.bucket_population(StructureClass::Secondary, 800), 0);
    }

    #[test]
    fn scattered_class_adds_scaled_cells() {
        let config = GridConfig::default().with_class(ClassConfig::scattered());
        let set = CellSet::generate(&config).expect("valid config");
        let secondary: Vec<_> = set
            .cells()
            .iter()
            .filter(|c| c.structure_class == StructureClass::Secondary)
            .collect();
        assert!(!secondary.is_empty());
        for cell in secondary {
            assert!(cell.distance_from_origin >= MIN_SPAWN_RADIUS);
            let table_p = crate::cells::DistanceTable::standard()
                .nearest(cell.distance_from_origin)
                .map(|(_, p)| p)
                .expect("non-empty table");
            assert!((cell.prior_probability - table_p * 0.05).abs() < 1e-12);
        }
    }

    #[test]
    fn generate_rejects_invalid_config() {
        assert!(CellSet::generate(&GridConfig::empty()).is_err());
        let bad = GridConfig::default().with_min_spawn_radius(-1.0);
        assert!(CellSet::generate(&bad).is_err());
        let bad_rule = GridConfig::empty().with_class(ClassConfig::primary().with_rule(
            PlacementRule::GappedGrid {
                cell_size: -5.0,
                gap: 0.0,
                index_min: 0,
                index_max: 0,
            },
        ));
        assert!(CellSet::generate(&bad_rule).is_err());
    }

    #[test]
    fn containing_returns_first_match() {
        let set = CellSet::standard();
        let (id, cell) = set
            .containing(DVec2::new(600.0, 100.0))
            .expect("inside the (1, 0) tile");
        assert_eq!(set.get(id), Some(cell));
        assert_eq!(cell.bounds.x_min, 432.0);
        assert_eq!(cell.bounds.z_min, 0.0);
    }
}
