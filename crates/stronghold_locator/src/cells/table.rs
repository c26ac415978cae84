//! Empirical distance-from-origin probability tables.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Observed placement frequency per 100-block distance band, from sampled worlds.
pub const STANDARD_DISTANCE_PROBABILITIES: [(i32, f64); 24] = [
    (500, 0.0262),
    (600, 0.0639),
    (800, 0.1705),
    (900, 0.1582),
    (1000, 0.1427),
    (1100, 0.1204),
    (1200, 0.0919),
    (1300, 0.1133),
    (1400, 0.1139),
    (1500, 0.1228),
    (1700, 0.0586),
    (1800, 0.0535),
    (1900, 0.0610),
    (2100, 0.0590),
    (2200, 0.0431),
    (2300, 0.0375),
    (2400, 0.0292),
    (2500, 0.0493),
    (2600, 0.0382),
    (2700, 0.0347),
    (2800, 0.0258),
    (3000, 0.0171),
    (3100, 0.0169),
    (3200, 0.0189),
];

/// Ordered mapping from a distance bucket to a placement probability.
///
/// Lookup is nearest-key; on equal distance the entry that comes first wins, so
/// iteration order is part of the table's meaning.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceTable {
    entries: Vec<(i32, f64)>,
}

impl DistanceTable {
    pub fn new(entries: Vec<(i32, f64)>) -> Self {
        Self { entries }
    }

    /// The table measured for the vanilla ring placement.
    pub fn standard() -> Self {
        Self::new(STANDARD_DISTANCE_PROBABILITIES.to_vec())
    }

    pub fn entries(&self) -> &[(i32, f64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bucket key and probability nearest to `distance`, or `None` for an empty table.
    pub fn nearest(&self, distance: f64) -> Option<(i32, f64)> {
        let mut best: Option<(i32, f64, f64)> = None;
        for &(key, probability) in &self.entries {
            let diff = (key as f64 - distance).abs();
            match best {
                Some((_, _, best_diff)) if diff >= best_diff => {}
                _ => best = Some((key, probability, diff)),
            }
        }
        best.map(|(key, probability, _)| (key, probability))
    }

    /// Probability of the bucket nearest to `distance`; zero for an empty table.
    pub fn probability_at(&self, distance: f64) -> f64 {
        self.nearest(distance).map_or(0.0, |(_, p)| p)
    }

    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(Error::InvalidConfig(
                "distance table must have at least one entry".into(),
            ));
        }
        for &(key, probability) in &self.entries {
            if !(probability.is_finite() && probability > 0.0 && probability <= 1.0) {
                return Err(Error::InvalidConfig(format!(
                    "distance table probability for bucket {key} must be in (0, 1], got {probability}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for DistanceTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_picks_closest_bucket() {
        let table = DistanceTable::standard();
        assert_eq!(table.nearest(812.0), Some((800, 0.1705)));
        assert_eq!(table.nearest(3900.0), Some((3200, 0.0189)));
        assert_eq!(table.nearest(0.0), Some((500, 0.0262)));
    }

    #[test]
    fn nearest_breaks_ties_by_table_order() {
        // 1600 is exactly between the 1500 and 1700 buckets.
        let table = DistanceTable::standard();
        assert_eq!(table.nearest(1600.0).map(|(k, _)| k), Some(1500));

        let reversed = DistanceTable::new(vec![(1700, 0.5), (1500, 0.25)]);
        assert_eq!(reversed.nearest(1600.0).map(|(k, _)| k), Some(1700));
    }

    #[test]
    fn empty_table_has_no_nearest_and_fails_validation() {
        let table = DistanceTable::new(Vec::new());
        assert!(table.nearest(100.0).is_none());
        assert_eq!(table.probability_at(100.0), 0.0);
        assert!(table.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_probabilities() {
        assert!(DistanceTable::new(vec![(500, 0.0)]).validate().is_err());
        assert!(DistanceTable::new(vec![(500, 1.5)]).validate().is_err());
        assert!(DistanceTable::standard().validate().is_ok());
    }
}
