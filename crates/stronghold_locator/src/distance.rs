//! Distance estimates from on-screen parallax, used as the optional measured distance
//! of a throw.
//!
//! The operator presses a key once per two pixels the eye appears to move. The press
//! count, alone or combined with how far the observer walked between two readings,
//! gives a rough distance to the target.
use std::time::{Duration, Instant};

use glam::{DVec2, IVec3};
use tracing::debug;

use crate::geometry::heading_between;

/// Blocks per half press for a stationary observer.
pub const PIXEL_COUNT_FACTOR: f64 = 3655.0;

/// Blocks per half press per block walked.
pub const PARALLAX_FACTOR: f64 = 186.0;

/// Presses further apart than this start a new count.
pub const PRESS_TIMEOUT: Duration = Duration::from_millis(2000);

/// Distance from the press count alone; `None` without presses.
pub fn distance_from_pixel_count(presses: u32) -> Option<f64> {
    (presses > 0).then(|| PIXEL_COUNT_FACTOR / (presses as f64 / 2.0))
}

/// Distance from the press count and the horizontal distance walked between readings;
/// `None` without presses or without movement.
pub fn distance_from_parallax(presses: u32, moved_blocks: f64) -> Option<f64> {
    if presses == 0 || !(moved_blocks.is_finite() && moved_blocks > 0.0) {
        return None;
    }
    Some(PARALLAX_FACTOR * moved_blocks / (presses as f64 / 2.0))
}

/// Horizontal (x, z) distance between two block positions.
pub fn horizontal_movement(from: IVec3, to: IVec3) -> f64 {
    DVec2::new(from.x as f64, from.z as f64).distance(DVec2::new(to.x as f64, to.z as f64))
}

/// Heading walked from one block position to another; `None` when the horizontal
/// position did not change.
pub fn heading_from_positions(from: IVec3, to: IVec3) -> Option<f64> {
    let a = DVec2::new(from.x as f64, from.z as f64);
    let b = DVec2::new(to.x as f64, to.z as f64);
    (a != b).then(|| heading_between(a, b))
}

/// Counts key presses, restarting when two presses are more than the timeout apart.
#[derive(Clone, Debug)]
pub struct PressCounter {
    presses: u32,
    last_press: Option<Instant>,
    timeout: Duration,
}

impl Default for PressCounter {
    fn default() -> Self {
        Self::new(PRESS_TIMEOUT)
    }
}

impl PressCounter {
    pub fn new(timeout: Duration) -> Self {
        Self {
            presses: 0,
            last_press: None,
            timeout,
        }
    }

    /// Registers a press at `now` and returns the running count.
    pub fn press(&mut self, now: Instant) -> u32 {
        if let Some(last) = self.last_press {
            if now.saturating_duration_since(last) > self.timeout {
                debug!("Press sequence timed out after {} presses.", self.presses);
                self.presses = 0;
            }
        }
        self.presses = self.presses.saturating_add(1);
        self.last_press = Some(now);
        self.presses
    }

    pub fn presses(&self) -> u32 {
        self.presses
    }

    /// Stationary distance estimate for the current count.
    pub fn distance(&self) -> Option<f64> {
        distance_from_pixel_count(self.presses)
    }

    pub fn reset(&mut self) {
        self.presses = 0;
        self.last_press = None;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn pixel_count_estimate_halves_presses() {
        assert_eq!(distance_from_pixel_count(0), None);
        assert_abs_diff_eq!(distance_from_pixel_count(2).expect("presses"), 3655.0);
        assert_abs_diff_eq!(distance_from_pixel_count(5).expect("presses"), 1462.0);
    }

    #[test]
    fn parallax_estimate_needs_movement() {
        assert_abs_diff_eq!(distance_from_parallax(4, 10.0).expect("valid"), 930.0);
        assert_eq!(distance_from_parallax(4, 0.0), None);
        assert_eq!(distance_from_parallax(0, 10.0), None);
        assert_eq!(distance_from_parallax(4, f64::NAN), None);
    }

    #[test]
    fn movement_ignores_height() {
        let d = horizontal_movement(IVec3::new(0, 64, 0), IVec3::new(3, 90, -4));
        assert_abs_diff_eq!(d, 5.0);
    }

    #[test]
    fn heading_from_positions_uses_game_azimuth() {
        let east = heading_from_positions(IVec3::new(0, 64, 0), IVec3::new(10, 64, 0))
            .expect("moved");
        assert_abs_diff_eq!(east, 90.0, epsilon = 1e-9);
        assert_eq!(
            heading_from_positions(IVec3::new(1, 64, 1), IVec3::new(1, 80, 1)),
            None
        );
    }

    #[test]
    fn press_counter_restarts_after_timeout() {
        let start = Instant::now();
        let mut counter = PressCounter::default();
        assert_eq!(counter.press(start), 1);
        assert_eq!(counter.press(start + Duration::from_millis(500)), 2);
        assert_abs_diff_eq!(counter.distance().expect("presses"), 3655.0);
        assert_eq!(counter.press(start + Duration::from_millis(3000)), 1);
        counter.reset();
        assert_eq!(counter.presses(), 0);
        assert_eq!(counter.distance(), None);
    }
}
