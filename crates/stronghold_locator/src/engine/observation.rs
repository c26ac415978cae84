//! Captured sightings and the positions they resolve to.
use std::fmt;

use glam::IVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{eye_position, normalize_heading};
use crate::scoring::Sighting;

/// Heading uncertainty assumed when the host gives none, in degrees.
pub const DEFAULT_ANGLE_STD_DEV: f64 = 0.1;

/// Distance uncertainty assumed when the host gives none, in blocks.
pub const DEFAULT_DISTANCE_STD_DEV: f64 = 40.0;

/// One sighting as captured by the host.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThrowObservation {
    /// Block position of the observer; meaningless when `is_valid` is false.
    pub position: IVec3,
    /// Heading in degrees, game azimuth convention.
    pub heading: f64,
    /// Whether `position` was actually read.
    pub is_valid: bool,
    pub measured_distance: Option<f64>,
    pub angle_std_dev: f64,
    pub distance_std_dev: f64,
}

impl ThrowObservation {
    pub fn new(position: IVec3, heading: f64) -> Self {
        Self {
            position,
            heading,
            is_valid: true,
            measured_distance: None,
            angle_std_dev: DEFAULT_ANGLE_STD_DEV,
            distance_std_dev: DEFAULT_DISTANCE_STD_DEV,
        }
    }

    /// A sighting whose position could not be read.
    pub fn unreadable(heading: f64) -> Self {
        Self {
            is_valid: false,
            ..Self::new(IVec3::ZERO, heading)
        }
    }

    pub fn with_measured_distance(mut self, distance: f64) -> Self {
        self.measured_distance = Some(distance);
        self
    }

    pub fn with_angle_std_dev(mut self, std_dev: f64) -> Self {
        self.angle_std_dev = std_dev;
        self
    }

    pub fn with_distance_std_dev(mut self, std_dev: f64) -> Self {
        self.distance_std_dev = std_dev;
        self
    }

    /// Rejects values that cannot describe a real sighting.
    pub fn validate(&self) -> Result<()> {
        if !self.heading.is_finite() {
            return Err(Error::MalformedInput(format!(
                "heading must be finite, got {}",
                self.heading
            )));
        }
        for (name, value) in [
            ("angle_std_dev", self.angle_std_dev),
            ("distance_std_dev", self.distance_std_dev),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::MalformedInput(format!(
                    "{name} must be > 0, got {value}"
                )));
            }
        }
        if let Some(distance) = self.measured_distance {
            if !(distance.is_finite() && distance > 0.0) {
                return Err(Error::MalformedInput(format!(
                    "measured distance must be > 0, got {distance}"
                )));
            }
        }
        Ok(())
    }
}

/// Where the position used for a throw came from.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PositionSource {
    /// Read along with the throw.
    Read,
    /// Substituted from the last valid throw.
    LastKnown,
    /// Substituted from the configured default position.
    Default,
}

impl fmt::Display for PositionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PositionSource::Read => "read position",
            PositionSource::LastKnown => "last known position",
            PositionSource::Default => "default position",
        })
    }
}

/// A validated throw together with the position it will be scored from.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecordedThrow {
    pub observation: ThrowObservation,
    pub position: IVec3,
    pub source: PositionSource,
}

impl RecordedThrow {
    /// Validates `observation` and picks its position: its own when valid, else
    /// `last_known`, else `default`.
    pub fn resolve(
        observation: ThrowObservation,
        last_known: Option<IVec3>,
        default: IVec3,
    ) -> Result<Self> {
        observation.validate()?;
        let (position, source) = match (observation.is_valid, last_known) {
            (true, _) => (observation.position, PositionSource::Read),
            (false, Some(known)) => (known, PositionSource::LastKnown),
            (false, None) => (default, PositionSource::Default),
        };
        Ok(Self {
            observation,
            position,
            source,
        })
    }

    pub fn is_substituted(&self) -> bool {
        self.source != PositionSource::Read
    }

    pub fn sighting(&self, eye_offset: f64) -> Sighting {
        Sighting {
            eye: eye_position(self.position, eye_offset),
            heading: normalize_heading(self.observation.heading),
            angle_std_dev: self.observation.angle_std_dev,
            measured_distance: self.observation.measured_distance,
            distance_std_dev: self.observation.distance_std_dev,
        }
    }
}
