//! Ray projection and triangulation in the horizontal (x, z) plane.
//!
//! Headings use the game's azimuth convention: degrees clockwise from north, where
//! north is `-z`. A heading of 0° points along `(0, -1)`, 90° along `(1, 0)`.
//! Angles are degrees at every public interface and radians internally.
use glam::{DVec2, IVec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Determinant magnitude below which two rays are treated as parallel.
pub const PARALLEL_EPSILON: f64 = 1e-10;

/// Sub-block bias of the thrown eye's visual origin, as used by the Java edition tooling.
pub const EYE_OFFSET_STANDARD: f64 = 0.5;

/// Alternative sub-block bias found in builds tuned for a different edition.
pub const EYE_OFFSET_ALTERNATE: f64 = 0.8;

/// Unit direction for a heading in degrees.
#[inline]
pub fn heading_direction(heading_deg: f64) -> DVec2 {
    let rad = heading_deg.to_radians();
    DVec2::new(rad.sin(), -rad.cos())
}

/// Wraps any finite heading into `[0, 360)`.
#[inline]
pub fn normalize_heading(heading_deg: f64) -> f64 {
    let wrapped = heading_deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Heading in `[0, 360)` of the direction from `from` to `to`.
pub fn heading_between(from: DVec2, to: DVec2) -> f64 {
    let d = to - from;
    normalize_heading(d.x.atan2(-d.y).to_degrees())
}

/// Signed smallest difference `b - a` between two headings, in `(-180, 180]`.
pub fn heading_difference(a: f64, b: f64) -> f64 {
    let diff = normalize_heading(b - a);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

/// Horizontal eye origin for an observer standing on block `position`.
#[inline]
pub fn eye_position(position: IVec3, offset: f64) -> DVec2 {
    DVec2::new(position.x as f64 + offset, position.z as f64 + offset)
}

/// Axis-aligned rectangle in the (x, z) plane. Containment is inclusive on every edge.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl Bounds {
    pub fn new(x_min: f64, x_max: f64, z_min: f64, z_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            z_min,
            z_max,
        }
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(
            (self.x_min + self.x_max) / 2.0,
            (self.z_min + self.z_max) / 2.0,
        )
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn depth(&self) -> f64 {
        self.z_max - self.z_min
    }

    pub fn is_well_formed(&self) -> bool {
        self.x_min < self.x_max && self.z_min < self.z_max
    }

    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.x_min && p.x <= self.x_max && p.y >= self.z_min && p.y <= self.z_max
    }

    /// Closest point of the rectangle to `p`.
    pub fn clamp(&self, p: DVec2) -> DVec2 {
        DVec2::new(
            p.x.clamp(self.x_min, self.x_max),
            p.y.clamp(self.z_min, self.z_max),
        )
    }

    /// Distance from `p` to the rectangle; zero when inside.
    pub fn distance_to(&self, p: DVec2) -> f64 {
        self.clamp(p).distance(p)
    }
}

/// A half-line starting at `origin` with unit `direction`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: DVec2,
    pub direction: DVec2,
}

/// Where a ray crosses a cell: the ray parameter and the projected point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub t: f64,
    pub point: DVec2,
}

/// Successful two-ray intersection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayCrossing {
    pub point: DVec2,
    /// Distance along the first ray.
    pub t1: f64,
    /// Distance along the second ray.
    pub t2: f64,
}

/// Why two rays produced no usable intersection.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntersectionFailure {
    /// Directions are (nearly) parallel.
    Parallel,
    /// The lines cross, but behind at least one observer.
    BehindObserver,
}

impl Ray {
    pub fn new(origin: DVec2, direction: DVec2) -> Self {
        Self { origin, direction }
    }

    pub fn from_heading(origin: DVec2, heading_deg: f64) -> Self {
        Self::new(origin, heading_direction(heading_deg))
    }

    #[inline]
    pub fn at(&self, t: f64) -> DVec2 {
        self.origin + self.direction * t
    }

    /// Scalar projection of `p` onto the ray.
    #[inline]
    pub fn project(&self, p: DVec2) -> f64 {
        (p - self.origin).dot(self.direction)
    }

    /// Perpendicular distance from `p` to the ray's supporting line.
    pub fn distance_to(&self, p: DVec2) -> f64 {
        let t = self.project(p);
        (p - self.at(t)).length()
    }

    /// Projects the cell center onto the ray and accepts the foot point when it lies
    /// ahead of the origin and inside `bounds`.
    pub fn intersect_cell(&self, bounds: &Bounds) -> Option<RayHit> {
        let t = self.project(bounds.center());
        if t <= 0.0 {
            return None;
        }
        let point = self.at(t);
        bounds.contains(point).then_some(RayHit { t, point })
    }

    /// Absolute angle in degrees between the ray direction and the bearing to `p`.
    pub fn angular_deviation(&self, p: DVec2) -> f64 {
        let to = p - self.origin;
        if to.length_squared() == 0.0 {
            return 0.0;
        }
        let along = to.dot(self.direction);
        let across = self.direction.perp_dot(to);
        across.atan2(along).abs().to_degrees()
    }
}

/// Intersects two rays with Cramer's rule.
///
/// Fails with [`IntersectionFailure::Parallel`] when the determinant is below
/// [`PARALLEL_EPSILON`], and with [`IntersectionFailure::BehindObserver`] unless both
/// ray parameters are strictly positive.
pub fn intersect_rays(a: &Ray, b: &Ray) -> Result<RayCrossing, IntersectionFailure> {
    let det = a.direction.perp_dot(b.direction);
    if det.abs() < PARALLEL_EPSILON {
        return Err(IntersectionFailure::Parallel);
    }

    let delta = b.origin - a.origin;
    let t1 = delta.perp_dot(b.direction) / det;
    let t2 = delta.perp_dot(a.direction) / det;
    if t1 <= 0.0 || t2 <= 0.0 {
        return Err(IntersectionFailure::BehindObserver);
    }

    Ok(RayCrossing {
        point: a.at(t1),
        t1,
        t2,
    })
}
