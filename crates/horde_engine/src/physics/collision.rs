//! Capsule collision queries
//!
//! Every collider is a capsule: a segment plus a radius. The segment is not
//! stored; it is derived from the owner's position and heading each time a
//! check runs. Pools are small, so checks are brute force.

use crate::foundation::math::{Mat3, Vec3};

/// Below this squared cross-product magnitude two segments count as parallel
const PARALLEL_EPSILON: f32 = 0.001;

/// Below this length a segment is treated as a single point
const DEGENERATE_LENGTH: f32 = 1e-6;

/// Capsule collider dimensions
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Capsule {
    /// Length of the core segment
    pub height: f32,
    /// Radius around the segment
    pub radius: f32,
}

impl Capsule {
    /// Create a capsule
    pub fn new(height: f32, radius: f32) -> Self {
        Self { height, radius }
    }

    /// Segment endpoints for a capsule centred at `center` and aligned with `direction`
    ///
    /// `direction` is expected to be unit length.
    pub fn segment(&self, center: Vec3, direction: Vec3) -> (Vec3, Vec3) {
        let half = direction * (self.height * 0.5);
        (center - half, center + half)
    }

    /// Distance from the centre to the farthest point of the capsule
    pub fn reach(&self) -> f32 {
        self.height * 0.5 + self.radius
    }

    /// Whether a sphere of `point_radius` at `point` touches this capsule
    pub fn touches_point(&self, center: Vec3, direction: Vec3, point: Vec3, point_radius: f32) -> bool {
        let (a, b) = self.segment(center, direction);
        distance_point_to_segment(point, a, b) <= point_radius + self.radius
    }

    /// Whether two oriented capsules touch
    ///
    /// A bounding-sphere test on the centres rejects distant pairs before the
    /// segment distance is computed.
    pub fn touches_capsule(
        &self,
        center: Vec3,
        direction: Vec3,
        other: &Self,
        other_center: Vec3,
        other_direction: Vec3,
    ) -> bool {
        if (center - other_center).magnitude() > self.reach() + other.reach() {
            return false;
        }
        let (a0, a1) = self.segment(center, direction);
        let (b0, b1) = other.segment(other_center, other_direction);
        distance_segment_to_segment(a0, a1, b0, b1) <= self.radius + other.radius
    }
}

/// Distance from `point` to the segment `a`-`b`
///
/// A zero-length segment needs no special case: the first projection test
/// already returns `|point - a|`.
pub fn distance_point_to_segment(point: Vec3, a: Vec3, b: Vec3) -> f32 {
    let ab = b - a;
    let ap = point - a;
    if ap.dot(&ab) <= 0.0 {
        return ap.magnitude();
    }

    let bp = point - b;
    if bp.dot(&ab) >= 0.0 {
        return bp.magnitude();
    }

    ab.cross(&ap).magnitude() / ab.magnitude()
}

/// Closest distance between segments `a0`-`a1` and `b0`-`b1`
pub fn distance_segment_to_segment(a0: Vec3, a1: Vec3, b0: Vec3, b1: Vec3) -> f32 {
    let a = a1 - a0;
    let b = b1 - b0;
    let mag_a = a.magnitude();
    let mag_b = b.magnitude();

    if mag_a < DEGENERATE_LENGTH {
        return distance_point_to_segment(a0, b0, b1);
    }
    if mag_b < DEGENERATE_LENGTH {
        return distance_point_to_segment(b0, a0, a1);
    }

    let dir_a = a / mag_a;
    let dir_b = b / mag_b;

    let cross = dir_a.cross(&dir_b);
    let denom = cross.magnitude_squared();

    if denom < PARALLEL_EPSILON {
        // Parallel: either disjoint along A's axis or overlapping.
        let d0 = dir_a.dot(&(b0 - a0));
        let d1 = dir_a.dot(&(b1 - a0));

        if d0 <= 0.0 && d1 <= 0.0 {
            return if d0.abs() < d1.abs() {
                (a0 - b0).magnitude()
            } else {
                (a0 - b1).magnitude()
            };
        }
        if d0 >= mag_a && d1 >= mag_a {
            return if d0.abs() < d1.abs() {
                (a1 - b0).magnitude()
            } else {
                (a1 - b1).magnitude()
            };
        }

        return ((dir_a * d0 + a0) - b0).magnitude();
    }

    let t = b0 - a0;
    let det_a = Mat3::from_columns(&[t, dir_b, cross]).determinant();
    let det_b = Mat3::from_columns(&[t, dir_a, cross]).determinant();

    let t0 = det_a / denom;
    let t1 = det_b / denom;

    let a_clamped = !(0.0..=mag_a).contains(&t0);
    let b_clamped = !(0.0..=mag_b).contains(&t1);

    let mut closest_a = if t0 < 0.0 {
        a0
    } else if t0 > mag_a {
        a1
    } else {
        a0 + dir_a * t0
    };
    let mut closest_b = if t1 < 0.0 {
        b0
    } else if t1 > mag_b {
        b1
    } else {
        b0 + dir_b * t1
    };

    // A clamped point moves the best partner on the other segment.
    if a_clamped {
        let along = dir_b.dot(&(closest_a - b0)).clamp(0.0, mag_b);
        closest_b = b0 + dir_b * along;
    }
    if b_clamped {
        let along = dir_a.dot(&(closest_b - a0)).clamp(0.0, mag_a);
        closest_a = a0 + dir_a * along;
    }

    (closest_a - closest_b).magnitude()
}
