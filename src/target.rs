//! Attach targets: the geometric regions a bond endpoint must either touch
//! precisely or avoid entirely.
//!
//! Each shape is its own type that knows how to:
//! - Report its centroid
//! - Measure signed distance to a point (negative inside)
//! - Find the boundary point seen from an external point
//! - Test intersection with a line segment
//!
//! The shapes are unified by the [`TargetGeometry`] trait, dispatched over the
//! [`AttachTarget`] enum. The query set is closed, so exhaustive matching
//! catches a missing case at compile time.

use enum_dispatch::enum_dispatch;
use glam::{DVec2, dvec2};

use crate::errors::InvalidGeometry;

/// Common geometric queries for all target shapes.
///
/// All methods are pure and side-effect-free.
#[enum_dispatch]
pub trait TargetGeometry {
    /// Center of mass of the shape.
    fn centroid(&self) -> DVec2;

    /// Signed distance from `p` to the shape boundary; negative inside.
    fn signed_distance(&self, p: DVec2) -> f64;

    /// Nearest boundary point as seen from an external point. Used for the
    /// initial clip of an undecorated bond against the shape outline.
    fn boundary_point_towards(&self, from: DVec2) -> DVec2;

    /// Whether the open segment `a..b` passes through the shape interior.
    /// Touching the boundary exactly does not count.
    fn intersects_segment(&self, a: DVec2, b: DVec2) -> bool;
}

/// A target shape a bond endpoint may need to avoid or attach to.
#[enum_dispatch(TargetGeometry)]
#[derive(Debug, Clone, PartialEq)]
pub enum AttachTarget {
    Box(BoxTarget),
    Circle(CircleTarget),
    Segment(SegmentTarget),
    Composite(CompositeTarget),
}

impl AttachTarget {
    /// A point is contained if it lies inside the shape or within `epsilon`
    /// of its boundary. `epsilon = 0` allows exact edge touch.
    pub fn contains(&self, p: DVec2, epsilon: f64) -> bool {
        self.signed_distance(p) < epsilon
    }

    /// A point is legal if it lies outside the shape by at least `epsilon`.
    pub fn is_legal(&self, p: DVec2, epsilon: f64) -> bool {
        !self.contains(p, epsilon)
    }

    /// Sub-targets of a composite, or the target itself for simple shapes.
    pub(crate) fn parts(&self) -> &[AttachTarget] {
        match self {
            AttachTarget::Composite(c) => &c.parts,
            _ => std::slice::from_ref(self),
        }
    }
}

/// Build a validated axis-aligned box target.
pub fn make_box_target(min: DVec2, max: DVec2) -> Result<AttachTarget, InvalidGeometry> {
    Ok(AttachTarget::Box(BoxTarget::new(min, max)?))
}

/// Build a validated circular target.
pub fn make_circle_target(center: DVec2, radius: f64) -> Result<AttachTarget, InvalidGeometry> {
    Ok(AttachTarget::Circle(CircleTarget::new(center, radius)?))
}

/// Build a validated capsule target around a carrier segment.
pub fn make_segment_target(
    a: DVec2,
    b: DVec2,
    half_width: f64,
) -> Result<AttachTarget, InvalidGeometry> {
    Ok(AttachTarget::Segment(SegmentTarget::new(a, b, half_width)?))
}

/// Build a composite target from an ordered list of sub-targets.
pub fn make_composite_target(parts: Vec<AttachTarget>) -> Result<AttachTarget, InvalidGeometry> {
    Ok(AttachTarget::Composite(CompositeTarget::new(parts)?))
}

// ============================================================================
// Box
// ============================================================================

/// Axis-aligned label bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxTarget {
    min: DVec2,
    max: DVec2,
}

impl BoxTarget {
    pub fn new(min: DVec2, max: DVec2) -> Result<Self, InvalidGeometry> {
        if !min.is_finite() || !max.is_finite() {
            return Err(InvalidGeometry::NonFinite {
                context: "box target",
            });
        }
        if max.x <= min.x || max.y <= min.y {
            return Err(InvalidGeometry::NonPositiveSize {
                context: "box target",
            });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> DVec2 {
        self.min
    }

    pub fn max(&self) -> DVec2 {
        self.max
    }

    fn half_extent(&self) -> DVec2 {
        (self.max - self.min) * 0.5
    }
}

impl TargetGeometry for BoxTarget {
    fn centroid(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    fn signed_distance(&self, p: DVec2) -> f64 {
        let d = (p - self.centroid()).abs() - self.half_extent();
        let outside = d.max(DVec2::ZERO).length();
        let inside = d.x.max(d.y).min(0.0);
        outside + inside
    }

    fn boundary_point_towards(&self, from: DVec2) -> DVec2 {
        let center = self.centroid();
        let he = self.half_extent();
        let d = from - center;
        if d.x == 0.0 && d.y == 0.0 {
            // Degenerate query from the centroid itself; pick the east edge.
            return dvec2(self.max.x, center.y);
        }
        // Scale the ray from the centroid so it just reaches the boundary.
        let tx = if d.x != 0.0 { he.x / d.x.abs() } else { f64::INFINITY };
        let ty = if d.y != 0.0 { he.y / d.y.abs() } else { f64::INFINITY };
        center + d * tx.min(ty)
    }

    fn intersects_segment(&self, a: DVec2, b: DVec2) -> bool {
        // Slab test against the box interior.
        let d = b - a;
        let mut t_min: f64 = 0.0;
        let mut t_max: f64 = 1.0;
        for axis in 0..2 {
            let (origin, dir, lo, hi) = if axis == 0 {
                (a.x, d.x, self.min.x, self.max.x)
            } else {
                (a.y, d.y, self.min.y, self.max.y)
            };
            if dir == 0.0 {
                if origin <= lo || origin >= hi {
                    return false;
                }
            } else {
                let inv = 1.0 / dir;
                let (t0, t1) = {
                    let t0 = (lo - origin) * inv;
                    let t1 = (hi - origin) * inv;
                    if t0 <= t1 { (t0, t1) } else { (t1, t0) }
                };
                t_min = t_min.max(t0);
                t_max = t_max.min(t1);
                if t_min >= t_max {
                    return false;
                }
            }
        }
        true
    }
}

// ============================================================================
// Circle
// ============================================================================

/// Circular exclusion for single-glyph labels, visually tighter than a box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleTarget {
    center: DVec2,
    radius: f64,
}

impl CircleTarget {
    pub fn new(center: DVec2, radius: f64) -> Result<Self, InvalidGeometry> {
        if !center.is_finite() || !radius.is_finite() {
            return Err(InvalidGeometry::NonFinite {
                context: "circle target",
            });
        }
        if radius <= 0.0 {
            return Err(InvalidGeometry::NonPositiveSize {
                context: "circle target",
            });
        }
        Ok(Self { center, radius })
    }

    pub fn center(&self) -> DVec2 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl TargetGeometry for CircleTarget {
    fn centroid(&self) -> DVec2 {
        self.center
    }

    fn signed_distance(&self, p: DVec2) -> f64 {
        (p - self.center).length() - self.radius
    }

    fn boundary_point_towards(&self, from: DVec2) -> DVec2 {
        let dir = (from - self.center)
            .try_normalize()
            .unwrap_or(DVec2::X);
        self.center + dir * self.radius
    }

    fn intersects_segment(&self, a: DVec2, b: DVec2) -> bool {
        distance_point_segment(self.center, a, b) < self.radius
    }
}

// ============================================================================
// Segment capsule
// ============================================================================

/// Capsule around a carrier line, used when the "label" is itself a thin bond
/// carrier (e.g. the carrier line of a hashed stereo bond).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentTarget {
    a: DVec2,
    b: DVec2,
    half_width: f64,
}

impl SegmentTarget {
    pub fn new(a: DVec2, b: DVec2, half_width: f64) -> Result<Self, InvalidGeometry> {
        if !a.is_finite() || !b.is_finite() || !half_width.is_finite() {
            return Err(InvalidGeometry::NonFinite {
                context: "segment target",
            });
        }
        if half_width <= 0.0 || a == b {
            return Err(InvalidGeometry::NonPositiveSize {
                context: "segment target",
            });
        }
        Ok(Self { a, b, half_width })
    }

    pub fn endpoints(&self) -> (DVec2, DVec2) {
        (self.a, self.b)
    }

    pub fn half_width(&self) -> f64 {
        self.half_width
    }
}

impl TargetGeometry for SegmentTarget {
    fn centroid(&self) -> DVec2 {
        (self.a + self.b) * 0.5
    }

    fn signed_distance(&self, p: DVec2) -> f64 {
        distance_point_segment(p, self.a, self.b) - self.half_width
    }

    fn boundary_point_towards(&self, from: DVec2) -> DVec2 {
        let q = closest_point_on_segment(from, self.a, self.b);
        let dir = (from - q).try_normalize().unwrap_or_else(|| {
            // Query point on the carrier axis; step off perpendicular to it.
            (self.b - self.a).perp().normalize()
        });
        q + dir * self.half_width
    }

    fn intersects_segment(&self, a: DVec2, b: DVec2) -> bool {
        distance_segment_segment(a, b, self.a, self.b) < self.half_width
    }
}

// ============================================================================
// Composite
// ============================================================================

/// Ordered collection of sub-targets, one per token of a multi-atom label
/// such as `CH2OH`, so different approach directions bind to different tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeTarget {
    parts: Vec<AttachTarget>,
}

impl CompositeTarget {
    pub fn new(parts: Vec<AttachTarget>) -> Result<Self, InvalidGeometry> {
        if parts.is_empty() {
            return Err(InvalidGeometry::EmptyComposite);
        }
        Ok(Self { parts })
    }

    pub fn parts(&self) -> &[AttachTarget] {
        &self.parts
    }
}

impl TargetGeometry for CompositeTarget {
    fn centroid(&self) -> DVec2 {
        let sum: DVec2 = self.parts.iter().map(|p| p.centroid()).sum();
        sum / self.parts.len() as f64
    }

    fn signed_distance(&self, p: DVec2) -> f64 {
        self.parts
            .iter()
            .map(|part| part.signed_distance(p))
            .fold(f64::INFINITY, f64::min)
    }

    fn boundary_point_towards(&self, from: DVec2) -> DVec2 {
        // Delegate to the sub-target whose boundary point lies closest to the
        // query point; ties keep the earlier part, making selection
        // deterministic for any part order.
        let mut best = self.parts[0].boundary_point_towards(from);
        let mut best_dist = best.distance_squared(from);
        for part in &self.parts[1..] {
            let candidate = part.boundary_point_towards(from);
            let dist = candidate.distance_squared(from);
            if dist < best_dist {
                best = candidate;
                best_dist = dist;
            }
        }
        best
    }

    fn intersects_segment(&self, a: DVec2, b: DVec2) -> bool {
        self.parts.iter().any(|part| part.intersects_segment(a, b))
    }
}

// ============================================================================
// Segment math helpers
// ============================================================================

/// Closest point to `p` on the segment `a..b`.
pub(crate) fn closest_point_on_segment(p: DVec2, a: DVec2, b: DVec2) -> DVec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Distance from `p` to the segment `a..b`.
pub(crate) fn distance_point_segment(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    p.distance(closest_point_on_segment(p, a, b))
}

/// Minimum distance between segments `a1..a2` and `b1..b2`.
pub(crate) fn distance_segment_segment(a1: DVec2, a2: DVec2, b1: DVec2, b2: DVec2) -> f64 {
    if segments_cross(a1, a2, b1, b2) {
        return 0.0;
    }
    distance_point_segment(a1, b1, b2)
        .min(distance_point_segment(a2, b1, b2))
        .min(distance_point_segment(b1, a1, a2))
        .min(distance_point_segment(b2, a1, a2))
}

/// Proper crossing test via orientation signs.
fn segments_cross(a1: DVec2, a2: DVec2, b1: DVec2, b2: DVec2) -> bool {
    let d1 = (a2 - a1).perp_dot(b1 - a1);
    let d2 = (a2 - a1).perp_dot(b2 - a1);
    let d3 = (b2 - b1).perp_dot(a1 - b1);
    let d4 = (b2 - b1).perp_dot(a2 - b1);
    (d1 * d2 < 0.0) && (d3 * d4 < 0.0)
}
