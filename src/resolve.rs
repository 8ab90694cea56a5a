//! Endpoint resolution: from a raw bond endpoint to its final clipped point.
//!
//! Four sequential stages, each feeding the next; a stage with nothing to do
//! passes its input through unchanged:
//!
//! 1. Boundary clip against the attach target's outline
//! 2. Alignment correction towards the ideal centerline
//! 3. Legality retreat (bounded bisection towards the bond origin)
//! 4. Target-gap retreat (bounded fixed-point iteration towards the gap)
//!
//! The retreat stages are numerically convergent but not closed-form for
//! diagonal approach angles, so both run with an explicit iteration cap and
//! keep the best point seen. Running out of budget is advisory, never fatal:
//! a visually "good enough" point beats refusing to render the diagram.

use glam::DVec2;

use crate::defaults;
use crate::errors::{Advisory, RenderReport};
use crate::log::debug;
use crate::target::{AttachTarget, TargetGeometry};

/// Immutable parameter bundle for one resolution call.
///
/// These were once module-level tunables; passing them explicitly keeps the
/// pipeline thread-safe and lets tests vary them freely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttachConstraints {
    /// Nominal whitespace between the endpoint and its target boundary.
    pub target_gap: f64,
    /// Max perpendicular deviation of the approach direction from the ideal
    /// centerline (sine of the deviation angle).
    pub alignment_tolerance: f64,
    /// Minimum clearance a point must keep from a forbidden target.
    pub legality_epsilon: f64,
    /// Iteration cap for both retreat stages.
    pub max_retreat_iterations: u32,
}

impl AttachConstraints {
    /// Constraints for solid connectors, which get an extra retreat margin.
    pub fn solid() -> Self {
        Self {
            target_gap: defaults::TARGET_GAP,
            alignment_tolerance: defaults::ALIGNMENT_TOLERANCE,
            legality_epsilon: defaults::LEGALITY_EPSILON,
            max_retreat_iterations: defaults::MAX_RETREAT_ITERATIONS,
        }
    }

    /// Constraints for decorative hatch strokes, which lack that margin and
    /// therefore tolerate exact edge touch.
    pub fn hatch() -> Self {
        Self {
            legality_epsilon: defaults::HATCH_LEGALITY_EPSILON,
            ..Self::solid()
        }
    }

    pub fn with_legality_epsilon(self, legality_epsilon: f64) -> Self {
        Self {
            legality_epsilon,
            ..self
        }
    }
}

impl Default for AttachConstraints {
    fn default() -> Self {
        Self::solid()
    }
}

/// Resolve one end of a bond.
///
/// `raw` is the endpoint's raw coordinate (the label centroid when the end is
/// attached), `origin` is the opposite end's anchor point, `target` is the
/// endpoint's own attach target, and `forbidden` is the target the resolved
/// point must stay legal against (usually the same label).
///
/// With `target = None` and a raw point already legal against `forbidden`,
/// the raw point comes back unchanged.
pub fn resolve_endpoint(
    raw: DVec2,
    origin: DVec2,
    target: Option<&AttachTarget>,
    forbidden: Option<&AttachTarget>,
    constraints: &AttachConstraints,
    report: &mut RenderReport,
) -> DVec2 {
    // Stage 1: boundary clip.
    let mut point = match target {
        Some(t) => t.boundary_point_towards(origin),
        None => raw,
    };

    // Stage 2: alignment correction.
    if let Some(t) = target {
        point = align_to_centerline(point, origin, t, constraints);
    }

    // Stage 3: legality retreat.
    if let Some(f) = forbidden {
        point = legality_retreat(point, origin, f, constraints, report);
    }

    // Stage 4: target-gap retreat.
    if let Some(t) = target {
        point = gap_retreat(point, origin, t, constraints, report);
    }

    point
}

/// Perpendicular deviation of the approach direction `origin -> point` from
/// the centerline direction, expressed as the sine of the angle between them.
fn perpendicular_error(point: DVec2, origin: DVec2, centerline_dir: DVec2) -> f64 {
    match (point - origin).try_normalize() {
        Some(dir) => centerline_dir.perp_dot(dir).abs(),
        None => 0.0,
    }
}

/// Stage 2: re-aim the clipped point so its approach direction deviates from
/// the ideal centerline by no more than the alignment tolerance.
///
/// For a composite target the correction is computed independently for every
/// sub-target; candidates are scored by perpendicular error first and by
/// distance from the pre-correction point as the tie-break, and the minimum
/// is selected deterministically regardless of sub-target order.
fn align_to_centerline(
    point: DVec2,
    origin: DVec2,
    target: &AttachTarget,
    constraints: &AttachConstraints,
) -> DVec2 {
    let Some(centerline_dir) = (target.centroid() - origin).try_normalize() else {
        return point;
    };

    if perpendicular_error(point, origin, centerline_dir) <= constraints.alignment_tolerance {
        return point;
    }

    let mut best = point;
    let mut best_err = f64::INFINITY;
    let mut best_dist = f64::INFINITY;
    for part in target.parts() {
        let candidate = part.boundary_point_towards(origin);
        let err = perpendicular_error(candidate, origin, centerline_dir);
        let dist = candidate.distance_squared(point);
        if err < best_err || (err == best_err && dist < best_dist) {
            best = candidate;
            best_err = err;
            best_dist = dist;
        }
    }
    debug!(
        error = best_err,
        "alignment correction selected a new approach point"
    );
    best
}

/// Stage 3: bisection retreat until the point is legal against `forbidden`.
///
/// Each iteration halves the remaining distance towards the bond origin, so
/// the result can never move past either original endpoint. Reaching the
/// origin without achieving legality is a terminal (but non-fatal) failure;
/// the most-outside point seen is returned and an advisory recorded.
fn legality_retreat(
    point: DVec2,
    origin: DVec2,
    forbidden: &AttachTarget,
    constraints: &AttachConstraints,
    report: &mut RenderReport,
) -> DVec2 {
    if forbidden.is_legal(point, constraints.legality_epsilon) {
        return point;
    }

    let mut p = point;
    let mut best = p;
    let mut best_sd = forbidden.signed_distance(p);
    for _ in 0..constraints.max_retreat_iterations {
        p = (p + origin) * 0.5;
        let sd = forbidden.signed_distance(p);
        if sd > best_sd {
            best = p;
            best_sd = sd;
        }
        if forbidden.is_legal(p, constraints.legality_epsilon) {
            return p;
        }
        if p.distance_squared(origin) < 1e-12 {
            break;
        }
    }

    debug!("legality retreat reached the bond origin without clearance");
    report.advise(Advisory::CollisionUnresolved { at: best });
    best
}

/// Stage 4: slide the point along the approach direction until its distance
/// to the target boundary converges on the nominal gap.
///
/// The step is the current gap error measured along the signed distance, so
/// axis-aligned approaches converge in one iteration; diagonal approaches
/// change the effective gap non-linearly per step and need a few more.
fn gap_retreat(
    point: DVec2,
    origin: DVec2,
    target: &AttachTarget,
    constraints: &AttachConstraints,
    report: &mut RenderReport,
) -> DVec2 {
    let Some(dir) = (point - origin).try_normalize() else {
        return point;
    };

    let gap_error = |p: DVec2| (target.signed_distance(p) - constraints.target_gap).abs();

    let mut p = point;
    let mut best = p;
    let mut best_err = gap_error(p);
    if best_err <= defaults::GAP_TOLERANCE {
        return p;
    }

    for _ in 0..constraints.max_retreat_iterations {
        let step = constraints.target_gap - target.signed_distance(p);
        p -= dir * step;
        // Never slide past the bond origin.
        if (p - origin).dot(dir) < 0.0 {
            p = origin;
        }
        let err = gap_error(p);
        if err < best_err {
            best = p;
            best_err = err;
        }
        if err <= defaults::GAP_TOLERANCE {
            return p;
        }
    }

    debug!(error = best_err, "gap retreat exhausted its iteration budget");
    report.advise(Advisory::GapConvergenceIncomplete {
        at: best,
        achieved_gap: target.signed_distance(best),
    });
    best
}
