//! Cross-label overlap avoidance.
//!
//! Endpoint resolution only looks at a bond's own label; in a crowded diagram
//! a resolved segment can still cut straight through some *other* label. This
//! post-pass runs over the complete, immutable set of resolved segments and
//! targets (scatter/gather: resolution happens per-bond first, avoidance
//! second) and retreats the nearer endpoint of any offending segment using
//! the same bisection primitive as the legality stage.
//!
//! A minimum-bond-length guard keeps crowded diagrams from collapsing a bond
//! to zero length; hitting the guard leaves the bond at minimum length and
//! records an advisory.

use glam::DVec2;

use crate::defaults;
use crate::errors::{Advisory, RenderReport};
use crate::log::debug;
use crate::resolve::AttachConstraints;
use crate::target::{AttachTarget, TargetGeometry};
use crate::types::{EdgeId, VertexId};

/// One bond segment after endpoint resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSegment {
    pub edge: EdgeId,
    pub start: DVec2,
    pub end: DVec2,
    /// Vertices this bond is attached to; their labels are exempt from the
    /// avoidance test for this segment.
    pub endpoints: [Option<VertexId>; 2],
    pub half_line_width: f64,
}

impl ResolvedSegment {
    fn is_attached_to(&self, vertex: VertexId) -> bool {
        self.endpoints.contains(&Some(vertex))
    }

    /// Minimum drawable length for this segment.
    pub fn min_length(&self) -> f64 {
        (self.half_line_width * defaults::MIN_BOND_LENGTH_WIDTHS).max(defaults::MIN_BOND_LENGTH)
    }
}

/// A label's target, keyed by the vertex it belongs to.
#[derive(Debug, Clone)]
pub struct LabelTarget {
    pub vertex: VertexId,
    pub target: AttachTarget,
}

/// Retreat any segment that crosses a label it is not attached to.
///
/// Segments are adjusted in place; every adjustment (and every guard hit) is
/// recorded in the report under the segment's edge id.
pub fn avoid_overlaps(
    segments: &mut [ResolvedSegment],
    targets: &[LabelTarget],
    constraints: &AttachConstraints,
    report: &mut RenderReport,
) {
    for segment in segments.iter_mut() {
        report.enter_edge(segment.edge);
        for label in targets {
            if segment.is_attached_to(label.vertex) {
                continue;
            }
            if !label.target.intersects_segment(segment.start, segment.end) {
                continue;
            }
            debug!(edge = %segment.edge, vertex = %label.vertex, "segment crosses a foreign label");
            retreat_from(segment, &label.target, constraints, report);
        }
    }
    report.clear_scope();
}

/// Pull the endpoint nearer to the offending target back towards the other
/// endpoint until the segment clears the target or the length guard is hit.
fn retreat_from(
    segment: &mut ResolvedSegment,
    target: &AttachTarget,
    constraints: &AttachConstraints,
    report: &mut RenderReport,
) {
    let min_length = segment.min_length();
    let centroid = target.centroid();
    let start_is_nearer =
        segment.start.distance_squared(centroid) <= segment.end.distance_squared(centroid);
    let (fixed, moving) = if start_is_nearer {
        (segment.end, &mut segment.start)
    } else {
        (segment.start, &mut segment.end)
    };

    for _ in 0..constraints.max_retreat_iterations {
        let candidate = (*moving + fixed) * 0.5;
        if candidate.distance(fixed) < min_length {
            // Guard: leave the bond at minimum length rather than collapsing.
            if let Some(dir) = (*moving - fixed).try_normalize() {
                *moving = fixed + dir * min_length;
            }
            report.advise(Advisory::CollisionUnresolved { at: *moving });
            return;
        }
        *moving = candidate;
        let clear = target.is_legal(*moving, constraints.legality_epsilon)
            && !target.intersects_segment(fixed, *moving);
        if clear {
            return;
        }
    }

    report.advise(Advisory::CollisionUnresolved { at: *moving });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::make_box_target;
    use glam::dvec2;

    fn boxed(min: (f64, f64), max: (f64, f64)) -> AttachTarget {
        make_box_target(dvec2(min.0, min.1), dvec2(max.0, max.1)).unwrap()
    }

    fn segment(edge: u32, start: DVec2, end: DVec2) -> ResolvedSegment {
        ResolvedSegment {
            edge: EdgeId(edge),
            start,
            end,
            endpoints: [None, None],
            half_line_width: 0.5,
        }
    }

    #[test]
    fn clear_segments_are_untouched() {
        let mut segments = vec![segment(0, dvec2(0.0, 0.0), dvec2(10.0, 0.0))];
        let targets = vec![LabelTarget {
            vertex: VertexId(0),
            target: boxed((0.0, 5.0), (10.0, 8.0)),
        }];
        let before = segments.clone();
        let mut report = RenderReport::new();
        avoid_overlaps(
            &mut segments,
            &targets,
            &AttachConstraints::solid(),
            &mut report,
        );
        assert_eq!(segments, before);
        assert!(report.is_clean());
    }

    #[test]
    fn own_labels_are_exempt() {
        let mut segments = vec![ResolvedSegment {
            endpoints: [Some(VertexId(7)), None],
            ..segment(0, dvec2(0.0, 0.0), dvec2(10.0, 0.0))
        }];
        let targets = vec![LabelTarget {
            vertex: VertexId(7),
            target: boxed((4.0, -1.0), (6.0, 1.0)),
        }];
        let before = segments.clone();
        let mut report = RenderReport::new();
        avoid_overlaps(
            &mut segments,
            &targets,
            &AttachConstraints::solid(),
            &mut report,
        );
        assert_eq!(segments, before);
    }

    #[test]
    fn crossing_segment_retreats_nearer_endpoint() {
        let mut segments = vec![segment(0, dvec2(0.0, 0.0), dvec2(30.0, 0.0))];
        let targets = vec![LabelTarget {
            vertex: VertexId(1),
            target: boxed((18.0, -2.0), (24.0, 2.0)),
        }];
        let mut report = RenderReport::new();
        let constraints = AttachConstraints::solid();
        avoid_overlaps(&mut segments, &targets, &constraints, &mut report);

        let seg = &segments[0];
        // Start is untouched, end retreated clear of the label.
        assert_eq!(seg.start, dvec2(0.0, 0.0));
        assert!(seg.end.x < 18.0, "end did not clear the label: {:?}", seg.end);
        assert!(!targets[0].target.intersects_segment(seg.start, seg.end));
        assert!(
            targets[0]
                .target
                .is_legal(seg.end, constraints.legality_epsilon)
        );
    }

    #[test]
    fn collinear_label_between_endpoints_respects_length_guard() {
        // A--B--C collinear, bond A->C passes straight through B's label.
        let mut segments = vec![ResolvedSegment {
            endpoints: [Some(VertexId(0)), Some(VertexId(2))],
            ..segment(0, dvec2(0.0, 0.0), dvec2(20.0, 0.0))
        }];
        let targets = vec![LabelTarget {
            vertex: VertexId(1),
            target: boxed((8.0, -1.5), (12.0, 1.5)),
        }];
        let mut report = RenderReport::new();
        avoid_overlaps(
            &mut segments,
            &targets,
            &AttachConstraints::solid(),
            &mut report,
        );

        let seg = &segments[0];
        assert!(!targets[0].target.intersects_segment(seg.start, seg.end));
        let min_length = seg.min_length();
        assert!(
            seg.start.distance(seg.end) >= min_length,
            "bond collapsed below the guard"
        );
    }

    #[test]
    fn guard_hit_is_reported_but_not_fatal() {
        // Label swallows almost the whole segment; clearing it would collapse
        // the bond below minimum length.
        let mut segments = vec![segment(0, dvec2(0.0, 0.0), dvec2(4.0, 0.0))];
        let targets = vec![LabelTarget {
            vertex: VertexId(1),
            target: boxed((-1.0, -1.0), (3.9, 1.0)),
        }];
        let mut report = RenderReport::new();
        avoid_overlaps(
            &mut segments,
            &targets,
            &AttachConstraints::solid(),
            &mut report,
        );

        let seg = &segments[0];
        assert!(seg.start.distance(seg.end) >= seg.min_length() - 1e-9);
        assert_eq!(report.for_edge(EdgeId(0)).count(), 1);
    }
}
