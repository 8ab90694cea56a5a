//! Diagram description and the per-diagram render driver.
//!
//! The driver is a one-way pipeline: build targets, resolve every bond
//! endpoint independently, run the cross-label avoidance pass over the
//! complete resolved set, generate style ops, and assemble the ordered op
//! list. Nothing mutates shared state, so a multi-threaded host can resolve
//! bonds in parallel as long as the target set is fully constructed first.

use glam::DVec2;

use crate::avoid::{LabelTarget, ResolvedSegment, avoid_overlaps};
use crate::defaults;
use crate::errors::{InvalidGeometry, RenderReport};
use crate::render::ops::{RenderOp, SourceId, TaggedOp, TextOp, tag_ops};
use crate::render::styles::{BondStyle, BondStyleParams, generate_bond_ops};
use crate::resolve::{AttachConstraints, resolve_endpoint};
use crate::target::{AttachTarget, TargetGeometry, make_box_target, make_composite_target};
use crate::types::{Color, EdgeId, FontRef, VertexId};

/// A label vertex: a position, optional text, and the attach target built
/// from the measured text (absent for bare carbon-skeleton vertices).
#[derive(Debug, Clone)]
pub struct Label {
    pub id: VertexId,
    pub position: DVec2,
    pub text: Option<String>,
    pub font: Option<FontRef>,
    pub target: Option<AttachTarget>,
}

impl Label {
    /// A bare vertex with no text and no exclusion region.
    pub fn bare(id: VertexId, position: DVec2) -> Self {
        Self {
            id,
            position,
            text: None,
            font: None,
            target: None,
        }
    }

    fn anchor_point(&self) -> DVec2 {
        match &self.target {
            Some(t) => t.centroid(),
            None => self.position,
        }
    }
}

/// One end of a bond: either a free coordinate or a label vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    Point(DVec2),
    Vertex(VertexId),
}

/// One bond, immutable for the duration of a render pass.
#[derive(Debug, Clone)]
pub struct BondSpec {
    pub start: Anchor,
    pub end: Anchor,
    pub style: BondStyle,
    pub order: u8,
    pub line_width: f64,
    pub wedge_width: f64,
    pub centered: bool,
    pub color: Color,
}

impl BondSpec {
    pub fn new(start: Anchor, end: Anchor) -> Self {
        Self {
            start,
            end,
            style: BondStyle::Normal,
            order: 1,
            line_width: defaults::DEFAULT_LINE_WIDTH,
            wedge_width: defaults::DEFAULT_WEDGE_WIDTH,
            centered: false,
            color: Color::BLACK,
        }
    }

    fn style_params(&self) -> BondStyleParams {
        BondStyleParams {
            style: self.style,
            order: self.order,
            line_width: self.line_width,
            wedge_width: self.wedge_width,
            centered: self.centered,
            color: self.color.clone(),
        }
    }
}

/// A full diagram description for one render pass.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    pub labels: Vec<Label>,
    pub bonds: Vec<BondSpec>,
}

/// Result of a render pass: the ordered op list plus advisory diagnostics.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub ops: Vec<TaggedOp>,
    pub report: RenderReport,
}

/// Render a diagram into backend-neutral ops.
///
/// Fails only on data contract violations (unknown vertex references);
/// crowding and convergence shortfalls are reported, not raised.
pub fn render_diagram(
    diagram: &Diagram,
    constraints: &AttachConstraints,
) -> Result<RenderOutput, InvalidGeometry> {
    let mut report = RenderReport::new();

    // Scatter: resolve both ends of every bond independently.
    let mut segments = Vec::with_capacity(diagram.bonds.len());
    for (index, bond) in diagram.bonds.iter().enumerate() {
        let edge = EdgeId(index as u32);
        report.enter_edge(edge);
        segments.push(resolve_bond(diagram, edge, bond, constraints, &mut report)?);
    }
    report.clear_scope();

    // Gather: the avoidance pass reads the complete immutable target set.
    let label_targets: Vec<LabelTarget> = diagram
        .labels
        .iter()
        .filter_map(|label| {
            label.target.as_ref().map(|target| LabelTarget {
                vertex: label.id,
                target: target.clone(),
            })
        })
        .collect();
    avoid_overlaps(&mut segments, &label_targets, constraints, &mut report);

    // Style generation and op assembly, bond ops first, then label text.
    let mut ops = Vec::new();
    for (bond, segment) in diagram.bonds.iter().zip(&segments) {
        let neighbor = reference_neighbor(diagram, bond);
        let bond_ops = generate_bond_ops(segment.start, segment.end, &bond.style_params(), neighbor);
        ops.extend(tag_ops(SourceId::Edge(segment.edge), bond_ops));
    }
    for label in &diagram.labels {
        if let (Some(text), Some(font)) = (&label.text, &label.font) {
            let text_op = RenderOp::Text(TextOp {
                origin: label.position,
                text: text.clone(),
                font: font.clone(),
                color: Color::BLACK,
            });
            ops.extend(tag_ops(SourceId::Vertex(label.id), vec![text_op]));
        }
    }

    Ok(RenderOutput { ops, report })
}

fn find_label<'a>(diagram: &'a Diagram, vertex: VertexId) -> Result<&'a Label, InvalidGeometry> {
    diagram
        .labels
        .iter()
        .find(|l| l.id == vertex)
        .ok_or(InvalidGeometry::UnknownVertex { vertex })
}

fn resolve_bond(
    diagram: &Diagram,
    edge: EdgeId,
    bond: &BondSpec,
    constraints: &AttachConstraints,
    report: &mut RenderReport,
) -> Result<ResolvedSegment, InvalidGeometry> {
    // Hatch strokes lack the solid retreat margin and tolerate edge touch.
    let constraints = if bond.style == BondStyle::Hashed {
        constraints.with_legality_epsilon(defaults::HATCH_LEGALITY_EPSILON)
    } else {
        *constraints
    };

    let ends = [&bond.start, &bond.end].map(|anchor| match anchor {
        Anchor::Point(p) => Ok((*p, None, None)),
        Anchor::Vertex(v) => {
            let label = find_label(diagram, *v)?;
            Ok((label.anchor_point(), label.target.as_ref(), Some(*v)))
        }
    });
    let [(start_raw, start_target, start_vertex), (end_raw, end_target, end_vertex)] = {
        let [a, b] = ends;
        [a?, b?]
    };

    let start = resolve_endpoint(
        start_raw,
        end_raw,
        start_target,
        start_target,
        &constraints,
        report,
    );
    let end = resolve_endpoint(
        end_raw,
        start_raw,
        end_target,
        end_target,
        &constraints,
        report,
    );

    Ok(ResolvedSegment {
        edge,
        start,
        end,
        endpoints: [start_vertex, end_vertex],
        half_line_width: bond.line_width / 2.0,
    })
}

/// Reference point for the side choice of double-bond secondary lines: the
/// far end of the first other bond sharing a vertex with this one.
fn reference_neighbor(diagram: &Diagram, bond: &BondSpec) -> Option<DVec2> {
    let shared = |anchor: &Anchor, other: &BondSpec| match anchor {
        Anchor::Vertex(v) => {
            other.start == Anchor::Vertex(*v) || other.end == Anchor::Vertex(*v)
        }
        Anchor::Point(_) => false,
    };
    let anchor_pos = |anchor: &Anchor| match anchor {
        Anchor::Point(p) => Some(*p),
        Anchor::Vertex(v) => find_label(diagram, *v).ok().map(|l| l.anchor_point()),
    };

    for other in &diagram.bonds {
        if std::ptr::eq(other, bond) {
            continue;
        }
        for own in [&bond.start, &bond.end] {
            if shared(own, other) {
                // Take the end of the neighbor bond that is not the shared one.
                let far = if other.start == *own {
                    &other.end
                } else {
                    &other.start
                };
                if let Some(p) = anchor_pos(far) {
                    return Some(p);
                }
            }
        }
    }
    None
}

// ============================================================================
// Target construction from measured text
// ============================================================================

/// Narrow seam to the host's font machinery; the engine never shapes or
/// rasterizes text itself.
pub trait TextMetrics {
    /// Per-character advance widths for `text` in `font`.
    fn measure(&self, text: &str, font: &FontRef) -> Vec<(char, f64)>;
    fn ascent(&self, font: &FontRef) -> f64;
    fn descent(&self, font: &FontRef) -> f64;
}

/// Build an attach target from a measured label.
///
/// `origin` is the baseline left of the text run. Single-token labels get one
/// box; multi-token labels (one token per element symbol with its counts,
/// e.g. `CH2OH` = `C`/`H2`/`O`/`H`) get a composite with one box per token so
/// bonds bind to the token facing them.
pub fn target_from_text(
    metrics: &dyn TextMetrics,
    text: &str,
    font: &FontRef,
    origin: DVec2,
) -> Result<AttachTarget, InvalidGeometry> {
    let advances = metrics.measure(text, font);
    if advances.is_empty() {
        return Err(InvalidGeometry::NonPositiveSize {
            context: "text target",
        });
    }
    let ascent = metrics.ascent(font);
    let descent = metrics.descent(font);

    let mut boxes: Vec<AttachTarget> = Vec::new();
    let mut x = origin.x;
    let mut token_start = origin.x;
    let mut token_open = false;

    for (ch, advance) in advances {
        // An uppercase letter opens a new token (element symbol boundary).
        if ch.is_ascii_uppercase() && token_open && x > token_start {
            boxes.push(make_box_target(
                DVec2::new(token_start, origin.y - ascent),
                DVec2::new(x, origin.y + descent),
            )?);
            token_start = x;
        }
        token_open = true;
        x += advance;
    }
    if x > token_start {
        boxes.push(make_box_target(
            DVec2::new(token_start, origin.y - ascent),
            DVec2::new(x, origin.y + descent),
        )?);
    }

    if boxes.len() == 1 {
        Ok(boxes.remove(0))
    } else {
        make_composite_target(boxes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetGeometry;
    use glam::dvec2;

    struct FixedMetrics;

    impl TextMetrics for FixedMetrics {
        fn measure(&self, text: &str, _font: &FontRef) -> Vec<(char, f64)> {
            text.chars().map(|c| (c, 6.0)).collect()
        }
        fn ascent(&self, _font: &FontRef) -> f64 {
            4.0
        }
        fn descent(&self, _font: &FontRef) -> f64 {
            1.0
        }
    }

    fn font() -> FontRef {
        FontRef::new("Helvetica", 12.0)
    }

    #[test]
    fn single_token_label_builds_one_box() {
        // "Cl" is one element symbol: the lowercase letter stays in the token.
        let t = target_from_text(&FixedMetrics, "Cl", &font(), dvec2(0.0, 0.0)).unwrap();
        assert!(matches!(t, AttachTarget::Box(_)));
        assert_eq!(t.centroid(), dvec2(6.0, -1.5));
    }

    #[test]
    fn adjacent_element_symbols_split_into_parts() {
        // "OH" is two element symbols, so each uppercase letter opens a token.
        let t = target_from_text(&FixedMetrics, "OH", &font(), dvec2(0.0, 0.0)).unwrap();
        let AttachTarget::Composite(c) = &t else {
            panic!("expected composite, got {t:?}");
        };
        assert_eq!(c.parts().len(), 2);
        // The split is at the glyph boundary between the two symbols.
        assert_eq!(c.parts()[0].centroid(), dvec2(3.0, -1.5));
        assert_eq!(c.parts()[1].centroid(), dvec2(9.0, -1.5));
    }

    #[test]
    fn multi_token_label_builds_composite_per_token() {
        let t = target_from_text(&FixedMetrics, "CH2OH", &font(), dvec2(0.0, 0.0)).unwrap();
        let AttachTarget::Composite(c) = &t else {
            panic!("expected composite, got {t:?}");
        };
        // Tokens: C, H2, O, H
        assert_eq!(c.parts().len(), 4);
    }

    #[test]
    fn empty_label_is_invalid() {
        assert!(target_from_text(&FixedMetrics, "", &font(), dvec2(0.0, 0.0)).is_err());
    }

    #[test]
    fn unknown_vertex_is_fatal() {
        let diagram = Diagram {
            labels: vec![],
            bonds: vec![BondSpec::new(
                Anchor::Point(dvec2(0.0, 0.0)),
                Anchor::Vertex(VertexId(9)),
            )],
        };
        let err = render_diagram(&diagram, &AttachConstraints::solid()).unwrap_err();
        assert_eq!(err, InvalidGeometry::UnknownVertex { vertex: VertexId(9) });
    }

    #[test]
    fn bond_between_bare_vertices_renders_one_line() {
        let diagram = Diagram {
            labels: vec![
                Label::bare(VertexId(0), dvec2(0.0, 0.0)),
                Label::bare(VertexId(1), dvec2(10.0, 0.0)),
            ],
            bonds: vec![BondSpec::new(
                Anchor::Vertex(VertexId(0)),
                Anchor::Vertex(VertexId(1)),
            )],
        };
        let out = render_diagram(&diagram, &AttachConstraints::solid()).unwrap();
        assert_eq!(out.ops.len(), 1);
        assert!(out.report.is_clean());
        assert_eq!(out.ops[0].id.source, SourceId::Edge(EdgeId(0)));
    }

    #[test]
    fn labeled_vertex_emits_text_op_after_bond_ops() {
        let mut label = Label::bare(VertexId(1), dvec2(10.0, 0.0));
        label.text = Some("OH".into());
        label.font = Some(font());
        label.target =
            Some(make_box_target(dvec2(7.0, -2.0), dvec2(13.0, 2.0)).unwrap());
        let diagram = Diagram {
            labels: vec![Label::bare(VertexId(0), dvec2(0.0, 0.0)), label],
            bonds: vec![BondSpec::new(
                Anchor::Vertex(VertexId(0)),
                Anchor::Vertex(VertexId(1)),
            )],
        };
        let out = render_diagram(&diagram, &AttachConstraints::solid()).unwrap();
        let text_ops: Vec<_> = out
            .ops
            .iter()
            .filter(|op| matches!(op.op, RenderOp::Text(_)))
            .collect();
        assert_eq!(text_ops.len(), 1);
        assert_eq!(text_ops[0].id.source, SourceId::Vertex(VertexId(1)));
        // Text comes after the bond's line ops.
        assert!(matches!(out.ops[0].op, RenderOp::Line(_)));
    }

    #[test]
    fn neighbor_reference_comes_from_shared_vertex() {
        let diagram = Diagram {
            labels: vec![
                Label::bare(VertexId(0), dvec2(0.0, 0.0)),
                Label::bare(VertexId(1), dvec2(10.0, 0.0)),
                Label::bare(VertexId(2), dvec2(15.0, 8.0)),
            ],
            bonds: vec![
                BondSpec {
                    order: 2,
                    ..BondSpec::new(Anchor::Vertex(VertexId(0)), Anchor::Vertex(VertexId(1)))
                },
                BondSpec::new(Anchor::Vertex(VertexId(1)), Anchor::Vertex(VertexId(2))),
            ],
        };
        let out = render_diagram(&diagram, &AttachConstraints::solid()).unwrap();
        // Double bond: two line ops for edge 0, secondary offset towards v2
        // (positive y side).
        let edge0: Vec<_> = out
            .ops
            .iter()
            .filter(|op| op.id.source == SourceId::Edge(EdgeId(0)))
            .collect();
        assert_eq!(edge0.len(), 2);
        let RenderOp::Line(secondary) = &edge0[1].op else {
            panic!("expected a line op");
        };
        assert!(secondary.points[0].y > 0.0);
    }
}
