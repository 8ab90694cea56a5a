//! Backend-neutral drawing instructions.
//!
//! Painters (SVG writer, raster, ...) consume an ordered `Vec<TaggedOp>`; the
//! engine knows nothing about output formats. Every op carries a stable
//! [`OpId`] derived from the source bond or label, so a painter or a test can
//! trace any drawn shape back to its source.

use glam::DVec2;

use crate::types::{Color, EdgeId, FontRef, LineCap, VertexId};

/// The diagram element an op was generated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceId {
    Vertex(VertexId),
    Edge(EdgeId),
}

/// Stable op identity: source element plus the op's index within that
/// element's output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OpId {
    pub source: SourceId,
    pub index: u32,
}

/// Dash pattern in drawing units (painted length, gap length).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DashPattern {
    pub on: f64,
    pub off: f64,
}

/// Stroke settings for outlined ops.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    pub width: f64,
    pub color: Color,
}

/// A polyline.
#[derive(Clone, Debug, PartialEq)]
pub struct LineOp {
    pub points: Vec<DVec2>,
    pub width: f64,
    pub color: Color,
    pub cap: LineCap,
    pub dash: Option<DashPattern>,
}

/// A closed filled polygon.
#[derive(Clone, Debug, PartialEq)]
pub struct PolygonOp {
    pub points: Vec<DVec2>,
    pub fill: Option<Color>,
    pub stroke: Option<Stroke>,
}

/// Path commands for curved ops (wavy bonds, rounded wedges).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(DVec2),
    LineTo(DVec2),
    QuadTo { control: DVec2, to: DVec2 },
    Close,
}

/// A path of line and quadratic segments.
#[derive(Clone, Debug, PartialEq)]
pub struct PathOp {
    pub commands: Vec<PathCommand>,
    pub stroke: Option<Stroke>,
    pub fill: Option<Color>,
}

/// A filled dot.
#[derive(Clone, Debug, PartialEq)]
pub struct CircleOp {
    pub center: DVec2,
    pub radius: f64,
    pub fill: Color,
}

/// A text run; shaping and rasterization happen in the painter.
#[derive(Clone, Debug, PartialEq)]
pub struct TextOp {
    pub origin: DVec2,
    pub text: String,
    pub font: FontRef,
    pub color: Color,
}

/// One backend-neutral drawing instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderOp {
    Line(LineOp),
    Polygon(PolygonOp),
    Path(PathOp),
    Circle(CircleOp),
    Text(TextOp),
}

/// An op tagged with its stable identity.
#[derive(Clone, Debug, PartialEq)]
pub struct TaggedOp {
    pub id: OpId,
    pub op: RenderOp,
}

/// Tag a batch of ops produced for one source element, in order.
pub fn tag_ops(source: SourceId, ops: Vec<RenderOp>) -> Vec<TaggedOp> {
    ops.into_iter()
        .enumerate()
        .map(|(index, op)| TaggedOp {
            id: OpId {
                source,
                index: index as u32,
            },
            op,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    #[test]
    fn tagging_preserves_order_and_source() {
        let ops = vec![
            RenderOp::Circle(CircleOp {
                center: dvec2(0.0, 0.0),
                radius: 1.0,
                fill: Color::BLACK,
            }),
            RenderOp::Circle(CircleOp {
                center: dvec2(2.0, 0.0),
                radius: 1.0,
                fill: Color::BLACK,
            }),
        ];
        let tagged = tag_ops(SourceId::Edge(EdgeId(5)), ops);
        assert_eq!(tagged.len(), 2);
        assert_eq!(tagged[0].id.source, SourceId::Edge(EdgeId(5)));
        assert_eq!(tagged[0].id.index, 0);
        assert_eq!(tagged[1].id.index, 1);
    }
}
