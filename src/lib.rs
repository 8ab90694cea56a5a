//! Attachment-and-clipping geometry for 2D chemical diagrams.
//!
//! For every bond endpoint that touches a label, this crate decides exactly
//! where the drawn line must stop: it clips the endpoint to the label's
//! outline, keeps the approach direction on the centerline, retreats until
//! the point clears the label by a legality margin, and converges the final
//! whitespace gap. Stylized bonds (wedge, hashed, wavy, multi-line) are then
//! generated from the resolved endpoints as backend-neutral render ops; an
//! external painter turns those into SVG, pixels, or anything else.
//!
//! The pipeline is pure: every function is a deterministic transform of
//! immutable inputs, with no I/O and no shared state. Construction errors are
//! fatal ([`InvalidGeometry`]); everything the numeric retreats fail at is
//! advisory and lands in a [`RenderReport`] while the best-effort point still
//! renders.
//!
//! ```
//! use bondline::{
//!     Anchor, AttachConstraints, BondSpec, Diagram, Label, VertexId, make_box_target,
//!     render_diagram,
//! };
//! use glam::dvec2;
//!
//! let mut oh = Label::bare(VertexId(1), dvec2(10.0, 0.0));
//! oh.target = Some(make_box_target(dvec2(7.0, -2.0), dvec2(13.0, 2.0))?);
//!
//! let diagram = Diagram {
//!     labels: vec![Label::bare(VertexId(0), dvec2(0.0, 0.0)), oh],
//!     bonds: vec![BondSpec::new(
//!         Anchor::Vertex(VertexId(0)),
//!         Anchor::Vertex(VertexId(1)),
//!     )],
//! };
//! let output = render_diagram(&diagram, &AttachConstraints::solid())?;
//! assert!(output.report.is_clean());
//! # Ok::<(), bondline::InvalidGeometry>(())
//! ```

pub mod avoid;
pub mod defaults;
pub mod diagram;
pub mod errors;
pub mod log;
pub mod render;
pub mod resolve;
pub mod target;
pub mod types;

pub use avoid::{LabelTarget, ResolvedSegment, avoid_overlaps};
pub use diagram::{
    Anchor, BondSpec, Diagram, Label, RenderOutput, TextMetrics, render_diagram, target_from_text,
};
pub use errors::{Advisory, InvalidGeometry, RenderReport, ReportEntry};
pub use render::{
    BondStyle, BondStyleParams, CircleOp, DashPattern, LineOp, OpId, PathCommand, PathOp,
    PolygonOp, RenderOp, SourceId, Stroke, TaggedOp, TextOp, generate_bond_ops,
};
pub use resolve::{AttachConstraints, resolve_endpoint};
pub use target::{
    AttachTarget, BoxTarget, CircleTarget, CompositeTarget, SegmentTarget, TargetGeometry,
    make_box_target, make_circle_target, make_composite_target, make_segment_target,
};
pub use types::{Color, EdgeId, FontRef, LineCap, VertexId};
