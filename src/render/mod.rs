//! Backend-neutral rendering: op types and the directional style generators.

pub mod ops;
pub mod styles;

pub use ops::{
    CircleOp, DashPattern, LineOp, OpId, PathCommand, PathOp, PolygonOp, RenderOp, SourceId,
    Stroke, TaggedOp, TextOp,
};
pub use styles::{BondStyle, BondStyleParams, generate_bond_ops};
