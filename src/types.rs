//! Shared value types: identities, colors, and line caps.
//!
//! Coordinates are plain `glam::DVec2` in diagram units (Y grows downward, as
//! in most raster/SVG painters). Identity newtypes keep vertex and edge ids
//! from being mixed up in op tagging.

use std::fmt;

/// Identity of a label vertex in a diagram description.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct VertexId(pub u32);

/// Identity of a bond edge in a diagram description.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EdgeId(pub u32);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Simple color model; named colors stay as raw strings so painters can map
/// them without this crate carrying a palette.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Color {
    Named(String),
    Rgb(u8, u8, u8),
}

impl Color {
    pub fn named(name: impl Into<String>) -> Self {
        Color::Named(name.into())
    }

    pub const BLACK: Color = Color::Rgb(0, 0, 0);
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Named(s) => write!(f, "{}", s),
            Color::Rgb(r, g, b) => write!(f, "rgb({},{},{})", r, g, b),
        }
    }
}

/// Line cap applied by the painter at stroke ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
}

/// Font reference for text ops; metrics come from an external provider.
#[derive(Clone, Debug, PartialEq)]
pub struct FontRef {
    pub family: String,
    pub size: f64,
}

impl FontRef {
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_display() {
        assert_eq!(Color::Rgb(1, 2, 3).to_string(), "rgb(1,2,3)");
        assert_eq!(Color::named("crimson").to_string(), "crimson");
    }

    #[test]
    fn ids_display_with_prefix() {
        assert_eq!(VertexId(4).to_string(), "v4");
        assert_eq!(EdgeId(7).to_string(), "e7");
    }
}
