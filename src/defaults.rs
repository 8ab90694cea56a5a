//! Default sizes and tunables (all in diagram units).
//!
//! Nothing reads these as globals at runtime; they seed `AttachConstraints`
//! and the style parameter defaults, which are passed explicitly through the
//! call chain.

/// Nominal whitespace between a resolved endpoint and its own target boundary.
pub const TARGET_GAP: f64 = 1.5;

/// Acceptance half-band around [`TARGET_GAP`]; 1.5 ± 0.2 covers the
/// tolerated gap range of 1.3 to 1.7.
pub const GAP_TOLERANCE: f64 = 0.2;

/// Maximum perpendicular deviation (sine of the angle) of an approach
/// direction from the ideal centerline before alignment correction kicks in.
pub const ALIGNMENT_TOLERANCE: f64 = 0.07;

/// Legality epsilon for solid connectors. Solid lines get an extra retreat
/// margin before the gap stage, so they tolerate a looser epsilon.
pub const LEGALITY_EPSILON: f64 = 0.5;

/// Legality epsilon for decorative hatch strokes, which lack that margin.
pub const HATCH_LEGALITY_EPSILON: f64 = 0.0;

/// Iteration cap shared by the legality and gap retreat loops.
pub const MAX_RETREAT_ITERATIONS: u32 = 24;

/// Absolute floor for the minimum-bond-length guard.
pub const MIN_BOND_LENGTH: f64 = 1.0;

/// Half-line-width multiplier for the minimum-bond-length guard.
pub const MIN_BOND_LENGTH_WIDTHS: f64 = 4.0;

pub const DEFAULT_LINE_WIDTH: f64 = 1.0;
pub const DEFAULT_WEDGE_WIDTH: f64 = 5.0;

/// Hash stroke spacing as a fraction of the wedge width.
pub const HASH_SPACING_FACTOR: f64 = 0.4;

/// Sparse wavy-bond sampling: control points per wavelength.
pub const WAVE_POINTS_PER_WAVELENGTH: u32 = 4;

/// Amplitude overshoot so the smoothed spline lands on the nominal amplitude.
pub const WAVE_AMPLITUDE_OVERSHOOT: f64 = 1.5;

/// Wavelength as a multiple of the wedge width.
pub const WAVE_LENGTH_FACTOR: f64 = 2.0;

/// Perpendicular spacing of secondary double/triple lines, in line widths.
pub const SECONDARY_SPACING_FACTOR: f64 = 3.0;

/// Fractional shortening of each end of an off-axis secondary line.
pub const SECONDARY_SHORTEN: f64 = 0.12;

/// Width multiplier for bold bonds.
pub const BOLD_WIDTH_FACTOR: f64 = 2.0;

/// Fraction of the span a partial bond is drawn over (centered).
pub const PARTIAL_SPAN_FRACTION: f64 = 0.6;

/// Wedge base corner fillet, as a fraction of the wedge width.
pub const WEDGE_FILLET_FACTOR: f64 = 0.05;

/// Dash pattern factors (in line widths).
pub const DASH_ON_FACTOR: f64 = 4.0;
pub const DASH_OFF_FACTOR: f64 = 3.0;
pub const DOT_OFF_FACTOR: f64 = 2.0;
