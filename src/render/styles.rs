//! Directional bond-style generators.
//!
//! Pure functions from a pair of final endpoints plus style parameters to
//! concrete render ops. All of them derive orientation and length from the
//! two endpoints; nothing is passed in pre-rotated, so every style works at
//! any angle from one shared geometric model.

use glam::DVec2;

use crate::defaults;
use crate::types::{Color, LineCap};

use super::ops::{DashPattern, LineOp, PathCommand, PathOp, PolygonOp, RenderOp};

/// Visual style of a bond.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BondStyle {
    #[default]
    Normal,
    Wedge,
    Hashed,
    Wavy,
    Bold,
    Dashed,
    Dotted,
    Partial,
    Quadruple,
}

/// Style parameter bundle for one bond.
#[derive(Clone, Debug, PartialEq)]
pub struct BondStyleParams {
    pub style: BondStyle,
    /// Bond order 1..=3; orders above 1 draw parallel secondary lines.
    pub order: u8,
    pub line_width: f64,
    pub wedge_width: f64,
    /// Straddle secondary lines symmetrically around the bond axis instead of
    /// offsetting them to one side.
    pub centered: bool,
    pub color: Color,
}

impl Default for BondStyleParams {
    fn default() -> Self {
        Self {
            style: BondStyle::Normal,
            order: 1,
            line_width: defaults::DEFAULT_LINE_WIDTH,
            wedge_width: defaults::DEFAULT_WEDGE_WIDTH,
            centered: false,
            color: Color::BLACK,
        }
    }
}

/// Generate the render ops for one bond between two resolved endpoints.
///
/// `neighbor` is a reference point near the bond (typically an adjacent
/// atom); for double bonds it decides which side the secondary line goes on.
/// Without a neighbor the offset straddles the bond axis symmetrically.
pub fn generate_bond_ops(
    start: DVec2,
    end: DVec2,
    params: &BondStyleParams,
    neighbor: Option<DVec2>,
) -> Vec<RenderOp> {
    if start == end {
        return Vec::new();
    }
    match params.style {
        BondStyle::Normal => line_ops(start, end, params, neighbor, params.line_width),
        BondStyle::Bold => line_ops(
            start,
            end,
            params,
            neighbor,
            params.line_width * defaults::BOLD_WIDTH_FACTOR,
        ),
        BondStyle::Wedge => vec![wedge_op(start, end, params)],
        BondStyle::Hashed => hashed_ops(start, end, params),
        BondStyle::Wavy => vec![wavy_op(start, end, params)],
        BondStyle::Dashed => vec![dashed_op(
            start,
            end,
            params,
            DashPattern {
                on: params.line_width * defaults::DASH_ON_FACTOR,
                off: params.line_width * defaults::DASH_OFF_FACTOR,
            },
            LineCap::Butt,
        )],
        BondStyle::Dotted => vec![dashed_op(
            start,
            end,
            params,
            DashPattern {
                on: params.line_width,
                off: params.line_width * defaults::DOT_OFF_FACTOR,
            },
            LineCap::Round,
        )],
        BondStyle::Partial => vec![partial_op(start, end, params)],
        BondStyle::Quadruple => quadruple_ops(start, end, params),
    }
}

fn solid_line(a: DVec2, b: DVec2, width: f64, color: Color) -> RenderOp {
    RenderOp::Line(LineOp {
        points: vec![a, b],
        width,
        color,
        cap: LineCap::Butt,
        dash: None,
    })
}

/// Which side of the axis the secondary line goes on: towards the reference
/// neighbor when one is given, positive-perp otherwise.
fn offset_side(start: DVec2, end: DVec2, neighbor: Option<DVec2>) -> f64 {
    let axis = end - start;
    match neighbor {
        Some(n) => {
            let side = axis.perp_dot(n - start);
            if side < 0.0 { -1.0 } else { 1.0 }
        }
        None => 1.0,
    }
}

/// Single, double, and triple lines.
fn line_ops(
    start: DVec2,
    end: DVec2,
    params: &BondStyleParams,
    neighbor: Option<DVec2>,
    width: f64,
) -> Vec<RenderOp> {
    let dir = (end - start).normalize();
    let perp = dir.perp();
    let spacing = params.line_width * defaults::SECONDARY_SPACING_FACTOR;
    let shorten = (end - start).length() * defaults::SECONDARY_SHORTEN;

    // Secondary line, offset sideways and (off-axis only) pulled in at both
    // ends so it reads as subordinate to the primary.
    let secondary = |offset: f64, shortened: bool| {
        let o = perp * offset;
        let (a, b) = if shortened {
            (start + o + dir * shorten, end + o - dir * shorten)
        } else {
            (start + o, end + o)
        };
        solid_line(a, b, width, params.color.clone())
    };

    match params.order {
        2 if params.centered || neighbor.is_none() => {
            // Symmetric straddle around the bond axis.
            vec![secondary(-spacing / 2.0, false), secondary(spacing / 2.0, false)]
        }
        2 => {
            let side = offset_side(start, end, neighbor);
            vec![
                solid_line(start, end, width, params.color.clone()),
                secondary(side * spacing, true),
            ]
        }
        3 => vec![
            solid_line(start, end, width, params.color.clone()),
            secondary(spacing, true),
            secondary(-spacing, true),
        ],
        _ => vec![solid_line(start, end, width, params.color.clone())],
    }
}

/// Directional wedge: a trapezoid from a zero-width narrow end to a flat base
/// of `wedge_width`, with small chamfered corner fillets at the base so the
/// wide end does not render as a sharp triangle.
fn wedge_op(start: DVec2, end: DVec2, params: &BondStyleParams) -> RenderOp {
    let dir = (end - start).normalize();
    let perp = dir.perp();
    let half = params.wedge_width / 2.0;
    let fillet = params.wedge_width * defaults::WEDGE_FILLET_FACTOR;

    let wide_a = end + perp * half;
    let wide_b = end - perp * half;
    let edge_a = (wide_a - start).normalize();
    let edge_b = (start - wide_b).normalize();
    let base = (wide_b - wide_a).normalize();

    let points = vec![
        start,
        wide_a - edge_a * fillet,
        wide_a + base * fillet,
        wide_b - base * fillet,
        wide_b + edge_b * fillet,
    ];

    RenderOp::Polygon(PolygonOp {
        points,
        fill: Some(params.color.clone()),
        stroke: None,
    })
}

/// Hashed stereo bond: parallel cross-strokes perpendicular to the bond axis.
///
/// Strokes are built from unit vectors along the axis rather than by joining
/// points on the two converging wedge edges, which would make them fan out.
/// Stroke length interpolates linearly from `line_width` at the narrow end to
/// `wedge_width` at the wide end; spacing is a fixed fraction of the wedge
/// width.
fn hashed_ops(start: DVec2, end: DVec2, params: &BondStyleParams) -> Vec<RenderOp> {
    let span = end - start;
    let length = span.length();
    let dir = span / length;
    let perp = dir.perp();

    let spacing = params.wedge_width * defaults::HASH_SPACING_FACTOR;
    let count = ((length / spacing).floor() as u32).max(1);

    let mut ops = Vec::with_capacity(count as usize + 1);
    for i in 0..=count {
        let t = (i as f64 * spacing).min(length);
        let frac = t / length;
        let half = (params.line_width + (params.wedge_width - params.line_width) * frac) / 2.0;
        let center = start + dir * t;
        ops.push(solid_line(
            center - perp * half,
            center + perp * half,
            params.line_width,
            params.color.clone(),
        ));
    }
    ops
}

/// Wavy bond: sparse control points (four per wavelength) with amplitude
/// overshoot, emitted as quadratic segments for a smoothing painter.
///
/// Wavelength derives from the wedge width, so wavy bonds stay visually in
/// scale with the stereo marks next to them rather than with the line width.
fn wavy_op(start: DVec2, end: DVec2, params: &BondStyleParams) -> RenderOp {
    let span = end - start;
    let length = span.length();
    let dir = span / length;
    let perp = dir.perp();

    let wavelength = params.wedge_width * defaults::WAVE_LENGTH_FACTOR;
    let quarter = wavelength / f64::from(defaults::WAVE_POINTS_PER_WAVELENGTH);
    let amplitude = params.wedge_width / 2.0 * defaults::WAVE_AMPLITUDE_OVERSHOOT;

    // Control points at quarter-wavelength steps: zero, +peak, zero, -peak.
    let mut points = vec![start];
    let mut k = 1u32;
    while f64::from(k) * quarter < length {
        let offset = match k % 4 {
            1 => amplitude,
            3 => -amplitude,
            _ => 0.0,
        };
        points.push(start + dir * (f64::from(k) * quarter) + perp * offset);
        k += 1;
    }
    points.push(end);

    // Pair the points into quadratics: peaks become control points, zero
    // crossings the on-curve ends.
    let mut commands = vec![PathCommand::MoveTo(points[0])];
    let mut i = 1;
    while i < points.len() {
        if i + 1 < points.len() {
            commands.push(PathCommand::QuadTo {
                control: points[i],
                to: points[i + 1],
            });
            i += 2;
        } else {
            commands.push(PathCommand::LineTo(points[i]));
            i += 1;
        }
    }

    RenderOp::Path(PathOp {
        commands,
        stroke: Some(super::ops::Stroke {
            width: params.line_width,
            color: params.color.clone(),
        }),
        fill: None,
    })
}

fn dashed_op(
    start: DVec2,
    end: DVec2,
    params: &BondStyleParams,
    dash: DashPattern,
    cap: LineCap,
) -> RenderOp {
    RenderOp::Line(LineOp {
        points: vec![start, end],
        width: params.line_width,
        color: params.color.clone(),
        cap,
        dash: Some(dash),
    })
}

/// Partial bond: the middle fraction of the span only.
fn partial_op(start: DVec2, end: DVec2, params: &BondStyleParams) -> RenderOp {
    let margin = (1.0 - defaults::PARTIAL_SPAN_FRACTION) / 2.0;
    let a = start.lerp(end, margin);
    let b = start.lerp(end, 1.0 - margin);
    solid_line(a, b, params.line_width, params.color.clone())
}

/// Quadruple bond: two pairs of lines straddling the axis.
fn quadruple_ops(start: DVec2, end: DVec2, params: &BondStyleParams) -> Vec<RenderOp> {
    let perp = (end - start).normalize().perp();
    let spacing = params.line_width * defaults::SECONDARY_SPACING_FACTOR;
    [-1.5, -0.5, 0.5, 1.5]
        .iter()
        .map(|&k| {
            let o = perp * (spacing * k);
            solid_line(start + o, end + o, params.line_width, params.color.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    fn params(style: BondStyle) -> BondStyleParams {
        BondStyleParams {
            style,
            ..BondStyleParams::default()
        }
    }

    fn polygon_area(points: &[DVec2]) -> f64 {
        let mut twice = 0.0;
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            twice += a.perp_dot(b);
        }
        twice.abs() / 2.0
    }

    #[test]
    fn degenerate_span_produces_nothing() {
        let p = dvec2(3.0, 3.0);
        assert!(generate_bond_ops(p, p, &params(BondStyle::Normal), None).is_empty());
    }

    #[test]
    fn single_line_spans_the_endpoints() {
        let ops = generate_bond_ops(
            dvec2(0.0, 0.0),
            dvec2(10.0, 0.0),
            &params(BondStyle::Normal),
            None,
        );
        assert_eq!(ops.len(), 1);
        let RenderOp::Line(line) = &ops[0] else {
            panic!("expected a line op");
        };
        assert_eq!(line.points, vec![dvec2(0.0, 0.0), dvec2(10.0, 0.0)]);
        assert!(line.dash.is_none());
    }

    #[test]
    fn double_bond_offsets_towards_neighbor() {
        let mut p = params(BondStyle::Normal);
        p.order = 2;
        let neighbor = dvec2(5.0, -4.0);
        let ops = generate_bond_ops(dvec2(0.0, 0.0), dvec2(10.0, 0.0), &p, Some(neighbor));
        assert_eq!(ops.len(), 2);
        let RenderOp::Line(secondary) = &ops[1] else {
            panic!("expected a line op");
        };
        // Secondary sits on the neighbor's side of the axis and is shortened.
        let mid = (secondary.points[0] + secondary.points[1]) / 2.0;
        assert_eq!(mid.y.signum(), neighbor.y.signum());
        let len = secondary.points[0].distance(secondary.points[1]);
        assert!(len < 10.0);
    }

    #[test]
    fn centered_double_bond_straddles_the_axis() {
        let mut p = params(BondStyle::Normal);
        p.order = 2;
        p.centered = true;
        let ops = generate_bond_ops(dvec2(0.0, 0.0), dvec2(10.0, 0.0), &p, Some(dvec2(5.0, 4.0)));
        assert_eq!(ops.len(), 2);
        let ys: Vec<f64> = ops
            .iter()
            .map(|op| {
                let RenderOp::Line(l) = op else { panic!() };
                l.points[0].y
            })
            .collect();
        assert!((ys[0] + ys[1]).abs() < 1e-12, "offsets not symmetric: {ys:?}");
    }

    #[test]
    fn triple_bond_is_three_parallel_lines() {
        let mut p = params(BondStyle::Normal);
        p.order = 3;
        let ops = generate_bond_ops(dvec2(0.0, 0.0), dvec2(0.0, 12.0), &p, None);
        assert_eq!(ops.len(), 3);
    }

    #[test]
    fn wedge_area_is_orientation_invariant() {
        let w = 5.0;
        let l = 20.0;
        let expected = 0.5 * w * l;
        for angle in [0.0_f64, 45.0, 90.0, 180.0] {
            let rad = angle.to_radians();
            let end = dvec2(rad.cos(), rad.sin()) * l;
            let ops = generate_bond_ops(dvec2(0.0, 0.0), end, &params(BondStyle::Wedge), None);
            let RenderOp::Polygon(poly) = &ops[0] else {
                panic!("expected a polygon op");
            };
            let area = polygon_area(&poly.points);
            assert!(
                (area - expected).abs() / expected < 0.01,
                "at {angle} deg: area {area}, expected about {expected}"
            );
        }
    }

    #[test]
    fn hash_strokes_are_parallel_and_monotonic() {
        let ops = generate_bond_ops(
            dvec2(0.0, 0.0),
            dvec2(20.0, 10.0),
            &params(BondStyle::Hashed),
            None,
        );
        assert!(ops.len() >= 2);
        let axis = dvec2(20.0, 10.0).normalize();
        let mut previous = 0.0;
        for op in &ops {
            let RenderOp::Line(stroke) = op else {
                panic!("expected line ops")
            };
            let along = stroke.points[1] - stroke.points[0];
            // Perpendicular to the axis
            assert!(along.normalize().dot(axis).abs() < 1e-9);
            let len = along.length();
            assert!(len >= previous - 1e-9, "stroke lengths not monotonic");
            previous = len;
        }
        // First stroke is line-width sized; lengths stay within the wedge width.
        let first = match &ops[0] {
            RenderOp::Line(l) => l.points[0].distance(l.points[1]),
            _ => unreachable!(),
        };
        let last = match ops.last().unwrap() {
            RenderOp::Line(l) => l.points[0].distance(l.points[1]),
            _ => unreachable!(),
        };
        assert!((first - defaults::DEFAULT_LINE_WIDTH).abs() < 1e-9);
        assert!(last > first && last <= defaults::DEFAULT_WEDGE_WIDTH + 1e-9);
    }

    #[test]
    fn wavy_path_starts_and_ends_on_the_endpoints() {
        let start = dvec2(0.0, 0.0);
        let end = dvec2(40.0, 0.0);
        let ops = generate_bond_ops(start, end, &params(BondStyle::Wavy), None);
        let RenderOp::Path(path) = &ops[0] else {
            panic!("expected a path op");
        };
        assert_eq!(path.commands[0], PathCommand::MoveTo(start));
        let last_on_curve = match *path.commands.last().unwrap() {
            PathCommand::QuadTo { to, .. } | PathCommand::LineTo(to) | PathCommand::MoveTo(to) => {
                to
            }
            PathCommand::Close => unreachable!(),
        };
        assert_eq!(last_on_curve, end);
        // Peaks overshoot the nominal amplitude.
        let peak = path
            .commands
            .iter()
            .filter_map(|c| match c {
                PathCommand::QuadTo { control, .. } => Some(control.y.abs()),
                _ => None,
            })
            .fold(0.0, f64::max);
        let nominal = defaults::DEFAULT_WEDGE_WIDTH / 2.0;
        assert!(peak > nominal, "no overshoot: peak {peak}");
    }

    #[test]
    fn dashed_and_dotted_carry_patterns() {
        let a = dvec2(0.0, 0.0);
        let b = dvec2(10.0, 0.0);
        let dashed = generate_bond_ops(a, b, &params(BondStyle::Dashed), None);
        let RenderOp::Line(line) = &dashed[0] else {
            panic!()
        };
        assert!(line.dash.is_some());
        assert_eq!(line.cap, LineCap::Butt);

        let dotted = generate_bond_ops(a, b, &params(BondStyle::Dotted), None);
        let RenderOp::Line(line) = &dotted[0] else {
            panic!()
        };
        assert!(line.dash.is_some());
        assert_eq!(line.cap, LineCap::Round);
    }

    #[test]
    fn partial_bond_spans_the_middle_fraction() {
        let ops = generate_bond_ops(
            dvec2(0.0, 0.0),
            dvec2(10.0, 0.0),
            &params(BondStyle::Partial),
            None,
        );
        let RenderOp::Line(line) = &ops[0] else {
            panic!()
        };
        assert!((line.points[0].x - 2.0).abs() < 1e-12);
        assert!((line.points[1].x - 8.0).abs() < 1e-12);
    }

    #[test]
    fn quadruple_emits_four_lines() {
        let ops = generate_bond_ops(
            dvec2(0.0, 0.0),
            dvec2(10.0, 0.0),
            &params(BondStyle::Quadruple),
            None,
        );
        assert_eq!(ops.len(), 4);
    }
}
