//! Procedural ring paths.
//!
//! Angles are in screen space around the dial center: 0 points right, positive angles turn
//! clockwise. The resting half ring runs from the top pole (−π/2) through 0 to the bottom
//! pole (+π/2).

use crate::config::LabelConfig;
use crate::easing::{lerp, smoothstep};
use crate::space::{Point, Rect};
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSegment {
    pub center: Point,
    pub radius: f64,
    pub start: f64,
    pub end: f64,
}

impl ArcSegment {
    pub fn start_point(&self) -> Point {
        self.center.polar(self.radius, self.start)
    }

    pub fn end_point(&self) -> Point {
        self.center.polar(self.radius, self.end)
    }

    pub fn sweep(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    /// Clockwise arc; draws a line from the current point to the arc start first.
    Arc(ArcSegment),
    Close,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, p: Point) -> Self {
        self.commands.push(PathCommand::MoveTo(p));
        self
    }

    pub fn line_to(mut self, p: Point) -> Self {
        self.commands.push(PathCommand::LineTo(p));
        self
    }

    pub fn arc(mut self, center: Point, radius: f64, start: f64, end: f64) -> Self {
        self.commands.push(PathCommand::Arc(ArcSegment {
            center,
            radius,
            start,
            end,
        }));
        self
    }

    pub fn close(mut self) -> Self {
        self.commands.push(PathCommand::Close);
        self
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.commands.last(), Some(PathCommand::Close))
    }

    pub fn arcs(&self) -> impl Iterator<Item = &ArcSegment> {
        self.commands.iter().filter_map(|c| match c {
            PathCommand::Arc(arc) => Some(arc),
            _ => None,
        })
    }
}

/// SVG path data. Arcs wider than a half turn are split, since a single SVG arc command
/// cannot describe a full circle.
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        let mut current: Option<Point> = None;
        for command in &self.commands {
            match command {
                PathCommand::MoveTo(p) => {
                    parts.push(format!("M {:.3} {:.3}", p.x, p.y));
                    current = Some(*p);
                }
                PathCommand::LineTo(p) => {
                    parts.push(format!("L {:.3} {:.3}", p.x, p.y));
                    current = Some(*p);
                }
                PathCommand::Close => parts.push("Z".to_string()),
                PathCommand::Arc(arc) => {
                    let start = arc.start_point();
                    if current.is_none_or(|c| c.distance_to(start) > 1e-9) {
                        parts.push(format!("L {:.3} {:.3}", start.x, start.y));
                    }
                    let pieces = (arc.sweep() / PI).ceil().max(1.0) as usize;
                    let step = arc.sweep() / pieces as f64;
                    for i in 1..=pieces {
                        let p = arc.center.polar(arc.radius, arc.start + step * i as f64);
                        parts.push(format!(
                            "A {r:.3} {r:.3} 0 0 1 {:.3} {:.3}",
                            p.x,
                            p.y,
                            r = arc.radius
                        ));
                    }
                    current = Some(arc.end_point());
                }
            }
        }
        write!(f, "{}", parts.join(" "))
    }
}

/// Semicircle from the top pole to the bottom pole; also the guide curve for ring labels.
pub fn half_ring_path(center: Point, radius: f64) -> Path {
    Path::new()
        .move_to(center.polar(radius, -FRAC_PI_2))
        .arc(center, radius, -FRAC_PI_2, FRAC_PI_2)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedPath {
    pub before: Path,
    pub after: Path,
    /// Angular width of the label gap.
    pub gap: f64,
    /// Set when the label did not fit and the gap was clamped.
    pub overflow: bool,
}

pub fn estimated_label_width(label: &str, cfg: &LabelConfig) -> f64 {
    label.chars().count() as f64 * cfg.avg_char_width * (1.0 + cfg.tracking) + cfg.margin
}

/// Half ring with a gap centred on its midpoint, sized for `label`.
pub fn segmented_path(center: Point, radius: f64, label: &str, cfg: &LabelConfig) -> SegmentedPath {
    let min_arc = cfg.min_arc_fraction * PI;
    let max_gap = PI - 2.0 * min_arc;
    let wanted = estimated_label_width(label, cfg) / radius;

    let (gap, overflow) = if wanted.is_finite() && wanted >= 0.0 && wanted <= max_gap {
        (wanted, false)
    } else {
        (max_gap, true)
    };

    let cut = gap / 2.0;
    SegmentedPath {
        before: Path::new()
            .move_to(center.polar(radius, -FRAC_PI_2))
            .arc(center, radius, -FRAC_PI_2, -cut),
        after: Path::new()
            .move_to(center.polar(radius, cut))
            .arc(center, radius, cut, FRAC_PI_2),
        gap,
        overflow,
    }
}

/// How the morph interpolates between rest and full coverage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MorphStyle {
    /// Three weighted phases whose knots line up with the anticipation and expansion targets.
    Phased { anticipation: f64, expansion: f64 },
    /// Plain lerp, used under adaptive quality.
    Linear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MorphShape {
    pub path: Path,
    /// Region the path must be clipped to; the full-coverage rectangle.
    pub clip: Rect,
}

/// Piecewise smoothstep through `(knot, weight)` pairs starting at (0, 0) and ending at (1, 1).
fn weighted(progress: f64, knots: [(f64, f64); 2]) -> f64 {
    let mut prev = (0.0, 0.0);
    for (at, weight) in knots.into_iter().chain(std::iter::once((1.0, 1.0))) {
        if progress <= at {
            let span = at - prev.0;
            let local = if span > 0.0 {
                (progress - prev.0) / span
            } else {
                1.0
            };
            return lerp(prev.1, weight, smoothstep(local));
        }
        prev = (at, weight);
    }
    1.0
}

fn morph_weights(progress: f64, style: MorphStyle) -> (f64, f64) {
    match style {
        MorphStyle::Linear => (progress, progress),
        MorphStyle::Phased {
            anticipation,
            expansion,
        } => (
            weighted(progress, [(anticipation, 0.02), (expansion, 0.85)]),
            weighted(progress, [(anticipation, 0.0), (expansion, 0.6)]),
        ),
    }
}

fn wedge(center: Point, radius: f64, coverage: f64) -> Path {
    let half = coverage / 2.0;
    if coverage >= TAU {
        return Path::new()
            .move_to(center.polar(radius, -PI))
            .arc(center, radius, -PI, PI)
            .close();
    }
    Path::new()
        .move_to(center.polar(radius, -half))
        .arc(center, radius, -half, half)
        .line_to(center)
        .close()
}

fn rectangle(rect: Rect) -> Path {
    let [tl, tr, br, bl] = rect.corners();
    Path::new()
        .move_to(tl)
        .line_to(tr)
        .line_to(br)
        .line_to(bl)
        .close()
}

/// Boundary of an expanding band. At 0 it is the resting half-ring wedge; at 1 it is the
/// inset viewport rectangle. In between the wedge grows in radius and angular coverage and
/// is clipped to that rectangle, so the shape is continuous in `progress`.
pub fn morph_path(
    center: Point,
    radius: f64,
    progress: f64,
    bounds: Rect,
    margin: f64,
    overscan: f64,
    style: MorphStyle,
) -> MorphShape {
    let clip = bounds.inset(margin);
    let progress = progress.clamp(0.0, 1.0);

    if progress >= 1.0 {
        return MorphShape {
            path: rectangle(clip),
            clip,
        };
    }

    let full = (clip.farthest_corner_distance(center) * overscan).max(radius);
    let (radial, angular) = morph_weights(progress, style);
    let r = lerp(radius, full, radial);
    let coverage = lerp(PI, TAU, angular);

    MorphShape {
        path: wedge(center, r, coverage),
        clip,
    }
}
