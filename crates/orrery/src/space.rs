use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point on a circle around `self`. Angles follow screen space: 0 is +x and positive
    /// angles turn clockwise because y grows downwards.
    pub fn polar(&self, radius: f64, angle: f64) -> Point {
        Point::new(
            self.x + radius * angle.cos(),
            self.y + radius * angle.sin(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Shrinks the rect on every side. Never produces a negative size.
    pub fn inset(&self, margin: f64) -> Rect {
        let dx = margin.min(self.width / 2.0);
        let dy = margin.min(self.height / 2.0);
        Rect::new(
            self.x + dx,
            self.y + dy,
            self.width - 2.0 * dx,
            self.height - 2.0 * dy,
        )
    }

    pub fn corners(&self) -> [Point; 4] {
        let (r, b) = (self.x + self.width, self.y + self.height);
        [
            Point::new(self.x, self.y),
            Point::new(r, self.y),
            Point::new(r, b),
            Point::new(self.x, b),
        ]
    }

    pub fn farthest_corner_distance(&self, from: Point) -> f64 {
        self.corners()
            .iter()
            .map(|c| c.distance_to(from))
            .fold(0.0, f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Drawing region reported by the host, in logical units, plus the factor between logical
/// and rendered coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            scale: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scale: 1.0,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Dial center: a fixed offset from the left edge, vertically centred.
    pub fn dial_center(&self, left_offset: f64) -> Point {
        Point::new(left_offset, self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.bounds().is_empty()
    }

    /// Scale factor usable for dividing; invalid values fall back to identity.
    pub fn effective_scale(&self) -> f64 {
        if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn polar_turns_clockwise_in_screen_space() {
        let c = Point::new(10.0, 10.0);
        let p = c.polar(5.0, FRAC_PI_2);
        assert_abs_diff_eq!(p.x, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 15.0, epsilon = 1e-12);
    }

    #[test]
    fn inset_clamps_to_half_size() {
        let r = Rect::new(0.0, 0.0, 10.0, 40.0).inset(8.0);
        assert_eq!(r, Rect::new(5.0, 8.0, 0.0, 24.0));
        assert!(r.is_empty());
    }

    #[test]
    fn farthest_corner_from_left_center() {
        let r = Rect::new(0.0, 0.0, 300.0, 800.0);
        let d = r.farthest_corner_distance(Point::new(0.0, 400.0));
        assert_abs_diff_eq!(d, 500.0, epsilon = 1e-9);
    }

    #[test]
    fn bad_scale_is_identity() {
        assert_eq!(Viewport::new(1.0, 1.0).with_scale(0.0).effective_scale(), 1.0);
        assert_eq!(
            Viewport::new(1.0, 1.0).with_scale(f64::NAN).effective_scale(),
            1.0
        );
        assert_eq!(Viewport::new(1.0, 1.0).with_scale(2.0).effective_scale(), 2.0);
    }
}
