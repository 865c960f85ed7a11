use crate::config::{OrbitConfig, ZoneConfig};
use crate::space::Point;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Spacing between initial marker angles; the golden angle keeps neighbours apart.
const GOLDEN_ANGLE: f64 = PI * (3.0 - 2.236_067_977_499_79);

pub fn normalize_angle(angle: f64) -> f64 {
    angle.rem_euclid(TAU)
}

/// Arc measured clockwise from the top pole. `start > end` wraps through 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedZone {
    start: f64,
    end: f64,
}

impl SpeedZone {
    pub fn from_degrees(cfg: &ZoneConfig) -> Self {
        Self {
            start: normalize_angle(cfg.start_deg.to_radians()),
            end: normalize_angle(cfg.end_deg.to_radians()),
        }
    }

    pub fn contains(&self, angle: f64) -> bool {
        let a = normalize_angle(angle);
        if self.start <= self.end {
            a >= self.start && a <= self.end
        } else {
            a >= self.start || a <= self.end
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerState {
    /// Radians clockwise from the top pole. Never wrapped, so it only grows.
    pub angle: f64,
    pub angular_speed_base: f64,
}

impl MarkerState {
    /// Position on a ring of `radius` around `center`.
    pub fn position(&self, center: Point, radius: f64) -> Point {
        center.polar(radius, self.angle - FRAC_PI_2)
    }

    /// Whether the marker is on the right-hand half of its ring, where the half-ring is drawn.
    pub fn on_visible_half(&self) -> bool {
        normalize_angle(self.angle) <= PI
    }
}

#[derive(Debug, Clone)]
pub struct OrbitSimulator {
    markers: Vec<MarkerState>,
    normal_zone: SpeedZone,
    fast_multiplier: f64,
    jitter_amplitude: f64,
    jitter_frequency: f64,
    clock: f64,
}

impl OrbitSimulator {
    pub fn new(cfg: &OrbitConfig, band_count: usize) -> Self {
        let markers = (0..band_count)
            .map(|i| MarkerState {
                angle: i as f64 * GOLDEN_ANGLE,
                angular_speed_base: cfg.base_speed + i as f64 * cfg.speed_step,
            })
            .collect();

        Self {
            markers,
            normal_zone: SpeedZone::from_degrees(&cfg.normal_zone),
            fast_multiplier: cfg.fast_multiplier,
            jitter_amplitude: cfg.jitter_amplitude,
            jitter_frequency: cfg.jitter_frequency,
            clock: 0.0,
        }
    }

    /// Applies new tunables while keeping every marker where it is.
    pub fn reconfigure(&mut self, cfg: &OrbitConfig) {
        let angles: Vec<f64> = self.markers.iter().map(|m| m.angle).collect();
        let clock = self.clock;
        *self = Self::new(cfg, angles.len());
        self.clock = clock;
        for (marker, angle) in self.markers.iter_mut().zip(angles) {
            marker.angle = angle;
        }
    }

    pub fn markers(&self) -> &[MarkerState] {
        &self.markers
    }

    /// Step length for one marker. The jitter factor stays within `1 ± amplitude`, which the
    /// config keeps below 1, so markers never reverse.
    fn delta(&self, index: usize, marker: &MarkerState, dt: f64, jitter: bool) -> f64 {
        let zone_factor = if self.normal_zone.contains(marker.angle) {
            1.0
        } else {
            self.fast_multiplier
        };
        let wobble = if jitter && self.jitter_amplitude > 0.0 {
            1.0 + self.jitter_amplitude
                * (self.clock * self.jitter_frequency * TAU + index as f64 * 1.3).sin()
        } else {
            1.0
        };
        marker.angular_speed_base * zone_factor * wobble * dt
    }

    pub fn advance(&mut self, dt: f64, frozen: bool, adaptive_quality: bool) {
        if frozen || dt <= 0.0 {
            return;
        }
        self.clock += dt;
        for i in 0..self.markers.len() {
            let step = self.delta(i, &self.markers[i], dt, !adaptive_quality);
            self.markers[i].angle += step;
        }
    }
}
