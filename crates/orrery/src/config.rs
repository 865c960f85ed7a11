use crate::layout::BandColor;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Every tunable of the dial. Sections default independently so a config file only needs
/// the values it changes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DialConfig {
    pub layout: LayoutConfig,
    pub label: LabelConfig,
    pub orbit: OrbitConfig,
    pub animation: AnimationConfig,
    pub performance: PerformanceConfig,
    pub viewport: ViewportConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub min_radius: f64,
    pub radius_step: f64,
    pub thickness: f64,
    pub palette: Vec<BandColor>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_radius: 72.0,
            radius_step: 44.0,
            thickness: 44.0,
            palette: BandColor::stone_and_metal(),
        }
    }
}

/// Text width estimate used to cut the label gap out of a ring.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LabelConfig {
    pub avg_char_width: f64,
    pub tracking: f64,
    pub margin: f64,
    /// Smallest arc kept on each side of the gap, as a fraction of the half circle.
    pub min_arc_fraction: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            avg_char_width: 12.0,
            tracking: 0.08,
            margin: 20.0,
            min_arc_fraction: 0.05,
        }
    }
}

/// Arc (in degrees, clockwise from the top pole) where markers move at base speed.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ZoneConfig {
    pub start_deg: f64,
    pub end_deg: f64,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            start_deg: 340.0,
            end_deg: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Radians per second inside the normal zone.
    pub base_speed: f64,
    /// Extra radians per second added per ordinal step.
    pub speed_step: f64,
    pub fast_multiplier: f64,
    pub normal_zone: ZoneConfig,
    /// Relative amplitude of the sinusoidal speed wobble, 0 disables it.
    pub jitter_amplitude: f64,
    /// Wobble frequency in Hz.
    pub jitter_frequency: f64,
    /// Upper bound on a single frame step, so a stalled host does not teleport markers.
    pub max_frame_delta_ms: u64,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            base_speed: 0.48,
            speed_step: 0.0,
            fast_multiplier: 3.0,
            normal_zone: ZoneConfig::default(),
            jitter_amplitude: 0.12,
            jitter_frequency: 0.35,
            max_frame_delta_ms: 100,
        }
    }
}

impl OrbitConfig {
    pub fn max_frame_delta(&self) -> Duration {
        Duration::from_millis(self.max_frame_delta_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpringConfig {
    pub mass: f64,
    pub tension: f64,
    pub friction: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            tension: 180.0,
            friction: 18.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub expand_duration_ms: u64,
    pub collapse_duration_ms: u64,
    pub anticipation_share: f64,
    pub expanding_share: f64,
    pub anticipation_target: f64,
    pub expanding_target: f64,
    /// `c` in the wind-up curve `c·x³ − (c−1)·x²`.
    pub anticipation_overshoot: f64,
    pub spring: SpringConfig,
    pub settle_oscillations: f64,
    pub settle_decay: f64,
    /// Share of the collapse spent on the smoothstep segment.
    pub collapse_split: f64,
    /// Fraction of the starting progress left when the bounce segment takes over.
    pub collapse_midpoint: f64,
    /// Share of the expansion after which the content surface is revealed.
    pub content_reveal: f64,
    pub fade_floor: f64,
    /// Progress delay added per ordinal before a receding band starts to fade.
    pub fade_stagger: f64,
    /// How far receding bands sink, as a fraction of their resting depth.
    pub depth_sink: f64,
    pub micro_amplitude: f64,
    pub micro_frequency: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            expand_duration_ms: 1200,
            collapse_duration_ms: 900,
            anticipation_share: 0.10,
            expanding_share: 0.65,
            anticipation_target: 0.05,
            expanding_target: 0.9,
            anticipation_overshoot: 1.7,
            spring: SpringConfig::default(),
            settle_oscillations: 2.0,
            settle_decay: 6.0,
            collapse_split: 0.6,
            collapse_midpoint: 0.35,
            content_reveal: 2.0 / 3.0,
            fade_floor: 0.04,
            fade_stagger: 0.06,
            depth_sink: 0.8,
            micro_amplitude: 0.015,
            micro_frequency: 1.3,
        }
    }
}

impl AnimationConfig {
    pub fn expand_duration(&self) -> Duration {
        Duration::from_millis(self.expand_duration_ms)
    }

    pub fn collapse_duration(&self) -> Duration {
        Duration::from_millis(self.collapse_duration_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub window_ms: u64,
    pub low_fps: f64,
    pub high_fps: f64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            window_ms: 1000,
            low_fps: 45.0,
            high_fps: 58.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Distance of the dial center from the left edge.
    pub center_offset: f64,
    /// Margin left around the fully expanded surface.
    pub margin: f64,
    /// Extra reach of the morphing wedge beyond the farthest viewport corner.
    pub overscan: f64,
    pub resize_debounce_ms: u64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            center_offset: 80.0,
            margin: 12.0,
            overscan: 1.05,
            resize_debounce_ms: 120,
        }
    }
}

impl ViewportConfig {
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("radius_step ({step}) must be at least the band thickness ({thickness})")]
    OverlappingBands { step: f64, thickness: f64 },
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must be a finite number no less than 0, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must lie in [0, 1], got {value}")]
    NotAFraction { field: &'static str, value: f64 },
    #[error("fast_multiplier must exceed 1, got {0}")]
    SlowFastZone(f64),
    #[error("jitter_amplitude must lie in [0, 1), got {0}")]
    Jitter(f64),
    #[error("phase shares must be positive and leave room for settling ({0} + {1} >= 1)")]
    PhaseShares(f64, f64),
    #[error("phase targets must satisfy 0 < anticipation < expanding < 1 ({0}, {1})")]
    PhaseTargets(f64, f64),
    #[error("{field} must lie in ({low}, {high}), got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        low: f64,
        high: f64,
    },
    #[error("low_fps ({low}) must be below high_fps ({high})")]
    Hysteresis { low: f64, high: f64 },
    #[error("palette must contain at least one colour")]
    EmptyPalette,
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::NotAFraction { field, value })
    }
}

fn within(field: &'static str, value: f64, low: f64, high: f64) -> Result<(), ConfigError> {
    if value > low && value < high {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            low,
            high,
        })
    }
}

impl DialConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let l = &self.layout;
        positive("min_radius", l.min_radius)?;
        positive("radius_step", l.radius_step)?;
        positive("thickness", l.thickness)?;
        if l.radius_step < l.thickness {
            return Err(ConfigError::OverlappingBands {
                step: l.radius_step,
                thickness: l.thickness,
            });
        }
        if l.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }

        positive("avg_char_width", self.label.avg_char_width)?;
        within("min_arc_fraction", self.label.min_arc_fraction, 0.0, 0.5)?;

        let o = &self.orbit;
        positive("base_speed", o.base_speed)?;
        if !(o.fast_multiplier > 1.0) {
            return Err(ConfigError::SlowFastZone(o.fast_multiplier));
        }
        if !(0.0..1.0).contains(&o.jitter_amplitude) {
            return Err(ConfigError::Jitter(o.jitter_amplitude));
        }

        let a = &self.animation;
        positive("expand_duration_ms", a.expand_duration_ms as f64)?;
        positive("collapse_duration_ms", a.collapse_duration_ms as f64)?;
        if !(a.anticipation_share > 0.0
            && a.expanding_share > 0.0
            && a.anticipation_share + a.expanding_share < 1.0)
        {
            return Err(ConfigError::PhaseShares(
                a.anticipation_share,
                a.expanding_share,
            ));
        }
        if !(0.0 < a.anticipation_target
            && a.anticipation_target < a.expanding_target
            && a.expanding_target < 1.0)
        {
            return Err(ConfigError::PhaseTargets(
                a.anticipation_target,
                a.expanding_target,
            ));
        }
        positive("spring.mass", a.spring.mass)?;
        positive("spring.tension", a.spring.tension)?;
        non_negative("spring.friction", a.spring.friction)?;
        non_negative("settle_oscillations", a.settle_oscillations)?;
        non_negative("settle_decay", a.settle_decay)?;
        within("collapse_split", a.collapse_split, 0.0, 1.0)?;
        within("collapse_midpoint", a.collapse_midpoint, 0.0, 1.0)?;
        fraction("content_reveal", a.content_reveal)?;
        within("fade_floor", a.fade_floor, 0.0, 1.0)?;
        non_negative("fade_stagger", a.fade_stagger)?;
        within("depth_sink", a.depth_sink, 0.0, 1.0)?;
        non_negative("micro_amplitude", a.micro_amplitude)?;
        non_negative("micro_frequency", a.micro_frequency)?;

        let p = &self.performance;
        positive("window_ms", p.window_ms as f64)?;
        if !(p.low_fps < p.high_fps) {
            return Err(ConfigError::Hysteresis {
                low: p.low_fps,
                high: p.high_fps,
            });
        }

        positive("overscan", self.viewport.overscan)?;
        Ok(())
    }
}
