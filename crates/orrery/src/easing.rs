//! Easing curves for the expand and collapse animations.
//!
//! Every curve maps a normalised input in `[0, 1]` onto an output that starts at 0 and ends
//! at 1. Inputs outside that range are clamped.

use crate::config::SpringConfig;
use std::f64::consts::PI;

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub fn smoothstep(x: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}

/// Wind-up curve `c·x³ − (c−1)·x²`. Dips below zero before committing when `c > 1`.
pub fn anticipate(x: f64, c: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);
    c * x * x * x - (c - 1.0) * x * x
}

pub fn bounce_out(x: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;

    let x = x.clamp(0.0, 1.0);
    if x < 1.0 / D1 {
        N1 * x * x
    } else if x < 2.0 / D1 {
        let x = x - 1.5 / D1;
        N1 * x * x + 0.75
    } else if x < 2.5 / D1 {
        let x = x - 2.25 / D1;
        N1 * x * x + 0.9375
    } else {
        let x = x - 2.625 / D1;
        N1 * x * x + 0.984375
    }
}

/// Exponentially decaying bounce that never leaves `[0, 1]` and lands exactly on 1.
pub fn elastic_settle(x: f64, oscillations: f64, decay: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);
    let envelope = if decay > 0.0 {
        ((-decay * x).exp() - (-decay).exp()) / (1.0 - (-decay).exp())
    } else {
        1.0 - x
    };
    1.0 - envelope * (PI * oscillations * x).cos().abs()
}

/// Closed-form damped harmonic oscillator released from rest at 0 towards 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    omega: f64,
    zeta: f64,
}

impl Spring {
    pub fn new(cfg: &SpringConfig) -> Self {
        let omega = (cfg.tension / cfg.mass).sqrt();
        let zeta = cfg.friction / (2.0 * (cfg.tension * cfg.mass).sqrt());
        Self { omega, zeta }
    }

    pub fn damping_ratio(&self) -> f64 {
        self.zeta
    }

    /// Position after `t` seconds.
    pub fn position(&self, t: f64) -> f64 {
        let (w, z) = (self.omega, self.zeta);
        if t <= 0.0 {
            return 0.0;
        }

        if (z - 1.0).abs() < 1e-6 {
            1.0 - (-w * t).exp() * (1.0 + w * t)
        } else if z < 1.0 {
            let wd = w * (1.0 - z * z).sqrt();
            let decay = (-z * w * t).exp();
            1.0 - decay * ((wd * t).cos() + (z * w / wd) * (wd * t).sin())
        } else {
            let root = (z * z - 1.0).sqrt();
            let r1 = -w * (z - root);
            let r2 = -w * (z + root);
            1.0 + (r2 * (r1 * t).exp() - r1 * (r2 * t).exp()) / (r1 - r2)
        }
    }

    /// Spring curve over a phase lasting `span` seconds, nudged by a linear correction so it
    /// lands exactly on 1 at the end of the phase whatever the damping.
    pub fn settle_within(&self, t: f64, span: f64) -> f64 {
        if span <= 0.0 {
            return 1.0;
        }
        let t = t.clamp(0.0, span);
        let residual = 1.0 - self.position(span);
        self.position(t) + residual * (t / span)
    }
}
