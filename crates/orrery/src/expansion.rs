//! Expand/collapse state machine.
//!
//! The state is a plain value and every transition is a pure function
//! `(ExpansionState, Event) -> (ExpansionState, notices)`, so the machine runs without a live
//! frame loop. Progress is always derived from the accumulated elapsed time of the running
//! transition; a host that skips frames simply sees a larger step.

use crate::category::CategoryId;
use crate::config::AnimationConfig;
use crate::easing::{self, Spring, lerp};
use std::f64::consts::TAU;
use strum::Display as StrumDisplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, StrumDisplay)]
pub enum Phase {
    #[default]
    Idle,
    Anticipating,
    Expanding,
    Settling,
    Collapsing,
}

impl Phase {
    pub fn is_transition(&self) -> bool {
        !matches!(self, Phase::Idle)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Select(CategoryId),
    Close,
    /// Seconds since the previous frame.
    Advance(f64),
}

/// Outbound notifications for the data layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Selected(CategoryId),
    Closed,
    QualityChanged { adaptive: bool, fps: f64 },
}

/// Progress curves, resolved once from [`AnimationConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    expand: f64,
    collapse: f64,
    anticipation_share: f64,
    expanding_share: f64,
    anticipation_target: f64,
    expanding_target: f64,
    overshoot: f64,
    spring: Spring,
    settle_oscillations: f64,
    settle_decay: f64,
    collapse_split: f64,
    collapse_midpoint: f64,
    content_reveal: f64,
}

impl Timeline {
    pub fn new(cfg: &AnimationConfig) -> Self {
        Self {
            expand: cfg.expand_duration().as_secs_f64(),
            collapse: cfg.collapse_duration().as_secs_f64(),
            anticipation_share: cfg.anticipation_share,
            expanding_share: cfg.expanding_share,
            anticipation_target: cfg.anticipation_target,
            expanding_target: cfg.expanding_target,
            overshoot: cfg.anticipation_overshoot,
            spring: Spring::new(&cfg.spring),
            settle_oscillations: cfg.settle_oscillations,
            settle_decay: cfg.settle_decay,
            collapse_split: cfg.collapse_split,
            collapse_midpoint: cfg.collapse_midpoint,
            content_reveal: cfg.content_reveal,
        }
    }

    pub fn expand_duration(&self) -> f64 {
        self.expand
    }

    pub fn collapse_duration(&self) -> f64 {
        self.collapse
    }

    pub fn anticipation_target(&self) -> f64 {
        self.anticipation_target
    }

    pub fn expanding_target(&self) -> f64 {
        self.expanding_target
    }

    fn phase_bounds(&self) -> (f64, f64) {
        let a = self.anticipation_share * self.expand;
        (a, a + self.expanding_share * self.expand)
    }

    pub fn expand_phase(&self, elapsed: f64) -> Phase {
        let (anticipation_end, expanding_end) = self.phase_bounds();
        if elapsed >= self.expand {
            Phase::Idle
        } else if elapsed < anticipation_end {
            Phase::Anticipating
        } else if elapsed < expanding_end {
            Phase::Expanding
        } else {
            Phase::Settling
        }
    }

    /// Anticipation wind-up, then a spring towards `expanding_target`, then an elastic
    /// settle onto 1. Each segment starts where the previous one ends.
    pub fn expand_progress(&self, elapsed: f64) -> f64 {
        let (anticipation_end, expanding_end) = self.phase_bounds();
        let progress = match self.expand_phase(elapsed) {
            Phase::Anticipating => {
                let x = elapsed / anticipation_end;
                self.anticipation_target * easing::anticipate(x, self.overshoot)
            }
            Phase::Expanding => {
                let w = self
                    .spring
                    .settle_within(elapsed - anticipation_end, expanding_end - anticipation_end);
                lerp(self.anticipation_target, self.expanding_target, w)
            }
            Phase::Settling => {
                let x = (elapsed - expanding_end) / (self.expand - expanding_end);
                let w = easing::elastic_settle(x, self.settle_oscillations, self.settle_decay);
                lerp(self.expanding_target, 1.0, w)
            }
            _ => 1.0,
        };
        progress.clamp(0.0, 1.0)
    }

    /// Smoothstep down to `from * collapse_midpoint`, then a bounce onto exactly 0.
    pub fn collapse_progress(&self, from: f64, elapsed: f64) -> f64 {
        let x = (elapsed / self.collapse).clamp(0.0, 1.0);
        if x >= 1.0 {
            return 0.0;
        }
        let mid = from * self.collapse_midpoint;
        if x < self.collapse_split {
            lerp(from, mid, easing::smoothstep(x / self.collapse_split))
        } else {
            let local = (x - self.collapse_split) / (1.0 - self.collapse_split);
            mid * (1.0 - easing::bounce_out(local))
        }
    }

    pub fn content_visible(&self, elapsed: f64) -> bool {
        elapsed >= self.content_reveal * self.expand
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpansionState {
    expanded: Option<CategoryId>,
    /// Band queued to expand once the running collapse finishes.
    pending: Option<CategoryId>,
    phase: Phase,
    progress: f64,
    elapsed: f64,
    collapse_from: f64,
}

impl ExpansionState {
    pub fn expanded(&self) -> Option<&CategoryId> {
        self.expanded.as_ref()
    }

    pub fn pending(&self) -> Option<&CategoryId> {
        self.pending.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Seconds into the running transition.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Nothing expanded and nothing moving.
    pub fn is_at_rest(&self) -> bool {
        self.phase == Phase::Idle && self.expanded.is_none()
    }

    pub fn content_visible(&self, timeline: &Timeline) -> bool {
        match self.phase {
            Phase::Idle => self.expanded.is_some(),
            Phase::Collapsing => false,
            _ => timeline.content_visible(self.elapsed),
        }
    }

    fn begin_expand(self, id: CategoryId) -> Self {
        log::debug!("Expanding '{}'", id);
        Self {
            expanded: Some(id),
            pending: None,
            phase: Phase::Anticipating,
            progress: 0.0,
            elapsed: 0.0,
            collapse_from: 0.0,
        }
    }

    fn begin_collapse(self, pending: Option<CategoryId>) -> Self {
        log::debug!("Collapsing from progress {:.3}", self.progress);
        Self {
            pending,
            phase: Phase::Collapsing,
            elapsed: 0.0,
            collapse_from: self.progress,
            ..self
        }
    }

    /// Drops references to categories that no longer exist. Losing the expanded band resets
    /// to rest without a collapse.
    pub fn retain(self, exists: impl Fn(&CategoryId) -> bool) -> Self {
        if self.expanded.as_ref().is_some_and(|id| !exists(id)) {
            log::warn!("Expanded category disappeared, resetting dial");
            return Self::default();
        }
        if self.pending.as_ref().is_some_and(|id| !exists(id)) {
            return Self {
                pending: None,
                ..self
            };
        }
        self
    }

    pub fn apply(self, event: Event, timeline: &Timeline) -> (Self, Vec<Notice>) {
        match event {
            Event::Select(id) => self.select(id),
            Event::Close => self.close(),
            Event::Advance(dt) => (self.advance(dt, timeline), Vec::new()),
        }
    }

    fn select(self, id: CategoryId) -> (Self, Vec<Notice>) {
        match (self.phase, self.expanded.clone()) {
            (Phase::Idle, None) => (self.begin_expand(id.clone()), vec![Notice::Selected(id)]),
            (Phase::Collapsing, _) if self.pending.as_ref() == Some(&id) => (
                Self {
                    pending: None,
                    ..self
                },
                vec![Notice::Closed],
            ),
            (Phase::Collapsing, _) => (
                Self {
                    pending: Some(id.clone()),
                    ..self
                },
                vec![Notice::Selected(id)],
            ),
            (_, Some(current)) if current == id => (self.begin_collapse(None), vec![Notice::Closed]),
            (_, _) => (
                self.begin_collapse(Some(id.clone())),
                vec![Notice::Selected(id)],
            ),
        }
    }

    fn close(self) -> (Self, Vec<Notice>) {
        match self.phase {
            Phase::Idle if self.expanded.is_none() => (self, Vec::new()),
            Phase::Collapsing if self.pending.is_some() => (
                Self {
                    pending: None,
                    ..self
                },
                vec![Notice::Closed],
            ),
            Phase::Collapsing => (self, Vec::new()),
            _ => (self.begin_collapse(None), vec![Notice::Closed]),
        }
    }

    fn advance(self, dt: f64, timeline: &Timeline) -> Self {
        if self.phase == Phase::Idle || dt <= 0.0 {
            return self;
        }
        let elapsed = self.elapsed + dt;

        if self.phase == Phase::Collapsing {
            if elapsed < timeline.collapse_duration() {
                return Self {
                    elapsed,
                    progress: timeline.collapse_progress(self.collapse_from, elapsed),
                    ..self
                };
            }
            return match self.pending {
                Some(next) => Self::default().begin_expand(next),
                None => {
                    log::debug!("Collapse finished");
                    Self::default()
                }
            };
        }

        let phase = timeline.expand_phase(elapsed);
        if phase != self.phase {
            log::debug!("Expansion phase {} -> {}", self.phase, phase);
        }
        Self {
            phase,
            elapsed,
            progress: timeline.expand_progress(elapsed),
            ..self
        }
    }
}

/// Stacking depth per band. At rest inner bands sit highest (`count - index`). While a band
/// expands it rises to `count + 1` and every other band sinks proportionally towards
/// `(1 - sink)` of its resting depth, keeping their relative order.
pub fn band_depths(count: usize, focus: Option<usize>, progress: f64, sink: f64) -> Vec<f64> {
    let top = (count + 1) as f64;
    (0..count)
        .map(|i| {
            let rest = (count - i) as f64;
            match focus {
                None => rest,
                Some(f) if f == i => lerp(rest, top, progress),
                Some(_) => rest * (1.0 - sink * progress),
            }
        })
        .collect()
}

/// Opacity per band. Receding bands fade towards `floor` one after another: band `i`
/// starts `i * stagger` later in progress and all of them reach the floor at progress 1.
pub fn band_opacities(
    count: usize,
    focus: Option<usize>,
    progress: f64,
    floor: f64,
    stagger: f64,
) -> Vec<f64> {
    let Some(focus) = focus else {
        return vec![1.0; count];
    };
    let stagger = if count > 1 {
        stagger.min(0.8 / (count - 1) as f64)
    } else {
        0.0
    };
    let span = 1.0 - stagger * count.saturating_sub(1) as f64;

    (0..count)
        .map(|i| {
            if i == focus {
                return 1.0;
            }
            let local = ((progress - stagger * i as f64) / span).clamp(0.0, 1.0);
            lerp(1.0, floor, local)
        })
        .collect()
}

/// Small organic wobble per band, a pure function of the clock.
pub fn micro_variation(count: usize, clock: f64, amplitude: f64, frequency: f64) -> Vec<f64> {
    (0..count)
        .map(|i| amplitude * (clock * frequency * TAU + i as f64 * 0.7).sin())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn timeline() -> Timeline {
        Timeline::new(&AnimationConfig::default())
    }

    fn id(s: &str) -> CategoryId {
        CategoryId::from(s)
    }

    fn step(state: ExpansionState, event: Event) -> (ExpansionState, Vec<Notice>) {
        state.apply(event, &timeline())
    }

    fn run_for(mut state: ExpansionState, seconds: f64) -> ExpansionState {
        let t = timeline();
        let frames = (seconds * 240.0).ceil() as usize;
        for _ in 0..frames {
            state = state.apply(Event::Advance(1.0 / 240.0), &t).0;
        }
        state
    }

    #[test]
    fn expand_curve_is_continuous_at_every_boundary() {
        let t = timeline();
        let mut prev = t.expand_progress(0.0);
        assert_eq!(prev, 0.0);
        let steps = 120_000;
        for i in 1..=steps {
            let e = t.expand_duration() * 1.01 * i as f64 / steps as f64;
            let p = t.expand_progress(e);
            assert!((p - prev).abs() < 2e-3, "jump at {e}: {prev} -> {p}");
            prev = p;
        }
        assert_eq!(prev, 1.0);
    }

    #[test]
    fn expand_curve_hits_phase_targets() {
        let t = timeline();
        let (a, e) = t.phase_bounds();
        assert_abs_diff_eq!(t.expand_progress(a), 0.05, epsilon = 1e-9);
        assert_abs_diff_eq!(t.expand_progress(e), 0.9, epsilon = 1e-9);
        assert_abs_diff_eq!(t.expand_progress(a - 1e-9), 0.05, epsilon = 1e-6);
        assert_abs_diff_eq!(t.expand_progress(e - 1e-9), 0.9, epsilon = 1e-6);
    }

    #[test]
    fn expand_phases_follow_shares() {
        let t = timeline();
        assert_eq!(t.expand_phase(0.0), Phase::Anticipating);
        assert_eq!(t.expand_phase(0.119), Phase::Anticipating);
        assert_eq!(t.expand_phase(0.121), Phase::Expanding);
        assert_eq!(t.expand_phase(0.899), Phase::Expanding);
        assert_eq!(t.expand_phase(0.901), Phase::Settling);
        assert_eq!(t.expand_phase(1.2), Phase::Idle);
    }

    #[test]
    fn collapse_curve_reaches_zero_without_jumps() {
        let t = timeline();
        for from in [1.0, 0.4, 0.05] {
            assert_abs_diff_eq!(t.collapse_progress(from, 0.0), from, epsilon = 1e-12);
            let mut prev = from;
            for i in 1..=9000 {
                let p = t.collapse_progress(from, t.collapse_duration() * i as f64 / 9000.0);
                assert!((p - prev).abs() < 2e-3 * from.max(0.1));
                assert!(p >= 0.0 && p <= from);
                prev = p;
            }
            assert_eq!(prev, 0.0);
        }
    }

    #[test]
    fn select_from_idle_starts_anticipation() {
        let (s, notices) = step(ExpansionState::default(), Event::Select(id("a")));
        assert_eq!(s.phase(), Phase::Anticipating);
        assert_eq!(s.expanded(), Some(&id("a")));
        assert_eq!(s.progress(), 0.0);
        assert_eq!(notices, vec![Notice::Selected(id("a"))]);
    }

    #[test]
    fn full_expansion_rests_at_one() {
        let (s, _) = step(ExpansionState::default(), Event::Select(id("a")));
        let s = run_for(s, 1.5);
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.progress(), 1.0);
        assert_eq!(s.expanded(), Some(&id("a")));
        assert!(!s.is_at_rest());
        assert!(s.content_visible(&timeline()));
        let s = run_for(s, 5.0);
        assert_eq!(s.progress(), 1.0);
    }

    #[test]
    fn reselecting_expanded_band_toggles_closed() {
        let (s, _) = step(ExpansionState::default(), Event::Select(id("a")));
        let s = run_for(s, 1.5);
        let (s, notices) = step(s, Event::Select(id("a")));
        assert_eq!(notices, vec![Notice::Closed]);
        assert_eq!(s.phase(), Phase::Collapsing);
        let s = run_for(s, 1.0);
        assert!(s.is_at_rest());
        assert_eq!(s.progress(), 0.0);
    }

    #[test]
    fn close_mid_expansion_reverses_from_current_progress() {
        let (mut s, _) = step(ExpansionState::default(), Event::Select(id("a")));
        let t = timeline();
        while s.progress() < 0.4 {
            s = s.apply(Event::Advance(0.004), &t).0;
        }
        assert_eq!(s.phase(), Phase::Expanding);
        let before = s.progress();

        let (s, notices) = s.apply(Event::Close, &t);
        assert_eq!(notices, vec![Notice::Closed]);
        assert_eq!(s.phase(), Phase::Collapsing);
        assert_eq!(s.progress(), before);

        let (s, _) = s.apply(Event::Advance(0.001), &t);
        assert!((s.progress() - before).abs() < 1e-3);
    }

    #[test]
    fn selecting_other_band_collapses_then_expands() {
        let t = timeline();
        let (s, _) = step(ExpansionState::default(), Event::Select(id("a")));
        let s = run_for(s, 1.5);
        let (s, notices) = s.apply(Event::Select(id("b")), &t);
        assert_eq!(notices, vec![Notice::Selected(id("b"))]);
        assert_eq!(s.phase(), Phase::Collapsing);
        assert_eq!(s.expanded(), Some(&id("a")));
        assert_eq!(s.pending(), Some(&id("b")));

        let s = s.apply(Event::Advance(t.collapse_duration()), &t).0;
        assert_eq!(s.phase(), Phase::Anticipating);
        assert_eq!(s.expanded(), Some(&id("b")));
        assert_eq!(s.progress(), 0.0);
    }

    #[test]
    fn close_during_collapse_cancels_queued_expansion() {
        let t = timeline();
        let (s, _) = step(ExpansionState::default(), Event::Select(id("a")));
        let (s, _) = s.apply(Event::Select(id("b")), &t);
        let (s, notices) = s.apply(Event::Close, &t);
        assert_eq!(notices, vec![Notice::Closed]);
        assert_eq!(s.pending(), None);
        let (s, notices) = s.apply(Event::Close, &t);
        assert!(notices.is_empty());
        let s = s.apply(Event::Advance(t.collapse_duration()), &t).0;
        assert!(s.is_at_rest());
    }

    #[test]
    fn close_when_nothing_expanded_is_silent() {
        let (s, notices) = step(ExpansionState::default(), Event::Close);
        assert!(notices.is_empty());
        assert!(s.is_at_rest());
    }

    #[test]
    fn retain_resets_when_expanded_band_vanishes() {
        let t = timeline();
        let (s, _) = step(ExpansionState::default(), Event::Select(id("a")));
        let (s, _) = s.apply(Event::Select(id("b")), &t);

        let kept = s.clone().retain(|c| c.as_str() == "a");
        assert_eq!(kept.pending(), None);
        assert_eq!(kept.phase(), Phase::Collapsing);

        assert!(s.retain(|c| c.as_str() == "b").is_at_rest());
    }

    #[test]
    fn idle_ignores_time() {
        let s = run_for(ExpansionState::default(), 1.0);
        assert_eq!(s, ExpansionState::default());
    }

    #[test]
    fn depths_raise_focus_and_sink_the_rest() {
        assert_eq!(band_depths(3, None, 0.7, 0.8), vec![3.0, 2.0, 1.0]);
        let d = band_depths(3, Some(1), 1.0, 0.8);
        assert_abs_diff_eq!(d[1], 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d[0], 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(d[2], 0.2, epsilon = 1e-12);
        assert!(d[0] > d[2]);
    }

    #[test]
    fn opacities_fade_in_sequence_to_floor() {
        let o = band_opacities(9, Some(4), 0.2, 0.04, 0.06);
        assert_eq!(o[4], 1.0);
        for pair in o[..4].windows(2) {
            assert!(pair[0] < pair[1]);
        }
        let end = band_opacities(9, Some(4), 1.0, 0.04, 0.06);
        for (i, v) in end.iter().enumerate() {
            if i != 4 {
                assert_abs_diff_eq!(*v, 0.04, epsilon = 1e-12);
            }
        }
        assert!(band_opacities(9, Some(0), 0.0, 0.04, 0.06)
            .iter()
            .all(|v| *v == 1.0));
        assert_eq!(band_opacities(2, None, 0.5, 0.04, 0.06), vec![1.0, 1.0]);
    }

    #[test]
    fn heavy_stagger_still_reaches_floor() {
        let end = band_opacities(20, Some(0), 1.0, 0.04, 0.5);
        assert_abs_diff_eq!(end[19], 0.04, epsilon = 1e-12);
    }

    #[test]
    fn micro_variation_is_bounded() {
        for v in micro_variation(9, 12.34, 0.015, 1.3) {
            assert!(v.abs() <= 0.015);
        }
    }
}
