use crate::category::{Category, CategoryId, arrange};
use crate::config::{ConfigError, DialConfig};
use crate::expansion::{
    Event, ExpansionState, Phase, Timeline, band_depths, band_opacities, micro_variation,
};
use crate::hit::hit_test;
use crate::layout::{Band, BandColor, layout};
use crate::orbit::{OrbitSimulator, normalize_angle};
use crate::path::{
    MorphShape, MorphStyle, Path, SegmentedPath, half_ring_path, morph_path, segmented_path,
};
use crate::perf::PerformanceMonitor;
use crate::space::{Point, Viewport};
use std::collections::VecDeque;
use std::time::Duration;

pub use crate::expansion::Notice;

/// Pointer input from the host, in rendered coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Moved(Point),
    Released(Point),
    Left,
}

/// Everything a renderer needs to draw one band.
#[derive(Debug, Clone, PartialEq)]
pub struct BandFrame {
    pub index: usize,
    pub category_id: CategoryId,
    pub label: String,
    pub subtitle: String,
    /// Body text of the expanded surface, when the catalog has one.
    pub description: Option<String>,
    pub radius: f64,
    pub thickness: f64,
    pub z_order: usize,
    pub color: BandColor,
    pub depth: f64,
    pub opacity: f64,
    pub micro_variation: f64,
    pub marker: Point,
    /// Marker angle in `[0, 2π)`, clockwise from the top pole.
    pub marker_angle: f64,
    pub marker_visible: bool,
    pub half_ring: Path,
    pub segments: SegmentedPath,
    /// Boundary of the expanding band; only set on the focused band.
    pub morph: Option<MorphShape>,
    pub hovered: bool,
    pub expanded: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialFrame {
    pub center: Point,
    pub viewport: Viewport,
    pub phase: Phase,
    pub progress: f64,
    pub expanded: Option<CategoryId>,
    pub content_visible: bool,
    /// Opacity of markers and labels as the dial gives way to content.
    pub orbit_fade: f64,
    pub orbit_scale: f64,
    pub sun_fade: f64,
    pub adaptive_quality: bool,
    /// No category list has been supplied yet.
    pub loading: bool,
    pub hovered: Option<usize>,
    pub bands: Vec<BandFrame>,
}

/// Owns every piece of dial state and advances it one host frame at a time.
///
/// Pointer events are queued and resolved at the start of the next [`tick`](Self::tick), so
/// each frame works from one consistent snapshot. Programmatic [`select`](Self::select) and
/// [`close`](Self::close) apply immediately.
#[derive(Debug)]
pub struct DialEngine {
    config: DialConfig,
    timeline: Timeline,
    categories: Vec<Category>,
    bands: Vec<Band>,
    orbit: OrbitSimulator,
    expansion: ExpansionState,
    perf: PerformanceMonitor,
    viewport: Viewport,
    /// Latest requested viewport and the seconds left before it applies.
    pending_viewport: Option<(Viewport, f64)>,
    pointer_queue: VecDeque<PointerEvent>,
    hovered: Option<usize>,
    last_selected: Option<CategoryId>,
    notices: Vec<Notice>,
    clock: f64,
    loaded: bool,
    frame: DialFrame,
}

impl DialEngine {
    pub fn new(config: DialConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut engine = Self {
            timeline: Timeline::new(&config.animation),
            orbit: OrbitSimulator::new(&config.orbit, 0),
            perf: PerformanceMonitor::new(&config.performance),
            config,
            categories: Vec::new(),
            bands: Vec::new(),
            expansion: ExpansionState::default(),
            viewport: Viewport::default(),
            pending_viewport: None,
            pointer_queue: VecDeque::new(),
            hovered: None,
            last_selected: None,
            notices: Vec::new(),
            clock: 0.0,
            loaded: false,
            frame: DialFrame::default(),
        };
        engine.refresh();
        Ok(engine)
    }

    pub fn config(&self) -> &DialConfig {
        &self.config
    }

    /// Swaps tunables in place. Marker angles, the expansion state and the category list
    /// survive; an invalid config is rejected and the old one kept.
    pub fn set_config(&mut self, config: DialConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.timeline = Timeline::new(&config.animation);
        self.orbit.reconfigure(&config.orbit);
        self.perf.reconfigure(&config.performance);
        self.bands = layout(&self.categories, &config.layout);
        self.config = config;
        log::info!("Dial configuration updated");
        self.refresh();
        Ok(())
    }

    /// Replaces the category list wholesale. Bands and markers are rebuilt.
    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.categories = arrange(categories);
        self.bands = layout(&self.categories, &self.config.layout);
        self.orbit = OrbitSimulator::new(&self.config.orbit, self.bands.len());
        self.hovered = None;
        self.loaded = true;

        let bands = &self.bands;
        let exists = |id: &CategoryId| bands.iter().any(|b| b.category_id == *id);
        if self.last_selected.as_ref().is_some_and(|id| !exists(id)) {
            self.last_selected = None;
        }
        self.expansion = std::mem::take(&mut self.expansion).retain(exists);

        log::debug!("Dial now shows {} bands", self.bands.len());
        self.refresh();
    }

    /// Requests a new drawing region. Applied after the debounce interval in
    /// [`tick`](Self::tick), or immediately while no region is known yet.
    pub fn resize(&mut self, viewport: Viewport) {
        if self.viewport.is_empty() {
            self.resize_now(viewport);
            return;
        }
        let delay = self.config.viewport.resize_debounce().as_secs_f64();
        self.pending_viewport = Some((viewport, delay));
    }

    pub fn resize_now(&mut self, viewport: Viewport) {
        self.pending_viewport = None;
        if viewport != self.viewport {
            log::debug!("Viewport now {}x{}", viewport.width, viewport.height);
            self.viewport = viewport;
            self.refresh();
        }
    }

    pub fn push_pointer(&mut self, event: PointerEvent) {
        self.pointer_queue.push_back(event);
    }

    /// Selects a category by id, or toggles it closed when it is already expanded.
    pub fn select(&mut self, id: &CategoryId) {
        if !self.bands.iter().any(|b| b.category_id == *id) {
            log::warn!("Ignoring selection of unknown category '{}'", id);
            return;
        }
        self.apply(Event::Select(id.clone()));
    }

    pub fn close(&mut self) {
        self.apply(Event::Close);
    }

    /// Band under `pointer`, as far as interaction is concerned. Nothing resolves during a
    /// transition; while a band rests expanded every point resolves to it.
    pub fn hit(&self, pointer: Point) -> Option<usize> {
        if self.expansion.phase().is_transition() {
            return None;
        }
        if let Some(id) = self.expansion.expanded() {
            return self.index_of(id);
        }
        let scale = self.viewport.effective_scale();
        let center = self.center();
        let rendered = Point::new(center.x * scale, center.y * scale);
        hit_test(pointer, rendered, scale, &self.bands)
    }

    /// Advances the dial by one host frame.
    pub fn tick(&mut self, dt: Duration) {
        let dt = dt.as_secs_f64();

        if let Some(adaptive) = self.perf.record_frame(dt) {
            let fps = self.perf.fps().unwrap_or_default();
            log::info!("Frame rate {:.1} fps, adaptive quality {}", fps, adaptive);
            self.notices.push(Notice::QualityChanged { adaptive, fps });
        }

        if let Some((viewport, remaining)) = self.pending_viewport.take() {
            if remaining - dt <= 0.0 {
                self.resize_now(viewport);
            } else {
                self.pending_viewport = Some((viewport, remaining - dt));
            }
        }

        while let Some(event) = self.pointer_queue.pop_front() {
            self.handle_pointer(event);
        }

        self.apply(Event::Advance(dt));

        let orbit_dt = dt.min(self.config.orbit.max_frame_delta().as_secs_f64());
        self.orbit.advance(
            orbit_dt,
            !self.expansion.is_at_rest(),
            self.perf.adaptive_quality(),
        );
        self.clock += dt;
        self.refresh();
    }

    pub fn frame(&self) -> &DialFrame {
        &self.frame
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn orbit(&self) -> &OrbitSimulator {
        &self.orbit
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn center(&self) -> Point {
        self.viewport.dial_center(self.config.viewport.center_offset)
    }

    fn index_of(&self, id: &CategoryId) -> Option<usize> {
        self.bands.iter().position(|b| b.category_id == *id)
    }

    fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Moved(p) => self.hovered = self.hit(p),
            PointerEvent::Left => self.hovered = None,
            PointerEvent::Released(p) => {
                if let Some(index) = self.hit(p) {
                    let id = self.bands[index].category_id.clone();
                    self.apply(Event::Select(id));
                }
            }
        }
    }

    fn apply(&mut self, event: Event) {
        let state = std::mem::take(&mut self.expansion);
        let (state, notices) = state.apply(event, &self.timeline);
        self.expansion = state;

        if self.expansion.phase().is_transition() {
            self.hovered = None;
        }
        for notice in &notices {
            if let Notice::Selected(id) = notice {
                log::debug!("Selected '{}'", id);
                self.last_selected = Some(id.clone());
            }
        }
        let changed = !notices.is_empty();
        self.notices.extend(notices);
        if changed {
            self.refresh();
        }
    }

    fn refresh(&mut self) {
        let anim = &self.config.animation;
        let center = self.center();
        let progress = self.expansion.progress();
        let adaptive = self.perf.adaptive_quality();
        let count = self.bands.len();
        let focus = self.expansion.expanded().and_then(|id| self.index_of(id));

        let depths = band_depths(count, focus, progress, anim.depth_sink);
        let opacities = band_opacities(count, focus, progress, anim.fade_floor, anim.fade_stagger);
        let micro = if adaptive {
            vec![0.0; count]
        } else {
            micro_variation(count, self.clock, anim.micro_amplitude, anim.micro_frequency)
        };
        let style = if adaptive {
            MorphStyle::Linear
        } else {
            MorphStyle::Phased {
                anticipation: self.timeline.anticipation_target(),
                expansion: self.timeline.expanding_target(),
            }
        };

        let bands = self
            .bands
            .iter()
            .zip(&self.categories)
            .zip(self.orbit.markers())
            .map(|((band, category), marker)| {
                let i = band.index;
                let label = category.label();
                let morph = (focus == Some(i) && !self.viewport.is_empty()).then(|| {
                    morph_path(
                        center,
                        band.radius,
                        progress,
                        self.viewport.bounds(),
                        self.config.viewport.margin,
                        self.config.viewport.overscan,
                        style,
                    )
                });
                BandFrame {
                    index: i,
                    category_id: band.category_id.clone(),
                    subtitle: category.subtitle(),
                    description: category
                        .description
                        .as_deref()
                        .map(str::trim)
                        .filter(|d| !d.is_empty())
                        .map(str::to_string),
                    radius: band.radius,
                    thickness: band.thickness,
                    z_order: band.z_order,
                    color: band.color,
                    depth: depths[i],
                    opacity: opacities[i],
                    micro_variation: micro[i],
                    marker: marker.position(center, band.radius),
                    marker_angle: normalize_angle(marker.angle),
                    marker_visible: marker.on_visible_half(),
                    half_ring: half_ring_path(center, band.radius),
                    segments: segmented_path(center, band.radius, &label, &self.config.label),
                    morph,
                    hovered: self.hovered == Some(i),
                    expanded: focus == Some(i),
                    selected: self.last_selected.as_ref() == Some(&band.category_id),
                    label,
                }
            })
            .collect();

        self.frame = DialFrame {
            center,
            viewport: self.viewport,
            phase: self.expansion.phase(),
            progress,
            expanded: self.expansion.expanded().cloned(),
            content_visible: self.expansion.content_visible(&self.timeline),
            orbit_fade: (1.0 - 1.5 * progress).clamp(0.0, 1.0),
            orbit_scale: (1.0 - 0.2 * progress).max(0.8),
            sun_fade: (1.0 - 2.0 * progress).clamp(0.0, 1.0),
            adaptive_quality: adaptive,
            loading: !self.loaded,
            hovered: self.hovered,
            bands,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const FRAME: Duration = Duration::from_micros(16_667);

    fn engine() -> DialEngine {
        let mut engine = DialEngine::new(DialConfig::default()).unwrap();
        engine.resize(Viewport::new(1200.0, 800.0));
        engine.set_categories(
            (0..9)
                .map(|i| Category::new(format!("age-{i}"), i, format!("Age {i}")))
                .collect(),
        );
        engine
    }

    fn at(engine: &DialEngine, distance: f64) -> Point {
        let c = engine.frame().center;
        Point::new(c.x + distance, c.y)
    }

    #[test]
    fn test_loading_until_categories_arrive() {
        let engine = DialEngine::new(DialConfig::default()).unwrap();
        assert!(engine.frame().loading);
        assert!(engine.frame().bands.is_empty());
        assert!(!self::engine().frame().loading);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut cfg = DialConfig::default();
        cfg.layout.radius_step = 10.0;
        assert!(DialEngine::new(cfg.clone()).is_err());

        let mut engine = engine();
        assert!(engine.set_config(cfg).is_err());
        assert_eq!(engine.config().layout.radius_step, 44.0);
    }

    #[test]
    fn test_pointer_is_applied_on_next_tick() {
        let mut engine = engine();
        let p = at(&engine, 160.0);
        engine.push_pointer(PointerEvent::Released(p));
        assert!(engine.drain_notices().is_empty());
        assert_eq!(engine.frame().phase, Phase::Idle);

        engine.tick(FRAME);
        assert_eq!(
            engine.drain_notices(),
            vec![Notice::Selected(CategoryId::from("age-2"))]
        );
        assert_eq!(engine.frame().phase, Phase::Anticipating);
        assert!(engine.frame().bands[2].expanded);
        assert!(engine.frame().bands[2].morph.is_some());
        assert!(engine.frame().bands[1].morph.is_none());
    }

    #[test]
    fn test_hover_tracks_pointer_and_clears_on_leave() {
        let mut engine = engine();
        let p = at(&engine, 116.0);
        engine.push_pointer(PointerEvent::Moved(p));
        engine.tick(FRAME);
        assert_eq!(engine.frame().hovered, Some(1));
        assert!(engine.frame().bands[1].hovered);

        engine.push_pointer(PointerEvent::Left);
        engine.tick(FRAME);
        assert_eq!(engine.frame().hovered, None);
    }

    #[test]
    fn test_pointer_ignored_during_transition() {
        let mut engine = engine();
        engine.select(&CategoryId::from("age-0"));
        engine.drain_notices();
        engine.push_pointer(PointerEvent::Released(at(&engine, 160.0)));
        engine.push_pointer(PointerEvent::Moved(at(&engine, 160.0)));
        engine.tick(FRAME);
        assert!(engine.drain_notices().is_empty());
        assert_eq!(engine.frame().hovered, None);
        assert_eq!(engine.frame().expanded, Some(CategoryId::from("age-0")));
    }

    #[test]
    fn test_background_click_closes_expanded_band() {
        let mut engine = engine();
        engine.select(&CategoryId::from("age-3"));
        for _ in 0..90 {
            engine.tick(FRAME);
        }
        assert_eq!(engine.frame().phase, Phase::Idle);
        engine.drain_notices();

        engine.push_pointer(PointerEvent::Released(Point::new(1100.0, 40.0)));
        engine.tick(FRAME);
        assert_eq!(engine.drain_notices(), vec![Notice::Closed]);
        assert_eq!(engine.frame().phase, Phase::Collapsing);
    }

    #[test]
    fn test_unknown_id_is_ignored() {
        let mut engine = engine();
        engine.select(&CategoryId::from("nope"));
        assert!(engine.drain_notices().is_empty());
        assert!(engine.expansion().is_at_rest());
    }

    #[test]
    fn test_markers_freeze_while_expanded() {
        let mut engine = engine();
        engine.tick(FRAME);
        let before = engine.frame().bands[0].marker_angle;
        engine.tick(FRAME);
        assert!(engine.frame().bands[0].marker_angle != before);

        engine.select(&CategoryId::from("age-4"));
        let frozen: Vec<f64> = engine.orbit().markers().iter().map(|m| m.angle).collect();
        for _ in 0..120 {
            engine.tick(FRAME);
        }
        let after: Vec<f64> = engine.orbit().markers().iter().map(|m| m.angle).collect();
        assert_eq!(frozen, after);
    }

    #[test]
    fn test_resize_is_debounced() {
        let mut engine = engine();
        assert_eq!(engine.frame().viewport, Viewport::new(1200.0, 800.0));

        engine.resize(Viewport::new(900.0, 600.0));
        engine.resize(Viewport::new(1000.0, 700.0));
        engine.tick(Duration::from_millis(50));
        assert_eq!(engine.frame().viewport.width, 1200.0);

        engine.tick(Duration::from_millis(100));
        assert_eq!(engine.frame().viewport, Viewport::new(1000.0, 700.0));
        assert_abs_diff_eq!(engine.frame().center.y, 350.0);
    }

    #[test]
    fn test_replacing_categories_drops_vanished_expansion() {
        let mut engine = engine();
        engine.select(&CategoryId::from("age-8"));
        engine.set_categories(
            (0..3)
                .map(|i| Category::new(format!("age-{i}"), i, ""))
                .collect(),
        );
        assert!(engine.expansion().is_at_rest());
        assert_eq!(engine.frame().bands.len(), 3);
        assert_eq!(engine.frame().bands[1].label, "Age 1");
        assert!(engine.frame().bands.iter().all(|b| !b.selected));
    }

    #[test]
    fn test_empty_catalog_renders_nothing() {
        let mut engine = engine();
        engine.set_categories(Vec::new());
        assert!(engine.frame().bands.is_empty());
        assert!(!engine.frame().loading);
        engine.push_pointer(PointerEvent::Released(at(&engine, 72.0)));
        engine.tick(FRAME);
        assert!(engine.drain_notices().is_empty());
    }

    #[test]
    fn test_expanded_band_carries_description() {
        let mut engine = engine();
        let mut ages: Vec<Category> = (0..3)
            .map(|i| Category::new(format!("age-{i}"), i, format!("Age {i}")))
            .collect();
        ages[1].description = Some("  The emergence of conscious beings.\n".into());
        ages[2].description = Some("   ".into());
        engine.set_categories(ages);
        engine.select(&CategoryId::from("age-1"));
        for _ in 0..90 {
            engine.tick(FRAME);
        }

        let frame = engine.frame();
        assert!(frame.content_visible);
        let band = &frame.bands[1];
        assert!(band.expanded);
        assert_eq!(
            band.description.as_deref(),
            Some("The emergence of conscious beings.")
        );
        assert_eq!(frame.bands[0].description, None);
        assert_eq!(frame.bands[2].description, None);
    }

    #[test]
    fn test_fades_follow_progress() {
        let mut engine = engine();
        engine.select(&CategoryId::from("age-1"));
        for _ in 0..90 {
            engine.tick(FRAME);
        }
        let frame = engine.frame();
        assert_eq!(frame.progress, 1.0);
        assert_eq!(frame.orbit_fade, 0.0);
        assert_eq!(frame.sun_fade, 0.0);
        assert_abs_diff_eq!(frame.orbit_scale, 0.8);
        assert!(frame.content_visible);
        assert!(frame.bands[1].selected);
        assert_eq!(frame.bands[1].opacity, 1.0);
        assert_abs_diff_eq!(frame.bands[5].opacity, 0.04, epsilon = 1e-9);
        assert!(frame.bands[1].depth > frame.bands[0].depth);
    }

    #[test]
    fn test_slow_frames_switch_to_adaptive_quality() {
        let mut engine = engine();
        for _ in 0..40 {
            engine.tick(Duration::from_millis(33));
        }
        let notices = engine.drain_notices();
        assert!(
            notices
                .iter()
                .any(|n| matches!(n, Notice::QualityChanged { adaptive: true, .. }))
        );
        assert!(engine.frame().adaptive_quality);
        assert!(engine.frame().bands.iter().all(|b| b.micro_variation == 0.0));
    }
}
