use approx::assert_abs_diff_eq;
use orrery::{
    Category, CategoryId, DialConfig, DialEngine, Notice, Phase, Point, PointerEvent, Viewport,
};
use std::time::Duration;

const FRAME: Duration = Duration::from_micros(16_667);

fn ages() -> Vec<Category> {
    [
        "Primordial",
        "Stellar",
        "Galactic",
        "Planetary",
        "Living",
        "Conscious",
        "Civilised",
        "Digital",
        "Transcendent",
    ]
    .iter()
    .enumerate()
    .map(|(i, name)| Category::new(format!("age-{i}"), i as i64, *name))
    .collect()
}

fn engine() -> DialEngine {
    let mut engine = DialEngine::new(DialConfig::default()).unwrap();
    engine.resize_now(Viewport::new(1280.0, 800.0));
    engine.set_categories(ages());
    engine
}

fn click(engine: &mut DialEngine, distance: f64) -> Vec<Notice> {
    let c = engine.frame().center;
    engine.push_pointer(PointerEvent::Released(Point::new(c.x + distance, c.y)));
    engine.tick(FRAME);
    engine.drain_notices()
}

fn selected(i: usize) -> Vec<Notice> {
    vec![Notice::Selected(CategoryId::from(format!("age-{i}").as_str()))]
}

#[test]
fn nine_bands_step_outwards_and_click_selects_innermost() {
    let mut engine = engine();
    let radii: Vec<f64> = engine.frame().bands.iter().map(|b| b.radius).collect();
    let expected: Vec<f64> = (0..9).map(|i| 72.0 + 44.0 * i as f64).collect();
    assert_eq!(radii, expected);
    assert_eq!(radii.last(), Some(&424.0));

    assert_eq!(click(&mut engine, 72.0), selected(0));
}

#[test]
fn band_edges_resolve_to_the_right_band() {
    let mut engine = engine();
    assert_eq!(click(&mut engine, 94.0), selected(0));

    let mut engine = self::engine();
    assert_eq!(click(&mut engine, 95.0), selected(1));
}

#[test]
fn selecting_runs_every_expand_phase_and_holds_open() {
    let mut engine = engine();
    engine.select(&CategoryId::from("age-2"));
    assert_eq!(engine.drain_notices(), selected(2));
    assert_eq!(engine.frame().expanded, Some(CategoryId::from("age-2")));

    let mut phases = vec![engine.frame().phase];
    for _ in 0..90 {
        engine.tick(FRAME);
        let phase = engine.frame().phase;
        if phases.last() != Some(&phase) {
            phases.push(phase);
        }
    }
    assert_eq!(
        phases,
        vec![
            Phase::Anticipating,
            Phase::Expanding,
            Phase::Settling,
            Phase::Idle
        ]
    );
    assert_eq!(engine.frame().progress, 1.0);

    let markers: Vec<f64> = engine.frame().bands.iter().map(|b| b.marker_angle).collect();
    for _ in 0..300 {
        engine.tick(FRAME);
    }
    assert_eq!(engine.frame().progress, 1.0);
    assert_eq!(engine.frame().phase, Phase::Idle);
    let still: Vec<f64> = engine.frame().bands.iter().map(|b| b.marker_angle).collect();
    assert_eq!(markers, still);
    assert!(engine.drain_notices().is_empty());
}

#[test]
fn close_mid_expansion_collapses_from_current_progress() {
    let mut engine = engine();
    engine.select(&CategoryId::from("age-2"));
    engine.drain_notices();

    let step = Duration::from_millis(2);
    while engine.frame().progress < 0.4 {
        engine.tick(step);
    }
    assert_eq!(engine.frame().phase, Phase::Expanding);
    let before = engine.frame().progress;

    engine.close();
    assert_eq!(engine.frame().phase, Phase::Collapsing);
    assert_eq!(engine.frame().progress, before);

    engine.tick(Duration::from_micros(500));
    assert_abs_diff_eq!(engine.frame().progress, before, epsilon = 1e-3);

    let mut lowest = before;
    for _ in 0..60 {
        engine.tick(FRAME);
        lowest = lowest.min(engine.frame().progress);
    }
    assert_eq!(engine.frame().progress, 0.0);
    assert_eq!(engine.frame().phase, Phase::Idle);
    assert_eq!(engine.frame().expanded, None);
    assert_eq!(lowest, 0.0);

    let closes = engine
        .drain_notices()
        .into_iter()
        .filter(|n| *n == Notice::Closed)
        .count();
    assert_eq!(closes, 1);
}

#[test]
fn reselecting_the_expanded_band_toggles_it_closed() {
    let mut engine = engine();
    engine.select(&CategoryId::from("age-5"));
    for _ in 0..90 {
        engine.tick(FRAME);
    }
    engine.drain_notices();

    engine.select(&CategoryId::from("age-5"));
    assert_eq!(engine.drain_notices(), vec![Notice::Closed]);
    for _ in 0..60 {
        engine.tick(FRAME);
    }
    assert_eq!(engine.frame().phase, Phase::Idle);
    assert_eq!(engine.frame().expanded, None);
    assert_eq!(engine.frame().progress, 0.0);
}

#[test]
fn switching_bands_collapses_before_expanding() {
    let mut engine = engine();
    engine.select(&CategoryId::from("age-1"));
    for _ in 0..90 {
        engine.tick(FRAME);
    }
    engine.drain_notices();

    engine.select(&CategoryId::from("age-6"));
    assert_eq!(engine.drain_notices(), selected(6));
    assert_eq!(engine.frame().phase, Phase::Collapsing);
    assert_eq!(engine.frame().expanded, Some(CategoryId::from("age-1")));

    let mut restarted = false;
    for _ in 0..60 {
        engine.tick(FRAME);
        if engine.frame().expanded == Some(CategoryId::from("age-1")) {
            assert!(engine.frame().bands[6].morph.is_none());
        }
        restarted |= engine.frame().phase == Phase::Anticipating;
    }
    assert!(restarted);
    assert_eq!(engine.frame().expanded, Some(CategoryId::from("age-6")));
    assert!(engine.drain_notices().is_empty());
}

#[test]
fn morph_covers_the_viewport_once_expanded() {
    let mut engine = engine();
    engine.select(&CategoryId::from("age-0"));
    for _ in 0..90 {
        engine.tick(FRAME);
    }
    let band = &engine.frame().bands[0];
    let shape = band.morph.as_ref().unwrap();
    assert!(shape.path.is_closed());
    assert_eq!(shape.clip.width, 1280.0 - 24.0);
    assert_eq!(shape.clip.height, 800.0 - 24.0);
    assert_eq!(shape.path.arcs().count(), 0);
}
