use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use orrery::BandColor;
use palette::Srgba;

/// A named GTK theme colour, with the colour used when the theme lacks it and an optional
/// alpha that replaces the theme's own.
struct Slot {
    name: &'static str,
    fallback: Srgba<f64>,
    alpha: Option<f64>,
}

const BACKGROUND: Slot = Slot {
    name: "theme_bg_color",
    fallback: Srgba::new(0.04, 0.04, 0.08, 1.0),
    alpha: Some(1.0),
};

const TEXT: Slot = Slot {
    name: "theme_fg_color",
    fallback: Srgba::new(0.92, 0.9, 0.85, 1.0),
    alpha: None,
};

const HOVERED: Slot = Slot {
    name: "theme_selected_bg_color",
    fallback: Srgba::new(1.0, 0.95, 0.75, 0.35),
    alpha: Some(0.35),
};

const PLACEHOLDER: Slot = Slot {
    name: "theme_unfocused_fg_color",
    fallback: Srgba::new(0.6, 0.6, 0.6, 0.6),
    alpha: Some(0.6),
};

/// The sun keeps its gold regardless of theme.
const SUN: Srgba<f64> = Srgba::new(1.0, 0.84, 0.0, 0.95);

pub struct ThemeColors {
    pub background: Srgba<f64>,
    pub text: Srgba<f64>,
    pub hovered: Srgba<f64>,
    pub sun: Srgba<f64>,
    pub placeholder: Srgba<f64>,
}

impl ThemeColors {
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        let resolve = |slot: &Slot| {
            context
                .lookup_color(slot.name)
                .map(|rgba| from_gdk(rgba, slot.alpha))
                .unwrap_or(slot.fallback)
        };
        Self {
            background: resolve(&BACKGROUND),
            text: resolve(&TEXT),
            hovered: resolve(&HOVERED),
            sun: SUN,
            placeholder: resolve(&PLACEHOLDER),
        }
    }
}

fn from_gdk(rgba: gdk::RGBA, alpha: Option<f64>) -> Srgba<f64> {
    Srgba::new(
        f64::from(rgba.red()),
        f64::from(rgba.green()),
        f64::from(rgba.blue()),
        alpha.unwrap_or(f64::from(rgba.alpha())),
    )
}

/// Band colour with an alpha, ready for cairo.
pub fn band_rgba(color: BandColor, alpha: f64) -> Srgba<f64> {
    let (r, g, b) = color.to_unit_rgb();
    Srgba::new(r, g, b, alpha.clamp(0.0, 1.0))
}

const CSS: &str = "
.aeon-window {
    background-color: @theme_bg_color;
}
.aeon-dial {
    background: none;
}
";

pub fn load_css() {
    let Some(display) = gdk::Display::default() else {
        log::warn!("No display available, skipping dial stylesheet");
        return;
    };
    let provider = gtk::CssProvider::new();
    provider.load_from_data(CSS);
    gtk::style_context_add_provider_for_display(
        &display,
        &provider,
        gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}
