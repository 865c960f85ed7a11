use super::{
    BODY_FONT_SIZE, BODY_LINE_HEIGHT, CONTENT_PADDING, LABEL_FONT_SIZE, LOADING_TEXT,
    MARKER_RADIUS, RING_LINE_WIDTH, SELECTED_RING_RADIUS, SUBTITLE_FONT_SIZE, SUN_RADIUS,
    SURFACE_ALPHA, TITLE_FONT_SIZE,
};
use crate::gui::theme::{ThemeColors, band_rgba};
use cairo::Context;
use orrery::{BandFrame, DialFrame, MorphShape, Path, PathCommand};
use palette::Srgba;
use std::f64::consts::{FRAC_PI_2, PI};

fn set_source(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

fn with_alpha(color: Srgba<f64>, factor: f64) -> Srgba<f64> {
    Srgba::new(color.red, color.green, color.blue, color.alpha * factor.clamp(0.0, 1.0))
}

/// Replays an engine path onto the cairo context.
fn trace(cr: &Context, path: &Path) {
    for command in path.commands() {
        match command {
            PathCommand::MoveTo(p) => cr.move_to(p.x, p.y),
            PathCommand::LineTo(p) => cr.line_to(p.x, p.y),
            PathCommand::Arc(a) if a.end >= a.start => {
                cr.arc(a.center.x, a.center.y, a.radius, a.start, a.end)
            }
            PathCommand::Arc(a) => cr.arc_negative(a.center.x, a.center.y, a.radius, a.start, a.end),
            PathCommand::Close => cr.close_path(),
        }
    }
}

/// Longest prefix of `label` that fits in `max_width`, with an ellipsis when cut.
fn fit_label(cr: &Context, label: &str, max_width: f64) -> Result<String, cairo::Error> {
    if cr.text_extents(label)?.x_advance() <= max_width {
        return Ok(label.to_string());
    }
    let chars: Vec<char> = label.chars().collect();
    for end in (0..chars.len()).rev() {
        let candidate: String = chars[..end].iter().chain(['…'].iter()).collect();
        if cr.text_extents(&candidate)?.x_advance() <= max_width {
            return Ok(candidate);
        }
    }
    Ok(String::new())
}

/// Greedy word wrap against the current font. A word wider than `max_width` gets a line of
/// its own.
fn wrap_lines(cr: &Context, text: &str, max_width: f64) -> Result<Vec<String>, cairo::Error> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word}");
        if cr.text_extents(&candidate)?.x_advance() <= max_width {
            line = candidate;
        } else {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    Ok(lines)
}

struct BandRenderer<'a> {
    band: &'a BandFrame,
    frame: &'a DialFrame,
}

impl<'a> BandRenderer<'a> {
    fn new(band: &'a BandFrame, frame: &'a DialFrame) -> Self {
        Self { band, frame }
    }

    fn draw(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        self.draw_ring(cr, colors)?;
        self.draw_label(cr, colors)?;
        self.draw_marker(cr)
    }

    fn draw_ring(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        let band = self.band;
        let emphasis = if band.hovered { 1.0 } else { 0.8 };
        let width = RING_LINE_WIDTH * self.frame.orbit_scale * (1.0 + band.micro_variation);

        cr.save()?;
        cr.set_line_width(width);
        cr.set_line_cap(cairo::LineCap::Round);
        set_source(cr, band_rgba(band.color, band.opacity * emphasis));
        for segment in [&band.segments.before, &band.segments.after] {
            cr.new_path();
            trace(cr, segment);
            cr.stroke()?;
        }

        if band.hovered {
            set_source(cr, colors.hovered);
            cr.set_line_width(width + 4.0);
            cr.new_path();
            trace(cr, &band.half_ring);
            cr.stroke()?;
        }
        cr.restore()
    }

    /// Label set glyph by glyph along the ring, centred in the segment gap.
    fn draw_label(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        let band = self.band;
        let alpha = band.opacity * self.frame.orbit_fade;
        if alpha <= 0.01 || band.radius <= 0.0 {
            return Ok(());
        }

        cr.save()?;
        cr.select_font_face("Serif", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
        cr.set_font_size(LABEL_FONT_SIZE);
        set_source(cr, with_alpha(colors.text, alpha));

        let text = if band.segments.overflow {
            fit_label(cr, &band.label, band.segments.gap * band.radius)?
        } else {
            band.label.clone()
        };
        let total = cr.text_extents(&text)?.x_advance();
        let center = self.frame.center;

        let mut offset = -total / 2.0;
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            let glyph = ch.encode_utf8(&mut buf);
            let ext = cr.text_extents(glyph)?;
            let angle = (offset + ext.x_advance() / 2.0) / band.radius;
            let at = center.polar(band.radius, angle);

            cr.save()?;
            cr.translate(at.x, at.y);
            cr.rotate(angle + FRAC_PI_2);
            cr.move_to(-ext.x_advance() / 2.0, LABEL_FONT_SIZE / 3.0);
            cr.show_text(glyph)?;
            cr.restore()?;

            offset += ext.x_advance();
        }
        cr.restore()
    }

    fn draw_marker(&self, cr: &Context) -> Result<(), cairo::Error> {
        let band = self.band;
        let alpha = self.frame.orbit_fade;
        if !band.marker_visible || alpha <= 0.01 {
            return Ok(());
        }
        let scale = self.frame.orbit_scale;

        cr.new_path();
        set_source(cr, band_rgba(band.color, alpha));
        cr.arc(band.marker.x, band.marker.y, MARKER_RADIUS * scale, 0.0, 2.0 * PI);
        cr.fill()?;

        if band.selected {
            cr.set_line_width(2.0);
            cr.arc(
                band.marker.x,
                band.marker.y,
                SELECTED_RING_RADIUS * scale,
                0.0,
                2.0 * PI,
            );
            cr.stroke()?;
        }
        Ok(())
    }

    fn draw_surface(&self, cr: &Context, shape: &MorphShape) -> Result<(), cairo::Error> {
        let clip = shape.clip;
        cr.save()?;
        cr.new_path();
        cr.rectangle(clip.x, clip.y, clip.width, clip.height);
        cr.clip();
        cr.new_path();
        trace(cr, &shape.path);
        set_source(cr, band_rgba(self.band.color, SURFACE_ALPHA));
        cr.fill()?;
        cr.restore()
    }

    fn draw_content(
        &self,
        cr: &Context,
        shape: &MorphShape,
        colors: &ThemeColors,
    ) -> Result<(), cairo::Error> {
        let (x, y) = (shape.clip.x + CONTENT_PADDING, shape.clip.y + CONTENT_PADDING);

        cr.save()?;
        set_source(cr, colors.background);
        cr.select_font_face("Serif", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
        cr.set_font_size(TITLE_FONT_SIZE);
        cr.move_to(x, y + TITLE_FONT_SIZE);
        cr.show_text(&self.band.label)?;

        cr.select_font_face("Sans", cairo::FontSlant::Italic, cairo::FontWeight::Normal);
        cr.set_font_size(SUBTITLE_FONT_SIZE);
        let subtitle_y = y + TITLE_FONT_SIZE + SUBTITLE_FONT_SIZE * 2.0;
        cr.move_to(x, subtitle_y);
        cr.show_text(&self.band.subtitle)?;

        if let Some(description) = &self.band.description {
            cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Normal);
            cr.set_font_size(BODY_FONT_SIZE);
            let line_height = BODY_FONT_SIZE * BODY_LINE_HEIGHT;
            let width = shape.clip.width - 2.0 * CONTENT_PADDING;
            let bottom = shape.clip.y + shape.clip.height - CONTENT_PADDING;

            let mut baseline = subtitle_y + line_height * 2.0;
            for line in wrap_lines(cr, description, width)? {
                if baseline > bottom {
                    break;
                }
                cr.move_to(x, baseline);
                cr.show_text(&line)?;
                baseline += line_height;
            }
        }
        cr.restore()
    }
}

pub fn draw(cr: &Context, frame: &DialFrame, colors: &ThemeColors) -> Result<(), cairo::Error> {
    set_source(cr, colors.background);
    cr.paint()?;

    if frame.loading {
        return draw_loading(cr, frame, colors);
    }

    let mut resting: Vec<&BandFrame> = frame.bands.iter().filter(|b| !b.expanded).collect();
    resting.sort_by(|a, b| a.depth.total_cmp(&b.depth));
    for band in resting {
        BandRenderer::new(band, frame).draw(cr, colors)?;
    }

    draw_sun(cr, frame, colors)?;

    if let Some(band) = frame.bands.iter().find(|b| b.expanded) {
        let renderer = BandRenderer::new(band, frame);
        renderer.draw(cr, colors)?;
        if let Some(shape) = band.morph.as_ref().filter(|_| frame.progress > 0.0) {
            renderer.draw_surface(cr, shape)?;
            if frame.content_visible {
                renderer.draw_content(cr, shape, colors)?;
            }
        }
    }
    Ok(())
}

fn draw_sun(cr: &Context, frame: &DialFrame, colors: &ThemeColors) -> Result<(), cairo::Error> {
    if frame.sun_fade <= 0.0 {
        return Ok(());
    }
    let c = frame.center;
    let r = SUN_RADIUS * frame.orbit_scale;

    let glow = cairo::RadialGradient::new(c.x, c.y, r * 0.2, c.x, c.y, r * 2.0);
    let (red, green, blue, alpha) = colors.sun.into_components();
    glow.add_color_stop_rgba(0.0, red, green, blue, alpha * frame.sun_fade);
    glow.add_color_stop_rgba(1.0, red, green, blue, 0.0);

    cr.new_path();
    cr.set_source(&glow)?;
    cr.arc(c.x, c.y, r * 2.0, 0.0, 2.0 * PI);
    cr.fill()?;

    set_source(cr, with_alpha(colors.sun, frame.sun_fade));
    cr.arc(c.x, c.y, r, 0.0, 2.0 * PI);
    cr.fill()
}

fn draw_loading(cr: &Context, frame: &DialFrame, colors: &ThemeColors) -> Result<(), cairo::Error> {
    let c = frame.center;
    set_source(cr, colors.placeholder);

    cr.set_line_width(1.5);
    cr.set_dash(&[6.0, 6.0], 0.0);
    cr.new_path();
    cr.arc(c.x, c.y, SUN_RADIUS * 2.0, -FRAC_PI_2, FRAC_PI_2);
    cr.stroke()?;
    cr.set_dash(&[], 0.0);

    cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Normal);
    cr.set_font_size(LABEL_FONT_SIZE);
    cr.move_to(c.x + SUN_RADIUS * 3.0, c.y + LABEL_FONT_SIZE / 3.0);
    cr.show_text(LOADING_TEXT)
}
