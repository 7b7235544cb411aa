use egui::Color32;

/// Hive colours. Dark brown ground, honey tiles, cream highlight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HivePalette {
    pub background: Color32,
    pub fill: Color32,
    pub text: Color32,
    pub stroke: Color32,
    pub highlight: Color32,
    pub live: Color32,
}

impl Default for HivePalette {
    fn default() -> Self {
        Self {
            background: Color32::from_rgb(0x32, 0x21, 0x11),
            fill: Color32::from_rgb(0xdb, 0xc4, 0x8a),
            text: Color32::from_rgb(0x32, 0x21, 0x11),
            stroke: Color32::from_rgba_unmultiplied(255, 255, 255, 51),
            highlight: Color32::from_rgb(0xff, 0xec, 0xba),
            live: Color32::from_rgb(0xd2, 0x3c, 0x2a),
        }
    }
}

impl HivePalette {
    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b, _] = egui::Rgba::from(self.background).to_array();
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }
}

/// Straight-alpha blend between two colours.
pub fn mix(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let [ar, ag, ab, aa] = a.to_srgba_unmultiplied();
    let [br, bg, bb, ba] = b.to_srgba_unmultiplied();
    let lerp = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color32::from_rgba_unmultiplied(lerp(ar, br), lerp(ag, bg), lerp(ab, bb), lerp(aa, ba))
}

pub fn apply_hive_style(ctx: &egui::Context, palette: &HivePalette) {
    let mut style = (*ctx.style()).clone();

    let bg = Color32::from_rgba_unmultiplied(36, 24, 12, 235);
    let border = mix(palette.fill, palette.background, 0.5);
    let text_color = palette.highlight;

    style.visuals.window_fill = bg;
    style.visuals.panel_fill = bg;
    style.visuals.extreme_bg_color = Color32::from_rgb(24, 16, 8);

    style.visuals.window_corner_radius = egui::CornerRadius::same(6);
    for w in [
        &mut style.visuals.widgets.noninteractive,
        &mut style.visuals.widgets.inactive,
        &mut style.visuals.widgets.hovered,
        &mut style.visuals.widgets.active,
        &mut style.visuals.widgets.open,
    ] {
        w.fg_stroke.color = text_color;
    }

    style.visuals.widgets.hovered.bg_fill = palette.fill.gamma_multiply(0.3);
    style.visuals.widgets.active.bg_fill = palette.fill.gamma_multiply(0.5);
    style.visuals.selection.bg_fill = palette.fill.gamma_multiply(0.4);

    style.visuals.window_stroke = egui::Stroke::new(1.0, border);
    style.visuals.window_shadow = egui::epaint::Shadow::NONE;
    style.visuals.override_text_color = Some(text_color);

    ctx.set_style(style);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_endpoints() {
        let p = HivePalette::default();
        assert_eq!(mix(p.stroke, p.highlight, 0.0), p.stroke);
        assert_eq!(mix(p.stroke, p.highlight, 1.0), p.highlight);
        let half = mix(Color32::BLACK, Color32::WHITE, 0.5);
        assert_eq!(half.to_srgba_unmultiplied()[0], 128);
    }

    #[test]
    fn test_clear_color_matches_background() {
        let c = HivePalette::default().clear_color();
        assert!(c.r > c.g && c.g > c.b);
        assert_eq!(c.a, 1.0);
    }
}
