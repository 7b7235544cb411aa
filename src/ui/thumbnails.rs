use std::collections::HashMap;

use egui::Color32;

const SIZE: usize = 128;

/// Stand-in artwork for a stream thumbnail, derived from its key.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThumbnailParams {
    pub top: [f32; 3],
    pub bottom: [f32; 3],
    pub accent: [f32; 3],
    pub pattern: Pattern,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pattern {
    Rings,
    Stripes,
    Dots,
    Waves,
}

impl ThumbnailParams {
    pub fn from_key(key: &str) -> Self {
        let h = fnv1a(key);
        let hue = (h & 0xffff) as f32 / 65535.0;
        let pattern = match (h >> 16) % 4 {
            0 => Pattern::Rings,
            1 => Pattern::Stripes,
            2 => Pattern::Dots,
            _ => Pattern::Waves,
        };
        Self {
            top: hsv(hue, 0.55, 0.85),
            bottom: hsv((hue + 0.08).fract(), 0.7, 0.35),
            accent: hsv((hue + 0.5).fract(), 0.35, 0.95),
            pattern,
        }
    }
}

/// Procedural thumbnails keyed by the feed's thumbnail string.
#[derive(Default)]
pub struct ThumbnailAtlas {
    textures: HashMap<String, egui::TextureHandle>,
}

impl ThumbnailAtlas {
    /// Rasterize any key not seen before. Cheap once every key is cached.
    pub fn ensure<'a>(&mut self, ctx: &egui::Context, keys: impl IntoIterator<Item = &'a str>) {
        for key in keys {
            if self.textures.contains_key(key) {
                continue;
            }
            let pixels = rasterize_thumbnail(&ThumbnailParams::from_key(key), SIZE, SIZE);
            let image = egui::ColorImage::from_rgba_unmultiplied(
                [SIZE, SIZE],
                &pixels.iter().flat_map(|c| c.to_srgba_unmultiplied()).collect::<Vec<_>>(),
            );
            let texture = ctx.load_texture(format!("thumb:{key}"), image, egui::TextureOptions::LINEAR);
            self.textures.insert(key.to_string(), texture);
        }
    }

    pub fn get(&self, key: &str) -> Option<&egui::TextureHandle> {
        self.textures.get(key)
    }
}

pub fn rasterize_thumbnail(params: &ThumbnailParams, w: usize, h: usize) -> Vec<Color32> {
    let mut pixels = Vec::with_capacity(w * h);
    for y in 0..h {
        for x in 0..w {
            let u = (x as f32 + 0.5) / w as f32;
            let v = (y as f32 + 0.5) / h as f32;
            let base = lerp3(params.top, params.bottom, v);
            let mask = pattern_mask(params.pattern, u - 0.5, v - 0.5);
            let c = lerp3(base, params.accent, mask * 0.45);
            pixels.push(Color32::from_rgb(
                (c[0] * 255.0) as u8,
                (c[1] * 255.0) as u8,
                (c[2] * 255.0) as u8,
            ));
        }
    }
    pixels
}

/// 0..=1 coverage of the accent pattern at centered coordinates.
fn pattern_mask(pattern: Pattern, px: f32, py: f32) -> f32 {
    let soft = |d: f32| (1.0 - d.abs() / 0.04).clamp(0.0, 1.0);
    match pattern {
        Pattern::Rings => {
            let r = (px * px + py * py).sqrt();
            soft((r * 6.0).fract() - 0.5) * (1.0 - r).max(0.0)
        }
        Pattern::Stripes => soft(((px + py) * 5.0).fract() - 0.5),
        Pattern::Dots => {
            let cx = (px * 6.0).fract().abs() - 0.5;
            let cy = (py * 6.0).fract().abs() - 0.5;
            let d = (cx * cx + cy * cy).sqrt();
            (1.0 - d / 0.25).clamp(0.0, 1.0)
        }
        Pattern::Waves => {
            let y = py + 0.08 * (px * std::f32::consts::TAU * 2.0).sin();
            soft((y * 4.0).fract() - 0.5)
        }
    }
}

fn fnv1a(s: &str) -> u32 {
    s.bytes()
        .fold(0x811c_9dc5u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193))
}

fn hsv(h: f32, s: f32, v: f32) -> [f32; 3] {
    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    match i as i32 % 6 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    std::array::from_fn(|i| a[i] + (b[i] - a[i]) * t)
}
