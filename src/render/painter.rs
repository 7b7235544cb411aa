use egui::{Align2, Color32, FontId, Mesh, Pos2, Shape, Stroke};
use glam::Vec2;

use super::scene::{Label, Scene, TileShape};
use crate::ui::style::HivePalette;
use crate::ui::thumbnails::ThumbnailAtlas;

/// Glow rings drawn outside the stroke, widest and faintest first.
const GLOW_LAYERS: [(f32, f32); 3] = [(5.0, 0.12), (3.0, 0.22), (1.8, 0.35)];
/// Thumbnails sit under a veil of the tile fill so labels stay legible.
const THUMB_ALPHA: f32 = 0.55;

fn pos(v: Vec2) -> Pos2 {
    Pos2::new(v.x, v.y)
}

/// Paint `scene` into `painter` in shape order.
pub fn paint_scene(painter: &egui::Painter, scene: &Scene, palette: &HivePalette, thumbnails: &ThumbnailAtlas) {
    for shape in &scene.shapes {
        paint_tile(painter, shape, palette, thumbnails);
    }
}

fn paint_tile(painter: &egui::Painter, shape: &TileShape, palette: &HivePalette, thumbnails: &ThumbnailAtlas) {
    let outline: Vec<Pos2> = shape.outline.iter().copied().map(pos).collect();

    if shape.glow > 0.0 {
        for (width, alpha) in GLOW_LAYERS {
            let color = palette.highlight.gamma_multiply(alpha * shape.glow * shape.opacity);
            painter.add(Shape::closed_line(
                outline.clone(),
                Stroke::new(shape.stroke_width * width, color),
            ));
        }
    }

    painter.add(Shape::convex_polygon(outline.clone(), shape.fill, Stroke::NONE));

    if let (Some(clip), Some(key)) = (&shape.clip, &shape.thumbnail) {
        if let Some(texture) = thumbnails.get(key) {
            let tint = Color32::WHITE.gamma_multiply(THUMB_ALPHA * shape.opacity);
            painter.add(Shape::mesh(hex_image_mesh(shape.center, clip, texture.id(), tint)));
        }
    }

    if shape.live {
        let top = shape.outline[0];
        let r = (top - shape.center).length();
        let dot = shape.center.lerp(top, 0.72);
        painter.circle_filled(pos(dot), (r * 0.045).max(2.0), palette.live.gamma_multiply(shape.opacity));
    }

    painter.add(Shape::closed_line(outline, Stroke::new(shape.stroke_width, shape.stroke_color)));

    for label in [&shape.title, &shape.viewers].into_iter().flatten() {
        paint_label(painter, label);
    }
}

fn paint_label(painter: &egui::Painter, label: &Label) {
    if label.size < 1.0 {
        return;
    }
    painter.text(
        pos(label.pos),
        Align2::CENTER_BOTTOM,
        &label.text,
        FontId::proportional(label.size),
        label.color,
    );
}

/// Triangle fan over the inset hexagon, UVs spanning its bounding square.
pub fn hex_image_mesh(center: Vec2, clip: &[Vec2; 6], texture: egui::TextureId, tint: Color32) -> Mesh {
    let r = clip
        .iter()
        .map(|v| (*v - center).length())
        .fold(0.0f32, f32::max)
        .max(f32::EPSILON);
    let uv = |v: Vec2| {
        let d = (v - center) / (2.0 * r);
        Pos2::new(0.5 + d.x, 0.5 + d.y)
    };

    let mut mesh = Mesh::with_texture(texture);
    mesh.vertices.push(egui::epaint::Vertex {
        pos: pos(center),
        uv: uv(center),
        color: tint,
    });
    for v in clip {
        mesh.vertices.push(egui::epaint::Vertex {
            pos: pos(*v),
            uv: uv(*v),
            color: tint,
        });
    }
    for i in 0..6u32 {
        mesh.add_triangle(0, 1 + i, 1 + (i + 1) % 6);
    }
    mesh
}
