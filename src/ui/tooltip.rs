use crate::hex::tile::Tile;

use super::thumbnails::ThumbnailAtlas;

/// Small card for the hovered stream, drawn next to the cursor.
pub fn stream_tooltip(ctx: &egui::Context, tile: &Tile, thumbnails: &ThumbnailAtlas) {
    let Some(pointer) = ctx.pointer_hover_pos() else {
        return;
    };
    egui::Area::new(egui::Id::new("stream_tooltip"))
        .order(egui::Order::Tooltip)
        .fixed_pos(pointer + egui::vec2(16.0, 16.0))
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                stream_summary(ui, tile, thumbnails, 48.0);
            });
        });
}

/// Thumbnail, title and viewer line; shared with the detail window.
pub fn stream_summary(ui: &mut egui::Ui, tile: &Tile, thumbnails: &ThumbnailAtlas, thumb_size: f32) {
    let meta = &tile.meta;
    ui.horizontal(|ui| {
        if let Some(tex) = meta.thumbnail.as_deref().and_then(|k| thumbnails.get(k)) {
            ui.image(egui::load::SizedTexture::new(
                tex.id(),
                egui::vec2(thumb_size, thumb_size),
            ));
        }
        ui.vertical(|ui| {
            ui.strong(&meta.title);
            ui.horizontal(|ui| {
                ui.label(format!("\u{1F441} {} viewers", meta.viewers));
                if meta.active {
                    ui.colored_label(egui::Color32::from_rgb(0xd2, 0x3c, 0x2a), "LIVE");
                }
            });
        });
    });
}
