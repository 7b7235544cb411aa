use crate::hex::tile::Tile;

use super::thumbnails::ThumbnailAtlas;
use super::tooltip::stream_summary;

/// Window for the last clicked stream. Clears `selected` when closed.
pub fn stream_detail(ctx: &egui::Context, selected: &mut Option<Tile>, thumbnails: &ThumbnailAtlas) {
    let Some(tile) = selected.as_ref() else {
        return;
    };

    let mut open = true;
    let mut close_clicked = false;
    egui::Window::new("Stream")
        .id(egui::Id::new("stream_detail"))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::RIGHT_TOP, [-16.0, 16.0])
        .default_width(280.0)
        .show(ctx, |ui| {
            stream_summary(ui, tile, thumbnails, 96.0);
            ui.separator();

            let meta = &tile.meta;
            ui.horizontal(|ui| {
                ui.label("Popularity:");
                ui.add(
                    egui::ProgressBar::new(meta.popularity / 100.0)
                        .text(format!("{:.0}", meta.popularity)),
                );
            });
            ui.label(if meta.active { "Status: live" } else { "Status: offline" });
            ui.label(
                egui::RichText::new(format!(
                    "{} at ({:.0}, {:.0}), radius {:.0}",
                    tile.id, tile.pixel.x, tile.pixel.y, tile.radius
                ))
                .small()
                .weak(),
            );

            ui.separator();
            if ui.button("Close").clicked() {
                close_clicked = true;
            }
        });

    if !open || close_clicked {
        *selected = None;
    }
}
