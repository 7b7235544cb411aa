use crate::hex::layout::LayoutMode;
use crate::hive::config::HiveConfig;
use crate::hive::input::{HiveAction, InputState};

/// Settings window. Edits `config` in place and saves it on close; the host
/// picks up layout changes from `config.layout`.
pub fn settings_menu(
    ctx: &egui::Context,
    open: &mut bool,
    config: &mut HiveConfig,
    input_state: &InputState,
    rebinding: &mut Option<HiveAction>,
) {
    if !*open {
        return;
    }

    egui::Window::new("Settings")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .default_width(400.0)
        .show(ctx, |ui| {
            let tab_id = ui.id().with("settings_tab");
            let mut tab: SettingsTab = ui.data_mut(|d| *d.get_temp_mut_or(tab_id, SettingsTab::Layout));

            ui.horizontal(|ui| {
                ui.selectable_value(&mut tab, SettingsTab::Layout, "Layout");
                ui.selectable_value(&mut tab, SettingsTab::Display, "Display");
                ui.selectable_value(&mut tab, SettingsTab::KeyBindings, "Key Bindings");
            });

            ui.data_mut(|d| d.insert_temp(tab_id, tab));

            ui.separator();

            match tab {
                SettingsTab::Layout => {
                    let layout = &mut config.layout;
                    ui.horizontal(|ui| {
                        ui.label("Mode:");
                        for mode in [LayoutMode::Spiral, LayoutMode::Scatter] {
                            ui.selectable_value(&mut layout.mode, mode, mode.display_name());
                        }
                    });
                    ui.horizontal(|ui| {
                        ui.label("Minimum tiles:");
                        ui.add(egui::Slider::new(&mut layout.min_count, 1..=40));
                    });
                    ui.horizontal(|ui| {
                        ui.label("Maximum tiles:");
                        ui.add(egui::Slider::new(&mut layout.max_count, 1..=40));
                    });
                    if layout.min_count > layout.max_count {
                        layout.max_count = layout.min_count;
                    }
                    ui.horizontal(|ui| {
                        ui.label("Gap:");
                        ui.add(egui::Slider::new(&mut layout.gap, 0.0..=40.0).suffix(" px"));
                    });
                    ui.label(
                        egui::RichText::new("Changes regenerate the hive.")
                            .small()
                            .weak(),
                    );
                }
                SettingsTab::Display => {
                    ui.checkbox(&mut config.display.show_labels, "Show stream labels");
                    ui.checkbox(&mut config.display.show_tooltip, "Show hover tooltip");
                }
                SettingsTab::KeyBindings => {
                    for &action in HiveAction::all() {
                        ui.horizontal(|ui| {
                            ui.label(action.display_name());
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                if *rebinding == Some(action) {
                                    ui.label("Press a key...");
                                } else {
                                    let key_name = input_state
                                        .bindings
                                        .get(&action)
                                        .map(|b| b.display_name())
                                        .unwrap_or_else(|| "Unbound".to_string());
                                    if ui.button(&key_name).clicked() {
                                        *rebinding = Some(action);
                                    }
                                }
                            });
                        });
                    }
                }
            }

            ui.separator();

            if ui.button("Close").clicked() {
                *open = false;
                *rebinding = None;
                config.save();
            }
        });
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SettingsTab {
    Layout,
    Display,
    KeyBindings,
}
