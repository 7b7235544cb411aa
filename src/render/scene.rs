use egui::Color32;
use glam::Vec2;

use super::camera::ViewTransform;
use crate::hex::coords::{hex_vertices, inset_vertices};
use crate::hex::tile::{Tile, TileId};
use crate::interact::controller::Controller;
use crate::ui::style::{mix, HivePalette};

/// Image clip inset as a fraction of the tile radius.
pub const CLIP_MARGIN: f32 = 0.03;
const EYE: &str = "\u{1F441}";

#[derive(Clone, Debug)]
pub struct SceneStyle {
    pub palette: HivePalette,
    pub show_labels: bool,
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            palette: HivePalette::default(),
            show_labels: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub text: String,
    /// Screen position of the baseline, horizontally centered.
    pub pos: Vec2,
    /// Screen font size.
    pub size: f32,
    pub color: Color32,
}

/// One tile, fully resolved to screen space.
#[derive(Clone, Debug, PartialEq)]
pub struct TileShape {
    pub id: TileId,
    pub center: Vec2,
    pub outline: [Vec2; 6],
    /// Inset polygon the thumbnail is clipped to.
    pub clip: Option<[Vec2; 6]>,
    pub thumbnail: Option<String>,
    pub fill: Color32,
    pub stroke_width: f32,
    pub stroke_color: Color32,
    /// 0..=1 strength of the hover glow.
    pub glow: f32,
    pub opacity: f32,
    pub live: bool,
    pub title: Option<Label>,
    pub viewers: Option<Label>,
}

/// Everything needed to paint one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub transform: ViewTransform,
    pub background: Color32,
    /// In paint order; the raised tile is last.
    pub shapes: Vec<TileShape>,
}

impl Scene {
    pub fn shape(&self, id: &TileId) -> Option<&TileShape> {
        self.shapes.iter().find(|s| &s.id == id)
    }
}

pub fn resting_stroke(radius: f32) -> f32 {
    (radius / 100.0).max(1.0)
}

pub fn hover_stroke(radius: f32) -> f32 {
    (radius / 50.0).max(6.0)
}

pub fn pulse_stroke(radius: f32) -> f32 {
    (radius / 40.0).max(8.0)
}

pub fn title_font(radius: f32) -> f32 {
    (radius / 15.0).clamp(16.0, 28.0)
}

pub fn viewer_font(radius: f32) -> f32 {
    (radius / 20.0).clamp(12.0, 22.0)
}

/// Tiles in paint order: acceptance order with `raised` moved to the end.
pub fn paint_order<'a>(tiles: &'a [Tile], raised: Option<&TileId>) -> Vec<&'a Tile> {
    let mut order: Vec<&Tile> = tiles.iter().filter(|t| Some(&t.id) != raised).collect();
    order.extend(tiles.iter().filter(|t| Some(&t.id) == raised));
    order
}

/// Project the batch through the controller's camera and presentation state.
/// Pure: the same inputs always give the same scene.
pub fn project(tiles: &[Tile], controller: &Controller, style: &SceneStyle, now: f64) -> Scene {
    let transform = controller.camera().current();
    let pulse_scale = controller.config().pulse_scale;
    let palette = &style.palette;

    let shapes = paint_order(tiles, controller.raised())
        .into_iter()
        .map(|tile| {
            let p = controller.presentation(&tile.id, now);
            let r = tile.radius;
            let local = 1.0 + (pulse_scale - 1.0) * p.pulse;
            let k = transform.scale * local;
            let center = transform.apply(tile.pixel);
            let to_screen = |v: Vec2| center + v * k;

            let stroke = resting_stroke(r) + (hover_stroke(r) - resting_stroke(r)) * p.emphasis;
            let stroke = stroke + (pulse_stroke(r) - stroke) * p.pulse;
            let stroke_color = mix(palette.stroke, palette.highlight, p.emphasis.max(p.pulse));

            let (title, viewers) = if style.show_labels {
                let text_color = palette.text.gamma_multiply(p.opacity);
                (
                    Some(Label {
                        text: tile.meta.title.clone(),
                        pos: to_screen(Vec2::new(0.0, -r / 20.0)),
                        size: title_font(r) * k,
                        color: text_color,
                    }),
                    Some(Label {
                        text: format!("{EYE} {}", tile.meta.viewers),
                        pos: to_screen(Vec2::new(0.0, r / 25.0)),
                        size: viewer_font(r) * k,
                        color: text_color,
                    }),
                )
            } else {
                (None, None)
            };

            TileShape {
                id: tile.id.clone(),
                center,
                outline: hex_vertices(r).map(to_screen),
                clip: tile
                    .meta
                    .thumbnail
                    .as_ref()
                    .map(|_| inset_vertices(r, CLIP_MARGIN).map(to_screen)),
                thumbnail: tile.meta.thumbnail.clone(),
                fill: palette.fill.gamma_multiply(p.opacity),
                stroke_width: stroke * k,
                stroke_color: stroke_color.gamma_multiply(p.opacity),
                glow: p.emphasis,
                opacity: p.opacity,
                live: tile.meta.active,
                title,
                viewers,
            }
        })
        .collect();

    Scene {
        transform,
        background: palette.background,
        shapes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::tile::TileMeta;
    use crate::interact::controller::InteractionConfig;

    fn tile(i: usize, x: f32, thumb: bool) -> Tile {
        Tile {
            id: TileId::from_index(i),
            axial: None,
            pixel: Vec2::new(x, 0.0),
            radius: 180.0,
            meta: TileMeta {
                title: format!("T{i}"),
                viewers: 321,
                popularity: 50.0,
                thumbnail: thumb.then(|| format!("thumb-{i}")),
                active: i % 2 == 0,
            },
        }
    }

    fn setup() -> (Controller, Vec<Tile>) {
        let tiles = vec![tile(0, 0.0, true), tile(1, 400.0, false), tile(2, 800.0, true)];
        let mut c = Controller::new(InteractionConfig::default());
        c.install(&tiles);
        c.mount(Vec2::new(500.0, 400.0), 0.0);
        c.tick(1.0);
        (c, tiles)
    }

    #[test]
    fn test_stroke_and_font_rules() {
        assert_eq!(resting_stroke(180.0), 1.8);
        assert_eq!(resting_stroke(50.0), 1.0);
        assert_eq!(hover_stroke(180.0), 6.0);
        assert_eq!(hover_stroke(400.0), 8.0);
        assert_eq!(pulse_stroke(180.0), 8.0);
        assert_eq!(title_font(180.0), 16.0);
        assert_eq!(title_font(600.0), 28.0);
        assert_eq!(viewer_font(300.0), 15.0);
    }

    #[test]
    fn test_projection_applies_camera() {
        let (c, tiles) = setup();
        let scene = project(&tiles, &c, &SceneStyle::default(), 1.0);
        assert_eq!(scene.transform.scale, 0.8);
        let s1 = scene.shape(&TileId::from_index(1)).unwrap();
        assert_eq!(s1.center, Vec2::new(500.0 + 320.0, 400.0));
        // Vertex 0 points up.
        assert!((s1.outline[0] - Vec2::new(820.0, 400.0 - 144.0)).length() < 1e-3);
        assert!((s1.stroke_width - 1.8 * 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_clip_only_with_thumbnail() {
        let (c, tiles) = setup();
        let scene = project(&tiles, &c, &SceneStyle::default(), 1.0);
        assert!(scene.shapes[0].clip.is_some());
        assert!(scene.shapes[1].clip.is_none());
        let s = &scene.shapes[0];
        let clip = s.clip.unwrap();
        assert!(((clip[0] - s.center).length() - 180.0 * 0.97 * 0.8).abs() < 1e-3);
    }

    #[test]
    fn test_raised_tile_paints_last() {
        let (mut c, tiles) = setup();
        c.on_enter(&TileId::from_index(0), 2.0);
        let scene = project(&tiles, &c, &SceneStyle::default(), 2.5);
        let ids: Vec<&str> = scene.shapes.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["hex-1", "hex-2", "hex-0"]);
        let hovered = scene.shapes.last().unwrap();
        assert_eq!(hovered.glow, 1.0);
        assert!((hovered.stroke_width - 6.0 * 0.8).abs() < 1e-4);
        assert!((scene.shapes[0].opacity - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_labels_positions_and_toggle() {
        let (c, tiles) = setup();
        let scene = project(&tiles, &c, &SceneStyle::default(), 1.0);
        let s = &scene.shapes[0];
        let title = s.title.as_ref().unwrap();
        assert_eq!(title.text, "T0");
        assert!((title.pos.y - (400.0 - 9.0 * 0.8)).abs() < 1e-3);
        assert!((title.size - 16.0 * 0.8).abs() < 1e-5);
        let viewers = s.viewers.as_ref().unwrap();
        assert!(viewers.text.ends_with("321"));
        assert!(viewers.pos.y > title.pos.y);

        let style = SceneStyle {
            show_labels: false,
            ..SceneStyle::default()
        };
        let bare = project(&tiles, &c, &style, 1.0);
        assert!(bare.shapes.iter().all(|s| s.title.is_none() && s.viewers.is_none()));
    }

    #[test]
    fn test_pulse_scales_tile() {
        let (mut c, tiles) = setup();
        c.on_click(&tiles[1], 3.0);
        let scene = project(&tiles, &c, &SceneStyle::default(), 3.08);
        let s = scene.shape(&TileId::from_index(1)).unwrap();
        let vertex = (s.outline[0] - s.center).length();
        assert!((vertex - 180.0 * 0.8 * 1.1).abs() < 1e-2);
        assert!((s.stroke_width - 8.0 * 0.8 * 1.1).abs() < 1e-2);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let (c, tiles) = setup();
        let style = SceneStyle::default();
        assert_eq!(project(&tiles, &c, &style, 1.0), project(&tiles, &c, &style, 1.0));
    }
}
