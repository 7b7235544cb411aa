use glam::Vec2;
use rand::Rng;

use super::coords::SQRT_3;
use super::layout::{jittered, Candidate, LayoutMode, LayoutParams, Placement, PlacementCtx};
use crate::hive::feed::Origin;

/// Reference radius the pixel constants below were tuned at.
const REFERENCE_RADIUS: f32 = 180.0;
const SEAM: f32 = 8.0;
const JITTER_X: f32 = 4.0;
const JITTER_Y: f32 = 3.0;
/// Outer rows keep `THIN_START - THIN_STEP·|row|` of their cells.
const THIN_START: f32 = 0.8;
const THIN_STEP: f32 = 0.1;
const THIN_FLOOR: f32 = 0.2;

/// Staggered rows filled outward from the center row, with per-cell jitter
/// and sparser outer rows.
pub struct ScatterPlacement;

struct RowGrid {
    pitch_x: f32,
    pitch_y: f32,
    jitter: Vec2,
}

impl RowGrid {
    fn new(ctx: &PlacementCtx) -> Self {
        let scale = ctx.base_radius / REFERENCE_RADIUS;
        let jitter = Vec2::new(JITTER_X, JITTER_Y) * scale;
        let max_radius = ctx.base_radius * (1.0 + ctx.params.jitter_fraction());
        let reach = 2.0 * max_radius + ctx.params.gap.max(0.0);
        // Wide enough that jittered neighbors in a row, and in adjacent
        // half-offset rows, still clear `reach`.
        let pitch_x = reach + 2.0 * jitter.x + SEAM * scale;
        let pitch_y = pitch_x * SQRT_3 / 2.0 + 2.0 * jitter.y;
        Self {
            pitch_x,
            pitch_y,
            jitter,
        }
    }

    fn cell(&self, row: i32, col: i32) -> Vec2 {
        let stagger = if row.rem_euclid(2) == 1 { 0.5 } else { 0.0 };
        Vec2::new(
            (col as f32 + stagger) * self.pitch_x,
            row as f32 * self.pitch_y,
        )
    }

    fn jitter<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        let mut axis = |bound: f32| {
            if bound > 0.0 {
                rng.gen_range(-bound..=bound)
            } else {
                0.0
            }
        };
        Vec2::new(axis(self.jitter.x), axis(self.jitter.y))
    }
}

fn row_order(max_row: i32) -> impl Iterator<Item = i32> {
    std::iter::once(0).chain((1..=max_row).flat_map(|k| [-k, k]))
}

fn keep_fraction(row: i32) -> f32 {
    if row == 0 {
        1.0
    } else {
        (THIN_START - THIN_STEP * row.unsigned_abs() as f32).max(THIN_FLOOR)
    }
}

impl Placement for ScatterPlacement {
    fn mode(&self) -> LayoutMode {
        LayoutMode::Scatter
    }

    fn base_radius(&self, size: f32, _params: &LayoutParams) -> f32 {
        size
    }

    fn candidates<R: Rng + ?Sized>(&self, ctx: &PlacementCtx, rng: &mut R) -> Vec<Candidate> {
        let grid = RowGrid::new(ctx);
        let cols = ((ctx.limit as f32).sqrt() * 1.6).ceil().max(4.0) as i32;
        let mut out = Vec::with_capacity(ctx.limit);

        for row in row_order(ctx.params.max_ring as i32) {
            let row_cols = (cols - row.abs() / 2).max(1);
            let first = -(row_cols / 2);
            let keep = keep_fraction(row);
            for col in first..first + row_cols {
                if out.len() >= ctx.limit {
                    return out;
                }
                if rng.gen::<f32>() >= keep {
                    continue;
                }
                out.push(Candidate {
                    axial: None,
                    pixel: grid.cell(row, col) + grid.jitter(rng),
                    radius: jittered(ctx.base_radius, ctx.params.jitter_fraction(), rng),
                    origin: Origin::Core {
                        row: row.unsigned_abs(),
                    },
                });
            }
        }
        out
    }

    fn branch_candidates<R: Rng + ?Sized>(
        &self,
        ctx: &PlacementCtx,
        core: &[Candidate],
        rng: &mut R,
    ) -> Vec<Candidate> {
        if core.is_empty() {
            return Vec::new();
        }
        let grid = RowGrid::new(ctx);
        let mut by_x: Vec<&Candidate> = core.iter().collect();
        by_x.sort_by(|a, b| a.pixel.x.total_cmp(&b.pixel.x));
        let handful = by_x.len().min(3);
        let left = &by_x[..handful];
        let right = &by_x[by_x.len() - handful..];

        let radius = ctx.base_radius * ctx.params.branch_factor();
        let mut out = Vec::new();
        for _ in 0..ctx.params.branch_attempts {
            let (side, anchors) = if rng.gen_bool(0.5) {
                (-1.0, left)
            } else {
                (1.0, right)
            };
            let anchor = anchors[rng.gen_range(0..anchors.len())];
            let steps = rng.gen_range(1..=2) as f32;
            let drift = rng.gen_range(-0.5..=0.5) * grid.pitch_y;
            out.push(Candidate {
                axial: None,
                pixel: anchor.pixel + Vec2::new(side * steps * grid.pitch_x, drift),
                radius: jittered(radius, ctx.params.jitter_fraction(), rng),
                origin: Origin::Branch,
            });
        }
        out
    }
}
