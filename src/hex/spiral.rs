use std::collections::HashSet;

use rand::Rng;

use super::coords::{axial_to_pixel, spiral, Axial, DIRECTIONS};
use super::layout::{jittered, Candidate, LayoutMode, LayoutParams, Placement, PlacementCtx};
use crate::hive::feed::Origin;

/// Ring-by-ring walk of the hex grid; pixel positions are exact grid points.
pub struct SpiralPlacement;

impl SpiralPlacement {
    fn pitch(ctx: &PlacementCtx) -> f32 {
        ctx.size * ctx.params.spacing.max(1.0)
    }
}

impl Placement for SpiralPlacement {
    fn mode(&self) -> LayoutMode {
        LayoutMode::Spiral
    }

    fn base_radius(&self, size: f32, params: &LayoutParams) -> f32 {
        size * params.fill_fraction()
    }

    fn candidates<R: Rng + ?Sized>(&self, ctx: &PlacementCtx, rng: &mut R) -> Vec<Candidate> {
        let pitch = Self::pitch(ctx);
        spiral(ctx.limit, ctx.params.max_ring)
            .into_iter()
            .map(|hex| Candidate {
                axial: Some(hex),
                pixel: axial_to_pixel(hex, pitch),
                radius: jittered(ctx.base_radius, ctx.params.jitter_fraction(), rng),
                origin: Origin::Core { row: hex.ring() },
            })
            .collect()
    }

    fn branch_candidates<R: Rng + ?Sized>(
        &self,
        ctx: &PlacementCtx,
        core: &[Candidate],
        rng: &mut R,
    ) -> Vec<Candidate> {
        let occupied: HashSet<Axial> = core.iter().filter_map(|c| c.axial).collect();
        let Some(outer) = occupied.iter().map(|h| h.ring()).max() else {
            return Vec::new();
        };
        let anchors: Vec<Axial> = core
            .iter()
            .filter_map(|c| c.axial)
            .filter(|h| h.ring() == outer)
            .collect();

        let pitch = Self::pitch(ctx);
        let radius = ctx.base_radius * ctx.params.branch_factor();
        let mut out = Vec::new();
        for _ in 0..ctx.params.branch_attempts {
            let anchor = anchors[rng.gen_range(0..anchors.len())];
            let outward: Vec<Axial> = DIRECTIONS
                .iter()
                .copied()
                .filter(|&d| anchor.offset(d, 1).ring() > anchor.ring())
                .collect();
            let dir = outward[rng.gen_range(0..outward.len())];
            let hex = anchor.offset(dir, rng.gen_range(1..=2));
            if occupied.contains(&hex) {
                continue;
            }
            out.push(Candidate {
                axial: Some(hex),
                pixel: axial_to_pixel(hex, pitch),
                radius: jittered(radius, ctx.params.jitter_fraction(), rng),
                origin: Origin::Branch,
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ctx(params: &LayoutParams, limit: usize) -> PlacementCtx<'_> {
        PlacementCtx {
            params,
            size: 100.0,
            base_radius: 84.0,
            limit,
        }
    }

    #[test]
    fn test_candidates_follow_spiral() {
        let params = LayoutParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let c = SpiralPlacement.candidates(&ctx(&params, 7), &mut rng);
        assert_eq!(c.len(), 7);
        assert_eq!(c[0].axial, Some(Axial::ZERO));
        assert_eq!(c[0].origin, Origin::Core { row: 0 });
        assert!(c[1..].iter().all(|c| c.origin == Origin::Core { row: 1 }));
    }

    #[test]
    fn test_branches_step_outward_into_free_cells() {
        let params = LayoutParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let ctx = ctx(&params, 7);
        let core = SpiralPlacement.candidates(&ctx, &mut rng);
        let branches = SpiralPlacement.branch_candidates(&ctx, &core, &mut rng);
        assert!(!branches.is_empty());
        for b in &branches {
            let hex = b.axial.expect("branch on grid");
            assert!(hex.ring() == 2 || hex.ring() == 3, "{hex:?}");
            assert_eq!(b.origin, Origin::Branch);
            assert!(b.radius < 84.0);
        }
    }

    #[test]
    fn test_no_branches_without_core() {
        let params = LayoutParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(SpiralPlacement
            .branch_candidates(&ctx(&params, 0), &[], &mut rng)
            .is_empty());
    }
}
