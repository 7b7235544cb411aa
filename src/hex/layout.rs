use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::coords::{ring_capacity, Axial};
use super::scatter::ScatterPlacement;
use super::spiral::SpiralPlacement;
use super::tile::{Tile, TileId};
use crate::hive::feed::{MetaFeed, Origin};

/// Which candidate generator feeds the packer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Hex-grid spiral outward from the origin.
    #[default]
    Spiral,
    /// Jittered rows with outer rows thinned out.
    Scatter,
}

impl LayoutMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Spiral => Self::Scatter,
            Self::Scatter => Self::Spiral,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Spiral => "Spiral",
            Self::Scatter => "Scatter",
        }
    }
}

/// Pixel size of the area the hive is laid out in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Used whenever the host reports no usable size.
    pub const NOMINAL: Viewport = Viewport {
        width: 1600.0,
        height: 1200.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }

    pub fn or_nominal(self) -> Self {
        if self.is_degenerate() {
            Self::NOMINAL
        } else {
            self
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn min_side(&self) -> f32 {
        self.width.min(self.height)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    pub mode: LayoutMode,
    pub min_count: usize,
    pub max_count: usize,
    /// Bounds on the lattice size derived from the viewport.
    pub min_radius: f32,
    pub max_radius: f32,
    /// Lattice size as a fraction of the viewport's smaller side.
    pub radius_fraction: f32,
    /// Spiral tile radius as a fraction of the lattice size.
    pub fill: f32,
    /// Per-tile radius variation, as a fraction of the base radius.
    pub radius_jitter: f32,
    /// Multiplier (> 1) on grid spacing so neighbors keep a visible seam.
    pub spacing: f32,
    /// Nominal clearance between tile circles, in pixels.
    pub gap: f32,
    pub relax_step: f32,
    pub relax_passes: u32,
    /// Candidates requested per target tile.
    pub oversample: usize,
    pub max_ring: u32,
    pub branch_count: usize,
    pub branch_radius_factor: f32,
    pub branch_attempts: usize,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            mode: LayoutMode::Spiral,
            min_count: 10,
            max_count: 15,
            min_radius: 60.0,
            max_radius: 220.0,
            radius_fraction: 1.0 / 6.0,
            fill: 0.84,
            radius_jitter: 0.03,
            spacing: 1.08,
            gap: 10.0,
            relax_step: 4.0,
            relax_passes: 3,
            oversample: 3,
            max_ring: 12,
            branch_count: 3,
            branch_radius_factor: 0.92,
            branch_attempts: 24,
        }
    }
}

impl LayoutParams {
    /// `(min, max)` with `min <= max` even if the params are inverted.
    pub fn count_bounds(&self) -> (usize, usize) {
        let max = self.max_count.max(self.min_count);
        (self.min_count.min(max), max)
    }

    /// Radius jitter actually applied: clamped to `[0, 0.5]`, zero if not finite.
    pub fn jitter_fraction(&self) -> f32 {
        if self.radius_jitter.is_finite() {
            self.radius_jitter.clamp(0.0, 0.5)
        } else {
            0.0
        }
    }

    /// Spiral tile radius as a fraction of the lattice size, in `[0.05, 1]`.
    pub fn fill_fraction(&self) -> f32 {
        if self.fill.is_finite() {
            self.fill.clamp(0.05, 1.0)
        } else {
            1.0
        }
    }

    /// Branch radius as a fraction of the core radius, in `[0.1, 1]`.
    pub fn branch_factor(&self) -> f32 {
        if self.branch_radius_factor.is_finite() {
            self.branch_radius_factor.clamp(0.1, 1.0)
        } else {
            1.0
        }
    }

    /// Lattice size for `viewport`, clamped to the radius bounds. The bounds
    /// apply to this size; tile radii are derived from it (see `RadiusWindow`).
    pub fn lattice_size(&self, viewport: Viewport) -> f32 {
        let lo = self.min_radius.max(1.0);
        let hi = self.max_radius.max(lo);
        (viewport.or_nominal().min_side() * self.radius_fraction).clamp(lo, hi)
    }
}

/// Closed range every tile radius of a layout falls in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadiusWindow {
    pub min: f32,
    pub max: f32,
}

impl RadiusWindow {
    pub fn contains(&self, radius: f32) -> bool {
        radius >= self.min - 1e-3 && radius <= self.max + 1e-3
    }
}

/// A potential tile center proposed by a [`Placement`].
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub axial: Option<Axial>,
    pub pixel: Vec2,
    pub radius: f32,
    pub origin: Origin,
}

/// Inputs shared by both candidate generators.
pub struct PlacementCtx<'a> {
    pub params: &'a LayoutParams,
    pub size: f32,
    pub base_radius: f32,
    /// How many core candidates to produce.
    pub limit: usize,
}

/// Candidate generator behind the packer. Both modes share acceptance,
/// relaxation and output schema; only where candidates come from differs.
pub trait Placement {
    fn mode(&self) -> LayoutMode;

    /// Unjittered core tile radius for lattice size `size`.
    fn base_radius(&self, size: f32, params: &LayoutParams) -> f32;

    /// Core candidates in acceptance-priority order.
    fn candidates<R: Rng + ?Sized>(&self, ctx: &PlacementCtx, rng: &mut R) -> Vec<Candidate>;

    /// Limb candidates grown from the accepted core.
    fn branch_candidates<R: Rng + ?Sized>(
        &self,
        ctx: &PlacementCtx,
        core: &[Candidate],
        rng: &mut R,
    ) -> Vec<Candidate>;
}

/// Radius varied by up to `fraction` either way.
pub(crate) fn jittered<R: Rng + ?Sized>(base: f32, fraction: f32, rng: &mut R) -> f32 {
    if !(fraction > 0.0) {
        return base;
    }
    let fraction = fraction.min(0.5);
    base * (1.0 + rng.gen_range(-fraction..=fraction))
}

/// Accepted candidates plus the gap currently enforced between them.
struct Packer {
    accepted: Vec<Candidate>,
    gap: f32,
}

impl Packer {
    fn new(gap: f32) -> Self {
        Self {
            accepted: Vec::new(),
            gap: gap.max(0.0),
        }
    }

    fn fits(&self, c: &Candidate) -> bool {
        self.accepted
            .iter()
            .all(|a| a.pixel.distance(c.pixel) >= a.radius + c.radius + self.gap)
    }

    fn try_accept(&mut self, c: &Candidate) -> bool {
        if c.radius > 0.0 && self.fits(c) {
            self.accepted.push(c.clone());
            true
        } else {
            false
        }
    }

    fn len(&self) -> usize {
        self.accepted.len()
    }
}

/// One generated batch.
#[derive(Clone, Debug)]
pub struct Layout {
    pub tiles: Vec<Tile>,
    pub mode: LayoutMode,
    /// Lattice size the batch was generated at.
    pub size: f32,
    /// Gap in force at the end of generation; every pair of tiles clears it.
    pub gap: f32,
    pub radius_window: RadiusWindow,
    /// Core tile count aimed for before branches.
    pub core_target: usize,
    /// Relaxation passes that were needed.
    pub relax_passes: u32,
}

impl Layout {
    pub fn empty() -> Self {
        Self {
            tiles: Vec::new(),
            mode: LayoutMode::default(),
            size: 0.0,
            gap: 0.0,
            radius_window: RadiusWindow { min: 0.0, max: 0.0 },
            core_target: 0,
            relax_passes: 0,
        }
    }

    pub fn get(&self, id: &TileId) -> Option<&Tile> {
        self.tiles.iter().find(|t| &t.id == id)
    }

    /// Bounding box of all tile polygons as `(min, max)`.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        let mut iter = self.tiles.iter();
        let first = iter.next()?;
        let r = Vec2::splat(first.radius);
        let init = (first.pixel - r, first.pixel + r);
        Some(iter.fold(init, |(lo, hi), t| {
            let r = Vec2::splat(t.radius);
            (lo.min(t.pixel - r), hi.max(t.pixel + r))
        }))
    }
}

/// First pair of tiles closer than the non-overlap rule allows for `gap`.
pub fn first_overlap(tiles: &[Tile], gap: f32) -> Option<(usize, usize)> {
    for i in 0..tiles.len() {
        for j in (i + 1)..tiles.len() {
            let d = tiles[i].pixel.distance(tiles[j].pixel);
            // Small epsilon for f32 rounding in the distance itself.
            if d + 1e-3 < tiles[i].required_distance(&tiles[j], gap) {
                return Some((i, j));
            }
        }
    }
    None
}

/// Generate a tile batch for `viewport` with the strategy `params.mode` selects.
pub fn generate<R: Rng + ?Sized>(
    viewport: Viewport,
    params: &LayoutParams,
    feed: &MetaFeed,
    rng: &mut R,
) -> Layout {
    match params.mode {
        LayoutMode::Spiral => generate_with(&SpiralPlacement, viewport, params, feed, rng),
        LayoutMode::Scatter => generate_with(&ScatterPlacement, viewport, params, feed, rng),
    }
}

pub fn generate_with<P: Placement, R: Rng + ?Sized>(
    placement: &P,
    viewport: Viewport,
    params: &LayoutParams,
    feed: &MetaFeed,
    rng: &mut R,
) -> Layout {
    let size = params.lattice_size(viewport);
    let base_radius = placement.base_radius(size, params);
    let jitter = params.jitter_fraction();
    let radius_window = RadiusWindow {
        min: base_radius * params.branch_factor() * (1.0 - jitter),
        max: base_radius * (1.0 + jitter),
    };

    let (min_count, max_count) = params.count_bounds();
    let core_max = max_count
        .saturating_sub(params.branch_count)
        .max(min_count)
        .min(max_count);
    let core_target = rng.gen_range(min_count..=core_max);

    let ctx = PlacementCtx {
        params,
        size,
        base_radius,
        limit: core_target
            .saturating_mul(params.oversample.max(1))
            .min(ring_capacity(params.max_ring)),
    };

    let mut packer = Packer::new(params.gap);
    let mut rejected = Vec::new();
    for c in placement.candidates(&ctx, rng) {
        if packer.len() >= core_target {
            break;
        }
        if !packer.try_accept(&c) {
            rejected.push(c);
        }
    }

    let mut relax_passes = 0;
    while packer.len() < min_count && relax_passes < params.relax_passes && packer.gap > 0.0 {
        relax_passes += 1;
        packer.gap = (packer.gap - params.relax_step.max(0.0)).max(0.0);
        rejected.retain(|c| packer.len() >= core_target || !packer.try_accept(c));
    }

    let quota = params
        .branch_count
        .min(max_count.saturating_sub(packer.len()));
    if quota > 0 && packer.len() > 0 {
        let core = packer.accepted.clone();
        let mut added = 0;
        for c in placement.branch_candidates(&ctx, &core, rng) {
            if added >= quota {
                break;
            }
            if packer.try_accept(&c) {
                added += 1;
            }
        }
    }

    let tiles: Vec<Tile> = packer
        .accepted
        .iter()
        .enumerate()
        .map(|(i, c)| Tile {
            id: TileId::from_index(i),
            axial: c.axial,
            pixel: c.pixel,
            radius: c.radius,
            meta: feed.meta_for(i, c.origin, rng),
        })
        .collect();

    if tiles.len() < min_count {
        log::warn!(
            "hive layout under target: {} of {} tiles after {} relax passes",
            tiles.len(),
            min_count,
            relax_passes
        );
    }
    log::info!(
        "hive layout: {} tiles ({}, core target {}, size {:.1}, gap {:.1}, {} relax passes)",
        tiles.len(),
        placement.mode().display_name(),
        core_target,
        size,
        packer.gap,
        relax_passes
    );

    Layout {
        tiles,
        mode: placement.mode(),
        size,
        gap: packer.gap,
        radius_window,
        core_target,
        relax_passes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn layout(mode: LayoutMode, viewport: Viewport, seed: u64) -> Layout {
        let params = LayoutParams {
            mode,
            ..LayoutParams::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        generate(viewport, &params, &MetaFeed::mock(), &mut rng)
    }

    fn assert_valid(layout: &Layout, min: usize, max: usize) {
        let n = layout.tiles.len();
        assert!(n >= min && n <= max, "{:?}: {n} tiles", layout.mode);
        assert_eq!(first_overlap(&layout.tiles, layout.gap), None);
        let ids: HashSet<&TileId> = layout.tiles.iter().map(|t| &t.id).collect();
        assert_eq!(ids.len(), n);
        for t in &layout.tiles {
            assert!(t.radius > 0.0);
            assert!(layout.radius_window.contains(t.radius), "{} radius {}", t.id, t.radius);
        }
    }

    #[test]
    fn test_full_hd_spiral_scenario() {
        let l = layout(LayoutMode::Spiral, Viewport::new(1920.0, 1080.0), 42);
        assert!((l.size - 180.0).abs() < 1e-3);
        assert_valid(&l, 10, 15);
        assert_eq!(l.tiles[0].id.as_str(), "hex-0");
        assert_eq!(l.tiles[0].axial, Some(Axial::ZERO));
    }

    #[test]
    fn test_full_hd_scatter_scenario() {
        let l = layout(LayoutMode::Scatter, Viewport::new(1920.0, 1080.0), 42);
        assert_valid(&l, 10, 15);
        assert!(l.tiles.iter().all(|t| t.axial.is_none()));
    }

    #[test]
    fn test_many_seeds_both_modes() {
        for seed in 0..40 {
            for mode in [LayoutMode::Spiral, LayoutMode::Scatter] {
                let l = layout(mode, Viewport::new(1920.0, 1080.0), seed);
                assert_valid(&l, 10, 15);
            }
        }
    }

    #[test]
    fn test_same_seed_same_batch() {
        let a = layout(LayoutMode::Spiral, Viewport::new(1920.0, 1080.0), 9);
        let b = layout(LayoutMode::Spiral, Viewport::new(1920.0, 1080.0), 9);
        assert_eq!(a.tiles.len(), b.tiles.len());
        assert_eq!(a.tiles, b.tiles);
    }

    #[test]
    fn test_pixel_derived_from_axial() {
        let l = layout(LayoutMode::Spiral, Viewport::new(1920.0, 1080.0), 5);
        let params = LayoutParams::default();
        for t in &l.tiles {
            let hex = t.axial.expect("spiral tiles carry axial coords");
            let expected = super::super::coords::axial_to_pixel(hex, l.size * params.spacing);
            assert_eq!(t.pixel, expected);
        }
    }

    #[test]
    fn test_branches_extend_the_core() {
        for seed in 0..10 {
            let l = layout(LayoutMode::Spiral, Viewport::new(1920.0, 1080.0), seed);
            let params = LayoutParams::default();
            assert_eq!(l.tiles.len(), l.core_target + params.branch_count);
            let core_ring = l.tiles[..l.core_target]
                .iter()
                .filter_map(|t| t.axial)
                .map(Axial::ring)
                .max()
                .unwrap_or(0);
            let base = l.size * params.fill;
            for t in &l.tiles[l.core_target..] {
                assert!(t.radius < base * 0.96, "branch {} radius {}", t.id, t.radius);
                assert!(t.axial.map(Axial::ring).unwrap_or(0) >= core_ring);
            }
        }
    }

    #[test]
    fn test_degenerate_viewport_uses_nominal() {
        for vp in [
            Viewport::new(0.0, 0.0),
            Viewport::new(-5.0, 300.0),
            Viewport::new(f32::NAN, 900.0),
        ] {
            let l = layout(LayoutMode::Spiral, vp, 1);
            assert!((l.size - 200.0).abs() < 1e-3);
            assert_valid(&l, 10, 15);
        }
    }

    #[test]
    fn test_size_clamped_to_radius_bounds() {
        let params = LayoutParams::default();
        assert_eq!(params.lattice_size(Viewport::new(8000.0, 6000.0)), 220.0);
        assert_eq!(params.lattice_size(Viewport::new(200.0, 100.0)), 60.0);
    }

    #[test]
    fn test_small_viewport_relaxes_gap() {
        let l = layout(LayoutMode::Spiral, Viewport::new(400.0, 300.0), 3);
        assert_eq!(l.size, 60.0);
        assert_valid(&l, 10, 15);
        assert!(l.gap <= 10.0);
    }

    #[test]
    fn test_relaxation_recovers_min_count() {
        let params = LayoutParams {
            min_count: 15,
            max_count: 15,
            radius_jitter: 0.0,
            gap: 40.0,
            relax_step: 10.0,
            relax_passes: 3,
            oversample: 1,
            branch_count: 0,
            ..LayoutParams::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let l = generate(Viewport::new(1920.0, 1080.0), &params, &MetaFeed::mock(), &mut rng);
        assert_eq!(l.tiles.len(), 15);
        assert_eq!(l.relax_passes, 1);
        assert_eq!(l.gap, 30.0);
        assert_eq!(first_overlap(&l.tiles, l.gap), None);
    }

    #[test]
    fn test_pathological_gap_returns_partial_batch() {
        let params = LayoutParams {
            gap: 5000.0,
            relax_step: 1.0,
            relax_passes: 2,
            ..LayoutParams::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let l = generate(Viewport::new(1920.0, 1080.0), &params, &MetaFeed::mock(), &mut rng);
        assert!(l.tiles.len() < params.min_count);
        assert!(!l.tiles.is_empty());
        assert_eq!(l.relax_passes, 2);
        assert_eq!(first_overlap(&l.tiles, l.gap), None);
    }

    #[test]
    fn test_never_above_max_count() {
        let params = LayoutParams {
            min_count: 3,
            max_count: 4,
            branch_count: 6,
            ..LayoutParams::default()
        };
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let l = generate(Viewport::new(1280.0, 800.0), &params, &MetaFeed::mock(), &mut rng);
            assert!(l.tiles.len() >= 3 && l.tiles.len() <= 4, "{}", l.tiles.len());
        }
    }

    #[test]
    fn test_inverted_bounds_are_normalized() {
        let params = LayoutParams {
            min_count: 12,
            max_count: 8,
            ..LayoutParams::default()
        };
        assert_eq!(params.count_bounds(), (12, 12));
    }

    #[test]
    fn test_huge_oversample_is_capped() {
        for mode in [LayoutMode::Spiral, LayoutMode::Scatter] {
            let params = LayoutParams {
                mode,
                oversample: usize::MAX,
                ..LayoutParams::default()
            };
            let mut rng = ChaCha8Rng::seed_from_u64(8);
            let l = generate(Viewport::new(1920.0, 1080.0), &params, &MetaFeed::mock(), &mut rng);
            assert_valid(&l, 10, 15);
        }
    }

    #[test]
    fn test_non_finite_jitter_falls_back_to_none() {
        for mode in [LayoutMode::Spiral, LayoutMode::Scatter] {
            let params = LayoutParams {
                mode,
                radius_jitter: f32::NAN,
                branch_radius_factor: f32::NAN,
                ..LayoutParams::default()
            };
            assert_eq!(params.jitter_fraction(), 0.0);
            let mut rng = ChaCha8Rng::seed_from_u64(2);
            let l = generate(Viewport::new(1920.0, 1080.0), &params, &MetaFeed::mock(), &mut rng);
            assert_valid(&l, 10, 15);
        }
    }

    #[test]
    fn test_oversized_jitter_stays_in_window() {
        for mode in [LayoutMode::Spiral, LayoutMode::Scatter] {
            let params = LayoutParams {
                mode,
                radius_jitter: 3.0,
                ..LayoutParams::default()
            };
            assert_eq!(params.jitter_fraction(), 0.5);
            let mut rng = ChaCha8Rng::seed_from_u64(6);
            let l = generate(Viewport::new(1920.0, 1080.0), &params, &MetaFeed::mock(), &mut rng);
            assert!(!l.tiles.is_empty());
            assert_valid(&l, 1, 15);
            assert!((l.radius_window.max / l.radius_window.min - 1.5 / (0.5 * 0.92)).abs() < 1e-3);
        }
    }

    #[test]
    fn test_tile_radii_follow_lattice_size() {
        // Radius bounds clamp the lattice size; tiles scale from it.
        let l = layout(LayoutMode::Spiral, Viewport::new(400.0, 300.0), 11);
        assert_eq!(l.size, 60.0);
        let params = LayoutParams::default();
        let base = 60.0 * params.fill;
        assert!((l.radius_window.max - base * (1.0 + params.radius_jitter)).abs() < 1e-3);
        assert!(l.tiles.iter().all(|t| l.radius_window.contains(t.radius)));
        assert!(l.tiles.iter().all(|t| t.radius < params.min_radius));
    }

    #[test]
    fn test_first_overlap_detects_pair() {
        let l = layout(LayoutMode::Spiral, Viewport::new(1920.0, 1080.0), 1);
        let mut tiles = l.tiles.clone();
        tiles[1].pixel = tiles[0].pixel + Vec2::new(1.0, 0.0);
        assert_eq!(first_overlap(&tiles, 0.0), Some((0, 1)));
    }

    #[test]
    fn test_bounds_cover_all_tiles() {
        let l = layout(LayoutMode::Scatter, Viewport::new(1920.0, 1080.0), 4);
        let (lo, hi) = l.bounds().expect("non-empty layout");
        for t in &l.tiles {
            assert!(t.pixel.x - t.radius >= lo.x - 1e-3 && t.pixel.x + t.radius <= hi.x + 1e-3);
            assert!(t.pixel.y - t.radius >= lo.y - 1e-3 && t.pixel.y + t.radius <= hi.y + 1e-3);
        }
        assert!(Layout::empty().bounds().is_none());
    }
}
