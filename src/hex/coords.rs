use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};

use glam::Vec2;

pub const SQRT_3: f32 = 1.732_050_8;

/// Axial coordinate on a pointy-top hex grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Axial {
    pub q: i32,
    pub r: i32,
}

/// The six unit steps of the grid, in the order the spiral walks ring sides.
pub const DIRECTIONS: [Axial; 6] = [
    Axial { q: 1, r: 0 },
    Axial { q: 1, r: -1 },
    Axial { q: 0, r: -1 },
    Axial { q: -1, r: 0 },
    Axial { q: -1, r: 1 },
    Axial { q: 0, r: 1 },
];

impl Axial {
    pub const ZERO: Axial = Axial { q: 0, r: 0 };

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub fn offset(self, dir: Axial, steps: i32) -> Self {
        Self::new(self.q + dir.q * steps, self.r + dir.r * steps)
    }

    pub fn neighbor(self, dir: usize) -> Self {
        self.offset(DIRECTIONS[dir % 6], 1)
    }

    /// Hex distance from the origin, i.e. the ring this coordinate lies on.
    pub fn ring(self) -> u32 {
        ((self.q.abs() + self.r.abs() + (self.q + self.r).abs()) / 2) as u32
    }
}

/// Pixel center of `hex` for a pointy-top grid of hex size `size`.
pub fn axial_to_pixel(hex: Axial, size: f32) -> Vec2 {
    let q = hex.q as f32;
    let r = hex.r as f32;
    Vec2::new(size * SQRT_3 * (q + r / 2.0), size * 1.5 * r)
}

/// Six polygon vertices around the origin, vertex 0 pointing straight up.
/// The path closes implicitly from vertex 5 back to vertex 0.
pub fn hex_vertices(radius: f32) -> [Vec2; 6] {
    std::array::from_fn(|i| {
        let angle = FRAC_PI_3 * i as f32 - FRAC_PI_2;
        Vec2::new(radius * angle.cos(), radius * angle.sin())
    })
}

/// Clip boundary for image content: the same hexagon shrunk by `margin`
/// (a fraction of the radius, e.g. 0.03).
pub fn inset_vertices(radius: f32, margin: f32) -> [Vec2; 6] {
    hex_vertices(radius * (1.0 - margin.clamp(0.0, 1.0)))
}

/// Whether `point` lies inside the pointy-top hexagon at `center`.
pub fn hex_contains(center: Vec2, radius: f32, point: Vec2) -> bool {
    let d = (point - center).abs();
    d.x <= radius * SQRT_3 / 2.0 && d.x / SQRT_3 + d.y <= radius
}

/// Cells in rings `0..=max_ring`: `1 + 3k(k + 1)`, saturating.
pub fn ring_capacity(max_ring: u32) -> usize {
    let k = max_ring as usize;
    k.saturating_mul(k.saturating_add(1))
        .saturating_mul(3)
        .saturating_add(1)
}

/// Coordinates in spiral ring order outward from the origin.
///
/// Ring 0 is the origin; ring k walks six sides of k steps each. Stops once
/// `limit` coordinates were produced or ring `max_ring` is complete.
pub fn spiral(limit: usize, max_ring: u32) -> Vec<Axial> {
    let mut out = Vec::with_capacity(limit.min(ring_capacity(max_ring)));
    if limit == 0 {
        return out;
    }
    out.push(Axial::ZERO);

    for k in 1..=max_ring {
        let mut hex = Axial::ZERO.offset(DIRECTIONS[4], k as i32);
        for side in 0..6 {
            for _ in 0..k {
                if out.len() >= limit {
                    return out;
                }
                out.push(hex);
                hex = hex.neighbor(side);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_axial_to_pixel_origin() {
        assert_eq!(axial_to_pixel(Axial::ZERO, 180.0), Vec2::ZERO);
    }

    #[test]
    fn test_axial_to_pixel_formula() {
        let p = axial_to_pixel(Axial::new(1, 2), 10.0);
        assert!((p.x - 10.0 * SQRT_3 * 2.0).abs() < 1e-4);
        assert!((p.y - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_axial_to_pixel_deterministic() {
        for q in -4..=4 {
            for r in -4..=4 {
                let a = axial_to_pixel(Axial::new(q, r), 37.5);
                let b = axial_to_pixel(Axial::new(q, r), 37.5);
                assert_eq!(a.x.to_bits(), b.x.to_bits());
                assert_eq!(a.y.to_bits(), b.y.to_bits());
            }
        }
    }

    #[test]
    fn test_neighbors_are_equidistant() {
        let size = 20.0;
        for dir in 0..6 {
            let p = axial_to_pixel(Axial::ZERO.neighbor(dir), size);
            assert!((p.length() - size * SQRT_3).abs() < 1e-3, "dir {dir}: {p}");
        }
    }

    #[test]
    fn test_hex_vertices_pointy_top() {
        let v = hex_vertices(100.0);
        assert!(v[0].x.abs() < 1e-4);
        assert!((v[0].y + 100.0).abs() < 1e-4);
        assert!((v[3].y - 100.0).abs() < 1e-4);
        for p in v {
            assert!((p.length() - 100.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_inset_vertices_shrink() {
        let outer = hex_vertices(100.0);
        let inner = inset_vertices(100.0, 0.03);
        for (o, i) in outer.iter().zip(inner.iter()) {
            assert!((i.length() - 97.0).abs() < 1e-3);
            assert!((o.normalize() - i.normalize()).length() < 1e-5);
        }
    }

    #[test]
    fn test_hex_contains() {
        let c = Vec2::new(50.0, 50.0);
        assert!(hex_contains(c, 10.0, c));
        assert!(hex_contains(c, 10.0, c + Vec2::new(0.0, 9.9)));
        assert!(!hex_contains(c, 10.0, c + Vec2::new(0.0, 10.1)));
        // Side edge sits at r·√3/2 horizontally.
        assert!(hex_contains(c, 10.0, c + Vec2::new(8.6, 0.0)));
        assert!(!hex_contains(c, 10.0, c + Vec2::new(8.7, 0.0)));
        // Just outside the slanted edge near a corner.
        assert!(!hex_contains(c, 10.0, c + Vec2::new(6.0, 7.0)));
    }

    #[test]
    fn test_spiral_ring_sizes() {
        let coords = spiral(usize::MAX, 3);
        assert_eq!(coords.len(), 1 + 6 + 12 + 18);
        assert_eq!(coords[0], Axial::ZERO);
        for (i, hex) in coords.iter().enumerate() {
            let expected_ring = match i {
                0 => 0,
                1..=6 => 1,
                7..=18 => 2,
                _ => 3,
            };
            assert_eq!(hex.ring(), expected_ring, "coord {i}: {hex:?}");
        }
    }

    #[test]
    fn test_spiral_unique_and_limited() {
        let coords = spiral(45, 10);
        assert_eq!(coords.len(), 45);
        let unique: HashSet<Axial> = coords.iter().copied().collect();
        assert_eq!(unique.len(), 45);
    }

    #[test]
    fn test_ring_capacity() {
        assert_eq!(ring_capacity(0), 1);
        assert_eq!(ring_capacity(3), 37);
        assert_eq!(spiral(usize::MAX, 12).len(), ring_capacity(12));
        assert_eq!(ring_capacity(u32::MAX), usize::MAX);
    }

    #[test]
    fn test_spiral_ring_bound() {
        assert_eq!(spiral(1000, 0), vec![Axial::ZERO]);
        assert!(spiral(0, 5).is_empty());
    }
}
