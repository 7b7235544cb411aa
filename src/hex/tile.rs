use std::fmt;

use glam::Vec2;

use super::coords::Axial;

/// Stable tile identifier, `hex-<n>` in acceptance order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub String);

impl TileId {
    pub fn from_index(index: usize) -> Self {
        Self(format!("hex-{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TileId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Stream payload carried by a tile. Layout never reads it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TileMeta {
    pub title: String,
    pub viewers: u32,
    /// 0..=100
    pub popularity: f32,
    /// Key into the host's thumbnail textures.
    pub thumbnail: Option<String>,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub id: TileId,
    /// Grid coordinate; when present `pixel` was derived from it.
    pub axial: Option<Axial>,
    pub pixel: Vec2,
    pub radius: f32,
    pub meta: TileMeta,
}

impl Tile {
    pub fn contains(&self, point: Vec2) -> bool {
        super::coords::hex_contains(self.pixel, self.radius, point)
    }

    /// Minimum center distance to `other` under the non-overlap rule.
    pub fn required_distance(&self, other: &Tile, gap: f32) -> f32 {
        self.radius + other.radius + gap
    }
}
