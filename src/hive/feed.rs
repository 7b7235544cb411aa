use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::hex::tile::TileMeta;

const MOCK_TITLES: [&str; 20] = [
    "Live Coding", "Music Stream", "Gaming Session", "Art Creation", "Tech Talk",
    "Cooking Show", "Fitness Live", "Study Session", "Chat & Chill", "Tutorial",
    "Comedy Show", "News Update", "Travel Vlog", "Book Club", "Workshop",
    "DJ Set", "Podcast", "Interview", "Demo Day", "Q&A Session",
];

/// One entry of the metadata source list. Fields left out are sampled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StreamSeed {
    pub title: String,
    #[serde(default)]
    pub viewers: Option<u32>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl StreamSeed {
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            viewers: None,
            thumbnail: None,
            active: None,
        }
    }
}

/// Viewer count is `base + U[0, spread - row·row_falloff) + U[0, bonus)`,
/// with the middle term never narrower than `min_spread`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewerDistribution {
    pub base: u32,
    pub spread: u32,
    pub row_falloff: u32,
    pub min_spread: u32,
    pub bonus: u32,
    pub popularity_divisor: f32,
    pub active_chance: f64,
}

impl ViewerDistribution {
    pub fn core() -> Self {
        Self {
            base: 50,
            spread: 400,
            row_falloff: 80,
            min_spread: 80,
            bonus: 150,
            popularity_divisor: 5.0,
            active_chance: 0.6,
        }
    }

    pub fn branch() -> Self {
        Self {
            base: 25,
            spread: 200,
            row_falloff: 0,
            min_spread: 200,
            bonus: 100,
            popularity_divisor: 4.0,
            active_chance: 0.5,
        }
    }

    pub fn sample_viewers<R: Rng + ?Sized>(&self, row: u32, rng: &mut R) -> u32 {
        let spread = self
            .spread
            .saturating_sub(row.saturating_mul(self.row_falloff))
            .max(self.min_spread)
            .max(1);
        self.base
            .saturating_add(rng.gen_range(0..spread))
            .saturating_add(rng.gen_range(0..self.bonus.max(1)))
    }

    pub fn popularity(&self, viewers: u32) -> f32 {
        (viewers as f32 / self.popularity_divisor.max(f32::EPSILON)).min(100.0)
    }
}

/// Where in the hive a tile was placed; drives the viewer distribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Ring (spiral) or row distance from the center row (scatter).
    Core { row: u32 },
    Branch,
}

/// Metadata source: cycles through the stream list in acceptance order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaFeed {
    pub streams: Vec<StreamSeed>,
    pub core_viewers: ViewerDistribution,
    pub branch_viewers: ViewerDistribution,
}

impl Default for MetaFeed {
    fn default() -> Self {
        Self::mock()
    }
}

impl MetaFeed {
    /// Stub data source standing in for a live stream directory.
    pub fn mock() -> Self {
        let streams = MOCK_TITLES
            .iter()
            .enumerate()
            .map(|(i, title)| StreamSeed {
                thumbnail: Some(format!("thumb-{i}")),
                ..StreamSeed::titled(title)
            })
            .collect();
        Self {
            streams,
            core_viewers: ViewerDistribution::core(),
            branch_viewers: ViewerDistribution::branch(),
        }
    }

    pub fn meta_for<R: Rng + ?Sized>(&self, index: usize, origin: Origin, rng: &mut R) -> TileMeta {
        let (dist, row) = match origin {
            Origin::Core { row } => (&self.core_viewers, row),
            Origin::Branch => (&self.branch_viewers, 0),
        };
        let seed = if self.streams.is_empty() {
            None
        } else {
            self.streams.get(index % self.streams.len())
        };

        let title = seed
            .map(|s| s.title.clone())
            .unwrap_or_else(|| format!("Stream {}", index + 1));
        let viewers = match seed.and_then(|s| s.viewers) {
            Some(v) => v,
            None => dist.sample_viewers(row, rng),
        };
        let active = match seed.and_then(|s| s.active) {
            Some(a) => a,
            None if dist.active_chance.is_finite() => rng.gen_bool(dist.active_chance.clamp(0.0, 1.0)),
            None => false,
        };

        TileMeta {
            title,
            viewers,
            popularity: dist.popularity(viewers),
            thumbnail: seed.and_then(|s| s.thumbnail.clone()),
            active,
        }
    }
}
