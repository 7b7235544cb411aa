use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::feed::MetaFeed;
use super::input::{default_bindings, HiveAction, KeyBind};
use crate::hex::layout::{LayoutParams, Viewport};
use crate::interact::controller::InteractionConfig;

/// Upper bounds that keep candidate generation small.
const MAX_OVERSAMPLE: usize = 16;
const MAX_RING: u32 = 64;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HiveConfig {
    /// Fixed RNG seed; a fresh one is drawn (and logged) when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    pub key_bindings: HashMap<HiveAction, KeyBind>,
    #[serde(default)]
    pub layout: LayoutParams,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub feed: MetaFeed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Lay out against this size instead of the window's.
    pub viewport: Option<[f32; 2]>,
    pub show_labels: bool,
    pub show_tooltip: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            viewport: None,
            show_labels: true,
            show_tooltip: true,
        }
    }
}

impl Default for HiveConfig {
    fn default() -> Self {
        Self {
            seed: None,
            key_bindings: default_bindings(),
            layout: LayoutParams::default(),
            interaction: InteractionConfig::default(),
            display: DisplayConfig::default(),
            feed: MetaFeed::default(),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "hivemap")
        .map(|dirs| dirs.config_dir().join("settings.toml"))
}

impl HiveConfig {
    /// Settings file from the platform config dir. A missing file is created
    /// with defaults; a broken one is reported and replaced by defaults.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.save();
                config
            }
            Err(e) => {
                log::warn!("{e}. Using defaults.");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) {
        let Some(path) = config_path() else {
            log::warn!("Could not determine config directory");
            return;
        };
        match self.save_to(&path) {
            Ok(()) => log::info!("Saved config to {}", path.display()),
            Err(e) => log::warn!("{e}"),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(io_err)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let layout = &self.layout;
        if layout.min_count == 0 || layout.min_count > layout.max_count {
            return Err(ConfigError::Invalid(format!(
                "tile counts must satisfy 1 <= min_count <= max_count (got {}..{})",
                layout.min_count, layout.max_count
            )));
        }
        if !(layout.min_radius > 0.0 && layout.min_radius <= layout.max_radius && layout.max_radius.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "radius bounds must satisfy 0 < min_radius <= max_radius (got {}..{})",
                layout.min_radius, layout.max_radius
            )));
        }
        if !(layout.gap >= 0.0 && layout.gap.is_finite() && layout.relax_step >= 0.0 && layout.relax_step.is_finite()) {
            return Err(ConfigError::Invalid("gap and relax_step must be finite and not negative".into()));
        }
        let fractions = [
            ("radius_fraction", layout.radius_fraction, 0.0, 1.0),
            ("fill", layout.fill, 0.0, 1.0),
            ("branch_radius_factor", layout.branch_radius_factor, 0.0, 1.0),
        ];
        for (name, value, lo, hi) in fractions {
            if !(value > lo && value <= hi) {
                return Err(ConfigError::Invalid(format!("{name} must be in ({lo}, {hi}] (got {value})")));
            }
        }
        if !(layout.radius_jitter >= 0.0 && layout.radius_jitter <= 0.5) {
            return Err(ConfigError::Invalid(format!(
                "radius_jitter must be in [0, 0.5] (got {})",
                layout.radius_jitter
            )));
        }
        if !(layout.spacing >= 1.0 && layout.spacing.is_finite()) {
            return Err(ConfigError::Invalid(format!("spacing must be >= 1 (got {})", layout.spacing)));
        }
        if layout.oversample == 0 || layout.oversample > MAX_OVERSAMPLE || layout.max_ring > MAX_RING {
            return Err(ConfigError::Invalid(format!(
                "oversample must be in 1..={MAX_OVERSAMPLE} and max_ring at most {MAX_RING} (got {}, {})",
                layout.oversample, layout.max_ring
            )));
        }
        let timings = &self.interaction;
        let durations = [
            timings.hover_grace,
            timings.hover_in,
            timings.hover_out,
            timings.pulse_up,
            timings.pulse_down,
            timings.entrance,
        ];
        if durations.iter().any(|d| !(*d >= 0.0 && d.is_finite())) {
            return Err(ConfigError::Invalid("interaction timings must be finite and not negative".into()));
        }
        if !(timings.dim_opacity >= 0.0 && timings.dim_opacity <= 1.0)
            || !(timings.pulse_scale > 0.0 && timings.pulse_scale.is_finite())
            || !(timings.entrance_scale > 0.0 && timings.entrance_scale.is_finite())
        {
            return Err(ConfigError::Invalid(
                "dim_opacity must be in [0, 1]; pulse_scale and entrance_scale must be positive".into(),
            ));
        }
        for dist in [&self.feed.core_viewers, &self.feed.branch_viewers] {
            if !(dist.active_chance >= 0.0 && dist.active_chance <= 1.0) || !(dist.popularity_divisor > 0.0) {
                return Err(ConfigError::Invalid(
                    "viewer distributions need active_chance in [0, 1] and a positive popularity_divisor".into(),
                ));
            }
        }
        let extent = self.interaction.scale_extent;
        if !(extent.min > 0.0 && extent.min < extent.max && extent.max.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "scale extent must satisfy 0 < min < max (got {}..{})",
                extent.min, extent.max
            )));
        }
        if self.feed.streams.is_empty() {
            return Err(ConfigError::Invalid("feed needs at least one stream".into()));
        }
        Ok(())
    }

    pub fn viewport_override(&self) -> Option<Viewport> {
        self.display.viewport.map(|[w, h]| Viewport::new(w, h))
    }
}
