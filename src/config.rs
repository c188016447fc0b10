//! World and balance configuration
//!
//! Every tunable number of the climb lives here so the geometry, generation,
//! scroll and eruption code never re-derives its own copy. Stored as JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{VIEW_HEIGHT, VIEW_WIDTH};
use crate::persistence::{StorageError, write_atomic};

/// Tunable parameters for one climbing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolcanoConfig {
    /// Generation seed (same seed, same world)
    pub seed: u64,

    // === World ===
    /// Horizontal extent of the world (pixels)
    pub view_width: f32,
    /// Height of the visible region (pixels)
    pub view_height: f32,

    // === Cone geometry ===
    /// Passage width at the volcano base, as a fraction of `view_width`
    pub base_width_fraction: f32,
    /// Passage width at the crater, as a fraction of `view_width`
    pub crater_width_fraction: f32,
    /// Screen-space y of the crater rim while the camera is frozen on it
    pub crater_top: f32,
    /// Vertical extent of the cone (world pixels, base to rim)
    pub volcano_height: f32,
    /// How far below the rim the player must climb to count as inside the crater
    pub crater_depth: f32,

    // === Volcano platforms ===
    /// Vertical distance between generation levels
    pub level_spacing: f32,
    /// Passages narrower than this get no platform
    pub min_passage_width: f32,
    pub max_platform_width: f32,
    /// Inward margin from the walls on each side
    pub platform_margin: f32,
    pub platform_thickness: f32,
    /// Width of the staging platform below the crater
    pub staging_platform_width: f32,
    /// Distance of the staging platform below the rim
    pub staging_platform_depth: f32,
    /// Extra moving platforms between the fixed levels
    pub dynamic_platforms: bool,

    // === Base (mantle/crust) platforms ===
    pub base_spacing: f32,
    pub base_platform_width: f32,
    pub base_platform_thickness: f32,
    /// Offset of the start platform above the bottom of the view
    pub start_platform_offset: f32,
    /// Fraction of crust platforms that slide sideways
    pub moving_platform_chance: f64,
    /// Horizontal speed of moving platforms (pixels/s)
    pub moving_platform_speed: f32,

    // === Collision ===
    /// Vertical tolerance of the landing test
    pub landing_margin: f32,
    /// Gap left between the player and a wall after clamping
    pub wall_epsilon: f32,
    /// Fraction of lateral speed kept (and reversed) on a wall hit
    pub wall_damping: f32,

    // === Scroll ===
    /// Scroll starts when the player rises above this fraction of the view height
    pub scroll_threshold_fraction: f32,
    pub scroll_speed_factor: f32,
    pub max_scroll_per_tick: f32,
    /// Points per pixel of climb
    pub score_rate: f32,
    pub pixels_per_km: f32,
    /// Altitude where the crust begins
    pub crust_km: f32,
    /// Altitude where the volcano begins
    pub volcano_km: f32,

    // === Eruption ===
    pub eruption_bonus: u64,
    pub eruption_duration_ms: f64,

    // === Pickups and hazards ===
    pub powerup_score: u64,
    pub crystal_value: u64,
    /// One power-up every N base platforms
    pub powerup_every: u32,
    /// One crystal every N base platforms
    pub crystal_every: u32,
    /// One hazard every N crust/mantle platforms (0 disables hazards)
    pub hazard_every: u32,

    // === Session ===
    /// Falling this far below the view ends the run
    pub fall_out_margin: f32,
    /// Entities this far below the view are dropped
    pub prune_margin: f32,
}

impl Default for VolcanoConfig {
    fn default() -> Self {
        Self {
            seed: 0x766f_6c63,

            view_width: VIEW_WIDTH,
            view_height: VIEW_HEIGHT,

            base_width_fraction: 0.65,
            crater_width_fraction: 0.15,
            crater_top: 80.0,
            volcano_height: 864.0,
            crater_depth: 50.0,

            level_spacing: 90.0,
            min_passage_width: 50.0,
            max_platform_width: 70.0,
            platform_margin: 10.0,
            platform_thickness: 12.0,
            staging_platform_width: 80.0,
            staging_platform_depth: 150.0,
            dynamic_platforms: true,

            base_spacing: 80.0,
            base_platform_width: 100.0,
            base_platform_thickness: 16.0,
            start_platform_offset: 50.0,
            moving_platform_chance: 0.25,
            moving_platform_speed: 60.0,

            landing_margin: 8.0,
            wall_epsilon: 2.0,
            wall_damping: 0.5,

            scroll_threshold_fraction: 0.4,
            scroll_speed_factor: 0.3,
            max_scroll_per_tick: 15.0,
            score_rate: 0.2,
            pixels_per_km: 50.0,
            crust_km: 15.0,
            volcano_km: 30.0,

            eruption_bonus: 20_000,
            eruption_duration_ms: 4000.0,

            powerup_score: 200,
            crystal_value: 100,
            powerup_every: 7,
            crystal_every: 5,
            hazard_every: 6,

            fall_out_margin: 50.0,
            prune_margin: 100.0,
        }
    }
}

impl VolcanoConfig {
    /// Default parameters with a specific world seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Screen-space y above which the camera follows the player
    pub fn scroll_threshold_y(&self) -> f32 {
        self.view_height * self.scroll_threshold_fraction
    }

    /// World offset at which the volcano level begins
    pub fn volcano_offset(&self) -> f32 {
        self.volcano_km * self.pixels_per_km
    }

    /// Read a config file, failing on I/O or parse errors
    pub fn try_load(path: &Path) -> Result<Self, StorageError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Read a config file, falling back to defaults if it is missing or malformed
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::info!("Using default config ({})", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(self)?;
        write_atomic(path, &json)?;
        log::info!("Config saved to {}", path.display());
        Ok(())
    }
}
