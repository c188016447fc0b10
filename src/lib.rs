//! Volcano Jump - a vertical platformer through a narrowing volcanic cone
//!
//! Core modules:
//! - `sim`: Deterministic simulation (cone geometry, platforms, collisions, scroll, eruption)
//! - `config`: Data-driven world and balance parameters
//! - `highscores`: Top-N leaderboard
//! - `persistence`: Score file collaborator

pub mod config;
pub mod highscores;
pub mod persistence;
pub mod sim;

pub use config::VolcanoConfig;
pub use highscores::{HighScoreEntry, HighScores};
pub use persistence::{ScoreFile, ScoreStore, StorageError};

/// Engine constants that are not part of the tunable config
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the frame clock the game was balanced for)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Default visible region
    pub const VIEW_WIDTH: f32 = 600.0;
    pub const VIEW_HEIGHT: f32 = 800.0;

    /// Player body
    pub const PLAYER_RADIUS: f32 = 32.0;
    pub const PLAYER_MAX_HEALTH: u8 = 3;
    /// Seconds of immunity after taking a hit
    pub const INVULNERABILITY_SECS: f32 = 1.0;

    /// Gravity (pixels/s²)
    pub const GRAVITY: f32 = 2880.0;
    /// Terminal fall speed (pixels/s)
    pub const MAX_FALL_SPEED: f32 = 900.0;
    /// Auto-bounce impulse on landing (pixels/s, upward)
    pub const JUMP_SPEED: f32 = 840.0;
    /// Boost from the jump key while airborne
    pub const AIR_JUMP_SPEED: f32 = 600.0;

    /// Horizontal control
    pub const MOVE_ACCEL: f32 = 4320.0;
    pub const MAX_RUN_SPEED: f32 = 480.0;
    /// Velocity kept per 1/60 s with no direction pressed
    pub const RUN_FRICTION: f32 = 0.85;
    /// Velocity kept (and reversed) on hitting a screen edge
    pub const EDGE_BOUNCE: f32 = 0.7;

    /// Timed modifier lifetime (seconds)
    pub const MODIFIER_DURATION_SECS: f32 = 5.0;

    /// Render-only trail
    pub const TRAIL_LENGTH: usize = 36;
}
