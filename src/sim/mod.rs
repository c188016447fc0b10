//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only, and time-derived jitter from the simulated clock
//! - Stable iteration order (by landing priority, then entity ID)
//! - No rendering, audio or storage dependencies

pub mod collision;
pub mod eruption;
pub mod geometry;
pub mod hazards;
pub mod platforms;
pub mod scroll;
pub mod state;
pub mod tick;

pub use collision::{
    Landing, check_crater_entry, check_platform_collision, check_wall_collision, circles_overlap,
    landing_candidates,
};
pub use eruption::{EruptionPhase, EruptionState, EruptionTransition};
pub use geometry::{ConeGeometry, CraterInfo, PassageBounds};
pub use platforms::{PlatformGenerator, WorldLayout, generate_world, layout_level};
pub use scroll::{ScrollController, ScrollStep};
pub use state::{
    GameEvent, GamePhase, GameSession, GeoLevel, Hazard, HazardKind, LossReason, ModifierKind,
    Motion, Pickup, PickupKind, Platform, PlatformSource, Player, WallSide, WorldState,
};
pub use tick::{TickInput, tick};
