//! Session state and core simulation types
//!
//! Everything a climbing session owns lives in one `GameSession` value that
//! the loop driver passes into each tick. No module keeps hidden globals.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::eruption::EruptionState;
use super::geometry::{ConeGeometry, CraterInfo};
use super::platforms::generate_world;
use crate::config::VolcanoConfig;
use crate::consts::*;

/// Coarse altitude band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GeoLevel {
    Mantle,
    Crust,
    Volcano,
}

impl GeoLevel {
    /// Band for an altitude in km
    pub fn for_km(km: f32, crust_km: f32, volcano_km: f32) -> Self {
        if km >= volcano_km {
            GeoLevel::Volcano
        } else if km >= crust_km {
            GeoLevel::Crust
        } else {
            GeoLevel::Mantle
        }
    }

    /// The band directly above, if any
    pub fn next(self) -> Option<Self> {
        match self {
            GeoLevel::Mantle => Some(GeoLevel::Crust),
            GeoLevel::Crust => Some(GeoLevel::Volcano),
            GeoLevel::Volcano => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GeoLevel::Mantle => "Mantle",
            GeoLevel::Crust => "Crust",
            GeoLevel::Volcano => "Volcano",
        }
    }
}

/// Where a platform came from. Declaration order is landing priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlatformSource {
    /// Mantle and crust field below the volcano
    Base,
    /// Fixed levels laid out along the cone
    VolcanoSurface,
    /// Moving platforms between the fixed volcano levels
    VolcanoDynamic,
}

/// Horizontal sliding inside a lane fixed at generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Current speed (pixels/s, sign is direction)
    pub vx: f32,
    /// Leftmost allowed `x`
    pub min_x: f32,
    /// Rightmost allowed `x`
    pub max_x: f32,
}

/// A rectangular platform in world coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub level: GeoLevel,
    pub source: PlatformSource,
    #[serde(default)]
    pub motion: Option<Motion>,
    /// The single pre-eruption platform below the crater
    #[serde(default)]
    pub staging: bool,
}

impl Platform {
    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn is_moving(&self) -> bool {
        self.motion.is_some()
    }

    /// Slide along the lane, bouncing at its ends
    pub fn advance(&mut self, dt: f32) {
        if let Some(motion) = self.motion.as_mut() {
            self.x += motion.vx * dt;
            if self.x <= motion.min_x {
                self.x = motion.min_x;
                motion.vx = motion.vx.abs();
            } else if self.x >= motion.max_x {
                self.x = motion.max_x;
                motion.vx = -motion.vx.abs();
            }
        }
    }
}

/// Timed player modifiers granted by power-ups
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModifierKind {
    /// Faster lateral movement
    ThermalBoost,
    /// Higher bounce
    MagmaJump,
    /// Ignores hazard damage
    GasShield,
    /// Lower gravity and fall speed
    VolcanicTime,
}

impl ModifierKind {
    pub const ALL: [ModifierKind; 4] = [
        ModifierKind::ThermalBoost,
        ModifierKind::MagmaJump,
        ModifierKind::GasShield,
        ModifierKind::VolcanicTime,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModifierKind::ThermalBoost => "thermal_boost",
            ModifierKind::MagmaJump => "magma_jump",
            ModifierKind::GasShield => "gas_shield",
            ModifierKind::VolcanicTime => "volcanic_time",
        }
    }
}

/// The climbing player. Position is in screen space (world y + world offset).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Screen y before the last integration step
    pub prev_y: f32,
    pub radius: f32,
    pub health: u8,
    /// Active modifiers and their remaining seconds
    pub modifiers: BTreeMap<ModifierKind, f32>,
    /// Seconds of remaining hit immunity
    pub invulnerable: f32,
    /// Jump input as of the last dormant tick; boosts fire on the press only
    #[serde(default)]
    pub jump_held: bool,
    /// Recent positions for rendering (newest first)
    #[serde(skip)]
    pub trail: Vec<Vec2>,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            prev_y: pos.y,
            radius: PLAYER_RADIUS,
            health: PLAYER_MAX_HEALTH,
            modifiers: BTreeMap::new(),
            invulnerable: 0.0,
            jump_held: false,
            trail: Vec::with_capacity(TRAIL_LENGTH),
        }
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.radius
    }

    #[inline]
    pub fn prev_bottom(&self) -> f32 {
        self.prev_y + self.radius
    }

    /// Position in world coordinates
    #[inline]
    pub fn world_pos(&self, world_offset: f32) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.y - world_offset)
    }

    pub fn has(&self, kind: ModifierKind) -> bool {
        self.modifiers.contains_key(&kind)
    }

    pub fn activate(&mut self, kind: ModifierKind, duration: f32) {
        self.modifiers.insert(kind, duration);
    }

    /// Accelerate toward the pressed direction, or coast with friction
    pub fn steer(&mut self, left: bool, right: bool, dt: f32) {
        let mut accel = MOVE_ACCEL;
        let mut max_speed = MAX_RUN_SPEED;
        if self.has(ModifierKind::ThermalBoost) {
            accel *= 1.5;
            max_speed *= 1.3;
        }

        if left && !right {
            self.vel.x = (self.vel.x - accel * dt).max(-max_speed);
        } else if right && !left {
            self.vel.x = (self.vel.x + accel * dt).min(max_speed);
        } else {
            self.vel.x *= RUN_FRICTION.powf(dt / SIM_DT);
        }
    }

    /// Upward impulse used by the auto-bounce on landing
    pub fn jump(&mut self) {
        let mut speed = JUMP_SPEED;
        if self.has(ModifierKind::MagmaJump) {
            speed *= 1.5;
        }
        self.vel.y = -speed;
    }

    /// Boost from the jump key while airborne
    pub fn air_jump(&mut self) {
        self.vel.y = -AIR_JUMP_SPEED;
    }

    /// Apply gravity and velocity, bouncing off the screen edges
    pub fn integrate(&mut self, dt: f32, view_width: f32) {
        let mut gravity = GRAVITY;
        let mut max_fall = MAX_FALL_SPEED;
        if self.has(ModifierKind::VolcanicTime) {
            gravity *= 0.5;
            max_fall *= 0.7;
        }

        self.prev_y = self.pos.y;
        self.vel.y = (self.vel.y + gravity * dt).min(max_fall);
        self.pos += self.vel * dt;

        if self.pos.x - self.radius < 0.0 {
            self.pos.x = self.radius;
            self.vel.x = self.vel.x.abs() * EDGE_BOUNCE;
        } else if self.pos.x + self.radius > view_width {
            self.pos.x = view_width - self.radius;
            self.vel.x = -self.vel.x.abs() * EDGE_BOUNCE;
        }
    }

    /// Hold still (eruption camera lock)
    pub fn freeze(&mut self) {
        self.vel = Vec2::ZERO;
        self.prev_y = self.pos.y;
    }

    /// Count down modifiers and hit immunity
    pub fn update_timers(&mut self, dt: f32) {
        for remaining in self.modifiers.values_mut() {
            *remaining -= dt;
        }
        self.modifiers.retain(|_, remaining| *remaining > 0.0);
        if self.invulnerable > 0.0 {
            self.invulnerable = (self.invulnerable - dt).max(0.0);
        }
    }

    /// Apply hazard damage. Returns false if the hit was ignored.
    pub fn take_damage(&mut self, damage: u8) -> bool {
        if self.invulnerable > 0.0 || self.has(ModifierKind::GasShield) {
            return false;
        }
        self.health = self.health.saturating_sub(damage);
        self.invulnerable = INVULNERABILITY_SECS;
        true
    }

    pub fn record_trail(&mut self) {
        self.trail.insert(0, self.pos);
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.pop();
        }
    }
}

/// Camera and altitude bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    /// Cumulative scroll distance (never decreases)
    pub world_offset: f32,
    pub current_level: GeoLevel,
    pub km_height: f32,
    pub score: u64,
}

impl Default for WorldState {
    fn default() -> Self {
        Self {
            world_offset: 0.0,
            current_level: GeoLevel::Mantle,
            km_height: 0.0,
            score: 0,
        }
    }
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    PowerUp(ModifierKind),
    Crystal { value: u64 },
}

/// A collectible orb in world coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    pub pos: Vec2,
    pub radius: f32,
}

/// Hazard types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardKind {
    /// Patrols back and forth around its spawn point
    LavaBlob,
    /// Drifts erratically
    RockFragment,
}

impl HazardKind {
    pub fn damage(self) -> u8 {
        match self {
            HazardKind::LavaBlob => 1,
            HazardKind::RockFragment => 2,
        }
    }

    pub fn radius(self) -> f32 {
        match self {
            HazardKind::LavaBlob => 15.0,
            HazardKind::RockFragment => 12.0,
        }
    }
}

/// A damaging entity in world coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub id: u32,
    pub kind: HazardKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Spawn point (patrol centre, jitter seed)
    pub origin: Vec2,
    pub radius: f32,
}

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    Paused,
    /// Run ended without reaching the crater
    GameOver,
    /// Eruption sequence finished
    Complete,
}

/// Why a run ended early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    /// Dropped below the visible area
    Fell,
    /// Ran out of health
    Burned,
}

/// Which wall the player was pushed off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallSide {
    Left,
    Right,
}

/// Events emitted by a tick for the render/audio/UI collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Landed { platform_id: u32, source: PlatformSource },
    WallHit { side: WallSide },
    LevelChanged { from: GeoLevel, to: GeoLevel },
    EruptionActivated { frozen_offset: f32 },
    EruptionRewarded { bonus: u64 },
    SessionComplete { score: u64, height_km: f32 },
    PickupCollected { kind: ModifierKind },
    CrystalCollected { value: u64 },
    PlayerHurt { health: u8 },
    PlayerLost { reason: LossReason },
    Paused,
    Resumed,
}

/// Complete session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub config: VolcanoConfig,
    pub geometry: ConeGeometry,
    pub world: WorldState,
    pub player: Player,
    /// Sorted by landing priority, then id
    pub platforms: Vec<Platform>,
    pub pickups: Vec<Pickup>,
    pub hazards: Vec<Hazard>,
    pub eruption: EruptionState,
    pub phase: GamePhase,
    /// Simulated clock (ms), the sum of tick `dt`
    pub elapsed_ms: f64,
    pub time_ticks: u64,
    /// Platform the autopilot committed to for the current airborne arc
    #[serde(default)]
    pub autopilot_target: Option<u32>,
    next_id: u32,
}

impl GameSession {
    /// Generate the world for a config and place the player on the start platform
    pub fn new(config: VolcanoConfig) -> Self {
        let geometry = ConeGeometry::from_config(&config);
        let layout = generate_world(&config, &geometry);

        let start = layout
            .platforms
            .iter()
            .find(|p| p.source == PlatformSource::Base)
            .map(|p| Vec2::new(p.center_x(), p.top() - PLAYER_RADIUS))
            .unwrap_or(Vec2::new(config.view_width / 2.0, config.view_height / 2.0));

        log::info!(
            "New session: seed={} platforms={} pickups={} hazards={}",
            config.seed,
            layout.platforms.len(),
            layout.pickups.len(),
            layout.hazards.len()
        );

        let mut session = Self {
            config,
            geometry,
            world: WorldState::default(),
            player: Player::new(start),
            platforms: layout.platforms,
            pickups: layout.pickups,
            hazards: layout.hazards,
            eruption: EruptionState::default(),
            phase: GamePhase::Playing,
            elapsed_ms: 0.0,
            time_ticks: 0,
            autopilot_target: None,
            next_id: layout.next_id,
        };
        session.normalize_order();
        session
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Keep platforms in landing-priority order and entities in id order
    pub fn normalize_order(&mut self) {
        self.platforms.sort_by_key(|p| (p.source, p.id));
        self.pickups.sort_by_key(|p| p.id);
        self.hazards.sort_by_key(|h| h.id);
    }

    /// Screen-space crater opening
    pub fn crater_info(&self) -> CraterInfo {
        self.geometry.crater_info()
    }

    /// Player position relative to the top of the view
    pub fn player_screen_y(&self) -> f32 {
        self.player.pos.y
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver | GamePhase::Complete)
    }
}
