//! Hazard motion
//!
//! Rock fragments drift erratically. The drift is a pure function of the
//! fragment's spawn point and a coarse slice of the simulated clock, so two
//! runs with the same inputs move every fragment identically.

use glam::Vec2;

use super::state::{Hazard, HazardKind};

/// Patrol half-width of a lava blob around its spawn point
pub const PATROL_RANGE: f32 = 100.0;
/// Lava blob speed (pixels/s)
pub const PATROL_SPEED: f32 = 60.0;
/// Width of one jitter time slice (ms)
pub const JITTER_BUCKET_MS: f64 = 100.0;
/// Percentage of time slices in which a fragment changes course
pub const JITTER_CHANCE: u32 = 10;

/// Time slice index for a simulated time
#[inline]
pub fn time_bucket(elapsed_ms: f64) -> u64 {
    if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
        (elapsed_ms / JITTER_BUCKET_MS) as u64
    } else {
        0
    }
}

/// Deterministic 32-bit hash of a spawn point and a time slice
pub fn stable_jitter(origin: Vec2, bucket: u64) -> u32 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for word in [
        u64::from(origin.x.to_bits()),
        u64::from(origin.y.to_bits()),
        bucket,
    ] {
        h ^= word;
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
        h ^= h >> 29;
    }
    (h ^ (h >> 32)) as u32
}

impl Hazard {
    pub fn new(id: u32, kind: HazardKind, pos: Vec2) -> Self {
        let vel = match kind {
            HazardKind::LavaBlob => Vec2::new(PATROL_SPEED, 0.0),
            HazardKind::RockFragment => Vec2::ZERO,
        };
        Self {
            id,
            kind,
            pos,
            vel,
            origin: pos,
            radius: kind.radius(),
        }
    }

    /// Move for one tick
    pub fn update(&mut self, dt: f32, elapsed_ms: f64, view_width: f32) {
        match self.kind {
            HazardKind::LavaBlob => {
                self.pos.x += self.vel.x * dt;
                if self.pos.x <= self.origin.x - PATROL_RANGE {
                    self.pos.x = self.origin.x - PATROL_RANGE;
                    self.vel.x = self.vel.x.abs();
                } else if self.pos.x >= self.origin.x + PATROL_RANGE {
                    self.pos.x = self.origin.x + PATROL_RANGE;
                    self.vel.x = -self.vel.x.abs();
                }
            }
            HazardKind::RockFragment => {
                let h = stable_jitter(self.origin, time_bucket(elapsed_ms));
                if h % 100 < JITTER_CHANCE {
                    self.vel.x = ((h % 400) as f32 - 200.0) * 0.5;
                    self.vel.y = (((h / 400) % 200) as f32 - 100.0) * 0.3;
                }
                self.pos += self.vel * dt;
                if self.pos.x - self.radius < 0.0 {
                    self.pos.x = self.radius;
                    self.vel.x = self.vel.x.abs();
                } else if self.pos.x + self.radius > view_width {
                    self.pos.x = view_width - self.radius;
                    self.vel.x = -self.vel.x.abs();
                }
            }
        }
    }
}
