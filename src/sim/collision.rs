//! Collision detection against platforms and the cone walls
//!
//! The awkward part of the climb: the walls are not fixed rectangles but a
//! passage whose width depends on how high the player is, while platforms
//! live in world space and the player lives in screen space.

use glam::Vec2;

use super::geometry::ConeGeometry;
use super::state::{GeoLevel, Platform, PlatformSource, Player, WallSide, WorldState};

/// Result of a landing check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    /// Index into the platform slice that was checked
    pub index: usize,
    pub platform_id: u32,
    pub source: PlatformSource,
    /// Platform top in screen space
    pub top: f32,
}

/// Vertical half of the landing test.
///
/// The player must be falling or still, and its bottom edge must have
/// crossed the platform top between the previous and current tick, give or
/// take `margin`.
#[inline]
pub fn lands_on(prev_bottom: f32, bottom: f32, vy: f32, top: f32, margin: f32) -> bool {
    vy >= 0.0 && prev_bottom <= top + margin && bottom >= top - margin
}

/// Horizontal half of the landing test
#[inline]
pub fn overlaps_horizontally(player: &Player, platform: &Platform) -> bool {
    player.pos.x + player.radius > platform.x && player.pos.x - player.radius < platform.right()
}

/// Find the first platform the player lands on this tick.
///
/// Platforms are tested in slice order, so callers pass them sorted by
/// landing priority. The first match wins regardless of distance.
pub fn check_platform_collision(
    player: &Player,
    platforms: &[Platform],
    world_offset: f32,
    margin: f32,
) -> Option<Landing> {
    platforms.iter().enumerate().find_map(|(index, platform)| {
        let top = platform.top() + world_offset;
        let hit = overlaps_horizontally(player, platform)
            && lands_on(player.prev_bottom(), player.bottom(), player.vel.y, top, margin);
        hit.then_some(Landing {
            index,
            platform_id: platform.id,
            source: platform.source,
            top,
        })
    })
}

/// Index range of the platforms that can be landed on at a level.
///
/// Below the volcano only the base field counts. Inside it every source is
/// live, still in priority order. Expects priority-sorted input.
pub fn landing_candidates(platforms: &[Platform], level: GeoLevel) -> std::ops::Range<usize> {
    if level == GeoLevel::Volcano {
        0..platforms.len()
    } else {
        0..platforms.partition_point(|p| p.source == PlatformSource::Base)
    }
}

/// Keep the player inside the passage walls at its current height.
///
/// Only active in the volcano level. Moves the player just inside the wall
/// it crossed and reverses part of its lateral speed. A passage too narrow
/// to hold the player is treated as no containment for this tick.
pub fn check_wall_collision(
    player: &mut Player,
    world: &WorldState,
    geometry: &ConeGeometry,
    epsilon: f32,
    damping: f32,
) -> Option<WallSide> {
    if world.current_level != GeoLevel::Volcano {
        return None;
    }

    let bounds = geometry.bounds_at(player.world_pos(world.world_offset).y);
    if bounds.is_degenerate() || bounds.width() < 2.0 * (player.radius + epsilon) {
        log::debug!("Wall containment skipped: passage {:?}", bounds);
        return None;
    }

    if player.pos.x - player.radius < bounds.left {
        player.pos.x = bounds.left + player.radius + epsilon;
        if player.vel.x < 0.0 {
            player.vel.x = -player.vel.x * damping;
        }
        return Some(WallSide::Left);
    }

    if player.pos.x + player.radius > bounds.right {
        player.pos.x = bounds.right - player.radius - epsilon;
        if player.vel.x > 0.0 {
            player.vel.x = -player.vel.x * damping;
        }
        return Some(WallSide::Right);
    }

    None
}

/// Check if the player is inside the crater: within its horizontal band and
/// at or above the crater threshold
pub fn check_crater_entry(player: &Player, world_offset: f32, geometry: &ConeGeometry) -> bool {
    let pos = player.world_pos(world_offset);
    pos.y <= geometry.crater_threshold_y() && geometry.crater_bounds().contains_x(pos.x)
}

/// Check overlap between two circles
#[inline]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    a.distance_squared(b) < (radius_a + radius_b) * (radius_a + radius_b)
}
