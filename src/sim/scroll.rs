//! Camera scroll, altitude and level sequencing

use super::state::{GeoLevel, Player, WorldState};
use crate::config::VolcanoConfig;

/// Outcome of one scroll step
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollStep {
    /// Pixels the world moved this tick
    pub delta: f32,
    /// Points earned for the climb
    pub score_gain: u64,
    /// Set when the level advanced this tick
    pub level_change: Option<(GeoLevel, GeoLevel)>,
}

/// Moves the world down as the player climbs past the threshold
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollController {
    /// Screen y above which the world scrolls
    pub threshold_y: f32,
    pub speed_factor: f32,
    pub max_per_tick: f32,
    pub score_rate: f32,
    pub pixels_per_km: f32,
    pub crust_km: f32,
    pub volcano_km: f32,
}

/// Points for a scroll distance (floored, never negative)
#[inline]
pub fn score_for(delta: f32, rate: f32) -> u64 {
    let points = (delta * rate).floor();
    if points.is_finite() && points > 0.0 {
        points as u64
    } else {
        0
    }
}

impl ScrollController {
    pub fn from_config(config: &VolcanoConfig) -> Self {
        Self {
            threshold_y: config.scroll_threshold_y(),
            speed_factor: config.scroll_speed_factor,
            max_per_tick: config.max_scroll_per_tick,
            score_rate: config.score_rate,
            pixels_per_km: config.pixels_per_km,
            crust_km: config.crust_km,
            volcano_km: config.volcano_km,
        }
    }

    /// Scroll distance for a player screen y; zero at or below the threshold
    pub fn scroll_delta(&self, player_y: f32) -> f32 {
        if player_y < self.threshold_y {
            ((self.threshold_y - player_y) * self.speed_factor).min(self.max_per_tick)
        } else {
            0.0
        }
    }

    /// Altitude for an offset
    pub fn km_for(&self, world_offset: f32) -> f32 {
        if self.pixels_per_km > 0.0 {
            world_offset / self.pixels_per_km
        } else {
            0.0
        }
    }

    /// Next level for an altitude. Moves at most one band up and never down.
    pub fn next_level(&self, current: GeoLevel, km: f32) -> GeoLevel {
        let target = GeoLevel::for_km(km, self.crust_km, self.volcano_km);
        if target > current {
            current.next().unwrap_or(current)
        } else {
            current
        }
    }

    /// Apply one tick of scrolling to the world and the player.
    ///
    /// While `frozen` the offset does not move, but altitude and level are
    /// still refreshed from it.
    pub fn advance(&self, world: &mut WorldState, player: &mut Player, frozen: bool) -> ScrollStep {
        let delta = if frozen {
            0.0
        } else {
            self.scroll_delta(player.pos.y)
        };

        let mut step = ScrollStep::default();
        if delta > 0.0 {
            world.world_offset += delta;
            player.pos.y += delta;
            player.prev_y += delta;
            step.delta = delta;
            step.score_gain = score_for(delta, self.score_rate);
            world.score += step.score_gain;
        }

        world.km_height = self.km_for(world.world_offset);
        let level = self.next_level(world.current_level, world.km_height);
        if level != world.current_level {
            log::info!(
                "Level {} -> {} at {:.1} km",
                world.current_level.name(),
                level.name(),
                world.km_height
            );
            step.level_change = Some((world.current_level, level));
            world.current_level = level;
        }

        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn controller() -> ScrollController {
        ScrollController::from_config(&VolcanoConfig::default())
    }

    #[test]
    fn test_score_for() {
        assert_eq!(score_for(10.0, 0.2), 2);
        assert_eq!(score_for(4.9, 0.2), 0);
        assert_eq!(score_for(-10.0, 0.2), 0);
        assert_eq!(score_for(f32::NAN, 0.2), 0);
    }

    #[test]
    fn test_delta_is_capped() {
        let scroll = controller();
        assert_eq!(scroll.threshold_y, 320.0);
        assert_eq!(scroll.scroll_delta(320.0), 0.0);
        assert_eq!(scroll.scroll_delta(500.0), 0.0);
        assert!((scroll.scroll_delta(300.0) - 6.0).abs() < 1e-4);
        assert_eq!(scroll.scroll_delta(-1000.0), 15.0);
    }

    #[test]
    fn test_advance_moves_world_and_player_together() {
        let scroll = controller();
        let mut world = WorldState::default();
        let mut player = Player::new(Vec2::new(300.0, 300.0));

        let step = scroll.advance(&mut world, &mut player, false);
        assert!((step.delta - 6.0).abs() < 1e-4);
        assert!((world.world_offset - 6.0).abs() < 1e-4);
        assert!((player.pos.y - 306.0).abs() < 1e-4);
        assert_eq!(step.score_gain, 1);
        assert_eq!(world.score, 1);
    }

    #[test]
    fn test_frozen_does_not_scroll() {
        let scroll = controller();
        let mut world = WorldState {
            world_offset: 100.0,
            ..WorldState::default()
        };
        let mut player = Player::new(Vec2::new(300.0, 0.0));
        let step = scroll.advance(&mut world, &mut player, true);
        assert_eq!(step.delta, 0.0);
        assert_eq!(world.world_offset, 100.0);
        assert_eq!(player.pos.y, 0.0);
    }

    #[test]
    fn test_levels_visited_in_order_once() {
        let scroll = controller();
        let mut world = WorldState::default();
        let mut player = Player::new(Vec2::new(300.0, 0.0));
        let mut changes = Vec::new();

        for _ in 0..400 {
            // Hold the player far above the threshold so every tick scrolls the maximum
            player.pos.y = -1000.0;
            let step = scroll.advance(&mut world, &mut player, false);
            changes.extend(step.level_change);
        }

        assert_eq!(
            changes,
            vec![
                (GeoLevel::Mantle, GeoLevel::Crust),
                (GeoLevel::Crust, GeoLevel::Volcano)
            ]
        );
        assert_eq!(world.current_level, GeoLevel::Volcano);
        assert!((world.km_height - 120.0).abs() < 1e-3);
    }

    #[test]
    fn test_level_steps_one_band_per_call() {
        let scroll = controller();
        let mut world = WorldState {
            world_offset: 5000.0,
            ..WorldState::default()
        };
        let mut player = Player::new(Vec2::new(300.0, 500.0));

        let first = scroll.advance(&mut world, &mut player, false);
        assert_eq!(first.level_change, Some((GeoLevel::Mantle, GeoLevel::Crust)));
        let second = scroll.advance(&mut world, &mut player, false);
        assert_eq!(second.level_change, Some((GeoLevel::Crust, GeoLevel::Volcano)));
        let third = scroll.advance(&mut world, &mut player, false);
        assert_eq!(third.level_change, None);
    }

    #[test]
    fn test_level_never_regresses() {
        let scroll = controller();
        assert_eq!(scroll.next_level(GeoLevel::Volcano, 0.0), GeoLevel::Volcano);
        assert_eq!(scroll.next_level(GeoLevel::Crust, 2.0), GeoLevel::Crust);
    }
}
