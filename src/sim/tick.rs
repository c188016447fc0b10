//! Fixed timestep simulation tick
//!
//! Core game loop that advances a session deterministically.
//! Order within a tick: physics, collision, scroll, eruption.

use glam::Vec2;

use super::collision::{
    check_crater_entry, check_platform_collision, check_wall_collision, circles_overlap,
    landing_candidates,
};
use super::eruption::EruptionTransition;
use super::scroll::ScrollController;
use super::state::{
    GameEvent, GamePhase, GameSession, GeoLevel, LossReason, PickupKind, Platform,
};
use crate::consts::*;

/// Smallest climb the autopilot treats as the next platform up
const AUTOPILOT_MIN_RISE: f32 = 20.0;
/// Horizontal slack before the autopilot steers
const AUTOPILOT_DEADZONE: f32 = 6.0;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Air boost, fired once per press (ignored while the eruption holds the player)
    pub jump: bool,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode - autopilot plays the game
    pub idle_mode: bool,
}

/// Advance the session by one fixed timestep and return what happened
pub fn tick(session: &mut GameSession, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Handle pause toggle
    if input.pause {
        match session.phase {
            GamePhase::Playing => {
                session.phase = GamePhase::Paused;
                events.push(GameEvent::Paused);
                return events;
            }
            GamePhase::Paused => {
                session.phase = GamePhase::Playing;
                events.push(GameEvent::Resumed);
            }
            _ => {}
        }
    }

    if session.phase != GamePhase::Playing {
        return events;
    }

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(session, &mut input);
    }
    let input = &input;

    session.time_ticks += 1;
    session.elapsed_ms += f64::from(dt) * 1000.0;
    session.player.update_timers(dt);

    let dormant = session.eruption.is_dormant();

    // === Physics ===
    if dormant {
        let player = &mut session.player;
        player.steer(input.left, input.right, dt);
        if input.jump && !player.jump_held {
            player.air_jump();
        }
        player.jump_held = input.jump;
        player.integrate(dt, session.config.view_width);
    } else {
        session.player.freeze();
        session.world.world_offset = session.eruption.frozen_offset;
    }

    for platform in &mut session.platforms {
        platform.advance(dt);
    }
    let view_width = session.config.view_width;
    let elapsed_ms = session.elapsed_ms;
    for hazard in &mut session.hazards {
        hazard.update(dt, elapsed_ms, view_width);
    }

    // === Collision ===
    if dormant {
        resolve_collisions(session, &mut events);
    }

    // === Scroll ===
    let scroll = ScrollController::from_config(&session.config);
    let step = scroll.advance(&mut session.world, &mut session.player, !dormant);
    if let Some((from, to)) = step.level_change {
        events.push(GameEvent::LevelChanged { from, to });
        // The walls appear this tick; contain the player before anyone sees it
        if dormant && to == GeoLevel::Volcano {
            let config = &session.config;
            if let Some(side) = check_wall_collision(
                &mut session.player,
                &session.world,
                &session.geometry,
                config.wall_epsilon,
                config.wall_damping,
            ) {
                events.push(GameEvent::WallHit { side });
            }
        }
    }

    // === Eruption ===
    let in_crater = check_crater_entry(&session.player, session.world.world_offset, &session.geometry);
    let transition = session.eruption.step(
        session.world.current_level,
        in_crater,
        session.world.world_offset,
        session.elapsed_ms,
        session.config.eruption_bonus,
        session.config.eruption_duration_ms,
    );
    match transition {
        Some(EruptionTransition::Activated { frozen_offset }) => {
            session.player.freeze();
            events.push(GameEvent::EruptionActivated { frozen_offset });
        }
        Some(EruptionTransition::Rewarded { bonus }) => {
            session.world.score += bonus;
            log::info!("Eruption bonus +{} (score {})", bonus, session.world.score);
            events.push(GameEvent::EruptionRewarded { bonus });
        }
        Some(EruptionTransition::Completed) => {
            session.phase = GamePhase::Complete;
            log::info!(
                "Session complete: score={} height={:.1} km",
                session.world.score,
                session.world.km_height
            );
            events.push(GameEvent::SessionComplete {
                score: session.world.score,
                height_km: session.world.km_height,
            });
        }
        None => {}
    }

    // === Session end ===
    if session.phase == GamePhase::Playing {
        let fell = session.eruption.is_dormant()
            && session.player.pos.y - session.player.radius
                > session.config.view_height + session.config.fall_out_margin;
        let reason = if session.player.health == 0 {
            Some(LossReason::Burned)
        } else if fell {
            Some(LossReason::Fell)
        } else {
            None
        };
        if let Some(reason) = reason {
            session.phase = GamePhase::GameOver;
            log::info!(
                "Run lost ({:?}): score={} height={:.1} km",
                reason,
                session.world.score,
                session.world.km_height
            );
            events.push(GameEvent::PlayerLost { reason });
        }
    }

    prune_offscreen(session);
    session.player.record_trail();

    events
}

/// Walls, platforms, pickups and hazards, in that order
fn resolve_collisions(session: &mut GameSession, events: &mut Vec<GameEvent>) {
    let config = &session.config;
    let offset = session.world.world_offset;

    if let Some(side) = check_wall_collision(
        &mut session.player,
        &session.world,
        &session.geometry,
        config.wall_epsilon,
        config.wall_damping,
    ) {
        events.push(GameEvent::WallHit { side });
    }

    let range = landing_candidates(&session.platforms, session.world.current_level);
    if let Some(landing) = check_platform_collision(
        &session.player,
        &session.platforms[range],
        offset,
        config.landing_margin,
    ) {
        let player = &mut session.player;
        player.pos.y = landing.top - player.radius;
        player.jump();
        session.autopilot_target = None;
        events.push(GameEvent::Landed {
            platform_id: landing.platform_id,
            source: landing.source,
        });
    }

    let screen_shift = Vec2::new(0.0, offset);
    let player = &mut session.player;
    let mut score_gain = 0;
    session.pickups.retain(|pickup| {
        if !circles_overlap(player.pos, player.radius, pickup.pos + screen_shift, pickup.radius) {
            return true;
        }
        match pickup.kind {
            PickupKind::PowerUp(kind) => {
                player.activate(kind, MODIFIER_DURATION_SECS);
                score_gain += config.powerup_score;
                events.push(GameEvent::PickupCollected { kind });
            }
            PickupKind::Crystal { value } => {
                score_gain += value;
                events.push(GameEvent::CrystalCollected { value });
            }
        }
        false
    });
    session.world.score += score_gain;

    for hazard in &session.hazards {
        if circles_overlap(player.pos, player.radius, hazard.pos + screen_shift, hazard.radius)
            && player.take_damage(hazard.kind.damage())
        {
            events.push(GameEvent::PlayerHurt {
                health: player.health,
            });
        }
    }
}

/// Drop entities that scrolled below the view
fn prune_offscreen(session: &mut GameSession) {
    let limit = session.config.view_height + session.config.prune_margin;
    let offset = session.world.world_offset;
    session.platforms.retain(|p| p.top() + offset <= limit);
    session.pickups.retain(|p| p.pos.y - p.radius + offset <= limit);
    session.hazards.retain(|h| h.pos.y - h.radius + offset <= limit);
}

/// Commit to the nearest platform above for the whole arc, tapping the boost
/// only while falling short of it
fn autopilot(session: &mut GameSession, input: &mut TickInput) {
    let player = &session.player;
    let offset = session.world.world_offset;
    let range = landing_candidates(&session.platforms, session.world.current_level);
    let candidates = &session.platforms[range];

    let rise = |p: &Platform| player.bottom() - (p.top() + offset);
    let locked = session
        .autopilot_target
        .and_then(|id| candidates.iter().find(|p| p.id == id));
    let target = locked
        .or_else(|| {
            candidates
                .iter()
                .filter(|&p| rise(p) > AUTOPILOT_MIN_RISE)
                .min_by(|&a, &b| {
                    rise(a).total_cmp(&rise(b)).then_with(|| {
                        let da = (a.center_x() - player.pos.x).abs();
                        let db = (b.center_x() - player.pos.x).abs();
                        da.total_cmp(&db)
                    })
                })
        })
        .or_else(|| {
            // Nothing above: settle on the closest platform below
            candidates
                .iter()
                .filter(|&p| rise(p) <= 0.0)
                .min_by(|&a, &b| rise(b).total_cmp(&rise(a)))
        });

    let target_x = target.map_or(session.config.view_width / 2.0, Platform::center_x);
    let dx = target_x - player.pos.x;
    input.left = dx < -AUTOPILOT_DEADZONE;
    input.right = dx > AUTOPILOT_DEADZONE;

    let short_of_target = target.is_some_and(|p| rise(p) > 0.0);
    input.jump = player.vel.y > 0.0 && short_of_target && !player.jump_held;
    session.autopilot_target = target.map(|p| p.id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VolcanoConfig;
    use crate::sim::state::{
        GeoLevel, Hazard, HazardKind, ModifierKind, Pickup, PlatformSource, WallSide,
    };

    fn session() -> GameSession {
        GameSession::new(VolcanoConfig::default())
    }

    #[test]
    fn test_first_tick_bounces_off_start_platform() {
        let mut session = session();
        let start_id = session.platforms[0].id;

        let events = tick(&mut session, &TickInput::default(), SIM_DT);
        assert!(events.contains(&GameEvent::Landed {
            platform_id: start_id,
            source: PlatformSource::Base,
        }));
        assert!(session.player.vel.y < 0.0);
        assert!((session.player.bottom() - session.platforms[0].top()).abs() < 1e-3);
    }

    #[test]
    fn test_tick_pause() {
        let mut session = session();
        tick(&mut session, &TickInput::default(), SIM_DT);
        let ticks = session.time_ticks;
        let pos = session.player.pos;

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        assert_eq!(tick(&mut session, &pause, SIM_DT), vec![GameEvent::Paused]);
        assert_eq!(session.phase, GamePhase::Paused);

        // Paused ticks change nothing
        for _ in 0..10 {
            assert!(tick(&mut session, &TickInput::default(), SIM_DT).is_empty());
        }
        assert_eq!(session.time_ticks, ticks);
        assert_eq!(session.player.pos, pos);

        let events = tick(&mut session, &pause, SIM_DT);
        assert_eq!(events.first(), Some(&GameEvent::Resumed));
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.time_ticks, ticks + 1);
    }

    #[test]
    fn test_determinism() {
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        let run = || {
            let mut session = GameSession::new(VolcanoConfig::with_seed(777));
            let mut events = Vec::new();
            for _ in 0..1500 {
                events.extend(tick(&mut session, &input, SIM_DT));
            }
            (
                session.player.pos,
                session.world.world_offset,
                session.world.score,
                session.phase,
                events,
            )
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_held_jump_boosts_once() {
        let mut session = session();
        session.platforms.clear();
        session.pickups.clear();
        session.hazards.clear();
        session.player.pos = Vec2::new(300.0, 400.0);
        session.player.prev_y = 400.0;
        session.player.vel = Vec2::ZERO;

        let hold = TickInput {
            jump: true,
            ..Default::default()
        };
        let mut highest = session.player.pos.y;
        for _ in 0..30 {
            tick(&mut session, &hold, SIM_DT);
            highest = highest.min(session.player.pos.y);
        }
        // One boost only climbs AIR_JUMP_SPEED^2 / 2g
        assert!(highest >= 400.0 - 65.0);
        assert!(session.player.vel.y > 0.0);
        assert_eq!(session.world.world_offset, 0.0);

        // Releasing and pressing again boosts again
        tick(&mut session, &TickInput::default(), SIM_DT);
        assert!(!session.player.jump_held);
        tick(&mut session, &hold, SIM_DT);
        assert!(session.player.vel.y < 0.0);
        assert!(session.player.jump_held);
    }

    #[test]
    fn test_walls_contain_player_on_volcano_entry() {
        let mut session = session();
        session.platforms.clear();
        session.pickups.clear();
        session.hazards.clear();
        // One max-speed scroll away from the volcano level
        session.world.world_offset = 1490.0;
        session.world.current_level = GeoLevel::Crust;
        session.player.pos = Vec2::new(40.0, 0.0);
        session.player.prev_y = 0.0;
        session.player.vel = Vec2::ZERO;

        let events = tick(&mut session, &TickInput::default(), SIM_DT);
        assert!(events.contains(&GameEvent::LevelChanged {
            from: GeoLevel::Crust,
            to: GeoLevel::Volcano,
        }));
        assert!(events.contains(&GameEvent::WallHit {
            side: WallSide::Left
        }));

        let player = &session.player;
        let world_y = player.pos.y - session.world.world_offset;
        let bounds = session.geometry.bounds_at(world_y);
        assert!(player.pos.x - player.radius >= bounds.left - 1e-3);
        assert!(player.pos.x + player.radius <= bounds.right + 1e-3);
    }

    #[test]
    fn test_autopilot_keeps_target_for_the_arc() {
        let mut session = session();
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        // First tick lands on the start platform and picks the next one up
        tick(&mut session, &input, SIM_DT);
        tick(&mut session, &input, SIM_DT);
        let target = session.autopilot_target.unwrap();
        assert!(session.platforms.iter().any(|p| p.id == target));

        for _ in 0..5 {
            let events = tick(&mut session, &input, SIM_DT);
            if events.iter().any(|e| matches!(e, GameEvent::Landed { .. })) {
                break;
            }
            assert_eq!(session.autopilot_target, Some(target));
        }
    }

    #[test]
    fn test_falling_out_ends_run() {
        let mut session = session();
        session.platforms.clear();
        session.player.pos.y = session.config.view_height + 200.0;

        let events = tick(&mut session, &TickInput::default(), SIM_DT);
        assert!(events.contains(&GameEvent::PlayerLost {
            reason: LossReason::Fell
        }));
        assert_eq!(session.phase, GamePhase::GameOver);
        assert!(session.is_over());
        assert!(tick(&mut session, &TickInput::default(), SIM_DT).is_empty());
    }

    #[test]
    fn test_pickups_are_collected_once() {
        let mut session = session();
        session.pickups.clear();
        let pos = session.player.pos;
        let id = session.next_entity_id();
        session.pickups.push(Pickup {
            id,
            kind: PickupKind::PowerUp(ModifierKind::GasShield),
            pos,
            radius: 15.0,
        });
        let id = session.next_entity_id();
        session.pickups.push(Pickup {
            id,
            kind: PickupKind::Crystal { value: 100 },
            pos,
            radius: 15.0,
        });
        let score = session.world.score;

        let events = tick(&mut session, &TickInput::default(), SIM_DT);
        assert!(events.contains(&GameEvent::PickupCollected {
            kind: ModifierKind::GasShield
        }));
        assert!(events.contains(&GameEvent::CrystalCollected { value: 100 }));
        assert_eq!(session.world.score, score + 300);
        assert!(session.player.has(ModifierKind::GasShield));
        assert!(session.pickups.is_empty());
    }

    #[test]
    fn test_hazard_contact_hurts_until_burned() {
        let mut session = session();
        session.hazards.clear();
        let id = session.next_entity_id();
        session
            .hazards
            .push(Hazard::new(id, HazardKind::RockFragment, session.player.pos));

        let events = tick(&mut session, &TickInput::default(), SIM_DT);
        assert!(events.contains(&GameEvent::PlayerHurt {
            health: PLAYER_MAX_HEALTH - 2
        }));

        // Wait out the immunity, then take the second hit
        session.player.invulnerable = 0.0;
        session.hazards[0].pos = session.player.pos;
        let events = tick(&mut session, &TickInput::default(), SIM_DT);
        assert!(events.contains(&GameEvent::PlayerLost {
            reason: LossReason::Burned
        }));
        assert_eq!(session.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_volcano_platforms_ignored_below_volcano() {
        let mut session = session();
        assert_eq!(session.world.current_level, GeoLevel::Mantle);
        // Put a volcano platform right under the player
        let start_top = session.platforms[0].top();
        let start_x = session.platforms[0].x;
        session.platforms.retain(|p| p.source != PlatformSource::Base);
        let surface = session
            .platforms
            .iter_mut()
            .find(|p| p.source == PlatformSource::VolcanoSurface)
            .unwrap();
        surface.x = start_x;
        surface.y = start_top;
        surface.width = 100.0;

        let events = tick(&mut session, &TickInput::default(), SIM_DT);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Landed { .. })));
    }

    #[test]
    fn test_eruption_freezes_and_completes() {
        let mut session = session();
        let offset = 2400.0;
        session.world.world_offset = offset;
        session.world.current_level = GeoLevel::Volcano;
        let world_y = session.geometry.crater_threshold_y() - 10.0;
        session.player.pos = Vec2::new(300.0, world_y + offset);
        session.player.prev_y = session.player.pos.y;

        let events = tick(&mut session, &TickInput::default(), SIM_DT);
        assert!(events.contains(&GameEvent::EruptionActivated {
            frozen_offset: offset
        }));
        let score = session.world.score;
        let held = session.player.pos;

        let events = tick(&mut session, &TickInput::default(), SIM_DT);
        assert!(events.contains(&GameEvent::EruptionRewarded { bonus: 20_000 }));
        assert_eq!(session.world.score, score + 20_000);

        let mut complete = false;
        for _ in 0..400 {
            let input = TickInput {
                left: true,
                jump: true,
                ..Default::default()
            };
            let events = tick(&mut session, &input, SIM_DT);
            assert_eq!(session.world.world_offset, offset);
            assert_eq!(session.player.pos, held);
            if events
                .iter()
                .any(|e| matches!(e, GameEvent::SessionComplete { .. }))
            {
                complete = true;
                break;
            }
        }
        assert!(complete);
        assert_eq!(session.phase, GamePhase::Complete);
        assert_eq!(session.world.score, score + 20_000);
        assert!(session.elapsed_ms - session.eruption.start_ms >= 4000.0);
    }
}
