//! Procedural world layout
//!
//! Two fields of platforms are generated at session start:
//! - the base field (mantle and crust), a seeded scatter up to the volcano base
//! - the volcano field, laid out level by level inside the cone walls
//!
//! Generation never fails. A level whose passage is too narrow simply gets
//! no platform.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::geometry::{ConeGeometry, PassageBounds};
use super::state::{
    GeoLevel, Hazard, HazardKind, ModifierKind, Motion, Pickup, PickupKind, Platform,
    PlatformSource,
};
use crate::config::VolcanoConfig;

/// Pickup collision radius
pub const PICKUP_RADIUS: f32 = 15.0;

/// Horizontal placement of one volcano level
#[derive(Debug, Clone, PartialEq)]
pub struct LevelLayout {
    pub width: f32,
    /// Left edges, ordered left to right
    pub xs: Vec<f32>,
}

/// Everything generated for a new session
#[derive(Debug, Clone)]
pub struct WorldLayout {
    pub platforms: Vec<Platform>,
    pub pickups: Vec<Pickup>,
    pub hazards: Vec<Hazard>,
    /// First unused entity id
    pub next_id: u32,
}

/// Lay out the platforms of a single volcano level inside `bounds`.
///
/// Wider passages host more platforms: 3 above 200 px, 2 above 120 px,
/// otherwise 1. Returns `None` when the passage cannot hold a platform.
pub fn layout_level(bounds: PassageBounds, config: &VolcanoConfig) -> Option<LevelLayout> {
    let passage = bounds.width();
    if bounds.is_degenerate() || passage < config.min_passage_width {
        return None;
    }

    let margin = config.platform_margin;
    let width = config.max_platform_width.min(passage * 0.4);
    let usable = passage - width - 2.0 * margin;
    if usable <= 0.0 {
        return None;
    }

    let count = if passage > 200.0 {
        3
    } else if passage > 120.0 {
        2
    } else {
        1
    };

    let min_x = bounds.left + margin;
    let max_x = bounds.right - width - margin;
    let xs = (0..count)
        .map(|j| {
            let x = if count == 1 {
                bounds.center() - width / 2.0
            } else {
                min_x + j as f32 * usable / (count - 1) as f32
            };
            x.clamp(min_x, max_x)
        })
        .collect();

    Some(LevelLayout { width, xs })
}

/// Seeded platform generator for one world
pub struct PlatformGenerator<'a> {
    config: &'a VolcanoConfig,
    geometry: &'a ConeGeometry,
    next_id: u32,
}

impl<'a> PlatformGenerator<'a> {
    pub fn new(config: &'a VolcanoConfig, geometry: &'a ConeGeometry) -> Self {
        Self {
            config,
            geometry,
            next_id: 1,
        }
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Number of generation levels that fit in the cone
    pub fn volcano_levels(&self) -> u32 {
        if self.config.level_spacing <= 0.0 || self.geometry.height <= 0.0 {
            return 0;
        }
        (self.geometry.height / self.config.level_spacing).floor() as u32
    }

    /// Height ratio used for level `i`
    pub fn level_ratio(&self, i: u32) -> f32 {
        let levels = self.volcano_levels();
        if levels == 0 {
            0.0
        } else {
            i as f32 / levels as f32
        }
    }

    /// The fixed volcano platforms, base to crater, followed by the staging platform
    pub fn generate(&mut self) -> Vec<Platform> {
        let levels = self.volcano_levels();
        let mut platforms = Vec::new();

        for i in 0..levels {
            let ratio = self.level_ratio(i);
            let y = self.geometry.base_y - i as f32 * self.config.level_spacing;
            let bounds = self.geometry.passage_bounds(ratio);

            let Some(layout) = layout_level(bounds, self.config) else {
                log::debug!(
                    "Volcano level {} skipped: passage {:.1} px",
                    i,
                    bounds.width()
                );
                continue;
            };

            for x in layout.xs {
                let id = self.alloc_id();
                platforms.push(Platform {
                    id,
                    x,
                    y,
                    width: layout.width,
                    height: self.config.platform_thickness,
                    level: GeoLevel::Volcano,
                    source: PlatformSource::VolcanoSurface,
                    motion: None,
                    staging: false,
                });
            }
        }

        let staging_width = self.config.staging_platform_width;
        let id = self.alloc_id();
        platforms.push(Platform {
            id,
            x: (self.geometry.total_width - staging_width) / 2.0,
            y: self.geometry.top_y() + self.config.staging_platform_depth,
            width: staging_width,
            height: self.config.platform_thickness,
            level: GeoLevel::Volcano,
            source: PlatformSource::VolcanoSurface,
            motion: None,
            staging: true,
        });

        log::debug!("Volcano surface: {} levels, {} platforms", levels, platforms.len());
        platforms
    }

    /// Moving platforms halfway between the fixed levels.
    ///
    /// Each slides in a lane computed from the passage at its generation
    /// height, so it never leaves the cone.
    pub fn generate_dynamic(&mut self, rng: &mut Pcg32) -> Vec<Platform> {
        let levels = self.volcano_levels();
        let margin = self.config.platform_margin;
        let mut platforms = Vec::new();

        for i in 0..levels {
            let ratio = (i as f32 + 0.5) / levels as f32;
            let bounds = self.geometry.passage_bounds(ratio);
            if bounds.is_degenerate() || bounds.width() < self.config.min_passage_width {
                continue;
            }

            let width = (self.config.max_platform_width * 0.8).min(bounds.width() * 0.35);
            let lane = bounds.inset(margin);
            let max_x = lane.right - width;
            if max_x <= lane.left {
                continue;
            }

            let x = rng.random_range(lane.left..=max_x);
            let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            let id = self.alloc_id();
            platforms.push(Platform {
                id,
                x,
                y: self.geometry.base_y - (i as f32 + 0.5) * self.config.level_spacing,
                width,
                height: self.config.platform_thickness,
                level: GeoLevel::Volcano,
                source: PlatformSource::VolcanoDynamic,
                motion: Some(Motion {
                    vx: direction * self.config.moving_platform_speed,
                    min_x: lane.left,
                    max_x,
                }),
                staging: false,
            });
        }

        platforms
    }

    /// The mantle/crust scatter from the start platform up to the volcano base
    pub fn generate_base(&mut self, rng: &mut Pcg32) -> Vec<Platform> {
        let config = self.config;
        let width = config.base_platform_width;
        let margin = config.platform_margin;
        let view_width = self.geometry.total_width;
        let max_x = (view_width - width - margin).max(margin);
        let mut platforms = Vec::new();

        // Start platform, centred under the player
        let mut y = config.view_height - config.start_platform_offset;
        let id = self.alloc_id();
        platforms.push(Platform {
            id,
            x: (view_width - width) / 2.0,
            y,
            width,
            height: config.base_platform_thickness,
            level: GeoLevel::Mantle,
            source: PlatformSource::Base,
            motion: None,
            staging: false,
        });

        if config.base_spacing <= 0.0 {
            return platforms;
        }

        y -= config.base_spacing;
        while y > self.geometry.base_y {
            let level = level_at_world_y(config, y);
            let x = rng.random_range(margin..=max_x);
            let moving = level == GeoLevel::Crust
                && rng.random_bool(config.moving_platform_chance.clamp(0.0, 1.0));
            let motion = moving
                .then(|| Motion {
                    vx: if rng.random_bool(0.5) {
                        config.moving_platform_speed
                    } else {
                        -config.moving_platform_speed
                    },
                    min_x: margin,
                    max_x,
                });

            let id = self.alloc_id();
            platforms.push(Platform {
                id,
                x,
                y,
                width,
                height: config.base_platform_thickness,
                level,
                source: PlatformSource::Base,
                motion,
                staging: false,
            });
            y -= config.base_spacing;
        }

        platforms
    }

    /// Pickups and hazards seeded along the base field
    pub fn populate(&mut self, base: &[Platform], rng: &mut Pcg32) -> (Vec<Pickup>, Vec<Hazard>) {
        let config = self.config;
        let mut pickups = Vec::new();
        let mut hazards = Vec::new();

        for (k, platform) in base.iter().enumerate().skip(1) {
            let k = k as u32;
            let above = Vec2::new(platform.center_x(), platform.top() - 40.0);

            if config.powerup_every > 0 && k % config.powerup_every == 0 {
                let kind = ModifierKind::ALL[rng.random_range(0..ModifierKind::ALL.len())];
                let id = self.alloc_id();
                pickups.push(Pickup {
                    id,
                    kind: PickupKind::PowerUp(kind),
                    pos: above,
                    radius: PICKUP_RADIUS,
                });
            } else if config.crystal_every > 0 && k % config.crystal_every == 0 {
                let id = self.alloc_id();
                pickups.push(Pickup {
                    id,
                    kind: PickupKind::Crystal {
                        value: config.crystal_value,
                    },
                    pos: above,
                    radius: PICKUP_RADIUS,
                });
            }

            // Keep the first few jumps clear
            if config.hazard_every > 0 && k >= 3 && k % config.hazard_every == 0 {
                let kind = if platform.level == GeoLevel::Mantle || rng.random_bool(0.5) {
                    HazardKind::LavaBlob
                } else {
                    HazardKind::RockFragment
                };
                let origin = Vec2::new(
                    rng.random_range(60.0..=(self.geometry.total_width - 60.0).max(60.0)),
                    platform.top() - config.base_spacing / 2.0,
                );
                let id = self.alloc_id();
                hazards.push(Hazard::new(id, kind, origin));
            }
        }

        (pickups, hazards)
    }
}

/// Altitude band of a world y, measured as if the player stood there at the scroll threshold
pub fn level_at_world_y(config: &VolcanoConfig, world_y: f32) -> GeoLevel {
    let km = ((config.scroll_threshold_y() - world_y) / config.pixels_per_km).max(0.0);
    GeoLevel::for_km(km, config.crust_km, config.volcano_km)
}

/// Generate the complete world for a session
pub fn generate_world(config: &VolcanoConfig, geometry: &ConeGeometry) -> WorldLayout {
    let mut rng = Pcg32::seed_from_u64(config.seed);
    let mut generator = PlatformGenerator::new(config, geometry);

    let mut platforms = generator.generate_base(&mut rng);
    let (pickups, hazards) = generator.populate(&platforms, &mut rng);
    platforms.extend(generator.generate());
    if config.dynamic_platforms {
        platforms.extend(generator.generate_dynamic(&mut rng));
    }

    WorldLayout {
        platforms,
        pickups,
        hazards,
        next_id: generator.next_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn setup() -> (VolcanoConfig, ConeGeometry) {
        let config = VolcanoConfig::default();
        let geometry = ConeGeometry::from_config(&config);
        (config, geometry)
    }

    #[test]
    fn test_platform_count_follows_passage_width() {
        let (config, _) = setup();
        let wide = PassageBounds { left: 100.0, right: 350.0 };
        let medium = PassageBounds { left: 100.0, right: 250.0 };
        let narrow = PassageBounds { left: 100.0, right: 200.0 };
        assert_eq!(layout_level(wide, &config).unwrap().xs.len(), 3);
        assert_eq!(layout_level(medium, &config).unwrap().xs.len(), 2);
        assert_eq!(layout_level(narrow, &config).unwrap().xs.len(), 1);
    }

    #[test]
    fn test_narrow_passage_is_skipped() {
        let (config, _) = setup();
        assert!(layout_level(PassageBounds { left: 0.0, right: 45.0 }, &config).is_none());
        assert!(layout_level(PassageBounds { left: 10.0, right: 10.0 }, &config).is_none());
        assert!(layout_level(PassageBounds { left: 20.0, right: 5.0 }, &config).is_none());
    }

    #[test]
    fn test_reference_base_level() {
        let (config, geometry) = setup();
        let layout = layout_level(geometry.passage_bounds(0.0), &config).unwrap();
        assert_eq!(layout.width, 70.0);
        assert_eq!(layout.xs.len(), 3);
        assert!((layout.xs[0] - 115.0).abs() < 1e-3);
        assert!((layout.xs[2] - (495.0 - 70.0 - 10.0)).abs() < 1e-3);
        // Middle platform sits halfway between the outer two
        assert!((layout.xs[1] - (layout.xs[0] + layout.xs[2]) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_staging_platform_is_last_and_centred() {
        let (config, geometry) = setup();
        let platforms = PlatformGenerator::new(&config, &geometry).generate();
        let staging = platforms.last().unwrap();
        assert!(staging.staging);
        assert_eq!(platforms.iter().filter(|p| p.staging).count(), 1);
        assert!((staging.center_x() - 300.0).abs() < 1e-3);
        assert!((staging.y - (geometry.top_y() + 150.0)).abs() < 1e-3);
    }

    #[test]
    fn test_surface_generation_is_deterministic() {
        let (config, geometry) = setup();
        let a = generate_world(&config, &geometry);
        let b = generate_world(&config, &geometry);
        assert_eq!(a.platforms, b.platforms);
        assert_eq!(a.next_id, b.next_id);

        let other = VolcanoConfig::with_seed(config.seed + 1);
        let c = generate_world(&other, &ConeGeometry::from_config(&other));
        assert_ne!(a.platforms, c.platforms);
    }

    #[test]
    fn test_base_field_reaches_volcano() {
        let (config, geometry) = setup();
        let layout = generate_world(&config, &geometry);
        let base: Vec<_> = layout
            .platforms
            .iter()
            .filter(|p| p.source == PlatformSource::Base)
            .collect();
        assert!(base.len() > 20);
        assert!(base.iter().all(|p| p.y > geometry.base_y));
        assert!(base.iter().any(|p| p.level == GeoLevel::Crust));
        // Vertical spacing never exceeds a bounce
        for pair in base.windows(2) {
            assert!(pair[0].y - pair[1].y <= config.base_spacing + 1e-3);
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let (config, geometry) = setup();
        let layout = generate_world(&config, &geometry);
        let mut ids: Vec<u32> = layout.platforms.iter().map(|p| p.id).collect();
        ids.extend(layout.pickups.iter().map(|p| p.id));
        ids.extend(layout.hazards.iter().map(|h| h.id));
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert!(ids.iter().all(|&id| id < layout.next_id));
    }

    #[test]
    fn test_zero_spacing_yields_no_levels() {
        let (mut config, _) = setup();
        config.level_spacing = 0.0;
        let geometry = ConeGeometry::from_config(&config);
        let platforms = PlatformGenerator::new(&config, &geometry).generate();
        // Only the staging platform remains
        assert_eq!(platforms.len(), 1);
        assert!(platforms[0].staging);
    }

    proptest! {
        #[test]
        fn volcano_platforms_stay_inside_walls(
            seed in any::<u64>(),
            base in 0.4f32..0.9,
            crater in 0.05f32..0.35,
            spacing in 40.0f32..150.0,
        ) {
            let config = VolcanoConfig {
                seed,
                base_width_fraction: base,
                crater_width_fraction: crater,
                level_spacing: spacing,
                ..VolcanoConfig::default()
            };
            let geometry = ConeGeometry::from_config(&config);
            let mut generator = PlatformGenerator::new(&config, &geometry);
            let margin = config.platform_margin;
            let tolerance = 1e-3;

            // Fixed levels, checked at their generation ratio
            for platform in generator.generate().iter().filter(|p| !p.staging) {
                let i = ((geometry.base_y - platform.y) / config.level_spacing).round() as u32;
                let bounds = geometry.passage_bounds(generator.level_ratio(i));
                prop_assert!(bounds.left + margin <= platform.x + tolerance);
                prop_assert!(platform.right() <= bounds.right - margin + tolerance);
                // And at its actual world height
                let here = geometry.bounds_at(platform.y);
                prop_assert!(here.left + margin <= platform.x + tolerance);
                prop_assert!(platform.right() <= here.right - margin + tolerance);
            }

            // Moving platforms, over their whole lane
            let mut rng = Pcg32::seed_from_u64(seed);
            for platform in generator.generate_dynamic(&mut rng) {
                let motion = platform.motion.unwrap();
                let here = geometry.bounds_at(platform.y);
                prop_assert!(here.left + margin <= motion.min_x + tolerance);
                prop_assert!(motion.max_x + platform.width <= here.right - margin + tolerance);
            }
        }
    }
}
