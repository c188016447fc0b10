//! Conical passage geometry
//!
//! The volcano interior is a corridor centred in the world that narrows
//! linearly from the base to the crater. Everything that needs a wall
//! position (platform placement, wall containment, crater entry, moving
//! platform lanes) asks this module; nothing else re-derives the formula.
//!
//! Heights are expressed as a ratio: 0.0 at the volcano base, 1.0 at the
//! crater rim. World y grows downward, so the rim has the smallest world y.

use serde::{Deserialize, Serialize};

use crate::config::VolcanoConfig;

/// Horizontal extent of the passage at one height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PassageBounds {
    pub left: f32,
    pub right: f32,
}

impl PassageBounds {
    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn center(&self) -> f32 {
        (self.left + self.right) / 2.0
    }

    /// Zero, negative or non-finite bounds cannot contain anything
    pub fn is_degenerate(&self) -> bool {
        !self.left.is_finite() || !self.right.is_finite() || self.width() <= 0.0
    }

    /// Check if a horizontal coordinate lies inside the bounds (inclusive)
    pub fn contains_x(&self, x: f32) -> bool {
        x >= self.left && x <= self.right
    }

    /// Bounds shrunk by `margin` on both sides
    pub fn inset(&self, margin: f32) -> Self {
        Self {
            left: self.left + margin,
            right: self.right - margin,
        }
    }
}

/// Screen-space crater opening, for rendering and the eruption camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CraterInfo {
    pub left: f32,
    pub right: f32,
    pub top: f32,
}

/// The cone: passage width as a function of height ratio, anchored in world space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConeGeometry {
    /// Horizontal extent of the world
    pub total_width: f32,
    /// Passage width at ratio 0
    pub base_width: f32,
    /// Passage width at ratio 1
    pub crater_width: f32,
    /// World y of the volcano base
    pub base_y: f32,
    /// World distance from base to rim
    pub height: f32,
    /// Fixed screen y of the rim used by `crater_info`
    pub crater_top: f32,
    /// Depth below the rim that counts as inside the crater
    pub crater_depth: f32,
}

/// Clamp a height ratio into [0, 1]; NaN maps to the base
#[inline]
pub fn clamp_ratio(ratio: f32) -> f32 {
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

impl ConeGeometry {
    /// Build the cone for a config.
    ///
    /// The base is placed so that a player held at the scroll threshold is
    /// exactly at the base when the world offset reaches the volcano level.
    pub fn from_config(config: &VolcanoConfig) -> Self {
        Self {
            total_width: config.view_width,
            base_width: config.view_width * config.base_width_fraction,
            crater_width: config.view_width * config.crater_width_fraction,
            base_y: config.scroll_threshold_y() - config.volcano_offset(),
            height: config.volcano_height,
            crater_top: config.crater_top,
            crater_depth: config.crater_depth,
        }
    }

    /// Passage width at a height ratio (clamped to [0, 1])
    pub fn passage_width(&self, height_ratio: f32) -> f32 {
        let t = clamp_ratio(height_ratio);
        self.base_width - (self.base_width - self.crater_width) * t
    }

    /// Passage walls at a height ratio (clamped to [0, 1])
    pub fn passage_bounds(&self, height_ratio: f32) -> PassageBounds {
        let width = self.passage_width(height_ratio);
        let left = (self.total_width - width) / 2.0;
        PassageBounds {
            left,
            right: self.total_width - left,
        }
    }

    /// The crater opening is the passage at the rim
    pub fn crater_bounds(&self) -> PassageBounds {
        self.passage_bounds(1.0)
    }

    pub fn crater_info(&self) -> CraterInfo {
        let bounds = self.crater_bounds();
        CraterInfo {
            left: bounds.left,
            right: bounds.right,
            top: self.crater_top,
        }
    }

    /// World y of the crater rim
    #[inline]
    pub fn top_y(&self) -> f32 {
        self.base_y - self.height
    }

    /// World y at or above which the player counts as inside the crater
    #[inline]
    pub fn crater_threshold_y(&self) -> f32 {
        self.top_y() + self.crater_depth
    }

    /// World y of a height ratio
    pub fn y_at_ratio(&self, height_ratio: f32) -> f32 {
        self.base_y - clamp_ratio(height_ratio) * self.height
    }

    /// Height ratio of a world y, clamped to [0, 1]
    pub fn height_ratio_at(&self, world_y: f32) -> f32 {
        if self.height <= 0.0 {
            return if world_y <= self.base_y { 1.0 } else { 0.0 };
        }
        clamp_ratio((self.base_y - world_y) / self.height)
    }

    /// Passage walls at a world y
    pub fn bounds_at(&self, world_y: f32) -> PassageBounds {
        self.passage_bounds(self.height_ratio_at(world_y))
    }

    /// True when a world y lies between the base and the rim
    pub fn spans(&self, world_y: f32) -> bool {
        world_y <= self.base_y && world_y >= self.top_y()
    }
}
