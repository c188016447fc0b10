//! Eruption sequence
//!
//! Entering the crater in the volcano level locks the camera, grants the
//! eruption bonus once, and after a fixed duration ends the session.
//! The machine only moves forward: Dormant -> Active -> Rewarded -> Transitioning.

use serde::{Deserialize, Serialize};

use super::state::GeoLevel;

/// Eruption phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EruptionPhase {
    #[default]
    Dormant,
    /// Camera locked, bonus pending
    Active,
    /// Bonus granted, waiting out the sequence
    Rewarded,
    /// Sequence over, session complete
    Transitioning,
}

/// What changed in a single step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EruptionTransition {
    Activated { frozen_offset: f32 },
    Rewarded { bonus: u64 },
    Completed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EruptionState {
    pub phase: EruptionPhase,
    /// Session clock (ms) at activation.
    ///
    /// This is the simulated clock, the sum of tick `dt`, not wall time. Under
    /// the fixed-tick driver the two agree, but paused ticks do not advance it,
    /// so a paused eruption resumes with its remaining duration intact.
    pub start_ms: f64,
    /// World offset held while the eruption plays
    pub frozen_offset: f32,
    pub bonus_granted: bool,
}

impl EruptionState {
    pub fn is_dormant(&self) -> bool {
        self.phase == EruptionPhase::Dormant
    }

    /// Camera is locked in every phase after activation
    pub fn is_locked(&self) -> bool {
        !self.is_dormant()
    }

    /// Milliseconds since activation, zero while dormant
    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        if self.is_dormant() {
            0.0
        } else {
            (now_ms - self.start_ms).max(0.0)
        }
    }

    /// Advance the machine by at most one phase.
    ///
    /// Activation needs the volcano level and the player inside the crater.
    /// The bonus is granted on the step after activation and never again.
    /// Transitioning is terminal; further steps return `None`.
    pub fn step(
        &mut self,
        level: GeoLevel,
        in_crater: bool,
        world_offset: f32,
        now_ms: f64,
        bonus: u64,
        duration_ms: f64,
    ) -> Option<EruptionTransition> {
        match self.phase {
            EruptionPhase::Dormant => {
                if level != GeoLevel::Volcano || !in_crater {
                    return None;
                }
                self.phase = EruptionPhase::Active;
                self.start_ms = now_ms;
                self.frozen_offset = world_offset;
                log::info!("Eruption activated at offset {:.1}", world_offset);
                Some(EruptionTransition::Activated {
                    frozen_offset: world_offset,
                })
            }
            EruptionPhase::Active => {
                self.phase = EruptionPhase::Rewarded;
                if self.bonus_granted {
                    return None;
                }
                self.bonus_granted = true;
                Some(EruptionTransition::Rewarded { bonus })
            }
            EruptionPhase::Rewarded => {
                if now_ms - self.start_ms < duration_ms {
                    return None;
                }
                self.phase = EruptionPhase::Transitioning;
                log::info!("Eruption finished after {:.0} ms", now_ms - self.start_ms);
                Some(EruptionTransition::Completed)
            }
            EruptionPhase::Transitioning => None,
        }
    }
}
