// Copyright 2026 Hypermesh Foundation. All rights reserved.
// HelixNet Idle Simulation Engine - Threat Escalation

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::defense::{self, DefenseStack, Firewall};
use crate::types::ThreatTier;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Peak per-tick escalation chance at difficulty 1.0.
const BASE_ESCALATION_RATE: f64 = 0.08;
const MAX_ESCALATION_RATE: f64 = 0.25;

/// Time constant (ticks) for escalation pressure build-up.
const ESCALATION_TIME_SCALE: f64 = 400.0;

/// Half-saturation point for wealth pressure (lifetime credits).
const ESCALATION_WEALTH_SCALE: f64 = 25_000.0;

/// Defense points per one ordinal step of net defense.
const DP_PER_DEFENSE_STEP: f64 = 75.0;

/// Extra ordinal steps granted by full combined damage reduction.
const REDUCTION_STEP_WEIGHT: f64 = 6.0;

// ---------------------------------------------------------------------------
// Escalation probability (pure)
// ---------------------------------------------------------------------------

/// Per-tick probability that the raw threat level advances one step.
///
/// Monotonically non-decreasing in all three arguments: pressure builds with
/// time since the last escalation, with lifetime credits earned, and with
/// configured difficulty. Zero at the start of a fresh run.
pub fn escalation_probability(
    ticks_since_escalation: u64,
    credits_earned: f64,
    difficulty: f64,
) -> f64 {
    let time_pressure = 1.0 - (-(ticks_since_escalation as f64) / ESCALATION_TIME_SCALE).exp();
    let wealth_pressure = if credits_earned > 0.0 {
        credits_earned / (credits_earned + ESCALATION_WEALTH_SCALE)
    } else {
        0.0
    };
    (BASE_ESCALATION_RATE * difficulty * (time_pressure + wealth_pressure) / 2.0)
        .min(MAX_ESCALATION_RATE)
}

/// Map combined defense strength onto the ordinal tier scale. Deterministic;
/// recomputed whenever the stack or the firewall changes.
pub fn net_defense_steps(total_defense_points: f64, combined_reduction: f64) -> u32 {
    let dp_steps = total_defense_points / DP_PER_DEFENSE_STEP;
    let dr_steps = combined_reduction * REDUCTION_STEP_WEIGHT;
    (dp_steps + dr_steps).floor() as u32
}

// ---------------------------------------------------------------------------
// ThreatState
// ---------------------------------------------------------------------------

/// The adversary's side of the board: the raw escalation track, the derived
/// defense offset, and the run's lifetime counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThreatState {
    pub current_level: ThreatTier,
    pub net_defense_level: u32,
    pub ticks_since_escalation: u64,
    /// Monotonically non-decreasing within a run; zeroed by prestige.
    pub attacks_survived: u32,
    pub total_damage_received: f64,
    pub total_credits_earned: f64,
}

impl Default for ThreatState {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreatState {
    pub fn new() -> Self {
        Self {
            current_level: ThreatTier::Baseline,
            net_defense_level: 0,
            ticks_since_escalation: 0,
            attacks_survived: 0,
            total_damage_received: 0.0,
            total_credits_earned: 0.0,
        }
    }

    /// One escalation roll. At most one tier step per tick; suppressed while
    /// a critical alarm awaits acknowledgment.
    pub fn advance_tick<R: Rng>(&mut self, rng: &mut R, difficulty: f64, suppressed: bool) -> bool {
        self.ticks_since_escalation += 1;
        if suppressed || self.current_level.is_top() {
            return false;
        }
        let p = escalation_probability(
            self.ticks_since_escalation,
            self.total_credits_earned,
            difficulty,
        );
        if rng.gen::<f64>() < p {
            self.current_level = self.current_level.next();
            self.ticks_since_escalation = 0;
            true
        } else {
            false
        }
    }

    /// Refresh `net_defense_level` from the current defense configuration.
    pub fn recompute_defense(&mut self, firewall: &Firewall, stack: &DefenseStack) {
        self.net_defense_level = net_defense_steps(
            stack.total_defense_points(),
            defense::combined_reduction(firewall, stack),
        );
    }

    /// Raw threat offset downward by net defense, clamped at the floor tier.
    pub fn effective_risk_level(&self) -> ThreatTier {
        ThreatTier::from_index(
            self.current_level.index().saturating_sub(self.net_defense_level),
        )
    }

    /// Prestige reset: back to the floor with zeroed counters.
    pub fn reset(&mut self) {
        let net_defense_level = self.net_defense_level;
        *self = Self::new();
        // Defense installations survive prestige, so the offset does too.
        self.net_defense_level = net_defense_level;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
