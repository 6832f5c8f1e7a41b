// Copyright 2026 Hypermesh Foundation. All rights reserved.
// HelixNet Idle Simulation Engine - Prestige Ledger

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lifetime credits needed for the first prestige, growing geometrically
/// with each level taken.
const PRESTIGE_BASE_REQUIREMENT: f64 = 1_000_000.0;
const PRESTIGE_REQUIREMENT_GROWTH: f64 = 2.5;

/// Helix cores awarded scale with the square root of credits held at reset.
const CORE_REWARD_DIVISOR: f64 = 10_000.0;

/// Permanent multiplier growth per prestige level.
const PRODUCTION_MULT_GROWTH: f64 = 1.25;
const CREDIT_MULT_GROWTH: f64 = 1.15;

// ---------------------------------------------------------------------------
// Pure pacing functions
// ---------------------------------------------------------------------------

/// Lifetime credits required to take the prestige at `prestige_level`.
pub fn credits_required(prestige_level: u32) -> f64 {
    PRESTIGE_BASE_REQUIREMENT * PRESTIGE_REQUIREMENT_GROWTH.powi(prestige_level as i32)
}

/// Helix cores awarded for resetting while holding `credits_at_reset`.
pub fn core_reward(credits_at_reset: f64) -> f64 {
    (credits_at_reset.max(0.0) / CORE_REWARD_DIVISOR).sqrt().floor().max(1.0)
}

// ---------------------------------------------------------------------------
// PrestigeState
// ---------------------------------------------------------------------------

/// The multiplicative bonus ledger. Survives every reset; only `advance`
/// mutates it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrestigeState {
    pub prestige_level: u32,
    /// Cumulative meta-currency, unaffected by resets.
    pub total_helix_cores: f64,
    pub production_multiplier: f64,
    pub credit_multiplier: f64,
}

impl Default for PrestigeState {
    fn default() -> Self {
        Self::new()
    }
}

impl PrestigeState {
    pub fn new() -> Self {
        Self {
            prestige_level: 0,
            total_helix_cores: 0.0,
            production_multiplier: 1.0,
            credit_multiplier: 1.0,
        }
    }

    pub fn credits_required(&self) -> f64 {
        credits_required(self.prestige_level)
    }

    /// Record one taken prestige: level up, bank the core reward, compound
    /// both permanent multipliers. Returns the cores awarded.
    pub fn advance(&mut self, credits_at_reset: f64) -> f64 {
        let cores = core_reward(credits_at_reset);
        self.prestige_level += 1;
        self.total_helix_cores += cores;
        self.production_multiplier *= PRODUCTION_MULT_GROWTH;
        self.credit_multiplier *= CREDIT_MULT_GROWTH;
        cores
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
