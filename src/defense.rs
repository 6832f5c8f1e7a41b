// Copyright 2026 Hypermesh Foundation. All rights reserved.
// HelixNet Idle Simulation Engine - Defense Stack & Firewall

use serde::{Deserialize, Serialize};

use crate::types::{DefenseCategory, DefenseStatus, EngineError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Tiers in every category's progression chain.
pub const TIERS_PER_CATEGORY: u32 = 4;

/// Levels within one application tier.
pub const LEVELS_PER_APP_TIER: u32 = 5;

/// Defense points granted per level, doubled each tier.
const DP_PER_LEVEL: f64 = 10.0;

/// Damage reduction granted per level, scaled by tier; per-application cap
/// keeps any single contributor well below full mitigation.
const DR_PER_LEVEL: f64 = 0.01;
const APP_DR_CAP: f64 = 0.35;

const APP_COST_BASE: f64 = 100.0;
const APP_COST_LEVEL_GROWTH: f64 = 1.6;
const APP_COST_TIER_MULT: f64 = 3.0;

const APP_UNLOCK_BASE_COST: f64 = 500.0;
const APP_UNLOCK_COST_GROWTH: f64 = 5.0;

const FIREWALL_BASE_HEALTH: f64 = 100.0;
const FIREWALL_HEALTH_PER_LEVEL: f64 = 50.0;
const FIREWALL_BASE_REGEN: f64 = 1.0;
const FIREWALL_REGEN_PER_LEVEL: f64 = 0.5;
const FIREWALL_BASE_DR: f64 = 0.10;
const FIREWALL_DR_PER_LEVEL: f64 = 0.02;
const FIREWALL_DR_CAP: f64 = 0.60;
const FIREWALL_COST_BASE: f64 = 150.0;
const FIREWALL_COST_GROWTH: f64 = 1.8;

// ---------------------------------------------------------------------------
// DefenseApplication
// ---------------------------------------------------------------------------

/// One deployed defensive application. A category holds at most one; a higher
/// tier replaces the lower one in the same slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DefenseApplication {
    pub category: DefenseCategory,
    pub tier: u32,
    pub level: u32,
}

impl DefenseApplication {
    pub fn max_level(&self) -> u32 {
        LEVELS_PER_APP_TIER
    }

    pub fn defense_points(&self) -> f64 {
        self.level as f64 * DP_PER_LEVEL * 2f64.powi(self.tier as i32 - 1)
    }

    pub fn damage_reduction(&self) -> f64 {
        (self.level as f64 * DR_PER_LEVEL * self.tier as f64).min(APP_DR_CAP)
    }

    pub fn upgrade_cost(&self) -> f64 {
        APP_COST_BASE
            * APP_COST_LEVEL_GROWTH.powi(self.level as i32 - 1)
            * APP_COST_TIER_MULT.powi(self.tier as i32 - 1)
    }
}

/// Cost to deploy `tier` in a category (tier 1 is the initial deployment).
pub fn tier_unlock_cost(tier: u32) -> f64 {
    APP_UNLOCK_BASE_COST * APP_UNLOCK_COST_GROWTH.powi(tier as i32 - 1)
}

// ---------------------------------------------------------------------------
// Firewall (legacy perimeter unit)
// ---------------------------------------------------------------------------

/// The legacy perimeter unit. Lives outside the category slots but
/// contributes to combined damage reduction while its health holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Firewall {
    pub current_health: f64,
    pub max_health: f64,
    pub damage_reduction: f64,
    pub regen_per_tick: f64,
    pub level: u32,
}

impl Default for Firewall {
    fn default() -> Self {
        Self::new()
    }
}

impl Firewall {
    pub fn new() -> Self {
        Self {
            current_health: FIREWALL_BASE_HEALTH,
            max_health: FIREWALL_BASE_HEALTH,
            damage_reduction: FIREWALL_BASE_DR,
            regen_per_tick: FIREWALL_BASE_REGEN,
            level: 1,
        }
    }

    pub fn regenerate(&mut self) {
        self.current_health = (self.current_health + self.regen_per_tick).min(self.max_health);
    }

    /// Soak `damage` into health. Returns `(absorbed, overflow)`; health
    /// clamps at zero and the overflow falls through to the economy.
    pub fn absorb(&mut self, damage: f64) -> (f64, f64) {
        let absorbed = damage.min(self.current_health);
        self.current_health -= absorbed;
        (absorbed, damage - absorbed)
    }

    pub fn health_fraction(&self) -> f64 {
        if self.max_health > 0.0 {
            self.current_health / self.max_health
        } else {
            0.0
        }
    }

    pub fn is_up(&self) -> bool {
        self.current_health > 0.0
    }

    pub fn upgrade_cost(&self) -> f64 {
        FIREWALL_COST_BASE * FIREWALL_COST_GROWTH.powi(self.level as i32 - 1)
    }

    /// Raise level: more health headroom, faster regen, better mitigation.
    ///
    /// # Errors
    /// - `InsufficientFunds` below the upgrade cost.
    pub fn upgrade(&mut self, credits: &mut f64) -> Result<u32, EngineError> {
        let cost = self.upgrade_cost();
        if *credits < cost {
            return Err(EngineError::InsufficientFunds { required: cost, available: *credits });
        }
        *credits -= cost;
        self.level += 1;
        self.max_health += FIREWALL_HEALTH_PER_LEVEL;
        self.regen_per_tick += FIREWALL_REGEN_PER_LEVEL;
        self.damage_reduction = (FIREWALL_BASE_DR
            + FIREWALL_DR_PER_LEVEL * (self.level - 1) as f64)
            .min(FIREWALL_DR_CAP);
        Ok(self.level)
    }
}

// ---------------------------------------------------------------------------
// DefenseStack
// ---------------------------------------------------------------------------

/// Tiered, categorized defensive applications. One slot per category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DefenseStack {
    deployed: Vec<DefenseApplication>,
}

impl DefenseStack {
    pub fn new() -> Self {
        Self { deployed: Vec::new() }
    }

    pub fn application(&self, category: DefenseCategory) -> Option<&DefenseApplication> {
        self.deployed.iter().find(|a| a.category == category)
    }

    pub fn deployed(&self) -> &[DefenseApplication] {
        &self.deployed
    }

    pub fn deployed_count(&self) -> usize {
        self.deployed.len()
    }

    /// Deploy `tier` in `category`. Tier 1 opens the slot; tier N+1 replaces
    /// tier N once it has been levelled to its cap.
    ///
    /// # Errors
    /// - `AlreadyDeployed` when the slot already holds `tier` or higher.
    /// - `PrerequisiteNotMet` when skipping tiers, when the held tier is not
    ///   at max level, or when `tier` exceeds the category chain.
    /// - `InsufficientFunds` below the unlock cost.
    pub fn deploy(
        &mut self,
        category: DefenseCategory,
        tier: u32,
        credits: &mut f64,
    ) -> Result<(), EngineError> {
        if tier == 0 || tier > TIERS_PER_CATEGORY {
            return Err(EngineError::PrerequisiteNotMet(
                "tier outside the category's progression chain",
            ));
        }
        let current = self.application(category).copied();
        match current {
            Some(app) if tier <= app.tier => return Err(EngineError::AlreadyDeployed),
            Some(app) if tier > app.tier + 1 => {
                return Err(EngineError::PrerequisiteNotMet("tiers unlock one at a time"));
            }
            Some(app) if app.level < app.max_level() => {
                return Err(EngineError::PrerequisiteNotMet(
                    "previous tier must reach max level first",
                ));
            }
            None if tier != 1 => {
                return Err(EngineError::PrerequisiteNotMet(
                    "category starts at tier 1",
                ));
            }
            _ => {}
        }
        let cost = tier_unlock_cost(tier);
        if *credits < cost {
            return Err(EngineError::InsufficientFunds { required: cost, available: *credits });
        }
        *credits -= cost;
        let replacement = DefenseApplication { category, tier, level: 1 };
        match self.deployed.iter_mut().find(|a| a.category == category) {
            Some(slot) => *slot = replacement,
            None => self.deployed.push(replacement),
        }
        Ok(())
    }

    /// Level up the application holding `category`.
    ///
    /// # Errors
    /// - `PrerequisiteNotMet` when the slot is empty.
    /// - `AlreadyAtMaxLevel` at the tier's level cap.
    /// - `InsufficientFunds` below the upgrade cost.
    pub fn upgrade(
        &mut self,
        category: DefenseCategory,
        credits: &mut f64,
    ) -> Result<u32, EngineError> {
        let app = self
            .deployed
            .iter_mut()
            .find(|a| a.category == category)
            .ok_or(EngineError::PrerequisiteNotMet("nothing deployed in this category"))?;
        if app.level >= app.max_level() {
            return Err(EngineError::AlreadyAtMaxLevel);
        }
        let cost = app.upgrade_cost();
        if *credits < cost {
            return Err(EngineError::InsufficientFunds { required: cost, available: *credits });
        }
        *credits -= cost;
        app.level += 1;
        Ok(app.level)
    }

    pub fn total_defense_points(&self) -> f64 {
        self.deployed.iter().map(|a| a.defense_points()).sum()
    }
}

// ---------------------------------------------------------------------------
// Combined mitigation and status
// ---------------------------------------------------------------------------

/// Standard diminishing-returns combination over the firewall and every
/// deployed application: `1 - Π(1 - r_i)`. A dead firewall contributes
/// nothing. The result is strictly below 1 for any contributor set.
pub fn combined_reduction(firewall: &Firewall, stack: &DefenseStack) -> f64 {
    let mut passthrough = if firewall.is_up() {
        1.0 - firewall.damage_reduction
    } else {
        1.0
    };
    for app in stack.deployed() {
        passthrough *= 1.0 - app.damage_reduction();
    }
    1.0 - passthrough
}

/// Derive the stack's overall status from category coverage and firewall
/// health. Lower coverage and lower health map to more severe statuses.
pub fn overall_status(firewall: &Firewall, stack: &DefenseStack) -> DefenseStatus {
    let coverage = stack.deployed_count() as f64 / DefenseCategory::ALL.len() as f64;
    let score = 0.5 * coverage + 0.5 * firewall.health_fraction();
    if score >= 0.8 {
        DefenseStatus::Nominal
    } else if score >= 0.45 {
        DefenseStatus::Degraded
    } else if score >= 0.3 {
        DefenseStatus::Alert
    } else if score >= 0.1 {
        DefenseStatus::Critical
    } else {
        DefenseStatus::Offline
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn maxed_stack() -> DefenseStack {
        let mut stack = DefenseStack::new();
        let mut credits = f64::MAX;
        for category in DefenseCategory::ALL {
            for tier in 1..=TIERS_PER_CATEGORY {
                stack.deploy(category, tier, &mut credits).unwrap();
                while stack.upgrade(category, &mut credits).is_ok() {}
            }
        }
        stack
    }

    #[test]
    fn combined_reduction_saturates_below_one() {
        let stack = maxed_stack();
        let mut firewall = Firewall::new();
        let mut credits = f64::MAX;
        for _ in 0..50 {
            firewall.upgrade(&mut credits).unwrap();
        }
        let combined = combined_reduction(&firewall, &stack);
        assert!(combined < 1.0, "combined reduction reached {combined}");
        // And stacking helps: strictly more than the firewall alone.
        assert!(combined > firewall.damage_reduction);
    }

    #[test]
    fn dead_firewall_contributes_no_reduction() {
        let stack = DefenseStack::new();
        let mut firewall = Firewall::new();
        firewall.absorb(firewall.current_health);
        assert_eq!(combined_reduction(&firewall, &stack), 0.0);
    }

    #[test]
    fn deploy_rejects_skips_and_regressions() {
        let mut stack = DefenseStack::new();
        let mut credits = f64::MAX;
        assert!(matches!(
            stack.deploy(DefenseCategory::Antivirus, 2, &mut credits),
            Err(EngineError::PrerequisiteNotMet(_))
        ));
        stack.deploy(DefenseCategory::Antivirus, 1, &mut credits).unwrap();
        assert_eq!(
            stack.deploy(DefenseCategory::Antivirus, 1, &mut credits),
            Err(EngineError::AlreadyDeployed)
        );
        // Tier 2 requires tier 1 at max level.
        assert!(matches!(
            stack.deploy(DefenseCategory::Antivirus, 2, &mut credits),
            Err(EngineError::PrerequisiteNotMet(_))
        ));
        while stack.upgrade(DefenseCategory::Antivirus, &mut credits).is_ok() {}
        stack.deploy(DefenseCategory::Antivirus, 2, &mut credits).unwrap();
        let app = stack.application(DefenseCategory::Antivirus).unwrap();
        assert_eq!((app.tier, app.level), (2, 1));
        assert_eq!(stack.deployed_count(), 1, "category slot must stay unique");
    }

    #[test]
    fn rejected_deploy_leaves_credits_untouched() {
        let mut stack = DefenseStack::new();
        let mut credits = 10.0;
        let before = stack.clone();
        assert!(matches!(
            stack.deploy(DefenseCategory::Honeypot, 1, &mut credits),
            Err(EngineError::InsufficientFunds { .. })
        ));
        assert_eq!(stack, before);
        assert_eq!(credits, 10.0);
    }

    #[test]
    fn firewall_absorb_clamps_at_zero() {
        let mut firewall = Firewall::new();
        let (absorbed, overflow) = firewall.absorb(150.0);
        assert_eq!(absorbed, 100.0);
        assert_eq!(overflow, 50.0);
        assert_eq!(firewall.current_health, 0.0);
        firewall.regenerate();
        assert_eq!(firewall.current_health, firewall.regen_per_tick);
    }

    #[test]
    fn status_degrades_with_coverage_and_health() {
        let firewall = Firewall::new();
        let empty = DefenseStack::new();
        assert_eq!(overall_status(&firewall, &empty), DefenseStatus::Degraded);
        assert_eq!(overall_status(&firewall, &maxed_stack()), DefenseStatus::Nominal);

        let mut dead = Firewall::new();
        dead.absorb(dead.current_health);
        assert_eq!(overall_status(&dead, &empty), DefenseStatus::Offline);
    }
}
