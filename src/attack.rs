// Copyright 2026 Hypermesh Foundation. All rights reserved.
// HelixNet Idle Simulation Engine - Attack Lifecycle

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::defense::Firewall;
use crate::types::{AttackType, AttackView, EngineError, ThreatTier};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Trigger chance per dormant tick at the top of the risk scale.
const MAX_TRIGGER_RATE: f64 = 0.05;

/// Superlinear exponent keeps low-tier attacks rare without a hard cutoff
/// (the floor tier is exactly zero regardless).
const TRIGGER_CURVE: f64 = 1.8;

/// Severity range endpoints, scaled by effective-risk index.
const SEVERITY_BASE: f64 = 1.0;
const SEVERITY_MIN_PER_TIER: f64 = 0.05;
const SEVERITY_MAX_PER_TIER: f64 = 0.15;

// ---------------------------------------------------------------------------
// Attack
// ---------------------------------------------------------------------------

/// A live attack. Exists only while active; destroyed on resolution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Attack {
    pub attack_type: AttackType,
    pub severity: f64,
    pub start_tick: u64,
    pub damage_dealt: f64,
}

impl Attack {
    /// Linear progress toward resolution over the type's fixed duration.
    pub fn progress(&self, now: u64) -> f64 {
        let elapsed = now.saturating_sub(self.start_tick) as f64;
        (elapsed / self.attack_type.duration_ticks() as f64).min(1.0)
    }

    pub fn view(&self, now: u64) -> AttackView {
        AttackView {
            attack_type: self.attack_type,
            severity: self.severity,
            start_tick: self.start_tick,
            progress: self.progress(now),
            damage_dealt: self.damage_dealt,
        }
    }
}

/// Closed attack lifecycle. Trigger and activation collapse into the same
/// tick, so only two states are representable between ticks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum AttackState {
    Dormant,
    Active(Attack),
}

impl Default for AttackState {
    fn default() -> Self {
        AttackState::Dormant
    }
}

// ---------------------------------------------------------------------------
// Trigger probability (pure)
// ---------------------------------------------------------------------------

/// Per-tick trigger chance while dormant. Monotonic and superlinear in the
/// effective-risk index; exactly zero at the floor tier.
pub fn trigger_probability(effective_risk: ThreatTier) -> f64 {
    let idx = effective_risk.index() as f64;
    let top = (ThreatTier::COUNT - 1) as f64;
    MAX_TRIGGER_RATE * (idx / top).powf(TRIGGER_CURVE)
}

fn severity_range(effective_risk: ThreatTier) -> (f64, f64) {
    let idx = effective_risk.index() as f64;
    (
        SEVERITY_BASE + idx * SEVERITY_MIN_PER_TIER,
        SEVERITY_BASE + idx * SEVERITY_MAX_PER_TIER,
    )
}

/// Weighted draw over the types unlocked at this risk tier. Only called with
/// a non-floor tier, which always leaves PortScan in the pool.
fn choose_attack_type<R: Rng>(rng: &mut R, effective_risk: ThreatTier) -> AttackType {
    let idx = effective_risk.index();
    let pool: Vec<AttackType> = AttackType::ALL
        .iter()
        .copied()
        .filter(|t| t.min_tier_index() <= idx)
        .collect();
    let total: f64 = pool.iter().map(|t| t.base_weight()).sum();
    let mut roll = rng.gen::<f64>() * total;
    for t in &pool {
        roll -= t.base_weight();
        if roll <= 0.0 {
            return *t;
        }
    }
    pool[pool.len() - 1]
}

// ---------------------------------------------------------------------------
// Step report
// ---------------------------------------------------------------------------

/// How a resolved attack ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AttackResolution {
    pub attack_type: AttackType,
    pub survived: bool,
    pub damage_dealt: f64,
}

/// Everything one resolver tick did, for the scheduler to fold into
/// TickStats and the event stream.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AttackTickReport {
    pub started: Option<Attack>,
    /// Post-mitigation damage inflicted this tick (absorbed + drained).
    pub damage_inflicted: f64,
    pub damage_absorbed: f64,
    pub credits_drained: f64,
    pub resolution: Option<AttackResolution>,
}

// ---------------------------------------------------------------------------
// AttackResolver
// ---------------------------------------------------------------------------

/// Drives the Dormant → Active → Resolved lifecycle against the defense
/// layer and the credit balance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AttackResolver {
    state: AttackState,
}

impl AttackResolver {
    pub fn new() -> Self {
        Self { state: AttackState::Dormant }
    }

    /// Rebuild from a persisted lifecycle state.
    pub fn from_state(state: AttackState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AttackState {
        &self.state
    }

    pub fn active_view(&self, now: u64) -> Option<AttackView> {
        match &self.state {
            AttackState::Active(attack) => Some(attack.view(now)),
            AttackState::Dormant => None,
        }
    }

    /// One resolver tick.
    ///
    /// Dormant: roll the trigger check against the effective risk (skipped
    /// while the critical alarm is unacknowledged). Active: apply mitigated
    /// damage to the firewall, overflow to credits, then resolve when
    /// progress reaches 1.
    pub fn step<R: Rng>(
        &mut self,
        now: u64,
        effective_risk: ThreatTier,
        combined_reduction: f64,
        firewall: &mut Firewall,
        credits: &mut f64,
        suppressed: bool,
        rng: &mut R,
    ) -> AttackTickReport {
        let mut report = AttackTickReport::default();
        let mut finished = false;
        match &mut self.state {
            AttackState::Dormant => {
                if suppressed {
                    return report;
                }
                let p = trigger_probability(effective_risk);
                if p > 0.0 && rng.gen::<f64>() < p {
                    let (lo, hi) = severity_range(effective_risk);
                    let attack = Attack {
                        attack_type: choose_attack_type(rng, effective_risk),
                        severity: rng.gen_range(lo..=hi),
                        start_tick: now,
                        damage_dealt: 0.0,
                    };
                    self.state = AttackState::Active(attack);
                    report.started = Some(attack);
                }
            }
            AttackState::Active(attack) => {
                let raw = attack.severity * attack.attack_type.base_damage_rate();
                let effective = raw * (1.0 - combined_reduction);
                let (absorbed, overflow) = firewall.absorb(effective);
                let drained = overflow.min(*credits);
                *credits -= drained;

                attack.damage_dealt += effective;
                report.damage_inflicted = effective;
                report.damage_absorbed = absorbed;
                report.credits_drained = drained;

                finished = attack.progress(now) >= 1.0;
            }
        }
        if finished {
            if let Ok(resolution) = self.resolve(firewall) {
                report.resolution = Some(resolution);
            }
        }
        report
    }

    /// Resolve the active attack: survived when the firewall still stands or
    /// total damage stayed under the type's fatal threshold.
    ///
    /// # Errors
    /// - `InvalidTransition` when no attack is active. Unreachable from the
    ///   tick loop; fatal in debug builds.
    pub fn resolve(&mut self, firewall: &Firewall) -> Result<AttackResolution, EngineError> {
        let attack = match self.state {
            AttackState::Active(attack) => attack,
            AttackState::Dormant => {
                debug_assert!(false, "resolve called with no active attack");
                return Err(EngineError::InvalidTransition(
                    "cannot resolve an attack that is not active",
                ));
            }
        };
        let survived =
            firewall.is_up() || attack.damage_dealt < attack.attack_type.fatal_threshold();
        self.state = AttackState::Dormant;
        Ok(AttackResolution {
            attack_type: attack.attack_type,
            survived,
            damage_dealt: attack.damage_dealt,
        })
    }

    /// Prestige reset: any in-flight attack simply evaporates.
    pub fn reset(&mut self) {
        self.state = AttackState::Dormant;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn trigger_probability_is_zero_at_floor_and_monotone() {
        assert_eq!(trigger_probability(ThreatTier::Baseline), 0.0);
        let mut last = 0.0;
        for tier in ThreatTier::ALL {
            let p = trigger_probability(tier);
            assert!(p >= last);
            last = p;
        }
        assert!(last <= MAX_TRIGGER_RATE);
    }

    #[test]
    fn floor_tier_never_triggers() {
        let mut resolver = AttackResolver::new();
        let mut firewall = Firewall::new();
        let mut credits = 1_000.0;
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for now in 1..=100 {
            let report = resolver.step(
                now,
                ThreatTier::Baseline,
                0.0,
                &mut firewall,
                &mut credits,
                false,
                &mut rng,
            );
            assert!(report.started.is_none());
        }
        assert_eq!(*resolver.state(), AttackState::Dormant);
        assert_eq!(credits, 1_000.0);
    }

    #[test]
    fn type_pool_respects_tier_gates() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            let t = choose_attack_type(&mut rng, ThreatTier::Scanning);
            assert_eq!(t, AttackType::PortScan);
        }
        let mut seen_heavy = false;
        for _ in 0..500 {
            let t = choose_attack_type(&mut rng, ThreatTier::TotalBlackout);
            assert!(t.min_tier_index() <= ThreatTier::TotalBlackout.index());
            seen_heavy |= t == AttackType::ZeroDay;
        }
        assert!(seen_heavy, "zero-day never drawn at top tier");
    }

    #[test]
    fn mitigated_damage_overflows_firewall_into_credits() {
        // severity 2.5, reduction 0.6, firewall at 50: the reference fixture.
        let attack = Attack {
            attack_type: AttackType::Ransomware,
            severity: 2.5,
            start_tick: 0,
            damage_dealt: 0.0,
        };
        let mut resolver = AttackResolver::from_state(AttackState::Active(attack));
        let mut firewall = Firewall::new();
        firewall.current_health = 50.0;
        let mut credits = 1_000.0;
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let mut total_absorbed = 0.0;
        let mut total_drained = 0.0;
        let mut resolution = None;
        for now in 1..=attack.attack_type.duration_ticks() {
            let report = resolver.step(
                now, ThreatTier::RansomwareWave, 0.6,
                &mut firewall, &mut credits, false, &mut rng,
            );
            let raw = 2.5 * AttackType::Ransomware.base_damage_rate();
            assert!((report.damage_inflicted - raw * 0.4).abs() < 1e-9);
            total_absorbed += report.damage_absorbed;
            total_drained += report.credits_drained;
            if let Some(res) = report.resolution {
                resolution = Some(res);
            }
        }

        // 15 ticks x 6.0 effective damage = 90; firewall soaks 50, the
        // remaining 40 drains from credits.
        assert!((total_absorbed - 50.0).abs() < 1e-9);
        assert!((total_drained - 40.0).abs() < 1e-9);
        assert_eq!(firewall.current_health, 0.0);
        assert!((credits - 960.0).abs() < 1e-9);

        // Firewall dead and damage over the fatal threshold: critical.
        let resolution = resolution.expect("attack should have resolved");
        assert!(!resolution.survived);
        assert!((resolution.damage_dealt - 90.0).abs() < 1e-9);
    }

    #[test]
    fn surviving_firewall_resolves_as_survived() {
        let attack = Attack {
            attack_type: AttackType::PortScan,
            severity: 1.0,
            start_tick: 0,
            damage_dealt: 0.0,
        };
        let mut resolver = AttackResolver::from_state(AttackState::Active(attack));
        let mut firewall = Firewall::new();
        let mut credits = 100.0;
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut resolution = None;
        for now in 1..=AttackType::PortScan.duration_ticks() {
            let report = resolver.step(
                now, ThreatTier::Scanning, 0.0,
                &mut firewall, &mut credits, false, &mut rng,
            );
            if let Some(res) = report.resolution {
                resolution = Some(res);
            }
        }
        assert!(resolution.expect("resolved").survived);
        assert_eq!(*resolver.state(), AttackState::Dormant);
        assert_eq!(credits, 100.0, "absorbed attack must not touch credits");
    }

    #[test]
    fn suppressed_dormant_tick_never_triggers() {
        let mut resolver = AttackResolver::new();
        let mut firewall = Firewall::new();
        let mut credits = 0.0;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for now in 1..=500 {
            let report = resolver.step(
                now, ThreatTier::TotalBlackout, 0.0,
                &mut firewall, &mut credits, true, &mut rng,
            );
            assert!(report.started.is_none());
        }
    }
}
