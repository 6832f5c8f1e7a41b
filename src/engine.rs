// Copyright 2026 Hypermesh Foundation. All rights reserved.
// HelixNet Idle Simulation Engine - Tick Scheduler & Ownership Boundary

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wasm_bindgen::prelude::*;

use crate::attack::AttackResolver;
use crate::defense::{self, DefenseStack, Firewall};
use crate::economy::EconomyPipeline;
use crate::offline::{self, OfflineProgress};
use crate::prestige::PrestigeState;
use crate::snapshot::{EngineSnapshot, SnapshotError, SNAPSHOT_VERSION};
use crate::threat::ThreatState;
use crate::types::{
    DefenseCategory, EngineConfig, EngineError, EngineEvent, NodeKind, TickResult, TickStats,
};

// ─── HelixEngine ─────────────────────────────────────────────────────────────

/// The single ownership boundary over the whole simulation. External layers
/// only see `TickResult`s, snapshots, and the explicit command methods below;
/// nothing outside this struct mutates engine state.
///
/// Single-threaded by construction: commands apply between ticks, never
/// mid-tick, so every `TickStats` reflects one consistent state.
#[wasm_bindgen]
pub struct HelixEngine {
    pub(crate) config: EngineConfig,
    pub(crate) credits: f64,
    pub(crate) tick: u64,
    pub(crate) running: bool,
    pub(crate) alarm_active: bool,
    pub(crate) economy: EconomyPipeline,
    pub(crate) defense: DefenseStack,
    pub(crate) firewall: Firewall,
    pub(crate) threat: ThreatState,
    pub(crate) resolver: AttackResolver,
    pub(crate) prestige: PrestigeState,
    pub(crate) offline: Option<OfflineProgress>,
    pub(crate) last_stats: TickStats,
    pub(crate) events: Vec<EngineEvent>,
    pub(crate) rng: ChaCha8Rng,
}

impl Default for HelixEngine {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl HelixEngine {
    pub fn with_config(config: EngineConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        let mut engine = Self {
            config,
            credits: 0.0,
            tick: 0,
            running: true,
            alarm_active: false,
            economy: EconomyPipeline::new(),
            defense: DefenseStack::new(),
            firewall: Firewall::new(),
            threat: ThreatState::new(),
            resolver: AttackResolver::new(),
            prestige: PrestigeState::new(),
            offline: None,
            last_stats: TickStats::default(),
            events: Vec::new(),
            rng,
        };
        engine.threat.recompute_defense(&engine.firewall, &engine.defense);
        engine
    }

    // ─── Tick loop ───────────────────────────────────────────────────────────

    /// Advance one tick if running, then report. A paused engine reports its
    /// last consistent state without advancing; pausing never skips or
    /// replays ticks.
    pub fn tick_core(&mut self) -> TickResult {
        if self.running {
            self.advance_one_tick();
        }
        self.build_result()
    }

    /// The fixed per-tick order: economy → firewall regen → threat
    /// escalation → attack resolution → stats. Attack resolution must see
    /// this tick's defense and economy state, so no phase reorders.
    fn advance_one_tick(&mut self) {
        self.tick += 1;
        let now = self.tick;

        // 1. Economy pipeline
        let out = self.economy.step(
            self.prestige.production_multiplier,
            self.prestige.credit_multiplier,
            self.config.link_backlog_cap,
        );
        self.credits += out.credits_earned;
        self.threat.total_credits_earned += out.credits_earned;

        // 2. Firewall regeneration
        self.firewall.regenerate();

        // 3. Threat escalation (suppressed while the alarm is unacknowledged)
        self.threat.recompute_defense(&self.firewall, &self.defense);
        let escalated =
            self.threat
                .advance_tick(&mut self.rng, self.config.difficulty, self.alarm_active);
        if escalated {
            self.events.push(EngineEvent::ThreatEscalated { tier: self.threat.current_level });
        }

        // 4. Attack lifecycle
        let effective_risk = self.threat.effective_risk_level();
        let reduction = defense::combined_reduction(&self.firewall, &self.defense);
        let report = self.resolver.step(
            now,
            effective_risk,
            reduction,
            &mut self.firewall,
            &mut self.credits,
            self.alarm_active,
            &mut self.rng,
        );
        self.threat.total_damage_received += report.damage_inflicted;
        if let Some(attack) = report.started {
            self.events.push(EngineEvent::AttackStarted {
                attack_type: attack.attack_type,
                severity: attack.severity,
            });
        }
        if let Some(resolution) = report.resolution {
            self.events.push(EngineEvent::AttackResolved {
                attack_type: resolution.attack_type,
                survived: resolution.survived,
                damage_dealt: resolution.damage_dealt,
            });
            if resolution.survived {
                self.threat.attacks_survived += 1;
            } else {
                self.alarm_active = true;
                self.events.push(EngineEvent::CriticalAlarm {
                    attack_type: resolution.attack_type,
                });
            }
        }

        // 5. Stats snapshot
        self.last_stats = TickStats {
            tick: now,
            data_generated: out.generated,
            data_transferred: out.transferred,
            data_dropped: out.dropped,
            credits_earned: out.credits_earned,
            credits_drained: report.credits_drained,
            damage_absorbed: report.damage_absorbed,
            buffer_utilization: out.buffer_utilization,
        };
    }

    fn build_result(&mut self) -> TickResult {
        TickResult {
            stats: self.last_stats,
            credits: self.credits,
            threat_level: self.threat.current_level,
            effective_risk: self.threat.effective_risk_level(),
            net_defense_level: self.threat.net_defense_level,
            defense_status: defense::overall_status(&self.firewall, &self.defense),
            combined_reduction: defense::combined_reduction(&self.firewall, &self.defense),
            firewall_health: self.firewall.current_health,
            attack: self.resolver.active_view(self.tick),
            alarm_active: self.alarm_active,
            running: self.running,
            events: std::mem::take(&mut self.events),
        }
    }

    // ─── Commands (applied between ticks) ────────────────────────────────────

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Clear the critical alarm, letting escalation and new attack triggers
    /// resume. Idempotent.
    pub fn acknowledge_alarm(&mut self) {
        self.alarm_active = false;
    }

    pub fn upgrade_node(&mut self, kind: NodeKind) -> Result<u32, EngineError> {
        self.economy.upgrade(kind, &mut self.credits)
    }

    pub fn unlock_node_tier(&mut self, kind: NodeKind) -> Result<u32, EngineError> {
        let tier = self.economy.unlock_tier(kind, &mut self.credits)?;
        self.events.push(EngineEvent::EconomyTierUnlocked { kind, tier });
        Ok(tier)
    }

    pub fn deploy_defense(
        &mut self,
        category: DefenseCategory,
        tier: u32,
    ) -> Result<(), EngineError> {
        self.defense.deploy(category, tier, &mut self.credits)?;
        self.threat.recompute_defense(&self.firewall, &self.defense);
        self.events.push(EngineEvent::DefenseDeployed { category, tier });
        Ok(())
    }

    pub fn upgrade_defense(&mut self, category: DefenseCategory) -> Result<u32, EngineError> {
        let level = self.defense.upgrade(category, &mut self.credits)?;
        self.threat.recompute_defense(&self.firewall, &self.defense);
        Ok(level)
    }

    pub fn upgrade_firewall(&mut self) -> Result<u32, EngineError> {
        let level = self.firewall.upgrade(&mut self.credits)?;
        self.threat.recompute_defense(&self.firewall, &self.defense);
        Ok(level)
    }

    // ─── Offline catch-up ────────────────────────────────────────────────────

    /// Stage (never apply) the offline replay for an elapsed real-time gap.
    /// Restaging before collecting replaces the previous stage.
    pub fn stage_offline_progress(&mut self, elapsed_secs: f64) -> OfflineProgress {
        let progress = offline::simulate(&self.economy, &self.prestige, &self.config, elapsed_secs);
        self.offline = Some(progress);
        self.events.push(EngineEvent::OfflineProgressStaged {
            credits_earned: progress.credits_earned,
        });
        progress
    }

    /// Apply the staged offline progress exactly once. A second collect
    /// without a new stage returns `None` and changes nothing.
    pub fn collect_offline_progress(&mut self) -> Option<OfflineProgress> {
        let progress = self.offline.take()?;
        self.credits += progress.credits_earned;
        self.threat.total_credits_earned += progress.credits_earned;
        Some(progress)
    }

    /// Drop the staged result without applying it; loses no live state.
    pub fn discard_offline_progress(&mut self) {
        self.offline = None;
    }

    // ─── Prestige ────────────────────────────────────────────────────────────

    pub fn can_prestige(&self) -> bool {
        self.threat.total_credits_earned >= self.prestige.credits_required()
    }

    /// Reset economy and threat to their tier-1 state in exchange for a
    /// permanent multiplier bump. Defense installations, the firewall, and
    /// external collaborators (milestones, lore, certificates) are untouched.
    ///
    /// # Errors
    /// - `InsufficientFunds` below the lifetime-credits gate; nothing changes.
    pub fn perform_prestige(&mut self) -> Result<u32, EngineError> {
        let required = self.prestige.credits_required();
        if self.threat.total_credits_earned < required {
            return Err(EngineError::InsufficientFunds {
                required,
                available: self.threat.total_credits_earned,
            });
        }
        let cores = self.prestige.advance(self.credits);
        self.credits = 0.0;
        self.economy.reset();
        self.threat.reset();
        self.resolver.reset();
        self.alarm_active = false;
        self.offline = None;
        self.threat.recompute_defense(&self.firewall, &self.defense);
        self.events.push(EngineEvent::PrestigePerformed {
            level: self.prestige.prestige_level,
            cores_awarded: cores,
        });
        Ok(self.prestige.prestige_level)
    }

    // ─── Persistence contract ────────────────────────────────────────────────

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            version: SNAPSHOT_VERSION,
            config: self.config.clone(),
            tick: self.tick,
            running: self.running,
            alarm_active: self.alarm_active,
            credits: self.credits,
            economy: self.economy.clone(),
            defense: self.defense.clone(),
            firewall: self.firewall,
            threat: self.threat.clone(),
            attack: *self.resolver.state(),
            prestige: self.prestige.clone(),
            offline: self.offline,
            last_stats: self.last_stats,
        }
    }

    /// Rebuild an engine from a snapshot. The PRNG is reseeded from the
    /// configured seed and the saved tick index, so a restored engine is
    /// deterministic without persisting generator internals.
    pub fn restore(snapshot: EngineSnapshot) -> Result<Self, SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }
        let rng = ChaCha8Rng::seed_from_u64(snapshot.config.rng_seed ^ snapshot.tick);
        let mut engine = Self {
            config: snapshot.config,
            credits: snapshot.credits,
            tick: snapshot.tick,
            running: snapshot.running,
            alarm_active: snapshot.alarm_active,
            economy: snapshot.economy,
            defense: snapshot.defense,
            firewall: snapshot.firewall,
            threat: snapshot.threat,
            resolver: AttackResolver::from_state(snapshot.attack),
            prestige: snapshot.prestige,
            offline: snapshot.offline,
            last_stats: snapshot.last_stats,
            events: Vec::new(),
            rng,
        };
        engine.threat.recompute_defense(&engine.firewall, &engine.defense);
        Ok(engine)
    }

    // ─── Read accessors ──────────────────────────────────────────────────────

    pub fn credits(&self) -> f64 {
        self.credits
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn alarm_active(&self) -> bool {
        self.alarm_active
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn staged_offline_progress(&self) -> Option<&OfflineProgress> {
        self.offline.as_ref()
    }

    pub fn threat_state(&self) -> &ThreatState {
        &self.threat
    }

    pub fn prestige_state(&self) -> &PrestigeState {
        &self.prestige
    }

    /// Run N ticks without materializing results (batch mode for tests and
    /// the balance runner).
    pub fn run_batch(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.tick_core();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
