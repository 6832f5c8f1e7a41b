// Copyright 2026 Hypermesh Foundation. All rights reserved.
// HelixNet Idle Simulation Engine - Offline Catch-up

use serde::{Deserialize, Serialize};

use crate::economy::EconomyPipeline;
use crate::prestige::PrestigeState;
use crate::types::EngineConfig;

// ---------------------------------------------------------------------------
// OfflineProgress
// ---------------------------------------------------------------------------

/// Staged result of an offline replay. Created on resume, applied at most
/// once by an explicit collect, then discarded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OfflineProgress {
    pub time_away_secs: f64,
    pub ticks_simulated: u64,
    pub data_processed: f64,
    pub credits_earned: f64,
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// Replay the economy for elapsed wall-clock time at reduced efficiency.
///
/// Runs against a clone of the pipeline, so backlog and sink load evolve the
/// way a live run would without the live pipeline moving; threat and attacks
/// never advance offline. The accumulated totals are returned as a single
/// staged result, not applied.
pub fn simulate(
    economy: &EconomyPipeline,
    prestige: &PrestigeState,
    config: &EngineConfig,
    elapsed_secs: f64,
) -> OfflineProgress {
    let raw_ticks = if config.tick_interval_secs > 0.0 {
        (elapsed_secs.max(0.0) / config.tick_interval_secs) as u64
    } else {
        0
    };
    let ticks = raw_ticks.min(config.max_offline_ticks);

    let mut replay = economy.clone();
    let mut data_processed = 0.0;
    let mut credits_earned = 0.0;
    for _ in 0..ticks {
        let out = replay.step(
            prestige.production_multiplier * config.offline_efficiency,
            prestige.credit_multiplier,
            config.link_backlog_cap,
        );
        data_processed += out.processed;
        credits_earned += out.credits_earned;
    }

    OfflineProgress {
        time_away_secs: elapsed_secs.max(0.0),
        ticks_simulated: ticks,
        data_processed,
        credits_earned,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_runs_at_half_efficiency() {
        let economy = EconomyPipeline::new();
        let prestige = PrestigeState::new();
        let config = EngineConfig::default();
        // 100 ticks at 50%: generation 5/tick flows through untouched
        // (below both bandwidth and capacity), conversion 1.0.
        let progress = simulate(&economy, &prestige, &config, 100.0);
        assert_eq!(progress.ticks_simulated, 100);
        assert!((progress.credits_earned - 500.0).abs() < 1e-9);
        assert!((progress.data_processed - 500.0).abs() < 1e-9);
        // The live pipeline never moved.
        assert_eq!(economy, EconomyPipeline::new());
    }

    #[test]
    fn elapsed_time_is_capped() {
        let economy = EconomyPipeline::new();
        let prestige = PrestigeState::new();
        let mut config = EngineConfig::default();
        config.max_offline_ticks = 50;
        let progress = simulate(&economy, &prestige, &config, 1e9);
        assert_eq!(progress.ticks_simulated, 50);
    }

    #[test]
    fn negative_or_zero_gap_yields_nothing() {
        let economy = EconomyPipeline::new();
        let prestige = PrestigeState::new();
        let config = EngineConfig::default();
        let progress = simulate(&economy, &prestige, &config, -10.0);
        assert_eq!(progress.ticks_simulated, 0);
        assert_eq!(progress.credits_earned, 0.0);
    }
}
