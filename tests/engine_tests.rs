#[cfg(test)]
mod tests {
    use helix_engine::attack::{Attack, AttackState};
    use helix_engine::defense::{self, DefenseStack, Firewall};
    use helix_engine::economy::EconomyPipeline;
    use helix_engine::prestige::PrestigeState;
    use helix_engine::snapshot::{EngineSnapshot, SNAPSHOT_VERSION};
    use helix_engine::threat::ThreatState;
    use helix_engine::{
        AttackType, DefenseCategory, EngineConfig, EngineEvent, HelixEngine, NodeKind,
        ThreatTier, TickStats,
    };

    fn quiet_config() -> EngineConfig {
        // difficulty 0 keeps the threat level pinned at the floor
        EngineConfig { difficulty: 0.0, ..EngineConfig::default() }
    }

    // ========== Economy ==========

    #[test]
    fn test_reference_pipeline_rates() {
        let mut engine = HelixEngine::default();
        let result = engine.tick_core();
        assert_eq!(result.stats.data_generated, 10.0);
        assert_eq!(result.stats.data_transferred, 8.0);
        assert_eq!(result.stats.data_dropped, 2.0);
        assert_eq!(result.stats.credits_earned, 8.0);
    }

    #[test]
    fn test_data_conservation_over_long_run() {
        let mut engine = HelixEngine::with_config(quiet_config());
        for _ in 0..500 {
            let result = engine.tick_core();
            // Default backlog cap is 0, so nothing carries between ticks and
            // every unit is either transferred or counted as dropped.
            let stats = result.stats;
            assert!(
                stats.data_dropped + stats.data_transferred <= stats.data_generated + 1e-9,
                "tick {} created data out of nothing: {:?}",
                stats.tick,
                stats
            );
        }
    }

    #[test]
    fn test_backlog_conservation_with_queueing_link() {
        let mut pipeline = EconomyPipeline::new();
        for _ in 0..300 {
            let backlog_before = pipeline.queued_backlog;
            let out = pipeline.step(1.0, 1.0, 12.0);
            assert!(out.dropped + out.transferred <= out.generated + backlog_before + 1e-9);
        }
    }

    #[test]
    fn test_sink_bottleneck_throttles_instead_of_dropping() {
        let mut engine = HelixEngine::with_config(quiet_config());
        engine.run_batch(10); // 80 credits
        // Level the link past the sink: bandwidth 16 against capacity 8.
        engine.upgrade_node(NodeKind::Link).unwrap();

        let mut saturated = false;
        for _ in 0..40 {
            let stats = engine.tick_core().stats;
            assert!(
                stats.data_dropped + stats.data_transferred <= stats.data_generated + 1e-9,
                "tick {} destroyed data at the sink: {:?}",
                stats.tick,
                stats
            );
            saturated |= stats.buffer_utilization >= 1.0 - 1e-9;
        }
        assert!(saturated, "sink load buffer never saturated");

        // Steady state under a full buffer: intake pinned to sink
        // throughput, the overflow dropped at the link.
        let stats = engine.tick_core().stats;
        assert_eq!(stats.data_transferred, 8.0);
        assert_eq!(stats.data_dropped, 2.0);
        assert_eq!(stats.buffer_utilization, 1.0);
    }

    #[test]
    fn test_insufficient_funds_upgrade_is_side_effect_free() {
        let mut engine = HelixEngine::with_config(quiet_config());
        engine.run_batch(3); // 24 credits, sink upgrade costs 30
        let before = engine.snapshot();
        let rejected = engine.upgrade_node(NodeKind::Sink);
        assert!(rejected.is_err());
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_earned_credits_buy_upgrades() {
        let mut engine = HelixEngine::with_config(quiet_config());
        engine.run_batch(10); // 80 credits
        engine.upgrade_node(NodeKind::Link).unwrap(); // 20
        engine.upgrade_node(NodeKind::Sink).unwrap(); // 30
        let result = engine.tick_core();
        // link and sink at level 2: bandwidth 16, capacity 16, generation 10
        assert_eq!(result.stats.data_transferred, 10.0);
        assert_eq!(result.stats.data_dropped, 0.0);
        assert_eq!(result.stats.credits_earned, 10.0);
    }

    // ========== Threat & Risk ==========

    #[test]
    fn test_floor_tier_never_triggers_an_attack() {
        let mut engine = HelixEngine::with_config(quiet_config());
        for _ in 0..100 {
            let result = engine.tick_core();
            assert_eq!(result.threat_level, ThreatTier::Baseline);
            assert_eq!(result.effective_risk, ThreatTier::Baseline);
            assert!(result.attack.is_none());
            assert_eq!(result.stats.credits_drained, 0.0);
            assert!(!result
                .events
                .iter()
                .any(|e| matches!(e, EngineEvent::AttackStarted { .. })));
        }
    }

    #[test]
    fn test_effective_risk_never_exceeds_threat_level() {
        let mut engine = HelixEngine::with_config(EngineConfig {
            difficulty: 5.0,
            ..EngineConfig::default()
        });
        for tick in 0..1_000 {
            let result = engine.tick_core();
            assert!(
                result.effective_risk <= result.threat_level,
                "tick {tick}: risk {:?} above threat {:?}",
                result.effective_risk,
                result.threat_level
            );
            if result.alarm_active {
                engine.acknowledge_alarm();
            }
            // Pour everything into defense as it becomes affordable.
            if tick % 25 == 0 {
                let _ = engine.upgrade_firewall();
                for category in DefenseCategory::ALL {
                    let _ = engine.deploy_defense(category, 1);
                    let _ = engine.upgrade_defense(category);
                }
            }
        }
    }

    #[test]
    fn test_no_defense_means_risk_equals_threat() {
        // A fresh engine deploys nothing; the level-1 firewall alone maps to
        // zero ordinal steps of net defense.
        let mut engine = HelixEngine::with_config(EngineConfig {
            difficulty: 5.0,
            ..EngineConfig::default()
        });
        for _ in 0..500 {
            let result = engine.tick_core();
            assert_eq!(result.net_defense_level, 0);
            assert_eq!(result.effective_risk, result.threat_level);
            if result.alarm_active {
                engine.acknowledge_alarm();
            }
        }
    }

    #[test]
    fn test_combined_reduction_saturates_below_one() {
        let mut stack = DefenseStack::new();
        let mut credits = f64::MAX;
        for category in DefenseCategory::ALL {
            for tier in 1..=defense::TIERS_PER_CATEGORY {
                stack.deploy(category, tier, &mut credits).unwrap();
                while stack.upgrade(category, &mut credits).is_ok() {}
            }
        }
        let mut firewall = Firewall::new();
        for _ in 0..100 {
            firewall.upgrade(&mut credits).unwrap();
        }
        let combined = defense::combined_reduction(&firewall, &stack);
        assert!(combined > 0.5);
        assert!(combined < 1.0);
    }

    // ========== Attack Resolution & Critical Alarm ==========

    /// Snapshot fixture: a ransomware attack already in flight against a
    /// weakened firewall, threat deep in the assault era.
    fn embattled_snapshot() -> EngineSnapshot {
        let mut firewall = Firewall::new();
        firewall.current_health = 50.0;
        EngineSnapshot {
            version: SNAPSHOT_VERSION,
            config: EngineConfig { difficulty: 0.0, ..EngineConfig::default() },
            tick: 100,
            running: true,
            alarm_active: false,
            credits: 1_000.0,
            economy: EconomyPipeline::new(),
            defense: DefenseStack::new(),
            firewall,
            threat: ThreatState {
                current_level: ThreatTier::RansomwareWave,
                net_defense_level: 0,
                ticks_since_escalation: 0,
                attacks_survived: 0,
                total_damage_received: 0.0,
                total_credits_earned: 0.0,
            },
            attack: AttackState::Active(Attack {
                attack_type: AttackType::Ransomware,
                severity: 2.5,
                start_tick: 100,
                damage_dealt: 0.0,
            }),
            prestige: PrestigeState::new(),
            offline: None,
            last_stats: TickStats::default(),
        }
    }

    #[test]
    fn test_overwhelming_attack_drains_credits_and_raises_alarm() {
        let mut engine = HelixEngine::restore(embattled_snapshot()).unwrap();
        let mut saw_critical = false;
        let mut total_absorbed = 0.0;
        let mut total_drained = 0.0;
        for _ in 0..AttackType::Ransomware.duration_ticks() {
            let result = engine.tick_core();
            total_absorbed += result.stats.damage_absorbed;
            total_drained += result.stats.credits_drained;
            saw_critical |= result
                .events
                .iter()
                .any(|e| matches!(e, EngineEvent::CriticalAlarm { .. }));
            if saw_critical {
                assert_eq!(result.firewall_health, 0.0);
                break;
            }
        }
        assert!(saw_critical, "overwhelming attack never went critical");
        assert!(total_absorbed > 0.0);
        assert!(total_drained > 0.0, "overflow damage never drained credits");
        assert!(engine.alarm_active());
        assert_eq!(engine.threat_state().attacks_survived, 0);
    }

    #[test]
    fn test_alarm_pauses_escalation_but_not_the_economy() {
        let mut snapshot = embattled_snapshot();
        snapshot.config.difficulty = 10.0;
        let mut engine = HelixEngine::restore(snapshot).unwrap();
        // Drive the attack to its critical resolution.
        while !engine.alarm_active() {
            engine.tick_core();
        }
        let frozen_level = engine.threat_state().current_level;
        let credits_before = engine.credits();
        engine.run_batch(400);
        assert_eq!(
            engine.threat_state().current_level,
            frozen_level,
            "escalation advanced while alarm unacknowledged"
        );
        assert!(
            engine.credits() > credits_before,
            "economy stalled during alarm backpressure"
        );

        engine.acknowledge_alarm();
        assert!(!engine.alarm_active());
        engine.run_batch(400);
        assert!(
            engine.threat_state().current_level > frozen_level,
            "escalation never resumed after acknowledgment"
        );
    }

    #[test]
    fn test_survived_attack_increments_counter() {
        let mut snapshot = embattled_snapshot();
        // Full-health, levelled firewall against a weak probe: survivable.
        snapshot.firewall = Firewall::new();
        snapshot.attack = AttackState::Active(Attack {
            attack_type: AttackType::PortScan,
            severity: 1.0,
            start_tick: 100,
            damage_dealt: 0.0,
        });
        let mut engine = HelixEngine::restore(snapshot).unwrap();
        engine.run_batch(AttackType::PortScan.duration_ticks() as u32);
        assert_eq!(engine.threat_state().attacks_survived, 1);
        assert!(!engine.alarm_active());
    }

    // ========== Scheduler ==========

    #[test]
    fn test_pause_and_resume_never_skip_ticks() {
        let mut engine = HelixEngine::with_config(quiet_config());
        engine.run_batch(10);
        assert_eq!(engine.current_tick(), 10);
        engine.set_running(false);
        engine.run_batch(50);
        assert_eq!(engine.current_tick(), 10);
        engine.set_running(true);
        engine.run_batch(5);
        assert_eq!(engine.current_tick(), 15);
    }

    // ========== Offline Catch-up ==========

    #[test]
    fn test_offline_progress_collects_exactly_once() {
        let mut engine = HelixEngine::with_config(quiet_config());
        engine.run_batch(5);
        let staged = engine.stage_offline_progress(120.0);
        assert_eq!(staged.ticks_simulated, 120);
        // 50% efficiency on a 10/8/8 pipeline: 5 processed per tick.
        assert!((staged.credits_earned - 600.0).abs() < 1e-9);

        let credits_before = engine.credits();
        assert!(engine.collect_offline_progress().is_some());
        assert!((engine.credits() - credits_before - 600.0).abs() < 1e-9);
        assert!(engine.collect_offline_progress().is_none());
        assert!((engine.credits() - credits_before - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_offline_replay_caps_at_configured_ticks() {
        let mut engine = HelixEngine::with_config(EngineConfig {
            difficulty: 0.0,
            max_offline_ticks: 100,
            ..EngineConfig::default()
        });
        let staged = engine.stage_offline_progress(1e12);
        assert_eq!(staged.ticks_simulated, 100);
    }

    // ========== Prestige ==========

    #[test]
    fn test_prestige_rejected_below_gate() {
        let mut engine = HelixEngine::with_config(quiet_config());
        engine.run_batch(100);
        let before = engine.snapshot();
        assert!(!engine.can_prestige());
        assert!(engine.perform_prestige().is_err());
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_prestige_resets_run_and_compounds_multipliers() {
        let mut snapshot = embattled_snapshot();
        snapshot.threat.total_credits_earned = 1_500_000.0;
        snapshot.credits = 250_000.0;
        let mut engine = HelixEngine::restore(snapshot).unwrap();
        assert!(engine.can_prestige());
        engine.perform_prestige().unwrap();

        assert_eq!(engine.credits(), 0.0);
        assert_eq!(engine.threat_state().current_level, ThreatTier::Baseline);
        assert_eq!(engine.threat_state().total_credits_earned, 0.0);
        assert!(!engine.alarm_active());
        let prestige = engine.prestige_state();
        assert_eq!(prestige.prestige_level, 1);
        assert!(prestige.production_multiplier > 1.0);
        assert!(prestige.credit_multiplier > 1.0);

        // Post-prestige ticks produce more than the un-prestiged baseline.
        let result = engine.tick_core();
        assert!(result.stats.data_generated > 10.0);
        assert!(result.stats.credits_earned > 8.0);
    }

    // ========== Persistence ==========

    #[test]
    fn test_snapshot_json_roundtrip() {
        let mut engine = HelixEngine::with_config(quiet_config());
        engine.run_batch(50);
        engine.upgrade_node(NodeKind::Link).unwrap();

        let snapshot = engine.snapshot();
        let json = snapshot.to_json().unwrap();
        let parsed = EngineSnapshot::from_json(&json).unwrap();
        assert_eq!(parsed, snapshot);

        let mut restored = HelixEngine::restore(parsed).unwrap();
        assert_eq!(restored.current_tick(), engine.current_tick());
        assert_eq!(restored.credits(), engine.credits());
        let a = restored.tick_core();
        let b = engine.tick_core();
        assert_eq!(a.stats.data_generated, b.stats.data_generated);
        assert_eq!(a.stats.credits_earned, b.stats.credits_earned);
    }

    #[test]
    fn test_snapshot_version_gate() {
        let engine = HelixEngine::default();
        let mut snapshot = engine.snapshot();
        snapshot.version = 999;
        assert!(HelixEngine::restore(snapshot).is_err());
    }
}
