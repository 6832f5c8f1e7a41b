// HelixNet Balance Runner — seeded batch simulation for pacing checks
//
// Usage:
//   cargo run --release --bin balance                  # All scenarios, 10 runs each
//   cargo run --release --bin balance -- --runs 3      # Quick mode
//   cargo run --release --bin balance -- --ticks 5000  # Longer horizon
//   cargo run --release --bin balance -- turtle        # Filter by name
//   cargo run --release --bin balance -- --seed 42     # Custom base seed

use helix_engine::{
    DefenseCategory, EngineConfig, EngineEvent, HelixEngine, NodeKind,
};

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    runs: u64,
    ticks: u32,
    seed: u64,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs { runs: 10, ticks: 2_000, seed: 0, filter: None };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--runs" => {
                i += 1;
                if i < args.len() {
                    cli.runs = args[i].parse().unwrap_or(10);
                }
            }
            "--ticks" => {
                i += 1;
                if i < args.len() {
                    cli.ticks = args[i].parse().unwrap_or(2_000);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

// ─── Scenarios ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq)]
enum SpendStrategy {
    /// Never spend: pure idle baseline.
    Idle,
    /// Economy upgrades only; no defense at all.
    GlassCannon,
    /// Defense and firewall first, leftovers into the economy.
    Turtle,
    /// Alternate economy and defense spending.
    Balanced,
}

struct Scenario {
    name: &'static str,
    difficulty: f64,
    strategy: SpendStrategy,
}

fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario { name: "idle_baseline", difficulty: 1.0, strategy: SpendStrategy::Idle },
        Scenario { name: "glass_cannon", difficulty: 1.0, strategy: SpendStrategy::GlassCannon },
        Scenario { name: "turtle", difficulty: 1.0, strategy: SpendStrategy::Turtle },
        Scenario { name: "balanced", difficulty: 1.0, strategy: SpendStrategy::Balanced },
        Scenario { name: "balanced_hard", difficulty: 3.0, strategy: SpendStrategy::Balanced },
    ]
}

fn spend_economy(engine: &mut HelixEngine) {
    for kind in [NodeKind::Link, NodeKind::Sink, NodeKind::Source] {
        let _ = engine.unlock_node_tier(kind);
        while engine.upgrade_node(kind).is_ok() {}
    }
}

fn spend_defense(engine: &mut HelixEngine) {
    let _ = engine.upgrade_firewall();
    for category in DefenseCategory::ALL {
        for tier in 1..=helix_engine::defense::TIERS_PER_CATEGORY {
            let _ = engine.deploy_defense(category, tier);
        }
        while engine.upgrade_defense(category).is_ok() {}
    }
}

// ─── Run Aggregation ────────────────────────────────────────────────────────

#[derive(Default)]
struct RunTotals {
    credits: f64,
    lifetime_credits: f64,
    peak_tier: u32,
    attacks: u32,
    survived: u32,
    criticals: u32,
    prestiges: u32,
}

fn run_scenario(scenario: &Scenario, ticks: u32, seed: u64) -> RunTotals {
    let mut engine = HelixEngine::with_config(EngineConfig {
        rng_seed: seed,
        difficulty: scenario.difficulty,
        ..EngineConfig::default()
    });

    let mut totals = RunTotals::default();
    for tick in 0..ticks {
        let result = engine.tick_core();
        for event in &result.events {
            match event {
                EngineEvent::AttackStarted { .. } => totals.attacks += 1,
                EngineEvent::AttackResolved { survived: true, .. } => totals.survived += 1,
                EngineEvent::CriticalAlarm { .. } => totals.criticals += 1,
                EngineEvent::PrestigePerformed { .. } => totals.prestiges += 1,
                _ => {}
            }
        }
        totals.peak_tier = totals.peak_tier.max(result.threat_level.index());
        if result.alarm_active {
            engine.acknowledge_alarm();
        }

        if tick % 50 == 0 {
            match scenario.strategy {
                SpendStrategy::Idle => {}
                SpendStrategy::GlassCannon => spend_economy(&mut engine),
                SpendStrategy::Turtle => {
                    spend_defense(&mut engine);
                    spend_economy(&mut engine);
                }
                SpendStrategy::Balanced => {
                    if tick % 100 == 0 {
                        spend_economy(&mut engine);
                    } else {
                        spend_defense(&mut engine);
                    }
                }
            }
            if engine.can_prestige() {
                let _ = engine.perform_prestige();
            }
        }
    }

    totals.credits = engine.credits();
    totals.lifetime_credits = engine.threat_state().total_credits_earned;
    totals
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    let cli = parse_args();
    let all = scenarios();
    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f = f.to_lowercase();
            all.iter().filter(|s| s.name.contains(&f)).collect()
        }
        None => all.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No scenarios match filter: {:?}", cli.filter);
        std::process::exit(1);
    }

    println!("\n  HelixNet Balance Runner");
    println!(
        "  PRNG: ChaCha8Rng | Runs/scenario: {} | Ticks/run: {} | Base seed: {}\n",
        cli.runs, cli.ticks, cli.seed
    );
    println!(
        "  {:<16} {:>14} {:>14} {:>9} {:>8} {:>9} {:>9} {:>9}",
        "Scenario", "Credits", "Lifetime", "PeakTier", "Attacks", "Survived", "Critical", "Prestige"
    );
    println!("  {}", "-".repeat(94));

    for scenario in to_run {
        let mut sum = RunTotals::default();
        for run in 0..cli.runs {
            let totals = run_scenario(scenario, cli.ticks, cli.seed + run);
            sum.credits += totals.credits;
            sum.lifetime_credits += totals.lifetime_credits;
            sum.peak_tier = sum.peak_tier.max(totals.peak_tier);
            sum.attacks += totals.attacks;
            sum.survived += totals.survived;
            sum.criticals += totals.criticals;
            sum.prestiges += totals.prestiges;
        }
        let n = cli.runs as f64;
        println!(
            "  {:<16} {:>14.0} {:>14.0} {:>9} {:>8.1} {:>9.1} {:>9.1} {:>9.1}",
            scenario.name,
            sum.credits / n,
            sum.lifetime_credits / n,
            sum.peak_tier,
            sum.attacks as f64 / n,
            sum.survived as f64 / n,
            sum.criticals as f64 / n,
            sum.prestiges as f64 / n,
        );
    }
    println!();
}
