// Copyright 2026 Hypermesh Foundation. All rights reserved.
// HelixNet Idle Simulation Engine

pub mod types;
pub mod economy;
pub mod defense;
pub mod threat;
pub mod attack;
pub mod engine;
pub mod offline;
pub mod prestige;
pub mod snapshot;

pub use engine::HelixEngine;
pub use types::*;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::snapshot::EngineSnapshot;

// ─── WASM Interface ──────────────────────────────────────────────────────────

/// Wire form for command results crossing the JS boundary.
#[derive(Serialize)]
struct CommandOutcome<T: Serialize> {
    ok: bool,
    value: Option<T>,
    error: Option<String>,
}

fn command_to_js<T: Serialize>(result: Result<T, EngineError>) -> JsValue {
    let outcome = match result {
        Ok(value) => CommandOutcome { ok: true, value: Some(value), error: None },
        Err(err) => CommandOutcome { ok: false, value: None, error: Some(err.to_string()) },
    };
    serde_wasm_bindgen::to_value(&outcome).unwrap_or(JsValue::NULL)
}

fn rejected<T: Serialize>(message: &str) -> JsValue {
    let outcome: CommandOutcome<T> =
        CommandOutcome { ok: false, value: None, error: Some(message.to_string()) };
    serde_wasm_bindgen::to_value(&outcome).unwrap_or(JsValue::NULL)
}

#[wasm_bindgen]
impl HelixEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> HelixEngine {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        HelixEngine::with_config(EngineConfig { rng_seed: seed, ..EngineConfig::default() })
    }

    /// Build an engine from a JSON `EngineConfig`; unknown fields fall back
    /// to defaults, garbage yields `None`.
    #[wasm_bindgen(js_name = fromConfigJson)]
    pub fn from_config_json(json: &str) -> Option<HelixEngine> {
        let config: EngineConfig = serde_json::from_str(json).ok()?;
        Some(HelixEngine::with_config(config))
    }

    pub fn tick(&mut self) -> JsValue {
        let result = self.tick_core();
        serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
    }

    /// Run N ticks without returning results (fast batch mode).
    #[wasm_bindgen(js_name = runTicks)]
    pub fn run_ticks(&mut self, ticks: u32) {
        self.run_batch(ticks);
    }

    #[wasm_bindgen(js_name = setRunning)]
    pub fn set_running_js(&mut self, running: bool) {
        self.set_running(running);
    }

    #[wasm_bindgen(js_name = acknowledgeAlarm)]
    pub fn acknowledge_alarm_js(&mut self) {
        self.acknowledge_alarm();
    }

    #[wasm_bindgen(js_name = upgradeNode)]
    pub fn upgrade_node_js(&mut self, kind: u32) -> JsValue {
        match NodeKind::from_index(kind) {
            Some(kind) => command_to_js(self.upgrade_node(kind)),
            None => rejected::<u32>("unknown node kind"),
        }
    }

    #[wasm_bindgen(js_name = unlockNodeTier)]
    pub fn unlock_node_tier_js(&mut self, kind: u32) -> JsValue {
        match NodeKind::from_index(kind) {
            Some(kind) => command_to_js(self.unlock_node_tier(kind)),
            None => rejected::<u32>("unknown node kind"),
        }
    }

    #[wasm_bindgen(js_name = deployDefense)]
    pub fn deploy_defense_js(&mut self, category: u32, tier: u32) -> JsValue {
        match DefenseCategory::from_index(category) {
            Some(category) => command_to_js(self.deploy_defense(category, tier)),
            None => rejected::<()>("unknown defense category"),
        }
    }

    #[wasm_bindgen(js_name = upgradeDefense)]
    pub fn upgrade_defense_js(&mut self, category: u32) -> JsValue {
        match DefenseCategory::from_index(category) {
            Some(category) => command_to_js(self.upgrade_defense(category)),
            None => rejected::<u32>("unknown defense category"),
        }
    }

    #[wasm_bindgen(js_name = upgradeFirewall)]
    pub fn upgrade_firewall_js(&mut self) -> JsValue {
        command_to_js(self.upgrade_firewall())
    }

    #[wasm_bindgen(js_name = stageOfflineProgress)]
    pub fn stage_offline_progress_js(&mut self, elapsed_secs: f64) -> JsValue {
        let progress = self.stage_offline_progress(elapsed_secs);
        serde_wasm_bindgen::to_value(&progress).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = collectOfflineProgress)]
    pub fn collect_offline_progress_js(&mut self) -> JsValue {
        match self.collect_offline_progress() {
            Some(progress) => serde_wasm_bindgen::to_value(&progress).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    #[wasm_bindgen(js_name = discardOfflineProgress)]
    pub fn discard_offline_progress_js(&mut self) {
        self.discard_offline_progress();
    }

    #[wasm_bindgen(js_name = canPrestige)]
    pub fn can_prestige_js(&self) -> bool {
        self.can_prestige()
    }

    #[wasm_bindgen(js_name = performPrestige)]
    pub fn perform_prestige_js(&mut self) -> JsValue {
        command_to_js(self.perform_prestige())
    }

    /// Serialize the versioned snapshot for the persistence layer.
    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> Option<String> {
        self.snapshot().to_json().ok()
    }

    /// Rebuild an engine from a persisted snapshot; `None` on version
    /// mismatch or malformed input.
    #[wasm_bindgen(js_name = restoreJson)]
    pub fn restore_json(json: &str) -> Option<HelixEngine> {
        let snapshot = EngineSnapshot::from_json(json).ok()?;
        HelixEngine::restore(snapshot).ok()
    }
}
