// Copyright 2026 Hypermesh Foundation. All rights reserved.
// HelixNet Idle Simulation Engine - Versioned State Snapshot

use serde::{Deserialize, Serialize};

use crate::attack::AttackState;
use crate::defense::{DefenseStack, Firewall};
use crate::economy::EconomyPipeline;
use crate::offline::OfflineProgress;
use crate::prestige::PrestigeState;
use crate::threat::ThreatState;
use crate::types::{EngineConfig, TickStats};

/// Bumped whenever the snapshot layout changes incompatibly.
pub const SNAPSHOT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("unsupported snapshot version {0} (engine supports {SNAPSHOT_VERSION})")]
    UnsupportedVersion(u32),
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// EngineSnapshot
// ---------------------------------------------------------------------------

/// The sole contract with the persistence layer: everything needed to
/// rebuild the engine. How and when it is stored or merged across devices is
/// not the engine's concern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineSnapshot {
    pub version: u32,
    pub config: EngineConfig,
    pub tick: u64,
    pub running: bool,
    pub alarm_active: bool,
    pub credits: f64,
    pub economy: EconomyPipeline,
    pub defense: DefenseStack,
    pub firewall: Firewall,
    pub threat: ThreatState,
    pub attack: AttackState,
    pub prestige: PrestigeState,
    pub offline: Option<OfflineProgress>,
    /// The most recent per-tick stats row, so a restored engine reports the
    /// persisted figures rather than a zeroed row before its first tick.
    pub last_stats: TickStats,
}

impl EngineSnapshot {
    /// Serialize to the JSON wire form used by the wasm boundary.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the JSON wire form, rejecting unknown versions.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: EngineSnapshot = serde_json::from_str(json)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }
        Ok(snapshot)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
