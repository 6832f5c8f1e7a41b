// Copyright 2026 Hypermesh Foundation. All rights reserved.
// HelixNet Idle Simulation Engine - Economy Pipeline

use serde::{Deserialize, Serialize};

use crate::types::{EngineError, NodeKind};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Base per-tick rates at tier 1, level 1. The reference fixture (source 10,
/// link 8, sink 8, conversion 1.0) is the game's opening state.
const SOURCE_BASE_RATE: f64 = 10.0;
const LINK_BASE_BANDWIDTH: f64 = 8.0;
const SINK_BASE_CAPACITY: f64 = 8.0;
const BASE_CONVERSION_RATE: f64 = 1.0;

/// Rate multiplier applied per tier above 1.
const TIER_RATE_MULT: f64 = 1.5;

/// Geometric level-cost growth, and the per-tier jump on top of it.
const UPGRADE_COST_GROWTH: f64 = 1.15;
const TIER_COST_MULT: f64 = 4.0;

const SOURCE_BASE_COST: f64 = 25.0;
const LINK_BASE_COST: f64 = 20.0;
const SINK_BASE_COST: f64 = 30.0;

/// Tier unlocks: geometric in the tier being unlocked.
const TIER_UNLOCK_BASE_COST: f64 = 2_500.0;
const TIER_UNLOCK_COST_GROWTH: f64 = 6.0;

/// Levels available within one tier.
const LEVELS_PER_TIER: u32 = 25;

/// Sink load buffer, in multiples of current capacity.
const SINK_BUFFER_TICKS: f64 = 4.0;

// ---------------------------------------------------------------------------
// EconomyNode
// ---------------------------------------------------------------------------

/// One stage of the Source → Link → Sink pipeline. `base_rate` is the tier-1,
/// level-1 throughput; everything else is derived.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EconomyNode {
    pub level: u32,
    pub tier: u32,
    pub base_rate: f64,
    base_cost: f64,
}

impl EconomyNode {
    fn new(base_rate: f64, base_cost: f64) -> Self {
        Self { level: 1, tier: 1, base_rate, base_cost }
    }

    /// Current throughput per tick (data generated, bandwidth, or capacity
    /// depending on the node's position in the pipeline).
    pub fn effective_rate(&self) -> f64 {
        self.base_rate * self.level as f64 * TIER_RATE_MULT.powi(self.tier as i32 - 1)
    }

    pub fn max_level(&self) -> u32 {
        self.tier * LEVELS_PER_TIER
    }

    pub fn upgrade_cost(&self) -> f64 {
        self.base_cost
            * UPGRADE_COST_GROWTH.powi(self.level as i32 - 1)
            * TIER_COST_MULT.powi(self.tier as i32 - 1)
    }

    /// Cost to unlock the next tier from the current one.
    pub fn tier_unlock_cost(&self) -> f64 {
        TIER_UNLOCK_BASE_COST * TIER_UNLOCK_COST_GROWTH.powi(self.tier as i32 - 1)
    }
}

// ---------------------------------------------------------------------------
// Pipeline output
// ---------------------------------------------------------------------------

/// What one economy tick produced, before any threat-side adjustments.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PipelineOutput {
    pub generated: f64,
    pub transferred: f64,
    pub dropped: f64,
    pub processed: f64,
    pub credits_earned: f64,
    pub buffer_utilization: f64,
}

// ---------------------------------------------------------------------------
// EconomyPipeline
// ---------------------------------------------------------------------------

/// The three-stage data economy. Owns its nodes exclusively; only upgrade
/// operations and prestige reset mutate them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EconomyPipeline {
    pub source: EconomyNode,
    pub link: EconomyNode,
    pub sink: EconomyNode,
    pub conversion_rate: f64,
    /// Data waiting at the link for bandwidth, carried across ticks.
    pub queued_backlog: f64,
    /// Data transferred but not yet processed by the sink.
    pub sink_buffer: f64,
}

impl Default for EconomyPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl EconomyPipeline {
    pub fn new() -> Self {
        Self {
            source: EconomyNode::new(SOURCE_BASE_RATE, SOURCE_BASE_COST),
            link: EconomyNode::new(LINK_BASE_BANDWIDTH, LINK_BASE_COST),
            sink: EconomyNode::new(SINK_BASE_CAPACITY, SINK_BASE_COST),
            conversion_rate: BASE_CONVERSION_RATE,
            queued_backlog: 0.0,
            sink_buffer: 0.0,
        }
    }

    /// Advance the pipeline one tick.
    ///
    /// Generation scales with the prestige production multiplier, credits with
    /// the credit multiplier. Data over link bandwidth queues up to
    /// `backlog_cap`; the excess is dropped and counted, never silently lost.
    /// A saturated sink throttles intake rather than destroying data: the
    /// link only hands over what processing and the load buffer can still
    /// hold, and the remainder goes through the same backlog/drop
    /// accounting as any other untransferred data.
    pub fn step(
        &mut self,
        production_mult: f64,
        credit_mult: f64,
        backlog_cap: f64,
    ) -> PipelineOutput {
        let generated = self.source.effective_rate() * production_mult;

        let capacity = self.sink.effective_rate();
        let buffer_cap = capacity * SINK_BUFFER_TICKS;
        let intake_room = capacity + (buffer_cap - self.sink_buffer);

        let carry = generated + self.queued_backlog;
        let bandwidth = self.link.effective_rate();
        let transferred = carry.min(bandwidth).min(intake_room);
        let leftover = carry - transferred;
        self.queued_backlog = leftover.min(backlog_cap);
        let dropped = leftover - self.queued_backlog;

        let available = self.sink_buffer + transferred;
        let processed = available.min(capacity);
        // `transferred <= intake_room` keeps this at or below `buffer_cap`.
        self.sink_buffer = available - processed;

        let buffer_utilization = if buffer_cap > 0.0 {
            (self.sink_buffer / buffer_cap).min(1.0)
        } else {
            0.0
        };

        let credits_earned = processed * self.conversion_rate * credit_mult;

        PipelineOutput {
            generated,
            transferred,
            dropped,
            processed,
            credits_earned,
            buffer_utilization,
        }
    }

    fn node_mut(&mut self, kind: NodeKind) -> &mut EconomyNode {
        match kind {
            NodeKind::Source => &mut self.source,
            NodeKind::Link => &mut self.link,
            NodeKind::Sink => &mut self.sink,
        }
    }

    pub fn node(&self, kind: NodeKind) -> &EconomyNode {
        match kind {
            NodeKind::Source => &self.source,
            NodeKind::Link => &self.link,
            NodeKind::Sink => &self.sink,
        }
    }

    /// Upgrade one node by a single level. Rejections leave the node and the
    /// credit balance untouched.
    ///
    /// # Errors
    /// - `AlreadyAtMaxLevel` at the tier's level cap.
    /// - `InsufficientFunds` when `credits` is below the upgrade cost.
    pub fn upgrade(&mut self, kind: NodeKind, credits: &mut f64) -> Result<u32, EngineError> {
        let node = self.node_mut(kind);
        if node.level >= node.max_level() {
            return Err(EngineError::AlreadyAtMaxLevel);
        }
        let cost = node.upgrade_cost();
        if *credits < cost {
            return Err(EngineError::InsufficientFunds { required: cost, available: *credits });
        }
        *credits -= cost;
        node.level += 1;
        Ok(node.level)
    }

    /// Unlock the next tier for one node, raising its level cap.
    ///
    /// # Errors
    /// - `PrerequisiteNotMet` unless the node sits at its current tier cap.
    /// - `InsufficientFunds` when `credits` is below the unlock cost.
    pub fn unlock_tier(&mut self, kind: NodeKind, credits: &mut f64) -> Result<u32, EngineError> {
        let node = self.node_mut(kind);
        if node.level < node.max_level() {
            return Err(EngineError::PrerequisiteNotMet(
                "node must reach its tier level cap before unlocking the next tier",
            ));
        }
        let cost = node.tier_unlock_cost();
        if *credits < cost {
            return Err(EngineError::InsufficientFunds { required: cost, available: *credits });
        }
        *credits -= cost;
        node.tier += 1;
        Ok(node.tier)
    }

    /// Prestige reset: back to the tier-1 opening state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
