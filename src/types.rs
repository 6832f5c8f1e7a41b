// Copyright 2026 Hypermesh Foundation. All rights reserved.
// HelixNet Idle Simulation Engine - Type Definitions

use serde::{Serialize, Deserialize};

// ─── Threat Tier ─────────────────────────────────────────────────────────────

/// The ordinal escalation track. Tiers only ever advance one step per tick;
/// all tier math is index arithmetic on this fixed ordering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum ThreatTier {
    Baseline = 0,
    Scanning = 1,
    Probing = 2,
    Fingerprinting = 3,
    Phishing = 4,
    CredentialStuffing = 5,
    Exploitation = 6,
    Foothold = 7,
    PrivilegeEscalation = 8,
    LateralMovement = 9,
    Persistence = 10,
    CommandControl = 11,
    BotnetRecruitment = 12,
    DdosBarrage = 13,
    WormPropagation = 14,
    RansomwareWave = 15,
    SupplyChainBreach = 16,
    ZeroDayMarket = 17,
    CoordinatedCampaign = 18,
    InfrastructureSiege = 19,
    StateSponsored = 20,
    CyberWarfare = 21,
    GridCollapse = 22,
    TotalBlackout = 23,
}

impl Default for ThreatTier {
    fn default() -> Self { ThreatTier::Baseline }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ThreatEra {
    Ambient = 0,
    Intrusion = 1,
    Escalation = 2,
    Assault = 3,
    Siege = 4,
    Apex = 5,
}

impl ThreatTier {
    pub const COUNT: u32 = 24;

    pub const ALL: [ThreatTier; 24] = [
        Self::Baseline, Self::Scanning, Self::Probing, Self::Fingerprinting,
        Self::Phishing, Self::CredentialStuffing, Self::Exploitation, Self::Foothold,
        Self::PrivilegeEscalation, Self::LateralMovement, Self::Persistence, Self::CommandControl,
        Self::BotnetRecruitment, Self::DdosBarrage, Self::WormPropagation, Self::RansomwareWave,
        Self::SupplyChainBreach, Self::ZeroDayMarket, Self::CoordinatedCampaign, Self::InfrastructureSiege,
        Self::StateSponsored, Self::CyberWarfare, Self::GridCollapse, Self::TotalBlackout,
    ];

    pub fn index(self) -> u32 {
        self as u32
    }

    /// Clamping lookup: out-of-range indices map to the top of the scale.
    pub fn from_index(index: u32) -> Self {
        Self::ALL[(index as usize).min(Self::ALL.len() - 1)]
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn is_top(self) -> bool {
        self.index() == Self::COUNT - 1
    }

    pub fn era(self) -> ThreatEra {
        match self.index() / 4 {
            0 => ThreatEra::Ambient,
            1 => ThreatEra::Intrusion,
            2 => ThreatEra::Escalation,
            3 => ThreatEra::Assault,
            4 => ThreatEra::Siege,
            _ => ThreatEra::Apex,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Baseline => "Baseline Noise",
            Self::Scanning => "Port Scanning",
            Self::Probing => "Service Probing",
            Self::Fingerprinting => "Stack Fingerprinting",
            Self::Phishing => "Phishing Campaign",
            Self::CredentialStuffing => "Credential Stuffing",
            Self::Exploitation => "Active Exploitation",
            Self::Foothold => "Established Foothold",
            Self::PrivilegeEscalation => "Privilege Escalation",
            Self::LateralMovement => "Lateral Movement",
            Self::Persistence => "Persistent Implants",
            Self::CommandControl => "Command & Control",
            Self::BotnetRecruitment => "Botnet Recruitment",
            Self::DdosBarrage => "DDoS Barrage",
            Self::WormPropagation => "Worm Propagation",
            Self::RansomwareWave => "Ransomware Wave",
            Self::SupplyChainBreach => "Supply Chain Breach",
            Self::ZeroDayMarket => "Zero-Day Market",
            Self::CoordinatedCampaign => "Coordinated Campaign",
            Self::InfrastructureSiege => "Infrastructure Siege",
            Self::StateSponsored => "State-Sponsored Ops",
            Self::CyberWarfare => "Open Cyber Warfare",
            Self::GridCollapse => "Grid Collapse",
            Self::TotalBlackout => "Total Blackout",
        }
    }
}

// ─── Attack Type ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AttackType {
    PortScan = 0,
    BruteForce = 1,
    DdosFlood = 2,
    WormOutbreak = 3,
    Ransomware = 4,
    ZeroDay = 5,
}

impl AttackType {
    pub const ALL: [AttackType; 6] = [
        Self::PortScan, Self::BruteForce, Self::DdosFlood,
        Self::WormOutbreak, Self::Ransomware, Self::ZeroDay,
    ];

    /// Raw damage per active tick before severity and mitigation.
    pub fn base_damage_rate(self) -> f64 {
        match self {
            Self::PortScan => 0.5,
            Self::BruteForce => 1.2,
            Self::DdosFlood => 2.5,
            Self::WormOutbreak => 4.0,
            Self::Ransomware => 6.0,
            Self::ZeroDay => 9.0,
        }
    }

    /// Fixed lifetime of the attack; progress advances linearly over it.
    pub fn duration_ticks(self) -> u64 {
        match self {
            Self::PortScan => 6,
            Self::BruteForce => 8,
            Self::DdosFlood => 12,
            Self::WormOutbreak => 10,
            Self::Ransomware => 15,
            Self::ZeroDay => 20,
        }
    }

    /// Lowest effective-risk tier index at which this type enters the
    /// selection pool. Heavy types stay out of the early game entirely.
    pub fn min_tier_index(self) -> u32 {
        match self {
            Self::PortScan => 1,
            Self::BruteForce => 4,
            Self::DdosFlood => 8,
            Self::WormOutbreak => 12,
            Self::Ransomware => 15,
            Self::ZeroDay => 17,
        }
    }

    /// Selection weight once past `min_tier_index`; light attacks stay common.
    pub fn base_weight(self) -> f64 {
        match self {
            Self::PortScan => 8.0,
            Self::BruteForce => 6.0,
            Self::DdosFlood => 4.0,
            Self::WormOutbreak => 3.0,
            Self::Ransomware => 2.0,
            Self::ZeroDay => 1.0,
        }
    }

    /// Total-damage threshold above which a resolved attack with a dead
    /// firewall counts as critical rather than survived.
    pub fn fatal_threshold(self) -> f64 {
        self.base_damage_rate() * self.duration_ticks() as f64 * 0.5
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PortScan => "Port Scan",
            Self::BruteForce => "Brute Force",
            Self::DdosFlood => "DDoS Flood",
            Self::WormOutbreak => "Worm Outbreak",
            Self::Ransomware => "Ransomware",
            Self::ZeroDay => "Zero-Day Exploit",
        }
    }
}

// ─── Defense Category ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DefenseCategory {
    PacketFilter = 0,
    Antivirus = 1,
    IntrusionDetection = 2,
    Encryption = 3,
    Honeypot = 4,
    ZeroTrust = 5,
}

impl DefenseCategory {
    pub const ALL: [DefenseCategory; 6] = [
        Self::PacketFilter, Self::Antivirus, Self::IntrusionDetection,
        Self::Encryption, Self::Honeypot, Self::ZeroTrust,
    ];

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PacketFilter => "Packet Filtering",
            Self::Antivirus => "Antivirus Suite",
            Self::IntrusionDetection => "Intrusion Detection",
            Self::Encryption => "Encryption Layer",
            Self::Honeypot => "Honeypot Grid",
            Self::ZeroTrust => "Zero-Trust Mesh",
        }
    }
}

/// Derived health of the layered defense, from deployed-category coverage
/// and firewall health.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DefenseStatus {
    Nominal = 0,
    Degraded = 1,
    Alert = 2,
    Critical = 3,
    Offline = 4,
}

// ─── Economy Node Selector ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NodeKind {
    Source = 0,
    Link = 1,
    Sink = 2,
}

impl NodeKind {
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::Source),
            1 => Some(Self::Link),
            2 => Some(Self::Sink),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Source => "Data Source",
            Self::Link => "Transport Link",
            Self::Sink => "Processing Sink",
        }
    }
}

// ─── TickStats ───────────────────────────────────────────────────────────────

/// Immutable per-tick snapshot. A fresh value is produced every tick; the
/// previous one is retained only for display.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct TickStats {
    pub tick: u64,
    pub data_generated: f64,
    pub data_transferred: f64,
    pub data_dropped: f64,
    pub credits_earned: f64,
    pub credits_drained: f64,
    pub damage_absorbed: f64,
    /// Sink load in [0, 1].
    pub buffer_utilization: f64,
}

// ─── Engine Events ───────────────────────────────────────────────────────────

/// Discrete events emitted alongside each TickResult. Consumers (UI,
/// achievement evaluators) may ignore any of them; the engine never depends
/// on their presence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum EngineEvent {
    ThreatEscalated { tier: ThreatTier },
    AttackStarted { attack_type: AttackType, severity: f64 },
    AttackResolved { attack_type: AttackType, survived: bool, damage_dealt: f64 },
    CriticalAlarm { attack_type: AttackType },
    EconomyTierUnlocked { kind: NodeKind, tier: u32 },
    DefenseDeployed { category: DefenseCategory, tier: u32 },
    PrestigePerformed { level: u32, cores_awarded: f64 },
    OfflineProgressStaged { credits_earned: f64 },
}

// ─── Attack View ─────────────────────────────────────────────────────────────

/// Read-only projection of the active attack for consumers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AttackView {
    pub attack_type: AttackType,
    pub severity: f64,
    pub start_tick: u64,
    pub progress: f64,
    pub damage_dealt: f64,
}

// ─── TickResult ──────────────────────────────────────────────────────────────

/// Everything a consuming layer needs after one tick: the stats snapshot,
/// read-only views of live state, and the drained event queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickResult {
    pub stats: TickStats,
    pub credits: f64,
    pub threat_level: ThreatTier,
    pub effective_risk: ThreatTier,
    pub net_defense_level: u32,
    pub defense_status: DefenseStatus,
    pub combined_reduction: f64,
    pub firewall_health: f64,
    pub attack: Option<AttackView>,
    pub alarm_active: bool,
    pub running: bool,
    pub events: Vec<EngineEvent>,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Rejections from engine commands. Every rejected command leaves all engine
/// state untouched; partial application never occurs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("insufficient credits: need {required:.2}, have {available:.2}")]
    InsufficientFunds { required: f64, available: f64 },
    #[error("already at the maximum level for the current tier")]
    AlreadyAtMaxLevel,
    #[error("an equal or higher tier is already deployed in this category")]
    AlreadyDeployed,
    #[error("prerequisite not met: {0}")]
    PrerequisiteNotMet(&'static str),
    #[error("invalid state transition: {0}")]
    InvalidTransition(&'static str),
}

// ─── Engine Configuration ────────────────────────────────────────────────────

/// Tuning values the host supplies; everything has a sensible default so a
/// plain `EngineConfig::default()` yields a playable simulation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Real seconds represented by one tick.
    pub tick_interval_secs: f64,
    /// Fraction of normal economy output earned while offline.
    pub offline_efficiency: f64,
    /// Hard cap on ticks replayed during offline catch-up.
    pub max_offline_ticks: u64,
    /// Global escalation pressure multiplier.
    pub difficulty: f64,
    /// Seed for the deterministic simulation PRNG.
    pub rng_seed: u64,
    /// Maximum data units the link may queue between ticks. With the
    /// default of 0 any over-bandwidth generation is dropped immediately.
    pub link_backlog_cap: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 1.0,
            offline_efficiency: 0.5,
            max_offline_ticks: 8 * 60 * 60,
            difficulty: 1.0,
            rng_seed: 0x48454C49,
            link_backlog_cap: 0.0,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
