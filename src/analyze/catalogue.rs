//! Static catalogue of named log signatures for Ethereum client containers.
//!
//! The catalogue is built once per run and passed explicitly into every
//! analysis call; there is no module-level state.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Known classes of log events. `Other` is the explicit catch-all so that
/// threshold fallback is type-checked rather than string-matched.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PatternCategory {
    Attestation,
    BlockProposal,
    Sync,
    Peer,
    Network,
    Memory,
    Disk,
    Performance,
    Other,
}

impl PatternCategory {
    pub fn name(&self) -> &'static str {
        match self {
            PatternCategory::Attestation => "attestation",
            PatternCategory::BlockProposal => "block_proposal",
            PatternCategory::Sync => "sync",
            PatternCategory::Peer => "peer",
            PatternCategory::Network => "network",
            PatternCategory::Memory => "memory",
            PatternCategory::Disk => "disk",
            PatternCategory::Performance => "performance",
            PatternCategory::Other => "other",
        }
    }

    /// Resolve a config-file key to a category. Unknown keys get `None`;
    /// the caller decides whether that is a warning or a fallback.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "attestation" => Some(PatternCategory::Attestation),
            "block_proposal" => Some(PatternCategory::BlockProposal),
            "sync" => Some(PatternCategory::Sync),
            "peer" => Some(PatternCategory::Peer),
            "network" => Some(PatternCategory::Network),
            "memory" => Some(PatternCategory::Memory),
            "disk" => Some(PatternCategory::Disk),
            "performance" => Some(PatternCategory::Performance),
            "other" => Some(PatternCategory::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A named regex rule identifying one class of log event.
///
/// `adverse` signatures feed anomaly detection; positive ones (successful
/// attestations, published blocks) only feed the success-rate insight.
pub struct PatternSignature {
    pub name: &'static str,
    pub category: PatternCategory,
    pub adverse: bool,
    regex: Regex,
}

impl PatternSignature {
    fn new(
        name: &'static str,
        category: PatternCategory,
        adverse: bool,
        pattern: &str,
    ) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self {
            name,
            category,
            adverse,
            regex,
        })
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }
}

/// The full signature set for one analysis run. Read-only after construction.
pub struct Catalogue {
    signatures: Vec<PatternSignature>,
}

impl Catalogue {
    /// The built-in signature set covering the major Ethereum client log
    /// shapes (Lighthouse, Teku, Prysm, Nimbus, Lodestar and the EL clients).
    pub fn builtin() -> Self {
        let defs: &[(&'static str, PatternCategory, bool, &str)] = &[
            (
                "attestation_published",
                PatternCategory::Attestation,
                false,
                r"successfully published attestation|attestation sent|published attestation|submitted attestation",
            ),
            (
                "attestation_failed",
                PatternCategory::Attestation,
                true,
                r"failed to publish attestation|attestation.*failed|could not submit attestation|error.*attestation",
            ),
            (
                "block_published",
                PatternCategory::BlockProposal,
                false,
                r"successfully published block|produced block|block proposal.*success",
            ),
            (
                "block_proposal_failed",
                PatternCategory::BlockProposal,
                true,
                r"failed to publish block|could not produce block|error.*block.*proposal",
            ),
            (
                "sync_lag",
                PatternCategory::Sync,
                true,
                r"not synced|behind.*head|catching up|sync.*lag|\bsyncing\b",
            ),
            (
                "peer_loss",
                PatternCategory::Peer,
                true,
                r"no peers|disconnected.*peer|peer.*timeout|peer.*error|lost.*peer",
            ),
            (
                "connection_timeout",
                PatternCategory::Network,
                true,
                r"network.*error|connection.*timeout|connection.*failed|dns.*failed|unable to connect|request.*timeout",
            ),
            (
                "out_of_memory",
                PatternCategory::Memory,
                true,
                r"out of memory|\boom\b|memory.*limit|allocation.*failed|memory.*error",
            ),
            (
                "disk_pressure",
                PatternCategory::Disk,
                true,
                r"disk.*full|no space left|disk.*error|i/o.*error|storage.*failed",
            ),
            (
                "slow_response",
                PatternCategory::Performance,
                true,
                r"slow.*response|high.*latency|performance.*warning|timeout.*exceeded|processing.*slow",
            ),
        ];

        let signatures = defs
            .iter()
            .map(|(name, category, adverse, pattern)| {
                PatternSignature::new(name, *category, *adverse, pattern)
                    .expect("built-in signature regex is invalid")
            })
            .collect();

        Self { signatures }
    }

    pub fn signatures(&self) -> &[PatternSignature] {
        &self.signatures
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}
