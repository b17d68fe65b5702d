//! Fleet and analyzer configuration, loaded from `config.yaml`.
//!
//! Search order mirrors operator habit: an explicit `--config` path wins,
//! otherwise `config.yaml` in the current working directory. Bad analyzer
//! entries (unknown category keys, non-monotonic thresholds, inverted
//! weights) fall back to the built-in defaults with a warning; they are
//! never fatal.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::analyze::{PatternCategory, Severity};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML in {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// One remote validator host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub name: String,
    pub tailscale_domain: String,
    #[serde(default = "default_ssh_user")]
    pub ssh_user: String,
    #[serde(default)]
    pub stack: Option<String>,
}

fn default_ssh_user() -> String {
    "root".to_string()
}

impl NodeConfig {
    pub fn ssh_target(&self) -> String {
        format!("{}@{}", self.ssh_user, self.tailscale_domain)
    }

    /// Nodes marked `stack: disabled` are skipped in fleet-wide runs.
    pub fn is_disabled(&self) -> bool {
        self.stack.as_deref() == Some("disabled")
    }
}

/// Occurrence thresholds for one category. `low` is opt-in; by default a
/// trickle below `medium` stays quiet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdSet {
    pub low: Option<u64>,
    pub medium: u64,
    pub high: u64,
    pub critical: u64,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            low: None,
            medium: 5,
            high: 20,
            critical: 50,
        }
    }
}

impl ThresholdSet {
    /// Highest severity whose threshold is met. A count of zero never
    /// produces an anomaly.
    pub fn severity_for(&self, count: u64) -> Option<Severity> {
        if count == 0 {
            return None;
        }
        if count >= self.critical {
            Some(Severity::Critical)
        } else if count >= self.high {
            Some(Severity::High)
        } else if count >= self.medium {
            Some(Severity::Medium)
        } else if self.low.is_some_and(|low| count >= low) {
            Some(Severity::Low)
        } else {
            None
        }
    }

    fn is_monotonic(&self) -> bool {
        let low_ok = self.low.map_or(true, |low| low <= self.medium);
        low_ok && self.medium <= self.high && self.high <= self.critical
    }
}

/// Score penalty weights. Severity weights must rise LOW through CRITICAL,
/// and errors must penalize more than warnings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub error: f64,
    pub warning: f64,
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            error: 2.0,
            warning: 0.5,
            low: 2.0,
            medium: 5.0,
            high: 10.0,
            critical: 20.0,
        }
    }
}

impl ScoreWeights {
    pub fn severity_weight(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
            Severity::Critical => self.critical,
        }
    }

    fn is_valid(&self) -> bool {
        self.warning > 0.0
            && self.error > self.warning
            && self.low < self.medium
            && self.medium < self.high
            && self.high < self.critical
            && [self.error, self.warning, self.low, self.medium, self.high, self.critical]
                .iter()
                .all(|w| w.is_finite())
    }
}

/// Tunables for one analysis run. Passed explicitly into every call; no
/// module-level cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Per-category overrides, keyed by category name (`sync`, `peer`, ...).
    pub thresholds: BTreeMap<String, ThresholdSet>,
    pub default_thresholds: ThresholdSet,
    /// Temporal bucket width for recurrence analysis.
    pub bucket_minutes: i64,
    /// Minimum buckets a signature must appear in to count as recurring.
    /// Unset means a majority of the window's buckets.
    pub recurrence_min_buckets: Option<usize>,
    /// Minimum hits inside a bucket for it to count.
    pub recurrence_min_count: u64,
    /// Sync events below this count the node as stably synced.
    pub sync_stable_below: u64,
    /// Peer events below this count connectivity as healthy.
    pub peer_ok_below: u64,
    /// Memory plus disk events below this count resources as healthy.
    pub resources_ok_below: u64,
    pub weights: ScoreWeights,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            thresholds: BTreeMap::new(),
            default_thresholds: ThresholdSet::default(),
            bucket_minutes: 60,
            recurrence_min_buckets: None,
            recurrence_min_count: 1,
            sync_stable_below: 5,
            peer_ok_below: 3,
            resources_ok_below: 2,
            weights: ScoreWeights::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Threshold set for a category: the named override if present and
    /// valid, otherwise the defaults. `Other` normally has no override, so
    /// unknown categories land on the default set.
    pub fn thresholds_for(&self, category: PatternCategory) -> &ThresholdSet {
        self.thresholds
            .get(category.name())
            .unwrap_or(&self.default_thresholds)
    }

    /// Drop invalid entries, warning as we go. Called once after load so
    /// the analysis path never has to re-validate.
    pub fn sanitize(&mut self) {
        let keys: Vec<String> = self.thresholds.keys().cloned().collect();
        for key in keys {
            if PatternCategory::from_name(&key).is_none() {
                warn!(category = %key, "unknown threshold category in config, ignoring");
                self.thresholds.remove(&key);
                continue;
            }
            if !self.thresholds[&key].is_monotonic() {
                warn!(category = %key, "non-monotonic thresholds in config, using defaults");
                self.thresholds.remove(&key);
            }
        }
        if !self.default_thresholds.is_monotonic() {
            warn!("non-monotonic default thresholds in config, using built-ins");
            self.default_thresholds = ThresholdSet::default();
        }
        if !self.weights.is_valid() {
            warn!("invalid score weights in config (need error > warning > 0 and rising severity weights), using defaults");
            self.weights = ScoreWeights::default();
        }
        if self.bucket_minutes < 1 {
            warn!(bucket_minutes = self.bucket_minutes, "bucket size below one minute, using 60");
            self.bucket_minutes = 60;
        }
    }
}

/// The whole `config.yaml`: the fleet node list plus analyzer tunables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    pub nodes: Vec<NodeConfig>,
    pub analysis: AnalyzerConfig,
}

impl FleetConfig {
    pub fn node(&self, name_or_domain: &str) -> Option<&NodeConfig> {
        self.nodes
            .iter()
            .find(|n| n.name == name_or_domain || n.tailscale_domain == name_or_domain)
    }

    pub fn active_nodes(&self) -> impl Iterator<Item = &NodeConfig> {
        self.nodes.iter().filter(|n| !n.is_disabled())
    }
}

/// Load and sanitize the fleet config.
pub fn load(explicit: Option<&Path>) -> Result<FleetConfig, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from("config.yaml"),
    };
    if !path.exists() {
        return Err(ConfigError::NotFound(path));
    }
    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let mut config: FleetConfig =
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })?;
    config.analysis.sanitize();
    Ok(config)
}
