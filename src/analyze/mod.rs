//! Log analysis engine: pattern matching, anomaly grading, health scoring,
//! temporal recurrence, and recommendations.
//!
//! The whole engine is stateless across runs: one invocation maps
//! `(collected logs, catalogue, config)` to a complete report, with no
//! carried memory and no I/O. Callers may safely run it concurrently for
//! different nodes.

pub mod anomaly;
pub mod catalogue;
pub mod matcher;
pub mod recommend;
pub mod score;
pub mod temporal;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use anomaly::Anomaly;
pub use catalogue::{Catalogue, PatternCategory};
pub use matcher::{MatchEvent, PatternMatch, ScanResult, ScanStats};
pub use recommend::{Priority, Recommendation};
pub use score::{Alert, AlertLevel, HealthReport, HealthScore};
pub use temporal::RecurringPattern;

use crate::config::AnalyzerConfig;

/// Severity grades for anomalies, ordered LOW < MEDIUM < HIGH < CRITICAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        };
        write!(f, "{s}")
    }
}

/// The declared bounds of one analysis window.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Raw log text for one container, lossy-decoded upstream.
#[derive(Debug, Clone)]
pub struct ContainerLogs {
    pub name: String,
    pub text: String,
}

/// Everything the collector hands to the engine for one node.
#[derive(Debug, Clone)]
pub struct NodeLogs {
    pub node: String,
    pub window: TimeWindow,
    pub containers: Vec<ContainerLogs>,
}

/// Duty-level success/failure summary derived from the positive vs adverse
/// attestation and proposal signatures, plus stability verdicts for sync,
/// peers, and memory/disk pressure.
#[derive(Debug, Clone, Serialize)]
pub struct OperationalInsights {
    pub success_operations: u64,
    pub failed_operations: u64,
    pub success_rate_percent: Option<f64>,
    pub sync_stable: bool,
    pub peer_connectivity_ok: bool,
    pub resources_ok: bool,
}

fn insights_from(scan: &ScanResult, config: &AnalyzerConfig) -> OperationalInsights {
    let mut success = 0u64;
    let mut failed = 0u64;
    let mut sync_events = 0u64;
    let mut peer_events = 0u64;
    let mut resource_events = 0u64;

    for m in scan.matches.values() {
        match m.category {
            PatternCategory::Attestation | PatternCategory::BlockProposal => {
                if m.adverse {
                    failed += m.count;
                } else {
                    success += m.count;
                }
            }
            PatternCategory::Sync => sync_events += m.count,
            PatternCategory::Peer => peer_events += m.count,
            PatternCategory::Memory | PatternCategory::Disk => resource_events += m.count,
            _ => {}
        }
    }

    let total = success + failed;
    OperationalInsights {
        success_operations: success,
        failed_operations: failed,
        success_rate_percent: (total > 0).then(|| success as f64 / total as f64 * 100.0),
        sync_stable: sync_events < config.sync_stable_below,
        peer_connectivity_ok: peer_events < config.peer_ok_below,
        resources_ok: resource_events < config.resources_ok_below,
    }
}

/// The complete, serializable result of one analysis run. JSON export is a
/// direct serialization of this record; field names are stable.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub node: String,
    pub window: TimeWindow,
    pub containers_analyzed: usize,
    pub stats: ScanStats,
    pub matches: Vec<PatternMatch>,
    pub anomalies: Vec<Anomaly>,
    pub health: HealthReport,
    pub alerts: Vec<Alert>,
    pub recurring: Vec<RecurringPattern>,
    pub recommendations: Vec<Recommendation>,
    pub insights: OperationalInsights,
    pub generated_at: DateTime<Utc>,
}

/// Run the full pipeline for one node. Pure computation; the only
/// timestamped side channel is `generated_at` on the report envelope.
pub fn analyze(logs: &NodeLogs, catalogue: &Catalogue, config: &AnalyzerConfig) -> AnalysisReport {
    let mut scan = ScanResult::default();
    for container in &logs.containers {
        scan.merge(matcher::scan_container(
            &container.name,
            &container.text,
            catalogue,
        ));
    }

    let anomalies = anomaly::detect(&scan, config);
    let health = score::score_node(&logs.node, &anomalies, &scan.stats, &config.weights);
    let alerts = score::alerts_for(&health, &anomalies);
    let recurring = temporal::find_recurring(&scan.events, &logs.window, config);
    let recommendations = recommend::generate(&anomalies);
    let insights = insights_from(&scan, config);

    AnalysisReport {
        node: logs.node.clone(),
        window: logs.window,
        containers_analyzed: logs.containers.len(),
        stats: scan.stats,
        matches: scan.matches.into_values().collect(),
        anomalies,
        health,
        alerts,
        recurring,
        recommendations,
        insights,
        generated_at: Utc::now(),
    }
}
