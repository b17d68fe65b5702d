//! Recommendation generator -- maps detected anomaly categories to canned
//! operator guidance. Textual only; never executes anything.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analyze::anomaly::Anomaly;
use crate::analyze::catalogue::PatternCategory;
use crate::analyze::Severity;

/// Declaration order doubles as sort order: High sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: PatternCategory,
    pub text: String,
}

fn guidance(category: PatternCategory) -> &'static str {
    match category {
        PatternCategory::Attestation => {
            "Check beacon node sync status and upstream connectivity before the next attestation duty"
        }
        PatternCategory::BlockProposal => {
            "Review proposer configuration and relay connectivity; failed proposals forfeit rewards"
        }
        PatternCategory::Sync => "Restart the consensus client and verify its peer connections",
        PatternCategory::Peer => {
            "Review firewall settings and port forwarding for the P2P listen port"
        }
        PatternCategory::Network => "Check host network connectivity and DNS resolution",
        PatternCategory::Memory => {
            "Monitor memory usage and consider raising the container memory allocation"
        }
        PatternCategory::Disk => {
            "Check free disk space and prune or expand the chain database volume"
        }
        PatternCategory::Performance => {
            "Schedule a maintenance window to investigate degraded response times"
        }
        PatternCategory::Other => "Inspect container logs directly for uncategorized errors",
    }
}

fn priority_for(severity: Severity) -> Priority {
    match severity {
        Severity::Critical | Severity::High => Priority::High,
        Severity::Medium => Priority::Medium,
        Severity::Low => Priority::Low,
    }
}

/// One recommendation per distinct anomaly category, at the category's
/// maximum observed severity. Deduplicated on (category, text) and sorted by
/// priority then category name; categories with no anomalies produce nothing.
pub fn generate(anomalies: &[Anomaly]) -> Vec<Recommendation> {
    let mut max_severity: BTreeMap<PatternCategory, Severity> = BTreeMap::new();
    for anomaly in anomalies {
        max_severity
            .entry(anomaly.category)
            .and_modify(|sev| *sev = (*sev).max(anomaly.severity))
            .or_insert(anomaly.severity);
    }

    let mut recommendations: Vec<Recommendation> = max_severity
        .into_iter()
        .map(|(category, severity)| Recommendation {
            priority: priority_for(severity),
            category,
            text: guidance(category).to_string(),
        })
        .collect();

    recommendations.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.category.name().cmp(b.category.name()))
    });
    recommendations.dedup_by(|a, b| a.category == b.category && a.text == b.text);
    recommendations
}
