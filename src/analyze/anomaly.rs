//! Anomaly detector -- turns aggregated pattern counts into severity-graded
//! anomaly records using the per-category threshold table.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analyze::catalogue::PatternCategory;
use crate::analyze::matcher::ScanResult;
use crate::analyze::Severity;
use crate::config::AnalyzerConfig;

/// A detected deviation: the adverse match count for one (container,
/// category) crossed a configured threshold. Immutable after creation.
#[derive(Debug, Clone, Serialize)]
pub struct Anomaly {
    pub category: PatternCategory,
    pub container: String,
    pub severity: Severity,
    pub evidence_count: u64,
    pub description: String,
}

/// Grade adverse pattern counts against the threshold table.
///
/// Counts are summed per (container, category); the highest severity whose
/// threshold is met wins. A count of zero never produces an anomaly, and a
/// category missing from the table uses the default set rather than being
/// dropped. Output order is container then category, so identical input
/// yields identical output.
pub fn detect(scan: &ScanResult, config: &AnalyzerConfig) -> Vec<Anomaly> {
    let mut counts: BTreeMap<(String, PatternCategory), u64> = BTreeMap::new();
    for m in scan.matches.values() {
        if !m.adverse {
            continue;
        }
        *counts
            .entry((m.container.clone(), m.category))
            .or_default() += m.count;
    }

    let mut anomalies = Vec::new();
    for ((container, category), count) in counts {
        let thresholds = config.thresholds_for(category);
        if let Some(severity) = thresholds.severity_for(count) {
            anomalies.push(Anomaly {
                category,
                container: container.clone(),
                severity,
                evidence_count: count,
                description: format!(
                    "{count} {category} events on {container} in the analysis window"
                ),
            });
        }
    }
    anomalies
}
