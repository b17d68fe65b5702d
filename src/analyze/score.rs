//! Health scorer -- folds anomalies and raw error/warning counts into a
//! single 0-100 score per node.
//!
//! The score is recomputed in full on every run from the complete input set;
//! there is no incremental update path, so it can never drift from its
//! stated inputs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyze::anomaly::Anomaly;
use crate::analyze::matcher::ScanStats;
use crate::analyze::Severity;
use crate::config::ScoreWeights;

/// A computed node score. Always within [0, 100].
#[derive(Debug, Clone, Serialize)]
pub struct HealthScore {
    pub node: String,
    pub score: f64,
    pub contributing_anomalies: usize,
    pub error_count: u64,
    pub warning_count: u64,
    pub computed_at: DateTime<Utc>,
}

/// Scoring outcome. A node with zero usable log lines gets the distinguished
/// `InsufficientData` variant rather than a misleading perfect 100.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HealthReport {
    InsufficientData { node: String },
    Scored(HealthScore),
}

impl HealthReport {
    pub fn score(&self) -> Option<f64> {
        match self {
            HealthReport::Scored(s) => Some(s.score),
            HealthReport::InsufficientData { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Critical,
    Warning,
}

/// An operator-facing alert with a suggested first move.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
    pub action: String,
}

/// Derive alerts from the computed score and the anomaly list.
///
/// Score bands: below 50 is critical, below 75 a warning. On top of that,
/// every HIGH or CRITICAL anomaly raises a per-container alert. Pure
/// function; an unscored node produces no score-band alert.
pub fn alerts_for(health: &HealthReport, anomalies: &[Anomaly]) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if let HealthReport::Scored(s) = health {
        if s.score < 50.0 {
            alerts.push(Alert {
                level: AlertLevel::Critical,
                message: format!("Overall health score is low: {:.1}/100", s.score),
                action: "Immediate investigation required".to_string(),
            });
        } else if s.score < 75.0 {
            alerts.push(Alert {
                level: AlertLevel::Warning,
                message: format!("Health score below optimal: {:.1}/100", s.score),
                action: "Monitor closely and consider improvements".to_string(),
            });
        }
    }

    for anomaly in anomalies {
        if anomaly.severity >= Severity::High {
            alerts.push(Alert {
                level: AlertLevel::Critical,
                message: format!("{}: {}", anomaly.container, anomaly.description),
                action: format!("Check {} logs immediately", anomaly.container),
            });
        }
    }

    alerts
}

/// Compute `clamp(100 - sum(severity_weight) - errors*W_err - warns*W_warn, 0, 100)`.
///
/// Deterministic for identical inputs; `computed_at` is metadata only and
/// never feeds the score.
pub fn score_node(
    node: &str,
    anomalies: &[Anomaly],
    stats: &ScanStats,
    weights: &ScoreWeights,
) -> HealthReport {
    if stats.lines_scanned == 0 {
        return HealthReport::InsufficientData {
            node: node.to_string(),
        };
    }

    let anomaly_penalty: f64 = anomalies
        .iter()
        .map(|a| weights.severity_weight(a.severity))
        .sum();
    let penalty = anomaly_penalty
        + stats.error_lines as f64 * weights.error
        + stats.warning_lines as f64 * weights.warning;

    let score = (100.0 - penalty).clamp(0.0, 100.0);

    HealthReport::Scored(HealthScore {
        node: node.to_string(),
        score,
        contributing_anomalies: anomalies.len(),
        error_count: stats.error_lines,
        warning_count: stats.warning_lines,
        computed_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::catalogue::PatternCategory;
    use crate::analyze::Severity;

    fn anomaly(severity: Severity) -> Anomaly {
        Anomaly {
            category: PatternCategory::Network,
            container: "consensus".to_string(),
            severity,
            evidence_count: 10,
            description: "test".to_string(),
        }
    }

    fn stats(scanned: u64, errors: u64, warnings: u64) -> ScanStats {
        ScanStats {
            lines_scanned: scanned,
            lines_skipped: 0,
            unparsed_timestamps: 0,
            error_lines: errors,
            warning_lines: warnings,
        }
    }

    #[test]
    fn test_clean_data_scores_perfect() {
        // Data exists, just clean: 100, not insufficient-data.
        let report = score_node("vega", &[], &stats(100, 0, 0), &ScoreWeights::default());
        assert_eq!(report.score(), Some(100.0));
    }

    #[test]
    fn test_empty_input_is_insufficient_data() {
        let report = score_node("vega", &[], &stats(0, 0, 0), &ScoreWeights::default());
        assert!(matches!(report, HealthReport::InsufficientData { .. }));
        assert_eq!(report.score(), None);
    }

    #[test]
    fn test_error_and_warning_weights() {
        // 100 - 10*2.0 - 20*0.5 = 70
        let weights = ScoreWeights {
            error: 2.0,
            warning: 0.5,
            ..ScoreWeights::default()
        };
        let report = score_node("vega", &[], &stats(1000, 10, 20), &weights);
        assert_eq!(report.score(), Some(70.0));
    }

    #[test]
    fn test_score_never_negative() {
        let anomalies: Vec<_> = (0..50).map(|_| anomaly(Severity::Critical)).collect();
        let report = score_node("vega", &anomalies, &stats(10_000, 500, 500), &ScoreWeights::default());
        let score = report.score().unwrap();
        assert!((0.0..=100.0).contains(&score));
        assert_eq!(score, 0.0);
        assert!(!score.is_nan());
    }

    #[test]
    fn test_score_monotone_in_severity() {
        let weights = ScoreWeights::default();
        let base = stats(1000, 3, 5);
        let mut last = f64::INFINITY;
        for sev in [
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ] {
            let report = score_node("vega", &[anomaly(sev)], &base, &weights);
            let score = report.score().unwrap();
            assert!(score < last, "raising severity must not raise the score");
            last = score;
        }
    }

    #[test]
    fn test_alert_bands_from_score() {
        let weights = ScoreWeights::default();
        // 100 - 30*2.0 = 40: critical band.
        let low = score_node("vega", &[], &stats(1000, 30, 0), &weights);
        let alerts = alerts_for(&low, &[]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Critical);

        // 100 - 15*2.0 = 70: warning band.
        let mid = score_node("vega", &[], &stats(1000, 15, 0), &weights);
        let alerts = alerts_for(&mid, &[]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Warning);

        // 100 - 5*2.0 = 90: no score-band alert.
        let high = score_node("vega", &[], &stats(1000, 5, 0), &weights);
        assert!(alerts_for(&high, &[]).is_empty());
    }

    #[test]
    fn test_high_severity_anomalies_raise_container_alerts() {
        let health = score_node("vega", &[], &stats(1000, 0, 0), &ScoreWeights::default());
        let anomalies = vec![
            anomaly(Severity::Critical),
            anomaly(Severity::High),
            anomaly(Severity::Medium),
        ];
        let alerts = alerts_for(&health, &anomalies);
        // Only the HIGH and CRITICAL anomalies alert; score 100 adds none.
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| a.level == AlertLevel::Critical));
        assert!(alerts[0].message.starts_with("consensus:"));
        assert!(alerts[0].action.contains("consensus"));
    }

    #[test]
    fn test_unscored_node_has_no_score_band_alert() {
        let health = score_node("vega", &[], &stats(0, 0, 0), &ScoreWeights::default());
        assert!(alerts_for(&health, &[]).is_empty());
    }

    #[test]
    fn test_score_deterministic() {
        let anomalies = vec![anomaly(Severity::High), anomaly(Severity::Low)];
        let s = stats(500, 7, 11);
        let w = ScoreWeights::default();
        let a = score_node("vega", &anomalies, &s, &w).score();
        let b = score_node("vega", &anomalies, &s, &w).score();
        assert_eq!(a, b);
    }
}
