//! Table rendering for terminal output, plus JSON export.

use anyhow::Result;
use serde::Serialize;

use crate::analyze::{AlertLevel, AnalysisReport, HealthReport};

/// Pretty-print any report record as JSON (lossless, stable field names).
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn health_cell(health: &HealthReport) -> String {
    match health {
        HealthReport::Scored(s) => format!("{:.1}", s.score),
        HealthReport::InsufficientData { .. } => "no data".to_string(),
    }
}

/// Fleet-level health summary, one row per node.
pub fn print_health_table(reports: &[AnalysisReport]) {
    println!();
    println!(
        "{:<15} | {:<8} | {:<10} | {:<8} | {:<9} | Containers",
        "Node", "Score", "Anomalies", "Errors", "Warnings"
    );
    println!(
        "{:-<15}-|-{:-<8}-|-{:-<10}-|-{:-<8}-|-{:-<9}-|-{:-<10}",
        "", "", "", "", "", ""
    );
    for report in reports {
        let (errors, warnings) = match &report.health {
            HealthReport::Scored(s) => (s.error_count, s.warning_count),
            HealthReport::InsufficientData { .. } => (0, 0),
        };
        println!(
            "{:<15} | {:<8} | {:<10} | {:<8} | {:<9} | {}",
            report.node,
            health_cell(&report.health),
            report.anomalies.len(),
            errors,
            warnings,
            report.containers_analyzed
        );
    }
    println!();
}

/// Full single-node report: anomalies, recurring patterns, recommendations.
pub fn print_report(report: &AnalysisReport) {
    println!();
    println!("=== {} ===", report.node);
    println!(
        "Window: {} .. {}",
        report.window.start.format("%Y-%m-%d %H:%M"),
        report.window.end.format("%Y-%m-%d %H:%M")
    );
    println!(
        "Scanned {} lines across {} containers ({} skipped, {} unparsed timestamps)",
        report.stats.lines_scanned,
        report.containers_analyzed,
        report.stats.lines_skipped,
        report.stats.unparsed_timestamps
    );
    println!("Health: {}", health_cell(&report.health));

    if !report.alerts.is_empty() {
        println!("\nAlerts:");
        for alert in &report.alerts {
            let level = match alert.level {
                AlertLevel::Critical => "CRITICAL",
                AlertLevel::Warning => "WARNING",
            };
            println!(" [{:<8}] {} -> {}", level, alert.message, alert.action);
        }
    }

    if report.anomalies.is_empty() {
        println!("\nNo anomalies detected.");
    } else {
        println!();
        println!(
            "{:<25} | {:<15} | {:<9} | Count",
            "Container", "Category", "Severity"
        );
        println!("{:-<25}-|-{:-<15}-|-{:-<9}-|-{:-<6}", "", "", "", "");
        for a in &report.anomalies {
            println!(
                "{:<25} | {:<15} | {:<9} | {}",
                a.container,
                a.category.name(),
                a.severity.to_string(),
                a.evidence_count
            );
        }
    }

    print_patterns(report);
    print_recommendations(report);

    let i = &report.insights;
    if i.success_operations + i.failed_operations > 0 {
        if let Some(rate) = i.success_rate_percent {
            println!(
                "Duties: {} ok / {} failed ({:.1}% success)",
                i.success_operations, i.failed_operations, rate
            );
        }
    }
    println!();
}

/// Recurring-pattern view ("patterns" subcommand and part of the full report).
pub fn print_patterns(report: &AnalysisReport) {
    if report.recurring.is_empty() {
        println!("\nNo recurring patterns.");
        return;
    }
    println!();
    println!("{:<25} | {:<8} | Buckets", "Recurring pattern", "Total");
    println!("{:-<25}-|-{:-<8}-|-{:-<12}", "", "", "");
    for r in &report.recurring {
        println!(
            "{:<25} | {:<8} | {}/{}",
            r.signature, r.total_count, r.buckets_hit, r.bucket_count
        );
    }
}

/// Recommendation list, already priority-sorted by the generator.
pub fn print_recommendations(report: &AnalysisReport) {
    if report.recommendations.is_empty() {
        println!("\nNo recommendations.");
        return;
    }
    println!("\nRecommendations:");
    for rec in &report.recommendations {
        println!(" [{:?}] {}: {}", rec.priority, rec.category.name(), rec.text);
    }
}
