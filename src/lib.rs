//! ethtriage -- fleet log triage and health scoring for Ethereum validator
//! nodes.
//!
//! This crate provides the core library: SSH/Docker log collection, the
//! pattern-matching analysis engine (anomalies, health scores, recurring
//! patterns, recommendations), and table/JSON rendering.

pub mod analyze;
pub mod collect;
pub mod config;
pub mod report;

use anyhow::Result;

use analyze::{AnalysisReport, Catalogue};
use config::{FleetConfig, NodeConfig};

/// Collect and analyze one node.
pub async fn run_node_analysis(
    node: &NodeConfig,
    config: &FleetConfig,
    hours: i64,
    container_filter: Option<&str>,
) -> Result<AnalysisReport> {
    tracing::info!(node = %node.name, hours, "collecting logs");
    let logs = collect::collect_node_logs(node, hours, container_filter).await?;
    let catalogue = Catalogue::builtin();
    Ok(analyze::analyze(&logs, &catalogue, &config.analysis))
}

/// Collect and analyze every active node in the fleet. A node whose
/// collection fails is reported with a warning and skipped; the rest of the
/// fleet still gets analyzed.
pub async fn run_fleet_analysis(
    config: &FleetConfig,
    hours: i64,
    container_filter: Option<&str>,
) -> Vec<AnalysisReport> {
    let catalogue = Catalogue::builtin();
    let mut reports = Vec::new();
    for node in config.active_nodes() {
        match collect::collect_node_logs(node, hours, container_filter).await {
            Ok(logs) => reports.push(analyze::analyze(&logs, &catalogue, &config.analysis)),
            Err(e) => {
                tracing::warn!(node = %node.name, error = %e, "skipping node, collection failed");
            }
        }
    }
    reports
}
