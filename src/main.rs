use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use ethtriage::config::{self, FleetConfig, NodeConfig};
use ethtriage::report;

#[derive(Parser)]
#[command(
    name = "ethtriage",
    about = "Fleet log triage and health scoring for Ethereum validator nodes",
    version,
    long_about = None
)]
struct Cli {
    /// Path to config.yaml (defaults to the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the configured fleet nodes
    Nodes,

    /// Full log analysis for one node, or the whole fleet
    Analyze {
        /// Node name or tailscale domain (omit to analyze the fleet)
        #[arg(long)]
        node: Option<String>,

        /// Analysis window in hours
        #[arg(long, default_value = "24")]
        hours: i64,

        /// Only containers whose name contains this substring
        #[arg(long)]
        container: Option<String>,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Health-score summary table
    Health {
        /// Node name (omit for the whole fleet)
        #[arg(long)]
        node: Option<String>,

        /// Analysis window in hours
        #[arg(long, default_value = "24")]
        hours: i64,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Recurring log patterns for one node
    Patterns {
        /// Node name
        #[arg(long)]
        node: String,

        /// Analysis window in hours
        #[arg(long, default_value = "24")]
        hours: i64,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Actionable recommendations for one node
    Recommend {
        /// Node name
        #[arg(long)]
        node: String,

        /// Analysis window in hours
        #[arg(long, default_value = "48")]
        hours: i64,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },
}

fn require_node<'a>(config: &'a FleetConfig, name: &str) -> Result<&'a NodeConfig> {
    match config.node(name) {
        Some(node) => Ok(node),
        None => bail!("node '{name}' not found in config.yaml"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let fleet = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Nodes => {
            if fleet.nodes.is_empty() {
                println!("No nodes configured.");
            } else {
                println!("{:<15} | {:<35} | {:<10} | Enabled", "Name", "Domain", "User");
                println!("{:-<15}-|-{:-<35}-|-{:-<10}-|-{:-<7}", "", "", "", "");
                for node in &fleet.nodes {
                    println!(
                        "{:<15} | {:<35} | {:<10} | {}",
                        node.name,
                        node.tailscale_domain,
                        node.ssh_user,
                        !node.is_disabled()
                    );
                }
            }
        }
        Commands::Analyze {
            node,
            hours,
            container,
            json,
        } => match node {
            Some(name) => {
                let node = require_node(&fleet, &name)?;
                let report =
                    ethtriage::run_node_analysis(node, &fleet, hours, container.as_deref())
                        .await?;
                if json {
                    report::print_json(&report)?;
                } else {
                    report::print_report(&report);
                }
            }
            None => {
                let reports =
                    ethtriage::run_fleet_analysis(&fleet, hours, container.as_deref()).await;
                if json {
                    report::print_json(&reports)?;
                } else {
                    for report in &reports {
                        report::print_report(report);
                    }
                    report::print_health_table(&reports);
                }
            }
        },
        Commands::Health { node, hours, json } => {
            let reports = match node {
                Some(name) => {
                    let node = require_node(&fleet, &name)?;
                    vec![ethtriage::run_node_analysis(node, &fleet, hours, None).await?]
                }
                None => ethtriage::run_fleet_analysis(&fleet, hours, None).await,
            };
            if json {
                let health: Vec<_> = reports.iter().map(|r| &r.health).collect();
                report::print_json(&health)?;
            } else {
                report::print_health_table(&reports);
            }
        }
        Commands::Patterns { node, hours, json } => {
            let node = require_node(&fleet, &node)?;
            let report = ethtriage::run_node_analysis(node, &fleet, hours, None).await?;
            if json {
                report::print_json(&report.recurring)?;
            } else {
                report::print_patterns(&report);
                println!();
            }
        }
        Commands::Recommend { node, hours, json } => {
            let node = require_node(&fleet, &node)?;
            let report = ethtriage::run_node_analysis(node, &fleet, hours, None).await?;
            if json {
                report::print_json(&report.recommendations)?;
            } else {
                report::print_recommendations(&report);
                println!();
            }
        }
    }

    Ok(())
}
