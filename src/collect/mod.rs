//! Remote log collection over SSH + `docker logs`.
//!
//! Thin collaborator for the analysis engine: it shells out to the system
//! `ssh` client (BatchMode, bounded connect time), lossy-decodes whatever
//! comes back, and hands the engine plain text. A container whose fetch
//! fails is skipped with a warning; only a node-level failure surfaces.

use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::analyze::{ContainerLogs, NodeLogs, TimeWindow};
use crate::config::NodeConfig;

const SSH_CONNECT_TIMEOUT_SECS: u32 = 10;
const DISCOVER_TIMEOUT: Duration = Duration::from_secs(15);
const LOGS_TIMEOUT: Duration = Duration::from_secs(30);

/// Container name fragments that identify Ethereum client containers.
const CLIENT_KEYWORDS: &[&str] = &[
    "consensus",
    "execution",
    "validator",
    "beacon",
    "lighthouse",
    "teku",
    "prysm",
    "nimbus",
    "lodestar",
    "geth",
    "nethermind",
    "besu",
    "reth",
    "erigon",
    "charon",
    "mev",
];

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("ssh to {node} failed: {detail}")]
    Ssh { node: String, detail: String },
    #[error("ssh to {node} timed out after {seconds}s")]
    Timeout { node: String, seconds: u64 },
    #[error("no Ethereum containers found on {node}")]
    NoContainers { node: String },
}

async fn run_ssh(
    node: &NodeConfig,
    remote_command: &str,
    limit: Duration,
) -> Result<String, CollectError> {
    let output = tokio::time::timeout(
        limit,
        Command::new("ssh")
            .arg("-o")
            .arg("BatchMode=yes")
            .arg("-o")
            .arg(format!("ConnectTimeout={SSH_CONNECT_TIMEOUT_SECS}"))
            .arg(node.ssh_target())
            .arg(remote_command)
            .output(),
    )
    .await
    .map_err(|_| CollectError::Timeout {
        node: node.name.clone(),
        seconds: limit.as_secs(),
    })?
    .map_err(|e| CollectError::Ssh {
        node: node.name.clone(),
        detail: e.to_string(),
    })?;

    if !output.status.success() {
        return Err(CollectError::Ssh {
            node: node.name.clone(),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    // Lossy on purpose: garbled multi-byte sequences in container logs are
    // opaque text for the analyzer, not a collection failure.
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// List Ethereum client containers running on the node.
pub async fn discover_containers(node: &NodeConfig) -> Result<Vec<String>, CollectError> {
    let raw = run_ssh(node, "docker ps --format '{{.Names}}'", DISCOVER_TIMEOUT).await?;
    let containers: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|name| !name.is_empty() && is_client_container(name))
        .map(String::from)
        .collect();
    debug!(node = %node.name, count = containers.len(), "discovered containers");
    Ok(containers)
}

fn is_client_container(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    CLIENT_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Fetch logs for every matching container on the node over the last
/// `hours` hours. Containers whose fetch fails are skipped, not fatal.
pub async fn collect_node_logs(
    node: &NodeConfig,
    hours: i64,
    container_filter: Option<&str>,
) -> Result<NodeLogs, CollectError> {
    let end = Utc::now();
    let start = end - chrono::Duration::hours(hours.max(1));
    let since = start.format("%Y-%m-%dT%H:%M:%S");

    let mut containers = discover_containers(node).await?;
    if let Some(filter) = container_filter {
        containers.retain(|c| c.contains(filter));
    }
    if containers.is_empty() {
        return Err(CollectError::NoContainers {
            node: node.name.clone(),
        });
    }

    let mut collected = Vec::with_capacity(containers.len());
    for container in containers {
        let remote = format!("docker logs {container} --since {since} 2>&1");
        match run_ssh(node, &remote, LOGS_TIMEOUT).await {
            Ok(text) => {
                debug!(node = %node.name, %container, bytes = text.len(), "fetched logs");
                collected.push(ContainerLogs {
                    name: container,
                    text,
                });
            }
            Err(e) => {
                warn!(node = %node.name, %container, error = %e, "skipping container, log fetch failed");
            }
        }
    }

    Ok(NodeLogs {
        node: node.name.clone(),
        window: TimeWindow { start, end },
        containers: collected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_container_filter() {
        assert!(is_client_container("eth-docker-consensus-1"));
        assert!(is_client_container("Lighthouse_VC"));
        assert!(is_client_container("mev-boost"));
        assert!(!is_client_container("haproxy"));
        assert!(!is_client_container("portainer"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_ssh_error() {
        let node = NodeConfig {
            name: "ghost".to_string(),
            tailscale_domain: "ghost.invalid".to_string(),
            ssh_user: "root".to_string(),
            stack: None,
        };
        let err = discover_containers(&node).await.unwrap_err();
        match err {
            CollectError::Ssh { node, .. } => assert_eq!(node, "ghost"),
            CollectError::Timeout { .. } => {}
            other => panic!("unexpected error: {other}"),
        }
    }
}
