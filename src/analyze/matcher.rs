//! Pattern matcher -- scans raw container log text against the signature
//! catalogue and aggregates per-(container, signature) match records.
//!
//! Pure function of its input: no I/O, no shared state. Bad lines are
//! skipped and counted, never fatal (per-line outcomes are values, not
//! exceptions).

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::Serialize;

use crate::analyze::catalogue::{Catalogue, PatternCategory};

/// One aggregated match record per (signature, container) per analysis window.
#[derive(Debug, Clone, Serialize)]
pub struct PatternMatch {
    pub signature: String,
    pub category: PatternCategory,
    pub container: String,
    pub adverse: bool,
    pub count: u64,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
}

/// A single timestamped signature hit, kept for temporal bucketing.
#[derive(Debug, Clone, Serialize)]
pub struct MatchEvent {
    pub signature: String,
    pub container: String,
    pub timestamp: DateTime<Utc>,
}

/// Per-scan counters. `lines_skipped` and `unparsed_timestamps` are the
/// recovered input errors; they never abort a batch.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ScanStats {
    pub lines_scanned: u64,
    pub lines_skipped: u64,
    pub unparsed_timestamps: u64,
    pub error_lines: u64,
    pub warning_lines: u64,
}

impl ScanStats {
    fn absorb(&mut self, other: &ScanStats) {
        self.lines_scanned += other.lines_scanned;
        self.lines_skipped += other.lines_skipped;
        self.unparsed_timestamps += other.unparsed_timestamps;
        self.error_lines += other.error_lines;
        self.warning_lines += other.warning_lines;
    }
}

/// Result of scanning one container (or, after merging, one node).
///
/// Matches are keyed `(container, signature)` in a BTreeMap so identical
/// input always yields identical iteration order.
#[derive(Default)]
pub struct ScanResult {
    pub matches: BTreeMap<(String, String), PatternMatch>,
    pub events: Vec<MatchEvent>,
    pub stats: ScanStats,
}

impl ScanResult {
    /// Fold another container's scan into this node-level result.
    pub fn merge(&mut self, other: ScanResult) {
        for (key, m) in other.matches {
            match self.matches.get_mut(&key) {
                Some(existing) => {
                    existing.count += m.count;
                    existing.first_seen = earliest(existing.first_seen, m.first_seen);
                    existing.last_seen = latest(existing.last_seen, m.last_seen);
                }
                None => {
                    self.matches.insert(key, m);
                }
            }
        }
        self.events.extend(other.events);
        self.stats.absorb(&other.stats);
    }
}

fn earliest(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, y) => x.or(y),
    }
}

fn latest(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, y) => x.or(y),
    }
}

/// Scan one container's raw log text against the catalogue.
///
/// Every line is tested against all signatures in catalogue order; matching
/// is non-exclusive, so one line can feed several records. Undecodable bytes
/// are expected to have been lossy-replaced upstream and are treated as
/// opaque text here.
pub fn scan_container(container: &str, text: &str, catalogue: &Catalogue) -> ScanResult {
    // Compiled per call; the catalogue itself carries the signature regexes.
    let ts_re = Regex::new(r"(\d{4}-\d{2}-\d{2})[T ](\d{2}:\d{2}:\d{2})")
        .expect("timestamp regex is invalid");
    let level_re = Regex::new(r"(?i)\b(ERROR|ERRO|ERR|WARNING|WARN)\b")
        .expect("level regex is invalid");

    let mut result = ScanResult::default();

    for line in text.lines() {
        if line.trim().is_empty() {
            result.stats.lines_skipped += 1;
            continue;
        }
        result.stats.lines_scanned += 1;

        let timestamp = match ts_re.captures(line) {
            Some(caps) => {
                let joined = format!("{}T{}", &caps[1], &caps[2]);
                match NaiveDateTime::parse_from_str(&joined, "%Y-%m-%dT%H:%M:%S") {
                    Ok(naive) => Some(naive.and_utc()),
                    Err(_) => {
                        // Looked like a timestamp but did not parse (e.g. a
                        // garbled month field). Count it and keep scanning.
                        result.stats.unparsed_timestamps += 1;
                        None
                    }
                }
            }
            None => None,
        };

        if let Some(level) = level_re.captures(line) {
            match level[1].to_ascii_uppercase().as_str() {
                "ERROR" | "ERRO" | "ERR" => result.stats.error_lines += 1,
                _ => result.stats.warning_lines += 1,
            }
        }

        for sig in catalogue.signatures() {
            if !sig.is_match(line) {
                continue;
            }
            let key = (container.to_string(), sig.name.to_string());
            let entry = result.matches.entry(key).or_insert_with(|| PatternMatch {
                signature: sig.name.to_string(),
                category: sig.category,
                container: container.to_string(),
                adverse: sig.adverse,
                count: 0,
                first_seen: None,
                last_seen: None,
            });
            entry.count += 1;
            entry.first_seen = earliest(entry.first_seen, timestamp);
            entry.last_seen = latest(entry.last_seen, timestamp);

            if let Some(ts) = timestamp {
                result.events.push(MatchEvent {
                    signature: sig.name.to_string(),
                    container: container.to_string(),
                    timestamp: ts,
                });
            }
        }
    }

    result
}
