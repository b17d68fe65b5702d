//! Temporal pattern analyzer -- buckets timestamped matches to separate
//! chronic issues from one-off bursts.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analyze::matcher::MatchEvent;
use crate::analyze::TimeWindow;
use crate::config::AnalyzerConfig;

/// A signature whose matches persist across enough time buckets to count as
/// chronic rather than transient.
#[derive(Debug, Clone, Serialize)]
pub struct RecurringPattern {
    pub signature: String,
    pub total_count: u64,
    pub buckets_hit: usize,
    pub bucket_count: usize,
}

/// Partition the window into fixed-width buckets and flag signatures that
/// reach the minimum per-bucket count in at least N buckets.
///
/// N defaults to a majority of the buckets when not configured. Output is
/// ordered by total occurrence count descending, ties by signature name
/// ascending.
pub fn find_recurring(
    events: &[MatchEvent],
    window: &TimeWindow,
    config: &AnalyzerConfig,
) -> Vec<RecurringPattern> {
    let bucket_secs = config.bucket_minutes.max(1) * 60;
    let window_secs = (window.end - window.start).num_seconds();
    if window_secs <= 0 || events.is_empty() {
        return Vec::new();
    }
    // Ceiling division so a partial trailing slice still gets a bucket.
    let bucket_count = ((window_secs + bucket_secs - 1) / bucket_secs) as usize;
    let min_buckets = config
        .recurrence_min_buckets
        .unwrap_or(bucket_count / 2 + 1);
    let min_count = config.recurrence_min_count.max(1);

    let mut per_bucket: BTreeMap<(String, i64), u64> = BTreeMap::new();
    for event in events {
        let offset = (event.timestamp - window.start).num_seconds();
        if offset < 0 || offset >= window_secs {
            continue;
        }
        *per_bucket
            .entry((event.signature.clone(), offset / bucket_secs))
            .or_default() += 1;
    }

    let mut totals: BTreeMap<String, (u64, usize)> = BTreeMap::new();
    for ((signature, _bucket), count) in per_bucket {
        let entry = totals.entry(signature).or_insert((0, 0));
        entry.0 += count;
        if count >= min_count {
            entry.1 += 1;
        }
    }

    let mut recurring: Vec<RecurringPattern> = totals
        .into_iter()
        .filter(|(_, (_, buckets_hit))| *buckets_hit >= min_buckets)
        .map(|(signature, (total_count, buckets_hit))| RecurringPattern {
            signature,
            total_count,
            buckets_hit,
            bucket_count,
        })
        .collect();

    recurring.sort_by(|a, b| {
        b.total_count
            .cmp(&a.total_count)
            .then_with(|| a.signature.cmp(&b.signature))
    });
    recurring
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn window_hours(hours: i64) -> TimeWindow {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        TimeWindow {
            start,
            end: start + Duration::hours(hours),
        }
    }

    fn events_in_buckets(signature: &str, window: &TimeWindow, buckets: &[i64]) -> Vec<MatchEvent> {
        buckets
            .iter()
            .map(|b| MatchEvent {
                signature: signature.to_string(),
                container: "consensus".to_string(),
                timestamp: window.start + Duration::hours(*b) + Duration::minutes(5),
            })
            .collect()
    }

    #[test]
    fn test_majority_recurrence_flags() {
        // 5 of 6 one-hour buckets with N=4 must flag; 2 of 6 must not.
        let window = window_hours(6);
        let mut config = AnalyzerConfig::default();
        config.recurrence_min_buckets = Some(4);

        let mut events = events_in_buckets("sync_lag", &window, &[0, 1, 2, 4, 5]);
        events.extend(events_in_buckets("disk_pressure", &window, &[1, 3]));

        let recurring = find_recurring(&events, &window, &config);
        assert_eq!(recurring.len(), 1);
        assert_eq!(recurring[0].signature, "sync_lag");
        assert_eq!(recurring[0].buckets_hit, 5);
        assert_eq!(recurring[0].bucket_count, 6);
    }

    #[test]
    fn test_exact_boundary_at_n_buckets() {
        let window = window_hours(6);
        let mut config = AnalyzerConfig::default();
        config.recurrence_min_buckets = Some(4);

        let exactly_n = events_in_buckets("sync_lag", &window, &[0, 1, 2, 3]);
        assert_eq!(find_recurring(&exactly_n, &window, &config).len(), 1);

        let n_minus_one = events_in_buckets("sync_lag", &window, &[0, 1, 2]);
        assert!(find_recurring(&n_minus_one, &window, &config).is_empty());
    }

    #[test]
    fn test_default_n_is_majority_of_buckets() {
        // 6 buckets -> majority is 4.
        let window = window_hours(6);
        let config = AnalyzerConfig::default();

        let four = events_in_buckets("peer_loss", &window, &[0, 2, 3, 5]);
        assert_eq!(find_recurring(&four, &window, &config).len(), 1);

        let three = events_in_buckets("peer_loss", &window, &[0, 2, 3]);
        assert!(find_recurring(&three, &window, &config).is_empty());
    }

    #[test]
    fn test_ordering_by_total_then_name() {
        let window = window_hours(4);
        let mut config = AnalyzerConfig::default();
        config.recurrence_min_buckets = Some(2);

        let mut events = events_in_buckets("sync_lag", &window, &[0, 1, 2]);
        events.extend(events_in_buckets("peer_loss", &window, &[0, 1, 2]));
        events.extend(events_in_buckets("connection_timeout", &window, &[0, 1, 2, 3]));

        let recurring = find_recurring(&events, &window, &config);
        let names: Vec<_> = recurring.iter().map(|r| r.signature.as_str()).collect();
        // Highest total first, then ties alphabetically.
        assert_eq!(names, vec!["connection_timeout", "peer_loss", "sync_lag"]);
    }

    #[test]
    fn test_events_outside_window_ignored() {
        let window = window_hours(2);
        let mut config = AnalyzerConfig::default();
        config.recurrence_min_buckets = Some(1);

        let events = vec![MatchEvent {
            signature: "sync_lag".to_string(),
            container: "consensus".to_string(),
            timestamp: window.end + Duration::hours(1),
        }];
        assert!(find_recurring(&events, &window, &config).is_empty());
    }

    #[test]
    fn test_min_count_per_bucket() {
        let window = window_hours(3);
        let mut config = AnalyzerConfig::default();
        config.recurrence_min_buckets = Some(2);
        config.recurrence_min_count = 3;

        // Two buckets with 3 hits each, one with a single hit.
        let mut events = Vec::new();
        for _ in 0..3 {
            events.extend(events_in_buckets("sync_lag", &window, &[0, 1]));
        }
        events.extend(events_in_buckets("sync_lag", &window, &[2]));

        let recurring = find_recurring(&events, &window, &config);
        assert_eq!(recurring.len(), 1);
        assert_eq!(recurring[0].buckets_hit, 2);
        assert_eq!(recurring[0].total_count, 7);
    }
}
