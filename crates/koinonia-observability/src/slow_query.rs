//! Fixed-capacity slow-query event buffer.
//!
//! Holds the most recent N slow-query events, oldest evicted first. State is
//! process-local with no persistence; a restart loses all history, which is
//! documented behavior, not a defect. The buffer is explicitly constructed
//! and passed where needed — there is no process-wide singleton.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// One intercepted database call that exceeded the slow-query threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlowQueryEvent {
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub duration_ms: f64,
    pub operation: String,
    pub params: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Snapshot statistics over the current buffer contents only, not
/// cumulative history.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SlowQueryStats {
    pub count: usize,
    pub avg_ms: f64,
    pub max_ms: f64,
    pub min_ms: f64,
}

/// Ring buffer of recent slow-query events, safe to share across threads.
///
/// Appends evict the oldest entry once capacity is reached. A poisoned lock
/// degrades to dropping the observation — recording paths never panic.
#[derive(Debug)]
pub struct SlowQueryLog {
    capacity: usize,
    events: Mutex<VecDeque<SlowQueryEvent>>,
}

impl SlowQueryLog {
    pub const DEFAULT_CAPACITY: usize = 100;

    /// Buffer holding at most `capacity` events. A zero capacity is bumped
    /// to one so `add` always retains the newest event.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            events: Mutex::new(VecDeque::with_capacity(capacity.max(1))),
        }
    }

    /// Append an event, evicting the oldest if the buffer is full.
    pub fn add(&self, event: SlowQueryEvent) {
        let Ok(mut events) = self.events.lock() else {
            return;
        };
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// The last `limit` events, in insertion order.
    pub fn recent(&self, limit: usize) -> Vec<SlowQueryEvent> {
        let Ok(events) = self.events.lock() else {
            return Vec::new();
        };
        let skip = events.len().saturating_sub(limit);
        events.iter().skip(skip).cloned().collect()
    }

    /// Events whose model matches, in insertion order.
    pub fn by_model(&self, model: &str) -> Vec<SlowQueryEvent> {
        let Ok(events) = self.events.lock() else {
            return Vec::new();
        };
        events
            .iter()
            .filter(|e| e.model.as_deref() == Some(model))
            .cloned()
            .collect()
    }

    /// Events at least `min_ms` long, in insertion order.
    pub fn by_duration(&self, min_ms: f64) -> Vec<SlowQueryEvent> {
        let Ok(events) = self.events.lock() else {
            return Vec::new();
        };
        events
            .iter()
            .filter(|e| e.duration_ms >= min_ms)
            .cloned()
            .collect()
    }

    /// Empty the buffer.
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count/avg/max/min over the current buffer contents.
    pub fn stats(&self) -> SlowQueryStats {
        let Ok(events) = self.events.lock() else {
            return SlowQueryStats::default();
        };
        if events.is_empty() {
            return SlowQueryStats::default();
        }

        let count = events.len();
        let sum: f64 = events.iter().map(|e| e.duration_ms).sum();
        let max_ms = events.iter().map(|e| e.duration_ms).fold(f64::MIN, f64::max);
        let min_ms = events.iter().map(|e| e.duration_ms).fold(f64::MAX, f64::min);

        SlowQueryStats {
            count,
            avg_ms: sum / count as f64,
            max_ms,
            min_ms,
        }
    }
}

impl Default for SlowQueryLog {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(query: &str, duration_ms: f64, model: Option<&str>) -> SlowQueryEvent {
        SlowQueryEvent {
            timestamp: Utc::now(),
            query: query.to_string(),
            duration_ms,
            operation: "findMany".to_string(),
            params: HashMap::new(),
            model: model.map(str::to_string),
            action: None,
        }
    }

    #[test]
    fn eviction_keeps_the_newest_entries_in_insertion_order() {
        let log = SlowQueryLog::new(3);

        for i in 0..5 {
            log.add(event(&format!("q{i}"), 600.0 + i as f64, None));
        }

        assert_eq!(log.len(), 3);
        let queries: Vec<String> = log.recent(10).into_iter().map(|e| e.query).collect();
        assert_eq!(queries, vec!["q2", "q3", "q4"]);
    }

    #[test]
    fn recent_limits_to_the_last_n() {
        let log = SlowQueryLog::new(10);

        for i in 0..4 {
            log.add(event(&format!("q{i}"), 600.0, None));
        }

        let queries: Vec<String> = log.recent(2).into_iter().map(|e| e.query).collect();
        assert_eq!(queries, vec!["q2", "q3"]);
    }

    #[test]
    fn filters_by_model_and_duration() {
        let log = SlowQueryLog::new(10);

        log.add(event("a", 600.0, Some("Member")));
        log.add(event("b", 900.0, Some("Message")));
        log.add(event("c", 1200.0, Some("Member")));

        let members = log.by_model("Member");
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].query, "a");

        let slow = log.by_duration(900.0);
        assert_eq!(slow.len(), 2);
        assert_eq!(slow[0].query, "b");
    }

    #[test]
    fn stats_snapshot_covers_current_contents_only() {
        let log = SlowQueryLog::new(2);

        log.add(event("a", 100.0, None));
        log.add(event("b", 200.0, None));
        // Evicts "a"; stats must not remember it.
        log.add(event("c", 400.0, None));

        let stats = log.stats();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.avg_ms, 300.0);
        assert_eq!(stats.max_ms, 400.0);
        assert_eq!(stats.min_ms, 200.0);
    }

    #[test]
    fn empty_log_has_default_stats() {
        let log = SlowQueryLog::default();
        assert!(log.is_empty());
        assert_eq!(log.stats(), SlowQueryStats::default());
    }

    #[test]
    fn clear_empties_the_buffer() {
        let log = SlowQueryLog::new(5);
        log.add(event("a", 600.0, None));
        log.clear();
        assert!(log.is_empty());
        assert!(log.recent(10).is_empty());
    }

    #[test]
    fn zero_capacity_is_bumped_to_one() {
        let log = SlowQueryLog::new(0);
        log.add(event("a", 600.0, None));
        log.add(event("b", 700.0, None));
        assert_eq!(log.len(), 1);
        assert_eq!(log.recent(1)[0].query, "b");
    }
}
