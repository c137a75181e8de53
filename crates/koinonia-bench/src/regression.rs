//! Regression classification against stored baselines.
//!
//! Comparison uses the p95 of each metric as the sole statistic. Deltas are
//! classified by fixed thresholds on the raw fractional change, checked in
//! descending order of severity with strict comparisons: a change of exactly
//! 25% is High, not Critical. Metrics between the low and improvement
//! thresholds are stable and produce no entry at all.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fractional change above which a regression is critical.
pub const CRITICAL_THRESHOLD: f64 = 0.25;
/// Fractional change above which a regression is high severity.
pub const HIGH_THRESHOLD: f64 = 0.15;
/// Fractional change above which a regression is medium severity.
pub const MEDIUM_THRESHOLD: f64 = 0.10;
/// Fractional change above which a regression is low severity.
pub const LOW_THRESHOLD: f64 = 0.05;
/// Fractional change below which a delta counts as an improvement.
pub const IMPROVEMENT_THRESHOLD: f64 = -0.05;

/// Severity of a detected regression, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Whether this severity fails the CI gate.
    pub fn blocks_gate(&self) -> bool {
        matches!(self, Severity::Critical | Severity::High)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of classifying a p95 delta. `None` from [`classify`] means the
/// metric is stable and produces no report entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Regression(Severity),
    Improvement,
}

/// Classify a fractional p95 change. First match in descending severity wins.
pub fn classify(change: f64) -> Option<Classification> {
    if change > CRITICAL_THRESHOLD {
        Some(Classification::Regression(Severity::Critical))
    } else if change > HIGH_THRESHOLD {
        Some(Classification::Regression(Severity::High))
    } else if change > MEDIUM_THRESHOLD {
        Some(Classification::Regression(Severity::Medium))
    } else if change > LOW_THRESHOLD {
        Some(Classification::Regression(Severity::Low))
    } else if change < IMPROVEMENT_THRESHOLD {
        Some(Classification::Improvement)
    } else {
        None
    }
}

/// A metric whose current p95 regressed past a severity threshold.
///
/// `percent_change` is the fractional change multiplied by 100; thresholds
/// are applied to the raw fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Regression {
    pub metric: String,
    pub baseline_value: f64,
    pub current_value: f64,
    pub percent_change: f64,
    pub severity: Severity,
}

/// A metric whose current p95 improved past the improvement threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Improvement {
    pub metric: String,
    pub baseline_value: f64,
    pub current_value: f64,
    pub percent_change: f64,
}

/// Result of comparing the live metric sequence against one baseline.
///
/// Computed fresh on each analysis call and not persisted by the engine;
/// persisting the rendered report is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionAnalysis {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    /// Name of the baseline compared against.
    pub baseline: String,
    pub regressions: Vec<Regression>,
    pub improvements: Vec<Improvement>,
    /// True iff no regression of critical or high severity was found.
    pub passed_threshold: bool,
}

impl RegressionAnalysis {
    /// CI gate: assert this true in a test runner to fail the build on
    /// critical or high regressions. Medium and low do not fail the gate.
    pub fn passed(&self) -> bool {
        self.passed_threshold
    }
}
