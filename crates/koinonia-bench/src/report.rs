//! Plain-text regression report rendering for console and CI output.
//!
//! [`render_report`] is a pure formatter so it stays independently testable;
//! [`print_report`] is the thin stdout wrapper around it.

use crate::regression::RegressionAnalysis;

/// Render an analysis as a fixed-format text block.
pub fn render_report(analysis: &RegressionAnalysis) -> String {
    let mut out = String::new();

    out.push_str("=====================================\n");
    out.push_str("  Performance Regression Report\n");
    out.push_str("=====================================\n");
    out.push_str(&format!("Baseline:  {}\n", analysis.baseline));
    out.push_str(&format!("Timestamp: {}\n", analysis.timestamp.to_rfc3339()));

    let status = if analysis.passed_threshold {
        "✅ PASSED"
    } else {
        "❌ FAILED"
    };
    out.push_str(&format!("Status:    {}\n\n", status));

    if analysis.regressions.is_empty() {
        out.push_str("No regressions detected.\n");
    } else {
        out.push_str("Regressions:\n");
        for r in &analysis.regressions {
            out.push_str(&format!(
                "  [{}] {}: {} -> {} ({:+.2}%)\n",
                r.severity, r.metric, r.baseline_value, r.current_value, r.percent_change
            ));
        }
    }

    if !analysis.improvements.is_empty() {
        out.push_str("\nImprovements:\n");
        for i in &analysis.improvements {
            out.push_str(&format!(
                "  {}: {} -> {} ({:+.2}%)\n",
                i.metric, i.baseline_value, i.current_value, i.percent_change
            ));
        }
    }

    out
}

/// Write the rendered report to standard output.
pub fn print_report(analysis: &RegressionAnalysis) {
    print!("{}", render_report(analysis));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regression::{Improvement, Regression, Severity};
    use chrono::TimeZone;
    use chrono::Utc;

    fn sample_analysis() -> RegressionAnalysis {
        RegressionAnalysis {
            name: "regression-test".to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap(),
            baseline: "main".to_string(),
            regressions: vec![Regression {
                metric: "api.latency".to_string(),
                baseline_value: 200.0,
                current_value: 260.0,
                percent_change: 30.0,
                severity: Severity::Critical,
            }],
            improvements: vec![Improvement {
                metric: "db.query.members".to_string(),
                baseline_value: 100.0,
                current_value: 80.0,
                percent_change: -20.0,
            }],
            passed_threshold: false,
        }
    }

    #[test]
    fn report_includes_header_status_and_entries() {
        let report = render_report(&sample_analysis());

        assert!(report.contains("Performance Regression Report"));
        assert!(report.contains("Baseline:  main"));
        assert!(report.contains("Timestamp: 2026-08-01T12:00:00+00:00"));
        assert!(report.contains("❌ FAILED"));
        assert!(report.contains("[critical] api.latency: 200 -> 260 (+30.00%)"));
        assert!(report.contains("db.query.members: 100 -> 80 (-20.00%)"));
    }

    #[test]
    fn clean_run_reports_no_regressions() {
        let analysis = RegressionAnalysis {
            regressions: Vec::new(),
            improvements: Vec::new(),
            passed_threshold: true,
            ..sample_analysis()
        };

        let report = render_report(&analysis);
        assert!(report.contains("✅ PASSED"));
        assert!(report.contains("No regressions detected."));
        assert!(!report.contains("Improvements:"));
    }

    #[test]
    fn percent_change_has_two_decimals_and_sign() {
        let mut analysis = sample_analysis();
        analysis.regressions[0].percent_change = 12.3456;

        let report = render_report(&analysis);
        assert!(report.contains("(+12.35%)"));
    }
}
