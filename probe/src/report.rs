//! Probe reports and their rendering.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::check::{CheckKind, CheckOutcome, CheckResult};
use crate::config::{FailurePolicy, ProbeConfig};
use crate::error::Result;

/// Exit status when every executed check passed.
pub const EXIT_SUCCESS: u8 = 0;

/// Exit status when a check failed or the run was aborted.
pub const EXIT_CHECK_FAILED: u8 = 1;

/// Exit status for configuration errors and transport failures that ended a
/// fail-fast run.
pub const EXIT_FATAL: u8 = 2;

/// Results of one probe run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub endpoint: String,
    pub model: String,
    pub policy: FailurePolicy,

    /// Results in execution order.
    pub results: Vec<CheckResult>,

    /// Set when a fail-fast run stopped before the battery finished.
    pub aborted: bool,

    /// Check whose transport failure ended a fail-fast run.
    pub fatal: Option<CheckKind>,
}

/// Outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub passed: usize,
    pub notes: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl ProbeReport {
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            endpoint: config.client.endpoint.clone(),
            model: config.model.clone(),
            policy: config.policy,
            results: Vec::new(),
            aborted: false,
            fatal: None,
        }
    }

    pub fn push(&mut self, result: CheckResult) {
        self.results.push(result);
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for result in &self.results {
            match result.outcome {
                CheckOutcome::Pass => summary.passed += 1,
                CheckOutcome::Note => summary.notes += 1,
                CheckOutcome::Fail => summary.failed += 1,
                CheckOutcome::Skip => summary.skipped += 1,
            }
        }
        summary
    }

    /// No check failed and the run was not cut short.
    pub fn is_success(&self) -> bool {
        !self.aborted && !self.results.iter().any(CheckResult::is_failure)
    }

    pub fn exit_code(&self) -> u8 {
        if self.fatal.is_some() {
            EXIT_FATAL
        } else if self.is_success() {
            EXIT_SUCCESS
        } else {
            EXIT_CHECK_FAILED
        }
    }

    /// Plain-text table, one line per check plus a summary line.
    pub fn render_text(&self) -> String {
        let width = self
            .results
            .iter()
            .map(|r| r.check.name().len())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        let _ = writeln!(out, "Embeddings probe: {} (model {})", self.endpoint, self.model);
        for result in &self.results {
            let _ = writeln!(
                out,
                "[{}] {:<width$}  {}",
                result.outcome.label(),
                result.check.name(),
                result.detail
            );
        }

        let summary = self.summary();
        let _ = write!(
            out,
            "{} checks: {} passed, {} notes, {} failed, {} skipped",
            self.results.len(),
            summary.passed,
            summary.notes,
            summary.failed,
            summary.skipped
        );
        match self.fatal {
            Some(check) => {
                let _ = write!(out, " (aborted after a transport error in {check})");
            }
            None if self.aborted => out.push_str(" (aborted after basic_generation failed)"),
            None => {}
        }
        out.push('\n');
        out
    }

    pub fn render_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn report(results: Vec<CheckResult>) -> ProbeReport {
        let mut report = ProbeReport::new(&ProbeConfig::new("http://localhost:9000"));
        for result in results {
            report.push(result);
        }
        report
    }

    #[test]
    fn test_notes_and_skips_do_not_fail_the_run() {
        let report = report(vec![
            CheckResult::pass(CheckKind::BasicGeneration, "ok"),
            CheckResult::note(CheckKind::DimensionHint, "hint ignored"),
            CheckResult::skip(CheckKind::DimensionStability, "no baseline"),
        ]);

        assert!(report.is_success());
        assert_eq!(report.exit_code(), EXIT_SUCCESS);
        assert_eq!(
            report.summary(),
            Summary {
                passed: 1,
                notes: 1,
                failed: 0,
                skipped: 1,
            }
        );
    }

    #[test]
    fn test_failure_sets_exit_code() {
        let report = report(vec![
            CheckResult::pass(CheckKind::BasicGeneration, "ok"),
            CheckResult::fail(CheckKind::InvalidModel, "got HTTP 200"),
        ]);
        assert_eq!(report.exit_code(), EXIT_CHECK_FAILED);
    }

    #[test]
    fn test_aborted_run_is_failure() {
        let mut report = report(vec![]);
        report.aborted = true;
        assert!(!report.is_success());
    }

    #[test]
    fn test_transport_abort_is_fatal() {
        let mut report = report(vec![
            CheckResult::pass(CheckKind::BasicGeneration, "1536 dimensions"),
            CheckResult::fail(CheckKind::MultipleInputs, "transport error: timed out"),
        ]);
        report.aborted = true;
        report.fatal = Some(CheckKind::MultipleInputs);

        assert_eq!(report.exit_code(), EXIT_FATAL);
        assert!(
            report
                .render_text()
                .ends_with("2 checks: 1 passed, 0 notes, 1 failed, 0 skipped (aborted after a transport error in multiple_inputs)\n")
        );
    }

    #[test]
    fn test_render_text() {
        let report = report(vec![
            CheckResult::pass(CheckKind::BasicGeneration, "1536 dimensions"),
            CheckResult::fail(CheckKind::InvalidModel, "got HTTP 200"),
        ]);

        assert_eq!(
            report.render_text(),
            "Embeddings probe: http://localhost:9000 (model text-embedding-3-small)\n\
             [PASS] basic_generation  1536 dimensions\n\
             [FAIL] invalid_model     got HTTP 200\n\
             2 checks: 1 passed, 0 notes, 1 failed, 0 skipped\n"
        );
    }

    #[test]
    fn test_render_json() {
        let report = report(vec![CheckResult::pass(CheckKind::FloatEncoding, "ok")]);
        let json: serde_json::Value = serde_json::from_str(&report.render_json().unwrap()).unwrap();

        assert_eq!(json["policy"], "isolate_and_continue");
        assert_eq!(json["results"][0]["name"], "float_encoding");
        assert_eq!(json["aborted"], false);
        assert_eq!(json["fatal"], serde_json::Value::Null);
    }
}
