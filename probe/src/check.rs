//! Check identities and results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The checks in the battery, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum CheckKind {
    /// One input, configured model.
    BasicGeneration,
    /// Three inputs in one request.
    MultipleInputs,
    /// Reduced dimension request.
    DimensionHint,
    /// Non-existent model must be rejected.
    InvalidModel,
    /// `encoding_format = "float"`.
    FloatEncoding,
    /// `encoding_format = "base64"`.
    Base64Encoding,
    /// Repeat of the basic request must keep its length.
    DimensionStability,
}

impl CheckKind {
    /// Every check, in the order the probe runs them.
    pub const ALL: [CheckKind; 7] = [
        Self::BasicGeneration,
        Self::MultipleInputs,
        Self::DimensionHint,
        Self::InvalidModel,
        Self::FloatEncoding,
        Self::Base64Encoding,
        Self::DimensionStability,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::BasicGeneration => "basic_generation",
            Self::MultipleInputs => "multiple_inputs",
            Self::DimensionHint => "dimension_hint",
            Self::InvalidModel => "invalid_model",
            Self::FloatEncoding => "float_encoding",
            Self::Base64Encoding => "base64_encoding",
            Self::DimensionStability => "dimension_stability",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a check ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    Pass,
    /// Passed with an informational remark (ignored hint, unsupported format).
    Note,
    Fail,
    /// Not run because a prerequisite produced no data.
    Skip,
}

impl CheckOutcome {
    /// Four-letter label used by the text report.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Note => "NOTE",
            Self::Fail => "FAIL",
            Self::Skip => "SKIP",
        }
    }
}

/// Result of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    #[serde(rename = "name")]
    pub check: CheckKind,

    /// True for `Pass` and `Note`.
    pub passed: bool,

    pub outcome: CheckOutcome,

    /// Human-readable explanation.
    pub detail: String,
}

impl CheckResult {
    fn new(check: CheckKind, outcome: CheckOutcome, detail: impl Into<String>) -> Self {
        Self {
            check,
            passed: matches!(outcome, CheckOutcome::Pass | CheckOutcome::Note),
            outcome,
            detail: detail.into(),
        }
    }

    pub fn pass(check: CheckKind, detail: impl Into<String>) -> Self {
        Self::new(check, CheckOutcome::Pass, detail)
    }

    pub fn note(check: CheckKind, detail: impl Into<String>) -> Self {
        Self::new(check, CheckOutcome::Note, detail)
    }

    pub fn fail(check: CheckKind, detail: impl Into<String>) -> Self {
        Self::new(check, CheckOutcome::Fail, detail)
    }

    pub fn skip(check: CheckKind, detail: impl Into<String>) -> Self {
        Self::new(check, CheckOutcome::Skip, detail)
    }

    pub fn is_failure(&self) -> bool {
        self.outcome == CheckOutcome::Fail
    }
}
