//! Configuration for a probe run.

use std::time::Duration;

use embed_probe_embeddings::{ClientConfig, DEFAULT_MODEL};
use serde::{Deserialize, Serialize};

use crate::check::CheckKind;

/// Model identifier the negative check expects the server to reject.
pub const DEFAULT_INVALID_MODEL: &str = "non-existent-model";

/// Dimension requested by the dimension-hint check.
pub const DEFAULT_DIMENSION_HINT: u32 = 256;

/// What to do when a check cannot complete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Transport errors end the run, and so does a failed basic generation.
    FailFast,

    /// Every selected check runs; failures are recorded and the run goes on.
    #[default]
    #[value(name = "isolate", alias = "isolate-and-continue")]
    IsolateAndContinue,
}

/// Configuration for a probe run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// HTTP connection settings.
    pub client: ClientConfig,

    /// Model used by every check except the negative one.
    pub model: String,

    /// Model identifier expected to be rejected.
    pub invalid_model: String,

    /// Dimension requested by the dimension-hint check.
    pub dimension_hint: u32,

    /// End-user identifier sent with each request.
    pub user: Option<String>,

    pub policy: FailurePolicy,

    /// Checks removed from the battery.
    pub skip: Vec<CheckKind>,
}

impl ProbeConfig {
    /// Create a configuration with default values for the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: ClientConfig::default().with_endpoint(endpoint),
            ..Self::default()
        }
    }

    /// Set the model to probe.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_invalid_model(mut self, model: impl Into<String>) -> Self {
        self.invalid_model = model.into();
        self
    }

    /// Set the dimension hint.
    pub fn with_dimension_hint(mut self, dimensions: u32) -> Self {
        self.dimension_hint = dimensions;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the failure policy.
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.with_timeout(timeout);
        self
    }

    /// Set the organization header.
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.client = self.client.with_organization(organization);
        self
    }

    /// Remove a check from the battery.
    pub fn skip(mut self, check: CheckKind) -> Self {
        if !self.skip.contains(&check) {
            self.skip.push(check);
        }
        self
    }

    /// Whether a check is part of the battery.
    pub fn is_enabled(&self, check: CheckKind) -> bool {
        !self.skip.contains(&check)
    }

    /// Enabled checks in execution order.
    pub fn checks(&self) -> impl Iterator<Item = CheckKind> + '_ {
        CheckKind::ALL
            .into_iter()
            .filter(|check| self.is_enabled(*check))
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            model: DEFAULT_MODEL.to_string(),
            invalid_model: DEFAULT_INVALID_MODEL.to_string(),
            dimension_hint: DEFAULT_DIMENSION_HINT,
            user: None,
            policy: FailurePolicy::default(),
            skip: Vec::new(),
        }
    }
}
