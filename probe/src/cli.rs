//! Command-line surface for the `embed-probe` binary.

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use embed_probe_embeddings::{API_KEY_ENV, Credential, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use tracing_subscriber::EnvFilter;

use crate::check::CheckKind;
use crate::config::{DEFAULT_DIMENSION_HINT, DEFAULT_INVALID_MODEL, FailurePolicy, ProbeConfig};
use crate::report::ProbeReport;
use crate::runner::Probe;

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Smoke-test an OpenAI-compatible embeddings endpoint.
#[derive(Debug, Parser)]
#[command(name = "embed-probe", version, about)]
pub struct Cli {
    /// Base URL of the API; `/v1/embeddings` is appended.
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Bearer token.
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Value for the `OpenAI-Organization` header.
    #[arg(long, env = "OPENAI_ORGANIZATION")]
    pub organization: Option<String>,

    /// Model used by every check except the negative one.
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Model the server is expected to reject.
    #[arg(long, default_value = DEFAULT_INVALID_MODEL)]
    pub invalid_model: String,

    /// Dimension requested by the dimension-hint check.
    #[arg(long, default_value_t = DEFAULT_DIMENSION_HINT)]
    pub dimensions: u32,

    /// End-user identifier sent with each request.
    #[arg(long)]
    pub user: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// What to do when a check cannot complete.
    #[arg(long, value_enum, default_value_t = FailurePolicy::IsolateAndContinue)]
    pub policy: FailurePolicy,

    /// Remove a check from the battery (repeatable).
    #[arg(long = "skip", value_enum)]
    pub skip: Vec<CheckKind>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log request details to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Build the probe configuration from the parsed arguments.
    pub fn probe_config(&self) -> ProbeConfig {
        let mut config = ProbeConfig::new(&self.endpoint)
            .with_model(&self.model)
            .with_invalid_model(&self.invalid_model)
            .with_dimension_hint(self.dimensions)
            .with_policy(self.policy)
            .with_timeout(Duration::from_secs(self.timeout_secs));

        if let Some(organization) = &self.organization {
            config = config.with_organization(organization);
        }
        if let Some(user) = &self.user {
            config = config.with_user(user);
        }
        for check in &self.skip {
            config = config.skip(*check);
        }
        config
    }

    pub fn credential(&self) -> anyhow::Result<Credential> {
        Credential::new(self.api_key.clone().unwrap_or_default())
            .with_context(|| format!("set {API_KEY_ENV} or pass --api-key"))
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the probe and print the report to stdout.
pub async fn execute(cli: Cli) -> anyhow::Result<ProbeReport> {
    let credential = cli.credential()?;
    let probe = Probe::connect(credential, cli.probe_config())?;
    let report = probe.run().await;

    match cli.format {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => println!("{}", report.render_json()?),
    }

    Ok(report)
}
