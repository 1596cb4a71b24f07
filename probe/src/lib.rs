//! # Embeddings Probe
//!
//! A smoke-test battery for OpenAI-compatible embeddings endpoints. Each check
//! sends one request, validates the shape of the response and records a
//! [`CheckResult`]; the collected [`ProbeReport`] decides the exit status.
//!
//! ## Checks
//!
//! - **basic_generation**: one input, one non-empty vector
//! - **multiple_inputs**: three inputs, indices in input order
//! - **dimension_hint**: reduced dimensions (a mismatch is only a note)
//! - **invalid_model**: a bogus model must be rejected with a structured error
//! - **float_encoding** / **base64_encoding**: both wire formats
//! - **dimension_stability**: a repeated request keeps its length
//!
//! ## Usage
//!
//! ```rust,ignore
//! use embed_probe::{Probe, ProbeConfig};
//! use embed_probe_embeddings::Credential;
//!
//! let probe = Probe::connect(Credential::new(api_key)?, ProbeConfig::default())?;
//! let report = probe.run().await;
//! print!("{}", report.render_text());
//! ```

pub mod check;
pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod runner;

pub use check::{CheckKind, CheckOutcome, CheckResult};
pub use config::{DEFAULT_DIMENSION_HINT, DEFAULT_INVALID_MODEL, FailurePolicy, ProbeConfig};
pub use error::{ProbeError, Result};
pub use report::{EXIT_CHECK_FAILED, EXIT_FATAL, EXIT_SUCCESS, ProbeReport, Summary};
pub use runner::Probe;
