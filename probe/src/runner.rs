//! The check battery.

use embed_probe_embeddings::{
    BYTES_PER_COMPONENT, Credential, EmbeddingError, EmbeddingProvider, EmbeddingRequest,
    EmbeddingResponse, EmbeddingVector, EncodingFormat, OpenAIProvider, decode_base64_embedding,
    known_dimension,
};
use tracing::{debug, info, warn};

use crate::check::{CheckKind, CheckResult};
use crate::config::{FailurePolicy, ProbeConfig};
use crate::error::{ProbeError, Result};
use crate::report::ProbeReport;

/// Input for the basic generation and dimension stability checks.
pub const BASIC_INPUT: &str = "This is a test sentence for OpenAI embeddings.";

/// Inputs for the multiple-inputs check.
pub const MULTI_INPUTS: [&str; 3] = [
    "This is the first test sentence.",
    "This is the second test sentence.",
    "This is the third test sentence.",
];

pub const DIMENSION_INPUT: &str = "Testing custom dimensions parameter.";

pub const INVALID_MODEL_INPUT: &str = "Testing error handling.";

/// Shared by both encoding-format checks.
pub const FORMAT_INPUT: &str = "Testing output formats.";

/// Outcome of a request that reached the server.
enum Reply {
    Success(EmbeddingResponse),
    Rejected(EmbeddingError),
}

/// Dimensions observed by earlier checks.
#[derive(Debug, Default)]
struct Observed {
    basic_dimension: Option<usize>,
    float_dimension: Option<usize>,
}

/// Runs the check battery against an embedding provider.
///
/// Checks run one after another; each waits for its response before the next
/// request is sent.
pub struct Probe<P> {
    provider: P,
    config: ProbeConfig,
}

impl Probe<OpenAIProvider> {
    /// Build a probe backed by the HTTP provider.
    ///
    /// Configuration problems surface here, before any request is sent.
    pub fn connect(credential: Credential, config: ProbeConfig) -> Result<Self> {
        let provider =
            OpenAIProvider::new(credential, &config.client).map_err(ProbeError::Config)?;
        Ok(Self::new(provider, config))
    }
}

impl<P: EmbeddingProvider> Probe<P> {
    pub fn new(provider: P, config: ProbeConfig) -> Self {
        Self { provider, config }
    }

    /// Run every enabled check and collect the results.
    ///
    /// Under [`FailurePolicy::FailFast`] a transport failure or a failed basic
    /// generation stops the run; the report keeps every result gathered so
    /// far and is marked aborted. Otherwise every check runs.
    pub async fn run(&self) -> ProbeReport {
        info!(
            "Probing {} with model {} via {}",
            self.config.client.endpoint,
            self.config.model,
            self.provider.name()
        );

        let mut report = ProbeReport::new(&self.config);
        let mut observed = Observed::default();

        for check in self.config.checks() {
            debug!("Running check {check}");

            let result = match self.run_check(check, &mut observed).await {
                Ok(result) => result,
                Err(err) => {
                    warn!("Check {check} hit a transport error: {err}");
                    let result = CheckResult::fail(check, err.to_string());
                    if self.config.policy == FailurePolicy::FailFast {
                        report.push(result);
                        report.aborted = true;
                        report.fatal = Some(check);
                        break;
                    }
                    result
                }
            };

            let abort = self.config.policy == FailurePolicy::FailFast
                && check == CheckKind::BasicGeneration
                && result.is_failure();

            report.push(result);

            if abort {
                warn!("Basic generation failed, stopping run");
                report.aborted = true;
                break;
            }
        }

        report
    }

    async fn run_check(
        &self,
        check: CheckKind,
        observed: &mut Observed,
    ) -> std::result::Result<CheckResult, EmbeddingError> {
        match check {
            CheckKind::BasicGeneration => self.basic_generation(observed).await,
            CheckKind::MultipleInputs => self.multiple_inputs().await,
            CheckKind::DimensionHint => self.dimension_hint().await,
            CheckKind::InvalidModel => self.invalid_model().await,
            CheckKind::FloatEncoding => self.float_encoding(observed).await,
            CheckKind::Base64Encoding => self.base64_encoding(observed).await,
            CheckKind::DimensionStability => self.dimension_stability(observed).await,
        }
    }

    fn request<I, S>(&self, model: &str, input: I) -> EmbeddingRequest
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = EmbeddingRequest::new(model, input);
        match &self.config.user {
            Some(user) => request.with_user(user.clone()),
            None => request,
        }
    }

    /// Send a request, passing transport failures up to the policy.
    async fn send(
        &self,
        request: &EmbeddingRequest,
    ) -> std::result::Result<Reply, EmbeddingError> {
        match self.provider.create_embeddings(request).await {
            Ok(response) => Ok(Reply::Success(response)),
            Err(err) if err.is_transport() => Err(err),
            Err(err) => Ok(Reply::Rejected(err)),
        }
    }

    async fn basic_generation(
        &self,
        observed: &mut Observed,
    ) -> std::result::Result<CheckResult, EmbeddingError> {
        let check = CheckKind::BasicGeneration;
        let request = self.request(&self.config.model, [BASIC_INPUT]);

        let response = match self.send(&request).await? {
            Reply::Success(response) => response,
            Reply::Rejected(err) => return Ok(CheckResult::fail(check, rejection_detail(&err))),
        };

        if response.data.len() != 1 {
            return Ok(CheckResult::fail(
                check,
                format!("expected 1 embedding, got {}", response.data.len()),
            ));
        }

        let dimension = match single_float_len(&response) {
            Ok(dimension) => dimension,
            Err(detail) => return Ok(CheckResult::fail(check, detail)),
        };
        observed.basic_dimension = Some(dimension);

        match known_dimension(&self.config.model) {
            Some(expected) if expected != dimension => {
                return Ok(CheckResult::fail(
                    check,
                    format!(
                        "expected {expected} dimensions for {}, got {dimension}",
                        self.config.model
                    ),
                ));
            }
            _ => {}
        }

        let usage = match response.usage {
            Some(usage) if usage.total_tokens == 0 => {
                return Ok(CheckResult::fail(check, "usage.total_tokens is 0"));
            }
            Some(usage) => format!(
                "{} prompt / {} total tokens",
                usage.prompt_tokens, usage.total_tokens
            ),
            None => "usage not reported".to_string(),
        };

        Ok(CheckResult::pass(
            check,
            format!(
                "model {}, 1 embedding, {dimension} dimensions, {usage}",
                response.model
            ),
        ))
    }

    async fn multiple_inputs(&self) -> std::result::Result<CheckResult, EmbeddingError> {
        let check = CheckKind::MultipleInputs;
        let request = self.request(&self.config.model, MULTI_INPUTS);
        let expected = MULTI_INPUTS.len();

        let response = match self.send(&request).await? {
            Reply::Success(response) => response,
            Reply::Rejected(err) => return Ok(CheckResult::fail(check, rejection_detail(&err))),
        };

        if response.data.len() != expected {
            return Ok(CheckResult::fail(
                check,
                format!("expected {expected} embeddings, got {}", response.data.len()),
            ));
        }

        let indices: Vec<u32> = response.data.iter().map(|d| d.index).collect();
        let in_order = indices
            .iter()
            .enumerate()
            .all(|(position, index)| *index as usize == position);
        if !in_order {
            return Ok(CheckResult::fail(
                check,
                format!("index values {indices:?} do not follow input order"),
            ));
        }

        let lengths: Vec<Option<usize>> =
            response.data.iter().map(|d| d.embedding.float_len()).collect();
        if lengths.iter().any(|len| matches!(len, None | Some(0))) {
            return Ok(CheckResult::fail(
                check,
                "every entry must carry a non-empty float array",
            ));
        }
        if lengths.windows(2).any(|pair| pair[0] != pair[1]) {
            return Ok(CheckResult::fail(
                check,
                format!("entries have different lengths: {lengths:?}"),
            ));
        }

        Ok(CheckResult::pass(
            check,
            format!("{expected} embeddings, indices 0..{} in input order", expected - 1),
        ))
    }

    async fn dimension_hint(&self) -> std::result::Result<CheckResult, EmbeddingError> {
        let check = CheckKind::DimensionHint;
        let requested = self.config.dimension_hint;
        let request = self
            .request(&self.config.model, [DIMENSION_INPUT])
            .with_dimensions(requested);

        let response = match self.send(&request).await? {
            Reply::Success(response) => response,
            Reply::Rejected(err) => return Ok(CheckResult::fail(check, rejection_detail(&err))),
        };

        let actual = match single_float_len(&response) {
            Ok(actual) => actual,
            Err(detail) => return Ok(CheckResult::fail(check, detail)),
        };

        if actual == requested as usize {
            Ok(CheckResult::pass(
                check,
                format!("requested {requested} dimensions, got {actual}"),
            ))
        } else {
            Ok(CheckResult::note(
                check,
                format!(
                    "requested {requested} dimensions, got {actual}; the model may not support reduced dimensions"
                ),
            ))
        }
    }

    async fn invalid_model(&self) -> std::result::Result<CheckResult, EmbeddingError> {
        let check = CheckKind::InvalidModel;
        let model = &self.config.invalid_model;
        let request = self.request(model, [INVALID_MODEL_INPUT]);

        match self.send(&request).await? {
            Reply::Success(_) => Ok(CheckResult::fail(
                check,
                format!("expected an error for model `{model}`, got HTTP 200"),
            )),
            Reply::Rejected(EmbeddingError::Api {
                status,
                error: Some(body),
                ..
            }) if body.error.is_complete() => Ok(CheckResult::pass(
                check,
                format!(
                    "HTTP {status} ({}), {}: {}",
                    body.error.kind(),
                    body.error.r#type,
                    body.error.message
                ),
            )),
            Reply::Rejected(EmbeddingError::Api { status, .. }) => Ok(CheckResult::fail(
                check,
                format!("HTTP {status} without error.type and error.message"),
            )),
            Reply::Rejected(err) => Ok(CheckResult::fail(check, rejection_detail(&err))),
        }
    }

    /// Any JSON number counts as a component, integers included; only a
    /// string payload or an empty array fails.
    async fn float_encoding(
        &self,
        observed: &mut Observed,
    ) -> std::result::Result<CheckResult, EmbeddingError> {
        let check = CheckKind::FloatEncoding;
        let request = self
            .request(&self.config.model, [FORMAT_INPUT])
            .with_encoding_format(EncodingFormat::Float);

        let response = match self.send(&request).await? {
            Reply::Success(response) => response,
            Reply::Rejected(err) => return Ok(CheckResult::fail(check, rejection_detail(&err))),
        };

        let values = match response.first().map(|d| &d.embedding) {
            Some(EmbeddingVector::Float(values)) if !values.is_empty() => values,
            Some(EmbeddingVector::Float(_)) => {
                return Ok(CheckResult::fail(check, "embedding is empty"));
            }
            Some(other) => {
                return Ok(CheckResult::fail(
                    check,
                    format!("expected a float array, got a {}", other.kind()),
                ));
            }
            None => return Ok(CheckResult::fail(check, "response contains no embeddings")),
        };

        observed.float_dimension = Some(values.len());
        let preview: Vec<f32> = values.iter().take(5).copied().collect();

        Ok(CheckResult::pass(
            check,
            format!("{} float values, first {preview:?}", values.len()),
        ))
    }

    async fn base64_encoding(
        &self,
        observed: &Observed,
    ) -> std::result::Result<CheckResult, EmbeddingError> {
        let check = CheckKind::Base64Encoding;
        let request = self
            .request(&self.config.model, [FORMAT_INPUT])
            .with_encoding_format(EncodingFormat::Base64);

        let response = match self.send(&request).await? {
            Reply::Success(response) => response,
            Reply::Rejected(err @ EmbeddingError::Api { .. }) => {
                return Ok(CheckResult::note(
                    check,
                    format!("base64 format not supported here: {err}"),
                ));
            }
            Reply::Rejected(err) => return Ok(CheckResult::fail(check, rejection_detail(&err))),
        };

        let encoded = match response.first().map(|d| &d.embedding) {
            Some(EmbeddingVector::Base64(encoded)) => encoded,
            Some(EmbeddingVector::Float(_)) => {
                return Ok(CheckResult::note(
                    check,
                    "server returned a float array and ignored the base64 format",
                ));
            }
            None => return Ok(CheckResult::fail(check, "response contains no embeddings")),
        };

        let components = match decode_base64_embedding(encoded) {
            Ok(values) => values.len(),
            Err(err) => return Ok(CheckResult::fail(check, err.to_string())),
        };
        if components == 0 {
            return Ok(CheckResult::fail(check, "decoded an empty embedding"));
        }

        let bytes = components * BYTES_PER_COMPONENT;
        match observed.float_dimension.or(observed.basic_dimension) {
            Some(dimension) if dimension != components => Ok(CheckResult::fail(
                check,
                format!(
                    "decoded {bytes} bytes, expected {} for {dimension} dimensions",
                    dimension * BYTES_PER_COMPONENT
                ),
            )),
            _ => Ok(CheckResult::pass(
                check,
                format!("decoded {bytes} bytes ({components} f32 values)"),
            )),
        }
    }

    async fn dimension_stability(
        &self,
        observed: &Observed,
    ) -> std::result::Result<CheckResult, EmbeddingError> {
        let check = CheckKind::DimensionStability;
        let Some(expected) = observed.basic_dimension else {
            return Ok(CheckResult::skip(
                check,
                "basic_generation produced no dimension to compare",
            ));
        };

        let request = self.request(&self.config.model, [BASIC_INPUT]);
        let response = match self.send(&request).await? {
            Reply::Success(response) => response,
            Reply::Rejected(err) => return Ok(CheckResult::fail(check, rejection_detail(&err))),
        };

        match single_float_len(&response) {
            Ok(actual) if actual == expected => Ok(CheckResult::pass(
                check,
                format!("repeat request returned {actual} dimensions"),
            )),
            Ok(actual) => Ok(CheckResult::fail(
                check,
                format!("first request returned {expected} dimensions, repeat returned {actual}"),
            )),
            Err(detail) => Ok(CheckResult::fail(check, detail)),
        }
    }
}

/// Failure detail for a rejected request, tagged with the error class when
/// the server sent a structured body.
fn rejection_detail(err: &EmbeddingError) -> String {
    match err {
        EmbeddingError::Api { error: Some(body), .. } => format!("{err} [{}]", body.error.kind()),
        _ => err.to_string(),
    }
}

/// Length of the first entry's float vector.
fn single_float_len(response: &EmbeddingResponse) -> std::result::Result<usize, String> {
    match response.first().map(|d| &d.embedding) {
        Some(EmbeddingVector::Float(values)) if values.is_empty() => {
            Err("embedding is empty".to_string())
        }
        Some(EmbeddingVector::Float(values)) => Ok(values.len()),
        Some(other) => Err(format!("expected a float array, got a {}", other.kind())),
        None => Err("response contains no embeddings".to_string()),
    }
}
