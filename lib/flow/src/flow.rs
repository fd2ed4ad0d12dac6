//! The prompt flow primitive.
//!
//! A [`PromptFlow`] binds a name, a typed input, a typed output, a pure
//! rendering function and an output mapping to a generation client. The
//! [`Flow`] trait erases the input and output types so flows of different
//! shapes can live in one registry and be driven with JSON.

use crate::error::{FlowError, ValidationError};
use async_trait::async_trait;
use promptflow_ai::{GenerateRequest, GenerateResponse, GenerationClient};
use promptflow_core::{FlowInvocationId, Result};
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Input accepted by a flow.
pub trait FlowInput: DeserializeOwned + JsonSchema + Send + Sync + 'static {
    /// Checks the input before any prompt is rendered.
    ///
    /// # Errors
    ///
    /// Returns the first field that is unacceptable.
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        Ok(())
    }
}

/// Output produced by a flow.
pub trait FlowOutput: Serialize + JsonSchema + Send + Sync + 'static {}

impl<T> FlowOutput for T where T: Serialize + JsonSchema + Send + Sync + 'static {}

/// Public description of a registered flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowDescriptor {
    /// Unique flow name; also the HTTP route.
    pub name: String,
    /// Human readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema of the input.
    pub input_schema: JsonValue,
    /// JSON Schema of the output.
    pub output_schema: JsonValue,
}

/// A flow whose input and output travel as JSON.
#[async_trait]
pub trait Flow: Send + Sync {
    /// Returns the flow name.
    fn name(&self) -> &str;

    /// Describes the flow and its schemas.
    fn descriptor(&self) -> FlowDescriptor;

    /// Decodes `input`, runs the flow and encodes its output.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::InvalidInput` if `input` does not decode, and any
    /// error the underlying run produces.
    async fn run_json(
        &self,
        input: JsonValue,
        cancel: CancellationToken,
    ) -> Result<JsonValue, FlowError>;
}

type RenderFn<I> = Arc<dyn Fn(&I) -> String + Send + Sync>;
type OutputFn<O> = Arc<dyn Fn(String) -> O + Send + Sync>;

/// A named, typed prompt flow.
///
/// Immutable once built; clones share the client and functions.
pub struct PromptFlow<I, O> {
    name: String,
    description: Option<String>,
    client: Arc<dyn GenerationClient>,
    render: RenderFn<I>,
    output: OutputFn<O>,
    timeout: Option<Duration>,
}

impl<I, O> PromptFlow<I, O>
where
    I: FlowInput,
    O: FlowOutput,
{
    /// Creates a flow.
    ///
    /// `render` turns input into the prompt; `output` turns generated text
    /// into the output type.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        client: Arc<dyn GenerationClient>,
        render: impl Fn(&I) -> String + Send + Sync + 'static,
        output: impl Fn(String) -> O + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            client,
            render: Arc::new(render),
            output: Arc::new(output),
            timeout: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Bounds every generation call made by this flow.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the flow name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renders the prompt for `input` without calling the backend.
    #[must_use]
    pub fn render(&self, input: &I) -> String {
        (self.render)(input)
    }

    /// Runs the flow.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput`, `Generation` or `Timeout`.
    pub async fn run(&self, input: I) -> Result<O, FlowError> {
        self.run_with_cancel(input, &CancellationToken::new()).await
    }

    /// Runs the flow, giving up as soon as `cancel` fires.
    ///
    /// Cancelling drops the in-flight generation call.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput`, `Generation`, `Timeout` or `Cancelled`.
    #[instrument(
        skip_all,
        fields(flow = %self.name, invocation_id = %FlowInvocationId::new())
    )]
    pub async fn run_with_cancel(
        &self,
        input: I,
        cancel: &CancellationToken,
    ) -> Result<O, FlowError> {
        if let Err(e) = input.validate() {
            debug!(error = %e, "Rejected flow input");
            return Err(FlowError::InvalidInput {
                flow: self.name.clone(),
                reason: e.to_string(),
            }
            .into());
        }

        let request = GenerateRequest::new(self.render(&input));
        let started = Instant::now();

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                warn!("Flow run cancelled");
                return Err(FlowError::Cancelled {
                    flow: self.name.clone(),
                }
                .into());
            }
            result = self.generate(&request) => result?,
        };

        debug!(
            generation_id = %response.id,
            model = %response.model,
            latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Flow run completed"
        );

        Ok((self.output)(response.text))
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, FlowError> {
        let call = self.client.generate(request);
        let result = match self.timeout {
            Some(after) => tokio::time::timeout(after, call).await.map_err(|_| {
                warn!(
                    timeout_ms = u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
                    "Generation timed out"
                );
                FlowError::Timeout {
                    flow: self.name.clone(),
                    after,
                }
            })?,
            None => call.await,
        };

        match result {
            Ok(response) => Ok(response),
            Err(source) => {
                warn!(error = %source, "Generation failed");
                Err(FlowError::Generation {
                    flow: self.name.clone(),
                    source,
                }
                .into())
            }
        }
    }
}

#[async_trait]
impl<I, O> Flow for PromptFlow<I, O>
where
    I: FlowInput,
    O: FlowOutput,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn descriptor(&self) -> FlowDescriptor {
        FlowDescriptor {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: serde_json::to_value(schemars::schema_for!(I)).unwrap_or_default(),
            output_schema: serde_json::to_value(schemars::schema_for!(O)).unwrap_or_default(),
        }
    }

    async fn run_json(
        &self,
        input: JsonValue,
        cancel: CancellationToken,
    ) -> Result<JsonValue, FlowError> {
        let input: I = serde_json::from_value(input).map_err(|e| FlowError::InvalidInput {
            flow: self.name.clone(),
            reason: e.to_string(),
        })?;

        let output = self.run_with_cancel(input, &cancel).await?;

        serde_json::to_value(output).map_err(|e| {
            FlowError::OutputEncoding {
                flow: self.name.clone(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

impl<I, O> Clone for PromptFlow<I, O> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            client: Arc::clone(&self.client),
            render: Arc::clone(&self.render),
            output: Arc::clone(&self.output),
            timeout: self.timeout,
        }
    }
}

impl<I, O> fmt::Debug for PromptFlow<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptFlow")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("model", &self.client.model())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
