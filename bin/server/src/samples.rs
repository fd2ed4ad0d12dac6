//! Sample runs performed before the server starts listening.
//!
//! Sends a few one-shot prompts straight to the backend, then drives the
//! registered greeting and joke flows with fixed inputs. Each outcome is logged
//! as soon as it is known; failures do not stop the remaining samples.

use promptflow_ai::{GenerateRequest, GenerationClient};
use promptflow_flow::FlowRegistry;
use promptflow_flow::catalog::{
    GREETING_FLOW, GreetingInput, GreetingOutput, JOKE_FLOW, JokeInput, JokeOutput,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

/// One-shot prompts sent without a flow.
pub const DIRECT_PROMPTS: [(&str, &str); 3] = [
    (
        "Welcome Message",
        "Write a short welcome message for a new team member joining our development team.",
    ),
    (
        "Task List",
        "Create a simple 3-item todo list for setting up a new development environment.",
    ),
    (
        "Explanation",
        "Explain what the Rust programming language is in 2-3 simple sentences.",
    ),
];

/// Result of one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleOutcome {
    /// What was sampled.
    pub label: String,
    /// Generated text, or the error message.
    pub result: Result<String, String>,
}

impl SampleOutcome {
    fn logged(label: impl Into<String>, result: Result<String, String>) -> Self {
        let outcome = Self {
            label: label.into(),
            result,
        };
        match &outcome.result {
            Ok(text) => tracing::info!(sample = %outcome.label, output = %text, "Sample completed"),
            Err(e) => tracing::warn!(sample = %outcome.label, error = %e, "Sample failed"),
        }
        outcome
    }
}

/// Sends every entry of [`DIRECT_PROMPTS`] to `client`.
pub async fn run_direct_prompts(client: &dyn GenerationClient) -> Vec<SampleOutcome> {
    let mut outcomes = Vec::with_capacity(DIRECT_PROMPTS.len());
    for (label, prompt) in DIRECT_PROMPTS {
        let result = client
            .generate(&GenerateRequest::new(prompt))
            .await
            .map(|response| response.text)
            .map_err(|e| e.to_string());
        outcomes.push(SampleOutcome::logged(label, result));
    }
    outcomes
}

/// Runs the registered greeting and joke flows with fixed inputs.
pub async fn run_sample_flows(registry: &FlowRegistry) -> Vec<SampleOutcome> {
    let mut outcomes = Vec::new();

    let result = run_registered::<_, GreetingOutput>(
        registry,
        GREETING_FLOW,
        GreetingInput::new("Alice", "english"),
    )
    .await
    .map(|output| output.greeting);
    outcomes.push(SampleOutcome::logged("Greeting Flow", result));

    let result =
        run_registered::<_, JokeOutput>(registry, JOKE_FLOW, JokeInput::new("programming"))
            .await
            .map(|output| output.joke);
    outcomes.push(SampleOutcome::logged("Joke Flow", result));

    for (name, language) in [("Bob", "spanish"), ("Claire", "french")] {
        let result = run_registered::<_, GreetingOutput>(
            registry,
            GREETING_FLOW,
            GreetingInput::new(name, language),
        )
        .await
        .map(|output| output.greeting);
        outcomes.push(SampleOutcome::logged(format!("{name} ({language})"), result));
    }

    outcomes
}

/// Runs `flow_name` from `registry` through its JSON entry point.
async fn run_registered<I, O>(
    registry: &FlowRegistry,
    flow_name: &str,
    input: I,
) -> Result<O, String>
where
    I: Serialize,
    O: DeserializeOwned,
{
    let flow = registry.get(flow_name).map_err(|report| report.to_string())?;
    let input = serde_json::to_value(input).map_err(|e| e.to_string())?;
    let output = flow
        .run_json(input, CancellationToken::new())
        .await
        .map_err(|report| report.to_string())?;
    serde_json::from_value(output).map_err(|e| e.to_string())
}
