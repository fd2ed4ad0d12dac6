//! The flows served by default: a greeting generator and a joke generator.

use crate::error::{RegistryError, ValidationError};
use crate::flow::{FlowInput, PromptFlow};
use crate::registry::FlowRegistry;
use promptflow_ai::GenerationClient;
use promptflow_core::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Route name of the greeting flow.
pub const GREETING_FLOW: &str = "greeting";

/// Route name of the joke flow.
pub const JOKE_FLOW: &str = "jokeGenerator";

/// Input for greeting generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GreetingInput {
    /// The person's name.
    pub name: String,
    /// Language for greeting (english, spanish, french).
    pub language: String,
}

impl GreetingInput {
    /// Creates a greeting input.
    #[must_use]
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
        }
    }
}

impl FlowInput for GreetingInput {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        ValidationError::require_non_blank("name", &self.name)?;
        ValidationError::require_non_blank("language", &self.language)
    }
}

/// The generated greeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GreetingOutput {
    /// The generated greeting.
    pub greeting: String,
}

/// Input for joke generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct JokeInput {
    /// The topic for the joke.
    pub topic: String,
}

impl JokeInput {
    /// Creates a joke input.
    #[must_use]
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
        }
    }
}

impl FlowInput for JokeInput {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        ValidationError::require_non_blank("topic", &self.topic)
    }
}

/// The generated joke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct JokeOutput {
    /// The generated joke.
    pub joke: String,
}

/// Renders the greeting prompt.
#[must_use]
pub fn greeting_prompt(input: &GreetingInput) -> String {
    format!(
        "Create a friendly greeting for {} in {}. Keep it warm and welcoming.",
        input.name, input.language
    )
}

/// Renders the joke prompt.
#[must_use]
pub fn joke_prompt(input: &JokeInput) -> String {
    format!(
        "Create a clean, family-friendly joke about {}. Keep it short and funny.",
        input.topic
    )
}

/// Builds the greeting flow.
#[must_use]
pub fn greeting_flow(
    client: Arc<dyn GenerationClient>,
) -> PromptFlow<GreetingInput, GreetingOutput> {
    PromptFlow::new(GREETING_FLOW, client, greeting_prompt, |greeting| {
        GreetingOutput { greeting }
    })
    .with_description("Creates a friendly greeting for a person in a given language")
}

/// Builds the joke flow.
#[must_use]
pub fn joke_flow(client: Arc<dyn GenerationClient>) -> PromptFlow<JokeInput, JokeOutput> {
    PromptFlow::new(JOKE_FLOW, client, joke_prompt, |joke| JokeOutput { joke })
        .with_description("Creates a short, family-friendly joke about a topic")
}

/// Builds a registry holding the greeting and joke flows.
///
/// # Errors
///
/// Returns `DuplicateName` only if the built-in names collide.
pub fn default_registry(
    client: Arc<dyn GenerationClient>,
    timeout: Duration,
) -> Result<FlowRegistry, RegistryError> {
    let mut registry = FlowRegistry::new();
    registry.register(greeting_flow(Arc::clone(&client)).with_timeout(timeout))?;
    registry.register(joke_flow(client).with_timeout(timeout))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlowError;
    use promptflow_ai::{EchoClient, GenerationError, MockClient};
    use tokio_util::sync::CancellationToken;

    #[test]
    fn greeting_prompt_mentions_name_and_language() {
        assert_eq!(
            greeting_prompt(&GreetingInput::new("Alice", "english")),
            "Create a friendly greeting for Alice in english. Keep it warm and welcoming."
        );
    }

    #[test]
    fn joke_prompt_mentions_topic() {
        assert_eq!(
            joke_prompt(&JokeInput::new("programming")),
            "Create a clean, family-friendly joke about programming. Keep it short and funny."
        );
    }

    #[tokio::test]
    async fn greeting_flow_returns_generated_text() {
        let flow = greeting_flow(Arc::new(MockClient::succeeding("Hello Alice!")));

        let output = flow.run(GreetingInput::new("Alice", "english")).await.unwrap();

        assert_eq!(output.greeting, "Hello Alice!");
    }

    #[tokio::test]
    async fn joke_flow_returns_generated_text() {
        let flow = joke_flow(Arc::new(EchoClient));

        let output = flow.run(JokeInput::new("compilers")).await.unwrap();

        assert!(output.joke.contains("compilers"));
    }

    #[tokio::test]
    async fn greeting_requires_language() {
        let flow = greeting_flow(Arc::new(MockClient::succeeding("unused")));

        let report = flow.run(GreetingInput::new("Bob", "")).await.unwrap_err();

        assert!(matches!(
            report.current_context(),
            FlowError::InvalidInput { reason, .. } if reason.contains("language")
        ));
    }

    #[tokio::test]
    async fn failing_backend_never_yields_output() {
        let flow = joke_flow(Arc::new(MockClient::failing(
            GenerationError::ProviderUnavailable {
                provider: "googleai".to_string(),
                reason: "connection refused".to_string(),
            },
        )));

        let report = flow.run(JokeInput::new("cats")).await.unwrap_err();

        assert!(matches!(
            report.current_context(),
            FlowError::Generation { flow, .. } if flow == JOKE_FLOW
        ));
    }

    #[test]
    fn default_registry_holds_both_flows() {
        let registry = default_registry(Arc::new(EchoClient), Duration::from_secs(5)).unwrap();

        let descriptors = registry.list();
        let names: Vec<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec![GREETING_FLOW, JOKE_FLOW]);

        let greeting = &descriptors[0];
        assert!(greeting.input_schema["properties"]["language"].is_object());
        assert!(greeting.output_schema["properties"]["greeting"].is_object());
    }

    #[tokio::test]
    async fn registry_flows_run_through_json() {
        let registry = default_registry(
            Arc::new(MockClient::succeeding("Why did the borrow checker...")),
            Duration::from_secs(5),
        )
        .unwrap();

        let output = registry
            .get(JOKE_FLOW)
            .unwrap()
            .run_json(serde_json::json!({"topic": "rust"}), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(output, serde_json::json!({"joke": "Why did the borrow checker..."}));
    }

    #[tokio::test]
    async fn concurrent_greetings_stay_separate() {
        let flow = greeting_flow(Arc::new(EchoClient));
        let people = [
            ("Alice", "english"),
            ("Bob", "spanish"),
            ("Claire", "french"),
        ];

        let outputs = futures::future::join_all(people.iter().map(|(name, language)| {
            let flow = flow.clone();
            async move { flow.run(GreetingInput::new(*name, *language)).await }
        }))
        .await;

        for ((name, language), output) in people.iter().zip(outputs) {
            let greeting = output.unwrap().greeting;
            assert!(greeting.contains(name));
            assert!(greeting.contains(language));
        }
    }
}
