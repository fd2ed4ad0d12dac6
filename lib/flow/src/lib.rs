//! Named prompt flows for promptflow.
//!
//! A flow validates typed input, renders a prompt, asks a
//! [`GenerationClient`](promptflow_ai::GenerationClient) for text and maps that
//! text into typed output. Flows are collected in a [`FlowRegistry`] which is
//! shared read-only with whatever serves them.

pub mod catalog;
pub mod error;
pub mod flow;
pub mod registry;

pub use catalog::{GreetingInput, GreetingOutput, JokeInput, JokeOutput};
pub use error::{FlowError, RegistryError, ValidationError};
pub use flow::{Flow, FlowDescriptor, FlowInput, PromptFlow};
pub use registry::FlowRegistry;
