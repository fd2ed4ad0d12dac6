//! Generation backends for promptflow.
//!
//! This crate provides the single capability every flow depends on: turning a
//! rendered prompt into generated text.
//!
//! - [`GenerationClient`]: the backend trait
//! - [`GoogleAiClient`]: the Google AI (Gemini) `generateContent` backend
//! - [`MockClient`] and [`EchoClient`]: deterministic backends for tests

pub mod backend;
pub mod error;
pub mod google;
pub mod mock;

pub use backend::{
    GenerateRequest, GenerateResponse, GenerationClient, GenerationConfig, TokenUsage,
};
pub use error::GenerationError;
pub use google::GoogleAiClient;
pub use mock::{EchoClient, MockClient};
