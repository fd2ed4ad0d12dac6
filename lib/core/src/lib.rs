//! Core types shared by the promptflow crates.
//!
//! This crate provides the error handling foundation and the strongly-typed
//! identifiers used when tracing flow invocations.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{FlowInvocationId, GenerationId};
