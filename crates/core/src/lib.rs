//! # CycleMate Core
//!
//! Domain types, traits, and error definitions for the CycleMate chat assistant.
//! This crate has **zero framework dependencies**. It defines the domain model
//! that the provider adapters, the assistant pipeline, and the HTTP gateway
//! all implement against.
//!
//! ## Design Philosophy
//!
//! The generative model is defined as a trait here. Implementations live in
//! `cyclemate-providers`. This enables:
//! - Swapping the upstream model via configuration
//! - Easy testing with mock/stub providers
//! - Clean dependency graph (all crates depend inward on core)

pub mod classification;
pub mod error;
pub mod generation;
pub mod message;
pub mod provider;
pub mod request;

// Re-export key types at crate root for ergonomics
pub use classification::{ErrorClassification, ErrorKind};
pub use error::{ProviderError, ValidationError};
pub use generation::{GenerationConfig, HarmCategory, SafetySettings, SafetyThreshold};
pub use message::{ProviderRole, ProviderTurn, Role, Turn, TurnSequence};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use request::{ChatRequest, ValidatedRequest};
