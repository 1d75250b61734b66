//! Generation Layer - the external text generator behind the pipeline
//!
//! This module provides:
//! - Generator trait for backend abstraction
//! - AnthropicGenerator implementation
//! - ScriptedGenerator for tests and replay
//! - Generation options and provider errors

pub mod anthropic;
pub mod client;
pub mod error;
pub mod types;

pub use anthropic::{AnthropicConfig, AnthropicGenerator};
pub use client::{Generator, ScriptedGenerator};
pub use error::ProviderError;
pub use types::{DEFAULT_MAX_OUTPUT_TOKENS, GenerationOptions, OutputLimit, Usage};
