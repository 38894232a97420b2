//! # AutoConspect
//!
//! Generates academic texts (essays, reports, study notes, answers to
//! questions and retellings) with a Google Gemini model, optionally grounded
//! in Wikipedia articles.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (GenerationRequest, Mode, GenerationResult, etc.)
//! - [`composer`]: Prompt and cover page composition
//! - [`backend`]: Generative-text backend trait with the Gemini implementation
//! - [`connector`]: Model selection with multi-model fallback
//! - [`wiki`]: Wikipedia search and article retrieval
//! - [`assembler`]: End-to-end document generation
//! - [`server`]: HTTP API
//! - [`utils`]: HTTP client and text helpers
//! - [`config`]: Configuration management

pub mod assembler;
pub mod backend;
pub mod composer;
pub mod config;
pub mod connector;
pub mod models;
pub mod server;
pub mod utils;
pub mod wiki;

// Re-export commonly used types
pub use assembler::{DocumentAssembler, GenerateError};
pub use connector::{ConnectionState, ModelConnector};
pub use models::{GenerationRequest, GenerationResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
