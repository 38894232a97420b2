//! Core data models for generation requests, references and results.

mod document;
mod reference;
mod request;

pub use document::{DocumentStats, GenerationResult};
pub use reference::{combine_references, ReferenceMaterial, SearchHit, SourceLink};
pub use request::{AuthorInfo, EduType, GenerationRequest, Mode, StyleTier, VolumeTier, WikiLang};
