//! Prompt and cover-page composition.
//!
//! Both builders are deterministic and perform no I/O. The section headings
//! in the prompt templates are a formatting request to the model, not a
//! schema: the backend follows them on a best-effort basis.

mod cover;
mod prompt;

pub use cover::{compose_cover_page, compose_cover_page_in_year, COVER_WIDTH};
pub use prompt::{PromptComposer, DEFAULT_LANGUAGE, MAX_REFERENCE_CHARS};
