//! Utility modules shared by the backend, Wikipedia and assembly code.
//!
//! - [`HttpClient`]: reqwest client with a bounded timeout and a fixed user agent
//! - [`word_count`], [`char_count`], [`estimate_pages`]: document statistics
//! - [`truncate_chars`], [`truncate_at_sentence`]: char-safe truncation
//! - [`clean_snippet`]: HTML stripping for search snippets
//!
//! # Truncation
//!
//! ```rust
//! use autoconspect::utils::truncate_at_sentence;
//!
//! let text = "Plants use light. They also need water and carbon dioxide";
//! assert_eq!(truncate_at_sentence(text, 25), "Plants use light.");
//! ```

mod http;
mod text;

pub use http::{HttpClient, DEFAULT_USER_AGENT};
pub use text::{
    char_count, clean_snippet, estimate_pages, truncate_at_sentence, truncate_chars, word_count,
    CHARS_PER_PAGE,
};
