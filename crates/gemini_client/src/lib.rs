//! Gemini API client for the Ask AI panel.
//!
//! Blocking reqwest client (no Tokio runtime required). One request at a
//! time by construction: the calling surface disables resubmission while
//! a request is outstanding. The client is built explicitly and passed to
//! its caller; there is no process-wide singleton.

pub mod client;
pub mod markdown;

pub use client::{GeminiClient, SolveError, DEFAULT_MODEL};
pub use markdown::{bold_segments, Segment};
