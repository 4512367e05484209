//! Content generator for Nexo Global - creates AI-generated Instagram posts
//!
//! Each run produces a Spanish caption, a matching image prompt and a rendered
//! image that has passed a quality gate, falling back to canned text and a
//! local image library when the external services misbehave.

pub mod composer;
pub mod config;
pub mod error;
pub mod fallback;
pub mod imagegen;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod quality;
pub mod text;

pub use error::{Error, Result};
