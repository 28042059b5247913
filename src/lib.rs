//! Describes a local image with a Gemini-compatible multimodal endpoint
//!
//! Reads one image file, sends it base64-encoded with a prompt to
//! `generateContent`, and returns the first candidate's text.

pub mod ai;
pub mod describer;
pub mod error;
pub mod models;
pub mod prompts;
pub mod source;

pub use describer::ImageDescriber;
pub use error::{Error, Result};
