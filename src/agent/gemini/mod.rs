//! Gemini completion backend
//!
//! Talks to the `generateContent` REST endpoint of the Generative Language API.

mod client;
mod types;

pub use client::{GeminiClient, DEFAULT_GEMINI_URL};
