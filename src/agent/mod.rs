//! Completion service abstraction.
//!
//! The pipeline only sees [`CompletionService`]. [`GeminiClient`] is the
//! shipped backend; tests script their own.

mod gemini;
mod service;

pub use gemini::{GeminiClient, DEFAULT_GEMINI_URL};
pub use service::{CompletionService, GenerationOptions, Message, Role, ServiceError};
