//! Seditor - staged AI edits for a single document
//!
//! An instruction and one source document go through a fixed sequence of
//! stages against a completion service: a heuristic complexity profile, a
//! numbered plan, an optional context audit, optional per-chunk analysis, a
//! change strategy, full-document generation, structural validation with at
//! most one repair, and a prose explanation.
//!
//! The pipeline never writes to the document. It returns a [`RunResult`]
//! whose [`PendingChange`] is applied as a separate step.
//!
//! ```rust,ignore
//! use seditor::agent::GeminiClient;
//! use seditor::pipeline::{NoStatus, PipelineRunner, PipelineSettings};
//!
//! let client = GeminiClient::new(std::env::var("GEMINI_API_KEY").ok());
//! let runner = PipelineRunner::new(&client, PipelineSettings::default());
//! let result = runner.run_request("Add a footer", Some(&document), &NoStatus).await?;
//! ```

pub mod agent;
pub mod config;
pub mod conversation;
pub mod domain;
pub mod pipeline;
pub mod session;

pub use domain::*;
pub use pipeline::{PipelineError, PipelineRunner, PipelineSettings};
