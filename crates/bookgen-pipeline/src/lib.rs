//! LLM-driven book generation.
//!
//! This crate provides a fire-and-forget pipeline that calls a text-completion
//! API four times over (title, chapter outline, section outlines, section text)
//! and accumulates the results into a [`bookgen_core::Book`].
//!
//! # Architecture
//!
//! - **provider**: `TextGenerator` trait with an OpenAI completions implementation
//! - **prompts**: prompt builders that re-embed the titles generated so far
//! - **pipeline**: Orchestrates title → chapters → sections → text
//! - **usage**: Token usage and cost tracking
//! - **progress**: Terminal progress bars via `indicatif`

pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod provider;
pub mod usage;

pub use pipeline::{GenerateConfig, GenerationReport, PipelineError, Stage, run_pipeline};
pub use progress::BookProgress;
pub use provider::{
    Generation, GenerationOptions, GenerationRequest, ProviderError, TextGenerator,
    available_generators, create_generator,
};
pub use usage::UsageTracker;
