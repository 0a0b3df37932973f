//! Adapt module - per-source user adapters and the aggregation pipeline.
//!
//! This module provides the core of the unifier:
//! - **Primitives**: shared validation/sanitization functions in [`primitives`]
//! - **Traits**: the [`UserAdapter`] contract, [`SourcePolicy`], [`ValidationError`]
//! - **Sources**: one adapter per upstream API in [`sources`]
//! - **Pipeline**: failure-isolating aggregation via [`pipeline::AggregationPipeline`]

pub mod pipeline;
pub mod primitives;
pub mod sources;
pub mod traits;

// Re-export commonly used types
pub use traits::{AdaptContext, DateFallback, SourcePolicy, UserAdapter, ValidationError};

pub use sources::{
    GithubUserAdapter, InternalUserAdapter, JsonplaceholderUserAdapter, TwitterUserAdapter,
};

pub use pipeline::{
    AdaptBatch, AdaptationFailure, AggregationPipeline, AggregationReport, AggregationStats,
    BatchOutcome, SourceBatch, SourceStats,
};
