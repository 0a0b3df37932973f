//! Aggregation pipeline over per-source batches.
//!
//! This module provides the [`AggregationPipeline`] coordinator that runs
//! every source batch through its adapter with:
//! - Per-record failure isolation (validation errors and panics)
//! - Batch-ordered, record-ordered output
//! - Structured diagnostics via an injectable [`DiagnosticSink`]
//! - Run statistics in [`AggregationStats`]

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::adapt::traits::{AdaptContext, UserAdapter, ValidationError};
use crate::diagnostics::{DiagnosticEvent, DiagnosticSink, TracingSink};
use crate::model::UnifiedUser;

/// Message used when a panic payload carries no text.
pub const UNKNOWN_ERROR: &str = "Unknown error";

// ============================================================================
// Pipeline Types
// ============================================================================

/// One record that could not be adapted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdaptationFailure {
    /// Machine name of the batch (e.g., "github")
    pub source_name: String,

    /// Label used in the message (e.g., "GitHub")
    pub display_name: String,

    /// Position of the record inside its batch
    pub index: usize,

    /// Adapter error text
    pub message: String,

    /// The offending record as received
    pub raw: serde_json::Value,
}

impl std::fmt::Display for AdaptationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] Failed to adapt user at index {}: {}",
            self.display_name, self.index, self.message
        )
    }
}

/// Result of adapting a single batch.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub source_name: String,
    pub users: Vec<UnifiedUser>,
    pub failures: Vec<AdaptationFailure>,
}

/// Complete aggregation result.
#[derive(Debug, Clone, Default)]
pub struct AggregationReport {
    /// Successfully adapted users, grouped by batch in input order
    pub unified: Vec<UnifiedUser>,

    /// One entry per failed record
    pub errors: Vec<AdaptationFailure>,

    /// Counts and timing
    pub stats: AggregationStats,
}

impl AggregationReport {
    /// Formatted error lines, one per failure.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Statistics about an aggregation run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AggregationStats {
    /// Total time spent on the run (milliseconds)
    pub total_duration_ms: u64,

    /// Number of records offered across all batches
    pub records_seen: usize,

    pub succeeded: usize,
    pub failed: usize,

    /// Per-batch counts in batch order
    pub per_source: Vec<SourceStats>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStats {
    pub source_name: String,
    pub succeeded: usize,
    pub failed: usize,
}

// ============================================================================
// Batch Trait
// ============================================================================

/// A source batch ready for adaptation, with its DTO type erased.
///
/// This is what lets the pipeline hold batches of different sources in one
/// list.
pub trait AdaptBatch: Send + Sync {
    /// Machine name of the source (e.g., "twitter")
    fn source_name(&self) -> &str;

    /// Label used in error messages (e.g., "Twitter")
    fn display_name(&self) -> &str;

    /// Number of entries, including null ones
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adapts every entry in order. Never fails as a whole: each failed
    /// entry becomes an [`AdaptationFailure`] and an
    /// [`DiagnosticEvent::AdaptationFailed`] event.
    ///
    /// Adapter panics are caught and reported the same way. The process
    /// panic hook still runs for each of them first, so without
    /// [`install_panic_hook`](crate::logging::install_panic_hook) the default
    /// hook also prints them to stderr.
    fn adapt_all(&self, ctx: &AdaptContext<'_>) -> BatchOutcome;
}

/// One slot of a batch.
enum BatchEntry<D> {
    /// Decoded record, `None` for a null element
    Decoded(Option<D>),

    /// Element that did not decode into the source DTO
    Malformed { reason: String, raw: serde_json::Value },
}

/// Batch of raw records for one adapter.
pub struct SourceBatch<A: UserAdapter> {
    source_name: String,
    display_name: String,
    entries: Vec<BatchEntry<A::Dto>>,
    adapter: A,
}

impl<A: UserAdapter> SourceBatch<A> {
    /// Creates a batch named after the adapter's source.
    pub fn new(adapter: A, records: Vec<A::Dto>) -> Self {
        Self::from_entries(adapter, records.into_iter().map(Some).collect())
    }

    /// Creates a batch that may contain null entries.
    pub fn from_entries(adapter: A, entries: Vec<Option<A::Dto>>) -> Self {
        Self::with_entries(adapter, entries.into_iter().map(BatchEntry::Decoded).collect())
    }

    /// Parses a JSON array of records.
    ///
    /// Elements are decoded one by one. A `null` element or one that does
    /// not match the source DTO stays in the batch and fails individually
    /// at adaptation time, with the element attached as the raw record.
    ///
    /// # Errors
    ///
    /// Fails only when `json` is not a JSON array.
    pub fn from_json(adapter: A, json: &str) -> Result<Self, serde_json::Error>
    where
        A::Dto: DeserializeOwned,
    {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let entries = values
            .into_iter()
            .map(|value| match Option::<A::Dto>::deserialize(&value) {
                Ok(dto) => BatchEntry::Decoded(dto),
                Err(e) => BatchEntry::Malformed {
                    reason: e.to_string(),
                    raw: value,
                },
            })
            .collect();
        Ok(Self::with_entries(adapter, entries))
    }

    fn with_entries(adapter: A, entries: Vec<BatchEntry<A::Dto>>) -> Self {
        let source = adapter.source();
        Self {
            source_name: source.as_str().to_string(),
            display_name: source.display_name().to_string(),
            entries,
            adapter,
        }
    }

    /// Overrides the batch names used in reports.
    pub fn with_names(
        mut self,
        source_name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        self.source_name = source_name.into();
        self.display_name = display_name.into();
        self
    }

    /// Wraps the batch for use in a pipeline.
    pub fn into_handle(self) -> Arc<dyn AdaptBatch>
    where
        A: 'static,
        A::Dto: 'static,
    {
        Arc::new(self)
    }

    fn failure(&self, index: usize, message: String, raw: serde_json::Value) -> AdaptationFailure {
        AdaptationFailure {
            source_name: self.source_name.clone(),
            display_name: self.display_name.clone(),
            index,
            message,
            raw,
        }
    }
}

impl<A: UserAdapter> AdaptBatch for SourceBatch<A> {
    fn source_name(&self) -> &str {
        &self.source_name
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn adapt_all(&self, ctx: &AdaptContext<'_>) -> BatchOutcome {
        let mut outcome = BatchOutcome {
            source_name: self.source_name.clone(),
            ..Default::default()
        };

        for (index, entry) in self.entries.iter().enumerate() {
            let (message, raw) = match entry {
                BatchEntry::Decoded(dto) => {
                    let dto = dto.as_ref();
                    let result =
                        catch_unwind(AssertUnwindSafe(|| self.adapter.adapt_entry(dto, ctx)));

                    match result {
                        Ok(Ok(user)) => {
                            outcome.users.push(user);
                            continue;
                        }
                        Ok(Err(e)) => (e.to_string(), raw_value(dto)),
                        Err(payload) => (panic_message(payload.as_ref()), raw_value(dto)),
                    }
                }
                BatchEntry::Malformed { reason, raw } => {
                    let error = ValidationError::MalformedRecord {
                        adapter: self.adapter.name().to_string(),
                        reason: reason.clone(),
                    };
                    (error.to_string(), raw.clone())
                }
            };

            let failure = self.failure(index, message, raw);
            ctx.diagnostics().emit(DiagnosticEvent::AdaptationFailed {
                message: failure.to_string(),
                raw: failure.raw.clone(),
            });
            outcome.failures.push(failure);
        }

        outcome
    }
}

fn raw_value<D: Serialize>(dto: Option<&D>) -> serde_json::Value {
    serde_json::to_value(dto).unwrap_or(serde_json::Value::Null)
}

/// Text of a panic payload, or [`UNKNOWN_ERROR`] when it carries none.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        UNKNOWN_ERROR.to_string()
    }
}

// ============================================================================
// Pipeline Executor
// ============================================================================

/// Sequential aggregation pipeline.
///
/// Batches are processed in the order given and records in array order.
/// The output is all successes of batch 1, then all successes of batch 2,
/// and so on. A failing record never stops its batch or later batches.
///
/// # Example
///
/// ```ignore
/// let pipeline = AggregationPipeline::new();
/// let report = pipeline.run(&[
///     SourceBatch::new(GithubUserAdapter::new(), github_users).into_handle(),
///     SourceBatch::new(TwitterUserAdapter::new(), twitter_users).into_handle(),
/// ]);
/// println!("{} users, {} errors", report.unified.len(), report.errors.len());
/// ```
#[derive(Clone)]
pub struct AggregationPipeline {
    /// Destination for diagnostics
    diagnostics: Arc<dyn DiagnosticSink>,

    /// Fixed "now" for reproducible runs (default: wall clock per run)
    reference_time: Option<DateTime<Utc>>,
}

impl AggregationPipeline {
    /// Creates a pipeline logging through `tracing` and using the wall clock.
    pub fn new() -> Self {
        Self {
            diagnostics: Arc::new(TracingSink),
            reference_time: None,
        }
    }

    /// Sets the diagnostic sink.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Pins the instant used for date fallbacks and future-date clamping.
    pub fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    pub fn diagnostics(&self) -> Arc<dyn DiagnosticSink> {
        Arc::clone(&self.diagnostics)
    }

    /// Instant a run starting now would use as its reference.
    pub fn reference_time(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }

    /// Runs every batch and returns the combined report.
    pub fn run(&self, batches: &[Arc<dyn AdaptBatch>]) -> AggregationReport {
        let start = Instant::now();
        let ctx = AdaptContext::at(self.reference_time(), self.diagnostics.as_ref());

        let outcomes = batches.iter().map(|batch| batch.adapt_all(&ctx)).collect();
        self.assemble(outcomes, start)
    }

    /// Concatenates batch outcomes in the given order and emits the run
    /// summary.
    pub(crate) fn assemble(
        &self,
        outcomes: Vec<BatchOutcome>,
        start: Instant,
    ) -> AggregationReport {
        let mut report = AggregationReport::default();

        for outcome in outcomes {
            report.stats.per_source.push(SourceStats {
                source_name: outcome.source_name,
                succeeded: outcome.users.len(),
                failed: outcome.failures.len(),
            });
            report.unified.extend(outcome.users);
            report.errors.extend(outcome.failures);
        }

        report.stats.succeeded = report.unified.len();
        report.stats.failed = report.errors.len();
        report.stats.records_seen = report.stats.succeeded + report.stats.failed;
        report.stats.total_duration_ms = start.elapsed().as_millis() as u64;

        self.diagnostics.emit(DiagnosticEvent::AggregationCompleted {
            succeeded: report.stats.succeeded,
        });
        if !report.errors.is_empty() {
            self.diagnostics.emit(DiagnosticEvent::AggregationErrors {
                count: report.errors.len(),
                errors: report.error_messages(),
            });
        }

        report
    }
}

impl Default for AggregationPipeline {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
