//! Structured diagnostics emitted while adapting and aggregating users.
//!
//! Adapters and the aggregation pipeline never log directly. They push
//! [`DiagnosticEvent`]s to a [`DiagnosticSink`], which lets callers choose
//! the destination:
//! - [`TracingSink`] forwards events to `tracing` (the default)
//! - [`MemorySink`] keeps them in memory so tests can assert on them

use chrono::{DateTime, Utc};
use std::sync::{Mutex, PoisonError};
use tracing::{error, info, warn};

/// Severity of a diagnostic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    Info,
    Warn,
    Error,
}

/// A single diagnostic produced by the adaptation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    /// A non-empty date string could not be parsed and the fallback was used.
    InvalidDate { input: String },

    /// A registration date after the reference instant was replaced by it.
    FutureDateClamped {
        adapter: &'static str,
        date: DateTime<Utc>,
    },

    /// One record failed to adapt. Carries the raw record for inspection.
    AdaptationFailed {
        message: String,
        raw: serde_json::Value,
    },

    /// Summary of a finished aggregation run.
    AggregationCompleted { succeeded: usize },

    /// Emitted after [`DiagnosticEvent::AggregationCompleted`] only when
    /// some records failed.
    AggregationErrors { count: usize, errors: Vec<String> },
}

impl DiagnosticEvent {
    pub fn level(&self) -> DiagnosticLevel {
        match self {
            DiagnosticEvent::InvalidDate { .. }
            | DiagnosticEvent::FutureDateClamped { .. }
            | DiagnosticEvent::AggregationErrors { .. } => DiagnosticLevel::Warn,
            DiagnosticEvent::AdaptationFailed { .. } => DiagnosticLevel::Error,
            DiagnosticEvent::AggregationCompleted { .. } => DiagnosticLevel::Info,
        }
    }

    /// Human-readable summary line.
    pub fn message(&self) -> String {
        match self {
            DiagnosticEvent::InvalidDate { input } => {
                format!("Invalid date format: \"{}\", using fallback", input)
            }
            DiagnosticEvent::FutureDateClamped { adapter, .. } => {
                format!("[{}] Future registration date detected, using current date", adapter)
            }
            DiagnosticEvent::AdaptationFailed { message, .. } => message.clone(),
            DiagnosticEvent::AggregationCompleted { succeeded } => {
                format!("Successfully adapted {} users", succeeded)
            }
            DiagnosticEvent::AggregationErrors { count, .. } => {
                format!("{} errors during adaptation", count)
            }
        }
    }
}

/// Destination for diagnostic events.
///
/// Implementations must be `Send + Sync`: the parallel executor shares one
/// sink between blocking tasks.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, event: DiagnosticEvent);
}

/// Forwards every event to `tracing` with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, event: DiagnosticEvent) {
        let message = event.message();
        match &event {
            DiagnosticEvent::InvalidDate { input } => {
                warn!(input = %input, "{}", message);
            }
            DiagnosticEvent::FutureDateClamped { adapter, date } => {
                warn!(adapter = *adapter, date = %date, "{}", message);
            }
            DiagnosticEvent::AdaptationFailed { raw, .. } => {
                error!(raw = %raw, "{}", message);
            }
            DiagnosticEvent::AggregationCompleted { succeeded } => {
                info!(succeeded = *succeeded, "{}", message);
            }
            DiagnosticEvent::AggregationErrors { count, errors } => {
                warn!(count = *count, errors = ?errors, "{}", message);
            }
        }
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event emitted so far, in emission order.
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded events at `level`.
    pub fn count_at(&self, level: DiagnosticLevel) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.level() == level)
            .count()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, event: DiagnosticEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.emit(DiagnosticEvent::AggregationCompleted { succeeded: 3 });
        sink.emit(DiagnosticEvent::AggregationErrors {
            count: 1,
            errors: vec!["boom".to_string()],
        });

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message(), "Successfully adapted 3 users");
        assert_eq!(sink.count_at(DiagnosticLevel::Warn), 1);

        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_event_levels() {
        let failed = DiagnosticEvent::AdaptationFailed {
            message: "x".to_string(),
            raw: serde_json::Value::Null,
        };
        assert_eq!(failed.level(), DiagnosticLevel::Error);
        assert_eq!(
            DiagnosticEvent::InvalidDate {
                input: "nope".to_string()
            }
            .level(),
            DiagnosticLevel::Warn
        );
    }

    #[test]
    fn test_tracing_sink_accepts_every_event() {
        let sink = TracingSink;
        sink.emit(DiagnosticEvent::InvalidDate {
            input: "nope".to_string(),
        });
        sink.emit(DiagnosticEvent::FutureDateClamped {
            adapter: "InternalUserAdapter",
            date: Utc::now(),
        });
        sink.emit(DiagnosticEvent::AggregationCompleted { succeeded: 0 });
    }
}
