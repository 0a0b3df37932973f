//! Core traits and types shared by all user adapters.
//!
//! This module defines:
//! - The capability contract every source adapter satisfies via [`UserAdapter`]
//! - Per-source behavior switches via [`SourcePolicy`]
//! - The per-call environment via [`AdaptContext`]
//! - The adapter failure type [`ValidationError`]

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::diagnostics::DiagnosticSink;
use crate::model::{UnifiedUser, UserSource};

// ============================================================================
// Adapter Trait
// ============================================================================

/// Transforms one source's DTO into a [`UnifiedUser`].
///
/// Implementations hold no per-call state: `adapt` is a pure construction
/// step apart from the diagnostics it emits. Calling it twice with equal
/// DTOs and the same context yields equal records.
///
/// # Examples
///
/// ```ignore
/// let ctx = AdaptContext::new(&TracingSink);
/// let user = GithubUserAdapter::new().adapt(&dto, &ctx)?;
/// assert_eq!(user.source, UserSource::Github);
/// ```
pub trait UserAdapter: Send + Sync {
    /// Raw source-shaped record consumed by this adapter
    type Dto: Serialize + Send + Sync;

    /// Source tag stamped on every produced record.
    fn source(&self) -> UserSource;

    /// Name used to prefix validation messages.
    fn name(&self) -> &'static str {
        self.source().adapter_name()
    }

    /// Adapts one record.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when a required field is missing, a
    /// numeric field does not parse, an email is malformed, or a source
    /// constraint (such as a positive id) is violated.
    fn adapt(
        &self,
        dto: &Self::Dto,
        ctx: &AdaptContext<'_>,
    ) -> Result<UnifiedUser, ValidationError>;

    /// Adapts a possibly-null batch entry. A missing record is reported as
    /// the required field `dto`.
    fn adapt_entry(
        &self,
        entry: Option<&Self::Dto>,
        ctx: &AdaptContext<'_>,
    ) -> Result<UnifiedUser, ValidationError> {
        let dto = crate::adapt::primitives::require_present(entry, "dto", self.name())?;
        self.adapt(dto, ctx)
    }
}

// ============================================================================
// Context & Policy
// ============================================================================

/// Environment for a single adaptation call.
#[derive(Clone, Copy)]
pub struct AdaptContext<'a> {
    now: DateTime<Utc>,
    diagnostics: &'a dyn DiagnosticSink,
}

impl<'a> AdaptContext<'a> {
    /// Context anchored at the current instant.
    pub fn new(diagnostics: &'a dyn DiagnosticSink) -> Self {
        Self::at(Utc::now(), diagnostics)
    }

    /// Context anchored at a fixed instant. Used for reproducible runs.
    pub fn at(now: DateTime<Utc>, diagnostics: &'a dyn DiagnosticSink) -> Self {
        Self { now, diagnostics }
    }

    /// Reference instant standing in for "now" (fallback and clamp value).
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn diagnostics(&self) -> &'a dyn DiagnosticSink {
        self.diagnostics
    }
}

impl std::fmt::Debug for AdaptContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdaptContext").field("now", &self.now).finish()
    }
}

/// What an unparseable date becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFallback {
    /// Replace with the context's reference instant
    Now,
    /// Record as explicitly unknown
    Unknown,
}

/// Per-source validation switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePolicy {
    /// Replace registration dates after "now" with "now"
    pub clamp_future_dates: bool,

    /// Reject identifiers that are zero or negative
    pub require_positive_id: bool,

    /// Fallback for empty or unparseable dates
    pub date_fallback: DateFallback,
}

impl SourcePolicy {
    /// Default policy for `source`.
    ///
    /// Only the internal source clamps future dates and requires a positive
    /// id. Other sources can opt in through `with_policy` on their adapter.
    pub fn for_source(source: UserSource) -> Self {
        match source {
            UserSource::Internal => Self {
                clamp_future_dates: true,
                require_positive_id: true,
                date_fallback: DateFallback::Now,
            },
            UserSource::Github | UserSource::Jsonplaceholder | UserSource::Twitter => Self {
                clamp_future_dates: false,
                require_positive_id: false,
                date_fallback: DateFallback::Now,
            },
        }
    }

    /// Everything switched on.
    pub fn strict() -> Self {
        Self {
            clamp_future_dates: true,
            require_positive_id: true,
            date_fallback: DateFallback::Now,
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Reasons a single record cannot be adapted.
///
/// The display text is always prefixed with the adapter name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field absent, null, blank, or NaN
    #[error("[{adapter}] Missing or invalid required field: {field}")]
    MissingField { adapter: String, field: String },

    /// Field is not a number
    #[error("[{adapter}] Invalid number format for field: {field}: {value}")]
    InvalidNumber {
        adapter: String,
        field: String,
        value: String,
    },

    /// Identifier is zero or negative
    #[error("[{adapter}] {field} must be positive: {value}")]
    NonPositiveId {
        adapter: String,
        field: String,
        value: String,
    },

    /// Text is empty once trimmed
    #[error("[{adapter}] {field} cannot be empty after sanitization: {value}")]
    EmptyAfterSanitization {
        adapter: String,
        field: String,
        value: String,
    },

    /// Email does not match `local@domain.tld`
    #[error("[{adapter}] Invalid email format: {value}")]
    InvalidEmail { adapter: String, value: String },

    /// Raw element does not decode into the source record shape
    #[error("[{adapter}] Malformed record: {reason}")]
    MalformedRecord { adapter: String, reason: String },
}
