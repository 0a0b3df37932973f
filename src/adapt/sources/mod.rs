//! Source-specific implementations of the
//! [`UserAdapter`](crate::adapt::UserAdapter) trait.
//!
//! - `internal` - company user directory
//! - `github` - GitHub users API
//! - `jsonplaceholder` - JSONPlaceholder demo API (no avatar, no join date)
//! - `twitter` - Twitter users API (no public email)

pub mod github;
pub mod internal;
pub mod jsonplaceholder;
pub mod twitter;

pub use github::GithubUserAdapter;
pub use internal::InternalUserAdapter;
pub use jsonplaceholder::JsonplaceholderUserAdapter;
pub use twitter::TwitterUserAdapter;

use crate::adapt::primitives::parse_date_safely;
use crate::adapt::traits::{AdaptContext, DateFallback, SourcePolicy, ValidationError};
use crate::diagnostics::DiagnosticEvent;
use crate::model::JoinedDate;

/// Applies the positive-id rule when the policy asks for it.
pub(crate) fn check_id(
    id: i64,
    raw: &str,
    field: &str,
    adapter: &str,
    policy: &SourcePolicy,
) -> Result<i64, ValidationError> {
    if policy.require_positive_id && id <= 0 {
        return Err(ValidationError::NonPositiveId {
            adapter: adapter.to_string(),
            field: field.to_string(),
            value: raw.to_string(),
        });
    }
    Ok(id)
}

/// Parses a registration date under `policy`, clamping future dates to the
/// context instant when enabled.
pub(crate) fn resolve_joined_date(
    value: Option<&str>,
    adapter: &'static str,
    policy: &SourcePolicy,
    ctx: &AdaptContext<'_>,
) -> JoinedDate {
    let fallback = match policy.date_fallback {
        DateFallback::Now => Some(ctx.now()),
        DateFallback::Unknown => None,
    };

    match parse_date_safely(value, fallback, ctx.diagnostics()) {
        Some(date) if policy.clamp_future_dates && date > ctx.now() => {
            ctx.diagnostics()
                .emit(DiagnosticEvent::FutureDateClamped { adapter, date });
            JoinedDate::On(ctx.now())
        }
        parsed => JoinedDate::from(parsed),
    }
}
