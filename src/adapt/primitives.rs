//! Validation and sanitization primitives shared by every adapter.
//!
//! All functions are pure. The only side effect is the diagnostic emitted by
//! [`parse_date_safely`] when a non-empty date cannot be parsed.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::adapt::traits::ValidationError;
use crate::diagnostics::{DiagnosticEvent, DiagnosticSink};

/// Appended to text cut by [`sanitize_text`].
pub const ELLIPSIS: &str = "...";

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

// ============================================================================
// Value Traits
// ============================================================================

/// Values that can fail a required-field check.
///
/// Missing means null, blank text (all whitespace) or NaN.
pub trait RequiredValue {
    fn is_missing(&self) -> bool;
}

impl RequiredValue for str {
    fn is_missing(&self) -> bool {
        self.trim().is_empty()
    }
}

impl RequiredValue for String {
    fn is_missing(&self) -> bool {
        self.as_str().is_missing()
    }
}

impl RequiredValue for f64 {
    fn is_missing(&self) -> bool {
        self.is_nan()
    }
}

impl RequiredValue for f32 {
    fn is_missing(&self) -> bool {
        self.is_nan()
    }
}

macro_rules! never_missing {
    ($($ty:ty),*) => {
        $(impl RequiredValue for $ty {
            fn is_missing(&self) -> bool {
                false
            }
        })*
    };
}

never_missing!(i32, i64, u32, u64, usize, bool);

impl<T: RequiredValue + ?Sized> RequiredValue for &T {
    fn is_missing(&self) -> bool {
        (**self).is_missing()
    }
}

impl<T: RequiredValue> RequiredValue for Option<T> {
    fn is_missing(&self) -> bool {
        self.as_ref().map_or(true, RequiredValue::is_missing)
    }
}

/// Values that [`get_value_or_default`] treats as empty.
///
/// Only the empty string counts; numbers and booleans are never empty.
pub trait EmptyValue {
    fn is_empty_value(&self) -> bool {
        false
    }
}

impl EmptyValue for String {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl EmptyValue for &str {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl EmptyValue for i32 {}
impl EmptyValue for i64 {}
impl EmptyValue for u64 {}
impl EmptyValue for f64 {}
impl EmptyValue for bool {}

/// Input accepted by [`parse_number`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberLike<'a> {
    Number(i64),
    Text(&'a str),
}

impl From<i64> for NumberLike<'_> {
    fn from(value: i64) -> Self {
        NumberLike::Number(value)
    }
}

impl<'a> From<&'a str> for NumberLike<'a> {
    fn from(value: &'a str) -> Self {
        NumberLike::Text(value)
    }
}

impl<'a> From<&'a String> for NumberLike<'a> {
    fn from(value: &'a String) -> Self {
        NumberLike::Text(value.as_str())
    }
}

// ============================================================================
// Primitives
// ============================================================================

/// Returns `true` iff `email` is non-empty and looks like `local@domain.tld`.
pub fn is_valid_email(email: Option<&str>) -> bool {
    match email {
        Some(email) if !email.is_empty() => EMAIL_PATTERN.is_match(email),
        _ => false,
    }
}

/// Parses a date, returning `fallback` when the input is absent, empty, or
/// unparseable. Only the unparseable case emits a diagnostic.
///
/// Pass `fallback = None` to make "could not parse" distinguishable from a
/// substituted instant.
pub fn parse_date_safely(
    value: Option<&str>,
    fallback: Option<DateTime<Utc>>,
    diagnostics: &dyn DiagnosticSink,
) -> Option<DateTime<Utc>> {
    let input = match value {
        Some(input) if !input.is_empty() => input,
        _ => return fallback,
    };

    match parse_date(input) {
        Some(date) => Some(date),
        None => {
            diagnostics.emit(DiagnosticEvent::InvalidDate {
                input: input.to_string(),
            });
            fallback
        }
    }
}

/// Parses the date-time layouts seen across sources:
/// RFC 3339, RFC 2822, the Twitter `created_at` layout, naive date-times
/// (taken as UTC) and plain dates (midnight UTC).
fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(input) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(input) {
        return Some(date.with_timezone(&Utc));
    }
    // Tue Jun 02 20:12:29 +0000 2009
    if let Ok(date) = DateTime::parse_from_str(input, "%a %b %d %H:%M:%S %z %Y") {
        return Some(date.with_timezone(&Utc));
    }
    for layout in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, layout) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Trims `text` and, when `max_length` is set and exceeded, keeps the first
/// `max_length` characters followed by [`ELLIPSIS`].
///
/// A `max_length` of zero disables the cap.
pub fn sanitize_text(text: Option<&str>, max_length: Option<usize>) -> String {
    let trimmed = match text {
        Some(text) if !text.is_empty() => text.trim(),
        _ => return String::new(),
    };

    match max_length {
        Some(max) if max > 0 && trimmed.chars().count() > max => {
            let mut cut: String = trimmed.chars().take(max).collect();
            cut.push_str(ELLIPSIS);
            cut
        }
        _ => trimmed.to_string(),
    }
}

/// Fails unless `value` is present and not blank/NaN.
pub fn require_field<V: RequiredValue + ?Sized>(
    value: &V,
    field: &str,
    adapter: &str,
) -> Result<(), ValidationError> {
    if value.is_missing() {
        return Err(ValidationError::MissingField {
            adapter: adapter.to_string(),
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Unwraps an optional reference, failing like [`require_field`].
pub fn require_present<'a, T: ?Sized>(
    value: Option<&'a T>,
    field: &str,
    adapter: &str,
) -> Result<&'a T, ValidationError> {
    value.ok_or_else(|| ValidationError::MissingField {
        adapter: adapter.to_string(),
        field: field.to_string(),
    })
}

/// Unwraps required text, failing when it is absent or blank.
pub fn require_text<'a>(
    value: Option<&'a str>,
    field: &str,
    adapter: &str,
) -> Result<&'a str, ValidationError> {
    let text = require_present(value, field, adapter)?;
    require_field(text, field, adapter)?;
    Ok(text)
}

/// Returns numbers unchanged and converts text to an integer.
///
/// Text may carry surrounding whitespace and may use a float layout as long
/// as it denotes an integer (`"12.0"`, `"1e3"`).
///
/// Integer text outside the `i64` range (a 20-digit id, say) is rejected as
/// an invalid number rather than rounded.
pub fn parse_number<'a>(
    value: impl Into<NumberLike<'a>>,
    field: &str,
    adapter: &str,
) -> Result<i64, ValidationError> {
    let text = match value.into() {
        NumberLike::Number(n) => return Ok(n),
        NumberLike::Text(text) => text,
    };

    parse_integer_text(text).ok_or_else(|| ValidationError::InvalidNumber {
        adapter: adapter.to_string(),
        field: field.to_string(),
        value: text.to_string(),
    })
}

fn parse_integer_text(text: &str) -> Option<i64> {
    // Largest integer a double holds exactly
    const MAX_EXACT: f64 = 9_007_199_254_740_991.0;

    let trimmed = text.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n);
    }
    let float = trimmed.parse::<f64>().ok()?;
    if float.is_finite() && float.fract() == 0.0 && float.abs() <= MAX_EXACT {
        Some(float as i64)
    } else {
        None
    }
}

/// Trims and lower-cases an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Returns `default` when `value` is absent or an empty string.
pub fn get_value_or_default<T: EmptyValue>(value: Option<T>, default: T) -> T {
    match value {
        Some(value) if !value.is_empty_value() => value,
        _ => default,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email(Some("user@example.com")));
        assert!(!is_valid_email(Some("invalid-email")));
        assert!(!is_valid_email(Some("")));
        assert!(!is_valid_email(None));
        assert!(!is_valid_email(Some("user @example.com")));
        assert!(!is_valid_email(Some("user@example")));
        assert!(!is_valid_email(Some("a@b@c.com")));
    }

    #[test]
    fn test_parse_date_absent_returns_fallback_silently() {
        let sink = MemorySink::new();
        let fallback = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(parse_date_safely(None, Some(fallback), &sink), Some(fallback));
        assert_eq!(parse_date_safely(Some(""), Some(fallback), &sink), Some(fallback));
        assert_eq!(parse_date_safely(Some(""), None, &sink), None);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_parse_date_invalid_uses_fallback_and_warns() {
        let sink = MemorySink::new();
        let now = Utc::now();

        assert_eq!(parse_date_safely(Some("not-a-date"), Some(now), &sink), Some(now));
        assert_eq!(parse_date_safely(Some("not-a-date"), None, &sink), None);

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            DiagnosticEvent::InvalidDate {
                input: "not-a-date".to_string()
            }
        );
    }

    #[test]
    fn test_parse_date_layouts() {
        let sink = MemorySink::new();

        let iso = parse_date_safely(Some("2023-06-15T10:30:00Z"), None, &sink).unwrap();
        assert_eq!(iso, Utc.with_ymd_and_hms(2023, 6, 15, 10, 30, 0).unwrap());

        let twitter =
            parse_date_safely(Some("Tue Jun 02 20:12:29 +0000 2009"), None, &sink).unwrap();
        assert_eq!(twitter, Utc.with_ymd_and_hms(2009, 6, 2, 20, 12, 29).unwrap());

        let rfc2822 =
            parse_date_safely(Some("Tue, 02 Jun 2009 20:12:29 +0000"), None, &sink).unwrap();
        assert_eq!(rfc2822, twitter);

        let plain = parse_date_safely(Some("2023-01-15"), None, &sink).unwrap();
        assert_eq!((plain.year(), plain.month(), plain.day()), (2023, 1, 15));

        let naive = parse_date_safely(Some("2011-01-25T18:44:36"), None, &sink).unwrap();
        assert_eq!(naive, Utc.with_ymd_and_hms(2011, 1, 25, 18, 44, 36).unwrap());

        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_sanitize_text() {
        assert_eq!(sanitize_text(Some("  John Doe  "), None), "John Doe");
        assert_eq!(sanitize_text(Some(""), Some(10)), "");
        assert_eq!(sanitize_text(None, Some(10)), "");
        assert_eq!(sanitize_text(Some("   "), None), "");

        let cut = sanitize_text(Some("Very Long Name"), Some(10));
        assert_eq!(cut, "Very Long ...");
        assert_eq!(cut.chars().count(), 10 + 3);
        assert!(cut.ends_with(ELLIPSIS));

        // exactly at the cap is untouched
        assert_eq!(sanitize_text(Some("abcde"), Some(5)), "abcde");
        // cap counts characters, not bytes
        assert_eq!(sanitize_text(Some("ñññññ"), Some(3)), "ñññ...");
        assert_eq!(sanitize_text(Some("abc"), Some(0)), "abc");
    }

    #[test]
    fn test_require_field() {
        assert!(require_field("x", "name", "A").is_ok());
        assert!(require_field(&Some(5_i64), "id", "A").is_ok());

        let err = require_field("   ", "name", "TestAdapter").unwrap_err();
        assert_eq!(
            err.to_string(),
            "[TestAdapter] Missing or invalid required field: name"
        );
        assert!(require_field(&None::<String>, "name", "A").is_err());
        assert!(require_field(&f64::NAN, "score", "A").is_err());
        assert!(require_field(&Some(String::new()), "name", "A").is_err());
    }

    #[test]
    fn test_require_present() {
        let value = 3;
        assert_eq!(require_present(Some(&value), "dto", "A"), Ok(&3));

        let err = require_present::<i32>(None, "dto", "A").unwrap_err();
        assert_eq!(err.to_string(), "[A] Missing or invalid required field: dto");
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text(Some(" ok "), "login", "A"), Ok(" ok "));
        assert!(require_text(Some("  "), "login", "A").is_err());
        assert!(require_text(None, "login", "A").is_err());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(42_i64, "id", "A"), Ok(42));
        assert_eq!(parse_number("123", "userId", "A"), Ok(123));
        assert_eq!(parse_number(" 7 ", "userId", "A"), Ok(7));
        assert_eq!(parse_number("-5", "userId", "A"), Ok(-5));
        assert_eq!(parse_number("12.0", "userId", "A"), Ok(12));
        assert_eq!(parse_number("1e3", "userId", "A"), Ok(1000));

        let err = parse_number("abc", "userId", "InternalAdapter").unwrap_err();
        assert_eq!(
            err.to_string(),
            "[InternalAdapter] Invalid number format for field: userId: abc"
        );
        assert!(parse_number("12.5", "userId", "A").is_err());
        assert!(parse_number("", "userId", "A").is_err());
        assert!(parse_number("12345678901234567890", "id_str", "A").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  USER@Example.COM  "), "user@example.com");
    }

    #[test]
    fn test_get_value_or_default() {
        assert_eq!(get_value_or_default(Some(""), "default"), "default");
        assert_eq!(get_value_or_default(Some("value"), "default"), "value");
        assert_eq!(get_value_or_default(None, "default"), "default");
        assert_eq!(
            get_value_or_default(Some(" ".to_string()), "d".to_string()),
            " "
        );
        assert_eq!(get_value_or_default(Some(0_i64), 9), 0);
        assert_eq!(get_value_or_default(None, 9_i64), 9);
    }
}
