use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Placeholder avatar used when a source cannot supply one.
pub const DEFAULT_AVATAR: &str = "default-avatar.svg";

// ============================================================================
// Unified Representation
// ============================================================================

/// The single internal shape every source is normalized into.
///
/// Records are built once by an adapter and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// URL or [`DEFAULT_AVATAR`]; never empty
    pub avatar: String,
    #[serde(default, skip_serializing_if = "JoinedDate::is_not_provided")]
    pub joined_date: JoinedDate,
    pub source: UserSource,
}

/// Registration date of a unified user.
///
/// `NotProvided` means the source has no such field at all and is omitted
/// from serialized output; `Unknown` is an explicit "known absent" and
/// serializes as `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JoinedDate {
    #[default]
    NotProvided,
    Unknown,
    On(DateTime<Utc>),
}

impl JoinedDate {
    pub fn is_not_provided(&self) -> bool {
        matches!(self, JoinedDate::NotProvided)
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            JoinedDate::On(date) => Some(*date),
            JoinedDate::NotProvided | JoinedDate::Unknown => None,
        }
    }
}

impl From<Option<DateTime<Utc>>> for JoinedDate {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(JoinedDate::Unknown, JoinedDate::On)
    }
}

impl Serialize for JoinedDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            JoinedDate::On(date) => date.serialize(serializer),
            JoinedDate::NotProvided | JoinedDate::Unknown => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for JoinedDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<DateTime<Utc>>::deserialize(deserializer).map(JoinedDate::from)
    }
}

/// Closed set of upstream sources.
///
/// All per-source metadata is resolved with exhaustive matches so a new
/// variant cannot be added without handling it everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserSource {
    Internal,
    Github,
    Jsonplaceholder,
    Twitter,
}

impl UserSource {
    pub const ALL: [UserSource; 4] = [
        UserSource::Internal,
        UserSource::Github,
        UserSource::Jsonplaceholder,
        UserSource::Twitter,
    ];

    /// Wire identifier, e.g. `"github"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserSource::Internal => "internal",
            UserSource::Github => "github",
            UserSource::Jsonplaceholder => "jsonplaceholder",
            UserSource::Twitter => "twitter",
        }
    }

    /// Name used to label batches in error reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            UserSource::Internal => "Internal",
            UserSource::Github => "GitHub",
            UserSource::Jsonplaceholder => "JSONPlaceholder",
            UserSource::Twitter => "Twitter",
        }
    }

    /// Name used to prefix validation messages.
    pub fn adapter_name(&self) -> &'static str {
        match self {
            UserSource::Internal => "InternalUserAdapter",
            UserSource::Github => "GithubUserAdapter",
            UserSource::Jsonplaceholder => "JsonplaceholderUserAdapter",
            UserSource::Twitter => "TwitterUserAdapter",
        }
    }

    /// Style classes for the source badge shown next to a user.
    pub fn badge_style(&self) -> &'static str {
        match self {
            UserSource::Internal => "bg-blue-100 text-blue-800",
            UserSource::Github => "bg-purple-100 text-purple-800",
            UserSource::Jsonplaceholder => "bg-green-100 text-green-800",
            UserSource::Twitter => "bg-sky-100 text-sky-800",
        }
    }
}

impl std::fmt::Display for UserSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Source DTOs
// ============================================================================
//
// Every field is optional at the type level: required-ness is a validation
// rule enforced by the matching adapter, not by deserialization.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InternalUserDto {
    pub user_id: Option<String>,
    pub full_name: Option<String>,
    pub email_address: Option<String>,
    pub profile_image: Option<String>,
    pub registered_at: Option<String>, // ISO-8601-like
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubUserDto {
    pub id: Option<i64>,
    pub login: Option<String>,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
    pub created_at: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonplaceholderUserDto {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub username: Option<String>, // unused by the adapter
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitterUserDto {
    pub id_str: Option<String>,
    pub screen_name: Option<String>,
    pub name: Option<String>,
    pub profile_image_url_https: Option<String>,
    pub created_at: Option<String>,
    pub verified: Option<bool>,
    pub followers_count: Option<u64>,
    pub description: Option<String>,
}
