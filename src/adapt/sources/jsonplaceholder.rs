//! Adapter for the JSONPlaceholder demo API.

use crate::adapt::primitives::{
    is_valid_email, normalize_email, require_present, require_text, sanitize_text,
};
use crate::adapt::sources::check_id;
use crate::adapt::traits::{AdaptContext, SourcePolicy, UserAdapter, ValidationError};
use crate::model::{JoinedDate, JsonplaceholderUserDto, UnifiedUser, UserSource, DEFAULT_AVATAR};

/// Maps [`JsonplaceholderUserDto`] records.
///
/// The source has neither avatars nor registration dates: every record gets
/// [`DEFAULT_AVATAR`] and [`JoinedDate::NotProvided`].
#[derive(Debug, Clone, Copy)]
pub struct JsonplaceholderUserAdapter {
    policy: SourcePolicy,
}

impl JsonplaceholderUserAdapter {
    pub const NAME_MAX_LENGTH: usize = 100;

    pub fn new() -> Self {
        Self {
            policy: SourcePolicy::for_source(UserSource::Jsonplaceholder),
        }
    }

    pub fn with_policy(mut self, policy: SourcePolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Default for JsonplaceholderUserAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl UserAdapter for JsonplaceholderUserAdapter {
    type Dto = JsonplaceholderUserDto;

    fn source(&self) -> UserSource {
        UserSource::Jsonplaceholder
    }

    fn adapt(
        &self,
        dto: &JsonplaceholderUserDto,
        _ctx: &AdaptContext<'_>,
    ) -> Result<UnifiedUser, ValidationError> {
        let adapter = self.name();
        let id = *require_present(dto.id.as_ref(), "id", adapter)?;
        let raw_name = require_text(dto.name.as_deref(), "name", adapter)?;
        let email = require_text(dto.email.as_deref(), "email", adapter)?;

        let name = sanitize_text(Some(raw_name), Some(Self::NAME_MAX_LENGTH));
        if name.is_empty() {
            return Err(ValidationError::EmptyAfterSanitization {
                adapter: adapter.to_string(),
                field: "name".to_string(),
                value: raw_name.to_string(),
            });
        }

        if !is_valid_email(Some(email)) {
            return Err(ValidationError::InvalidEmail {
                adapter: adapter.to_string(),
                value: email.to_string(),
            });
        }

        Ok(UnifiedUser {
            id: check_id(id, &id.to_string(), "id", adapter, &self.policy)?,
            name,
            email: normalize_email(email),
            avatar: DEFAULT_AVATAR.to_string(),
            joined_date: JoinedDate::NotProvided,
            source: UserSource::Jsonplaceholder,
        })
    }
}
