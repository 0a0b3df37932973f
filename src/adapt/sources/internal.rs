//! Adapter for the internal company user directory.

use crate::adapt::primitives::{
    get_value_or_default, is_valid_email, normalize_email, parse_number, require_text,
    sanitize_text,
};
use crate::adapt::sources::{check_id, resolve_joined_date};
use crate::adapt::traits::{AdaptContext, SourcePolicy, UserAdapter, ValidationError};
use crate::model::{InternalUserDto, UnifiedUser, UserSource, DEFAULT_AVATAR};

/// Maps [`InternalUserDto`] records.
///
/// `userId` arrives as text and must parse to a positive integer. Future
/// registration dates are clamped to the current instant.
#[derive(Debug, Clone, Copy)]
pub struct InternalUserAdapter {
    policy: SourcePolicy,
}

impl InternalUserAdapter {
    pub const NAME_MAX_LENGTH: usize = 150;

    pub fn new() -> Self {
        Self {
            policy: SourcePolicy::for_source(UserSource::Internal),
        }
    }

    pub fn with_policy(mut self, policy: SourcePolicy) -> Self {
        self.policy = policy;
        self
    }

    fn resolve_name(&self, full_name: &str) -> Result<String, ValidationError> {
        let name = sanitize_text(Some(full_name), Some(Self::NAME_MAX_LENGTH));
        if name.is_empty() {
            return Err(ValidationError::EmptyAfterSanitization {
                adapter: self.name().to_string(),
                field: "fullName".to_string(),
                value: full_name.to_string(),
            });
        }
        Ok(name)
    }

    fn resolve_email(&self, email_address: &str) -> Result<String, ValidationError> {
        if !is_valid_email(Some(email_address)) {
            return Err(ValidationError::InvalidEmail {
                adapter: self.name().to_string(),
                value: email_address.to_string(),
            });
        }
        Ok(normalize_email(email_address))
    }
}

impl Default for InternalUserAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl UserAdapter for InternalUserAdapter {
    type Dto = InternalUserDto;

    fn source(&self) -> UserSource {
        UserSource::Internal
    }

    fn adapt(
        &self,
        dto: &InternalUserDto,
        ctx: &AdaptContext<'_>,
    ) -> Result<UnifiedUser, ValidationError> {
        let adapter = self.name();
        let user_id = require_text(dto.user_id.as_deref(), "userId", adapter)?;
        let full_name = require_text(dto.full_name.as_deref(), "fullName", adapter)?;
        let email_address = require_text(dto.email_address.as_deref(), "emailAddress", adapter)?;

        let id = parse_number(user_id, "userId", adapter)?;

        Ok(UnifiedUser {
            id: check_id(id, user_id, "userId", adapter, &self.policy)?,
            name: self.resolve_name(full_name)?,
            email: self.resolve_email(email_address)?,
            avatar: get_value_or_default(dto.profile_image.clone(), DEFAULT_AVATAR.to_string()),
            joined_date: resolve_joined_date(
                dto.registered_at.as_deref(),
                adapter,
                &self.policy,
                ctx,
            ),
            source: UserSource::Internal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticEvent, MemorySink};
    use crate::model::JoinedDate;
    use chrono::{TimeZone, Utc};

    fn maria() -> InternalUserDto {
        InternalUserDto {
            user_id: Some("101".to_string()),
            full_name: Some("María González".to_string()),
            email_address: Some("maria@company.com".to_string()),
            profile_image: Some("https://i.pravatar.cc/150?img=5".to_string()),
            registered_at: Some("2023-06-15T10:30:00Z".to_string()),
        }
    }

    #[test]
    fn test_adapts_valid_record() {
        let sink = MemorySink::new();
        let ctx = AdaptContext::new(&sink);

        let user = InternalUserAdapter::new().adapt(&maria(), &ctx).unwrap();

        assert_eq!(user.id, 101);
        assert_eq!(user.name, "María González");
        assert_eq!(user.email, "maria@company.com");
        assert_eq!(user.avatar, "https://i.pravatar.cc/150?img=5");
        assert_eq!(user.source, UserSource::Internal);
        assert_eq!(
            user.joined_date,
            JoinedDate::On(Utc.with_ymd_and_hms(2023, 6, 15, 10, 30, 0).unwrap())
        );
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_rejects_non_positive_id() {
        let sink = MemorySink::new();
        let ctx = AdaptContext::new(&sink);
        let dto = InternalUserDto {
            user_id: Some("0".to_string()),
            full_name: Some("X".to_string()),
            email_address: Some("x@x.com".to_string()),
            ..Default::default()
        };

        let err = InternalUserAdapter::new().adapt(&dto, &ctx).unwrap_err();
        assert_eq!(
            err.to_string(),
            "[InternalUserAdapter] userId must be positive: 0"
        );
    }

    #[test]
    fn test_zero_id_allowed_when_policy_relaxed() {
        let sink = MemorySink::new();
        let ctx = AdaptContext::new(&sink);
        let dto = InternalUserDto {
            user_id: Some("0".to_string()),
            ..maria()
        };
        let adapter = InternalUserAdapter::new().with_policy(SourcePolicy {
            require_positive_id: false,
            ..SourcePolicy::for_source(UserSource::Internal)
        });

        assert_eq!(adapter.adapt(&dto, &ctx).unwrap().id, 0);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let sink = MemorySink::new();
        let ctx = AdaptContext::new(&sink);
        let adapter = InternalUserAdapter::new();

        let no_id = InternalUserDto {
            user_id: None,
            ..maria()
        };
        assert_eq!(
            adapter.adapt(&no_id, &ctx).unwrap_err().to_string(),
            "[InternalUserAdapter] Missing or invalid required field: userId"
        );

        let text_id = InternalUserDto {
            user_id: Some("abc".to_string()),
            ..maria()
        };
        assert_eq!(
            adapter.adapt(&text_id, &ctx).unwrap_err().to_string(),
            "[InternalUserAdapter] Invalid number format for field: userId: abc"
        );

        let bad_email = InternalUserDto {
            email_address: Some("not-an-email".to_string()),
            ..maria()
        };
        assert_eq!(
            adapter.adapt(&bad_email, &ctx).unwrap_err().to_string(),
            "[InternalUserAdapter] Invalid email format: not-an-email"
        );

        let blank_name = InternalUserDto {
            full_name: Some("   ".to_string()),
            ..maria()
        };
        assert!(matches!(
            adapter.adapt(&blank_name, &ctx),
            Err(ValidationError::MissingField { .. })
        ));
    }

    #[test]
    fn test_normalizes_and_defaults() {
        let sink = MemorySink::new();
        let ctx = AdaptContext::new(&sink);
        let dto = InternalUserDto {
            full_name: Some(format!("  {}  ", "a".repeat(200))),
            email_address: Some("Maria@Company.COM".to_string()),
            profile_image: Some(String::new()),
            registered_at: None,
            ..maria()
        };

        let user = InternalUserAdapter::new().adapt(&dto, &ctx).unwrap();
        assert_eq!(user.name.chars().count(), 150 + 3);
        assert_eq!(user.email, "maria@company.com");
        assert_eq!(user.avatar, DEFAULT_AVATAR);
        assert_eq!(user.joined_date, JoinedDate::On(ctx.now()));
    }

    #[test]
    fn test_future_registration_is_clamped() {
        let sink = MemorySink::new();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let ctx = AdaptContext::at(now, &sink);
        let dto = InternalUserDto {
            registered_at: Some("2099-01-01T00:00:00Z".to_string()),
            ..maria()
        };

        let user = InternalUserAdapter::new().adapt(&dto, &ctx).unwrap();
        assert_eq!(user.joined_date, JoinedDate::On(now));
        assert!(matches!(
            sink.events().as_slice(),
            [DiagnosticEvent::FutureDateClamped { adapter: "InternalUserAdapter", .. }]
        ));
    }

    #[test]
    fn test_adapt_is_pure() {
        let sink = MemorySink::new();
        let ctx = AdaptContext::new(&sink);
        let adapter = InternalUserAdapter::new();
        assert_eq!(
            adapter.adapt(&maria(), &ctx).unwrap(),
            adapter.adapt(&maria(), &ctx).unwrap()
        );
    }
}
