//! Adapter for the Twitter users API.

use crate::adapt::primitives::{parse_number, require_text, sanitize_text};
use crate::adapt::sources::{check_id, resolve_joined_date};
use crate::adapt::traits::{AdaptContext, SourcePolicy, UserAdapter, ValidationError};
use crate::model::{TwitterUserDto, UnifiedUser, UserSource, DEFAULT_AVATAR};

/// Maps [`TwitterUserDto`] records.
///
/// Twitter never exposes email addresses, so one is always synthesized from
/// the screen name. Thumbnail avatars are upgraded to the 400x400 variant.
#[derive(Debug, Clone, Copy)]
pub struct TwitterUserAdapter {
    policy: SourcePolicy,
}

impl TwitterUserAdapter {
    pub const NAME_MAX_LENGTH: usize = 100;
    pub const EMAIL_DOMAIN: &'static str = "twitter.com";

    pub fn new() -> Self {
        Self {
            policy: SourcePolicy::for_source(UserSource::Twitter),
        }
    }

    pub fn with_policy(mut self, policy: SourcePolicy) -> Self {
        self.policy = policy;
        self
    }

    fn resolve_avatar(url: Option<&str>) -> String {
        match url {
            Some(url) if !url.trim().is_empty() => url.replacen("_normal", "_400x400", 1),
            _ => DEFAULT_AVATAR.to_string(),
        }
    }
}

impl Default for TwitterUserAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl UserAdapter for TwitterUserAdapter {
    type Dto = TwitterUserDto;

    fn source(&self) -> UserSource {
        UserSource::Twitter
    }

    fn adapt(
        &self,
        dto: &TwitterUserDto,
        ctx: &AdaptContext<'_>,
    ) -> Result<UnifiedUser, ValidationError> {
        let adapter = self.name();
        let id_str = require_text(dto.id_str.as_deref(), "id_str", adapter)?;
        let screen_name = require_text(dto.screen_name.as_deref(), "screen_name", adapter)?;

        let id = parse_number(id_str, "id_str", adapter)?;
        let name = sanitize_text(dto.name.as_deref(), Some(Self::NAME_MAX_LENGTH));

        Ok(UnifiedUser {
            id: check_id(id, id_str, "id_str", adapter, &self.policy)?,
            name: if name.is_empty() {
                format!("@{}", screen_name)
            } else {
                name
            },
            email: format!("{}@{}", screen_name.to_lowercase(), Self::EMAIL_DOMAIN),
            avatar: Self::resolve_avatar(dto.profile_image_url_https.as_deref()),
            joined_date: resolve_joined_date(dto.created_at.as_deref(), adapter, &self.policy, ctx),
            source: UserSource::Twitter,
        })
    }
}
