//! Adapter for the GitHub users API.

use crate::adapt::primitives::{
    get_value_or_default, is_valid_email, normalize_email, require_present, require_text,
    sanitize_text,
};
use crate::adapt::sources::{check_id, resolve_joined_date};
use crate::adapt::traits::{AdaptContext, SourcePolicy, UserAdapter, ValidationError};
use crate::model::{GithubUserDto, JoinedDate, UnifiedUser, UserSource, DEFAULT_AVATAR};

/// Maps [`GithubUserDto`] records.
///
/// Only `id` and `login` are required. A missing display name falls back to
/// the login and a missing or malformed email is synthesized from it, so
/// email problems never reject a GitHub record.
#[derive(Debug, Clone, Copy)]
pub struct GithubUserAdapter {
    policy: SourcePolicy,
}

impl GithubUserAdapter {
    pub const NAME_MAX_LENGTH: usize = 100;
    pub const EMAIL_DOMAIN: &'static str = "github.com";

    pub fn new() -> Self {
        Self {
            policy: SourcePolicy::for_source(UserSource::Github),
        }
    }

    pub fn with_policy(mut self, policy: SourcePolicy) -> Self {
        self.policy = policy;
        self
    }

    fn resolve_name(name: Option<&str>, login: &str) -> String {
        let name = sanitize_text(name, Some(Self::NAME_MAX_LENGTH));
        if name.is_empty() {
            login.to_string()
        } else {
            name
        }
    }

    fn resolve_email(email: Option<&str>, login: &str) -> String {
        match email {
            Some(email) if is_valid_email(Some(email)) => normalize_email(email),
            _ => format!("{}@{}", login.to_lowercase(), Self::EMAIL_DOMAIN),
        }
    }
}

impl Default for GithubUserAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl UserAdapter for GithubUserAdapter {
    type Dto = GithubUserDto;

    fn source(&self) -> UserSource {
        UserSource::Github
    }

    fn adapt(
        &self,
        dto: &GithubUserDto,
        ctx: &AdaptContext<'_>,
    ) -> Result<UnifiedUser, ValidationError> {
        let adapter = self.name();
        let id = *require_present(dto.id.as_ref(), "id", adapter)?;
        let login = require_text(dto.login.as_deref(), "login", adapter)?;

        let joined_date = match dto.created_at.as_deref() {
            Some(created_at) => resolve_joined_date(Some(created_at), adapter, &self.policy, ctx),
            None => JoinedDate::NotProvided,
        };

        Ok(UnifiedUser {
            id: check_id(id, &id.to_string(), "id", adapter, &self.policy)?,
            name: Self::resolve_name(dto.name.as_deref(), login),
            email: Self::resolve_email(dto.email.as_deref(), login),
            avatar: get_value_or_default(dto.avatar_url.clone(), DEFAULT_AVATAR.to_string()),
            joined_date,
            source: UserSource::Github,
        })
    }
}
