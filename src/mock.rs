//! Static sample data: one record per source, the set loaded by
//! [`UserDataService::load_mock_data`](crate::service::UserDataService::load_mock_data).

use async_trait::async_trait;
use std::sync::Arc;

use crate::adapt::pipeline::{AdaptBatch, SourceBatch};
use crate::adapt::sources::{
    GithubUserAdapter, InternalUserAdapter, JsonplaceholderUserAdapter, TwitterUserAdapter,
};
use crate::model::{GithubUserDto, InternalUserDto, JsonplaceholderUserDto, TwitterUserDto};
use crate::traits::{BatchProvider, ProviderError};

pub fn github_users() -> Vec<GithubUserDto> {
    vec![GithubUserDto {
        id: Some(1),
        login: Some("octocat".to_string()),
        name: Some("The Octocat".to_string()),
        email: Some("octocat@github.com".to_string()),
        avatar_url: Some("https://avatars.githubusercontent.com/u/583231".to_string()),
        created_at: Some("2011-01-25T18:44:36Z".to_string()),
    }]
}

pub fn internal_users() -> Vec<InternalUserDto> {
    vec![InternalUserDto {
        user_id: Some("101".to_string()),
        full_name: Some("María González".to_string()),
        email_address: Some("maria@company.com".to_string()),
        profile_image: Some("https://i.pravatar.cc/150?img=5".to_string()),
        registered_at: Some("2023-06-15T10:30:00Z".to_string()),
    }]
}

pub fn jsonplaceholder_users() -> Vec<JsonplaceholderUserDto> {
    vec![JsonplaceholderUserDto {
        id: Some(1),
        name: Some("Leanne Graham".to_string()),
        username: Some("Bret".to_string()),
        email: Some("leanne@example.com".to_string()),
    }]
}

pub fn twitter_users() -> Vec<TwitterUserDto> {
    vec![TwitterUserDto {
        id_str: Some("783214".to_string()),
        screen_name: Some("elonmusk".to_string()),
        name: Some("Elon Musk".to_string()),
        profile_image_url_https: Some(
            "https://pbs.twimg.com/profile_images/1683325380441128960/yRsRRjGO_normal.jpg"
                .to_string(),
        ),
        created_at: Some("Tue Jun 02 20:12:29 +0000 2009".to_string()),
        verified: Some(true),
        followers_count: Some(150_000_000),
        description: None,
    }]
}

/// The four sample batches in aggregation order: GitHub, Internal,
/// JSONPlaceholder, Twitter.
pub fn mock_batches() -> Vec<Arc<dyn AdaptBatch>> {
    vec![
        SourceBatch::new(GithubUserAdapter::new(), github_users()).into_handle(),
        SourceBatch::new(InternalUserAdapter::new(), internal_users()).into_handle(),
        SourceBatch::new(JsonplaceholderUserAdapter::new(), jsonplaceholder_users()).into_handle(),
        SourceBatch::new(TwitterUserAdapter::new(), twitter_users()).into_handle(),
    ]
}

/// [`BatchProvider`] serving [`mock_batches`].
#[derive(Debug, Default, Clone, Copy)]
pub struct MockBatchProvider;

#[async_trait]
impl BatchProvider for MockBatchProvider {
    fn provider_id(&self) -> &str {
        "mock"
    }

    async fn batches(&self) -> Result<Vec<Arc<dyn AdaptBatch>>, ProviderError> {
        Ok(mock_batches())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_serves_four_batches() {
        let provider = MockBatchProvider;
        let batches = provider.batches().await.unwrap();

        let names: Vec<_> = batches.iter().map(|b| b.display_name().to_string()).collect();
        assert_eq!(names, vec!["GitHub", "Internal", "JSONPlaceholder", "Twitter"]);
        assert!(batches.iter().all(|b| b.len() == 1));
        assert_eq!(provider.provider_id(), "mock");
    }
}
