use crate::adapt::pipeline::AdaptBatch;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Source '{source_name}' unavailable: {reason}")]
    Unavailable { source_name: String, reason: String },
    #[error("Invalid batch content: {0}")]
    InvalidContent(#[from] serde_json::Error),
    #[error("Unknown error: {0}")]
    Unknown(String),
}

#[async_trait]
pub trait BatchProvider: Send + Sync {
    /// Returns the identifier of this provider (e.g., "mock").
    fn provider_id(&self) -> &str;

    /// Supplies one raw batch per source, in the order they should be aggregated.
    async fn batches(&self) -> Result<Vec<Arc<dyn AdaptBatch>>, ProviderError>;
}
