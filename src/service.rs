//! Consumer-facing user data service.
//!
//! Owns the [`UserStore`] and is its only writer. A UI layer triggers loads
//! and reads the current users through [`UserDataService::all_users`] or a
//! [`UsersHandle`].

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::adapt::pipeline::{AdaptBatch, AdaptationFailure, AggregationPipeline, AggregationStats};
use crate::executor::{AggregationExecutor, ExecutorError};
use crate::mock;
use crate::model::UnifiedUser;
use crate::store::{UserStore, UsersHandle};
use crate::traits::{BatchProvider, ProviderError};

/// Errors from [`UserDataService::load_from`].
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Provider failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Aggregation failed: {0}")]
    Executor(#[from] ExecutorError),
}

/// Runs aggregations and publishes their results.
pub struct UserDataService {
    store: UserStore,
    pipeline: AggregationPipeline,
}

impl UserDataService {
    pub fn new() -> Self {
        Self::with_pipeline(AggregationPipeline::new())
    }

    pub fn with_pipeline(pipeline: AggregationPipeline) -> Self {
        Self {
            store: UserStore::new(),
            pipeline,
        }
    }

    /// Aggregates the static sample batches and publishes the result.
    pub fn load_mock_data(&self) -> AggregationStats {
        self.load(&mock::mock_batches())
    }

    /// Aggregates `batches` and publishes the result, replacing the previous
    /// users and errors.
    pub fn load(&self, batches: &[Arc<dyn AdaptBatch>]) -> AggregationStats {
        let report = self.pipeline.run(batches);
        let stats = report.stats.clone();
        self.store.publish(report);
        stats
    }

    /// Fetches batches from `provider`, adapts them concurrently and
    /// publishes the result.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the provider fails or a batch task cannot
    /// be joined. The published state is left untouched in that case.
    pub async fn load_from<P>(
        &self,
        provider: &P,
        executor: &AggregationExecutor,
    ) -> Result<AggregationStats, LoadError>
    where
        P: BatchProvider + ?Sized,
    {
        info!(provider = provider.provider_id(), "Loading batches");
        let batches = provider.batches().await?;
        let report = executor.execute(&self.pipeline, batches).await?;
        let stats = report.stats.clone();
        self.store.publish(report);
        Ok(stats)
    }

    /// Users from the latest run; empty before the first one.
    pub fn all_users(&self) -> Arc<Vec<UnifiedUser>> {
        self.store.users()
    }

    /// Failures from the latest run.
    pub fn errors(&self) -> Arc<Vec<AdaptationFailure>> {
        self.store.errors()
    }

    pub fn users_handle(&self) -> UsersHandle {
        self.store.handle()
    }
}

impl Default for UserDataService {
    fn default() -> Self {
        Self::new()
    }
}
