use crate::adapt::pipeline::{AdaptBatch, AggregationPipeline, AggregationReport};
use crate::adapt::traits::AdaptContext;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{info, instrument};

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Semaphore error: {0}")]
    Semaphore(String),
    #[error("Batch task failed: {0}")]
    Join(String),
}

/// Adapts batches concurrently on blocking tasks.
///
/// At most `concurrency_limit` batches run at once. Each batch fills its own
/// buffer and the buffers are merged back in the original batch order, so
/// the report equals what [`AggregationPipeline::run`] would produce.
pub struct AggregationExecutor {
    semaphore: Arc<Semaphore>,
}

impl AggregationExecutor {
    pub fn new(concurrency_limit: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency_limit.max(1))),
        }
    }

    #[instrument(skip(self, pipeline, batches), fields(batches = batches.len()))]
    pub async fn execute(
        &self,
        pipeline: &AggregationPipeline,
        batches: Vec<Arc<dyn AdaptBatch>>,
    ) -> Result<AggregationReport, ExecutorError> {
        let start = Instant::now();
        let now = pipeline.reference_time();
        let mut tasks = Vec::with_capacity(batches.len());

        for batch in batches {
            let permit = Arc::clone(&self.semaphore)
                .acquire_owned()
                .await
                .map_err(|e| ExecutorError::Semaphore(e.to_string()))?;
            let diagnostics = pipeline.diagnostics();

            info!(source = batch.source_name(), records = batch.len(), "Starting batch adaptation");

            tasks.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                let ctx = AdaptContext::at(now, diagnostics.as_ref());
                batch.adapt_all(&ctx)
            }));
        }

        // Await in spawn order to keep batch order
        let mut outcomes = Vec::with_capacity(tasks.len());
        for task in tasks {
            let outcome = task
                .await
                .map_err(|e| ExecutorError::Join(e.to_string()))?;
            info!(
                source = %outcome.source_name,
                succeeded = outcome.users.len(),
                failed = outcome.failures.len(),
                "Finished batch adaptation"
            );
            outcomes.push(outcome);
        }

        Ok(pipeline.assemble(outcomes, start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapt::pipeline::SourceBatch;
    use crate::adapt::sources::{GithubUserAdapter, TwitterUserAdapter};
    use crate::diagnostics::{DiagnosticSink, MemorySink};
    use crate::mock;
    use crate::model::{GithubUserDto, TwitterUserDto};
    use chrono::Utc;

    fn pipeline() -> AggregationPipeline {
        let sink: Arc<dyn DiagnosticSink> = Arc::new(MemorySink::new());
        AggregationPipeline::new()
            .with_diagnostics(sink)
            .with_reference_time(Utc::now())
    }

    fn mixed_batches() -> Vec<Arc<dyn AdaptBatch>> {
        let github: Vec<_> = (1..=50)
            .map(|id| GithubUserDto {
                id: Some(id),
                login: if id % 7 == 0 { None } else { Some(format!("user{id}")) },
                ..Default::default()
            })
            .collect();
        let twitter: Vec<_> = (1..=50)
            .map(|id| TwitterUserDto {
                id_str: Some(if id % 5 == 0 { "x".to_string() } else { id.to_string() }),
                screen_name: Some(format!("handle{id}")),
                ..Default::default()
            })
            .collect();

        let mut batches = mock::mock_batches();
        batches.push(SourceBatch::new(GithubUserAdapter::new(), github).into_handle());
        batches.push(SourceBatch::new(TwitterUserAdapter::new(), twitter).into_handle());
        batches
    }

    #[tokio::test]
    async fn test_parallel_matches_sequential() {
        let pipeline = pipeline();
        let batches = mixed_batches();

        let sequential = pipeline.run(&batches);
        let parallel = AggregationExecutor::new(3)
            .execute(&pipeline, batches)
            .await
            .unwrap();

        assert_eq!(parallel.unified, sequential.unified);
        assert_eq!(parallel.errors, sequential.errors);
        assert_eq!(parallel.stats.per_source, sequential.stats.per_source);
        assert_eq!(parallel.stats.failed, 7 + 10);
    }

    #[tokio::test]
    async fn test_single_permit_still_completes() {
        let pipeline = pipeline();
        let report = AggregationExecutor::new(1)
            .execute(&pipeline, mock::mock_batches())
            .await
            .unwrap();

        assert_eq!(report.unified.len(), 4);
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn test_zero_limit_is_clamped() {
        let report = AggregationExecutor::new(0)
            .execute(&pipeline(), mock::mock_batches())
            .await
            .unwrap();
        assert_eq!(report.stats.succeeded, 4);
    }
}
