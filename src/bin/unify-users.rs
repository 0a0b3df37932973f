//! Loads the sample batches from every source and prints the unified users
//! as JSON.
//!
//! ```text
//! RUST_LOG=user_unifier=debug cargo run --bin unify-users
//! ```

use user_unifier::logging::{init_tracing, install_panic_hook};
use user_unifier::mock::MockBatchProvider;
use user_unifier::{AggregationExecutor, UserDataService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    install_panic_hook();

    let service = UserDataService::new();
    let stats = service
        .load_from(&MockBatchProvider, &AggregationExecutor::new(4))
        .await?;

    tracing::info!(
        succeeded = stats.succeeded,
        failed = stats.failed,
        duration_ms = stats.total_duration_ms,
        "Aggregation finished"
    );

    println!("{}", serde_json::to_string_pretty(service.all_users().as_ref())?);
    for error in service.errors().iter() {
        eprintln!("{error}");
    }
    Ok(())
}
