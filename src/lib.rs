pub mod adapt;
pub mod diagnostics;
pub mod executor;
pub mod logging;
pub mod mock;
pub mod model;
pub mod service;
pub mod store;
pub mod traits;

// Re-export common types for convenience
pub use adapt::{
    AdaptBatch, AdaptContext, AdaptationFailure, AggregationPipeline, AggregationReport,
    SourceBatch, SourcePolicy, UserAdapter, ValidationError,
};
pub use executor::*;
pub use model::*;
pub use service::{LoadError, UserDataService};
pub use store::{UserStore, UsersHandle};
pub use traits::*;
