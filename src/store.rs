//! Single-writer store holding the latest aggregation result.
//!
//! [`UserStore`] is owned by whoever runs aggregations and is the only way to
//! publish. Consumers get a cloneable, read-only [`UsersHandle`]. Reads hand
//! out the published `Arc` itself, so two reads with no publish in between
//! are pointer-equal (`Arc::ptr_eq`), which lets consumers detect "no change"
//! cheaply.

use std::sync::{Arc, PoisonError, RwLock};

use crate::adapt::pipeline::{AdaptationFailure, AggregationReport};
use crate::model::UnifiedUser;

#[derive(Debug, Default)]
struct Snapshot {
    users: Arc<Vec<UnifiedUser>>,
    errors: Arc<Vec<AdaptationFailure>>,
}

/// Writable side of the store.
#[derive(Debug, Default)]
pub struct UserStore {
    inner: Arc<RwLock<Snapshot>>,
}

impl UserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces users and errors together with the content of `report`.
    /// Previous results are discarded, never merged.
    pub fn publish(&self, report: AggregationReport) {
        let next = Snapshot {
            users: Arc::new(report.unified),
            errors: Arc::new(report.errors),
        };
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    pub fn users(&self) -> Arc<Vec<UnifiedUser>> {
        read_users(&self.inner)
    }

    pub fn errors(&self) -> Arc<Vec<AdaptationFailure>> {
        read_errors(&self.inner)
    }

    /// Read-only view sharing this store's state.
    pub fn handle(&self) -> UsersHandle {
        UsersHandle {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Read-only view of a [`UserStore`].
#[derive(Debug, Clone)]
pub struct UsersHandle {
    inner: Arc<RwLock<Snapshot>>,
}

impl UsersHandle {
    /// Latest published users (empty before the first publish).
    pub fn get(&self) -> Arc<Vec<UnifiedUser>> {
        read_users(&self.inner)
    }

    pub fn errors(&self) -> Arc<Vec<AdaptationFailure>> {
        read_errors(&self.inner)
    }
}

fn read_users(inner: &RwLock<Snapshot>) -> Arc<Vec<UnifiedUser>> {
    Arc::clone(&inner.read().unwrap_or_else(PoisonError::into_inner).users)
}

fn read_errors(inner: &RwLock<Snapshot>) -> Arc<Vec<AdaptationFailure>> {
    Arc::clone(&inner.read().unwrap_or_else(PoisonError::into_inner).errors)
}
