use thiserror::Error;

/// Failure talking to a backing store.
///
/// Errors are never retried or partially recovered; callers see the first
/// failure and decide how to report it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store connection failed: {0}")]
    Connection(String),

    #[error("Store query failed: {0}")]
    Query(String),
}
