use async_trait::async_trait;
use thiserror::Error;

use crate::models::retrieval::RetrievalChunk;

/// Failure classes for index providers. Only `RateLimited` is
/// transient enough to retry; everything else aborts the attempt.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The provider rejected the call with a rate-limit signal.
    #[error("Index provider rate-limited the request")]
    RateLimited,

    #[error("Index provider unreachable: {0}")]
    Unreachable(String),

    #[error("Index provider returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("Index connection is not initialized")]
    Uninitialized,
}

/// Transport to a pre-built semantic index. Implemented by the HTTP
/// provider in production and by scripted clients in tests.
#[async_trait]
pub trait IndexClient: Send + Sync {
    /// Check that the index is reachable and the collection exists.
    async fn probe(&self) -> Result<(), RetrievalError>;

    /// Return the top-k chunks nearest to the query text.
    async fn search(&self, text: &str, k: usize) -> Result<Vec<RetrievalChunk>, RetrievalError>;
}
