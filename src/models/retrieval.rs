use serde::{Deserialize, Serialize};

/// A unit of contextual text returned by the semantic index. Consumed
/// transiently to enrich a role's generation context; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalChunk {
    pub content: String,
    /// Reference to the originating document.
    pub source: String,
}
