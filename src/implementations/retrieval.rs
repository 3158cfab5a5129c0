use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::config::{IndexConfig, RetryPolicy};
use crate::models::retrieval::RetrievalChunk;
use crate::traits::index::{IndexClient, RetrievalError};

/// Client for an HTTP semantic-index provider. The index itself is
/// pre-built; this only queries it.
pub struct HttpIndexClient {
    http_client: reqwest::Client,
    endpoint: String,
    collection: String,
    api_key: Option<String>,
}

impl HttpIndexClient {
    pub fn new(config: &IndexConfig) -> Result<Self, RetrievalError> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| RetrievalError::Unreachable("no index endpoint configured".into()))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| RetrievalError::Unreachable(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("Authorization", format!("Bearer {}", key)),
            None => builder,
        }
    }

    fn classify_status(status: reqwest::StatusCode, body: String) -> RetrievalError {
        if status.as_u16() == 429 {
            RetrievalError::RateLimited
        } else {
            RetrievalError::Unreachable(format!("HTTP {}: {}", status, body))
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    chunks: Vec<RetrievalChunk>,
}

#[async_trait]
impl IndexClient for HttpIndexClient {
    async fn probe(&self) -> Result<(), RetrievalError> {
        let url = format!("{}/collections/{}", self.endpoint, self.collection);
        debug!("Probing index collection at {}", url);

        let response = self
            .authorize(self.http_client.get(&url))
            .send()
            .await
            .map_err(|e| RetrievalError::Unreachable(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(Self::classify_status(status, body))
        }
    }

    async fn search(&self, text: &str, k: usize) -> Result<Vec<RetrievalChunk>, RetrievalError> {
        let url = format!("{}/collections/{}/query", self.endpoint, self.collection);
        let request = serde_json::json!({ "text": text, "k": k });

        let response = self
            .authorize(self.http_client.post(&url))
            .json(&request)
            .send()
            .await
            .map_err(|e| RetrievalError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_status(status, body));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::InvalidResponse(e.to_string()))?;

        Ok(parsed.chunks)
    }
}

/// Access to the pre-built semantic index with a bounded retry policy.
///
/// The connection is process-wide shared state, read-only once
/// established: the first caller to need it wins the initialization and
/// concurrent callers await the same outcome. Retrieval is an
/// enrichment, not a correctness requirement: every failure path
/// degrades to an empty result instead of surfacing to the pipeline.
///
/// Queries are plain futures, so callers needing a bound wrap them in
/// `tokio::time::timeout`; cancelling mid-backoff is the final failure
/// for that call.
pub struct RetrievalService {
    client: Arc<dyn IndexClient>,
    policy: RetryPolicy,
    default_k: usize,
    connection: OnceCell<()>,
}

impl RetrievalService {
    pub fn new(client: Arc<dyn IndexClient>, policy: RetryPolicy, default_k: usize) -> Self {
        Self {
            client,
            policy,
            default_k,
            connection: OnceCell::new(),
        }
    }

    pub fn default_k(&self) -> usize {
        self.default_k
    }

    /// Establish the index connection. Idempotent: once initialized,
    /// later calls are no-ops returning true. A failed attempt leaves
    /// the connection unset so a later call may try again.
    pub async fn initialize(&self) -> bool {
        if self.connection.initialized() {
            return true;
        }

        let result = self
            .connection
            .get_or_try_init(|| async {
                info!("Initializing semantic index connection");
                self.client.probe().await
            })
            .await;

        match result {
            Ok(_) => true,
            Err(e) => {
                warn!("Failed to initialize semantic index: {}", e);
                false
            }
        }
    }

    /// Top-k similarity query. Returns an empty sequence when the index
    /// is uninitialized or the provider keeps failing; the calling
    /// stage must never be aborted by retrieval.
    pub async fn query(&self, text: &str, k: usize) -> Vec<RetrievalChunk> {
        if !self.initialize().await {
            return Vec::new();
        }

        match self.search_with_retry(text, k).await {
            Ok(chunks) => chunks,
            Err(RetrievalError::RateLimited) => {
                warn!("Index query still rate-limited after {} attempts; returning empty context",
                    self.policy.max_attempts);
                Vec::new()
            }
            Err(e) => {
                warn!("Index query failed: {}; returning empty context", e);
                Vec::new()
            }
        }
    }

    /// Retry loop around the provider call. Only the rate-limit error
    /// class is retried; anything else aborts immediately.
    async fn search_with_retry(
        &self,
        text: &str,
        k: usize,
    ) -> Result<Vec<RetrievalChunk>, RetrievalError> {
        let mut attempt = 0u32;
        loop {
            match self.client.search(text, k).await {
                Ok(chunks) => return Ok(chunks),
                Err(RetrievalError::RateLimited) => {
                    attempt += 1;
                    if attempt >= self.policy.max_attempts {
                        return Err(RetrievalError::RateLimited);
                    }
                    let delay = self.policy.delay_for_attempt(attempt - 1);
                    debug!(
                        "Rate-limited on attempt {}/{}; backing off {:?}",
                        attempt, self.policy.max_attempts, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Format retrieved chunks into a context block for prompt
    /// enrichment. Empty string when nothing was retrieved.
    pub async fn context_for(&self, text: &str, k: usize) -> String {
        let chunks = self.query(text, k).await;
        if chunks.is_empty() {
            return String::new();
        }

        let mut parts = vec!["**Relevant context from the knowledge base:**".to_string()];
        for (i, chunk) in chunks.iter().enumerate() {
            parts.push(format!("[Context {}: {}]", i + 1, chunk.source));
            parts.push(chunk.content.trim().to_string());
        }
        parts.join("\n")
    }
}
