//! OpenAI-compatible embedding API client.
//!
//! Works with any server exposing `POST {base_url}/embeddings` with the
//! OpenAI request and response shape (OpenAI itself, a local
//! text-embeddings-inference or vLLM server, and similar).

use async_trait::async_trait;
use fundmatch_core::{EmbeddingConfig, FundmatchError};
use serde::{Deserialize, Serialize};

use crate::provider::EmbeddingProvider;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const API_KEY_ENV: &str = "FUNDMATCH_EMBEDDING_API_KEY";
const FALLBACK_API_KEY_ENV: &str = "OPENAI_API_KEY";
const BATCH_SIZE: usize = 64;

/// Client for an OpenAI-compatible embeddings endpoint.
///
/// # Examples
///
/// ```
/// use fundmatch_embed::remote::RemoteEmbedder;
///
/// let client = RemoteEmbedder::new("test-key", "text-embedding-3-small");
/// assert_eq!(client.base_url(), "https://api.openai.com/v1");
/// ```
pub struct RemoteEmbedder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for RemoteEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteEmbedder")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedDataItem>,
}

#[derive(Deserialize)]
struct EmbedDataItem {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

impl RemoteEmbedder {
    /// Create a client for the default OpenAI endpoint.
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.to_string(),
        }
    }

    /// Create a client from an [`EmbeddingConfig`].
    ///
    /// Falls back to the `FUNDMATCH_EMBEDDING_API_KEY`, then `OPENAI_API_KEY`
    /// env vars if no key is configured.
    ///
    /// # Errors
    ///
    /// Returns [`FundmatchError::Config`] if no API key is available.
    pub fn with_config(config: &EmbeddingConfig) -> Result<Self, FundmatchError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .or_else(|| std::env::var(FALLBACK_API_KEY_ENV).ok())
            .ok_or_else(|| {
                FundmatchError::Config(format!(
                    "embedding API key not found: set embedding.api_key in .fundmatch.toml or {API_KEY_ENV}"
                ))
            })?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: config.model.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request(&self, batch: &[String]) -> Result<Vec<Vec<f32>>, FundmatchError> {
        let request = EmbedRequest {
            model: &self.model,
            input: batch,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| FundmatchError::Embedding(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".into());
            return Err(FundmatchError::Embedding(format!(
                "embedding API returned {status}: {body}"
            )));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| FundmatchError::Embedding(format!("failed to parse response: {e}")))?;

        order_embeddings(body, batch.len())
    }
}

/// Put response items back in input order and check the count.
fn order_embeddings(
    response: EmbedResponse,
    expected: usize,
) -> Result<Vec<Vec<f32>>, FundmatchError> {
    if response.data.len() != expected {
        return Err(FundmatchError::Embedding(format!(
            "embedding API returned {} vectors for {expected} inputs",
            response.data.len()
        )));
    }
    let mut items = response.data;
    if items.iter().all(|item| item.index.is_some()) {
        items.sort_by_key(|item| item.index);
    }
    Ok(items.into_iter().map(|item| item.embedding).collect())
}

#[async_trait]
impl EmbeddingProvider for RemoteEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, FundmatchError> {
        let mut all = Vec::with_capacity(texts.len());
        for batch in texts.chunks(BATCH_SIZE) {
            all.extend(self.request(batch).await?);
        }
        log::debug!("embedded {} texts via {}", texts.len(), self.base_url);
        Ok(all)
    }
}
