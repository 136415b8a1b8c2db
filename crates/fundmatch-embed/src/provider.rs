use std::sync::Arc;

use async_trait::async_trait;
use fundmatch_core::{EmbeddingConfig, FundmatchError};

use crate::local::LocalEmbedder;
use crate::remote::RemoteEmbedder;

/// Anything that turns text into fixed-length vectors.
///
/// Implementations must return one vector per input, in input order, all of
/// the same dimensionality.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier, for logs and diagnostics.
    fn model(&self) -> &str;

    /// Embed a batch of texts.
    ///
    /// # Errors
    ///
    /// Returns [`FundmatchError::Embedding`] if the model or API fails.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, FundmatchError>;

    /// Embed a single text.
    ///
    /// # Errors
    ///
    /// Returns [`FundmatchError::Embedding`] if the model or API fails or
    /// returns no vector.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, FundmatchError> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| FundmatchError::Embedding("provider returned no embedding".into()))
    }
}

/// Build the provider named by `config.provider`.
///
/// # Errors
///
/// Returns [`FundmatchError::Config`] for an unknown provider or a missing
/// API key, and [`FundmatchError::Embedding`] if the local model cannot be
/// loaded.
pub fn provider_from_config(
    config: &EmbeddingConfig,
) -> Result<Arc<dyn EmbeddingProvider>, FundmatchError> {
    match config.provider.as_str() {
        "local" | "fastembed" => Ok(Arc::new(LocalEmbedder::with_config(config)?)),
        "openai" | "remote" => Ok(Arc::new(RemoteEmbedder::with_config(config)?)),
        other => Err(FundmatchError::Config(format!(
            "unknown embedding provider '{other}' (expected \"local\" or \"openai\")"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl EmbeddingProvider for Echo {
        fn model(&self) -> &str {
            "echo"
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, FundmatchError> {
            Ok(texts.iter().map(|t| vec![t.len() as f32]).collect())
        }
    }

    struct Silent;

    #[async_trait]
    impl EmbeddingProvider for Silent {
        fn model(&self) -> &str {
            "silent"
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, FundmatchError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn embed_query_uses_batch() {
        let v = Echo.embed_query("four").await.unwrap();
        assert_eq!(v, vec![4.0]);
    }

    #[tokio::test]
    async fn embed_query_errors_on_empty_response() {
        let err = Silent.embed_query("x").await.unwrap_err();
        assert!(err.to_string().contains("no embedding"));
    }

    #[test]
    fn unknown_provider_is_config_error() {
        let config = EmbeddingConfig {
            provider: "voyage".into(),
            ..EmbeddingConfig::default()
        };
        let err = provider_from_config(&config).err().unwrap();
        assert!(matches!(err, FundmatchError::Config(_)));
        assert!(err.to_string().contains("voyage"));
    }
}
