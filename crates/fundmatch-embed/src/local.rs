//! In-process sentence-transformer embeddings via `fastembed`.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use fundmatch_core::{EmbeddingConfig, FundmatchError};

use crate::provider::EmbeddingProvider;

/// Local ONNX embedding model.
///
/// Inference needs exclusive access to the model, so it sits behind a mutex
/// and runs on the blocking thread pool.
pub struct LocalEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
    model_name: String,
}

impl std::fmt::Debug for LocalEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalEmbedder")
            .field("model", &self.model_name)
            .finish_non_exhaustive()
    }
}

/// Map a sentence-transformers model name onto a bundled `fastembed` model.
///
/// Accepts names with or without the `sentence-transformers/` prefix.
///
/// # Errors
///
/// Returns [`FundmatchError::Config`] for models `fastembed` does not ship.
pub fn resolve_model(name: &str) -> Result<EmbeddingModel, FundmatchError> {
    let short = name
        .strip_prefix("sentence-transformers/")
        .or_else(|| name.strip_prefix("intfloat/"))
        .or_else(|| name.strip_prefix("BAAI/"))
        .unwrap_or(name);
    match short.to_ascii_lowercase().as_str() {
        "paraphrase-multilingual-minilm-l12-v2" => Ok(EmbeddingModel::ParaphraseMLMiniLML12V2),
        "paraphrase-multilingual-mpnet-base-v2" => Ok(EmbeddingModel::ParaphraseMLMpnetBaseV2),
        "all-minilm-l6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "multilingual-e5-large" => Ok(EmbeddingModel::MultilingualE5Large),
        "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        _ => Err(FundmatchError::Config(format!(
            "embedding model '{name}' is not available locally; use provider = \"openai\" for hosted models"
        ))),
    }
}

impl LocalEmbedder {
    /// Load (downloading on first use) the model named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FundmatchError::Config`] for an unknown model and
    /// [`FundmatchError::Embedding`] if the model fails to initialise.
    pub fn with_config(config: &EmbeddingConfig) -> Result<Self, FundmatchError> {
        let model = resolve_model(&config.model)?;
        let mut options = InitOptions::new(model).with_show_download_progress(false);
        if let Some(dir) = &config.cache_dir {
            options = options.with_cache_dir(dir.clone());
        }

        let started = Instant::now();
        let embedding = TextEmbedding::try_new(options).map_err(|e| {
            FundmatchError::Embedding(format!(
                "failed to initialise local model '{}': {e}",
                config.model
            ))
        })?;
        log::info!(
            "loaded local embedding model {} in {:?}",
            config.model,
            started.elapsed()
        );

        Ok(Self {
            model: Arc::new(Mutex::new(embedding)),
            model_name: config.model.clone(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbedder {
    fn model(&self) -> &str {
        &self.model_name
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, FundmatchError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();
        let count = texts.len();

        let embeddings = tokio::task::spawn_blocking(move || {
            let mut guard = model
                .lock()
                .map_err(|_| FundmatchError::Embedding("local model lock poisoned".into()))?;
            guard
                .embed(texts, None)
                .map_err(|e| FundmatchError::Embedding(format!("local inference failed: {e}")))
        })
        .await
        .map_err(|e| FundmatchError::Task(e.to_string()))??;

        if embeddings.len() != count {
            return Err(FundmatchError::Embedding(format!(
                "local model returned {} vectors for {count} inputs",
                embeddings.len()
            )));
        }
        log::debug!("embedded {count} texts locally");
        Ok(embeddings)
    }
}
