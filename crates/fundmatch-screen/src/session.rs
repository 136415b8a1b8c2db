//! The screening session: everything the views read, built once per process.

use std::sync::Arc;
use std::time::Instant;

use fundmatch_core::{Dataset, FundingCall, FundmatchError, ScreeningConfig, Site};
use fundmatch_embed::EmbeddingProvider;
use fundmatch_rank::{CompetencySet, MatchCell, SimilarityMatrix};
use tokio::task::JoinHandle;

use crate::input::{IndexKind, InputWarning};

/// Loaded dataset, similarity matrix, embedded competency vocabulary and the
/// embedder used for free-text queries.
///
/// Everything except the embedder is immutable after construction and shared
/// through `Arc`, so background tasks can read it without locks.
pub struct ScreeningSession {
    dataset: Arc<Dataset>,
    matrix: Arc<SimilarityMatrix>,
    competencies: Arc<CompetencySet>,
    embedder: Arc<dyn EmbeddingProvider>,
    settings: ScreeningConfig,
}

impl std::fmt::Debug for ScreeningSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreeningSession")
            .field("calls", &self.dataset.calls().len())
            .field("sites", &self.dataset.sites().len())
            .field("competencies", &self.competencies.len())
            .field("model", &self.embedder.model())
            .finish_non_exhaustive()
    }
}

impl ScreeningSession {
    /// Build the similarity matrix and embed the competency vocabulary.
    ///
    /// # Errors
    ///
    /// Returns [`FundmatchError::Embedding`] if the vocabulary cannot be
    /// embedded, and [`FundmatchError::Dataset`] if the embedder's vectors
    /// do not have the dataset's dimensionality.
    pub async fn new(
        dataset: Dataset,
        competency_terms: &[String],
        embedder: Arc<dyn EmbeddingProvider>,
        settings: ScreeningConfig,
    ) -> Result<Self, FundmatchError> {
        let started = Instant::now();
        let matrix = SimilarityMatrix::build(dataset.calls(), dataset.sites());

        let vectors = embedder.embed_batch(competency_terms).await?;
        if vectors.len() != competency_terms.len() {
            return Err(FundmatchError::Embedding(format!(
                "embedded {} of {} competencies",
                vectors.len(),
                competency_terms.len()
            )));
        }
        let competencies = CompetencySet::from_pairs(competency_terms, vectors);

        if let (Some(expected), false) = (dataset.dimensions(), competencies.is_empty()) {
            match competencies.dimensions() {
                Some(actual) if actual == expected => {}
                Some(actual) => {
                    return Err(FundmatchError::Dataset(format!(
                        "model '{}' produces {actual}-dimensional vectors but the dataset has {expected}; \
                         embedding.model must be the model that embedded the dataset",
                        embedder.model()
                    )));
                }
                None => {
                    return Err(FundmatchError::Embedding(
                        "competency embeddings have mixed dimensions".into(),
                    ));
                }
            }
        }

        let (sites, calls) = matrix.shape();
        log::info!(
            "screening session ready: {calls} calls x {sites} sites, {} competencies ({:?})",
            competencies.len(),
            started.elapsed()
        );

        Ok(Self {
            dataset: Arc::new(dataset),
            matrix: Arc::new(matrix),
            competencies: Arc::new(competencies),
            embedder,
            settings,
        })
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    pub fn competencies(&self) -> &CompetencySet {
        &self.competencies
    }

    pub fn settings(&self) -> &ScreeningConfig {
        &self.settings
    }

    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    pub fn calls(&self) -> &[FundingCall] {
        self.dataset.calls()
    }

    pub fn sites(&self) -> &[Site] {
        self.dataset.sites()
    }

    /// Look up a call, or the warning to show for a bad number.
    pub fn call(&self, index: usize) -> Result<&FundingCall, InputWarning> {
        self.calls().get(index).ok_or(InputWarning::OutOfRange {
            target: IndexKind::Call,
            len: self.calls().len(),
        })
    }

    /// Look up a site, or the warning to show for a bad number.
    pub fn site(&self, index: usize) -> Result<&Site, InputWarning> {
        self.sites().get(index).ok_or(InputWarning::OutOfRange {
            target: IndexKind::Site,
            len: self.sites().len(),
        })
    }

    /// Embed a free-text query and check it lives in the dataset's space.
    ///
    /// # Errors
    ///
    /// Returns [`FundmatchError::Embedding`] on provider failure or a
    /// dimensionality mismatch.
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>, FundmatchError> {
        let vector = self.embedder.embed_query(text).await?;
        if let Some(expected) = self.dataset.dimensions() {
            if vector.len() != expected {
                return Err(FundmatchError::Embedding(format!(
                    "query embedding has {} dimensions, dataset has {expected}",
                    vector.len()
                )));
            }
        }
        Ok(vector)
    }

    /// Start the whole-matrix top-`k` scan on the blocking pool.
    ///
    /// The scan cannot be cancelled; await the returned task before issuing
    /// the next request.
    pub fn spawn_top_cells(&self, k: usize) -> TopCellsTask {
        let matrix = Arc::clone(&self.matrix);
        log::debug!("starting global top-{k} scan");
        let handle = tokio::task::spawn_blocking(move || {
            let started = Instant::now();
            let cells = matrix.top_cells(k);
            log::debug!(
                "global top-{k} scan finished in {:?}",
                started.elapsed()
            );
            cells
        });
        TopCellsTask { handle }
    }
}

/// Handle to a running whole-matrix scan.
#[derive(Debug)]
pub struct TopCellsTask {
    handle: JoinHandle<Vec<MatchCell>>,
}

impl TopCellsTask {
    /// Wait for the scan to finish.
    ///
    /// # Errors
    ///
    /// Returns [`FundmatchError::Task`] if the scan panicked.
    pub async fn wait(self) -> Result<Vec<MatchCell>, FundmatchError> {
        self.handle
            .await
            .map_err(|e| FundmatchError::Task(e.to_string()))
    }
}
