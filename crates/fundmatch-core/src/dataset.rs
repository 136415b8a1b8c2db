//! The precomputed `[calls, sites]` embedding file.

use std::path::Path;
use std::time::Instant;

use crate::error::FundmatchError;
use crate::types::{FundingCall, Site};

/// Funding calls and sites with their embeddings, validated on load.
///
/// Every call and site embedding has the same, non-zero dimensionality and
/// every site has at least one scraped page.
///
/// # Examples
///
/// ```
/// use fundmatch_core::Dataset;
///
/// let json = r#"[
///     [{"Title": "AI Research", "URL": "https://example.eu/1", "Title_Embedding": [1.0, 0.0]}],
///     [{"scraped": [["home", {"Title": "Acme", "URL": "https://acme.example"}]],
///       "Summary_Embedding": [1.0, 0.0]}]
/// ]"#;
/// let dataset = Dataset::from_json(json).unwrap();
/// assert_eq!(dataset.calls().len(), 1);
/// assert_eq!(dataset.dimensions(), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct Dataset {
    calls: Vec<FundingCall>,
    sites: Vec<Site>,
    dimensions: Option<usize>,
}

impl Dataset {
    /// Build a dataset from already-decoded records.
    ///
    /// # Errors
    ///
    /// Returns [`FundmatchError::Dataset`] if an embedding is empty, the
    /// dimensionalities disagree, or a site has no scraped pages.
    pub fn new(calls: Vec<FundingCall>, sites: Vec<Site>) -> Result<Self, FundmatchError> {
        let mut dimensions: Option<usize> = None;
        let mut check = |what: &str, index: usize, len: usize| -> Result<(), FundmatchError> {
            if len == 0 {
                return Err(FundmatchError::Dataset(format!(
                    "{what} #{index} has an empty embedding"
                )));
            }
            match dimensions {
                None => dimensions = Some(len),
                Some(expected) if expected != len => {
                    return Err(FundmatchError::Dataset(format!(
                        "{what} #{index} has {len} dimensions, expected {expected}"
                    )));
                }
                Some(_) => {}
            }
            Ok(())
        };

        for (i, call) in calls.iter().enumerate() {
            check("call", i, call.title_embedding.len())?;
        }
        for (i, site) in sites.iter().enumerate() {
            check("site", i, site.summary_embedding.len())?;
            if site.scraped.is_empty() {
                return Err(FundmatchError::Dataset(format!(
                    "site #{i} has no scraped pages"
                )));
            }
        }

        Ok(Self {
            calls,
            sites,
            dimensions,
        })
    }

    /// Parse the two-array JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`FundmatchError::Serialization`] for malformed JSON or missing
    /// keys, and [`FundmatchError::Dataset`] for invariant violations.
    pub fn from_json(content: &str) -> Result<Self, FundmatchError> {
        let (calls, sites): (Vec<FundingCall>, Vec<Site>) = serde_json::from_str(content)?;
        Self::new(calls, sites)
    }

    /// Read and parse the dataset file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FundmatchError::FileNotFound`] if `path` does not exist,
    /// otherwise the errors of [`Dataset::from_json`].
    pub fn load(path: &Path) -> Result<Self, FundmatchError> {
        if !path.exists() {
            return Err(FundmatchError::FileNotFound(path.to_path_buf()));
        }
        let started = Instant::now();
        let content = std::fs::read_to_string(path)?;
        let dataset = Self::from_json(&content)?;
        log::info!(
            "loaded {} calls and {} sites from {} in {:?}",
            dataset.calls.len(),
            dataset.sites.len(),
            path.display(),
            started.elapsed()
        );
        Ok(dataset)
    }

    pub fn calls(&self) -> &[FundingCall] {
        &self.calls
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Embedding dimensionality, `None` for an empty dataset.
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }
}
