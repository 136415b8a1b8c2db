use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::FundmatchError;

/// Top-level configuration loaded from `.fundmatch.toml`.
///
/// Resolution order: CLI flags > env vars > config file > defaults.
///
/// # Examples
///
/// ```
/// use fundmatch_core::FundmatchConfig;
///
/// let config = FundmatchConfig::default();
/// assert_eq!(config.screening.default_results, 10);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FundmatchConfig {
    /// Location of the precomputed embedding dataset.
    #[serde(default)]
    pub data: DataConfig,
    /// Embedding provider used for free-text queries and competencies.
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Result counts and rendering knobs.
    #[serde(default)]
    pub screening: ScreeningConfig,
    /// Competency vocabulary.
    #[serde(default)]
    pub competencies: CompetencyConfig,
}

impl FundmatchConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FundmatchError::Io`] if the file cannot be read, or
    /// [`FundmatchError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fundmatch_core::FundmatchConfig;
    /// use std::path::Path;
    ///
    /// let config = FundmatchConfig::from_file(Path::new(".fundmatch.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, FundmatchError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`FundmatchError::Toml`] if parsing fails, or
    /// [`FundmatchError::Config`] if a value is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use fundmatch_core::FundmatchConfig;
    ///
    /// let toml = r#"
    /// [screening]
    /// default_results = 25
    /// "#;
    /// let config = FundmatchConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.screening.default_results, 25);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, FundmatchError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), FundmatchError> {
        if self.competencies.terms.iter().any(|t| t.trim().is_empty()) {
            return Err(FundmatchError::Config(
                "competencies.terms must not contain blank entries".into(),
            ));
        }
        if self.screening.bar_width == 0 {
            return Err(FundmatchError::Config(
                "screening.bar_width must be at least 1".into(),
            ));
        }
        if self.screening.bar_width > MAX_BAR_WIDTH {
            return Err(FundmatchError::Config(format!(
                "screening.bar_width must be at most {MAX_BAR_WIDTH}"
            )));
        }
        Ok(())
    }
}

const MAX_BAR_WIDTH: usize = 1000;

/// Dataset location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the `[calls, sites]` JSON file (default: `all_data_embedded.json`).
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("all_data_embedded.json")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

/// Configuration for the embedding provider.
///
/// The model must be the one that produced the dataset's embeddings,
/// otherwise query vectors and stored vectors live in different spaces.
///
/// # Examples
///
/// ```
/// use fundmatch_core::EmbeddingConfig;
///
/// let config = EmbeddingConfig::default();
/// assert_eq!(config.provider, "local");
/// assert_eq!(config.model, "paraphrase-multilingual-MiniLM-L12-v2");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// `"local"` (in-process ONNX model) or `"openai"` (OpenAI-compatible HTTP API).
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    /// Model name.
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// API key for remote providers.
    pub api_key: Option<String>,
    /// Custom base URL for remote providers.
    pub base_url: Option<String>,
    /// Directory where local model files are cached.
    pub cache_dir: Option<PathBuf>,
}

fn default_embedding_provider() -> String {
    "local".into()
}

fn default_embedding_model() -> String {
    "paraphrase-multilingual-MiniLM-L12-v2".into()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            api_key: None,
            base_url: None,
            cache_dir: None,
        }
    }
}

/// Result-count and rendering settings.
///
/// # Examples
///
/// ```
/// use fundmatch_core::ScreeningConfig;
///
/// let config = ScreeningConfig::default();
/// assert_eq!(config.default_results, 10);
/// assert_eq!(config.bar_width, 100);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningConfig {
    /// Number of results used when the requested count is missing or invalid (default: 10).
    #[serde(default = "default_results")]
    pub default_results: usize,
    /// Width in characters of competency score bars (default: 100).
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,
}

fn default_results() -> usize {
    10
}

fn default_bar_width() -> usize {
    100
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            default_results: default_results(),
            bar_width: default_bar_width(),
        }
    }
}

/// The fixed competency vocabulary, embedded once per session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetencyConfig {
    /// Competency labels in tie-break order.
    #[serde(default = "default_competency_terms")]
    pub terms: Vec<String>,
}

impl Default for CompetencyConfig {
    fn default() -> Self {
        Self {
            terms: default_competency_terms(),
        }
    }
}

const DEFAULT_COMPETENCIES: &[&str] = &[
    "Artificial intelligence",
    "Machine learning",
    "Natural language processing",
    "Computer vision",
    "Robotics",
    "Internet of things",
    "Embedded systems",
    "Cybersecurity",
    "Cloud computing",
    "High performance computing",
    "Big data analytics",
    "Software engineering",
    "Digital twins",
    "Blockchain",
    "Quantum technologies",
    "Microelectronics",
    "Photonics",
    "Telecommunications and 5G",
    "Renewable energy",
    "Energy storage and batteries",
    "Hydrogen technologies",
    "Smart grids",
    "Energy efficiency in buildings",
    "Circular economy",
    "Climate change adaptation",
    "Environmental monitoring",
    "Water management",
    "Sustainable agriculture",
    "Food technology",
    "Biotechnology",
    "Medical devices",
    "Digital health",
    "Pharmaceuticals",
    "Advanced materials",
    "Additive manufacturing",
    "Industrial automation",
    "Sustainable mobility",
    "Aerospace",
    "Maritime technologies",
    "Smart cities",
    "Cultural heritage",
    "Education and training",
    "Social innovation",
    "Public administration digitalisation",
];

fn default_competency_terms() -> Vec<String> {
    DEFAULT_COMPETENCIES.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = FundmatchConfig::default();
        assert_eq!(config.data.path, PathBuf::from("all_data_embedded.json"));
        assert_eq!(config.embedding.provider, "local");
        assert_eq!(config.embedding.model, "paraphrase-multilingual-MiniLM-L12-v2");
        assert!(config.embedding.api_key.is_none());
        assert_eq!(config.screening.default_results, 10);
        assert_eq!(config.screening.bar_width, 100);
        assert!(!config.competencies.terms.is_empty());
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = FundmatchConfig::from_toml("").unwrap();
        assert_eq!(config.screening.default_results, 10);
        assert_eq!(config.competencies.terms.len(), DEFAULT_COMPETENCIES.len());
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[data]
path = "data/embedded.json"

[embedding]
provider = "openai"
model = "text-embedding-3-small"
base_url = "http://localhost:8080/v1"

[screening]
default_results = 5
bar_width = 40

[competencies]
terms = ["Robotics", "Photonics"]
"#;
        let config = FundmatchConfig::from_toml(toml).unwrap();
        assert_eq!(config.data.path, PathBuf::from("data/embedded.json"));
        assert_eq!(config.embedding.provider, "openai");
        assert_eq!(
            config.embedding.base_url.as_deref(),
            Some("http://localhost:8080/v1")
        );
        assert_eq!(config.screening.default_results, 5);
        assert_eq!(config.screening.bar_width, 40);
        assert_eq!(config.competencies.terms, vec!["Robotics", "Photonics"]);
    }

    #[test]
    fn invalid_toml_returns_error() {
        assert!(FundmatchConfig::from_toml("{{invalid}}").is_err());
    }

    #[test]
    fn blank_competency_is_rejected() {
        let toml = r#"
[competencies]
terms = ["Robotics", "  "]
"#;
        let err = FundmatchConfig::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("blank"));
    }

    #[test]
    fn zero_bar_width_is_rejected() {
        let toml = r#"
[screening]
bar_width = 0
"#;
        assert!(FundmatchConfig::from_toml(toml).is_err());
    }

    #[test]
    fn oversized_bar_width_is_rejected() {
        let at_limit = "[screening]\nbar_width = 1000\n";
        assert_eq!(
            FundmatchConfig::from_toml(at_limit).unwrap().screening.bar_width,
            1000
        );

        let err = FundmatchConfig::from_toml("[screening]\nbar_width = 1001\n").unwrap_err();
        assert!(err.to_string().contains("at most 1000"));
    }
}
