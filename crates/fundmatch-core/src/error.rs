use std::path::PathBuf;

/// Errors that can occur across the fundmatch workspace.
///
/// Library crates return this type directly; the binary renders it as a
/// `miette` diagnostic at the boundary. Bad user input (an out-of-range call
/// number, an empty query) is not an error, see `fundmatch_screen::InputWarning`.
///
/// # Examples
///
/// ```
/// use fundmatch_core::FundmatchError;
///
/// let err = FundmatchError::Config("missing API key".into());
/// assert!(err.to_string().contains("missing API key"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum FundmatchError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The embedded dataset is structurally valid JSON but violates an invariant.
    #[error("dataset error: {0}")]
    #[diagnostic(help("regenerate the embedded dataset with a single embedding model"))]
    Dataset(String),

    /// Embedding provider failure (model load, HTTP, response shape).
    #[error("embedding error: {0}")]
    Embedding(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    #[diagnostic(help("pass --data <path> or set [data] path in .fundmatch.toml"))]
    FileNotFound(PathBuf),

    /// A background computation panicked or was aborted.
    #[error("background task failed: {0}")]
    Task(String),
}
