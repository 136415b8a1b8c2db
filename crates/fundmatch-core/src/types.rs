use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A funding-call announcement with its title embedding.
///
/// Field names follow the keys of the embedded dataset file.
///
/// # Examples
///
/// ```
/// use fundmatch_core::FundingCall;
///
/// let call = FundingCall {
///     title: "AI Research".into(),
///     url: "https://example.eu/calls/1".into(),
///     title_embedding: vec![1.0, 0.0],
/// };
/// assert_eq!(call.label(), "AI Research - https://example.eu/calls/1");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingCall {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Title_Embedding")]
    pub title_embedding: Vec<f32>,
}

impl FundingCall {
    /// One-line `Title - URL` label.
    pub fn label(&self) -> String {
        format!("{} - {}", self.title, self.url)
    }
}

/// Title and URL of one scraped page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRef {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "URL")]
    pub url: String,
}

/// An organisation website: its scraped pages and the embedding of its summary.
///
/// `scraped` keeps the order of the source file; the first page stands for
/// the whole site when it is displayed.
///
/// # Examples
///
/// ```
/// use fundmatch_core::{PageRef, Site};
///
/// let site = Site {
///     scraped: vec![(
///         "home".into(),
///         PageRef { title: "Acme Robotics".into(), url: "https://acme.example".into() },
///     )],
///     summary_embedding: vec![0.0, 1.0],
/// };
/// assert_eq!(site.label(), "Acme Robotics - https://acme.example");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub scraped: Vec<(String, PageRef)>,
    #[serde(rename = "Summary_Embedding")]
    pub summary_embedding: Vec<f32>,
}

impl Site {
    /// The page that represents the site, if any page was scraped.
    pub fn first_page(&self) -> Option<&PageRef> {
        self.scraped.first().map(|(_, page)| page)
    }

    /// One-line `Title - URL` label taken from the first scraped page.
    ///
    /// Sites without pages are rejected when a dataset is loaded, so the
    /// placeholder only shows up for hand-built values.
    pub fn label(&self) -> String {
        match self.first_page() {
            Some(page) => format!("{} - {}", page.title, page.url),
            None => "(no scraped pages)".into(),
        }
    }
}

/// Output format for rendered reports.
///
/// # Examples
///
/// ```
/// use fundmatch_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text, one block per result.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(
            "markdown".parse::<OutputFormat>().unwrap(),
            OutputFormat::Markdown
        );
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn output_format_default_is_text() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
        assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
    }

    #[test]
    fn call_deserializes_from_dataset_keys() {
        let json = r#"{
            "Title": "Horizon Cluster 4",
            "URL": "https://example.eu/c4",
            "Deadline": "2025-01-01",
            "Title_Embedding": [0.5, 0.25]
        }"#;
        let call: FundingCall = serde_json::from_str(json).unwrap();
        assert_eq!(call.title, "Horizon Cluster 4");
        assert_eq!(call.title_embedding, vec![0.5, 0.25]);
    }

    #[test]
    fn site_scraped_pairs_keep_order() {
        let json = r#"{
            "scraped": [
                ["https://acme.example", {"Title": "Acme", "URL": "https://acme.example"}],
                ["https://acme.example/about", {"Title": "About Acme", "URL": "https://acme.example/about"}]
            ],
            "Summary_Embedding": [0.0, 1.0]
        }"#;
        let site: Site = serde_json::from_str(json).unwrap();
        assert_eq!(site.scraped.len(), 2);
        assert_eq!(site.first_page().unwrap().title, "Acme");
        assert_eq!(site.label(), "Acme - https://acme.example");
    }

    #[test]
    fn site_without_pages_has_placeholder_label() {
        let site = Site {
            scraped: Vec::new(),
            summary_embedding: vec![1.0],
        };
        assert!(site.first_page().is_none());
        assert_eq!(site.label(), "(no scraped pages)");
    }

    #[test]
    fn missing_embedding_key_fails() {
        let json = r#"{"Title": "x", "URL": "y"}"#;
        let err = serde_json::from_str::<FundingCall>(json).unwrap_err();
        assert!(err.to_string().contains("Title_Embedding"));
    }
}
