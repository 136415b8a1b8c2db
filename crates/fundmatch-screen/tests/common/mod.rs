//! Shared fixtures: a tiny dataset and a lookup-table embedder.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use fundmatch_core::{Dataset, FundingCall, FundmatchError, PageRef, ScreeningConfig, Site};
use fundmatch_embed::EmbeddingProvider;
use fundmatch_screen::ScreeningSession;

/// Returns fixed vectors for known texts and an error for anything else.
pub struct TableEmbedder {
    table: HashMap<String, Vec<f32>>,
}

impl TableEmbedder {
    pub fn new(entries: &[(&str, [f32; 3])]) -> Self {
        Self {
            table: entries
                .iter()
                .map(|(text, v)| (text.to_string(), v.to_vec()))
                .collect(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for TableEmbedder {
    fn model(&self) -> &str {
        "table"
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, FundmatchError> {
        texts
            .iter()
            .map(|t| {
                self.table
                    .get(t)
                    .cloned()
                    .ok_or_else(|| FundmatchError::Embedding(format!("no vector for {t:?}")))
            })
            .collect()
    }
}

pub fn call(title: &str, embedding: [f32; 3]) -> FundingCall {
    FundingCall {
        title: title.into(),
        url: format!("https://calls.example/{}", title.to_lowercase().replace(' ', "-")),
        title_embedding: embedding.to_vec(),
    }
}

pub fn site(title: &str, embedding: [f32; 3]) -> Site {
    Site {
        scraped: vec![(
            "home".into(),
            PageRef {
                title: title.into(),
                url: format!("https://{}.example", title.to_lowercase()),
            },
        )],
        summary_embedding: embedding.to_vec(),
    }
}

pub const TERMS: [&str; 3] = ["Robotics", "Photonics", "Biotech"];

pub fn embedder() -> TableEmbedder {
    TableEmbedder::new(&[
        ("Robotics", [1.0, 0.0, 0.0]),
        ("Photonics", [0.0, 1.0, 0.0]),
        ("Biotech", [0.0, 0.0, 1.0]),
        ("robots", [1.0, 0.0, 0.0]),
        ("lasers", [0.0, 1.0, 0.0]),
        ("machines", [1.0, 0.1, 0.0]),
    ])
}

/// Calls: 0 robots, 1 lasers, 2 mixed. Sites: 0 Acme (robots), 1 Lumen (lasers).
pub async fn session() -> ScreeningSession {
    let dataset = Dataset::new(
        vec![
            call("Robot Arms", [1.0, 0.0, 0.0]),
            call("Laser Optics", [0.0, 1.0, 0.0]),
            call("Optical Robots", [1.0, 1.0, 0.0]),
        ],
        vec![site("Acme", [1.0, 0.0, 0.0]), site("Lumen", [0.0, 1.0, 0.0])],
    )
    .unwrap();
    let terms: Vec<String> = TERMS.iter().map(|t| t.to_string()).collect();
    ScreeningSession::new(
        dataset,
        &terms,
        Arc::new(embedder()),
        ScreeningConfig {
            default_results: 10,
            bar_width: 10,
        },
    )
    .await
    .unwrap()
}
