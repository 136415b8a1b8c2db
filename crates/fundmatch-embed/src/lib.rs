//! Text embedding providers.
//!
//! The rest of the workspace sees embeddings only through
//! [`EmbeddingProvider`]. Two implementations are available:
//! - [`local::LocalEmbedder`] runs a sentence-transformer in-process with
//!   `fastembed` (the default, no network after the first model download)
//! - [`remote::RemoteEmbedder`] calls an OpenAI-compatible `/embeddings` API

pub mod local;
pub mod provider;
pub mod remote;

pub use provider::{provider_from_config, EmbeddingProvider};
