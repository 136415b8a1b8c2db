//! Core types, configuration, dataset loading, and error handling for fundmatch.
//!
//! This crate provides the shared foundation used by the other crates:
//! - [`FundmatchError`]: unified error type using `thiserror`
//! - [`FundmatchConfig`]: configuration loaded from `.fundmatch.toml`
//! - [`Dataset`]: the validated `[calls, sites]` embedding file
//! - Shared types: [`FundingCall`], [`Site`], [`PageRef`], [`OutputFormat`]

mod config;
mod dataset;
mod error;
mod types;

pub use config::{
    CompetencyConfig, DataConfig, EmbeddingConfig, FundmatchConfig, ScreeningConfig,
};
pub use dataset::Dataset;
pub use error::FundmatchError;
pub use types::{FundingCall, OutputFormat, PageRef, Site};

/// A convenience `Result` type for fundmatch operations.
pub type Result<T> = std::result::Result<T, FundmatchError>;
