//! Screening views over a loaded dataset.
//!
//! A [`ScreeningSession`] holds the dataset, the call × site similarity
//! matrix and the embedded competency vocabulary. The functions in
//! [`views`] take raw user input, validate it leniently and return either a
//! renderable report or an [`InputWarning`].

pub mod input;
pub mod report;
pub mod session;
pub mod views;

pub use input::{parse_count, parse_index, IndexKind, InputWarning, ViewOutcome};
pub use report::{
    CompetencyReport, DetailsReport, MatchScope, MatchesReport, Report, SearchReport,
    SimilarityReport, Subject,
};
pub use session::{ScreeningSession, TopCellsTask};
pub use views::MatchRequest;
