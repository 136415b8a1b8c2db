//! Lenient parsing of user-typed numbers and the warnings shown for bad input.
//!
//! Bad input never becomes an error: result counts fall back to a default,
//! and unusable call/site numbers or missing texts produce an
//! [`InputWarning`] for the front end to display.

use std::fmt;
use std::num::IntErrorKind;

use serde::Serialize;

/// What a user-supplied index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Call,
    Site,
}

impl IndexKind {
    fn noun(self) -> &'static str {
        match self {
            IndexKind::Call => "call",
            IndexKind::Site => "site",
        }
    }

    fn capitalized(self) -> &'static str {
        match self {
            IndexKind::Call => "Call",
            IndexKind::Site => "Site",
        }
    }
}

/// A user-facing validation message. Not an error: the request is simply
/// not carried out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InputWarning {
    /// One or both texts of a similarity comparison are empty.
    MissingTexts,
    /// The value is not a non-negative integer.
    InvalidNumber { target: IndexKind },
    /// The index is past the end of the dataset.
    OutOfRange { target: IndexKind, len: usize },
}

impl InputWarning {
    /// Dialog-style title.
    pub fn title(&self) -> &'static str {
        "Input Error"
    }
}

impl fmt::Display for InputWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputWarning::MissingTexts => write!(f, "Please enter both texts."),
            InputWarning::InvalidNumber { target } => {
                write!(f, "Please enter a valid {} number.", target.noun())
            }
            InputWarning::OutOfRange { target, len: 0 } => {
                write!(f, "There are no {}s loaded.", target.noun())
            }
            InputWarning::OutOfRange { target, len } => write!(
                f,
                "{} number must be between 0 and {}",
                target.capitalized(),
                len - 1
            ),
        }
    }
}

/// Either a finished report or the reason the request was not run.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutcome<T> {
    Report(T),
    Warning(InputWarning),
}

impl<T> ViewOutcome<T> {
    pub fn report(self) -> Option<T> {
        match self {
            ViewOutcome::Report(report) => Some(report),
            ViewOutcome::Warning(_) => None,
        }
    }

    pub fn warning(&self) -> Option<&InputWarning> {
        match self {
            ViewOutcome::Report(_) => None,
            ViewOutcome::Warning(warning) => Some(warning),
        }
    }
}

/// Parse a "number of results" field, falling back to `default` when the
/// field is missing, blank, negative, or not an integer. Integers too large
/// for `usize` saturate, so they still mean "everything".
///
/// # Examples
///
/// ```
/// use fundmatch_screen::input::parse_count;
///
/// assert_eq!(parse_count(Some("25"), 10), 25);
/// assert_eq!(parse_count(Some("lots"), 10), 10);
/// assert_eq!(parse_count(None, 10), 10);
/// ```
pub fn parse_count(raw: Option<&str>, default: usize) -> usize {
    match raw.map(str::trim) {
        Some(text) => match text.parse::<usize>() {
            Ok(count) => count,
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => usize::MAX,
            Err(_) => {
                log::debug!("result count {text:?} is not a non-negative integer; using {default}");
                default
            }
        },
        None => default,
    }
}

/// Parse a call or site number and check it against the dataset size.
///
/// # Examples
///
/// ```
/// use fundmatch_screen::input::{parse_index, IndexKind, InputWarning};
///
/// assert_eq!(parse_index("2", 5, IndexKind::Call), Ok(2));
/// assert_eq!(
///     parse_index("5", 5, IndexKind::Call).unwrap_err().to_string(),
///     "Call number must be between 0 and 4"
/// );
/// assert_eq!(
///     parse_index("two", 5, IndexKind::Site),
///     Err(InputWarning::InvalidNumber { target: IndexKind::Site })
/// );
/// ```
pub fn parse_index(raw: &str, len: usize, target: IndexKind) -> Result<usize, InputWarning> {
    let trimmed = raw.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| InputWarning::InvalidNumber { target })?;
    check_index(value, len, target)
}

/// Check an already-numeric index against the dataset size.
pub fn check_index(value: i64, len: usize, target: IndexKind) -> Result<usize, InputWarning> {
    usize::try_from(value)
        .ok()
        .filter(|&i| i < len)
        .ok_or(InputWarning::OutOfRange { target, len })
}
