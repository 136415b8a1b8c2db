//! Report types produced by the views, with text, markdown and JSON rendering.
//!
//! Scores are kept unrounded; text and markdown show one decimal.

use std::fmt;

use fundmatch_core::{FundingCall, FundmatchError, OutputFormat, Site};
use fundmatch_rank::{progress_bar, round_to};
use serde::Serialize;

use crate::input::IndexKind;

/// A report that can be rendered in every [`OutputFormat`].
pub trait Report: fmt::Display + Serialize {
    fn to_markdown(&self) -> String;

    /// Render in `format`.
    ///
    /// # Errors
    ///
    /// Returns [`FundmatchError::Serialization`] if JSON encoding fails.
    fn render(&self, format: OutputFormat) -> Result<String, FundmatchError> {
        Ok(match format {
            OutputFormat::Text => self.to_string(),
            OutputFormat::Markdown => self.to_markdown(),
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(self)?;
                json.push('\n');
                json
            }
        })
    }
}

/// Escape text for a markdown table cell.
fn md_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn pct(score: f64) -> String {
    format!("{:.1}", round_to(score, 1))
}

/// A call or site as shown in reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub index: usize,
    pub title: String,
    pub url: String,
}

impl Subject {
    pub fn from_call(index: usize, call: &FundingCall) -> Self {
        Self {
            index,
            title: call.title.clone(),
            url: call.url.clone(),
        }
    }

    pub fn from_site(index: usize, site: &Site) -> Self {
        let (title, url) = match site.first_page() {
            Some(page) => (page.title.clone(), page.url.clone()),
            None => (site.label(), String::new()),
        };
        Self { index, title, url }
    }

    /// `#index Title - URL`.
    pub fn heading(&self) -> String {
        if self.url.is_empty() {
            format!("#{} {}", self.index, self.title)
        } else {
            format!("#{} {} - {}", self.index, self.title, self.url)
        }
    }

    fn markdown_link(&self) -> String {
        if self.url.is_empty() {
            md_cell(&self.title)
        } else {
            format!("[{}]({})", md_cell(&self.title), md_cell(&self.url))
        }
    }
}

/// Similarity of two free texts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityReport {
    pub first: String,
    pub second: String,
    pub score: f64,
}

impl fmt::Display for SimilarityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "'{}' and '{}' are {}% similar",
            self.first,
            self.second,
            pct(self.score)
        )
    }
}

impl Report for SimilarityReport {
    fn to_markdown(&self) -> String {
        format!(
            "# Text Similarity\n\n> {}\n\n> {}\n\n**Similarity:** {}%\n",
            self.first,
            self.second,
            pct(self.score)
        )
    }
}

/// One search result; `score` is absent when listing without a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(flatten)]
    pub subject: Subject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Funding-call or site search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchReport {
    pub target: IndexKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub hits: Vec<SearchHit>,
}

impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for hit in &self.hits {
            if let Some(score) = hit.score {
                writeln!(f, "{}%", pct(score))?;
            }
            writeln!(f, "{}\n", hit.subject.heading())?;
        }
        Ok(())
    }
}

impl Report for SearchReport {
    fn to_markdown(&self) -> String {
        let noun = match self.target {
            IndexKind::Call => "Funding Calls",
            IndexKind::Site => "Sites",
        };
        let mut out = match &self.query {
            Some(q) => format!("# {noun} matching \"{q}\"\n\n"),
            None => format!("# {noun}\n\n"),
        };
        if self.hits.is_empty() {
            out.push_str("No results found.\n");
            return out;
        }
        if self.query.is_some() {
            out.push_str("| # | Title | Score |\n|---|-------|-------|\n");
            for hit in &self.hits {
                out.push_str(&format!(
                    "| {} | {} | {}% |\n",
                    hit.subject.index,
                    hit.subject.markdown_link(),
                    pct(hit.score.unwrap_or_default())
                ));
            }
        } else {
            out.push_str("| # | Title |\n|---|-------|\n");
            for hit in &self.hits {
                out.push_str(&format!(
                    "| {} | {} |\n",
                    hit.subject.index,
                    hit.subject.markdown_link()
                ));
            }
        }
        out
    }
}

/// One competency's score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyLine {
    pub label: String,
    pub score: f64,
}

/// Top competencies of one call or site.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyReport {
    pub target: IndexKind,
    pub subject: Subject,
    pub competencies: Vec<CompetencyLine>,
    #[serde(skip)]
    pub bar_width: usize,
}

impl fmt::Display for CompetencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}\n", self.subject.heading())?;
        for line in &self.competencies {
            writeln!(
                f,
                "{} {}%\n {}\n",
                progress_bar(line.score / 100.0, self.bar_width),
                pct(line.score),
                line.label
            )?;
        }
        Ok(())
    }
}

impl Report for CompetencyReport {
    fn to_markdown(&self) -> String {
        let mut out = format!("# Competencies of {}\n\n", self.subject.heading());
        out.push_str("| Competency | Score |\n|------------|-------|\n");
        for line in &self.competencies {
            out.push_str(&format!(
                "| {} | {}% |\n",
                md_cell(&line.label),
                pct(line.score)
            ));
        }
        out
    }
}

/// Which slice of the matrix a matches report ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchScope {
    /// Sites for one call (a matrix column).
    Call,
    /// Calls for one site (a matrix row).
    Site,
    /// The best cells of the whole matrix.
    All,
}

/// A call paired with a site and their stored similarity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchLine {
    pub call: Subject,
    pub site: Subject,
    pub score: f64,
}

/// Top matches for a call, a site, or the whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchesReport {
    pub scope: MatchScope,
    pub matches: Vec<MatchLine>,
    /// The call or site the matches were ranked for; `None` for the whole matrix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Subject>,
}

impl fmt::Display for MatchesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.scope, &self.anchor) {
            (MatchScope::Call, Some(anchor)) => {
                writeln!(f, "\n{}\nMATCHES WITH\n", anchor.heading())?;
                for m in &self.matches {
                    writeln!(f, "{}%\n{}\n", pct(m.score), m.site.heading())?;
                }
            }
            (MatchScope::Site, Some(anchor)) => {
                writeln!(f, "\n{}\nMATCHES WITH\n", anchor.heading())?;
                for m in &self.matches {
                    writeln!(f, "{}%\n{}\n", pct(m.score), m.call.heading())?;
                }
            }
            _ => {
                for m in &self.matches {
                    writeln!(
                        f,
                        "{}\nMATCHED WITH {}% TO\n{}\n",
                        m.call.heading(),
                        pct(m.score),
                        m.site.heading()
                    )?;
                }
            }
        }
        Ok(())
    }
}

impl Report for MatchesReport {
    fn to_markdown(&self) -> String {
        let mut out = match (&self.anchor, self.scope) {
            (Some(anchor), _) => format!("# Top Matches for {}\n\n", anchor.heading()),
            (None, _) => "# Top Matches\n\n".to_string(),
        };
        if self.matches.is_empty() {
            out.push_str("No matches.\n");
            return out;
        }
        out.push_str("| Call | Site | Score |\n|------|------|-------|\n");
        for m in &self.matches {
            out.push_str(&format!(
                "| #{} {} | #{} {} | {}% |\n",
                m.call.index,
                m.call.markdown_link(),
                m.site.index,
                m.site.markdown_link(),
                pct(m.score)
            ));
        }
        out
    }
}

/// A competency scored against both sides of a match.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailLine {
    pub label: String,
    pub call_score: f64,
    pub site_score: f64,
}

/// Why a call and a site match: their stored score and shared competencies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsReport {
    pub call: Subject,
    pub site: Subject,
    pub score: f64,
    pub competencies: Vec<DetailLine>,
    #[serde(skip)]
    pub bar_width: usize,
}

impl fmt::Display for DetailsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "\n{}\nMATCHED WITH {}% TO\n{}\n",
            self.call.heading(),
            pct(self.score),
            self.site.heading()
        )?;
        for line in &self.competencies {
            writeln!(f, "Competency: {}", line.label)?;
            writeln!(
                f,
                "Call: {} {}%",
                progress_bar(line.call_score / 100.0, self.bar_width),
                pct(line.call_score)
            )?;
            writeln!(
                f,
                "Site: {} {}%\n",
                progress_bar(line.site_score / 100.0, self.bar_width),
                pct(line.site_score)
            )?;
        }
        Ok(())
    }
}

impl Report for DetailsReport {
    fn to_markdown(&self) -> String {
        let mut out = String::from("# Match Details\n\n");
        out.push_str(&format!(
            "**Call:** #{} {}\n\n**Site:** #{} {}\n\n**Similarity:** {}%\n\n",
            self.call.index,
            self.call.markdown_link(),
            self.site.index,
            self.site.markdown_link(),
            pct(self.score)
        ));
        if !self.competencies.is_empty() {
            out.push_str("| Competency | Call | Site |\n|------------|------|------|\n");
            for line in &self.competencies {
                out.push_str(&format!(
                    "| {} | {}% | {}% |\n",
                    md_cell(&line.label),
                    pct(line.call_score),
                    pct(line.site_score)
                ));
            }
        }
        out
    }
}
