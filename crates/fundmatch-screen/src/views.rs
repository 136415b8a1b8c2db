//! The screening views.
//!
//! Every view takes the raw text a user typed. Result counts are parsed
//! leniently with the session's default; bad call or site numbers and
//! missing texts yield [`ViewOutcome::Warning`] instead of an error. Errors
//! are reserved for embedding failures and a crashed background scan.

use fundmatch_core::FundmatchError;
use fundmatch_rank::ranking::select_top;
use fundmatch_rank::similarity_percentage;

use crate::input::{parse_count, parse_index, IndexKind, InputWarning, ViewOutcome};
use crate::report::{
    CompetencyLine, CompetencyReport, DetailLine, DetailsReport, MatchLine, MatchScope,
    MatchesReport, SearchHit, SearchReport, SimilarityReport, Subject,
};
use crate::session::ScreeningSession;

/// Which matches to rank, with the raw call or site number where needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRequest<'a> {
    Call(&'a str),
    Site(&'a str),
    All,
}

fn count_or_default(session: &ScreeningSession, raw: Option<&str>) -> usize {
    parse_count(raw, session.settings().default_results)
}

/// Similarity of two free texts, as a percentage.
///
/// # Errors
///
/// Returns [`FundmatchError::Embedding`] if the texts cannot be embedded.
pub async fn text_similarity(
    session: &ScreeningSession,
    first: &str,
    second: &str,
) -> Result<ViewOutcome<SimilarityReport>, FundmatchError> {
    let (first, second) = (first.trim(), second.trim());
    if first.is_empty() || second.is_empty() {
        return Ok(ViewOutcome::Warning(InputWarning::MissingTexts));
    }

    let vectors = session
        .embedder()
        .embed_batch(&[first.to_string(), second.to_string()])
        .await?;
    let [a, b] = vectors.as_slice() else {
        return Err(FundmatchError::Embedding(format!(
            "expected 2 embeddings, got {}",
            vectors.len()
        )));
    };

    Ok(ViewOutcome::Report(SimilarityReport {
        first: first.to_string(),
        second: second.to_string(),
        score: similarity_percentage(a, b),
    }))
}

/// Rank funding calls by title similarity to `query`.
///
/// A blank query lists the first calls in dataset order, without scores.
///
/// # Errors
///
/// Returns [`FundmatchError::Embedding`] if the query cannot be embedded.
pub async fn search_calls(
    session: &ScreeningSession,
    query: &str,
    count: Option<&str>,
) -> Result<ViewOutcome<SearchReport>, FundmatchError> {
    let n = count_or_default(session, count);
    let calls = session.calls();
    let query = query.trim();

    let hits = if query.is_empty() {
        calls
            .iter()
            .take(n)
            .enumerate()
            .map(|(i, call)| SearchHit {
                subject: Subject::from_call(i, call),
                score: None,
            })
            .collect()
    } else {
        let q = session.embed_query(query).await?;
        let scored = calls
            .iter()
            .enumerate()
            .map(|(i, call)| (i, similarity_percentage(&q, &call.title_embedding)));
        select_top(scored, n)
            .into_iter()
            .map(|r| SearchHit {
                subject: Subject::from_call(r.index, &calls[r.index]),
                score: Some(r.score),
            })
            .collect()
    };

    Ok(ViewOutcome::Report(SearchReport {
        target: IndexKind::Call,
        query: (!query.is_empty()).then(|| query.to_string()),
        hits,
    }))
}

/// Rank sites by summary similarity to `query`.
///
/// A blank query lists the first sites in dataset order, without scores.
///
/// # Errors
///
/// Returns [`FundmatchError::Embedding`] if the query cannot be embedded.
pub async fn search_sites(
    session: &ScreeningSession,
    query: &str,
    count: Option<&str>,
) -> Result<ViewOutcome<SearchReport>, FundmatchError> {
    let n = count_or_default(session, count);
    let sites = session.sites();
    let query = query.trim();

    let hits = if query.is_empty() {
        sites
            .iter()
            .take(n)
            .enumerate()
            .map(|(i, site)| SearchHit {
                subject: Subject::from_site(i, site),
                score: None,
            })
            .collect()
    } else {
        let q = session.embed_query(query).await?;
        let scored = sites
            .iter()
            .enumerate()
            .map(|(i, site)| (i, similarity_percentage(&q, &site.summary_embedding)));
        select_top(scored, n)
            .into_iter()
            .map(|r| SearchHit {
                subject: Subject::from_site(r.index, &sites[r.index]),
                score: Some(r.score),
            })
            .collect()
    };

    Ok(ViewOutcome::Report(SearchReport {
        target: IndexKind::Site,
        query: (!query.is_empty()).then(|| query.to_string()),
        hits,
    }))
}

/// The competencies closest to a funding call's title.
pub fn call_competencies(
    session: &ScreeningSession,
    call: &str,
    count: Option<&str>,
) -> ViewOutcome<CompetencyReport> {
    let n = count_or_default(session, count);
    let index = match parse_index(call, session.calls().len(), IndexKind::Call) {
        Ok(index) => index,
        Err(warning) => return ViewOutcome::Warning(warning),
    };
    let call = &session.calls()[index];

    ViewOutcome::Report(CompetencyReport {
        target: IndexKind::Call,
        subject: Subject::from_call(index, call),
        competencies: competency_lines(session, &call.title_embedding, n),
        bar_width: session.settings().bar_width,
    })
}

/// The competencies closest to a site's summary.
pub fn site_competencies(
    session: &ScreeningSession,
    site: &str,
    count: Option<&str>,
) -> ViewOutcome<CompetencyReport> {
    let n = count_or_default(session, count);
    let index = match parse_index(site, session.sites().len(), IndexKind::Site) {
        Ok(index) => index,
        Err(warning) => return ViewOutcome::Warning(warning),
    };
    let site = &session.sites()[index];

    ViewOutcome::Report(CompetencyReport {
        target: IndexKind::Site,
        subject: Subject::from_site(index, site),
        competencies: competency_lines(session, &site.summary_embedding, n),
        bar_width: session.settings().bar_width,
    })
}

fn competency_lines(
    session: &ScreeningSession,
    embedding: &[f32],
    n: usize,
) -> Vec<CompetencyLine> {
    session
        .competencies()
        .rank(embedding, n)
        .into_iter()
        .map(|c| CompetencyLine {
            label: c.label,
            score: c.score,
        })
        .collect()
}

/// Top entries of the similarity matrix for one call, one site, or overall.
///
/// The overall ranking scans the whole matrix on the blocking pool and is
/// awaited here.
///
/// # Errors
///
/// Returns [`FundmatchError::Task`] if the background scan fails.
pub async fn top_matches(
    session: &ScreeningSession,
    request: MatchRequest<'_>,
    count: Option<&str>,
) -> Result<ViewOutcome<MatchesReport>, FundmatchError> {
    let n = count_or_default(session, count);
    let (calls, sites) = (session.calls(), session.sites());
    let matrix = session.matrix();

    let report = match request {
        MatchRequest::Call(raw) => {
            let call = match parse_index(raw, calls.len(), IndexKind::Call) {
                Ok(index) => index,
                Err(warning) => return Ok(ViewOutcome::Warning(warning)),
            };
            let anchor = Subject::from_call(call, &calls[call]);
            let matches = matrix
                .top_sites_for_call(call, n)
                .unwrap_or_default()
                .into_iter()
                .map(|r| MatchLine {
                    call: anchor.clone(),
                    site: Subject::from_site(r.index, &sites[r.index]),
                    score: r.score,
                })
                .collect();
            MatchesReport {
                scope: MatchScope::Call,
                matches,
                anchor: Some(anchor),
            }
        }
        MatchRequest::Site(raw) => {
            let site = match parse_index(raw, sites.len(), IndexKind::Site) {
                Ok(index) => index,
                Err(warning) => return Ok(ViewOutcome::Warning(warning)),
            };
            let anchor = Subject::from_site(site, &sites[site]);
            let matches = matrix
                .top_calls_for_site(site, n)
                .unwrap_or_default()
                .into_iter()
                .map(|r| MatchLine {
                    call: Subject::from_call(r.index, &calls[r.index]),
                    site: anchor.clone(),
                    score: r.score,
                })
                .collect();
            MatchesReport {
                scope: MatchScope::Site,
                matches,
                anchor: Some(anchor),
            }
        }
        MatchRequest::All => {
            let cells = session.spawn_top_cells(n).wait().await?;
            let matches = cells
                .into_iter()
                .map(|cell| MatchLine {
                    call: Subject::from_call(cell.call, &calls[cell.call]),
                    site: Subject::from_site(cell.site, &sites[cell.site]),
                    score: cell.score,
                })
                .collect();
            MatchesReport {
                scope: MatchScope::All,
                matches,
                anchor: None,
            }
        }
    };

    Ok(ViewOutcome::Report(report))
}

/// Explain one call/site match: the stored score, then the call's top
/// competencies scored against both sides.
pub fn match_details(
    session: &ScreeningSession,
    call: &str,
    site: &str,
    count: Option<&str>,
) -> ViewOutcome<DetailsReport> {
    let n = count_or_default(session, count);
    let (calls, sites) = (session.calls(), session.sites());
    let call = match parse_index(call, calls.len(), IndexKind::Call) {
        Ok(index) => index,
        Err(warning) => return ViewOutcome::Warning(warning),
    };
    let site = match parse_index(site, sites.len(), IndexKind::Site) {
        Ok(index) => index,
        Err(warning) => return ViewOutcome::Warning(warning),
    };

    let site_embedding = &sites[site].summary_embedding;
    let competencies = session
        .competencies()
        .rank(&calls[call].title_embedding, n)
        .into_iter()
        .map(|c| {
            let site_score = session
                .competencies()
                .get(c.index)
                .map_or(0.0, |competency| competency.score(site_embedding));
            DetailLine {
                label: c.label,
                call_score: c.score,
                site_score,
            }
        })
        .collect();

    ViewOutcome::Report(DetailsReport {
        call: Subject::from_call(call, &calls[call]),
        site: Subject::from_site(site, &sites[site]),
        score: session.matrix().get(site, call).unwrap_or_default(),
        competencies,
        bar_width: session.settings().bar_width,
    })
}
