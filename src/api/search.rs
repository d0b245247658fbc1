use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::llm::augment::AugmentError;
use crate::models::{Paragraph, Provenance, SearchRequest, SearchResponse, SearchResult};
use crate::search::highlight::highlight_spans;
use crate::search::local::local_match;
use crate::search::merge::merge;
use crate::state::AppState;

const MAX_QUERY_CHARS: usize = 500;

/// POST /api/search - Local match, optionally augmented by the remote
/// knowledge base:
///   1. Accent-insensitive filter over the static corpus
///   2. Remote augmentation when requested and the query is long enough
///   3. Merge, de-duplicate by id, sort ascending
///
/// Remote failures never fail the request; they come back as `remoteError`.
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    if req.query.chars().count() > MAX_QUERY_CHARS {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Query is longer than {MAX_QUERY_CHARS} characters"),
        ));
    }

    Ok(Json(run_search(&state, req).await))
}

pub async fn run_search(state: &AppState, req: SearchRequest) -> SearchResponse {
    let term = req.query.trim().to_string();
    let range = req.section.range();

    // ── Step 1: Local match ──────────────────────────────────
    let local = local_match(&state.corpus, &term, range);

    // ── Step 2: Remote augmentation ──────────────────────────
    let mut remote = Vec::new();
    let mut remote_error = None;
    let mut remote_skipped = false;

    if req.augment && !term.is_empty() {
        if term.chars().count() < state.config.search.min_remote_query_chars {
            remote_skipped = true;
        } else {
            match state.augmenter.augment(&term).await {
                Ok(paragraphs) => {
                    tracing::info!("Remote search for {:?}: {} paragraph(s)", term, paragraphs.len());
                    remote = paragraphs;
                }
                Err(AugmentError::Disabled) => {
                    tracing::debug!("Remote search skipped: knowledge base disabled");
                }
                Err(e) => {
                    tracing::warn!("Remote search for {:?} failed: {e}", term);
                    remote_error = Some(e.user_notice().to_string());
                }
            }
        }
    }

    // ── Step 3: Merge ────────────────────────────────────────
    let merged = merge(&local, &remote, range);
    let local_count = merged
        .iter()
        .filter(|p| p.source == Some(Provenance::Local))
        .count();
    let remote_count = merged.len() - local_count;

    let with_spans = |paragraph: Paragraph| SearchResult {
        highlights: highlight_spans(&paragraph.text, &term),
        paragraph,
    };
    let results = merged.into_iter().map(&with_spans).collect();
    let remote = remote
        .iter()
        .map(|p| with_spans(p.tagged(Provenance::Remote)))
        .collect();

    SearchResponse {
        query: term,
        section: req.section,
        seq: req.seq,
        results,
        remote,
        local_count,
        remote_count,
        remote_error,
        remote_skipped,
    }
}
