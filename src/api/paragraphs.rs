use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::citation::{citation_text, permalink};
use crate::models::{CitationResponse, Paragraph, Provenance, Section, SectionInfo};
use crate::state::AppState;

/// GET /api/sections - Section filters with their id ranges
pub async fn list_sections() -> Json<Vec<SectionInfo>> {
    Json(Section::ALL.into_iter().map(SectionInfo::from).collect())
}

/// GET /api/paragraphs/:id - One paragraph from the local corpus
pub async fn get_paragraph(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Paragraph>, (StatusCode, String)> {
    state
        .corpus
        .get(id)
        .map(|p| Json(p.tagged(Provenance::Local)))
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Paragraph {id} not found")))
}

/// GET /api/paragraphs/:id/citation - Copyable citation text and permalink
pub async fn get_citation(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<CitationResponse>, (StatusCode, String)> {
    let paragraph = state
        .corpus
        .get(id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Paragraph {id} not found")))?;

    Ok(Json(CitationResponse {
        id,
        text: citation_text(&state.config.corpus_name, paragraph),
        link: permalink(&state.config.public_base_url, id),
    }))
}

/// GET /api/config - Public view of the configuration (no secrets)
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    let config = &state.config;
    Json(ConfigResponse {
        corpus_name: config.corpus_name.clone(),
        paragraph_count: state.corpus.len(),
        public_base_url: config.public_base_url.clone(),
        provider: config.llm.provider.clone(),
        model: config.llm.model.clone(),
        remote_enabled: config.llm.enabled,
        has_api_key: config.llm.api_key.is_some(),
        debounce_ms: config.search.debounce_ms,
        min_remote_query_chars: config.search.min_remote_query_chars,
        max_remote_results: config.search.max_remote_results,
    })
}

/// Config response with API key redacted
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub corpus_name: String,
    pub paragraph_count: usize,
    pub public_base_url: String,
    pub provider: String,
    pub model: String,
    pub remote_enabled: bool,
    pub has_api_key: bool,
    pub debounce_ms: u64,
    pub min_remote_query_chars: usize,
    pub max_remote_results: usize,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::corpus::Corpus;
    use crate::llm::augment::DisabledAugmenter;

    fn state() -> AppState {
        let config = Config {
            public_base_url: "https://catecismo.example/".to_string(),
            ..Config::default()
        };
        AppState::from_parts(config, Corpus::embedded().unwrap(), Arc::new(DisabledAugmenter))
    }

    #[tokio::test]
    async fn test_sections_listed_in_order() {
        let Json(sections) = list_sections().await;
        assert_eq!(sections.len(), 5);
        assert_eq!(sections[0].label, "Todos");
        assert_eq!(sections[2].min_id, 1066);
        assert_eq!(sections[2].max_id, 1690);
    }

    #[tokio::test]
    async fn test_get_paragraph_found_and_missing() {
        let Json(p) = get_paragraph(State(state()), Path(27)).await.unwrap();
        assert_eq!(p.id, 27);
        assert_eq!(p.source, Some(Provenance::Local));

        let err = get_paragraph(State(state()), Path(4242)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_citation_uses_corpus_name_and_base_url() {
        let Json(c) = get_citation(State(state()), Path(1213)).await.unwrap();
        assert!(c.text.starts_with("Catecismo da Igreja Católica, §1213\n\n\"O santo Batismo"));
        assert!(c.text.ends_with('"'));
        assert_eq!(c.link, "https://catecismo.example/#/paragraph/1213");
    }

    #[tokio::test]
    async fn test_config_redacts_key() {
        let mut config = Config::default();
        config.llm.api_key = Some("secret".to_string());
        let state =
            AppState::from_parts(config, Corpus::embedded().unwrap(), Arc::new(DisabledAugmenter));
        let Json(resp) = get_config(State(state)).await;
        assert!(resp.has_api_key);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("secret"));
        assert_eq!(resp.paragraph_count, 16);
    }
}
