use std::sync::Arc;

use crate::config::Config;
use crate::corpus::Corpus;
use crate::llm::augment::{DisabledAugmenter, LlmAugmenter, RemoteAugmenter};

/// Shared application state. Everything in here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub corpus: Arc<Corpus>,
    pub augmenter: Arc<dyn RemoteAugmenter>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let corpus = Corpus::load(config.corpus_path.as_deref())?;
        tracing::info!("Loaded {} paragraph(s)", corpus.len());

        let augmenter: Arc<dyn RemoteAugmenter> = if config.llm.enabled {
            Arc::new(LlmAugmenter::new(
                &config.llm,
                config.search.max_remote_results,
            )?)
        } else {
            tracing::info!("Remote knowledge base disabled; serving the local corpus only");
            Arc::new(DisabledAugmenter)
        };

        Ok(Self::from_parts(config, corpus, augmenter))
    }

    pub fn from_parts(config: Config, corpus: Corpus, augmenter: Arc<dyn RemoteAugmenter>) -> Self {
        Self {
            config: Arc::new(config),
            corpus: Arc::new(corpus),
            augmenter,
        }
    }
}
