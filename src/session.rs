//! Interactive search session: immediate local filtering plus debounced,
//! best-effort remote augmentation.
//!
//! Every query change bumps a generation number. The debounce timer is a
//! single cancellable slot; once it fires, the remote call runs as its own
//! task and is never cancelled, but its answer is applied only if the
//! generation it was issued for is still current.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::citation::parse_permalink;
use crate::config::SearchConfig;
use crate::corpus::Corpus;
use crate::llm::augment::{AugmentError, RemoteAugmenter};
use crate::models::{Paragraph, Section};
use crate::search::local::local_match;
use crate::search::merge::merge;

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub debounce: Duration,
    pub min_remote_query_chars: usize,
}

impl From<&SearchConfig> for SessionSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            min_remote_query_chars: config.min_remote_query_chars,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

#[derive(Debug, Default)]
struct SessionState {
    query: String,
    section: Section,
    remote: Vec<Paragraph>,
    remote_loading: bool,
    remote_error: Option<String>,
    generation: u64,
}

/// What the user should currently see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchView {
    pub query: String,
    pub section: Section,
    pub results: Vec<Paragraph>,
    pub remote_loading: bool,
    pub remote_error: Option<String>,
}

impl SearchView {
    /// A finished search that found nothing. Distinct from the error case.
    pub fn is_no_results(&self) -> bool {
        !self.query.trim().is_empty() && self.results.is_empty() && !self.remote_loading
    }
}

pub struct SearchSession {
    corpus: Arc<Corpus>,
    augmenter: Arc<dyn RemoteAugmenter>,
    settings: SessionSettings,
    state: Arc<Mutex<SessionState>>,
    pending: Option<JoinHandle<()>>,
    revision: Arc<watch::Sender<u64>>,
}

impl SearchSession {
    pub fn new(
        corpus: Arc<Corpus>,
        augmenter: Arc<dyn RemoteAugmenter>,
        settings: SessionSettings,
    ) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            corpus,
            augmenter,
            settings,
            state: Arc::new(Mutex::new(SessionState::default())),
            pending: None,
            revision: Arc::new(revision),
        }
    }

    /// Revision counter bumped after every visible state change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Replace the query.
    ///
    /// The debounced remote call runs on the current tokio runtime. Outside
    /// a runtime the session stays local-only.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        let term = query.trim().to_string();
        let mut runtime = None;
        if !term.is_empty() && term.chars().count() >= self.settings.min_remote_query_chars {
            match Handle::try_current() {
                Ok(handle) => runtime = Some(handle),
                Err(_) => tracing::warn!("No tokio runtime; remote search for {:?} skipped", term),
            }
        }
        let wants_remote = runtime.is_some();
        self.cancel_pending();

        let generation = {
            let mut state = self.state.lock();
            state.query = query;
            state.generation += 1;
            state.remote.clear();
            state.remote_error = None;
            state.remote_loading = wants_remote;
            state.generation
        };
        notify(&self.revision);

        let Some(runtime) = runtime else {
            return;
        };

        let state = self.state.clone();
        let augmenter = self.augmenter.clone();
        let revision = self.revision.clone();
        let debounce = self.settings.debounce;
        self.pending = Some(runtime.spawn(async move {
            tokio::time::sleep(debounce).await;
            tracing::debug!("Dispatching remote search for {:?}", term);
            tokio::spawn(fetch_remote(state, augmenter, revision, term, generation));
        }));
    }

    /// Switch the section filter; only re-runs the merge.
    pub fn set_section(&mut self, section: Section) {
        self.state.lock().section = section;
        notify(&self.revision);
    }

    /// Seed the query from a permalink. Returns the paragraph id on success.
    pub fn open_permalink(&mut self, link: &str) -> Option<u32> {
        let id = parse_permalink(link)?;
        self.set_query(id.to_string());
        Some(id)
    }

    /// Clear query and section, as the header logo does.
    pub fn reset(&mut self) {
        self.set_section(Section::All);
        self.set_query("");
    }

    pub fn view(&self) -> SearchView {
        let state = self.state.lock();
        let range = state.section.range();
        let local = local_match(&self.corpus, &state.query, range);
        SearchView {
            query: state.query.clone(),
            section: state.section,
            results: merge(&local, &state.remote, range),
            remote_loading: state.remote_loading,
            remote_error: state.remote_error.clone(),
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(timer) = self.pending.take() {
            timer.abort();
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

fn notify(revision: &watch::Sender<u64>) {
    revision.send_modify(|r| *r += 1);
}

async fn fetch_remote(
    state: Arc<Mutex<SessionState>>,
    augmenter: Arc<dyn RemoteAugmenter>,
    revision: Arc<watch::Sender<u64>>,
    term: String,
    generation: u64,
) {
    let result = augmenter.augment(&term).await;

    {
        let mut state = state.lock();
        if state.generation != generation {
            tracing::debug!("Discarding stale remote response for {:?}", term);
            return;
        }
        state.remote_loading = false;
        match result {
            Ok(paragraphs) => {
                state.remote = paragraphs;
                state.remote_error = None;
            }
            Err(AugmentError::Disabled) => {
                state.remote.clear();
            }
            Err(e) => {
                tracing::warn!("Remote search for {:?} failed: {e}", term);
                state.remote.clear();
                state.remote_error = Some(e.user_notice().to_string());
            }
        }
    }
    notify(&revision);
}
