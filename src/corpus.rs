use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

use crate::models::Paragraph;

/// Sample of the catechism shipped with the binary.
const EMBEDDED_CORPUS: &str = include_str!("../data/catechism.json");

/// The static paragraph table, sorted by ascending id.
#[derive(Debug, Clone)]
pub struct Corpus {
    paragraphs: Vec<Paragraph>,
}

impl Corpus {
    /// Load the embedded sample corpus.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_CORPUS).context("Embedded corpus is invalid")
    }

    /// Load from a JSON file, or the embedded corpus when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let data = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read corpus {}", path.display()))?;
                Self::from_json(&data)
                    .with_context(|| format!("Failed to load corpus {}", path.display()))
            }
            None => Self::embedded(),
        }
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let paragraphs: Vec<Paragraph> =
            serde_json::from_str(data).context("Corpus is not a JSON array of paragraphs")?;
        Self::new(paragraphs)
    }

    /// Build a corpus, rejecting duplicate identifiers.
    pub fn new(mut paragraphs: Vec<Paragraph>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(paragraphs.len());
        for p in &paragraphs {
            if !seen.insert(p.id) {
                anyhow::bail!("Duplicate paragraph id {} in corpus", p.id);
            }
        }
        for p in &mut paragraphs {
            p.source = None;
        }
        paragraphs.sort_by_key(|p| p.id);
        Ok(Self { paragraphs })
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn get(&self, id: u32) -> Option<&Paragraph> {
        self.paragraphs
            .binary_search_by_key(&id, |p| p.id)
            .ok()
            .map(|idx| &self.paragraphs[idx])
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}
