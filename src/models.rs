use serde::{Deserialize, Serialize};

/// Where a paragraph in a result set came from. Assigned at match time,
/// never read from the corpus file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Local,
    Remote,
}

/// A single catechism paragraph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    pub id: u32,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bible_references: Option<Vec<String>>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub source: Option<Provenance>,
}

impl Paragraph {
    /// Copy of this paragraph tagged with the given provenance.
    pub fn tagged(&self, source: Provenance) -> Self {
        Self {
            source: Some(source),
            ..self.clone()
        }
    }
}

/// Closed interval `[min_id, max_id]` of paragraph identifiers.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SectionRange {
    pub min_id: u32,
    pub max_id: u32,
}

impl SectionRange {
    pub const fn new(min_id: u32, max_id: u32) -> Self {
        Self { min_id, max_id }
    }

    pub fn contains(&self, id: u32) -> bool {
        id >= self.min_id && id <= self.max_id
    }
}

/// The parts of the catechism used as search filters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    #[default]
    All,
    Creed,
    Sacraments,
    Life,
    Prayer,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::All,
        Section::Creed,
        Section::Sacraments,
        Section::Life,
        Section::Prayer,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::All => "Todos",
            Section::Creed => "Profissão de Fé",
            Section::Sacraments => "Sacramentos",
            Section::Life => "A Vida em Cristo",
            Section::Prayer => "Oração Cristã",
        }
    }

    pub fn range(self) -> SectionRange {
        match self {
            Section::All => SectionRange::new(0, 9999),
            Section::Creed => SectionRange::new(1, 1065),
            Section::Sacraments => SectionRange::new(1066, 1690),
            Section::Life => SectionRange::new(1691, 2557),
            Section::Prayer => SectionRange::new(2558, 2865),
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Section::All => "all",
            Section::Creed => "creed",
            Section::Sacraments => "sacraments",
            Section::Life => "life",
            Section::Prayer => "prayer",
        }
    }

    /// Parse either the short key (`sacraments`) or the display label
    /// (`Sacramentos`), ignoring case and accents.
    pub fn parse(input: &str) -> Option<Self> {
        let wanted = crate::search::normalize::normalize(input.trim());
        Self::ALL.into_iter().find(|s| {
            s.key() == wanted || crate::search::normalize::normalize(s.label()) == wanted
        })
    }
}

/// Search request
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub section: Section,
    /// Ask the remote knowledge base for more paragraphs.
    #[serde(default)]
    pub augment: bool,
    /// Opaque client tag echoed back so stale responses can be dropped.
    pub seq: Option<u64>,
}

/// One displayed paragraph with its highlight spans (char offsets).
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub paragraph: Paragraph,
    pub highlights: Vec<(usize, usize)>,
}

/// Search response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    pub section: Section,
    pub seq: Option<u64>,
    pub results: Vec<SearchResult>,
    /// Every remote candidate for this query, before the section filter and
    /// de-duplication, so a client can re-filter on a section change
    /// without asking the knowledge base again.
    pub remote: Vec<SearchResult>,
    pub local_count: usize,
    pub remote_count: usize,
    /// Set when the remote augmentation was attempted and failed.
    pub remote_error: Option<String>,
    /// True when augmentation was requested but the query was too short.
    pub remote_skipped: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionInfo {
    pub key: Section,
    pub label: &'static str,
    pub min_id: u32,
    pub max_id: u32,
}

impl From<Section> for SectionInfo {
    fn from(section: Section) -> Self {
        let range = section.range();
        Self {
            key: section,
            label: section.label(),
            min_id: range.min_id,
            max_id: range.max_id,
        }
    }
}

/// Citation text and permalink for a paragraph
#[derive(Debug, Clone, Serialize)]
pub struct CitationResponse {
    pub id: u32,
    pub text: String,
    pub link: String,
}
