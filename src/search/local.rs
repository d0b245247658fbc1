use crate::corpus::Corpus;
use crate::models::{Paragraph, Provenance, SectionRange};
use crate::search::normalize::normalize;

/// Filter the corpus against a query and a section range.
///
/// A paragraph matches when its id is inside `range` and either the query is
/// blank, its decimal id contains the normalized query, or its normalized
/// text does. Results keep corpus order and are tagged [`Provenance::Local`].
pub fn local_match(corpus: &Corpus, query: &str, range: SectionRange) -> Vec<Paragraph> {
    let needle = normalize(query.trim());

    corpus
        .paragraphs()
        .iter()
        .filter(|p| range.contains(p.id))
        .filter(|p| {
            needle.is_empty()
                || p.id.to_string().contains(&needle)
                || normalize(&p.text).contains(&needle)
        })
        .map(|p| p.tagged(Provenance::Local))
        .collect()
}
