use std::collections::HashSet;

use crate::models::{Paragraph, Provenance, SectionRange};

/// Combine local matches with the latest remote result set.
///
/// Remote paragraphs whose id is already among the local matches are
/// dropped, the remainder is restricted to `range`, and the whole sequence
/// is sorted by ascending id. Pure function of its inputs.
pub fn merge(local: &[Paragraph], remote: &[Paragraph], range: SectionRange) -> Vec<Paragraph> {
    let local_ids: HashSet<u32> = local.iter().map(|p| p.id).collect();
    let mut seen_remote = HashSet::new();

    let mut merged: Vec<Paragraph> = local.to_vec();
    merged.extend(
        remote
            .iter()
            .filter(|p| !local_ids.contains(&p.id))
            .filter(|p| range.contains(p.id))
            .filter(|p| seen_remote.insert(p.id))
            .map(|p| p.tagged(Provenance::Remote)),
    );
    merged.sort_by_key(|p| p.id);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Section;

    fn paragraph(id: u32, text: &str, source: Provenance) -> Paragraph {
        Paragraph {
            id,
            text: text.to_string(),
            section: None,
            bible_references: None,
            source: Some(source),
        }
    }

    #[test]
    fn test_local_wins_on_duplicate_id() {
        let local = vec![paragraph(27, "local text", Provenance::Local)];
        let remote = vec![
            paragraph(27, "remote text", Provenance::Remote),
            paragraph(30, "other", Provenance::Remote),
        ];
        let merged = merge(&local, &remote, Section::All.range());
        assert_eq!(merged.len(), 2);
        let p27: Vec<_> = merged.iter().filter(|p| p.id == 27).collect();
        assert_eq!(p27.len(), 1);
        assert_eq!(p27[0].text, "local text");
        assert_eq!(p27[0].source, Some(Provenance::Local));
    }

    #[test]
    fn test_sorted_ascending() {
        let local = vec![
            paragraph(5, "a", Provenance::Local),
            paragraph(2000, "b", Provenance::Local),
        ];
        let remote = vec![
            paragraph(1500, "c", Provenance::Remote),
            paragraph(1, "d", Provenance::Remote),
        ];
        let merged = merge(&local, &remote, Section::All.range());
        let ids: Vec<u32> = merged.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 5, 1500, 2000]);
    }

    #[test]
    fn test_remote_restricted_to_range() {
        let remote = vec![
            paragraph(100, "creed", Provenance::Remote),
            paragraph(1200, "sacrament", Provenance::Remote),
        ];
        let merged = merge(&[], &remote, Section::Sacraments.range());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, 1200);
    }

    #[test]
    fn test_remote_items_tagged_remote() {
        let mut untagged = paragraph(9, "x", Provenance::Local);
        untagged.source = None;
        let merged = merge(&[], &[untagged], Section::All.range());
        assert_eq!(merged[0].source, Some(Provenance::Remote));
    }

    #[test]
    fn test_repeated_remote_ids_collapse() {
        let remote = vec![
            paragraph(40, "first", Provenance::Remote),
            paragraph(40, "second", Provenance::Remote),
        ];
        let merged = merge(&[], &remote, Section::All.range());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "first");
    }

    #[test]
    fn test_idempotent() {
        let local = vec![paragraph(3, "a", Provenance::Local)];
        let remote = vec![paragraph(2, "b", Provenance::Remote)];
        let once = merge(&local, &remote, Section::All.range());
        let twice = merge(&local, &remote, Section::All.range());
        assert_eq!(once, twice);
    }
}
