use crate::search::normalize::{fold_char, normalize};

/// A piece of displayed text, either matching the query or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub is_match: bool,
}

/// Folded form of `text` where every folded char remembers the index of the
/// original char it came from.
fn fold_with_origin(text: &str) -> (Vec<char>, Vec<usize>) {
    let mut folded = Vec::with_capacity(text.len());
    let mut origin = Vec::with_capacity(text.len());
    for (idx, c) in text.chars().enumerate() {
        for f in fold_char(c) {
            folded.push(f);
            origin.push(idx);
        }
    }
    (folded, origin)
}

/// Char ranges `[start, end)` of every non-overlapping, accent-insensitive
/// occurrence of `query` in `text`.
pub fn highlight_spans(text: &str, query: &str) -> Vec<(usize, usize)> {
    let needle: Vec<char> = normalize(query.trim()).chars().collect();
    if needle.is_empty() {
        return Vec::new();
    }

    let (hay, origin) = fold_with_origin(text);
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut i = 0;
    while i + needle.len() <= hay.len() {
        if hay[i..i + needle.len()] == needle[..] {
            let start = origin[i];
            let end = origin[i + needle.len() - 1] + 1;
            match spans.last_mut() {
                // one original char can fold to several chars
                Some(last) if start < last.1 => last.1 = last.1.max(end),
                _ => spans.push((start, end)),
            }
            i += needle.len();
        } else {
            i += 1;
        }
    }
    spans
}

/// Split `text` into alternating matched and unmatched segments.
pub fn highlight<'a>(text: &'a str, query: &str) -> Vec<Segment<'a>> {
    let spans = highlight_spans(text, query);
    if spans.is_empty() {
        return vec![Segment {
            text,
            is_match: false,
        }];
    }

    let mut boundaries: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
    boundaries.push(text.len());

    let mut segments = Vec::with_capacity(spans.len() * 2 + 1);
    let mut cursor = 0;
    for (start, end) in spans {
        let (start, end) = (boundaries[start], boundaries[end]);
        if start > cursor {
            segments.push(Segment {
                text: &text[cursor..start],
                is_match: false,
            });
        }
        segments.push(Segment {
            text: &text[start..end],
            is_match: true,
        });
        cursor = end;
    }
    if cursor < text.len() {
        segments.push(Segment {
            text: &text[cursor..],
            is_match: false,
        });
    }
    segments
}
