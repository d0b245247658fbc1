use crate::models::Paragraph;

const PERMALINK_PREFIX: &str = "/paragraph/";

/// Text put on the clipboard by "copy text".
pub fn citation_text(corpus_name: &str, paragraph: &Paragraph) -> String {
    format!("{corpus_name}, §{}\n\n\"{}\"", paragraph.id, paragraph.text)
}

/// Absolute link to a paragraph, addressed through the URL fragment.
pub fn permalink(base_url: &str, id: u32) -> String {
    let base = base_url.split('#').next().unwrap_or(base_url);
    format!("{base}#{PERMALINK_PREFIX}{id}")
}

/// Extract the paragraph id from a permalink.
///
/// Accepts a full URL, a bare fragment (`#/paragraph/27`) or a path
/// (`/paragraph/27`).
pub fn parse_permalink(link: &str) -> Option<u32> {
    let link = link.trim();
    let tail = match link.rfind(PERMALINK_PREFIX) {
        Some(idx) => &link[idx + PERMALINK_PREFIX.len()..],
        None => return None,
    };
    let digits = tail.trim_end_matches('/');
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
