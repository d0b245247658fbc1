use unicode_normalization::UnicodeNormalization;

/// True for the combining diacritical marks block (U+0300..=U+036F).
pub fn is_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Folded form of a single char: lowercased, decomposed (NFD), combining
/// marks dropped. Case is folded per char, never with context rules such as
/// the Greek final sigma, so highlighting can map every folded char back to
/// its source char.
pub fn fold_char(c: char) -> impl Iterator<Item = char> {
    c.to_lowercase().nfd().filter(|f| !is_diacritic(*f))
}

/// Fold case and strip accents so "Oração" and "oracao" compare equal.
pub fn normalize(text: &str) -> String {
    text.chars().flat_map(fold_char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_portuguese_accents() {
        assert_eq!(normalize("Oração"), "oracao");
        assert_eq!(normalize("Profissão de Fé"), "profissao de fe");
        assert_eq!(normalize("ÁPICE à Páscoa"), "apice a pascoa");
        assert_eq!(normalize("Cristã"), "crista");
    }

    #[test]
    fn test_idempotent() {
        for s in ["Oração Cristã", "Eucaristia", "§27", "Árvore ÇÃO", ""] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_precomposed_and_decomposed_agree() {
        let precomposed = "ora\u{00e7}\u{00e3}o";
        let decomposed = "orac\u{0327}a\u{0303}o";
        assert_eq!(normalize(precomposed), normalize(decomposed));
    }

    #[test]
    fn test_case_folded_per_char() {
        // no final-sigma rule: a trailing capital sigma folds to medial sigma
        assert_eq!(normalize("ΟΔΟΣ"), "οδοσ");
    }

    #[test]
    fn test_digits_and_punctuation_untouched() {
        assert_eq!(normalize("1 Coríntios 5:7"), "1 corintios 5:7");
    }
}
