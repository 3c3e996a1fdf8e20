//! Reaction (ADR) normalization against the canonical reaction vocabulary.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::matcher::best_match;
use crate::vocab::Vocabulary;

/// Default threshold for whole-string matching. Looser than the list
/// threshold: a whole free-text field has more noise headroom than each
/// pre-split item.
pub const DEFAULT_SINGLE_THRESHOLD: u8 = 70;
/// Default threshold applied to each item of a split list.
pub const DEFAULT_LIST_THRESHOLD: u8 = 85;

// Reactions split on `; , /` or the spelled-out word " and "; the medicine
// delimiter set additionally has `+` (see `medicine`).
static SPLIT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)[;,/]| and ").unwrap());

/// Normalizer for reaction mentions, borrowing the loaded vocabulary.
pub struct ReactionNormalizer<'a> {
    vocab: &'a Vocabulary,
}

impl<'a> ReactionNormalizer<'a> {
    pub fn new(vocab: &'a Vocabulary) -> Self {
        Self { vocab }
    }

    /// Normalize one free-text reaction to its closest canonical term.
    pub fn normalize(&self, raw: &str, threshold: u8) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let m = best_match(raw, self.vocab.reactions())?;
        (m.score >= threshold).then(|| m.candidate)
    }

    /// Split a multi-valued reaction field and normalize each part.
    ///
    /// Preserves first-seen order, skips parts that fail to normalize,
    /// and skips exact duplicates.
    pub fn normalize_list(&self, raw: &str, threshold: u8) -> Vec<String> {
        if raw.is_empty() {
            return Vec::new();
        }

        let mut normalized = Vec::new();
        for part in SPLIT_PATTERN.split(raw) {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if let Some(term) = self.normalize(part, threshold) {
                if !normalized.contains(&term) {
                    normalized.push(term);
                }
            }
        }
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_vocab() -> Vocabulary {
        Vocabulary::from_parts(
            vec![
                "Rashes".into(),
                "Headache".into(),
                "Dizziness".into(),
                "Abdominal Pain".into(),
                "Shortness of Breath".into(),
                "Vomiting".into(),
                "Nausea".into(),
                "Fever".into(),
            ],
            vec![],
            "",
        )
    }

    #[test]
    fn test_exact_term_matches() {
        let vocab = test_vocab();
        let normalizer = ReactionNormalizer::new(&vocab);
        assert_eq!(
            normalizer.normalize("nausea", DEFAULT_SINGLE_THRESHOLD),
            Some("Nausea".to_string())
        );
    }

    #[test]
    fn test_canonical_terms_are_fixed_points() {
        let vocab = test_vocab();
        let normalizer = ReactionNormalizer::new(&vocab);
        for term in vocab.reactions() {
            assert_eq!(
                normalizer.normalize(term, DEFAULT_SINGLE_THRESHOLD).as_deref(),
                Some(term.as_str()),
                "canonical term {term} must map to itself"
            );
        }
    }

    #[test]
    fn test_typos_normalize() {
        let vocab = test_vocab();
        let normalizer = ReactionNormalizer::new(&vocab);
        assert_eq!(
            normalizer.normalize("feverr", DEFAULT_LIST_THRESHOLD),
            Some("Fever".to_string())
        );
        assert_eq!(
            normalizer.normalize("head ache", DEFAULT_LIST_THRESHOLD),
            Some("Headache".to_string())
        );
    }

    #[test]
    fn test_empty_and_unknown_are_absent() {
        let vocab = test_vocab();
        let normalizer = ReactionNormalizer::new(&vocab);
        assert!(normalizer.normalize("", DEFAULT_SINGLE_THRESHOLD).is_none());
        assert!(normalizer.normalize("  ", DEFAULT_SINGLE_THRESHOLD).is_none());
        assert!(normalizer
            .normalize("completely unrelated words", 70)
            .is_none());
    }

    #[test]
    fn test_list_preserves_order_and_dedupes() {
        let vocab = test_vocab();
        let normalizer = ReactionNormalizer::new(&vocab);
        let terms = normalizer.normalize_list(
            "feverr, head ache; nausea / fever and nausea",
            DEFAULT_LIST_THRESHOLD,
        );
        assert_eq!(terms, ["Fever", "Headache", "Nausea"]);
    }

    #[test]
    fn test_list_skips_unmatched_parts() {
        let vocab = test_vocab();
        let normalizer = ReactionNormalizer::new(&vocab);
        let terms = normalizer.normalize_list("gibberish xyz, vomiting", DEFAULT_LIST_THRESHOLD);
        assert_eq!(terms, ["Vomiting"]);
    }

    #[test]
    fn test_word_and_is_a_delimiter() {
        let vocab = test_vocab();
        let normalizer = ReactionNormalizer::new(&vocab);
        let terms = normalizer.normalize_list("fever AND dizziness", DEFAULT_LIST_THRESHOLD);
        assert_eq!(terms, ["Fever", "Dizziness"]);
    }

    #[test]
    fn test_empty_input_yields_empty_list() {
        let vocab = test_vocab();
        let normalizer = ReactionNormalizer::new(&vocab);
        assert!(normalizer.normalize_list("", DEFAULT_LIST_THRESHOLD).is_empty());
    }
}
