//! Dictionary-backed mention extraction for offline and test use.
//!
//! A substring scan over a fixed reaction lexicon. Not a replacement for
//! the trained model, but it exercises the same `MentionExtractor` seam
//! and keeps the pipeline usable when no model is deployed.

use once_cell::sync::Lazy;

use pharmvigil_core::pipeline::MentionExtractor;

// Longer phrases first so "abdominal pain" claims its span before a
// shorter overlapping term could.
static REACTION_TERMS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "shortness of breath",
        "difficulty breathing",
        "swelling of lips",
        "abdominal pain",
        "stomach ache",
        "palpitations",
        "chest pain",
        "skin rash",
        "drowsiness",
        "dizziness",
        "itchiness",
        "headache",
        "vomiting",
        "diarrhea",
        "fatigue",
        "rashes",
        "nausea",
        "fever",
        "hives",
        "cough",
        "rash",
    ]
});

/// Substring-scan extractor over the fixed reaction lexicon.
#[derive(Debug, Default)]
pub struct LexiconExtractor;

impl LexiconExtractor {
    pub fn new() -> Self {
        Self
    }

    /// All lexicon terms found in `text`, ordered by position of first
    /// occurrence, overlaps suppressed, deduplicated.
    pub fn scan(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        let mut claimed: Vec<(usize, usize)> = Vec::new();
        let mut found: Vec<(usize, &str)> = Vec::new();

        for term in REACTION_TERMS.iter().copied() {
            let mut from = 0;
            while let Some(pos) = lower[from..].find(term) {
                let start = from + pos;
                let end = start + term.len();
                if !claimed.iter().any(|&(s, e)| start < e && end > s) {
                    claimed.push((start, end));
                    found.push((start, term));
                }
                from = end;
            }
        }

        found.sort_by_key(|&(start, _)| start);

        let mut mentions = Vec::new();
        for (_, term) in found {
            let term = term.to_string();
            if !mentions.contains(&term) {
                mentions.push(term);
            }
        }
        mentions
    }
}

impl MentionExtractor for LexiconExtractor {
    fn extract_mentions(&self, text: &str) -> anyhow::Result<Vec<String>> {
        Ok(self.scan(text))
    }
}
