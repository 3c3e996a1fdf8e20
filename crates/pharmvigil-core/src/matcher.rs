//! Fuzzy string matching against candidate vocabularies.
//!
//! Scores combine character-level similarity (Jaro-Winkler for typos,
//! Levenshtein for overall distance) with a token-set overlap so that
//! reordered multi-word phrases still match.

use strsim::{jaro_winkler, normalized_levenshtein};

/// Best fuzzy match for a term against a candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyMatch {
    /// The winning candidate, verbatim from the input list.
    pub candidate: String,
    /// Similarity score in 0..=100.
    pub score: u8,
}

/// Find the candidate maximizing similarity with `term`.
///
/// Returns `None` when `term` is blank or `candidates` is empty. Ties are
/// broken by earliest position in `candidates`, so the result is stable
/// for a fixed candidate ordering.
pub fn best_match<S: AsRef<str>>(term: &str, candidates: &[S]) -> Option<FuzzyMatch> {
    if term.trim().is_empty() || candidates.is_empty() {
        return None;
    }

    let needle = preprocess(term);
    let mut best: Option<(usize, f64)> = None;

    for (idx, candidate) in candidates.iter().enumerate() {
        let sim = similarity(&needle, &preprocess(candidate.as_ref()));
        match best {
            Some((_, top)) if sim <= top => {}
            _ => best = Some((idx, sim)),
        }
    }

    best.map(|(idx, sim)| FuzzyMatch {
        candidate: candidates[idx].as_ref().to_string(),
        score: (sim * 100.0).round() as u8,
    })
}

/// Lowercase, strip punctuation to spaces, collapse whitespace runs.
fn preprocess(s: &str) -> String {
    let lowered: String = s
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Similarity in 0.0..=1.0 between two preprocessed strings.
fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    // Jaro-Winkler weighted higher: better for prefix-preserving typos.
    let char_score = jaro_winkler(a, b) * 0.6 + normalized_levenshtein(a, b) * 0.4;
    char_score.max(token_overlap(a, b))
}

/// Jaccard overlap of word sets, for order-insensitive phrase matching.
fn token_overlap(a: &str, b: &str) -> f64 {
    let set_a: std::collections::HashSet<&str> = a.split_whitespace().collect();
    let set_b: std::collections::HashSet<&str> = b.split_whitespace().collect();
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count() as f64;
    let union = set_a.union(&set_b).count() as f64;
    intersection / union
}
