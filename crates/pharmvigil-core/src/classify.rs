//! Reaction-side relevance classifier.
//!
//! Two independent predicates over free text: [`is_garbage`] flags
//! non-informative input, [`is_medical_like`] flags text that looks
//! clinically relevant. A text can be neither.
//!
//! The medicine pipeline carries its own, stricter detector (see
//! [`crate::medicine::is_garbage`]); the two operate on different
//! vocabularies and are deliberately not shared.

use once_cell::sync::Lazy;
use regex::Regex;

/// Substring hints that mark a text as medically relevant.
const MEDICAL_HINTS: [&str; 16] = [
    "pain",
    "ache",
    "rash",
    "swelling",
    "itch",
    "vomit",
    "nausea",
    "dizz",
    "breath",
    "palp",
    "fever",
    "head",
    "chest",
    "abdominal",
    "skin",
    "throat",
];

static GARBAGE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d+$").unwrap(),
        Regex::new(r"^(n/?a|none|nil|unknown)$").unwrap(),
    ]
});

/// True when the text is non-informative: blank, a placeholder token,
/// pure digits, or a single word with no medical hint in it.
pub fn is_garbage(text: &str) -> bool {
    let t = text.trim().to_lowercase();
    if t.is_empty() {
        return true;
    }

    if GARBAGE_PATTERNS.iter().any(|p| p.is_match(&t)) {
        return true;
    }

    // single word, no medical hint
    if t.split_whitespace().count() == 1 && !MEDICAL_HINTS.iter().any(|h| t.contains(h)) {
        return true;
    }

    false
}

/// True when the lowercased text contains any medical-hint substring.
pub fn is_medical_like(text: &str) -> bool {
    let t = text.to_lowercase();
    MEDICAL_HINTS.iter().any(|h| t.contains(h))
}
