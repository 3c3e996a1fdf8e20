//! Medicine name normalization.
//!
//! Resolves free-text medicine mentions (brand or generic, possibly
//! multi-valued) to canonical generic names: brand resolution through the
//! brand map first, then a direct fuzzy match against the generic list.
//!
//! Nothing here errors on malformed input; an empty result is the failure
//! signal and callers treat it as "no canonical medicine for this record".

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::matcher::best_match;
use crate::vocab::Vocabulary;

/// Default acceptance threshold for medicine fuzzy matches.
pub const DEFAULT_THRESHOLD: u8 = 85;

// Medicines split on `+` in addition to the reaction delimiters, because
// combination drugs are written "Ibuprofen + Paracetamol".
static SPLIT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)[;,/+]|\band\b").unwrap());

static GARBAGE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(n/?a|none|unknown|nil|water|burger)$").unwrap());

/// Strict garbage detector for medicine fields.
///
/// Separate from [`crate::classify::is_garbage`]: medicine fields reject
/// short tokens and non-alphabetic noise outright, which would be too
/// aggressive for reaction text.
pub fn is_garbage(text: &str) -> bool {
    let t = text.trim().to_lowercase();
    if t.is_empty() {
        return true;
    }

    if GARBAGE_PATTERN.is_match(&t) {
        return true;
    }

    // kills bb, jj, xx
    if t.len() < 4 {
        return true;
    }

    if !t.chars().any(|c| c.is_ascii_alphabetic()) {
        return true;
    }

    false
}

/// Normalizer for medicine mentions, borrowing the loaded vocabulary.
pub struct MedicineNormalizer<'a> {
    vocab: &'a Vocabulary,
}

impl<'a> MedicineNormalizer<'a> {
    pub fn new(vocab: &'a Vocabulary) -> Self {
        Self { vocab }
    }

    /// Resolve a single free-text name to a canonical generic.
    ///
    /// Brand resolution wins over the direct generic match; when the brand
    /// map points at a string that is itself a canonical generic, the
    /// canonical spelling is returned verbatim.
    pub fn normalize_single(&self, name: &str, threshold: u8) -> Option<String> {
        if is_garbage(name) {
            return None;
        }
        let name = name.trim();

        if let Some(generic) = self.resolve_brand(name, threshold) {
            return Some(generic);
        }

        let generics = self.vocab.generics();
        if generics.is_empty() {
            return None;
        }
        let m = best_match(name, generics)?;
        (m.score >= threshold).then(|| m.candidate)
    }

    /// Split a possibly multi-valued field and normalize each part.
    ///
    /// Output is deduplicated and sorted ascending. Garbage parts
    /// contribute nothing.
    pub fn normalize_list(&self, raw: &str, threshold: u8) -> Vec<String> {
        if raw.trim().is_empty() {
            return Vec::new();
        }

        let mut names = BTreeSet::new();
        for part in SPLIT_PATTERN.split(raw) {
            if let Some(name) = self.normalize_single(part, threshold) {
                names.insert(name);
            }
        }
        names.into_iter().collect()
    }

    /// Union of the normalized brand and generic fields of one report.
    ///
    /// A report may carry brand info in one field and generics in the
    /// other, each itself multi-valued.
    pub fn normalize_brand_and_generic(
        &self,
        brand_text: &str,
        generic_text: &str,
        threshold: u8,
    ) -> Vec<String> {
        let mut names: BTreeSet<String> =
            self.normalize_list(brand_text, threshold).into_iter().collect();
        names.extend(self.normalize_list(generic_text, threshold));
        names.into_iter().collect()
    }

    fn resolve_brand(&self, name: &str, threshold: u8) -> Option<String> {
        let keys = self.vocab.brand_keys();
        if keys.is_empty() {
            return None;
        }

        let m = best_match(&name.to_lowercase(), keys)?;
        if m.score < threshold {
            return None;
        }

        let generic = self.vocab.brand_generic(&m.candidate)?;
        if let Some(canonical) = self.vocab.canonical_generic(generic) {
            return Some(canonical.to_string());
        }
        Some(generic.to_string())
    }
}
