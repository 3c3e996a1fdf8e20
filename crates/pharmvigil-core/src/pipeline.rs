//! Reaction-cleaning orchestrator.
//!
//! Combines optional entity extraction, fuzzy normalization, and garbage
//! classification into one pass over raw text buckets, producing a
//! weighted, deduplicated, sorted label distribution.
//!
//! Mention fallback chain per bucket: NER extractor (when configured and
//! successful) → fuzzy list splitting → the raw text itself. A bucket is
//! never discarded before each of its mentions has been evaluated.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::classify;
use crate::models::{NormalizedLabel, NormalizedReactions, RawTextBucket};
use crate::reaction::{ReactionNormalizer, DEFAULT_LIST_THRESHOLD, DEFAULT_SINGLE_THRESHOLD};
use crate::vocab::Vocabulary;

/// Sentinel label for medically relevant text with no canonical match.
pub const MEDICAL_UNMAPPED: &str = "Medical (Unmapped)";
/// Sentinel label used by [`UnmatchedPolicy::LabelUnspecified`].
pub const UNSPECIFIED: &str = "Unspecified";

/// Optional first-pass extractor of reaction mentions.
///
/// Implementations wrap an external NER capability. The cleaner treats an
/// absent extractor and a failing extractor identically, so errors here
/// never fail a batch. Implementations must return an empty list, not an
/// error, for empty input.
pub trait MentionExtractor {
    fn extract_mentions(&self, text: &str) -> anyhow::Result<Vec<String>>;
}

/// What to do with a mention that matches no canonical reaction term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnmatchedPolicy {
    /// Drop garbage and non-medical text; keep medical-looking text under
    /// the "Medical (Unmapped)" sentinel.
    #[default]
    DropNonMedical,
    /// Fold every unmatched mention into an "Unspecified" bucket.
    LabelUnspecified,
}

/// Orchestrates extraction, normalization, and classification over a batch
/// of raw text buckets.
pub struct ReactionCleaner<'a> {
    normalizer: ReactionNormalizer<'a>,
    extractor: Option<&'a dyn MentionExtractor>,
    policy: UnmatchedPolicy,
}

impl<'a> ReactionCleaner<'a> {
    pub fn new(vocab: &'a Vocabulary) -> Self {
        Self {
            normalizer: ReactionNormalizer::new(vocab),
            extractor: None,
            policy: UnmatchedPolicy::default(),
        }
    }

    /// Attach an entity extractor as the first-pass mention source.
    pub fn with_extractor(mut self, extractor: &'a dyn MentionExtractor) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Select the unmatched-mention policy.
    pub fn with_policy(mut self, policy: UnmatchedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Normalize a batch of buckets into a weighted label distribution.
    ///
    /// Labels are merged case-insensitively (first display casing wins)
    /// and sorted by accumulated weight descending, ties in first-seen
    /// order.
    pub fn normalize_reaction_items(&self, items: &[RawTextBucket]) -> NormalizedReactions {
        let mut counts: HashMap<String, u64> = HashMap::new();
        let mut display: HashMap<String, String> = HashMap::new();
        let mut order: Vec<String> = Vec::new();

        for item in items {
            let raw = clean_whitespace(&item.text);
            if raw.is_empty() {
                continue;
            }
            let weight = item.count.max(1);

            for mention in self.mentions_for(&raw) {
                let label = match self.normalizer.normalize(&mention, DEFAULT_SINGLE_THRESHOLD) {
                    Some(canonical) => canonical,
                    None => match self.policy {
                        UnmatchedPolicy::LabelUnspecified => UNSPECIFIED.to_string(),
                        UnmatchedPolicy::DropNonMedical => {
                            if classify::is_garbage(&mention) {
                                continue;
                            }
                            if classify::is_medical_like(&mention) {
                                MEDICAL_UNMAPPED.to_string()
                            } else {
                                continue;
                            }
                        }
                    },
                };

                let key = label.to_lowercase();
                if !counts.contains_key(&key) {
                    order.push(key.clone());
                    display.insert(key.clone(), label);
                }
                *counts.entry(key).or_insert(0) += weight;
            }
        }

        let mut ranked: Vec<(u64, usize, String)> = order
            .into_iter()
            .enumerate()
            .map(|(idx, key)| (counts[&key], idx, key))
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        NormalizedReactions {
            items: ranked
                .into_iter()
                .map(|(count, _, key)| NormalizedLabel {
                    label: display.remove(&key).unwrap_or(key),
                    count,
                })
                .collect(),
        }
    }

    /// Mention fallback chain: extractor → fuzzy list split → raw text.
    fn mentions_for(&self, raw: &str) -> Vec<String> {
        if let Some(extractor) = self.extractor {
            match extractor.extract_mentions(raw) {
                Ok(found) => {
                    let mut seen = HashSet::new();
                    let mut mentions = Vec::new();
                    for m in found {
                        let clean = clean_whitespace(&m);
                        if !clean.is_empty() && seen.insert(clean.to_lowercase()) {
                            mentions.push(clean);
                        }
                    }
                    if !mentions.is_empty() {
                        return mentions;
                    }
                }
                Err(err) => {
                    debug!("mention extraction failed, falling back: {err:#}");
                }
            }
        }

        let normalized = self.normalizer.normalize_list(raw, DEFAULT_LIST_THRESHOLD);
        if normalized.is_empty() {
            vec![raw.to_string()]
        } else {
            normalized
        }
    }
}

/// Collapse internal whitespace runs to single spaces and trim the ends.
pub fn clean_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
