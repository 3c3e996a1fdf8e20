//! Aggregation over raw report rows.
//!
//! Joins normalized labels and medicines against the external row source,
//! producing ranked count distributions for the hosting layer.

use std::collections::HashMap;

use log::debug;

use crate::medicine::{MedicineNormalizer, DEFAULT_THRESHOLD};
use crate::models::{MedicineCount, NormalizedLabel, RawTextBucket, ReportFilter};
use crate::pipeline::ReactionCleaner;
use crate::store::{ReportStore, StoreResult};
use crate::vocab::Vocabulary;

/// How `top_adrs` turns raw reaction rows into ranked labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdrCounting {
    /// Bucket raw texts, then normalize through the reaction cleaner.
    #[default]
    Normalized,
    /// Count raw texts verbatim, no normalization.
    Verbatim,
}

/// Aggregation service over a report store and the loaded vocabulary.
pub struct Analytics<'a> {
    store: &'a dyn ReportStore,
    vocab: &'a Vocabulary,
    cleaner: ReactionCleaner<'a>,
}

impl<'a> Analytics<'a> {
    pub fn new(
        store: &'a dyn ReportStore,
        vocab: &'a Vocabulary,
        cleaner: ReactionCleaner<'a>,
    ) -> Self {
        Self {
            store,
            vocab,
            cleaner,
        }
    }

    /// Fetch raw reaction texts and aggregate counts per identical text.
    ///
    /// No normalization happens here; buckets come out in first-seen
    /// order.
    pub fn raw_reaction_buckets(&self, filter: &ReportFilter) -> StoreResult<Vec<RawTextBucket>> {
        let rows = self.store.reaction_texts(filter)?;

        let mut counts: HashMap<String, u64> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for raw in rows {
            let text = raw.trim();
            if text.is_empty() {
                continue;
            }
            if !counts.contains_key(text) {
                order.push(text.to_string());
            }
            *counts.entry(text.to_string()).or_insert(0) += 1;
        }

        debug!("aggregated {} raw reaction buckets", order.len());
        Ok(order
            .into_iter()
            .map(|text| {
                let count = counts[&text];
                RawTextBucket { text, count }
            })
            .collect())
    }

    /// Ranked ADR labels with the default (normalized) counting strategy.
    /// `limit = None` returns the full ranking.
    pub fn top_adrs(&self, limit: Option<usize>) -> StoreResult<Vec<NormalizedLabel>> {
        self.top_adrs_with(AdrCounting::Normalized, limit, &ReportFilter::default())
    }

    /// Ranked ADR labels with an explicit counting strategy and filter.
    /// The limit applies after normalization.
    pub fn top_adrs_with(
        &self,
        counting: AdrCounting,
        limit: Option<usize>,
        filter: &ReportFilter,
    ) -> StoreResult<Vec<NormalizedLabel>> {
        let buckets = self.raw_reaction_buckets(filter)?;

        let mut items = match counting {
            AdrCounting::Normalized => self.cleaner.normalize_reaction_items(&buckets).items,
            AdrCounting::Verbatim => {
                let mut items: Vec<NormalizedLabel> = buckets
                    .into_iter()
                    .map(|b| NormalizedLabel {
                        label: b.text,
                        count: b.count,
                    })
                    .collect();
                // Stable sort keeps first-seen order for equal counts.
                items.sort_by(|a, b| b.count.cmp(&a.count));
                items
            }
        };

        if let Some(limit) = limit {
            items.truncate(limit);
        }
        Ok(items)
    }

    /// Ranked report counts per canonical medicine. `limit = None` returns
    /// the full ranking.
    pub fn top_medicines(&self, limit: Option<usize>) -> StoreResult<Vec<MedicineCount>> {
        let canonical_by_id = self.medicine_canonical_map()?;
        let ids = self.store.report_medicine_ids()?;

        let mut counts: HashMap<String, u64> = HashMap::new();
        for id in ids {
            // Unmapped ids are silently excluded, not errors.
            if let Some(name) = canonical_by_id.get(&id) {
                *counts.entry(name.clone()).or_insert(0) += 1;
            }
        }

        let mut items: Vec<MedicineCount> = counts
            .into_iter()
            .map(|(medicine, count)| MedicineCount { medicine, count })
            .collect();
        items.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.medicine.cmp(&b.medicine)));

        if let Some(limit) = limit {
            items.truncate(limit);
        }
        Ok(items)
    }

    /// Distinct canonical medicine names, sorted ascending. Suitable for
    /// dropdown filters.
    pub fn medicine_names(&self) -> StoreResult<Vec<String>> {
        let mut names: Vec<String> = self
            .top_medicines(None)?
            .into_iter()
            .map(|m| m.medicine)
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Normalize every medicine master record into id → canonical name.
    ///
    /// Recomputed per call; records that resolve to nothing are skipped.
    fn medicine_canonical_map(&self) -> StoreResult<HashMap<i64, String>> {
        let normalizer = MedicineNormalizer::new(self.vocab);
        let records = self.store.medicine_records()?;

        let mut map = HashMap::new();
        for record in records {
            let names = normalizer.normalize_brand_and_generic(
                &record.brand_name,
                &record.generic_name,
                DEFAULT_THRESHOLD,
            );
            match names.into_iter().next() {
                Some(name) => {
                    map.insert(record.id, name);
                }
                None => debug!(
                    "medicine record {} resolved to no canonical name",
                    record.id
                ),
            }
        }
        Ok(map)
    }
}
