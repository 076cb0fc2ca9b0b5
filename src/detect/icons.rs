//! Item icon detection.
//!
//! Variants are grouped by item code and template set. Inside a group the
//! largest variants are tried first and the group stops as soon as one scores
//! above `high_confidence`; such a hit also marks the item as found, and
//! groups of the same item that have not started yet are skipped. Groups run
//! on a dedicated worker pool when the `rayon` feature is enabled.
//!
//! Every surviving match then goes through overlap suppression that also
//! keeps at most one detection per item code.

use crate::bbox::BoundingBox;
use crate::candidate::nms::{suppress_overlaps_per_key, Scored};
use crate::detect::CancelToken;
use crate::search::{Match, MatchConfig, SearchImage, TemplateMatcher};
use crate::template::{Template, TemplateKey, TemplateStore, VariantKey};
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::util::{StockMatchError, StockMatchResult};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, PoisonError};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// An item icon found in a screenshot.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IconDetection {
    /// Canonical item code of the matched variant.
    pub item_code: String,
    /// Template set the matched variant was loaded from.
    pub set: u16,
    /// Ordinal of the matched variant inside its item directory.
    pub ordinal: u16,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl IconDetection {
    fn from_match(variant: &VariantKey, m: Match) -> Self {
        Self {
            item_code: variant.item_code.clone(),
            set: variant.set,
            ordinal: variant.ordinal,
            confidence: m.confidence,
            bbox: m.bbox,
        }
    }
}

impl Scored for IconDetection {
    fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    fn confidence(&self) -> f32 {
        self.confidence
    }

    fn tie_key(&self) -> &str {
        &self.item_code
    }
}

/// Counters describing one icon search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IconSearchStats {
    /// Groups whose variants were evaluated.
    pub groups_evaluated: usize,
    /// Groups skipped because their item was already found elsewhere.
    pub groups_skipped: usize,
    /// Groups that stopped before trying all variants.
    pub early_exits: usize,
    /// Variant correlations performed.
    pub variants_tried: usize,
    /// Matches discarded by overlap suppression.
    pub suppressed: usize,
}

/// Variants of one item from one template set, largest first.
#[derive(Clone, Debug)]
struct VariantGroup {
    item_code: String,
    set: u16,
    members: Vec<usize>,
}

enum GroupOutcome {
    Skipped,
    Cancelled,
    Evaluated {
        best: Option<IconDetection>,
        tried: usize,
        early_exit: bool,
    },
}

/// Item codes confirmed with high confidence during the current search.
#[derive(Default)]
struct FoundSet(Mutex<HashSet<String>>);

impl FoundSet {
    fn contains(&self, item_code: &str) -> bool {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(item_code)
    }

    fn insert(&self, item_code: &str) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(item_code.to_owned());
    }
}

/// Finds item icons using a store of pose variants.
#[derive(Debug)]
pub struct IconDetector {
    store: TemplateStore,
    groups: Vec<VariantGroup>,
    matcher: TemplateMatcher,
    #[cfg(feature = "rayon")]
    pool: rayon::ThreadPool,
}

impl IconDetector {
    /// Builds a detector with a worker count derived from the host.
    pub fn new(store: TemplateStore, cfg: MatchConfig) -> StockMatchResult<Self> {
        Self::with_workers(store, cfg, None)
    }

    /// Builds a detector with an explicit worker count.
    ///
    /// `None` uses one worker less than the available parallelism, at least
    /// one. Glyph templates in the store are ignored.
    pub fn with_workers(
        store: TemplateStore,
        cfg: MatchConfig,
        workers: Option<usize>,
    ) -> StockMatchResult<Self> {
        cfg.validate()?;
        let groups = build_groups(&store);
        if groups.is_empty() {
            return Err(StockMatchError::EmptyTemplateSet { kind: "icon" });
        }
        let workers = match workers {
            Some(0) => return Err(StockMatchError::config("workers must be positive")),
            Some(n) => n,
            None => default_workers(),
        };
        trace_debug!(
            "icon_detector_ready",
            groups = groups.len(),
            variants = store.len(),
            workers = workers
        );

        #[cfg(feature = "rayon")]
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|idx| format!("stockmatch-icons-{idx}"))
            .build()
            .map_err(|err| StockMatchError::WorkerPool {
                reason: err.to_string(),
            })?;
        #[cfg(not(feature = "rayon"))]
        let _ = workers;

        Ok(Self {
            store,
            groups,
            matcher: TemplateMatcher::new(cfg),
            #[cfg(feature = "rayon")]
            pool,
        })
    }

    pub fn config(&self) -> &MatchConfig {
        self.matcher.config()
    }

    /// Number of (item code, set) groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of worker threads used for group evaluation.
    pub fn workers(&self) -> usize {
        #[cfg(feature = "rayon")]
        {
            self.pool.current_num_threads()
        }
        #[cfg(not(feature = "rayon"))]
        {
            1
        }
    }

    /// Detects item icons; at most one detection per item code.
    pub fn detect_items(&self, image: &SearchImage) -> StockMatchResult<Vec<IconDetection>> {
        self.search(image, None).map(|(items, _)| items)
    }

    /// Like [`detect_items`](Self::detect_items), aborting when `cancel` fires.
    pub fn detect_items_cancellable(
        &self,
        image: &SearchImage,
        cancel: &CancelToken,
    ) -> StockMatchResult<Vec<IconDetection>> {
        self.search(image, Some(cancel)).map(|(items, _)| items)
    }

    /// Detects item icons and reports search counters.
    pub fn detect_items_with_stats(
        &self,
        image: &SearchImage,
    ) -> StockMatchResult<(Vec<IconDetection>, IconSearchStats)> {
        self.search(image, None)
    }

    fn search(
        &self,
        image: &SearchImage,
        cancel: Option<&CancelToken>,
    ) -> StockMatchResult<(Vec<IconDetection>, IconSearchStats)> {
        let _span = trace_span!(
            "detect_items",
            groups = self.groups.len(),
            width = image.width(),
            height = image.height()
        )
        .entered();
        let found = FoundSet::default();

        #[cfg(feature = "rayon")]
        let outcomes: Vec<GroupOutcome> = self.pool.install(|| {
            self.groups
                .par_iter()
                .map(|group| self.evaluate_group(image, group, &found, cancel))
                .collect()
        });
        #[cfg(not(feature = "rayon"))]
        let outcomes: Vec<GroupOutcome> = self
            .groups
            .iter()
            .map(|group| self.evaluate_group(image, group, &found, cancel))
            .collect();

        let mut stats = IconSearchStats::default();
        let mut hits = Vec::new();
        for outcome in outcomes {
            match outcome {
                GroupOutcome::Cancelled => return Err(StockMatchError::Cancelled),
                GroupOutcome::Skipped => stats.groups_skipped += 1,
                GroupOutcome::Evaluated {
                    best,
                    tried,
                    early_exit,
                } => {
                    stats.groups_evaluated += 1;
                    stats.variants_tried += tried;
                    if early_exit {
                        stats.early_exits += 1;
                    }
                    hits.extend(best);
                }
            }
        }

        let raw = hits.len();
        let mut items = suppress_overlaps_per_key(hits, |d| d.item_code.as_str());
        stats.suppressed = raw - items.len();
        items.sort_by(|a, b| {
            (a.bbox.y, a.bbox.x, &a.item_code).cmp(&(b.bbox.y, b.bbox.x, &b.item_code))
        });

        trace_event!(
            "items_detected",
            count = items.len(),
            groups_evaluated = stats.groups_evaluated,
            groups_skipped = stats.groups_skipped,
            early_exits = stats.early_exits,
            suppressed = stats.suppressed
        );
        Ok((items, stats))
    }

    fn evaluate_group(
        &self,
        image: &SearchImage,
        group: &VariantGroup,
        found: &FoundSet,
        cancel: Option<&CancelToken>,
    ) -> GroupOutcome {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return GroupOutcome::Cancelled;
        }
        if found.contains(&group.item_code) {
            return GroupOutcome::Skipped;
        }

        let high = self.matcher.config().high_confidence;
        let mut best: Option<IconDetection> = None;
        let mut tried = 0;
        let mut early_exit = false;
        for &idx in &group.members {
            let Some(template) = self.template(idx) else {
                continue;
            };
            let TemplateKey::Variant(variant) = template.key() else {
                continue;
            };
            tried += 1;
            let Some(m) = self.matcher.best_match(image, template) else {
                continue;
            };
            if best.as_ref().map_or(true, |b| m.confidence > b.confidence) {
                best = Some(IconDetection::from_match(variant, m));
            }
            if best.as_ref().is_some_and(|b| b.confidence > high) {
                found.insert(&group.item_code);
                early_exit = tried < group.members.len();
                break;
            }
        }
        trace_debug!(
            "group_evaluated",
            item = group.item_code.as_str(),
            set = group.set,
            tried = tried,
            hit = best.is_some()
        );
        GroupOutcome::Evaluated {
            best,
            tried,
            early_exit,
        }
    }

    fn template(&self, idx: usize) -> Option<&Template> {
        self.store.get_index(idx)
    }
}

/// Groups variant templates by (item code, set), largest area first.
fn build_groups(store: &TemplateStore) -> Vec<VariantGroup> {
    let mut by_key: BTreeMap<(&str, u16), Vec<(usize, &Template)>> = BTreeMap::new();
    for (idx, template) in store.iter().enumerate() {
        if let TemplateKey::Variant(variant) = template.key() {
            by_key
                .entry((variant.item_code(), variant.set))
                .or_default()
                .push((idx, template));
        }
    }
    by_key
        .into_iter()
        .map(|((item_code, set), mut members)| {
            members.sort_by(|(_, a), (_, b)| {
                b.area().cmp(&a.area()).then_with(|| a.key().cmp(b.key()))
            });
            VariantGroup {
                item_code: item_code.to_owned(),
                set,
                members: members.into_iter().map(|(idx, _)| idx).collect(),
            }
        })
        .collect()
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::{build_groups, default_workers};
    use crate::template::{Template, TemplateKey, TemplateStore, VariantKey};

    fn variant(code: &str, set: u16, ordinal: u16, side: usize) -> Template {
        let data = (0..side * side).map(|i| (i * 37 % 251) as u8).collect();
        Template::from_luma(
            TemplateKey::Variant(VariantKey::new(code, set, ordinal)),
            data,
            side,
            side,
        )
        .unwrap()
    }

    #[test]
    fn groups_are_keyed_by_item_and_set_largest_first() {
        let store = TemplateStore::from_templates(vec![
            variant("Rifle", 0, 0, 8),
            variant("Ammo", 0, 0, 6),
            variant("Rifle", 0, 1, 12),
            variant("Rifle", 1, 0, 10),
            Template::from_luma(TemplateKey::Glyph("num1".into()), (0..16).collect(), 4, 4)
                .unwrap(),
        ]);
        let groups = build_groups(&store);
        let keys: Vec<(&str, u16)> = groups
            .iter()
            .map(|g| (g.item_code.as_str(), g.set))
            .collect();
        assert_eq!(keys, vec![("Ammo", 0), ("Rifle", 0), ("Rifle", 1)]);
        assert_eq!(groups[1].members, vec![2, 0]);
    }

    #[test]
    fn at_least_one_worker() {
        assert!(default_workers() >= 1);
    }
}
