#![forbid(unsafe_code)]

//! Filtering: registry + query → visible items with scores.
//!
//! Filtering is *active* only when the query is non-empty and filtering is
//! enabled. While inactive every item is visible, nothing is scored, and the
//! scorer is never consulted.
//!
//! Force-mounted items (and members of force-mounted groups) are outside the
//! filter: they carry no score, are never hidden, and do not count toward
//! [`FilterResult::count`].

use std::collections::{HashMap, HashSet};

use crate::registry::{GroupId, Item, ItemId, Registry};
use crate::scorer::ScoreFn;

/// Derived visibility for one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterResult {
    query: String,
    active: bool,
    scores: HashMap<ItemId, f64>,
    groups: HashSet<GroupId>,
    count: usize,
}

/// Clamp scorer output into `[0, 1]`; NaN counts as no match.
fn sanitize(score: f64) -> f64 {
    if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) }
}

fn score_item(item: &Item, query: &str, scorer: &dyn ScoreFn) -> f64 {
    if item.value.is_empty() {
        return 0.0;
    }
    sanitize(scorer.score(&item.value, query, &item.keywords))
}

impl FilterResult {
    /// Compute visibility for `query` over every mounted item.
    pub fn compute(
        query: &str,
        should_filter: bool,
        registry: &Registry,
        scorer: &dyn ScoreFn,
    ) -> Self {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "cmdk.filter",
            query_len = query.len(),
            items = registry.len()
        )
        .entered();

        let active = should_filter && !query.is_empty();
        let mut result = Self {
            query: query.to_string(),
            active,
            ..Self::default()
        };

        if !active {
            result.count = registry.tracked_len();
            result.groups = registry
                .groups()
                .filter(|g| g.force_mount || !g.is_empty())
                .map(|g| g.id.clone())
                .collect();
            return result;
        }

        for item in registry.items() {
            if registry.is_forced(item) {
                continue;
            }
            let score = score_item(item, query, scorer);
            if score > 0.0 {
                result.count += 1;
            }
            result.scores.insert(item.id.clone(), score);
        }

        let visible: Vec<GroupId> = registry
            .groups()
            .filter(|g| result.group_has_visible_member(registry, &g.id))
            .map(|g| g.id.clone())
            .collect();
        result.groups.extend(visible);

        cmdk_core::debug!(count = result.count, groups = result.groups.len(), "filtered");
        result
    }

    /// Re-score a single item in place after it was added or its value,
    /// keywords, flags, or membership changed.
    ///
    /// The caller refreshes the item's previous group if it moved.
    pub fn rescore(&mut self, registry: &Registry, scorer: &dyn ScoreFn, id: &ItemId) {
        let Some(item) = registry.item(id) else {
            return;
        };

        if self.active {
            let was_counted = self.counts(id);
            if registry.is_forced(item) {
                self.scores.remove(id);
            } else {
                let score = score_item(item, &self.query, scorer);
                self.scores.insert(id.clone(), score);
            }
            let now_counted = self.counts(id);
            self.adjust_count(was_counted, now_counted);
        } else {
            self.count = registry.tracked_len();
        }

        if let Some(group) = &item.group {
            if self.is_item_visible(registry, id) {
                self.groups.insert(group.clone());
            } else {
                self.refresh_group(registry, group);
            }
        }
    }

    /// Drop an item that has already left the registry. `group` is the
    /// group it belonged to.
    pub fn remove(&mut self, registry: &Registry, id: &ItemId, group: Option<&GroupId>) {
        if self.active {
            let was_counted = self.counts(id);
            self.scores.remove(id);
            self.adjust_count(was_counted, false);
        } else {
            self.count = registry.tracked_len();
        }
        if let Some(group) = group {
            self.refresh_group(registry, group);
        }
    }

    /// Recompute one group's visibility from its members.
    pub fn refresh_group(&mut self, registry: &Registry, group: &GroupId) {
        let visible = match registry.group(group) {
            None => false,
            Some(g) if !self.active => g.force_mount || !g.is_empty(),
            Some(_) => self.group_has_visible_member(registry, group),
        };
        if visible {
            self.groups.insert(group.clone());
        } else {
            self.groups.remove(group);
        }
    }

    fn group_has_visible_member(&self, registry: &Registry, group: &GroupId) -> bool {
        let Some(g) = registry.group(group) else {
            return false;
        };
        g.force_mount || g.members().any(|m| self.is_item_visible(registry, m))
    }

    fn counts(&self, id: &ItemId) -> bool {
        self.scores.get(id).is_some_and(|s| *s > 0.0)
    }

    fn adjust_count(&mut self, was: bool, now: bool) {
        match (was, now) {
            (false, true) => self.count += 1,
            (true, false) => self.count = self.count.saturating_sub(1),
            _ => {}
        }
    }

    /// The query this result was computed for.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether filtering (and therefore sorting) is in effect.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of visible, filter-tracked items.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Score for an item; `None` when inactive or the item is force-mounted.
    pub fn score(&self, id: &ItemId) -> Option<f64> {
        self.scores.get(id).copied()
    }

    pub fn is_group_visible(&self, group: &GroupId) -> bool {
        self.groups.contains(group)
    }

    /// Visible groups, in no particular order.
    pub fn visible_groups(&self) -> impl Iterator<Item = &GroupId> {
        self.groups.iter()
    }

    /// Whether a mounted item renders under this result.
    pub fn is_item_visible(&self, registry: &Registry, id: &ItemId) -> bool {
        let Some(item) = registry.item(id) else {
            return false;
        };
        if !self.active || registry.is_forced(item) {
            return true;
        }
        self.counts(id)
    }
}
