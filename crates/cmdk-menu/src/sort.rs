#![forbid(unsafe_code)]

//! Render order: which items and groups appear, and in what sequence.
//!
//! While filtering is inactive the order is the natural mount order, with
//! groups interleaved where they were first seen. While active:
//!
//! - Ungrouped items come first, by descending score.
//! - Groups follow, by descending best-member score.
//! - Members within a group are sorted by descending score.
//!
//! Every sort is stable, so equal scores keep natural order. Force-mounted
//! items carry no score and sort as if they scored zero.

use std::cmp::Ordering;

use crate::filter::FilterResult;
use crate::registry::{Entry, GroupId, ItemId, Registry};

/// A top-level slot in the rendered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// An ungrouped item.
    Item(ItemId),
    /// A group and its visible members, in order.
    Group { id: GroupId, items: Vec<ItemId> },
}

/// A flattened row, as a list renderer would draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Heading(GroupId),
    Item(ItemId),
}

/// The ordered list of visible slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOrder {
    slots: Vec<Slot>,
}

fn by_score_desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

impl RenderOrder {
    /// Build the render order for the current filter result.
    pub fn build(registry: &Registry, filter: &FilterResult) -> Self {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("cmdk.sort", active = filter.is_active()).entered();

        let score = |id: &ItemId| filter.score(id).unwrap_or(0.0);

        let visible_members = |group: &GroupId| -> Vec<ItemId> {
            registry
                .group(group)
                .map(|g| {
                    g.members()
                        .filter(|m| filter.is_item_visible(registry, m))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        };

        if !filter.is_active() {
            let slots = registry
                .top_level()
                .filter_map(|entry| match entry {
                    Entry::Item(id) => Some(Slot::Item(id.clone())),
                    Entry::Group(id) if filter.is_group_visible(id) => Some(Slot::Group {
                        id: id.clone(),
                        items: visible_members(id),
                    }),
                    Entry::Group(_) => None,
                })
                .collect();
            return Self { slots };
        }

        let mut items: Vec<ItemId> = Vec::new();
        let mut groups: Vec<(f64, GroupId, Vec<ItemId>)> = Vec::new();
        for entry in registry.top_level() {
            match entry {
                Entry::Item(id) if filter.is_item_visible(registry, id) => items.push(id.clone()),
                Entry::Item(_) => {}
                Entry::Group(id) if filter.is_group_visible(id) => {
                    let mut members = visible_members(id);
                    members.sort_by(|a, b| by_score_desc(score(a), score(b)));
                    let best = members.first().map(&score).unwrap_or(0.0);
                    groups.push((best, id.clone(), members));
                }
                Entry::Group(_) => {}
            }
        }

        items.sort_by(|a, b| by_score_desc(score(a), score(b)));
        groups.sort_by(|a, b| by_score_desc(a.0, b.0));

        let mut slots: Vec<Slot> = items.into_iter().map(Slot::Item).collect();
        slots.extend(
            groups
                .into_iter()
                .map(|(_, id, items)| Slot::Group { id, items }),
        );
        Self { slots }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Visible items in render order, with the group each sits in.
    pub fn items(&self) -> impl Iterator<Item = (&ItemId, Option<&GroupId>)> {
        self.slots.iter().flat_map(|slot| {
            let (group, members): (Option<&GroupId>, &[ItemId]) = match slot {
                Slot::Item(id) => (None, std::slice::from_ref(id)),
                Slot::Group { id, items } => (Some(id), items.as_slice()),
            };
            members.iter().map(move |m| (m, group))
        })
    }

    /// Rows as drawn: group headings precede their members.
    pub fn rows(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        for slot in &self.slots {
            match slot {
                Slot::Item(id) => rows.push(Row::Item(id.clone())),
                Slot::Group { id, items } => {
                    rows.push(Row::Heading(id.clone()));
                    rows.extend(items.iter().cloned().map(Row::Item));
                }
            }
        }
        rows
    }

    /// Position of an item among visible items.
    pub fn index_of(&self, id: &ItemId) -> Option<usize> {
        self.items().position(|(item, _)| item == id)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
