#![forbid(unsafe_code)]

//! Registry of mounted items and groups.
//!
//! Every item and group gets a sequence number the first time it is seen.
//! Sequence numbers define the natural (mount) order, which is what the
//! menu renders while no query is active and what breaks ties when sorting.
//! Re-registering an existing id keeps its sequence number, so updates never
//! reorder the list.
//!
//! Groups come into existence lazily when an item names them. A group that
//! was only ever created that way disappears again once its last member
//! leaves; an explicitly registered group stays until it is unregistered.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Create an id from anything string-like.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_id! {
    /// Stable identity of a menu item.
    ItemId
}

string_id! {
    /// Stable identity of a group.
    GroupId
}

/// Normalize a matchable string the way the menu compares it.
pub(crate) fn normalize(text: &str) -> String {
    text.trim().to_string()
}

fn normalize_keywords(keywords: Vec<String>) -> Vec<String> {
    keywords.iter().map(|k| normalize(k)).collect()
}

// ---------------------------------------------------------------------------
// Registration specs
// ---------------------------------------------------------------------------

/// Everything needed to mount an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSpec {
    pub id: ItemId,
    pub value: String,
    pub keywords: Vec<String>,
    pub group: Option<GroupId>,
    pub disabled: bool,
    pub force_mount: bool,
}

impl ItemSpec {
    /// An enabled top-level item.
    pub fn new(id: impl Into<ItemId>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            keywords: Vec::new(),
            group: None,
            disabled: false,
            force_mount: false,
        }
    }

    /// Set keyword aliases (builder).
    #[must_use]
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Place the item in a group (builder).
    #[must_use]
    pub fn in_group(mut self, group: impl Into<GroupId>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the disabled flag (builder).
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Always render, regardless of the query (builder).
    #[must_use]
    pub fn with_force_mount(mut self, force_mount: bool) -> Self {
        self.force_mount = force_mount;
        self
    }
}

/// Everything needed to mount a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    pub id: GroupId,
    pub heading: Option<String>,
    pub force_mount: bool,
}

impl GroupSpec {
    pub fn new(id: impl Into<GroupId>) -> Self {
        Self {
            id: id.into(),
            heading: None,
            force_mount: false,
        }
    }

    #[must_use]
    pub fn with_heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }

    /// Force every member to render regardless of the query (builder).
    #[must_use]
    pub fn with_force_mount(mut self, force_mount: bool) -> Self {
        self.force_mount = force_mount;
        self
    }
}

// ---------------------------------------------------------------------------
// Stored records
// ---------------------------------------------------------------------------

/// A mounted item.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub value: String,
    pub keywords: Vec<String>,
    pub group: Option<GroupId>,
    pub disabled: bool,
    pub force_mount: bool,
    seq: u64,
}

impl Item {
    /// Natural-order sequence number.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// A mounted group.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: GroupId,
    pub heading: Option<String>,
    pub force_mount: bool,
    members: BTreeMap<u64, ItemId>,
    explicit: bool,
    seq: u64,
}

impl Group {
    /// Natural-order sequence number.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Heading text, falling back to the id.
    pub fn label(&self) -> &str {
        self.heading.as_deref().unwrap_or(self.id.as_str())
    }

    /// Members in natural order.
    pub fn members(&self) -> impl Iterator<Item = &ItemId> {
        self.members.values()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// A top-level entry in natural order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Item(ItemId),
    Group(GroupId),
}

/// Outcome of registering an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemChange {
    /// The id was not mounted before.
    Added,
    /// The id was mounted; some metadata differed.
    Updated {
        /// Value or keywords changed, so the score is stale.
        rescore: bool,
        /// Group membership changed.
        regrouped: bool,
    },
    /// Identical re-registration.
    Unchanged,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// All mounted items and groups.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    items: HashMap<ItemId, Item>,
    groups: HashMap<GroupId, Group>,
    top_level: BTreeMap<u64, Entry>,
    next_seq: u64,
    /// Items for which `is_forced` holds.
    forced: usize,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Mount an item, or update it in place if the id is already mounted.
    pub fn upsert_item(&mut self, spec: ItemSpec) -> ItemChange {
        let value = normalize(&spec.value);
        let keywords = normalize_keywords(spec.keywords);

        if let Some(existing) = self.items.get(&spec.id) {
            let was_forced = self.is_forced(existing);
            let rescore = existing.value != value || existing.keywords != keywords;
            let regrouped = existing.group != spec.group;
            let flags_changed =
                existing.disabled != spec.disabled || existing.force_mount != spec.force_mount;
            if !rescore && !regrouped && !flags_changed {
                return ItemChange::Unchanged;
            }

            let seq = existing.seq;
            let old_group = existing.group.clone();
            if regrouped {
                self.detach(seq, old_group.as_ref());
                self.attach(&spec.id, seq, spec.group.as_ref());
            }
            if let Some(item) = self.items.get_mut(&spec.id) {
                item.value = value;
                item.keywords = keywords;
                item.group = spec.group;
                item.disabled = spec.disabled;
                item.force_mount = spec.force_mount;
            }
            let now_forced = self.items.get(&spec.id).is_some_and(|i| self.is_forced(i));
            self.adjust_forced(was_forced, now_forced);
            return ItemChange::Updated { rescore, regrouped };
        }

        let seq = self.bump_seq();
        self.attach(&spec.id, seq, spec.group.as_ref());
        let group_forced = spec
            .group
            .as_ref()
            .and_then(|g| self.groups.get(g))
            .is_some_and(|g| g.force_mount);
        if spec.force_mount || group_forced {
            self.forced += 1;
        }
        self.items.insert(
            spec.id.clone(),
            Item {
                id: spec.id,
                value,
                keywords,
                group: spec.group,
                disabled: spec.disabled,
                force_mount: spec.force_mount,
                seq,
            },
        );
        ItemChange::Added
    }

    /// Unmount an item. Unknown ids are ignored.
    pub fn remove_item(&mut self, id: &ItemId) -> Option<Item> {
        let was_forced = self.items.get(id).is_some_and(|i| self.is_forced(i));
        let item = self.items.remove(id)?;
        self.adjust_forced(was_forced, false);
        self.detach(item.seq, item.group.as_ref());
        Some(item)
    }

    /// Mount a group, or update its metadata. Returns `true` if the group
    /// changed in a way that affects rendering.
    pub fn upsert_group(&mut self, spec: GroupSpec) -> bool {
        let group = self.ensure_group(&spec.id);
        let flipped = group.force_mount != spec.force_mount;
        let changed = !group.explicit || group.heading != spec.heading || flipped;
        group.explicit = true;
        group.heading = spec.heading;
        group.force_mount = spec.force_mount;
        if flipped {
            let members = self.members_forced_by_group(&spec.id);
            if spec.force_mount {
                self.forced += members;
            } else {
                self.forced = self.forced.saturating_sub(members);
            }
        }
        changed
    }

    /// Members that are forced only through their group's flag.
    fn members_forced_by_group(&self, id: &GroupId) -> usize {
        self.groups.get(id).map_or(0, |g| {
            g.members()
                .filter(|m| self.items.get(*m).is_some_and(|i| !i.force_mount))
                .count()
        })
    }

    fn adjust_forced(&mut self, was: bool, now: bool) {
        match (was, now) {
            (false, true) => self.forced += 1,
            (true, false) => self.forced = self.forced.saturating_sub(1),
            _ => {}
        }
    }

    /// Unmount a group. Its members stay mounted as top-level items.
    pub fn remove_group(&mut self, id: &GroupId) -> Option<Group> {
        if self.groups.get(id).is_some_and(|g| g.force_mount) {
            let released = self.members_forced_by_group(id);
            self.forced = self.forced.saturating_sub(released);
        }
        let group = self.groups.remove(id)?;
        self.top_level.remove(&group.seq);
        for (seq, member) in &group.members {
            if let Some(item) = self.items.get_mut(member) {
                item.group = None;
            }
            self.top_level.insert(*seq, Entry::Item(member.clone()));
        }
        Some(group)
    }

    /// Update an item's value (and optionally keywords). Returns `true` only
    /// when something actually changed.
    pub fn set_value(&mut self, id: &ItemId, value: &str, keywords: Option<Vec<String>>) -> bool {
        let Some(item) = self.items.get_mut(id) else {
            return false;
        };
        let value = normalize(value);
        let keywords = keywords.map(normalize_keywords);
        let mut changed = false;
        if item.value != value {
            item.value = value;
            changed = true;
        }
        if let Some(keywords) = keywords {
            if item.keywords != keywords {
                item.keywords = keywords;
                changed = true;
            }
        }
        changed
    }

    /// Update an item's disabled flag. Returns `true` if it changed.
    pub fn set_disabled(&mut self, id: &ItemId, disabled: bool) -> bool {
        match self.items.get_mut(id) {
            Some(item) if item.disabled != disabled => {
                item.disabled = disabled;
                true
            }
            _ => false,
        }
    }

    pub fn set_group_heading(&mut self, id: &GroupId, heading: Option<String>) -> bool {
        match self.groups.get_mut(id) {
            Some(group) if group.heading != heading => {
                group.heading = heading;
                true
            }
            _ => false,
        }
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.get(id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.contains_key(id)
    }

    /// All items, in no particular order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// All groups, in no particular order.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    /// Top-level entries (ungrouped items and groups) in natural order.
    pub fn top_level(&self) -> impl Iterator<Item = &Entry> {
        self.top_level.values()
    }

    /// Number of mounted items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether an item renders regardless of the query, either on its own
    /// account or because its group is force-mounted.
    pub fn is_forced(&self, item: &Item) -> bool {
        item.force_mount
            || item
                .group
                .as_ref()
                .and_then(|g| self.groups.get(g))
                .is_some_and(|g| g.force_mount)
    }

    /// Number of items that take part in filtering.
    pub fn tracked_len(&self) -> usize {
        self.items.len() - self.forced
    }

    fn ensure_group(&mut self, id: &GroupId) -> &mut Group {
        let next_seq = &mut self.next_seq;
        let top_level = &mut self.top_level;
        self.groups.entry(id.clone()).or_insert_with(|| {
            let seq = *next_seq;
            *next_seq += 1;
            top_level.insert(seq, Entry::Group(id.clone()));
            Group {
                id: id.clone(),
                heading: None,
                force_mount: false,
                members: BTreeMap::new(),
                explicit: false,
                seq,
            }
        })
    }

    fn attach(&mut self, id: &ItemId, seq: u64, group: Option<&GroupId>) {
        match group {
            Some(g) => {
                self.ensure_group(g).members.insert(seq, id.clone());
            }
            None => {
                self.top_level.insert(seq, Entry::Item(id.clone()));
            }
        }
    }

    fn detach(&mut self, seq: u64, group: Option<&GroupId>) {
        match group {
            Some(g) => {
                let drop_group = match self.groups.get_mut(g) {
                    Some(group) => {
                        group.members.remove(&seq);
                        group.members.is_empty() && !group.explicit
                    }
                    None => false,
                };
                if drop_group {
                    if let Some(group) = self.groups.remove(g) {
                        self.top_level.remove(&group.seq);
                    }
                }
            }
            None => {
                self.top_level.remove(&seq);
            }
        }
    }
}
