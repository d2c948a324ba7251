#![forbid(unsafe_code)]

//! Keyed task queue that collapses same-tick work.
//!
//! Registry bursts (dozens of items mounting at once, a typed character
//! followed by a value update) must settle into a single
//! filter → sort → repair → notify pass. Tasks are keyed; scheduling a task
//! whose key is already pending replaces it ("latest wins"). Draining yields
//! tasks in key order, so the key's `Ord` impl is the execution order.
//!
//! ```
//! use cmdk_menu::scheduler::{Coalesce, Scheduler};
//!
//! #[derive(Debug, PartialEq)]
//! enum Job { Refresh(u32), Save }
//!
//! impl Coalesce for Job {
//!     type Key = u8;
//!     fn key(&self) -> u8 {
//!         match self { Job::Refresh(_) => 0, Job::Save => 1 }
//!     }
//! }
//!
//! let mut s = Scheduler::new();
//! s.schedule(Job::Save);
//! s.schedule(Job::Refresh(1));
//! s.schedule(Job::Refresh(2));
//! assert_eq!(s.drain(), vec![Job::Refresh(2), Job::Save]);
//! ```

use std::collections::BTreeMap;

/// A task that can be coalesced by key.
pub trait Coalesce {
    type Key: Ord + Copy;

    fn key(&self) -> Self::Key;
}

/// Counters describing how much work was collapsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Tasks handed to [`Scheduler::schedule`].
    pub scheduled: u64,
    /// Tasks that replaced an already pending task with the same key.
    pub coalesced: u64,
    /// Number of non-empty drains.
    pub flushes: u64,
}

/// Pending tasks, at most one per key.
#[derive(Debug, Clone)]
pub struct Scheduler<T: Coalesce> {
    pending: BTreeMap<T::Key, T>,
    stats: SchedulerStats,
}

impl<T: Coalesce> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            pending: BTreeMap::new(),
            stats: SchedulerStats::default(),
        }
    }
}

impl<T: Coalesce> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task. Returns `true` if it replaced a pending one.
    pub fn schedule(&mut self, task: T) -> bool {
        self.stats.scheduled += 1;
        let replaced = self.pending.insert(task.key(), task).is_some();
        if replaced {
            self.stats.coalesced += 1;
        }
        replaced
    }

    pub fn is_pending(&self, key: T::Key) -> bool {
        self.pending.contains_key(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Take every pending task in key order.
    pub fn drain(&mut self) -> Vec<T> {
        if self.pending.is_empty() {
            return Vec::new();
        }
        self.stats.flushes += 1;
        std::mem::take(&mut self.pending).into_values().collect()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }
}

// ---------------------------------------------------------------------------
// Menu tasks
// ---------------------------------------------------------------------------

/// Task keys, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskKind {
    SearchChanged,
    ValueChanged,
    ItemAdded,
    ItemRemoved,
    SelectFirst,
    ScrollIntoView,
    Notify,
}

/// Deferred work for the next tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuTask {
    /// The query changed: re-sort and repair selection.
    SearchChanged,
    /// An item's value changed: re-sort.
    ValueChanged,
    /// One or more items mounted: select something if nothing is selected.
    ItemAdded,
    /// One or more items unmounted.
    ItemRemoved,
    /// Move the selection to the first eligible item.
    SelectFirst,
    /// Reveal the selected item in the viewport.
    ScrollIntoView,
    /// Emit to listeners without other work.
    Notify,
}

impl Coalesce for MenuTask {
    type Key = TaskKind;

    fn key(&self) -> TaskKind {
        match self {
            Self::SearchChanged => TaskKind::SearchChanged,
            Self::ValueChanged => TaskKind::ValueChanged,
            Self::ItemAdded => TaskKind::ItemAdded,
            Self::ItemRemoved => TaskKind::ItemRemoved,
            Self::SelectFirst => TaskKind::SelectFirst,
            Self::ScrollIntoView => TaskKind::ScrollIntoView,
            Self::Notify => TaskKind::Notify,
        }
    }
}
