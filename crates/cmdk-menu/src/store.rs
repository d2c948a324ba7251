#![forbid(unsafe_code)]

//! Menu state and change notification.
//!
//! The store owns the query, the selected id, and the current filter result.
//! Consumers never hold references into it between calls; they subscribe and
//! receive a snapshot every time the menu settles.
//!
//! Listeners are handed the snapshot as an argument instead of reading it back
//! through the menu, since the menu is mutably borrowed while it notifies.

use std::fmt;

use crate::filter::FilterResult;
use crate::registry::ItemId;

/// Everything a consumer reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuState {
    pub query: String,
    pub selected: Option<ItemId>,
    pub filter: FilterResult,
}

/// Subscription handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Box<dyn FnMut(&MenuState)>;

/// Callback receiving proposed selections.
pub type ValueCallback = Box<dyn FnMut(Option<&ItemId>)>;

/// What happened to a proposed selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Stored as the new selection.
    Applied,
    /// Controlled mode: handed to the external owner, state untouched.
    Forwarded,
    /// Equal to the current selection.
    Unchanged,
}

/// State plus listeners.
#[derive(Default)]
pub struct Store {
    state: MenuState,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    emits: u64,
    controlled: bool,
    on_value_change: Option<ValueCallback>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .field("emits", &self.emits)
            .field("controlled", &self.controlled)
            .finish()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn snapshot(&self) -> &MenuState {
        &self.state
    }

    /// Call every listener with the current state.
    pub fn emit(&mut self) {
        self.emits += 1;
        let state = &self.state;
        for (_, listener) in &mut self.listeners {
            listener(state);
        }
    }

    /// Number of emits so far.
    pub fn emit_count(&self) -> u64 {
        self.emits
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Store a new query. Returns `false` when it equals the current one.
    pub fn set_query(&mut self, query: &str) -> bool {
        if self.state.query == query {
            return false;
        }
        self.state.query = query.to_string();
        true
    }

    pub fn set_filter(&mut self, filter: FilterResult) {
        self.state.filter = filter;
    }

    pub fn filter_mut(&mut self) -> &mut FilterResult {
        &mut self.state.filter
    }

    /// Route a selection change through the controlled/uncontrolled funnel.
    ///
    /// The value-change callback fires in both modes whenever the proposal
    /// differs from the current selection.
    pub fn propose_selected(&mut self, selected: Option<ItemId>) -> SelectOutcome {
        if self.state.selected == selected {
            return SelectOutcome::Unchanged;
        }
        if let Some(callback) = self.on_value_change.as_mut() {
            callback(selected.as_ref());
        }
        if self.controlled {
            return SelectOutcome::Forwarded;
        }
        self.state.selected = selected;
        SelectOutcome::Applied
    }

    /// Overwrite the selection from the external owner. Returns `true` if it
    /// changed. Never invokes the value-change callback.
    pub fn sync_selected(&mut self, selected: Option<ItemId>) -> bool {
        if self.state.selected == selected {
            return false;
        }
        self.state.selected = selected;
        true
    }

    pub fn set_controlled(&mut self, controlled: bool) {
        self.controlled = controlled;
    }

    pub fn is_controlled(&self) -> bool {
        self.controlled
    }

    pub fn set_on_value_change(&mut self, callback: Option<ValueCallback>) {
        self.on_value_change = callback;
    }
}
