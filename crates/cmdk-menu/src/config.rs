#![forbid(unsafe_code)]

//! Menu configuration.

use crate::registry::ItemId;

/// What happens to a still-eligible selection when the query changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReselectPolicy {
    /// Keep the selection if it survived the new filter; otherwise move to
    /// the first eligible item.
    #[default]
    PreserveEligible,
    /// Always move to the first eligible item.
    AlwaysFirst,
}

/// Behavior switches for a [`CommandMenu`](crate::CommandMenu).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuConfig {
    /// Filter and sort against the query. When off, every item always
    /// renders in natural order.
    pub should_filter: bool,
    /// Wrap next/previous at the ends of the list.
    pub loop_navigation: bool,
    /// Accept Ctrl+N/J/P/K as navigation keys.
    pub vim_bindings: bool,
    /// Ignore pointer hover for selection.
    pub disable_pointer_selection: bool,
    pub reselect: ReselectPolicy,
    /// Item selected on first mount, uncontrolled mode only.
    pub default_value: Option<ItemId>,
    /// Rows in the scroll viewport.
    pub max_visible: usize,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            should_filter: true,
            loop_navigation: false,
            vim_bindings: true,
            disable_pointer_selection: false,
            reselect: ReselectPolicy::default(),
            default_value: None,
            max_visible: 10,
        }
    }
}

impl MenuConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_should_filter(mut self, enabled: bool) -> Self {
        self.should_filter = enabled;
        self
    }

    #[must_use]
    pub fn with_loop(mut self, enabled: bool) -> Self {
        self.loop_navigation = enabled;
        self
    }

    #[must_use]
    pub fn with_vim_bindings(mut self, enabled: bool) -> Self {
        self.vim_bindings = enabled;
        self
    }

    #[must_use]
    pub fn with_pointer_selection(mut self, enabled: bool) -> Self {
        self.disable_pointer_selection = !enabled;
        self
    }

    #[must_use]
    pub fn with_reselect(mut self, policy: ReselectPolicy) -> Self {
        self.reselect = policy;
        self
    }

    /// Initial selection (builder).
    #[must_use]
    pub fn with_default_value(mut self, id: impl Into<ItemId>) -> Self {
        self.default_value = Some(id.into());
        self
    }

    /// Viewport height in rows (builder).
    #[must_use]
    pub fn with_max_visible(mut self, rows: usize) -> Self {
        self.max_visible = rows;
        self
    }
}
