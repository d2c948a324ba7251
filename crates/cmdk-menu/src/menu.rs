#![forbid(unsafe_code)]

//! The command menu: one handle tying the registry, filter, ordering,
//! selection, and notifications together.
//!
//! # Ticks
//!
//! Mutations (mounting items, typing, unmounting) update the registry and
//! the filter immediately but defer everything else to [`CommandMenu::tick`].
//! A tick drains the scheduler and runs, in order:
//!
//! 1. rebuild the render order
//! 2. repair the selection
//! 3. reveal the selection in the viewport
//! 4. notify listeners once
//!
//! Hosts call `tick` once per frame (or after a batch of mutations). Listeners
//! never observe the state between a mutation and its tick.
//!
//! # Example
//!
//! ```
//! use cmdk_menu::{CommandMenu, ItemSpec, MenuConfig};
//!
//! let mut menu = CommandMenu::new(MenuConfig::default());
//! let _a = menu.register_item(ItemSpec::new("open", "Open File"));
//! let _b = menu.register_item(ItemSpec::new("save", "Save File"));
//! menu.tick();
//! assert_eq!(menu.selected().map(|id| id.as_str()), Some("open"));
//!
//! menu.set_query("sav");
//! menu.tick();
//! assert_eq!(menu.selected().map(|id| id.as_str()), Some("save"));
//! ```

use std::fmt;

use cmdk_core::{KeyDecoder, KeyEvent, MenuCommand};

use crate::config::{MenuConfig, ReselectPolicy};
use crate::error::SelectError;
use crate::filter::FilterResult;
use crate::registry::{GroupId, GroupSpec, Item, ItemChange, ItemId, ItemSpec, Registry};
use crate::scheduler::{MenuTask, Scheduler, SchedulerStats};
use crate::scorer::{BayesianScorer, ScoreFn};
use crate::selection::{self, Move};
use crate::sort::{RenderOrder, Row};
use crate::store::{ListenerId, MenuState, SelectOutcome, Store};
use crate::viewport::{ScrollRequest, Viewport};

/// Token returned on registration; hand it back to unregister.
#[must_use = "dropping a registration leaks the item; pass it to `unregister`"]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Registration {
    Item(ItemId),
    Group(GroupId),
}

/// Something the host should act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// A navigation key was consumed.
    Navigated,
    /// The user chose an item.
    Commit { id: ItemId, value: String },
}

/// Who owns the query text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMode {
    /// The menu applies input itself.
    #[default]
    Uncontrolled,
    /// Input is only reported; the owner applies it with
    /// [`CommandMenu::sync_controlled_search`].
    Controlled,
}

/// How a selection change was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// Keyboard or API; scrolls the target into view.
    Navigation,
    Pointer,
}

type SearchCallback = Box<dyn FnMut(&str)>;

/// Headless command menu.
pub struct CommandMenu {
    config: MenuConfig,
    registry: Registry,
    store: Store,
    scheduler: Scheduler<MenuTask>,
    scorer: Box<dyn ScoreFn>,
    decoder: KeyDecoder,
    order: RenderOrder,
    viewport: Viewport,
    scroll_request: Option<ScrollRequest>,
    search_mode: SearchMode,
    on_search_change: Option<SearchCallback>,
}

impl fmt::Debug for CommandMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandMenu")
            .field("config", &self.config)
            .field("items", &self.registry.len())
            .field("store", &self.store)
            .field("pending", &self.scheduler.len())
            .field("search_mode", &self.search_mode)
            .finish()
    }
}

impl Default for CommandMenu {
    fn default() -> Self {
        Self::new(MenuConfig::default())
    }
}

impl CommandMenu {
    /// Create an empty menu using the default [`BayesianScorer`].
    pub fn new(config: MenuConfig) -> Self {
        let mut store = Store::new();
        if let Some(id) = config.default_value.clone() {
            store.sync_selected(Some(id));
        }
        Self {
            decoder: KeyDecoder::new().with_vim_bindings(config.vim_bindings),
            viewport: Viewport::new(config.max_visible),
            config,
            registry: Registry::new(),
            store,
            scheduler: Scheduler::new(),
            scorer: Box::new(BayesianScorer::new()),
            order: RenderOrder::default(),
            scroll_request: None,
            search_mode: SearchMode::default(),
            on_search_change: None,
        }
    }

    /// Replace the scoring function (builder).
    #[must_use]
    pub fn with_scorer(mut self, scorer: impl ScoreFn + 'static) -> Self {
        self.set_scorer(scorer);
        self
    }

    /// Replace the scoring function and re-filter.
    pub fn set_scorer(&mut self, scorer: impl ScoreFn + 'static) {
        self.scorer = Box::new(scorer);
        if self.store.snapshot().filter.is_active() {
            self.refilter();
            self.scheduler.schedule(MenuTask::ValueChanged);
        }
    }

    // --- Registry -----------------------------------------------------------

    /// Mount an item. Registering a mounted id updates it in place.
    pub fn register_item(&mut self, spec: ItemSpec) -> Registration {
        let id = spec.id.clone();
        let old_group = self.registry.item(&id).and_then(|i| i.group.clone());

        match self.registry.upsert_item(spec) {
            ItemChange::Added => {
                self.rescore(&id);
                self.scheduler.schedule(MenuTask::ItemAdded);
            }
            ItemChange::Updated { regrouped, .. } => {
                self.rescore(&id);
                if regrouped {
                    if let Some(old) = old_group {
                        self.store.filter_mut().refresh_group(&self.registry, &old);
                    }
                }
                self.scheduler.schedule(MenuTask::ValueChanged);
            }
            ItemChange::Unchanged => {}
        }
        Registration::Item(id)
    }

    /// Mount a group, or update its heading and force-mount flag.
    pub fn register_group(&mut self, spec: GroupSpec) -> Registration {
        let id = spec.id.clone();
        if self.registry.upsert_group(spec) {
            // Force-mount affects member visibility and the count.
            self.refilter();
            self.scheduler.schedule(MenuTask::ValueChanged);
        }
        Registration::Group(id)
    }

    /// Release a registration.
    pub fn unregister(&mut self, registration: Registration) -> bool {
        match registration {
            Registration::Item(id) => self.unregister_item(&id),
            Registration::Group(id) => self.unregister_group(&id),
        }
    }

    /// Unmount an item. Unknown ids are ignored.
    pub fn unregister_item(&mut self, id: &ItemId) -> bool {
        let Some(item) = self.registry.remove_item(id) else {
            return false;
        };
        self.store
            .filter_mut()
            .remove(&self.registry, id, item.group.as_ref());
        if self.store.snapshot().selected.as_ref() == Some(id) {
            self.scheduler.schedule(MenuTask::SelectFirst);
        }
        self.scheduler.schedule(MenuTask::ItemRemoved);
        true
    }

    /// Unmount a group. Its members stay mounted as ungrouped items.
    pub fn unregister_group(&mut self, id: &GroupId) -> bool {
        if self.registry.remove_group(id).is_none() {
            return false;
        }
        self.refilter();
        self.scheduler.schedule(MenuTask::ValueChanged);
        true
    }

    /// Update an item's value and, optionally, its keywords. Unchanged input
    /// is a no-op and schedules nothing.
    pub fn set_item_value(
        &mut self,
        id: &ItemId,
        value: &str,
        keywords: Option<Vec<String>>,
    ) -> bool {
        if !self.registry.set_value(id, value, keywords) {
            return false;
        }
        self.rescore(id);
        self.scheduler.schedule(MenuTask::ValueChanged);
        true
    }

    pub fn set_item_disabled(&mut self, id: &ItemId, disabled: bool) -> bool {
        if !self.registry.set_disabled(id, disabled) {
            return false;
        }
        self.scheduler.schedule(MenuTask::ValueChanged);
        true
    }

    pub fn set_group_heading(&mut self, id: &GroupId, heading: Option<String>) -> bool {
        if !self.registry.set_group_heading(id, heading) {
            return false;
        }
        self.scheduler.schedule(MenuTask::Notify);
        true
    }

    fn rescore(&mut self, id: &ItemId) {
        self.store
            .filter_mut()
            .rescore(&self.registry, self.scorer.as_ref(), id);
    }

    fn refilter(&mut self) {
        let filter = FilterResult::compute(
            &self.store.snapshot().query,
            self.config.should_filter,
            &self.registry,
            self.scorer.as_ref(),
        );
        self.store.set_filter(filter);
    }

    // --- Search -------------------------------------------------------------

    /// Set the query. Filtering happens now; ordering, selection repair, and
    /// notification wait for the next tick. Returns `false` if unchanged.
    pub fn set_query(&mut self, query: &str) -> bool {
        if !self.store.set_query(query) {
            return false;
        }
        self.refilter();
        self.scheduler.schedule(MenuTask::SearchChanged);
        true
    }

    /// Text typed into the input. Uncontrolled menus apply it; both modes
    /// report it to the search-change callback.
    pub fn input_changed(&mut self, text: &str) {
        if self.search_mode == SearchMode::Uncontrolled {
            self.set_query(text);
        }
        if let Some(callback) = self.on_search_change.as_mut() {
            callback(text);
        }
    }

    /// Hand ownership of the query to the caller.
    pub fn control_search(&mut self) {
        self.search_mode = SearchMode::Controlled;
    }

    pub fn uncontrol_search(&mut self) {
        self.search_mode = SearchMode::Uncontrolled;
    }

    /// Apply the query supplied by the owner of a controlled search.
    pub fn sync_controlled_search(&mut self, query: &str) -> bool {
        self.set_query(query)
    }

    pub fn on_search_change(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_search_change = Some(Box::new(callback));
    }

    pub fn search_mode(&self) -> SearchMode {
        self.search_mode
    }

    /// Turn filtering on or off at runtime.
    pub fn set_should_filter(&mut self, enabled: bool) {
        if self.config.should_filter == enabled {
            return;
        }
        self.config.should_filter = enabled;
        self.refilter();
        self.scheduler.schedule(MenuTask::SearchChanged);
    }

    // --- Selection ----------------------------------------------------------

    /// Take over the selection. The menu shows `value` and forwards every
    /// change it would have made to the value-change callback instead.
    pub fn control_value(&mut self, value: Option<ItemId>) {
        self.store.set_controlled(true);
        if self.store.sync_selected(value) {
            self.scheduler.schedule(MenuTask::Notify);
        }
    }

    /// Return selection ownership to the menu, keeping the current value.
    pub fn uncontrol_value(&mut self) {
        self.store.set_controlled(false);
    }

    pub fn is_value_controlled(&self) -> bool {
        self.store.is_controlled()
    }

    /// Called with every selection the menu proposes.
    pub fn on_value_change(&mut self, callback: impl FnMut(Option<&ItemId>) + 'static) {
        self.store.set_on_value_change(Some(Box::new(callback)));
    }

    /// Select an item programmatically. Unknown, hidden, and disabled ids are
    /// ignored.
    pub fn request_select(&mut self, id: &ItemId) -> bool {
        self.try_select(id).is_ok()
    }

    /// Select an item programmatically, reporting why a request was refused.
    pub fn try_select(&mut self, id: &ItemId) -> Result<(), SelectError> {
        self.check_eligible(id)?;
        self.propose(Some(id.clone()), Origin::Navigation);
        Ok(())
    }

    /// Pointer moved over an item.
    pub fn hover(&mut self, id: &ItemId) -> bool {
        if self.config.disable_pointer_selection {
            return false;
        }
        if self.check_eligible(id).is_err() {
            return false;
        }
        self.propose(Some(id.clone()), Origin::Pointer);
        true
    }

    /// Pointer clicked an item: select it and commit.
    pub fn click(&mut self, id: &ItemId) -> Option<MenuAction> {
        self.check_eligible(id).ok()?;
        self.propose(Some(id.clone()), Origin::Pointer);
        self.commit_item(id)
    }

    /// Move the selection. Pending work is settled first so the move sees the
    /// current order. Returns `true` if a new target was proposed.
    pub fn move_selection(&mut self, movement: Move) -> bool {
        self.tick();
        let candidates =
            selection::eligible(&self.order, &self.registry, &self.store.snapshot().filter);
        let current = self.store.snapshot().selected.clone();
        let Some(target) = selection::resolve(
            &candidates,
            current.as_ref(),
            movement,
            self.config.loop_navigation,
        ) else {
            return false;
        };
        self.propose(Some(target), Origin::Navigation) != SelectOutcome::Unchanged
    }

    /// Commit the selected item, if it is still eligible.
    pub fn commit(&mut self) -> Option<MenuAction> {
        self.tick();
        let id = self.store.snapshot().selected.clone()?;
        self.check_eligible(&id).ok()?;
        self.commit_item(&id)
    }

    /// Apply a decoded command.
    pub fn handle_command(&mut self, command: MenuCommand) -> Option<MenuAction> {
        match Move::from_command(command) {
            Some(movement) => {
                self.move_selection(movement);
                Some(MenuAction::Navigated)
            }
            None => self.commit(),
        }
    }

    /// Decode and apply a key event. Keys the menu does not use return `None`.
    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<MenuAction> {
        let command = self.decoder.decode(event)?;
        self.handle_command(command)
    }

    fn commit_item(&self, id: &ItemId) -> Option<MenuAction> {
        let item = self.registry.item(id)?;
        cmdk_core::debug!(id = %id, "commit");
        Some(MenuAction::Commit {
            id: id.clone(),
            value: item.value.clone(),
        })
    }

    fn check_eligible(&self, id: &ItemId) -> Result<(), SelectError> {
        let filter = &self.store.snapshot().filter;
        let result = match self.registry.item(id) {
            None => Err(SelectError::Unknown(id.clone())),
            Some(_) if !filter.is_item_visible(&self.registry, id) => {
                Err(SelectError::Hidden(id.clone()))
            }
            Some(item) if item.disabled => Err(SelectError::Disabled(id.clone())),
            Some(_) => Ok(()),
        };
        if let Err(_err) = &result {
            cmdk_core::trace!(reason = %_err, "selection request ignored");
        }
        result
    }

    fn propose(&mut self, target: Option<ItemId>, origin: Origin) -> SelectOutcome {
        let outcome = self.store.propose_selected(target);
        if outcome == SelectOutcome::Applied {
            self.scheduler.schedule(MenuTask::Notify);
        }
        if outcome != SelectOutcome::Unchanged && origin == Origin::Navigation {
            self.scheduler.schedule(MenuTask::ScrollIntoView);
        }
        outcome
    }

    // --- Tick ---------------------------------------------------------------

    /// Run all pending work. Returns `true` if anything was pending.
    pub fn tick(&mut self) -> bool {
        let tasks = self.scheduler.drain();
        if tasks.is_empty() {
            return false;
        }

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("cmdk.tick", tasks = tasks.len()).entered();

        let mut plan = TickPlan::default();
        for task in &tasks {
            match task {
                MenuTask::SearchChanged => {
                    plan.resort = true;
                    plan.search_changed = true;
                }
                MenuTask::ValueChanged | MenuTask::ItemRemoved => plan.resort = true,
                MenuTask::ItemAdded => {
                    plan.resort = true;
                    plan.added = true;
                }
                MenuTask::SelectFirst => plan.select_first = true,
                MenuTask::ScrollIntoView => plan.scroll = true,
                MenuTask::Notify => {}
            }
        }
        // Every task but a bare scroll changes what listeners see.
        plan.notify = tasks.iter().any(|t| *t != MenuTask::ScrollIntoView);

        if plan.resort {
            self.order = RenderOrder::build(&self.registry, &self.store.snapshot().filter);
        }

        if self.repair_selection(&plan) {
            plan.scroll = true;
            plan.notify = true;
        }

        let rows = self.order.rows();
        self.viewport.clamp(rows.len());
        if plan.scroll {
            if let Some(selected) = self.store.snapshot().selected.clone() {
                if let Some(request) = self.viewport.reveal(&rows, &selected) {
                    self.scroll_request = Some(request);
                }
            }
        }

        if plan.notify {
            self.store.emit();
        }
        true
    }

    /// Decide whether the selection must move. Returns `true` if a change
    /// was applied or forwarded.
    fn repair_selection(&mut self, plan: &TickPlan) -> bool {
        let filter = &self.store.snapshot().filter;
        let candidates = selection::eligible(&self.order, &self.registry, filter);
        let first = candidates.first().map(|c| c.id.clone());
        let current = self.store.snapshot().selected.clone();
        let current_ok = current
            .as_ref()
            .is_some_and(|id| selection::is_eligible(&self.registry, filter, id));

        let mut target: Option<Option<ItemId>> = None;
        if plan.search_changed {
            target = match self.config.reselect {
                ReselectPolicy::AlwaysFirst => Some(first.clone()),
                ReselectPolicy::PreserveEligible if current_ok => None,
                ReselectPolicy::PreserveEligible => Some(first.clone()),
            };
        }
        if plan.select_first {
            target = Some(first.clone());
        }
        if plan.added && current.is_none() && target.is_none() {
            target = Some(first.clone());
        }
        if target.is_none() && filter.is_active() && current.is_some() && !current_ok {
            target = Some(first);
        }

        match target {
            Some(target) => self.store.propose_selected(target) != SelectOutcome::Unchanged,
            None => false,
        }
    }

    // --- Reading ------------------------------------------------------------

    pub fn subscribe(&mut self, listener: impl FnMut(&MenuState) + 'static) -> ListenerId {
        self.store.subscribe(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn snapshot(&self) -> &MenuState {
        self.store.snapshot()
    }

    pub fn query(&self) -> &str {
        &self.store.snapshot().query
    }

    pub fn selected(&self) -> Option<&ItemId> {
        self.store.snapshot().selected.as_ref()
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.registry.item(id)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    pub fn is_item_visible(&self, id: &ItemId) -> bool {
        self.store
            .snapshot()
            .filter
            .is_item_visible(&self.registry, id)
    }

    pub fn is_group_visible(&self, id: &GroupId) -> bool {
        self.store.snapshot().filter.is_group_visible(id)
    }

    /// Separators render while not searching, or always when asked to.
    pub fn separator_visible(&self, always_render: bool) -> bool {
        always_render || self.store.snapshot().query.is_empty()
    }

    /// Whether the "no results" placeholder should render.
    pub fn is_empty(&self) -> bool {
        self.store.snapshot().filter.count() == 0
    }

    /// Order as of the last tick.
    pub fn render_order(&self) -> &RenderOrder {
        &self.order
    }

    /// Rows as of the last tick: headings followed by their members.
    pub fn render_rows(&self) -> Vec<Row> {
        self.order.rows()
    }

    /// Take the pending scroll target, if the selection moved since the last
    /// call.
    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        self.scroll_request.take()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_max_visible(&mut self, rows: usize) {
        self.config.max_visible = rows;
        self.viewport.set_height(rows);
    }

    /// Number of notifications sent so far.
    pub fn emit_count(&self) -> u64 {
        self.store.emit_count()
    }

    pub fn scheduler_stats(&self) -> SchedulerStats {
        self.scheduler.stats()
    }

    pub fn has_pending_work(&self) -> bool {
        !self.scheduler.is_empty()
    }
}

#[derive(Debug, Default)]
struct TickPlan {
    resort: bool,
    search_changed: bool,
    added: bool,
    select_first: bool,
    scroll: bool,
    notify: bool,
}
