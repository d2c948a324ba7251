#![forbid(unsafe_code)]

//! End-to-end menu behavior: mounting, filtering, ordering, selection,
//! notifications, and controlled modes.

use std::cell::RefCell;
use std::rc::Rc;

use cmdk_core::{KeyCode, KeyEvent, Modifiers};
use cmdk_menu::{
    BayesianScorer, CommandMenu, CountingScorer, GroupId, GroupSpec, ItemId, ItemSpec, MenuAction,
    MenuConfig, Move, ReselectPolicy, Row,
};

// ============================================================================
// Helpers
// ============================================================================

fn substring(value: &str, query: &str, _: &[String]) -> f64 {
    if value.to_lowercase().contains(&query.to_lowercase()) {
        1.0
    } else {
        0.0
    }
}

fn mount(menu: &mut CommandMenu, items: &[(&str, &str)]) {
    for (id, value) in items {
        let _ = menu.register_item(ItemSpec::new(*id, *value));
    }
    menu.tick();
}

fn selected(menu: &CommandMenu) -> Option<String> {
    menu.selected().map(ItemId::to_string)
}

fn visible_items(menu: &CommandMenu) -> Vec<String> {
    menu.render_order()
        .items()
        .map(|(id, _)| id.to_string())
        .collect()
}

fn notifications(menu: &mut CommandMenu) -> Rc<RefCell<usize>> {
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    menu.subscribe(move |_| *sink.borrow_mut() += 1);
    count
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn basic_filter_selects_only_match() {
    let mut menu = CommandMenu::default();
    mount(&mut menu, &[("item", "Item"), ("value", "xxx")]);
    assert_eq!(selected(&menu).as_deref(), Some("item"));

    menu.set_query("x");
    menu.tick();
    assert!(menu.is_item_visible(&"value".into()));
    assert!(!menu.is_item_visible(&"item".into()));
    assert_eq!(visible_items(&menu), vec!["value"]);
    assert_eq!(selected(&menu).as_deref(), Some("value"));
    assert_eq!(menu.snapshot().filter.count(), 1);
}

#[test]
fn empty_query_counts_all_and_never_scores() {
    let (scorer, calls) = CountingScorer::new(BayesianScorer::new());
    let mut menu = CommandMenu::default().with_scorer(scorer);
    mount(&mut menu, &[("a", "Alpha"), ("b", "Beta"), ("c", "Gamma")]);
    assert_eq!(menu.snapshot().filter.count(), 3);
    assert_eq!(calls.get(), 0);

    menu.set_query("al");
    menu.tick();
    assert!(calls.get() > 0);

    calls.reset();
    menu.set_query("");
    menu.tick();
    assert_eq!(menu.snapshot().filter.count(), 3);
    assert_eq!(calls.get(), 0);
    // Natural order comes back once the query clears.
    assert_eq!(visible_items(&menu), vec!["a", "b", "c"]);
}

#[test]
fn no_matches_means_no_selection() {
    let mut menu = CommandMenu::default();
    mount(&mut menu, &[("a", "Alpha"), ("b", "Beta")]);
    menu.set_query("zzz");
    menu.tick();
    assert!(menu.is_empty());
    assert_eq!(menu.snapshot().filter.count(), 0);
    assert_eq!(selected(&menu), None);
}

#[test]
fn should_filter_off_shows_everything() {
    let mut menu = CommandMenu::new(MenuConfig::new().with_should_filter(false));
    mount(&mut menu, &[("a", "Alpha"), ("b", "Beta")]);
    menu.set_query("zzz");
    menu.tick();
    assert_eq!(visible_items(&menu), vec!["a", "b"]);
    assert!(!menu.is_empty());

    menu.set_should_filter(true);
    menu.tick();
    assert!(menu.is_empty());
}

#[test]
fn keywords_make_items_findable() {
    let mut menu = CommandMenu::default();
    let _ = menu.register_item(ItemSpec::new("settings", "Settings").with_keywords(["prefs"]));
    let _ = menu.register_item(ItemSpec::new("theme", "Theme"));
    menu.tick();
    menu.set_query("prefs");
    menu.tick();
    assert_eq!(visible_items(&menu), vec!["settings"]);
}

#[test]
fn duplicate_values_across_ids() {
    let mut menu = CommandMenu::default();
    mount(&mut menu, &[("one", "Same"), ("two", "Same")]);
    menu.set_query("same");
    menu.tick();
    assert_eq!(visible_items(&menu), vec!["one", "two"]);
}

// ============================================================================
// Groups
// ============================================================================

#[test]
fn groups_hide_and_show_with_members() {
    let mut menu = CommandMenu::default().with_scorer(substring);
    let _ = menu.register_group(GroupSpec::new("g1").with_heading("Fruit"));
    let _ = menu.register_group(GroupSpec::new("g2").with_heading("Veg"));
    let _ = menu.register_item(ItemSpec::new("apple", "apple").in_group("g1"));
    let _ = menu.register_item(ItemSpec::new("pear", "pear").in_group("g1"));
    let _ = menu.register_item(ItemSpec::new("kale", "kale").in_group("g2"));
    let _ = menu.register_item(ItemSpec::new("leek", "leek").in_group("g2"));
    menu.tick();

    menu.set_query("kal");
    menu.tick();
    assert!(!menu.is_group_visible(&"g1".into()));
    assert!(menu.is_group_visible(&"g2".into()));
    let visible: Vec<_> = menu.snapshot().filter.visible_groups().cloned().collect();
    assert_eq!(visible, vec![GroupId::from("g2")]);
    assert_eq!(selected(&menu).as_deref(), Some("kale"));

    menu.set_query("");
    menu.tick();
    assert!(menu.is_group_visible(&"g1".into()));
    assert!(menu.is_group_visible(&"g2".into()));
}

#[test]
fn groups_render_after_ungrouped_items() {
    let mut menu = CommandMenu::default();
    let _ = menu.register_item(ItemSpec::new("exact", "run").in_group("g"));
    let _ = menu.register_item(ItemSpec::new("loose", "rerun everything"));
    menu.tick();
    menu.set_query("run");
    menu.tick();
    assert_eq!(
        menu.render_rows(),
        vec![
            Row::Item("loose".into()),
            Row::Heading("g".into()),
            Row::Item("exact".into()),
        ]
    );
}

#[test]
fn force_mount_group_survives_any_query() {
    let mut menu = CommandMenu::default();
    let _ = menu.register_group(GroupSpec::new("help").with_force_mount(true));
    let _ = menu.register_item(ItemSpec::new("docs", "Documentation").in_group("help"));
    let _ = menu.register_item(ItemSpec::new("a", "Alpha"));
    menu.tick();
    menu.set_query("zzz");
    menu.tick();
    assert!(menu.is_group_visible(&"help".into()));
    assert!(menu.is_item_visible(&"docs".into()));
    assert!(menu.is_empty());
    // Forced items stay selectable.
    assert_eq!(selected(&menu).as_deref(), Some("docs"));
}

#[test]
fn separators_follow_query() {
    let mut menu = CommandMenu::default();
    mount(&mut menu, &[("a", "Alpha")]);
    assert!(menu.separator_visible(false));
    menu.set_query("al");
    assert!(!menu.separator_visible(false));
    assert!(menu.separator_visible(true));
}

// ============================================================================
// Selection lifecycle
// ============================================================================

#[test]
fn later_mounts_keep_selection() {
    let mut menu = CommandMenu::default();
    mount(&mut menu, &[("a", "Alpha")]);
    assert_eq!(selected(&menu).as_deref(), Some("a"));
    mount(&mut menu, &[("b", "Beta")]);
    assert_eq!(selected(&menu).as_deref(), Some("a"));
}

#[test]
fn unmounting_selected_moves_to_first() {
    let mut menu = CommandMenu::default();
    mount(&mut menu, &[("a", "Alpha"), ("b", "Beta")]);
    assert!(menu.unregister_item(&"a".into()));
    menu.tick();
    assert_eq!(selected(&menu).as_deref(), Some("b"));

    assert!(!menu.unregister_item(&"a".into()));
}

#[test]
fn registration_token_unregisters() {
    let mut menu = CommandMenu::default();
    let token = menu.register_item(ItemSpec::new("a", "Alpha"));
    menu.tick();
    assert!(menu.unregister(token));
    menu.tick();
    assert_eq!(selected(&menu), None);
    assert!(menu.registry().is_empty());
}

#[test]
fn navigation_skips_disabled() {
    let mut menu = CommandMenu::default();
    let _ = menu.register_item(ItemSpec::new("a", "Alpha"));
    let _ = menu.register_item(ItemSpec::new("b", "Beta").with_disabled(true));
    let _ = menu.register_item(ItemSpec::new("c", "Gamma"));
    menu.tick();
    assert!(menu.move_selection(Move::Next));
    assert_eq!(selected(&menu).as_deref(), Some("c"));
}

#[test]
fn loop_controls_wraparound() {
    let mut menu = CommandMenu::default();
    mount(&mut menu, &[("a", "Alpha"), ("b", "Beta")]);
    menu.move_selection(Move::Last);
    assert!(!menu.move_selection(Move::Next));
    assert_eq!(selected(&menu).as_deref(), Some("b"));

    let mut looping = CommandMenu::new(MenuConfig::new().with_loop(true));
    mount(&mut looping, &[("a", "Alpha"), ("b", "Beta")]);
    looping.move_selection(Move::Last);
    assert!(looping.move_selection(Move::Next));
    assert_eq!(selected(&looping).as_deref(), Some("a"));
}

#[test]
fn alt_arrows_jump_groups() {
    let mut menu = CommandMenu::default();
    for (id, group) in [("a1", "a"), ("a2", "a"), ("b1", "b"), ("b2", "b")] {
        let _ = menu.register_item(ItemSpec::new(id, id).in_group(group));
    }
    menu.tick();
    let alt_down = KeyEvent::new(KeyCode::Down).with_modifiers(Modifiers::ALT);
    menu.handle_key(&alt_down);
    assert_eq!(selected(&menu).as_deref(), Some("b1"));
    let alt_up = KeyEvent::new(KeyCode::Up).with_modifiers(Modifiers::ALT);
    menu.handle_key(&alt_up);
    assert_eq!(selected(&menu).as_deref(), Some("a1"));
}

#[test]
fn hover_ignores_hidden_and_disabled() {
    let mut menu = CommandMenu::default();
    let _ = menu.register_item(ItemSpec::new("a", "Alpha"));
    let _ = menu.register_item(ItemSpec::new("b", "Beta").with_disabled(true));
    let _ = menu.register_item(ItemSpec::new("c", "Gamma"));
    menu.tick();
    assert!(!menu.hover(&"b".into()));
    assert!(!menu.hover(&"missing".into()));
    menu.set_query("alp");
    menu.tick();
    assert!(!menu.hover(&"c".into()));
    assert_eq!(selected(&menu).as_deref(), Some("a"));
}

#[test]
fn click_commits_value() {
    let mut menu = CommandMenu::default();
    mount(&mut menu, &[("a", "Alpha"), ("b", "  Beta  ")]);
    let action = menu.click(&"b".into());
    assert_eq!(
        action,
        Some(MenuAction::Commit {
            id: "b".into(),
            value: "Beta".into()
        })
    );
}

#[test]
fn selected_stays_eligible_while_filtering() {
    let mut menu = CommandMenu::default();
    mount(&mut menu, &[("a", "Alpha"), ("b", "Beta"), ("c", "Alpine")]);
    menu.set_query("alp");
    menu.tick();
    menu.set_item_disabled(&"a".into(), true);
    menu.tick();
    assert_eq!(selected(&menu).as_deref(), Some("c"));

    menu.set_item_value(&"c".into(), "Omega", None);
    menu.tick();
    assert_eq!(selected(&menu), None);
}

// ============================================================================
// Reselect policy
// ============================================================================

#[test]
fn preserve_eligible_keeps_surviving_selection() {
    let mut menu = CommandMenu::default().with_scorer(substring);
    mount(&mut menu, &[("a", "apple"), ("b", "grape")]);
    menu.move_selection(Move::Next);
    assert_eq!(selected(&menu).as_deref(), Some("b"));
    menu.set_query("ap");
    menu.tick();
    assert_eq!(selected(&menu).as_deref(), Some("b"));
}

#[test]
fn always_first_resets_on_every_query() {
    let config = MenuConfig::new().with_reselect(ReselectPolicy::AlwaysFirst);
    let mut menu = CommandMenu::new(config).with_scorer(substring);
    mount(&mut menu, &[("a", "apple"), ("b", "grape")]);
    menu.move_selection(Move::Next);
    menu.set_query("ap");
    menu.tick();
    assert_eq!(selected(&menu).as_deref(), Some("a"));
}

// ============================================================================
// Notifications and batching
// ============================================================================

#[test]
fn repeated_query_notifies_once() {
    let mut menu = CommandMenu::default();
    mount(&mut menu, &[("a", "Alpha")]);
    let count = notifications(&mut menu);
    menu.set_query("al");
    menu.tick();
    assert!(!menu.set_query("al"));
    menu.tick();
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn mount_burst_is_one_pass() {
    let mut menu = CommandMenu::default();
    let count = notifications(&mut menu);
    for i in 0..100 {
        let _ = menu.register_item(ItemSpec::new(format!("i{i}"), format!("Item {i}")));
    }
    menu.tick();
    assert_eq!(*count.borrow(), 1);
    assert_eq!(menu.scheduler_stats().flushes, 1);
    assert_eq!(selected(&menu).as_deref(), Some("i0"));
}

#[test]
fn mount_during_pending_search_settles_together() {
    let mut menu = CommandMenu::default();
    mount(&mut menu, &[("a", "Alpha")]);
    let count = notifications(&mut menu);

    menu.set_query("bet");
    let _ = menu.register_item(ItemSpec::new("b", "Beta"));
    assert!(menu.has_pending_work());
    menu.tick();

    assert_eq!(selected(&menu).as_deref(), Some("b"));
    assert_eq!(menu.snapshot().filter.count(), 1);
    assert_eq!(visible_items(&menu), vec!["b"]);
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn large_mount_burst_with_empty_query() {
    let mut menu = CommandMenu::default();
    let _ = menu.register_group(GroupSpec::new("pinned").with_force_mount(true));
    for i in 0..20_000 {
        let spec = ItemSpec::new(format!("i{i}"), format!("Item {i}"));
        let spec = if i % 100 == 0 { spec.in_group("pinned") } else { spec };
        let _ = menu.register_item(spec);
    }
    menu.tick();
    // Force-mounted members are not counted.
    assert_eq!(menu.snapshot().filter.count(), 19_800);
    assert_eq!(menu.registry().tracked_len(), 19_800);

    for i in 1..1_000 {
        menu.unregister_item(&ItemId::from(format!("i{i}")));
    }
    menu.tick();
    assert_eq!(menu.snapshot().filter.count(), 19_800 - 990);
}

#[test]
fn unchanged_value_schedules_nothing() {
    let mut menu = CommandMenu::default();
    mount(&mut menu, &[("a", "Alpha")]);
    assert!(!menu.set_item_value(&"a".into(), "Alpha", None));
    assert!(!menu.has_pending_work());
    let _ = menu.register_item(ItemSpec::new("a", "Alpha"));
    assert!(!menu.has_pending_work());
}

#[test]
fn listeners_see_settled_state() {
    let mut menu = CommandMenu::default();
    mount(&mut menu, &[("a", "Alpha"), ("b", "Beta")]);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let id = menu.subscribe(move |state| {
        sink.borrow_mut()
            .push((state.query.clone(), state.selected.as_ref().map(ItemId::to_string)));
    });
    menu.set_query("bet");
    menu.tick();
    assert_eq!(
        *seen.borrow(),
        vec![("bet".to_string(), Some("b".to_string()))]
    );
    assert!(menu.unsubscribe(id));
}

// ============================================================================
// Controlled modes
// ============================================================================

#[test]
fn controlled_value_forwards_changes() {
    let mut menu = CommandMenu::default();
    let proposals = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&proposals);
    menu.on_value_change(move |id| sink.borrow_mut().push(id.map(ItemId::to_string)));
    menu.control_value(Some("a".into()));
    mount(&mut menu, &[("a", "Alpha"), ("b", "Beta")]);
    assert_eq!(selected(&menu).as_deref(), Some("a"));

    menu.move_selection(Move::Next);
    // Not applied until the owner syncs it back.
    assert_eq!(selected(&menu).as_deref(), Some("a"));
    assert_eq!(proposals.borrow().last().cloned(), Some(Some("b".to_string())));

    menu.control_value(Some("b".into()));
    menu.tick();
    assert_eq!(selected(&menu).as_deref(), Some("b"));
}

#[test]
fn controlled_ids_are_opaque() {
    let mut menu = CommandMenu::default();
    mount(&mut menu, &[(" a", "Alpha"), ("a", "Other")]);
    menu.control_value(Some(ItemId::from(" a")));
    menu.tick();
    assert_eq!(menu.selected(), Some(&ItemId::from(" a")));
    assert!(menu.item(&ItemId::from(" a")).is_some());
}

#[test]
fn uncontrolled_value_reports_changes() {
    let mut menu = CommandMenu::default();
    let proposals = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&proposals);
    menu.on_value_change(move |id| sink.borrow_mut().push(id.map(ItemId::to_string)));
    mount(&mut menu, &[("a", "Alpha"), ("b", "Beta")]);
    menu.move_selection(Move::Next);
    assert_eq!(
        *proposals.borrow(),
        vec![Some("a".to_string()), Some("b".to_string())]
    );
}

#[test]
fn controlled_search_only_reports_input() {
    let mut menu = CommandMenu::default();
    mount(&mut menu, &[("a", "Alpha"), ("b", "Beta")]);
    let typed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&typed);
    menu.on_search_change(move |text| sink.borrow_mut().push(text.to_string()));
    menu.control_search();

    menu.input_changed("bet");
    menu.tick();
    assert_eq!(menu.query(), "");
    assert_eq!(*typed.borrow(), vec!["bet".to_string()]);

    menu.sync_controlled_search("bet");
    menu.tick();
    assert_eq!(menu.query(), "bet");
    assert_eq!(selected(&menu).as_deref(), Some("b"));
}

#[test]
fn uncontrolled_search_applies_input() {
    let mut menu = CommandMenu::default();
    mount(&mut menu, &[("a", "Alpha"), ("b", "Beta")]);
    menu.input_changed("bet");
    menu.tick();
    assert_eq!(menu.query(), "bet");
    assert_eq!(visible_items(&menu), vec!["b"]);
}

// ============================================================================
// Scrolling
// ============================================================================

#[test]
fn keyboard_moves_request_scroll() {
    let mut menu = CommandMenu::new(MenuConfig::new().with_max_visible(3));
    let items: Vec<(String, String)> = (0..10)
        .map(|i| (format!("i{i}"), format!("Item {i}")))
        .collect();
    for (id, value) in &items {
        let _ = menu.register_item(ItemSpec::new(id.as_str(), value.as_str()));
    }
    menu.tick();
    menu.take_scroll_request();

    menu.move_selection(Move::Last);
    menu.tick();
    let request = menu.take_scroll_request().unwrap();
    assert_eq!(request.item, ItemId::from("i9"));
    assert_eq!(request.offset, 7);
    assert_eq!(menu.take_scroll_request(), None);
}
