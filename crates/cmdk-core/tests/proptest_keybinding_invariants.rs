//! Property-based invariant tests for key decoding.
//!
//! 1. Release events never produce a command.
//! 2. With vim bindings off, character keys never produce a command.
//! 3. Super on a navigation key always yields an edge jump (First/Last).
//! 4. Composing Enter never commits.

use cmdk_core::{KeyCode, KeyDecoder, KeyEvent, KeyEventKind, MenuCommand, Modifiers};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn key_code_strategy() -> impl Strategy<Value = KeyCode> {
    prop_oneof![
        any::<char>().prop_map(KeyCode::Char),
        Just(KeyCode::Enter),
        Just(KeyCode::Escape),
        Just(KeyCode::Backspace),
        Just(KeyCode::Tab),
        Just(KeyCode::Home),
        Just(KeyCode::End),
        Just(KeyCode::PageUp),
        Just(KeyCode::PageDown),
        Just(KeyCode::Up),
        Just(KeyCode::Down),
        Just(KeyCode::Left),
        Just(KeyCode::Right),
    ]
}

fn modifiers_strategy() -> impl Strategy<Value = Modifiers> {
    (0u8..16).prop_map(Modifiers::from_bits_truncate)
}

fn key_event_strategy() -> impl Strategy<Value = KeyEvent> {
    (key_code_strategy(), modifiers_strategy(), any::<bool>()).prop_map(|(code, mods, composing)| {
        KeyEvent::new(code)
            .with_modifiers(mods)
            .with_composing(composing)
    })
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Release events are inert
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn release_never_decodes(ev in key_event_strategy(), vim in any::<bool>()) {
        let decoder = KeyDecoder::new().with_vim_bindings(vim);
        let release = ev.with_kind(KeyEventKind::Release);
        prop_assert_eq!(decoder.decode(&release), None);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Character keys need vim bindings
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn chars_inert_without_vim(c in any::<char>(), mods in modifiers_strategy()) {
        let decoder = KeyDecoder::new().with_vim_bindings(false);
        let ev = KeyEvent::new(KeyCode::Char(c)).with_modifiers(mods);
        prop_assert_eq!(decoder.decode(&ev), None);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Super jumps to the edges
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn super_arrows_are_edge_jumps(extra in modifiers_strategy(), down in any::<bool>()) {
        let decoder = KeyDecoder::new();
        let code = if down { KeyCode::Down } else { KeyCode::Up };
        let ev = KeyEvent::new(code).with_modifiers(extra | Modifiers::SUPER);
        let expected = if down { MenuCommand::Last } else { MenuCommand::First };
        prop_assert_eq!(decoder.decode(&ev), Some(expected));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. IME composition blocks commit
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn composing_enter_never_commits(mods in modifiers_strategy()) {
        let decoder = KeyDecoder::new();
        let ev = KeyEvent::new(KeyCode::Enter)
            .with_modifiers(mods)
            .with_composing(true);
        prop_assert_ne!(decoder.decode(&ev), Some(MenuCommand::Commit));
    }
}
