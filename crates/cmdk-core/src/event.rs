#![forbid(unsafe_code)]

//! Canonical keyboard event types.
//!
//! The command menu never talks to a terminal or a browser directly. Hosts
//! translate whatever their platform produces into these types and hand them
//! to the menu, which decodes them into semantic commands (see
//! [`crate::keybinding`]).
//!
//! # Design Notes
//!
//! - `KeyEventKind` defaults to `Press` when the host cannot distinguish it
//! - `Modifiers` use bitflags for easy combination
//! - `composing` is set while an input method editor still owns the key
//!   stream; commit keys must be ignored in that state

use bitflags::bitflags;

/// A key event as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
    /// An input method still owns the key stream.
    pub composing: bool,
}

impl KeyEvent {
    /// An unmodified key press.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
            composing: false,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Mark the event as part of an IME composition.
    #[must_use]
    pub const fn with_composing(mut self, composing: bool) -> Self {
        self.composing = composing;
        self
    }

    /// `true` for `Char(c)` in either ASCII case.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch.eq_ignore_ascii_case(&c))
    }

    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Meta, Command, or the Windows key.
    #[must_use]
    pub const fn super_key(&self) -> bool {
        self.modifiers.contains(Modifiers::SUPER)
    }

    /// Press and repeat events drive the menu; releases do not.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        !matches!(self.kind, KeyEventKind::Release)
    }
}

/// Key codes a host may forward.
///
/// The decoder acts on the arrows, `Home`, `End`, `Enter`, and Ctrl letters.
/// Everything else is accepted and ignored, so hosts can forward keys
/// without filtering them first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
}

/// Press, auto-repeat, or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Hosts that cannot tell the kinds apart report `Press`.
    #[default]
    Press,
    Repeat,
    /// Never acted on.
    Release,
}

bitflags! {
    /// Held modifier keys.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        /// Alt on most keyboards, Option on macOS.
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        /// Meta, Command, or the Windows key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}
