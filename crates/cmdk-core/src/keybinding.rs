#![forbid(unsafe_code)]

//! Decoding raw key events into semantic menu commands.
//!
//! The menu engine only understands a small vocabulary of navigation and
//! commit commands. [`KeyDecoder`] maps keyboard input onto it:
//!
//! | Key                          | Command          |
//! |------------------------------|------------------|
//! | `Down`, `Ctrl+N`, `Ctrl+J`   | `Next`           |
//! | `Up`, `Ctrl+P`, `Ctrl+K`     | `Previous`       |
//! | `Super` + next key           | `Last`           |
//! | `Super` + previous key       | `First`          |
//! | `Alt` + next key             | `NextGroup`      |
//! | `Alt` + previous key         | `PreviousGroup`  |
//! | `Home` / `End`               | `First` / `Last` |
//! | `Enter`                      | `Commit`         |
//!
//! The Ctrl letter bindings are the vim/emacs style shortcuts and can be
//! turned off with [`KeyDecoder::with_vim_bindings`].

use crate::event::{KeyCode, KeyEvent};

/// A semantic command understood by the selection state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuCommand {
    /// Move to the next eligible item.
    Next,
    /// Move to the previous eligible item.
    Previous,
    /// Jump to the first eligible item.
    First,
    /// Jump to the last eligible item.
    Last,
    /// Jump to the first eligible item of the following group.
    NextGroup,
    /// Jump to the first eligible item of the preceding group.
    PreviousGroup,
    /// Commit the selected item.
    Commit,
}

impl MenuCommand {
    /// Whether this command moves the selection (as opposed to committing).
    #[must_use]
    pub const fn is_navigation(self) -> bool {
        !matches!(self, Self::Commit)
    }
}

/// Stateless key-to-command decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDecoder {
    vim_bindings: bool,
}

impl Default for KeyDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyDecoder {
    /// Create a decoder with vim bindings enabled.
    #[must_use]
    pub const fn new() -> Self {
        Self { vim_bindings: true }
    }

    /// Enable or disable the Ctrl+N/J/P/K shortcuts (builder).
    #[must_use]
    pub const fn with_vim_bindings(mut self, enabled: bool) -> Self {
        self.vim_bindings = enabled;
        self
    }

    /// Whether vim bindings are enabled.
    #[must_use]
    pub const fn vim_bindings(&self) -> bool {
        self.vim_bindings
    }

    /// Decode a key event. Returns `None` for keys the menu does not handle.
    #[must_use]
    pub fn decode(&self, event: &KeyEvent) -> Option<MenuCommand> {
        if !event.is_actionable() {
            return None;
        }

        match event.code {
            KeyCode::Down => Some(Self::forward(event)),
            KeyCode::Up => Some(Self::backward(event)),
            KeyCode::Char(_) if self.is_vim_forward(event) => Some(Self::forward(event)),
            KeyCode::Char(_) if self.is_vim_backward(event) => Some(Self::backward(event)),
            KeyCode::Home => Some(MenuCommand::First),
            KeyCode::End => Some(MenuCommand::Last),
            // Enter during IME composition belongs to the input method.
            KeyCode::Enter if !event.composing => Some(MenuCommand::Commit),
            _ => None,
        }
    }

    fn is_vim_forward(&self, event: &KeyEvent) -> bool {
        self.vim_bindings && event.ctrl() && (event.is_char('n') || event.is_char('j'))
    }

    fn is_vim_backward(&self, event: &KeyEvent) -> bool {
        self.vim_bindings && event.ctrl() && (event.is_char('p') || event.is_char('k'))
    }

    fn forward(event: &KeyEvent) -> MenuCommand {
        if event.super_key() {
            MenuCommand::Last
        } else if event.alt() {
            MenuCommand::NextGroup
        } else {
            MenuCommand::Next
        }
    }

    fn backward(event: &KeyEvent) -> MenuCommand {
        if event.super_key() {
            MenuCommand::First
        } else if event.alt() {
            MenuCommand::PreviousGroup
        } else {
            MenuCommand::Previous
        }
    }
}
