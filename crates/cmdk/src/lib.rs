#![forbid(unsafe_code)]

//! Headless command-menu engine.
//!
//! This crate is the stable surface: it re-exports the menu handle, its
//! configuration, and the input types, and offers a prelude for hosts.
//!
//! ```
//! use cmdk::prelude::*;
//!
//! let mut menu = CommandMenu::default();
//! let _ = menu.register_item(ItemSpec::new("open", "Open File"));
//! let _ = menu.register_item(ItemSpec::new("quit", "Quit"));
//! menu.set_query("qu");
//! menu.tick();
//! assert_eq!(menu.selected().map(|id| id.as_str()), Some("quit"));
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use cmdk_core::{KeyCode, KeyDecoder, KeyEvent, KeyEventKind, MenuCommand, Modifiers};

// --- Menu re-exports -------------------------------------------------------

pub use cmdk_menu::{
    BayesianScorer, CommandMenu, FilterResult, Group, GroupId, GroupSpec, Item, ItemId, ItemSpec,
    ListenerId, MatchResult, MatchType, MenuAction, MenuConfig, MenuState, Move, Registration,
    ReselectPolicy, RenderOrder, Row, ScoreFn, ScrollRequest, SearchMode, SelectError, Slot,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for cmdk hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A selection request named an item that cannot be selected.
    Select(SelectError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Select(err) => Some(err),
        }
    }
}

impl From<SelectError> for Error {
    fn from(err: SelectError) -> Self {
        Self::Select(err)
    }
}

/// Standard result type for cmdk APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CommandMenu, Error, GroupSpec, ItemId, ItemSpec, KeyCode, KeyEvent, MenuAction,
        MenuConfig, Modifiers, Move, Result, Row,
    };

    pub use crate::{core, menu};
}

pub use cmdk_core as core;
pub use cmdk_menu as menu;
