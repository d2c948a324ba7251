#![forbid(unsafe_code)]

//! Core: input events, key decoding, and logging shims for the command menu.

pub mod event;
pub mod keybinding;
pub mod logging;

pub use event::{KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use keybinding::{KeyDecoder, MenuCommand};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, trace};
