#![forbid(unsafe_code)]

//! Event logging for the menu engine.
//!
//! With the `tracing` feature, `cmdk_core::debug!` and `cmdk_core::trace!`
//! are the `tracing` macros. Without it they expand to nothing, so engine
//! crates can log unconditionally. Spans are not shimmed: engine code opens
//! them under `#[cfg(feature = "tracing")]` so the guard disappears too.
//!
//! Levels used by the engine:
//!
//! | Level   | Events                                    |
//! |---------|-------------------------------------------|
//! | `debug` | filter passes, commits                    |
//! | `trace` | ignored selection requests and their cause |

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op debug macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op trace macro when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }
}
