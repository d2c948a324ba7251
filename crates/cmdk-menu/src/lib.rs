#![forbid(unsafe_code)]

//! Headless command-menu engine.
//!
//! Items and groups are registered as they mount; a query filters and
//! scores them; a single selection moves over what remains. Nothing here
//! draws anything. Hosts read [`CommandMenu::render_rows`] and the snapshot,
//! and feed input back in.
//!
//! | Module       | Role                                           |
//! |--------------|------------------------------------------------|
//! | `scorer`     | query → relevance in `[0, 1]`                  |
//! | `registry`   | mounted items and groups, natural order        |
//! | `filter`     | visible items, scores, visible groups          |
//! | `sort`       | render order                                   |
//! | `selection`  | movement over eligible items                   |
//! | `scheduler`  | same-tick work coalescing                      |
//! | `store`      | state snapshot and listeners                   |
//! | `viewport`   | scroll tracking                                |
//! | `menu`       | [`CommandMenu`], the handle tying it together  |

pub mod config;
pub mod error;
pub mod filter;
pub mod menu;
pub mod registry;
pub mod scheduler;
pub mod scorer;
pub mod selection;
pub mod sort;
pub mod store;
pub mod viewport;

pub use config::{MenuConfig, ReselectPolicy};
pub use error::SelectError;
pub use filter::FilterResult;
pub use menu::{CommandMenu, MenuAction, Registration, SearchMode};
pub use registry::{Group, GroupId, GroupSpec, Item, ItemId, ItemSpec};
pub use scorer::{BayesianScorer, CallCounter, CountingScorer, MatchResult, MatchType, ScoreFn};
pub use selection::Move;
pub use sort::{RenderOrder, Row, Slot};
pub use store::{ListenerId, MenuState};
pub use viewport::ScrollRequest;
