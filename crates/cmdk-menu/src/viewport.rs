#![forbid(unsafe_code)]

//! Scroll tracking for a fixed-height list.
//!
//! The menu does not draw anything, but it knows which row a renderer should
//! keep on screen. [`Viewport`] holds the first visible row and moves it the
//! minimum amount needed to reveal a target.

use crate::registry::{GroupId, ItemId};
use crate::sort::Row;

/// Where the renderer should scroll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollRequest {
    /// The item to reveal.
    pub item: ItemId,
    /// Heading revealed alongside the item when it leads its group.
    pub heading: Option<GroupId>,
    /// First visible row after scrolling.
    pub offset: usize,
}

/// A window of `height` rows starting at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    offset: usize,
    height: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Viewport {
    pub fn new(height: usize) -> Self {
        Self {
            offset: 0,
            height: height.max(1),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn set_height(&mut self, height: usize) {
        self.height = height.max(1);
    }

    /// Visible row range.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.height
    }

    /// Pull the offset back if the list shrank below the window.
    pub fn clamp(&mut self, total_rows: usize) {
        self.offset = self.offset.min(total_rows.saturating_sub(self.height));
    }

    /// Scroll so `item` is visible. When the item is the first member of its
    /// group, the heading row directly above it is revealed too.
    ///
    /// Returns `None` when the item has no row.
    pub fn reveal(&mut self, rows: &[Row], item: &ItemId) -> Option<ScrollRequest> {
        let row = rows
            .iter()
            .position(|r| matches!(r, Row::Item(id) if id == item))?;

        let heading = match row.checked_sub(1).map(|i| &rows[i]) {
            Some(Row::Heading(group)) => Some(group.clone()),
            _ => None,
        };
        let top = if heading.is_some() { row - 1 } else { row };

        if top < self.offset {
            self.offset = top;
        } else if row >= self.offset + self.height {
            self.offset = row + 1 - self.height;
        }
        // A heading taller than the window loses to the item itself.
        if row >= self.offset + self.height {
            self.offset = row + 1 - self.height;
        }

        Some(ScrollRequest {
            item: item.clone(),
            heading,
            offset: self.offset,
        })
    }
}
