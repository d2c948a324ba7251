#![forbid(unsafe_code)]

use std::fmt;

use crate::registry::ItemId;

/// Why an explicit selection request was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    /// No item with this id is mounted.
    Unknown(ItemId),
    /// The item is filtered out by the current query.
    Hidden(ItemId),
    /// The item is disabled.
    Disabled(ItemId),
}

impl SelectError {
    /// The id the request named.
    pub fn id(&self) -> &ItemId {
        match self {
            Self::Unknown(id) | Self::Hidden(id) | Self::Disabled(id) => id,
        }
    }
}

impl fmt::Display for SelectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(id) => write!(f, "no item with id `{id}` is mounted"),
            Self::Hidden(id) => write!(f, "item `{id}` is hidden by the current query"),
            Self::Disabled(id) => write!(f, "item `{id}` is disabled"),
        }
    }
}

impl std::error::Error for SelectError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_item() {
        let err = SelectError::Disabled("delete".into());
        assert_eq!(err.id().as_str(), "delete");
        assert!(err.to_string().contains("delete"));
        assert!(err.to_string().contains("disabled"));
    }
}
