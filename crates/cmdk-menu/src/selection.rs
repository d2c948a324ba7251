#![forbid(unsafe_code)]

//! Selection movement over the rendered list.
//!
//! Navigation only ever lands on *eligible* items: visible under the current
//! filter and not disabled, in render order. The functions here are pure;
//! the menu decides what to do with the target they return.

use cmdk_core::MenuCommand;

use crate::filter::FilterResult;
use crate::registry::{GroupId, ItemId, Registry};
use crate::sort::RenderOrder;

/// A selection movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Next,
    Previous,
    First,
    Last,
    NextGroup,
    PreviousGroup,
}

impl Move {
    /// The movement a command asks for, if it is a navigation command.
    pub fn from_command(command: MenuCommand) -> Option<Self> {
        match command {
            MenuCommand::Next => Some(Self::Next),
            MenuCommand::Previous => Some(Self::Previous),
            MenuCommand::First => Some(Self::First),
            MenuCommand::Last => Some(Self::Last),
            MenuCommand::NextGroup => Some(Self::NextGroup),
            MenuCommand::PreviousGroup => Some(Self::PreviousGroup),
            MenuCommand::Commit => None,
        }
    }
}

/// An eligible item and the group it renders in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: ItemId,
    pub group: Option<GroupId>,
}

/// Eligible items in render order.
pub fn eligible(order: &RenderOrder, registry: &Registry, filter: &FilterResult) -> Vec<Candidate> {
    order
        .items()
        .filter(|(id, _)| is_eligible(registry, filter, id))
        .map(|(id, group)| Candidate {
            id: id.clone(),
            group: group.cloned(),
        })
        .collect()
}

/// Whether an item can hold the selection.
pub fn is_eligible(registry: &Registry, filter: &FilterResult, id: &ItemId) -> bool {
    registry.item(id).is_some_and(|item| !item.disabled) && filter.is_item_visible(registry, id)
}

/// Resolve a movement to its target. `None` means the selection stays put.
pub fn resolve(
    candidates: &[Candidate],
    current: Option<&ItemId>,
    movement: Move,
    looping: bool,
) -> Option<ItemId> {
    if candidates.is_empty() {
        return None;
    }
    let index = current.and_then(|id| candidates.iter().position(|c| &c.id == id));

    let target = match movement {
        Move::First => Some(0),
        Move::Last => Some(candidates.len() - 1),
        Move::Next => step(index, 1, candidates.len(), looping),
        Move::Previous => step(index, -1, candidates.len(), looping),
        Move::NextGroup => match index {
            Some(i) => {
                next_group(candidates, i).or_else(|| step(index, 1, candidates.len(), looping))
            }
            None => step(index, 1, candidates.len(), looping),
        },
        Move::PreviousGroup => match index {
            Some(i) => {
                previous_group(candidates, i).or_else(|| step(index, -1, candidates.len(), looping))
            }
            None => step(index, -1, candidates.len(), looping),
        },
    };

    target.map(|i| candidates[i].id.clone())
}

/// One step from `index`. With no current index, forward lands on the first
/// candidate and backward on the last.
fn step(index: Option<usize>, delta: isize, len: usize, looping: bool) -> Option<usize> {
    let Some(index) = index else {
        return Some(if delta > 0 { 0 } else { len - 1 });
    };
    let next = index as isize + delta;
    if next < 0 {
        looping.then(|| len - 1)
    } else if next as usize >= len {
        looping.then_some(0)
    } else {
        Some(next as usize)
    }
}

/// First candidate of the nearest following group.
fn next_group(candidates: &[Candidate], index: usize) -> Option<usize> {
    let current = candidates[index].group.as_ref()?;
    candidates
        .iter()
        .enumerate()
        .skip(index + 1)
        .find(|(_, c)| c.group.as_ref().is_some_and(|g| g != current))
        .map(|(i, _)| i)
}

/// First candidate of the nearest preceding group.
fn previous_group(candidates: &[Candidate], index: usize) -> Option<usize> {
    let current = candidates[index].group.as_ref()?;
    let target = candidates[..index]
        .iter()
        .rev()
        .find_map(|c| c.group.as_ref().filter(|g| *g != current))?;
    candidates
        .iter()
        .position(|c| c.group.as_ref() == Some(target))
}
