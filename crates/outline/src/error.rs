use thiserror::Error;

use crate::item::ItemId;

/// Every way an outline operation can decline to change the forest.
///
/// None of these are fatal: callers treat them as a no-op and keep going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutlineError {
    #[error("item content is empty")]
    EmptyContent,

    #[error("drop position is invalid")]
    InvalidDrop,

    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("drop target not found: {0}")]
    TargetNotFound(ItemId),

    #[error("cannot move '{dragged}' into its own descendant '{target}'")]
    WouldCycle { dragged: ItemId, target: ItemId },

    #[error("no drag in progress")]
    NoActiveDrag,
}

pub type Result<T, E = OutlineError> = std::result::Result<T, E>;
