mod common;
mod outline;

pub use outline::{
    DndOutline, DndOutlineDropTarget, DndOutlineRowState, DndOutlineState, dnd_outline,
};
pub use outline_core::{FlatRow, Forest, Item, OutlineError, ResolverConfig};
