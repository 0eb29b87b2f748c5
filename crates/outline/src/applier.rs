use crate::error::{OutlineError, Result};
use crate::geometry::VisibleEntry;
use crate::item::{Item, ItemId};
use crate::resolver::DropPosition;
use crate::store::{Forest, RemovedItem};

/// Where a moved item ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub parent_id: Option<ItemId>,
    pub index: usize,
}

/// Apply a resolved drop to the forest.
///
/// `entries` must be the same rendered rows the position was resolved
/// against. On any error the forest is left exactly as it was.
pub fn apply_move(
    forest: &mut Forest,
    dragged_id: &str,
    position: &DropPosition,
    entries: &[VisibleEntry],
) -> Result<Placement> {
    if position.is_invalid {
        tracing::debug!(dragged_id, "ignoring drop on invalid position");
        return Err(OutlineError::InvalidDrop);
    }

    let Some(removed) = forest.remove(dragged_id) else {
        tracing::debug!(dragged_id, "dragged item no longer exists");
        return Err(OutlineError::ItemNotFound(dragged_id.to_string()));
    };

    let placement = match compute_destination(forest, &removed.item, position, entries) {
        Ok(placement) => placement,
        Err(err) => {
            tracing::debug!(dragged_id, %err, "rejected move");
            restore(forest, removed);
            return Err(err);
        }
    };

    let RemovedItem {
        item,
        parent_id: old_parent_id,
        index: old_index,
    } = removed;
    if let Err(item) = forest.insert(item, placement.parent_id.as_deref(), placement.index) {
        let parent_id = placement.parent_id.unwrap_or_default();
        restore(
            forest,
            RemovedItem {
                item,
                parent_id: old_parent_id,
                index: old_index,
            },
        );
        return Err(OutlineError::TargetNotFound(parent_id));
    }

    forest.renumber_all();
    tracing::debug!(
        dragged_id,
        parent_id = ?placement.parent_id,
        index = placement.index,
        "moved item"
    );
    Ok(placement)
}

fn compute_destination(
    forest: &Forest,
    dragged: &Item,
    position: &DropPosition,
    entries: &[VisibleEntry],
) -> Result<Placement> {
    if position.is_nested
        && let Some(target_id) = position.target_item_id.as_deref()
    {
        ensure_outside(dragged, target_id)?;
        if !forest.contains(target_id) {
            return Err(OutlineError::TargetNotFound(target_id.to_string()));
        }
        return Ok(Placement {
            parent_id: Some(target_id.to_string()),
            index: 0,
        });
    }

    let before = &entries[..position.insertion_index.min(entries.len())];
    let level = position.resolved_level;
    let parent = if level > 0 {
        before.iter().rev().find(|entry| entry.level() < level)
    } else {
        None
    };

    let Some(parent) = parent else {
        let index = count_members(before, forest.roots());
        return Ok(Placement {
            parent_id: None,
            index,
        });
    };

    ensure_outside(dragged, &parent.id)?;
    let siblings = forest
        .siblings(Some(&parent.id))
        .ok_or_else(|| OutlineError::TargetNotFound(parent.id.clone()))?;
    Ok(Placement {
        parent_id: Some(parent.id.clone()),
        index: count_members(before, siblings),
    })
}

fn ensure_outside(dragged: &Item, target_id: &str) -> Result<()> {
    if dragged.subtree_contains(target_id) {
        return Err(OutlineError::WouldCycle {
            dragged: dragged.id.clone(),
            target: target_id.to_string(),
        });
    }
    Ok(())
}

/// How many of the rendered rows before the gap are among `siblings`.
fn count_members(before: &[VisibleEntry], siblings: &[Item]) -> usize {
    before
        .iter()
        .filter(|entry| siblings.iter().any(|sibling| sibling.id == entry.id))
        .count()
}

fn restore(forest: &mut Forest, removed: RemovedItem) {
    let Err(item) = forest.insert(removed.item, removed.parent_id.as_deref(), removed.index) else {
        return;
    };
    tracing::debug!(
        id = %item.id,
        parent_id = ?removed.parent_id,
        "former parent vanished, restoring at the root"
    );
    // Root insertion never hands the item back.
    if let Err(item) = forest.insert(item, None, removed.index) {
        tracing::debug!(id = %item.id, "root insertion refused item");
    }
}
