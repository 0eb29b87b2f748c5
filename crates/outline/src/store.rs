use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{OutlineError, Result};
use crate::item::{Item, ItemId};

/// An item detached from the forest, with enough context to put it back.
#[derive(Debug, Clone)]
pub struct RemovedItem {
    pub item: Item,
    pub parent_id: Option<ItemId>,
    pub index: usize,
}

/// One rendered row: an item in depth-first, `order`-sorted position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRow {
    pub id: ItemId,
    pub content: String,
    pub level: usize,
    pub parent_id: Option<ItemId>,
}

/// The in-memory forest of outline items.
///
/// The forest exclusively owns every [`Item`]. All structural edits go
/// through `&mut self`, so no subtree is ever aliased.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Forest {
    roots: Vec<Item>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a forest from prepared root items, fixing up parent links and
    /// `order` values.
    pub fn from_roots(roots: impl Into<Vec<Item>>) -> Self {
        let mut forest = Self {
            roots: roots.into(),
        };
        relink(&mut forest.roots, None);
        forest.renumber_all();
        forest
    }

    pub fn roots(&self) -> &[Item] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of items at every level.
    pub fn len(&self) -> usize {
        self.roots.iter().map(Item::subtree_len).sum()
    }

    pub fn find(&self, id: &str) -> Option<&Item> {
        find_node(&self.roots, id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Item> {
        find_node_mut(&mut self.roots, id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Children of `parent_id`, or the root sequence for `None`.
    pub fn siblings(&self, parent_id: Option<&str>) -> Option<&[Item]> {
        match parent_id {
            None => Some(&self.roots),
            Some(parent_id) => self.find(parent_id).map(|parent| parent.children.as_slice()),
        }
    }

    /// Detach `id` together with its subtree.
    pub fn remove(&mut self, id: &str) -> Option<RemovedItem> {
        remove_item_recursive(&mut self.roots, id, None)
    }

    /// Insert `item` under `parent_id` (or at the root) at `index`, clamped to
    /// the sibling count.
    ///
    /// Hands the item back if the parent does not exist.
    pub fn insert(
        &mut self,
        mut item: Item,
        parent_id: Option<&str>,
        index: usize,
    ) -> std::result::Result<(), Item> {
        match parent_id {
            None => {
                item.parent_id = None;
                let ix = index.min(self.roots.len());
                self.roots.insert(ix, item);
                Ok(())
            }
            Some(parent_id) => match find_node_mut(&mut self.roots, parent_id) {
                Some(parent) => {
                    item.parent_id = Some(parent.id.clone());
                    let ix = index.min(parent.children.len());
                    parent.children.insert(ix, item);
                    Ok(())
                }
                None => Err(item),
            },
        }
    }

    /// True iff `candidate_id` is `ancestor_id` itself or lies anywhere in its
    /// subtree. Unknown ancestors have no descendants.
    pub fn is_descendant(&self, ancestor_id: &str, candidate_id: &str) -> bool {
        self.find(ancestor_id)
            .is_some_and(|ancestor| ancestor.subtree_contains(candidate_id))
    }

    /// Reassign `order` to the positional index at every level.
    pub fn renumber_all(&mut self) {
        renumber(&mut self.roots);
    }

    /// Append a new root item with a fresh id.
    pub fn add_root_item(&mut self, content: &str) -> Result<&Item> {
        let content = content.trim();
        if content.is_empty() {
            return Err(OutlineError::EmptyContent);
        }

        let mut item = Item::new(Uuid::new_v4().to_string(), content);
        item.order = self.roots.len();
        tracing::info!(id = %item.id, "added root item");
        self.roots.push(item);

        let last = self.roots.len() - 1;
        Ok(&self.roots[last])
    }

    /// Depth-first rows in render order, siblings sorted by `order`.
    pub fn flatten(&self) -> Vec<FlatRow> {
        let mut rows = Vec::with_capacity(self.len());
        flatten_into(&self.roots, 0, None, &mut rows);
        rows
    }

    /// Indented outline of item ids, two spaces per level.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for row in self.flatten() {
            out.push_str(&"  ".repeat(row.level));
            out.push_str(&row.id);
            out.push('\n');
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Checks every structural invariant: unique ids, parent links matching
    /// containment, and `order` matching position.
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::new();
        consistent(&self.roots, None, &mut seen)
    }
}

fn relink(items: &mut [Item], parent_id: Option<&ItemId>) {
    for item in items.iter_mut() {
        item.parent_id = parent_id.cloned();
        let id = item.id.clone();
        relink(&mut item.children, Some(&id));
    }
}

fn renumber(items: &mut [Item]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.order = index;
        renumber(&mut item.children);
    }
}

fn consistent<'a>(
    items: &'a [Item],
    parent_id: Option<&ItemId>,
    seen: &mut HashSet<&'a str>,
) -> bool {
    items.iter().enumerate().all(|(index, item)| {
        seen.insert(item.id.as_str())
            && item.order == index
            && item.parent_id.as_ref() == parent_id
            && consistent(&item.children, Some(&item.id), seen)
    })
}

fn flatten_into(
    items: &[Item],
    level: usize,
    parent_id: Option<&ItemId>,
    out: &mut Vec<FlatRow>,
) {
    let mut sorted: Vec<&Item> = items.iter().collect();
    sorted.sort_by_key(|item| item.order);
    for item in sorted {
        out.push(FlatRow {
            id: item.id.clone(),
            content: item.content.clone(),
            level,
            parent_id: parent_id.cloned(),
        });
        flatten_into(&item.children, level + 1, Some(&item.id), out);
    }
}

fn find_node<'a>(items: &'a [Item], target_id: &str) -> Option<&'a Item> {
    for node in items {
        if node.id == target_id {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, target_id) {
            return Some(found);
        }
    }
    None
}

fn find_node_mut<'a>(items: &'a mut [Item], target_id: &str) -> Option<&'a mut Item> {
    for node in items.iter_mut() {
        if node.id == target_id {
            return Some(node);
        }
        if let Some(found) = find_node_mut(&mut node.children, target_id) {
            return Some(found);
        }
    }
    None
}

fn remove_item_recursive(
    items: &mut Vec<Item>,
    target_id: &str,
    parent_id: Option<ItemId>,
) -> Option<RemovedItem> {
    if let Some(index) = items.iter().position(|item| item.id == target_id) {
        let item = items.remove(index);
        return Some(RemovedItem {
            item,
            parent_id,
            index,
        });
    }

    for node in items.iter_mut() {
        let parent_id = node.id.clone();
        if let Some(removed) = remove_item_recursive(&mut node.children, target_id, Some(parent_id))
        {
            return Some(removed);
        }
    }

    None
}
