use serde::{Deserialize, Serialize};

pub type ItemId = String;

/// A text item in the outline, owning its subtree.
///
/// `children` is the authoritative sibling order. `order` mirrors the
/// position among siblings and is only trustworthy after
/// [`Forest::renumber_all`](crate::Forest::renumber_all) has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub content: String,
    pub order: usize,
    #[serde(default)]
    pub parent_id: Option<ItemId>,
    #[serde(default)]
    pub children: Vec<Item>,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            order: 0,
            parent_id: None,
            children: Vec::new(),
        }
    }

    pub fn child(mut self, mut child: Item) -> Self {
        child.parent_id = Some(self.id.clone());
        child.order = self.children.len();
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Item>) -> Self {
        for child in children {
            self = self.child(child);
        }
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// True if `id` is this item or anywhere below it.
    pub fn subtree_contains(&self, id: &str) -> bool {
        if self.id == id {
            return true;
        }
        self.children.iter().any(|child| child.subtree_contains(id))
    }

    /// Number of items in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Item::subtree_len).sum::<usize>()
    }
}
