use crate::applier::{Placement, apply_move};
use crate::error::Result;
use crate::geometry::{EntryGeometry, Point};
use crate::item::ItemId;
use crate::resolver::{DropPosition, ResolverConfig, resolve_drop};
use crate::store::Forest;

/// State for a single drag gesture.
///
/// Ending the gesture consumes the session, so the dragged id cannot leak
/// into the next one.
#[derive(Debug, Clone)]
pub struct DragSession {
    dragged_id: ItemId,
    last_position: Option<DropPosition>,
}

impl DragSession {
    pub fn begin(dragged_id: impl Into<ItemId>) -> Self {
        Self {
            dragged_id: dragged_id.into(),
            last_position: None,
        }
    }

    pub fn dragged_id(&self) -> &str {
        &self.dragged_id
    }

    /// The position from the most recent [`DragSession::update`].
    ///
    /// Kept for presentation layers that redraw feedback without a fresh
    /// pointer event. [`DragSession::drop_at`] does not use it and resolves
    /// again at the drop point, since the pointer may have moved since the
    /// last update.
    pub fn last_position(&self) -> Option<&DropPosition> {
        self.last_position.as_ref()
    }

    /// Resolve the pointer against the current geometry. Does not touch the
    /// forest.
    pub fn update<G>(
        &mut self,
        pointer: Point,
        geometry: &G,
        forest: &Forest,
        config: &ResolverConfig,
    ) -> &DropPosition
    where
        G: EntryGeometry + ?Sized,
    {
        let entries = geometry.visible_entries();
        let position = resolve_drop(pointer, &entries, &self.dragged_id, forest, config);
        self.last_position.insert(position)
    }

    /// Resolve once more at the drop point and apply the move.
    pub fn drop_at<G>(
        self,
        pointer: Point,
        geometry: &G,
        forest: &mut Forest,
        config: &ResolverConfig,
    ) -> Result<Placement>
    where
        G: EntryGeometry + ?Sized,
    {
        let entries = geometry.visible_entries();
        let position = resolve_drop(pointer, &entries, &self.dragged_id, forest, config);
        apply_move(forest, &self.dragged_id, &position, &entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Bounds, VisibleEntry};
    use crate::item::Item;

    fn forest() -> Forest {
        Forest::from_roots(vec![Item::new("A", "A"), Item::new("B", "B")])
    }

    fn rows() -> Vec<VisibleEntry> {
        vec![VisibleEntry::new("A", 0, Bounds::new(0., 0., 200., 30.))]
    }

    #[test]
    fn update_caches_position_without_mutation() {
        let forest = forest();
        let before = forest.clone();
        let mut session = DragSession::begin("B");

        let position = session
            .update(Point::new(50., 25.), &rows(), &forest, &ResolverConfig::default())
            .clone();

        assert!(position.is_nested);
        assert_eq!(session.last_position(), Some(&position));
        assert_eq!(forest, before);
    }

    #[test]
    fn drop_at_applies_move() {
        let mut forest = forest();
        let session = DragSession::begin("B");

        session
            .drop_at(
                Point::new(50., 25.),
                rows().as_slice(),
                &mut forest,
                &ResolverConfig::default(),
            )
            .unwrap();

        assert_eq!(forest.dump().trim(), "A\n  B");
    }
}
