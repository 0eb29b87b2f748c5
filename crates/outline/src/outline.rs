use crate::applier::Placement;
use crate::error::{OutlineError, Result};
use crate::geometry::{EntryGeometry, Point};
use crate::item::Item;
use crate::resolver::{DropPosition, ResolverConfig};
use crate::session::DragSession;
use crate::store::{FlatRow, Forest};

/// The forest plus at most one in-flight drag.
///
/// This is what a presentation layer holds on to: it forwards pointer events
/// here and redraws from [`Outline::rows`].
#[derive(Debug, Clone, Default)]
pub struct Outline {
    forest: Forest,
    config: ResolverConfig,
    session: Option<DragSession>,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forest(mut self, forest: Forest) -> Self {
        self.forest = forest;
        self
    }

    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn set_config(&mut self, config: ResolverConfig) {
        self.config = config;
    }

    pub fn resolver_config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn items(&self) -> &Forest {
        &self.forest
    }

    /// Rows to render, depth-first in `order` order.
    pub fn rows(&self) -> Vec<FlatRow> {
        self.forest.flatten()
    }

    pub fn add_root_item(&mut self, content: &str) -> Result<Item> {
        self.forest.add_root_item(content).cloned()
    }

    /// Start dragging `id`. Any previous session is discarded.
    pub fn begin_drag(&mut self, id: &str) -> Result<()> {
        self.session = None;
        if !self.forest.contains(id) {
            return Err(OutlineError::ItemNotFound(id.to_string()));
        }
        self.session = Some(DragSession::begin(id));
        Ok(())
    }

    pub fn dragged_id(&self) -> Option<&str> {
        self.session.as_ref().map(DragSession::dragged_id)
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Evaluate a pointer move. `None` when no drag is active.
    pub fn drag_over<G>(&mut self, pointer: Point, geometry: &G) -> Option<&DropPosition>
    where
        G: EntryGeometry + ?Sized,
    {
        let session = self.session.as_mut()?;
        Some(session.update(pointer, geometry, &self.forest, &self.config))
    }

    /// Finish the drag with a drop. The session ends whatever the outcome.
    pub fn drop_at<G>(&mut self, pointer: Point, geometry: &G) -> Result<Placement>
    where
        G: EntryGeometry + ?Sized,
    {
        let session = self.session.take().ok_or(OutlineError::NoActiveDrag)?;
        session.drop_at(pointer, geometry, &mut self.forest, &self.config)
    }

    /// Abandon the drag without touching the forest.
    pub fn end_drag(&mut self) -> bool {
        self.session.take().is_some()
    }
}
