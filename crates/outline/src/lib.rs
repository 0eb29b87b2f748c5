//! Core of the drag-and-drop outline: the item forest, drop-position
//! resolution from pointer geometry, and applying a resolved drop.
//!
//! Nothing in this crate knows about a display surface. A presentation layer
//! feeds it pointer coordinates plus the geometry of the rows it rendered, and
//! redraws from [`Forest::flatten`] after a drop.

mod applier;
mod error;
mod geometry;
mod item;
mod outline;
mod resolver;
mod session;
mod store;

pub use crate::applier::*;
pub use crate::error::*;
pub use crate::geometry::*;
pub use crate::item::*;
pub use crate::outline::*;
pub use crate::resolver::*;
pub use crate::session::*;
pub use crate::store::*;
