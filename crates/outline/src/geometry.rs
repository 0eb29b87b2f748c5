use crate::item::ItemId;
use crate::store::FlatRow;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Screen-space bounding box of a rendered row.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Inclusive at both edges.
    #[inline]
    pub fn contains_y(&self, y: f32) -> bool {
        y >= self.top && y <= self.bottom()
    }
}

/// A rendered, non-dragged row as seen by the drop resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleEntry {
    pub id: ItemId,
    /// Nesting level as rendered; `None` when the presentation layer could not
    /// tell, which is read as level 0.
    pub level: Option<usize>,
    pub bounds: Bounds,
}

impl VisibleEntry {
    pub fn new(id: impl Into<ItemId>, level: usize, bounds: Bounds) -> Self {
        Self {
            id: id.into(),
            level: Some(level),
            bounds,
        }
    }

    #[inline]
    pub fn level(&self) -> usize {
        self.level.unwrap_or(0)
    }
}

/// Source of the currently rendered row geometry.
///
/// Implemented by whatever owns the display surface; the core only reads it.
pub trait EntryGeometry {
    /// Rendered rows in depth-first order, excluding the row being dragged.
    fn visible_entries(&self) -> Vec<VisibleEntry>;
}

impl EntryGeometry for [VisibleEntry] {
    fn visible_entries(&self) -> Vec<VisibleEntry> {
        self.to_vec()
    }
}

impl EntryGeometry for Vec<VisibleEntry> {
    fn visible_entries(&self) -> Vec<VisibleEntry> {
        self.clone()
    }
}

/// Geometry for a list of equal-height rows, each indented by its level.
///
/// The dragged row is skipped but keeps its slot, since it is still drawn
/// while the drag is in progress.
#[derive(Debug, Clone)]
pub struct UniformRows<'a> {
    pub rows: &'a [FlatRow],
    pub origin: Point,
    pub row_height: f32,
    pub width: f32,
    pub indent_width: f32,
    pub indent_offset: f32,
    pub scroll_y: f32,
    pub dragged_id: Option<&'a str>,
}

impl EntryGeometry for UniformRows<'_> {
    fn visible_entries(&self) -> Vec<VisibleEntry> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| self.dragged_id != Some(row.id.as_str()))
            .map(|(ix, row)| {
                let indent = self.indent_offset + self.indent_width * row.level as f32;
                let bounds = Bounds::new(
                    self.origin.x + indent,
                    self.origin.y + self.scroll_y + self.row_height * ix as f32,
                    (self.width - indent).max(0.),
                    self.row_height,
                );
                VisibleEntry::new(row.id.clone(), row.level, bounds)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, level: usize) -> FlatRow {
        FlatRow {
            id: id.into(),
            content: id.into(),
            level,
            parent_id: None,
        }
    }

    #[test]
    fn missing_level_reads_as_zero() {
        let entry = VisibleEntry {
            id: "a".into(),
            level: None,
            bounds: Bounds::default(),
        };
        assert_eq!(entry.level(), 0);
    }

    #[test]
    fn contains_y_is_inclusive() {
        let bounds = Bounds::new(0., 10., 100., 20.);
        assert!(bounds.contains_y(10.));
        assert!(bounds.contains_y(30.));
        assert!(!bounds.contains_y(30.5));
    }

    #[test]
    fn uniform_rows_skip_dragged_but_keep_its_slot() {
        let rows = [row("a", 0), row("b", 1), row("c", 0)];
        let geometry = UniformRows {
            rows: &rows,
            origin: Point::new(5., 100.),
            row_height: 28.,
            width: 300.,
            indent_width: 20.,
            indent_offset: 0.,
            scroll_y: -10.,
            dragged_id: Some("b"),
        };

        let entries = geometry.visible_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].id, "c");
        assert_eq!(entries[1].bounds.top, 100. - 10. + 56.);
        assert_eq!(entries[0].bounds.left, 5.);
    }

    #[test]
    fn uniform_rows_indent_by_level() {
        let rows = [row("a", 0), row("b", 2)];
        let geometry = UniformRows {
            rows: &rows,
            origin: Point::default(),
            row_height: 20.,
            width: 200.,
            indent_width: 20.,
            indent_offset: 4.,
            scroll_y: 0.,
            dragged_id: None,
        };

        let entries = geometry.visible_entries();
        assert_eq!(entries[1].bounds.left, 44.);
        assert_eq!(entries[1].bounds.width, 156.);
        assert_eq!(entries[1].level(), 2);
    }
}
