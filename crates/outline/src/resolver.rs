use crate::geometry::{Point, VisibleEntry};
use crate::item::ItemId;
use crate::store::Forest;

/// Horizontal distance, in pixels, that stands for one indent level.
pub const NESTING_THRESHOLD: f32 = 40.;

/// Highest indent class a drop indicator is drawn with.
pub const MAX_INDENT_CLASS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverConfig {
    nesting_threshold: f32,
    max_indent_class: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            nesting_threshold: NESTING_THRESHOLD,
            max_indent_class: MAX_INDENT_CLASS,
        }
    }
}

impl ResolverConfig {
    /// Set the horizontal pixel distance that requests one more level of
    /// nesting. Values below one pixel are raised to one.
    pub fn nesting_threshold(mut self, nesting_threshold: f32) -> Self {
        self.nesting_threshold = nesting_threshold.max(1.);
        self
    }

    /// Set the deepest indent class used when drawing the indicator.
    ///
    /// This is purely visual and never limits how deep the tree can nest.
    pub fn max_indent_class(mut self, max_indent_class: usize) -> Self {
        self.max_indent_class = max_indent_class;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.nesting_threshold
    }

    pub fn indent_class_limit(&self) -> usize {
        self.max_indent_class
    }
}

/// Outcome of evaluating one pointer position during a drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DropPosition {
    /// Gap index into the visible entries: `i` is before entry `i`.
    pub insertion_index: usize,
    /// The new parent when nested, otherwise the hovered entry's rendered
    /// parent.
    pub target_item_id: Option<ItemId>,
    pub is_nested: bool,
    pub is_invalid: bool,
    pub resolved_level: usize,
    /// Screen y for the insertion indicator.
    pub indicator_y: f32,
}

impl DropPosition {
    fn empty() -> Self {
        Self {
            insertion_index: 0,
            target_item_id: None,
            is_nested: false,
            is_invalid: false,
            resolved_level: 0,
            indicator_y: 0.,
        }
    }

    pub fn indent_class(&self, config: &ResolverConfig) -> usize {
        self.resolved_level.min(config.indent_class_limit())
    }
}

/// What a presentation layer needs to draw the insertion line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropIndicator {
    pub y: f32,
    pub level: usize,
    pub indent_class: usize,
}

/// The indicator for `position`, or `None` when it should be hidden.
pub fn drop_indicator(
    position: &DropPosition,
    entries: &[VisibleEntry],
    config: &ResolverConfig,
) -> Option<DropIndicator> {
    if entries.is_empty() || position.is_invalid {
        return None;
    }
    Some(DropIndicator {
        y: position.indicator_y,
        level: position.resolved_level,
        indent_class: position.indent_class(config),
    })
}

/// Map a pointer position over the rendered rows to a drop decision.
///
/// `entries` are the rendered rows in depth-first order with the dragged row
/// left out. This never mutates anything and is cheap enough to call on every
/// pointer move.
pub fn resolve_drop(
    pointer: Point,
    entries: &[VisibleEntry],
    dragged_id: &str,
    forest: &Forest,
    config: &ResolverConfig,
) -> DropPosition {
    let position = resolve_inner(pointer, entries, dragged_id, forest, config);
    tracing::trace!(?pointer, ?position, "resolved drop position");
    position
}

fn resolve_inner(
    pointer: Point,
    entries: &[VisibleEntry],
    dragged_id: &str,
    forest: &Forest,
    config: &ResolverConfig,
) -> DropPosition {
    let Some(hovered_ix) = entries
        .iter()
        .position(|entry| entry.bounds.contains_y(pointer.y))
    else {
        return match entries.last() {
            Some(last) => DropPosition {
                insertion_index: entries.len(),
                resolved_level: last.level(),
                indicator_y: last.bounds.bottom(),
                ..DropPosition::empty()
            },
            None => DropPosition::empty(),
        };
    };

    let entry = &entries[hovered_ix];
    let bounds = entry.bounds;
    let current_level = entry.level();

    if forest.is_descendant(dragged_id, &entry.id) {
        return DropPosition {
            insertion_index: hovered_ix,
            is_invalid: true,
            resolved_level: current_level,
            indicator_y: bounds.top,
            ..DropPosition::empty()
        };
    }

    let relative_x = pointer.x - bounds.left;
    let relative_y = pointer.y - bounds.top;
    let is_upper_half = relative_y < bounds.height / 2.;
    let level_diff = (relative_x / config.threshold()).floor() as i64;

    // The first row has no predecessor; it is always a root, so level 0.
    let previous_level = hovered_ix
        .checked_sub(1)
        .map(|ix| entries[ix].level())
        .unwrap_or(0);

    let target_level = if level_diff > 0 {
        (previous_level + 1).min(level_diff as usize)
    } else {
        current_level
    };

    let rendered_parent_id = rendered_parent(entries, hovered_ix).map(|parent| parent.id.clone());

    if is_upper_half {
        return DropPosition {
            insertion_index: hovered_ix,
            target_item_id: rendered_parent_id,
            resolved_level: previous_level.min(target_level),
            indicator_y: bounds.top,
            ..DropPosition::empty()
        };
    }

    let is_nested = level_diff > 0 && target_level > current_level;
    if is_nested {
        DropPosition {
            insertion_index: hovered_ix + 1,
            target_item_id: Some(entry.id.clone()),
            is_nested: true,
            resolved_level: current_level + 1,
            indicator_y: bounds.bottom(),
            ..DropPosition::empty()
        }
    } else {
        DropPosition {
            insertion_index: hovered_ix + 1,
            target_item_id: rendered_parent_id,
            resolved_level: target_level,
            indicator_y: bounds.bottom(),
            ..DropPosition::empty()
        }
    }
}

/// Nearest earlier entry with a smaller level.
fn rendered_parent(entries: &[VisibleEntry], ix: usize) -> Option<&VisibleEntry> {
    let level = entries.get(ix)?.level();
    entries[..ix]
        .iter()
        .rev()
        .find(|candidate| candidate.level() < level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;
    use crate::item::Item;

    const ROW_HEIGHT: f32 = 30.;

    fn entries(rows: &[(&str, usize)]) -> Vec<VisibleEntry> {
        rows.iter()
            .enumerate()
            .map(|(ix, (id, level))| {
                VisibleEntry::new(
                    *id,
                    *level,
                    Bounds::new(
                        20. * *level as f32,
                        ROW_HEIGHT * ix as f32,
                        300.,
                        ROW_HEIGHT,
                    ),
                )
            })
            .collect()
    }

    /// Pointer at `relative_x` from the row's left edge, in the upper or lower
    /// half of row `ix`.
    fn over(entries: &[VisibleEntry], ix: usize, relative_x: f32, upper: bool) -> Point {
        let bounds = entries[ix].bounds;
        let y = if upper {
            bounds.top + 5.
        } else {
            bounds.bottom() - 5.
        };
        Point::new(bounds.left + relative_x, y)
    }

    fn flat_forest(ids: &[&str]) -> Forest {
        Forest::from_roots(ids.iter().map(|id| Item::new(*id, *id)).collect::<Vec<_>>())
    }

    fn resolve(
        pointer: Point,
        entries: &[VisibleEntry],
        dragged: &str,
        forest: &Forest,
    ) -> DropPosition {
        resolve_drop(pointer, entries, dragged, forest, &ResolverConfig::default())
    }

    #[test]
    fn lower_half_far_right_nests_one_level() {
        let forest = flat_forest(&["P", "A", "D"]);
        let rows = entries(&[("P", 0), ("A", 0)]);

        let position = resolve(over(&rows, 1, 81., false), &rows, "D", &forest);

        assert!(position.is_nested);
        assert!(!position.is_invalid);
        assert_eq!(position.resolved_level, 1);
        assert_eq!(position.target_item_id.as_deref(), Some("A"));
        assert_eq!(position.insertion_index, 2);
    }

    #[test]
    fn lower_half_near_left_stays_sibling() {
        let forest = flat_forest(&["P", "A", "D"]);
        let rows = entries(&[("P", 0), ("A", 0)]);

        let position = resolve(over(&rows, 1, 10., false), &rows, "D", &forest);

        assert!(!position.is_nested);
        assert_eq!(position.resolved_level, 0);
        assert_eq!(position.target_item_id, None);
        assert_eq!(position.insertion_index, 2);
        assert_eq!(position.indicator_y, rows[1].bounds.bottom());
    }

    #[test]
    fn first_row_can_receive_a_child() {
        let forest = flat_forest(&["A", "B"]);
        let rows = entries(&[("A", 0)]);

        let position = resolve(over(&rows, 0, 45., false), &rows, "B", &forest);

        assert!(position.is_nested);
        assert_eq!(position.resolved_level, 1);
        assert_eq!(position.target_item_id.as_deref(), Some("A"));
    }

    #[test]
    fn upper_half_inserts_before_at_clamped_level() {
        let forest = Forest::from_roots(vec![
            Item::new("A", "A").child(Item::new("X", "X")),
            Item::new("D", "D"),
        ]);
        let rows = entries(&[("A", 0), ("X", 1)]);

        let position = resolve(over(&rows, 1, 50., true), &rows, "D", &forest);

        assert!(!position.is_nested);
        assert_eq!(position.insertion_index, 1);
        assert_eq!(position.resolved_level, 0);
        assert_eq!(position.target_item_id.as_deref(), Some("A"));
        assert_eq!(position.indicator_y, rows[1].bounds.top);
    }

    #[test]
    fn nesting_is_capped_at_one_below_previous_row() {
        let forest = Forest::from_roots(vec![
            Item::new("A", "A").children([Item::new("B", "B"), Item::new("C", "C")]),
            Item::new("D", "D"),
        ]);
        let rows = entries(&[("A", 0), ("B", 1), ("C", 1)]);

        let position = resolve(over(&rows, 2, 200., false), &rows, "D", &forest);

        assert!(position.is_nested);
        assert_eq!(position.resolved_level, 2);
        assert_eq!(position.target_item_id.as_deref(), Some("C"));
    }

    #[test]
    fn first_child_cannot_nest_past_its_shallower_predecessor() {
        let forest = Forest::from_roots(vec![
            Item::new("A", "A").child(Item::new("B", "B")),
            Item::new("D", "D"),
        ]);
        let rows = entries(&[("A", 0), ("B", 1)]);

        let position = resolve(over(&rows, 1, 200., false), &rows, "D", &forest);

        assert!(!position.is_nested);
        assert_eq!(position.resolved_level, 1);
        assert_eq!(position.target_item_id.as_deref(), Some("A"));
    }

    #[test]
    fn lower_half_can_outdent_below_hovered_level() {
        let forest = Forest::from_roots(vec![
            Item::new("A", "A").child(Item::new("B", "B").child(Item::new("C", "C"))),
            Item::new("D", "D"),
        ]);
        let rows = entries(&[("A", 0), ("B", 1), ("C", 2)]);

        // A level_diff of 1 caps the level at 1, shallower than C, so this is
        // an "after C" at B's depth.
        let position = resolve(over(&rows, 2, 45., false), &rows, "D", &forest);

        assert!(!position.is_nested);
        assert_eq!(position.resolved_level, 1);
        assert_eq!(position.target_item_id.as_deref(), Some("B"));
        assert_eq!(position.insertion_index, 3);
    }

    #[test]
    fn hovering_own_descendant_is_invalid() {
        let forest = Forest::from_roots(vec![
            Item::new("A", "A").child(Item::new("B", "B")),
            Item::new("C", "C"),
        ]);
        // A is being dragged, so only its child and C are visible.
        let rows = entries(&[("B", 1), ("C", 0)]);

        let position = resolve(over(&rows, 0, 100., false), &rows, "A", &forest);

        assert!(position.is_invalid);
        assert_eq!(position.target_item_id, None);
        assert!(drop_indicator(&position, &rows, &ResolverConfig::default()).is_none());
    }

    #[test]
    fn below_last_row_appends_at_its_level() {
        let forest = Forest::from_roots(vec![
            Item::new("A", "A").child(Item::new("B", "B")),
            Item::new("D", "D"),
        ]);
        let rows = entries(&[("A", 0), ("B", 1)]);

        let position = resolve(Point::new(10., 500.), &rows, "D", &forest);

        assert_eq!(position.insertion_index, 2);
        assert_eq!(position.resolved_level, 1);
        assert_eq!(position.target_item_id, None);
        assert_eq!(position.indicator_y, rows[1].bounds.bottom());
    }

    #[test]
    fn empty_list_resolves_to_origin_and_hides_indicator() {
        let forest = flat_forest(&["A"]);

        let position = resolve(Point::new(10., 10.), &[], "A", &forest);

        assert_eq!(position, DropPosition::empty());
        assert!(drop_indicator(&position, &[], &ResolverConfig::default()).is_none());
    }

    #[test]
    fn indent_class_clamps_for_display_only() {
        let position = DropPosition {
            resolved_level: 7,
            ..DropPosition::empty()
        };
        let config = ResolverConfig::default();

        assert_eq!(position.indent_class(&config), 4);
        assert_eq!(position.resolved_level, 7);
        assert_eq!(position.indent_class(&config.max_indent_class(8)), 7);
    }

    #[test]
    fn config_setters_round_trip_through_getters() {
        let config = ResolverConfig::default();
        assert_eq!(config.threshold(), NESTING_THRESHOLD);
        assert_eq!(config.indent_class_limit(), MAX_INDENT_CLASS);

        let config = config.nesting_threshold(0.25).max_indent_class(2);
        assert_eq!(config.threshold(), 1.);
        assert_eq!(config.indent_class_limit(), 2);
    }

    #[test]
    fn custom_threshold_changes_level_diff() {
        let forest = flat_forest(&["A", "B"]);
        let rows = entries(&[("A", 0)]);
        let config = ResolverConfig::default().nesting_threshold(10.);

        let position = resolve_drop(over(&rows, 0, 15., false), &rows, "B", &forest, &config);

        assert!(position.is_nested);
    }

    #[test]
    fn missing_level_is_treated_as_root() {
        let forest = flat_forest(&["A", "B"]);
        let mut rows = entries(&[("A", 0)]);
        rows[0].level = None;

        let position = resolve(over(&rows, 0, 10., false), &rows, "B", &forest);

        assert_eq!(position.resolved_level, 0);
        assert!(!position.is_nested);
    }
}
