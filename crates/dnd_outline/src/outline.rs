use std::{ops::Range, rc::Rc};

use gpui::{
    App, AppContext as _, Bounds, Context, ElementId, Entity, EntityId, FocusHandle, Hsla,
    InteractiveElement as _, IntoElement, ListSizingBehavior, ParentElement as _, Pixels, Point,
    Render, RenderOnce, SharedString, StatefulInteractiveElement as _, StyleRefinement, Styled,
    UniformListScrollHandle, Window, div, prelude::FluentBuilder as _, px, uniform_list,
};
use gpui_component::ActiveTheme as _;
use gpui_component::StyledExt as _;
use gpui_component::list::ListItem;
use gpui_component::scroll::{Scrollbar, ScrollbarState};
use outline_core::{
    DropPosition, EntryGeometry as _, FlatRow, Forest, Item, Outline, OutlineError, UniformRows,
    VisibleEntry, drop_indicator,
};

use crate::common::DragGhost;

const CONTEXT: &str = "DndOutline";
const DEFAULT_ROW_HEIGHT: f32 = 28.;

/// Create a [`DndOutline`].
pub fn dnd_outline<R>(state: &Entity<DndOutlineState>, render_item: R) -> DndOutline
where
    R: Fn(usize, &FlatRow, DndOutlineRowState, &mut Window, &mut App) -> ListItem + 'static,
{
    DndOutline::new(state, render_item)
}

#[derive(Clone)]
struct DndOutlineDrag {
    outline_id: EntityId,
    item_id: SharedString,
    label: SharedString,
    descendants: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DndOutlineDropTarget {
    Before,
    After,
    Inside,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DndOutlineRowState {
    pub dragging: bool,
    pub drop_target: Option<DndOutlineDropTarget>,
}

#[derive(Clone, Debug, PartialEq)]
struct DropPreview {
    highlight_ix: Option<usize>,
    highlight_target: Option<DndOutlineDropTarget>,
    line_y: Option<Pixels>,
    line_x: Option<Pixels>,
    indent_class: usize,
}

/// State for a drag-and-drop outline.
///
/// Owns the [`Outline`] and the rendered rows. All drop decisions are made by
/// `outline-core`; this type only measures rows and draws feedback.
pub struct DndOutlineState {
    focus_handle: FocusHandle,
    outline: Outline,
    rows: Vec<FlatRow>,
    indent_width: Pixels,
    indent_offset: Pixels,
    indicator_color: Option<Hsla>,
    indicator_thickness: Pixels,
    scrollbar_state: ScrollbarState,
    scroll_handle: UniformListScrollHandle,
    list_bounds: Option<Bounds<Pixels>>,
    drop_preview: Option<DropPreview>,
    render_item:
        Rc<dyn Fn(usize, &FlatRow, DndOutlineRowState, &mut Window, &mut App) -> ListItem>,
}

impl DndOutlineState {
    pub fn new(cx: &mut App) -> Self {
        Self {
            focus_handle: cx.focus_handle(),
            outline: Outline::new(),
            rows: Vec::new(),
            indent_width: px(20.),
            indent_offset: px(0.),
            indicator_color: None,
            indicator_thickness: px(2.),
            scrollbar_state: ScrollbarState::default(),
            scroll_handle: UniformListScrollHandle::default(),
            list_bounds: None,
            drop_preview: None,
            render_item: Rc::new(|_, _, _, _, _| ListItem::new("dnd-outline-empty")),
        }
    }

    /// Set the per-level indentation your row renderer uses.
    ///
    /// Rows are measured from their indented left edge, so this must match the
    /// renderer or horizontal nesting will feel off.
    pub fn indent_width(mut self, indent_width: Pixels) -> Self {
        self.indent_width = indent_width;
        self
    }

    /// Set the left padding applied to every row before indentation.
    pub fn indent_offset(mut self, indent_offset: Pixels) -> Self {
        self.indent_offset = indent_offset;
        self
    }

    /// Set the horizontal drag distance that requests one more nesting level.
    pub fn nesting_threshold(mut self, threshold: Pixels) -> Self {
        let config = self.outline.resolver_config().nesting_threshold(threshold.into());
        self.outline.set_config(config);
        self
    }

    pub fn indicator_color(mut self, color: Hsla) -> Self {
        self.indicator_color = Some(color);
        self
    }

    pub fn indicator_thickness(mut self, thickness: Pixels) -> Self {
        self.indicator_thickness = thickness;
        self
    }

    pub fn items(mut self, forest: Forest) -> Self {
        self.outline = std::mem::take(&mut self.outline).forest(forest);
        self.rebuild_rows();
        self
    }

    pub fn set_items(&mut self, forest: Forest, cx: &mut Context<Self>) {
        self.outline = std::mem::take(&mut self.outline).forest(forest);
        self.outline.end_drag();
        self.drop_preview = None;
        self.rebuild_rows();
        cx.notify();
    }

    pub fn forest(&self) -> &Forest {
        self.outline.items()
    }

    pub fn rows(&self) -> &[FlatRow] {
        &self.rows
    }

    /// Append a root item from user input.
    pub fn add_item(
        &mut self,
        content: &str,
        cx: &mut Context<Self>,
    ) -> Result<Item, OutlineError> {
        let item = self.outline.add_root_item(content)?;
        self.rebuild_rows();
        cx.notify();
        Ok(item)
    }

    fn rebuild_rows(&mut self) {
        self.rows = self.outline.rows();
    }

    fn clear_drag(&mut self) {
        self.outline.end_drag();
        self.drop_preview = None;
    }

    fn visible_entries(&self, list_bounds: Bounds<Pixels>) -> Vec<VisibleEntry> {
        let scroll_y = self.scroll_handle.0.borrow().base_handle.offset().y;
        let item_height = self
            .scroll_handle
            .0
            .borrow()
            .last_item_size
            .map(|s| s.item.height)
            .unwrap_or(px(DEFAULT_ROW_HEIGHT));

        UniformRows {
            rows: &self.rows,
            origin: to_point(list_bounds.origin),
            row_height: item_height.into(),
            width: list_bounds.size.width.into(),
            indent_width: self.indent_width.into(),
            indent_offset: self.indent_offset.into(),
            scroll_y: scroll_y.into(),
            dragged_id: self.outline.dragged_id(),
        }
        .visible_entries()
    }

    fn on_drag_start(&mut self, drag: &DndOutlineDrag, cx: &mut Context<Self>) {
        self.drop_preview = None;
        if let Err(err) = self.outline.begin_drag(&drag.item_id) {
            tracing::debug!(%err, "drag refused");
        }
        cx.notify();
    }

    fn on_drag_move(
        &mut self,
        event: &gpui::DragMoveEvent<DndOutlineDrag>,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if !cx.has_active_drag() {
            return;
        }

        let mouse_position = event.event.position;
        let list_bounds = event.bounds;
        if !list_bounds.contains(&mouse_position) {
            if self.drop_preview.take().is_some() {
                cx.notify();
            }
            return;
        }

        let drag = event.drag(cx);
        if drag.outline_id != cx.entity_id() {
            if self.drop_preview.take().is_some() {
                cx.notify();
            }
            return;
        }

        self.list_bounds = Some(list_bounds);
        let entries = self.visible_entries(list_bounds);
        let pointer = to_point(mouse_position);
        let Some(position) = self
            .outline
            .drag_over(pointer, &entries)
            .cloned()
        else {
            return;
        };

        let new_preview = self.preview_for(&position, &entries, pointer, list_bounds);
        if self.drop_preview != new_preview {
            self.drop_preview = new_preview;
            cx.notify();
        }
    }

    fn preview_for(
        &self,
        position: &DropPosition,
        entries: &[VisibleEntry],
        pointer: outline_core::Point,
        list_bounds: Bounds<Pixels>,
    ) -> Option<DropPreview> {
        let indicator = drop_indicator(position, entries, self.outline.resolver_config())?;
        let highlight = highlight_for(position, entries, pointer.y);
        let highlight_ix =
            highlight.and_then(|(id, _)| self.rows.iter().position(|row| row.id == id));

        Some(DropPreview {
            highlight_ix,
            highlight_target: highlight.map(|(_, target)| target),
            line_y: Some(px(indicator.y) - list_bounds.origin.y),
            line_x: Some(self.indent_offset + self.indent_width * indicator.indent_class as f32),
            indent_class: indicator.indent_class,
        })
    }

    fn on_drop(&mut self, drag: &DndOutlineDrag, window: &mut Window, cx: &mut Context<Self>) {
        if drag.outline_id != cx.entity_id() {
            self.clear_drag();
            cx.notify();
            return;
        }

        let Some(list_bounds) = self.list_bounds else {
            self.clear_drag();
            cx.notify();
            return;
        };

        let entries = self.visible_entries(list_bounds);
        match self
            .outline
            .drop_at(to_point(window.mouse_position()), &entries)
        {
            Ok(placement) => {
                tracing::debug!(item_id = %drag.item_id, ?placement, "drop applied");
                self.rebuild_rows();
            }
            Err(err) => tracing::debug!(item_id = %drag.item_id, %err, "drop ignored"),
        }

        self.drop_preview = None;
        cx.notify();
    }
}

impl Render for DndOutlineState {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        if !cx.has_active_drag() {
            self.clear_drag();
        }

        let render_item = Rc::clone(&self.render_item);
        let state_entity = cx.entity();
        let dragged_id = self
            .outline
            .dragged_id()
            .map(|id| SharedString::from(id.to_string()));
        let drop_preview = self.drop_preview.clone();
        let thickness = self.indicator_thickness;

        let line = drop_preview
            .as_ref()
            .and_then(|p| p.line_y.zip(p.line_x).map(|line| (line, p.indent_class)))
            .map(|((y, x), indent_class)| {
                let theme = cx.theme();
                let color = self.indicator_color.unwrap_or(theme.drag_border);
                div()
                    .absolute()
                    .left(x)
                    .right_0()
                    .top(y)
                    .h(thickness)
                    .bg(color)
                    .child(
                        div()
                            .absolute()
                            .left(px(-6.))
                            .top(px(-7.) + thickness / 2.)
                            .px(px(3.))
                            .rounded(px(4.))
                            .bg(color)
                            .text_xs()
                            .text_color(theme.background)
                            .child(format!("{}", indent_class + 1)),
                    )
            });

        div()
            .id("dnd-outline-state")
            .size_full()
            .relative()
            .child(
                uniform_list("rows", self.rows.len(), {
                    cx.processor(move |state, visible_range: Range<usize>, window, cx| {
                        let drop_target_bg = cx.theme().drop_target;
                        let mut items = Vec::with_capacity(visible_range.len());
                        for ix in visible_range {
                            let row = &state.rows[ix];
                            let dragging = dragged_id
                                .as_ref()
                                .is_some_and(|id| id.as_ref() == row.id)
                                && cx.has_active_drag();

                            let drop_target = drop_preview.as_ref().and_then(|preview| {
                                if preview.highlight_ix != Some(ix) {
                                    return None;
                                }
                                preview.highlight_target
                            });

                            let row_state = DndOutlineRowState {
                                dragging,
                                drop_target,
                            };

                            let item = (render_item)(ix, row, row_state, window, cx);
                            let drag_value = DndOutlineDrag {
                                outline_id: cx.entity_id(),
                                item_id: row.id.clone().into(),
                                label: row.content.clone().into(),
                                descendants: state
                                    .outline
                                    .items()
                                    .find(&row.id)
                                    .map_or(0, |item| item.subtree_len() - 1),
                            };

                            let state_entity = state_entity.clone();
                            let row = div()
                                .id(ix)
                                .when(
                                    drop_target == Some(DndOutlineDropTarget::Inside),
                                    |this| this.bg(drop_target_bg),
                                )
                                .child(item)
                                .on_drag(drag_value, move |drag, _cursor_offset, _window, cx| {
                                    state_entity.update(cx, |state, cx| {
                                        state.on_drag_start(drag, cx);
                                    });
                                    let label = drag.label.clone();
                                    let descendants = drag.descendants;
                                    cx.new(|_| DragGhost::new(label, descendants))
                                });

                            items.push(row);
                        }
                        items
                    })
                })
                .on_drag_move::<DndOutlineDrag>(cx.listener(Self::on_drag_move))
                .on_drop::<DndOutlineDrag>(cx.listener(Self::on_drop))
                .flex_grow()
                .size_full()
                .track_scroll(self.scroll_handle.clone())
                .with_sizing_behavior(ListSizingBehavior::Auto)
                .into_any_element(),
            )
            .child(
                div()
                    .absolute()
                    .top_0()
                    .right_0()
                    .bottom_0()
                    .w(px(12.))
                    .child(Scrollbar::uniform_scroll(
                        &self.scrollbar_state,
                        &self.scroll_handle,
                    )),
            )
            .when_some(line, |this, line| this.child(line))
    }
}

/// A drag-and-drop outline element.
#[derive(IntoElement)]
pub struct DndOutline {
    id: ElementId,
    state: Entity<DndOutlineState>,
    style: StyleRefinement,
    render_item:
        Rc<dyn Fn(usize, &FlatRow, DndOutlineRowState, &mut Window, &mut App) -> ListItem>,
}

impl DndOutline {
    pub fn new<R>(state: &Entity<DndOutlineState>, render_item: R) -> Self
    where
        R: Fn(usize, &FlatRow, DndOutlineRowState, &mut Window, &mut App) -> ListItem + 'static,
    {
        Self {
            id: ElementId::Name(format!("dnd-outline-{}", state.entity_id()).into()),
            state: state.clone(),
            style: StyleRefinement::default(),
            render_item: Rc::new(move |ix, row, row_state, window, cx| {
                render_item(ix, row, row_state, window, cx)
            }),
        }
    }
}

impl Styled for DndOutline {
    fn style(&mut self) -> &mut StyleRefinement {
        &mut self.style
    }
}

impl RenderOnce for DndOutline {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let focus_handle = self.state.read(cx).focus_handle.clone();
        self.state
            .update(cx, |state, _| state.render_item = self.render_item);

        div()
            .id(self.id)
            .key_context(CONTEXT)
            .track_focus(&focus_handle)
            .size_full()
            .child(self.state)
            .refine_style(&self.style)
    }
}

fn to_point(point: Point<Pixels>) -> outline_core::Point {
    outline_core::Point::new(point.x.into(), point.y.into())
}

/// Which row to highlight for a resolved position, and how.
///
/// The hovered row is found the same way the resolver finds it. A gap at the
/// hovered row's index means "before" it; anything else lands after it.
fn highlight_for<'a>(
    position: &'a DropPosition,
    entries: &'a [VisibleEntry],
    pointer_y: f32,
) -> Option<(&'a str, DndOutlineDropTarget)> {
    if position.is_invalid {
        return None;
    }
    if position.is_nested {
        return position
            .target_item_id
            .as_deref()
            .map(|id| (id, DndOutlineDropTarget::Inside));
    }

    match entries
        .iter()
        .position(|entry| entry.bounds.contains_y(pointer_y))
    {
        Some(hovered) if position.insertion_index == hovered => {
            Some((entries[hovered].id.as_str(), DndOutlineDropTarget::Before))
        }
        Some(hovered) => Some((entries[hovered].id.as_str(), DndOutlineDropTarget::After)),
        None => entries
            .last()
            .map(|last| (last.id.as_str(), DndOutlineDropTarget::After)),
    }
}

#[cfg(test)]
mod tests {
    use outline_core::{Bounds, Forest, Item, ResolverConfig, resolve_drop};

    use super::*;

    fn rows() -> Vec<VisibleEntry> {
        vec![
            VisibleEntry::new("A", 0, Bounds::new(0., 0., 300., 28.)),
            VisibleEntry::new("B", 0, Bounds::new(0., 28., 300., 28.)),
        ]
    }

    fn resolve(pointer: outline_core::Point) -> DropPosition {
        let forest = Forest::from_roots(vec![
            Item::new("A", "A"),
            Item::new("B", "B"),
            Item::new("C", "C"),
        ]);
        resolve_drop(pointer, &rows(), "C", &forest, &ResolverConfig::default())
    }

    #[test]
    fn lower_half_highlights_after_hovered_row() {
        let entries = rows();
        // Bottom of A is exactly the top of B; still "after A".
        let pointer = outline_core::Point::new(5., 28.);
        let position = resolve(pointer);

        assert_eq!(
            highlight_for(&position, &entries, pointer.y),
            Some(("A", DndOutlineDropTarget::After))
        );
    }

    #[test]
    fn upper_half_highlights_before_hovered_row() {
        let entries = rows();
        let pointer = outline_core::Point::new(5., 30.);
        let position = resolve(pointer);

        assert_eq!(
            highlight_for(&position, &entries, pointer.y),
            Some(("B", DndOutlineDropTarget::Before))
        );
    }

    #[test]
    fn nested_highlights_target_and_past_end_highlights_last() {
        let entries = rows();

        let nested = outline_core::Point::new(50., 20.);
        assert_eq!(
            highlight_for(&resolve(nested), &entries, nested.y),
            Some(("A", DndOutlineDropTarget::Inside))
        );

        let below = outline_core::Point::new(5., 200.);
        assert_eq!(
            highlight_for(&resolve(below), &entries, below.y),
            Some(("B", DndOutlineDropTarget::After))
        );
    }
}
