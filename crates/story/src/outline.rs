use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::button::{Button, ButtonVariants as _};
use gpui_component::input::{Input, InputEvent, InputState};
use gpui_component::list::ListItem;
use gpui_component::{ActiveTheme as _, Sizable as _, h_flex, v_flex};
use gpui_dnd_outline::{DndOutlineRowState, DndOutlineState, FlatRow, Forest, Item, dnd_outline};

const INDENT_WIDTH: Pixels = px(20.);
const INDENT_OFFSET: Pixels = px(10.);

pub struct OutlineExample {
    input: Entity<InputState>,
    outline: Entity<DndOutlineState>,
    status: Option<SharedString>,
}

impl OutlineExample {
    pub fn view(window: &mut Window, cx: &mut App) -> Entity<Self> {
        cx.new(|cx| Self::new(window, cx))
    }

    fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let input = cx.new(|cx| {
            let mut state = InputState::new(window, cx);
            state.set_placeholder("Enter text and press Enter to add...", window, cx);
            state
        });

        let outline = cx.new(|cx| {
            DndOutlineState::new(cx)
                .indent_width(INDENT_WIDTH)
                .indent_offset(INDENT_OFFSET)
                .indicator_color(cx.theme().primary)
                .items(demo_items())
        });

        cx.subscribe_in(&input, window, |this, _, event: &InputEvent, window, cx| {
            if matches!(event, InputEvent::PressEnter { .. }) {
                this.add_from_input(window, cx);
            }
        })
        .detach();

        window.focus(&input.focus_handle(cx));

        Self {
            input,
            outline,
            status: None,
        }
    }

    fn add_from_input(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let content = self.input.read(cx).value().to_string();
        let added = self
            .outline
            .update(cx, |outline, cx| outline.add_item(&content, cx));

        match added {
            Ok(_) => {
                self.status = None;
                self.input
                    .update(cx, |input, cx| input.set_value(String::new(), window, cx));
            }
            Err(err) => {
                tracing::debug!(%err, "item not added");
                self.status = Some(err.to_string().into());
            }
        }
        cx.notify();
    }
}

impl Render for OutlineExample {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let forest = self.outline.read(cx).forest();
        let dump = forest.dump();
        let json = forest
            .to_json()
            .unwrap_or_else(|err| format!("<unserializable: {err}>"));

        v_flex()
            .size_full()
            .p(px(16.))
            .gap_y_3()
            .child(
                v_flex()
                    .gap_y_1()
                    .child(div().text_xl().font_weight(FontWeight::BOLD).child("DnD Outline"))
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child("Tip: drag a row over the upper half of another row to insert before it, or the lower half to insert after it. Drag right while over the lower half to nest under the hovered row, left to outdent. The badge on the insertion line shows the target depth."),
                    ),
            )
            .child(
                h_flex()
                    .gap_x_2()
                    .child(Input::new(&self.input).flex_1().min_w(px(0.)))
                    .child(
                        Button::new("add-item")
                            .small()
                            .primary()
                            .label("Add")
                            .on_click(cx.listener(|this, _, window, cx| {
                                this.add_from_input(window, cx);
                            })),
                    ),
            )
            .when_some(self.status.clone(), |this, status| {
                this.child(div().text_sm().text_color(theme.danger).child(status))
            })
            .child(
                h_flex()
                    .flex_1()
                    .min_h(px(0.))
                    .gap_x_3()
                    .child(
                        v_flex()
                            .w(px(420.))
                            .min_w(px(0.))
                            .h_full()
                            .gap_y_2()
                            .child(div().text_sm().font_weight(FontWeight::MEDIUM).child("Outline"))
                            .child(
                                div()
                                    .flex_1()
                                    .min_h(px(0.))
                                    .rounded(px(12.))
                                    .border_1()
                                    .border_color(theme.border)
                                    .bg(theme.background)
                                    .child(dnd_outline(
                                        &self.outline,
                                        move |ix, row, row_state, _window, cx| {
                                            render_outline_row(ix, row, row_state, cx)
                                        },
                                    )),
                            ),
                    )
                    .child(
                        v_flex()
                            .flex_1()
                            .min_w(px(0.))
                            .h_full()
                            .gap_y_2()
                            .child(
                                div()
                                    .text_sm()
                                    .font_weight(FontWeight::MEDIUM)
                                    .child("Debug (structure)"),
                            )
                            .child(render_panel(render_lines(dump), cx))
                            .child(div().text_sm().font_weight(FontWeight::MEDIUM).child("JSON"))
                            .child(render_panel(render_lines(json), cx)),
                    ),
            )
    }
}

fn render_outline_row(
    ix: usize,
    row: &FlatRow,
    row_state: DndOutlineRowState,
    cx: &mut App,
) -> ListItem {
    let theme = cx.theme();
    let indent = INDENT_WIDTH * row.level as f32;

    ListItem::new(ix)
        .pl(INDENT_OFFSET + indent)
        .when(row_state.dragging, |this| this.opacity(0.4))
        .child(
            h_flex()
                .gap_x_2()
                .items_center()
                .child(div().size(px(6.)).rounded_full().bg(theme.muted_foreground))
                .child(row.content.clone()),
        )
}

fn render_panel(content: impl IntoElement, cx: &App) -> impl IntoElement {
    let theme = cx.theme();
    div()
        .flex_1()
        .min_h(px(0.))
        .rounded(px(12.))
        .border_1()
        .border_color(theme.border)
        .bg(theme.background)
        .p(px(12.))
        .child(content)
}

fn render_lines(text: String) -> impl IntoElement {
    let lines = text
        .lines()
        .map(|line| div().text_sm().child(line.to_string()));
    v_flex().gap_y_0p5().children(lines)
}

fn demo_items() -> Forest {
    Forest::from_roots(vec![
        Item::new("groceries", "Groceries")
            .child(Item::new("milk", "Milk"))
            .child(Item::new("bread", "Bread")),
        Item::new("chores", "Chores").child(
            Item::new("garden", "Garden")
                .child(Item::new("weeds", "Pull weeds"))
                .child(Item::new("hedge", "Trim hedge")),
        ),
        Item::new("call-mom", "Call mom"),
        Item::new("taxes", "File taxes"),
    ])
}
