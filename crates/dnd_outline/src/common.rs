use gpui::{
    Context, IntoElement, ParentElement as _, Render, SharedString, Styled as _, Window, div,
    prelude::FluentBuilder as _, px,
};
use gpui_component::ActiveTheme as _;

/// Floating preview that follows the pointer while an item is dragged.
pub(crate) struct DragGhost {
    label: SharedString,
    descendants: usize,
}

impl DragGhost {
    pub(crate) fn new(label: SharedString, descendants: usize) -> Self {
        Self { label, descendants }
    }
}

impl Render for DragGhost {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        div()
            .flex()
            .gap_x_2()
            .px(px(10.))
            .py(px(6.))
            .rounded(px(8.))
            .bg(theme.popover)
            .border_1()
            .border_color(theme.border)
            .shadow_md()
            .text_color(theme.popover_foreground)
            .text_sm()
            .child(self.label.clone())
            .when(self.descendants > 0, |this| {
                this.child(
                    div()
                        .text_xs()
                        .text_color(theme.muted_foreground)
                        .child(format!("+{}", self.descendants)),
                )
            })
    }
}
