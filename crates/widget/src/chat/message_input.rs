use gpui::*;
use gpui_component::{
    ActiveTheme, Disableable, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
};

use crate::chat::events::{DraftChanged, Submit};

pub const INPUT_PLACEHOLDER: &str = "Type your message...";

pub struct MessageInput {
    input_state: Entity<InputState>,
    is_busy: bool,
}

impl EventEmitter<Submit> for MessageInput {}
impl EventEmitter<DraftChanged> for MessageInput {}

impl MessageInput {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let input_state = cx.new(|cx| InputState::new(window, cx).placeholder(INPUT_PLACEHOLDER));

        cx.subscribe_in(
            &input_state,
            window,
            |this, state, event: &InputEvent, window, cx| match event {
                InputEvent::PressEnter { .. } => this.handle_submit(window, cx),
                InputEvent::Change { .. } => {
                    let text = state.read(cx).value().to_string();
                    cx.emit(DraftChanged { text });
                    cx.notify();
                }
                _ => {}
            },
        )
        .detach();

        Self {
            input_state,
            is_busy: false,
        }
    }

    pub fn set_busy(&mut self, busy: bool, cx: &mut Context<Self>) {
        self.is_busy = busy;
        cx.notify();
    }

    pub fn focus(&self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            state.focus(window, cx);
        });
    }

    pub fn clear(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            state.set_value("", window, cx);
        });
        cx.emit(DraftChanged {
            text: String::new(),
        });
    }

    fn can_send(&self, cx: &App) -> bool {
        !self.is_busy && !self.input_state.read(cx).value().trim().is_empty()
    }

    fn handle_submit(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if !self.can_send(cx) {
            return;
        }

        let content = self.input_state.read(cx).value().to_string();
        cx.emit(Submit::new(content));
        self.clear(window, cx);
    }
}

impl Render for MessageInput {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let can_send = self.can_send(cx);

        h_flex()
            .w_full()
            .gap_3()
            .p_4()
            .border_t_1()
            .border_color(theme.border)
            .child(
                div()
                    .flex_1()
                    .child(Input::new(&self.input_state).w_full().disabled(self.is_busy)),
            )
            .child(
                Button::new("fineflow-send")
                    .primary()
                    .small()
                    .icon(IconName::ArrowUp)
                    .disabled(!can_send)
                    .on_click(cx.listener(|this, _, window, cx| {
                        this.handle_submit(window, cx);
                    })),
            )
    }
}
