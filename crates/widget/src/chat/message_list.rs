use std::time::Duration;

use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{ActiveTheme, Icon, IconName, Sizable, h_flex, label::Label, v_flex};

use crate::chat::message::{ChatMessage, Sender};

const BUBBLE_MAX_WIDTH: Pixels = px(256.);
const BUBBLE_PADDING_X: Pixels = px(16.);
const BUBBLE_PADDING_Y: Pixels = px(12.);
const TYPING_DOT_SIZE: Pixels = px(8.);
const TYPING_DOT_COUNT: usize = 3;
const TYPING_PULSE: Duration = Duration::from_millis(1000);

pub struct MessageList {
    messages: Vec<ChatMessage>,
    bot_name: SharedString,
    show_typing: bool,
    scroll_manager: crate::chat::ScrollManager,
}

impl MessageList {
    pub fn new(bot_name: impl Into<SharedString>, _cx: &mut Context<Self>) -> Self {
        Self {
            messages: Vec::new(),
            bot_name: bot_name.into(),
            show_typing: false,
            scroll_manager: crate::chat::ScrollManager::new(),
        }
    }

    pub fn set_messages(&mut self, messages: Vec<ChatMessage>, cx: &mut Context<Self>) {
        self.scroll_manager.track_message_count(messages.len());
        self.messages = messages;
        cx.notify();
    }

    pub fn set_typing(&mut self, show_typing: bool, cx: &mut Context<Self>) {
        if self.show_typing == show_typing {
            return;
        }

        self.show_typing = show_typing;
        if show_typing {
            self.scroll_manager.request_scroll_to_bottom();
        }
        cx.notify();
    }

    pub fn request_scroll_to_bottom(&mut self, cx: &mut Context<Self>) {
        self.scroll_manager.request_scroll_to_bottom();
        cx.notify();
    }

    fn render_message_row(&self, message: &ChatMessage, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();

        if message.sender == Sender::User {
            return h_flex()
                .id(ElementId::Name(format!("message-{}", message.id.0).into()))
                .w_full()
                .justify_end()
                .child(
                    div()
                        .max_w(BUBBLE_MAX_WIDTH)
                        .px(BUBBLE_PADDING_X)
                        .py(BUBBLE_PADDING_Y)
                        .rounded_2xl()
                        .bg(theme.primary)
                        .text_color(theme.primary_foreground)
                        .child(Label::new(message.text.clone()).text_sm()),
                )
                .into_any_element();
        }

        h_flex()
            .id(ElementId::Name(format!("message-{}", message.id.0).into()))
            .w_full()
            .justify_start()
            .child(
                v_flex()
                    .max_w(BUBBLE_MAX_WIDTH)
                    .px(BUBBLE_PADDING_X)
                    .py(BUBBLE_PADDING_Y)
                    .gap_2()
                    .rounded_2xl()
                    .border_1()
                    .border_color(theme.border)
                    .bg(theme.secondary)
                    .text_color(theme.secondary_foreground)
                    .child(self.render_bot_label(cx))
                    .child(Label::new(message.text.clone()).text_sm()),
            )
            .into_any_element()
    }

    fn render_bot_label(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        h_flex()
            .gap_2()
            .items_center()
            .child(Icon::new(IconName::Bot).small().text_color(theme.primary))
            .child(
                Label::new(self.bot_name.clone())
                    .text_xs()
                    .text_color(theme.primary),
            )
    }

    fn render_typing_indicator(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let dot_color = theme.primary;

        h_flex().w_full().justify_start().child(
            h_flex()
                .id("typing-indicator")
                .gap_2()
                .items_center()
                .px(BUBBLE_PADDING_X)
                .py(BUBBLE_PADDING_Y)
                .rounded_2xl()
                .border_1()
                .border_color(theme.border)
                .bg(theme.secondary)
                .child(Icon::new(IconName::Bot).small().text_color(theme.primary))
                .child(h_flex().gap_1().children((0..TYPING_DOT_COUNT).map(|index| {
                    div()
                        .size(TYPING_DOT_SIZE)
                        .rounded_full()
                        .bg(dot_color)
                        .with_animation(
                            ("typing-dot", index),
                            Animation::new(TYPING_PULSE)
                                .repeat()
                                .with_easing(pulsating_between(0.3, 1.0)),
                            move |dot, delta| dot.opacity(delta),
                        )
                }))),
        )
    }
}

impl Render for MessageList {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.scroll_manager.apply_pending_scroll();

        let rows = self
            .messages
            .iter()
            .map(|message| self.render_message_row(message, cx))
            .collect::<Vec<_>>();

        v_flex()
            .id("message-list")
            .size_full()
            .min_h_0()
            .p_4()
            .gap_4()
            .overflow_y_scroll()
            .track_scroll(self.scroll_manager.handle())
            .children(rows)
            .when(self.show_typing, |list| {
                list.child(self.render_typing_indicator(cx))
            })
    }
}
