use std::sync::Arc;
use std::time::Duration;

use fineflow_webhook::{BackendConfig, ChatBackend, create_backend};
use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    label::Label,
    v_flex,
};
use gpui_tokio_bridge::Tokio;

use crate::chat::dispatch::{dispatch, request_for};
use crate::chat::events::{DraftChanged, Submit};
use crate::chat::session::{ChatSession, SendOutcome};
use crate::chat::{MessageInput, MessageList};
use crate::settings::WidgetSettings;

pub const PANEL_WIDTH: Pixels = px(384.);
pub const PANEL_HEIGHT: Pixels = px(600.);
pub const TOGGLE_SIZE: Pixels = px(64.);
pub const WIDGET_INSET: Pixels = px(24.);
const PANEL_ANIMATION_DURATION: Duration = Duration::from_millis(200);

/// Floating chat widget: a round toggle button that expands into the
/// conversation panel.
pub struct ChatWidget {
    session: ChatSession,
    settings: Arc<WidgetSettings>,
    backend: Option<Arc<dyn ChatBackend>>,
    message_list: Entity<MessageList>,
    message_input: Entity<MessageInput>,
    exchange_task: Option<Task<()>>,
    /// Incremented on each open so the panel entrance animation restarts.
    animation_trigger: usize,
}

impl ChatWidget {
    pub fn new(settings: Arc<WidgetSettings>, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let session = ChatSession::new(Some(settings.greeting.as_str()), settings.session_texts());
        let message_list = cx.new(|cx| MessageList::new(settings.bot_name.clone(), cx));
        let message_input = cx.new(|cx| MessageInput::new(window, cx));

        let backend = match create_backend(BackendConfig::new(settings.webhook_url.clone())) {
            Ok(backend) => Some(backend),
            Err(error) => {
                // Sends still resolve, with the fallback reply.
                tracing::error!(error = %error, "failed to initialize webhook backend");
                None
            }
        };

        cx.subscribe(&message_input, |this, _, event: &Submit, cx| {
            this.handle_submit(event.clone(), cx);
        })
        .detach();

        cx.subscribe(&message_input, |this, _, event: &DraftChanged, cx| {
            this.session.set_draft(event.text.clone());
            cx.notify();
        })
        .detach();

        let mut this = Self {
            session,
            settings,
            backend,
            message_list,
            message_input,
            exchange_task: None,
            animation_trigger: 0,
        };
        this.sync_view(cx);
        this
    }

    pub fn open(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.session.is_open() {
            return;
        }

        self.session.open();
        self.on_opened(window, cx);
    }

    pub fn close(&mut self, cx: &mut Context<Self>) {
        self.session.close();
        cx.notify();
    }

    pub fn toggle_open(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.session.toggle_open() {
            self.on_opened(window, cx);
        } else {
            cx.notify();
        }
    }

    fn on_opened(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.animation_trigger += 1;
        self.message_input.update(cx, |input, cx| input.focus(window, cx));
        self.message_list
            .update(cx, |list, cx| list.request_scroll_to_bottom(cx));
        cx.notify();
    }

    pub fn toggle_minimize(&mut self, cx: &mut Context<Self>) {
        self.session.toggle_minimize();
        self.sync_view(cx);
        cx.notify();
    }

    fn handle_submit(&mut self, event: Submit, cx: &mut Context<Self>) {
        self.session.set_draft(event.content);

        let Some(pending) = self.session.begin_submit() else {
            // Blank draft or a request already in flight.
            return;
        };
        self.sync_view(cx);

        let Some(backend) = self.backend.clone() else {
            self.session
                .complete_failure(pending, "webhook backend is not configured");
            self.sync_view(cx);
            return;
        };

        let request = request_for(&pending);
        let exchange = Tokio::spawn(cx, async move { dispatch(backend.as_ref(), request).await });

        // `pending` moves into the task; if the task is dropped before it
        // resolves, the sending flag is released with it.
        self.exchange_task = Some(cx.spawn(async move |this, cx| {
            let outcome = match exchange.await {
                Ok(outcome) => outcome,
                Err(error) => SendOutcome::Failed(format!("webhook task failed: {error}")),
            };

            let _ = this.update(cx, |this, cx| {
                this.session.resolve(pending, outcome);
                this.exchange_task = None;
                this.sync_view(cx);
            });
        }));
    }

    fn sync_view(&mut self, cx: &mut Context<Self>) {
        let messages = self.session.messages().to_vec();
        let typing = self.session.shows_typing_indicator();
        let busy = self.session.is_busy();

        self.message_list.update(cx, |list, cx| {
            list.set_messages(messages, cx);
            list.set_typing(typing, cx);
        });
        self.message_input
            .update(cx, |input, cx| input.set_busy(busy, cx));
        cx.notify();
    }

    fn render_toggle(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        div()
            .id("fineflow-toggle")
            .size(TOGGLE_SIZE)
            .flex()
            .items_center()
            .justify_center()
            .rounded_full()
            .overflow_hidden()
            .cursor_pointer()
            .bg(theme.primary)
            .shadow_lg()
            .hover(|el| el.opacity(0.9))
            .child(
                img(self.settings.toggle_icon_url.clone())
                    .size(px(40.))
                    .rounded_full(),
            )
            .on_click(cx.listener(|this, _, window, cx| {
                this.open(window, cx);
            }))
    }

    fn render_header(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        h_flex()
            .w_full()
            .p_4()
            .justify_between()
            .items_center()
            .bg(theme.primary)
            .text_color(theme.primary_foreground)
            .child(
                h_flex()
                    .gap_3()
                    .items_center()
                    .child(img(self.settings.logo_url.clone()).size(px(32.)))
                    .child(
                        v_flex()
                            .child(Label::new(self.settings.bot_name.clone()).font_semibold())
                            .child(Label::new(self.settings.subtitle.clone()).text_xs()),
                    ),
            )
            .child(
                h_flex()
                    .gap_2()
                    .child(
                        Button::new("fineflow-minimize")
                            .ghost()
                            .small()
                            .icon(IconName::Minimize)
                            .on_click(cx.listener(|this, _, _window, cx| {
                                this.toggle_minimize(cx);
                            })),
                    )
                    .child(
                        Button::new("fineflow-close")
                            .ghost()
                            .small()
                            .icon(IconName::Close)
                            .on_click(cx.listener(|this, _, _window, cx| {
                                this.close(cx);
                            })),
                    ),
            )
    }

    fn render_panel(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let shows_conversation = self.session.shows_conversation();

        v_flex()
            .id("fineflow-panel")
            .w(PANEL_WIDTH)
            .h(PANEL_HEIGHT)
            .rounded_2xl()
            .overflow_hidden()
            .border_1()
            .border_color(theme.border)
            .bg(theme.background)
            .shadow_2xl()
            .child(self.render_header(cx))
            .when(shows_conversation, |panel| {
                panel
                    .child(
                        div()
                            .id("fineflow-messages")
                            .flex_1()
                            .min_h_0()
                            .child(self.message_list.clone()),
                    )
                    .child(
                        div()
                            .id("fineflow-input")
                            .flex_shrink_0()
                            .w_full()
                            .child(self.message_input.clone()),
                    )
            })
            .with_animation(
                ("fineflow-panel-open", self.animation_trigger),
                Animation::new(PANEL_ANIMATION_DURATION).with_easing(ease_in_out),
                |panel, delta| panel.opacity(delta),
            )
    }
}

impl Render for ChatWidget {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        div()
            .absolute()
            .bottom(WIDGET_INSET)
            .right(WIDGET_INSET)
            .map(|container| {
                if self.session.is_open() {
                    container.child(self.render_panel(cx))
                } else {
                    container.child(self.render_toggle(cx))
                }
            })
    }
}
