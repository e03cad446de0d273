use std::sync::Arc;

use gpui::*;
use gpui_component::{ActiveTheme, Root, h_flex, label::Label, v_flex};

use crate::chat::ChatWidget;
use crate::settings::WidgetSettings;

pub const PAGE_TITLE: &str = "FineFlow AI Experience";
pub const PAGE_TAGLINE: &str =
    "Experience the future of AI conversation with our premium chatbot widget";

gpui::actions!(fineflow, [ToggleWidget, Quit]);

/// Root view: a landing header with the chat widget floating over it.
pub struct FineFlowShell {
    settings: Arc<WidgetSettings>,
    widget: Entity<ChatWidget>,
}

impl FineFlowShell {
    pub fn new(settings: Arc<WidgetSettings>, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let widget = cx.new(|cx| ChatWidget::new(settings.clone(), window, cx));
        Self { settings, widget }
    }

    pub fn toggle_widget(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.widget
            .update(cx, |widget, cx| widget.toggle_open(window, cx));
    }
}

/// Registers window-level actions on the app.
///
/// App listeners run whether or not anything in the window holds focus, which
/// is the case at startup and after the panel closes.
pub fn bind_window_actions(window: WindowHandle<Root>, shell: Entity<FineFlowShell>, cx: &mut App) {
    cx.on_action(move |_: &ToggleWidget, cx| {
        let shell = shell.clone();
        let toggled = window.update(cx, |_, window, cx| {
            shell.update(cx, |shell, cx| shell.toggle_widget(window, cx));
        });
        if let Err(error) = toggled {
            tracing::warn!(error = %error, "failed to toggle chat widget");
        }
    });
}

impl Render for FineFlowShell {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        div()
            .id("fineflow-shell")
            .size_full()
            .relative()
            .bg(theme.background)
            .child(
                v_flex()
                    .w_full()
                    .p_8()
                    .gap_4()
                    .items_center()
                    .child(
                        h_flex()
                            .gap_4()
                            .items_center()
                            .child(img(self.settings.logo_url.clone()).size(px(48.)))
                            .child(
                                Label::new(PAGE_TITLE)
                                    .text_3xl()
                                    .font_bold()
                                    .text_color(theme.primary),
                            ),
                    )
                    .child(
                        Label::new(PAGE_TAGLINE)
                            .text_xl()
                            .text_color(theme.muted_foreground),
                    ),
            )
            // Widget positions itself against the shell's bottom-right corner.
            .child(self.widget.clone())
    }
}
