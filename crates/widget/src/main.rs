use gpui::*;
use gpui_component::{Root, Theme, ThemeMode};

use fineflow::app::{FineFlowShell, Quit, ToggleWidget, bind_window_actions};
use fineflow::settings::SettingsStore;

/// Application entry point.
///
/// Bootstraps the GPUI application with:
/// 1. Asset loading via gpui-component-assets
/// 2. gpui-component initialization (required for Root and themes)
/// 3. Settings from the config directory, with environment overrides
/// 4. Global action handlers
/// 5. Window creation with Root wrapper for gpui-component composition
fn main() {
    tracing_subscriber::fmt::init();

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(|cx| {
        gpui_tokio_bridge::init(cx);

        // Initialize gpui-component - REQUIRED before any Root usage
        gpui_component::init(cx);
        Theme::change(ThemeMode::Dark, None, cx);

        let settings_store = SettingsStore::load();
        let settings = settings_store.settings();
        tracing::info!(
            config_path = ?settings_store.config_path(),
            webhook_url = %settings.webhook_url,
            "loaded widget settings"
        );

        cx.on_action(|_: &Quit, cx| {
            cx.quit();
        });

        cx.bind_keys([
            KeyBinding::new("cmd-q", Quit, None),
            KeyBinding::new("ctrl-q", Quit, None),
            KeyBinding::new("cmd-k", ToggleWidget, None),
            KeyBinding::new("ctrl-k", ToggleWidget, None),
        ]);

        cx.spawn(async move |cx| {
            cx.update(|cx| {
                let options = WindowOptions {
                    window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                        None,
                        size(px(1200.), px(800.)),
                        cx,
                    ))),
                    titlebar: Some(TitlebarOptions {
                        title: Some("FineFlow AI".into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                };

                let mut shell = None;

                // Root is REQUIRED by gpui-component for input and popover layers
                let window = cx
                    .open_window(options, |window, cx| {
                        let view = cx.new(|cx| FineFlowShell::new(settings, window, cx));
                        shell = Some(view.clone());
                        cx.new(|cx| Root::new(view, window, cx))
                    })
                    .expect("failed to open main window");

                if let Some(shell) = shell {
                    bind_window_actions(window, shell, cx);
                }

                cx.activate(true);
            })
        })
        .detach();
    });
}
