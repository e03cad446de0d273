use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use fineflow_webhook::DEFAULT_WEBHOOK_URL;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

use crate::chat::session::{DEFAULT_EMPTY_REPLY_TEXT, DEFAULT_FALLBACK_TEXT, SessionTexts};

pub const DEFAULT_BOT_NAME: &str = "FineFlow AI";
pub const DEFAULT_SUBTITLE: &str = "Always here to help";
pub const DEFAULT_GREETING: &str =
    "Hello! I'm FineFlow AI, your intelligent assistant. How can I help you today?";
pub const DEFAULT_LOGO_URL: &str = "https://sabapathy7620.neocities.org/images/logo.png";
pub const DEFAULT_TOGGLE_ICON_URL: &str =
    "https://sabapathy7620.neocities.org/images/section2-icon2.png";
pub const SETTINGS_DIRECTORY_NAME: &str = "fineflow";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
/// Environment variables with this prefix override file values,
/// e.g. `FINEFLOW_WEBHOOK_URL`.
pub const SETTINGS_ENV_PREFIX: &str = "FINEFLOW_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSettings {
    #[serde(default = "default_webhook_url")]
    pub webhook_url: String,
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
    /// First bot message of every session. Blank disables it.
    #[serde(default = "default_greeting")]
    pub greeting: String,
    #[serde(default = "default_empty_reply_text")]
    pub empty_reply_text: String,
    #[serde(default = "default_fallback_text")]
    pub fallback_text: String,
    #[serde(default = "default_logo_url")]
    pub logo_url: String,
    #[serde(default = "default_toggle_icon_url")]
    pub toggle_icon_url: String,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            webhook_url: default_webhook_url(),
            bot_name: default_bot_name(),
            subtitle: default_subtitle(),
            greeting: default_greeting(),
            empty_reply_text: default_empty_reply_text(),
            fallback_text: default_fallback_text(),
            logo_url: default_logo_url(),
            toggle_icon_url: default_toggle_icon_url(),
        }
    }
}

impl WidgetSettings {
    pub fn session_texts(&self) -> SessionTexts {
        SessionTexts {
            empty_reply: self.empty_reply_text.clone(),
            fallback: self.fallback_text.clone(),
        }
    }

    pub fn normalized(self) -> Self {
        Self {
            webhook_url: or_default(self.webhook_url, default_webhook_url),
            bot_name: or_default(self.bot_name, default_bot_name),
            subtitle: or_default(self.subtitle, default_subtitle),
            greeting: self.greeting.trim().to_string(),
            empty_reply_text: or_default(self.empty_reply_text, default_empty_reply_text),
            fallback_text: or_default(self.fallback_text, default_fallback_text),
            logo_url: or_default(self.logo_url, default_logo_url),
            toggle_icon_url: or_default(self.toggle_icon_url, default_toggle_icon_url),
        }
    }
}

pub struct SettingsStore {
    settings: Arc<ArcSwap<WidgetSettings>>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".fineflow"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let settings = Self::load_from_disk(&config_path);
        Self {
            settings: Arc::new(ArcSwap::from_pointee(settings)),
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> Arc<WidgetSettings> {
        self.settings.load_full()
    }

    pub fn update(&self, settings: WidgetSettings) -> Result<(), SettingsError> {
        let normalized_settings = settings.normalized();
        self.persist(&normalized_settings)?;
        self.settings.store(Arc::new(normalized_settings));
        Ok(())
    }

    fn load_from_disk(path: &Path) -> WidgetSettings {
        let mut figment = Figment::from(Serialized::defaults(WidgetSettings::default()));
        if path.exists() {
            figment = figment.merge(Json::file(path));
        } else {
            tracing::info!("settings file not found at {:?}, using defaults", path);
        }
        figment = figment.merge(Env::prefixed(SETTINGS_ENV_PREFIX));

        match figment.extract::<WidgetSettings>() {
            Ok(settings) => settings.normalized(),
            Err(error) => {
                tracing::warn!(
                    "failed to parse settings from {:?}: {}. using defaults",
                    path,
                    error
                );
                WidgetSettings::default()
            }
        }
    }

    fn persist(&self, settings: &WidgetSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).context(CreateDirSnafu {
                stage: "create-settings-directory",
                path: parent.to_path_buf(),
            })?;
        }

        let content = serde_json::to_string_pretty(settings).context(SerializeConfigSnafu {
            stage: "serialize-settings-json",
        })?;

        let temp_path = self.config_path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).context(WriteFileSnafu {
            stage: "write-temporary-settings-file",
            path: temp_path.clone(),
        })?;

        std::fs::rename(&temp_path, &self.config_path).context(RenameTempFileSnafu {
            stage: "rename-temporary-settings-file",
            from: temp_path,
            to: self.config_path.clone(),
        })?;

        tracing::info!("saved settings to {:?}", self.config_path);
        Ok(())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to create settings directory at {path:?} on `{stage}`: {source}"))]
    CreateDir {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to serialize settings on `{stage}`: {source}"))]
    SerializeConfig {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to write settings file at {path:?} on `{stage}`: {source}"))]
    WriteFile {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display(
        "failed to replace settings file from {from:?} to {to:?} on `{stage}`: {source}"
    ))]
    RenameTempFile {
        stage: &'static str,
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

fn or_default(value: String, default: fn() -> String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default()
    } else {
        trimmed.to_string()
    }
}

fn default_webhook_url() -> String {
    DEFAULT_WEBHOOK_URL.to_string()
}

fn default_bot_name() -> String {
    DEFAULT_BOT_NAME.to_string()
}

fn default_subtitle() -> String {
    DEFAULT_SUBTITLE.to_string()
}

fn default_greeting() -> String {
    DEFAULT_GREETING.to_string()
}

fn default_empty_reply_text() -> String {
    DEFAULT_EMPTY_REPLY_TEXT.to_string()
}

fn default_fallback_text() -> String {
    DEFAULT_FALLBACK_TEXT.to_string()
}

fn default_logo_url() -> String {
    DEFAULT_LOGO_URL.to_string()
}

fn default_toggle_icon_url() -> String {
    DEFAULT_TOGGLE_ICON_URL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join(SETTINGS_FILE_NAME));

        let settings = store.settings();
        assert_eq!(settings.bot_name, DEFAULT_BOT_NAME);
        assert_eq!(settings.greeting, DEFAULT_GREETING);
        assert_eq!(settings.fallback_text, DEFAULT_FALLBACK_TEXT);
        assert!(!store.config_path().exists());
    }

    #[test]
    fn partial_file_is_merged_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(
            &path,
            r#"{ "bot_name": "Helper", "empty_reply_text": "   " }"#,
        )
        .unwrap();

        let settings = SettingsStore::new(path).settings();

        assert_eq!(settings.bot_name, "Helper");
        assert_eq!(settings.empty_reply_text, DEFAULT_EMPTY_REPLY_TEXT);
        assert_eq!(settings.subtitle, DEFAULT_SUBTITLE);
    }

    #[test]
    fn unparsable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();

        let settings = SettingsStore::new(path).settings();

        assert_eq!(*settings, WidgetSettings::default());
    }

    #[test]
    fn update_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE_NAME);
        let store = SettingsStore::new(path.clone());

        let settings = WidgetSettings {
            webhook_url: " http://localhost:5678/webhook/chat ".to_string(),
            greeting: "   ".to_string(),
            ..WidgetSettings::default()
        };
        store.update(settings).unwrap();

        assert_eq!(store.settings().webhook_url, "http://localhost:5678/webhook/chat");
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let reloaded = SettingsStore::new(path).settings();
        assert_eq!(reloaded.webhook_url, "http://localhost:5678/webhook/chat");
        assert_eq!(reloaded.greeting, "");
    }

    #[test]
    fn session_texts_follow_settings() {
        let settings = WidgetSettings {
            empty_reply_text: "empty".to_string(),
            fallback_text: "offline".to_string(),
            ..WidgetSettings::default()
        };

        let texts = settings.session_texts();
        assert_eq!(texts.empty_reply, "empty");
        assert_eq!(texts.fallback, "offline");
    }
}
