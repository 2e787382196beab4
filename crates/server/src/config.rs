use std::{collections::HashMap, fs, path::PathBuf};

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_bind: String,
    /// Directory holding `index.html` and the `static/` assets.
    pub site_root: PathBuf,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub telegram_api_base: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "0.0.0.0:5001".into(),
            site_root: PathBuf::from("."),
            telegram_bot_token: None,
            telegram_chat_id: None,
            telegram_api_base: DEFAULT_TELEGRAM_API_BASE.into(),
        }
    }
}

impl Settings {
    /// Bot token and chat id, when both are set to something non-blank.
    pub fn telegram_credentials(&self) -> Option<(&str, &str)> {
        let token = self.telegram_bot_token.as_deref().map(str::trim)?;
        let chat_id = self.telegram_chat_id.as_deref().map(str::trim)?;
        if token.is_empty() || chat_id.is_empty() {
            return None;
        }
        Some((token, chat_id))
    }
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string("server.toml").ok();
    settings_from_sources(file.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then `server.toml`, then environment. Later sources win, and for
/// each setting the `APP__` variable wins over the plain one.
pub fn settings_from_sources(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
            if let Some(v) = file_cfg.get("bind_addr") {
                settings.server_bind = v.clone();
            }
            if let Some(v) = file_cfg.get("site_root") {
                settings.site_root = PathBuf::from(v);
            }
            if let Some(v) = file_cfg.get("telegram_bot_token") {
                settings.telegram_bot_token = Some(v.clone());
            }
            if let Some(v) = file_cfg.get("telegram_chat_id") {
                settings.telegram_chat_id = Some(v.clone());
            }
            if let Some(v) = file_cfg.get("telegram_api_base") {
                settings.telegram_api_base = v.clone();
            }
        }
    }

    if let Some(v) = last_set(&env, &["SERVER_BIND", "APP__BIND_ADDR"]) {
        settings.server_bind = v;
    }
    if let Some(v) = last_set(&env, &["SITE_ROOT", "APP__SITE_ROOT"]) {
        settings.site_root = PathBuf::from(v);
    }
    if let Some(v) = last_set(&env, &["TELEGRAM_BOT_TOKEN", "APP__TELEGRAM_BOT_TOKEN"]) {
        settings.telegram_bot_token = Some(v);
    }
    if let Some(v) = last_set(&env, &["TELEGRAM_CHAT_ID", "APP__TELEGRAM_CHAT_ID"]) {
        settings.telegram_chat_id = Some(v);
    }
    if let Some(v) = last_set(&env, &["TELEGRAM_API_BASE", "APP__TELEGRAM_API_BASE"]) {
        settings.telegram_api_base = v;
    }

    settings
}

fn last_set(env: &impl Fn(&str) -> Option<String>, keys: &[&str]) -> Option<String> {
    keys.iter().rev().find_map(|key| env(key))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
