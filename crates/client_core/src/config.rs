use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, warn};

pub const DEFAULT_API_BASE_URL: &str = "https://house-price-predictor-13vu.onrender.com/api";
pub const API_URL_ENV: &str = "PREDICTOR_API_URL";
pub const SETTINGS_FILE_NAME: &str = "predictor.toml";
const SETTINGS_DIR_NAME: &str = "house_price_predictor";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
        }
    }
}

impl ClientSettings {
    /// Applies a command-line override; blank values are ignored.
    pub fn with_api_url_override(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.and_then(non_blank) {
            self.api_base_url = url;
        }
        self
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SettingsFile {
    api_url: Option<String>,
}

/// Default, then `predictor.toml`, then `PREDICTOR_API_URL`. Later sources win.
pub fn load_settings() -> ClientSettings {
    let file = settings_file_candidates()
        .iter()
        .find_map(|path| read_settings_file(path));
    resolve_settings(file, std::env::var(API_URL_ENV).ok())
}

fn settings_file_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(SETTINGS_FILE_NAME)];
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME));
    }
    candidates
}

fn read_settings_file(path: &Path) -> Option<SettingsFile> {
    let raw = fs::read_to_string(path).ok()?;
    match toml::from_str::<SettingsFile>(&raw) {
        Ok(file) => {
            debug!(path = %path.display(), "loaded client settings file");
            Some(file)
        }
        Err(err) => {
            warn!(path = %path.display(), "ignoring malformed settings file: {err}");
            None
        }
    }
}

pub(crate) fn resolve_settings(
    file: Option<SettingsFile>,
    env_api_url: Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Some(url) = file.and_then(|file| file.api_url).and_then(non_blank) {
        settings.api_base_url = url;
    }
    if let Some(url) = env_api_url.and_then(non_blank) {
        settings.api_base_url = url;
    }

    settings
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
