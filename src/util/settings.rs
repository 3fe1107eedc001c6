use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;
use tracing::{info, warn};

use crate::domain::PricingTable;
use crate::infra::geocode::DEFAULT_GEOCODE_BASE_URL;
use crate::infra::routing::DEFAULT_ROUTING_BASE_URL;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "HaulQuote";
const APP_DIR_NAME: &str = "HaulQuote";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub geocode_base_url: String,
    pub routing_base_url: String,
    /// Quote endpoint. Without one, quotes are recorded locally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_url: Option<String>,
    /// Overrides where the distance cache and saved quotes live.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub auto_distance: bool,
    pub pricing: PricingTable,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            geocode_base_url: DEFAULT_GEOCODE_BASE_URL.to_string(),
            routing_base_url: DEFAULT_ROUTING_BASE_URL.to_string(),
            submission_url: None,
            data_dir: None,
            auto_distance: true,
            pricing: PricingTable::default(),
        }
    }
}

impl Settings {
    /// Replaces a pricing table that does not cover every distance with the
    /// built-in one.
    fn sanitized(mut self) -> Self {
        if let Err(err) = self.pricing.validate() {
            warn!(error = %err, "configured pricing table rejected, using defaults");
            self.pricing = PricingTable::default();
        }
        self
    }
}

pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_DIR_NAME)
        .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
}

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings() -> Settings {
    match settings_path() {
        Some(path) => load_settings_from(&path),
        None => {
            warn!("no configuration directory available, using default settings");
            Settings::default()
        }
    }
}

pub fn load_settings_from(path: &Path) -> Settings {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Settings::default(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read settings");
            return Settings::default();
        }
    };

    match serde_json::from_str::<Settings>(&data) {
        Ok(settings) => settings.sanitized(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unparseable settings");
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<PathBuf, SettingsSaveError> {
    let path = settings_path().ok_or(SettingsSaveError::StorageUnavailable)?;
    save_settings_to(settings, &path)?;
    Ok(path)
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<(), SettingsSaveError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    info!(path = %path.display(), "settings written");
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsSaveError {
    #[error("configuration directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}
