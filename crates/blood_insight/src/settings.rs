//! Persisted model and API key preference

use async_trait::async_trait;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::Result;

/// File name of the settings record
pub const SETTINGS_FILE_NAME: &str = "llm_settings.json";

/// The user's model choice and credential
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub model: String,
    pub api_key: String,
}

impl Settings {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// API key with everything but the last four characters hidden
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - 4), tail)
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("model", &self.model)
            .field("api_key", &self.masked_api_key())
            .finish()
    }
}

/// Storage for the single settings record.
///
/// `load` never fails: a missing or unreadable record is simply absent.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Option<Settings>;

    /// Overwrite the stored record
    async fn save(&self, settings: &Settings) -> Result<()>;

    /// Remove the stored record
    async fn clear(&self) -> Result<()>;
}

/// Settings kept as one JSON file on disk
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the platform config directory, or the
    /// working directory when none can be determined
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "blood-insight")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self) -> Option<Settings> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file at {}", self.path.display());
                return None;
            }
            Err(e) => {
                warn!("Cannot read settings {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!("Ignoring malformed settings {}: {}", self.path.display(), e);
                None
            }
        }
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json).await?;
        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Settings held in memory for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    record: Mutex<Option<Settings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            record: Mutex::new(Some(settings)),
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Option<Settings> {
        self.record.lock().ok().and_then(|guard| guard.clone())
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        let mut guard = self.record.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(settings.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut guard = self.record.lock().unwrap_or_else(|e| e.into_inner());
        *guard = None;
        Ok(())
    }
}
