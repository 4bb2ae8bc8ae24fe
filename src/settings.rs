//! Viewer settings with persistence
//!
//! Settings are saved to `~/.config/meshboard/settings.toml`

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use meshboard_assets::DuplicatePolicy;
use meshboard_integration::{default_models, BootstrapModel};
use meshboard_scene::{CameraFramer, LabelLimit, Palette, SceneComposer, LEGEND_LABEL, LIST_LABEL};
use meshboard_session::{SceneSession, DEFAULT_EXPORT_PREFIX};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All viewer settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub bootstrap: BootstrapSettings,
    pub scene: SceneSettings,
    pub camera: CameraFramer,
    pub storage: StorageSettings,
}

impl AppSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("meshboard"))
    }

    /// Get the default settings file path
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from `path` (or the default location), falling back to
    /// defaults when the file is missing or unreadable
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to `path`, creating parent directories as needed
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Build an empty session configured from these settings
    pub fn build_session(&self) -> anyhow::Result<SceneSession> {
        let palette = Palette::from_hex_strings(self.scene.palette.as_slice())
            .context("Invalid palette in settings")?;
        let list_limit = validated(self.scene.list_label).context("Invalid list label limit")?;
        let legend_limit =
            validated(self.scene.legend_label).context("Invalid legend label limit")?;

        Ok(SceneSession::new()
            .with_policy(self.storage.duplicate_policy)
            .with_composer(SceneComposer::new(palette).with_legend_limit(legend_limit))
            .with_framer(self.camera)
            .with_list_limit(list_limit))
    }
}

fn validated(limit: LabelLimit) -> Result<LabelLimit, meshboard_scene::SceneError> {
    LabelLimit::new(limit.max_chars, limit.keep_chars)
}

/// Models fetched into an empty session on startup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapSettings {
    pub enabled: bool,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    pub models: Vec<BootstrapModel>,
}

impl Default for BootstrapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 10,
            models: default_models(),
        }
    }
}

impl BootstrapSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Colors and label lengths
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// `#RRGGBB` colors assigned to assets in order
    pub palette: Vec<String>,
    pub list_label: LabelLimit,
    pub legend_label: LabelLimit,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            palette: Palette::default()
                .colors()
                .iter()
                .map(|c| c.to_hex_string())
                .collect(),
            list_label: LIST_LABEL,
            legend_label: LEGEND_LABEL,
        }
    }
}

/// Where and how sessions are exported
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub export_prefix: String,
    /// Defaults to `<data dir>/meshboard/sessions`
    pub export_dir: Option<PathBuf>,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            export_prefix: DEFAULT_EXPORT_PREFIX.to_string(),
            export_dir: None,
            duplicate_policy: DuplicatePolicy::NameAndSize,
        }
    }
}

impl StorageSettings {
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("meshboard")
                .join("sessions")
        })
    }
}
