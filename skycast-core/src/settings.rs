use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::{advisory::ActivityKind, config::project_dirs, error::SettingsError, units::UnitSystem};

/// Refresh period in hours; only 1, 2 and 3 are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct UpdatePeriod(u8);

impl UpdatePeriod {
    pub fn hours(&self) -> u8 {
        self.0
    }
}

impl Default for UpdatePeriod {
    fn default() -> Self {
        UpdatePeriod(1)
    }
}

impl TryFrom<u8> for UpdatePeriod {
    type Error = SettingsError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1..=3 => Ok(UpdatePeriod(value)),
            other => Err(SettingsError::InvalidUpdatePeriod(other)),
        }
    }
}

impl From<UpdatePeriod> for u8 {
    fn from(period: UpdatePeriod) -> Self {
        period.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetVisibility {
    pub wind: bool,
    pub humidity: bool,
    pub feels_like: bool,
    pub visibility: bool,
    pub pressure: bool,
    pub uv_index: bool,
    pub precipitation: bool,
    pub aqi: bool,
}

impl Default for WidgetVisibility {
    fn default() -> Self {
        Self {
            wind: true,
            humidity: true,
            feels_like: true,
            visibility: true,
            pressure: true,
            uv_index: true,
            precipitation: true,
            aqi: true,
        }
    }
}

impl WidgetVisibility {
    fn slot(&mut self, key: &str) -> Option<&mut bool> {
        let slot = match key {
            "wind" => &mut self.wind,
            "humidity" => &mut self.humidity,
            "feelsLike" | "feels_like" => &mut self.feels_like,
            "visibility" => &mut self.visibility,
            "pressure" => &mut self.pressure,
            "uvIndex" | "uv_index" => &mut self.uv_index,
            "precipitation" => &mut self.precipitation,
            "aqi" => &mut self.aqi,
            _ => return None,
        };
        Some(slot)
    }

    pub fn set(&mut self, key: &str, visible: bool) -> Result<(), SettingsError> {
        let slot = self.slot(key).ok_or_else(|| SettingsError::UnknownWidget(key.to_string()))?;
        *slot = visible;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityVisibility {
    pub running: bool,
    pub jogging: bool,
    pub cycling: bool,
    pub hiking: bool,
}

impl Default for ActivityVisibility {
    fn default() -> Self {
        Self { running: true, jogging: true, cycling: true, hiking: true }
    }
}

impl ActivityVisibility {
    pub fn is_visible(&self, kind: ActivityKind) -> bool {
        match kind {
            ActivityKind::Running => self.running,
            ActivityKind::Jogging => self.jogging,
            ActivityKind::Cycling => self.cycling,
            ActivityKind::Hiking => self.hiking,
        }
    }

    pub fn set(&mut self, kind: ActivityKind, visible: bool) {
        match kind {
            ActivityKind::Running => self.running = visible,
            ActivityKind::Jogging => self.jogging = visible,
            ActivityKind::Cycling => self.cycling = visible,
            ActivityKind::Hiking => self.hiking = visible,
        }
    }
}

/// Parse an activity name as used on the command line and in the wire map.
pub fn parse_activity(name: &str) -> Result<ActivityKind, SettingsError> {
    ActivityKind::all()
        .iter()
        .copied()
        .find(|kind| kind.as_str().eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| SettingsError::UnknownActivity(name.to_string()))
}

/// Per-session preferences.
///
/// Value fields come before the nested tables so the TOML form stays valid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDocument {
    pub units: UnitSystem,
    pub update_period: UpdatePeriod,
    pub saved_locations: Vec<String>,
    pub widgets: WidgetVisibility,
    pub activities: ActivityVisibility,
}

impl SettingsDocument {
    /// A freshly owned document with every default applied.
    pub fn default_document() -> Self {
        Self::default()
    }

    /// Overwrite only the fields present in `patch`.
    pub fn merge(&mut self, patch: SettingsPatch) {
        if let Some(units) = patch.units {
            self.units = units;
        }
        if let Some(period) = patch.update_period {
            self.update_period = period;
        }
        if let Some(widgets) = patch.widgets {
            self.widgets = widgets;
        }
        if let Some(activities) = patch.activities {
            self.activities = activities;
        }
        if let Some(locations) = patch.saved_locations {
            self.saved_locations = locations;
        }
    }

    /// Returns `false` if the location was already saved or is blank.
    pub fn add_location(&mut self, city: &str) -> bool {
        let city = city.trim();
        if city.is_empty() || self.is_location_saved(city) {
            return false;
        }
        self.saved_locations.push(city.to_string());
        true
    }

    pub fn remove_location(&mut self, city: &str) -> bool {
        let before = self.saved_locations.len();
        self.saved_locations.retain(|saved| saved != city.trim());
        self.saved_locations.len() != before
    }

    pub fn is_location_saved(&self, city: &str) -> bool {
        self.saved_locations.iter().any(|saved| saved == city.trim())
    }
}

/// Partial update; absent fields leave the stored document untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<UnitSystem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_period: Option<UpdatePeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_locations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widgets: Option<WidgetVisibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activities: Option<ActivityVisibility>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self == &SettingsPatch::default()
    }
}

/// Session-keyed settings documents, persisted as TOML.
///
/// Example TOML:
/// [sessions.local]
/// units = "metric"
/// updatePeriod = 1
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsBook {
    #[serde(default)]
    pub sessions: HashMap<String, SettingsDocument>,
}

impl SettingsBook {
    pub fn get(&self, session: &str) -> Option<&SettingsDocument> {
        self.sessions.get(session)
    }

    /// The session's document, or defaults on a miss. Never inserts.
    pub fn get_or_default(&self, session: &str) -> SettingsDocument {
        self.get(session).cloned().unwrap_or_else(SettingsDocument::default_document)
    }

    /// Fetch the session's document, creating it from defaults on a miss.
    pub fn fetch_or_create(&mut self, session: &str) -> &SettingsDocument {
        self.sessions.entry(session.to_string()).or_insert_with(|| {
            tracing::debug!(session, "Creating default settings document");
            SettingsDocument::default_document()
        })
    }

    /// Merge `patch` into the session's document, creating it first if needed.
    pub fn upsert(&mut self, session: &str, patch: SettingsPatch) -> &SettingsDocument {
        let doc = self
            .sessions
            .entry(session.to_string())
            .or_insert_with(SettingsDocument::default_document);
        doc.merge(patch);
        doc
    }

    /// Load from the default location, or return an empty book on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self).context("Failed to serialize settings to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))
    }

    pub fn file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("settings.toml"))
    }
}
