use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::structures::StructureKind;
use crate::world::PlatformCapabilities;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Top-level add-on configuration, read once at start-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Structure id -> whether markers are created for it
    pub structures: BTreeMap<String, bool>,
    /// Structure id -> label override
    pub labels: BTreeMap<String, String>,
    pub layer: LayerConfig,
    pub scan: ScanConfig,
}

/// Web-map layer settings.
///
/// Key names follow the long-standing `config.yml` layout of the add-on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Display name of the marker set; its id is the lowercased name
    pub name: String,
    #[serde(rename = "hidebydefault")]
    pub hide_by_default: bool,
    #[serde(rename = "layerprio")]
    pub layer_priority: i32,
    /// Applied only when greater than zero
    #[serde(rename = "minzoom")]
    pub min_zoom: i32,
    #[serde(rename = "noLabels")]
    pub no_labels: bool,
    #[serde(rename = "inc-coord")]
    pub include_coordinates: bool,
    /// Directory holding `<id>.png` marker icons. Stands in for icon images
    /// bundled with the add-on; kinds without a file keep the web-map's icon.
    pub icons: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Only scan chunks that were just generated, not reloaded ones
    #[serde(rename = "new-chunks-only")]
    pub new_chunks_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            structures: StructureKind::all().iter().map(|k| (k.id(), true)).collect(),
            labels: BTreeMap::new(),
            layer: LayerConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            name: "Structures".to_string(),
            hide_by_default: false,
            layer_priority: 10,
            min_zoom: 0,
            no_labels: false,
            include_coordinates: false,
            icons: PathBuf::from("icons"),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { new_chunks_only: true }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_toml()?).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path`, writing the defaults there first if it does not exist
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }
        let config = Self::default();
        config.save(path)?;
        info!("Wrote default configuration to {}", path.display());
        Ok(config)
    }
}

/// Per-kind flags and labels resolved against what the platform supports.
///
/// Immutable once built; shared with every sync task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    enabled: BTreeMap<StructureKind, bool>,
    labels: BTreeMap<StructureKind, String>,
    pub layer: LayerConfig,
    pub scan: ScanConfig,
}

impl Settings {
    pub fn resolve(config: &Config, caps: &PlatformCapabilities) -> Self {
        let flags = by_kind(&config.structures, "structures");
        let overrides = by_kind(&config.labels, "labels");

        let mut enabled = BTreeMap::new();
        let mut labels = BTreeMap::new();
        for kind in caps.structure_kinds() {
            enabled.insert(kind, flags.get(&kind).copied().unwrap_or(true));
            let label = overrides
                .get(&kind)
                .cloned()
                .unwrap_or_else(|| kind.default_label().to_string());
            labels.insert(kind, label);
        }

        Self {
            enabled,
            labels,
            layer: config.layer.clone(),
            scan: config.scan.clone(),
        }
    }

    /// Whether markers are created for `kind`; unsupported kinds are never enabled
    pub fn is_enabled(&self, kind: StructureKind) -> bool {
        self.enabled.get(&kind).copied().unwrap_or(false)
    }

    pub fn label(&self, kind: StructureKind) -> &str {
        self.labels.get(&kind).map(String::as_str).unwrap_or(kind.default_label())
    }

    /// Supported kinds the operator turned off
    pub fn disabled_kinds(&self) -> Vec<StructureKind> {
        self.enabled
            .iter()
            .filter(|(_, on)| !**on)
            .map(|(kind, _)| *kind)
            .collect()
    }

    pub fn enabled_kinds(&self) -> Vec<StructureKind> {
        self.enabled
            .iter()
            .filter(|(_, on)| **on)
            .map(|(kind, _)| *kind)
            .collect()
    }

    /// Label for a marker of `kind` at `x`, `z`
    pub fn marker_label(&self, kind: StructureKind, x: i32, z: i32) -> String {
        if self.layer.no_labels {
            return String::new();
        }
        let label = self.label(kind);
        if self.layer.include_coordinates {
            format!("{} [{},{}]", label, x, z)
        } else {
            label.to_string()
        }
    }
}

/// Re-key a config table by structure kind, dropping unknown ids
fn by_kind<V: Clone>(table: &BTreeMap<String, V>, section: &str) -> BTreeMap<StructureKind, V> {
    let mut out = BTreeMap::new();
    for (id, value) in table {
        match StructureKind::parse(id) {
            Some(kind) => {
                out.insert(kind, value.clone());
            }
            None => warn!("Unknown structure \"{}\" in [{}], ignoring", id, section),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::GameVersion;
    use tempfile::tempdir;

    #[test]
    fn test_default_enables_everything() {
        let settings = Settings::resolve(&Config::default(), &PlatformCapabilities::default());
        assert!(settings.disabled_kinds().is_empty());
        assert_eq!(settings.enabled_kinds().len(), StructureKind::all().len());
    }

    #[test]
    fn test_legacy_key_names() {
        let config = Config::from_toml(
            r#"
            [structures]
            village = false
            junglepyramid = true

            [labels]
            village = "Town"

            [layer]
            name = "Points of Interest"
            hidebydefault = true
            layerprio = 3
            minzoom = 2
            noLabels = true
            inc-coord = true
            "#,
        )
        .unwrap();

        assert_eq!(config.structures.get("village"), Some(&false));
        assert_eq!(config.labels.get("village").map(String::as_str), Some("Town"));
        assert_eq!(config.layer.name, "Points of Interest");
        assert!(config.layer.hide_by_default);
        assert_eq!(config.layer.layer_priority, 3);
        assert_eq!(config.layer.min_zoom, 2);
        assert!(config.layer.no_labels);
        assert!(config.layer.include_coordinates);
        assert!(config.scan.new_chunks_only);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config = Config::from_toml("[structures]\nigloo = false\n").unwrap();
        let settings = Settings::resolve(&config, &PlatformCapabilities::default());

        assert!(!settings.is_enabled(StructureKind::Igloo));
        assert!(settings.is_enabled(StructureKind::Village));
        assert_eq!(settings.disabled_kinds(), vec![StructureKind::Igloo]);
        assert_eq!(settings.layer, LayerConfig::default());
    }

    #[test]
    fn test_unsupported_kinds_are_never_enabled() {
        let caps = PlatformCapabilities::for_version(GameVersion::new(1, 13, 2));
        let settings = Settings::resolve(&Config::default(), &caps);
        assert!(!settings.is_enabled(StructureKind::RuinedPortal));
        assert!(!settings.disabled_kinds().contains(&StructureKind::RuinedPortal));
    }

    #[test]
    fn test_underscored_keys_accepted() {
        let config = Config::from_toml("[structures]\nswamp_hut = false\n[labels]\nswamp_hut = \"Witch Hut\"\n").unwrap();
        let settings = Settings::resolve(&config, &PlatformCapabilities::default());
        assert!(!settings.is_enabled(StructureKind::SwampHut));
        assert_eq!(settings.label(StructureKind::SwampHut), "Witch Hut");
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let config = Config::from_toml("[structures]\ncastle = false\n[labels]\ncastle = \"Castle\"\n").unwrap();
        let settings = Settings::resolve(&config, &PlatformCapabilities::default());
        assert!(settings.disabled_kinds().is_empty());
    }

    #[test]
    fn test_labels() {
        let mut config = Config::default();
        config.labels.insert("village".to_string(), "Town".to_string());
        let settings = Settings::resolve(&config, &PlatformCapabilities::default());
        assert_eq!(settings.label(StructureKind::Village), "Town");
        assert_eq!(settings.label(StructureKind::OceanRuin), "Ocean Ruins");
    }

    #[test]
    fn test_marker_label_variants() {
        let caps = PlatformCapabilities::default();
        let mut config = Config::default();

        let plain = Settings::resolve(&config, &caps);
        assert_eq!(plain.marker_label(StructureKind::Village, 12, -40), "Village");

        config.layer.include_coordinates = true;
        let with_coords = Settings::resolve(&config, &caps);
        assert_eq!(with_coords.marker_label(StructureKind::Village, 12, -40), "Village [12,-40]");

        config.layer.no_labels = true;
        let hidden = Settings::resolve(&config, &caps);
        assert_eq!(hidden.marker_label(StructureKind::Village, 12, -40), "");
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let created = Config::load_or_create(&path).unwrap();
        assert_eq!(created, Config::default());
        assert!(path.exists());

        let reloaded = Config::from_file(&path).unwrap();
        assert_eq!(reloaded, created);
    }

    #[test]
    fn test_missing_file_error() {
        let dir = tempdir().unwrap();
        let err = Config::from_file(dir.path().join("does-not-exist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml("[layer]\nlayerprio = \"high\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
