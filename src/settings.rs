use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::app::ForceParameters;

pub const DEFAULT_BLOCK_HEIGHT: f32 = 320.0;
const MIN_BLOCK_HEIGHT: f32 = 160.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub show_force_controls: bool,
    pub block_height: f32,
    pub forces: ForceParameters,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_force_controls: true,
            block_height: DEFAULT_BLOCK_HEIGHT,
            forces: ForceParameters::default(),
        }
    }
}

impl Settings {
    pub fn from_json(raw: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(raw).context("invalid settings JSON")?;
        Ok(settings.sanitized())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("in settings file {}", path.display()))
    }

    /// Missing or broken settings never stop the viewer from starting.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match Self::load(path) {
            Ok(settings) => {
                log::info!("loaded settings from {}", path.display());
                settings
            }
            Err(error) => {
                log::warn!("{error:#}; falling back to default settings");
                Self::default()
            }
        }
    }

    pub fn with_block_height(mut self, block_height: f32) -> Self {
        self.block_height = block_height;
        self.sanitized()
    }

    fn sanitized(mut self) -> Self {
        if !self.block_height.is_finite() {
            self.block_height = DEFAULT_BLOCK_HEIGHT;
        }
        self.block_height = self.block_height.max(MIN_BLOCK_HEIGHT);
        self.forces = self.forces.clamped();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        assert_eq!(Settings::from_json("{}").unwrap(), Settings::default());
    }

    #[test]
    fn reads_camel_case_keys() {
        let settings = Settings::from_json(
            r#"{ "showForceControls": false, "forces": { "linkDistance": 120.0 } }"#,
        )
        .unwrap();
        assert!(!settings.show_force_controls);
        assert_eq!(settings.forces.link_distance, 120.0);
        assert_eq!(
            settings.forces.center_strength,
            ForceParameters::default().center_strength
        );
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let settings = Settings::from_json(
            r#"{ "blockHeight": 10.0, "forces": { "repelStrength": 9000.0, "linkStrength": -1.0 } }"#,
        )
        .unwrap();
        assert_eq!(settings.block_height, MIN_BLOCK_HEIGHT);
        assert_eq!(settings.forces.repel_strength, 400.0);
        assert_eq!(settings.forces.link_strength, 0.0);
    }

    #[test]
    fn block_height_override_is_sanitized() {
        assert_eq!(Settings::default().with_block_height(480.0).block_height, 480.0);
        assert_eq!(
            Settings::default().with_block_height(f32::NAN).block_height,
            DEFAULT_BLOCK_HEIGHT
        );
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("outline-graph-broken-settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Settings::load(&path).is_err());
        assert_eq!(Settings::load_or_default(Some(&path)), Settings::default());
        let _ = fs::remove_file(&path);
    }
}
