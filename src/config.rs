use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    effects::EffectDescriptor,
    error::{ConfigError, Result},
};

/// Main configuration for vidmark
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Output encoding settings
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|_| ConfigError::ParseFailed {
            path: path.display().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.output.validate()
    }
}

/// Output encoding configuration.
///
/// Frame rate and resolution are never configured: the output stream always
/// mirrors the probed input stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Video codec passed to the external encoder
    pub codec: String,

    /// Quality setting (0-100, higher is better); mapped onto CRF
    pub quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            codec: "libx264".to_string(),
            quality: 85,
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<()> {
        if self.codec.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "output.codec".to_string(),
                value: "<empty>".to_string(),
            }
            .into());
        }

        if self.quality > 100 {
            return Err(ConfigError::InvalidValue {
                key: "output.quality".to_string(),
                value: self.quality.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// A project file: the ordered effect list for one render, as `[[effect]]`
/// tables. Order in the file is paint order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectProject {
    #[serde(default, rename = "effect")]
    pub effects: Vec<EffectDescriptor>,
}

impl EffectProject {
    /// Load an effect list from a TOML project file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let project: EffectProject =
            toml::from_str(&content).map_err(|_| ConfigError::ParseFailed {
                path: path.display().to_string(),
            })?;

        // Windows are checked here so a bad project fails before any frame
        // work starts
        for descriptor in &project.effects {
            descriptor.window()?;
        }

        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectKind;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");

        let original = Config {
            output: OutputConfig {
                codec: "libx265".to_string(),
                quality: 70,
            },
        };

        original.save_to_file(&file_path).unwrap();
        let loaded = Config::from_file(&file_path).unwrap();

        assert_eq!(original.output.codec, loaded.output.codec);
        assert_eq!(original.output.quality, loaded.output.quality);
    }

    #[test]
    fn test_invalid_quality_rejected() {
        let config = Config {
            output: OutputConfig {
                codec: "libx264".to_string(),
                quality: 101,
            },
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_config_file() {
        assert!(Config::from_file("/no/such/config.toml").is_err());
    }

    #[test]
    fn test_effect_project_parsing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("project.toml");
        std::fs::write(
            &path,
            r#"
            [[effect]]
            kind = "rectangle"
            start = 1.0
            end = 4.0
            top_left = [100, 100]
            bottom_right = [300, 300]
            color = [0, 255, 0]
            thickness = 2

            [[effect]]
            kind = "zoom"
            start = 10.0
            factor = 2.0
            zoom_duration = 2.0
            hold_duration = 5.0
            target = [0.3, 0.7]

            [[effect]]
            kind = "overlay_image"
            start = 2.0
            end = 6.0
            path = "assets/logo.png"
            position = [100, 100]
            "#,
        )
        .unwrap();

        let project = EffectProject::from_file(&path).unwrap();
        assert_eq!(project.effects.len(), 3);
        assert!(matches!(
            project.effects[0].kind,
            EffectKind::Rectangle { .. }
        ));
        assert!(matches!(project.effects[1].kind, EffectKind::Zoom { .. }));
        assert!(matches!(
            project.effects[2].kind,
            EffectKind::OverlayImage { .. }
        ));
    }

    #[test]
    fn test_effect_project_rejects_bad_window() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("project.toml");
        std::fs::write(
            &path,
            r#"
            [[effect]]
            kind = "line"
            start = 5.0
            end = 2.0
            from = [0, 0]
            to = [10, 10]
            color = [255, 0, 0]
            thickness = 3
            "#,
        )
        .unwrap();

        assert!(EffectProject::from_file(&path).is_err());
    }
}
