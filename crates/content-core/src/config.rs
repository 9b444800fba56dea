use std::{fs, path::Path, path::PathBuf, time::Duration};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ContentError, Result};

pub const QUALIFIER: &str = "com";
pub const ORGANIZATION: &str = "portal";
pub const APPLICATION: &str = "portal-admin";

const CONFIG_FILE: &str = "config.toml";

pub fn config_root() -> Option<PathBuf> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION).map(|p| p.config_dir().to_path_buf())
}

/// Font-size cut-offs used when promoting styled paragraphs to headings.
/// Values are compared against the number in `font-size: <n>px|pt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingThresholds {
    pub h1_min: f32,
    pub h2_min: f32,
    pub h3_min: f32,
}

impl Default for HeadingThresholds {
    fn default() -> Self {
        Self {
            h1_min: 20.0,
            h2_min: 16.0,
            h3_min: 14.0,
        }
    }
}

impl HeadingThresholds {
    pub fn level_for(&self, size: f32) -> Option<u8> {
        if size >= self.h1_min {
            Some(1)
        } else if size >= self.h2_min {
            Some(2)
        } else if size >= self.h3_min {
            Some(3)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub headings: HeadingThresholds,
    /// Minimum length of an all-caps paragraph before it reads as a heading.
    pub caps_min_chars: usize,
    pub sidebar_title: String,
    pub highlight_ms: u64,
    pub placeholder_text: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            headings: HeadingThresholds::default(),
            caps_min_chars: 8,
            sidebar_title: "Table of Contents".to_string(),
            highlight_ms: 2000,
            placeholder_text: "Add content for this section here.".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn highlight_duration(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }
}

pub fn config_path() -> Option<PathBuf> {
    config_root().map(|root| root.join(CONFIG_FILE))
}

/// Loads the config from the default location, falling back to defaults when
/// no config directory or file exists.
pub fn load_config() -> Result<PipelineConfig> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => {
            warn!("no config directory available, using defaults");
            Ok(PipelineConfig::default())
        }
    }
}

pub fn load_config_from(path: &Path) -> Result<PipelineConfig> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file missing, using defaults");
            return Ok(PipelineConfig::default());
        }
        Err(err) => return Err(ContentError::Io(err)),
    };
    let config: PipelineConfig = toml::from_str(&data)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_map_sizes_to_levels() {
        let t = HeadingThresholds::default();
        assert_eq!(t.level_for(24.0), Some(1));
        assert_eq!(t.level_for(20.0), Some(1));
        assert_eq!(t.level_for(19.0), Some(2));
        assert_eq!(t.level_for(16.0), Some(2));
        assert_eq!(t.level_for(15.0), Some(3));
        assert_eq!(t.level_for(14.0), Some(3));
        assert_eq!(t.level_for(13.0), None);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "sidebar_title = \"Contents\"\n[headings]\nh1_min = 22.0\n",
        )
        .unwrap();
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.sidebar_title, "Contents");
        assert_eq!(config.headings.h1_min, 22.0);
        assert_eq!(config.headings.h2_min, 16.0);
        assert_eq!(config.caps_min_chars, 8);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "caps_min_chars = \"many\"").unwrap();
        assert!(matches!(
            load_config_from(&path),
            Err(ContentError::ConfigParse(_))
        ));
    }
}
