//! Renderer configuration
//!
//! Startup settings for a [`crate::render::renderer::Renderer`], loadable from
//! TOML. Everything here has a sensible default; a missing file or missing
//! field falls back rather than failing the build of the renderer.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors raised while loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file contents were not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

fn default_clear_color() -> [f32; 4] {
    [0.05, 0.05, 0.08, 1.0]
}

fn default_true() -> bool {
    true
}

/// Startup settings for the renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Framebuffer clear color (linear RGBA)
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 4],
    /// Initial depth-test state
    #[serde(default = "default_true")]
    pub depth_test: bool,
    /// Initial alpha-blend state
    #[serde(default = "default_true")]
    pub blend: bool,
    /// Initial wireframe state
    #[serde(default)]
    pub wireframe: bool,
    /// Whether passes render through the off-screen post-process target
    #[serde(default = "default_true")]
    pub post_process: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: default_clear_color(),
            depth_test: true,
            blend: true,
            wireframe: false,
            post_process: true,
        }
    }
}

impl RendererConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&text)
    }

    /// Load from a file, falling back to defaults when the file is absent
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(ConfigError::Io(_)) => {
                log::info!("no config at {}, using defaults", path.as_ref().display());
                Self::default()
            }
            Err(err) => {
                log::error!("config {} invalid ({err}), using defaults", path.as_ref().display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = RendererConfig::from_toml("").unwrap();
        assert!(config.depth_test);
        assert!(config.post_process);
        assert!(!config.wireframe);
    }

    #[test]
    fn fields_override_defaults() {
        let config = RendererConfig::from_toml(
            "wireframe = true\nclear_color = [0.0, 0.0, 0.0, 1.0]\npost_process = false\n",
        )
        .unwrap();
        assert!(config.wireframe);
        assert!(!config.post_process);
        assert_eq!(config.clear_color, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(RendererConfig::from_toml("depth_test = \"maybe\"").is_err());
    }
}
