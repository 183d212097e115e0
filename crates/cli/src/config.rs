//! Settings loading and validation.
//!
//! Supports TOML (primary) and JSON, detected from the file extension, and
//! validates before use.

use std::path::Path;

use contracts::StreamConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

/// Settings file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    /// TOML format (recommended)
    Toml,
    /// JSON format
    Json,
}

impl SettingsFormat {
    /// Infer the format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Arbiter settings as read from disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamSettings {
    /// Capture server address, e.g. "192.168.1.10:801"
    pub host: String,

    /// Per-start stream configuration
    #[serde(default)]
    pub stream: StreamConfig,
}

impl StreamSettings {
    /// Load settings from a file path, detecting the format from the
    /// extension and validating the result.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::config_not_found(path.display().to_string()));
        }
        let format = Self::detect_format(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load settings from a string in the given format and validate.
    pub fn load_from_str(content: &str, format: SettingsFormat) -> Result<Self> {
        let settings: Self = match format {
            SettingsFormat::Toml => toml::from_str(content)
                .map_err(|e| CliError::config_parse(format!("TOML parse error: {e}")))?,
            SettingsFormat::Json => serde_json::from_str(content)
                .map_err(|e| CliError::config_parse(format!("JSON parse error: {e}")))?,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check the settings for use.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(CliError::config_validation("host must not be empty"));
        }
        Ok(())
    }

    fn detect_format(path: &Path) -> Result<SettingsFormat> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            CliError::config_parse("cannot determine settings format from extension")
        })?;

        SettingsFormat::from_extension(ext).ok_or_else(|| {
            CliError::config_parse(format!("unsupported settings format: .{ext}"))
        })
    }
}
