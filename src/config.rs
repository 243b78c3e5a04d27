//! Configuration management for schema-marshal
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (schema-marshal.toml)
//! - Environment variables (SCHEMA_MARSHAL__*)
//!
//! ## Example config file (schema-marshal.toml):
//! ```toml
//! [registry]
//! descriptor_set = "./descriptors.pb"
//!
//! [marshal]
//! field_names = "json"
//! bytes_text = "utf8"
//!
//! [output]
//! format = "pretty"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarshalConfig {
    /// Registry settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Record conversion settings
    #[serde(default)]
    pub marshal: MarshalOptions,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Registry configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Serialized descriptor set to load. Built-in types are used when unset.
    #[serde(default)]
    pub descriptor_set: Option<PathBuf>,
}

/// Options applied by every TypeMarshaler of a registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarshalOptions {
    /// Which field name becomes the record property name
    #[serde(default)]
    pub field_names: FieldNaming,

    /// How text supplied for a `bytes` field is turned into bytes
    #[serde(default)]
    pub bytes_text: BytesText,
}

/// Record property naming
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldNaming {
    /// lowerCamelCase JSON name (`user_id` -> `userId`)
    #[default]
    Json,
    /// Field name as declared in the schema
    Proto,
}

/// Interpretation of text input for `bytes` fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BytesText {
    /// Text is stored as its UTF-8 encoding
    #[default]
    Utf8,
    /// Text is standard base64 and is decoded first
    Base64,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JSON output format (pretty or compact)
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl MarshalConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "schema-marshal.toml",
            ".schema-marshal.toml",
            "config/schema-marshal.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "schema-marshal") {
            let xdg_config = config_dir.config_dir().join("schema-marshal.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("SCHEMA_MARSHAL")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
