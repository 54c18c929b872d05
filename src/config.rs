//! Configuration handling for sttfs.
//! Loads file contents, named templates, attribute defaults and template
//! variables from a JSON or YAML document.

use crate::ast::FileType;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Deserializer};
use std::path::Path;

/// Attribute values used when a node does not set them itself.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub encoding: String,
    pub replaceifexists: bool,
    #[serde(rename = "type")]
    pub file_type: FileType,
    /// Mode applied to files without a `permissions` attribute. Unset means leave as created.
    #[serde(deserialize_with = "deserialize_mode_text")]
    pub permissions: Option<String>,
    /// Mode applied to folders without a `permissions` attribute.
    #[serde(deserialize_with = "deserialize_folder_mode_text")]
    pub folder_permissions: String,
    pub hidden: bool,
    pub executable: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            encoding: "utf-8".to_string(),
            replaceifexists: true,
            file_type: FileType::Text,
            permissions: None,
            folder_permissions: "755".to_string(),
            hidden: false,
            executable: false,
        }
    }
}

/// Modes may be written as `"644"` or as a bare number `644`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ModeText {
    Text(String),
    Number(u64),
}

impl From<ModeText> for String {
    fn from(mode: ModeText) -> Self {
        match mode {
            ModeText::Text(text) => text,
            ModeText::Number(number) => number.to_string(),
        }
    }
}

fn deserialize_mode_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(Option::<ModeText>::deserialize(deserializer)?.map(String::from))
}

fn deserialize_folder_mode_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    Ok(ModeText::deserialize(deserializer)?.into())
}

/// Generation configuration. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File name or name pattern → literal content, in declaration order.
    pub file_contents: IndexMap<String, String>,
    /// Template name → literal content, selected with the `template` attribute.
    pub templates: IndexMap<String, String>,
    pub defaults: Defaults,
    /// Extra values visible to the content renderer, e.g. lists for `{for}` blocks.
    pub variables: IndexMap<String, serde_json::Value>,
}

impl Config {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid JSON configuration: {}", e)))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty YAML document deserializes to null.
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid YAML configuration: {}", e)))
    }
}

/// Loads a configuration document, choosing the format from the file extension.
///
/// # Arguments
/// * `path` - `.json`, `.yaml` or `.yml` file
///
/// # Errors
/// * `Error::ConfigError` for other extensions or malformed documents
/// * `Error::IoError` if the file cannot be read
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    debug!("Loading configuration from {}", path.display());
    match extension.as_str() {
        "json" => Config::from_json(&std::fs::read_to_string(path)?),
        "yaml" | "yml" => Config::from_yaml(&std::fs::read_to_string(path)?),
        _ => Err(Error::ConfigError(format!(
            "Unsupported config format: '{}'",
            path.display()
        ))),
    }
}
