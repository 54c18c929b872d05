//! Effective folder and file settings: node attributes layered over configuration defaults.

use crate::ast::{parse_mode, AttributeValue, Attributes, FileType};
use crate::config::Defaults;
use log::warn;

fn flag(attributes: &Attributes, name: &str, default: bool) -> bool {
    match attributes.get(name) {
        None | Some(AttributeValue::Null) => default,
        Some(value) => value.as_bool().unwrap_or_else(|| {
            warn!("Attribute '{}' expects true or false, got {:?}", name, value);
            default
        }),
    }
}

fn mode(attributes: &Attributes, default: Option<&str>) -> Option<u32> {
    match attributes.get("permissions") {
        None | Some(AttributeValue::Null) => default.and_then(|text| {
            parse_mode(text).or_else(|| {
                warn!("Ignoring invalid default permissions '{}'", text);
                None
            })
        }),
        Some(value) => value.as_mode().or_else(|| {
            warn!("Ignoring invalid permissions {:?}", value);
            None
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSettings {
    pub hidden: bool,
    pub permissions: Option<u32>,
}

impl FolderSettings {
    pub fn resolve(attributes: &Attributes, defaults: &Defaults) -> Self {
        Self {
            hidden: flag(attributes, "hidden", defaults.hidden),
            permissions: mode(attributes, Some(&defaults.folder_permissions)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSettings {
    pub file_type: FileType,
    pub encoding: String,
    pub replace_if_exists: bool,
    pub hidden: bool,
    pub permissions: Option<u32>,
    pub executable: bool,
}

impl FileSettings {
    pub fn resolve(attributes: &Attributes, defaults: &Defaults) -> Self {
        let file_type = match attributes.get("type") {
            None | Some(AttributeValue::Null) => defaults.file_type,
            Some(AttributeValue::FileType(file_type)) => *file_type,
            Some(other) => {
                warn!(
                    "Unknown file type {:?}, using '{}'",
                    other.to_text(),
                    defaults.file_type
                );
                defaults.file_type
            }
        };
        let encoding = match attributes.get("encoding") {
            None | Some(AttributeValue::Null) => defaults.encoding.clone(),
            Some(value) => value.to_text(),
        };
        Self {
            file_type,
            encoding,
            replace_if_exists: flag(attributes, "replaceifexists", defaults.replaceifexists),
            hidden: flag(attributes, "hidden", defaults.hidden),
            permissions: mode(attributes, defaults.permissions.as_deref()),
            executable: flag(attributes, "executable", defaults.executable),
        }
    }
}
