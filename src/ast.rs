//! Syntax tree produced by the parser and walked by the generator.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

/// Kind of file to create. Drives the default content and the write mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    #[default]
    Text,
    Binary,
    Json,
    Yaml,
    Xml,
}

impl FileType {
    /// Matches a file type name case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "text" => Some(FileType::Text),
            "binary" => Some(FileType::Binary),
            "json" => Some(FileType::Json),
            "yaml" => Some(FileType::Yaml),
            "xml" => Some(FileType::Xml),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Text => "text",
            FileType::Binary => "binary",
            FileType::Json => "json",
            FileType::Yaml => "yaml",
            FileType::Xml => "xml",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shorthand permission literals recognised in attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Permission {
    #[serde(rename = "444")]
    ReadOnly,
    #[serde(rename = "644")]
    Writable,
    #[serde(rename = "755")]
    Executable,
    #[serde(rename = "777")]
    Full,
}

impl Permission {
    pub fn from_literal(literal: &str) -> Option<Self> {
        match literal {
            "444" => Some(Permission::ReadOnly),
            "644" => Some(Permission::Writable),
            "755" => Some(Permission::Executable),
            "777" => Some(Permission::Full),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ReadOnly => "444",
            Permission::Writable => "644",
            Permission::Executable => "755",
            Permission::Full => "777",
        }
    }

    pub fn mode(&self) -> u32 {
        match self {
            Permission::ReadOnly => 0o444,
            Permission::Writable => 0o644,
            Permission::Executable => 0o755,
            Permission::Full => 0o777,
        }
    }
}

/// Parses an octal mode such as `"600"` or `"0755"`.
pub fn parse_mode(text: &str) -> Option<u32> {
    let digits = text.trim();
    if digits.is_empty() || !digits.chars().all(|c| ('0'..='7').contains(&c)) {
        return None;
    }
    u32::from_str_radix(digits, 8).ok().filter(|mode| *mode <= 0o7777)
}

/// Typed attribute value after literal coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    Null,
    FileType(FileType),
    Permission(Permission),
}

impl AttributeValue {
    /// Coerces a string literal into a file type or permission tag where it matches one.
    pub fn from_string(value: String) -> Self {
        if let Some(file_type) = FileType::from_name(&value) {
            AttributeValue::FileType(file_type)
        } else if let Some(permission) = Permission::from_literal(&value) {
            AttributeValue::Permission(permission)
        } else {
            AttributeValue::String(value)
        }
    }

    /// Text form of the value, as written into file content or used as a lookup key.
    pub fn to_text(&self) -> String {
        match self {
            AttributeValue::String(s) => s.clone(),
            AttributeValue::Integer(i) => i.to_string(),
            AttributeValue::Boolean(b) => b.to_string(),
            AttributeValue::Null => String::new(),
            AttributeValue::FileType(t) => t.as_str().to_string(),
            AttributeValue::Permission(p) => p.as_str().to_string(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Octal mode for a permission tag, a permission string or an integer written in octal digits.
    pub fn as_mode(&self) -> Option<u32> {
        match self {
            AttributeValue::Permission(p) => Some(p.mode()),
            AttributeValue::String(s) => parse_mode(s),
            AttributeValue::Integer(i) => parse_mode(&i.to_string()),
            _ => None,
        }
    }
}

pub type Attributes = IndexMap<String, AttributeValue>;

/// Comparison used in a loop header condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Comparison {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "!=")]
    Ne,
}

impl Comparison {
    pub fn holds(&self, value: i64, bound: i64) -> bool {
        match self {
            Comparison::Lt => value < bound,
            Comparison::Le => value <= bound,
            Comparison::Gt => value > bound,
            Comparison::Ge => value >= bound,
            Comparison::Ne => value != bound,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderNode {
    pub name: String,
    pub attributes: Attributes,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileNode {
    pub name: String,
    pub attributes: Attributes,
}

impl FileNode {
    /// Names of the `${...}` placeholders used in the file name.
    pub fn placeholders(&self) -> Vec<&str> {
        PLACEHOLDER
            .captures_iter(&self.name)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForLoopNode {
    pub var_name: String,
    pub start: i64,
    pub end: i64,
    pub condition: Comparison,
    /// `1` for `++`, `-1` for `--`.
    pub step: i64,
    pub children: Vec<Node>,
}

impl ForLoopNode {
    /// Values the loop variable takes, in iteration order.
    ///
    /// The sequence is derived from the bounds up front. When the step moves away
    /// from the bound the condition would hold forever; such a loop yields nothing.
    pub fn values(&self) -> LoopValues {
        let (start, end) = (self.start, self.end);
        if !self.condition.holds(start, end) {
            return LoopValues::empty();
        }
        let last = if self.step > 0 {
            match self.condition {
                Comparison::Lt => end.checked_sub(1),
                Comparison::Le => Some(end),
                Comparison::Ne if start < end => end.checked_sub(1),
                _ => None,
            }
        } else {
            match self.condition {
                Comparison::Gt => end.checked_add(1),
                Comparison::Ge => Some(end),
                Comparison::Ne if start > end => end.checked_add(1),
                _ => None,
            }
        };
        match last {
            Some(last) => LoopValues {
                next: Some(start),
                last,
                step: self.step.signum(),
            },
            None => {
                log::warn!(
                    "Loop over '{}' never reaches its bound {} {}; skipping it",
                    self.var_name,
                    start,
                    end
                );
                LoopValues::empty()
            }
        }
    }
}

/// Finite iterator over loop variable values.
#[derive(Debug, Clone)]
pub struct LoopValues {
    next: Option<i64>,
    last: i64,
    step: i64,
}

impl LoopValues {
    fn empty() -> Self {
        Self {
            next: None,
            last: 0,
            step: 1,
        }
    }
}

impl Iterator for LoopValues {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let current = self.next?;
        self.next = if current == self.last {
            None
        } else {
            current.checked_add(self.step)
        };
        Some(current)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputNode {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputNode {
    pub variable: String,
}

/// A statement of the tree description language.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Folder(FolderNode),
    File(FileNode),
    ForLoop(ForLoopNode),
    Output(OutputNode),
    Input(InputNode),
}
