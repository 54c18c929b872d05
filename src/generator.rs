//! Tree-walking generator that materializes a parsed description on disk.

use crate::ast::{FileNode, FileType, FolderNode, ForLoopNode, InputNode, Node, OutputNode};
use crate::attributes::{AttributeApplier, PlatformAttributes};
use crate::clock::Timestamp;
use crate::config::Config;
use crate::console::{Console, StdConsole};
use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::settings::{FileSettings, FolderSettings};
use crate::template::{substitute, PlaceholderRenderer, TemplateRenderer};
use log::{debug, warn};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Body written for a file when nothing in the content chain matched.
pub fn default_content(file_type: FileType, file_name: &str, now: &Timestamp) -> String {
    match file_type {
        FileType::Text => format!("# File: {}\n# Created: {}\n", file_name, now),
        FileType::Json => format!("{{\n  \"name\": \"{}\"\n}}\n", file_name),
        FileType::Yaml => format!("# {}\ncreated: {}\n", file_name, now.iso()),
        FileType::Xml => format!(
            "<?xml version=\"1.0\"?>\n<root>\n  <file>{}</file>\n</root>\n",
            file_name
        ),
        FileType::Binary => String::new(),
    }
}

/// Encodes `content` for writing.
///
/// Supported encodings: utf-8, utf-16 (little endian with byte order mark),
/// utf-16le, utf-16be, ascii, latin-1. Names ignore case, `-` and `_`.
///
/// # Errors
/// * `Error::EncodingError` for unknown encodings or characters the encoding cannot hold
pub fn encode_content(content: &str, encoding: &str) -> Result<Vec<u8>> {
    let normalized: String = encoding
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect::<String>()
        .to_ascii_lowercase();

    match normalized.as_str() {
        "utf8" => Ok(content.as_bytes().to_vec()),
        "utf16" => {
            let mut bytes = vec![0xFF, 0xFE];
            bytes.extend(content.encode_utf16().flat_map(u16::to_le_bytes));
            Ok(bytes)
        }
        "utf16le" => Ok(content.encode_utf16().flat_map(u16::to_le_bytes).collect()),
        "utf16be" => Ok(content.encode_utf16().flat_map(u16::to_be_bytes).collect()),
        "ascii" | "usascii" => {
            if content.is_ascii() {
                Ok(content.as_bytes().to_vec())
            } else {
                Err(Error::EncodingError(
                    "content contains non-ASCII characters".to_string(),
                ))
            }
        }
        "latin1" | "iso88591" => content
            .chars()
            .map(|c| {
                u8::try_from(u32::from(c)).map_err(|_| {
                    Error::EncodingError(format!("character {:?} is not representable in latin-1", c))
                })
            })
            .collect(),
        _ => Err(Error::EncodingError(format!(
            "unsupported encoding '{}'",
            encoding
        ))),
    }
}

/// Walks the syntax tree and creates folders and files under a base path.
///
/// Owns the variable environment for the duration of one run. The syntax tree
/// is only read.
pub struct Generator<'a> {
    base_path: PathBuf,
    config: &'a Config,
    renderer: &'a dyn TemplateRenderer,
    attributes: &'a dyn AttributeApplier,
    console: &'a mut dyn Console,
    env: Environment,
    patterns: Vec<(Regex, &'a str)>,
}

impl<'a> Generator<'a> {
    /// Creates a generator.
    ///
    /// # Arguments
    /// * `base_path` - Directory the tree is created in
    /// * `config` - File contents, templates and attribute defaults
    /// * `renderer` - Renderer applied to resolved file content
    /// * `attributes` - Platform attribute capability
    /// * `console` - Target of `stdout` statements and progress lines, source of `stdin` lines
    pub fn new<P: AsRef<Path>>(
        base_path: P,
        config: &'a Config,
        renderer: &'a dyn TemplateRenderer,
        attributes: &'a dyn AttributeApplier,
        console: &'a mut dyn Console,
    ) -> Self {
        let patterns = config
            .file_contents
            .iter()
            .filter_map(|(pattern, content)| {
                match Regex::new(&format!("^(?:{})", pattern)) {
                    Ok(regex) => Some((regex, content.as_str())),
                    Err(e) => {
                        warn!("Ignoring file_contents pattern '{}': {}", pattern, e);
                        None
                    }
                }
            })
            .collect();

        Self {
            base_path: base_path.as_ref().to_path_buf(),
            config,
            renderer,
            attributes,
            console,
            env: Environment::new(),
            patterns,
        }
    }

    /// Replaces the environment, e.g. to start from pre-bound variables.
    pub fn with_environment(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Ensures the base path exists, then creates every node in document order.
    ///
    /// # Errors
    /// * `Error::GenerationError` if a directory or file cannot be created
    /// * `Error::EncodingError` if content does not fit the requested encoding
    /// * `Error::IoError` if console input or output fails
    pub fn generate(&mut self, nodes: &[Node]) -> Result<()> {
        let base_path = self.base_path.clone();
        fs::create_dir_all(&base_path)
            .map_err(|e| Error::generation("cannot create base directory", &base_path, e))?;

        self.console.progress("Starting file system generation...");
        self.visit_all(nodes, &base_path)?;
        self.console.progress("Generation completed successfully!");
        Ok(())
    }

    fn visit_all(&mut self, nodes: &[Node], current: &Path) -> Result<()> {
        for node in nodes {
            self.visit(node, current)?;
        }
        Ok(())
    }

    fn visit(&mut self, node: &Node, current: &Path) -> Result<()> {
        match node {
            Node::Folder(folder) => self.generate_folder(folder, current),
            Node::File(file) => self.generate_file(file, current),
            Node::ForLoop(for_loop) => self.generate_for_loop(for_loop, current),
            Node::Output(output) => self.generate_output(output),
            Node::Input(input) => self.generate_input(input),
        }
    }

    fn substitute(&self, text: &str) -> String {
        substitute(text, &self.env.to_context())
    }

    /// Context for content rendering: configured variables overlaid with the environment.
    fn render_context(&self) -> serde_json::Value {
        let mut map: serde_json::Map<String, serde_json::Value> = self
            .config
            .variables
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (name, value) in self.env.bindings() {
            map.insert(name, serde_json::Value::String(value));
        }
        serde_json::Value::Object(map)
    }

    /// Best-effort attribute application; failures are logged and ignored.
    fn apply(&self, what: &str, path: &Path, result: std::io::Result<()>) {
        if let Err(e) = result {
            warn!("Could not set {} on '{}': {}", what, path.display(), e);
        }
    }

    fn generate_folder(&mut self, node: &FolderNode, current: &Path) -> Result<()> {
        let name = self.substitute(&node.name);
        let path = current.join(&name);
        let settings = FolderSettings::resolve(&node.attributes, &self.config.defaults);

        fs::create_dir_all(&path)
            .map_err(|e| Error::generation("cannot create folder", &path, e))?;
        if settings.hidden {
            self.apply("hidden flag", &path, self.attributes.set_hidden(&path));
        }
        if let Some(mode) = settings.permissions {
            self.apply("permissions", &path, self.attributes.set_permissions(&path, mode));
        }
        self.console
            .progress(&format!("Created folder: {}", path.display()));

        self.visit_all(&node.children, &path)
    }

    /// Picks the content of a file; the first matching rule wins:
    /// `content` attribute, `template` attribute, exact name in `file_contents`,
    /// first `file_contents` pattern matching the start of the name, type default.
    pub fn resolve_content(&self, node: &FileNode, file_name: &str, file_type: FileType) -> String {
        if let Some(content) = node.attributes.get("content") {
            debug!("Content for '{}' from content attribute", file_name);
            return content.to_text();
        }

        if let Some(template_name) = node.attributes.get("template") {
            let template_name = template_name.to_text();
            if let Some(template) = self.config.templates.get(&template_name) {
                debug!("Content for '{}' from template '{}'", file_name, template_name);
                return template.clone();
            }
            debug!("Template '{}' is not configured", template_name);
        }

        if let Some(content) = self.config.file_contents.get(file_name) {
            debug!("Content for '{}' from file_contents", file_name);
            return content.clone();
        }

        if let Some((regex, content)) = self
            .patterns
            .iter()
            .find(|(regex, _)| regex.is_match(file_name))
        {
            debug!("Content for '{}' from pattern '{}'", file_name, regex.as_str());
            return content.to_string();
        }

        default_content(file_type, file_name, &Timestamp::now())
    }

    fn generate_file(&mut self, node: &FileNode, current: &Path) -> Result<()> {
        let name = self.substitute(&node.name);
        let path = current.join(&name);
        let settings = FileSettings::resolve(&node.attributes, &self.config.defaults);
        debug!(
            "Generating file '{}' (placeholders: {:?})",
            name,
            node.placeholders()
        );

        let content = self.resolve_content(node, &name, settings.file_type);
        let content = self.renderer.render(&content, &self.render_context());

        if path.exists() && !settings.replace_if_exists {
            self.console
                .progress(&format!("Skipped existing file: {}", path.display()));
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::generation("cannot create folder", parent, e))?;
        }
        let bytes = match settings.file_type {
            FileType::Binary => content.into_bytes(),
            _ => encode_content(&content, &settings.encoding)?,
        };
        fs::write(&path, bytes).map_err(|e| Error::generation("cannot write file", &path, e))?;

        if settings.hidden {
            self.apply("hidden flag", &path, self.attributes.set_hidden(&path));
        }
        if let Some(mode) = settings.permissions {
            self.apply("permissions", &path, self.attributes.set_permissions(&path, mode));
        }
        if settings.executable {
            self.apply("executable bit", &path, self.attributes.set_executable(&path));
        }

        self.console.progress(&format!(
            "Created file: {} ({}, encoding: {})",
            path.display(),
            settings.file_type,
            settings.encoding
        ));
        Ok(())
    }

    fn generate_for_loop(&mut self, node: &ForLoopNode, current: &Path) -> Result<()> {
        for value in node.values() {
            self.env.push_scope(&node.var_name, value.to_string());
            let result = self.visit_all(&node.children, current);
            self.env.pop_scope();
            result?;
        }
        Ok(())
    }

    fn generate_output(&mut self, node: &OutputNode) -> Result<()> {
        let message = self.substitute(&node.message);
        self.console.write(&message)?;
        Ok(())
    }

    fn generate_input(&mut self, node: &InputNode) -> Result<()> {
        let value = match self.console.read_line()? {
            Some(line) => line,
            None => {
                warn!("End of input while reading '{}', binding it to an empty string", node.variable);
                String::new()
            }
        };
        self.env.assign(&node.variable, value);
        Ok(())
    }
}

/// Generates `nodes` under `base_path` using the standard console, the platform
/// attribute implementation and placeholder-only content rendering.
pub fn generate<P: AsRef<Path>>(nodes: &[Node], base_path: P, config: &Config) -> Result<()> {
    let renderer = PlaceholderRenderer;
    let attributes = PlatformAttributes::new();
    let mut console = StdConsole::new();
    Generator::new(base_path, config, &renderer, &attributes, &mut console).generate(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_content() {
        let now = Timestamp::from_unix(0, 0);
        assert_eq!(
            default_content(FileType::Text, "a.txt", &now),
            "# File: a.txt\n# Created: 1970-01-01 00:00:00.000000\n"
        );
        assert_eq!(
            default_content(FileType::Json, "a.json", &now),
            "{\n  \"name\": \"a.json\"\n}\n"
        );
        assert_eq!(
            default_content(FileType::Yaml, "a.yml", &now),
            "# a.yml\ncreated: 1970-01-01T00:00:00.000000\n"
        );
        assert!(default_content(FileType::Xml, "a.xml", &now).contains("<file>a.xml</file>"));
        assert_eq!(default_content(FileType::Binary, "a.bin", &now), "");
    }

    #[test]
    fn test_encode_content() {
        assert_eq!(encode_content("hé", "UTF-8").unwrap(), "hé".as_bytes());
        assert_eq!(encode_content("hé", "latin-1").unwrap(), vec![b'h', 0xE9]);
        assert_eq!(encode_content("A", "utf-16le").unwrap(), vec![0x41, 0x00]);
        assert_eq!(encode_content("A", "utf-16").unwrap(), vec![0xFF, 0xFE, 0x41, 0x00]);
        assert!(encode_content("hé", "ascii").is_err());
        assert!(encode_content("€", "latin1").is_err());
        assert!(encode_content("x", "klingon").is_err());
    }
}
