//! Syntax tree export for inspection tooling.

use crate::ast::Node;
use crate::error::Result;
use log::debug;
use std::path::Path;

/// Serializes `nodes` as a pretty-printed JSON array.
pub fn ast_to_json(nodes: &[Node]) -> Result<String> {
    Ok(serde_json::to_string_pretty(nodes)?)
}

/// Writes the JSON form of `nodes` to `path`.
///
/// # Errors
/// * `Error::ExportError` if serialization fails
/// * `Error::IoError` if the file cannot be written
pub fn export_ast<P: AsRef<Path>>(nodes: &[Node], path: P) -> Result<()> {
    let path = path.as_ref();
    let json = ast_to_json(nodes)?;
    std::fs::write(path, json)?;
    debug!("Exported {} nodes to {}", nodes.len(), path.display());
    Ok(())
}
