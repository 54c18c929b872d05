//! sttfs builds directory trees from a small declarative language.
//! A description is tokenized, parsed into a syntax tree and then walked by a
//! generator that creates the folders and files it describes.

/// Syntax tree types
pub mod ast;

/// Platform attribute capability (hidden, permissions, executable)
pub mod attributes;

/// Command-line interface module for the sttfs application
pub mod cli;

/// Wall-clock timestamps in UTC
pub mod clock;

/// Configuration handling: file contents, templates, defaults
/// Supports JSON and YAML formats
pub mod config;

/// Console input and output used by `stdout`/`stdin` statements
pub mod console;

/// Variable bindings with loop scoping
pub mod environment;

/// Error types and handling for the sttfs application
pub mod error;

/// Syntax tree export to JSON
pub mod export;

/// Restricted expression evaluation for template blocks
pub mod expr;

/// Creates folders and files from a syntax tree
pub mod generator;

/// Tokenizer
pub mod lexer;

/// Logger setup for the binary
pub mod logger;

/// Recursive-descent parser
pub mod parser;

/// Node attributes merged with configuration defaults
pub mod settings;

/// Placeholder substitution and block templates
pub mod template;
