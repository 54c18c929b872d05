//! Command-line interface implementation for sttfs.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

/// Command-line arguments structure for sttfs.
#[derive(Parser, Debug)]
#[command(author, version, about = "sttfs: build a file system tree from a DSL description", long_about = None)]
pub struct Args {
    /// Path to the tree description file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Directory the tree is created in
    #[arg(short, long, value_name = "OUTPUT_DIR", default_value = ".")]
    pub output: PathBuf,

    /// JSON or YAML configuration with file contents, templates and defaults
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only tokenize and parse the description, do not touch the file system
    #[arg(long)]
    pub dry_run: bool,

    /// Write the syntax tree as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub export_ast: Option<PathBuf>,

    /// Render file content with {if} and {for} template blocks
    #[arg(long)]
    pub advanced_templates: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                // Nothing useful to do if stdout is gone.
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
