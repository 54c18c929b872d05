//! sttfs entry point.
//! Reads a tree description, then parses it and either reports on it (dry run)
//! or generates the described tree.

use anyhow::Context;
use sttfs::{
    attributes::PlatformAttributes,
    cli::{get_args, Args},
    config::{load_config, Config},
    console::StdConsole,
    export::export_ast,
    generator::Generator,
    lexer::tokenize,
    logger::init_logger,
    parser::parse,
    template::{BlockRenderer, PlaceholderRenderer, TemplateRenderer},
};

fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Reads the description and, if given, the configuration
/// 2. Tokenizes and parses the description
/// 3. Generates the tree unless this is a dry run
/// 4. Exports the syntax tree if requested
fn run(args: Args) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read '{}'", args.input.display()))?;

    let tokens = tokenize(&source)?;
    let nodes = parse(&tokens)?;

    if args.dry_run {
        println!("Description parsed successfully");
        println!("  Tokens: {}", tokens.len());
        println!("  Nodes: {}", nodes.len());
    } else {
        let config = match &args.config {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load config '{}'", path.display()))?,
            None => Config::default(),
        };

        let renderer: Box<dyn TemplateRenderer> = if args.advanced_templates {
            Box::new(BlockRenderer::new())
        } else {
            Box::new(PlaceholderRenderer)
        };
        let attributes = PlatformAttributes::new();
        let mut console = StdConsole::new();

        Generator::new(&args.output, &config, &*renderer, &attributes, &mut console)
            .generate(&nodes)?;
        println!("File system created in: {}", args.output.display());
    }

    if let Some(path) = &args.export_ast {
        export_ast(&nodes, path)
            .with_context(|| format!("failed to export AST to '{}'", path.display()))?;
        println!("AST exported to {}", path.display());
    }

    Ok(())
}
