use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use sttfs::cli::Args;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("sttfs")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_basic_args() {
    let args = make_args(&["./tree.fs"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.input, PathBuf::from("./tree.fs"));
    assert_eq!(parsed.output, PathBuf::from("."));
    assert_eq!(parsed.config, None);
    assert!(!parsed.verbose);
    assert!(!parsed.dry_run);
    assert_eq!(parsed.export_ast, None);
    assert!(!parsed.advanced_templates);
}

#[test]
fn test_all_flags() {
    let args = make_args(&[
        "--output",
        "/tmp/out",
        "--config",
        "sttfs.yaml",
        "--verbose",
        "--dry-run",
        "--export-ast",
        "ast.json",
        "--advanced-templates",
        "./tree.fs",
    ]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.output, PathBuf::from("/tmp/out"));
    assert_eq!(parsed.config, Some(PathBuf::from("sttfs.yaml")));
    assert!(parsed.verbose);
    assert!(parsed.dry_run);
    assert_eq!(parsed.export_ast, Some(PathBuf::from("ast.json")));
    assert!(parsed.advanced_templates);
}

#[test]
fn test_short_flags() {
    let args = make_args(&["-v", "-o", "out", "-c", "c.json", "./tree.fs"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.verbose);
    assert_eq!(parsed.output, PathBuf::from("out"));
    assert_eq!(parsed.config, Some(PathBuf::from("c.json")));
}

#[test]
fn test_missing_args() {
    assert!(Args::try_parse_from(make_args(&[])).is_err());
}

#[test]
fn test_too_many_args() {
    let args = make_args(&["./tree.fs", "extra"]);
    assert!(Args::try_parse_from(args).is_err());
}
