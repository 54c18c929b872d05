use std::fs;
use sttfs::ast::FileType;
use sttfs::config::{load_config, Config, Defaults};
use sttfs::error::Error;
use tempfile::TempDir;

#[test]
fn test_empty_config_uses_defaults() {
    let config = Config::from_json("{}").unwrap();
    assert!(config.file_contents.is_empty());
    assert!(config.templates.is_empty());
    assert_eq!(config.defaults, Defaults::default());
    assert_eq!(Config::from_yaml("").unwrap(), Config::default());
}

#[test]
fn test_json_config() {
    let config = Config::from_json(
        r#"{
            "file_contents": {"z.txt": "Z", "^test_.*": "T", "a.txt": "A"},
            "templates": {"license": "MIT"},
            "defaults": {"encoding": "latin-1", "replaceifexists": false, "permissions": 600},
            "variables": {"deps": ["serde", "log"]}
        }"#,
    )
    .unwrap();

    let keys: Vec<_> = config.file_contents.keys().cloned().collect();
    assert_eq!(keys, vec!["z.txt", "^test_.*", "a.txt"]);
    assert_eq!(config.templates["license"], "MIT");
    assert_eq!(config.defaults.encoding, "latin-1");
    assert!(!config.defaults.replaceifexists);
    assert_eq!(config.defaults.permissions.as_deref(), Some("600"));
    assert_eq!(config.defaults.folder_permissions, "755");
    assert_eq!(config.variables["deps"], serde_json::json!(["serde", "log"]));
}

#[test]
fn test_yaml_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sttfs.yml");
    fs::write(
        &path,
        "file_contents:\n  README.md: \"# Project\"\ndefaults:\n  type: json\n  hidden: true\n  folder_permissions: \"700\"\n",
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.file_contents["README.md"], "# Project");
    assert_eq!(config.defaults.file_type, FileType::Json);
    assert!(config.defaults.hidden);
    assert_eq!(config.defaults.folder_permissions, "700");
    assert_eq!(config.defaults.encoding, "utf-8");
}

#[test]
fn test_unsupported_extension() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sttfs.toml");
    fs::write(&path, "").unwrap();
    assert!(matches!(load_config(&path), Err(Error::ConfigError(_))));
}

#[test]
fn test_malformed_documents() {
    assert!(matches!(Config::from_json("{"), Err(Error::ConfigError(_))));
    assert!(matches!(
        Config::from_yaml("templates: [1, 2"),
        Err(Error::ConfigError(_))
    ));
    assert!(matches!(
        Config::from_json(r#"{"defaults": {"type": "csv"}}"#),
        Err(Error::ConfigError(_))
    ));
}

#[test]
fn test_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    assert!(matches!(
        load_config(temp_dir.path().join("missing.json")),
        Err(Error::IoError(_))
    ));
}
