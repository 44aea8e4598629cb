use std::path::PathBuf;

use nova_config::{ClassifierMode, ConfigError, LoggingConfig, NovaConfig, WebFnConfig};
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

#[test]
fn empty_config_uses_defaults() {
    let config = NovaConfig::load_from_str("").expect("empty config");
    assert_eq!(config, NovaConfig::default());
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.stderr);
    assert!(!config.logging.json);
    assert_eq!(config.webfn.classifier, ClassifierMode::Precise);
    assert_eq!(config.webfn.exclude_dirs, vec![".git", "target", "build", "out"]);
}

#[test]
fn parses_every_section() {
    let text = r#"
[logging]
level = "warn,nova.framework.webfn=debug"
json = true
stderr = false
file = "logs/nova.log"

[webfn]
classifier = "simple"
exclude_dirs = ["node_modules"]
"#;

    let config = NovaConfig::load_from_str(text).expect("config");
    assert_eq!(
        config,
        NovaConfig {
            logging: LoggingConfig {
                level: "warn,nova.framework.webfn=debug".to_string(),
                json: true,
                stderr: false,
                file: Some(PathBuf::from("logs/nova.log")),
            },
            webfn: WebFnConfig {
                classifier: ClassifierMode::Simple,
                exclude_dirs: vec!["node_modules".to_string()],
            },
        }
    );
}

#[test]
fn partial_sections_keep_field_defaults() {
    let config = NovaConfig::load_from_str("[webfn]\nclassifier = \"simple\"\n").expect("config");
    assert_eq!(config.webfn.exclude_dirs, WebFnConfig::default().exclude_dirs);
    assert_eq!(config.logging, LoggingConfig::default());
}

#[test]
fn rejects_unknown_classifier() {
    let err = NovaConfig::load_from_str("[webfn]\nclassifier = \"fuzzy\"\n").expect_err("invalid");
    assert!(matches!(err, ConfigError::Toml(_)), "{err:?}");
}

#[test]
fn load_from_path_reads_the_file() {
    let file = NamedTempFile::new().expect("temp file");
    std::fs::write(file.path(), "[logging]\nlevel = \"debug\"\n").expect("write");

    let config = NovaConfig::load_from_path(file.path()).expect("config");
    assert_eq!(config.logging.level, "debug");

    let (_, diagnostics) = NovaConfig::load_from_path_with_diagnostics(file.path()).expect("config");
    assert!(diagnostics.is_empty());
}

#[test]
fn classifier_mode_round_trips_through_strings() {
    for mode in [ClassifierMode::Simple, ClassifierMode::Precise] {
        assert_eq!(mode.to_string().parse::<ClassifierMode>(), Ok(mode));
    }
    assert_eq!("PRECISE".parse::<ClassifierMode>(), Ok(ClassifierMode::Precise));
    assert!("fuzzy".parse::<ClassifierMode>().is_err());
}
