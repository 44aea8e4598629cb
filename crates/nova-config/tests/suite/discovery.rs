use std::ffi::OsString;

use nova_config::{
    discover_config_path, load_for_workspace, load_for_workspace_with_diagnostics,
    with_config_env_lock, ClassifierMode, ConfigWarning, NovaConfig, NOVA_CONFIG_ENV_VAR,
};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

struct EnvVarGuard {
    key: &'static str,
    prev: Option<OsString>,
}

impl EnvVarGuard {
    fn set(key: &'static str, value: impl Into<OsString>) -> Self {
        let prev = std::env::var_os(key);
        std::env::set_var(key, value.into());
        Self { key, prev }
    }

    fn unset(key: &'static str) -> Self {
        let prev = std::env::var_os(key);
        std::env::remove_var(key);
        Self { key, prev }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}

#[test]
fn discovers_nova_toml_in_workspace_root() {
    with_config_env_lock(|| {
        let _env = EnvVarGuard::unset(NOVA_CONFIG_ENV_VAR);

        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nova.toml");
        std::fs::write(&config_path, "[webfn]\nclassifier = \"simple\"\n").unwrap();

        let discovered = discover_config_path(dir.path()).expect("nova.toml should be discovered");
        assert_eq!(discovered, config_path.canonicalize().unwrap_or(config_path));
    });
}

#[test]
fn nova_toml_wins_over_hidden_and_legacy_files() {
    with_config_env_lock(|| {
        let _env = EnvVarGuard::unset(NOVA_CONFIG_ENV_VAR);

        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".nova")).unwrap();
        std::fs::write(dir.path().join(".nova/config.toml"), "").unwrap();
        let hidden = dir.path().join(".nova.toml");
        std::fs::write(&hidden, "").unwrap();

        let discovered = discover_config_path(dir.path()).expect("hidden config");
        assert_eq!(discovered, hidden.canonicalize().unwrap_or(hidden));

        let primary = dir.path().join("nova.toml");
        std::fs::write(&primary, "").unwrap();
        let discovered = discover_config_path(dir.path()).expect("primary config");
        assert_eq!(discovered, primary.canonicalize().unwrap_or(primary));
    });
}

#[test]
fn env_override_wins_over_workspace_file() {
    with_config_env_lock(|| {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("nova.toml"), "[webfn]\nclassifier = \"precise\"\n")
            .unwrap();

        let override_path = dir.path().join("override.toml");
        std::fs::write(
            &override_path,
            "[webfn]\nclassifier = \"simple\"\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let _env = EnvVarGuard::set(NOVA_CONFIG_ENV_VAR, "override.toml");

        let (config, path) = load_for_workspace(dir.path()).unwrap();
        assert_eq!(config.webfn.classifier, ClassifierMode::Simple);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            path.expect("resolved config path"),
            override_path.canonicalize().unwrap_or(override_path)
        );
    });
}

#[test]
fn env_override_accepts_absolute_path() {
    with_config_env_lock(|| {
        let dir = tempdir().unwrap();
        let override_path = dir.path().join("elsewhere.toml");
        std::fs::write(&override_path, "[logging]\njson = true\n").unwrap();

        let _env = EnvVarGuard::set(NOVA_CONFIG_ENV_VAR, &override_path);

        let (config, path) = load_for_workspace(dir.path()).unwrap();
        assert!(config.logging.json);
        assert_eq!(
            path.expect("resolved config path"),
            override_path.canonicalize().unwrap_or(override_path)
        );
    });
}

#[test]
fn missing_config_returns_defaults() {
    with_config_env_lock(|| {
        let _env = EnvVarGuard::unset(NOVA_CONFIG_ENV_VAR);

        let dir = tempdir().unwrap();
        let (config, path) = load_for_workspace(dir.path()).unwrap();
        assert_eq!(path, None);
        assert_eq!(config, NovaConfig::default());
    });
}

#[test]
fn missing_override_file_is_an_io_error() {
    with_config_env_lock(|| {
        let dir = tempdir().unwrap();
        let _env = EnvVarGuard::set(NOVA_CONFIG_ENV_VAR, "nope.toml");

        let err = load_for_workspace(dir.path()).expect_err("missing override");
        assert!(err.to_string().contains("nope.toml"), "{err}");
    });
}

#[test]
fn workspace_diagnostics_report_unknown_keys() {
    with_config_env_lock(|| {
        let _env = EnvVarGuard::unset(NOVA_CONFIG_ENV_VAR);

        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".nova")).unwrap();
        let config_path = dir.path().join(".nova/config.toml");
        std::fs::write(
            &config_path,
            "[webfn]\nexclude_dir = [\"gen\"]\n\n[logging]\nlevel = \"nova=loud\"\n",
        )
        .unwrap();

        let (config, path, diagnostics) = load_for_workspace_with_diagnostics(dir.path()).unwrap();
        assert_eq!(
            path.expect("discovered config path"),
            config_path.canonicalize().unwrap_or(config_path)
        );
        assert_eq!(config.webfn.exclude_dirs, NovaConfig::default().webfn.exclude_dirs);
        assert_eq!(diagnostics.unknown_keys, vec!["webfn.exclude_dir"]);
        assert_eq!(
            diagnostics.warnings,
            vec![ConfigWarning::LoggingLevelInvalid {
                value: "nova=loud".to_string(),
                normalized: "nova=loud".to_string(),
            }]
        );
    });
}
