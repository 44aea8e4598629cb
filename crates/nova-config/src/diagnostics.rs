use serde::de::DeserializeOwned;

use crate::{LoggingConfig, NovaConfig};

/// Diagnostics produced while loading a Nova config.
///
/// Loading is "best effort": callers always get a `NovaConfig` when deserialization
/// succeeds, plus whatever looked suspicious along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDiagnostics {
    /// Keys present in the input TOML that `NovaConfig` does not know about.
    ///
    /// Nested tables use the full path (for example `webfn.exclude_dir`).
    pub unknown_keys: Vec<String>,
    pub warnings: Vec<ConfigWarning>,
}

impl ConfigDiagnostics {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unknown_keys.is_empty() && self.warnings.is_empty()
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    InvalidValue { toml_path: String, message: String },
    LoggingLevelInvalid { value: String, normalized: String },
}

pub(crate) fn validate(config: &NovaConfig) -> Vec<ConfigWarning> {
    let mut out = Vec::new();

    let normalized = LoggingConfig::normalize_level_directives(&config.logging.level);
    if !config.logging.level.trim().is_empty()
        && tracing_subscriber::EnvFilter::try_new(normalized.clone()).is_err()
    {
        out.push(ConfigWarning::LoggingLevelInvalid {
            value: config.logging.level.clone(),
            normalized,
        });
    }

    for (idx, dir) in config.webfn.exclude_dirs.iter().enumerate() {
        let message = if dir.trim().is_empty() {
            "must not be empty"
        } else if dir.contains(['/', '\\']) {
            "must be a directory name, not a path"
        } else {
            continue;
        };
        out.push(ConfigWarning::InvalidValue {
            toml_path: format!("webfn.exclude_dirs[{idx}]"),
            message: message.to_string(),
        });
    }

    out
}

pub(crate) fn deserialize_toml_with_unknown_keys<T: DeserializeOwned>(
    text: &str,
) -> Result<(T, Vec<String>), toml::de::Error> {
    let mut unknown = Vec::<String>::new();
    let deserializer = toml::de::Deserializer::new(text);
    let value = serde_ignored::deserialize(deserializer, |path| {
        unknown.push(normalize_serde_ignored_path(path));
    })?;
    unknown.sort();
    unknown.dedup();
    Ok((value, unknown))
}

fn normalize_serde_ignored_path(path: serde_ignored::Path) -> String {
    // `serde_ignored` renders root paths with a leading `.` and indices as `.0`.
    let raw = path.to_string();
    raw.trim_start_matches('.')
        .split('.')
        .enumerate()
        .fold(String::new(), |mut out, (idx, segment)| {
            if idx > 0 && !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
                out.push('[');
                out.push_str(segment);
                out.push(']');
                return out;
            }
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(segment);
            out
        })
}
