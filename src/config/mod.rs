use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::buffer::ExportFormat;
use crate::dispatcher::DEFAULT_PROCESSING_DELAY;
use crate::session::{SessionOptions, DEFAULT_ADJUSTMENT_DEBOUNCE};

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("neither XDG_CONFIG_HOME nor HOME is set")]
    MissingHomeDirectory,
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

const APP_DIR: &str = "photool";
const APP_CONFIG_FILE: &str = "config.json";

/// Settings from `config.json`; every field is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PhotoolConfig {
    pub processing_delay_ms: u64,
    pub adjustment_debounce_ms: u64,
    pub export_format: ExportFormat,
}

impl Default for PhotoolConfig {
    fn default() -> Self {
        Self {
            processing_delay_ms: DEFAULT_PROCESSING_DELAY.as_millis() as u64,
            adjustment_debounce_ms: DEFAULT_ADJUSTMENT_DEBOUNCE.as_millis() as u64,
            export_format: ExportFormat::default(),
        }
    }
}

impl PhotoolConfig {
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            processing_delay: Duration::from_millis(self.processing_delay_ms),
            adjustment_debounce: Duration::from_millis(self.adjustment_debounce_ms),
        }
    }
}

impl From<PhotoolConfig> for SessionOptions {
    fn from(config: PhotoolConfig) -> Self {
        config.session_options()
    }
}

/// Loads the user config, falling back to defaults when it is missing or
/// broken.
pub fn load_config() -> PhotoolConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> PhotoolConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(err) => {
            tracing::debug!(%err, "no config directory; using defaults");
            return PhotoolConfig::default();
        }
    };
    if !path.exists() {
        return PhotoolConfig::default();
    }
    load_config_from(&path).unwrap_or_else(|err| {
        tracing::warn!(%err, "invalid config.json; using defaults");
        PhotoolConfig::default()
    })
}

/// Strict load of an explicit config file.
pub fn load_config_from(path: &Path) -> ConfigResult<PhotoolConfig> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(?path, ?config, "loaded config");
    Ok(config)
}

pub fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> ConfigResult<PathBuf> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(xdg_config_home: Option<&Path>, home: Option<&Path>) -> ConfigResult<PathBuf> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(root: &Path, contents: &str) {
        let dir = root.join(APP_DIR);
        std::fs::create_dir_all(&dir).expect("create config dir");
        std::fs::write(dir.join(APP_CONFIG_FILE), contents).expect("write config");
    }

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            "photool",
            "config.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/config-root/photool/config.json"));
    }

    #[test]
    fn app_config_path_falls_back_to_home_dot_config() {
        let path = app_config_path("photool", "config.json", None, Some(Path::new("/tmp/home")))
            .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/home/.config/photool/config.json"));
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path("photool", "config.json", None, None)
            .expect_err("no root should fail");
        assert!(matches!(error, ConfigError::MissingHomeDirectory));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config_with(Some(dir.path()), None);
        assert_eq!(config, PhotoolConfig::default());
        assert_eq!(
            config.session_options(),
            SessionOptions {
                processing_delay: Duration::from_millis(500),
                adjustment_debounce: Duration::from_millis(300),
            }
        );
    }

    #[test]
    fn partial_file_overrides_given_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_config(dir.path(), r#"{ "processing_delay_ms": 0, "export_format": "webp" }"#);
        let config = load_config_with(Some(dir.path()), None);
        assert_eq!(config.processing_delay_ms, 0);
        assert_eq!(config.adjustment_debounce_ms, 300);
        assert_eq!(config.export_format, ExportFormat::Webp);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_config(dir.path(), "{ not json");
        assert_eq!(load_config_with(Some(dir.path()), None), PhotoolConfig::default());

        let path = dir.path().join(APP_DIR).join(APP_CONFIG_FILE);
        assert!(matches!(
            load_config_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
