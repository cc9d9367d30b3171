//! Run configuration loading

use anyhow::{Context, Result};
use appspec_core::RunConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default config location: `<config dir>/appspec/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("appspec").join("config.json"))
}

/// Load the run configuration.
///
/// An explicit path must exist. Without one, the default location is used
/// when present, otherwise built-in defaults apply.
pub fn load(explicit: Option<&Path>) -> Result<RunConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => path,
            None => {
                debug!("no config file, using defaults");
                return Ok(RunConfig::default());
            }
        },
    };
    load_file(&path)
}

fn load_file(path: &Path) -> Result<RunConfig> {
    let content = fs::read_to_string(path)
        .context(format!("Failed to read config from {}", path.display()))?;
    let config: RunConfig = serde_json::from_str(&content)
        .context(format!("Failed to parse config {}", path.display()))?;
    debug!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use appspec_core::OpenMode;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_partial_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"open_mode": "input_only", "usage_exit_code": 64}}"#).unwrap();

        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.open_mode, OpenMode::Input);
        assert_eq!(config.usage_exit_code, 64);
        assert!(config.expand_variables);
        assert!(config.builtin_options);
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn test_malformed_config_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
