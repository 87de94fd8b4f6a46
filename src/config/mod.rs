mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./flvsync.toml",
        "~/.config/flvsync/config.toml",
        "/etc/flvsync/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.sync.drift_threshold_ms == 0 {
        anyhow::bail!("sync.drift_threshold_ms must be greater than 0");
    }

    if config.sync.budget_interval_ms == 0 {
        anyhow::bail!("sync.budget_interval_ms must be greater than 0");
    }

    if let Some(name) = &config.metadata.stream_name {
        if name.trim().is_empty() {
            anyhow::bail!("metadata.stream_name cannot be empty");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.sync.drift_threshold_ms, 200);
        assert_eq!(config.sync.budget_interval_ms, 5000);
        assert!(config.metadata.stream_name.is_none());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flvsync.toml");
        fs::write(
            &path,
            r#"
[sync]
drift_threshold_ms = 350

[metadata]
stream_name = "garage"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.sync.drift_threshold_ms, 350);
        assert_eq!(config.sync.budget_interval_ms, 5000);
        assert_eq!(config.metadata.stream_name.as_deref(), Some("garage"));
    }

    #[test]
    fn test_load_rejects_zero_interval() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flvsync.toml");
        fs::write(&path, "[sync]\nbudget_interval_ms = 0\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("budget_interval_ms"));
    }

    #[test]
    fn test_load_rejects_blank_stream_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flvsync.toml");
        fs::write(&path, "[metadata]\nstream_name = \"  \"\n").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = load_config(Path::new("/nonexistent/flvsync.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
