//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable that overrides `edge_ranges.file`.
pub const RANGES_FILE_ENV: &str = "CLOUDFLARE_IPS_FILE";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Load and validate configuration from a TOML file, applying environment
/// overrides.
pub fn load_config(path: &Path) -> Result<GateConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: GateConfig = toml::from_str(&content)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Defaults plus environment overrides, validated. Used when no config file
/// is given.
pub fn default_config() -> Result<GateConfig, ConfigError> {
    let mut config = GateConfig::default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply overrides from `lookup` (normally the process environment).
pub fn apply_env_overrides<F>(config: &mut GateConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(RANGES_FILE_ENV).filter(|p| !p.trim().is_empty()) {
        config.edge_ranges.file = Some(PathBuf::from(path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gate.toml");
        fs::write(
            &path,
            r#"
                [listener]
                bind_address = "127.0.0.1:9000"

                [access]
                edge_only = true
                trust_edge_header = false
                allowed_ips = ["10.0.0.5"]
                allowed_cidrs = ["10.0.1.0/24"]

                [edge_ranges]
                file = "/etc/edge-gate/ranges.json"
                watch = false
            "#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert!(config.access.edge_only);
        assert!(!config.access.trust_edge_header);
        assert_eq!(config.access.allowed_ips, vec!["10.0.0.5"]);
        assert_eq!(config.access.allowed_cidrs, vec!["10.0.1.0/24"]);
        assert_eq!(config.edge_ranges.file, Some(PathBuf::from("/etc/edge-gate/ranges.json")));
        assert!(!config.edge_ranges.watch);
        // Untouched sections keep their defaults.
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load_config(&dir.path().join("nope.toml")), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gate.toml");
        fs::write(&path, "[access\nedge_only = yes").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gate.toml");
        fs::write(&path, "[timeouts]\nrequest_secs = 0\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert_eq!(err.to_string(), "Validation failed: timeouts.request_secs must be greater than zero");
    }

    #[test]
    fn test_env_override() {
        let mut config = GateConfig::default();
        apply_env_overrides(&mut config, |key| (key == RANGES_FILE_ENV).then(|| "/tmp/cf.json".to_string()));
        assert_eq!(config.edge_ranges.file, Some(PathBuf::from("/tmp/cf.json")));

        let mut config = GateConfig::default();
        apply_env_overrides(&mut config, |_| Some(String::new()));
        assert_eq!(config.edge_ranges.file, None);
    }
}
