//! Configuration loading and validation.
//!
//! Connection parameters come from a YAML file plus environment overrides.
//! Credentials are never compiled in; the `MIGRATE_SOURCE_*` /
//! `MIGRATE_TARGET_*` variables let deployments keep passwords out of the
//! file entirely.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file, apply environment overrides,
    /// and validate.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. Does not validate, so that
    /// env overrides can fill required fields first.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Apply `MIGRATE_SOURCE_*` / `MIGRATE_TARGET_*` overrides from the
    /// process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup. Recognized keys, per side
    /// (`SOURCE` shown): `MIGRATE_SOURCE_HOST`, `MIGRATE_SOURCE_PORT`,
    /// `MIGRATE_SOURCE_DATABASE`, `MIGRATE_SOURCE_USER`,
    /// `MIGRATE_SOURCE_PASSWORD`, `MIGRATE_SOURCE_SSL_MODE`.
    pub fn apply_env_from<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for (prefix, store) in [
            ("MIGRATE_SOURCE", &mut self.source),
            ("MIGRATE_TARGET", &mut self.target),
        ] {
            if let Some(v) = get(&format!("{}_HOST", prefix)) {
                store.host = v;
            }
            if let Some(v) = get(&format!("{}_PORT", prefix)) {
                if let Ok(port) = v.parse() {
                    store.port = port;
                }
            }
            if let Some(v) = get(&format!("{}_DATABASE", prefix)) {
                store.database = v;
            }
            if let Some(v) = get(&format!("{}_USER", prefix)) {
                store.user = v;
            }
            if let Some(v) = get(&format!("{}_PASSWORD", prefix)) {
                store.password = v;
            }
            if let Some(v) = get(&format!("{}_SSL_MODE", prefix)) {
                store.ssl_mode = v;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const YAML: &str = r#"
source:
  host: source.example.net
  database: billard
  user: reader
target:
  host: target.example.net
  database: billard
  user: writer
"#;

    #[test]
    fn test_from_yaml_defaults() {
        let config = Config::from_yaml(YAML).unwrap();
        assert_eq!(config.source.port, 5432);
        assert_eq!(config.source.ssl_mode, "require");
        assert_eq!(config.target.password, "");
        assert_eq!(config.migration.statement_timeout_secs, 30);
        assert_eq!(config.migration.max_connections, 4);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::from_yaml(YAML).unwrap();
        config.apply_env_from(|key| match key {
            "MIGRATE_SOURCE_PASSWORD" => Some("s3cret".to_string()),
            "MIGRATE_TARGET_HOST" => Some("other.example.net".to_string()),
            "MIGRATE_TARGET_PORT" => Some("6432".to_string()),
            _ => None,
        });
        assert_eq!(config.source.password, "s3cret");
        assert_eq!(config.target.host, "other.example.net");
        assert_eq!(config.target.port, 6432);
        // Untouched fields keep their file values.
        assert_eq!(config.source.host, "source.example.net");
    }

    #[test]
    fn test_env_override_bad_port_ignored() {
        let mut config = Config::from_yaml(YAML).unwrap();
        config.apply_env_from(|key| match key {
            "MIGRATE_SOURCE_PORT" => Some("not-a-port".to_string()),
            _ => None,
        });
        assert_eq!(config.source.port, 5432);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.source.database, "billard");
    }

    #[test]
    fn test_load_missing_file() {
        assert!(Config::load("/nonexistent/config.yaml").is_err());
    }
}
