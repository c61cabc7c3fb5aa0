use crate::core::request::header_value;
use crate::utils::error::{ReplayError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_required_field, validate_url, Validate,
};
use std::collections::HashMap;
use std::path::Path;
use url::Url;

/// Connection and auth values shared by every request of a run. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub version: String,
    pub scheme: String,
    pub host: String,
    pub authorization: String,
    pub session_id: String,
}

impl RuntimeConfig {
    /// Reads the variables from the process environment, falling back to `env_file`
    /// for anything unset. Existing environment variables always win.
    pub fn load<P: AsRef<Path>>(env_file: P) -> Result<Self> {
        Self::load_with(env_file, |key| std::env::var(key).ok())
    }

    /// Same as [`RuntimeConfig::load`] with `environment` standing in for the process environment.
    pub fn load_with<P, F>(env_file: P, environment: F) -> Result<Self>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let file_vars = read_env_file(env_file.as_ref())?;
        Self::from_lookup(|key| environment(key).or_else(|| file_vars.get(key).cloned()))
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the settings through `lookup`, so tests need not touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |keys: &[&str]| -> Result<String> {
            let value = keys.iter().find_map(|key| lookup(key));
            validate_required_field(keys[0], &value).cloned()
        };

        let config = Self {
            version: required(&["X_VERSION", "X-VERSION"])?,
            scheme: required(&["SCHEME"])?,
            host: required(&["HOST"])?,
            authorization: lookup("AUTHORIZATION").unwrap_or_default(),
            session_id: lookup("SESSION_ID").unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn base_url(&self) -> Result<Url> {
        let raw = format!("{}://{}", self.scheme, self.host);
        Url::parse(&raw).map_err(|e| ReplayError::InvalidConfigValueError {
            field: "SCHEME/HOST".to_string(),
            value: raw,
            reason: format!("Invalid URL format: {}", e),
        })
    }
}

impl Validate for RuntimeConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("X_VERSION", &self.version)?;
        validate_non_empty_string("HOST", &self.host)?;
        validate_url("SCHEME/HOST", &format!("{}://{}", self.scheme, self.host))?;

        header_value("X_VERSION", &self.version)?;
        header_value("AUTHORIZATION", &self.authorization)?;
        header_value("SESSION_ID", &self.session_id)?;
        Ok(())
    }
}

fn read_env_file(env_file: &Path) -> Result<HashMap<String, String>> {
    let load_error = |e: dotenvy::Error| ReplayError::ConfigLoadError {
        field: env_file.display().to_string(),
        message: format!("Failed to load env file: {}", e),
    };

    match dotenvy::from_path_iter(env_file) {
        Ok(entries) => {
            let vars = entries
                .collect::<std::result::Result<HashMap<_, _>, _>>()
                .map_err(load_error)?;
            tracing::debug!("Loaded {} variables from {}", vars.len(), env_file.display());
            Ok(vars)
        }
        Err(e) if e.not_found() => {
            tracing::warn!(
                "Env file {} not found, using process environment",
                env_file.display()
            );
            Ok(HashMap::new())
        }
        Err(e) => Err(load_error(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup() {
        let config = RuntimeConfig::from_lookup(lookup_from(&[
            ("X_VERSION", "1.4.0"),
            ("SCHEME", "https"),
            ("HOST", "api.example.com"),
            ("AUTHORIZATION", "token"),
        ]))
        .unwrap();

        assert_eq!(config.version, "1.4.0");
        assert_eq!(config.authorization, "token");
        assert_eq!(config.session_id, "");
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "https://api.example.com/"
        );
    }

    #[test]
    fn test_hyphenated_version_alias() {
        let config = RuntimeConfig::from_lookup(lookup_from(&[
            ("X-VERSION", "3"),
            ("SCHEME", "http"),
            ("HOST", "localhost:3000"),
        ]))
        .unwrap();
        assert_eq!(config.version, "3");
    }

    #[test]
    fn test_missing_host() {
        let err = RuntimeConfig::from_lookup(lookup_from(&[
            ("X_VERSION", "1"),
            ("SCHEME", "https"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ReplayError::MissingConfigError { field } if field == "HOST"));
    }

    #[test]
    fn test_rejects_bad_scheme_and_header_values() {
        assert!(RuntimeConfig::from_lookup(lookup_from(&[
            ("X_VERSION", "1"),
            ("SCHEME", "ftp"),
            ("HOST", "example.com"),
        ]))
        .is_err());

        assert!(RuntimeConfig::from_lookup(lookup_from(&[
            ("X_VERSION", "1"),
            ("SCHEME", "https"),
            ("HOST", "example.com"),
            ("SESSION_ID", "line\nbreak"),
        ]))
        .is_err());
    }

    fn env_file(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_load_from_env_file() {
        let file = env_file(&["X_VERSION=9.9.9", "SCHEME=http", "HOST=replay-env-file.test"]);

        let config = RuntimeConfig::load_with(file.path(), |_| None).unwrap();
        assert_eq!(config.version, "9.9.9");
        assert_eq!(config.host, "replay-env-file.test");
        assert_eq!(config.authorization, "");
    }

    #[test]
    fn test_environment_wins_over_env_file() {
        let file = env_file(&["X_VERSION=9.9.9", "SCHEME=http", "HOST=from-file.test"]);

        let config =
            RuntimeConfig::load_with(file.path(), lookup_from(&[("HOST", "from-env.test")]))
                .unwrap();
        assert_eq!(config.host, "from-env.test");
        assert_eq!(config.version, "9.9.9");
    }

    #[test]
    fn test_missing_env_file_uses_environment() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = RuntimeConfig::load_with(
            dir.path().join("absent.env"),
            lookup_from(&[("X_VERSION", "1"), ("SCHEME", "https"), ("HOST", "a.test")]),
        )
        .unwrap();
        assert_eq!(config.host, "a.test");
    }
}
