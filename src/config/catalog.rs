use crate::domain::model::RequestDefinition;
use crate::utils::error::{ReplayError, Result};
use crate::utils::validation::{
    validate_file_stem, validate_non_empty_string, validate_unique_names, Validate,
};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

/// The ordered list of request definitions replayed by one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub requests: Vec<RequestDefinition>,
}

#[derive(Deserialize)]
struct TomlCatalog {
    #[serde(default)]
    requests: Vec<RequestDefinition>,
}

impl Catalog {
    /// Picks the format from the file extension: `.toml` is TOML, anything else YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ReplayError::ConfigLoadError {
                field: path.display().to_string(),
                message: format!("Cannot read catalog: {}", e),
            })?;

        let catalog = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content)?,
            _ => Self::from_yaml_str(&content)?,
        };
        tracing::debug!(
            "Loaded {} request definitions from {}",
            catalog.requests.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// A YAML catalog is a top-level sequence of definitions.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self {
                requests: Vec::new(),
            });
        }

        let processed_content = Self::substitute_env_vars(content);
        let requests: Option<Vec<RequestDefinition>> = serde_yaml::from_str(&processed_content)
            .map_err(|e| ReplayError::ConfigLoadError {
                field: "catalog".to_string(),
                message: format!("YAML parsing error: {}", e),
            })?;
        Ok(Self {
            requests: requests.unwrap_or_default(),
        })
    }

    /// A TOML catalog lists definitions as `[[requests]]` tables.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        let parsed: TomlCatalog =
            toml::from_str(&processed_content).map_err(|e| ReplayError::ConfigLoadError {
                field: "catalog".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        Ok(Self {
            requests: parsed.requests,
        })
    }

    /// Replaces `${VAR}` with the variable's value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        let re = Regex::new(r"\$\{([^}]+)\}").expect("static regex");

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn get(&self, name: &str) -> Option<&RequestDefinition> {
        self.requests.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl Validate for Catalog {
    fn validate(&self) -> Result<()> {
        for request in &self.requests {
            validate_file_stem("request.name", &request.name)?;
            validate_non_empty_string(&format!("{}.uri", request.name), &request.uri)?;
        }
        validate_unique_names("request.name", self.requests.iter().map(|r| r.name.as_str()))?;

        Ok(())
    }
}
