use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Configuration error in {field}: {message}")]
    ConfigLoadError { field: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported method '{method}' in definition '{definition}'")]
    UnsupportedMethodError { definition: String, method: String },

    #[error("Cannot serialize field '{field}' as {kind}: {reason}")]
    FieldSerializationError {
        field: String,
        kind: String,
        reason: String,
    },

    #[error("Request '{definition}' failed: {source}")]
    TransportError {
        definition: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to persist response '{name}': {message}")]
    PersistError { name: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Request,
    Network,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReplayError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReplayError::ConfigLoadError { .. }
            | ReplayError::MissingConfigError { .. }
            | ReplayError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ReplayError::UnsupportedMethodError { .. }
            | ReplayError::FieldSerializationError { .. } => ErrorCategory::Request,
            ReplayError::TransportError { .. } => ErrorCategory::Network,
            ReplayError::PersistError { .. }
            | ReplayError::IoError(_)
            | ReplayError::SerializationError(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Storage => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Request => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// Whether this error stops the remaining definitions under the fail-fast policy.
    pub fn is_abort(&self) -> bool {
        matches!(
            self,
            ReplayError::UnsupportedMethodError { .. }
                | ReplayError::FieldSerializationError { .. }
                | ReplayError::TransportError { .. }
        )
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ReplayError::ConfigLoadError { field, .. } => {
                format!("Check the {} source and its format", field)
            }
            ReplayError::MissingConfigError { field } => {
                format!("Set {} in the environment or the dotenv file", field)
            }
            ReplayError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of {}", field)
            }
            ReplayError::UnsupportedMethodError { .. } => {
                "Use one of GET, POST or PATCH for the definition method".to_string()
            }
            ReplayError::FieldSerializationError { field, kind, .. } => {
                format!("Make the value of field '{}' a valid {}", field, kind)
            }
            ReplayError::TransportError { .. } => {
                "Verify SCHEME/HOST and that the API is reachable".to_string()
            }
            ReplayError::PersistError { .. }
            | ReplayError::IoError(_)
            | ReplayError::SerializationError(_) => {
                "Check the output directory permissions and the response content".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Could not load configuration: {}", self),
            ErrorCategory::Request => format!("Could not build request: {}", self),
            ErrorCategory::Network => format!("Could not reach the API: {}", self),
            ErrorCategory::Storage => format!("Could not save response: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReplayError>;
