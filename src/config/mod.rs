pub mod catalog;
pub mod runtime;

#[cfg(feature = "cli")]
use crate::core::runner::ErrorPolicy;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_path, validate_range, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "api-replay")]
#[command(about = "Replay a catalog of HTTP request definitions and save each response")]
pub struct CliConfig {
    /// Request catalog (.yml/.yaml or .toml)
    #[arg(long, default_value = "./request.yml")]
    pub catalog: String,

    /// Directory receiving one <name>.json per definition
    #[arg(long, default_value = "./responseBody")]
    pub output_path: String,

    /// Dotenv file with X_VERSION, SCHEME, HOST, AUTHORIZATION, SESSION_ID
    #[arg(long, default_value = ".env")]
    pub env_file: String,

    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    /// Keep going after a failed definition instead of stopping the run
    #[arg(long)]
    pub keep_going: bool,

    /// Build and print every request without sending it
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn error_policy(&self) -> ErrorPolicy {
        if self.keep_going {
            ErrorPolicy::ContinueOnError
        } else {
            ErrorPolicy::FailFast
        }
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_seconds)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("catalog", &self.catalog)?;
        validate_path("output_path", &self.output_path)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, 3600)?;
        Ok(())
    }
}
