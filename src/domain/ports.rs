use crate::core::dispatch::CapturedResponse;
use crate::core::request::BuiltRequest;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Persists named bytes. Writing to an existing path replaces its content.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Human-readable location of `path`, for diagnostics.
    fn describe(&self, path: &str) -> String {
        path.to_string()
    }
}

#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, definition: &str, request: BuiltRequest) -> Result<CapturedResponse>;
}
