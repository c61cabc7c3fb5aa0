use crate::domain::ports::Storage;
use crate::utils::error::{ReplayError, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

/// Re-indents a JSON document with one tab per level. Key order and number text
/// (`1.10`, `1e2`, integers wider than 64 bits) are kept as received.
pub fn indent_json(bytes: &[u8]) -> Result<Vec<u8>> {
    let value: Value = serde_json::from_slice(bytes)?;

    let mut out = Vec::with_capacity(bytes.len() + bytes.len() / 4);
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}

pub struct ResponsePersister<S: Storage> {
    storage: S,
}

impl<S: Storage> ResponsePersister<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn file_name(name: &str) -> String {
        format!("{}.json", name)
    }

    /// Writes `<name>.json` and returns where it went.
    pub async fn persist(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let persist_error = |message: String| ReplayError::PersistError {
            name: name.to_string(),
            message,
        };

        let formatted =
            indent_json(bytes).map_err(|e| persist_error(format!("response is not JSON: {}", e)))?;

        let file_name = Self::file_name(name);
        self.storage
            .write_file(&file_name, &formatted)
            .await
            .map_err(|e| persist_error(e.to_string()))?;

        let location = self.storage.describe(&file_name);
        tracing::debug!("💾 Saved {} ({} bytes)", location, formatted.len());
        Ok(location)
    }
}
